//! # stride-db: Local Persistence for Stride POS
//!
//! Keeps each terminal's cart session (main cart, pending carts, checkout
//! form) in a local SQLite file, so parked carts survive a restart.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stride POS Data Flow                             │
//! │                                                                         │
//! │  stride-pos command (add_to_cart, create_pending_cart, ...)            │
//! │       │  mutation succeeded                                            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     stride-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────────┐  ┌───────────┐  │   │
//! │  │   │   Database    │    │    Repositories     │  │Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ CartSessionRepo     │  │ (embedded)│  │   │
//! │  │   │  SqlitePool   │    │ save / load / delete│  │ 001_...   │  │   │
//! │  │   └───────────────┘    └─────────────────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SQLite: <data dir>/stride.db  →  cart_sessions (JSON payload)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders, products and vouchers are NOT stored here: the backend owns them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stride_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./stride.db")).await?;
//! db.sessions().save("counter-1", &session).await?;
//! let restored = db.sessions().load("counter-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::session::{CartSessionRepository, SessionRecord};
