//! # State Module
//!
//! Application state for the POS terminal.
//!
//! Separate state types rather than one `AppState`: each command takes
//! only what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌────────────────────┐  ┌──────────────────┐        │
//! │  │   DbState    │  │   SessionState     │  │   PosConfig      │        │
//! │  │              │  │                    │  │                  │        │
//! │  │  Database    │  │  Arc<Mutex<        │  │  backend_url     │        │
//! │  │  (SQLite     │  │    CartSession     │  │  terminal_id     │        │
//! │  │   pool)      │  │  >>                │  │  store_name      │        │
//! │  │              │  │  in-flight set     │  │                  │        │
//! │  └──────┬───────┘  └─────────▲──────────┘  └──────────────────┘        │
//! │         │   SessionStore     │                                          │
//! │         └────────────────────┘                                          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • SessionState: tokio Mutex for the session, std Mutex for the set   │
//! │  • PosConfig: Read-only after initialization                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod session;

pub use config::{ConfigError, PosConfig};
pub use db::DbState;
pub use session::{CheckoutGuard, SessionState, SessionStore};
