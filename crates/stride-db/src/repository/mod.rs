//! # Repository Module
//!
//! Database access behind small typed APIs.
//!
//! ```text
//! stride-pos SessionState
//!      │  db.sessions().save(terminal_id, &session)
//!      ▼
//! CartSessionRepository
//! ├── save(&self, terminal_id, session)
//! ├── load(&self, terminal_id)
//! └── delete(&self, terminal_id)
//!      │  SQL
//!      ▼
//! SQLite (cart_sessions)
//! ```
//!
//! ## Available Repositories
//!
//! - [`session::CartSessionRepository`] - Per-terminal cart session snapshots

pub mod session;
