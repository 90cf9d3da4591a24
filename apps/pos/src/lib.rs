//! # Stride POS Library
//!
//! The counter application: it owns the terminal's cart session and exposes
//! the commands the POS screen calls.
//!
//! ## Module Organization
//! ```text
//! stride_pos/
//! ├── lib.rs          ◄─── You are here (tracing + paths)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── PosConfig (env > pos.toml > defaults)
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── session.rs  ◄─── CartSession behind a mutex + in-flight checkouts
//! ├── commands/
//! │   ├── cart.rs     ◄─── Current cart: add, quantity, remove, clear
//! │   ├── pending.rs  ◄─── Pending carts (Hoá đơn chờ)
//! │   ├── catalog.rs  ◄─── Products + promotions → effective prices
//! │   ├── voucher.rs  ◄─── apply_coupon / remove_voucher
//! │   ├── checkout.rs ◄─── CheckoutCoordinator
//! │   ├── orders.rs   ◄─── Guarded order-status changes
//! │   └── returns.rs  ◄─── Return requests
//! └── error.rs        ◄─── ApiError shown to staff
//! ```
//!
//! ## State Management
//! ```text
//! ┌──────────────────┐ ┌──────────────────────┐ ┌──────────────────────┐
//! │    DbState       │ │    SessionState      │ │    PosConfig         │
//! │  • SQLite pool   │ │  • main cart         │ │  • backend URL       │
//! │  • snapshots     │ │  • pending carts     │ │  • terminal id       │
//! │                  │ │  • checkout form     │ │  • store name        │
//! └──────────────────┘ └──────────────────────┘ └──────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,stride=debug,sqlx=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stride_pos=trace` - Trace for the app only
/// - Default: [`DEFAULT_LOG_FILTER`]
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Platform project directories for Stride POS.
pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("vn", "stride", "pos")
}

/// Default database file location.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/vn.stride.pos/stride.db`
/// - **Windows**: `%APPDATA%\stride\pos\data\stride.db`
/// - **Linux**: `~/.local/share/pos/stride.db`
///
/// Creates the directory if needed.
pub fn default_database_path() -> Result<PathBuf, std::io::Error> {
    let dirs = project_dirs().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine app data directory",
        )
    })?;

    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("stride.db"))
}
