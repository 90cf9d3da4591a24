//! # Stride POS Entry Point
//!
//! Boots a counter terminal: configuration, the local session store, the
//! backend client, then a first catalog load so staff can start selling.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (env > pos.toml > defaults)
//! 3. Open the local database and restore the terminal's cart session
//! 4. Connect the REST backend
//! 5. Load the product grid with running promotions
//!
//! A backend that is down at startup is not fatal: the restored session is
//! still usable and the catalog can be reloaded later.

use tracing::{info, warn};

use stride_client::{ProductFilter, RestBackend};
use stride_db::DbConfig;
use stride_pos::commands::cart::get_session;
use stride_pos::commands::catalog::load_catalog;
use stride_pos::commands::CheckoutCoordinator;
use stride_pos::init_tracing;
use stride_pos::state::{DbState, PosConfig, SessionState, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Stride POS");

    let config = PosConfig::load_or_default(None);
    info!(
        terminal = %config.terminal_id,
        backend = %config.backend_url,
        store = %config.store_name,
        "Configuration loaded"
    );

    let session = if config.persist_session {
        let db_path = config.resolved_database_path()?;
        info!(?db_path, "Database path determined");

        let db = DbState::open(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        SessionState::restore(SessionStore::new(
            db.inner().sessions(),
            config.terminal_id.clone(),
        ))
        .await
    } else {
        SessionState::new()
    };

    let backend = RestBackend::new(&config.client_config())?;
    let coordinator = CheckoutCoordinator::from_config(backend, &config);
    info!(base_url = %coordinator.backend().base_url(), "Backend client ready");

    let filter = ProductFilter::default().with_page_size(config.catalog_page_size);
    match load_catalog(coordinator.backend(), &filter, None).await {
        Ok(catalog) => {
            for entry in catalog.entries() {
                info!(
                    sku = entry.sku.as_deref().unwrap_or("-"),
                    name = %entry.name,
                    price = %config.format_money(entry.pricing.price),
                    stock = entry.stock,
                    "Catalog entry"
                );
            }
        }
        Err(e) => warn!(error = %e, "Catalog unavailable, continuing with the restored session"),
    }

    let view = get_session(&session).await;
    info!(
        current = %view.current.name,
        lines = view.current.lines.len(),
        total = %config.format_money(view.current.totals.total),
        pending = view.pending.len(),
        "Counter ready"
    );

    Ok(())
}
