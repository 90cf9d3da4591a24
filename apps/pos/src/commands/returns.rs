//! # Return Commands
//!
//! Return requests are checked locally (reason, items, quantities) and only
//! then sent to the backend, which owns approval.

use tracing::{debug, info};

use stride_client::Backend;
use stride_core::validation::validate_return_request;
use stride_core::{ReturnRecord, ReturnRequest};

use crate::error::ApiError;

/// Opens a return for an order.
pub async fn create_return<B: Backend + ?Sized>(
    backend: &B,
    request: ReturnRequest,
) -> Result<ReturnRecord, ApiError> {
    debug!(order_id = %request.order_id, items = request.items.len(), "create_return command");

    validate_return_request(&request)?;

    let request = ReturnRequest {
        reason: request.reason.trim().to_string(),
        note: request
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        ..request
    };

    let record = backend.create_return(&request).await?;
    info!(return_id = %record.id, order_id = %record.order_id, "Return requested");
    Ok(record)
}

/// Lists an account's returns.
pub async fn list_returns<B: Backend + ?Sized>(
    backend: &B,
    account_id: &str,
) -> Result<Vec<ReturnRecord>, ApiError> {
    debug!(account_id = %account_id, "list_returns command");
    Ok(backend.list_returns(account_id).await?)
}

// =============================================================================
// Unit Tests
// =============================================================================
