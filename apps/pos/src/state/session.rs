//! # Session State
//!
//! The terminal's [`CartSession`] shared between commands.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<tokio::sync::Mutex<T>>` because:
//! 1. Every command reads or mutates the same carts
//! 2. Only one command should mutate at a time
//! 3. Commands run concurrently on the tokio runtime
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session State Operations                             │
//! │                                                                         │
//! │  Command                 SessionState              Side effect          │
//! │  ───────                 ────────────              ───────────          │
//! │                                                                         │
//! │  add_to_cart ──────────► mutate_current(|s| ...) ► snapshot saved      │
//! │                          └─ current cart in flight? CHECKOUT_IN_PROGRESS│
//! │                                                                         │
//! │  get_cart ─────────────► read(|s| ...) ──────────► (none)              │
//! │                                                                         │
//! │  checkout ─────────────► begin_checkout(key) ────► key in-flight       │
//! │                          snapshot()                                     │
//! │                          ... backend call, lock NOT held ...            │
//! │                          mutate(commit) ─────────► snapshot saved      │
//! │                          guard dropped ──────────► key released        │
//! │                                                                         │
//! │  NOTE: The lock is never held across a backend call. A cart in flight  │
//! │  only changes through the checkout that owns it.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use stride_core::{CartKey, CartSession, CoreError, CoreResult};
use stride_db::{CartSessionRepository, DbResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// Where a terminal's session snapshot is saved.
#[derive(Debug, Clone)]
pub struct SessionStore {
    repo: CartSessionRepository,
    terminal_id: String,
}

impl SessionStore {
    pub fn new(repo: CartSessionRepository, terminal_id: impl Into<String>) -> Self {
        SessionStore {
            repo,
            terminal_id: terminal_id.into(),
        }
    }

    pub fn terminal_id(&self) -> &str {
        &self.terminal_id
    }

    async fn save(&self, session: &CartSession) -> DbResult<()> {
        self.repo.save(&self.terminal_id, session).await
    }
}

/// Shared cart session plus the set of carts with a checkout in flight.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<CartSession>>,
    in_flight: Arc<StdMutex<HashSet<CartKey>>>,
    store: Option<SessionStore>,
}

impl SessionState {
    /// Creates an in-memory session that is never persisted.
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Wraps `session`, saving every change to `store`.
    pub fn with_store(session: CartSession, store: SessionStore) -> Self {
        SessionState {
            session: Arc::new(Mutex::new(session)),
            in_flight: Arc::default(),
            store: Some(store),
        }
    }

    /// Restores the terminal's last snapshot, or starts empty.
    ///
    /// A snapshot that cannot be read, or that breaks a cart rule (a
    /// quantity over stock, too many pending carts), is logged and ignored.
    /// The next save overwrites it.
    pub async fn restore(store: SessionStore) -> Self {
        let session = match store.repo.load(&store.terminal_id).await {
            Ok(Some(session)) => match session.check_invariants() {
                Ok(()) => {
                    info!(
                        terminal_id = %store.terminal_id,
                        main_lines = session.main.line_count(),
                        pending_carts = session.pending.len(),
                        "Restored cart session"
                    );
                    session
                }
                Err(e) => {
                    warn!(
                        terminal_id = %store.terminal_id,
                        error = %e,
                        "Ignoring inconsistent cart session snapshot"
                    );
                    CartSession::new()
                }
            },
            Ok(None) => {
                debug!(terminal_id = %store.terminal_id, "No saved cart session");
                CartSession::new()
            }
            Err(e) => {
                warn!(
                    terminal_id = %store.terminal_id,
                    error = %e,
                    "Ignoring unreadable cart session snapshot"
                );
                CartSession::new()
            }
        };

        SessionState::with_store(session, store)
    }

    /// Executes a read-only function on the session.
    pub async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartSession) -> R,
    {
        let session = self.session.lock().await;
        f(&*session)
    }

    /// Clone of the whole session.
    pub async fn snapshot(&self) -> CartSession {
        self.session.lock().await.clone()
    }

    /// Executes a mutating function on the session, then saves it.
    ///
    /// ## Behavior
    /// - `f` returns `Err`: nothing is saved. Core operations leave the
    ///   session untouched when they fail.
    /// - Save fails: logged, the in-memory change stands.
    pub async fn mutate<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut CartSession) -> CoreResult<R>,
    {
        let mut session = self.session.lock().await;
        let result = f(&mut *session)?;

        if let Some(store) = &self.store {
            if let Err(e) = store.save(&*session).await {
                warn!(
                    terminal_id = %store.terminal_id,
                    error = %e,
                    "Failed to save cart session"
                );
            }
        }

        Ok(result)
    }

    /// Like [`mutate`](Self::mutate) for a command on the current cart.
    ///
    /// ## Errors
    /// `CheckoutInProgress` while the current cart is being submitted. The
    /// check runs under the session lock, so it sees the cart that is
    /// current when `f` runs.
    pub async fn mutate_current<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut CartSession) -> CoreResult<R>,
    {
        self.mutate(|s| {
            self.ensure_idle(&s.current_key())?;
            f(s)
        })
        .await
    }

    /// Like [`mutate`](Self::mutate) for a command on the cart at `key`.
    ///
    /// ## Errors
    /// `CheckoutInProgress` while that cart is being submitted.
    pub async fn mutate_cart<F, R>(&self, key: &CartKey, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut CartSession) -> CoreResult<R>,
    {
        self.mutate(|s| {
            self.ensure_idle(key)?;
            f(s)
        })
        .await
    }

    fn ensure_idle(&self, key: &CartKey) -> CoreResult<()> {
        if self.is_checking_out(key) {
            return Err(CoreError::CheckoutInProgress(key.to_string()));
        }
        Ok(())
    }

    /// Marks `key` as having a checkout in flight.
    ///
    /// ## Errors
    /// `CheckoutInProgress` if the same cart is already being submitted.
    /// The mark is released when the returned guard drops.
    pub fn begin_checkout(&self, key: &CartKey) -> CoreResult<CheckoutGuard> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(key.clone()) {
            return Err(CoreError::CheckoutInProgress(key.to_string()));
        }

        Ok(CheckoutGuard {
            in_flight: Arc::clone(&self.in_flight),
            key: key.clone(),
        })
    }

    pub fn is_checking_out(&self, key: &CartKey) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

/// Releases a cart's in-flight mark on drop.
#[derive(Debug)]
pub struct CheckoutGuard {
    in_flight: Arc<StdMutex<HashSet<CartKey>>>,
    key: CartKey,
}

impl CheckoutGuard {
    pub fn key(&self) -> &CartKey {
        &self.key
    }
}

impl Drop for CheckoutGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
