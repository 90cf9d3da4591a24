//! # Cart Session
//!
//! Everything one POS terminal holds in memory: the walk-in main cart, the
//! pending carts and the checkout form.
//!
//! ```text
//! CartSession
//! ├── main: Cart                 (always present)
//! ├── pending: PendingCartRegistry
//! │     ├── Giỏ hàng 1 ◄── active? ──┐
//! │     └── Giỏ hàng 2               │
//! └── form: CheckoutForm             │
//!                                    ▼
//!          current_cart() = active pending cart, else main
//! ```
//!
//! A session is a plain value: tests build their own, and the app wraps one
//! in a mutex.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::checkout::CheckoutForm;
use crate::error::{CoreError, CoreResult};
use crate::registry::PendingCartRegistry;

/// Names one cart within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum CartKey {
    Main,
    Pending(String),
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartKey::Main => write!(f, "main"),
            CartKey::Pending(id) => write!(f, "pending:{}", id),
        }
    }
}

/// Main cart + pending carts + checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSession {
    pub main: Cart,
    pub pending: PendingCartRegistry,
    #[serde(default)]
    pub form: CheckoutForm,
}

impl CartSession {
    pub fn new() -> Self {
        CartSession::default()
    }

    /// Key of the cart that reads and writes currently go to.
    pub fn current_key(&self) -> CartKey {
        match self.pending.active_cart() {
            Some(cart) => CartKey::Pending(cart.id.clone()),
            None => CartKey::Main,
        }
    }

    pub fn current_cart(&self) -> &Cart {
        match self.pending.active_cart() {
            Some(pending) => &pending.cart,
            None => &self.main,
        }
    }

    pub fn current_cart_mut(&mut self) -> &mut Cart {
        match self.pending.active_cart_mut() {
            Some(pending) => &mut pending.cart,
            None => &mut self.main,
        }
    }

    /// Looks a cart up by key. `None` if a pending cart was deleted.
    pub fn cart(&self, key: &CartKey) -> Option<&Cart> {
        match key {
            CartKey::Main => Some(&self.main),
            CartKey::Pending(id) => self.pending.get(id).map(|p| &p.cart),
        }
    }

    pub fn cart_mut(&mut self, key: &CartKey) -> Option<&mut Cart> {
        match key {
            CartKey::Main => Some(&mut self.main),
            CartKey::Pending(id) => self.pending.get_mut(id).map(|p| &mut p.cart),
        }
    }

    pub fn cart_mut_or_err(&mut self, key: &CartKey) -> CoreResult<&mut Cart> {
        match key {
            CartKey::Main => Ok(&mut self.main),
            CartKey::Pending(id) => self
                .pending
                .get_mut(id)
                .map(|p| &mut p.cart)
                .ok_or_else(|| CoreError::PendingCartNotFound(id.clone())),
        }
    }

    /// Checks every cart and the pending registry.
    pub fn check_invariants(&self) -> CoreResult<()> {
        self.main.check_invariants()?;
        self.pending.check_invariants()
    }

    /// Adds a line to the current cart.
    pub fn add_item(&mut self, line: CartLine) -> CoreResult<()> {
        self.current_cart_mut().add_item(line)
    }

    /// Opens a pending cart and makes it current.
    pub fn open_pending_cart(&mut self) -> CoreResult<String> {
        let id = self.pending.create_cart()?;
        self.pending.set_active(Some(&id))?;
        Ok(id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::line;

    #[test]
    fn test_current_cart_defaults_to_main() {
        let mut session = CartSession::new();
        session.add_item(line("p1", "v1", 100, 1, 5)).unwrap();

        assert_eq!(session.current_key(), CartKey::Main);
        assert_eq!(session.main.line_count(), 1);
    }

    #[test]
    fn test_active_pending_cart_receives_items() {
        let mut session = CartSession::new();
        let id = session.pending.create_cart().unwrap();
        session.pending.set_active(Some(&id)).unwrap();

        session.add_item(line("p1", "v1", 100, 1, 5)).unwrap();

        assert!(session.main.is_empty());
        assert_eq!(session.current_key(), CartKey::Pending(id.clone()));
        assert_eq!(session.pending.get(&id).unwrap().cart.line_count(), 1);
    }

    #[test]
    fn test_deleting_active_cart_routes_adds_to_main() {
        let mut session = CartSession::new();
        let id = session.open_pending_cart().unwrap();
        session.add_item(line("p1", "v1", 100, 1, 5)).unwrap();

        session.pending.delete_cart(&id).unwrap();
        session.add_item(line("p2", "v1", 200, 1, 5)).unwrap();

        assert_eq!(session.current_key(), CartKey::Main);
        assert_eq!(session.main.lines()[0].product_id, "p2");
        assert!(session.cart(&CartKey::Pending(id)).is_none());
    }

    #[test]
    fn test_carts_are_independent() {
        let mut session = CartSession::new();
        session.add_item(line("p1", "v1", 100, 2, 5)).unwrap();
        session.open_pending_cart().unwrap();
        session.add_item(line("p1", "v1", 100, 4, 5)).unwrap();

        // Same key, different carts: each bounded by stock on its own
        assert_eq!(session.main.lines()[0].quantity, 2);
        assert_eq!(session.current_cart().lines()[0].quantity, 4);
    }

    #[test]
    fn test_cart_key_serialization() {
        let json = serde_json::to_value(CartKey::Pending("abc".to_string())).unwrap();
        assert_eq!(json["kind"], "pending");
        assert_eq!(json["id"], "abc");
    }

    #[test]
    fn test_session_snapshot_round_trip() {
        let mut session = CartSession::new();
        session.add_item(line("p1", "v1", 100, 2, 5)).unwrap();
        session.open_pending_cart().unwrap();

        let json = serde_json::to_string(&session).unwrap();
        let restored: CartSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
