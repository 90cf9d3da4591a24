//! # Pending Cart Registry
//!
//! Parked carts ("Hoá đơn chờ") that let one cashier serve several customers
//! interleaved: ring up a pair of shoes, park the ticket while the customer
//! tries another size, serve the next person, come back.
//!
//! ## Rules
//! - At most [`MAX_PENDING_CARTS`] carts exist at once; the next
//!   `create_cart` fails and nothing is created
//! - New carts are named `"Giỏ hàng {n}"` from a sequence that only grows,
//!   so a deleted name is never handed out again in the same session
//! - Creating a cart does NOT activate it
//! - Zero or one cart is active; none means the main (walk-in) cart

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::validation::validate_cart_name;
use crate::{MAX_PENDING_CARTS, PENDING_CART_NAME_PREFIX};

/// A named, parked cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PendingCart {
    pub id: String,
    pub name: String,
    /// Creation order, starting at 1.
    pub sequence: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub cart: Cart,
}

/// The set of pending carts plus which one is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PendingCartRegistry {
    carts: Vec<PendingCart>,
    active_id: Option<String>,
    next_sequence: u32,
}

impl Default for PendingCartRegistry {
    fn default() -> Self {
        PendingCartRegistry {
            carts: Vec::new(),
            active_id: None,
            next_sequence: 1,
        }
    }
}

impl PendingCartRegistry {
    pub fn new() -> Self {
        PendingCartRegistry::default()
    }

    /// Opens a new empty pending cart and returns its id.
    ///
    /// ## Errors
    /// `PendingCartLimit` when [`MAX_PENDING_CARTS`] are already open.
    pub fn create_cart(&mut self) -> CoreResult<String> {
        if self.carts.len() >= MAX_PENDING_CARTS {
            return Err(CoreError::PendingCartLimit {
                max: MAX_PENDING_CARTS,
            });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let id = Uuid::new_v4().to_string();
        self.carts.push(PendingCart {
            id: id.clone(),
            name: format!("{} {}", PENDING_CART_NAME_PREFIX, sequence),
            sequence,
            created_at: Utc::now(),
            cart: Cart::new(),
        });

        Ok(id)
    }

    /// Selects which cart "current cart" resolves to. `None` = main cart.
    pub fn set_active(&mut self, id: Option<&str>) -> CoreResult<()> {
        match id {
            None => {
                self.active_id = None;
                Ok(())
            }
            Some(id) if self.get(id).is_some() => {
                self.active_id = Some(id.to_string());
                Ok(())
            }
            Some(id) => Err(CoreError::PendingCartNotFound(id.to_string())),
        }
    }

    /// Deletes a cart. If it was active, the main cart becomes current.
    pub fn delete_cart(&mut self, id: &str) -> CoreResult<PendingCart> {
        let index = self
            .carts
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| CoreError::PendingCartNotFound(id.to_string()))?;

        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
        Ok(self.carts.remove(index))
    }

    /// Renames a cart (e.g. to the customer's name).
    pub fn rename_cart(&mut self, id: &str, name: &str) -> CoreResult<()> {
        validate_cart_name(name)?;
        let cart = self
            .get_mut(id)
            .ok_or_else(|| CoreError::PendingCartNotFound(id.to_string()))?;
        cart.name = name.trim().to_string();
        Ok(())
    }

    /// Checks the registry rules and every parked cart.
    ///
    /// ## Errors
    /// `InconsistentSession` when there are more than [`MAX_PENDING_CARTS`]
    /// carts, an id repeats, `active_id` names no cart, or a sequence
    /// number is not below the next one to hand out.
    pub fn check_invariants(&self) -> CoreResult<()> {
        let inconsistent = |reason: String| Err(CoreError::InconsistentSession(reason));

        if self.carts.len() > MAX_PENDING_CARTS {
            return inconsistent(format!(
                "{} pending carts, at most {} allowed",
                self.carts.len(),
                MAX_PENDING_CARTS
            ));
        }

        for (i, pending) in self.carts.iter().enumerate() {
            if self.carts[..i].iter().any(|c| c.id == pending.id) {
                return inconsistent(format!("pending cart {} appears twice", pending.id));
            }
            if pending.sequence >= self.next_sequence {
                return inconsistent(format!(
                    "pending cart {} has sequence {} but next is {}",
                    pending.id, pending.sequence, self.next_sequence
                ));
            }
            pending.cart.check_invariants()?;
        }

        match self.active_id.as_deref() {
            Some(id) if self.get(id).is_none() => {
                inconsistent(format!("active pending cart {} does not exist", id))
            }
            _ => Ok(()),
        }
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_cart(&self) -> Option<&PendingCart> {
        let id = self.active_id.as_deref()?;
        self.get(id)
    }

    pub fn active_cart_mut(&mut self) -> Option<&mut PendingCart> {
        let id = self.active_id.clone()?;
        self.get_mut(&id)
    }

    pub fn get(&self, id: &str) -> Option<&PendingCart> {
        self.carts.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut PendingCart> {
        self.carts.iter_mut().find(|c| c.id == id)
    }

    /// Carts in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingCart> {
        self.carts.iter()
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.carts.len() >= MAX_PENDING_CARTS
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
