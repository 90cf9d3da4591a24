//! # Validation Module
//!
//! Input validation for what staff type at the counter.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: POS screen                                                   │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate feedback                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: stride-pos command (Rust)                                    │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: rules checked before any backend call               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative checks (voucher terms, stock, order status)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stride_core::validation::{validate_phone, validate_quantity};
//!
//! validate_phone("0912345678").unwrap();
//! assert_eq!(validate_quantity(3).unwrap(), 3);
//! ```

use crate::error::ValidationError;
use crate::types::ReturnRequest;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound accepted from the quantity field.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

// =============================================================================
// String Validators
// =============================================================================

fn required_trimmed<'a>(field: &str, value: &'a str, max: usize) -> ValidationResult<&'a str> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value)
}

/// Validates a voucher code typed into the coupon box.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Returns
/// The trimmed, upper-cased code.
///
/// ## Example
/// ```rust
/// use stride_core::validation::validate_coupon_code;
///
/// assert_eq!(validate_coupon_code(" sale10 ").unwrap(), "SALE10");
/// assert!(validate_coupon_code("   ").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    let code = required_trimmed("code", code, 50)?;

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a guest customer's name. Must not be empty, max 100 characters.
pub fn validate_guest_name(name: &str) -> ValidationResult<()> {
    required_trimmed("customer name", name, 100).map(|_| ())
}

/// Validates a Vietnamese mobile number: 10 digits starting with `0`.
///
/// ## Example
/// ```rust
/// use stride_core::validation::validate_phone;
///
/// assert!(validate_phone("0912345678").is_ok());
/// assert!(validate_phone("912345678").is_err());
/// assert!(validate_phone("09123456ab").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = required_trimmed("phone", phone, 10)?;

    let well_formed = phone.len() == 10
        && phone.starts_with('0')
        && phone.chars().all(|c| c.is_ascii_digit());

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 10 digits starting with 0".to_string(),
        });
    }

    Ok(())
}

/// Validates a pending cart name.
pub fn validate_cart_name(name: &str) -> ValidationResult<()> {
    required_trimmed("cart name", name, 60).map(|_| ())
}

/// Validates an order note. Max 500 characters.
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.trim().chars().count() > 500 {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: 500,
        });
    }
    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns the default listing)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity for a new cart line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
///
/// Stock is checked by the cart itself, which knows the line's stock.
pub fn validate_quantity(quantity: i64) -> ValidationResult<u32> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(quantity as u32)
}

// =============================================================================
// Returns
// =============================================================================

/// Validates a return reason. Required, max 500 characters.
pub fn validate_return_reason(reason: &str) -> ValidationResult<()> {
    required_trimmed("reason", reason, 500).map(|_| ())
}

/// Validates a return request before it is sent.
///
/// ## Rules
/// - Order id and reason are required
/// - At least one item, each with a variant and a positive quantity
pub fn validate_return_request(request: &ReturnRequest) -> ValidationResult<()> {
    required_trimmed("order", &request.order_id, 64)?;
    validate_return_reason(&request.reason)?;

    if request.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    for item in &request.items {
        if item.variant_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "variant".to_string(),
            });
        }
        if item.quantity == 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
    }

    if let Some(note) = &request.note {
        validate_note(note)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
