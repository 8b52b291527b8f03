//! # Validation Module
//!
//! Input validation for order lines before settlement runs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Order pipeline (caller)                                      │
//! │  ├── Payment captured, order shape deserialized                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Positive prices and quantities, bounded line counts               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / foreign key constraints                       │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::OrderLine;
use crate::{MAX_LINE_QUANTITY, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a single line's quantity.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
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
    Ok(())
}

/// Validates a single line's unit price.
///
/// Zero-priced lines are allowed (free promotional items); negative are not.
pub fn validate_unit_price(unit_price_cents: i64) -> ValidationResult<()> {
    if unit_price_cents < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "unit_price_cents".to_string(),
        });
    }
    Ok(())
}

/// Validates the full line set of an order before splitting.
pub fn validate_order_lines(order_id: &str, lines: &[OrderLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyOrder {
            order_id: order_id.to_string(),
        });
    }
    if lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "line_items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }
    for line in lines {
        if line.product_id.is_empty() {
            return Err(ValidationError::Required {
                field: "product_id".to_string(),
            });
        }
        validate_unit_price(line.unit_price_cents)?;
        validate_quantity(line.quantity)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, price: i64, qty: i64) -> OrderLine {
        OrderLine {
            product_id: product_id.to_string(),
            unit_price_cents: price,
            quantity: qty,
        }
    }

    #[test]
    fn test_valid_lines() {
        let lines = vec![line("p1", 1000, 2), line("p2", 0, 1)];
        assert!(validate_order_lines("o1", &lines).is_ok());
    }

    #[test]
    fn test_empty_order_rejected() {
        let err = validate_order_lines("o1", &[]).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyOrder { .. }));
    }

    #[test]
    fn test_negative_price_rejected() {
        let lines = vec![line("p1", -5, 1)];
        let err = validate_order_lines("o1", &lines).unwrap_err();
        assert!(matches!(err, ValidationError::MustBeNonNegative { .. }));
        assert_eq!(err.to_string(), "unit_price_cents must not be negative");
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(1).is_ok());
    }

    #[test]
    fn test_quantity_bound() {
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_missing_product_id_rejected() {
        let lines = vec![line("", 100, 1)];
        let err = validate_order_lines("o1", &lines).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }
}
