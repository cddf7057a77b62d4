//! Order pricing.
//!
//! Amounts are minor currency units.

use crate::domain::checkout::errors::CheckoutError;

/// Subtotal at or above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: u64 = 5000;

/// Shipping charged below [`FREE_SHIPPING_THRESHOLD`].
pub const FLAT_SHIPPING_FEE: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: u64,
    pub quantity: u64,
}

/// Sum of `unit_price * quantity` over `lines`.
///
/// # Errors
///
/// Returns [`CheckoutError::InvalidAmount`] on overflow.
pub fn subtotal(lines: &[PricedLine]) -> Result<u64, CheckoutError> {
    lines.iter().try_fold(0_u64, |sum, line| {
        line.unit_price
            .checked_mul(line.quantity)
            .and_then(|line_total| sum.checked_add(line_total))
            .ok_or(CheckoutError::InvalidAmount)
    })
}

#[must_use]
pub const fn shipping_for(subtotal: u64) -> u64 {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        0
    } else {
        FLAT_SHIPPING_FEE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: u64,
    pub shipping: u64,
    pub total: u64,
}

impl OrderTotals {
    /// Price a set of lines, adding shipping.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidAmount`] on overflow.
    pub fn from_lines(lines: &[PricedLine]) -> Result<Self, CheckoutError> {
        let subtotal = subtotal(lines)?;
        let shipping = shipping_for(subtotal);
        let total = subtotal
            .checked_add(shipping)
            .ok_or(CheckoutError::InvalidAmount)?;

        Ok(Self {
            subtotal,
            shipping,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit_price: u64, quantity: u64) -> PricedLine {
        PricedLine {
            unit_price,
            quantity,
        }
    }

    #[test]
    fn subtotal_sums_line_totals() -> Result<(), CheckoutError> {
        assert_eq!(subtotal(&[line(1250, 2), line(300, 3)])?, 3400);
        assert_eq!(subtotal(&[])?, 0);

        Ok(())
    }

    #[test]
    fn shipping_is_free_from_threshold() {
        assert_eq!(shipping_for(5000), 0);
        assert_eq!(shipping_for(12_000), 0);
        assert_eq!(shipping_for(4999), 500);
        assert_eq!(shipping_for(0), 500);
    }

    #[test]
    fn totals_include_shipping() -> Result<(), CheckoutError> {
        let below = OrderTotals::from_lines(&[line(4999, 1)])?;
        let at = OrderTotals::from_lines(&[line(2500, 2)])?;

        assert_eq!(
            below,
            OrderTotals {
                subtotal: 4999,
                shipping: 500,
                total: 5499,
            }
        );
        assert_eq!(
            at,
            OrderTotals {
                subtotal: 5000,
                shipping: 0,
                total: 5000,
            }
        );

        Ok(())
    }

    #[test]
    fn overflow_is_invalid_amount() {
        assert!(matches!(
            subtotal(&[line(u64::MAX, 2)]),
            Err(CheckoutError::InvalidAmount)
        ));
        assert!(matches!(
            OrderTotals::from_lines(&[line(u64::MAX - 100, 1)]),
            Err(CheckoutError::InvalidAmount)
        ));
    }
}
