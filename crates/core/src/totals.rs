//! Order totals.

use crate::{cart::CartItem, order::PaymentMethod};

/// Derived monetary summary for a set of lines and a payment method.
///
/// Always recomputed from the lines; never cached, so it cannot drift from
/// the cart contents or the selected payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of unit price times quantity over all lines.
    pub subtotal: u64,

    /// Sum at advertised pre-discount prices, falling back to the unit
    /// price for lines without one.
    pub market_subtotal: u64,

    /// `market_subtotal - subtotal`, floored at zero.
    pub savings: u64,

    /// Delivery surcharge: zero for online payment, the configured fee for
    /// cash on delivery.
    pub shipping: u64,

    /// `subtotal + shipping` — the amount actually charged.
    pub final_total: u64,
}

impl OrderTotals {
    /// Compute totals for the given lines.
    ///
    /// `cod_surcharge` is the configured cash-on-delivery fee in minor
    /// currency units; it applies only when `method` is COD.
    #[must_use]
    pub fn compute(items: &[CartItem], method: PaymentMethod, cod_surcharge: u64) -> Self {
        let subtotal: u64 = items
            .iter()
            .map(|line| line.price.saturating_mul(u64::from(line.qty)))
            .sum();

        let market_subtotal: u64 = items
            .iter()
            .map(|line| {
                line.market_price
                    .unwrap_or(line.price)
                    .saturating_mul(u64::from(line.qty))
            })
            .sum();

        let shipping = if method.is_cod() { cod_surcharge } else { 0 };

        Self {
            subtotal,
            market_subtotal,
            savings: market_subtotal.saturating_sub(subtotal),
            shipping,
            final_total: subtotal.saturating_add(shipping),
        }
    }
}
