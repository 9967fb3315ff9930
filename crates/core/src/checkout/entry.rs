//! Checkout entry modes.

use crate::cart::CartItem;

/// A step in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Review the lines about to be ordered.
    ReviewOrder,

    /// Collect and validate the shipping address.
    ShippingDetails,

    /// Choose online payment or cash on delivery, then submit.
    PaymentMethod,
}

/// How checkout was entered.
///
/// Each mode carries a fixed step list, so no transition site ever has to
/// branch on where the customer came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryMode {
    /// The full flow from the cart page.
    Standard,

    /// From the cart sidebar; the order was just reviewed there, so the
    /// review step is skipped.
    FromCartSidebar,

    /// Express single-item checkout, bypassing the cart entirely.
    BuyNow(CartItem),
}

impl EntryMode {
    /// The ordered steps this entry mode walks through.
    #[must_use]
    pub fn steps(&self) -> &'static [Step] {
        match self {
            Self::Standard => &[Step::ReviewOrder, Step::ShippingDetails, Step::PaymentMethod],
            Self::FromCartSidebar | Self::BuyNow(_) => {
                &[Step::ShippingDetails, Step::PaymentMethod]
            }
        }
    }
}
