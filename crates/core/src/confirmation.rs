//! Order confirmation summary.
//!
//! Formats a completed [`Order`] into a plain-text summary for the
//! confirmation surface. The printable invoice document is produced by an
//! external collaborator and is not rendered here.

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::order::Order;

/// Errors that can occur when writing a confirmation summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error
    #[error("IO error")]
    Io,
}

/// On-screen summary of a placed order.
#[derive(Debug, Clone)]
pub struct OrderSummary<'a> {
    order: &'a Order,
}

impl<'a> OrderSummary<'a> {
    /// Create a summary for the given order.
    #[must_use]
    pub fn new(order: &'a Order) -> Self {
        Self { order }
    }

    /// Write the summary: line items, shipping address, totals, and the
    /// payment method.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if the summary cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Size", "Color", "Qty", "Price", "Total"]);

        for item in &self.order.items {
            let line_total = item.price.saturating_mul(u64::from(item.qty));

            builder.push_record([
                item.name.clone(),
                item.size.clone(),
                item.color.clone(),
                item.qty.to_string(),
                format_minor(item.price),
                format_minor(line_total),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::sharp());
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "Order {}", self.order.order_id).map_err(|_err| SummaryError::Io)?;

        if let Some(payment_id) = &self.order.payment_id {
            writeln!(out, "Payment {payment_id}").map_err(|_err| SummaryError::Io)?;
        }

        writeln!(out, "\n{table}\n").map_err(|_err| SummaryError::Io)?;

        self.write_address(&mut out)?;

        writeln!(
            out,
            "\nPayment method: {}",
            self.order.payment_method.wire_tag()
        )
        .map_err(|_err| SummaryError::Io)?;

        writeln!(out, "Total paid: {}", format_minor(self.order.total_amount))
            .map_err(|_err| SummaryError::Io)?;

        Ok(())
    }

    /// Render the summary to a string.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if the summary cannot be rendered.
    pub fn render(&self) -> Result<String, SummaryError> {
        let mut buffer = Vec::new();

        self.write_to(&mut buffer)?;

        String::from_utf8(buffer).map_err(|_err| SummaryError::Io)
    }

    fn write_address(&self, out: &mut impl io::Write) -> Result<(), SummaryError> {
        let address = &self.order.shipping_address;

        writeln!(out, "Deliver to: {}", address.full_name).map_err(|_err| SummaryError::Io)?;
        writeln!(out, "{}", address.address).map_err(|_err| SummaryError::Io)?;

        if !address.landmark.trim().is_empty() {
            writeln!(out, "Near {}", address.landmark).map_err(|_err| SummaryError::Io)?;
        }

        writeln!(
            out,
            "{}, {} {}",
            address.city, address.state, address.pincode
        )
        .map_err(|_err| SummaryError::Io)?;

        writeln!(out, "{} | {}", address.phone, address.email).map_err(|_err| SummaryError::Io)?;

        Ok(())
    }
}

/// Format minor currency units with two decimal places.
#[must_use]
pub fn format_minor(amount: u64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{checkout::form::ShippingForm, order::OrderItem, order::PaymentMethod};

    use super::*;

    fn order() -> Order {
        Order {
            order_id: "ord-42".to_owned(),
            payment_id: Some("pay-7".to_owned()),
            items: vec![OrderItem {
                product_id: "p-1".to_owned(),
                name: "Oxford Shirt".to_owned(),
                qty: 2,
                size: "M".to_owned(),
                color: "blue".to_owned(),
                price: 1999,
                image: String::new(),
            }],
            shipping_address: ShippingForm {
                full_name: "Asha Rao".to_owned(),
                email: "asha@example.com".to_owned(),
                phone: "9876543210".to_owned(),
                address: "14 Lake View Road".to_owned(),
                city: "Pune".to_owned(),
                state: "Maharashtra".to_owned(),
                pincode: "411001".to_owned(),
                landmark: "Blue Gate".to_owned(),
            },
            total_amount: 3998,
            payment_method: PaymentMethod::Online,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn format_minor_pads_two_places() {
        assert_eq!(format_minor(0), "0.00");
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(3998), "39.98");
    }

    #[test]
    fn summary_contains_order_items_and_address() -> TestResult {
        let order = order();
        let rendered = OrderSummary::new(&order).render()?;

        assert!(rendered.contains("Order ord-42"), "missing order id");
        assert!(rendered.contains("Payment pay-7"), "missing payment id");
        assert!(rendered.contains("Oxford Shirt"), "missing item name");
        assert!(rendered.contains("Asha Rao"), "missing recipient");
        assert!(rendered.contains("Near Blue Gate"), "missing landmark");
        assert!(rendered.contains("Total paid: 39.98"), "missing total");

        Ok(())
    }

    #[test]
    fn summary_omits_missing_payment_id_and_landmark() -> TestResult {
        let mut order = order();
        order.payment_id = None;
        order.shipping_address.landmark = String::new();
        order.payment_method = PaymentMethod::Cod;

        let rendered = OrderSummary::new(&order).render()?;

        assert!(!rendered.contains("Payment pay-7"), "unexpected payment line");
        assert!(!rendered.contains("Near "), "unexpected landmark line");
        assert!(rendered.contains("Payment method: COD"), "missing method");

        Ok(())
    }
}
