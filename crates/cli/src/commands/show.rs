//! Single customer output.

use std::io::{self, Write};

use rubico_app::wizard::SAME_AS_BILLING;
use rubico_core::{Customer, Field};

/// Print every field of `customer`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn print_customer(customer: &Customer, out: &mut impl Write) -> io::Result<()> {
    let shipping = if customer.shipping_same_as_billing {
        SAME_AS_BILLING
    } else {
        customer.shipping_address.as_deref().unwrap_or("-")
    };

    let rows = [
        ("ID", customer.id.as_str()),
        (Field::FullName.label(), customer.full_name.as_str()),
        (
            Field::Email.label(),
            customer.email.as_ref().map_or("-", |e| e.as_str()),
        ),
        (
            Field::Phone.label(),
            customer.phone.as_ref().map_or("-", |p| p.as_str()),
        ),
        (Field::BillingAddress.label(), customer.billing_address.as_str()),
        (Field::ShippingAddress.label(), shipping),
    ];
    for (label, value) in rows {
        writeln!(out, "{label:<18}{value}")?;
    }
    writeln!(
        out,
        "{:<18}{}",
        "Created",
        customer.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}
