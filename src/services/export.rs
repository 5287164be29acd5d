//! CSV rendering of placed orders.

use std::fmt::Write;

use crate::models::order::Order;

pub const ORDERS_CSV_HEADER: &str = "order_id,username,total,order_date,products";

/// One row per order: id, owner, formatted total, timestamp, product summary.
#[must_use]
pub fn orders_to_csv(orders: &[Order]) -> String {
    let mut csv = String::from(ORDERS_CSV_HEADER);
    csv.push('\n');

    for order in orders {
        let username = if order.username.is_empty() {
            "N/A"
        } else {
            order.username.as_str()
        };

        let _ = writeln!(
            csv,
            "{},{},{},{},{}",
            order.id,
            csv_field(username),
            csv_field(&order.total_amount.formatted()),
            csv_field(&display_timestamp(&order.created_at)),
            csv_field(&order.product_summary()),
        );
    }

    csv
}

/// `YYYY-MM-DD HH:MM:SS` for an RFC 3339 timestamp; anything else is passed through.
fn display_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| raw.to_string(),
        |ts| ts.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
