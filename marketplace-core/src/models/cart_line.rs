//! Cart lines and cart totals.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ItemId;

/// One item/quantity pairing in a customer's cart.
///
/// A denormalized projection of an item plus the chosen quantity; the
/// server is the owner of the price and name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub item_id: ItemId,
    #[serde(rename = "item_name")]
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(item_id: ItemId, name: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            item_id,
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Price times quantity, rounded to cents.
    pub fn subtotal(&self) -> Decimal {
        round_money(self.price * Decimal::from(self.quantity))
    }
}

impl fmt::Display for CartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<24} {:>4} x ${:>8} = ${:>9}",
            self.item_id,
            self.name,
            self.quantity,
            round_money(self.price),
            self.subtotal()
        )
    }
}

/// Sum of price * quantity over all lines, rounded to 2 fractional digits.
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    let sum: Decimal = lines
        .iter()
        .map(|line| line.price * Decimal::from(line.quantity))
        .sum();
    round_money(sum)
}

fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_wire_names() {
        let line: CartLine = serde_json::from_str(
            r#"{"item_id": 1, "quantity": 2, "item_name": "Mug", "price": 10.0}"#,
        )
        .unwrap();
        assert_eq!(line.item_id, ItemId(1));
        assert_eq!(line.name, "Mug");
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_total_two_decimals() {
        let lines = vec![CartLine::new(ItemId(1), "Mug", Decimal::new(1000, 2), 2)];
        assert_eq!(cart_total(&lines).to_string(), "20.00");
    }

    #[test]
    fn test_total_empty_is_zero() {
        assert_eq!(cart_total(&[]).to_string(), "0.00");
    }

    #[test]
    fn test_total_rounds_half_away_from_zero() {
        let lines = vec![
            CartLine::new(ItemId(1), "a", Decimal::new(3335, 3), 1),
            CartLine::new(ItemId(2), "b", Decimal::new(1999, 2), 3),
        ];
        // 3.335 + 59.97 = 63.305
        assert_eq!(cart_total(&lines).to_string(), "63.31");
    }

    #[test]
    fn test_subtotal() {
        let line = CartLine::new(ItemId(3), "Pen", Decimal::new(125, 2), 4);
        assert_eq!(line.subtotal().to_string(), "5.00");
    }
}
