//! Shopping cart owned by one browsing session.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{CatalogItem, ItemId, ItemKind, OrderLine},
    money::format_amount,
};

/// What the catalog hands to the cart when a customer clicks "add".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub item_id: ItemId,
    pub name: String,
    pub unit_price: Decimal,
    pub kind: ItemKind,
}

impl From<&CatalogItem> for CartEntry {
    fn from(item: &CatalogItem) -> Self {
        Self {
            item_id: item.item_id,
            name: item.name.clone(),
            unit_price: item.unit_price,
            kind: item.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub item_id: ItemId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub kind: ItemKind,
}

impl CartLineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Lines keep first-added order. Invariants: one line per `item_id`, and no
/// line ever holds quantity zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, item_id: ItemId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.item_id == item_id)
    }

    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |count, line| count.saturating_add(line.quantity))
    }

    pub fn add_item(&mut self, entry: CartEntry) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == entry.item_id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }
        self.lines.push(CartLineItem {
            item_id: entry.item_id,
            name: entry.name,
            unit_price: entry.unit_price,
            quantity: 1,
            kind: entry.kind,
        });
    }

    /// Unknown ids are ignored: a pending update may race a removal.
    pub fn update_quantity(&mut self, item_id: ItemId, new_quantity: u32) {
        if new_quantity == 0 {
            self.remove_item(item_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item_id) {
            line.quantity = new_quantity;
        }
    }

    pub fn remove_item(&mut self, item_id: ItemId) {
        self.lines.retain(|line| line.item_id != item_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |total, line| total.saturating_add(line.line_total()))
    }

    pub fn format_checkout_message(&self, notes: Option<&str>) -> String {
        let mut lines: Vec<String> = self
            .lines
            .iter()
            .map(|line| {
                format!(
                    "{}x {} (${})",
                    line.quantity,
                    line.name,
                    format_amount(line.line_total())
                )
            })
            .collect();
        lines.push(String::new());
        lines.push(format!("Total: ${}", format_amount(self.total())));
        if let Some(notes) = notes.filter(|n| !n.is_empty()) {
            lines.push(format!("Notas: {notes}"));
        }
        lines.join("\n")
    }

    pub fn to_order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|line| OrderLine {
                name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
