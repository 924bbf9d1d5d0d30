use super::*;
use std::str::FromStr;

fn price(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("decimal")
}

fn widget() -> CartEntry {
    CartEntry {
        item_id: ItemId(1),
        name: "Widget".into(),
        unit_price: price("10.00"),
        kind: ItemKind::Product,
    }
}

fn consulting() -> CartEntry {
    CartEntry {
        item_id: ItemId(2),
        name: "Consulting".into(),
        unit_price: price("50.00"),
        kind: ItemKind::Service,
    }
}

#[test]
fn adding_same_item_twice_merges_lines() {
    let mut cart = Cart::new();
    cart.add_item(widget());
    cart.add_item(widget());

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.lines()[0].quantity, 2);
    assert_eq!(cart.total(), price("20.00"));
}

#[test]
fn new_items_append_in_first_added_order() {
    let mut cart = Cart::new();
    cart.add_item(consulting());
    cart.add_item(widget());
    cart.add_item(consulting());

    let ids: Vec<_> = cart.lines().iter().map(|line| line.item_id).collect();
    assert_eq!(ids, vec![ItemId(2), ItemId(1)]);
    assert_eq!(cart.item_count(), 3);
}

#[test]
fn zero_quantity_removes_the_line() {
    let mut cart = Cart::new();
    cart.add_item(widget());
    cart.update_quantity(ItemId(1), 3);
    assert_eq!(cart.line(ItemId(1)).map(|l| l.quantity), Some(3));

    cart.update_quantity(ItemId(1), 0);
    assert!(cart.is_empty());
}

#[test]
fn add_then_zero_matches_never_adding() {
    let mut cart = Cart::new();
    cart.add_item(consulting());
    let before = cart.clone();

    cart.add_item(widget());
    cart.update_quantity(ItemId(1), 0);
    assert_eq!(cart, before);
}

#[test]
fn stale_references_are_ignored() {
    let mut cart = Cart::new();
    cart.add_item(widget());
    let before = cart.clone();

    cart.update_quantity(ItemId(99), 4);
    cart.remove_item(ItemId(99));
    assert_eq!(cart, before);
}

#[test]
fn removing_twice_equals_removing_once() {
    let mut cart = Cart::new();
    cart.add_item(widget());
    cart.add_item(consulting());

    cart.remove_item(ItemId(1));
    let once = cart.clone();
    cart.remove_item(ItemId(1));
    assert_eq!(cart, once);
    assert_eq!(cart.lines()[0].item_id, ItemId(2));
}

#[test]
fn total_keeps_full_precision_until_formatting() {
    let mut cart = Cart::new();
    cart.add_item(CartEntry {
        item_id: ItemId(7),
        name: "Tornillo".into(),
        unit_price: price("0.005"),
        kind: ItemKind::Product,
    });
    cart.update_quantity(ItemId(7), 3);

    assert_eq!(cart.total(), price("0.015"));
    assert!(cart.format_checkout_message(None).ends_with("Total: $0.02"));
}

#[test]
fn checkout_message_lists_lines_total_and_notes() {
    let mut cart = Cart::new();
    cart.add_item(widget());
    cart.add_item(widget());
    cart.add_item(consulting());

    let message = cart.format_checkout_message(Some("Deliver after 5pm"));
    let lines: Vec<_> = message.lines().collect();
    assert_eq!(
        lines,
        vec![
            "2x Widget ($20.00)",
            "1x Consulting ($50.00)",
            "",
            "Total: $70.00",
            "Notas: Deliver after 5pm",
        ]
    );
}

#[test]
fn empty_notes_are_omitted() {
    let mut cart = Cart::new();
    cart.add_item(widget());

    let without = cart.format_checkout_message(None);
    assert_eq!(cart.format_checkout_message(Some("")), without);
    assert_eq!(without, "1x Widget ($10.00)\n\nTotal: $10.00");
}

#[test]
fn order_lines_mirror_cart_lines() {
    let mut cart = Cart::new();
    cart.add_item(consulting());
    cart.update_quantity(ItemId(2), 2);

    let lines = cart.to_order_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].line_total(), price("100.00"));
}

#[test]
fn huge_quantities_and_prices_never_panic() {
    let mut cart = Cart::new();
    cart.add_item(CartEntry {
        unit_price: Decimal::MAX,
        ..widget()
    });
    cart.add_item(consulting());
    cart.update_quantity(ItemId(1), 2);
    cart.update_quantity(ItemId(2), u32::MAX);
    cart.add_item(consulting());

    assert_eq!(cart.line(ItemId(2)).map(|l| l.quantity), Some(u32::MAX));
    assert_eq!(cart.item_count(), u32::MAX);
    assert_eq!(cart.total(), Decimal::MAX);
}
