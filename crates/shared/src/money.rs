use rust_decimal::{Decimal, RoundingStrategy};

/// Renders an amount with exactly two decimals, rounding half away from zero.
/// Only presentation code rounds; arithmetic stays at full precision.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pads_whole_amounts() {
        assert_eq!(format_amount(Decimal::from(20)), "20.00");
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
    }

    #[test]
    fn rounds_midpoint_up() {
        let amount = Decimal::from_str("10.005").expect("decimal");
        assert_eq!(format_amount(amount), "10.01");
        let amount = Decimal::from_str("89.994").expect("decimal");
        assert_eq!(format_amount(amount), "89.99");
    }
}
