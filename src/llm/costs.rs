//! Per-token pricing table for cost logging.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// (input, output) USD per token for a model.
///
/// Unknown models cost zero — cost logging is informational, never a gate.
pub(crate) fn for_model(model: &str) -> (Decimal, Decimal) {
    // Order matters: "gpt-4o-mini" must match before "gpt-4o".
    if model.starts_with("gpt-4o-mini") {
        (dec!(0.000_000_15), dec!(0.000_000_6))
    } else if model.starts_with("gpt-4o") {
        (dec!(0.000_002_5), dec!(0.000_01))
    } else if model.starts_with("gpt-4.1-mini") {
        (dec!(0.000_000_4), dec!(0.000_001_6))
    } else if model.starts_with("gpt-4.1") {
        (dec!(0.000_002), dec!(0.000_008))
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mini_matches_before_base_model() {
        let (input, _) = for_model("gpt-4o-mini");
        assert_eq!(input, dec!(0.000_000_15));

        let (input, _) = for_model("gpt-4o");
        assert_eq!(input, dec!(0.000_002_5));
    }

    #[test]
    fn unknown_model_costs_zero() {
        let (input, output) = for_model("some-local-model");
        assert_eq!(input, Decimal::ZERO);
        assert_eq!(output, Decimal::ZERO);
    }
}
