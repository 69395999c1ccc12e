//! Checked fixed-point helpers

use num_bigint::BigUint;

use crate::Amount;

/// `a * b / denominator`, rounding down.
///
/// Returns `None` on a zero denominator or when the quotient does not fit.
/// Products of two large 18-decimal amounts are computed at full width.
pub fn mul_div(a: Amount, b: Amount, denominator: Amount) -> Option<Amount> {
    if denominator == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / denominator);
    }
    let quotient = BigUint::from(a) * BigUint::from(b) / BigUint::from(denominator);
    Amount::try_from(&quotient).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PRECISION, UNIT};

    #[test]
    fn test_simple() {
        assert_eq!(mul_div(10, 3, 4), Some(7));
        assert_eq!(mul_div(0, 3, 4), Some(0));
        assert_eq!(mul_div(1, 1, 0), None);
    }

    #[test]
    fn test_fee_growth_precision() {
        // one token spread across six tokens of supply
        let growth = mul_div(UNIT, PRECISION, 6 * UNIT).unwrap();
        assert_eq!(growth, 166_666_666_666);
        let owed = mul_div(growth, 6 * UNIT, PRECISION).unwrap();
        assert_eq!(owed, 999_999_999_996_000_000);
    }

    #[test]
    fn test_wide_product() {
        let big = u128::MAX / 2;
        assert_eq!(mul_div(big, 4, 4), Some(big));
        assert_eq!(mul_div(big, 4, 1), None);
    }

    #[test]
    fn test_product_of_two_large_amounts() {
        // 10 units against a 1000-unit reserve over 300 units of supply
        let weight = mul_div(10 * UNIT, 1_000 * UNIT, 300 * UNIT).unwrap();
        assert_eq!(weight, 33_333_333_333_333_333_333);
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
    }
}
