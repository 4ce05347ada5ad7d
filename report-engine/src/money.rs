//! Money helpers using rust_decimal for precision
//!
//! All monetary values are rounded to 2 decimal places, midpoint away
//! from zero, after every arithmetic step — not only at output. Two
//! runs over the same inputs must produce byte-identical totals, so the
//! rounding lives here as a single operation every accumulation goes
//! through.

use rust_decimal::prelude::*;

/// Monetary precision (2 decimal places, half away from zero)
pub const DECIMAL_PLACES: u32 = 2;

/// Convert a raw f64 amount to Decimal for calculation.
///
/// Raw payload fields are plain floats; a non-finite value is treated
/// as zero like any other missing numeric field.
#[inline]
pub fn dec(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary input, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round to monetary precision
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounded division that degenerates to zero on a zero divisor.
///
/// A zero shared rate must never fault; local-only fields simply
/// convert to zero foreign value.
#[inline]
pub fn ratio(numerator: Decimal, divisor: Decimal) -> Decimal {
    if divisor.is_zero() {
        Decimal::ZERO
    } else {
        round2(numerator / divisor)
    }
}

/// Convert a Decimal back to f64 for display, rounded to 2dp
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round2(value)
        .to_f64()
        // SAFETY: any Decimal rounded to 2dp is within f64 range
        .expect("Decimal rounded to 2dp is always representable as f64")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_midpoint_away_from_zero() {
        assert_eq!(round2(dec(2.345)), dec(2.35));
        assert_eq!(round2(dec(-2.345)), dec(-2.35));
        assert_eq!(round2(dec(2.344)), dec(2.34));
    }

    #[test]
    fn accumulation_is_exact() {
        // Classic floating point trap: 0.1 + 0.2 != 0.3
        let sum = dec(0.1) + dec(0.2);
        assert_eq!(to_f64(sum), 0.3);

        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total = round2(total + dec(0.01));
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn zero_divisor_degenerates_to_zero() {
        assert_eq!(ratio(dec(42.0), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ratio(dec(10.0), dec(4.0)), dec(2.5));
    }

    #[test]
    fn non_finite_input_is_zero() {
        assert_eq!(dec(f64::NAN), Decimal::ZERO);
        assert_eq!(dec(f64::INFINITY), Decimal::ZERO);
    }
}
