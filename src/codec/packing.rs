//! Decimal packing shared by every numeric frame field.
//!
//! The device reconstructs a value as `whole + dec / 10`, so packing has to
//! round to exactly one decimal place. Rounding is done on the decimal digits
//! of the value (the shortest representation that round-trips through `f64`)
//! rather than on the binary float, which keeps halfway cases such as `0.05`
//! and `2.25` rounding away from zero as written.

/// Magnitude of `x` in tenths, rounded half away from zero.
///
/// Returns `None` for NaN and infinities. Integer parts beyond `u64` range
/// saturate.
fn tenths(x: f64) -> Option<u64> {
    if !x.is_finite() {
        return None;
    }

    // `Display` for f64 never uses exponent notation.
    let text = format!("{}", x.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let whole = int_part.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    });

    let mut frac = frac_part.bytes().map(|b| b - b'0');
    let first = frac.next().unwrap_or(0);
    let round_up = frac.next().is_some_and(|d| d >= 5);

    Some(
        whole
            .saturating_mul(10)
            .saturating_add(u64::from(first))
            .saturating_add(u64::from(round_up)),
    )
}

/// Round to one decimal place, halfway cases away from zero.
///
/// NaN and infinities are returned unchanged.
pub fn round_half_away_from_zero_1dp(x: f64) -> f64 {
    match tenths(x) {
        Some(t) => {
            let magnitude = t as f64 / 10.0;
            if x.is_sign_negative() { -magnitude } else { magnitude }
        }
        None => x,
    }
}

/// Pack a non-negative percentage or temperature into `(whole, dec)` bytes.
///
/// `whole` wraps modulo 256; `dec` is always in `0..=9`. Negative and
/// non-finite inputs pack as `(0, 0)`.
pub fn pack_decimal(x: f64) -> (u8, u8) {
    if x.is_sign_negative() {
        return (0, 0);
    }
    let Some(t) = tenths(x) else {
        return (0, 0);
    };
    ((t / 10 % 256) as u8, (t % 10) as u8)
}

/// Round a per-core utilisation to a whole percent in `0..=100`.
///
/// Halfway cases round away from zero; NaN counts as idle.
pub fn round_percent(x: f64) -> u8 {
    if x.is_nan() {
        return 0;
    }
    x.round().clamp(0.0, 100.0) as u8
}
