//! Duration strings in the `1h30m` / `300ms` / `1.5s` style.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Unit suffixes and their size in nanoseconds
const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", NANOS_PER_SEC),
    ("m", 60 * NANOS_PER_SEC),
    ("h", 3_600 * NANOS_PER_SEC),
];

/// Fraction digits beyond this are ignored
const MAX_FRACTION_DIGITS: usize = 18;

/// Parse a duration made of one or more `<number><unit>` pairs.
///
/// A bare `0` is accepted. Signs other than a leading `+` are rejected, the
/// error string describes what is wrong with the input.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }
    if trimmed.starts_with('-') {
        return Err("negative durations are not allowed".to_string());
    }

    let mut rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(stripped) => split_digits(stripped),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(format!("expected a number at {rest:?}"));
        }

        let unit_end = after.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_end);
        if unit.is_empty() {
            return Err(format!("missing unit after {whole}{}", if fraction.is_empty() { "" } else { "." }));
        }
        let scale = UNITS
            .iter()
            .find(|(suffix, _)| *suffix == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| format!("unknown unit {unit:?}"))?;

        let overflow = || "duration is too large".to_string();

        if !whole.is_empty() {
            let value: u128 = whole.parse().map_err(|_| overflow())?;
            total = value
                .checked_mul(scale)
                .and_then(|nanos| total.checked_add(nanos))
                .ok_or_else(overflow)?;
        }

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let value: u128 = digits.parse().map_err(|_| overflow())?;
            let nanos = value * scale / 10u128.pow(digits.len() as u32);
            total = total.checked_add(nanos).ok_or_else(overflow)?;
        }

        rest = after;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| "duration is too large".to_string())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

fn split_digits(input: &str) -> (&str, &str) {
    let end = input.find(|c: char| !c.is_ascii_digit()).unwrap_or(input.len());
    input.split_at(end)
}
