// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Duration text form: `[Nd][Nh][Nm][Ns]`, components in that order

use crate::error::ParseError;
use chrono::TimeDelta;

const UNITS: [(char, i64); 4] = [('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// Parse a duration such as `1d2h`, `90s` or `0s`
pub fn parse_duration(text: &str) -> Result<TimeDelta, ParseError> {
    let invalid = || ParseError::InvalidDuration(text.to_string());
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid());
    }

    let mut rest = text;
    let mut seconds: i64 = 0;
    let mut next_unit = 0;
    while !rest.is_empty() {
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return Err(invalid());
        }
        let (number, tail) = rest.split_at(digits);
        let unit = tail.chars().next().ok_or_else(invalid)?;
        let position = UNITS[next_unit..]
            .iter()
            .position(|(u, _)| *u == unit)
            .ok_or_else(invalid)?;
        let (_, scale) = UNITS[next_unit + position];
        next_unit += position + 1;

        let n: i64 = number.parse().map_err(|_| invalid())?;
        seconds = n
            .checked_mul(scale)
            .and_then(|s| seconds.checked_add(s))
            .ok_or_else(invalid)?;
        rest = &tail[unit.len_utf8()..];
    }

    TimeDelta::try_seconds(seconds).ok_or_else(invalid)
}

/// Format a duration in canonical form, `0s` when zero
///
/// Sub-second precision is dropped.
pub fn format_duration(duration: &TimeDelta) -> String {
    let mut remaining = duration.num_seconds().max(0);
    if remaining == 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    for (unit, scale) in UNITS {
        let n = remaining / scale;
        if n > 0 {
            out.push_str(&n.to_string());
            out.push(unit);
        }
        remaining %= scale;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        seconds = { "30s", 30 },
        minute = { "1m", 60 },
        mixed = { "1d2h3m4s", 93_784 },
        hours_seconds = { "2h5s", 7_205 },
        zero = { "0s", 0 },
    )]
    fn parses(text: &str, seconds: i64) {
        assert_eq!(parse_duration(text).unwrap(), TimeDelta::seconds(seconds));
    }

    #[parameterized(
        empty = { "" },
        no_unit = { "30" },
        no_number = { "s" },
        out_of_order = { "1s1m" },
        repeated_unit = { "1m1m" },
        unknown_unit = { "3w" },
        negative = { "-5s" },
    )]
    fn rejects(text: &str) {
        assert!(matches!(
            parse_duration(text),
            Err(ParseError::InvalidDuration(_))
        ));
    }

    #[parameterized(
        zero = { 0, "0s" },
        minute = { 60, "1m" },
        ninety = { 90, "1m30s" },
        day_and_second = { 86_401, "1d1s" },
    )]
    fn formats_canonically(seconds: i64, text: &str) {
        assert_eq!(format_duration(&TimeDelta::seconds(seconds)), text);
    }

    #[test]
    fn non_canonical_input_normalizes() {
        let d = parse_duration("90s").unwrap();
        assert_eq!(format_duration(&d), "1m30s");
    }
}
