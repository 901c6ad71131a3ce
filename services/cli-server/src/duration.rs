//! Duration literal parsing for the command surface: `<int><unit>` segments,
//! optionally repeated (`1h30m`), with units `ns|us|ms|s|m|h`.

use chrono::Duration;
use pvz_common::{PvzError, PvzResult};

fn unit_nanos(unit: &str) -> Option<i64> {
    Some(match unit {
        "ns" => 1,
        "us" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60_000_000_000,
        "h" => 3_600_000_000_000,
        _ => return None,
    })
}

/// Parse a duration literal such as `1h30m` or `500ms` into a [`Duration`].
pub fn parse_duration(input: &str) -> PvzResult<Duration> {
    if input.is_empty() {
        return Err(PvzError::invalid_argument("duration must not be empty"));
    }

    let mut total_nanos: i64 = 0;
    let mut rest = input;

    while !rest.is_empty() {
        let digits_len = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(|| {
            PvzError::invalid_argument(format!("malformed duration literal: {input:?}"))
        })?;
        if digits_len == 0 {
            return Err(PvzError::invalid_argument(format!(
                "malformed duration literal: {input:?}"
            )));
        }
        let (digits, after_digits) = rest.split_at(digits_len);
        let value: i64 = digits
            .parse()
            .map_err(|_| PvzError::invalid_argument(format!("malformed duration literal: {input:?}")))?;

        let unit_len = after_digits
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(after_digits.len());
        let (unit, after_unit) = after_digits.split_at(unit_len);
        let nanos_per_unit = unit_nanos(unit)
            .ok_or_else(|| PvzError::invalid_argument(format!("unrecognized duration unit: {unit:?}")))?;

        total_nanos += value
            .checked_mul(nanos_per_unit)
            .ok_or_else(|| PvzError::invalid_argument("duration literal overflows"))?;
        rest = after_unit;
    }

    Ok(Duration::nanoseconds(total_nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_segment() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::milliseconds(500));
        assert_eq!(parse_duration("48h").unwrap(), Duration::hours(48));
    }

    #[test]
    fn parses_compound_segments() {
        assert_eq!(
            parse_duration("1h30m").unwrap(),
            Duration::hours(1) + Duration::minutes(30)
        );
    }

    #[test]
    fn rejects_missing_unit() {
        assert!(parse_duration("100").is_err());
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(parse_duration("10d").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_duration("").is_err());
    }
}
