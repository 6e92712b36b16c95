use chrono::Duration;

use crate::error::{CoreError, CoreResult};

const HOUR_TOKENS: [&str; 3] = ["hour", "hr", "h"];
const MINUTE_TOKENS: [&str; 3] = ["minute", "min", "m"];
const SECOND_TOKENS: [&str; 3] = ["second", "sec", "s"];

/// Parses loosely written durations such as `5min`, `1h`, `30 seconds` or `90`.
///
/// Only the first run of digits is used. The unit is found by substring search where hours win
/// over minutes and minutes win over seconds. Text without any unit is read as minutes.
pub fn parse_duration(text: &str) -> CoreResult<Duration> {
    let malformed = || CoreError::MalformedDuration(text.to_string());

    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return Err(malformed());
    }
    let value = digits.parse::<i64>().map_err(|_| malformed())?;

    let lowered = text.trim().to_lowercase();
    let contains_any = |tokens: &[&str]| tokens.iter().any(|token| lowered.contains(token));

    let duration = if contains_any(&HOUR_TOKENS) {
        Duration::try_hours(value)
    } else if contains_any(&MINUTE_TOKENS) {
        Duration::try_minutes(value)
    } else if contains_any(&SECOND_TOKENS) {
        Duration::try_seconds(value)
    } else {
        Duration::try_minutes(value)
    };

    duration.ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::Duration;

    use crate::error::CoreError;

    use super::parse_duration;

    #[test]
    fn test_parse_duration_units() -> Result<()> {
        assert_eq!(parse_duration("5min")?, Duration::minutes(5));
        assert_eq!(parse_duration("1h")?, Duration::hours(1));
        assert_eq!(parse_duration("2 hours")?, Duration::hours(2));
        assert_eq!(parse_duration("3hr")?, Duration::hours(3));
        assert_eq!(parse_duration("45 Seconds")?, Duration::seconds(45));
        assert_eq!(parse_duration("10 sec")?, Duration::seconds(10));
        assert_eq!(parse_duration("12 minutes")?, Duration::minutes(12));
        Ok(())
    }

    #[test]
    fn test_parse_duration_defaults_to_minutes() -> Result<()> {
        assert_eq!(parse_duration("90")?, Duration::minutes(90));
        assert_eq!(parse_duration("  7  ")?, Duration::minutes(7));
        assert_eq!(parse_duration("0")?, Duration::zero());
        Ok(())
    }

    #[test]
    fn test_parse_duration_uses_first_digit_run() -> Result<()> {
        assert_eq!(parse_duration("15min or 20min")?, Duration::minutes(15));
        Ok(())
    }

    #[test]
    fn test_parse_duration_hours_take_precedence() -> Result<()> {
        // "h" beats the "m" in "hm"
        assert_eq!(parse_duration("1hm")?, Duration::hours(1));
        Ok(())
    }

    #[test]
    fn test_parse_duration_without_digits() {
        assert!(matches!(
            parse_duration("some minutes"),
            Err(CoreError::MalformedDuration(_))
        ));
        assert!(matches!(
            parse_duration(""),
            Err(CoreError::MalformedDuration(_))
        ));
    }

    #[test]
    fn test_parse_duration_overflow() {
        assert!(parse_duration("99999999999999999999h").is_err());
    }
}
