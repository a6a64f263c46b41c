//! Sampling frequency and duration strings (`"15s"`, `"1m"`, `"500ms"`).

use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};

/// Parse a duration string.
///
/// Accepts `ms`, `s`, `m`/`min`, `h` and `d` suffixes (case-insensitive);
/// a bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_ascii_lowercase();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix("min").or_else(|| s.strip_suffix('m')) {
        scaled(mins, 60)
    } else if let Some(hours) = s.strip_suffix('h') {
        scaled(hours, 3600)
    } else if let Some(days) = s.strip_suffix('d') {
        scaled(days, 86_400)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// `n` units of `unit` seconds; `None` on overflow.
fn scaled(n: &str, unit: u64) -> Option<Duration> {
    n.trim()
        .parse::<u64>()
        .ok()?
        .checked_mul(unit)
        .map(Duration::from_secs)
}

/// Resolve a sampling frequency to whole seconds.
///
/// The time axis is kept in epoch seconds, so sub-second frequencies are
/// rejected along with zero and unparseable values.
pub fn freq_secs(freq: &str) -> PipelineResult<i64> {
    let duration = parse_duration(freq).ok_or_else(|| {
        PipelineError::InvalidParameter(format!("unparseable frequency {freq:?}"))
    })?;
    if duration.subsec_nanos() != 0 || duration.as_secs() == 0 {
        return Err(PipelineError::InvalidParameter(format!(
            "frequency {freq:?} must be a whole number of seconds greater than zero"
        )));
    }
    i64::try_from(duration.as_secs()).map_err(|_| {
        PipelineError::InvalidParameter(format!("frequency {freq:?} is out of range"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds() {
        assert_eq!(parse_duration("15s"), Some(Duration::from_secs(15)));
        assert_eq!(parse_duration("10S"), Some(Duration::from_secs(10)));
    }

    #[test]
    fn parse_duration_milliseconds() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
    }

    #[test]
    fn parse_duration_minutes_and_hours() {
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("5min"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn parse_duration_plain_number_as_seconds() {
        assert_eq!(parse_duration("10"), Some(Duration::from_secs(10)));
    }

    #[test]
    fn parse_duration_garbage() {
        assert_eq!(parse_duration("fast"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn freq_secs_rejects_zero_and_subsecond() {
        assert_eq!(freq_secs("15s").unwrap(), 15);
        assert!(freq_secs("0s").is_err());
        assert!(freq_secs("500ms").is_err());
        assert!(freq_secs("soon").is_err());
    }

    #[test]
    fn parse_duration_overflow_is_none() {
        assert_eq!(parse_duration("307445734561825862m"), None);
        assert_eq!(parse_duration("18446744073709551615h"), None);
        assert_eq!(parse_duration("999999999999999999d"), None);
    }

    #[test]
    fn freq_secs_rejects_values_beyond_i64() {
        assert!(matches!(
            freq_secs("18446744073709551615s"),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert_eq!(freq_secs("9223372036854775807s").unwrap(), i64::MAX);
    }
}
