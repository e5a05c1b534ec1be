//! Timestamp normalization.
//!
//! `systemctl show` reports activation times in several encodings depending
//! on version and unit state: epoch microseconds, RFC 3339, or one of a few
//! human-readable layouts. Normalization tries an ordered list of pure
//! parse strategies and, only when all of them fail, re-derives the instant
//! from the verbose `systemctl status` output. Unresolvable timestamps are
//! never an error; they come back as `None`.

use crate::executor::CommandExecutor;
use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

type ParseStrategy = fn(&str) -> Option<DateTime<Utc>>;

/// Ordered strategies for `systemctl show` values; first success wins.
const SHOW_STRATEGIES: &[ParseStrategy] = &[parse_epoch_micros, parse_rfc3339, parse_show_textual];

/// Textual layouts seen in `show` output, in matching order. Order matters:
/// some layouts are prefixes of others.
const SHOW_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S%.3fZ",
];

fn parse_epoch_micros(raw: &str) -> Option<DateTime<Utc>> {
    let micros: i64 = raw.parse().ok()?;
    if micros <= 0 {
        return None;
    }
    DateTime::from_timestamp_micros(micros)
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn parse_show_textual(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(instant) = parse_day_date_zone(raw) {
        return Some(instant);
    }
    for format in SHOW_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(t.and_utc());
        }
    }
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%:z")
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// `Mon 2024-01-15 10:30:00 UTC`. chrono cannot parse `%Z` zone
/// abbreviations, so the trailing zone token is stripped and the remainder
/// taken as UTC.
fn parse_day_date_zone(raw: &str) -> Option<DateTime<Utc>> {
    let (head, zone) = raw.rsplit_once(' ')?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    NaiveDateTime::parse_from_str(head, "%a %Y-%m-%d %H:%M:%S")
        .ok()
        .map(|t| t.and_utc())
}

/// Layouts seen after `since ` in `systemctl status` lines, in matching
/// order. Two of them carry no year; see [`parse_month_day_time`].
fn parse_status_textual(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(instant) = parse_day_date_zone(raw) {
        return Some(instant);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%a %b %e %H:%M:%S %Y") {
        return Some(t.and_utc());
    }
    parse_month_day_time(raw)
}

/// `Jan 2 15:04:05` carries no year. The year is pinned to 1970 instead of
/// guessing the current one; the ambiguity across year boundaries is an
/// accepted precision limitation of this source.
fn parse_month_day_time(raw: &str) -> Option<DateTime<Utc>> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, raw, StrftimeItems::new("%b %e %H:%M:%S")).ok()?;
    parsed.set_year(1970).ok()?;
    parsed
        .to_naive_datetime_with_offset(0)
        .ok()
        .map(|t| t.and_utc())
}

/// Converts raw timestamp strings into canonical instants, falling back to a
/// secondary `systemctl status` query when no encoding matches.
pub struct TimestampNormalizer {
    executor: Arc<dyn CommandExecutor>,
}

impl TimestampNormalizer {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }

    /// Normalize a raw timestamp value for the named service.
    ///
    /// Empty and `"0"` values are the never-started sentinel and short-circuit
    /// all parsing. The service name is used only for the secondary query.
    pub async fn normalize(&self, raw: &str, service: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "0" {
            return None;
        }

        for strategy in SHOW_STRATEGIES {
            if let Some(instant) = strategy(raw) {
                return Some(instant);
            }
        }

        debug!("unrecognized timestamp {raw:?} for {service}, trying verbose status");
        self.since_from_verbose_status(service).await
    }

    /// Issue the verbose status query and scan its `Active:` line for the
    /// `since ` marker. Any failure along the way yields `None`.
    async fn since_from_verbose_status(&self, service: &str) -> Option<DateTime<Utc>> {
        let output = match self
            .executor
            .run("systemctl", &["status", service, "--no-pager", "-l"])
            .await
        {
            Ok(output) => output,
            Err(err) => {
                warn!("verbose status query for {service} failed: {err}");
                return None;
            }
        };

        for line in output.stdout.lines() {
            let Some(rest) = line.trim_start().strip_prefix("Active:") else {
                continue;
            };
            let Some(index) = rest.find("since ") else {
                continue;
            };
            // systemd appends a relative age ("; 2h 3min ago") after the
            // absolute time.
            let tail = &rest[index + "since ".len()..];
            let tail = tail.split(';').next().unwrap_or(tail).trim();
            if let Some(instant) = parse_status_textual(tail) {
                return Some(instant);
            }
        }

        debug!("could not determine activation time for {service}");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::MockExecutor;
    use chrono::{TimeZone, Timelike};

    fn normalizer(mock: MockExecutor) -> (TimestampNormalizer, Arc<MockExecutor>) {
        let executor = Arc::new(mock);
        (TimestampNormalizer::new(executor.clone()), executor)
    }

    #[tokio::test]
    async fn empty_and_zero_are_absent_without_any_query() {
        let (normalizer, executor) = normalizer(MockExecutor::new());
        assert_eq!(normalizer.normalize("", "nginx").await, None);
        assert_eq!(normalizer.normalize("0", "nginx").await, None);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn epoch_microseconds_round_trip_exactly() {
        let (normalizer, _) = normalizer(MockExecutor::new());
        let micros = 1_700_000_123_456_789_i64;
        let instant = normalizer
            .normalize(&micros.to_string(), "nginx")
            .await
            .unwrap();
        assert_eq!(instant.timestamp_micros(), micros);
    }

    #[tokio::test]
    async fn negative_integer_is_not_an_instant() {
        let mock = MockExecutor::new()
            .on_failure("systemctl status nginx --no-pager -l", "no such unit");
        let (normalizer, _) = normalizer(mock);
        assert_eq!(normalizer.normalize("-5", "nginx").await, None);
    }

    #[tokio::test]
    async fn rfc3339_with_and_without_subseconds() {
        let (normalizer, _) = normalizer(MockExecutor::new());
        let plain = normalizer
            .normalize("2024-01-15T10:30:00+01:00", "nginx")
            .await
            .unwrap();
        assert_eq!(plain, Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap());

        let nanos = normalizer
            .normalize("2024-01-15T10:30:00.123456789Z", "nginx")
            .await
            .unwrap();
        assert_eq!(nanos.nanosecond(), 123_456_789);
    }

    #[tokio::test]
    async fn day_date_zone_layout_is_taken_as_utc() {
        let (normalizer, _) = normalizer(MockExecutor::new());
        let instant = normalizer
            .normalize("Mon 2024-01-15 10:30:00 UTC", "nginx")
            .await
            .unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn bare_date_time_layout_parses() {
        let (normalizer, _) = normalizer(MockExecutor::new());
        let instant = normalizer
            .normalize("2024-01-15 10:30:00", "nginx")
            .await
            .unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn unparseable_value_falls_back_to_verbose_status_exactly_once() {
        let mock =
            MockExecutor::new().on_failure("systemctl status redis --no-pager -l", "boom");
        let (normalizer, executor) = normalizer(mock);
        assert_eq!(normalizer.normalize("garbage", "redis").await, None);
        assert_eq!(executor.call_count("systemctl status redis"), 1);
    }

    #[tokio::test]
    async fn verbose_status_since_line_resolves_the_instant() {
        let stdout = "\u{25cf} redis.service - Advanced key-value store\n\
             Loaded: loaded (/lib/systemd/system/redis.service; enabled)\n\
             Active: active (running) since Mon 2024-01-15 10:30:00 UTC; 2h 3min ago\n";
        let mock =
            MockExecutor::new().on_success("systemctl status redis --no-pager -l", stdout);
        let (normalizer, _) = normalizer(mock);
        let instant = normalizer.normalize("garbage", "redis").await.unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn verbose_status_without_since_marker_is_absent() {
        let stdout = "Active: inactive (dead)\n";
        let mock =
            MockExecutor::new().on_success("systemctl status cron --no-pager -l", stdout);
        let (normalizer, _) = normalizer(mock);
        assert_eq!(normalizer.normalize("garbage", "cron").await, None);
    }

    #[test]
    fn yearless_status_layout_is_pinned_to_1970() {
        let instant = parse_status_textual("Jan 2 15:04:05").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(1970, 1, 2, 15, 4, 5).unwrap());
    }

    #[test]
    fn status_layout_with_year_parses_fully() {
        let instant = parse_status_textual("Mon Jan 15 10:30:00 2024").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }
}
