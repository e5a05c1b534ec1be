//! The uniform status record and the `systemctl show` key=value parser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of one monitored service unit, produced fresh on every query and
/// never mutated after construction. A failed query still yields a fully
/// populated record via [`ServiceStatus::degraded`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub load_state: String,
    pub active_state: String,
    pub sub_state: String,
    /// Activation instant; `None` means the service was never activated or
    /// its activation time could not be determined by any strategy.
    pub since: Option<DateTime<Utc>>,
    pub description: String,
}

impl ServiceStatus {
    /// Sentinel record substituted when the status query itself failed.
    pub fn degraded(name: &str, cause: impl fmt::Display) -> Self {
        Self {
            name: name.to_string(),
            load_state: "error".to_string(),
            active_state: "unknown".to_string(),
            sub_state: "unknown".to_string(),
            since: None,
            description: format!("Error: {cause}"),
        }
    }
}

/// Raw fields extracted from `systemctl show` output, before the activation
/// timestamp has been resolved.
#[derive(Debug, Default, PartialEq)]
pub struct ShowFields {
    pub load_state: String,
    pub active_state: String,
    pub sub_state: String,
    pub active_enter_timestamp: Option<String>,
    pub description: String,
}

/// Extract the five recognized keys from `systemctl show` output.
///
/// Lines without a `=` and unrecognized keys are skipped silently; a value
/// may itself contain `=`. Field order is irrelevant and the last occurrence
/// of a duplicated key wins. Garbage input is not an error, it just leaves
/// the fields blank.
pub fn parse_show_output(raw: &str) -> ShowFields {
    let mut fields = ShowFields::default();

    for line in raw.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key {
            "LoadState" => fields.load_state = value.to_string(),
            "ActiveState" => fields.active_state = value.to_string(),
            "SubState" => fields.sub_state = value.to_string(),
            "ActiveEnterTimestamp" => fields.active_enter_timestamp = Some(value.to_string()),
            "Description" => fields.description = value.to_string(),
            _ => {}
        }
    }

    fields
}
