//! systemd status aggregation, timestamp normalization, and unit control.

pub mod manager;
pub mod status;
pub mod timestamp;

pub use manager::{ControlAction, ControlError, StatusError, SystemdManager};
pub use status::{parse_show_output, ServiceStatus, ShowFields};
pub use timestamp::TimestampNormalizer;
