//! Payload of the outbound `Progress` notification.

use serde::{Deserialize, Serialize};

/// Progress update emitted while a request handler tracks progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressNotification {
    /// Fractional completion in `[0, 1]`.
    pub progress: f64,
    /// Estimated time remaining, in seconds.
    pub eta: f64,
    /// Estimated throughput, in bytes per second.
    pub bps: f64,
}

impl ProgressNotification {
    /// Method name of the notification on the wire.
    pub const METHOD: &'static str = "Progress";
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serialises_expected_field_names() {
        let notification = ProgressNotification {
            progress: 0.5,
            eta: 12.0,
            bps: 2048.0,
        };
        let value = serde_json::to_value(notification).expect("serialise");
        assert_eq!(value, json!({"progress": 0.5, "eta": 12.0, "bps": 2048.0}));
    }
}
