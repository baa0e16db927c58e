// Status badges derived from the latest snapshot

use serde::{Deserialize, Serialize};

use super::TelemetrySnapshot;

/// Temperature at or above which the temperature badge raises an alert.
pub const DEFAULT_TEMPERATURE_ALERT_CELSIUS: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    Normal,
    Alert,
}

impl Badge {
    fn normal_if(ok: bool) -> Self {
        if ok { Badge::Normal } else { Badge::Alert }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiftingState {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub obstacle: Badge,
    pub temperature: Badge,
    pub gas: Badge,
    pub lifting: LiftingState,
}

impl StatusReport {
    pub fn from_snapshot(snapshot: &TelemetrySnapshot, temperature_alert_celsius: f64) -> Self {
        Self {
            obstacle: Badge::normal_if(!snapshot.obstacle_detected),
            temperature: Badge::normal_if(snapshot.temperature < temperature_alert_celsius),
            gas: Badge::normal_if(!snapshot.gas_detected),
            lifting: if snapshot.lifting_status {
                LiftingState::Active
            } else {
                LiftingState::Inactive
            },
        }
    }

    /// True if any badge is in alert.
    pub fn any_alert(&self) -> bool {
        [self.obstacle, self.temperature, self.gas].contains(&Badge::Alert)
    }
}
