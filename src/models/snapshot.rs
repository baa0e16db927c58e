// Instantaneous robot readings

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// m/s
    pub speed: f64,
    /// Percent, 0..=100.
    pub battery: f64,
    /// A
    pub current: f64,
    /// Load weight in kg.
    pub weight: f64,
    pub obstacle_detected: bool,
    /// °C
    pub temperature: f64,
    pub gas_detected: bool,
    pub lifting_status: bool,
}

impl TelemetrySnapshot {
    /// Rejects non-finite values, negative physical quantities and a battery
    /// level outside 0..=100. The first offending field is reported.
    pub fn validate(&self) -> Result<(), SourceError> {
        let non_negative = [
            ("speed", self.speed),
            ("current", self.current),
            ("weight", self.weight),
            ("temperature", self.temperature),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SourceError::Malformed { field, value });
            }
        }
        if !self.battery.is_finite() || !(0.0..=100.0).contains(&self.battery) {
            return Err(SourceError::Malformed {
                field: "battery",
                value: self.battery,
            });
        }
        Ok(())
    }
}
