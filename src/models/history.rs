// Bounded, time-aligned series feeding the performance chart

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of points kept per series.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Three sequences sharing one index: `timestamps[i]`, `speed[i]` and
/// `battery[i]` always come from the same snapshot. Lengths are equal and
/// never exceed `capacity`; the oldest point is evicted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "HistoryWire")]
pub struct RollingHistory {
    capacity: usize,
    timestamps: VecDeque<u64>,
    speed: VecDeque<f64>,
    battery: VecDeque<f64>,
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RollingHistory {
    /// A capacity of 0 is raised to 1 so a push always leaves the newest point visible.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            timestamps: VecDeque::with_capacity(capacity + 1),
            speed: VecDeque::with_capacity(capacity + 1),
            battery: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append one point, then drop from the front until within capacity.
    pub fn push(&mut self, timestamp_ms: u64, speed: f64, battery: f64) {
        self.timestamps.push_back(timestamp_ms);
        self.speed.push_back(speed);
        self.battery.push_back(battery);
        while self.timestamps.len() > self.capacity {
            self.timestamps.pop_front();
            self.speed.pop_front();
            self.battery.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> Vec<u64> {
        self.timestamps.iter().copied().collect()
    }

    pub fn speed(&self) -> Vec<f64> {
        self.speed.iter().copied().collect()
    }

    pub fn battery(&self) -> Vec<f64> {
        self.battery.iter().copied().collect()
    }

    /// True when all three series have the same length and fit the capacity.
    pub fn is_aligned(&self) -> bool {
        let n = self.timestamps.len();
        n == self.speed.len() && n == self.battery.len() && n <= self.capacity
    }
}

/// Unchecked wire form; `RollingHistory` is only built from it after validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryWire {
    capacity: usize,
    timestamps: VecDeque<u64>,
    speed: VecDeque<f64>,
    battery: VecDeque<f64>,
}

impl TryFrom<HistoryWire> for RollingHistory {
    type Error = String;

    fn try_from(wire: HistoryWire) -> Result<Self, Self::Error> {
        if wire.capacity == 0 {
            return Err("history capacity must be > 0".into());
        }
        let n = wire.timestamps.len();
        if wire.speed.len() != n || wire.battery.len() != n {
            return Err(format!(
                "history series misaligned: timestamps={}, speed={}, battery={}",
                n,
                wire.speed.len(),
                wire.battery.len()
            ));
        }
        if n > wire.capacity {
            return Err(format!(
                "history holds {} points, capacity is {}",
                n, wire.capacity
            ));
        }
        Ok(Self {
            capacity: wire.capacity,
            timestamps: wire.timestamps,
            speed: wire.speed,
            battery: wire.battery,
        })
    }
}
