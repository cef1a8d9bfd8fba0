use std::collections::HashMap;

use crate::error::BodyId;

/// Lets one per-tick record through every `every` ticks, per body.
///
/// The first tick of each body is always let through.
#[derive(Debug, Clone, Default)]
pub struct TickSampler {
    every: u32,
    ticks: HashMap<BodyId, u64>,
}

impl TickSampler {
    /// `every == 0` disables sampling entirely.
    pub fn new(every: u32) -> Self {
        Self {
            every,
            ticks: HashMap::new(),
        }
    }

    /// Counts a tick for `body` and reports whether it should be logged.
    pub fn sample(&mut self, body: &BodyId) -> bool {
        if self.every == 0 {
            return false;
        }
        let count = self.ticks.entry(body.clone()).or_insert(0);
        let due = *count % u64::from(self.every) == 0;
        *count += 1;
        due
    }

    pub fn forget(&mut self, body: &BodyId) {
        self.ticks.remove(body);
    }
}
