use serde::Serialize;

use crate::error::BodyId;
use crate::sim::Float3;

/// Display snapshot of one body's run. Not meant to drive control flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatus {
    pub body: BodyId,
    pub active: bool,
    pub moving: bool,
    pub checkpoints_passed: usize,
    pub checkpoints_total: usize,
    /// Zero-based index of the sample currently being approached.
    pub path_index: usize,
    pub path_total: usize,
    pub position: Option<Float3>,
}

impl RunStatus {
    pub fn inactive(body: BodyId) -> Self {
        Self {
            body,
            active: false,
            moving: false,
            checkpoints_passed: 0,
            checkpoints_total: 0,
            path_index: 0,
            path_total: 0,
            position: None,
        }
    }

    /// Fraction of checkpoints passed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.checkpoints_total == 0 {
            return 0.0;
        }
        self.checkpoints_passed as f32 / self.checkpoints_total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_status_serializes_flat() {
        let status = RunStatus::inactive(BodyId::from("drone"));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["body"], "drone");
        assert_eq!(json["active"], false);
        assert!(json["position"].is_null());
        assert_eq!(status.progress(), 0.0);
    }
}
