//! Which marker message panels are open.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::session::CheckOutcome;

/// Expand state per region id. Survives re-checks; cleared on question change.
#[derive(Resource, Default, Debug)]
pub struct OverlayState {
    expanded: HashSet<String>,
}

impl OverlayState {
    pub fn is_expanded(&self, region_id: &str) -> bool {
        self.expanded.contains(region_id)
    }

    pub fn toggle(&mut self, region_id: &str) {
        if !self.expanded.remove(region_id) {
            self.expanded.insert(region_id.to_string());
        }
    }

    /// Open the first wrong step of a fresh outcome
    pub fn reveal_first_error(&mut self, outcome: &CheckOutcome) {
        if let Some(step) = outcome.first_error() {
            self.expanded.insert(step.region_id.clone());
        }
    }

    pub fn reset(&mut self) {
        self.expanded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::StepCheck;

    #[test]
    fn test_toggle() {
        let mut state = OverlayState::default();
        state.toggle("step-1");
        assert!(state.is_expanded("step-1"));
        assert!(!state.is_expanded("step-2"));
        state.toggle("step-1");
        assert!(!state.is_expanded("step-1"));
    }

    #[test]
    fn test_reveal_first_error_keeps_other_panels() {
        let mut state = OverlayState::default();
        state.toggle("step-0");
        let outcome = CheckOutcome::from_steps(vec![
            StepCheck::correct("step-0"),
            StepCheck::incorrect("step-1", "wrong"),
            StepCheck::incorrect("step-2", "also wrong"),
        ]);
        state.reveal_first_error(&outcome);
        assert!(state.is_expanded("step-0"));
        assert!(state.is_expanded("step-1"));
        assert!(!state.is_expanded("step-2"));
    }

    #[test]
    fn test_reset_closes_everything() {
        let mut state = OverlayState::default();
        state.toggle("step-0");
        state.toggle("step-3");
        state.reset();
        assert!(!state.is_expanded("step-0"));
        assert!(!state.is_expanded("step-3"));
    }
}
