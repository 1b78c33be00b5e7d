//! Hint card lifecycle.

use std::time::Duration;

use bevy::prelude::*;

use super::coordinator::RequestToken;
use crate::collaborators::CollaboratorError;
use crate::constants::DEFAULT_HINT_COLLAPSE_SECS;

pub const FALLBACK_HINT: &str = "Hints are unavailable right now. Try re-reading the question and checking each step.";

#[derive(Debug, Clone, PartialEq)]
pub enum HintPhase {
    Hidden,
    Generating {
        token: RequestToken,
    },
    Shown {
        message: String,
        expanded: bool,
        /// Idle time left before auto-collapse, `None` once collapsed
        remaining: Option<Duration>,
    },
}

#[derive(Resource, Debug)]
pub struct HintPanel {
    phase: HintPhase,
    collapse_after: Duration,
}

impl Default for HintPanel {
    fn default() -> Self {
        Self::new(Duration::from_secs_f32(DEFAULT_HINT_COLLAPSE_SECS))
    }
}

impl HintPanel {
    pub fn new(collapse_after: Duration) -> Self {
        Self {
            phase: HintPhase::Hidden,
            collapse_after,
        }
    }

    pub fn set_collapse_after(&mut self, collapse_after: Duration) {
        self.collapse_after = collapse_after;
    }

    /// Start generating. Returns false while a hint is already being generated.
    pub fn request(&mut self, token: RequestToken) -> bool {
        if self.is_generating() {
            return false;
        }
        self.phase = HintPhase::Generating { token };
        true
    }

    /// Show the generated hint. Returns false if `token` no longer matches.
    pub fn apply(&mut self, token: &RequestToken, result: Result<String, CollaboratorError>) -> bool {
        match &self.phase {
            HintPhase::Generating { token: current } if current == token => {}
            _ => {
                debug!("Dropping stale hint {} for {}", token.seq, token.question_id);
                return false;
            }
        }

        let message = match result {
            Ok(message) if !message.trim().is_empty() => message,
            Ok(_) => FALLBACK_HINT.to_string(),
            Err(e) => {
                warn!("Hint generation failed: {}", e);
                FALLBACK_HINT.to_string()
            }
        };
        self.phase = HintPhase::Shown {
            message,
            expanded: true,
            remaining: Some(self.collapse_after),
        };
        true
    }

    /// Advance the idle timer by `delta`
    pub fn tick(&mut self, delta: Duration) {
        if let HintPhase::Shown {
            expanded, remaining, ..
        } = &mut self.phase
            && let Some(left) = *remaining
        {
            let left = left.saturating_sub(delta);
            if left.is_zero() {
                *expanded = false;
                *remaining = None;
            } else {
                *remaining = Some(left);
            }
        }
    }

    /// Collapse or expand the card; expanding restarts the idle timer
    pub fn toggle(&mut self) {
        if let HintPhase::Shown {
            expanded, remaining, ..
        } = &mut self.phase
        {
            *expanded = !*expanded;
            *remaining = expanded.then_some(self.collapse_after);
        }
    }

    pub fn close(&mut self) {
        self.phase = HintPhase::Hidden;
    }

    pub fn phase(&self) -> &HintPhase {
        &self.phase
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.phase, HintPhase::Generating { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match &self.phase {
            HintPhase::Shown { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.phase, HintPhase::Shown { expanded: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(seq: u64) -> RequestToken {
        RequestToken {
            question_id: "q1".to_string(),
            seq,
        }
    }

    fn shown_panel() -> HintPanel {
        let mut panel = HintPanel::new(Duration::from_secs(10));
        panel.request(token(1));
        panel.apply(&token(1), Ok("Use the power rule".to_string()));
        panel
    }

    #[test]
    fn test_request_then_apply_shows_expanded() {
        let panel = shown_panel();
        assert_eq!(panel.message(), Some("Use the power rule"));
        assert!(panel.is_expanded());
    }

    #[test]
    fn test_only_one_request_at_a_time() {
        let mut panel = HintPanel::default();
        assert!(panel.request(token(1)));
        assert!(!panel.request(token(2)));
    }

    #[test]
    fn test_stale_hint_is_dropped() {
        let mut panel = HintPanel::default();
        panel.request(token(1));
        panel.close();
        assert!(!panel.apply(&token(1), Ok("late".to_string())));
        assert_eq!(panel.phase(), &HintPhase::Hidden);
    }

    #[test]
    fn test_failure_shows_fallback() {
        let mut panel = HintPanel::default();
        panel.request(token(1));
        assert!(panel.apply(&token(1), Err(CollaboratorError::Unavailable)));
        assert_eq!(panel.message(), Some(FALLBACK_HINT));
    }

    #[test]
    fn test_collapses_after_idle_period() {
        let mut panel = shown_panel();
        panel.tick(Duration::from_secs(9));
        assert!(panel.is_expanded());
        panel.tick(Duration::from_secs(1));
        assert!(!panel.is_expanded());
        assert_eq!(panel.message(), Some("Use the power rule"));
    }

    #[test]
    fn test_reexpanding_restarts_timer() {
        let mut panel = shown_panel();
        panel.tick(Duration::from_secs(10));
        assert!(!panel.is_expanded());

        panel.toggle();
        assert!(panel.is_expanded());
        panel.tick(Duration::from_secs(9));
        assert!(panel.is_expanded());
        panel.tick(Duration::from_secs(1));
        assert!(!panel.is_expanded());
    }

    #[test]
    fn test_manual_collapse_stops_timer() {
        let mut panel = shown_panel();
        panel.toggle();
        assert!(matches!(
            panel.phase(),
            HintPhase::Shown {
                expanded: false,
                remaining: None,
                ..
            }
        ));
        panel.tick(Duration::from_secs(60));
        assert!(!panel.is_expanded());
    }

    #[test]
    fn test_close_hides() {
        let mut panel = shown_panel();
        panel.close();
        assert_eq!(panel.phase(), &HintPhase::Hidden);
        assert!(panel.message().is_none());
    }
}
