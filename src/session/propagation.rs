//! Dependent-error propagation over step verdicts.

use crate::canvas::RecognizedRegion;
use crate::collaborators::StepCheck;

pub const DEFAULT_ERROR_MESSAGE: &str = "There's an error in this step.";
pub const DEPENDENT_WARNING: &str = "This step may be affected by errors in previous steps.";

/// Keep only verdicts for regions of this pass, in region order
pub fn order_by_regions(steps: Vec<StepCheck>, regions: &[RecognizedRegion]) -> Vec<StepCheck> {
    let mut ordered: Vec<(usize, StepCheck)> = steps
        .into_iter()
        .filter_map(|step| {
            let index = regions.iter().position(|r| r.id == step.region_id)?;
            Some((index, step))
        })
        .collect();
    // Stable, so duplicate verdicts keep the checker's order
    ordered.sort_by_key(|(index, _)| *index);
    ordered.dedup_by_key(|(index, _)| *index);
    ordered.into_iter().map(|(_, step)| step).collect()
}

/// Once a step is wrong, every later correct step carries a warning.
/// Steps up to and including the first error never do.
pub fn propagate_dependent_errors(steps: &mut [StepCheck]) {
    let mut seen_error = false;
    for step in steps.iter_mut() {
        if step.is_correct {
            step.error_message = None;
            step.warning_message = seen_error.then(|| DEPENDENT_WARNING.to_string());
        } else {
            seen_error = true;
            step.warning_message = None;
            if step.error_message.is_none() {
                step.error_message = Some(DEFAULT_ERROR_MESSAGE.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: &str) -> RecognizedRegion {
        RecognizedRegion {
            id: id.to_string(),
            content: String::new(),
            bounding_box: None,
        }
    }

    #[test]
    fn test_warnings_follow_first_error() {
        let mut steps = vec![
            StepCheck::correct("r1"),
            StepCheck::incorrect("r2", "sign error"),
            StepCheck::correct("r3"),
            StepCheck::correct("r4"),
        ];
        propagate_dependent_errors(&mut steps);

        assert_eq!(steps[0].warning_message, None);
        assert_eq!(steps[1].warning_message, None);
        assert_eq!(steps[1].error_message.as_deref(), Some("sign error"));
        assert_eq!(steps[2].warning_message.as_deref(), Some(DEPENDENT_WARNING));
        assert_eq!(steps[3].warning_message.as_deref(), Some(DEPENDENT_WARNING));
    }

    #[test]
    fn test_later_errors_get_no_warning() {
        let mut steps = vec![
            StepCheck::incorrect("r1", "a"),
            StepCheck::incorrect("r2", "b"),
            StepCheck::correct("r3"),
        ];
        propagate_dependent_errors(&mut steps);
        assert!(steps[1].warning_message.is_none());
        assert!(steps[2].warning_message.is_some());
    }

    #[test]
    fn test_all_correct_has_no_warnings() {
        let mut steps = vec![StepCheck::correct("r1"), StepCheck::correct("r2")];
        propagate_dependent_errors(&mut steps);
        assert!(steps.iter().all(|s| s.warning_message.is_none()));
    }

    #[test]
    fn test_incorrect_step_without_message_gets_default() {
        let mut steps = vec![StepCheck {
            error_message: None,
            ..StepCheck::incorrect("r1", "")
        }];
        propagate_dependent_errors(&mut steps);
        assert_eq!(steps[0].error_message.as_deref(), Some(DEFAULT_ERROR_MESSAGE));
    }

    #[test]
    fn test_order_by_regions_sorts_and_drops_unknown() {
        let regions = vec![region("a"), region("b"), region("c")];
        let steps = vec![
            StepCheck::correct("c"),
            StepCheck::correct("zzz"),
            StepCheck::incorrect("a", "x"),
            StepCheck::correct("a"),
        ];
        let ordered = order_by_regions(steps, &regions);
        let ids: Vec<&str> = ordered.iter().map(|s| s.region_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(!ordered[0].is_correct);
    }
}
