//! Voice command classification.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceIntent {
    CheckRequested,
    HintRequested,
    None,
}

const CHECK_WORDS: [&str; 3] = ["check", "correct", "verify"];
const HINT_WORDS: [&str; 3] = ["hint", "help", "stuck"];

impl VoiceIntent {
    /// Case-insensitive keyword match; check words take precedence
    pub fn classify(transcript: &str) -> Self {
        let lower = transcript.to_lowercase();
        if CHECK_WORDS.iter().any(|w| lower.contains(w)) {
            VoiceIntent::CheckRequested
        } else if HINT_WORDS.iter().any(|w| lower.contains(w)) {
            VoiceIntent::HintRequested
        } else {
            VoiceIntent::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_words() {
        assert_eq!(VoiceIntent::classify("Check my work"), VoiceIntent::CheckRequested);
        assert_eq!(VoiceIntent::classify("is this CORRECT?"), VoiceIntent::CheckRequested);
        assert_eq!(VoiceIntent::classify("please verify"), VoiceIntent::CheckRequested);
    }

    #[test]
    fn test_hint_words() {
        assert_eq!(VoiceIntent::classify("Give me a hint"), VoiceIntent::HintRequested);
        assert_eq!(VoiceIntent::classify("I'm stuck"), VoiceIntent::HintRequested);
        assert_eq!(VoiceIntent::classify("HELP"), VoiceIntent::HintRequested);
    }

    #[test]
    fn test_check_wins_over_hint() {
        assert_eq!(VoiceIntent::classify("help me check this"), VoiceIntent::CheckRequested);
    }

    #[test]
    fn test_substring_match() {
        assert_eq!(VoiceIntent::classify("incorrectly"), VoiceIntent::CheckRequested);
        assert_eq!(VoiceIntent::classify("helpful"), VoiceIntent::HintRequested);
    }

    #[test]
    fn test_no_intent() {
        assert_eq!(VoiceIntent::classify("what a nice day"), VoiceIntent::None);
        assert_eq!(VoiceIntent::classify(""), VoiceIntent::None);
    }
}
