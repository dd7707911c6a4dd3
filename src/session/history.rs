use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSource {
    Authored,
    Skipped,
}

/// An item confirmed during the current step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RevealedItem {
    /// Canonical text of the item.
    pub text: String,
    /// What the learner actually typed, for authored items.
    pub typed: Option<String>,
    pub source: ItemSource,
}

impl RevealedItem {
    pub fn authored(text: String, typed: &str) -> Self {
        Self {
            text,
            typed: Some(typed.trim().to_string()),
            source: ItemSource::Authored,
        }
    }

    pub fn skipped(text: String) -> Self {
        Self {
            text,
            typed: None,
            source: ItemSource::Skipped,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.source == ItemSource::Skipped
    }
}

/// A finished chart set as the learner walked through it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    /// Word scanned into this set; `None` for the seed set.
    pub word: Option<String>,
    pub items: Vec<RevealedItem>,
    pub mistakes: u32,
    pub completed: bool,
}

impl StepRecord {
    pub fn authored_count(&self) -> usize {
        self.items.iter().filter(|i| !i.is_skipped()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_skipped()).count()
    }

    pub fn is_dead_end(&self) -> bool {
        self.items.is_empty()
    }
}

/// The latest user-facing outcome, kept until the next transition clears it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Feedback {
    Correct { item: String },
    Wrong { expected: String, submitted: String },
    Skipped { item: String },
    StepComplete { step: usize },
    DeadEnd { step: usize, word: String },
    Finished { accepted: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_authored_and_skipped() {
        let record = StepRecord {
            step: 1,
            word: Some("i".to_string()),
            items: vec![
                RevealedItem::authored("NP → pron ., 0".to_string(), " np -> pron ., 0 "),
                RevealedItem::skipped("S → NP .VP, 0".to_string()),
            ],
            mistakes: 2,
            completed: true,
        };
        assert_eq!(record.authored_count(), 1);
        assert_eq!(record.skipped_count(), 1);
        assert!(!record.is_dead_end());
        assert_eq!(record.items[0].typed.as_deref(), Some("np -> pron ., 0"));
    }

    #[test]
    fn feedback_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Feedback::StepComplete { step: 2 }).unwrap();
        assert_eq!(json, r#"{"kind":"step_complete","step":2}"#);
    }
}
