use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::session::drill::DrillSession;

#[derive(Clone, Debug, Serialize)]
pub struct StepTally {
    pub step: usize,
    pub word: Option<String>,
    pub items: usize,
    pub authored: usize,
    pub skipped: usize,
    pub mistakes: u32,
}

/// Summary of a drill, shown on the result screen and printed as JSON.
#[derive(Clone, Debug, Serialize)]
pub struct DrillResult {
    pub grammar: String,
    pub sentence: String,
    pub accepted: bool,
    pub steps: Vec<StepTally>,
    pub total_items: usize,
    pub authored: usize,
    pub skipped: usize,
    pub mistakes: u32,
    pub accuracy: f64,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
    /// True when the drill was left before the last set.
    pub partial: bool,
}

impl DrillResult {
    pub fn from_session(session: &DrillSession) -> Self {
        let steps: Vec<StepTally> = session
            .history()
            .values()
            .map(|record| StepTally {
                step: record.step,
                word: record.word.clone(),
                items: record.items.len(),
                authored: record.authored_count(),
                skipped: record.skipped_count(),
                mistakes: record.mistakes,
            })
            .collect();

        let total_items: usize = steps.iter().map(|s| s.items).sum();
        let authored: usize = steps.iter().map(|s| s.authored).sum();
        let skipped: usize = steps.iter().map(|s| s.skipped).sum();
        let mistakes: u32 = steps.iter().map(|s| s.mistakes).sum();

        // Every skip and every wrong attempt counts against accuracy.
        let attempts = total_items + mistakes as usize;
        let accuracy = if attempts > 0 {
            (authored as f64 / attempts as f64 * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        Self {
            grammar: session.grammar().name().to_string(),
            sentence: session.sentence(),
            accepted: session.accepted(),
            steps,
            total_items,
            authored,
            skipped,
            mistakes,
            accuracy,
            elapsed_secs: session.elapsed_secs(),
            timestamp: Utc::now(),
            partial: !session.is_finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::grammar::tiny_grammar;

    #[test]
    fn tallies_authored_skipped_and_mistakes() {
        let mut session = DrillSession::new(Rc::new(tiny_grammar()));
        session.start("i jump").unwrap();

        assert!(session.submit_item("S -> NP VP, 0").is_err());
        session.submit_item("S -> .NP VP, 0").unwrap();
        session.fire_pending();
        session.skip_item().unwrap();
        session.fire_pending();

        let result = DrillResult::from_session(&session);
        assert!(result.partial);
        assert_eq!(result.steps.len(), 1);
        assert_eq!(result.total_items, 2);
        assert_eq!(result.authored, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.mistakes, 1);
        assert!((result.accuracy - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_session_is_fully_accurate() {
        let session = DrillSession::new(Rc::new(tiny_grammar()));
        let result = DrillResult::from_session(&session);
        assert_eq!(result.accuracy, 100.0);
        assert!(result.steps.is_empty());
        assert!(!result.accepted);
    }
}
