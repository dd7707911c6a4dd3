use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;

use crate::chart::builder::{ChartBuilder, tokenize};
use crate::chart::{Chart, notation};
use crate::grammar::Grammar;
use crate::session::history::{Feedback, RevealedItem, StepRecord};

/// How long feedback stays on screen before the session moves on.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DrillPhase {
    Idle,
    InProgress { step: usize, item_index: usize },
    StepComplete { step: usize },
    Finished,
}

impl DrillPhase {
    pub fn step(&self) -> Option<usize> {
        match *self {
            DrillPhase::InProgress { step, .. } | DrillPhase::StepComplete { step } => Some(step),
            DrillPhase::Idle | DrillPhase::Finished => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Drop the feedback of an accepted item and accept input again.
    ClearFeedback,
    /// Leave `StepComplete` for the next step, or finish.
    AdvanceStep,
}

/// A delayed transition. It only applies to the session generation
/// (`epoch`) that scheduled it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scheduled {
    pub epoch: u64,
    pub due: Instant,
    pub kind: TransitionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrillError {
    #[error("enter a sentence to parse")]
    EmptyInput,
    #[error("expected `{expected}`")]
    Mismatch { expected: String },
    #[error("item {index} is past the end of set {step} ({len} items)")]
    OutOfRange { step: usize, index: usize, len: usize },
    #[error("no step is waiting for input")]
    NotInProgress,
    #[error("the previous item is still being shown")]
    TransitionPending,
}

/// Advisory only: the word can never be scanned, so every set from its
/// position on is empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{word}` (word {position}) is not in the lexicon")]
pub struct UnknownWord {
    pub word: String,
    pub position: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub step: usize,
    /// `None` at the seed step, where no word has been read yet.
    pub word: Option<String>,
    pub tags: Vec<String>,
    pub next_item: Option<String>,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Serialize)]
pub struct DrillSnapshot<'a> {
    pub phase: DrillPhase,
    pub step: usize,
    pub item_index: usize,
    pub total_items: usize,
    pub word: Option<String>,
    pub revealed: &'a [RevealedItem],
    pub history: &'a BTreeMap<usize, StepRecord>,
    pub last_feedback: Option<&'a Feedback>,
}

/// Walks a learner through an Earley chart one set and one item at a time.
///
/// The chart is computed once by [`DrillSession::start`]. Accepting an item,
/// by typing it or skipping it, schedules a delayed transition; until that
/// transition fires no other item can be accepted, so progress can never
/// jump by two items from one burst of input.
pub struct DrillSession {
    grammar: Rc<Grammar>,
    delay: Duration,
    tokens: Vec<String>,
    chart: Option<Chart>,
    phase: DrillPhase,
    revealed: Vec<RevealedItem>,
    step_mistakes: u32,
    history: BTreeMap<usize, StepRecord>,
    last_feedback: Option<Feedback>,
    epoch: u64,
    pending: Option<Scheduled>,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl DrillSession {
    pub fn new(grammar: Rc<Grammar>) -> Self {
        Self {
            grammar,
            delay: DEFAULT_DELAY,
            tokens: Vec::new(),
            chart: None,
            phase: DrillPhase::Idle,
            revealed: Vec::new(),
            step_mistakes: 0,
            history: BTreeMap::new(),
            last_feedback: None,
            epoch: 0,
            pending: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn phase(&self) -> DrillPhase {
        self.phase
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn sentence(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn revealed(&self) -> &[RevealedItem] {
        &self.revealed
    }

    pub fn history(&self) -> &BTreeMap<usize, StepRecord> {
        &self.history
    }

    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.last_feedback.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn pending(&self) -> Option<Scheduled> {
        self.pending
    }

    /// True while a delayed transition has not fired yet.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.phase == DrillPhase::Finished
    }

    pub fn accepted(&self) -> bool {
        self.chart
            .as_ref()
            .is_some_and(|chart| chart.accepts(&self.grammar))
    }

    /// Word scanned into set `step`.
    pub fn word_at(&self, step: usize) -> Option<String> {
        step.checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .cloned()
    }

    /// Size of set `step`, 0 when there is no such set.
    pub fn set_len(&self, step: usize) -> usize {
        self.chart
            .as_ref()
            .and_then(|chart| chart.set(step))
            .map_or(0, |set| set.len())
    }

    pub fn unknown_words(&self) -> Vec<UnknownWord> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, word)| self.grammar.lookup(word).is_empty())
            .map(|(i, word)| UnknownWord {
                word: word.clone(),
                position: i + 1,
            })
            .collect()
    }

    /// Fraction of chart sets finished so far.
    pub fn progress(&self) -> f64 {
        if self.chart.is_none() {
            return 0.0;
        }
        let sets = self.tokens.len() + 1;
        self.history.len() as f64 / sets as f64
    }

    pub fn elapsed_secs(&self) -> f64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start).as_secs_f64(),
            (Some(start), None) => start.elapsed().as_secs_f64(),
            _ => 0.0,
        }
    }

    /// Tokenizes `sentence`, builds its chart and enters step 0.
    ///
    /// A blank sentence is rejected and leaves the session untouched.
    pub fn start(&mut self, sentence: &str) -> Result<(), DrillError> {
        let tokens = tokenize(sentence);
        if tokens.is_empty() {
            return Err(DrillError::EmptyInput);
        }

        self.discard();
        self.chart = Some(ChartBuilder::new(&self.grammar).build(&tokens));
        self.tokens = tokens;
        self.started_at = Some(Instant::now());
        self.enter_step(0);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.discard();
    }

    /// Checks `raw` against the next canonical item of the current set.
    pub fn submit_item(&mut self, raw: &str) -> Result<Scheduled, DrillError> {
        if self.pending.is_some() {
            return Err(DrillError::TransitionPending);
        }
        let (step, index, expected) = self.current_expected()?;

        if notation::matches(raw, &expected) {
            let revealed = RevealedItem::authored(expected.clone(), raw);
            Ok(self.accept(step, index, revealed, Feedback::Correct { item: expected }))
        } else {
            self.step_mistakes += 1;
            self.last_feedback = Some(Feedback::Wrong {
                expected: expected.clone(),
                submitted: raw.trim().to_string(),
            });
            Err(DrillError::Mismatch { expected })
        }
    }

    /// Reveals the next canonical item as if it had been typed. Does nothing
    /// while a previous transition is still pending.
    pub fn skip_item(&mut self) -> Result<Option<Scheduled>, DrillError> {
        if self.pending.is_some() {
            return Ok(None);
        }
        let (step, index, expected) = self.current_expected()?;
        let revealed = RevealedItem::skipped(expected.clone());
        Ok(Some(self.accept(
            step,
            index,
            revealed,
            Feedback::Skipped { item: expected },
        )))
    }

    pub fn hint(&self) -> Option<Hint> {
        let step = self.phase.step()?;
        let word = self.word_at(step);
        let tags = word
            .as_deref()
            .map(|w| self.grammar.lookup(w).to_vec())
            .unwrap_or_default();
        let next_item = self.current_expected().ok().map(|(_, _, text)| text);
        Some(Hint {
            step,
            word,
            tags,
            next_item,
        })
    }

    /// Applies `scheduled` if it is still the pending transition of this
    /// session generation. Stale transitions are ignored.
    pub fn fire(&mut self, scheduled: Scheduled) -> bool {
        if scheduled.epoch != self.epoch || self.pending != Some(scheduled) {
            return false;
        }
        self.pending = None;

        match scheduled.kind {
            TransitionKind::ClearFeedback => {
                self.last_feedback = None;
            }
            TransitionKind::AdvanceStep => {
                let DrillPhase::StepComplete { step } = self.phase else {
                    return false;
                };
                if step >= self.tokens.len() {
                    self.phase = DrillPhase::Finished;
                    self.finished_at = Some(Instant::now());
                    self.last_feedback = Some(Feedback::Finished {
                        accepted: self.accepted(),
                    });
                } else {
                    self.enter_step(step + 1);
                }
            }
        }
        true
    }

    /// Fires the pending transition once it is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(pending) if now >= pending.due => self.fire(pending),
            _ => false,
        }
    }

    /// Fires the pending transition without waiting for its deadline.
    pub fn fire_pending(&mut self) -> bool {
        match self.pending {
            Some(pending) => self.fire(pending),
            None => false,
        }
    }

    pub fn snapshot(&self) -> DrillSnapshot<'_> {
        let (step, item_index) = match self.phase {
            DrillPhase::InProgress { step, item_index } => (step, item_index),
            DrillPhase::StepComplete { step } => (step, self.set_len(step)),
            DrillPhase::Finished => (self.tokens.len(), self.set_len(self.tokens.len())),
            DrillPhase::Idle => (0, 0),
        };
        DrillSnapshot {
            phase: self.phase,
            step,
            item_index,
            total_items: self.set_len(step),
            word: self.word_at(step),
            revealed: &self.revealed,
            history: &self.history,
            last_feedback: self.last_feedback.as_ref(),
        }
    }

    fn discard(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.pending = None;
        self.tokens.clear();
        self.chart = None;
        self.phase = DrillPhase::Idle;
        self.revealed.clear();
        self.step_mistakes = 0;
        self.history.clear();
        self.last_feedback = None;
        self.started_at = None;
        self.finished_at = None;
    }

    fn current_expected(&self) -> Result<(usize, usize, String), DrillError> {
        let DrillPhase::InProgress { step, item_index } = self.phase else {
            return Err(DrillError::NotInProgress);
        };
        let set = self
            .chart
            .as_ref()
            .and_then(|chart| chart.set(step))
            .ok_or(DrillError::NotInProgress)?;
        let item = set.get(item_index).ok_or(DrillError::OutOfRange {
            step,
            index: item_index,
            len: set.len(),
        })?;
        Ok((step, item_index, notation::render(item, &self.grammar)))
    }

    fn accept(
        &mut self,
        step: usize,
        index: usize,
        revealed: RevealedItem,
        feedback: Feedback,
    ) -> Scheduled {
        self.revealed.push(revealed);
        self.last_feedback = Some(feedback);

        if index + 1 >= self.set_len(step) {
            self.complete_step(step);
            self.last_feedback = Some(Feedback::StepComplete { step });
            self.schedule(TransitionKind::AdvanceStep)
        } else {
            self.phase = DrillPhase::InProgress {
                step,
                item_index: index + 1,
            };
            self.schedule(TransitionKind::ClearFeedback)
        }
    }

    fn complete_step(&mut self, step: usize) {
        let record = StepRecord {
            step,
            word: self.word_at(step),
            items: self.revealed.clone(),
            mistakes: self.step_mistakes,
            completed: true,
        };
        self.history.insert(step, record);
        self.phase = DrillPhase::StepComplete { step };
    }

    fn enter_step(&mut self, step: usize) {
        self.revealed.clear();
        self.step_mistakes = 0;
        self.last_feedback = None;

        if self.set_len(step) == 0 {
            self.complete_step(step);
            // Set 0 always holds the start items, so a dead end has a word.
            self.last_feedback = Some(Feedback::DeadEnd {
                step,
                word: self.word_at(step).unwrap_or_default(),
            });
            self.schedule(TransitionKind::AdvanceStep);
        } else {
            self.phase = DrillPhase::InProgress {
                step,
                item_index: 0,
            };
        }
    }

    fn schedule(&mut self, kind: TransitionKind) -> Scheduled {
        let scheduled = Scheduled {
            epoch: self.epoch,
            due: Instant::now() + self.delay,
            kind,
        };
        self.pending = Some(scheduled);
        scheduled
    }
}
