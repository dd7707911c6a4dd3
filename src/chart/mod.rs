pub mod builder;
pub mod notation;

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::grammar::{Grammar, ProductionId, Symbol};

/// A dotted production with the chart position where its recognition began.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Item {
    pub production: ProductionId,
    pub dot: usize,
    pub origin: usize,
}

impl Item {
    pub fn new(production: ProductionId, dot: usize, origin: usize) -> Self {
        Self {
            production,
            dot,
            origin,
        }
    }

    pub fn next_symbol<'g>(&self, grammar: &'g Grammar) -> Option<&'g Symbol> {
        grammar.production(self.production).symbol_at(self.dot)
    }

    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot >= grammar.production(self.production).body.len()
    }

    pub fn advance(self) -> Self {
        Self {
            dot: self.dot + 1,
            ..self
        }
    }

    pub fn head<'g>(&self, grammar: &'g Grammar) -> &'g str {
        &grammar.production(self.production).head
    }
}

/// Ordered, duplicate-free items for one chart position.
#[derive(Clone, Debug, Default)]
pub struct ItemSet {
    position: usize,
    items: Vec<Item>,
    seen: HashSet<Item>,
}

impl ItemSet {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Appends `item` unless an equal item is already present.
    pub fn insert(&mut self, item: Item) -> bool {
        if self.seen.insert(item) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn contains(&self, item: &Item) -> bool {
        self.seen.contains(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }
}

impl PartialEq for ItemSet {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.items == other.items
    }
}

impl Eq for ItemSet {}

/// The item sets `0..=N` for a tokenized sentence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chart {
    tokens: Vec<String>,
    sets: Vec<ItemSet>,
}

/// Chart set with every item written out, for display and JSON output.
#[derive(Clone, Debug, Serialize)]
pub struct RenderedSet {
    pub position: usize,
    pub word: Option<String>,
    pub items: Vec<String>,
}

impl Chart {
    pub(crate) fn new(tokens: Vec<String>, sets: Vec<ItemSet>) -> Self {
        debug_assert_eq!(sets.len(), tokens.len() + 1);
        Self { tokens, sets }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn sets(&self) -> &[ItemSet] {
        &self.sets
    }

    pub fn set(&self, position: usize) -> Option<&ItemSet> {
        self.sets.get(position)
    }

    /// Index of the last set, i.e. the number of tokens.
    pub fn last_position(&self) -> usize {
        self.tokens.len()
    }

    /// The word scanned to reach `position`; none for the seed set.
    pub fn word_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(String::as_str)
    }

    /// First position whose set is empty.
    pub fn dead_end(&self) -> Option<usize> {
        self.sets.iter().position(ItemSet::is_empty)
    }

    /// True when the last set holds a completed start item from origin 0.
    pub fn accepts(&self, grammar: &Grammar) -> bool {
        let start = grammar.start_symbol();
        self.sets.last().is_some_and(|set| {
            set.iter().any(|item| {
                item.origin == 0
                    && item.is_complete(grammar)
                    && item.head(grammar) == start.name()
            })
        })
    }

    /// Tokens with no lexicon entry, in sentence order.
    pub fn unknown_words<'a>(&'a self, grammar: &Grammar) -> Vec<&'a str> {
        self.tokens
            .iter()
            .filter(|t| grammar.lookup(t).is_empty())
            .map(String::as_str)
            .collect()
    }

    pub fn rendered(&self, grammar: &Grammar) -> Vec<RenderedSet> {
        self.sets
            .iter()
            .map(|set| RenderedSet {
                position: set.position(),
                word: self.word_at(set.position()).map(str::to_string),
                items: set
                    .iter()
                    .map(|item| notation::render(item, grammar))
                    .collect(),
            })
            .collect()
    }
}

/// Whole-chart summary printed by `--print-chart`.
#[derive(Clone, Debug, Serialize)]
pub struct ChartReport {
    pub grammar: String,
    pub sentence: String,
    pub accepted: bool,
    pub unknown_words: Vec<String>,
    pub dead_end: Option<usize>,
    pub sets: Vec<RenderedSet>,
}

impl Chart {
    pub fn report(&self, grammar: &Grammar) -> ChartReport {
        ChartReport {
            grammar: grammar.name().to_string(),
            sentence: self.tokens.join(" "),
            accepted: self.accepts(grammar),
            unknown_words: self
                .unknown_words(grammar)
                .into_iter()
                .map(str::to_string)
                .collect(),
            dead_end: self.dead_end(),
            sets: self.rendered(grammar),
        }
    }
}

impl fmt::Display for ChartReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.sentence, self.grammar)?;
        for set in &self.sets {
            match &set.word {
                Some(word) => writeln!(f, "set {} '{word}'", set.position)?,
                None => writeln!(f, "set {}", set.position)?,
            }
            if set.items.is_empty() {
                writeln!(f, "  (empty)")?;
            }
            for item in &set.items {
                writeln!(f, "  {item}")?;
            }
        }
        if !self.unknown_words.is_empty() {
            writeln!(f, "unknown words: {}", self.unknown_words.join(", "))?;
        }
        write!(f, "{}", if self.accepted { "accepted" } else { "not accepted" })
    }
}
