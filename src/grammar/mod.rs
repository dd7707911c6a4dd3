pub mod loader;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Index of a production inside its [`Grammar`].
pub type ProductionId = usize;

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot read grammar file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed production `{rule}`: {reason}")]
    MalformedProduction { rule: String, reason: &'static str },
    #[error("grammar has no productions")]
    NoProductions,
    #[error("start symbol `{0}` has no productions")]
    MissingStart(String),
    #[error("production `{0}` is listed twice")]
    DuplicateProduction(String),
    #[error("lexicon entry `{0}` has no part-of-speech tags")]
    EmptyTags(String),
    #[error("lexicon word `{0}` is empty or contains whitespace")]
    InvalidWord(String),
    #[error("no grammar named `{0}`")]
    NotFound(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Symbol {
    Terminal(String),
    NonTerminal(String),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(name) | Symbol::NonTerminal(name) => name,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Production {
    pub head: String,
    pub body: Vec<Symbol>,
}

impl Production {
    pub fn symbol_at(&self, dot: usize) -> Option<&Symbol> {
        self.body.get(dot)
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} →", self.head)?;
        if self.body.is_empty() {
            return f.write_str(" ε");
        }
        for symbol in &self.body {
            write!(f, " {symbol}")?;
        }
        Ok(())
    }
}

/// Word to part-of-speech mapping. Words are stored lowercased.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Lexicon {
    entries: BTreeMap<String, Vec<String>>,
}

impl Lexicon {
    pub fn from_entries<I, W, T>(entries: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = (W, Vec<T>)>,
        W: Into<String>,
        T: Into<String>,
    {
        let mut lexicon = Lexicon::default();
        for (word, tags) in entries {
            let word: String = word.into();
            if word.is_empty() || word.chars().any(char::is_whitespace) {
                return Err(GrammarError::InvalidWord(word));
            }
            let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
            if tags.is_empty() {
                return Err(GrammarError::EmptyTags(word));
            }
            // Entries differing only in case share one tag list.
            let merged = lexicon.entries.entry(word.to_lowercase()).or_default();
            for tag in tags {
                if !merged.contains(&tag) {
                    merged.push(tag);
                }
            }
        }
        Ok(lexicon)
    }

    /// Tags for `word`; empty when the word is unknown.
    pub fn lookup(&self, word: &str) -> &[String] {
        self.entries
            .get(&word.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, word: &str) -> bool {
        !self.lookup(word).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(w, t)| (w.as_str(), t.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A context-free grammar over part-of-speech tags, together with the
/// lexicon that maps words onto those tags.
///
/// A body symbol is a non-terminal exactly when some production has it as
/// its head. Every other body symbol is a terminal and is matched against
/// the tags of the word being scanned.
#[derive(Clone, Debug)]
pub struct Grammar {
    name: String,
    description: String,
    start: String,
    productions: Vec<Production>,
    by_head: HashMap<String, Vec<ProductionId>>,
    lexicon: Lexicon,
    samples: Vec<String>,
}

impl Grammar {
    /// Builds a grammar from `(head, body)` pairs in order.
    pub fn new<H, S>(
        start: &str,
        rules: impl IntoIterator<Item = (H, Vec<S>)>,
        lexicon: Lexicon,
    ) -> Result<Self, GrammarError>
    where
        H: Into<String>,
        S: Into<String>,
    {
        let rules: Vec<(String, Vec<String>)> = rules
            .into_iter()
            .map(|(head, body)| (head.into(), body.into_iter().map(Into::into).collect()))
            .collect();
        if rules.is_empty() {
            return Err(GrammarError::NoProductions);
        }

        let heads: HashSet<&str> = rules.iter().map(|(head, _)| head.as_str()).collect();
        if !heads.contains(start) {
            return Err(GrammarError::MissingStart(start.to_string()));
        }

        let mut productions: Vec<Production> = Vec::with_capacity(rules.len());
        let mut by_head: HashMap<String, Vec<ProductionId>> = HashMap::new();
        for (head, body) in &rules {
            let body = body
                .iter()
                .map(|name| {
                    if heads.contains(name.as_str()) {
                        Symbol::NonTerminal(name.clone())
                    } else {
                        Symbol::Terminal(name.clone())
                    }
                })
                .collect();
            let production = Production {
                head: head.clone(),
                body,
            };
            if productions.contains(&production) {
                return Err(GrammarError::DuplicateProduction(production.to_string()));
            }
            by_head
                .entry(head.clone())
                .or_default()
                .push(productions.len());
            productions.push(production);
        }

        Ok(Self {
            name: String::new(),
            description: String::new(),
            start: start.to_string(),
            productions,
            by_head,
            lexicon,
            samples: Vec::new(),
        })
    }

    pub fn with_name(mut self, name: &str, description: &str) -> Self {
        self.name = name.to_string();
        self.description = description.to_string();
        self
    }

    pub fn with_samples(mut self, samples: Vec<String>) -> Self {
        self.samples = samples;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn start_symbol(&self) -> Symbol {
        Symbol::NonTerminal(self.start.clone())
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id]
    }

    /// Productions headed by `head`, in grammar order.
    pub fn productions_for(&self, head: &str) -> &[ProductionId] {
        self.by_head.get(head).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn start_productions(&self) -> &[ProductionId] {
        self.productions_for(&self.start)
    }

    pub fn is_nonterminal(&self, name: &str) -> bool {
        self.by_head.contains_key(name)
    }

    /// Terminal names in order of first appearance.
    pub fn terminals(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for symbol in self.productions.iter().flat_map(|p| &p.body) {
            if let Symbol::Terminal(name) = symbol {
                if !seen.contains(&name.as_str()) {
                    seen.push(name.as_str());
                }
            }
        }
        seen
    }

    /// Every symbol name, heads first, for input completion.
    pub fn symbol_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for production in &self.productions {
            if !names.contains(&production.head.as_str()) {
                names.push(&production.head);
            }
        }
        for terminal in self.terminals() {
            if !names.contains(&terminal) {
                names.push(terminal);
            }
        }
        names
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Part-of-speech tags of `word`; empty for unknown words.
    pub fn lookup(&self, word: &str) -> &[String] {
        self.lexicon.lookup(word)
    }
}

#[cfg(test)]
pub(crate) fn tiny_grammar() -> Grammar {
    let lexicon = Lexicon::from_entries([("i", vec!["pron"]), ("jump", vec!["v"])]).unwrap();
    Grammar::new(
        "S",
        [
            ("S", vec!["NP", "VP"]),
            ("NP", vec!["pron"]),
            ("VP", vec!["v"]),
        ],
        lexicon,
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_heads_as_nonterminals() {
        let grammar = tiny_grammar();
        let s = grammar.production(0);
        assert_eq!(s.body[0], Symbol::NonTerminal("NP".to_string()));
        assert_eq!(
            grammar.production(1).body[0],
            Symbol::Terminal("pron".to_string())
        );
        assert_eq!(grammar.terminals(), vec!["pron", "v"]);
        assert_eq!(grammar.start_symbol(), Symbol::NonTerminal("S".to_string()));
    }

    #[test]
    fn unknown_word_has_no_tags() {
        let grammar = tiny_grammar();
        assert!(grammar.lookup("xyzzy").is_empty());
        assert_eq!(grammar.lookup("JUMP"), ["v".to_string()]);
    }

    #[test]
    fn rejects_missing_start() {
        let err = Grammar::new("S", [("NP", vec!["pron"])], Lexicon::default()).unwrap_err();
        assert!(matches!(err, GrammarError::MissingStart(s) if s == "S"));
    }

    #[test]
    fn rejects_empty_grammar() {
        let rules: Vec<(String, Vec<String>)> = Vec::new();
        let err = Grammar::new("S", rules, Lexicon::default()).unwrap_err();
        assert!(matches!(err, GrammarError::NoProductions));
    }

    #[test]
    fn rejects_duplicate_production() {
        let err = Grammar::new(
            "S",
            [("S", vec!["a"]), ("S", vec!["a"])],
            Lexicon::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::DuplicateProduction(_)));
    }

    #[test]
    fn lexicon_rejects_empty_tags_and_bad_words() {
        let empty: Vec<&str> = Vec::new();
        assert!(matches!(
            Lexicon::from_entries([("dog", empty)]),
            Err(GrammarError::EmptyTags(_))
        ));
        assert!(matches!(
            Lexicon::from_entries([("big dog", vec!["noun"])]),
            Err(GrammarError::InvalidWord(_))
        ));
    }

    #[test]
    fn case_variants_of_a_word_merge_their_tags() {
        let lexicon = Lexicon::from_entries([
            ("I", vec!["pron"]),
            ("i", vec!["pron", "noun"]),
        ])
        .unwrap();
        assert_eq!(lexicon.len(), 1);
        assert_eq!(lexicon.lookup("i"), ["pron", "noun"]);
    }

    #[test]
    fn epsilon_production_displays_epsilon() {
        let empty: Vec<&str> = Vec::new();
        let grammar = Grammar::new("S", [("S", empty)], Lexicon::default()).unwrap();
        assert_eq!(grammar.production(0).to_string(), "S → ε");
    }
}
