//! Textual form of items: how the drill writes them and how learner input
//! is folded before comparison.
//!
//! Items are written as `HEAD → X .Y Z, origin`, with the dot glued to the
//! front of the next symbol or trailing as ` .` once the production is
//! complete.

use std::sync::LazyLock;

use icu_normalizer::ComposingNormalizerBorrowed;
use regex::Regex;

use crate::chart::Item;
use crate::grammar::Grammar;

const NFKC: ComposingNormalizerBorrowed<'static> = ComposingNormalizerBorrowed::new_nfkc();

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:->|→)\s*").expect("arrow pattern"));
static DOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\.\s*").expect("dot pattern"));
static COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").expect("comma pattern"));

pub fn render(item: &Item, grammar: &Grammar) -> String {
    let production = grammar.production(item.production);
    let mut body: Vec<String> = Vec::with_capacity(production.body.len() + 1);
    for (i, symbol) in production.body.iter().enumerate() {
        if i == item.dot {
            body.push(format!(".{symbol}"));
        } else {
            body.push(symbol.to_string());
        }
    }
    if item.dot >= production.body.len() {
        body.push(".".to_string());
    }
    format!("{} → {}, {}", production.head, body.join(" "), item.origin)
}

/// Folds an item string so that arrow style, spacing around `.` and `,`,
/// repeated whitespace and letter case do not matter.
pub fn normalize(text: &str) -> String {
    let text = NFKC.normalize(text).to_string();
    let text = text.replace(['•', '·', '∙'], ".");
    let text = WHITESPACE.replace_all(text.trim(), " ");
    let text = ARROW.replace_all(&text, "→");
    let text = DOT.replace_all(&text, ".");
    let text = COMMA.replace_all(&text, ",");
    text.to_lowercase()
}

pub fn matches(submitted: &str, canonical: &str) -> bool {
    normalize(submitted) == normalize(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::builder::ChartBuilder;
    use crate::grammar::loader;
    use crate::grammar::tiny_grammar;

    #[test]
    fn renders_dot_positions() {
        let grammar = tiny_grammar();
        assert_eq!(render(&Item::new(0, 0, 0), &grammar), "S → .NP VP, 0");
        assert_eq!(render(&Item::new(0, 1, 0), &grammar), "S → NP .VP, 0");
        assert_eq!(render(&Item::new(0, 2, 0), &grammar), "S → NP VP ., 0");
        assert_eq!(render(&Item::new(2, 0, 1), &grammar), "VP → .v, 1");
    }

    #[test]
    fn renders_epsilon_item() {
        let empty: Vec<&str> = Vec::new();
        let grammar =
            Grammar::new("S", [("S", empty)], crate::grammar::Lexicon::default()).unwrap();
        assert_eq!(render(&Item::new(0, 0, 3), &grammar), "S → ., 3");
    }

    #[test]
    fn ascii_arrow_and_case_are_folded() {
        assert!(matches("np -> pron ., 0", "NP → pron ., 0"));
        assert!(matches("  NP→pron.,0 ", "NP → pron ., 0"));
        assert!(matches("S -> NP . VP , 0", "S → NP .VP, 0"));
        assert!(matches("S  →   .NP    VP,0", "S → .NP VP, 0"));
        assert!(matches("S → NP •VP, 0", "S → NP .VP, 0"));
    }

    #[test]
    fn different_items_do_not_match() {
        assert!(!matches("S -> NP VP ., 0", "S → NP .VP, 0"));
        assert!(!matches("S -> .NP VP, 1", "S → .NP VP, 0"));
        assert!(!matches("S -> .NPVP, 0", "S → .NP VP, 0"));
    }

    #[test]
    fn full_width_input_is_folded() {
        assert!(matches("NP －＞ pron ., 0", "NP → pron ., 0"));
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            "np -> pron ., 0",
            "S → NP .VP PP, 0",
            "  A   ->  .  b  ,  2 ",
            "x - > y",
            "a . , b",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn every_built_item_survives_retyping() {
        let grammar = loader::load_bundled("english").unwrap();
        let chart = ChartBuilder::new(&grammar).build_sentence("i can write a book");
        for item in chart.sets().iter().flat_map(|s| s.iter()) {
            let canonical = render(item, &grammar);
            let typed = canonical.replace(" → ", "->").to_lowercase();
            assert_eq!(normalize(&typed), normalize(&canonical));
            assert_eq!(normalize(&render(item, &grammar)), normalize(&canonical));
        }
    }
}
