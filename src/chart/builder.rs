use crate::chart::{Chart, Item, ItemSet};
use crate::grammar::{Grammar, Symbol};

/// Computes Earley charts for a fixed grammar.
pub struct ChartBuilder<'g> {
    grammar: &'g Grammar,
}

pub fn tokenize(sentence: &str) -> Vec<String> {
    sentence.split_whitespace().map(str::to_string).collect()
}

impl<'g> ChartBuilder<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    pub fn build_sentence(&self, sentence: &str) -> Chart {
        self.build(&tokenize(sentence))
    }

    /// Builds sets `0..=tokens.len()`.
    ///
    /// Set 0 is seeded with the start productions in grammar order. Each set
    /// is then closed by walking its items in insertion order: an item
    /// waiting on a non-terminal predicts that non-terminal's productions
    /// (grammar order), and a completed item advances the items of its
    /// origin set that were waiting on its head (origin-set order). New
    /// items are appended and walked in turn. Only once a set is closed are
    /// its terminal-expecting items scanned against the next word; the
    /// scanned items open the next set in the order of the items that
    /// produced them.
    ///
    /// This ordering is what the drill uses as the item order of each step,
    /// so changing it changes every answer key.
    pub fn build(&self, tokens: &[String]) -> Chart {
        let n = tokens.len();
        let mut sets: Vec<ItemSet> = (0..=n).map(ItemSet::new).collect();
        for &id in self.grammar.start_productions() {
            sets[0].insert(Item::new(id, 0, 0));
        }

        for k in 0..=n {
            self.close(&mut sets, k);
            if k < n {
                self.scan(&mut sets, k, &tokens[k]);
            }
        }

        Chart::new(tokens.to_vec(), sets)
    }

    fn close(&self, sets: &mut [ItemSet], k: usize) {
        let mut cursor = 0;
        while cursor < sets[k].len() {
            let item = sets[k].items()[cursor];
            cursor += 1;
            match item.next_symbol(self.grammar) {
                Some(Symbol::NonTerminal(name)) => self.predict(sets, k, item, name),
                Some(Symbol::Terminal(_)) => {}
                None => self.complete(sets, k, item),
            }
        }
    }

    fn predict(&self, sets: &mut [ItemSet], k: usize, item: Item, name: &str) {
        for &id in self.grammar.productions_for(name) {
            sets[k].insert(Item::new(id, 0, k));
        }

        // `name` may already have been completed at k through an
        // ε-derivation; its completion walk ran before `item` existed.
        let nullable_here = sets[k].iter().any(|done| {
            done.origin == k && done.is_complete(self.grammar) && done.head(self.grammar) == name
        });
        if nullable_here {
            sets[k].insert(item.advance());
        }
    }

    fn complete(&self, sets: &mut [ItemSet], k: usize, item: Item) {
        let head = item.head(self.grammar);
        let waiting: Vec<Item> = sets[item.origin]
            .iter()
            .filter(|w| {
                matches!(w.next_symbol(self.grammar), Some(Symbol::NonTerminal(n)) if n == head)
            })
            .copied()
            .collect();
        for w in waiting {
            sets[k].insert(w.advance());
        }
    }

    fn scan(&self, sets: &mut [ItemSet], k: usize, token: &str) {
        let tags = self.grammar.lookup(token);
        if tags.is_empty() {
            return;
        }
        let scanned: Vec<Item> = sets[k]
            .iter()
            .filter(|item| match item.next_symbol(self.grammar) {
                Some(Symbol::Terminal(tag)) => tags.contains(tag),
                _ => false,
            })
            .map(|item| item.advance())
            .collect();
        for item in scanned {
            sets[k + 1].insert(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::chart::notation::render;
    use crate::grammar::loader;
    use crate::grammar::{Lexicon, tiny_grammar};

    fn rendered(chart: &Chart, grammar: &Grammar, k: usize) -> Vec<String> {
        chart.sets()[k]
            .iter()
            .map(|item| render(item, grammar))
            .collect()
    }

    #[test]
    fn tiny_scenario_matches_hand_computed_chart() {
        let grammar = tiny_grammar();
        let chart = ChartBuilder::new(&grammar).build_sentence("i jump");

        assert_eq!(chart.sets().len(), 3);
        assert_eq!(
            rendered(&chart, &grammar, 0),
            vec!["S → .NP VP, 0", "NP → .pron, 0"]
        );
        assert_eq!(
            rendered(&chart, &grammar, 1),
            vec!["NP → pron ., 0", "S → NP .VP, 0", "VP → .v, 1"]
        );
        assert_eq!(
            rendered(&chart, &grammar, 2),
            vec!["VP → v ., 1", "S → NP VP ., 0"]
        );
        assert!(chart.accepts(&grammar));
        assert_eq!(chart.dead_end(), None);
    }

    #[test]
    fn build_is_deterministic() {
        let grammar = loader::load_bundled("english").unwrap();
        let builder = ChartBuilder::new(&grammar);
        let first = builder.build_sentence("i can write a book");
        let second = builder.build_sentence("i can write a book");
        assert_eq!(first, second);
    }

    #[test]
    fn sets_have_no_duplicates() {
        let grammar = loader::load_bundled("english").unwrap();
        let chart = ChartBuilder::new(&grammar).build_sentence("they can write a book");
        for set in chart.sets() {
            let unique: HashSet<_> = set.iter().collect();
            assert_eq!(unique.len(), set.len(), "duplicate in set {}", set.position());
        }
    }

    #[test]
    fn english_seed_set_lists_start_productions_first() {
        let grammar = loader::load_bundled("english").unwrap();
        let chart = ChartBuilder::new(&grammar).build_sentence("i can write");
        assert_eq!(
            rendered(&chart, &grammar, 0),
            vec![
                "S → .NP VP, 0",
                "S → .NP VP PP, 0",
                "NP → .pron, 0",
                "NP → .det NP3, 0",
            ]
        );
    }

    #[test]
    fn english_aux_step_covers_every_reading_of_can() {
        let grammar = loader::load_bundled("english").unwrap();
        let chart = ChartBuilder::new(&grammar).build_sentence("i can write");
        let step2: HashSet<String> = rendered(&chart, &grammar, 2).into_iter().collect();
        for expected in [
            "VP → aux .VP1, 1",
            "VP1 → v ., 1",
            "VP1 → v .NP3, 1",
            "VP1 → .v, 2",
            "VP1 → .v NP3, 2",
            "NP3 → .adj NP3, 2",
            "NP3 → .noun, 2",
            "NP3 → .noun PP, 2",
            "NP3 → .det NP3, 2",
            "VP → VP1 ., 1",
            "S → NP VP ., 0",
            "S → NP VP .PP, 0",
            "PP → .prep NP2, 2",
        ] {
            assert!(step2.contains(expected), "missing {expected}");
        }
        assert_eq!(step2.len(), 13);
        assert!(chart.accepts(&grammar));
    }

    #[test]
    fn unfinished_sentence_is_not_accepted() {
        let grammar = loader::load_bundled("english").unwrap();
        let chart = ChartBuilder::new(&grammar).build_sentence("they can write a");
        assert!(!chart.accepts(&grammar));
        assert_eq!(chart.dead_end(), None);
    }

    #[test]
    fn unknown_word_leaves_dead_end() {
        let grammar = tiny_grammar();
        let chart = ChartBuilder::new(&grammar).build_sentence("i xyzzy jump");
        assert_eq!(chart.dead_end(), Some(2));
        assert!(chart.sets()[2].is_empty());
        assert!(chart.sets()[3].is_empty());
        assert_eq!(chart.unknown_words(&grammar), vec!["xyzzy"]);
    }

    #[test]
    fn known_word_with_wrong_tag_is_also_a_dead_end() {
        let grammar = tiny_grammar();
        let chart = ChartBuilder::new(&grammar).build_sentence("jump jump");
        assert_eq!(chart.dead_end(), Some(1));
        assert!(chart.unknown_words(&grammar).is_empty());
    }

    #[test]
    fn empty_sentence_has_only_seed_set() {
        let grammar = tiny_grammar();
        let chart = ChartBuilder::new(&grammar).build(&[]);
        assert_eq!(chart.sets().len(), 1);
        assert_eq!(chart.sets()[0].len(), 2);
    }

    #[test]
    fn epsilon_productions_reach_fixpoint() {
        let lexicon = Lexicon::from_entries([("x", vec!["x"])]).unwrap();
        let empty: Vec<&str> = Vec::new();
        let grammar = Grammar::new(
            "S",
            [("S", vec!["A", "B", "x"]), ("A", empty.clone()), ("B", vec!["A"])],
            lexicon,
        )
        .unwrap();
        let chart = ChartBuilder::new(&grammar).build_sentence("x");
        let seed = rendered(&chart, &grammar, 0);
        assert!(seed.contains(&"S → A B .x, 0".to_string()), "{seed:?}");
        assert!(chart.accepts(&grammar));
    }

    #[test]
    fn left_recursion_terminates() {
        let lexicon = Lexicon::from_entries([("a", vec!["a"])]).unwrap();
        let rules = [("S", vec!["S", "a"]), ("S", vec!["a"])];
        let grammar = Grammar::new("S", rules, lexicon).unwrap();
        let chart = ChartBuilder::new(&grammar).build_sentence("a a a");
        assert!(chart.accepts(&grammar));
        assert_eq!(chart.sets()[0].len(), 2);
    }

    #[test]
    fn ambiguous_words_keep_every_derivation() {
        let grammar = loader::load_bundled("english").unwrap();
        let chart = ChartBuilder::new(&grammar).build_sentence("i can fish");
        let last: HashSet<String> = rendered(&chart, &grammar, 3).into_iter().collect();
        // "fish" as a verb after the auxiliary, and as a noun object of "can".
        assert!(last.contains("VP1 → v ., 2"));
        assert!(last.contains("NP3 → noun ., 2"));
    }
}
