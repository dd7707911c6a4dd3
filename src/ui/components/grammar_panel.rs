use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::grammar::Grammar;
use crate::ui::theme::Theme;

/// Productions grouped by head, as `NP → pron | det NP3`.
pub fn grouped_productions(grammar: &Grammar) -> Vec<String> {
    let mut heads: Vec<&str> = Vec::new();
    for production in grammar.productions() {
        if !heads.contains(&production.head.as_str()) {
            heads.push(&production.head);
        }
    }

    heads
        .into_iter()
        .map(|head| {
            let bodies: Vec<String> = grammar
                .productions_for(head)
                .iter()
                .map(|&id| {
                    let body = &grammar.production(id).body;
                    if body.is_empty() {
                        "ε".to_string()
                    } else {
                        body.iter()
                            .map(|s| s.name())
                            .collect::<Vec<_>>()
                            .join(" ")
                    }
                })
                .collect();
            format!("{head} → {}", bodies.join(" | "))
        })
        .collect()
}

/// Reference panel: the productions and the lexicon entries of the sentence.
pub struct GrammarPanel<'a> {
    grammar: &'a Grammar,
    words: &'a [String],
    focused_word: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> GrammarPanel<'a> {
    pub fn new(
        grammar: &'a Grammar,
        words: &'a [String],
        focused_word: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            grammar,
            words,
            focused_word,
            theme,
        }
    }
}

impl Widget for GrammarPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(t!("grammar_panel.title", name = self.grammar.name()))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(inner);

        let rules: Vec<Line> = grouped_productions(self.grammar)
            .into_iter()
            .map(|rule| Line::from(Span::styled(rule, Style::default().fg(colors.fg()))))
            .collect();
        Paragraph::new(rules)
            .wrap(Wrap { trim: false })
            .render(columns[0], buf);

        let mut lexicon = vec![Line::from(Span::styled(
            t!("grammar_panel.lexicon"),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ))];
        let mut seen: Vec<&str> = Vec::new();
        for word in self.words {
            if seen.contains(&word.as_str()) {
                continue;
            }
            seen.push(word);
            let tags = self.grammar.lookup(word);
            let tag_text = if tags.is_empty() {
                "?".to_string()
            } else {
                tags.join(", ")
            };
            let style = if self.focused_word == Some(word.as_str()) {
                Style::default()
                    .fg(colors.focused_word())
                    .add_modifier(Modifier::BOLD)
            } else if tags.is_empty() {
                Style::default().fg(colors.error())
            } else {
                Style::default().fg(colors.fg())
            };
            lexicon.push(Line::from(Span::styled(format!("{word}: {tag_text}"), style)));
        }
        Paragraph::new(lexicon)
            .wrap(Wrap { trim: false })
            .render(columns[1], buf);
    }
}
