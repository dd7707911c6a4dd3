use std::collections::BTreeMap;

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::history::StepRecord;
use crate::ui::theme::Theme;

pub struct HistorySidebar<'a> {
    history: &'a BTreeMap<usize, StepRecord>,
    total_sets: usize,
    elapsed_secs: f64,
    selected: Option<usize>,
    theme: &'a Theme,
}

impl<'a> HistorySidebar<'a> {
    pub fn new(
        history: &'a BTreeMap<usize, StepRecord>,
        total_sets: usize,
        elapsed_secs: f64,
        selected: Option<usize>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            history,
            total_sets,
            elapsed_secs,
            selected,
            theme,
        }
    }
}

/// Header line of a completed set, e.g. `set 1 'i'  3 items`.
fn step_summary(record: &StepRecord) -> String {
    let word = record
        .word
        .as_deref()
        .map(|w| format!(" '{w}'"))
        .unwrap_or_default();
    let mut text = format!("set {}{word}  {} items", record.step, record.items.len());
    if record.mistakes > 0 {
        text.push_str(&format!(", {} x", record.mistakes));
    }
    text
}

impl Widget for HistorySidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(3)])
            .split(area);

        // Totals so far
        {
            let mistakes: u32 = self.history.values().map(|r| r.mistakes).sum();
            let lines = vec![
                Line::from(Span::styled(
                    t!("sidebar.progress", done = self.history.len(), total = self.total_sets),
                    Style::default().fg(colors.accent()),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    t!("sidebar.mistakes", count = mistakes),
                    Style::default().fg(if mistakes == 0 {
                        colors.success()
                    } else {
                        colors.error()
                    }),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    t!("sidebar.time", secs = format!("{:.1}", self.elapsed_secs)),
                    Style::default().fg(colors.fg()),
                )),
            ];

            let block = Block::bordered()
                .title(t!("sidebar.title"))
                .border_style(Style::default().fg(colors.border()))
                .style(Style::default().bg(colors.bg()));
            Paragraph::new(lines).block(block).render(sections[0], buf);
        }

        // Completed sets, the selected one expanded
        let mut lines: Vec<Line> = Vec::new();
        if self.history.is_empty() {
            lines.push(Line::from(Span::styled(
                t!("sidebar.none"),
                Style::default().fg(colors.item_pending()),
            )));
        }
        for (step, record) in self.history {
            let expanded = self.selected == Some(*step);
            let marker = if expanded { "\u{25be}" } else { "\u{25b8}" };
            let color = if record.is_dead_end() {
                colors.warning()
            } else {
                colors.fg()
            };
            let mut style = Style::default().fg(color);
            if expanded {
                style = style.add_modifier(Modifier::BOLD);
            }
            lines.push(Line::from(Span::styled(
                format!("{marker} {}", step_summary(record)),
                style,
            )));

            if expanded {
                for item in &record.items {
                    let item_color = if item.is_skipped() {
                        colors.item_skipped()
                    } else {
                        colors.item_authored()
                    };
                    lines.push(Line::from(Span::styled(
                        format!("   {}", item.text),
                        Style::default().fg(item_color),
                    )));
                }
            }
        }

        let block = Block::bordered()
            .title(t!("sidebar.history_title"))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(sections[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::history::RevealedItem;

    #[test]
    fn summary_names_word_and_mistakes() {
        let record = StepRecord {
            step: 1,
            word: Some("i".to_string()),
            items: vec![RevealedItem::skipped("NP → pron ., 0".to_string())],
            mistakes: 2,
            completed: true,
        };
        assert_eq!(step_summary(&record), "set 1 'i'  1 items, 2 x");
    }

    #[test]
    fn seed_summary_has_no_word() {
        let record = StepRecord {
            step: 0,
            word: None,
            items: Vec::new(),
            mistakes: 0,
            completed: true,
        };
        assert_eq!(step_summary(&record), "set 0  0 items");
    }
}
