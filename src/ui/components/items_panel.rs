use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::drill::DrillSnapshot;
use crate::session::history::{Feedback, ItemSource};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Good,
    Bad,
    Neutral,
}

/// One-line description of the latest outcome.
pub fn feedback_text(feedback: &Feedback) -> (String, Tone) {
    match feedback {
        Feedback::Correct { item } => {
            (t!("feedback.correct", item = item).to_string(), Tone::Good)
        }
        Feedback::Wrong {
            expected,
            submitted,
        } => (
            t!("feedback.wrong", expected = expected, submitted = submitted).to_string(),
            Tone::Bad,
        ),
        Feedback::Skipped { item } => (
            t!("feedback.skipped", item = item).to_string(),
            Tone::Neutral,
        ),
        Feedback::StepComplete { step } => {
            (t!("feedback.step_complete", step = step).to_string(), Tone::Good)
        }
        Feedback::DeadEnd { step, word } => (
            t!("feedback.dead_end", step = step, word = word).to_string(),
            Tone::Bad,
        ),
        Feedback::Finished { accepted: true } => {
            (t!("feedback.finished_accepted").to_string(), Tone::Good)
        }
        Feedback::Finished { accepted: false } => {
            (t!("feedback.finished_rejected").to_string(), Tone::Bad)
        }
    }
}

/// A row of the items panel.
#[derive(Debug, PartialEq, Eq)]
enum Row<'a> {
    Revealed {
        number: usize,
        text: &'a str,
        source: ItemSource,
    },
    /// The item the learner is working on.
    Current { number: usize },
    /// Items still hidden after the current one.
    Remaining { count: usize },
    Empty,
}

fn build_rows<'a>(snapshot: &DrillSnapshot<'a>) -> Vec<Row<'a>> {
    if snapshot.total_items == 0 {
        return vec![Row::Empty];
    }

    let mut rows: Vec<Row<'a>> = snapshot
        .revealed
        .iter()
        .enumerate()
        .map(|(i, item)| Row::Revealed {
            number: i + 1,
            text: &item.text,
            source: item.source,
        })
        .collect();

    let shown = snapshot.revealed.len();
    if shown < snapshot.total_items {
        rows.push(Row::Current { number: shown + 1 });
        let rest = snapshot.total_items - shown - 1;
        if rest > 0 {
            rows.push(Row::Remaining { count: rest });
        }
    }
    rows
}

/// Items of the current chart set: revealed ones in full, the rest as slots.
pub struct ItemsPanel<'a> {
    snapshot: &'a DrillSnapshot<'a>,
    theme: &'a Theme,
}

impl<'a> ItemsPanel<'a> {
    pub fn new(snapshot: &'a DrillSnapshot<'a>, theme: &'a Theme) -> Self {
        Self { snapshot, theme }
    }
}

impl Widget for ItemsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let lines: Vec<Line> = build_rows(self.snapshot)
            .into_iter()
            .map(|row| match row {
                Row::Revealed {
                    number,
                    text,
                    source,
                } => {
                    let (mark, color) = match source {
                        ItemSource::Authored => ("\u{2713}", colors.item_authored()),
                        ItemSource::Skipped => ("\u{00bb}", colors.item_skipped()),
                    };
                    Line::from(vec![
                        Span::styled(
                            format!(" {number:>2}. "),
                            Style::default().fg(colors.item_pending()),
                        ),
                        Span::styled(format!("{mark} "), Style::default().fg(color)),
                        Span::styled(text.to_string(), Style::default().fg(color)),
                    ])
                }
                Row::Current { number } => Line::from(vec![
                    Span::styled(
                        format!(" {number:>2}. "),
                        Style::default().fg(colors.item_pending()),
                    ),
                    Span::styled(
                        format!(" {} ", t!("drill.pending_slot")),
                        Style::default()
                            .fg(colors.cursor_fg())
                            .bg(colors.cursor_bg())
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Row::Remaining { count } => Line::from(Span::styled(
                    format!("     {}", "\u{00b7} ".repeat(count.min(40))),
                    Style::default().fg(colors.item_pending()),
                )),
                Row::Empty => Line::from(Span::styled(
                    format!(" {}", t!("drill.empty_set")),
                    Style::default().fg(colors.warning()),
                )),
            })
            .collect();

        let block = Block::bordered()
            .title(t!("drill.items_title", step = self.snapshot.step))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::grammar::tiny_grammar;
    use crate::session::drill::DrillSession;

    #[test]
    fn fresh_set_shows_current_slot_and_remaining() {
        let mut session = DrillSession::new(Rc::new(tiny_grammar()));
        session.start("i jump").unwrap();
        let snapshot = session.snapshot();
        assert_eq!(
            build_rows(&snapshot),
            vec![Row::Current { number: 1 }, Row::Remaining { count: 1 }]
        );
    }

    #[test]
    fn revealed_items_keep_their_source() {
        let mut session = DrillSession::new(Rc::new(tiny_grammar()));
        session.start("i jump").unwrap();
        session.skip_item().unwrap();
        let snapshot = session.snapshot();
        assert_eq!(
            build_rows(&snapshot),
            vec![
                Row::Revealed {
                    number: 1,
                    text: "S → .NP VP, 0",
                    source: ItemSource::Skipped
                },
                Row::Current { number: 2 },
            ]
        );
    }

    #[test]
    fn dead_end_set_renders_empty_row() {
        let mut session = DrillSession::new(Rc::new(tiny_grammar()));
        session.start("i swim").unwrap();
        for _ in 0..5 {
            session.skip_item().unwrap();
            session.fire_pending();
        }
        let snapshot = session.snapshot();
        assert_eq!(snapshot.step, 2);
        assert_eq!(build_rows(&snapshot), vec![Row::Empty]);
    }

    #[test]
    fn feedback_tones() {
        let (_, tone) = feedback_text(&Feedback::Wrong {
            expected: "a".to_string(),
            submitted: "b".to_string(),
        });
        assert_eq!(tone, Tone::Bad);
        let (text, tone) = feedback_text(&Feedback::StepComplete { step: 1 });
        assert_eq!(tone, Tone::Good);
        assert!(text.contains('1'));
        let (_, tone) = feedback_text(&Feedback::DeadEnd {
            step: 2,
            word: "swim".to_string(),
        });
        assert_eq!(tone, Tone::Bad);
    }
}
