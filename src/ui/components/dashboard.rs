use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::session::result::DrillResult;
use crate::ui::theme::Theme;

pub struct Dashboard<'a> {
    pub result: &'a DrillResult,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(result: &'a DrillResult, theme: &'a Theme) -> Self {
        Self { result, theme }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let result = self.result;

        let title = if result.partial {
            t!("result.partial_title")
        } else {
            t!("result.title")
        };
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        let (verdict, verdict_color) = if result.accepted {
            (t!("result.accepted"), colors.success())
        } else {
            (t!("result.rejected"), colors.error())
        };
        let sentence_line = Line::from(vec![
            Span::styled(
                format!("\"{}\"  ", result.sentence),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                verdict,
                Style::default()
                    .fg(verdict_color)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(sentence_line)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let items_line = Line::from(vec![
            Span::styled(format!("  {}", t!("result.items")), Style::default().fg(colors.fg())),
            Span::styled(
                result.total_items.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  ({})",
                    t!(
                        "result.items_detail",
                        authored = result.authored,
                        skipped = result.skipped
                    )
                ),
                Style::default().fg(colors.item_pending()),
            ),
        ]);
        Paragraph::new(items_line).render(layout[1], buf);

        let acc_color = if result.accuracy >= 95.0 {
            colors.success()
        } else if result.accuracy >= 75.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let acc_line = Line::from(vec![
            Span::styled(format!("  {}", t!("result.accuracy")), Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.1}%", result.accuracy),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(acc_line).render(layout[2], buf);

        let mistakes_line = Line::from(vec![
            Span::styled(format!("  {}", t!("result.mistakes")), Style::default().fg(colors.fg())),
            Span::styled(
                result.mistakes.to_string(),
                Style::default().fg(if result.mistakes == 0 {
                    colors.success()
                } else {
                    colors.error()
                }),
            ),
        ]);
        Paragraph::new(mistakes_line).render(layout[3], buf);

        let time_line = Line::from(vec![
            Span::styled(format!("  {}", t!("result.time")), Style::default().fg(colors.fg())),
            Span::styled(
                format!("{:.1}s", result.elapsed_secs),
                Style::default().fg(colors.fg()),
            ),
        ]);
        Paragraph::new(time_line).render(layout[4], buf);

        let mut per_step = vec![Line::from(Span::styled(
            format!("  {}", t!("result.per_step")),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        ))];
        for tally in &result.steps {
            let word = tally
                .word
                .as_deref()
                .map(|w| format!("'{w}'"))
                .unwrap_or_default();
            let color = if tally.items == 0 {
                colors.warning()
            } else if tally.mistakes > 0 || tally.skipped > 0 {
                colors.fg()
            } else {
                colors.success()
            };
            per_step.push(Line::from(Span::styled(
                t!(
                    "result.step_row",
                    step = tally.step,
                    word = word,
                    items = tally.items,
                    mistakes = tally.mistakes
                ),
                Style::default().fg(color),
            )));
        }
        Paragraph::new(per_step).render(layout[5], buf);

        Paragraph::new(Line::from(Span::styled(
            format!("  {}", t!("result.footer")),
            Style::default().fg(colors.accent()),
        )))
        .render(layout[6], buf);
    }
}
