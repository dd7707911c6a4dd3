use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};
use rust_i18n::t;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordState {
    Done,
    Current,
    Pending,
}

/// State of word `i` (0-based) while working on chart set `step`. Set `k`
/// is the set after word `k`, so the word being read is `step - 1`.
pub fn word_state(i: usize, step: usize, finished: bool) -> WordState {
    if finished || i + 1 < step {
        WordState::Done
    } else if i + 1 == step {
        WordState::Current
    } else {
        WordState::Pending
    }
}

/// Sentence words as boxes, with a fill bar for finished sets underneath.
pub struct WordStrip<'a> {
    pub words: &'a [String],
    pub step: usize,
    pub finished: bool,
    pub ratio: f64,
    pub theme: &'a Theme,
}

impl<'a> WordStrip<'a> {
    pub fn new(
        words: &'a [String],
        step: usize,
        finished: bool,
        ratio: f64,
        theme: &'a Theme,
    ) -> Self {
        Self {
            words,
            step,
            finished,
            ratio: ratio.clamp(0.0, 1.0),
            theme,
        }
    }
}

impl Widget for WordStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(t!("drill.words_title"))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 || inner.width < 4 {
            return;
        }

        let right = inner.x + inner.width;
        let mut x = inner.x + 1;
        for (i, word) in self.words.iter().enumerate() {
            let display = format!("[ {word} ]");
            let width = display.chars().count() as u16;
            if x + width > right {
                buf.set_string(
                    right.saturating_sub(1),
                    inner.y,
                    "\u{2026}",
                    Style::default().fg(colors.item_pending()),
                );
                break;
            }

            let style = match word_state(i, self.step, self.finished) {
                WordState::Done => Style::default().fg(colors.item_authored()),
                WordState::Current => Style::default()
                    .fg(colors.bg())
                    .bg(colors.focused_word())
                    .add_modifier(Modifier::BOLD),
                WordState::Pending => Style::default().fg(colors.item_pending()),
            };
            buf.set_string(x, inner.y, &display, style);
            x += width + 1;
        }

        if inner.height < 2 {
            return;
        }
        let bar_y = inner.y + 1;
        let filled_width = (self.ratio * inner.width as f64) as u16;
        for bx in inner.x..right {
            let style = if bx < inner.x + filled_width {
                Style::default().bg(colors.bar_filled())
            } else {
                Style::default().bg(colors.bar_empty())
            };
            buf[(bx, bar_y)].set_style(style);
        }
        let label = format!("{:.0}%", self.ratio * 100.0);
        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, bar_y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_step_has_no_current_word() {
        assert_eq!(word_state(0, 0, false), WordState::Pending);
        assert_eq!(word_state(1, 0, false), WordState::Pending);
    }

    #[test]
    fn current_word_is_the_one_just_scanned() {
        assert_eq!(word_state(0, 2, false), WordState::Done);
        assert_eq!(word_state(1, 2, false), WordState::Current);
        assert_eq!(word_state(2, 2, false), WordState::Pending);
    }

    #[test]
    fn finished_marks_every_word_done() {
        assert_eq!(word_state(2, 3, true), WordState::Done);
    }

    #[test]
    fn renders_current_word_highlighted() {
        let theme = Theme::default();
        let words = vec!["i".to_string(), "jump".to_string()];
        let area = Rect::new(0, 0, 30, 4);
        let mut buf = Buffer::empty(area);
        WordStrip::new(&words, 1, false, 0.5, &theme).render(area, &mut buf);

        let row: String = (0..30).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("[ i ]"));
        assert!(row.contains("[ jump ]"));
        assert_eq!(buf[(4, 1)].bg, theme.colors.focused_word());
    }
}
