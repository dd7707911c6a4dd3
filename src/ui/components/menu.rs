use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::chart::builder::tokenize;
use crate::grammar::Grammar;
use crate::ui::theme::Theme;

/// At most this many samples get a digit shortcut.
const MAX_SAMPLE_KEYS: usize = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Sample(usize),
    Random,
    Custom,
    Theme,
    Quit,
}

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn for_grammar(grammar: &Grammar, theme_name: &str, theme: &'a Theme) -> Self {
        let mut items: Vec<MenuItem> = grammar
            .samples()
            .iter()
            .take(MAX_SAMPLE_KEYS)
            .enumerate()
            .map(|(i, sentence)| MenuItem {
                key: (i + 1).to_string(),
                label: sentence.clone(),
                description: t!(
                    "menu.sample_description",
                    count = tokenize(sentence).len(),
                    grammar = grammar.name()
                )
                .to_string(),
                action: MenuAction::Sample(i),
            })
            .collect();

        if !grammar.samples().is_empty() {
            items.push(MenuItem {
                key: "r".to_string(),
                label: t!("menu.random").to_string(),
                description: t!("menu.random_description").to_string(),
                action: MenuAction::Random,
            });
        }
        items.push(MenuItem {
            key: "c".to_string(),
            label: t!("menu.custom").to_string(),
            description: t!("menu.custom_description").to_string(),
            action: MenuAction::Custom,
        });
        items.push(MenuItem {
            key: "t".to_string(),
            label: t!("menu.theme").to_string(),
            description: t!("menu.theme_description", theme = theme_name).to_string(),
            action: MenuAction::Theme,
        });
        items.push(MenuItem {
            key: "q".to_string(),
            label: t!("menu.quit").to_string(),
            description: t!("menu.quit_description").to_string(),
            action: MenuAction::Quit,
        });

        Self {
            items,
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|item| item.action)
    }

    pub fn action_for_key(&self, key: char) -> Option<MenuAction> {
        let key = key.to_string();
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.action)
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                t!("app.title"),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                t!("app.tagline"),
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        // Keep the selected entry visible when the list is taller than the area.
        let per_item: u16 = 2;
        let visible = (layout[2].height / per_item).max(1) as usize;
        let first = self.selected.saturating_sub(visible - 1);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                (0..visible)
                    .map(|_| Constraint::Length(per_item))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (slot, (i, item)) in self.items.iter().enumerate().skip(first).enumerate() {
            if slot >= menu_layout.len() {
                break;
            }
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{}] {}", item.key, item.label);
            let desc_text = format!("       {}", item.description);

            let lines = vec![
                Line::from(Span::styled(
                    label_text,
                    Style::default()
                        .fg(if is_selected {
                            colors.accent()
                        } else {
                            colors.fg()
                        })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                )),
                Line::from(Span::styled(
                    desc_text,
                    Style::default().fg(colors.item_pending()),
                )),
            ];

            Paragraph::new(lines).render(menu_layout[slot], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::loader;

    #[test]
    fn samples_get_digit_keys_then_fixed_entries() {
        let grammar = loader::load_bundled("english").unwrap();
        let theme = Theme::default();
        let menu = Menu::for_grammar(&grammar, "catppuccin-mocha", &theme);

        let keys: Vec<&str> = menu.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "2", "3", "4", "r", "c", "t", "q"]);
        assert_eq!(menu.items[0].label, "i can write");
        assert_eq!(menu.action_for_key('3'), Some(MenuAction::Sample(2)));
        assert_eq!(menu.action_for_key('c'), Some(MenuAction::Custom));
        assert_eq!(menu.action_for_key('9'), None);
    }

    #[test]
    fn grammar_without_samples_has_no_random_entry() {
        let grammar = crate::grammar::tiny_grammar();
        let theme = Theme::default();
        let mut menu = Menu::for_grammar(&grammar, "x", &theme);
        assert_eq!(menu.selected_action(), Some(MenuAction::Custom));
        menu.prev();
        assert_eq!(menu.selected_action(), Some(MenuAction::Quit));
        menu.next();
        assert_eq!(menu.selected_action(), Some(MenuAction::Custom));
    }
}
