use std::rc::Rc;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rust_i18n::t;

use crate::config::Config;
use crate::grammar::Grammar;
use crate::session::drill::{DrillError, DrillSession};
use crate::session::result::DrillResult;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    SentenceEntry,
    Drill,
    DrillResult,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub grammar: Rc<Grammar>,
    pub session: DrillSession,
    pub input: LineInput,
    pub menu: Menu<'static>,
    pub show_hint: bool,
    pub show_grammar: bool,
    /// Step expanded in the history sidebar.
    pub history_selected: Option<usize>,
    pub status: Option<StatusLine>,
    pub last_result: Option<DrillResult>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, grammar: Grammar, theme: Theme) -> Self {
        let theme: &'static Theme = Box::leak(Box::new(theme));
        let grammar = Rc::new(grammar);
        let session =
            DrillSession::new(Rc::clone(&grammar)).with_delay(config.feedback_delay());
        let menu = Menu::for_grammar(&grammar, &config.theme, theme);

        Self {
            screen: AppScreen::Menu,
            show_hint: config.show_hint_by_default,
            show_grammar: config.show_grammar_panel,
            config,
            theme,
            grammar,
            session,
            input: LineInput::new(""),
            menu,
            history_selected: None,
            status: None,
            last_result: None,
            should_quit: false,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusLine {
            kind,
            text: text.into(),
        });
    }

    pub fn run_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Sample(idx) => {
                if let Some(sentence) = self.grammar.samples().get(idx).cloned() {
                    self.start_drill(&sentence);
                }
            }
            MenuAction::Random => self.start_random_sample(),
            MenuAction::Custom => self.go_to_sentence_entry(),
            MenuAction::Theme => self.cycle_theme(),
            MenuAction::Quit => self.should_quit = true,
        }
    }

    pub fn start_drill(&mut self, sentence: &str) {
        if let Err(err) = self.session.start(sentence) {
            self.set_status(StatusKind::Error, err.to_string());
            return;
        }

        self.screen = AppScreen::Drill;
        self.status = None;
        self.last_result = None;
        self.history_selected = None;
        self.show_hint = self.config.show_hint_by_default;
        let symbols = self
            .grammar
            .symbol_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.input = LineInput::new("").with_vocabulary(symbols);

        let unknown = self.session.unknown_words();
        if !unknown.is_empty() {
            let words: Vec<&str> = unknown.iter().map(|u| u.word.as_str()).collect();
            self.set_status(
                StatusKind::Warning,
                t!("drill.unknown_words", words = words.join(", ")),
            );
        }
    }

    pub fn start_random_sample(&mut self) {
        if let Some(sentence) = self.grammar.samples().choose(&mut self.rng).cloned() {
            self.start_drill(&sentence);
        }
    }

    pub fn go_to_sentence_entry(&mut self) {
        let words = self
            .grammar
            .lexicon()
            .iter()
            .map(|(word, _)| word.to_string())
            .collect();
        self.input = LineInput::new("").with_vocabulary(words);
        self.status = None;
        self.screen = AppScreen::SentenceEntry;
    }

    pub fn submit_sentence(&mut self) {
        let sentence = self.input.value().to_string();
        self.start_drill(&sentence);
    }

    pub fn submit_item(&mut self) {
        let text = self.input.value().to_string();
        match self.session.submit_item(&text) {
            Ok(_) => {
                self.input.clear();
                self.status = None;
            }
            // The feedback line already shows the expected item.
            Err(DrillError::Mismatch { .. }) => {}
            Err(DrillError::TransitionPending) => {
                self.set_status(StatusKind::Info, t!("feedback.pending"));
            }
            Err(err) => self.set_status(StatusKind::Error, err.to_string()),
        }
    }

    pub fn skip_item(&mut self) {
        match self.session.skip_item() {
            Ok(Some(_)) => {
                self.input.clear();
                self.status = None;
            }
            Ok(None) => {}
            Err(err) => self.set_status(StatusKind::Error, err.to_string()),
        }
    }

    pub fn toggle_hint(&mut self) {
        self.show_hint = !self.show_hint;
    }

    pub fn select_history(&mut self, forward: bool) {
        let steps: Vec<usize> = self.session.history().keys().copied().collect();
        if steps.is_empty() {
            self.history_selected = None;
            return;
        }
        let current = self
            .history_selected
            .and_then(|s| steps.iter().position(|&k| k == s));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => steps.len() - 1,
            (Some(i), true) => (i + 1).min(steps.len() - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.history_selected = Some(steps[next]);
    }

    /// Fires any due transition and moves to the result screen once the
    /// drill finishes.
    pub fn tick(&mut self, now: Instant) {
        if self.screen != AppScreen::Drill {
            return;
        }
        if self.session.tick(now) && self.session.is_finished() {
            self.finish_drill();
        }
    }

    pub fn finish_drill(&mut self) {
        self.last_result = Some(DrillResult::from_session(&self.session));
        self.screen = AppScreen::DrillResult;
    }

    /// Esc on the drill screen: show what was done so far, or go straight
    /// back to the menu when nothing was.
    pub fn leave_drill(&mut self) {
        if self.session.history().is_empty() {
            self.go_to_menu();
        } else {
            self.finish_drill();
        }
    }

    pub fn retry_drill(&mut self) {
        let sentence = match self.last_result {
            Some(ref result) => result.sentence.clone(),
            None => self.session.sentence(),
        };
        self.start_drill(&sentence);
    }

    pub fn go_to_menu(&mut self) {
        self.session.reset();
        self.input.clear();
        self.history_selected = None;
        self.screen = AppScreen::Menu;
    }

    pub fn cycle_theme(&mut self) {
        let themes = Theme::available_themes();
        if let Some(idx) = themes.iter().position(|t| *t == self.config.theme) {
            let next = (idx + 1) % themes.len();
            self.config.theme = themes[next].clone();
        } else if let Some(first) = themes.first() {
            self.config.theme = first.clone();
        }
        if let Some(new_theme) = Theme::load(&self.config.theme) {
            let theme: &'static Theme = Box::leak(Box::new(new_theme));
            self.theme = theme;
            self.menu = Menu::for_grammar(&self.grammar, &self.config.theme, theme);
        }
        if let Err(err) = Config::save_theme(&self.config.theme) {
            self.set_status(StatusKind::Warning, format!("{err:#}"));
        }
    }
}
