mod app;
mod chart;
mod config;
mod event;
mod grammar;
mod session;
mod ui;

rust_i18n::i18n!("locales", fallback = "en");

use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use rust_i18n::t;

use app::{App, AppScreen, StatusKind};
use chart::builder::ChartBuilder;
use config::Config;
use event::{AppEvent, EventHandler};
use session::drill::DrillPhase;
use ui::components::dashboard::Dashboard;
use ui::components::grammar_panel::GrammarPanel;
use ui::components::history_sidebar::HistorySidebar;
use ui::components::items_panel::{ItemsPanel, Tone, feedback_text};
use ui::components::word_strip::WordStrip;
use ui::layout::{AppLayout, pack_hint_lines};
use ui::line_input::{InputResult, LineInput};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "earley-drill",
    version,
    about = "Terminal drill for practicing Earley chart parsing"
)]
struct Cli {
    #[arg(short, long, help = "Grammar name, or path to a grammar TOML file")]
    grammar: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Start drilling this sentence right away")]
    sentence: Option<String>,

    #[arg(long, value_name = "SENTENCE", help = "Print the chart of a sentence and exit")]
    print_chart: Option<String>,

    #[arg(long, requires = "print_chart", help = "Print the chart as JSON")]
    json: bool,

    #[arg(long, help = "How long feedback stays before the drill moves on")]
    delay_ms: Option<u64>,

    #[arg(long, help = "Interface language (en, vi)")]
    lang: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    config.normalize_grammar(&grammar::loader::available_grammars());
    if let Some(lang) = cli.lang {
        config.language = lang;
    }
    config.normalize_language();
    rust_i18n::set_locale(&config.language);

    if let Some(delay) = cli.delay_ms {
        config.feedback_delay_ms = delay;
    }
    let grammar_arg = cli.grammar.unwrap_or_else(|| config.grammar.clone());
    let grammar = grammar::loader::resolve(&grammar_arg)
        .with_context(|| format!("loading grammar `{grammar_arg}`"))?;

    if let Some(sentence) = cli.print_chart {
        let chart = ChartBuilder::new(&grammar).build_sentence(&sentence);
        let report = chart.report(&grammar);
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{report}");
        }
        return Ok(());
    }

    if let Some(theme_name) = cli.theme {
        config.theme = theme_name;
    }
    let theme = Theme::load(&config.theme).unwrap_or_default();

    let mut app = App::new(config, grammar, theme);
    if let Some(sentence) = cli.sentence {
        app.start_drill(&sentence);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::SentenceEntry => handle_entry_key(app, key),
        AppScreen::Drill => handle_drill_key(app, key),
        AppScreen::DrillResult => handle_result_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                app.run_menu_action(action);
            }
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.run_menu_action(action);
            }
        }
        _ => {}
    }
}

fn handle_entry_key(app: &mut App, key: KeyEvent) {
    match app.input.handle(key) {
        InputResult::Submit => app.submit_sentence(),
        InputResult::Cancel => app.go_to_menu(),
        InputResult::Continue => {}
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => app.skip_item(),
        KeyCode::Char('h') if ctrl => app.toggle_hint(),
        KeyCode::F(1) => app.toggle_hint(),
        KeyCode::Char('r') if ctrl => app.go_to_menu(),
        KeyCode::Up => app.select_history(false),
        KeyCode::Down => app.select_history(true),
        _ => match app.input.handle(key) {
            InputResult::Submit => app.submit_item(),
            InputResult::Cancel => app.leave_drill(),
            InputResult::Continue => {}
        },
    }
}

fn handle_result_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('r') => app.retry_drill(),
        KeyCode::Char('n') => app.start_random_sample(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::SentenceEntry => render_entry(frame, app),
        AppScreen::Drill => render_drill(frame, app),
        AppScreen::DrillResult => render_result(frame, app),
    }
}

fn header_line<'a>(app: &App, title: String, info: String) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    Paragraph::new(Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.item_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()))
}

fn status_line<'a>(app: &App) -> Option<Line<'a>> {
    let colors = &app.theme.colors;
    let status = app.status.as_ref()?;
    let color = match status.kind {
        StatusKind::Info => colors.accent(),
        StatusKind::Warning => colors.warning(),
        StatusKind::Error => colors.error(),
    };
    Some(Line::from(Span::styled(
        format!(" {}", status.text),
        Style::default().fg(color),
    )))
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let info = format!(
        " {} | {} productions | {} words",
        app.grammar.name(),
        app.grammar.productions().len(),
        app.grammar.lexicon().len(),
    );
    frame.render_widget(
        header_line(app, format!(" {} ", t!("app.title")), info),
        layout[0],
    );

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    if let Some(line) = status_line(app) {
        frame.render_widget(Paragraph::new(line), layout[2]);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        format!(" {}", t!("menu.footer")),
        Style::default().fg(colors.item_pending()),
    )));
    frame.render_widget(footer, layout[3]);
}

fn render_input(
    frame: &mut ratatui::Frame,
    app: &App,
    input: &LineInput,
    title: String,
    area: ratatui::layout::Rect,
) {
    let colors = &app.theme.colors;
    let (before, cursor_ch, after) = input.render_parts();
    let cursor_style = Style::default()
        .fg(colors.cursor_fg())
        .bg(colors.cursor_bg());
    let border = if input.completion_miss {
        colors.warning()
    } else {
        colors.border_focused()
    };

    let line = Line::from(vec![
        Span::styled(format!(" {before}"), Style::default().fg(colors.fg())),
        Span::styled(cursor_ch.map_or(" ".to_string(), |c| c.to_string()), cursor_style),
        Span::styled(after.to_string(), Style::default().fg(colors.fg())),
    ]);
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(colors.bg()));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_entry(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let centered = ui::layout::centered_rect(60, 40, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(centered);

    let prompt = Paragraph::new(Line::from(Span::styled(
        format!(" {}", t!("entry.prompt", grammar = app.grammar.name())),
        Style::default().fg(colors.fg()),
    )))
    .wrap(Wrap { trim: false });
    frame.render_widget(prompt, layout[0]);

    render_input(frame, app, &app.input, t!("entry.title").to_string(), layout[1]);

    if let Some(line) = status_line(app) {
        frame.render_widget(Paragraph::new(line), layout[2]);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        format!(" {}", t!("entry.footer")),
        Style::default().fg(colors.accent()),
    )));
    frame.render_widget(footer, layout[4]);
}

fn render_drill(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let session = &app.session;
    let snapshot = session.snapshot();

    let app_layout = AppLayout::new(area);
    let tier = app_layout.tier;

    // Header: step, word and its tags
    let word_info = match snapshot.word.as_deref() {
        Some(word) => {
            let tags = session.grammar().lookup(word);
            let tag_text = if tags.is_empty() {
                "?".to_string()
            } else {
                tags.join(", ")
            };
            format!(
                "{} | {}",
                t!("drill.word", word = word),
                t!("drill.tags", tags = tag_text)
            )
        }
        None => t!("drill.seed_word").to_string(),
    };
    let title = t!(
        "drill.header",
        step = snapshot.step,
        last = session.tokens().len()
    )
    .to_string();
    frame.render_widget(
        header_line(app, title, format!(" {word_info}")),
        app_layout.header,
    );

    let show_strip = tier.show_word_strip(area.height);
    let show_grammar = app.show_grammar && tier.show_grammar_panel(area.height);
    let hint = if app.show_hint { session.hint() } else { None };

    let mut constraints: Vec<Constraint> = Vec::new();
    if show_strip {
        constraints.push(Constraint::Length(4));
    }
    constraints.push(Constraint::Min(5));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(3));
    if hint.is_some() {
        constraints.push(Constraint::Length(5));
    }
    if show_grammar {
        constraints.push(Constraint::Length(10));
    }

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);
    let mut idx = 0;

    if show_strip {
        let strip = WordStrip::new(
            session.tokens(),
            snapshot.step,
            session.is_finished(),
            session.progress(),
            app.theme,
        );
        frame.render_widget(strip, main_layout[idx]);
        idx += 1;
    }

    frame.render_widget(ItemsPanel::new(&snapshot, app.theme), main_layout[idx]);
    idx += 1;

    // Feedback takes the line unless there is nothing to report.
    let feedback = snapshot
        .last_feedback
        .map(|fb| {
            let (text, tone) = feedback_text(fb);
            let color = match tone {
                Tone::Good => colors.success(),
                Tone::Bad => colors.error(),
                Tone::Neutral => colors.item_skipped(),
            };
            Line::from(Span::styled(format!(" {text}"), Style::default().fg(color)))
        })
        .or_else(|| status_line(app));
    if let Some(line) = feedback {
        frame.render_widget(Paragraph::new(line), main_layout[idx]);
    }
    idx += 1;

    let input_title = match snapshot.phase {
        DrillPhase::InProgress { item_index, .. } => t!(
            "drill.input_title",
            index = item_index + 1,
            total = snapshot.total_items
        )
        .to_string(),
        _ => t!("drill.input_done").to_string(),
    };
    render_input(frame, app, &app.input, input_title, main_layout[idx]);
    idx += 1;

    if let Some(hint) = hint {
        let mut lines = vec![match hint.word {
            Some(ref word) => Line::from(t!("hint.word", word = word)),
            None => Line::from(t!("hint.no_word")),
        }];
        if hint.word.is_some() {
            lines.push(if hint.tags.is_empty() {
                Line::from(t!("hint.no_tags"))
            } else {
                Line::from(t!("hint.tags", tags = hint.tags.join(", ")))
            });
        }
        if let Some(ref item) = hint.next_item {
            lines.push(Line::from(Span::styled(
                t!("hint.next_item", item = item),
                Style::default().fg(colors.accent_dim()),
            )));
        }
        let block = Block::bordered()
            .title(t!("hint.title"))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()).fg(colors.fg()));
        frame.render_widget(Paragraph::new(lines).block(block), main_layout[idx]);
        idx += 1;
    }

    if show_grammar {
        let panel = GrammarPanel::new(
            session.grammar(),
            session.tokens(),
            snapshot.word.as_deref(),
            app.theme,
        );
        frame.render_widget(panel, main_layout[idx]);
    }

    if let Some(sidebar_area) = app_layout.sidebar {
        let sidebar = HistorySidebar::new(
            session.history(),
            session.tokens().len() + 1,
            session.elapsed_secs(),
            app.history_selected,
            app.theme,
        );
        frame.render_widget(sidebar, sidebar_area);
    }

    let footer_text = t!("drill.footer");
    let hints: Vec<&str> = footer_text.split("  ").collect();
    let footer_line = pack_hint_lines(&hints, app_layout.footer.width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    let footer = Paragraph::new(Line::from(Span::styled(
        footer_line,
        Style::default().fg(colors.item_pending()),
    )));
    frame.render_widget(footer, app_layout.footer);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(ref result) = app.last_result {
        let centered = ui::layout::centered_rect(60, 70, area);
        let dashboard = Dashboard::new(result, app.theme);
        frame.render_widget(dashboard, centered);
    }
}
