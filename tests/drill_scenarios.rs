use std::fs;
use std::rc::Rc;
use std::time::{Duration, Instant};

use earley_drill::chart::builder::ChartBuilder;
use earley_drill::chart::notation;
use earley_drill::config::Config;
use earley_drill::grammar::loader;
use earley_drill::grammar::{Grammar, GrammarError};
use earley_drill::session::drill::{DrillError, DrillPhase, DrillSession};
use earley_drill::session::history::{Feedback, ItemSource};
use earley_drill::session::result::DrillResult;

fn english() -> Rc<Grammar> {
    Rc::new(loader::load_bundled("english").unwrap())
}

/// Loosens canonical notation the way a learner might type it.
fn retype(canonical: &str) -> String {
    canonical.replace('→', "->").to_lowercase()
}

/// Types every item the hint reveals until the drill finishes.
fn type_through(session: &mut DrillSession) -> usize {
    let mut typed = 0;
    for _ in 0..500 {
        if session.is_finished() {
            break;
        }
        if session.is_busy() {
            session.fire_pending();
            continue;
        }
        let expected = session
            .hint()
            .and_then(|h| h.next_item)
            .expect("an item should be waiting");
        session.submit_item(&retype(&expected)).unwrap();
        typed += 1;
    }
    typed
}

#[test]
fn typing_whole_english_chart_accepts_sentence() {
    let grammar = english();
    let mut session = DrillSession::new(Rc::clone(&grammar));
    session.start("i can write").unwrap();

    let chart = ChartBuilder::new(&grammar).build_sentence("i can write");
    let total: usize = chart.sets().iter().map(|s| s.len()).sum();

    let typed = type_through(&mut session);
    assert_eq!(typed, total);
    assert!(session.is_finished());
    assert_eq!(
        session.last_feedback(),
        Some(&Feedback::Finished { accepted: true })
    );

    let result = DrillResult::from_session(&session);
    assert!(result.accepted);
    assert!(!result.partial);
    assert_eq!(result.steps.len(), 4);
    assert_eq!(result.authored, total);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.accuracy, 100.0);
    assert_eq!(result.steps[2].items, 13);
}

#[test]
fn incomplete_sentence_finishes_without_acceptance() {
    let mut session = DrillSession::new(english());
    session.start("they can write a").unwrap();
    for _ in 0..500 {
        if session.is_finished() {
            break;
        }
        session.skip_item().unwrap();
        session.fire_pending();
    }
    assert!(session.is_finished());
    assert!(!session.accepted());
    assert_eq!(
        session.last_feedback(),
        Some(&Feedback::Finished { accepted: false })
    );
    let record = &session.history()[&4];
    assert!(record.items.iter().all(|i| i.source == ItemSource::Skipped));
}

#[test]
fn ambiguous_word_keeps_both_readings() {
    let grammar = english();
    let chart = ChartBuilder::new(&grammar).build_sentence("i can fish");
    assert!(chart.accepts(&grammar));
    let last: Vec<String> = chart
        .set(3)
        .unwrap()
        .iter()
        .map(|item| notation::render(item, &grammar))
        .collect();
    assert!(last.contains(&"VP1 → v ., 2".to_string()));
    assert!(last.contains(&"NP3 → noun ., 2".to_string()));
}

#[test]
fn unknown_word_dead_ends_then_finishes() {
    let mut session = DrillSession::new(english()).with_delay(Duration::ZERO);
    session.start("i can swim").unwrap();
    assert_eq!(session.unknown_words().len(), 1);
    assert_eq!(session.unknown_words()[0].position, 3);

    for _ in 0..100 {
        if session.phase() == (DrillPhase::StepComplete { step: 3 }) {
            break;
        }
        session.skip_item().unwrap();
        session.tick(Instant::now());
    }
    assert_eq!(session.phase(), DrillPhase::StepComplete { step: 3 });
    assert_eq!(
        session.last_feedback(),
        Some(&Feedback::DeadEnd {
            step: 3,
            word: "swim".to_string()
        })
    );
    assert!(session.history()[&3].is_dead_end());

    assert!(session.tick(Instant::now()));
    assert!(session.is_finished());
    assert!(!session.accepted());
}

#[test]
fn skip_burst_advances_one_item() {
    let mut session = DrillSession::new(english());
    session.start("i can write").unwrap();

    assert!(session.skip_item().unwrap().is_some());
    assert_eq!(session.skip_item(), Ok(None));
    assert_eq!(session.skip_item(), Ok(None));
    assert_eq!(
        session.submit_item("anything"),
        Err(DrillError::TransitionPending)
    );
    assert_eq!(session.revealed().len(), 1);
    assert_eq!(
        session.phase(),
        DrillPhase::InProgress {
            step: 0,
            item_index: 1
        }
    );
}

#[test]
fn grammar_file_from_disk_drives_a_drill() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colors.toml");
    fs::write(
        &path,
        r#"
name = "colors"
productions = ["S -> adj N", "N -> noun", "N -> adj N"]
samples = ["red red fox"]

[lexicon]
red = ["adj"]
fox = ["noun"]
"#,
    )
    .unwrap();

    let grammar = loader::resolve(path.to_str().unwrap()).unwrap();
    assert_eq!(grammar.name(), "colors");

    let mut session = DrillSession::new(Rc::new(grammar));
    session.start("red red fox").unwrap();
    type_through(&mut session);
    assert!(session.accepted());
}

#[test]
fn malformed_grammar_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, r#"productions = ["S NP VP"]"#).unwrap();

    let err = loader::load_path(&path).unwrap_err();
    assert!(matches!(err, GrammarError::MalformedProduction { .. }));
}

#[test]
fn config_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let missing = Config::load_from(&path).unwrap();
    assert_eq!(missing.feedback_delay_ms, 1000);

    let mut config = Config::default();
    config.grammar = "tiny".to_string();
    config.show_hint_by_default = true;
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.grammar, "tiny");
    assert!(loaded.show_hint_by_default);
}

#[test]
fn snapshot_serializes_for_presentation() {
    let mut session = DrillSession::new(english());
    session.start("i can write").unwrap();
    session.submit_item("S -> .NP VP, 0").unwrap();

    let json = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(json["phase"]["state"], "in_progress");
    assert_eq!(json["item_index"], 1);
    assert_eq!(json["revealed"][0]["source"], "authored");
    assert_eq!(json["last_feedback"]["kind"], "correct");
}
