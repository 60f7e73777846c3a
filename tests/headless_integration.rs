use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use drillr::app::{App, View};
use drillr::config::Config;
use drillr::menu::{TrainingMenu, TrainingMenuItem};
use drillr::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use drillr::session::{SessionConfig, SessionEvent, SessionPhase, SessionRunner};
use drillr::storage::MemoryKeyValueStore;
use drillr::store::MenuStore;

fn aim_drills() -> TrainingMenu {
    TrainingMenu {
        id: "menu_aim".into(),
        title: "Aim Drills".into(),
        description: String::new(),
        items: vec![
            TrainingMenuItem {
                id: "i1".into(),
                name: "Tracking".into(),
                description: String::new(),
                duration_in_seconds: 2,
            },
            TrainingMenuItem {
                id: "i2".into(),
                name: "Flicks".into(),
                description: String::new(),
                duration_in_seconds: 1,
            },
        ],
    }
}

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Headless integration using the internal runtime + App without a TTY.
// Ticks carry a fixed simulated second each so the run is deterministic.
#[test]
fn headless_run_with_auto_start_completes() {
    let mut store = MenuStore::load(MemoryKeyValueStore::new());
    store.add(aim_drills());
    let config = Config {
        auto_start: true,
        interval_secs: 2,
        export_dir: None,
    };
    let mut app = App::new(store, config);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    // open the first menu and start its first item
    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Char(' '))).unwrap();

    let mut events = Vec::new();
    for _ in 0..50u32 {
        match runner.step() {
            AppEvent::Key(k) => app.handle_key(k),
            AppEvent::Resize => {}
            AppEvent::Tick => events.extend(app.on_tick(Duration::from_millis(500))),
        }
        if events.contains(&SessionEvent::SessionCompleted) {
            break;
        }
    }

    assert_eq!(app.view, View::Runner);
    let session = app.session.as_ref().expect("runner view keeps a session");
    assert_eq!(session.phase(), SessionPhase::Completed);
    assert_eq!(
        events,
        vec![
            SessionEvent::ItemCompleted(0),
            SessionEvent::IntervalStarted { next: 1, secs: 2 },
            SessionEvent::IntervalFinished,
            SessionEvent::ItemStarted(1),
            SessionEvent::ItemCompleted(1),
            SessionEvent::SessionCompleted,
        ]
    );
}

#[test]
fn headless_manual_flow_waits_for_user() {
    // Without auto start the second item sits idle until started by hand
    let mut session = SessionRunner::new(aim_drills(), SessionConfig::default());

    let (_tx, rx) = mpsc::channel::<AppEvent>();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    session.start_active();
    for _ in 0..10u32 {
        if let AppEvent::Tick = runner.step() {
            session.on_tick(Duration::from_secs(1));
        }
    }

    assert_eq!(session.phase(), SessionPhase::Item);
    assert_eq!(session.active_index(), 1);
    let timer = session.item_timer(1).unwrap();
    assert!(!timer.is_running());
    assert_eq!(timer.remaining_secs(), 1);

    assert_eq!(
        session.start_active(),
        vec![SessionEvent::ItemStarted(1)]
    );
    assert_eq!(
        session.on_tick(Duration::from_secs(1)),
        vec![SessionEvent::ItemCompleted(1), SessionEvent::SessionCompleted]
    );
}

#[test]
fn leaving_runner_drops_pending_ticks() {
    let mut store = MenuStore::load(MemoryKeyValueStore::new());
    store.add(aim_drills());
    let mut app = App::new(store, Config::default());

    app.open_runner("menu_aim");
    app.handle_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
    app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));

    assert_eq!(app.view, View::List);
    assert!(app.on_tick(Duration::from_secs(60)).is_empty());
}
