//! Replays the fixture scripts through a real engine and checks the NDJSON
//! event stream the headless driver would print.

use std::path::PathBuf;

use screen_mirror::{replay, HeadlessEvent, ReplaySummary};
use scrmirror_app::config::load_settings;
use scrmirror_app::{Engine, Settings};
use scrmirror_core::{ConnectionStep, ExceptionKind, SessionComponent, StepStatus};
use tempfile::tempdir;
use tokio::io::BufReader;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("scripts")
        .join(name)
}

async fn run_fixture(name: &str) -> (ReplaySummary, Vec<HeadlessEvent>) {
    run_fixture_with(name, Settings::default()).await
}

async fn run_fixture_with(name: &str, settings: Settings) -> (ReplaySummary, Vec<HeadlessEvent>) {
    let file = tokio::fs::File::open(fixture(name))
        .await
        .expect("fixture should exist");
    let mut engine = Engine::new(settings);
    let mut out = Vec::new();

    let summary = replay(BufReader::new(file), &mut engine, &mut |e: HeadlessEvent| {
        out.push(e)
    })
    .await
    .expect("replay should succeed");

    (summary, out)
}

fn transitions(events: &[HeadlessEvent], device_session: u64) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            HeadlessEvent::StateChanged { session_id, to, .. } if *session_id == device_session => {
                Some(to.clone())
            }
            _ => None,
        })
        .collect()
}

fn session_of(events: &[HeadlessEvent], device: &str) -> u64 {
    events
        .iter()
        .find_map(|e| match e {
            HeadlessEvent::SessionCreated {
                session_id,
                device_id,
                ..
            } if device_id == device => Some(*session_id),
            _ => None,
        })
        .expect("session should be created")
}

fn summary_of<'a>(events: &'a [HeadlessEvent], device: &str) -> &'a HeadlessEvent {
    events
        .iter()
        .find(|e| matches!(e, HeadlessEvent::Summary { device_id, .. } if device_id == device))
        .expect("summary should be emitted")
}

#[tokio::test]
async fn test_connect_and_recover() {
    let (summary, events) = run_fixture("connect_and_recover.ndjson").await;

    assert_eq!(summary.applied, 15);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.sessions, 1);

    let id = session_of(&events, "emulator-5554");
    assert_eq!(
        transitions(&events, id),
        vec![
            "adb_connecting",
            "adb_connected",
            "server_starting",
            "server_started",
            "connected",
            "reconnecting (1)",
            "connected",
        ]
    );

    let requests: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            HeadlessEvent::ReconnectRequested {
                attempt, reason, ..
            } => Some((*attempt, reason.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(requests, vec![(1, "video socket disconnected")]);

    assert!(events.iter().any(|e| matches!(
        e,
        HeadlessEvent::Progress {
            step: ConnectionStep::AdbForward,
            status: StepStatus::Success,
            message,
            ..
        } if message == "Port forwarding established: tcp:27183 -> localabstract:scrcpy"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        HeadlessEvent::Component {
            component: SessionComponent::VideoDecoder,
            state: Some(_),
            ..
        }
    )));

    match summary_of(&events, "emulator-5554") {
        HeadlessEvent::Summary {
            state,
            reconnect_attempts,
            failed_step,
            event_counts,
            exceptions_total,
            disconnect_reason,
            ..
        } => {
            assert_eq!(state, "connected");
            assert_eq!(*reconnect_attempts, 1);
            assert_eq!(*failed_step, None);
            assert_eq!(event_counts.get("socket_connected"), Some(&4));
            assert_eq!(event_counts.get("socket_disconnected"), Some(&1));
            assert_eq!(event_counts.get("request_reconnect"), Some(&1));
            assert_eq!(*exceptions_total, 0);
            assert_eq!(disconnect_reason.as_deref(), Some("video socket disconnected"));
        }
        other => panic!("unexpected event {:?}", other),
    }

    assert_eq!(events.last().map(|e| e.event_type()), Some("shutdown"));
}

#[tokio::test]
async fn test_exhausted_reconnects_fail_the_session() {
    let (summary, events) = run_fixture("exhaust_reconnects.ndjson").await;

    assert_eq!(summary.errors, 0);

    let id = session_of(&events, "R58M123ABC");
    let states = transitions(&events, id);
    assert_eq!(
        &states[states.len() - 7..],
        &[
            "reconnecting (1)",
            "connected",
            "reconnecting (2)",
            "connected",
            "reconnecting (3)",
            "connected",
            "failed: video socket disconnected",
        ]
    );

    let attempts: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            HeadlessEvent::ReconnectRequested { attempt, .. } => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2, 3]);

    match summary_of(&events, "R58M123ABC") {
        HeadlessEvent::Summary {
            state,
            reconnect_attempts,
            ..
        } => {
            assert_eq!(state, "failed: video socket disconnected");
            assert_eq!(*reconnect_attempts, 3);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_lines_do_not_stop_other_devices() {
    let (summary, events) = run_fixture("two_devices_with_bad_lines.ndjson").await;

    assert_eq!(
        summary,
        ReplaySummary {
            applied: 5,
            errors: 2,
            sessions: 2
        }
    );

    let error_lines: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            HeadlessEvent::ScriptError { line, .. } => Some(*line),
            _ => None,
        })
        .collect();
    assert_eq!(error_lines, vec![3, 4]);

    let offline = session_of(&events, "emulator-5556");
    assert_eq!(
        transitions(&events, offline),
        vec!["adb_connecting", "adb_disconnected: device offline", "idle"]
    );

    match summary_of(&events, "emulator-5554") {
        HeadlessEvent::Summary { state, .. } => assert_eq!(state, "adb_connected"),
        other => panic!("unexpected event {:?}", other),
    }
    match summary_of(&events, "emulator-5556") {
        HeadlessEvent::Summary {
            state,
            failed_step,
            exceptions_total,
            event_counts,
            ..
        } => {
            assert_eq!(state, "idle");
            assert_eq!(*failed_step, None);
            assert_eq!(*exceptions_total, 1);
            assert_eq!(event_counts.get("request_cleanup"), Some(&1));
        }
        other => panic!("unexpected event {:?}", other),
    }

    let failures: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            HeadlessEvent::Exception {
                session_id,
                kind,
                message,
                ..
            } => Some((*session_id, *kind, message.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(
        failures,
        vec![(
            offline,
            ExceptionKind::Adb,
            "Transport disconnected: device offline"
        )]
    );
}

#[tokio::test]
async fn test_reconnect_cap_comes_from_config_file() {
    let temp = tempdir().expect("temp dir");
    let config_dir = temp.path().join(".scrmirror");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    std::fs::write(
        config_dir.join("config.toml"),
        "[reconnect]\nmax_attempts = 1\n\n[session]\nexception_history = 4\n",
    )
    .expect("config file");

    let settings = load_settings(temp.path());
    assert_eq!(settings.reconnect.max_attempts, 1);

    let (summary, events) = run_fixture_with("exhaust_reconnects.ndjson", settings).await;
    assert_eq!(summary.errors, 0);

    let attempts: Vec<(u32, u32)> = events
        .iter()
        .filter_map(|e| match e {
            HeadlessEvent::ReconnectRequested {
                attempt,
                max_attempts,
                ..
            } => Some((*attempt, *max_attempts)),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![(1, 1)]);

    let id = session_of(&events, "R58M123ABC");
    let states = transitions(&events, id);
    assert_eq!(
        &states[states.len() - 3..],
        &[
            "reconnecting (1)",
            "connected",
            "failed: video socket disconnected",
        ]
    );

    match summary_of(&events, "R58M123ABC") {
        HeadlessEvent::Summary {
            state,
            reconnect_attempts,
            ..
        } => {
            assert_eq!(state, "failed: video socket disconnected");
            assert_eq!(*reconnect_attempts, 1);
        }
        other => panic!("unexpected event {:?}", other),
    }
}
