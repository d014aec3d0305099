//! Headless mode runner - replays a script of session events
//!
//! Each non-empty script line is a JSON object naming a device and one typed
//! session event:
//!
//! ```json
//! {"device":"emulator-5554","event":{"type":"socket_connected","kind":"video"}}
//! ```
//!
//! Lines starting with `#` are comments. A session is created the first time
//! a device appears. After each line the device's session is flushed, so the
//! output reflects the event before the next line is read.

use std::path::Path;

use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};

use scrmirror_app::{Engine, EngineEvent, ReconnectRequest, SessionId, Settings};
use scrmirror_core::prelude::*;
use scrmirror_core::SessionEvent;

use super::HeadlessEvent;

/// One line of a headless script
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptLine {
    pub device: String,
    pub event: SessionEvent,
}

impl ScriptLine {
    /// Parse a script line; `None` for blank lines and comments
    pub fn parse(line_no: usize, line: &str) -> Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| Error::script(line_no, e.to_string()))
    }
}

/// Counters reported once a script has been replayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Lines that carried an event
    pub applied: usize,
    /// Lines that were rejected
    pub errors: usize,
    /// Sessions created
    pub sessions: usize,
}

/// Run in headless mode - read a script (or stdin) and write NDJSON to stdout
pub async fn run_headless(script: Option<&Path>, settings: Settings) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("Screen mirror starting in HEADLESS mode");
    match script {
        Some(path) => info!("Script: {}", path.display()),
        None => info!("Script: <stdin>"),
    }
    info!("═══════════════════════════════════════════════════════");

    let mut engine = Engine::new(settings);
    let mut emit = |event: HeadlessEvent| event.emit();

    let summary = match script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            replay(BufReader::new(file), &mut engine, &mut emit).await?
        }
        None => replay(BufReader::new(tokio::io::stdin()), &mut engine, &mut emit).await?,
    };

    info!(
        "Replay finished: {} events applied, {} errors, {} sessions",
        summary.applied, summary.errors, summary.sessions
    );
    Ok(())
}

/// Replay `reader` through `engine`, handing every output event to `emit`.
///
/// Ends with a summary per session and an engine shutdown. Malformed lines
/// are reported as `script_error` events and skipped.
pub async fn replay<R, F>(reader: R, engine: &mut Engine, emit: &mut F) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(HeadlessEvent),
{
    let mut events = engine.subscribe();
    let mut reconnects = engine.take_reconnect_receiver();
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;

        let script_line = match ScriptLine::parse(line_no, &line) {
            Ok(Some(script_line)) => script_line,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}", e);
                summary.errors += 1;
                emit(HeadlessEvent::script_error(line_no, e.to_string()));
                continue;
            }
        };

        let session_id = match session_for(engine, &script_line.device) {
            Ok((id, created)) => {
                if created {
                    summary.sessions += 1;
                }
                id
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Line {}: {}", line_no, e);
                summary.errors += 1;
                emit(HeadlessEvent::script_error(line_no, e.to_string()));
                continue;
            }
        };

        debug!(
            "Line {}: {} <- {}",
            line_no,
            script_line.device,
            script_line.event.summary()
        );
        match apply(engine, session_id, script_line.event).await {
            Ok(()) => summary.applied += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Line {}: {}", line_no, e);
                summary.errors += 1;
                emit(HeadlessEvent::script_error(line_no, e.to_string()));
            }
        }

        drain_events(&mut events, emit);
        if let Some(rx) = reconnects.as_mut() {
            drain_reconnects(rx);
        }
    }

    for session_id in engine.session_ids() {
        let snapshot = engine.flush(session_id).await?;
        for line in snapshot
            .monitor
            .summary(&snapshot.device_id, &snapshot.state)
            .lines()
        {
            info!("{}", line);
        }
        emit(HeadlessEvent::summary(&snapshot));
    }

    engine.shutdown().await;
    drain_events(&mut events, emit);

    Ok(summary)
}

/// Dispatch one event and wait until the session has applied it
async fn apply(engine: &Engine, session_id: SessionId, event: SessionEvent) -> Result<()> {
    engine.dispatch(session_id, event).await?;
    engine.flush(session_id).await?;
    Ok(())
}

/// Existing session for `device`, or a new one (second value is `true`)
fn session_for(engine: &mut Engine, device: &str) -> Result<(SessionId, bool)> {
    match engine.find_session(device) {
        Some(id) => Ok((id, false)),
        None => engine.create_session(device).map(|id| (id, true)),
    }
}

fn drain_events<F>(events: &mut broadcast::Receiver<EngineEvent>, emit: &mut F)
where
    F: FnMut(HeadlessEvent),
{
    loop {
        match events.try_recv() {
            Ok(event) => emit(HeadlessEvent::from_engine_event(event)),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!("Headless output lagged, {} engine events dropped", skipped);
            }
            Err(_) => break,
        }
    }
}

/// The headless driver has no transport layer: reconnect signals are only
/// logged, the script itself plays the retried handshake.
fn drain_reconnects(rx: &mut mpsc::UnboundedReceiver<ReconnectRequest>) {
    while let Ok(request) = rx.try_recv() {
        info!(
            "Reconnect signal for {} (attempt {}/{}): {}",
            request.device_id, request.attempt, request.max_attempts, request.reason
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrmirror_core::SocketKind;

    #[test]
    fn test_parse_script_line() {
        let line = r#"{"device":"emulator-5554","event":{"type":"socket_connected","kind":"audio"}}"#;

        let parsed = ScriptLine::parse(1, line).unwrap().unwrap();

        assert_eq!(parsed.device, "emulator-5554");
        assert_eq!(
            parsed.event,
            SessionEvent::SocketConnected {
                kind: SocketKind::Audio
            }
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert!(ScriptLine::parse(1, "").unwrap().is_none());
        assert!(ScriptLine::parse(2, "   ").unwrap().is_none());
        assert!(ScriptLine::parse(3, "# connect phase").unwrap().is_none());
    }

    #[test]
    fn test_parse_error_carries_line_number() {
        let err = ScriptLine::parse(7, r#"{"device":"a","event":{"type":"nope"}}"#).unwrap_err();

        assert!(matches!(err, Error::Script { line: 7, .. }));
    }

    #[tokio::test]
    async fn test_replay_reports_bad_lines_and_continues() {
        let script = concat!(
            "not json\n",
            r#"{"device":"a","event":{"type":"transport_connecting"}}"#,
            "\n"
        );
        let mut engine = Engine::new(Settings::default());
        let mut out = Vec::new();

        let summary = replay(
            BufReader::new(script.as_bytes()),
            &mut engine,
            &mut |e: HeadlessEvent| out.push(e),
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            ReplaySummary {
                applied: 1,
                errors: 1,
                sessions: 1
            }
        );
        assert_eq!(out[0].event_type(), "script_error");
        assert_eq!(out.last().unwrap().event_type(), "shutdown");
    }

    #[tokio::test]
    async fn test_replay_session_limit_is_a_script_error() {
        let mut settings = Settings::default();
        settings.session.max_sessions = 1;
        let script = concat!(
            r#"{"device":"a","event":{"type":"transport_connecting"}}"#,
            "\n",
            r#"{"device":"b","event":{"type":"transport_connecting"}}"#,
            "\n"
        );
        let mut engine = Engine::new(settings);
        let mut out = Vec::new();

        let summary = replay(
            BufReader::new(script.as_bytes()),
            &mut engine,
            &mut |e: HeadlessEvent| out.push(e),
        )
        .await
        .unwrap();

        assert_eq!(summary.errors, 1);
        assert_eq!(summary.sessions, 1);
        assert!(out.iter().any(|e| matches!(
            e,
            HeadlessEvent::ScriptError { line: 2, message, .. } if message.contains("Maximum of 1")
        )));
    }
}
