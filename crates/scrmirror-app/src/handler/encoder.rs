//! Remote encoder detection notifications
//!
//! These are informational: nothing in the session changes.

use scrmirror_core::SessionEvent;
use tracing::{info, warn};

use super::UpdateResult;
use crate::session::Session;

pub(crate) fn handle_notification(session: &mut Session, event: &SessionEvent) -> UpdateResult {
    if event.is_error() {
        warn!("Session {}: {}", session.id, event.summary());
    } else {
        info!("Session {}: {}", session.id, event.summary());
    }
    UpdateResult::none()
}
