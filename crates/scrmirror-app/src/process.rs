//! Event processing through the update loop
//!
//! Runs an event and its follow-ups through [`handler::update`] and collects
//! the actions they produce.

use scrmirror_core::SessionEvent;

use crate::handler::{self, UpdateAction};
use crate::session::Session;

/// Upper bound on follow-up events chained from one inbound event
const MAX_FOLLOW_UPS: usize = 8;

/// Process an event and every follow-up it produces
pub fn process_event(session: &mut Session, event: SessionEvent) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    let mut msg = Some(event);
    let mut steps = 0;

    while let Some(m) = msg {
        if steps > MAX_FOLLOW_UPS {
            tracing::error!(
                "Session {}: follow-up chain exceeded {} events, dropping {}",
                session.id,
                MAX_FOLLOW_UPS,
                m.event_type()
            );
            break;
        }
        steps += 1;

        let result = handler::update(session, m);

        if let Some(action) = result.action {
            actions.push(action);
        }

        msg = result.message;
    }

    actions
}
