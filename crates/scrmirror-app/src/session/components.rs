//! Per-subsystem status registry

use std::collections::BTreeMap;

use scrmirror_core::{ComponentState, SessionComponent};

/// Status of every subsystem that has reported at least once.
///
/// Components that never reported have no entry; [`clear`](Self::clear)
/// returns the registry to that state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentStateRegistry {
    states: BTreeMap<SessionComponent, ComponentState>,
}

impl ComponentStateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state of `component`, returning the previous value
    pub fn set(
        &mut self,
        component: SessionComponent,
        state: ComponentState,
    ) -> Option<ComponentState> {
        self.states.insert(component, state)
    }

    pub fn get(&self, component: SessionComponent) -> Option<&ComponentState> {
        self.states.get(&component)
    }

    pub fn is(&self, component: SessionComponent, state: &ComponentState) -> bool {
        self.states.get(&component) == Some(state)
    }

    /// Socket barrier predicate: video, audio and control all connected
    pub fn all_sockets_connected(&self) -> bool {
        SessionComponent::SOCKETS
            .iter()
            .all(|c| self.is(*c, &ComponentState::Connected))
    }

    /// Components currently in an error state
    pub fn errors(&self) -> impl Iterator<Item = (SessionComponent, &str)> + '_ {
        self.states.iter().filter_map(|(c, s)| match s {
            ComponentState::Error { message } => Some((*c, message.as_str())),
            _ => None,
        })
    }

    pub fn snapshot(&self) -> BTreeMap<SessionComponent, ComponentState> {
        self.states.clone()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
