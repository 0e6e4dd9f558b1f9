use statig::blocking::IntoStateMachineExt as _;

use super::actions::{ActionList, ConnectivityApplyStatus};
use super::events::ConnectivityEvent;
use super::machine::{ConnectivityMachine, DispatchContext};
use super::ConnectivitySnapshot;
use crate::credentials::WifiCredentials;
use crate::types::{ConnectionState, SessionState};

#[derive(Clone, Debug)]
pub struct ConnectivityApplyResult {
    pub before: ConnectivitySnapshot,
    pub after: ConnectivitySnapshot,
    pub status: ConnectivityApplyStatus,
    pub actions: ActionList,
}

impl ConnectivityApplyResult {
    pub fn changed(&self) -> bool {
        matches!(self.status, ConnectivityApplyStatus::Applied)
    }

    pub fn connection_changed(&self) -> bool {
        self.before.connection != self.after.connection
    }

    pub fn session_changed(&self) -> bool {
        self.before.session != self.after.session
    }
}

/// Link and session lifecycle of the checkpoint.
///
/// Pure state: every input arrives as a [`ConnectivityEvent`] and every side
/// effect leaves as an action in the returned [`ConnectivityApplyResult`].
pub struct ConnectivityManager {
    machine: statig::blocking::StateMachine<ConnectivityMachine>,
}

impl ConnectivityManager {
    /// `known_network` is the network joined at startup, if any.
    pub fn new(known_network: Option<WifiCredentials>) -> Self {
        Self {
            machine: ConnectivityMachine::new(known_network).state_machine(),
        }
    }

    pub fn snapshot(&self) -> ConnectivitySnapshot {
        self.machine.inner().snapshot
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.snapshot().connection
    }

    pub fn session_state(&self) -> SessionState {
        self.snapshot().session
    }

    pub fn is_link_up(&self) -> bool {
        self.snapshot().is_link_up()
    }

    pub fn is_session_up(&self) -> bool {
        self.snapshot().is_session_up()
    }

    pub fn has_broker(&self) -> bool {
        self.machine.inner().credentials.is_some()
    }

    pub fn retry_armed(&self) -> bool {
        self.machine.inner().retry.is_armed()
    }

    pub fn apply(&mut self, event: &ConnectivityEvent) -> ConnectivityApplyResult {
        let before = self.snapshot();
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(event, &mut context);
        let after = self.snapshot();
        let status = context.status.unwrap_or(if before != after || !context.actions.is_empty() {
            ConnectivityApplyStatus::Applied
        } else {
            ConnectivityApplyStatus::Unchanged
        });
        ConnectivityApplyResult {
            before,
            after,
            status,
            actions: context.actions,
        }
    }
}
