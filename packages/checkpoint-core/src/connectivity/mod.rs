pub mod actions;
pub mod engine;
pub mod events;
mod machine;
pub mod session;

pub use actions::{ActionList, ConnectivityAction, ConnectivityApplyStatus};
pub use engine::{ConnectivityApplyResult, ConnectivityManager};
pub use events::ConnectivityEvent;
pub use session::{deadline_reached, ReconnectTimer};

use crate::shared::SharedState;
use crate::types::{ConnectionState, SessionState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ConnectivitySnapshot {
    pub connection: ConnectionState,
    pub session: SessionState,
    /// Latched once a restart has been requested.
    pub restarting: bool,
}

impl Default for ConnectivitySnapshot {
    fn default() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            session: SessionState::Offline,
            restarting: false,
        }
    }
}

impl ConnectivitySnapshot {
    pub fn is_link_up(self) -> bool {
        matches!(self.connection, ConnectionState::Connected)
    }

    pub fn is_session_up(self) -> bool {
        self.is_link_up() && matches!(self.session, SessionState::Online)
    }

    pub fn is_reconfiguring(self) -> bool {
        matches!(self.connection, ConnectionState::Reconfiguring)
    }

    /// Mirrors the snapshot into the flags read by the main loop.
    pub fn publish(self, shared: &SharedState) {
        shared.set_link_up(self.is_link_up());
        shared.set_session_up(self.is_session_up());
        shared.set_suspended(self.is_reconfiguring() || self.restarting);
    }
}
