use heapless::Vec;

use crate::credentials::{BrokerCredentials, WifiCredentials};
use crate::display::Screen;
use crate::types::RestartReason;

pub const MAX_ACTIONS_PER_EVENT: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConnectivityApplyStatus {
    Applied,
    Unchanged,
    InvalidTransition,
}

/// Side effects requested by the machine, executed by the radio, session and
/// display tasks in list order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConnectivityAction {
    /// Join the given network, or the last known one when `None`.
    JoinNetwork(Option<WifiCredentials>),
    ConnectSession(BrokerCredentials),
    DropSession,
    /// Retained `connected:true` status on the connected topic.
    AnnouncePresence,
    SubscribeAll,
    OpenPortal,
    ClosePortal,
    Show(Screen),
    Restart(RestartReason),
}

impl ConnectivityAction {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::JoinNetwork(_) => "join_network",
            Self::ConnectSession(_) => "connect_session",
            Self::DropSession => "drop_session",
            Self::AnnouncePresence => "announce_presence",
            Self::SubscribeAll => "subscribe_all",
            Self::OpenPortal => "open_portal",
            Self::ClosePortal => "close_portal",
            Self::Show(_) => "show",
            Self::Restart(_) => "restart",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionList {
    actions: Vec<ConnectivityAction, MAX_ACTIONS_PER_EVENT>,
}

impl ActionList {
    pub(super) fn push(&mut self, action: ConnectivityAction) {
        if let Err(dropped) = self.actions.push(action) {
            log::warn!("connectivity action dropped: {}", dropped.label());
        }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ConnectivityAction> {
        self.actions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn restart(&self) -> Option<RestartReason> {
        self.actions.iter().find_map(|action| match action {
            ConnectivityAction::Restart(reason) => Some(*reason),
            _ => None,
        })
    }
}

impl IntoIterator for ActionList {
    type Item = ConnectivityAction;
    type IntoIter = <Vec<ConnectivityAction, MAX_ACTIONS_PER_EVENT> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}
