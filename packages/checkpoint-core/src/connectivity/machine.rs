use statig::prelude::*;

use super::actions::{ActionList, ConnectivityAction, ConnectivityApplyStatus};
use super::events::ConnectivityEvent;
use super::session::{deadline_reached, next_session_state, ReconnectTimer, SessionInput};
use super::ConnectivitySnapshot;
use crate::config::{
    LINK_RECONNECT_TIMEOUT_MS, PORTAL_JOIN_TIMEOUT_MS, PORTAL_TIMEOUT_MS,
    SESSION_CONNECT_DEADLINE_MS, SESSION_RETRY_PERIOD_MS,
};
use crate::credentials::{BrokerCredentials, BrokerForm, WifiCredentials};
use crate::display::Screen;
use crate::types::{ConnectionState, RestartReason, SessionState};

pub(super) struct ConnectivityMachine {
    pub(super) snapshot: ConnectivitySnapshot,
    pub(super) known_network: Option<WifiCredentials>,
    pub(super) credentials: Option<BrokerCredentials>,
    /// Start of the current link outage, while the reconnect watch runs.
    pub(super) link_lost_at_ms: Option<u32>,
    pub(super) portal_deadline_ms: Option<u32>,
    pub(super) join_deadline_ms: Option<u32>,
    /// Set while a connect request has no reported outcome yet.
    pub(super) session_deadline_ms: Option<u32>,
    pub(super) retry: ReconnectTimer,
}

#[derive(Debug, Default)]
pub(super) struct DispatchContext {
    pub(super) status: Option<ConnectivityApplyStatus>,
    pub(super) actions: ActionList,
}

impl DispatchContext {
    fn push(&mut self, action: ConnectivityAction) {
        self.actions.push(action);
    }

    fn invalid(&mut self) {
        self.status = Some(ConnectivityApplyStatus::InvalidTransition);
    }
}

impl ConnectivityMachine {
    pub(super) fn new(known_network: Option<WifiCredentials>) -> Self {
        Self {
            snapshot: ConnectivitySnapshot::default(),
            known_network,
            credentials: None,
            link_lost_at_ms: None,
            portal_deadline_ms: None,
            join_deadline_ms: None,
            session_deadline_ms: None,
            retry: ReconnectTimer::new(SESSION_RETRY_PERIOD_MS),
        }
    }

    fn set_session(&mut self, input: SessionInput) {
        let link_connected = matches!(self.snapshot.connection, ConnectionState::Connected);
        self.snapshot.session = next_session_state(self.snapshot.session, link_connected, input);
    }

    fn request_session(&mut self, now_ms: u32, context: &mut DispatchContext) {
        let Some(credentials) = self.credentials.clone() else {
            log::info!("session: no broker configured");
            return;
        };
        self.set_session(SessionInput::ConnectRequested);
        self.session_deadline_ms = Some(now_ms.wrapping_add(SESSION_CONNECT_DEADLINE_MS));
        context.push(ConnectivityAction::ConnectSession(credentials));
    }

    /// A connect request that never reported back is re-issued, so a lost
    /// command cannot leave the session parked in `Connecting`.
    fn reissue_stalled_connect(&mut self, now_ms: u32, context: &mut DispatchContext) {
        if !matches!(self.snapshot.session, SessionState::Connecting) {
            return;
        }
        if self
            .session_deadline_ms
            .is_some_and(|deadline| deadline_reached(now_ms, deadline))
        {
            log::warn!("session: connect request unanswered, re-issuing");
            self.request_session(now_ms, context);
        }
    }

    fn enter_connected(&mut self, now_ms: u32, context: &mut DispatchContext) -> Outcome<State> {
        self.snapshot.connection = ConnectionState::Connected;
        self.link_lost_at_ms = None;
        self.join_deadline_ms = None;
        self.retry.disarm();
        self.request_session(now_ms, context);
        Transition(State::connected())
    }

    /// Session goes offline in the same step the link state leaves
    /// `Connected`.
    fn leave_connected(&mut self, context: &mut DispatchContext) {
        self.retry.disarm();
        self.session_deadline_ms = None;
        let was_up = !matches!(self.snapshot.session, SessionState::Offline);
        self.snapshot.session = SessionState::Offline;
        if was_up {
            context.push(ConnectivityAction::DropSession);
        }
    }

    fn enter_reconfiguring(&mut self, now_ms: u32, context: &mut DispatchContext) -> Outcome<State> {
        self.snapshot.connection = ConnectionState::Reconfiguring;
        self.credentials = None;
        self.link_lost_at_ms = None;
        self.join_deadline_ms = None;
        self.portal_deadline_ms = Some(now_ms.wrapping_add(PORTAL_TIMEOUT_MS));
        context.push(ConnectivityAction::OpenPortal);
        context.push(ConnectivityAction::Show(Screen::PortalOpen));
        Transition(State::reconfiguring())
    }

    fn enter_connecting(&mut self, wifi: Option<WifiCredentials>, context: &mut DispatchContext) -> Outcome<State> {
        self.snapshot.connection = ConnectionState::Connecting;
        context.push(ConnectivityAction::Show(Screen::ConnectingToWifi));
        context.push(ConnectivityAction::JoinNetwork(wifi));
        Transition(State::connecting())
    }

    fn restart(&mut self, reason: RestartReason, context: &mut DispatchContext) -> Outcome<State> {
        log::warn!("connectivity restart reason={}", reason.as_str());
        self.snapshot.restarting = true;
        context.push(ConnectivityAction::Restart(reason));
        Transition(State::restarting())
    }

    /// Starts the outage watch on the first failure and reports whether the
    /// outage has outlived the reconnect budget.
    fn link_watch_expired(&mut self, now_ms: u32) -> bool {
        match self.link_lost_at_ms {
            None => {
                self.link_lost_at_ms = Some(now_ms);
                false
            }
            Some(lost_at) => deadline_reached(now_ms, lost_at.wrapping_add(LINK_RECONNECT_TIMEOUT_MS)),
        }
    }

    fn link_watch_expired_on_tick(&self, now_ms: u32) -> bool {
        self.link_lost_at_ms
            .is_some_and(|lost_at| deadline_reached(now_ms, lost_at.wrapping_add(LINK_RECONNECT_TIMEOUT_MS)))
    }

    fn submit_form(&mut self, form: &BrokerForm, now_ms: u32, context: &mut DispatchContext) -> Outcome<State> {
        let credentials = match BrokerCredentials::from_form(form) {
            Ok(credentials) => credentials,
            Err(err) => {
                log::warn!("broker form rejected: {}", err.as_str());
                context.push(ConnectivityAction::Show(Screen::InvalidBroker));
                return self.restart(RestartReason::InvalidBroker, context);
            }
        };
        log::info!("broker configured domain={}", credentials.is_domain());
        self.credentials = Some(credentials);
        if let Some(wifi) = form.wifi() {
            self.known_network = Some(wifi.clone());
        }
        self.portal_deadline_ms = None;
        self.join_deadline_ms = Some(now_ms.wrapping_add(PORTAL_JOIN_TIMEOUT_MS));
        context.push(ConnectivityAction::ClosePortal);
        let wifi = self.known_network.clone();
        self.enter_connecting(wifi, context)
    }
}

#[state_machine(initial = "State::disconnected()")]
impl ConnectivityMachine {
    #[state]
    fn disconnected(
        &mut self,
        context: &mut DispatchContext,
        event: &ConnectivityEvent,
    ) -> Outcome<State> {
        match event {
            ConnectivityEvent::Start { .. } => {
                let wifi = self.known_network.clone();
                if wifi.is_none() {
                    log::info!("no known network; waiting for reconfiguration");
                }
                self.enter_connecting(wifi, context)
            }
            ConnectivityEvent::LinkUp { now_ms } => self.enter_connected(*now_ms, context),
            ConnectivityEvent::LinkDown { now_ms } => {
                if self.link_watch_expired(*now_ms) {
                    return self.restart(RestartReason::LinkTimeout, context);
                }
                Handled
            }
            ConnectivityEvent::Tick { now_ms } => {
                if self.link_watch_expired_on_tick(*now_ms) {
                    return self.restart(RestartReason::LinkTimeout, context);
                }
                Handled
            }
            ConnectivityEvent::ReconfigureRequested { now_ms } => {
                self.enter_reconfiguring(*now_ms, context)
            }
            ConnectivityEvent::FormSubmitted { .. }
            | ConnectivityEvent::SessionConnected
            | ConnectivityEvent::SessionDropped { .. } => {
                context.invalid();
                Handled
            }
        }
    }

    #[state]
    fn connecting(
        &mut self,
        context: &mut DispatchContext,
        event: &ConnectivityEvent,
    ) -> Outcome<State> {
        match event {
            ConnectivityEvent::LinkUp { now_ms } => self.enter_connected(*now_ms, context),
            ConnectivityEvent::LinkDown { now_ms } => {
                if self.link_watch_expired(*now_ms) {
                    return self.restart(RestartReason::LinkTimeout, context);
                }
                Handled
            }
            ConnectivityEvent::Tick { now_ms } => {
                if self
                    .join_deadline_ms
                    .is_some_and(|deadline| deadline_reached(*now_ms, deadline))
                {
                    return self.restart(RestartReason::JoinTimeout, context);
                }
                if self.link_watch_expired_on_tick(*now_ms) {
                    return self.restart(RestartReason::LinkTimeout, context);
                }
                Handled
            }
            ConnectivityEvent::ReconfigureRequested { now_ms } => {
                self.enter_reconfiguring(*now_ms, context)
            }
            ConnectivityEvent::Start { .. }
            | ConnectivityEvent::FormSubmitted { .. }
            | ConnectivityEvent::SessionConnected
            | ConnectivityEvent::SessionDropped { .. } => {
                context.invalid();
                Handled
            }
        }
    }

    #[state]
    fn connected(
        &mut self,
        context: &mut DispatchContext,
        event: &ConnectivityEvent,
    ) -> Outcome<State> {
        match event {
            ConnectivityEvent::LinkDown { now_ms } => {
                self.leave_connected(context);
                self.snapshot.connection = ConnectionState::Disconnected;
                self.link_lost_at_ms = Some(*now_ms);
                context.push(ConnectivityAction::Show(Screen::ConnectingToWifi));
                context.push(ConnectivityAction::JoinNetwork(None));
                Transition(State::disconnected())
            }
            ConnectivityEvent::SessionConnected => {
                self.set_session(SessionInput::Connected);
                self.session_deadline_ms = None;
                self.retry.disarm();
                context.push(ConnectivityAction::AnnouncePresence);
                context.push(ConnectivityAction::SubscribeAll);
                Handled
            }
            ConnectivityEvent::SessionDropped { now_ms } => {
                self.set_session(SessionInput::Dropped);
                self.session_deadline_ms = None;
                if self.credentials.is_some() {
                    self.retry.arm(*now_ms);
                }
                Handled
            }
            ConnectivityEvent::Tick { now_ms } => {
                if self.retry.poll(*now_ms)
                    && matches!(self.snapshot.session, SessionState::Offline)
                {
                    self.request_session(*now_ms, context);
                } else {
                    self.reissue_stalled_connect(*now_ms, context);
                }
                Handled
            }
            ConnectivityEvent::ReconfigureRequested { now_ms } => {
                self.leave_connected(context);
                self.enter_reconfiguring(*now_ms, context)
            }
            ConnectivityEvent::LinkUp { .. } => Handled,
            ConnectivityEvent::Start { .. } | ConnectivityEvent::FormSubmitted { .. } => {
                context.invalid();
                Handled
            }
        }
    }

    #[state]
    fn reconfiguring(
        &mut self,
        context: &mut DispatchContext,
        event: &ConnectivityEvent,
    ) -> Outcome<State> {
        match event {
            ConnectivityEvent::FormSubmitted { form, now_ms } => {
                self.submit_form(form, *now_ms, context)
            }
            ConnectivityEvent::Tick { now_ms } => {
                if self
                    .portal_deadline_ms
                    .is_some_and(|deadline| deadline_reached(*now_ms, deadline))
                {
                    log::warn!("portal timed out");
                    return self.restart(RestartReason::PortalTimeout, context);
                }
                Handled
            }
            ConnectivityEvent::ReconfigureRequested { .. }
            | ConnectivityEvent::LinkUp { .. }
            | ConnectivityEvent::LinkDown { .. } => Handled,
            ConnectivityEvent::Start { .. }
            | ConnectivityEvent::SessionConnected
            | ConnectivityEvent::SessionDropped { .. } => {
                context.invalid();
                Handled
            }
        }
    }

    /// Terminal: a restart has been requested and nothing else may be.
    #[state]
    fn restarting(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        context.status = Some(ConnectivityApplyStatus::Unchanged);
        Handled
    }
}
