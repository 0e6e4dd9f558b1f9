use crate::types::SessionState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionInput {
    ConnectRequested,
    Connected,
    Dropped,
    LinkLost,
}

/// Session transition table. Without the link the session is always
/// offline, whatever the input.
pub const fn next_session_state(
    current: SessionState,
    link_connected: bool,
    input: SessionInput,
) -> SessionState {
    if !link_connected {
        return SessionState::Offline;
    }
    match (current, input) {
        (_, SessionInput::LinkLost) => SessionState::Offline,
        (_, SessionInput::Dropped) => SessionState::Offline,
        (_, SessionInput::Connected) => SessionState::Online,
        (SessionState::Offline, SessionInput::ConnectRequested) => SessionState::Connecting,
        (SessionState::Connecting, SessionInput::ConnectRequested) => SessionState::Connecting,
        (SessionState::Online, SessionInput::ConnectRequested) => SessionState::Online,
    }
}

/// `true` once `now` is at or past `deadline` on the wrapping millisecond
/// clock.
pub const fn deadline_reached(now_ms: u32, deadline_ms: u32) -> bool {
    (now_ms.wrapping_sub(deadline_ms) as i32) >= 0
}

/// Fixed-period timer. Re-arming while armed keeps the current cadence and
/// missed periods collapse into a single firing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReconnectTimer {
    period_ms: u32,
    next_due_ms: Option<u32>,
}

impl ReconnectTimer {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms,
            next_due_ms: None,
        }
    }

    pub fn arm(&mut self, now_ms: u32) {
        if self.next_due_ms.is_none() {
            self.next_due_ms = Some(now_ms.wrapping_add(self.period_ms));
        }
    }

    pub fn disarm(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn next_due_ms(&self) -> Option<u32> {
        self.next_due_ms
    }

    pub fn poll(&mut self, now_ms: u32) -> bool {
        let Some(due) = self.next_due_ms else {
            return false;
        };
        if !deadline_reached(now_ms, due) {
            return false;
        }
        let mut next = due;
        while deadline_reached(now_ms, next) {
            next = next.wrapping_add(self.period_ms);
        }
        self.next_due_ms = Some(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_never_leaves_offline_without_link() {
        for current in [SessionState::Offline, SessionState::Connecting, SessionState::Online] {
            for input in [
                SessionInput::ConnectRequested,
                SessionInput::Connected,
                SessionInput::Dropped,
                SessionInput::LinkLost,
            ] {
                assert_eq!(next_session_state(current, false, input), SessionState::Offline);
            }
        }
    }

    #[test]
    fn session_table_with_link() {
        use SessionInput::*;
        use SessionState::*;
        assert_eq!(next_session_state(Offline, true, ConnectRequested), Connecting);
        assert_eq!(next_session_state(Connecting, true, Connected), Online);
        assert_eq!(next_session_state(Online, true, ConnectRequested), Online);
        assert_eq!(next_session_state(Online, true, Dropped), Offline);
        assert_eq!(next_session_state(Connecting, true, LinkLost), Offline);
    }

    #[test]
    fn timer_fires_every_period() {
        let mut timer = ReconnectTimer::new(2_000);
        timer.arm(100);
        assert!(!timer.poll(2_099));
        assert!(timer.poll(2_100));
        assert!(!timer.poll(2_500));
        assert!(timer.poll(4_100));
    }

    #[test]
    fn rearm_keeps_cadence() {
        let mut timer = ReconnectTimer::new(2_000);
        timer.arm(0);
        timer.arm(1_500);
        assert_eq!(timer.next_due_ms(), Some(2_000));
    }

    #[test]
    fn missed_periods_fire_once() {
        let mut timer = ReconnectTimer::new(2_000);
        timer.arm(0);
        assert!(timer.poll(9_000));
        assert_eq!(timer.next_due_ms(), Some(10_000));
        assert!(!timer.poll(9_999));
    }

    #[test]
    fn disarmed_timer_is_silent() {
        let mut timer = ReconnectTimer::new(2_000);
        assert!(!timer.poll(u32::MAX));
        timer.arm(0);
        timer.disarm();
        assert!(!timer.poll(10_000));
    }

    #[test]
    fn deadline_handles_wraparound() {
        let start = u32::MAX - 500;
        let deadline = start.wrapping_add(1_000);
        assert!(!deadline_reached(start.wrapping_add(999), deadline));
        assert!(deadline_reached(start.wrapping_add(1_000), deadline));
    }
}
