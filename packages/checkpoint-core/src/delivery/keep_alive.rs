use crate::connectivity::deadline_reached;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeepAliveStep {
    /// Nothing due for this many milliseconds.
    Wait(u32),
    SendPing,
    /// A ping went unanswered for a whole idle period.
    TimedOut,
}

/// Ping policy: the client pings only after it has sent nothing for
/// `idle_ms`, and gives the broker the same period to answer. Inbound
/// traffic never schedules a ping.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KeepAlive {
    idle_ms: u32,
    last_sent_ms: u32,
    ping_sent_ms: Option<u32>,
}

impl KeepAlive {
    pub const fn new(idle_ms: u32, now_ms: u32) -> Self {
        Self {
            idle_ms,
            last_sent_ms: now_ms,
            ping_sent_ms: None,
        }
    }

    /// Any packet written to the broker.
    pub fn on_sent(&mut self, now_ms: u32) {
        self.last_sent_ms = now_ms;
    }

    pub fn on_ping_sent(&mut self, now_ms: u32) {
        self.last_sent_ms = now_ms;
        self.ping_sent_ms = Some(now_ms);
    }

    pub fn on_pingresp(&mut self) {
        self.ping_sent_ms = None;
    }

    pub fn awaiting_pingresp(&self) -> bool {
        self.ping_sent_ms.is_some()
    }

    pub fn poll(&self, now_ms: u32) -> KeepAliveStep {
        match self.ping_sent_ms {
            Some(sent_ms) => {
                let deadline = sent_ms.wrapping_add(self.idle_ms);
                if deadline_reached(now_ms, deadline) {
                    KeepAliveStep::TimedOut
                } else {
                    KeepAliveStep::Wait(deadline.wrapping_sub(now_ms))
                }
            }
            None => {
                let due = self.last_sent_ms.wrapping_add(self.idle_ms);
                if deadline_reached(now_ms, due) {
                    KeepAliveStep::SendPing
                } else {
                    KeepAliveStep::Wait(due.wrapping_sub(now_ms))
                }
            }
        }
    }
}
