use crate::credentials::BrokerForm;

/// Inputs to the connectivity machine. Timestamps are monotonic uptime in
/// milliseconds and may wrap.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConnectivityEvent {
    Start { now_ms: u32 },
    LinkUp { now_ms: u32 },
    /// Link lost, or a join attempt failed.
    LinkDown { now_ms: u32 },
    Tick { now_ms: u32 },
    ReconfigureRequested { now_ms: u32 },
    FormSubmitted { form: BrokerForm, now_ms: u32 },
    SessionConnected,
    /// Session lost, or a connect attempt failed.
    SessionDropped { now_ms: u32 },
}

impl ConnectivityEvent {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::LinkUp { .. } => "link_up",
            Self::LinkDown { .. } => "link_down",
            Self::Tick { .. } => "tick",
            Self::ReconfigureRequested { .. } => "reconfigure",
            Self::FormSubmitted { .. } => "form_submitted",
            Self::SessionConnected => "session_connected",
            Self::SessionDropped { .. } => "session_dropped",
        }
    }
}
