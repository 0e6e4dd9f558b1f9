#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconfiguring,
}

impl ConnectionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Reconfiguring => "Reconfiguring",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Offline,
    Connecting,
    Online,
}

impl SessionState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Offline => "Offline",
            Self::Connecting => "Connecting",
            Self::Online => "Online",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShiftStatus {
    Active,
    Inactive,
}

impl ShiftStatus {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Why the alarm is raised. Discriminants are the backend wire codes; code 1
/// on the response topic means "valid scan" and is not an alarm reason.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum AlarmReason {
    None = 0,
    UnknownCard = 2,
    StolenCard = 3,
    WrongCheckpoint = 4,
    WrongTime = 5,
    OverdueScan = 6,
    NoShiftScan = 7,
}

impl AlarmReason {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::None),
            2 => Some(Self::UnknownCard),
            3 => Some(Self::StolenCard),
            4 => Some(Self::WrongCheckpoint),
            5 => Some(Self::WrongTime),
            6 => Some(Self::OverdueScan),
            7 => Some(Self::NoShiftScan),
            _ => None,
        }
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::UnknownCard => "unknown_card",
            Self::StolenCard => "stolen_card",
            Self::WrongCheckpoint => "wrong_checkpoint",
            Self::WrongTime => "wrong_time",
            Self::OverdueScan => "overdue_scan",
            Self::NoShiftScan => "no_shift_scan",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Qos {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl Qos {
    pub const fn level(self) -> u8 {
        match self {
            Self::AtMostOnce => 0,
            Self::AtLeastOnce => 1,
            Self::ExactlyOnce => 2,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RestartReason {
    LinkTimeout,
    PortalTimeout,
    JoinTimeout,
    InvalidBroker,
}

impl RestartReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LinkTimeout => "link_timeout",
            Self::PortalTimeout => "portal_timeout",
            Self::JoinTimeout => "join_timeout",
            Self::InvalidBroker => "invalid_broker",
        }
    }
}
