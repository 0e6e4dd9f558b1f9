//! Narrow interfaces to the peripherals and the messaging session.

use heapless::Vec;

use crate::config::CARD_UID_MAX;
use crate::display::Screen;
use crate::types::Qos;

pub type CardUid = Vec<u8, CARD_UID_MAX>;

pub trait CardReaderPort {
    /// At most one newly presented card per call.
    fn poll_card(&mut self) -> Option<CardUid>;
}

pub trait ClockPort {
    /// Current wall-clock time in Unix seconds.
    fn now_epoch_secs(&mut self) -> u32;
}

pub trait DisplayPort {
    fn show(&mut self, screen: Screen);
}

pub trait SirenPort {
    fn set_output(&mut self, on: bool);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PublishError {
    SessionDown,
    QueueFull,
    TooLarge,
}

impl PublishError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionDown => "session_down",
            Self::QueueFull => "queue_full",
            Self::TooLarge => "too_large",
        }
    }
}

/// Hands a message to the session without waiting for the broker.
pub trait Publisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: Qos,
        retain: bool,
    ) -> Result<(), PublishError>;
}
