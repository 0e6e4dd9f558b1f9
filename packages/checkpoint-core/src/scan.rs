use core::fmt::Write as _;

use heapless::String;

use crate::alarm::AlarmCoordinator;
use crate::config::{CheckpointIdentity, CARD_ID_TEXT_MAX, SCAN_TIME_SKEW_SECS};
use crate::payload;
use crate::ports::{ClockPort, PublishError, Publisher};
use crate::shared::SharedState;
use crate::topics;
use crate::types::{AlarmReason, Qos, ShiftStatus};

pub type CardIdText = String<CARD_ID_TEXT_MAX>;

/// Two lower-case hex digits per byte, separated by single spaces.
pub fn format_card_id(uid: &[u8]) -> CardIdText {
    let mut out = CardIdText::new();
    for (index, byte) in uid.iter().enumerate() {
        let separator = if index == 0 { "" } else { " " };
        if write!(out, "{separator}{byte:02x}").is_err() {
            break;
        }
    }
    out
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScanEvent<'a> {
    pub checkpoint_id: &'a str,
    pub card_id: CardIdText,
    pub scan_time: u32,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ScanOutcome {
    pub topic: &'static str,
    pub published: Result<(), PublishError>,
}

pub struct ScanDispatcher<'a> {
    shared: &'a SharedState,
    identity: &'a CheckpointIdentity,
}

impl<'a> ScanDispatcher<'a> {
    pub const fn new(shared: &'a SharedState, identity: &'a CheckpointIdentity) -> Self {
        Self { shared, identity }
    }

    pub fn scan_event<C: ClockPort>(&self, uid: &[u8], clock: &mut C) -> ScanEvent<'a> {
        ScanEvent {
            checkpoint_id: self.identity.checkpoint_id(),
            card_id: format_card_id(uid),
            scan_time: clock.now_epoch_secs().wrapping_add(SCAN_TIME_SKEW_SECS),
        }
    }

    /// Publishes the read to the topic chosen by the shift state. A read
    /// outside a shift also raises the alarm, whether or not the publish
    /// went through.
    pub fn on_card_read<C: ClockPort, P: Publisher>(
        &self,
        uid: &[u8],
        clock: &mut C,
        publisher: &mut P,
    ) -> ScanOutcome {
        let event = self.scan_event(uid, clock);
        let topic = match self.shared.shift() {
            ShiftStatus::Active => topics::SENTRY_SCAN_INFO,
            ShiftStatus::Inactive => topics::OUTSIDE_SHIFT_SCAN,
        };

        let published = match payload::scan_record(event.checkpoint_id, &event.card_id, event.scan_time) {
            Ok(body) => publisher.publish(topic, body.as_bytes(), Qos::ExactlyOnce, false),
            Err(_) => Err(PublishError::TooLarge),
        };
        match published {
            Ok(()) => log::info!(
                "scan published topic={} card={} scan_time={}",
                topic,
                event.card_id.as_str(),
                event.scan_time
            ),
            Err(err) => log::warn!("scan publish failed topic={} err={}", topic, err.as_str()),
        }

        if topic == topics::OUTSIDE_SHIFT_SCAN {
            AlarmCoordinator::new(self.shared).raise(AlarmReason::NoShiftScan);
        }

        ScanOutcome { topic, published }
    }
}
