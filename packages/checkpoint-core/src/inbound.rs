use crate::alarm::AlarmCoordinator;
use crate::shared::SharedState;
use crate::topics::{self, InboundTopic};
use crate::types::{AlarmReason, ShiftStatus};

const RESPONSE_SUCCESS: u8 = 1;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InboundOutcome {
    Shift(ShiftStatus),
    AlarmCommand { raised: bool },
    OverdueScan,
    ScanAccepted,
    ScanRejected(AlarmReason),
    UnknownResponseCode,
    UnknownTopic,
}

/// Routes messages from subscribed topics into the shared flags.
pub struct InboundRouter<'a> {
    shared: &'a SharedState,
    checkpoint_id: &'a str,
}

impl<'a> InboundRouter<'a> {
    pub const fn new(shared: &'a SharedState, checkpoint_id: &'a str) -> Self {
        Self {
            shared,
            checkpoint_id,
        }
    }

    pub fn route(&self, topic: &str, payload: &[u8]) -> InboundOutcome {
        let alarm = AlarmCoordinator::new(self.shared);
        let Some(kind) = topics::classify(topic, self.checkpoint_id) else {
            log::debug!("inbound ignored topic={}", topic);
            return InboundOutcome::UnknownTopic;
        };

        match kind {
            InboundTopic::ShiftStatus => {
                let shift = if payload == b"ON" {
                    ShiftStatus::Active
                } else {
                    ShiftStatus::Inactive
                };
                alarm.on_shift(shift);
                log::info!("shift active={}", shift.is_active());
                InboundOutcome::Shift(shift)
            }
            InboundTopic::Alarm => {
                alarm.on_alarm_message(payload);
                InboundOutcome::AlarmCommand {
                    raised: alarm.is_active(),
                }
            }
            InboundTopic::OverdueScan => {
                alarm.on_overdue_scan();
                InboundOutcome::OverdueScan
            }
            InboundTopic::Response => self.on_response(payload),
        }
    }

    fn on_response(&self, payload: &[u8]) -> InboundOutcome {
        let code = parse_response_code(payload);
        if code == Some(RESPONSE_SUCCESS) {
            self.shared.mark_scan_success();
            return InboundOutcome::ScanAccepted;
        }
        match code.and_then(AlarmReason::from_u8) {
            Some(reason) if !reason.is_none() => {
                self.shared.set_pending_reason(reason);
                log::info!("scan rejected reason={}", reason.as_str());
                InboundOutcome::ScanRejected(reason)
            }
            _ => {
                log::warn!("scan response ignored payload_len={}", payload.len());
                InboundOutcome::UnknownResponseCode
            }
        }
    }
}

/// Leading decimal digits after optional whitespace, trailing bytes ignored.
fn parse_response_code(payload: &[u8]) -> Option<u8> {
    let start = payload.iter().position(|b| !b.is_ascii_whitespace())?;
    let digits = &payload[start..];
    let len = digits.iter().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }
    let mut value = 0u16;
    for byte in &digits[..len] {
        value = value.checked_mul(10)?.checked_add((byte - b'0') as u16)?;
    }
    u8::try_from(value).ok()
}
