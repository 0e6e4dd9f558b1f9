use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use crate::types::{AlarmReason, ShiftStatus};

// Alarm word layout: reason code in bits 0..8, active flag in bit 8, and the
// activation generation in bits 16..32. One word keeps `active` and `reason`
// from being observed half-written.
const ALARM_REASON_MASK: u32 = 0xFF;
const ALARM_ACTIVE_BIT: u32 = 1 << 8;
const ALARM_GENERATION_SHIFT: u32 = 16;

/// Flags written by asynchronous producers (button, network callbacks,
/// timers) and consumed by the main loop.
pub struct SharedState {
    link_up: AtomicBool,
    session_up: AtomicBool,
    shift_active: AtomicBool,
    alarm: AtomicU32,
    pending_reason: AtomicU8,
    scan_success_pending: AtomicBool,
    config_requested: AtomicBool,
    suspended: AtomicBool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AlarmSnapshot {
    pub active: bool,
    pub reason: AlarmReason,
    /// Bumped on every inactive to active edge.
    pub generation: u16,
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            link_up: AtomicBool::new(false),
            session_up: AtomicBool::new(false),
            shift_active: AtomicBool::new(false),
            alarm: AtomicU32::new(0),
            pending_reason: AtomicU8::new(AlarmReason::None as u8),
            scan_success_pending: AtomicBool::new(false),
            config_requested: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
        }
    }

    pub fn is_link_up(&self) -> bool {
        self.link_up.load(Ordering::Acquire)
    }

    pub fn set_link_up(&self, up: bool) {
        self.link_up.store(up, Ordering::Release);
        if !up {
            self.session_up.store(false, Ordering::Release);
        }
    }

    pub fn is_session_up(&self) -> bool {
        self.session_up.load(Ordering::Acquire)
    }

    pub fn set_session_up(&self, up: bool) {
        self.session_up.store(up, Ordering::Release);
    }

    pub fn shift(&self) -> ShiftStatus {
        if self.shift_active.load(Ordering::Acquire) {
            ShiftStatus::Active
        } else {
            ShiftStatus::Inactive
        }
    }

    pub fn set_shift(&self, shift: ShiftStatus) {
        self.shift_active.store(shift.is_active(), Ordering::Release);
    }

    pub fn alarm(&self) -> AlarmSnapshot {
        decode_alarm(self.alarm.load(Ordering::Acquire))
    }

    /// Sets the alarm active with `reason`. The generation only advances when
    /// the alarm was previously inactive.
    pub(crate) fn store_alarm_active(&self, reason: AlarmReason) -> AlarmSnapshot {
        let update = |raw: u32| {
            let generation = raw >> ALARM_GENERATION_SHIFT;
            let generation = if raw & ALARM_ACTIVE_BIT == 0 {
                generation.wrapping_add(1) & 0xFFFF
            } else {
                generation
            };
            Some((generation << ALARM_GENERATION_SHIFT) | ALARM_ACTIVE_BIT | reason.as_u8() as u32)
        };
        let previous = self
            .alarm
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, update)
            .unwrap_or_else(|raw| raw);
        update(previous).map(decode_alarm).unwrap_or_else(|| self.alarm())
    }

    pub(crate) fn store_alarm_cleared(&self) {
        let _ = self
            .alarm
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                Some(raw & !(ALARM_ACTIVE_BIT | ALARM_REASON_MASK))
            });
    }

    pub fn pending_reason(&self) -> AlarmReason {
        AlarmReason::from_u8(self.pending_reason.load(Ordering::Acquire)).unwrap_or(AlarmReason::None)
    }

    pub fn set_pending_reason(&self, reason: AlarmReason) {
        self.pending_reason.store(reason.as_u8(), Ordering::Release);
    }

    pub fn mark_scan_success(&self) {
        self.scan_success_pending.store(true, Ordering::Release);
    }

    /// Returns whether a valid-scan acknowledgement was pending, clearing it.
    pub fn take_scan_success(&self) -> bool {
        self.scan_success_pending.swap(false, Ordering::AcqRel)
    }

    /// Edge flag raised by the button interrupt or the console.
    pub fn request_config(&self) {
        self.config_requested.store(true, Ordering::Release);
    }

    pub fn is_config_requested(&self) -> bool {
        self.config_requested.load(Ordering::Acquire)
    }

    pub fn take_config_request(&self) -> bool {
        self.config_requested.swap(false, Ordering::AcqRel)
    }

    /// Set while reconfiguring or restarting; the main loop idles meanwhile.
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    pub fn set_suspended(&self, suspended: bool) {
        self.suspended.store(suspended, Ordering::Release);
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_alarm(raw: u32) -> AlarmSnapshot {
    let active = raw & ALARM_ACTIVE_BIT != 0;
    let reason = if active {
        AlarmReason::from_u8((raw & ALARM_REASON_MASK) as u8).unwrap_or(AlarmReason::None)
    } else {
        AlarmReason::None
    };
    AlarmSnapshot {
        active,
        reason,
        generation: (raw >> ALARM_GENERATION_SHIFT) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_down_forces_session_down() {
        let shared = SharedState::new();
        shared.set_link_up(true);
        shared.set_session_up(true);
        shared.set_link_up(false);
        assert!(!shared.is_session_up());
    }

    #[test]
    fn alarm_generation_advances_only_on_activation() {
        let shared = SharedState::new();
        let first = shared.store_alarm_active(AlarmReason::StolenCard);
        let overwritten = shared.store_alarm_active(AlarmReason::OverdueScan);
        assert_eq!(first.generation, overwritten.generation);
        assert_eq!(overwritten.reason, AlarmReason::OverdueScan);

        shared.store_alarm_cleared();
        let cleared = shared.alarm();
        assert!(!cleared.active);
        assert_eq!(cleared.reason, AlarmReason::None);

        let again = shared.store_alarm_active(AlarmReason::WrongTime);
        assert_eq!(again.generation, first.generation.wrapping_add(1));
    }

    #[test]
    fn config_request_is_taken_once() {
        let shared = SharedState::new();
        shared.request_config();
        assert!(shared.take_config_request());
        assert!(!shared.take_config_request());
    }

    #[test]
    fn scan_success_is_taken_once() {
        let shared = SharedState::new();
        shared.mark_scan_success();
        assert!(shared.take_scan_success());
        assert!(!shared.take_scan_success());
    }
}
