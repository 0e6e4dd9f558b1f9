mod siren;

pub use siren::{SirenPattern, SirenUpdate};

use crate::display::Screen;
use crate::shared::{AlarmSnapshot, SharedState};
use crate::types::{AlarmReason, ShiftStatus};

/// Owns the alarm flag and reason inside [`SharedState`].
///
/// The indicator itself is driven by whoever polls [`SirenPattern`] against
/// [`AlarmCoordinator::snapshot`].
#[derive(Clone, Copy)]
pub struct AlarmCoordinator<'a> {
    shared: &'a SharedState,
}

impl<'a> AlarmCoordinator<'a> {
    pub const fn new(shared: &'a SharedState) -> Self {
        Self { shared }
    }

    /// A `None` reason is ignored; only the backend alarm command may sound
    /// the alarm without one.
    pub fn raise(&self, reason: AlarmReason) -> AlarmSnapshot {
        if reason.is_none() {
            log::warn!("alarm raise ignored: no reason");
            return self.snapshot();
        }
        self.activate(reason)
    }

    fn activate(&self, reason: AlarmReason) -> AlarmSnapshot {
        let snapshot = self.shared.store_alarm_active(reason);
        log::info!(
            "alarm raised reason={} generation={}",
            reason.as_str(),
            snapshot.generation
        );
        snapshot
    }

    pub fn silence(&self) {
        if self.is_active() {
            log::info!("alarm silenced");
        }
        self.shared.store_alarm_cleared();
        self.shared.set_pending_reason(AlarmReason::None);
    }

    pub fn is_active(&self) -> bool {
        self.shared.alarm().active
    }

    pub fn current_reason(&self) -> AlarmReason {
        self.shared.alarm().reason
    }

    pub fn snapshot(&self) -> AlarmSnapshot {
        self.shared.alarm()
    }

    /// Backend alarm command: `ON` raises with the reason of the last scan
    /// response, or with no reason when none is pending. Anything else
    /// silences.
    pub fn on_alarm_message(&self, payload: &[u8]) {
        if payload == b"ON" {
            self.activate(self.shared.pending_reason());
        } else {
            self.silence();
        }
    }

    pub fn on_overdue_scan(&self) {
        self.shared.set_pending_reason(AlarmReason::OverdueScan);
        self.raise(AlarmReason::OverdueScan);
    }

    pub fn on_shift(&self, shift: ShiftStatus) {
        self.shared.set_shift(shift);
        if !shift.is_active() {
            self.silence();
        }
    }
}

/// What the display shows while the alarm is active.
pub fn alarm_screen(reason: AlarmReason) -> Screen {
    match reason {
        AlarmReason::OverdueScan => Screen::ScanWindowPassed,
        other => Screen::InvalidScan(other),
    }
}
