use crate::shared::AlarmSnapshot;

/// Square wave for the alarm LED and buzzer.
///
/// [`SirenPattern::sync`] is called whenever the alarm word may have changed
/// and [`SirenPattern::on_half_period`] every half period. A new activation
/// restarts the wave high; a reason overwrite leaves the phase alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SirenPattern {
    generation: Option<u16>,
    output: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SirenUpdate {
    /// Wave (re)started; the caller realigns its half-period timer.
    Started,
    Stopped,
    Unchanged,
}

impl SirenPattern {
    pub const fn new() -> Self {
        Self {
            generation: None,
            output: false,
        }
    }

    pub fn sync(&mut self, alarm: AlarmSnapshot) -> SirenUpdate {
        match (alarm.active, self.generation) {
            (false, None) => SirenUpdate::Unchanged,
            (false, Some(_)) => {
                self.generation = None;
                self.output = false;
                SirenUpdate::Stopped
            }
            (true, Some(generation)) if generation == alarm.generation => SirenUpdate::Unchanged,
            (true, _) => {
                self.generation = Some(alarm.generation);
                self.output = true;
                SirenUpdate::Started
            }
        }
    }

    pub fn on_half_period(&mut self) -> bool {
        if self.generation.is_some() {
            self.output = !self.output;
        }
        self.output
    }

    pub fn output(&self) -> bool {
        self.output
    }

    pub fn is_running(&self) -> bool {
        self.generation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AlarmReason;

    fn active(generation: u16) -> AlarmSnapshot {
        AlarmSnapshot {
            active: true,
            reason: AlarmReason::UnknownCard,
            generation,
        }
    }

    fn inactive() -> AlarmSnapshot {
        AlarmSnapshot {
            active: false,
            reason: AlarmReason::None,
            generation: 1,
        }
    }

    #[test]
    fn toggles_each_half_period_while_active() {
        let mut siren = SirenPattern::new();
        assert_eq!(siren.sync(active(1)), SirenUpdate::Started);
        assert!(siren.output());
        assert!(!siren.on_half_period());
        assert!(siren.on_half_period());
        assert!(!siren.on_half_period());
    }

    #[test]
    fn silence_forces_output_off_at_once() {
        let mut siren = SirenPattern::new();
        siren.sync(active(1));
        assert_eq!(siren.sync(inactive()), SirenUpdate::Stopped);
        assert!(!siren.output());
        assert!(!siren.on_half_period());
        assert!(!siren.is_running());
    }

    #[test]
    fn same_generation_keeps_phase() {
        let mut siren = SirenPattern::new();
        siren.sync(active(3));
        siren.on_half_period();
        assert_eq!(siren.sync(active(3)), SirenUpdate::Unchanged);
        assert!(!siren.output());
    }

    #[test]
    fn new_generation_restarts_high() {
        let mut siren = SirenPattern::new();
        siren.sync(active(3));
        siren.on_half_period();
        assert_eq!(siren.sync(active(4)), SirenUpdate::Started);
        assert!(siren.output());
    }
}
