use crate::alarm::{alarm_screen, AlarmCoordinator};
use crate::config::CheckpointIdentity;
use crate::display::Screen;
use crate::ports::{CardReaderPort, ClockPort, DisplayPort, Publisher};
use crate::scan::{ScanDispatcher, ScanOutcome};
use crate::shared::SharedState;
use crate::types::AlarmReason;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    /// Reconfiguration or restart in progress; nothing serviced.
    Suspended,
    ReconfigurationRequested,
    AlarmShown(AlarmReason),
    /// Not both links up; scanning skipped.
    Offline,
    NoCard,
    Dispatched(ScanOutcome),
}

/// The cooperative per-tick driver.
pub struct MainLoop<'a, R, C, D, P> {
    shared: &'a SharedState,
    identity: &'a CheckpointIdentity,
    reader: R,
    clock: C,
    display: D,
    publisher: P,
}

impl<'a, R, C, D, P> MainLoop<'a, R, C, D, P>
where
    R: CardReaderPort,
    C: ClockPort,
    D: DisplayPort,
    P: Publisher,
{
    pub fn new(
        shared: &'a SharedState,
        identity: &'a CheckpointIdentity,
        reader: R,
        clock: C,
        display: D,
        publisher: P,
    ) -> Self {
        Self {
            shared,
            identity,
            reader,
            clock,
            display,
            publisher,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.shared.is_suspended() {
            // Presses during reconfiguration are dropped.
            let _ = self.shared.take_config_request();
            return TickOutcome::Suspended;
        }

        if self.shared.take_config_request() {
            self.shared.set_suspended(true);
            return TickOutcome::ReconfigurationRequested;
        }

        let alarm = AlarmCoordinator::new(self.shared).snapshot();
        if alarm.active {
            self.display.show(alarm_screen(alarm.reason));
            return TickOutcome::AlarmShown(alarm.reason);
        }

        if self.shared.take_scan_success() {
            self.display.show(Screen::ValidScan);
        }

        let link = self.shared.is_link_up();
        let session = link && self.shared.is_session_up();
        self.display.show(Screen::Status { link, session });
        if !session {
            return TickOutcome::Offline;
        }

        let Some(uid) = self.reader.poll_card() else {
            return TickOutcome::NoCard;
        };

        self.display.show(Screen::Scanning);
        let dispatcher = ScanDispatcher::new(self.shared, self.identity);
        TickOutcome::Dispatched(dispatcher.on_card_read(&uid, &mut self.clock, &mut self.publisher))
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{CardUid, PublishError};
    use crate::topics;
    use crate::types::{Qos, ShiftStatus};
    use std::vec::Vec;

    #[derive(Default)]
    struct FakeReader {
        cards: Vec<CardUid>,
        polls: usize,
    }

    impl CardReaderPort for FakeReader {
        fn poll_card(&mut self) -> Option<CardUid> {
            self.polls += 1;
            self.cards.pop()
        }
    }

    struct FakeClock;

    impl ClockPort for FakeClock {
        fn now_epoch_secs(&mut self) -> u32 {
            1_000
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        shown: Vec<Screen>,
    }

    impl DisplayPort for RecordingDisplay {
        fn show(&mut self, screen: Screen) {
            self.shown.push(screen);
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        topics: Vec<std::string::String>,
    }

    impl Publisher for RecordingPublisher {
        fn publish(
            &mut self,
            topic: &str,
            _payload: &[u8],
            _qos: Qos,
            _retain: bool,
        ) -> Result<(), PublishError> {
            self.topics.push(topic.into());
            Ok(())
        }
    }

    type TestLoop<'a> = MainLoop<'a, FakeReader, FakeClock, RecordingDisplay, RecordingPublisher>;

    fn card(bytes: &[u8]) -> CardUid {
        CardUid::from_slice(bytes).unwrap()
    }

    fn online(shared: &SharedState) {
        shared.set_link_up(true);
        shared.set_session_up(true);
    }

    fn build<'a>(shared: &'a SharedState, identity: &'a CheckpointIdentity) -> TestLoop<'a> {
        MainLoop::new(
            shared,
            identity,
            FakeReader::default(),
            FakeClock,
            RecordingDisplay::default(),
            RecordingPublisher::default(),
        )
    }

    #[test]
    fn config_request_wins_and_suspends() {
        let shared = SharedState::new();
        let identity = CheckpointIdentity::default();
        let mut main_loop = build(&shared, &identity);
        online(&shared);
        AlarmCoordinator::new(&shared).raise(AlarmReason::StolenCard);
        shared.request_config();

        assert_eq!(main_loop.tick(), TickOutcome::ReconfigurationRequested);
        assert!(!shared.is_config_requested());
        assert!(main_loop.display.shown.is_empty());
        assert_eq!(main_loop.tick(), TickOutcome::Suspended);
    }

    #[test]
    fn alarm_ends_tick_before_scanning() {
        let shared = SharedState::new();
        let identity = CheckpointIdentity::default();
        let mut main_loop = build(&shared, &identity);
        online(&shared);
        main_loop.reader.cards.push(card(&[1, 2]));
        AlarmCoordinator::new(&shared).raise(AlarmReason::OverdueScan);

        assert_eq!(main_loop.tick(), TickOutcome::AlarmShown(AlarmReason::OverdueScan));
        assert_eq!(main_loop.display.shown, [Screen::ScanWindowPassed]);
        assert_eq!(main_loop.reader.polls, 0);
    }

    #[test]
    fn success_ack_shown_once_then_status() {
        let shared = SharedState::new();
        let identity = CheckpointIdentity::default();
        let mut main_loop = build(&shared, &identity);
        online(&shared);
        shared.mark_scan_success();

        assert_eq!(main_loop.tick(), TickOutcome::NoCard);
        assert_eq!(
            main_loop.display.shown,
            [
                Screen::ValidScan,
                Screen::Status {
                    link: true,
                    session: true
                }
            ]
        );
        main_loop.display.shown.clear();
        main_loop.tick();
        assert_eq!(
            main_loop.display.shown,
            [Screen::Status {
                link: true,
                session: true
            }]
        );
    }

    #[test]
    fn link_without_session_skips_reader() {
        let shared = SharedState::new();
        let identity = CheckpointIdentity::default();
        let mut main_loop = build(&shared, &identity);
        shared.set_link_up(true);

        assert_eq!(main_loop.tick(), TickOutcome::Offline);
        assert_eq!(
            main_loop.display.shown,
            [Screen::Status {
                link: true,
                session: false
            }]
        );
        assert_eq!(main_loop.reader.polls, 0);
    }

    #[test]
    fn neither_link_shows_both_failed() {
        let shared = SharedState::new();
        let identity = CheckpointIdentity::default();
        let mut main_loop = build(&shared, &identity);
        assert_eq!(main_loop.tick(), TickOutcome::Offline);
        assert_eq!(
            main_loop.display.shown,
            [Screen::Status {
                link: false,
                session: false
            }]
        );
    }

    #[test]
    fn card_read_during_shift_dispatches_scan() {
        let shared = SharedState::new();
        let identity = CheckpointIdentity::default();
        let mut main_loop = build(&shared, &identity);
        online(&shared);
        shared.set_shift(ShiftStatus::Active);
        main_loop.reader.cards.push(card(&[0x0A, 0xFF, 0x03]));

        let outcome = main_loop.tick();
        assert!(matches!(
            outcome,
            TickOutcome::Dispatched(ScanOutcome { topic, published: Ok(()) }) if topic == topics::SENTRY_SCAN_INFO
        ));
        assert_eq!(main_loop.display.shown.last(), Some(&Screen::Scanning));
        assert_eq!(main_loop.publisher.topics, [topics::SENTRY_SCAN_INFO]);
        assert!(!shared.alarm().active);
    }

    #[test]
    fn card_read_outside_shift_raises_alarm_shown_next_tick() {
        let shared = SharedState::new();
        let identity = CheckpointIdentity::default();
        let mut main_loop = build(&shared, &identity);
        online(&shared);
        main_loop.reader.cards.push(card(&[0x01]));

        main_loop.tick();
        assert_eq!(main_loop.publisher.topics, [topics::OUTSIDE_SHIFT_SCAN]);
        assert_eq!(main_loop.tick(), TickOutcome::AlarmShown(AlarmReason::NoShiftScan));
    }
}
