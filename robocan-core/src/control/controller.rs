//! Control loop
//!
//! One cooperative loop arbitrates between live drive, recording, playback
//! and storage. Each [`Controller::poll`] handles, in order: record toggle,
//! manual segment close, save, load, play forward, play reverse, delete
//! expiry and delete press, then live drive and the status display. The
//! abort button has no effect outside playback, where the engine reads it
//! as a level once per tick.
//!
//! Playback is awaited inline, so nothing else runs while it plays.

use robocan_hal::FlashStorage;

use crate::config::{ControlConfig, MachineConfig};
use crate::input::{Button, Buttons, InputMapper};
use crate::playback::{PlaybackEngine, PlaybackOutcome};
use crate::recording::{SegmentOutcome, MAX_SEGMENTS};
use crate::storage::SequenceStore;
use crate::traits::{Channel, ChannelDriver, Clock, Direction, InputSource};

use super::events::{ControlEvent, EventSink};
use super::session::{DeletePress, Mode, Session};
use super::status::StatusView;

/// Motion record/playback controller
pub struct Controller<D, C, S, I, E, const N: usize = MAX_SEGMENTS> {
    driver: D,
    clock: C,
    store: SequenceStore<S>,
    input: I,
    sink: E,
    session: Session<N>,
    engine: PlaybackEngine,
    mapper: InputMapper,
    timing: ControlConfig,
    shown: Option<StatusView>,
    last_refresh_ms: u64,
}

impl<D, C, S, I, E, const N: usize> Controller<D, C, S, I, E, N>
where
    D: ChannelDriver,
    C: Clock,
    S: FlashStorage,
    I: InputSource,
    E: EventSink,
{
    /// Create a controller
    ///
    /// `config` is expected to be validated.
    pub fn new(
        driver: D,
        clock: C,
        store: SequenceStore<S>,
        input: I,
        sink: E,
        config: &MachineConfig,
    ) -> Self {
        Self {
            driver,
            clock,
            store,
            input,
            sink,
            session: Session::new(),
            engine: PlaybackEngine::new(config.playback.segment_gap_ms),
            mapper: config.input.mapper(),
            timing: config.control,
            shown: None,
            last_refresh_ms: 0,
        }
    }

    pub fn session(&self) -> &Session<N> {
        &self.session
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn store_mut(&mut self) -> &mut SequenceStore<S> {
        &mut self.store
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    /// Disable both channels, load the stored recording and show status
    pub async fn boot(&mut self) {
        self.driver.disable_all();
        self.load().await;
        let sample = self.input.sample();
        self.session.edges.resync(sample.buttons);
        self.refresh_status(true);
    }

    /// Run the control loop forever
    pub async fn run(&mut self) {
        loop {
            self.poll().await;
            self.clock
                .delay_ms(self.timing.loop_interval_ms as u64)
                .await;
        }
    }

    /// One control loop iteration
    pub async fn poll(&mut self) {
        let now = self.clock.now_ms();
        let sample = self.input.sample();
        let pressed = self.session.edges.update(sample.buttons);

        if pressed.record {
            self.toggle_recording(now);
        }
        if pressed.mark {
            self.mark(now);
        }
        if pressed.save && self.idle_for(Button::Save) {
            self.save().await;
        }
        if pressed.load && self.idle_for(Button::Load) {
            self.load().await;
            self.refresh_status(true);
        }
        if self.play_requested(&pressed).await {
            // Stale axes and edges after a playback; start fresh next poll
            return;
        }

        if self.session.expire_delete(now) {
            self.sink.emit(ControlEvent::DeleteExpired);
            self.refresh_status(true);
        }
        if pressed.delete && self.idle_for(Button::Delete) {
            self.delete(now).await;
        }

        let (dir1, dir2) = self.mapper.map(sample.axes);
        self.live_drive(dir1, dir2, now);

        self.refresh_status(false);
    }

    fn toggle_recording(&mut self, now: u64) {
        if self.session.is_recording() {
            self.session.stop_recording();
            self.sink.emit(ControlEvent::RecordingCancelled {
                segments: self.session.sequence.len(),
            });
        } else {
            self.session.start_recording(now);
            self.sink.emit(ControlEvent::RecordingStarted);
        }
        self.refresh_status(true);
    }

    fn mark(&mut self, now: u64) {
        let session = &mut self.session;
        if let Some(outcome) =
            session
                .recorder
                .close_current_segment(&mut session.sequence, &session.counters, now)
        {
            self.report_segment(outcome);
        }
    }

    /// True if storage and playback actions may run; reports `Busy` if not
    fn idle_for(&mut self, button: Button) -> bool {
        if self.session.mode() == Mode::Idle {
            true
        } else {
            self.sink.emit(ControlEvent::Busy(button));
            false
        }
    }

    async fn save(&mut self) {
        let event = match self.store.save(&self.session.sequence).await {
            Ok(bytes) => ControlEvent::Saved {
                segments: self.session.sequence.len(),
                bytes,
            },
            Err(e) => ControlEvent::SaveFailed(e),
        };
        self.sink.emit(event);
    }

    async fn load(&mut self) {
        let event = match self.store.load::<N>().await {
            Ok((sequence, report)) => {
                self.session.sequence = sequence;
                ControlEvent::Loaded(report)
            }
            Err(e) => ControlEvent::LoadFailed(e),
        };
        self.sink.emit(event);
    }

    /// Play forward and/or reverse as pressed; true if anything played
    async fn play_requested(&mut self, pressed: &Buttons) -> bool {
        let mut played = false;
        if pressed.play_forward && self.idle_for(Button::PlayForward) {
            self.play(false).await;
            played = true;
        }
        if pressed.play_reverse && self.idle_for(Button::PlayReverse) {
            self.play(true).await;
            played = true;
        }
        if played {
            let sample = self.input.sample();
            self.session.edges.resync(sample.buttons);
        }
        played
    }

    /// Replay the sequence through the driver
    ///
    /// Refused with `Busy` unless the session is idle.
    async fn play(&mut self, reverse: bool) -> PlaybackOutcome {
        if !self.session.begin_playback() {
            let button = if reverse {
                Button::PlayReverse
            } else {
                Button::PlayForward
            };
            self.sink.emit(ControlEvent::Busy(button));
            return PlaybackOutcome::NothingToPlay;
        }
        // Live drive may have left channels enabled
        self.driver.disable_all();
        self.sink.emit(ControlEvent::PlaybackStarted {
            reverse,
            segments: self.session.sequence.len(),
        });
        self.refresh_status(true);

        let input = &mut self.input;
        let mut abort = || input.abort_pressed();
        let outcome = self
            .engine
            .play(
                &self.session.sequence,
                reverse,
                &mut self.driver,
                &self.clock,
                &mut abort,
            )
            .await;

        self.session.end_playback();
        self.sink.emit(ControlEvent::PlaybackFinished(outcome));
        self.refresh_status(true);
        outcome
    }

    async fn delete(&mut self, now: u64) {
        match self.session.press_delete(now, self.timing.delete_confirm_ms) {
            DeletePress::Armed => self.sink.emit(ControlEvent::DeleteArmed),
            DeletePress::Confirmed => match self.store.delete_all().await {
                Ok(()) => {
                    self.session.sequence.clear();
                    self.session.show_notice(now, self.timing.notice_ms);
                    self.sink.emit(ControlEvent::Deleted);
                }
                Err(e) => self.sink.emit(ControlEvent::DeleteFailed(e)),
            },
        }
        self.refresh_status(true);
    }

    /// Apply joystick directions: feed the recorder, then step each moving
    /// channel once and count the steps
    fn live_drive(&mut self, dir1: Direction, dir2: Direction, now: u64) {
        let session = &mut self.session;
        if let Some(outcome) = session.recorder.note_direction_change(
            dir1,
            dir2,
            &mut session.sequence,
            &session.counters,
            now,
        ) {
            self.report_segment(outcome);
        }

        self.driver.apply(Channel::One, dir1);
        self.driver.apply(Channel::Two, dir2);
        self.driver.pulse_pair(dir1.is_moving(), dir2.is_moving());

        for (channel, dir) in [(Channel::One, dir1), (Channel::Two, dir2)] {
            if dir.is_moving() {
                self.session.counters.increment(channel);
            }
        }
    }

    fn report_segment(&mut self, outcome: SegmentOutcome) {
        let event = match outcome {
            SegmentOutcome::Appended(segment) => ControlEvent::SegmentRecorded {
                index: self.session.sequence.len().saturating_sub(1),
                segment,
            },
            SegmentOutcome::Dropped(segment) => ControlEvent::SegmentDropped(segment),
            SegmentOutcome::Stationary { duration_ms } => {
                ControlEvent::StationarySkipped { duration_ms }
            }
        };
        self.sink.emit(event);
    }

    /// Push the status view to the sink if it changed
    ///
    /// Without `force`, the view is re-evaluated at most once per
    /// `status_refresh_ms`.
    fn refresh_status(&mut self, force: bool) {
        let now = self.clock.now_ms();
        let elapsed = now.saturating_sub(self.last_refresh_ms);
        let due = elapsed >= self.timing.status_refresh_ms as u64;
        if !force && !due {
            return;
        }
        self.last_refresh_ms = now;

        let view = StatusView::of(&self.session, now);
        if self.shown != Some(view) {
            self.sink.status(&view.render());
            self.shown = Some(view);
        }
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::input::InputSample;
    use crate::recording::{Segment, Sequence};
    use crate::storage::{Corruption, LoadReport, StoreError};
    use crate::testing::{MemFlash, MockDriver, ScriptedInput, SimClock, VecSink};
    use crate::traits::Direction::{Forward as F, Reverse as R, Stop as S};
    use robocan_hal::{FlashError, StorageKey};

    type TestController<'a> =
        Controller<MockDriver<'a>, &'a SimClock, MemFlash, ScriptedInput, VecSink, 8>;

    const CENTER: u16 = 2048;
    const FULL: u16 = 4095;

    fn controller(clock: &SimClock, flash: MemFlash) -> TestController<'_> {
        Controller::new(
            MockDriver::new(clock),
            clock,
            SequenceStore::new(flash),
            ScriptedInput::new(),
            VecSink::new(),
            &MachineConfig::default(),
        )
    }

    fn flash_with(segments: &[Segment]) -> MemFlash {
        let seq: Sequence<8> = Sequence::from_segments(segments).unwrap();
        let mut store = SequenceStore::new(MemFlash::new());
        block_on(store.save(&seq)).unwrap();
        store.into_inner()
    }

    fn stored() -> [Segment; 2] {
        [Segment::new(F, R, 10, 3, 100), Segment::new(S, F, 0, 4, 40)]
    }

    fn axes(first: u16, second: u16) -> InputSample {
        InputSample {
            axes: [first, second],
            buttons: Buttons::NONE,
        }
    }

    fn poll_with(ctl: &mut TestController<'_>, sample: InputSample) {
        ctl.input_mut().push(sample);
        block_on(ctl.poll());
    }

    fn events(ctl: &TestController<'_>) -> Vec<ControlEvent> {
        ctl.sink().events.clone()
    }

    #[test]
    fn test_boot_loads_stored_recording() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, flash_with(&stored()));

        block_on(ctl.boot());

        assert_eq!(ctl.session().sequence.as_slice(), &stored());
        assert_eq!(events(&ctl), vec![ControlEvent::Loaded(LoadReport::Loaded(2))]);
        assert_eq!(ctl.sink().last_screen(), Some("REC:OFF  PLAY:OFF\nSegs: 2"));
        assert!(!ctl.driver().is_enabled(Channel::One));
    }

    #[test]
    fn test_boot_with_corrupted_flash() {
        let clock = SimClock::new();
        let mut flash = MemFlash::new();
        flash.put(StorageKey::Recording, &[101]);
        let mut ctl = controller(&clock, flash);

        block_on(ctl.boot());

        assert!(ctl.session().sequence.is_empty());
        assert_eq!(
            events(&ctl),
            vec![ControlEvent::Loaded(LoadReport::Corrupted(
                Corruption::CountOutOfRange(101)
            ))]
        );
    }

    #[test]
    fn test_live_drive_steps_and_counts() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, MemFlash::new());

        poll_with(&mut ctl, axes(FULL, CENTER));

        assert!(ctl.driver().is_enabled(Channel::One));
        assert!(ctl.driver().is_enabled(Channel::Two));
        assert_eq!(ctl.driver().pulse_count(Channel::One), 1);
        assert_eq!(ctl.driver().pulse_count(Channel::Two), 1);
        assert_eq!(ctl.session().counters.snapshot(), [1, 1]);

        poll_with(&mut ctl, axes(CENTER, CENTER));
        assert!(!ctl.driver().is_enabled(Channel::One));
        assert_eq!(ctl.driver().pulse_count(Channel::One), 1);
    }

    #[test]
    fn test_record_segment_from_live_drive() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, MemFlash::new());

        poll_with(&mut ctl, InputSample::pressing(Button::Record));
        assert_eq!(ctl.session().mode(), Mode::Recording);

        clock.advance_ms(5);
        poll_with(&mut ctl, axes(FULL, CENTER));
        for _ in 0..2 {
            clock.advance_ms(5);
            block_on(ctl.poll());
        }
        clock.advance_ms(5);
        poll_with(&mut ctl, axes(CENTER, CENTER));

        let expected = Segment::new(F, F, 3, 3, 15);
        assert_eq!(ctl.session().sequence.as_slice(), &[expected]);

        clock.advance_ms(5);
        poll_with(&mut ctl, InputSample::pressing(Button::Record));

        assert_eq!(
            events(&ctl),
            vec![
                ControlEvent::RecordingStarted,
                ControlEvent::StationarySkipped { duration_ms: 5 },
                ControlEvent::SegmentRecorded {
                    index: 0,
                    segment: expected
                },
                ControlEvent::RecordingCancelled { segments: 1 },
            ]
        );
        assert_eq!(ctl.session().mode(), Mode::Idle);
    }

    #[test]
    fn test_mark_closes_segment() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, MemFlash::new());

        poll_with(&mut ctl, InputSample::pressing(Button::Record));
        poll_with(&mut ctl, axes(FULL, CENTER));
        clock.advance_ms(10);

        // Mark mid-motion: the segment closes, motion continues in a new one
        let mut marking = InputSample::pressing(Button::Mark);
        marking.axes = [FULL, CENTER];
        poll_with(&mut ctl, marking);

        assert_eq!(
            ctl.session().sequence.as_slice(),
            &[Segment::new(F, F, 1, 1, 10)]
        );
        assert_eq!(ctl.session().recorder.directions(), Some((F, F)));
        assert_eq!(ctl.session().counters.snapshot(), [2, 2]);
    }

    #[test]
    fn test_full_sequence_keeps_recording() {
        let clock = SimClock::new();
        let mut ctl: Controller<_, _, _, _, _, 1> = Controller::new(
            MockDriver::new(&clock),
            &clock,
            SequenceStore::new(MemFlash::new()),
            ScriptedInput::new(),
            VecSink::new(),
            &MachineConfig::default(),
        );
        let moving = axes(FULL, CENTER);
        let mut marking = InputSample::pressing(Button::Mark);
        marking.axes = [FULL, CENTER];

        let script = [
            (0, InputSample::pressing(Button::Record)),
            (5, moving),
            (10, marking),
            (15, moving),
            (20, marking),
            (30, axes(CENTER, CENTER)),
        ];
        for (at, sample) in script {
            clock.advance_ms(at - clock.now_ms());
            ctl.input_mut().push(sample);
            block_on(ctl.poll());
        }

        let first = Segment::new(F, F, 1, 1, 5);
        assert_eq!(ctl.session().sequence.as_slice(), &[first]);
        assert_eq!(ctl.session().mode(), Mode::Recording);
        assert_eq!(
            ctl.sink().events,
            vec![
                ControlEvent::RecordingStarted,
                ControlEvent::StationarySkipped { duration_ms: 5 },
                ControlEvent::SegmentRecorded {
                    index: 0,
                    segment: first
                },
                // Mark on a full sequence
                ControlEvent::SegmentDropped(Segment::new(F, F, 2, 2, 10)),
                // Direction change on a full sequence
                ControlEvent::SegmentDropped(Segment::new(F, F, 1, 1, 10)),
            ]
        );
    }

    #[test]
    fn test_storage_rejected_while_recording() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, MemFlash::new());

        poll_with(&mut ctl, InputSample::pressing(Button::Record));
        poll_with(&mut ctl, InputSample::pressing(Button::Save));
        poll_with(&mut ctl, InputSample::pressing(Button::Delete));
        poll_with(&mut ctl, InputSample::pressing(Button::PlayForward));

        let evs = events(&ctl);
        assert!(evs.contains(&ControlEvent::Busy(Button::Save)));
        assert!(evs.contains(&ControlEvent::Busy(Button::Delete)));
        assert!(evs.contains(&ControlEvent::Busy(Button::PlayForward)));
        assert!(ctl.store_mut().storage_mut().get(StorageKey::Recording).is_none());
        assert_eq!(ctl.session().mode(), Mode::Recording);
    }

    #[test]
    fn test_save_and_load() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, flash_with(&stored()));
        block_on(ctl.boot());

        poll_with(&mut ctl, InputSample::pressing(Button::Save));
        assert!(matches!(
            events(&ctl).last(),
            Some(ControlEvent::Saved { segments: 2, .. })
        ));

        // Failed load keeps the sequence in memory
        ctl.store_mut().storage_mut().fail = true;
        poll_with(&mut ctl, axes(CENTER, CENTER));
        poll_with(&mut ctl, InputSample::pressing(Button::Load));
        assert_eq!(
            events(&ctl).last(),
            Some(&ControlEvent::LoadFailed(StoreError::Flash(FlashError::Flash)))
        );
        assert_eq!(ctl.session().sequence.len(), 2);
    }

    #[test]
    fn test_play_forward() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, flash_with(&stored()));
        block_on(ctl.boot());

        poll_with(&mut ctl, InputSample::pressing(Button::PlayForward));

        let evs = events(&ctl);
        assert_eq!(
            &evs[1..],
            &[
                ControlEvent::PlaybackStarted {
                    reverse: false,
                    segments: 2
                },
                ControlEvent::PlaybackFinished(PlaybackOutcome::Completed { segments: 2 }),
            ]
        );
        assert_eq!(ctl.driver().pulse_count(Channel::One), 10);
        assert_eq!(ctl.driver().pulse_count(Channel::Two), 7);
        assert!(!ctl.driver().is_enabled(Channel::Two));
        assert_eq!(ctl.session().mode(), Mode::Idle);

        // Still held after playback: no second run
        block_on(ctl.poll());
        assert_eq!(events(&ctl).len(), evs.len());
    }

    #[test]
    fn test_play_aborted() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, flash_with(&stored()));
        block_on(ctl.boot());
        ctl.input_mut().abort_after = Some(3);

        poll_with(&mut ctl, InputSample::pressing(Button::PlayReverse));

        assert_eq!(
            events(&ctl).last(),
            Some(&ControlEvent::PlaybackFinished(PlaybackOutcome::Aborted {
                segment: 1,
                tick: 3
            }))
        );
        assert!(!ctl.driver().is_enabled(Channel::One));
        assert!(!ctl.driver().is_enabled(Channel::Two));
    }

    #[test]
    fn test_play_refused_outside_idle() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, flash_with(&stored()));
        block_on(ctl.boot());
        poll_with(&mut ctl, InputSample::pressing(Button::Record));
        poll_with(&mut ctl, axes(FULL, CENTER));
        let pulses = ctl.driver().pulse_count(Channel::One);

        let outcome = block_on(ctl.play(true));

        assert_eq!(outcome, PlaybackOutcome::NothingToPlay);
        assert_eq!(
            events(&ctl).last(),
            Some(&ControlEvent::Busy(Button::PlayReverse))
        );
        assert_eq!(ctl.session().mode(), Mode::Recording);
        assert!(ctl.driver().is_enabled(Channel::One));
        assert_eq!(ctl.driver().pulse_count(Channel::One), pulses);
    }

    #[test]
    fn test_play_empty_sequence() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, MemFlash::new());
        block_on(ctl.boot());

        poll_with(&mut ctl, InputSample::pressing(Button::PlayForward));

        assert_eq!(
            events(&ctl).last(),
            Some(&ControlEvent::PlaybackFinished(PlaybackOutcome::NothingToPlay))
        );
        assert_eq!(ctl.driver().pulse_count(Channel::One), 0);
    }

    #[test]
    fn test_two_presses_delete() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, flash_with(&stored()));
        block_on(ctl.boot());

        poll_with(&mut ctl, InputSample::pressing(Button::Delete));
        assert_eq!(events(&ctl).last(), Some(&ControlEvent::DeleteArmed));
        assert_eq!(
            ctl.sink().last_screen(),
            Some("Press delete again\nto confirm DELETE")
        );

        clock.advance_ms(1_000);
        poll_with(&mut ctl, axes(CENTER, CENTER));
        clock.advance_ms(500);
        poll_with(&mut ctl, InputSample::pressing(Button::Delete));

        assert_eq!(events(&ctl).last(), Some(&ControlEvent::Deleted));
        assert!(ctl.session().sequence.is_empty());
        assert!(ctl.store_mut().storage_mut().get(StorageKey::Recording).is_none());
        assert_eq!(ctl.sink().last_screen(), Some("DELETED ALL"));

        // Notice clears after notice_ms
        clock.advance_ms(900);
        poll_with(&mut ctl, axes(CENTER, CENTER));
        assert_eq!(ctl.sink().last_screen(), Some("REC:OFF  PLAY:OFF\nSegs: 0"));
    }

    #[test]
    fn test_single_press_expires() {
        let clock = SimClock::new();
        let mut ctl = controller(&clock, flash_with(&stored()));
        block_on(ctl.boot());

        poll_with(&mut ctl, InputSample::pressing(Button::Delete));
        clock.advance_ms(2_001);
        poll_with(&mut ctl, axes(CENTER, CENTER));

        assert_eq!(events(&ctl).last(), Some(&ControlEvent::DeleteExpired));
        assert_eq!(ctl.session().sequence.len(), 2);
        assert!(ctl.store_mut().storage_mut().get(StorageKey::Recording).is_some());

        // A late second press only arms again
        clock.advance_ms(10);
        poll_with(&mut ctl, InputSample::pressing(Button::Delete));
        assert_eq!(events(&ctl).last(), Some(&ControlEvent::DeleteArmed));
        assert_eq!(ctl.session().sequence.len(), 2);
    }
}
