//! Button sampling, rising-edge debouncing and the hold-to-exit gesture.

use crate::platform::{Button, Platform};

/// Pause after the buttons first read released, before trusting it.
const RELEASE_SETTLE_MS: u32 = 150;
const RELEASE_POLL_MS: u32 = 50;

/// Raw button levels for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputSnapshot {
    pub a: bool,
    pub b: bool,
    pub both: bool,
}

impl InputSnapshot {
    pub const fn new(a: bool, b: bool) -> Self {
        InputSnapshot { a, b, both: a && b }
    }

    pub fn read<P: Platform>(platform: &mut P) -> Self {
        let a = platform.button_pressed(Button::A);
        let b = platform.button_pressed(Button::B);
        Self::new(a, b)
    }

    pub fn any(&self) -> bool {
        self.a || self.b
    }
}

/// Turns a sampled level into one event per physical press.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeDetector {
    previous: bool,
    last_accepted: Option<u64>,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        EdgeDetector {
            previous: false,
            last_accepted: None,
        }
    }

    /// Feeds one sample. Returns true on a not-pressed to pressed
    /// transition at least `debounce_ms` after the last accepted one.
    pub fn update(&mut self, level: bool, now: u64, debounce_ms: u64) -> bool {
        let rising = level && !self.previous;
        self.previous = level;
        if !rising {
            return false;
        }
        match self.last_accepted {
            Some(last) if now.saturating_sub(last) < debounce_ms => false,
            _ => {
                self.last_accepted = Some(now);
                true
            }
        }
    }

    /// Adopt `level` as the previous sample without producing an event,
    /// so a button already down must be released and pressed again.
    pub fn rearm(&mut self, level: bool) {
        self.previous = level;
    }
}

/// Debounced presses seen this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Presses {
    pub a: bool,
    pub b: bool,
}

/// Edge detection for both buttons plus a quiet window during which
/// every edge is swallowed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ButtonEdges {
    a: EdgeDetector,
    b: EdgeDetector,
    quiet_until: u64,
}

impl ButtonEdges {
    pub const fn new() -> Self {
        ButtonEdges {
            a: EdgeDetector::new(),
            b: EdgeDetector::new(),
            quiet_until: 0,
        }
    }

    pub fn poll(&mut self, input: InputSnapshot, now: u64, debounce_ms: u64) -> Presses {
        if self.cooling_down(now) {
            self.a.rearm(input.a);
            self.b.rearm(input.b);
            return Presses::default();
        }
        Presses {
            a: self.a.update(input.a, now, debounce_ms),
            b: self.b.update(input.b, now, debounce_ms),
        }
    }

    pub fn reset(&mut self, input: InputSnapshot) {
        self.a.rearm(input.a);
        self.b.rearm(input.b);
    }

    /// Reset and ignore all edges for `window_ms`.
    pub fn cool_down(&mut self, input: InputSnapshot, now: u64, window_ms: u64) {
        self.reset(input);
        self.quiet_until = now + window_ms;
    }

    pub fn cooling_down(&self, now: u64) -> bool {
        now < self.quiet_until
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldProgress {
    Idle,
    /// Both buttons down, fraction of the threshold reached.
    Holding(f32),
    Fired,
}

/// Hold both buttons for the threshold to leave a game.
#[derive(Clone, Copy, Debug)]
pub struct ExitHoldGesture {
    started: Option<u64>,
    threshold_ms: u64,
}

impl ExitHoldGesture {
    pub const fn new(threshold_ms: u64) -> Self {
        ExitHoldGesture {
            started: None,
            threshold_ms,
        }
    }

    pub fn update(&mut self, both: bool, now: u64) -> HoldProgress {
        if !both {
            self.started = None;
            return HoldProgress::Idle;
        }
        let started = *self.started.get_or_insert(now);
        let progress = self.progress_at(started, now);
        if progress >= 1.0 {
            self.started = None;
            return HoldProgress::Fired;
        }
        HoldProgress::Holding(progress)
    }

    pub fn progress(&self, now: u64) -> f32 {
        match self.started {
            Some(started) => self.progress_at(started, now).min(1.0),
            None => 0.0,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.started.is_some()
    }

    pub fn reset(&mut self) {
        self.started = None;
    }

    fn progress_at(&self, started: u64, now: u64) -> f32 {
        let elapsed = now.saturating_sub(started);
        if elapsed >= self.threshold_ms {
            return 1.0;
        }
        elapsed as f32 / self.threshold_ms as f32
    }
}

/// Polls until both buttons have stayed released for a short settle
/// period, giving up after `timeout_ms`. Returns whether the release was
/// seen. Blocks, but never longer than the timeout plus one poll.
pub fn wait_for_release<P: Platform>(platform: &mut P, timeout_ms: u64) -> bool {
    let started = platform.now_ms();
    loop {
        if !InputSnapshot::read(platform).any() {
            platform.delay_ms(RELEASE_SETTLE_MS);
            if !InputSnapshot::read(platform).any() {
                return true;
            }
        }
        let waited = platform.now_ms().saturating_sub(started);
        if waited > timeout_ms {
            warn!("buttons still held after {} ms, carrying on", waited);
            return false;
        }
        platform.delay_ms(RELEASE_POLL_MS);
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::platform::HeadlessPlatform;

    const DEBOUNCE: u64 = 200;

    #[test]
    fn holding_yields_one_press() {
        let mut edge = EdgeDetector::new();
        let events = (0..100u64)
            .filter(|frame| edge.update(true, 1_000 + frame * 16, DEBOUNCE))
            .count();
        assert_eq!(events, 1);
    }

    #[test]
    fn spaced_presses_are_distinct() {
        let mut edge = EdgeDetector::new();
        let mut events = 0;
        for press in 0..4u64 {
            let t = press * 300;
            events += edge.update(true, t, DEBOUNCE) as u32;
            events += edge.update(false, t + 50, DEBOUNCE) as u32;
        }
        assert_eq!(events, 4);
    }

    #[test]
    fn bounce_inside_window_is_ignored() {
        let mut edge = EdgeDetector::new();
        assert!(edge.update(true, 0, DEBOUNCE));
        assert!(!edge.update(false, 20, DEBOUNCE));
        assert!(!edge.update(true, 40, DEBOUNCE));
        assert!(!edge.update(false, 60, DEBOUNCE));
        assert!(edge.update(true, 200, DEBOUNCE));
    }

    #[test]
    fn accepted_presses_respect_debounce_for_random_samples() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..20 {
            let mut edge = EdgeDetector::new();
            let mut now = 0u64;
            let mut last: Option<u64> = None;
            for _ in 0..2_000 {
                now += rng.gen_range(1..40);
                if edge.update(rng.gen_bool(0.5), now, DEBOUNCE) {
                    if let Some(prev) = last {
                        assert!(now - prev >= DEBOUNCE, "presses {prev} and {now} too close");
                    }
                    last = Some(now);
                }
            }
        }
    }

    #[test]
    fn rearm_needs_a_fresh_press() {
        let mut edge = EdgeDetector::new();
        assert!(edge.update(true, 0, DEBOUNCE));
        edge.rearm(true);
        assert!(!edge.update(true, 900, DEBOUNCE));
        assert!(!edge.update(false, 920, DEBOUNCE));
        assert!(edge.update(true, 940, DEBOUNCE));
    }

    #[test]
    fn rearm_with_button_up_keeps_the_next_press() {
        let mut edges = ButtonEdges::new();
        let b = InputSnapshot::new(false, true);
        assert_eq!(edges.poll(b, 1_000, DEBOUNCE), Presses { a: false, b: true });
        edges.reset(InputSnapshot::new(false, false));
        assert_eq!(edges.poll(InputSnapshot::default(), 1_300, DEBOUNCE), Presses::default());
        assert_eq!(edges.poll(b, 1_316, DEBOUNCE), Presses { a: false, b: true });
    }

    #[test]
    fn reset_does_not_open_a_debounce_window() {
        let mut edges = ButtonEdges::new();
        edges.reset(InputSnapshot::default());
        let b = InputSnapshot::new(false, true);
        assert_eq!(edges.poll(b, 32, DEBOUNCE), Presses { a: false, b: true });
    }

    #[test]
    fn cooldown_swallows_edges() {
        let mut edges = ButtonEdges::new();
        edges.cool_down(InputSnapshot::new(true, true), 1_000, 500);
        let idle = InputSnapshot::new(false, false);
        let a = InputSnapshot::new(true, false);
        assert_eq!(edges.poll(idle, 1_016, DEBOUNCE), Presses::default());
        assert_eq!(edges.poll(a, 1_300, DEBOUNCE), Presses::default());
        assert_eq!(edges.poll(idle, 1_450, DEBOUNCE), Presses::default());
        assert!(!edges.cooling_down(1_500));
        assert_eq!(edges.poll(a, 1_520, DEBOUNCE), Presses { a: true, b: false });
    }

    #[test]
    fn gesture_progress_is_monotonic_and_fires_once() {
        let mut gesture = ExitHoldGesture::new(1_500);
        let mut last = -1.0f32;
        let mut fired = 0;
        for frame in 0..200u64 {
            match gesture.update(true, frame * 16) {
                HoldProgress::Holding(p) => {
                    assert!(p >= last);
                    assert!((0.0..1.0).contains(&p));
                    last = p;
                }
                HoldProgress::Fired => {
                    fired += 1;
                    assert!(frame * 16 >= 1_500);
                    break;
                }
                HoldProgress::Idle => unreachable!(),
            }
        }
        assert_eq!(fired, 1);
        assert!(!gesture.is_holding());
    }

    #[test]
    fn releasing_resets_the_hold() {
        let mut gesture = ExitHoldGesture::new(1_500);
        gesture.update(true, 0);
        assert!(matches!(gesture.update(true, 1_400), HoldProgress::Holding(_)));
        assert_eq!(gesture.update(false, 1_450), HoldProgress::Idle);
        assert_eq!(gesture.progress(1_450), 0.0);
        assert_eq!(gesture.update(true, 1_500), HoldProgress::Holding(0.0));
        assert_eq!(gesture.update(true, 2_999), HoldProgress::Holding(1_499.0 / 1_500.0));
        assert_eq!(gesture.update(true, 3_000), HoldProgress::Fired);
    }

    #[test]
    fn wait_for_release_returns_once_buttons_settle() {
        let mut board = HeadlessPlatform::new(3);
        board.set_buttons(true, false);
        board.release_all_at(400);
        assert!(wait_for_release(&mut board, 3_000));
        assert!(board.now_ms() >= 400 + RELEASE_SETTLE_MS as u64);
    }

    #[test]
    fn wait_for_release_gives_up_on_a_stuck_button() {
        let mut board = HeadlessPlatform::new(3);
        board.set_buttons(true, true);
        assert!(!wait_for_release(&mut board, 3_000));
        assert!(board.now_ms() > 3_000);
        assert!(board.now_ms() < 3_200);
    }
}
