use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame clock with delta tracking and an optional frame-rate cap.
///
/// The application ticks the clock once per frame, then calls
/// `scene.update()` and `engine.render()`. Recent deltas are kept in a
/// rolling window for average/best/worst statistics.
pub struct FrameClock {
    start_time: Instant,
    last_tick: Option<Instant>,
    past_deltas: VecDeque<Duration>,
    max_deltas: usize,
    max_fps: Option<f32>,
    /// Time since the previous tick (zero on the first tick)
    pub delta: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(None, 10)
    }
}

impl FrameClock {
    /// Creates a clock. `max_fps` of `None` disables limiting; `max_deltas`
    /// is the size of the statistics window (at least 1).
    #[must_use]
    pub fn new(max_fps: Option<f32>, max_deltas: usize) -> Self {
        let max_deltas = max_deltas.max(1);
        Self {
            start_time: Instant::now(),
            last_tick: None,
            past_deltas: VecDeque::with_capacity(max_deltas),
            max_deltas,
            max_fps: max_fps.filter(|fps| *fps > 0.0),
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances the clock and returns the time since the previous tick.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = self.last_tick.map_or(Duration::ZERO, |last| now - last);
        self.last_tick = Some(now);
        if !delta.is_zero() {
            self.record_delta(delta);
        }
        self.delta = delta;
        self.frame_count += 1;
        delta
    }

    /// Pushes a delta into the statistics window, evicting the oldest one
    /// when full.
    pub fn record_delta(&mut self, delta: Duration) {
        if self.past_deltas.len() == self.max_deltas {
            self.past_deltas.pop_front();
        }
        self.past_deltas.push_back(delta);
    }

    #[must_use]
    pub fn max_deltas(&self) -> usize {
        self.max_deltas
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Mean delta over the window, zero before any delta was recorded.
    #[must_use]
    pub fn average(&self) -> Duration {
        if self.past_deltas.is_empty() {
            return Duration::ZERO;
        }
        self.past_deltas.iter().sum::<Duration>() / self.past_deltas.len() as u32
    }

    /// Shortest delta in the window.
    #[must_use]
    pub fn best(&self) -> Duration {
        self.past_deltas.iter().min().copied().unwrap_or_default()
    }

    /// Longest delta in the window.
    #[must_use]
    pub fn worst(&self) -> Duration {
        self.past_deltas.iter().max().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn fps(&self) -> f32 {
        duration_to_fps(self.average())
    }

    #[must_use]
    pub fn best_fps(&self) -> f32 {
        duration_to_fps(self.best())
    }

    #[must_use]
    pub fn worst_fps(&self) -> f32 {
        duration_to_fps(self.worst())
    }

    /// Remaining time until the next frame is due under the fps cap, or
    /// `None` when there is nothing to wait for.
    #[must_use]
    pub fn limit_wait(&self) -> Option<Duration> {
        let frame_budget = Duration::from_secs_f32(1.0 / self.max_fps?);
        let since_last = self.last_tick?.elapsed();
        frame_budget.checked_sub(since_last).filter(|wait| !wait.is_zero())
    }

    /// Sleeps until the next frame is due under the fps cap.
    pub fn tick_limit(&self) {
        if let Some(wait) = self.limit_wait() {
            std::thread::sleep(wait);
        }
    }
}

fn duration_to_fps(delta: Duration) -> f32 {
    if delta.is_zero() { 0.0 } else { 1.0 / delta.as_secs_f32() }
}
