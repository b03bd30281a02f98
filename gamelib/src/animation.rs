use serde::{Deserialize, Serialize};

/// How a sequence advances once it runs past its last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimMode {
    /// Wraps back to the first frame.
    #[default]
    Cycle,
    /// Plays once and holds.
    Single,
    /// Ping-pongs between the first and last frame.
    Bounce,
}

/// Playback cursor for a frame sequence. Frames are sprite ids starting at `base`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    pub base: i32,
    pub count: i32,
    /// Frames per second.
    pub speed: f32,
    pub mode: AnimMode,
    t0: f32,
    t1: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            base: 0,
            count: 1,
            speed: 8.0,
            mode: AnimMode::Cycle,
            t0: 0.0,
            t1: 0.0,
        }
    }
}

impl AnimationState {
    pub fn new(base: i32, count: i32, speed: f32, mode: AnimMode) -> Self {
        Self {
            base,
            count: count.max(0),
            speed,
            mode,
            ..Self::default()
        }
    }

    /// Replaces the sequence description; the clock is left alone.
    pub fn reset(&mut self, base: i32, count: i32, speed: f32, mode: AnimMode) {
        self.base = base;
        self.count = count.max(0);
        self.speed = speed;
        self.mode = mode;
    }

    /// Restarts the clock at time `t`.
    pub fn start(&mut self, t: f32) {
        self.t0 = t;
        self.t1 = t;
    }

    /// Advances the clock and returns the frame to show.
    pub fn update(&mut self, dt: f32) -> i32 {
        self.t1 += dt;
        self.current_frame()
    }

    pub fn start_time(&self) -> f32 {
        self.t0
    }

    pub fn current_time(&self) -> f32 {
        self.t1
    }

    /// `floor(speed * (t1 - t0))`, never negative.
    pub fn frames_since_start(&self) -> i32 {
        (self.speed * (self.t1 - self.t0)).floor().max(0.0) as i32
    }

    pub fn current_frame(&self) -> i32 {
        match self.mode {
            AnimMode::Cycle => self.cycle_frame(),
            AnimMode::Single => self.single_frame(),
            AnimMode::Bounce => self.bounce_frame(),
        }
    }

    fn cycle_frame(&self) -> i32 {
        if self.count <= 0 {
            return self.base;
        }
        self.base + self.frames_since_start() % self.count
    }

    fn single_frame(&self) -> i32 {
        self.base + self.count.min(self.frames_since_start())
    }

    fn bounce_frame(&self) -> i32 {
        let c = self.count - 1;
        if c <= 0 {
            return self.base;
        }
        let phase = self.frames_since_start() % c.saturating_mul(2);
        self.base + c - (phase - c).abs()
    }

    /// True once more than `count` frames have elapsed.
    ///
    /// This ignores the mode, so cycling and bouncing sequences report ended
    /// after their first pass even though they keep playing. Use
    /// [`finished`](Self::finished) to ask whether playback actually stopped.
    pub fn ended(&self) -> bool {
        self.frames_since_start() > self.count
    }

    /// True only for a `Single` sequence that has run past its last frame.
    pub fn finished(&self) -> bool {
        self.mode == AnimMode::Single && self.ended()
    }
}
