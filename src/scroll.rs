//! Scroll state and the smoothed scroll source.

/// One reading from a scroll source.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSample {
    pub offset: f32,
    pub velocity: f32,
}

/// Anything that can report a scroll offset once per tick.
pub trait ScrollSource {
    fn poll(&mut self) -> ScrollSample;
}

/// Offsets the scheduler compares between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollState {
    pub current: f32,
    pub previous: f32,
    pub velocity: f32,
}

impl ScrollState {
    /// Shift `current` into `previous`, then take the new sample.
    pub fn advance(&mut self, sample: ScrollSample) {
        self.previous = self.current;
        self.current = sample.offset;
        self.velocity = sample.velocity;
    }

    /// Whether the whole-pixel offset moved since the last tick.
    pub fn moved(&self) -> bool {
        round_half_up(self.current) != round_half_up(self.previous)
    }
}

/// Round to the nearest integer with halves going toward +inf, so -0.5 and
/// 0.4 land on the same pixel.
#[inline]
pub fn round_half_up(x: f32) -> f32 {
    (x + 0.5).floor()
}

/// Lerped virtual scroll: the rendered offset chases the page offset.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothScroll {
    target: f32,
    rendered: f32,
    ease: f32,
    speed: f32,
    speed_target: f32,
    speed_clamp: f32,
    speed_smoothing: f32,
}

impl SmoothScroll {
    pub fn new(ease: f32, speed_clamp: f32, speed_smoothing: f32) -> Self {
        Self {
            target: 0.0,
            rendered: 0.0,
            ease,
            speed: 0.0,
            speed_target: 0.0,
            speed_clamp,
            speed_smoothing,
        }
    }

    /// Start at `offset` without animating toward it.
    pub fn jump_to(&mut self, offset: f32) {
        self.target = offset;
        self.rendered = offset;
    }

    pub fn rendered(&self) -> f32 {
        self.rendered
    }

    /// Step once with the latest page offset. Speed is measured against the
    /// previous target before it is replaced.
    pub fn step(&mut self, page_offset: f32) -> ScrollSample {
        self.speed = (self.target - self.rendered).abs().min(self.speed_clamp) / self.speed_clamp;
        self.speed_target += (self.speed - self.speed_target) * self.speed_smoothing;
        self.target = page_offset;
        self.rendered += (self.target - self.rendered) * self.ease;
        ScrollSample { offset: self.rendered, velocity: self.speed_target }
    }
}
