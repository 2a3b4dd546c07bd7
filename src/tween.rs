//! Scalar tweens for the hover-state uniform.

/// Ease-out cubic (`power3.out`).
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// A one-shot tween from the value current at start time toward `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self { from, to, duration, elapsed: 0.0 }
    }

    /// Advance by `dt` seconds and return the eased value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> f32 {
        let t = if self.duration > 0.0 { self.elapsed / self.duration } else { 1.0 };
        self.from + (self.to - self.from) * ease_out_cubic(t)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_out_cubic() {
        assert!((ease_out_cubic(0.0) - 0.0).abs() < 0.001);
        assert!((ease_out_cubic(1.0) - 1.0).abs() < 0.001);
        // front-loaded: more than half way at the midpoint
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 0.001);
    }

    #[test]
    fn reaches_target_after_duration() {
        let mut tween = Tween::new(0.0, 1.0, 1.0);
        for _ in 0..61 {
            tween.advance(1.0 / 60.0);
        }
        assert!(tween.is_finished());
        assert!((tween.value() - 1.0).abs() < 1e-6);
        // overshooting the duration clamps
        assert_eq!(tween.advance(5.0), 1.0);
    }

    #[test]
    fn reverses_from_current_value() {
        let mut enter = Tween::new(0.0, 1.0, 1.0);
        let mid = enter.advance(0.5);
        let mut exit = Tween::new(mid, 0.0, 1.0);
        assert_eq!(exit.value(), mid);
        assert!(exit.advance(0.25) < mid);
        assert_eq!(exit.advance(1.0), 0.0);
    }

    #[test]
    fn zero_duration_jumps() {
        let tween = Tween::new(0.3, 1.0, 0.0);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 1.0);
    }
}
