//! Master limiter — peak-following gain reduction with a hard ceiling.
//!
//! A loud peak pulls the gain down instantly; the gain then recovers toward
//! unity a little every sample. Output never exceeds the ceiling.

/// Per-sample recovery toward unity gain.
const DEFAULT_RECOVERY: f32 = 0.0005;

#[derive(Debug, Clone)]
pub struct Limiter {
    ceiling: f32,
    recovery: f32,
    gain: f32,
}

impl Limiter {
    /// `ceiling` should be in `(0.0, 1.0]`.
    pub fn new(ceiling: f32) -> Self {
        debug_assert!(ceiling > 0.0 && ceiling <= 1.0);
        Self {
            ceiling,
            recovery: DEFAULT_RECOVERY,
            gain: 1.0,
        }
    }

    /// Limit one sample.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let level = (sample * self.gain).abs();
        if level > self.ceiling {
            self.gain = self.ceiling / sample.abs();
        }
        let out = (sample * self.gain).clamp(-self.ceiling, self.ceiling);
        self.gain += (1.0 - self.gain) * self.recovery;
        out
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// Current gain, 1.0 when idle.
    pub fn gain(&self) -> f32 {
        self.gain
    }
}

impl Default for Limiter {
    fn default() -> Self {
        Self::new(0.95)
    }
}
