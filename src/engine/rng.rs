//! Seedable linear congruential generator and the miss-feedback sound it picks.
//!
//! `next = (1103515245 * seed + 12345) mod 2^31`, `value = next / 2^31`.
//! Arithmetic is exact in `u64`, so a seed always yields the same sequence.

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
const MODULUS: u64 = 1 << 31;

/// Instruments a miss can sound on, indexed by the first draw.
pub const MISS_INSTRUMENTS: &[&str] = &[
    "bass-electric",
    "violin",
    "piano",
    "trumpet",
    "saxophone",
    "trombone",
    "flute",
];

/// Lowest miss pitch (C3).
pub const MISS_PITCH_BASE: u8 = 48;
/// Miss pitches span two octaves above the base.
pub const MISS_PITCH_SPAN: u8 = 24;
/// Longest miss sound in seconds.
pub const MISS_MAX_DURATION: f64 = 0.5;

/// One LCG step: returns a value in `[0, 1)` and the next seed.
pub fn pseudo_random(seed: u32) -> (f64, u32) {
    let next = (MULTIPLIER * u64::from(seed) + INCREMENT) % MODULUS;
    (next as f64 / MODULUS as f64, next as u32)
}

/// A randomly chosen off-key note played when a press strikes nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct MissSound {
    pub instrument: &'static str,
    /// MIDI pitch in `48..72`.
    pub pitch: u8,
    /// Seconds, in `[0, 0.5)`.
    pub duration: f64,
}

impl MissSound {
    /// Derive the sound from three successive draws starting at `seed`.
    pub fn from_seed(seed: u32) -> Self {
        let (v_instrument, s1) = pseudo_random(seed);
        let (v_pitch, s2) = pseudo_random(s1);
        let (v_duration, _) = pseudo_random(s2);

        let index = ((v_instrument * MISS_INSTRUMENTS.len() as f64) as usize)
            .min(MISS_INSTRUMENTS.len() - 1);
        Self {
            instrument: MISS_INSTRUMENTS[index],
            pitch: MISS_PITCH_BASE + (v_pitch * f64::from(MISS_PITCH_SPAN)) as u8,
            duration: v_duration * MISS_MAX_DURATION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn known_first_step_from_42() {
        let (value, next) = pseudo_random(42);
        // 1103515245 * 42 + 12345 = 46347652635; mod 2^31 = 1250496027
        assert_eq!(next, 1_250_496_027);
        assert_approx_eq!(value, 1_250_496_027.0 / 2_147_483_648.0);
    }

    #[test]
    fn pure_and_reproducible() {
        assert_eq!(pseudo_random(7), pseudo_random(7));
        let mut a = 42;
        let mut b = 42;
        for _ in 0..100 {
            let (va, na) = pseudo_random(a);
            let (vb, nb) = pseudo_random(b);
            assert_eq!(va, vb);
            a = na;
            b = nb;
        }
    }

    #[test]
    fn values_in_unit_interval_and_seeds_below_modulus() {
        let mut seed = 42;
        for _ in 0..10_000 {
            let (value, next) = pseudo_random(seed);
            assert!((0.0..1.0).contains(&value));
            assert!(u64::from(next) < MODULUS);
            seed = next;
        }
    }

    #[test]
    fn extreme_seeds_do_not_overflow() {
        let (value, next) = pseudo_random(u32::MAX);
        assert!((0.0..1.0).contains(&value));
        assert!(u64::from(next) < MODULUS);
    }

    #[test]
    fn miss_sound_in_range() {
        let mut seed = 42;
        for _ in 0..1_000 {
            let sound = MissSound::from_seed(seed);
            assert!(MISS_INSTRUMENTS.contains(&sound.instrument));
            assert!((48..72).contains(&sound.pitch));
            assert!((0.0..0.5).contains(&sound.duration));
            seed = pseudo_random(seed).1;
        }
    }

    #[test]
    fn miss_sound_is_deterministic() {
        assert_eq!(MissSound::from_seed(1_250_496_027), MissSound::from_seed(1_250_496_027));
    }
}
