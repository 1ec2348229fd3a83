//! One-shot note synthesis — waveforms, envelopes, per-instrument patches, voices.
//!
//! Each chart instrument maps to a small [`Patch`]: a main waveform, an optional
//! overtone and an ADSR shape. A [`Voice`] plays one patch at one pitch and
//! knows when its release tail has finished.

use std::f64::consts::TAU;

/// Shortest audible note. Zero-length chart notes are stretched to this.
pub const MIN_NOTE_SECS: f64 = 0.05;

/// Basic waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    /// One sample at `phase` in `[0, 1)`. Output is in `[-1, 1]`.
    pub fn sample(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

/// MIDI note number to Hz (A4 = 69 = 440 Hz).
pub fn midi_to_freq(pitch: u8) -> f64 {
    440.0 * 2.0f64.powf((f64::from(pitch) - 69.0) / 12.0)
}

/// Attack-decay-sustain-release shape. Times in seconds, sustain is a level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Envelope {
    /// Gain at `t` seconds into a note held for `held` seconds.
    pub fn gain(&self, t: f64, held: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        if t >= held {
            let level = self.held_level(held);
            if self.release <= 0.0 {
                return 0.0;
            }
            return (level * (1.0 - (t - held) / self.release)).max(0.0);
        }
        self.held_level(t)
    }

    fn held_level(&self, t: f64) -> f64 {
        if t < self.attack {
            t / self.attack
        } else if t < self.attack + self.decay {
            1.0 - (t - self.attack) / self.decay * (1.0 - self.sustain)
        } else {
            self.sustain
        }
    }

    /// Length of the sound including the release tail.
    pub fn total(&self, held: f64) -> f64 {
        held + self.release
    }
}

/// Sound design for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub waveform: Waveform,
    /// Overtone waveform, frequency ratio and level.
    pub overtone: Option<(Waveform, f64, f64)>,
    pub envelope: Envelope,
    pub gain: f64,
}

const PIANO: Patch = Patch {
    waveform: Waveform::Triangle,
    overtone: Some((Waveform::Sine, 2.0, 0.3)),
    envelope: Envelope { attack: 0.005, decay: 0.4, sustain: 0.25, release: 0.5 },
    gain: 0.35,
};

/// Patch for a chart instrument name. Unknown names sound like a piano.
pub fn patch_for(instrument: &str) -> Patch {
    match instrument {
        "violin" => Patch {
            waveform: Waveform::Saw,
            overtone: Some((Waveform::Sine, 1.003, 0.4)),
            envelope: Envelope { attack: 0.08, decay: 0.1, sustain: 0.8, release: 0.5 },
            gain: 0.18,
        },
        "bass-electric" => Patch {
            waveform: Waveform::Square,
            overtone: Some((Waveform::Sine, 0.5, 0.6)),
            envelope: Envelope { attack: 0.005, decay: 0.2, sustain: 0.5, release: 0.3 },
            gain: 0.2,
        },
        "trumpet" => Patch {
            waveform: Waveform::Saw,
            overtone: Some((Waveform::Square, 2.0, 0.15)),
            envelope: Envelope { attack: 0.03, decay: 0.1, sustain: 0.7, release: 0.4 },
            gain: 0.18,
        },
        "saxophone" => Patch {
            waveform: Waveform::Square,
            overtone: Some((Waveform::Saw, 2.0, 0.2)),
            envelope: Envelope { attack: 0.04, decay: 0.15, sustain: 0.6, release: 0.4 },
            gain: 0.15,
        },
        "trombone" => Patch {
            waveform: Waveform::Saw,
            overtone: None,
            envelope: Envelope { attack: 0.06, decay: 0.2, sustain: 0.7, release: 0.5 },
            gain: 0.2,
        },
        "flute" => Patch {
            waveform: Waveform::Sine,
            overtone: Some((Waveform::Triangle, 2.0, 0.1)),
            envelope: Envelope { attack: 0.05, decay: 0.1, sustain: 0.8, release: 0.5 },
            gain: 0.35,
        },
        _ => PIANO,
    }
}

/// Everything needed to start a voice. Plain data so it can cross to the
/// audio thread without allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSpec {
    pub patch: Patch,
    pub freq: f64,
    /// Seconds the note is held before release.
    pub held: f64,
    pub velocity: f64,
}

impl VoiceSpec {
    pub fn new(instrument: &str, pitch: u8, duration: f64, velocity: f32) -> Self {
        Self {
            patch: patch_for(instrument),
            freq: midi_to_freq(pitch),
            held: duration.max(MIN_NOTE_SECS),
            velocity: f64::from(velocity.clamp(0.0, 1.0)),
        }
    }
}

/// A sounding note.
#[derive(Debug, Clone)]
pub struct Voice {
    spec: VoiceSpec,
    phase: f64,
    overtone_phase: f64,
    elapsed: u64,
    sample_rate: f64,
}

impl Voice {
    pub fn new(spec: VoiceSpec, sample_rate: u32) -> Self {
        Self {
            spec,
            phase: 0.0,
            overtone_phase: 0.0,
            elapsed: 0,
            sample_rate: f64::from(sample_rate.max(1)),
        }
    }

    /// Produce the next mono sample and advance.
    pub fn next_sample(&mut self) -> f32 {
        let spec = &self.spec;
        let t = self.elapsed as f64 / self.sample_rate;
        let env = spec.patch.envelope.gain(t, spec.held);

        let mut s = spec.patch.waveform.sample(self.phase);
        if let Some((wave, ratio, level)) = spec.patch.overtone {
            s += wave.sample(self.overtone_phase) * level;
            self.overtone_phase = (self.overtone_phase + spec.freq * ratio / self.sample_rate).fract();
        }
        self.phase = (self.phase + spec.freq / self.sample_rate).fract();
        self.elapsed += 1;

        (s * env * spec.velocity * spec.patch.gain) as f32
    }

    /// Whether the release tail is over.
    pub fn is_finished(&self) -> bool {
        self.elapsed as f64 / self.sample_rate >= self.spec.patch.envelope.total(self.spec.held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTRUMENTS: &[&str] = &[
        "piano", "violin", "bass-electric", "trumpet", "saxophone", "trombone", "flute",
    ];

    #[test]
    fn waveforms_hit_their_landmarks() {
        assert!(Waveform::Sine.sample(0.0).abs() < 1e-10);
        assert!((Waveform::Sine.sample(0.25) - 1.0).abs() < 1e-10);
        assert!((Waveform::Saw.sample(0.0) + 1.0).abs() < 1e-10);
        assert!((Waveform::Square.sample(0.75) + 1.0).abs() < 1e-10);
        assert!((Waveform::Triangle.sample(0.5) - 1.0).abs() < 1e-10);
        assert!((Waveform::Triangle.sample(0.0) + 1.0).abs() < 1e-10);
    }

    #[test]
    fn waveforms_bounded() {
        for wf in [Waveform::Sine, Waveform::Saw, Waveform::Square, Waveform::Triangle] {
            for i in 0..1000 {
                let v = wf.sample(i as f64 / 1000.0);
                assert!((-1.0..=1.0).contains(&v), "{wf:?}: {v}");
            }
        }
    }

    #[test]
    fn tuning() {
        assert!((midi_to_freq(69) - 440.0).abs() < 1e-9);
        assert!((midi_to_freq(60) - 261.63).abs() < 0.01);
        assert!((midi_to_freq(72) / midi_to_freq(60) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn envelope_shape() {
        let env = Envelope { attack: 0.1, decay: 0.1, sustain: 0.5, release: 0.2 };
        assert_eq!(env.gain(-1.0, 1.0), 0.0);
        assert!((env.gain(0.05, 1.0) - 0.5).abs() < 1e-10);
        assert!((env.gain(0.1, 1.0) - 1.0).abs() < 1e-10);
        assert!((env.gain(0.5, 1.0) - 0.5).abs() < 1e-10);
        assert!((env.gain(1.1, 1.0) - 0.25).abs() < 1e-10);
        assert_eq!(env.gain(1.3, 1.0), 0.0);
    }

    #[test]
    fn release_from_a_short_note_starts_where_it_was() {
        let env = Envelope { attack: 0.1, decay: 0.1, sustain: 0.5, release: 0.2 };
        // released halfway up the attack
        assert!((env.gain(0.05, 0.05) - 0.5).abs() < 1e-10);
        assert!(env.gain(0.1, 0.05) < 0.5);
    }

    #[test]
    fn unknown_instrument_is_piano() {
        assert_eq!(patch_for("kazoo"), patch_for("piano"));
        assert_ne!(patch_for("violin"), patch_for("piano"));
    }

    #[test]
    fn voice_ends_after_release() {
        let spec = VoiceSpec::new("piano", 60, 0.1, 1.0);
        let mut voice = Voice::new(spec, 1000);
        let mut n = 0;
        while !voice.is_finished() {
            voice.next_sample();
            n += 1;
            assert!(n < 10_000);
        }
        // 0.1 s held + 0.5 s release at 1 kHz
        assert!((599..=601).contains(&n), "{n}");
    }

    #[test]
    fn zero_length_notes_are_audible() {
        let spec = VoiceSpec::new("piano", 60, 0.0, 1.0);
        assert_eq!(spec.held, MIN_NOTE_SECS);
    }

    #[test]
    fn every_patch_stays_in_range() {
        for name in INSTRUMENTS {
            let mut voice = Voice::new(VoiceSpec::new(name, 40, 0.2, 1.0), 8000);
            while !voice.is_finished() {
                let s = voice.next_sample();
                assert!(s.abs() <= 1.0, "{name}: {s}");
            }
        }
    }

    #[test]
    fn silent_at_zero_velocity() {
        let mut voice = Voice::new(VoiceSpec::new("violin", 60, 0.2, 0.0), 8000);
        for _ in 0..1000 {
            assert_eq!(voice.next_sample(), 0.0);
        }
    }
}
