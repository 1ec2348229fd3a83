//! Audio callback — runs on the cpal audio thread.
//!
//! Drains commands from the ring buffer, mixes every live voice into the
//! output, applies volume and the master limiter.

use ringbuf::traits::Consumer;
use ringbuf::HeapCons;

use super::command::AudioCommand;
use super::limiter::Limiter;
use super::synth::Voice;

/// Voices sounding at once. Starting one more steals the oldest.
pub const MAX_VOICES: usize = 32;

/// State that lives on the audio thread. Accessed only from the cpal callback.
pub struct AudioCallback {
    consumer: HeapCons<AudioCommand>,
    voices: Vec<Voice>,
    volume: f32,
    limiter: Limiter,
    channels: u16,
    sample_rate: u32,
}

impl AudioCallback {
    pub fn new(consumer: HeapCons<AudioCommand>, channels: u16, sample_rate: u32) -> Self {
        Self {
            consumer,
            voices: Vec::with_capacity(MAX_VOICES),
            volume: 1.0,
            limiter: Limiter::default(),
            channels: channels.max(1),
            sample_rate,
        }
    }

    /// Called by cpal for each output block. `output` is interleaved.
    pub fn process(&mut self, output: &mut [f32]) {
        while let Some(cmd) = self.consumer.try_pop() {
            match cmd {
                AudioCommand::NoteOn(spec) => {
                    if self.voices.len() >= MAX_VOICES {
                        self.voices.remove(0);
                    }
                    self.voices.push(Voice::new(spec, self.sample_rate));
                }
                AudioCommand::SetVolume(v) => {
                    self.volume = v.clamp(0.0, 1.0);
                }
                AudioCommand::Silence => {
                    self.voices.clear();
                }
            }
        }

        for frame in output.chunks_mut(self.channels as usize) {
            let mixed: f32 = self.voices.iter_mut().map(Voice::next_sample).sum();
            let sample = self.limiter.process(mixed * self.volume);
            frame.fill(sample);
        }

        self.voices.retain(|v| !v.is_finished());
    }

    /// Number of voices still sounding.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}
