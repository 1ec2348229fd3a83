//! Commands sent from the game loop to the audio thread via ring buffer.

use super::synth::VoiceSpec;

/// Commands sent from the game loop to the audio thread via ring buffer.
#[derive(Debug, Clone, Copy)]
pub enum AudioCommand {
    /// Start a one-shot voice.
    NoteOn(VoiceSpec),

    /// Set master volume (0.0 to 1.0).
    SetVolume(f32),

    /// Cut every sounding voice.
    Silence,
}
