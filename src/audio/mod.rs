//! Audio engine — cpal output stream, lock-free command queue, polyphonic synth, master limiter.
//!
//! The game loop talks to audio through the [`NotePlayer`] trait. The real
//! implementation, [`AudioEngine`], owns the cpal output stream and pushes
//! [`AudioCommand`]s into a lock-free ring buffer that the audio thread drains
//! in its callback. Pushing never blocks, so a slow device cannot stall the game.

pub mod callback;
pub mod command;
pub mod limiter;
pub mod synth;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{info, warn};
use ringbuf::{
    traits::{Producer, Split},
    HeapRb,
};

pub use command::AudioCommand;
pub use limiter::Limiter;
pub use synth::{patch_for, Patch, VoiceSpec};

use callback::AudioCallback;

use crate::engine::NoteSound;

/// Ring buffer capacity (number of commands).
const RING_BUFFER_CAPACITY: usize = 256;

/// Audio engine errors.
#[derive(Debug)]
pub enum AudioError {
    /// No audio output device found.
    NoOutputDevice,
    /// Failed to query device configuration.
    DeviceConfig(String),
    /// Failed to build the audio stream.
    StreamBuild(String),
    /// Failed to start the audio stream.
    StreamPlay(String),
    /// Ring buffer is full, the audio thread is not draining fast enough.
    BufferFull,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::NoOutputDevice => write!(f, "no audio output device found"),
            AudioError::DeviceConfig(e) => write!(f, "device config error: {e}"),
            AudioError::StreamBuild(e) => write!(f, "stream build error: {e}"),
            AudioError::StreamPlay(e) => write!(f, "stream play error: {e}"),
            AudioError::BufferFull => write!(f, "audio command ring buffer is full"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Something that can sound a note without blocking the caller.
pub trait NotePlayer {
    fn play_note(&mut self, sound: &NoteSound) -> Result<(), AudioError>;

    /// Cut every sounding note.
    fn silence(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Plays nothing. Used with `--no-audio` or when no device is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl NotePlayer for SilentPlayer {
    fn play_note(&mut self, _sound: &NoteSound) -> Result<(), AudioError> {
        Ok(())
    }
}

/// The audio engine. Owns the cpal stream and ring buffer producer.
pub struct AudioEngine {
    _stream: cpal::Stream,
    producer: ringbuf::HeapProd<AudioCommand>,
    sample_rate: u32,
    channels: u16,
}

impl AudioEngine {
    /// Create and start the audio engine on the default output device.
    pub fn new(volume: f32) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceConfig(e.to_string()))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let rb = HeapRb::<AudioCommand>::new(RING_BUFFER_CAPACITY);
        let (producer, consumer) = rb.split();

        let mut audio_callback = AudioCallback::new(consumer, channels, sample_rate);

        let stream_config = cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback.process(data);
                },
                |err: cpal::StreamError| warn!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        info!("audio: {sample_rate} Hz, {channels} channels");

        let mut engine = Self {
            _stream: stream,
            producer,
            sample_rate,
            channels,
        };
        engine.set_volume(volume)?;
        Ok(engine)
    }

    fn send(&mut self, cmd: AudioCommand) -> Result<(), AudioError> {
        self.producer
            .try_push(cmd)
            .map_err(|_| AudioError::BufferFull)
    }

    /// Set master volume (clamped to 0.0..=1.0 on the audio thread).
    pub fn set_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.send(AudioCommand::SetVolume(volume))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl NotePlayer for AudioEngine {
    fn play_note(&mut self, sound: &NoteSound) -> Result<(), AudioError> {
        let spec = VoiceSpec::new(&sound.instrument, sound.pitch, sound.duration, sound.velocity);
        self.send(AudioCommand::NoteOn(spec))
    }

    fn silence(&mut self) -> Result<(), AudioError> {
        self.send(AudioCommand::Silence)
    }
}

/// Open the audio device, falling back to silence when it is unavailable.
pub fn open_player(enabled: bool, volume: f32) -> Box<dyn NotePlayer> {
    if !enabled {
        info!("audio disabled");
        return Box::new(SilentPlayer);
    }
    match AudioEngine::new(volume) {
        Ok(engine) => Box::new(engine),
        Err(e) => {
            warn!("audio unavailable, continuing silently: {e}");
            Box::new(SilentPlayer)
        }
    }
}
