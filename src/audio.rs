//! Procedural explosion sound.
//!
//! Every trigger also fires a short layered "boom". The sound is rendered to a
//! mono sample buffer on the spot (well under a millisecond of work) and
//! handed to a [`SoundSink`], which plays it without blocking. Nothing the
//! audio path does can fail a trigger: errors are logged and dropped.
//!
//! # Layers
//!
//! | Layer | Wave | Pitch | Peak gain | Length |
//! |-------|------|-------|-----------|--------|
//! | bass | sine | 150 → 30 Hz | 0.40 | 0.40 s |
//! | body | triangle | 60-180 → 40 Hz | 0.30 | 0.25 s |
//! | crack | square | 400-1000 → 150 Hz | 0.25 | 0.20 s |
//! | crackle | high-passed noise | - | 0.20 | 0.30 s |
//!
//! Pitch and gain both follow exponential ramps; gains decay to 0.01.

use crate::error::AudioError;
use rand::Rng;
use std::f32::consts::TAU;

/// Gain every layer decays to by the end of its envelope.
const GAIN_FLOOR: f32 = 0.01;

/// Oscillator shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

impl Waveform {
    /// Sample at `phase` in cycles (`0.0..1.0`).
    fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// A pitched layer with exponential pitch and gain ramps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    pub gain: f32,
    pub seconds: f32,
}

/// A finished mono clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Clip {
    pub fn duration(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()))
    }
}

/// Value of an exponential ramp from `from` to `to` at fraction `t` in `[0, 1]`.
fn exp_ramp(from: f32, to: f32, t: f32) -> f32 {
    from * (to / from).powf(t.clamp(0.0, 1.0))
}

/// Explosion synthesizer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplosionSynth {
    pub sample_rate: u32,
    /// Master gain applied after mixing.
    pub volume: f32,
    /// Noise layer length in seconds.
    pub noise_seconds: f32,
    pub noise_gain: f32,
    /// High-pass corner for the noise layer, Hz.
    pub noise_cutoff_hz: f32,
}

impl Default for ExplosionSynth {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            volume: 1.0,
            noise_seconds: 0.3,
            noise_gain: 0.2,
            noise_cutoff_hz: 1_000.0,
        }
    }
}

impl ExplosionSynth {
    /// The three pitched layers for one explosion. Body and crack start at a
    /// random pitch so repeated clicks don't sound identical.
    pub fn tones<R: Rng + ?Sized>(&self, rng: &mut R) -> [Tone; 3] {
        [
            Tone {
                waveform: Waveform::Sine,
                start_hz: 150.0,
                end_hz: 30.0,
                gain: 0.4,
                seconds: 0.4,
            },
            Tone {
                waveform: Waveform::Triangle,
                start_hz: rng.gen_range(60.0..180.0),
                end_hz: 40.0,
                gain: 0.3,
                seconds: 0.25,
            },
            Tone {
                waveform: Waveform::Square,
                start_hz: rng.gen_range(400.0..1000.0),
                end_hz: 150.0,
                gain: 0.25,
                seconds: 0.2,
            },
        ]
    }

    /// Render one explosion.
    pub fn render<R: Rng + ?Sized>(&self, rng: &mut R) -> Clip {
        let rate = self.sample_rate.max(1) as f32;
        let tones = self.tones(rng);
        let seconds = tones
            .iter()
            .map(|t| t.seconds)
            .fold(self.noise_seconds, f32::max);
        let mut samples = vec![0.0_f32; (seconds * rate).ceil() as usize];

        for tone in &tones {
            mix_tone(&mut samples, tone, rate);
        }
        self.mix_noise(&mut samples, rate, rng);

        for s in &mut samples {
            *s = (*s * self.volume).clamp(-1.0, 1.0);
        }

        Clip {
            samples,
            sample_rate: self.sample_rate.max(1),
        }
    }

    fn mix_noise<R: Rng + ?Sized>(&self, out: &mut [f32], rate: f32, rng: &mut R) {
        let len = ((self.noise_seconds * rate) as usize).min(out.len());
        if len == 0 {
            return;
        }
        // One-pole high-pass
        let rc = 1.0 / (TAU * self.noise_cutoff_hz.max(1.0));
        let alpha = rc / (rc + 1.0 / rate);
        let (mut prev_in, mut prev_out) = (0.0_f32, 0.0_f32);

        for (i, sample) in out.iter_mut().take(len).enumerate() {
            let white: f32 = rng.gen_range(-1.0..1.0);
            let filtered = alpha * (prev_out + white - prev_in);
            prev_in = white;
            prev_out = filtered;
            *sample += filtered * exp_ramp(self.noise_gain, GAIN_FLOOR, i as f32 / len as f32);
        }
    }
}

fn mix_tone(out: &mut [f32], tone: &Tone, rate: f32) {
    let len = ((tone.seconds * rate) as usize).min(out.len());
    let mut phase = 0.0_f32;
    for (i, sample) in out.iter_mut().take(len).enumerate() {
        let t = i as f32 / len as f32;
        *sample += tone.waveform.sample(phase) * exp_ramp(tone.gain, GAIN_FLOOR, t);
        phase = (phase + exp_ramp(tone.start_hz, tone.end_hz, t) / rate).fract();
    }
}

/// Somewhere to send finished clips.
///
/// `play` must return promptly; playback continues in the background.
pub trait SoundSink {
    fn play(&mut self, clip: Clip) -> Result<(), AudioError>;
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink {
    played: usize,
}

impl NullSink {
    pub fn played(&self) -> usize {
        self.played
    }
}

impl SoundSink for NullSink {
    fn play(&mut self, _clip: Clip) -> Result<(), AudioError> {
        self.played += 1;
        Ok(())
    }
}

/// Plays clips on the default output device.
#[cfg(feature = "audio")]
pub struct RodioSink {
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
}

#[cfg(feature = "audio")]
impl RodioSink {
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) =
            rodio::OutputStream::try_default().map_err(|e| AudioError::Unavailable(e.to_string()))?;
        Ok(Self { _stream: stream, handle })
    }
}

#[cfg(feature = "audio")]
impl SoundSink for RodioSink {
    fn play(&mut self, clip: Clip) -> Result<(), AudioError> {
        let sink = rodio::Sink::try_new(&self.handle).map_err(|e| AudioError::Rejected(e.to_string()))?;
        sink.append(rodio::buffer::SamplesBuffer::new(1, clip.sample_rate, clip.samples));
        sink.detach();
        Ok(())
    }
}

type SinkFactory = Box<dyn FnMut() -> Result<Box<dyn SoundSink>, AudioError>>;

/// Owns the synthesizer and lazily opens the sink on the first explosion.
///
/// If the sink cannot be opened, audio is disabled for the rest of the
/// session. The visuals never notice.
pub struct AudioContext {
    synth: ExplosionSynth,
    state: SinkState,
}

enum SinkState {
    Pending(SinkFactory),
    Ready(Box<dyn SoundSink>),
    Disabled,
}

impl AudioContext {
    /// Open sinks with `factory` when the first explosion fires.
    pub fn lazy<F>(synth: ExplosionSynth, factory: F) -> Self
    where
        F: FnMut() -> Result<Box<dyn SoundSink>, AudioError> + 'static,
    {
        Self {
            synth,
            state: SinkState::Pending(Box::new(factory)),
        }
    }

    /// Use `sink` right away.
    pub fn with_sink(synth: ExplosionSynth, sink: Box<dyn SoundSink>) -> Self {
        Self {
            synth,
            state: SinkState::Ready(sink),
        }
    }

    /// No audio at all.
    pub fn disabled() -> Self {
        Self {
            synth: ExplosionSynth::default(),
            state: SinkState::Disabled,
        }
    }

    /// The default device sink when built with the `audio` feature, silence otherwise.
    pub fn default_device(synth: ExplosionSynth) -> Self {
        #[cfg(feature = "audio")]
        {
            Self::lazy(synth, || RodioSink::open().map(|s| Box::new(s) as Box<dyn SoundSink>))
        }
        #[cfg(not(feature = "audio"))]
        {
            Self::with_sink(synth, Box::new(NullSink::default()))
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.state, SinkState::Disabled)
    }

    /// Fire-and-forget. Returns whether a clip was handed to the sink.
    pub fn explode<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if let SinkState::Pending(factory) = &mut self.state {
            self.state = match factory() {
                Ok(sink) => {
                    log::info!("audio output opened");
                    SinkState::Ready(sink)
                }
                Err(e) => {
                    log::warn!("{e}; continuing without sound");
                    SinkState::Disabled
                }
            };
        }

        let SinkState::Ready(sink) = &mut self.state else {
            return false;
        };
        let clip = self.synth.render(rng);
        match sink.play(clip) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }
}
