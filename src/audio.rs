//! Sound cues and background music
//!
//! Lifecycle events map to cues here; on the web the cues are synthesized with
//! Web Audio oscillators, so no sound files ship with the game. The music loop
//! is rendered into a sample buffer once and looped.

use std::f32::consts::TAU;

use crate::settings::Settings;
use crate::sim::GameEvent;

/// A sound the driver should play
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCue {
    /// Wing beat, cut short after the given number of seconds
    Flap { duration: f32 },
    /// Obstacle passed
    Score,
    /// Run ended
    GameOver,
    /// Best score beaten
    NewBest,
    /// Game paused
    Pause,
    /// Game resumed
    Resume,
    /// New run
    Start,
}

/// Cue for a lifecycle event, or `None` when the event is silent
pub fn cue_for(event: &GameEvent, settings: &Settings) -> Option<AudioCue> {
    if settings.effective_sfx_volume() <= 0.0 {
        return None;
    }
    match event {
        GameEvent::RunStarted => Some(AudioCue::Start),
        GameEvent::Flapped => Some(AudioCue::Flap {
            duration: settings.flap_cue_secs(),
        }),
        GameEvent::Scored { .. } => Some(AudioCue::Score),
        GameEvent::Collided { .. } => Some(AudioCue::GameOver),
        GameEvent::PauseChanged { paused: true } => Some(AudioCue::Pause),
        GameEvent::PauseChanged { paused: false } => Some(AudioCue::Resume),
        GameEvent::NewBest { .. } => Some(AudioCue::NewBest),
    }
}

/// What the music loop should do in response to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicCommand {
    /// Play from the beginning
    Start,
    /// Hold the current position
    Pause,
    /// Continue from the held position
    Resume,
    /// Silence and rewind
    Stop,
}

/// Music command for a lifecycle event
///
/// Volume is not consulted: a muted loop keeps its position and the voice's
/// gain carries the volume.
pub fn music_for(event: &GameEvent) -> Option<MusicCommand> {
    match event {
        GameEvent::RunStarted => Some(MusicCommand::Start),
        GameEvent::PauseChanged { paused: true } => Some(MusicCommand::Pause),
        GameEvent::PauseChanged { paused: false } => Some(MusicCommand::Resume),
        GameEvent::Collided { .. } => Some(MusicCommand::Stop),
        GameEvent::Flapped | GameEvent::Scored { .. } | GameEvent::NewBest { .. } => None,
    }
}

/// Playback state of the music loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transport {
    Stopped,
    /// Playing; `origin` is the audio time the loop's position 0 lines up with
    Playing { origin: f64 },
    Paused { offset: f64 },
}

/// Tracks where the music loop is so a pause resumes in place
#[derive(Debug, Clone, PartialEq)]
pub struct MusicTransport {
    state: Transport,
    loop_secs: f64,
}

impl MusicTransport {
    pub fn new(loop_secs: f64) -> Self {
        Self {
            state: Transport::Stopped,
            loop_secs: if loop_secs.is_finite() { loop_secs.max(1e-3) } else { 1e-3 },
        }
    }

    pub fn state(&self) -> Transport {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, Transport::Playing { .. })
    }

    /// Position within the loop at audio time `now`
    pub fn position(&self, now: f64) -> f64 {
        match self.state {
            Transport::Stopped => 0.0,
            Transport::Playing { origin } => (now - origin).rem_euclid(self.loop_secs),
            Transport::Paused { offset } => offset,
        }
    }

    /// Apply a command at audio time `now`
    ///
    /// Returns the loop offset a fresh source should start from, or `None`
    /// when nothing new should start.
    pub fn apply(&mut self, command: MusicCommand, now: f64) -> Option<f64> {
        match (command, self.state) {
            (MusicCommand::Start, _) => {
                self.state = Transport::Playing { origin: now };
                Some(0.0)
            }
            (MusicCommand::Pause, Transport::Playing { .. }) => {
                self.state = Transport::Paused {
                    offset: self.position(now),
                };
                None
            }
            (MusicCommand::Resume, Transport::Paused { offset }) => {
                self.state = Transport::Playing { origin: now - offset };
                Some(offset)
            }
            (MusicCommand::Stop, _) => {
                self.state = Transport::Stopped;
                None
            }
            _ => None,
        }
    }
}

/// Length of one melody note
const MUSIC_STEP_SECS: f32 = 0.2;
/// Lead line, one note per step
const MUSIC_MELODY: [f32; 16] = [
    523.25, 659.25, 783.99, 659.25, // C E G E
    587.33, 698.46, 880.0, 698.46, // D F A F
    659.25, 783.99, 987.77, 783.99, // E G B G
    587.33, 783.99, 987.77, 1174.66, // D G B D
];
/// Bass, one note per four steps
const MUSIC_BASS: [f32; 4] = [130.81, 146.83, 164.81, 98.0];
/// Attack and release ramp on every note
const MUSIC_RAMP_SECS: f32 = 0.005;

/// Render one pass of the music loop as mono samples
///
/// Every note starts and ends at silence so the loop joins without a click.
pub fn music_loop_samples(sample_rate: f32) -> Vec<f32> {
    let rate = if sample_rate.is_finite() { sample_rate.max(1.0) } else { 1.0 };
    let step_len = ((MUSIC_STEP_SECS * rate).round() as usize).max(1);
    let ramp_len = (MUSIC_RAMP_SECS * rate).max(1.0);
    let mut samples = Vec::with_capacity(step_len * MUSIC_MELODY.len());

    for (step, &lead_freq) in MUSIC_MELODY.iter().enumerate() {
        let bass_freq = MUSIC_BASS[step / 4];
        for i in 0..step_len {
            let t = i as f32 / rate;
            let attack = (i as f32 / ramp_len).min(1.0);
            let release = ((step_len - i - 1) as f32 / ramp_len).min(1.0);
            let envelope = attack * release;

            let lead = triangle(lead_freq * t) * (-t * 8.0).exp() * 0.22;
            let bass = (TAU * bass_freq * t).sin() * 0.14;
            samples.push((lead + bass) * envelope);
        }
    }
    samples
}

/// Triangle wave for a phase measured in cycles
fn triangle(cycles: f32) -> f32 {
    4.0 * (cycles.fract() - 0.5).abs() - 1.0
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{
        AudioBuffer, AudioBufferSourceNode, AudioContext, GainNode, OscillatorNode, OscillatorType,
    };

    use super::{AudioCue, MusicCommand, MusicTransport, music_loop_samples};
    use crate::settings::Settings;

    /// Music sits under the effects
    const MUSIC_GAIN: f32 = 0.35;

    /// Looping buffer source behind its own gain node
    struct MusicVoice {
        gain: GainNode,
        buffer: AudioBuffer,
        source: Option<AudioBufferSourceNode>,
        transport: MusicTransport,
    }

    impl MusicVoice {
        fn new(ctx: &AudioContext, volume: f32) -> Option<Self> {
            let rate = ctx.sample_rate();
            let mut samples = music_loop_samples(rate);
            let buffer = ctx.create_buffer(1, samples.len() as u32, rate).ok()?;
            buffer.copy_to_channel(&mut samples, 0).ok()?;

            let gain = ctx.create_gain().ok()?;
            gain.gain().set_value(volume * MUSIC_GAIN);
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            let transport = MusicTransport::new(buffer.duration());
            Some(Self {
                gain,
                buffer,
                source: None,
                transport,
            })
        }

        fn set_volume(&self, volume: f32) {
            self.gain.gain().set_value(volume * MUSIC_GAIN);
        }

        fn apply(&mut self, ctx: &AudioContext, command: MusicCommand) {
            let restart = self.transport.apply(command, ctx.current_time());
            if restart.is_some() || !self.transport.is_playing() {
                self.stop_source();
            }
            if let Some(offset) = restart {
                self.source = self.start_source(ctx, offset);
                if self.source.is_none() {
                    log::warn!("Could not start music");
                }
            }
        }

        fn start_source(&self, ctx: &AudioContext, offset: f64) -> Option<AudioBufferSourceNode> {
            let source = ctx.create_buffer_source().ok()?;
            source.set_buffer(Some(&self.buffer));
            source.set_loop(true);
            source.connect_with_audio_node(&self.gain).ok()?;
            source.start_with_when_and_grain_offset(0.0, offset).ok()?;
            Some(source)
        }

        fn stop_source(&mut self) {
            if let Some(source) = self.source.take() {
                source.stop().ok();
                source.disconnect().ok();
            }
        }
    }

    /// Web Audio cue and music player
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
        music: Option<MusicVoice>,
    }

    impl AudioManager {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            let music = ctx
                .as_ref()
                .and_then(|ctx| MusicVoice::new(ctx, settings.effective_music_volume()));
            if ctx.is_some() && music.is_none() {
                log::warn!("Failed to build music loop - music disabled");
            }
            Self {
                ctx,
                volume: settings.effective_sfx_volume(),
                music,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Pick up volume or mute changes
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_sfx_volume();
            if let Some(music) = &self.music {
                music.set_volume(settings.effective_music_volume());
            }
        }

        /// Start, pause, resume or stop the music loop
        pub fn music(&mut self, command: MusicCommand) {
            let (Some(ctx), Some(music)) = (&self.ctx, &mut self.music) else {
                return;
            };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            music.apply(ctx, command);
        }

        pub fn play(&self, cue: AudioCue) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                AudioCue::Flap { duration } => self.play_flap(ctx, vol, duration as f64),
                AudioCue::Score => self.play_score(ctx, vol),
                AudioCue::GameOver => self.play_game_over(ctx, vol),
                AudioCue::NewBest => self.play_new_best(ctx, vol),
                AudioCue::Pause => self.play_blip(ctx, vol, 520.0, 320.0),
                AudioCue::Resume => self.play_blip(ctx, vol, 320.0, 520.0),
                AudioCue::Start => self.play_start(ctx, vol),
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Flap - rising chirp, hard stop at `duration`
        fn play_flap(&self, ctx: &AudioContext, vol: f32, duration: f64) {
            let Some((osc, gain)) = self.create_osc(ctx, 380.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();
            let sweep = duration.min(0.12);

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + duration.max(0.02))
                .ok();
            osc.frequency().set_value_at_time(380.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(720.0, t + sweep.max(0.01))
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + duration).ok();
        }

        /// Score - two-note ding
        fn play_score(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [880.0, 1320.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.2).ok();
                }
            }
        }

        /// Game over - thud then a falling tone
        fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(50.0, t + 0.2)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.25).ok();
            }

            for (i, freq) in [400.0, 300.0, 200.0].iter().enumerate() {
                let delay = 0.15 + i as f64 * 0.18;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.35).ok();
                }
            }
        }

        /// New best - celebratory arpeggio
        fn play_new_best(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [500.0, 630.0, 750.0, 1000.0].iter().enumerate() {
                let delay = 0.6 + i as f64 * 0.08;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.3).ok();
                }
            }
        }

        /// Pause/resume - short glide between two pitches
        fn play_blip(&self, ctx: &AudioContext, vol: f32, from: f32, to: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.12, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.12).ok();
        }

        /// Start - whoosh up
        fn play_start(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                .ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(600.0, t + 0.15)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.25).ok();
        }
    }
}
