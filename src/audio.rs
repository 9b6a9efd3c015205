//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::SoundKey;

/// One oscillator sweep: start frequency, then exponential ramps to each
/// `(frequency, seconds)` point, with the gain decaying over the whole sweep
struct Tone {
    wave: OscillatorType,
    volume: f32,
    start_hz: f32,
    sweep: &'static [(f32, f64)],
}

impl Tone {
    fn duration(&self) -> f64 {
        self.sweep.last().map_or(0.1, |&(_, t)| t)
    }
}

fn tone(key: SoundKey) -> Tone {
    match key {
        SoundKey::Laser => Tone {
            wave: OscillatorType::Sine,
            volume: 0.5,
            start_hz: 880.0,
            sweep: &[(110.0, 0.1)],
        },
        SoundKey::Plasma => Tone {
            wave: OscillatorType::Sawtooth,
            volume: 0.6,
            start_hz: 440.0,
            sweep: &[(55.0, 0.2)],
        },
        SoundKey::Missile => Tone {
            wave: OscillatorType::Square,
            volume: 0.7,
            start_hz: 220.0,
            sweep: &[(55.0, 0.3)],
        },
        SoundKey::Quantum => Tone {
            wave: OscillatorType::Triangle,
            volume: 0.8,
            start_hz: 660.0,
            sweep: &[(110.0, 0.4)],
        },
        SoundKey::Explosion => Tone {
            wave: OscillatorType::Sawtooth,
            volume: 0.6,
            start_hz: 100.0,
            sweep: &[(20.0, 0.5)],
        },
        SoundKey::Hit => Tone {
            wave: OscillatorType::Sine,
            volume: 0.5,
            start_hz: 220.0,
            sweep: &[(55.0, 0.1)],
        },
        SoundKey::PlayerHit => Tone {
            wave: OscillatorType::Sine,
            volume: 0.7,
            start_hz: 110.0,
            sweep: &[(55.0, 0.2)],
        },
        SoundKey::Reload => Tone {
            wave: OscillatorType::Sine,
            volume: 0.6,
            start_hz: 440.0,
            sweep: &[(880.0, 0.1)],
        },
        SoundKey::Powerup => Tone {
            wave: OscillatorType::Sine,
            volume: 0.7,
            start_hz: 440.0,
            sweep: &[(880.0, 0.2), (1320.0, 0.4)],
        },
        SoundKey::LevelUp => Tone {
            wave: OscillatorType::Sine,
            volume: 0.8,
            start_hz: 440.0,
            sweep: &[(880.0, 0.2), (1320.0, 0.4), (1760.0, 0.6)],
        },
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Fire-and-forget playback of a simulation sound
    pub fn play(&self, key: SoundKey) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        self.play_tone(ctx, &tone(key), vol);
    }

    /// Create an oscillator with gain envelope
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

    fn play_tone(&self, ctx: &AudioContext, tone: &Tone, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, tone.start_hz, tone.wave) else {
            return;
        };
        let t = ctx.current_time();
        let duration = tone.duration();

        gain.gain().set_value_at_time(vol * tone.volume, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + duration)
            .ok();
        osc.frequency().set_value_at_time(tone.start_hz, t).ok();
        for &(freq, at) in tone.sweep {
            osc.frequency()
                .exponential_ramp_to_value_at_time(freq, t + at)
                .ok();
        }

        osc.start().ok();
        osc.stop_with_when(t + duration + 0.05).ok();
    }
}
