use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::config::{LumaConfig, Rgb};

/// Visible lifecycle states of the orb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceState {
    /// No recent input. Blue.
    Idle,
    /// Input arrived within the attentive window. Green.
    Attentive,
    /// A completion is in flight.
    Thinking,
    /// Audio is playing. Listening is paused.
    Speaking,
}

impl Default for PresenceState {
    fn default() -> Self {
        Self::Idle
    }
}

impl PresenceState {
    /// Speaking > Thinking > Attentive > Idle.
    pub fn resolve(attentive: bool, thinking: bool, speaking: bool) -> Self {
        if speaking {
            Self::Speaking
        } else if thinking {
            Self::Thinking
        } else if attentive {
            Self::Attentive
        } else {
            Self::Idle
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "BLUE (idle)",
            Self::Attentive => "GREEN (attentive)",
            Self::Thinking => "THINKING",
            Self::Speaking => "SPEAKING",
        }
    }

    pub fn color(&self, cfg: &LumaConfig) -> Rgb {
        match self {
            Self::Idle => cfg.palette.idle,
            Self::Attentive => cfg.palette.attentive,
            Self::Thinking => cfg.palette.thinking,
            Self::Speaking => cfg.palette.speaking,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BreathParams {
    base_radius: f64,
    pulse_amp: f64,
    pulse_hz: f64,
    organic_wobble: f64,
    attentive_seconds: f64,
}

/// Stationary, breathing orb that turns attentive briefly on input.
///
/// All time arguments are seconds on the same monotonic clock as `t0`.
#[derive(Debug, Clone)]
pub struct Presence {
    params: BreathParams,
    pub x: u32,
    pub y: u32,
    last_input_time: Option<f64>,
    last_input_text: String,
    t0: f64,
}

impl Presence {
    pub fn new(cfg: &LumaConfig, t0: f64) -> Self {
        Self {
            params: BreathParams {
                base_radius: f64::from(cfg.base_radius),
                pulse_amp: f64::from(cfg.pulse_amp),
                pulse_hz: f64::from(cfg.pulse_hz),
                organic_wobble: f64::from(cfg.organic_wobble),
                attentive_seconds: f64::from(cfg.attentive_seconds),
            },
            x: cfg.width / 2,
            y: cfg.height / 2,
            last_input_time: None,
            last_input_text: String::new(),
            t0,
        }
    }

    pub fn receive_input(&mut self, text: &str, now: f64) {
        self.last_input_time = Some(now);
        self.last_input_text = text.trim().to_string();
    }

    pub fn last_input_text(&self) -> &str {
        &self.last_input_text
    }

    pub fn is_attentive(&self, now: f64) -> bool {
        match self.last_input_time {
            Some(at) => now - at <= self.params.attentive_seconds,
            None => false,
        }
    }

    /// Summed sines, roughly in [-1, 1].
    pub fn smooth_noise(t: f64) -> f64 {
        0.55 * (t * 1.13 + 0.7).sin() + 0.30 * (t * 2.37 + 2.1).sin() + 0.15 * (t * 3.91 + 4.0).sin()
    }

    /// Breathing scale, clamped to [0.82, 1.22].
    pub fn scale_at(&self, now: f64) -> f64 {
        let p = &self.params;
        let t = now - self.t0;

        let breath = (2.0 * PI * p.pulse_hz * t).sin();
        let wobble = Self::smooth_noise(t);

        // Ease-out bump right after input
        let att = match self.last_input_time {
            Some(at) if self.is_attentive(now) => (-(now - at) * 3.5).exp() * 0.06,
            _ => 0.0,
        };

        let scale = 1.0 + p.pulse_amp * breath + p.organic_wobble * wobble + att;
        scale.clamp(0.82, 1.22)
    }

    pub fn radius_at(&self, now: f64) -> u32 {
        (self.params.base_radius * self.scale_at(now)) as u32
    }
}
