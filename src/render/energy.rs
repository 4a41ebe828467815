use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

use super::canvas::Canvas;
use super::{OrbFrame, OrbRenderer};

#[derive(Debug, Clone, Copy)]
pub struct EnergyStyle {
    /// Side of the internal square surface, in pixels.
    pub res: u32,
    pub filaments: usize,
    pub sparks: usize,
    pub rim_strength: f64,
}

impl Default for EnergyStyle {
    fn default() -> Self {
        Self {
            res: 240,
            filaments: 28,
            sparks: 16,
            rim_strength: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Filament {
    phase: f64,
    speed: f64,
    radius: f64,
    amp: f64,
}

const FILAMENT_POINTS: usize = 18;

/// Plasma ball: drifting filaments, orbiting core sparks and a hot rim.
/// Ignores `base_rgb`; the palette is fixed electric blue.
pub struct EnergyOrb {
    style: EnergyStyle,
    filaments: Vec<Filament>,
    sparks: Vec<f64>,
}

impl EnergyOrb {
    pub fn new(style: EnergyStyle, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let filaments = (0..style.filaments)
            .map(|_| Filament {
                phase: rng.gen::<f64>() * TAU,
                speed: 0.6 + rng.gen::<f64>() * 1.2,
                radius: 0.25 + rng.gen::<f64>() * 0.55,
                amp: 0.12 + rng.gen::<f64>() * 0.22,
            })
            .collect();
        let sparks = (0..style.sparks).map(|_| rng.gen::<f64>() * TAU).collect();
        Self { style, filaments, sparks }
    }

    fn draw_surface(&self, t: f64) -> Canvas {
        let n = self.style.res;
        let mut surf = Canvas::new(n, n);
        let c = (n / 2) as f64;
        let r = (n / 2) as f64;

        // Base plasma
        let mut ring = r as i32;
        while ring > 0 {
            let a = (12.0 * (f64::from(ring) / r)) as u8;
            surf.fill_circle(c as f32, c as f32, ring as f32, [20, 60, 120, a]);
            ring -= 2;
        }

        for f in &self.filaments {
            let ang0 = f.phase + t * f.speed;
            let points: Vec<(f32, f32)> = (0..FILAMENT_POINTS)
                .map(|i| {
                    let i = i as f64;
                    let th = ang0 + i * 0.35;
                    let rr = f.radius * r * (0.85 + 0.25 * (t * 1.8 + i).sin());
                    let wob = f.amp * r * (th * 3.2 + t * 2.2).sin();
                    let x = c + th.cos() * rr + (th * 1.5).cos() * wob;
                    let y = c + th.sin() * rr + (th * 1.3).sin() * wob;
                    (x as f32, y as f32)
                })
                .collect();
            surf.polyline(&points, [80, 180, 255, 80]);
        }

        for &phase in &self.sparks {
            let ang = phase + t * 2.4;
            let rr = r * 0.18;
            let x = (c + ang.cos() * rr).trunc();
            let y = (c + ang.sin() * rr).trunc();
            surf.fill_circle(x as f32, y as f32, 2.0, [160, 220, 255, 120]);
        }

        // Hot rim
        for i in 0..3 {
            let a = (f64::from(90 - i * 25) * self.style.rim_strength).clamp(0.0, 255.0) as u8;
            surf.stroke_circle(c as f32, c as f32, (r - f64::from(i)) as f32, 2.0, [120, 220, 255, a]);
        }

        surf.clip_circle(c as f32, c as f32, r as f32);
        surf
    }
}

impl Default for EnergyOrb {
    fn default() -> Self {
        Self::new(EnergyStyle::default(), super::DEFAULT_SEED)
    }
}

impl OrbRenderer for EnergyOrb {
    fn render(&mut self, frame: &OrbFrame, canvas: &mut Canvas) {
        let size = (frame.radius * 2).max(2);
        let orb = self.draw_surface(frame.t).resized(size, size);
        super::place(canvas, orb, frame.center);
    }
}
