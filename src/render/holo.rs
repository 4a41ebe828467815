use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

use super::canvas::Canvas;
use super::math::{fibonacci_sphere, rgba, rotate_xyz, scale_rgb, Vec3};
use super::{OrbFrame, OrbRenderer};

#[derive(Debug, Clone, Copy)]
pub struct HoloStyle {
    pub points: usize,
    pub links: usize,
    pub sparks: usize,
    pub rings: usize,
    pub shell_layers: usize,
    pub jitter: f64,
}

impl Default for HoloStyle {
    fn default() -> Self {
        Self {
            points: 220,
            links: 320,
            sparks: 90,
            rings: 6,
            shell_layers: 4,
            jitter: 0.012,
        }
    }
}

/// Glow margin around the sphere on each side.
const GLOW_MARGIN: u32 = 70;
/// Perspective camera distance.
const CAMERA: f64 = 2.6;

#[derive(Debug, Clone, Copy)]
struct Spark {
    angle: f64,
    speed: f64,
    phase: f64,
    reach: f64,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy)]
struct Ring {
    axis: Axis,
    phase: f64,
    scale: f64,
}

const RING_SEGMENTS: usize = 48;

/// Rotating wireframe sphere of linked nodes with orbiting sparks.
pub struct HoloOrb {
    style: HoloStyle,
    points: Vec<Vec3>,
    links: Vec<(usize, usize)>,
    sparks: Vec<Spark>,
    rings: Vec<Ring>,
}

impl HoloOrb {
    pub fn new(style: HoloStyle, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = style.points.max(1);
        let points = fibonacci_sphere(n);
        let links = (0..style.links)
            .map(|_| (rng.gen_range(0..n), rng.gen_range(0..n)))
            .collect();
        let sparks = (0..style.sparks)
            .map(|_| Spark {
                angle: rng.gen::<f64>() * TAU,
                speed: 0.25 + rng.gen::<f64>() * 1.1,
                phase: rng.gen::<f64>(),
                reach: 0.35 + rng.gen::<f64>() * 0.65,
            })
            .collect();
        let rings = (0..style.rings)
            .map(|_| Ring {
                axis: match rng.gen_range(0..3) {
                    0 => Axis::X,
                    1 => Axis::Y,
                    _ => Axis::Z,
                },
                phase: rng.gen::<f64>() * TAU,
                scale: 0.25 + rng.gen::<f64>() * 0.9,
            })
            .collect();
        Self {
            style,
            points,
            links,
            sparks,
            rings,
        }
    }

    /// Point on a ring's circle, before the global rotation.
    fn ring_point(ring: &Ring, theta: f64) -> Vec3 {
        let (s, c) = (theta + ring.phase).sin_cos();
        let (a, b) = (c * ring.scale, s * ring.scale);
        match ring.axis {
            Axis::X => (0.0, a, b),
            Axis::Y => (a, 0.0, b),
            Axis::Z => (a, b, 0.0),
        }
    }

    fn jittered(&self, p: Vec3, t: f64) -> Vec3 {
        let j = self.style.jitter;
        (
            p.0 + (t * 3.1 + p.0 * 9.0).sin() * j,
            p.1 + (t * 2.7 + p.1 * 7.0).sin() * j,
            p.2 + (t * 2.9 + p.2 * 8.0).sin() * j,
        )
    }
}

impl Default for HoloOrb {
    fn default() -> Self {
        Self::new(HoloStyle::default(), super::DEFAULT_SEED)
    }
}

impl OrbRenderer for HoloOrb {
    fn extent(&self, radius: u32) -> u32 {
        radius + GLOW_MARGIN
    }

    fn render(&mut self, frame: &OrbFrame, canvas: &mut Canvas) {
        let radius = f64::from(frame.radius);
        let size = frame.radius * 2 + GLOW_MARGIN * 2;
        let mut orb = Canvas::new(size, size);
        let o = f64::from(size / 2);
        let base = frame.base_rgb;
        let t = frame.t;

        let layers = self.style.shell_layers;
        for i in 0..layers {
            let k = 1.0 - i as f64 / layers.max(1) as f64;
            let glow_r = (radius * (1.05 + 0.22 * (i + 1) as f64)).trunc();
            let col = rgba(scale_rgb(base, 0.55 + 0.25 * k), 40.0 * k);
            orb.fill_circle(o as f32, o as f32, glow_r as f32, col);
        }

        let angles = (t * 0.55, t * 0.78, t * 0.36);

        let project = |p: Vec3| {
            let (x, y, z) = rotate_xyz(p, angles);
            let depth = CAMERA + z;
            (o + (x / depth) * radius * 1.55, o + (y / depth) * radius * 1.55, z)
        };

        let projected: Vec<Vec3> = self
            .points
            .iter()
            .map(|&p| project(self.jittered(p, t)))
            .collect();

        for ring in &self.rings {
            let points: Vec<(f32, f32)> = (0..=RING_SEGMENTS)
                .map(|i| {
                    let theta = TAU * i as f64 / RING_SEGMENTS as f64 + t * 0.2;
                    let (x, y, _) = project(Self::ring_point(ring, theta));
                    (x as f32, y as f32)
                })
                .collect();
            orb.polyline(&points, rgba(scale_rgb(base, 0.8), 45.0));
        }

        for &(a, b) in &self.links {
            let (ax, ay, az) = projected[a];
            let (bx, by, bz) = projected[b];
            if (az - bz).abs() > 1.2 {
                continue;
            }
            let near = (az + bz + 2.0) / 4.0;
            let col = rgba(scale_rgb(base, 0.55 + 0.45 * near), 20.0 + 65.0 * near);
            orb.line(ax as f32, ay as f32, bx as f32, by as f32, col);
        }

        for &(px, py, z) in &projected {
            let near = (z + 1.0) / 2.0;
            let s = 1 + (2.0 * near) as i32;
            let col = rgba(scale_rgb(base, 0.75 + 0.35 * near), 40.0 + 140.0 * near);
            orb.fill_rect(px as i32 - s, py as i32 - s, s * 2, s * 2, col);
        }

        for spark in &self.sparks {
            let ang = spark.angle + t * spark.speed;
            let rr = radius * (0.35 + 0.85 * spark.reach);
            let x = o + ang.cos() * rr;
            let y = o + ang.sin() * rr;
            let alpha = 80.0 + 140.0 * (t * 6.0 + spark.phase).sin().abs();
            orb.fill_rect(x as i32, y as i32, 2, 2, rgba(scale_rgb(base, 0.95), alpha));
        }

        let core = rgba(scale_rgb(base, 0.9), 110.0);
        orb.fill_circle(o as f32, o as f32, (radius * 0.35).trunc() as f32, core);

        orb.clip_circle(o as f32, o as f32, o as f32);
        super::place(canvas, orb, frame.center);
    }
}
