use std::f64::consts::PI;

use super::canvas::Rgba;
use crate::config::Rgb;

pub type Vec3 = (f64, f64, f64);

/// Hermite smoothstep on [0, 1], clamping its input.
pub fn smoothstep(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Rotates about X, then Y, then Z.
pub fn rotate_xyz(p: Vec3, angles: Vec3) -> Vec3 {
    let (x, y, z) = p;
    let (sx, cx) = angles.0.sin_cos();
    let (sy, cy) = angles.1.sin_cos();
    let (sz, cz) = angles.2.sin_cos();

    let (y, z) = (y * cx - z * sx, y * sx + z * cx);
    let (x, z) = (x * cy + z * sy, -x * sy + z * cy);
    let (x, y) = (x * cz - y * sz, x * sz + y * cz);
    (x, y, z)
}

/// `n` points spread evenly over the unit sphere.
pub fn fibonacci_sphere(n: usize) -> Vec<Vec3> {
    let golden = PI * (3.0 - 5f64.sqrt());
    let denom = (n.max(2) - 1) as f64;
    (0..n)
        .map(|i| {
            let y = 1.0 - 2.0 * i as f64 / denom;
            let r = (1.0 - y * y).max(0.0).sqrt();
            let phi = i as f64 * golden;
            (phi.cos() * r, y, phi.sin() * r)
        })
        .collect()
}

pub fn scale_rgb(rgb: Rgb, m: f64) -> Vec3 {
    (f64::from(rgb.0) * m, f64::from(rgb.1) * m, f64::from(rgb.2) * m)
}

fn channel(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Clamped RGBA from float channels.
pub fn rgba(rgb: Vec3, a: f64) -> Rgba {
    [channel(rgb.0), channel(rgb.1), channel(rgb.2), channel(a)]
}

