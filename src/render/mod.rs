//! Procedural orb rendering into an RGBA buffer.
//!
//! Renderers draw onto their own square surface, clip it to a circle and
//! composite it centered on the frame. Nothing is ever written outside
//! that circle. Output depends only on the seed, the style and `t`.

pub mod canvas;
pub mod energy;
pub mod holo;
pub mod math;
pub mod smooth;

pub use canvas::{Canvas, Rgba};
pub use energy::{EnergyOrb, EnergyStyle};
pub use holo::{HoloOrb, HoloStyle};
pub use smooth::{SmoothOrb, SmoothStyle};

use crate::config::{OrbStyleKind, Rgb};

pub const DEFAULT_SEED: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbFrame {
    pub center: (i32, i32),
    pub radius: u32,
    /// Seconds since the animation started.
    pub t: f64,
    pub base_rgb: Rgb,
    pub attentive: bool,
}

pub trait OrbRenderer: Send {
    fn render(&mut self, frame: &OrbFrame, canvas: &mut Canvas);

    /// Radius of the circle this renderer may touch for a given orb radius.
    fn extent(&self, radius: u32) -> u32 {
        radius
    }
}

pub fn orb_for(style: OrbStyleKind) -> Box<dyn OrbRenderer> {
    match style {
        OrbStyleKind::Energy => Box::new(EnergyOrb::default()),
        OrbStyleKind::Holo => Box::new(HoloOrb::default()),
        OrbStyleKind::Smooth => Box::new(SmoothOrb::default()),
    }
}

/// Background fill plus one orb.
pub fn compose(width: u32, height: u32, background: Rgb, orb: &mut dyn OrbRenderer, frame: &OrbFrame) -> Canvas {
    let mut canvas = Canvas::filled(width, height, [background.0, background.1, background.2, 255]);
    orb.render(frame, &mut canvas);
    canvas
}

/// Re-clips a scaled surface to its inscribed circle and centers it.
pub(crate) fn place(canvas: &mut Canvas, mut surface: Canvas, center: (i32, i32)) {
    let w = surface.width();
    let h = surface.height();
    let r = w.min(h) as f32 / 2.0;
    surface.clip_circle(w as f32 / 2.0, h as f32 / 2.0, r);
    canvas.blit(&surface, center.0 - (w / 2) as i32, center.1 - (h / 2) as i32);
}
