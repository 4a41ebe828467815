use std::collections::HashMap;

use super::canvas::Canvas;
use super::math::smoothstep;
use super::{OrbFrame, OrbRenderer};

#[derive(Debug, Clone, Copy)]
pub struct SmoothStyle {
    /// Side of the internal field grid. 160 to 280 looks right.
    pub internal_res: u32,
    /// More passes are smoother and slower.
    pub blur_passes: u32,
    pub vignette_strength: f64,
    pub rim_strength: f64,
    pub highlight_strength: f64,
}

impl Default for SmoothStyle {
    fn default() -> Self {
        Self {
            internal_res: 220,
            blur_passes: 2,
            vignette_strength: 0.50,
            rim_strength: 0.35,
            highlight_strength: 0.45,
        }
    }
}

type Anchors = [[f64; 3]; 3];

const ATTENTIVE_ANCHORS: Anchors = [[35.0, 230.0, 130.0], [40.0, 255.0, 185.0], [170.0, 255.0, 120.0]];
const IDLE_ANCHORS: Anchors = [[60.0, 150.0, 255.0], [75.0, 245.0, 255.0], [170.0, 130.0, 255.0]];

/// Horizontal offset of the second blend weight.
const ROLL_SHIFT: usize = 18;
const BASE_BIAS: f64 = 0.22;

/// Animated color field filling the whole circle. The orb stays put;
/// only the colors flow.
pub struct SmoothOrb {
    style: SmoothStyle,
    nx: Vec<f64>,
    ny: Vec<f64>,
    rr: Vec<f64>,
    masks: HashMap<u32, Vec<u8>>,
}

impl SmoothOrb {
    pub fn new(style: SmoothStyle) -> Self {
        let n = style.internal_res.max(2);
        let c = f64::from(n - 1) / 2.0;
        let r = f64::from(n) / 2.0;
        let cells = (n * n) as usize;
        let mut nx = Vec::with_capacity(cells);
        let mut ny = Vec::with_capacity(cells);
        let mut rr = Vec::with_capacity(cells);
        for y in 0..n {
            for x in 0..n {
                let px = (f64::from(x) - c) / r;
                let py = (f64::from(y) - c) / r;
                nx.push(px);
                ny.push(py);
                rr.push((px * px + py * py).sqrt());
            }
        }
        Self {
            style: SmoothStyle { internal_res: n, ..style },
            nx,
            ny,
            rr,
            masks: HashMap::new(),
        }
    }

    fn anchors(attentive: bool) -> &'static Anchors {
        if attentive {
            &ATTENTIVE_ANCHORS
        } else {
            &IDLE_ANCHORS
        }
    }

    /// Soft-edged alpha, zero outside the circle.
    fn circle_mask(&mut self) -> &[u8] {
        let n = self.style.internal_res;
        let rr = &self.rr;
        self.masks.entry(n).or_insert_with(|| {
            rr.iter()
                .map(|&r| {
                    if r > 1.0 {
                        0
                    } else {
                        (255.0 * (1.0 - r).clamp(0.0, 1.0).powf(0.60)) as u8
                    }
                })
                .collect()
        })
    }

    /// Moving scalar field in [0, 1] built from three sine layers.
    pub fn flow_field(&self, t: f64) -> Vec<f64> {
        let tx = 0.25 * (t * 0.55).cos();
        let ty = 0.25 * (t * 0.48).sin();

        let mut v: Vec<f64> = self
            .nx
            .iter()
            .zip(&self.ny)
            .map(|(&nx, &ny)| {
                let f1 = ((nx * 3.2 + ny * 2.1 + tx) * 2.0 + t * 0.7).sin();
                let f2 = ((nx * -2.3 + ny * 3.7 + ty) * 2.0 + t * 0.9).sin();
                let f3 = ((nx * 5.1 + ny * -4.2 + tx * 0.7) * 1.6 + t * 0.55).sin();
                0.45 * f1 + 0.35 * f2 + 0.20 * f3
            })
            .collect();

        let (lo, hi) = v
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        let span = hi - lo + 1e-6;

        for (i, value) in v.iter_mut().enumerate() {
            let norm = (*value - lo) / span;
            let roll = 0.5 + 0.5 * (t * 0.35 + (self.nx[i] * 1.2 - self.ny[i]) * 2.0).sin();
            *value = smoothstep(0.72 * norm + 0.28 * roll);
        }
        v
    }

    fn draw_surface(&mut self, frame: &OrbFrame) -> Canvas {
        let n = self.style.internal_res;
        let nu = n as usize;
        let field = self.flow_field(frame.t);
        let anchors = Self::anchors(frame.attentive);
        let base = [
            f64::from(frame.base_rgb.0),
            f64::from(frame.base_rgb.1),
            f64::from(frame.base_rgb.2),
        ];
        let vignette_exp = 0.8 + self.style.vignette_strength;

        let mut surf = Canvas::new(n, n);
        for y in 0..nu {
            for x in 0..nu {
                let i = y * nu + x;
                let w1 = field[i];
                let w2 = smoothstep(field[y * nu + (x + nu - ROLL_SHIFT % nu) % nu]);
                let w0 = 1.0 - (w1 * 0.65 + w2 * 0.35).clamp(0.0, 1.0);

                let edge = (1.0 - self.rr[i]).clamp(0.0, 1.0);
                let vign = 0.75 + 0.25 * edge.powf(vignette_exp);

                let mut px = [0u8; 4];
                for c in 0..3 {
                    let mixed = w0 * anchors[0][c] + w1 * anchors[1][c] + w2 * anchors[2][c];
                    let biased = (1.0 - BASE_BIAS) * mixed + BASE_BIAS * base[c];
                    px[c] = (biased * vign).clamp(0.0, 255.0) as u8;
                }
                surf.set(x as i32, y as i32, px);
            }
        }
        let mask = self.circle_mask().to_vec();
        for (y, row) in mask.chunks_exact(nu).enumerate() {
            for (x, &a) in row.iter().enumerate() {
                if let Some(mut px) = surf.get(x as i32, y as i32) {
                    px[3] = a;
                    surf.set(x as i32, y as i32, px);
                }
            }
        }

        let mut blurred = surf.blurred(self.style.blur_passes);

        // Rim and highlight stay inside: the mask is applied again below
        let half = n as f32 * 0.5;
        let rim_a = (18.0 * self.style.rim_strength) as u8;
        blurred.add_ring(half, half, half * 0.985, 2.0, [255, 255, 255, rim_a]);
        let hi_a = (14.0 * self.style.highlight_strength) as u8;
        blurred.add_circle(n as f32 * 0.38, n as f32 * 0.32, half * 0.30, [255, 255, 255, hi_a]);

        blurred.limit_alpha(&mask);
        blurred
    }
}

impl Default for SmoothOrb {
    fn default() -> Self {
        Self::new(SmoothStyle::default())
    }
}

impl OrbRenderer for SmoothOrb {
    fn render(&mut self, frame: &OrbFrame, canvas: &mut Canvas) {
        let size = (frame.radius * 2).max(8);
        let orb = self.draw_surface(frame).resized(size, size);
        super::place(canvas, orb, frame.center);
    }
}
