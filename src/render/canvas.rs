/// Straight (non-premultiplied) RGBA color.
pub type Rgba = [u8; 4];

/// RGBA8 pixel buffer, row-major, straight alpha.
///
/// Every drawing call clips to the buffer bounds; coordinates may be
/// negative or past the edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let mut canvas = Self::new(width, height);
        canvas.fill(color);
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        let i = self.index(x, y)?;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    pub fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&color);
        }
    }

    pub fn fill(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Source-over compositing of one pixel.
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        let Some(i) = self.index(x, y) else { return };
        let sa = f32::from(color[3]) / 255.0;
        if sa <= 0.0 {
            return;
        }
        let da = f32::from(self.pixels[i + 3]) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let s = f32::from(color[c]);
            let d = f32::from(self.pixels[i + c]);
            let v = (s * sa + d * da * (1.0 - sa)) / out_a;
            self.pixels[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Saturating per-channel add, alpha included.
    pub fn add(&mut self, x: i32, y: i32, color: Rgba) {
        let Some(i) = self.index(x, y) else { return };
        for c in 0..4 {
            self.pixels[i + c] = self.pixels[i + c].saturating_add(color[c]);
        }
    }

    /// Pixel centers within `r` of the center are covered.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba) {
        self.circle_span(cx, cy, r, |canvas, x, y, _| canvas.blend(x, y, color));
    }

    /// Ring of `width` pixels whose outer edge sits on `r`.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, width: f32, color: Rgba) {
        let inner = (r - width).max(0.0);
        self.circle_span(cx, cy, r, |canvas, x, y, d| {
            if d > inner {
                canvas.blend(x, y, color);
            }
        });
    }

    /// Like `stroke_circle` but adds instead of blending.
    pub fn add_ring(&mut self, cx: f32, cy: f32, r: f32, width: f32, color: Rgba) {
        let inner = (r - width).max(0.0);
        self.circle_span(cx, cy, r, |canvas, x, y, d| {
            if d > inner {
                canvas.add(x, y, color);
            }
        });
    }

    pub fn add_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgba) {
        self.circle_span(cx, cy, r, |canvas, x, y, _| canvas.add(x, y, color));
    }

    fn circle_span<F>(&mut self, cx: f32, cy: f32, r: f32, mut visit: F)
    where
        F: FnMut(&mut Self, i32, i32, f32),
    {
        if r <= 0.0 {
            return;
        }
        let x0 = (cx - r).floor().max(0.0) as i32;
        let y0 = (cy - r).floor().max(0.0) as i32;
        let x1 = ((cx + r).ceil() as i32).min(self.width as i32 - 1);
        let y1 = ((cy + r).ceil() as i32).min(self.height as i32 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d <= r {
                    visit(self, x, y, d);
                }
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        for yy in y.max(0)..(y + h).min(self.height as i32) {
            for xx in x.max(0)..(x + w).min(self.width as i32) {
                self.blend(xx, yy, color);
            }
        }
    }

    /// One-pixel line with coverage-weighted alpha on the minor axis.
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
        let steep = dy.abs() > dx.abs();
        for i in 0..=steps {
            let s = i as f32 / steps as f32;
            let x = x0 + dx * s;
            let y = y0 + dy * s;
            let (minor, frac) = if steep {
                (x.floor(), x - x.floor())
            } else {
                (y.floor(), y - y.floor())
            };
            let near = scale_alpha(color, 1.0 - frac);
            let far = scale_alpha(color, frac);
            if steep {
                let yy = y.round() as i32;
                self.blend(minor as i32, yy, near);
                self.blend(minor as i32 + 1, yy, far);
            } else {
                let xx = x.round() as i32;
                self.blend(xx, minor as i32, near);
                self.blend(xx, minor as i32 + 1, far);
            }
        }
    }

    pub fn polyline(&mut self, points: &[(f32, f32)], color: Rgba) {
        for pair in points.windows(2) {
            self.line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, color);
        }
    }

    /// Hard circular clip: alpha becomes zero outside the circle.
    pub fn clip_circle(&mut self, cx: f32, cy: f32, r: f32) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy > r * r {
                    if let Some(i) = self.index(x, y) {
                        self.pixels[i + 3] = 0;
                    }
                }
            }
        }
    }

    /// Caps each alpha by the matching mask byte. Mask must be width × height.
    pub fn limit_alpha(&mut self, mask: &[u8]) {
        for (px, &m) in self.pixels.chunks_exact_mut(4).zip(mask) {
            px[3] = px[3].min(m);
        }
    }

    /// Bilinear resample, interpolating in premultiplied space.
    pub fn resized(&self, width: u32, height: u32) -> Canvas {
        let mut out = Canvas::new(width, height);
        if self.width == 0 || self.height == 0 || width == 0 || height == 0 {
            return out;
        }
        let sx = self.width as f32 / width as f32;
        let sy = self.height as f32 / height as f32;
        let max_x = self.width as i32 - 1;
        let max_y = self.height as i32 - 1;

        for y in 0..height {
            let fy = ((y as f32 + 0.5) * sy - 0.5).max(0.0);
            let y0 = (fy.floor() as i32).min(max_y);
            let y1 = (y0 + 1).min(max_y);
            let wy = fy - y0 as f32;
            for x in 0..width {
                let fx = ((x as f32 + 0.5) * sx - 0.5).max(0.0);
                let x0 = (fx.floor() as i32).min(max_x);
                let x1 = (x0 + 1).min(max_x);
                let wx = fx - x0 as f32;

                let mut acc = [0.0f32; 4];
                for (px, py, w) in [
                    (x0, y0, (1.0 - wx) * (1.0 - wy)),
                    (x1, y0, wx * (1.0 - wy)),
                    (x0, y1, (1.0 - wx) * wy),
                    (x1, y1, wx * wy),
                ] {
                    let i = (py as usize * self.width as usize + px as usize) * 4;
                    let a = f32::from(self.pixels[i + 3]) / 255.0;
                    for c in 0..3 {
                        acc[c] += f32::from(self.pixels[i + c]) * a * w;
                    }
                    acc[3] += a * w;
                }

                let o = (y as usize * width as usize + x as usize) * 4;
                if acc[3] > 0.0 {
                    for c in 0..3 {
                        out.pixels[o + c] = (acc[c] / acc[3]).round().clamp(0.0, 255.0) as u8;
                    }
                }
                out.pixels[o + 3] = (acc[3] * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
        out
    }

    /// Cheap blur: halve then restore, `passes` times.
    pub fn blurred(&self, passes: u32) -> Canvas {
        let mut out = self.clone();
        let half_w = (self.width / 2).max(2);
        let half_h = (self.height / 2).max(2);
        for _ in 0..passes {
            out = out.resized(half_w, half_h).resized(self.width, self.height);
        }
        out
    }

    /// Source-over blit with the top-left corner at (x, y).
    pub fn blit(&mut self, src: &Canvas, x: i32, y: i32) {
        for sy in 0..src.height as i32 {
            for sx in 0..src.width as i32 {
                if let Some(color) = src.get(sx, sy) {
                    if color[3] > 0 {
                        self.blend(x + sx, y + sy, color);
                    }
                }
            }
        }
    }
}

fn scale_alpha(color: Rgba, k: f32) -> Rgba {
    let a = (f32::from(color[3]) * k.clamp(0.0, 1.0)).round() as u8;
    [color[0], color[1], color[2], a]
}
