use crate::core::Renderer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

pub const TRANSPARENT: Color = Color(0, 0, 0, 0);
/// Pole colour (0.4, 0.5, 1.0); the alpha byte is replaced by depth when drawing.
pub const POLE_BLUE: Color = Color(102, 127, 255, 255);

/// A minimal RGBA software canvas.
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>, // RGBA
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        };
        canvas.clear(TRANSPARENT);
        canvas
    }

    pub fn clear(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.0, color.1, color.2, color.3]);
        }
    }

    /// Draw a filled rectangle with top-left (x, y), width w, height h.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 { return; }
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = (x + w).clamp(0, self.width as i32) as u32;
        let y1 = (y + h).clamp(0, self.height as i32) as u32;
        for yy in y0..y1 {
            let base = (yy * self.width) as usize * 4;
            for xx in x0..x1 {
                let idx = base + (xx as usize) * 4;
                self.pixels[idx..idx + 4].copy_from_slice(&[color.0, color.1, color.2, color.3]);
            }
        }
    }

    /// Pack pixels as `u32`s with `r` in the lowest byte.
    pub fn write_packed(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(
            self.pixels
                .chunks_exact(4)
                .map(|px| u32::from_le_bytes([px[0], px[1], px[2], px[3]])),
        );
    }
}

/// Software depth renderer for the vision cart-pole.
///
/// Looks at the pole from the front with an orthographic camera spanning
/// `[-1.6, 1.6]` world units on both axes. The pole (height 2, half-width 0.2)
/// stands on a pivot one unit below the centre, is rotated by `-angles[0]` in
/// the image plane and by `-angles[1]` (if present) towards the camera. The
/// alpha byte of each pole pixel holds its depth, `0.5` at the pivot. Cart
/// positions are not drawn.
#[derive(Clone, Debug)]
pub struct DepthPoleRenderer {
    width: u32,
    height: u32,
}

impl Default for DepthPoleRenderer {
    fn default() -> Self { Self::new(128, 128) }
}

impl DepthPoleRenderer {
    const VIEW_EXTENT: f64 = 1.6;
    const POLE_HEIGHT: f64 = 2.0;
    const HALF_WIDTH: f64 = 0.2;
    const PIVOT_Y: f64 = -1.0;

    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "renderer resolution must be non-zero");
        Self { width, height }
    }

    pub fn resolution(&self) -> (usize, usize) { (self.width as usize, self.height as usize) }

    fn to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        let span = 2.0 * Self::VIEW_EXTENT;
        (
            (wx + Self::VIEW_EXTENT) / span * self.width as f64,
            (Self::VIEW_EXTENT - wy) / span * self.height as f64,
        )
    }

    /// Draw the pole onto a fresh canvas.
    pub fn draw(&self, angles: &[f64]) -> Canvas {
        let mut canvas = Canvas::new(self.width, self.height);
        let Some(&roll) = angles.first() else { return canvas; };
        let gamma = -roll;
        let alpha = angles.get(1).map_or(0.0, |a| -a);

        // Pole axis after rotating the upright unit vector about z, then x.
        let dir = [-alpha.cos() * gamma.sin(), alpha.cos() * gamma.cos(), alpha.sin()];

        let px_per_unit = self.width.min(self.height) as f64 / (2.0 * Self::VIEW_EXTENT);
        let half_px = (Self::HALF_WIDTH * px_per_unit).round().max(1.0) as i32;
        let samples = (Self::POLE_HEIGHT * px_per_unit * 2.0).ceil().max(1.0) as usize;

        for i in 0..=samples {
            let t = i as f64 / samples as f64 * Self::POLE_HEIGHT;
            let (sx, sy) = self.to_screen(dir[0] * t, Self::PIVOT_Y + dir[1] * t);
            let depth = (0.5 + 0.5 * dir[2] * t / Self::POLE_HEIGHT).clamp(0.0, 1.0);
            let color = Color(POLE_BLUE.0, POLE_BLUE.1, POLE_BLUE.2, (depth * 255.0).round() as u8);
            canvas.fill_rect(sx as i32 - half_px, sy as i32 - half_px, 2 * half_px, 2 * half_px, color);
        }
        canvas
    }
}

impl Renderer for DepthPoleRenderer {
    fn render(&mut self, _positions: &[f64], angles: &[f64], pixels: &mut Vec<u32>) -> (usize, usize) {
        if angles.is_empty() {
            pixels.clear();
            return (0, 0);
        }
        self.draw(angles).write_packed(pixels);
        self.resolution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(p: u32) -> [u8; 4] { p.to_le_bytes() }

    #[test]
    fn fills_buffer_to_resolution() {
        let mut r = DepthPoleRenderer::new(32, 24);
        let mut pixels = vec![7; 5];
        let (w, h) = r.render(&[0.0], &[0.0], &mut pixels);
        assert_eq!((w, h), (32, 24));
        assert_eq!(pixels.len(), w * h);
    }

    #[test]
    fn upright_pole_is_drawn_at_mid_depth_on_transparent_background() {
        let mut r = DepthPoleRenderer::new(64, 64);
        let mut pixels = Vec::new();
        r.render(&[0.0], &[0.0], &mut pixels);
        // Column through the centre, halfway up the pole.
        let center = pixels[32 * 64 + 32];
        assert_eq!(bytes(center), [102, 127, 255, 128]);
        // Far corner stays empty.
        assert_eq!(bytes(pixels[0]), [0, 0, 0, 0]);
    }

    #[test]
    fn roll_moves_the_tip_sideways() {
        let r = DepthPoleRenderer::new(64, 64);
        let lit = |canvas: &Canvas, x: usize, y: usize| canvas.pixels[(y * 64 + x) * 4 + 2] != 0;
        let upright = r.draw(&[0.0]);
        let leaning = r.draw(&[0.6]);
        // Near its tip, the upright pole sits in the middle column.
        assert!(lit(&upright, 32, 12));
        assert!(!lit(&leaning, 32, 12));
        // A positive angle leans the tip to the right.
        assert!((40..64).any(|x| lit(&leaning, x, 20)));
        assert!(!(0..32).any(|x| lit(&leaning, x, 20)));
    }

    #[test]
    fn pitch_changes_tip_depth() {
        let r = DepthPoleRenderer::new(64, 64);
        let toward = r.draw(&[0.0, -0.5]);
        let away = r.draw(&[0.0, 0.5]);
        let alpha_at = |canvas: &Canvas| canvas.pixels[(20 * 64 + 32) * 4 + 3];
        assert!(alpha_at(&toward) > 128);
        assert!(alpha_at(&away) < 128);
    }

    #[test]
    fn no_angles_renders_nothing() {
        let mut r = DepthPoleRenderer::default();
        let mut pixels = vec![1, 2, 3];
        assert_eq!(r.render(&[], &[], &mut pixels), (0, 0));
        assert!(pixels.is_empty());
    }
}
