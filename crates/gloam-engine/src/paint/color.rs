/// Straight-alpha sRGB color with `f32` components in `[0, 1]`.
///
/// Used as the window clear color. Presentation backends convert to linear space
/// when their surface format is sRGB.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Creates a color from straight sRGB bytes (`0`-`255`).
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// Clamps every component into `[0, 1]`; NaN becomes 0.
    #[inline]
    pub fn clamped(self) -> Self {
        fn unit(v: f32) -> f32 {
            if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
        }
        Self::rgba(unit(self.r), unit(self.g), unit(self.b), unit(self.a))
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Converts the color channels from sRGB to linear; alpha is untouched.
    #[inline]
    pub fn to_linear(self) -> Self {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Self::rgba(channel(self.r), channel(self.g), channel(self.b), self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_map_to_unit_range() {
        let c = Color::from_rgba8(255, 0, 51, 255);
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), Color::BLACK);
        let white = Color::WHITE.to_linear();
        assert!((white.r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn clamped_handles_out_of_range() {
        let c = Color::rgba(2.0, -1.0, f32::NAN, 0.5).clamped();
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.0, 0.5));
    }
}
