// Gamma-correct color mixing with lookup tables instead of powf per pixel.
// Visual: anti-aliased stroke edges blend into the background without dark fringes.

use crate::types::Color;

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1)
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255), quantized to 4096 steps
    linear_to_srgb: [u8; 4096],
}

impl GammaLut {
    /// Build both tables once; the compositor keeps one for its whole life.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = i as f32 / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Lay `color` over the 0x00RRGGBB pixel `dst` with strength `coverage` (0..1),
    /// scaled again by the color's own alpha.
    #[inline]
    pub fn mix(&self, dst: u32, color: Color, coverage: f32) -> u32 {
        let a = coverage.clamp(0.0, 1.0) * (color.a as f32 / 255.0);
        if a <= 0.0 {
            return dst;
        }
        if a >= 1.0 {
            return color.to_pixel();
        }

        let inv = 1.0 - a;
        let channel = |shift: u32, src: u8| -> u32 {
            let d = self.srgb_u8_to_linear((dst >> shift) as u8);
            let s = self.srgb_u8_to_linear(src);
            (self.linear_to_srgb_u8(a * s + inv * d) as u32) << shift
        };
        channel(16, color.r) | channel(8, color.g) | channel(0, color.b)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tables_round_trip_endpoints() {
        let lut = GammaLut::new();
        assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(0)), 0);
        assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(255)), 255);
    }

    #[test]
    fn mix_extremes() {
        let lut = GammaLut::new();
        let bg = 0x00_10_20_30;
        assert_eq!(lut.mix(bg, Color::RED, 0.0), bg);
        assert_eq!(lut.mix(bg, Color::RED, 1.0), 0x00_FF_00_00);
        // translucent color never fully replaces the pixel
        let half = Color::rgba(0xFF, 0xFF, 0xFF, 128);
        let out = lut.mix(0, half, 1.0);
        assert!(out != 0 && out != 0x00_FF_FF_FF);
    }

    #[test]
    fn half_coverage_is_between() {
        let lut = GammaLut::new();
        let out = lut.mix(0x00_00_00_00, Color::WHITE, 0.5);
        let r = (out >> 16) & 0xFF;
        assert!(r > 0x80 && r < 0xFF, "linear-light mix of 50% white is brighter than 0x80, got {r:#x}");
    }
}
