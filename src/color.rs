// Pitch palette and the small amount of color math the grid needs.

use crate::shared::NUM_PITCHES;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn to_u8(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

// h, s, v all in 0..=1
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

// C D E F G A B
pub const PITCH_COLORS: [Rgb; NUM_PITCHES] = [
    Rgb::from_u8(118, 0, 0),     // red
    Rgb::from_u8(220, 88, 40),   // orange
    Rgb::from_u8(255, 255, 81),  // yellow
    Rgb::from_u8(17, 109, 81),   // green
    Rgb::from_u8(22, 88, 235),   // blue
    Rgb::from_u8(128, 0, 128),   // purple
    Rgb::from_u8(255, 155, 190), // pink
];

/// Hue that stands in for a pitch class on the cell's base color.
pub fn pitch_hue(pitch: u8) -> f32 {
    debug_assert!((pitch as usize) < NUM_PITCHES, "pitch {pitch} out of range");
    let idx = (pitch as usize).min(NUM_PITCHES - 1);
    rgb_to_hsv(PITCH_COLORS[idx]).h
}

pub fn rgb_to_hsv(c: Rgb) -> Hsv {
    let max = c.r.max(c.g).max(c.b);
    let min = c.r.min(c.g).min(c.b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == c.r {
        ((c.g - c.b) / delta).rem_euclid(6.0) / 6.0
    } else if max == c.g {
        ((c.b - c.r) / delta + 2.0) / 6.0
    } else {
        ((c.r - c.g) / delta + 4.0) / 6.0
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    Hsv { h, s, v: max }
}

pub fn hsv_to_rgb(c: Hsv) -> Rgb {
    let h = c.h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = c.v * (1.0 - c.s);
    let q = c.v * (1.0 - c.s * f);
    let t = c.v * (1.0 - c.s * (1.0 - f));
    let (r, g, b) = match sector as u32 {
        0 => (c.v, t, p),
        1 => (q, c.v, p),
        2 => (p, c.v, t),
        3 => (p, q, c.v),
        4 => (t, p, c.v),
        _ => (c.v, p, q),
    };
    Rgb { r, g, b }
}

/// Where `value` sits between `a` and `b`, clamped to 0..=1.
/// `a` may be greater than `b`, giving a falling ramp.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn primary_hues() {
        assert!(close(rgb_to_hsv(Rgb { r: 1.0, g: 0.0, b: 0.0 }).h, 0.0));
        assert!(close(rgb_to_hsv(Rgb { r: 0.0, g: 1.0, b: 0.0 }).h, 1.0 / 3.0));
        assert!(close(rgb_to_hsv(Rgb { r: 0.0, g: 0.0, b: 1.0 }).h, 2.0 / 3.0));
    }

    #[test]
    fn hsv_round_trips_palette() {
        for c in PITCH_COLORS {
            let back = hsv_to_rgb(rgb_to_hsv(c));
            assert!(close(back.r, c.r) && close(back.g, c.g) && close(back.b, c.b), "{c:?}");
        }
    }

    #[test]
    fn pitch_hues_are_distinct() {
        let hues: Vec<f32> = (0..NUM_PITCHES as u8).map(pitch_hue).collect();
        for (i, a) in hues.iter().enumerate() {
            for b in &hues[i + 1..] {
                assert!(!close(*a, *b));
            }
        }
    }

    #[test]
    fn inverse_lerp_falling_ramp() {
        assert_eq!(inverse_lerp(1.0, 0.0, 0.0), 1.0);
        assert_eq!(inverse_lerp(1.0, 0.0, 1.0), 0.0);
        assert!(close(inverse_lerp(1.0, 0.0, 0.25), 0.75));
        assert_eq!(inverse_lerp(0.0, 64.0, 128.0), 1.0);
        assert_eq!(inverse_lerp(3.0, 3.0, 3.0), 0.0);
    }
}
