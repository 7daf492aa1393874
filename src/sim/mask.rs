//! Pixel coverage masks for overlap testing
//!
//! Collision detection only needs one capability from a shape: how many
//! pixels it shares with another shape at a given integer offset. Anything
//! implementing [`ShapeMask`] can take part; [`BitMask`] is the bitmap
//! implementation built from sprite silhouettes.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::MaskSizeError;

/// Alpha values above this count as solid (matches common sprite tooling)
pub const ALPHA_THRESHOLD: u8 = 127;

/// Overlap-area query capability
pub trait ShapeMask {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Whether the pixel at (x, y) is solid. Out of range is never solid.
    fn get(&self, x: i32, y: i32) -> bool;

    /// Number of solid pixels shared with `other` when `other`'s top-left
    /// corner sits at `offset` in this mask's coordinates.
    fn overlap_area(&self, other: &dyn ShapeMask, offset: IVec2) -> i32 {
        let x0 = offset.x.max(0);
        let y0 = offset.y.max(0);
        let x1 = self.width().min(offset.x + other.width());
        let y1 = self.height().min(offset.y + other.height());
        if x0 >= x1 || y0 >= y1 {
            return 0;
        }

        let mut area = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                if self.get(x, y) && other.get(x - offset.x, y - offset.y) {
                    area += 1;
                }
            }
        }
        area
    }
}

/// Row-major bitmap mask
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawBitMask")]
pub struct BitMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

/// Unchecked wire form of [`BitMask`]
#[derive(Deserialize)]
struct RawBitMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl TryFrom<RawBitMask> for BitMask {
    type Error = MaskSizeError;

    fn try_from(raw: RawBitMask) -> Result<Self, Self::Error> {
        if raw.bits.len() != pixel_count(raw.width, raw.height) {
            return Err(MaskSizeError {
                width: raw.width,
                height: raw.height,
                len: raw.bits.len(),
            });
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            bits: raw.bits,
        })
    }
}

#[inline]
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl BitMask {
    /// Empty mask of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; pixel_count(width, height)],
        }
    }

    /// Fully solid rectangle
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; pixel_count(width, height)],
        }
    }

    /// Solid disc inscribed in a `diameter` square
    pub fn disc(diameter: u32) -> Self {
        let mut mask = Self::new(diameter, diameter);
        let r = diameter as f64 / 2.0;
        for y in 0..diameter {
            for x in 0..diameter {
                let dx = x as f64 + 0.5 - r;
                let dy = y as f64 + 0.5 - r;
                if dx * dx + dy * dy <= r * r {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Isosceles hull with its apex at the top centre (sprites face up)
    pub fn triangle(width: u32, height: u32) -> Self {
        let mut mask = Self::new(width, height);
        let half = width as f64 / 2.0;
        for y in 0..height {
            // Half-width grows linearly from apex to base
            let spread = half * (y as f64 + 1.0) / height as f64;
            for x in 0..width {
                if (x as f64 + 0.5 - half).abs() <= spread {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Build from ASCII rows; `#` is solid, anything else is empty
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut mask = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.bytes().enumerate() {
                if ch == b'#' {
                    mask.set(x as u32, y as u32, true);
                }
            }
        }
        mask
    }

    /// Build from a row-major alpha channel supplied by the asset loader.
    /// Missing trailing samples are treated as transparent.
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8]) -> Self {
        let mut mask = Self::new(width, height);
        for (i, bit) in mask.bits.iter_mut().enumerate() {
            *bit = alpha.get(i).is_some_and(|&a| a > ALPHA_THRESHOLD);
        }
        mask
    }

    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width as i32, self.height as i32)
    }

    pub fn set(&mut self, x: u32, y: u32, solid: bool) {
        if x < self.width && y < self.height {
            let index = y as usize * self.width as usize + x as usize;
            if let Some(bit) = self.bits.get_mut(index) {
                *bit = solid;
            }
        }
    }

    /// Clear every pixel, keeping the size
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|b| *b = false);
    }

    /// Number of solid pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    /// Nearest-neighbour resample to a new size
    pub fn scaled(&self, width: u32, height: u32) -> Self {
        let mut out = Self::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let sy = ((y as f64 + 0.5) * self.height as f64 / height as f64) as u32;
            for x in 0..width {
                let sx = ((x as f64 + 0.5) * self.width as f64 / width as f64) as u32;
                if self.get(sx as i32, sy as i32) {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    /// Shrink by a zoom divisor (integer-truncated like the sprite scaler)
    pub fn zoomed(&self, zoom: f64) -> Self {
        let width = (self.width as f64 / zoom).floor() as u32;
        let height = (self.height as f64 / zoom).floor() as u32;
        self.scaled(width, height)
    }

    /// Rotate counterclockwise on screen by `degrees`.
    ///
    /// The result grows to the bounding box of the rotated rectangle, the
    /// same way sprite rotation does, so masks stay aligned with images.
    pub fn rotated(&self, degrees: f64) -> Self {
        if degrees.rem_euclid(360.0) == 0.0 {
            return self.clone();
        }
        let (s, c) = degrees.to_radians().sin_cos();
        let (w, h) = (self.width as f64, self.height as f64);
        let new_w = (w * c.abs() + h * s.abs() - 1e-9).ceil().max(0.0) as u32;
        let new_h = (w * s.abs() + h * c.abs() - 1e-9).ceil().max(0.0) as u32;

        let mut out = Self::new(new_w, new_h);
        for y in 0..new_h {
            let ry = y as f64 + 0.5 - new_h as f64 / 2.0;
            for x in 0..new_w {
                let rx = x as f64 + 0.5 - new_w as f64 / 2.0;
                // Inverse of (x c + y s, -x s + y c)
                let sx = rx * c - ry * s + w / 2.0;
                let sy = rx * s + ry * c + h / 2.0;
                if sx >= 0.0 && sy >= 0.0 && self.get(sx as i32, sy as i32) {
                    out.set(x, y, true);
                }
            }
        }
        out
    }
}

impl ShapeMask for BitMask {
    fn width(&self) -> i32 {
        self.width as i32
    }

    fn height(&self) -> i32 {
        self.height as i32
    }

    #[inline]
    fn get(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.bits.get(index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_area_counts_shared_pixels() {
        let a = BitMask::filled(10, 10);
        let b = BitMask::filled(10, 10);
        assert_eq!(a.overlap_area(&b, IVec2::new(0, 0)), 100);
        assert_eq!(a.overlap_area(&b, IVec2::new(7, 0)), 30);
        assert_eq!(a.overlap_area(&b, IVec2::new(-7, 8)), 3 * 2);
        assert_eq!(a.overlap_area(&b, IVec2::new(10, 0)), 0);
    }

    #[test]
    fn test_overlap_respects_shape() {
        let a = BitMask::from_rows(&["#.", ".#"]);
        let b = BitMask::from_rows(&["#"]);
        assert_eq!(a.overlap_area(&b, IVec2::new(0, 0)), 1);
        assert_eq!(a.overlap_area(&b, IVec2::new(1, 0)), 0);
        assert_eq!(a.overlap_area(&b, IVec2::new(1, 1)), 1);
    }

    #[test]
    fn test_rotate_quarter_turn_swaps_dimensions() {
        let bar = BitMask::filled(8, 2);
        let turned = bar.rotated(90.0);
        assert_eq!(turned.size(), IVec2::new(2, 8));
        assert_eq!(turned.count(), 16);
    }

    #[test]
    fn test_rotate_half_turn_flips_apex() {
        let hull = BitMask::triangle(9, 9);
        assert!(hull.get(4, 0));
        assert!(!hull.get(0, 0));
        let flipped = hull.rotated(180.0);
        assert!(flipped.get(4, 8));
        assert!(!flipped.get(0, 8));
    }

    #[test]
    fn test_rotate_counterclockwise_on_screen() {
        // A pixel on the right edge moves to the top edge
        let mut mask = BitMask::new(5, 5);
        mask.set(4, 2, true);
        let turned = mask.rotated(90.0);
        assert!(turned.get(2, 0));
    }

    #[test]
    fn test_zoomed_truncates_size() {
        let hull = BitMask::filled(50, 30);
        assert_eq!(hull.zoomed(4.0).size(), IVec2::new(12, 7));
        assert_eq!(hull.zoomed(1.0).size(), IVec2::new(50, 30));
    }

    #[test]
    fn test_from_alpha_threshold() {
        let mask = BitMask::from_alpha(3, 1, &[0, 127, 128]);
        assert!(!mask.get(0, 0));
        assert!(!mask.get(1, 0));
        assert!(mask.get(2, 0));
    }

    #[test]
    fn test_clear_keeps_size() {
        let mut mask = BitMask::disc(6);
        assert!(!mask.is_empty());
        mask.clear();
        assert!(mask.is_empty());
        assert_eq!(mask.size(), IVec2::new(6, 6));
    }

    #[test]
    fn test_deserialize_rejects_short_bits() {
        let err = serde_json::from_str::<BitMask>(r#"{"width": 3, "height": 2, "bits": [true]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("3x2 but carries 1 pixels"));

        let ok: BitMask =
            serde_json::from_str(r#"{"width": 2, "height": 1, "bits": [true, false]}"#).unwrap();
        assert_eq!(ok.count(), 1);
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(
            w1 in 1u32..12, h1 in 1u32..12,
            w2 in 1u32..12, h2 in 1u32..12,
            ox in -14i32..14, oy in -14i32..14,
        ) {
            let a = BitMask::triangle(w1, h1);
            let b = BitMask::disc(w2.min(h2));
            let forward = a.overlap_area(&b, IVec2::new(ox, oy));
            let backward = b.overlap_area(&a, IVec2::new(-ox, -oy));
            prop_assert_eq!(forward, backward);
        }
    }
}
