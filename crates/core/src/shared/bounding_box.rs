use serde::{Deserialize, Serialize};

/// Axis-aligned face box in pixel coordinates, `[x1, y1, x2, y2)`.
///
/// Serialized as a four-element array, the layout detectors emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Pixel window of a [`BoundingBox`] clipped to image bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClippedRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Saturates at the `i32` range for extreme coordinates.
    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Intersection with a `width` x `height` image, or `None` when the box
    /// lies entirely outside it or is degenerate.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<ClippedRect> {
        let x1 = self.x1.clamp(0, width as i32);
        let y1 = self.y1.clamp(0, height as i32);
        let x2 = self.x2.clamp(0, width as i32);
        let y2 = self.y2.clamp(0, height as i32);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(ClippedRect {
            x: x1 as usize,
            y: y1 as usize,
            w: (x2 - x1) as usize,
            h: (y2 - y1) as usize,
        })
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from(v: [i32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_width_and_height() {
        let b = BoundingBox::new(10, 20, 50, 100);
        assert_eq!(b.width(), 40);
        assert_eq!(b.height(), 80);
    }

    #[test]
    fn test_extreme_coordinates_saturate() {
        let b = BoundingBox::from([i32::MIN, 0, i32::MAX, 10]);
        assert_eq!(b.width(), i32::MAX);
        assert_eq!(b.height(), 10);
        assert_eq!(BoundingBox::new(i32::MAX, 0, i32::MIN, 0).width(), i32::MIN);
    }

    #[test]
    fn test_clip_inside_is_unchanged() {
        let b = BoundingBox::new(10, 10, 30, 40);
        assert_eq!(
            b.clip_to(100, 100),
            Some(ClippedRect { x: 10, y: 10, w: 20, h: 30 })
        );
    }

    #[test]
    fn test_clip_partially_outside() {
        let b = BoundingBox::new(-10, 90, 20, 130);
        assert_eq!(
            b.clip_to(100, 100),
            Some(ClippedRect { x: 0, y: 90, w: 20, h: 10 })
        );
    }

    #[rstest]
    #[case::right_of_image(BoundingBox::new(150, 10, 200, 50))]
    #[case::above_image(BoundingBox::new(10, -80, 50, -10))]
    #[case::inverted(BoundingBox::new(50, 50, 10, 10))]
    #[case::zero_width(BoundingBox::new(20, 20, 20, 60))]
    fn test_clip_empty_returns_none(#[case] b: BoundingBox) {
        assert_eq!(b.clip_to(100, 100), None);
    }

    #[test]
    fn test_serializes_as_array() {
        let b = BoundingBox::new(1, 2, 3, 4);
        assert_eq!(serde_json::to_string(&b).unwrap(), "[1,2,3,4]");
        let back: BoundingBox = serde_json::from_str("[1,2,3,4]").unwrap();
        assert_eq!(back, b);
    }
}
