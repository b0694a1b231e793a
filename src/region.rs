use serde::{Deserialize, Serialize};

/// Half-open pixel window (`left <= x < right`, `top <= y < bottom`) selected for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Region {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self { left, top, right, bottom }
    }

    /// The whole of a `width` x `height` image
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Shrink the region so every coordinate lies inside a `width` x `height` image
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let right = self.right.min(width);
        let bottom = self.bottom.min(height);
        Self {
            left: self.left.min(right),
            top: self.top.min(bottom),
            right,
            bottom,
        }
    }
}

/// Requested focus window, resolved against each frame once its size is known.
///
/// A zero `width` or `height` means the full image extent. When origin plus
/// extent would overrun the image the extent wins and the origin is pulled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FocusSpec {
    pub x_origin: u32,
    pub y_origin: u32,
    pub width: u32,
    pub height: u32,
}

impl FocusSpec {
    pub fn resolve(&self, image_width: u32, image_height: u32) -> Region {
        let (left, width) = resolve_axis(self.x_origin, self.width, image_width);
        let (top, height) = resolve_axis(self.y_origin, self.height, image_height);
        Region::new(left, top, left + width, top + height)
    }
}

fn resolve_axis(origin: u32, extent: u32, bound: u32) -> (u32, u32) {
    let extent = if extent == 0 { bound } else { extent.min(bound) };
    (origin.min(bound - extent), extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_focus_covers_whole_image() {
        let focus = FocusSpec::default();
        assert_eq!(focus.resolve(1920, 1080), Region::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_focus_within_bounds_is_kept() {
        let focus = FocusSpec { x_origin: 10, y_origin: 5, width: 20, height: 8 };
        assert_eq!(focus.resolve(100, 50), Region::new(10, 5, 30, 13));
    }

    #[test]
    fn test_width_takes_precedence_over_origin() {
        let focus = FocusSpec { x_origin: 50, y_origin: 40, width: 80, height: 30 };
        assert_eq!(focus.resolve(100, 50), Region::new(20, 20, 100, 50));
    }

    #[test]
    fn test_oversized_extent_is_capped() {
        let focus = FocusSpec { x_origin: 7, y_origin: 3, width: 500, height: 0 };
        assert_eq!(focus.resolve(100, 50), Region::new(0, 0, 100, 50));
    }

    #[test]
    fn test_focus_on_empty_image() {
        let focus = FocusSpec { x_origin: 4, y_origin: 4, width: 2, height: 2 };
        let region = focus.resolve(0, 0);
        assert!(region.is_empty());
    }

    #[test]
    fn test_clamp_to_bounds() {
        let region = Region::new(5, 5, 300, 200).clamp_to(100, 50);
        assert_eq!(region, Region::new(5, 5, 100, 50));

        let outside = Region::new(150, 60, 300, 200).clamp_to(100, 50);
        assert_eq!(outside, Region::new(100, 50, 100, 50));
        assert!(outside.is_empty());
    }

    #[test]
    fn test_inverted_region_is_empty() {
        assert!(Region::new(10, 0, 5, 10).is_empty());
        assert!(Region::new(0, 10, 10, 10).is_empty());
        assert_eq!(Region::new(10, 0, 5, 10).width(), 0);
    }
}
