//! DOM layout to world space.
//!
//! The camera is fitted so one world unit is one CSS pixel at z = 0, with the
//! origin at the viewport centre and +y pointing up. DOM coordinates have the
//! origin top-left and +y pointing down, so every mapping here flips y.

use glam::Vec2;

use crate::registry::TrackedImage;

/// Size of the container the canvas fills, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Pointer position in CSS pixels to normalized device coordinates.
    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(x / self.width * 2.0 - 1.0, -(y / self.height) * 2.0 + 1.0)
    }
}

/// Document-space rectangle of a source image, captured at scroll offset 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self { top, left, width, height }
    }

    /// World-space centre of this box for the given scroll offset.
    ///
    /// Scrolling down (growing `scroll`) moves content up in world space.
    #[inline]
    pub fn world_center(&self, scroll: f32, viewport: Viewport) -> Vec2 {
        Vec2::new(
            self.left - viewport.width / 2.0 + self.width / 2.0,
            scroll - self.top + viewport.height / 2.0 - self.height / 2.0,
        )
    }
}

/// Recompute every tracked mesh position from scratch.
pub fn sync_positions(images: &mut [TrackedImage], scroll: f32, viewport: Viewport) {
    for image in images {
        let center = image.bounds.world_center(scroll, viewport);
        image.mesh.position.x = center.x;
        image.mesh.position.y = center.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ImageMaterial, TrackedImage};

    fn tracked(bounds: BoundingBox) -> TrackedImage {
        TrackedImage::new(bounds, ImageMaterial::default())
    }

    #[test]
    fn reference_layout_at_rest() {
        let viewport = Viewport::new(800.0, 600.0);
        let mut images = [tracked(BoundingBox::new(100.0, 50.0, 200.0, 150.0))];
        sync_positions(&mut images, 0.0, viewport);
        assert_eq!(images[0].mesh.position.x, -250.0);
        assert_eq!(images[0].mesh.position.y, 125.0);
    }

    #[test]
    fn scrolling_down_moves_content_up() {
        let viewport = Viewport::new(800.0, 600.0);
        let bounds = BoundingBox::new(100.0, 50.0, 200.0, 150.0);
        let rest = bounds.world_center(0.0, viewport);
        let scrolled = bounds.world_center(40.0, viewport);
        assert_eq!(scrolled.y - rest.y, 40.0);
        assert_eq!(scrolled.x, rest.x);
    }

    #[test]
    fn x_is_independent_of_scroll_and_history() {
        let viewport = Viewport::new(1024.0, 768.0);
        let bounds = BoundingBox::new(12.0, 300.0, 128.0, 64.0);
        let mut images = [tracked(bounds)];
        for scroll in [0.0, 512.5, -3.0, 90.25] {
            sync_positions(&mut images, scroll, viewport);
            assert_eq!(images[0].mesh.position.x, 300.0 - 512.0 + 64.0);
        }
    }

    #[test]
    fn ndc_corners() {
        let viewport = Viewport::new(800.0, 600.0);
        assert_eq!(viewport.to_ndc(0.0, 0.0), Vec2::new(-1.0, 1.0));
        assert_eq!(viewport.to_ndc(800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(viewport.to_ndc(400.0, 300.0), Vec2::ZERO);
    }
}
