//! Mesh registry: one tracked plane per source image.

use glam::{Vec2, Vec3};

use crate::layout::BoundingBox;
use crate::tween::Tween;

/// Neutral hover coordinate, the centre of the plane.
pub const NEUTRAL_HOVER: Vec2 = Vec2::new(0.5, 0.5);

/// Per-image shader uniforms. Cloned from a template for each image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageMaterial {
    pub time: f32,
    pub hover: Vec2,
    pub hover_state: f32,
}

impl Default for ImageMaterial {
    fn default() -> Self {
        Self { time: 0.0, hover: NEUTRAL_HOVER, hover_state: 0.0 }
    }
}

/// Transform of a unit plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mesh {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Mesh {
    pub fn model_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(self.scale, glam::Quat::IDENTITY, self.position)
    }
}

#[derive(Clone, Debug)]
pub struct TrackedImage {
    pub bounds: BoundingBox,
    pub material: ImageMaterial,
    pub mesh: Mesh,
    hover_tween: Option<Tween>,
}

impl TrackedImage {
    pub fn new(bounds: BoundingBox, material: ImageMaterial) -> Self {
        Self {
            bounds,
            material,
            mesh: Mesh {
                position: Vec3::ZERO,
                scale: Vec3::new(bounds.width, bounds.height, 1.0),
            },
            hover_tween: None,
        }
    }

    /// Replace the captured bounds; the plane is rescaled to match.
    pub fn set_bounds(&mut self, bounds: BoundingBox) {
        self.bounds = bounds;
        self.mesh.scale = Vec3::new(bounds.width, bounds.height, 1.0);
    }
}

#[derive(Clone, Debug, Default)]
pub struct MeshRegistry {
    images: Vec<TrackedImage>,
}

impl MeshRegistry {
    /// Build one entry per box, each with its own copy of `template`.
    pub fn from_bounds(bounds: impl IntoIterator<Item = BoundingBox>, template: ImageMaterial) -> Self {
        Self {
            images: bounds.into_iter().map(|b| TrackedImage::new(b, template)).collect(),
        }
    }

    pub fn images(&self) -> &[TrackedImage] {
        &self.images
    }

    pub fn images_mut(&mut self) -> &mut [TrackedImage] {
        &mut self.images
    }

    /// Write `time` into every material.
    pub fn push_time(&mut self, time: f32) {
        for image in &mut self.images {
            image.material.time = time;
        }
    }

    pub fn set_hover(&mut self, index: usize, uv: Vec2) {
        if let Some(image) = self.images.get_mut(index) {
            image.material.hover = uv;
        }
    }

    /// Start tweening `hoverState` of one image toward `target`.
    pub fn begin_hover_tween(&mut self, index: usize, target: f32, duration: f32) {
        if let Some(image) = self.images.get_mut(index) {
            image.hover_tween = Some(Tween::new(image.material.hover_state, target, duration));
        }
    }

    pub fn advance_tweens(&mut self, dt: f32) {
        for image in &mut self.images {
            if let Some(tween) = image.hover_tween.as_mut() {
                image.material.hover_state = tween.advance(dt);
                if tween.is_finished() {
                    image.hover_tween = None;
                }
            }
        }
    }

    /// Replace all boxes at once. Counts must match; the registry never grows or shrinks.
    pub fn requery(&mut self, bounds: &[BoundingBox]) -> anyhow::Result<()> {
        if bounds.len() != self.images.len() {
            anyhow::bail!(
                "layout re-query returned {} boxes for {} tracked images",
                bounds.len(),
                self.images.len()
            );
        }
        for (image, b) in self.images.iter_mut().zip(bounds) {
            image.set_bounds(*b);
        }
        Ok(())
    }
}
