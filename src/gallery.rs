//! Application context shared by the scheduler and event handlers.

use crate::camera::Camera;
use crate::config::GalleryConfig;
use crate::layout::{sync_positions, BoundingBox, Viewport};
use crate::picking::{apply_pointer, Hit};
use crate::postprocess::{DistortionParams, PostUniforms};
use crate::registry::{ImageMaterial, MeshRegistry};
use crate::scroll::ScrollState;

pub struct Gallery {
    pub viewport: Viewport,
    pub camera: Camera,
    pub registry: MeshRegistry,
    pub scroll: ScrollState,
    pub post: PostUniforms,
    pub distortion: DistortionParams,
    hover_duration: f32,
}

impl Gallery {
    /// Build the registry from a layout snapshot and place every mesh for
    /// scroll offset 0.
    pub fn new(config: &GalleryConfig, viewport: Viewport, bounds: Vec<BoundingBox>) -> Self {
        let mut gallery = Self {
            viewport,
            camera: Camera::new(config.camera_distance, config.near, config.far, viewport),
            registry: MeshRegistry::from_bounds(bounds, ImageMaterial::default()),
            scroll: ScrollState::default(),
            post: PostUniforms::default(),
            distortion: config.distortion.into(),
            hover_duration: config.hover_duration,
        };
        gallery.sync_positions();
        gallery
    }

    pub fn sync_positions(&mut self) {
        sync_positions(self.registry.images_mut(), self.scroll.current, self.viewport);
    }

    /// New container size: refit the camera and re-place meshes.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.fit(viewport);
        self.sync_positions();
    }

    /// Pointer position in container pixels.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Option<Hit> {
        let ndc = self.viewport.to_ndc(x, y);
        apply_pointer(&mut self.registry, &self.camera, ndc)
    }

    pub fn hover_enter(&mut self, index: usize) {
        self.registry.begin_hover_tween(index, 1.0, self.hover_duration);
    }

    pub fn hover_exit(&mut self, index: usize) {
        self.registry.begin_hover_tween(index, 0.0, self.hover_duration);
    }
}
