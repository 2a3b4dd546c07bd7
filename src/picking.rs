//! Pointer picking against tracked planes.

use glam::Vec2;

use crate::camera::{Camera, Ray};
use crate::registry::MeshRegistry;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub uv: Vec2,
    pub distance: f32,
}

/// Nearest plane hit by `ray`. Planes are unit quads in z = 0, double sided,
/// scaled by their mesh transform; uv (0, 0) is the bottom-left corner.
/// Equal distances keep the earlier registry entry.
pub fn intersect(registry: &MeshRegistry, ray: &Ray) -> Option<Hit> {
    let mut nearest: Option<Hit> = None;
    for (index, image) in registry.images().iter().enumerate() {
        let mesh = &image.mesh;
        if ray.direction.z.abs() < f32::EPSILON {
            continue;
        }
        let t = (mesh.position.z - ray.origin.z) / ray.direction.z;
        if t < 0.0 {
            continue;
        }
        let point = ray.at(t);
        let local = Vec2::new(
            (point.x - mesh.position.x) / mesh.scale.x,
            (point.y - mesh.position.y) / mesh.scale.y,
        );
        if local.x.abs() > 0.5 || local.y.abs() > 0.5 {
            continue;
        }
        let distance = t * ray.direction.length();
        if nearest.map_or(true, |n| distance < n.distance) {
            nearest = Some(Hit { index, uv: local + Vec2::splat(0.5), distance });
        }
    }
    nearest
}

/// Cast from the camera through `ndc` and write the hit uv into that
/// mesh's hover uniform. Misses leave every material untouched.
pub fn apply_pointer(registry: &mut MeshRegistry, camera: &Camera, ndc: Vec2) -> Option<Hit> {
    let hit = intersect(registry, &camera.ray(ndc))?;
    registry.set_hover(hit.index, hit.uv);
    Some(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{sync_positions, BoundingBox, Viewport};
    use crate::registry::{ImageMaterial, NEUTRAL_HOVER};

    fn scene(boxes: &[BoundingBox]) -> (MeshRegistry, Camera, Viewport) {
        let viewport = Viewport::new(800.0, 600.0);
        let mut registry = MeshRegistry::from_bounds(boxes.iter().copied(), ImageMaterial::default());
        sync_positions(registry.images_mut(), 0.0, viewport);
        (registry, Camera::new(600.0, 100.0, 2000.0, viewport), viewport)
    }

    #[test]
    fn centre_of_plane_is_half_uv() {
        let (mut registry, camera, viewport) = scene(&[BoundingBox::new(100.0, 50.0, 200.0, 150.0)]);
        let ndc = viewport.to_ndc(150.0, 175.0);
        let hit = apply_pointer(&mut registry, &camera, ndc).expect("hit");
        assert_eq!(hit.index, 0);
        assert!((hit.uv - NEUTRAL_HOVER).length() < 1e-3, "{:?}", hit.uv);
    }

    #[test]
    fn uv_origin_is_bottom_left() {
        let (registry, camera, viewport) = scene(&[BoundingBox::new(100.0, 50.0, 200.0, 150.0)]);
        // near the DOM top-left corner -> u small, v large
        let hit = intersect(&registry, &camera.ray(viewport.to_ndc(60.0, 110.0))).unwrap();
        assert!(hit.uv.x < 0.1 && hit.uv.y > 0.9, "{:?}", hit.uv);
    }

    #[test]
    fn miss_leaves_hover_neutral() {
        let (mut registry, camera, viewport) = scene(&[BoundingBox::new(100.0, 50.0, 200.0, 150.0)]);
        assert!(apply_pointer(&mut registry, &camera, viewport.to_ndc(700.0, 500.0)).is_none());
        assert_eq!(registry.images()[0].material.hover, NEUTRAL_HOVER);
    }

    #[test]
    fn only_the_hit_plane_is_written() {
        let (mut registry, camera, viewport) = scene(&[
            BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            BoundingBox::new(0.0, 400.0, 100.0, 100.0),
        ]);
        let hit = apply_pointer(&mut registry, &camera, viewport.to_ndc(425.0, 50.0)).unwrap();
        assert_eq!(hit.index, 1);
        assert_eq!(registry.images()[0].material.hover, NEUTRAL_HOVER);
        assert!((registry.images()[1].material.hover.x - 0.25).abs() < 1e-2);
    }
}
