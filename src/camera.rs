//! Pixel-fitted perspective camera and picking rays.

use glam::{Mat4, Vec2, Vec3};

use crate::layout::Viewport;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

impl Camera {
    pub fn new(distance: f32, near: f32, far: f32, viewport: Viewport) -> Self {
        let mut camera = Self {
            position: Vec3::new(0.0, 0.0, distance),
            fov: 0.0,
            aspect: 1.0,
            near,
            far,
        };
        camera.fit(viewport);
        camera
    }

    /// Fit aspect and fov so one world unit at z = 0 spans one CSS pixel.
    pub fn fit(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
        self.fov = 2.0 * ((viewport.height / 2.0) / self.position.z).atan().to_degrees();
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position - Vec3::Z, Vec3::Y)
    }

    /// Ray from the camera through a point in normalized device coordinates.
    /// The camera looks down -z with no rotation, so the ray is built from
    /// the frustum slope instead of inverting the projection.
    pub fn ray(&self, ndc: Vec2) -> Ray {
        let slope = (self.fov.to_radians() / 2.0).tan();
        let direction = Vec3::new(ndc.x * slope * self.aspect, ndc.y * slope, -1.0);
        Ray {
            origin: self.position,
            direction: direction.normalize(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fov_maps_pixels_to_units() {
        let camera = Camera::new(600.0, 100.0, 2000.0, Viewport::new(800.0, 600.0));
        let half = (camera.fov.to_radians() / 2.0).tan() * camera.position.z;
        assert!((half - 300.0).abs() < 1e-3);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn refit_on_resize() {
        let mut camera = Camera::new(600.0, 100.0, 2000.0, Viewport::new(800.0, 600.0));
        let before = camera.fov;
        camera.fit(Viewport::new(1600.0, 900.0));
        assert!(camera.fov > before);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn ray_agrees_with_projection() {
        let viewport = Viewport::new(800.0, 600.0);
        let camera = Camera::new(600.0, 100.0, 2000.0, viewport);
        let ray = camera.ray(Vec2::new(0.5, -0.25));
        let clip = camera.projection() * camera.view() * ray.at(900.0).extend(1.0);
        assert!((clip.x / clip.w - 0.5).abs() < 1e-4);
        assert!((clip.y / clip.w + 0.25).abs() < 1e-4);
    }

    #[test]
    fn corner_ray_hits_viewport_corner() {
        let viewport = Viewport::new(800.0, 600.0);
        let camera = Camera::new(600.0, 100.0, 2000.0, viewport);
        let ray = camera.ray(viewport.to_ndc(800.0, 0.0));
        let t = -ray.origin.z / ray.direction.z;
        let hit = ray.at(t);
        assert!((hit.x - 400.0).abs() < 0.05, "{hit:?}");
        assert!((hit.y - 300.0).abs() < 0.05, "{hit:?}");
    }
}
