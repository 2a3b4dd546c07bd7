//! Screen-space distortion pass parameters.
//!
//! The composer renders the scene into an offscreen colour buffer, then draws
//! a fullscreen quad that resamples it with a horizontal pinch toward the
//! centre, strongest at the bottom edge and fading out at `falloff_start`.

use glam::Vec2;

use crate::config::DistortionConfig;

pub const POST_VERTEX_SHADER: &str = r#"#version 300 es
in vec2 position;
out vec2 vUv;

void main() {
    vUv = position * 0.5 + 0.5;
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;

pub const POST_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

uniform sampler2D colorBuffer;
uniform float scrollSpeed;
uniform float time;
uniform float falloffStart;
uniform float falloffPower;
uniform float skew;
uniform float speedGain;

in vec2 vUv;
out vec4 fragColor;

void main() {
    vec2 newUV = vUv;
    float area = smoothstep(falloffStart, 0.0, vUv.y);
    area = pow(area, falloffPower);
    newUV.x -= (vUv.x - 0.5) * (skew + speedGain * scrollSpeed) * area;
    fragColor = texture(colorBuffer, newUV);
}
"#;

/// Caller-set uniforms of the distortion pass. `colorBuffer` is bound by
/// the composer itself.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PostUniforms {
    pub scroll_speed: f32,
    pub time: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistortionParams {
    pub falloff_start: f32,
    pub falloff_power: f32,
    pub skew: f32,
    pub speed_gain: f32,
}

impl From<DistortionConfig> for DistortionParams {
    fn from(c: DistortionConfig) -> Self {
        Self {
            falloff_start: c.falloff_start,
            falloff_power: c.falloff_power,
            skew: c.skew,
            speed_gain: c.speed_gain,
        }
    }
}

impl Default for DistortionParams {
    fn default() -> Self {
        DistortionConfig::default().into()
    }
}

/// GLSL `smoothstep`, including the reversed-edge form used by the pass.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl DistortionParams {
    pub fn falloff(&self, y: f32) -> f32 {
        smoothstep(self.falloff_start, 0.0, y).powf(self.falloff_power)
    }

    pub fn effective_skew(&self, scroll_speed: f32) -> f32 {
        self.skew + self.speed_gain * scroll_speed
    }

    /// CPU mirror of the fragment shader's sample coordinate.
    pub fn sample_uv(&self, uv: Vec2, uniforms: &PostUniforms) -> Vec2 {
        let area = self.falloff(uv.y);
        Vec2::new(uv.x - (uv.x - 0.5) * self.effective_skew(uniforms.scroll_speed) * area, uv.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_above_falloff() {
        let params = DistortionParams::default();
        let uniforms = PostUniforms { scroll_speed: 0.8, time: 3.0 };
        for y in [0.4, 0.5, 0.75, 1.0] {
            for x in [0.0, 0.2, 0.5, 0.9, 1.0] {
                let uv = Vec2::new(x, y);
                assert_eq!(params.sample_uv(uv, &uniforms), uv);
            }
        }
    }

    #[test]
    fn pulls_toward_centre_near_bottom() {
        let params = DistortionParams::default();
        let uniforms = PostUniforms::default();
        let mut previous = 0.0;
        for y in [0.3, 0.2, 0.1, 0.0] {
            let left = params.sample_uv(Vec2::new(0.1, y), &uniforms);
            let right = params.sample_uv(Vec2::new(0.9, y), &uniforms);
            assert!(left.x > 0.1 && right.x < 0.9);
            let shift = left.x - 0.1;
            assert!(shift > previous, "shift should grow as y falls");
            previous = shift;
        }
        assert!((previous - 0.4 * 0.04).abs() < 1e-6);
    }

    #[test]
    fn centre_column_never_moves() {
        let params = DistortionParams::default();
        let uv = Vec2::new(0.5, 0.0);
        assert_eq!(params.sample_uv(uv, &PostUniforms::default()), uv);
    }

    #[test]
    fn scroll_speed_ignored_by_default() {
        let params = DistortionParams::default();
        let uv = Vec2::new(0.2, 0.05);
        let slow = params.sample_uv(uv, &PostUniforms { scroll_speed: 0.0, time: 0.0 });
        let fast = params.sample_uv(uv, &PostUniforms { scroll_speed: 1.0, time: 0.0 });
        assert_eq!(slow, fast);
    }

    #[test]
    fn speed_gain_scales_skew() {
        let params = DistortionParams { speed_gain: 0.1, ..Default::default() };
        assert!((params.effective_skew(0.5) - 0.09).abs() < 1e-6);
    }
}
