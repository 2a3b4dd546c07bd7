//! Gallery configuration.
//!
//! Every field has a default matching the stock page, so an absent or partial
//! JSON document is valid. The browser layer reads the JSON from a
//! `<script type="application/json" id="gallery-config">` element.

use std::str::FromStr;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::geometry::MAX_PLANE_SEGMENTS;

/// Element id the browser layer looks up for a JSON config override.
pub const CONFIG_ELEMENT_ID: &str = "gallery-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    pub container_id: String,
    pub image_selector: String,
    pub scroll_selector: String,
    /// Font families that must be loaded before the gallery mounts.
    pub fonts: Vec<String>,
    /// Optional shared texture bound as `oceanTexture` on every image material.
    pub overlay_texture: Option<String>,
    /// Fixed clock increment per tick (not wall-clock delta).
    pub time_step: f32,
    pub camera_distance: f32,
    pub near: f32,
    pub far: f32,
    pub max_pixel_ratio: f64,
    pub plane_segments: u32,
    pub scroll_ease: f32,
    pub speed_clamp: f32,
    pub speed_smoothing: f32,
    /// Seconds for the hover-state tween.
    pub hover_duration: f32,
    pub distortion: DistortionConfig,
    /// Render through the post-process composer instead of straight to screen.
    pub post_processing: bool,
    pub error_policy: ErrorPolicy,
    pub asset_timeout_ms: Option<u32>,
    pub requery_layout_on_resize: bool,
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistortionConfig {
    pub falloff_start: f32,
    pub falloff_power: f32,
    pub skew: f32,
    pub speed_gain: f32,
}

/// What the render loop does when a tick fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the loop on the first error.
    #[default]
    Fatal,
    /// Log the error and carry on with the next frame.
    SkipTick,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            container_id: "container".into(),
            image_selector: "img".into(),
            scroll_selector: "[data-scroll]".into(),
            fonts: vec!["Open Sans".into(), "Playfair Display".into()],
            overlay_texture: None,
            time_step: 0.05,
            camera_distance: 600.0,
            near: 100.0,
            far: 2000.0,
            max_pixel_ratio: 2.0,
            plane_segments: 10,
            scroll_ease: 0.1,
            speed_clamp: 200.0,
            speed_smoothing: 0.2,
            hover_duration: 1.0,
            distortion: DistortionConfig::default(),
            post_processing: true,
            error_policy: ErrorPolicy::Fatal,
            asset_timeout_ms: None,
            requery_layout_on_resize: false,
            log_level: "info".into(),
        }
    }
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self {
            falloff_start: 0.4,
            falloff_power: 4.0,
            skew: 0.04,
            speed_gain: 0.0,
        }
    }
}

impl GalleryConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    pub fn from_json(src: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(src).context("malformed gallery config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.time_step > 0.0) {
            bail!("time_step must be positive, got {}", self.time_step);
        }
        if !(self.scroll_ease > 0.0 && self.scroll_ease <= 1.0) {
            bail!("scroll_ease must be in (0, 1], got {}", self.scroll_ease);
        }
        if !(self.speed_smoothing > 0.0 && self.speed_smoothing <= 1.0) {
            bail!("speed_smoothing must be in (0, 1], got {}", self.speed_smoothing);
        }
        if !(self.speed_clamp > 0.0) {
            bail!("speed_clamp must be positive, got {}", self.speed_clamp);
        }
        if !(self.hover_duration > 0.0) {
            bail!("hover_duration must be positive, got {}", self.hover_duration);
        }
        if !(self.near > 0.0 && self.near < self.far) {
            bail!("camera planes must satisfy 0 < near < far, got {}..{}", self.near, self.far);
        }
        if !(self.camera_distance > 0.0) {
            bail!("camera_distance must be positive, got {}", self.camera_distance);
        }
        if !(self.max_pixel_ratio > 0.0) {
            bail!("max_pixel_ratio must be positive, got {}", self.max_pixel_ratio);
        }
        if !(1..=MAX_PLANE_SEGMENTS).contains(&self.plane_segments) {
            bail!(
                "plane_segments must be in 1..={MAX_PLANE_SEGMENTS}, got {}",
                self.plane_segments
            );
        }
        if !(self.distortion.falloff_start > 0.0) {
            bail!("distortion.falloff_start must be positive");
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> anyhow::Result<log::Level> {
        log::Level::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GalleryConfig::from_json("{}").unwrap();
        assert_eq!(config, GalleryConfig::default());
        assert_eq!(config.container_id, "container");
        assert_eq!(config.fonts, ["Open Sans", "Playfair Display"]);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = GalleryConfig::from_json(
            r#"{ "time_step": 0.1, "distortion": { "speed_gain": 0.02 }, "error_policy": "skip_tick" }"#,
        )
        .unwrap();
        assert_eq!(config.time_step, 0.1);
        assert_eq!(config.distortion.speed_gain, 0.02);
        assert_eq!(config.distortion.skew, 0.04);
        assert_eq!(config.error_policy, ErrorPolicy::SkipTick);
        assert!(config.post_processing);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(GalleryConfig::from_json(r#"{ "time_step": 0 }"#).is_err());
        assert!(GalleryConfig::from_json(r#"{ "scroll_ease": 1.5 }"#).is_err());
        assert!(GalleryConfig::from_json(r#"{ "near": 3000 }"#).is_err());
        assert!(GalleryConfig::from_json(r#"{ "plane_segments": 0 }"#).is_err());
        assert!(GalleryConfig::from_json(r#"{ "plane_segments": 300 }"#).is_err());
        assert!(GalleryConfig::from_json(r#"{ "plane_segments": 255 }"#).is_ok());
        assert!(GalleryConfig::from_json(r#"{ "log_level": "loud" }"#).is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(GalleryConfig::from_json(r#"{ "colour": "red" }"#).is_err());
    }

    #[test]
    fn level_parses_case_insensitively() {
        let config = GalleryConfig { log_level: "DEBUG".into(), ..Default::default() };
        assert_eq!(config.level().unwrap(), log::Level::Debug);
    }
}
