#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Scroll-driven WebGL image gallery.
//!
//! Page `<img>` elements are mirrored as textured planes in a WebGL2 scene
//! that tracks a smoothed page scroll, with a hover distortion per image and
//! a screen-space distortion pass on top. Everything except the `wasm`
//! module is target independent.

pub mod camera;
pub mod config;
pub mod gallery;
pub mod gate;
pub mod geometry;
pub mod layout;
pub mod picking;
pub mod postprocess;
pub mod registry;
pub mod scheduler;
pub mod scroll;
pub mod tween;

pub use config::GalleryConfig;
pub use gallery::Gallery;
pub use scheduler::{Renderer, Scheduler, StopToken, TickOutcome};

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
#[doc(hidden)]
pub use wasm::read_config;
