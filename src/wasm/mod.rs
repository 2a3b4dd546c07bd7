use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::config::GalleryConfig;
use crate::gallery::Gallery;
use crate::scheduler::{Scheduler, StopToken};

mod assets;
mod dom;
mod gl;
mod input;
mod render;
mod shaders;

pub use dom::read_config;

thread_local! {
    static STOP: RefCell<Option<StopToken>> = const { RefCell::new(None) };
}

/// `JsValue` errors carry no `std::error::Error` impl; fold them into anyhow.
pub(crate) trait JsResultExt<T> {
    fn js_context(self, what: &str) -> anyhow::Result<T>;
}

impl<T> JsResultExt<T> for Result<T, JsValue> {
    fn js_context(self, what: &str) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{what}: {e:?}"))
    }
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{e:#}"))
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let config = dom::read_config(&document);
    let level = config.as_ref().ok().and_then(|c| c.level().ok()).unwrap_or(log::Level::Info);
    console_log::init_with_level(level).ok();
    let config = config.map_err(|e| {
        log::error!("gallery config rejected: {e:#}");
        to_js(e)
    })?;

    let stop = StopToken::new();
    STOP.with(|slot| *slot.borrow_mut() = Some(stop.clone()));

    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = mount(window, document, config, stop).await {
            log::error!("gallery setup failed: {e:#}");
        }
    });
    Ok(())
}

/// Stop the frame loop. The last drawn frame stays on screen.
#[wasm_bindgen]
pub fn stop() {
    STOP.with(|slot| {
        if let Some(token) = slot.borrow().as_ref() {
            token.stop();
        }
    });
}

async fn mount(
    window: web_sys::Window,
    document: web_sys::Document,
    config: GalleryConfig,
    stop: StopToken,
) -> anyhow::Result<()> {
    let container = dom::container(&document, &config.container_id)?;
    let images = dom::images(&document, &config.image_selector)?;
    let overlay = config.overlay_texture.as_deref().map(dom::load_image).transpose()?;

    assets::wait_until_ready(&window, &document, &config, &images, overlay.as_ref()).await?;
    log::info!("assets ready, mounting {} images", images.len());

    let scroll = dom::PageScroll::new(&window, &document, &config)?;
    let bounds = images.iter().map(|img| dom::bounding_box(img, scroll.rendered())).collect();
    let gallery = Gallery::new(&config, dom::viewport(&container), bounds);

    let canvas = dom::create_canvas(&document, &container)?;
    let pixel_ratio = window.device_pixel_ratio().min(config.max_pixel_ratio);
    let renderer = gl::GlRenderer::new(canvas, &images, overlay.as_ref(), &config, pixel_ratio)?;

    let app = Rc::new(RefCell::new(render::App {
        gallery,
        scheduler: Scheduler::new(&config).with_stop(stop),
        renderer,
        scroll,
        container,
        images,
        requery_on_resize: config.requery_layout_on_resize,
    }));

    input::install(&window, app.clone())?;
    app.borrow_mut().on_resize()?;
    render::install_resize(&window, app.clone())?;
    render::start(&window, app)
}
