use anyhow::Context;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlImageElement, Window};

use super::JsResultExt;
use crate::config::{GalleryConfig, CONFIG_ELEMENT_ID};
use crate::layout::{BoundingBox, Viewport};
use crate::scroll::{ScrollSample, ScrollSource, SmoothScroll};

/// Config from the inline JSON element, or defaults when there is none.
pub fn read_config(document: &Document) -> anyhow::Result<GalleryConfig> {
    match document.get_element_by_id(CONFIG_ELEMENT_ID).and_then(|el| el.text_content()) {
        Some(json) => GalleryConfig::from_json(&json),
        None => Ok(GalleryConfig::default()),
    }
}

pub fn container(document: &Document, id: &str) -> anyhow::Result<HtmlElement> {
    document
        .get_element_by_id(id)
        .with_context(|| format!("container #{id} not found"))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| anyhow::anyhow!("#{id} is not an HTML element"))
}

/// Every `<img>` matching `selector`, in document order.
pub fn images(document: &Document, selector: &str) -> anyhow::Result<Vec<HtmlImageElement>> {
    let nodes = document.query_selector_all(selector).js_context("bad image selector")?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
        .collect())
}

pub fn load_image(url: &str) -> anyhow::Result<HtmlImageElement> {
    let img = HtmlImageElement::new().js_context("create image")?;
    img.set_cross_origin(Some("anonymous"));
    img.set_src(url);
    Ok(img)
}

pub fn viewport(container: &HtmlElement) -> Viewport {
    Viewport::new(container.offset_width() as f32, container.offset_height() as f32)
}

/// Document-space box of `el`; `scroll` is the translation currently
/// applied to the scroll wrapper.
pub fn bounding_box(el: &Element, scroll: f32) -> BoundingBox {
    let rect = el.get_bounding_client_rect();
    BoundingBox::new(
        rect.top() as f32 + scroll,
        rect.left() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

pub fn create_canvas(document: &Document, container: &HtmlElement) -> anyhow::Result<HtmlCanvasElement> {
    let canvas = document
        .create_element("canvas")
        .js_context("create canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow::anyhow!("created element is not a canvas"))?;
    container.append_child(&canvas).js_context("attach canvas")?;
    Ok(canvas)
}

/// Native page scroll fed through `SmoothScroll`. When a scroll wrapper is
/// present it is translated by the smoothed offset and the body is sized to
/// it so the native scrollbar still spans the content.
pub struct PageScroll {
    window: Window,
    body: Option<HtmlElement>,
    wrapper: Option<HtmlElement>,
    smooth: SmoothScroll,
}

impl PageScroll {
    pub fn new(window: &Window, document: &Document, config: &GalleryConfig) -> anyhow::Result<Self> {
        let wrapper = document
            .query_selector(&config.scroll_selector)
            .js_context("bad scroll selector")?
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if wrapper.is_none() {
            log::info!("no {} wrapper, using native scroll", config.scroll_selector);
        }

        let mut smooth = SmoothScroll::new(config.scroll_ease, config.speed_clamp, config.speed_smoothing);
        smooth.jump_to(window.scroll_y().unwrap_or(0.0) as f32);

        let scroll = Self { window: window.clone(), body: document.body(), wrapper, smooth };
        scroll.fit_body()?;
        scroll.translate(scroll.smooth.rendered())?;
        Ok(scroll)
    }

    pub fn rendered(&self) -> f32 {
        self.smooth.rendered()
    }

    /// Match the body height to the wrapper so there is something to scroll.
    pub fn fit_body(&self) -> anyhow::Result<()> {
        if let (Some(body), Some(wrapper)) = (&self.body, &self.wrapper) {
            let height = wrapper.get_bounding_client_rect().height();
            body.style()
                .set_property("height", &format!("{height}px"))
                .js_context("set body height")?;
        }
        Ok(())
    }

    fn translate(&self, offset: f32) -> anyhow::Result<()> {
        if let Some(wrapper) = &self.wrapper {
            wrapper
                .style()
                .set_property("transform", &format!("translate3d(0, {}px, 0)", -offset))
                .js_context("translate scroll wrapper")?;
        }
        Ok(())
    }
}

impl ScrollSource for PageScroll {
    fn poll(&mut self) -> ScrollSample {
        let page = self.window.scroll_y().unwrap_or(0.0) as f32;
        let sample = self.smooth.step(page);
        if let Err(e) = self.translate(sample.offset) {
            log::warn!("{e:#}");
        }
        sample
    }
}
