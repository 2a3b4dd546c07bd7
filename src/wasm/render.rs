use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{HtmlElement, HtmlImageElement, Window};

use super::dom::{self, PageScroll};
use super::gl::GlRenderer;
use super::JsResultExt;
use crate::gallery::Gallery;
use crate::scheduler::{Scheduler, TickOutcome};

/// Everything the frame loop and DOM callbacks share.
pub struct App {
    pub gallery: Gallery,
    pub scheduler: Scheduler,
    pub renderer: GlRenderer,
    pub scroll: PageScroll,
    pub container: HtmlElement,
    pub images: Vec<HtmlImageElement>,
    pub requery_on_resize: bool,
}

impl App {
    /// One animation frame. Returns whether the loop should continue.
    fn frame(&mut self, dt: f32) -> anyhow::Result<bool> {
        let Self { gallery, scheduler, renderer, scroll, .. } = self;
        match scheduler.tick(gallery, scroll, renderer, dt)? {
            TickOutcome::Stopped => {
                log::info!("frame loop stopped after {} frames", scheduler.frames());
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    /// Re-measure the container and draw once.
    pub fn on_resize(&mut self) -> anyhow::Result<()> {
        self.scroll.fit_body()?;
        if self.requery_on_resize {
            let offset = self.scroll.rendered();
            let bounds: Vec<_> = self.images.iter().map(|img| dom::bounding_box(img, offset)).collect();
            self.gallery.registry.requery(&bounds)?;
        }
        let viewport = dom::viewport(&self.container);
        let Self { gallery, scheduler, renderer, .. } = self;
        scheduler.resize(gallery, renderer, viewport)?;
        Ok(())
    }
}

pub fn install_resize(window: &Window, app: Rc<RefCell<App>>) -> anyhow::Result<()> {
    let on_resize = Closure::<dyn FnMut()>::new(move || {
        if let Err(e) = app.borrow_mut().on_resize() {
            log::error!("resize failed: {e:#}");
        }
    });
    window
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .js_context("resize listener")?;
    on_resize.forget();
    Ok(())
}

/// Start the animation-frame loop.
pub fn start(window: &Window, app: Rc<RefCell<App>>) -> anyhow::Result<()> {
    // `f` holds the animation-frame closure so that it can keep passing
    // itself to `request_animation_frame`.
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let win = window.clone();
    let mut last: Option<f64> = None;

    *g.borrow_mut() = Some(Closure::new(move |now: f64| {
        let dt = last.map_or(0.0, |prev| ((now - prev) / 1000.0) as f32);
        last = Some(now);

        let running = match app.borrow_mut().frame(dt) {
            Ok(running) => running,
            Err(e) => {
                log::error!("frame loop halted: {e:#}");
                false
            }
        };
        if !running {
            return;
        }

        if let Some(next) = f.borrow().as_ref() {
            if let Err(e) = win.request_animation_frame(next.as_ref().unchecked_ref()) {
                log::error!("could not schedule next frame: {e:?}");
            }
        }
    }));

    let first = g.borrow();
    let first = first.as_ref().map(|c| c.as_ref().unchecked_ref::<js_sys::Function>());
    if let Some(callback) = first {
        window.request_animation_frame(callback).js_context("request_animation_frame")?;
    }
    log::info!("frame loop started");
    Ok(())
}
