use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, HtmlImageElement, Window};

use super::JsResultExt;
use crate::config::GalleryConfig;
use crate::gate::{Join, ReadinessGate, Signal};

const TIMED_OUT: &str = "gallery:asset-timeout";

type Callback = Closure<dyn FnMut(JsValue)>;

/// Wait for every configured font, every gallery image and the overlay
/// texture. Broken images count as settled, like a finished load.
pub async fn wait_until_ready(
    window: &Window,
    document: &Document,
    config: &GalleryConfig,
    images: &[HtmlImageElement],
    overlay: Option<&HtmlImageElement>,
) -> anyhow::Result<()> {
    let mut signals: Vec<Signal> = config.fonts.iter().cloned().map(Signal::Font).collect();
    let mut promises = Vec::with_capacity(signals.len() + 2);
    let mut callbacks: Vec<Callback> = Vec::new();

    let fonts = document.fonts();
    for family in &config.fonts {
        promises.push(fonts.load(&format!("1em \"{family}\"")).js_context("font load")?);
    }

    let decoded = Array::new();
    for img in images {
        decoded.push(&settled(img, &mut callbacks));
    }
    signals.push(Signal::Images(images.len()));
    promises.push(Promise::all(&decoded));

    if let (Some(img), Some(url)) = (overlay, config.overlay_texture.as_ref()) {
        signals.push(Signal::Overlay(url.clone()));
        promises.push(settled(img, &mut callbacks));
    }

    let gate = Rc::new(RefCell::new(ReadinessGate::new(signals)));
    let all = Array::new();
    for (index, promise) in promises.into_iter().enumerate() {
        let gate = gate.clone();
        let on_ready: Callback = Closure::new(move |_: JsValue| {
            gate.borrow_mut().settle(index);
        });
        all.push(&promise.then(&on_ready));
        callbacks.push(on_ready);
    }

    let joined = Promise::all(&all);
    let outcome = match config.asset_timeout_ms {
        Some(ms) => Promise::race(&Array::of2(&joined, &timer(window, ms))),
        None => joined,
    };
    let join = match JsFuture::from(outcome).await.js_context("asset loading failed") {
        Ok(v) if v.as_string().as_deref() == Some(TIMED_OUT) => {
            Join::TimedOut { after_ms: config.asset_timeout_ms.unwrap_or_default() }
        }
        Ok(_) => Join::Ready,
        Err(e) => Join::Failed(e),
    };
    if join.leaves_pending() {
        callbacks.into_iter().for_each(Closure::forget);
    }
    let verdict = gate.borrow().conclude(join);
    verdict
}

/// `img.decode()` that resolves on failure too.
fn settled(img: &HtmlImageElement, callbacks: &mut Vec<Callback>) -> Promise {
    let src = img.src();
    let on_error: Callback = Closure::new(move |e: JsValue| {
        log::warn!("image {src} failed to decode: {e:?}");
    });
    let promise = img.decode().catch(&on_error);
    callbacks.push(on_error);
    promise
}

fn timer(window: &Window, ms: u32) -> Promise {
    let window = window.clone();
    Promise::new(&mut |resolve, _reject| {
        let scheduled = window.set_timeout_with_callback_and_timeout_and_arguments_1(
            &resolve,
            ms as i32,
            &JsValue::from_str(TIMED_OUT),
        );
        if let Err(e) = scheduled {
            log::warn!("asset timeout not armed: {e:?}");
        }
    })
}
