use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{MouseEvent, Window};

use super::render::App;
use super::JsResultExt;

/// Pointer picking on the window plus hover tweens on each source image.
/// Listeners live as long as the page.
pub fn install(window: &Window, app: Rc<RefCell<App>>) -> anyhow::Result<()> {
    let on_move = {
        let app = app.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let mut app = app.borrow_mut();
            let origin = app.container.get_bounding_client_rect();
            let x = event.client_x() as f32 - origin.left() as f32;
            let y = event.client_y() as f32 - origin.top() as f32;
            if let Some(hit) = app.gallery.pointer_move(x, y) {
                log::trace!("pointer over image {} at uv {:?}", hit.index, hit.uv);
            }
        })
    };
    window
        .add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())
        .js_context("mousemove listener")?;
    on_move.forget();

    let images = app.borrow().images.clone();
    for (index, img) in images.iter().enumerate() {
        let enter = {
            let app = app.clone();
            Closure::<dyn FnMut()>::new(move || app.borrow_mut().gallery.hover_enter(index))
        };
        let exit = {
            let app = app.clone();
            Closure::<dyn FnMut()>::new(move || app.borrow_mut().gallery.hover_exit(index))
        };
        img.add_event_listener_with_callback("mouseenter", enter.as_ref().unchecked_ref())
            .js_context("mouseenter listener")?;
        img.add_event_listener_with_callback("mouseout", exit.as_ref().unchecked_ref())
            .js_context("mouseout listener")?;
        enter.forget();
        exit.forget();
    }
    Ok(())
}
