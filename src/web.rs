//! Web-specific helpers for running the demo in a browser.
//!
//! Canvas setup, WebGL2 context acquisition and console logging for the
//! WebAssembly build.

use glow::HasContext as _;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use winit::platform::web::WindowExtWebSys;

/// Get the browser window dimensions
pub fn get_window_size() -> (u32, u32) {
    let window = web_sys::window().expect("no global window exists");
    let width = window.inner_width().unwrap().as_f64().unwrap() as u32;
    let height = window.inner_height().unwrap().as_f64().unwrap() as u32;
    (width.max(100), height.max(100))
}

/// Set up the canvas element for rendering
pub fn setup_canvas(window: &winit::window::Window, container_id: &str) -> web_sys::HtmlCanvasElement {
    let canvas = window.canvas().expect("Couldn't get canvas from window");

    let web_window = web_sys::window().expect("no global window exists");
    let document = web_window.document().expect("no document exists");

    // Try to find existing container, or use body
    let container = document
        .get_element_by_id(container_id)
        .unwrap_or_else(|| document.body().unwrap().into());
    container
        .append_child(&canvas)
        .expect("Couldn't append canvas to container");

    // Backing resolution follows the device pixel ratio, CSS size stays in
    // layout pixels.
    let dpr = web_window.device_pixel_ratio();
    let css_width = web_window.inner_width().unwrap().as_f64().unwrap();
    let css_height = web_window.inner_height().unwrap().as_f64().unwrap();

    let canvas_width = (css_width * dpr) as u32;
    let canvas_height = (css_height * dpr) as u32;
    canvas.set_width(canvas_width);
    canvas.set_height(canvas_height);

    let style = canvas.style();
    style.set_property("width", &format!("{}px", css_width as u32)).unwrap();
    style.set_property("height", &format!("{}px", css_height as u32)).unwrap();
    style.set_property("display", "block").unwrap();

    console_log(&format!(
        "Canvas setup: {}x{} (CSS: {}x{}, DPR: {})",
        canvas_width, canvas_height,
        css_width as u32, css_height as u32,
        dpr
    ));

    canvas
}

/// Acquire a WebGL2 rendering context for the canvas.
pub fn webgl2_context(canvas: &web_sys::HtmlCanvasElement) -> glow::Context {
    let context = canvas
        .get_context("webgl2")
        .expect("Failed to query WebGL2 context")
        .expect("Browser does not support WebGL2")
        .dyn_into::<web_sys::WebGl2RenderingContext>()
        .expect("Canvas context is not WebGL2");

    let gl = glow::Context::from_webgl2_context(context);
    let version = unsafe { gl.get_parameter_string(glow::VERSION) };
    console_log(&format!("WebGL2 context ready: {version}"));
    gl
}

/// Log a message to the browser console
#[wasm_bindgen]
pub fn console_log(msg: &str) {
    web_sys::console::log_1(&msg.into());
}

/// Log an error to the browser console
#[wasm_bindgen]
pub fn console_error(msg: &str) {
    web_sys::console::error_1(&msg.into());
}
