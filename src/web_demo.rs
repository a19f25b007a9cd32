//! Web demo entry point
//!
//! wasm-bindgen entry point that drives the rotating cubes against a
//! WebGL2 canvas.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use winit::{
    dpi::PhysicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    platform::web::EventLoopExtWebSys,
    window::WindowBuilder,
};

use crate::app::DemoApp;
use crate::device::{GlDevice, RenderDevice};
use crate::init_web_logging;
use crate::web::{console_error, console_log, get_window_size, setup_canvas, webgl2_context};

/// Main entry point for web - called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn main() {
    init_web_logging();
    console_log("=== Rotating Cube Web Demo ===");

    let event_loop = EventLoop::new().expect("Failed to create event loop");

    let (width, height) = get_window_size();
    let window = WindowBuilder::new()
        .with_title("Rotating Cube Demo")
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .expect("Failed to create window");

    let canvas = setup_canvas(&window, "canvas-container");
    let mut viewport = (canvas.width(), canvas.height());

    let gl = webgl2_context(&canvas);
    let mut device = GlDevice::new(gl);
    device.set_viewport(0, 0, viewport.0, viewport.1);

    let app = match DemoApp::new(&mut device) {
        Ok(app) => app,
        Err(e) => {
            console_error(&format!("Failed to create demo scene: {e}"));
            return;
        }
    };

    // Rc<RefCell> for shared mutable state in the web event loop
    let device = Rc::new(RefCell::new(device));
    let app = Rc::new(RefCell::new(app));
    let window = Rc::new(window);

    let performance = web_sys::window()
        .expect("no global window exists")
        .performance()
        .expect("performance API unavailable");
    let mut last_frame_time = performance.now();
    let mut frame_count: u32 = 0;

    console_log("Starting render loop...");

    // Run event loop (web-style, non-blocking)
    event_loop.spawn(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        let mut device = device.borrow_mut();
        let mut app = app.borrow_mut();

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => {
                    viewport = (size.width, size.height);
                    device.set_viewport(0, 0, size.width, size.height);
                }
                WindowEvent::RedrawRequested => {
                    frame_count += 1;
                    if frame_count == 1 {
                        console_log("First frame rendering...");
                    } else if frame_count % 60 == 0 {
                        console_log(&format!("FPS: {:.1}", app.fps()));
                    }

                    let aspect = viewport.0.max(1) as f32 / viewport.1.max(1) as f32;
                    if let Err(e) = app.render(&mut *device, aspect) {
                        if frame_count <= 5 {
                            console_error(&format!("Render error: {e}"));
                        }
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                let now = performance.now();
                let dt = ((now - last_frame_time) / 1000.0) as f32;
                last_frame_time = now;

                if dt > 0.0 && dt < 1.0 {
                    app.update(dt);
                }

                window.request_redraw();
            }
            _ => {}
        }
    });
}
