//! Headless demo driving the rotating-cube scene.
//!
//! Runs the demo application against the recording device, so the full
//! per-frame mesh rebuild can be exercised and inspected without a window
//! or a GPU.
//!
//! Run with:
//!   cargo run --example demo
//!   cargo run --example demo -- --frames 600 --frame-ms 8

use clap::Parser;
use immediate_mesh::{DemoApp, HeadlessDevice, RenderDevice};

/// Rotating-cube demo without a window.
#[derive(Parser, Debug)]
#[command(name = "demo", about = "Rotating-cube demo on the recording device", version)]
struct Args {
    /// Exit after rendering N frames.
    #[arg(long, default_value = "120")]
    frames: u32,

    /// Simulated frame time in milliseconds.
    #[arg(long, default_value = "16")]
    frame_ms: u32,

    /// Viewport width in pixels.
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value = "720")]
    height: u32,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    println!("Starting rotating-cube demo: {} frames, headless", args.frames);

    let mut device = HeadlessDevice::new();
    device.set_viewport(0, 0, args.width, args.height);

    let mut app = match DemoApp::new(&mut device) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to create demo scene: {e}");
            return;
        }
    };

    let dt = args.frame_ms as f32 / 1000.0;
    let aspect = args.width as f32 / args.height as f32;

    for frame in 0..args.frames {
        // Keep only the last frame's recording for the stats below.
        device.reset_recording();

        app.update(dt);
        if let Err(e) = app.render(&mut device, aspect) {
            eprintln!("Render error on frame {frame}: {e}");
            return;
        }
    }

    println!("Rendered {} frames", args.frames);
    println!("  Draw calls/frame:    {}", device.draw_calls().len());
    println!("  Vertex uploads/frame: {}", device.array_uploads().len());
    println!("  Live buffers:        {}", device.live_buffer_count());
    println!("  Average FPS:         {:.1}", app.fps());

    app.dispose(&mut device);
}
