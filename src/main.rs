#![warn(clippy::pedantic)]
use anyhow::{anyhow, Context};
use frame::{FrameClock, RenderState};
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoopBuilder,
    keyboard::{KeyCode, PhysicalKey},
};

mod buffer;
mod camera;
mod config;
mod error;
mod frame;
mod geometry;
mod load;
mod logging;
mod shader;
mod texture;
mod transform;
mod window;

fn main() -> anyhow::Result<()> {
    logging::init();
    let config = config::Config::from_env();

    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let (window, display) = window::create(&event_loop, &config)?;

    // load assets; nothing below runs if any of them is missing or broken
    log::info!("loading assets from {}", config.assets_dir.display());
    let mut state = RenderState::new(&display, &config).context("startup failed")?;
    let mut clock = FrameClock::start();

    log::info!("Use WASD to move, and the mouse to look around.");
    log::info!("Press escape to exit");

    // rendering loop
    event_loop.run(move |event, window_target| {
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => state.request_exit(),

                // render everything
                WindowEvent::RedrawRequested if state.run_state().should_draw() => {
                    let dt = clock.tick();
                    let mut target = display.draw();
                    let drawn = state.draw_frame(&mut target, dt);
                    let presented = target.finish().map_err(error::RenderError::from);
                    if let Err(err) = drawn.and(presented) {
                        log::error!("{err}");
                        state.request_exit();
                    }
                }
                // keep the viewport and the projection's aspect ratio in step with the window
                WindowEvent::Resized(window_size) => {
                    display.resize(window_size.into());
                    state.viewport.resize(window_size.width, window_size.height);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    state.camera.cursor_moved(position.x, position.y);
                }
                // all other keys drive the camera
                WindowEvent::KeyboardInput { event, .. } => {
                    state.camera.process_input(&event);
                }
                _ => (),
            },
            // ensures continuous rendering
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => (),
        };

        if !state.run_state().is_running() {
            window_target.exit();
        }
    })
    .map_err(|err| anyhow!("event loop failed: {err}"))?;

    log::info!("exiting");
    Ok(())
}
