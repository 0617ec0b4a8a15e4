use std::{
    num::NonZeroU32,
    panic::{self, AssertUnwindSafe},
};

use anyhow::{anyhow, bail, Context};
use glium::Display;
use glutin::{
    config::ConfigTemplateBuilder,
    context::ContextAttributesBuilder,
    display::GetGlDisplay,
    prelude::*,
    surface::{SurfaceAttributesBuilder, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasRawWindowHandle;
use winit::{dpi::PhysicalSize, event_loop::EventLoop, window::Window};

use crate::config::Config;

/// The largest sample count not above `requested`. Asking for more than any config
/// offers gets the largest one there is.
pub fn pick_sample_count(available: &[u8], requested: u8) -> Option<u8> {
    available
        .iter()
        .copied()
        .filter(|&samples| samples <= requested)
        .max()
        .or_else(|| available.iter().copied().max())
}

/// Takes the first config whose sample count is the one `pick_sample_count` settles on.
pub fn choose_config<C>(
    configs: impl IntoIterator<Item = C>,
    samples: impl Fn(&C) -> u8,
    requested: u8,
) -> Option<C> {
    let configs: Vec<C> = configs.into_iter().collect();
    let counts: Vec<u8> = configs.iter().map(&samples).collect();
    let chosen = pick_sample_count(&counts, requested)?;
    configs
        .into_iter()
        .zip(counts)
        .find_map(|(config, count)| (count == chosen).then_some(config))
}

/// Unwind payload for a display that matched no config. The picker handed to
/// `DisplayBuilder` must return a config, so an empty set can only leave it by unwinding.
#[derive(Debug)]
struct NoGlConfig;

fn no_gl_config() -> ! {
    // resume_unwind skips the panic hook, so nothing is printed
    panic::resume_unwind(Box::new(NoGlConfig))
}

/// Runs `f`, turning a `no_gl_config` unwind into an error. Any other panic keeps going.
fn catch_no_gl_config<T>(f: impl FnOnce() -> T) -> Result<T, NoGlConfig> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<NoGlConfig>() {
            Ok(_) => Err(NoGlConfig),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Opens the window and makes a GL context current on it.
pub fn create(
    event_loop: &EventLoop<()>,
    config: &Config,
) -> anyhow::Result<(Window, Display<WindowSurface>)> {
    let (width, height) = config.window_size;
    let window_builder = winit::window::WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(width, height))
        .with_resizable(true);

    let requested = config.msaa_samples;
    let built = catch_no_gl_config(|| {
        DisplayBuilder::new()
            .with_window_builder(Some(window_builder))
            .build(event_loop, ConfigTemplateBuilder::new(), |configs| {
                choose_config(configs, GlConfig::num_samples, requested)
                    .unwrap_or_else(|| no_gl_config())
            })
    });
    let Ok(built) = built else {
        bail!("failed to create window: the GL display offered no usable config");
    };
    let (window, gl_config) = built.map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = window.context("display builder returned no window")?;
    log::info!(
        "requested {requested}x MSAA, got {}x",
        gl_config.num_samples()
    );

    let raw_window_handle = window.raw_window_handle();
    let gl_display = gl_config.display();
    let context_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));
    let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
        .context("failed to create GL context")?;

    let (width, height): (u32, u32) = window.inner_size().into();
    let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_window_handle,
        NonZeroU32::new(width).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(height).unwrap_or(NonZeroU32::MIN),
    );
    let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
        .context("failed to create window surface")?;

    let context = not_current
        .make_current(&surface)
        .context("failed to make GL context current")?;
    let display = Display::from_context_surface(context, surface)
        .context("OpenGL version is not supported")?;

    log::info!(
        "{} on {}",
        display.get_opengl_version_string(),
        display.get_opengl_renderer_string()
    );
    Ok((window, display))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_used() {
        assert_eq!(pick_sample_count(&[0, 2, 4, 8], 4), Some(4));
    }

    #[test]
    fn unsupported_count_rounds_down() {
        assert_eq!(pick_sample_count(&[0, 2, 4, 8], 6), Some(4));
    }

    #[test]
    fn too_many_samples_degrades_to_maximum() {
        assert_eq!(pick_sample_count(&[0, 2, 4, 8, 16], 99), Some(16));
    }

    #[test]
    fn request_below_every_config_takes_the_largest() {
        assert_eq!(pick_sample_count(&[4, 8], 1), Some(8));
    }

    #[test]
    fn no_configs() {
        assert_eq!(pick_sample_count(&[], 4), None);
    }

    #[test]
    fn first_config_with_the_chosen_count_wins() {
        let configs = [("a", 0), ("b", 4), ("c", 8), ("d", 4)];
        let chosen = choose_config(configs, |&(_, samples)| samples, 6);
        assert_eq!(chosen, Some(("b", 4)));
    }

    #[test]
    fn empty_config_list_chooses_nothing() {
        let configs: [(&str, u8); 0] = [];
        assert_eq!(choose_config(configs, |&(_, samples)| samples, 4), None);
    }

    #[test]
    fn empty_display_becomes_an_error_instead_of_a_panic() {
        let result = catch_no_gl_config(|| -> u8 {
            let configs: Vec<u8> = Vec::new();
            choose_config(configs, |&samples| samples, 4).unwrap_or_else(|| no_gl_config())
        });
        assert!(result.is_err());
        assert_eq!(catch_no_gl_config(|| 7).ok(), Some(7));
    }
}
