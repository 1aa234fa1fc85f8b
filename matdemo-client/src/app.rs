//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application.

use std::sync::Arc;

use glow::HasContext;
use matdemo_core::Camera;

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
pub struct App {
    pub sdl: sdl2::Sdl,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub window: sdl2::video::Window,
    pub gl_context: sdl2::video::GLContext,
    pub gl: Arc<glow::Context>,
    pub event_pump: sdl2::EventPump,
}

impl App {
    /// Creates a new [`App`] instance with the specified title, width, and height.
    /// The width and height options are ignored if `fullscreen` is set to `true`.
    pub fn new(title: &str, width: u32, height: u32, fullscreen: bool) -> Result<Self, String> {
        let sdl = sdl2::init()?;
        let video_subsystem = sdl.video()?;
        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(3, 3);
        gl_attr.set_depth_size(24);

        let (width, height) = if fullscreen {
            let display_mode = video_subsystem.current_display_mode(0)?;
            (display_mode.w as u32, display_mode.h as u32)
        } else {
            (width, height)
        };
        let mut window = video_subsystem
            .window(title, width, height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        if fullscreen {
            window.set_fullscreen(sdl2::video::FullscreenType::Desktop)?;
        }

        let gl_context = window.gl_create_context()?;
        window.gl_make_current(&gl_context)?;
        if let Err(err) = video_subsystem.gl_set_swap_interval(sdl2::video::SwapInterval::VSync) {
            log::warn!("Could not enable vsync: {}", err);
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = sdl.event_pump()?;
        let gl = Arc::new(gl);

        log::info!("Created {}x{} window with an OpenGL 3.3 core context", width, height);

        Ok(Self {
            sdl,
            video_subsystem,
            window,
            gl_context,
            gl,
            event_pump,
        })
    }

    /// Enables depth testing and alpha blending.
    pub fn setup_render_state(&self) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.depth_func(glow::LEQUAL);
            self.gl.enable(glow::BLEND);
            self.gl
                .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
    }
}

/// Matches the camera's aspect ratio to a drawable area in pixels. An empty area leaves the
/// camera unchanged and returns `false`.
pub fn fit_camera(camera: &mut Camera, (width, height): (u32, u32)) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    camera.set_aspect(width as f32 / height as f32);
    true
}

/// Sizes the GL viewport and the camera projection to the window's drawable area, which is
/// larger than the window size on HiDPI displays.
pub fn fit_to_window(gl: &glow::Context, window: &sdl2::video::Window, camera: &mut Camera) {
    let (width, height) = window.drawable_size();
    unsafe {
        gl.viewport(0, 0, width as i32, height as i32);
    }
    if !fit_camera(camera, (width, height)) {
        log::debug!("Ignoring empty drawable area {}x{}", width, height);
    }
}
