use std::{process::ExitCode, time::Instant};

use glam::Vec2;
use matdemo_core::{FrameUniforms, MaterialBinder};
use sdl2::{event::Event, event::WindowEvent, keyboard::Keycode};

use crate::{
    app::{App, fit_to_window},
    config::DemoConfig,
    input::{CameraController, KeyboardState, MouseState},
    scene::{Scene, SceneError},
};

mod app;
mod config;
mod input;
mod procedural;
mod scene;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("Window setup failed: {0}")]
    App(String),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

fn setup_logging(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn main() -> ExitCode {
    let config = match DemoConfig::load_or_default() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let level = config.log_level().unwrap_or(log::LevelFilter::Info);
    if let Err(err) = setup_logging(level) {
        eprintln!("Could not set up logging: {err}");
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &DemoConfig) -> Result<(), DemoError> {
    let mut app = App::new(&config.title, config.width, config.height, config.fullscreen)
        .map_err(DemoError::App)?;
    app.setup_render_state();

    let mut scene = Scene::build(&app.gl, config)?;
    fit_to_window(&app.gl, &app.window, &mut scene.camera);
    let mut binder = MaterialBinder::new(&app.gl);
    binder.unbind_textures = config.unbind_textures;

    let controller = CameraController::new(config.camera_speed, config.mouse_sensitivity);
    let mut keyboard_state = KeyboardState::default();
    let mut mouse_state = MouseState::default();

    let start = Instant::now();
    let mut last_frame_time = start;

    'running: loop {
        let now = Instant::now();
        let delta_time = now.duration_since(last_frame_time).as_secs_f32();
        last_frame_time = now;

        mouse_state.delta = Vec2::ZERO;

        for event in app.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'running,
                Event::Window {
                    win_event: WindowEvent::Resized(..) | WindowEvent::SizeChanged(..),
                    ..
                } => {
                    fit_to_window(&app.gl, &app.window, &mut scene.camera);
                }
                Event::MouseMotion { xrel, yrel, .. } => {
                    mouse_state.delta += Vec2::new(xrel as f32, yrel as f32);
                }
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    repeat: false,
                    ..
                } => {
                    mouse_state.grabbed = !mouse_state.grabbed;
                    app.sdl.mouse().set_relative_mouse_mode(mouse_state.grabbed);
                }
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    keyboard_state.down.insert(keycode);
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    keyboard_state.down.remove(&keycode);
                }
                _ => {}
            }
        }

        controller.apply(&mut scene.camera, &keyboard_state, &mouse_state, delta_time);

        let frame = FrameUniforms {
            light_position: scene.light_position,
            view_position: scene.camera.position,
            time: start.elapsed().as_secs_f32(),
        };
        binder.render_frame(&mut scene.items, &mut scene.camera, &frame);
        app.window.gl_swap_window();
    }

    log::info!("Shutting down");
    Ok(())
}
