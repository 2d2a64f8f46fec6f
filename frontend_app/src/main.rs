//! Frontend demo application
//!
//! Opens one render window through GLFW and a cpal output stream, then runs
//! the frontend loop with an idle core: input is logged and the audio sink
//! plays a quiet test tone.

use std::sync::Arc;
use std::time::Duration;

use emu_frontend::audio::backend::cpal_backend::CpalHost;
use emu_frontend::audio::list_output_devices;
use emu_frontend::foundation::logging;
use emu_frontend::foundation::time::{Clock, FramePacer, SystemClock};
use emu_frontend::prelude::*;
use emu_frontend::window::glfw_host::GlfwPlatform;

const CONFIG_PATH: &str = "frontend.toml";
const TONE_HZ: f32 = 440.0;
const TONE_AMPLITUDE: f32 = 1500.0;
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Sink writing a sine tone into every stereo frame
fn tone_sink(sample_rate: u32) -> impl FnMut(&mut [i16], usize) + Send + 'static {
    #[allow(clippy::cast_precision_loss)]
    let step = std::f32::consts::TAU * TONE_HZ / sample_rate as f32;
    let mut phase = 0.0_f32;
    move |buffer, frames| {
        for frame in buffer.chunks_exact_mut(2).take(frames) {
            #[allow(clippy::cast_possible_truncation)]
            let sample = (phase.sin() * TONE_AMPLITUDE) as i16;
            frame[0] = sample;
            frame[1] = sample;
            phase = (phase + step) % std::f32::consts::TAU;
        }
    }
}

fn log_input(event: InputEvent) {
    match event {
        InputEvent::PointerMoved { .. } | InputEvent::TouchMoved { .. } => {
            log::trace!("{event:?}");
        }
        _ => log::debug!("{event:?}"),
    }
}

fn main() {
    let config = match FrontendConfig::load_or_default(CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid {CONFIG_PATH}, using defaults: {err}");
            FrontendConfig::default()
        }
    };
    logging::init(&config.logging.filter);
    log::info!("Starting frontend demo");

    let queue: Arc<dyn EventQueue> = Arc::new(SharedEventQueue::new());
    let mut platform = match GlfwPlatform::init(Arc::clone(&queue)) {
        Ok(platform) => platform,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let window = match platform.create_window(&config.window, WindowFlags::default()) {
        Ok(window) => window,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };
    let window_id = window.id();

    let router = EventRouter::new(queue);
    let mut controller = WindowController::builder(Box::new(window), Box::new(router))
        .config(&config.window)
        .input_sink(log_input)
        .build();

    let audio_host = CpalHost::new();
    log::info!("Output devices: {:?}", list_output_devices(&audio_host));
    let audio = AudioBridge::from_config(&audio_host, &config.audio);
    audio.set_sink(tone_sink(audio.native_sample_rate()));

    let clock = SystemClock::new();
    let mut pacer = FramePacer::new(FRAME_INTERVAL, clock.now_ms());
    while controller.is_open() {
        platform.wait_events(pacer.remaining(clock.now_ms()));
        controller.poll_events();
        controller.present();
        pacer.frame_done(clock.now_ms());
    }

    drop(audio);
    drop(controller);
    platform.release_window(window_id);
    log::info!("Frontend demo finished");
}
