// What you SEE:
// • The camera feed at 640x480 with brightness, per-channel intensity and blur applied.
// • I inverts colors, Tab switches between front/back camera, S saves snapshot.png.
// • R retries the camera if it could not be opened.
// • H shows the control values in the title; 1..6 pick a control, Up/Down change it.
// • The window keeps refreshing while a camera is still opening.
// • ESC quits.

mod app;
mod camera;
mod capture_thread;
mod config;
mod controls;
mod draw;
mod error;
mod frame_loop;
mod fx;
mod session;
mod snapshot;
mod surface;
mod types;
mod vision;

use app::App;
use camera::NokhwaBackend;
use clap::Parser;
use config::Config;
use controls::Controls;
use draw::Drawer;
use error::Error;
use frame_loop::FrameLoop;
use session::{Session, TracingSink};
use snapshot::SnapshotSink;
use types::{TARGET_HEIGHT, TARGET_WIDTH};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    tracing::debug!(?config, "starting");

    /* --- Window first, so a missing camera still leaves an interactive UI --- */
    let mut drawer = Drawer::new(
        "Webcam FX",
        TARGET_WIDTH as usize,
        TARGET_HEIGHT as usize,
    )?;

    /* --- Session: the startup acquisition happens on the first loop iteration --- */
    let backend = NokhwaBackend::new(config.user_camera, config.environment_camera);
    let session = Session::new(backend, config.facing);

    let mut app = App::new(
        session,
        Controls::new(config.initial_params()),
        FrameLoop::new(),
        SnapshotSink::new(config.snapshot.clone()),
        Box::new(TracingSink),
    );

    app.run(&mut drawer)
}
