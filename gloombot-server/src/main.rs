//! gloombot-server/src/main.rs
//!
//! Thin HTTP front end for the rig: parse arguments, set the playback
//! volume, spawn the idle scheduler, and serve `/move` until ctrl-c.

use std::net::SocketAddr;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use warp::Filter;

use gloombot_core::{
    DirSounds, Dispatcher, IdleScheduler, LogActuator, MoveCommand, RampEngine, RigConfig,
    RigState, ShakePolicy,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "gloombot")]
#[command(author, version, about = "Gloombot - animatronic puppet rig server")]
struct Args {
    /// Address for the HTTP control endpoint
    #[arg(long, default_value = "0.0.0.0:5003")]
    bind: SocketAddr,

    /// Folder holding the rig's .wav sound cues
    #[arg(long, default_value = "marvin_sound")]
    sound_folder: String,

    /// Depressed-shake policy while its cue plays: block | concurrent
    #[arg(long, default_value = "block")]
    shake_policy: ShakePolicy,

    /// Disable the per-channel reverse mapping
    #[arg(long, default_value = "false")]
    no_reverse: bool,

    /// Playback volume handed to amixer at startup; empty to skip
    #[arg(long, default_value = "70%")]
    volume: String,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("gloombot=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

/// Best-effort mixer setup; the rig still runs if amixer is missing.
fn set_volume(volume: &str) {
    if volume.is_empty() {
        return;
    }
    match Command::new("amixer")
        .args(["sset", "Playback", volume])
        .status()
    {
        Ok(status) if status.success() => info!("Playback volume set to {volume}"),
        Ok(status) => warn!("amixer exited with {status}"),
        Err(e) => warn!("could not set volume: {e}"),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();
    info!(
        "Gloombot starting. bind={}, sound_folder={}, shake_policy={:?}",
        args.bind, args.sound_folder, args.shake_policy
    );

    set_volume(&args.volume);

    let mut config = RigConfig::default();
    config.shake_policy = args.shake_policy;
    if args.no_reverse {
        config.reverse_channels = [false; 6];
    }
    let config = Arc::new(config);

    // The LogActuator stands in for the hardware shim; deployments swap
    // in their PCA9685 or serial implementation of `Actuator` here.
    let state = Arc::new(RigState::new());
    let engine = Arc::new(RampEngine::new(Arc::new(LogActuator), state.clone()));
    let dispatcher = Arc::new(Dispatcher::new(engine, state, config.clone()));
    let sounds = Arc::new(DirSounds::new(args.sound_folder.as_str()));
    let idle = Arc::new(IdleScheduler::new(dispatcher.clone(), sounds, config));

    info!("Starting idle thread");
    let (stop_tx, stop_rx) = watch::channel(false);
    let idle_task = idle.spawn(stop_rx);

    let move_dispatcher = dispatcher.clone();
    let route_move = warp::path("move")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<MoveCommand>())
        .map(move |cmd: MoveCommand| {
            let dispatcher = move_dispatcher.clone();
            // Reply acknowledges dispatch; the ramps run on their own.
            tokio::spawn(async move {
                dispatcher.dispatch(cmd).await;
            });
            "Movement executed"
        });
    let route_health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "OK");

    // The control panel is served from the browser, so open CORS up.
    let cors = warp::cors().allow_any_origin();
    let routes = route_move.or(route_health).with(cors);

    info!("Idle thread started, serving HTTP on {}", args.bind);
    let (_addr, server) = warp::serve(routes).bind_with_graceful_shutdown(args.bind, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("ctrl-c received, shutting down");
    });
    server.await;

    let _ = stop_tx.send(true);
    if tokio::time::timeout(Duration::from_secs(10), idle_task)
        .await
        .is_err()
    {
        warn!("idle loop did not stop within 10s");
    }
    info!("Main finished. Goodbye!");
}
