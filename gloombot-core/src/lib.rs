//! gloombot-core/src/lib.rs
//!
//! Motion control and idle scheduling for a six-channel animatronic
//! puppet (head pan/tilt plus two pan/tilt arms). The hardware driver
//! and audio player live behind the `Actuator` and `SoundCues` traits;
//! everything in here is the control logic driving channel targets
//! over time.

pub mod actuator;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod idle;
pub mod ramp;
pub mod sound;
pub mod state;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Actuator error: {0}")]
    Actuator(String),

    #[error("Sound error: {0}")]
    Sound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid channel index: {0}")]
    InvalidChannel(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

pub use actuator::{Actuator, LogActuator};
pub use channel::{Channel, POSITION_CENTER, POSITION_MAX, POSITION_MIN};
pub use config::{RigConfig, ShakePolicy};
pub use dispatch::{Dispatcher, MoveCommand};
pub use idle::IdleScheduler;
pub use ramp::RampEngine;
pub use sound::{DirSounds, SoundCues};
pub use state::RigState;
