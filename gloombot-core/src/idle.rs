//! gloombot-core/src/idle.rs
//!
//! Autonomous idle behavior. When no explicit command has arrived for
//! a while the scheduler picks a random mopey gesture from a fixed
//! catalog, and every so often plays a sound cue. Cues from the
//! depressed set additionally trigger a scripted head shake.
//!
//! Idle gestures go through `move_channel` directly, never through
//! `dispatch`: they are passive animation, so they neither reset the
//! idle clock nor arm the return-to-center timer.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use crate::channel::{Channel, CHANNEL_COUNT, POSITION_CENTER};
use crate::config::{RigConfig, ShakePolicy};
use crate::dispatch::Dispatcher;
use crate::sound::SoundCues;

/// A per-channel gesture target: either a fixed position or a uniform
/// draw from an inclusive range.
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Fixed(u16),
    Range(u16, u16),
}

/// One parameterized idle gesture. Channels absent from `targets`
/// resolve to neutral center.
#[derive(Debug, Clone, Copy)]
pub struct Gesture {
    pub name: &'static str,
    pub targets: &'static [(Channel, Target)],
}

impl Gesture {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> [u16; CHANNEL_COUNT] {
        let mut out = [POSITION_CENTER; CHANNEL_COUNT];
        for (channel, target) in self.targets {
            out[channel.index()] = match *target {
                Target::Fixed(p) => p,
                Target::Range(lo, hi) => rng.random_range(lo..=hi),
            };
        }
        out
    }
}

use Channel::*;
use Target::*;

/// The fixed idle catalog: plenty of head moping, occasional arm
/// fidgeting.
pub static IDLE_GESTURES: [Gesture; 10] = [
    Gesture {
        name: "slow look side to side",
        targets: &[(HeadPan, Range(1200, 1800)), (HeadTilt, Fixed(1500))],
    },
    Gesture {
        name: "slow look down or up",
        targets: &[(HeadPan, Fixed(1500)), (HeadTilt, Range(1400, 1800))],
    },
    Gesture {
        name: "gloomy slump and glance",
        targets: &[(HeadPan, Range(1300, 1700)), (HeadTilt, Range(1600, 1800))],
    },
    Gesture {
        name: "small sad nod down",
        targets: &[(HeadPan, Fixed(1500)), (HeadTilt, Fixed(1700))],
    },
    Gesture {
        name: "subtle side glance",
        targets: &[(HeadPan, Range(1400, 1600)), (HeadTilt, Fixed(1500))],
    },
    Gesture {
        name: "slight look up",
        targets: &[(HeadPan, Fixed(1500)), (HeadTilt, Range(1200, 1500))],
    },
    Gesture {
        name: "bigger miserable sweep",
        targets: &[(HeadPan, Range(1250, 1750)), (HeadTilt, Range(1500, 1800))],
    },
    Gesture {
        name: "arm sway",
        targets: &[
            (LeftArmPan, Range(1300, 1700)),
            (LeftArmTilt, Fixed(1500)),
            (RightArmPan, Range(1300, 1700)),
            (RightArmTilt, Fixed(1500)),
        ],
    },
    Gesture {
        name: "arm shrug",
        targets: &[
            (LeftArmPan, Fixed(1500)),
            (LeftArmTilt, Range(1400, 1600)),
            (RightArmPan, Fixed(1500)),
            (RightArmTilt, Range(1400, 1600)),
        ],
    },
    Gesture {
        name: "random arm fidget",
        targets: &[
            (LeftArmPan, Range(1200, 1800)),
            (LeftArmTilt, Range(1400, 1800)),
            (RightArmPan, Range(1200, 1800)),
            (RightArmTilt, Range(1400, 1800)),
        ],
    },
];

/// Pan sweep of the depressed shake: tight oscillation ending centered.
pub const SHAKE_WAYPOINTS: [u16; 5] = [1350, 1650, 1350, 1650, 1500];

pub struct IdleScheduler {
    dispatcher: Arc<Dispatcher>,
    config: Arc<RigConfig>,
    sounds: Arc<dyn SoundCues>,
}

impl IdleScheduler {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        sounds: Arc<dyn SoundCues>,
        config: Arc<RigConfig>,
    ) -> Self {
        Self {
            dispatcher,
            config,
            sounds,
        }
    }

    /// Run the idle loop until the stop channel signals shutdown.
    pub fn spawn(self: Arc<Self>, mut stop_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut rng = StdRng::from_os_rng();
            info!("idle scheduler running");
            loop {
                self.run_cycle(&mut rng).await;

                let secs = rng.random_range(
                    self.config.idle_interval_min.as_secs_f64()
                        ..=self.config.idle_interval_max.as_secs_f64(),
                );
                debug!("Sleeping for {secs:.1} seconds");
                tokio::select! {
                    _ = sleep(Duration::from_secs_f64(secs)) => {}
                    res = stop_rx.changed() => {
                        if res.is_err() || *stop_rx.borrow() {
                            info!("idle scheduler stopping");
                            break;
                        }
                    }
                }
            }
        })
    }

    /// One level-triggered iteration: idle vs. active is recomputed
    /// from the last-command timestamp every time, no edge events.
    pub async fn run_cycle(self: &Arc<Self>, rng: &mut StdRng) {
        let elapsed = self.dispatcher.state().since_command().await;
        if elapsed <= self.config.idle_timeout {
            trace!("not idle yet ({elapsed:?} since last command)");
            return;
        }

        info!("Idle detected, performing random movement");
        let Some(gesture) = IDLE_GESTURES.choose(rng) else {
            return;
        };
        self.execute_gesture(gesture, rng).await;
        self.maybe_play_sound(rng).await;
    }

    /// Ramp all six channels to the gesture's resolved targets
    /// concurrently (unspecified channels head back to center).
    pub async fn execute_gesture<R: Rng + ?Sized>(&self, gesture: &Gesture, rng: &mut R) {
        let targets = gesture.resolve(rng);
        debug!("Selected idle gesture: {} => {targets:?}", gesture.name);

        let duration = self.config.idle_duration;
        let ramps: Vec<JoinHandle<()>> = Channel::ALL
            .iter()
            .map(|&channel| {
                let dispatcher = self.dispatcher.clone();
                let requested = targets[channel.index()];
                tokio::spawn(async move {
                    if let Err(e) = dispatcher.move_channel(channel, requested, duration).await {
                        warn!("idle move failed on {channel}: {e}");
                    }
                })
            })
            .collect();
        for res in join_all(ramps).await {
            if let Err(e) = res {
                warn!("idle ramp task panicked: {e}");
            }
        }
        debug!("Idle movement completed");
    }

    /// Rate-limited sound cue: pick a random asset, play it, and if it
    /// belongs to the depressed set run the shake under the configured
    /// policy. An empty or unreadable asset list skips the cue for this
    /// cycle without touching the rate limiter.
    pub async fn maybe_play_sound(self: &Arc<Self>, rng: &mut StdRng) {
        let state = self.dispatcher.state();
        if !state.sound_due(self.config.sound_interval).await {
            return;
        }

        let assets = match self.sounds.list().await {
            Ok(assets) => assets,
            Err(e) => {
                warn!("could not list sound assets: {e}");
                return;
            }
        };
        let Some(name) = assets.choose(rng).cloned() else {
            return;
        };

        info!("Playing sound: {name}");
        let playback = {
            let sounds = self.sounds.clone();
            let asset = name.clone();
            tokio::spawn(async move { sounds.play_to_end(&asset).await })
        };

        if self.config.is_depressed_quote(&name) {
            match self.config.shake_policy {
                ShakePolicy::Block => self.depressed_shake().await,
                ShakePolicy::Concurrent => {
                    let me = self.clone();
                    tokio::spawn(async move {
                        me.depressed_shake().await;
                    });
                }
            }
        }

        match playback.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("playback failed for {name}: {e}"),
            Err(e) => warn!("playback task panicked: {e}"),
        }
        state.touch_sound().await;
    }

    /// The scripted depressed shake: slump the head, sweep the pan
    /// through tight waypoints, then come back to center. Each step is
    /// a blocking ramp, which is what paces the gesture against the
    /// voice line.
    pub async fn depressed_shake(&self) {
        info!("Feeling particularly depressed - quick head shake");
        let duration = self.config.shake_duration;

        self.shake_move(HeadTilt, 1800, duration).await;
        for &pan in &SHAKE_WAYPOINTS {
            self.shake_move(HeadPan, pan, duration).await;
        }
        self.shake_move(HeadPan, POSITION_CENTER, duration).await;
        self.shake_move(HeadTilt, POSITION_CENTER, duration).await;

        info!("Depressed head shake complete");
    }

    async fn shake_move(&self, channel: Channel, position: u16, duration: Duration) {
        if let Err(e) = self.dispatcher.move_channel(channel, position, duration).await {
            warn!("shake move failed on {channel}: {e}");
        }
    }
}
