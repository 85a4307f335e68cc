//! gloombot-core/src/channel.rs
//!
//! The fixed channel set of the rig and the pulse-width position
//! arithmetic shared by every component.

use crate::{Error, Result};

/// Lowest pulse width the actuator accepts, in microsecond-like units.
pub const POSITION_MIN: u16 = 1000;
/// Highest pulse width the actuator accepts.
pub const POSITION_MAX: u16 = 2000;
/// Neutral center position for every channel.
pub const POSITION_CENTER: u16 = 1500;

/// Number of channels on the rig.
pub const CHANNEL_COUNT: usize = 6;

/// One physical output channel. The discriminants match the channel
/// indices the actuator hardware expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Channel {
    HeadPan = 0,
    HeadTilt = 1,
    LeftArmPan = 2,
    LeftArmTilt = 3,
    RightArmPan = 4,
    RightArmTilt = 5,
}

impl Channel {
    /// All channels in dispatch order: head first, then left arm, then right.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::HeadPan,
        Channel::HeadTilt,
        Channel::LeftArmPan,
        Channel::LeftArmTilt,
        Channel::RightArmPan,
        Channel::RightArmTilt,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Result<Channel> {
        Channel::ALL
            .get(idx)
            .copied()
            .ok_or(Error::InvalidChannel(idx))
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Channel::HeadPan => "head_pan",
            Channel::HeadTilt => "head_tilt",
            Channel::LeftArmPan => "left_pan",
            Channel::LeftArmTilt => "left_tilt",
            Channel::RightArmPan => "right_pan",
            Channel::RightArmTilt => "right_tilt",
        };
        write!(f, "{name}")
    }
}

/// Clamp a requested position into the actuator's [MIN, MAX] range.
/// Takes the wide signed type so negative or oversized requests from
/// the wire clamp instead of wrapping.
pub fn clamp_position(position: i64) -> u16 {
    position.clamp(i64::from(POSITION_MIN), i64::from(POSITION_MAX)) as u16
}

/// Mirror a position for a reversed channel. Applied BEFORE clamping,
/// so an out-of-range request mirrors first and clamps second.
pub fn invert_position(position: i64) -> i64 {
    i64::from(POSITION_MIN + POSITION_MAX) - position
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_stays_in_range() {
        assert_eq!(clamp_position(500), POSITION_MIN);
        assert_eq!(clamp_position(2500), POSITION_MAX);
        assert_eq!(clamp_position(1500), 1500);
        assert_eq!(clamp_position(1000), 1000);
        assert_eq!(clamp_position(2000), 2000);
        assert_eq!(clamp_position(-100), POSITION_MIN);
        assert_eq!(clamp_position(70_000), POSITION_MAX);
    }

    #[test]
    fn invert_mirrors_around_center() {
        assert_eq!(invert_position(1000), 2000);
        assert_eq!(invert_position(2000), 1000);
        assert_eq!(invert_position(1500), 1500);
        assert_eq!(invert_position(1700), 1300);
        // Mirroring happens before clamping, so out-of-range values
        // mirror past the range and clamp on the far side.
        assert_eq!(invert_position(-100), 3100);
    }

    #[test]
    fn invert_round_trips_in_range() {
        for p in (POSITION_MIN..=POSITION_MAX).step_by(25) {
            let p = i64::from(p);
            assert_eq!(invert_position(invert_position(p)), i64::from(clamp_position(p)));
        }
    }

    #[test]
    fn channel_indices_round_trip() {
        for ch in Channel::ALL {
            assert_eq!(Channel::from_index(ch.index()).unwrap(), ch);
        }
        assert!(Channel::from_index(6).is_err());
    }
}
