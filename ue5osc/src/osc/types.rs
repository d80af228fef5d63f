//! Values exchanged with the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Player location in Unreal units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Location {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x={} y={} z={}", self.x, self.y, self.z)
    }
}

/// Player rotation in degrees.
///
/// The engine replies to `/get/rotation` in `roll, pitch, yaw` order but
/// expects `/set/rotation` as `pitch, roll, yaw`; [`Rotation::from_reply_order`]
/// and [`Rotation::to_command_order`] own that reordering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
}

impl Rotation {
    #[must_use]
    pub const fn new(roll: f32, pitch: f32, yaw: f32) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Builds a rotation from the three values of a `/get/rotation` reply.
    #[must_use]
    pub const fn from_reply_order([roll, pitch, yaw]: [f32; 3]) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Argument order of `/set/rotation`.
    #[must_use]
    pub const fn to_command_order(self) -> [f32; 3] {
        [self.pitch, self.roll, self.yaw]
    }

    /// Same rotation with a different yaw.
    #[must_use]
    pub const fn with_yaw(self, yaw: f32) -> Self {
        Self { yaw, ..self }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "roll={} pitch={} yaw={}",
            self.roll, self.pitch, self.yaw
        )
    }
}

/// Screenshot resolution, sent as `"WxH"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// # Errors
    ///
    /// Returns [`Error::InvalidResolution`] if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidResolution(format!("{width}x{height}")));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidResolution(s.to_owned());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width = w.trim().parse().map_err(|_| invalid())?;
        let height = h.trim().parse().map_err(|_| invalid())?;
        Self::new(width, height).map_err(|_| invalid())
    }
}

/// Engine scalability level, 0 (lowest) to 4 (cinematic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const LOW: Self = Self(0);
    pub const MEDIUM: Self = Self(1);
    pub const HIGH: Self = Self(2);
    pub const EPIC: Self = Self(3);
    pub const CINEMATIC: Self = Self(4);

    /// # Errors
    ///
    /// Returns [`Error::InvalidQuality`] for levels above 4.
    pub fn new(level: u8) -> Result<Self, Error> {
        if level > Self::CINEMATIC.0 {
            return Err(Error::InvalidQuality(level));
        }
        Ok(Self(level))
    }

    #[must_use]
    pub const fn level(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quality {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<Quality> for u8 {
    fn from(q: Quality) -> Self {
        q.0
    }
}
