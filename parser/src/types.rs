use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;

/// Unique per-session player identifier.
///
/// The collector logs it as two adjacent 32-bit decimal counters (low word
/// first); the composed value is `(high << 32) | low`. Every decoder that
/// reads a player id goes through [`PlayerId::from_tokens`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Composes an id from the low and high counter tokens.
    pub fn from_tokens(lo: &str, hi: &str) -> Result<Self, DecodeError> {
        let lo: u32 = parse_counter(lo)?;
        let hi: u32 = parse_counter(hi)?;
        Ok(PlayerId((hi as u64) << 32 | lo as u64))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

fn parse_counter(token: &str) -> Result<u32, DecodeError> {
    token.parse().map_err(|_| DecodeError::MalformedIdentifier {
        token: token.to_string(),
    })
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(v: u64) -> Self {
        PlayerId(v)
    }
}

/// World-space vector logged as a comma-joined token (`"x,y,z"`).
/// Serializes as a 3-element numeric array.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vec3(pub [f64; 3]);

impl Vec3 {
    pub fn x(self) -> f64 {
        self.0[0]
    }

    pub fn y(self) -> f64 {
        self.0[1]
    }

    pub fn z(self) -> f64 {
        self.0[2]
    }
}

impl FromStr for Vec3 {
    type Err = DecodeError;

    /// Exactly 3 comma-separated numeric components; anything else is malformed.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let malformed = || DecodeError::MalformedVector {
            token: token.to_string(),
        };

        let mut components = [0.0f64; 3];
        let mut count = 0;
        for part in token.split(',') {
            if count == 3 {
                return Err(malformed());
            }
            components[count] = part.trim().parse().map_err(|_| malformed())?;
            count += 1;
        }
        if count != 3 {
            return Err(malformed());
        }

        Ok(Vec3(components))
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0[0], self.0[1], self.0[2])
    }
}
