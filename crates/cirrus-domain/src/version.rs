use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Errors raised while parsing agent version strings.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version number {0:?}")]
    InvalidNumber(String),
    #[error("invalid binary version {0:?}")]
    InvalidBinary(String),
    #[error("no build number follows {0}")]
    BuildOverflow(Number),
}

/// Agent version number, `major.minor.patch[.build]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Number {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl Number {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Development builds have an odd minor number or a non-zero build number.
    #[must_use]
    pub fn is_dev(&self) -> bool {
        self.minor % 2 != 0 || self.build > 0
    }

    #[must_use]
    pub fn same_series(&self, other: &Number) -> bool {
        self.major == other.major && self.minor == other.minor
    }

    /// Returns this number with the build component incremented.
    ///
    /// # Errors
    /// Returns [`VersionError::BuildOverflow`] when the build number is already at its maximum.
    pub fn next_build(&self) -> Result<Self, VersionError> {
        let build = self
            .build
            .checked_add(1)
            .ok_or(VersionError::BuildOverflow(*self))?;
        Ok(Self { build, ..*self })
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.build).cmp(&(
            other.major,
            other.minor,
            other.patch,
            other.build,
        ))
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.build > 0 {
            write!(f, ".{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for Number {
    type Err = VersionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidNumber(raw.to_string());
        let parts = raw
            .trim()
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                part.parse::<u32>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [major, minor, patch] => Ok(Self::new(*major, *minor, *patch, 0)),
            [major, minor, patch, build] => Ok(Self::new(*major, *minor, *patch, *build)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Number {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Number> for String {
    fn from(value: Number) -> Self {
        value.to_string()
    }
}

/// A version number qualified with the series and architecture it was built for,
/// written `1.18.0-trusty-amd64`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binary {
    pub number: Number,
    pub series: String,
    pub arch: String,
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.number, self.series, self.arch)
    }
}

impl FromStr for Binary {
    type Err = VersionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidBinary(raw.to_string());
        let mut parts = raw.trim().splitn(3, '-');
        let (Some(number), Some(series), Some(arch)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if series.is_empty() || arch.is_empty() || arch.contains('-') {
            return Err(invalid());
        }
        Ok(Self {
            number: number.parse().map_err(|_| invalid())?,
            series: series.to_string(),
            arch: arch.to_string(),
        })
    }
}
