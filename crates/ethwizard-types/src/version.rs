// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Version parsing and comparison module
//!
//! Client binaries, status endpoints and release tags all report versions in
//! slightly different shapes (`v22.9.0`, `1.10.23-stable`,
//! `1.14.1+a4d1e4b3`). Only the numeric `X.Y.Z` core takes part in ordering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version format: {0}, expected X.Y.Z")]
    Format(String),

    #[error("invalid {part} version component: {value}")]
    Component { part: &'static str, value: String },
}

/// A parsed `major.minor.patch` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parse semver-like version strings (e.g., "22.9.0", "v1.10.23-stable",
/// "1.14.1+a4d1e4b3"). Pre-release and build suffixes are dropped.
pub fn parse_version(s: &str) -> Result<Version, VersionError> {
    let s = version_from_tag(s.trim());
    let core = s.split(['-', '+']).next().unwrap_or_default();
    let parts: Vec<&str> = core.split('.').collect();

    if parts.len() != 3 {
        return Err(VersionError::Format(s.to_owned()));
    }

    let component = |part: &'static str, value: &str| {
        value.parse::<u32>().map_err(|_| VersionError::Component {
            part,
            value: value.to_owned(),
        })
    };

    Ok(Version {
        major: component("major", parts[0])?,
        minor: component("minor", parts[1])?,
        patch: component("patch", parts[2])?,
    })
}

/// Extract version from GitHub release tag (strips leading "v")
pub fn version_from_tag(tag: &str) -> &str {
    tag.trim_start_matches('v').trim_start_matches('V')
}

/// A probed version that may not be determinable.
///
/// `Unknown` never takes part in an ordering comparison: every comparison
/// helper answers `false` when either side is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionValue {
    Known(Version),
    #[default]
    Unknown,
}

impl VersionValue {
    pub fn known(&self) -> Option<Version> {
        match self {
            Self::Known(version) => Some(*version),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Parse leniently, degrading to `Unknown` on failure
    pub fn parse(s: &str) -> Self {
        parse_version(s).map_or(Self::Unknown, Self::Known)
    }

    /// Ordering that is only defined when both sides are known
    pub fn partial_cmp_known(&self, other: &Self) -> Option<Ordering> {
        Some(self.known()?.cmp(&other.known()?))
    }

    /// `true` only when both values are known and `self < other`
    pub fn is_known_less_than(&self, other: &Self) -> bool {
        self.partial_cmp_known(other) == Some(Ordering::Less)
    }

    /// `true` only when both values are known and `self >= other`
    pub fn is_known_at_least(&self, other: &Self) -> bool {
        matches!(
            self.partial_cmp_known(other),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }

    /// `self` when known, otherwise `fallback`
    pub fn or(self, fallback: Self) -> Self {
        if self.is_known() { self } else { fallback }
    }
}

impl From<Version> for VersionValue {
    fn from(version: Version) -> Self {
        Self::Known(version)
    }
}

impl From<Option<Version>> for VersionValue {
    fn from(version: Option<Version>) -> Self {
        version.map_or(Self::Unknown, Self::Known)
    }
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(version) => write!(f, "{version}"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// All versions known about one managed unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VersionSet {
    /// Version the on-disk binary reports
    pub installed: VersionValue,
    /// Version the live process reports; lags `installed` until restarted
    pub running: VersionValue,
    /// Newest version the distribution channel can supply right now
    pub available: VersionValue,
    /// Newest upstream release
    pub latest: VersionValue,
}

impl VersionSet {
    /// The version an upgrade would install: `available` when the channel
    /// reports one, `latest` otherwise.
    pub fn upgrade_target(&self) -> VersionValue {
        self.available.or(self.latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("22.9.0").unwrap(), Version::new(22, 9, 0));
        assert_eq!(parse_version("v1.10.23").unwrap(), Version::new(1, 10, 23));
        assert_eq!(parse_version("V0.2.38").unwrap(), Version::new(0, 2, 38));
        assert_eq!(
            parse_version("1.10.23-stable").unwrap(),
            Version::new(1, 10, 23)
        );
        assert_eq!(
            parse_version("1.14.1+a4d1e4b3").unwrap(),
            Version::new(1, 14, 1)
        );
    }

    #[test]
    fn test_parse_version_invalid() {
        assert!(parse_version("invalid").is_err());
        assert!(parse_version("1.2").is_err());
        assert!(parse_version("1.2.3.4").is_err());
        assert!(matches!(
            parse_version("a.b.c"),
            Err(VersionError::Component { part: "major", .. })
        ));
    }

    #[test]
    fn test_version_ordering() {
        assert!(Version::new(1, 2, 0) < Version::new(1, 3, 0));
        assert!(Version::new(1, 10, 0) > Version::new(1, 9, 99));
        assert!(Version::new(2, 0, 0) > Version::new(1, 99, 99));
        assert!(Version::new(0, 2, 38) < Version::new(0, 2, 39));
    }

    #[test]
    fn test_ordering_is_transitive() {
        let versions = [
            Version::new(0, 9, 9),
            Version::new(1, 0, 0),
            Version::new(1, 0, 1),
            Version::new(1, 1, 0),
            Version::new(10, 0, 0),
        ];
        for a in &versions {
            for b in &versions {
                for c in &versions {
                    if a < b && b < c {
                        assert!(a < c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unknown_never_compares() {
        let known = VersionValue::Known(Version::new(1, 0, 0));
        let unknown = VersionValue::Unknown;
        assert!(!unknown.is_known_less_than(&known));
        assert!(!known.is_known_less_than(&unknown));
        assert!(!unknown.is_known_less_than(&unknown));
        assert!(!unknown.is_known_at_least(&known));
        assert!(!known.is_known_at_least(&unknown));
    }

    #[test]
    fn test_known_comparisons() {
        let old = VersionValue::parse("1.2.0");
        let new = VersionValue::parse("1.3.0");
        assert!(old.is_known_less_than(&new));
        assert!(!new.is_known_less_than(&old));
        assert!(!old.is_known_less_than(&old));
        assert!(new.is_known_at_least(&old));
        assert!(old.is_known_at_least(&old));
    }

    #[test]
    fn test_upgrade_target_prefers_available() {
        let set = VersionSet {
            available: VersionValue::parse("1.2.5"),
            latest: VersionValue::parse("1.3.0"),
            ..Default::default()
        };
        assert_eq!(set.upgrade_target(), VersionValue::parse("1.2.5"));

        let set = VersionSet {
            latest: VersionValue::parse("1.3.0"),
            ..Default::default()
        };
        assert_eq!(set.upgrade_target(), VersionValue::parse("1.3.0"));
    }

    #[test]
    fn test_version_value_display() {
        assert_eq!(VersionValue::parse("v22.9.0").to_string(), "22.9.0");
        assert_eq!(VersionValue::Unknown.to_string(), "unknown");
    }
}
