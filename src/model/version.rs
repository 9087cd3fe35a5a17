use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    sync::OnceLock,
};

use regex_lite::Regex;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};

use super::ParseError;

/// A four component NuGet version: `major.minor.build.revision`.
///
/// Ordering is component-wise, so "latest of a set" is simply the maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Version {
        Version {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parses `1`, `1.2`, `1.2.3` or `1.2.3.4`. Missing components are zero.
    pub fn parse(s: &str) -> Result<Version, ParseError> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"^(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<build>\d+))?(?:\.(?P<revision>\d+))?$")
                .expect("version pattern is valid")
        });

        let trimmed = s.trim();
        let captures = re
            .captures(trimmed)
            .ok_or_else(|| ParseError::InvalidVersion(s.to_string()))?;

        let component = |name: &str| -> Result<u32, ParseError> {
            match captures.name(name) {
                Some(m) => m
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| ParseError::VersionOverflow(s.to_string())),
                None => Ok(0),
            }
        };

        Ok(Version {
            major: component("major")?,
            minor: component("minor")?,
            build: component("build")?,
            revision: component("revision")?,
        })
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionVisitor;

        impl<'de> Visitor<'de> for VersionVisitor {
            type Value = Version;

            fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                formatter.write_str("a version string such as \"1.2.0.0\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Version::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(VersionVisitor)
    }
}
