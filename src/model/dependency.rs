use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    str::FromStr,
};

use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};

use super::{ParseError, Version};

macro_rules! case_insensitive_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            value: String,
            key: String,
        }

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                let value = value.into();
                let key = value.to_lowercase();
                $name { value, key }
            }

            pub fn as_str(&self) -> &str {
                &self.value
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.key == other.key
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.key.hash(state)
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.key.cmp(&other.key)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.value)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name::new(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                String::deserialize(deserializer).map($name::new)
            }
        }
    };
}

case_insensitive_name!(
    /// NuGet package id. Compared, hashed and ordered ignoring case.
    PackageName
);

case_insensitive_name!(
    /// Name of a project inside a solution. Compared ignoring case.
    ProjectName
);

/// How a solution wants a package to be tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum UpdateMode {
    /// Pinned. Moves only on request, with `force`, or when a transitive requirement bumps it.
    #[serde(rename = "fixed")]
    Fixed,
    /// Always resolved to the newest version on any feed.
    #[default]
    #[serde(rename = "float")]
    Float,
}

impl FromStr for UpdateMode {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "fixed" => Ok(UpdateMode::Fixed),
            "float" => Ok(UpdateMode::Float),
            _ => Err(ParseError::InvalidUpdateMode(value.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for UpdateMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UpdateModeVisitor;

        impl<'de> Visitor<'de> for UpdateModeVisitor {
            type Value = UpdateMode;

            fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
                formatter.write_str("\"fixed\" or \"float\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(UpdateModeVisitor)
    }
}

impl Display for UpdateMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateMode::Fixed => f.write_str("Fixed"),
            UpdateMode::Float => f.write_str("Float"),
        }
    }
}

/// A solution scoped dependency. A missing version means "latest".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: PackageName,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<Version>,
    #[serde(default)]
    pub mode: UpdateMode,
}

impl Dependency {
    pub fn new(name: impl Into<PackageName>, version: Option<Version>, mode: UpdateMode) -> Self {
        Dependency {
            name: name.into(),
            version,
            mode,
        }
    }

    /// Unconstrained dependency that tracks the latest version.
    pub fn floated(name: impl Into<PackageName>) -> Self {
        Dependency::new(name, None, UpdateMode::Float)
    }

    /// Dependency pinned to `version`.
    pub fn fixed(name: impl Into<PackageName>, version: Version) -> Self {
        Dependency::new(name, Some(version), UpdateMode::Fixed)
    }

    pub fn with_version(self, version: Version) -> Self {
        Dependency {
            version: Some(version),
            ..self
        }
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {} ({})", self.name, version, self.mode),
            None => write!(f, "{} ({})", self.name, self.mode),
        }
    }
}

/// A project's reference to a package. Version and mode belong to the solution; `version` is
/// only what the project's own manifest currently points at, when it records one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectDependency {
    pub name: PackageName,
    pub version: Option<Version>,
}

impl ProjectDependency {
    pub fn new(name: impl Into<PackageName>) -> Self {
        ProjectDependency {
            name: name.into(),
            version: None,
        }
    }

    pub fn at(name: impl Into<PackageName>, version: Version) -> Self {
        ProjectDependency {
            name: name.into(),
            version: Some(version),
        }
    }
}
