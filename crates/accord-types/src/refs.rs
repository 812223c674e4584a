use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    #[error("invalid role '{value}': must be non-empty without '/', '@', or whitespace")]
    InvalidRole { value: String },
    #[error("invalid version '{value}': expected major[.minor[.patch|*]], eg 1.0.2")]
    InvalidVersion { value: String },
}

/// The name of the service a contract describes. Embedded verbatim in wire
/// paths, so the separators used there are excluded.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Role(String);

impl Role {
    pub fn new(value: impl Into<String>) -> Result<Self, RefError> {
        let value = value.into();
        if is_valid_role(&value) {
            Ok(Role(value))
        } else {
            Err(RefError::InvalidRole { value })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Role::new(s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for Role {
    type Err = RefError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::new(s)
    }
}

/// Simple semantic version: `major`, optionally `.minor`, optionally a third
/// segment that is either digits or the `*` wildcard.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Version(String);

impl Version {
    pub fn new(value: impl Into<String>) -> Result<Self, RefError> {
        let value = value.into();
        if is_valid_version(&value) {
            Ok(Version(value))
        } else {
            Err(RefError::InvalidVersion { value })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::new(s).map_err(serde::de::Error::custom)
    }
}

impl FromStr for Version {
    type Err = RefError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::new(s)
    }
}

fn is_valid_role(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| !c.is_whitespace() && c != '/' && c != '@')
}

fn is_valid_version(value: &str) -> bool {
    let mut segments = value.split('.');
    let Some(major) = segments.next() else {
        return false;
    };
    if !is_digits(major) {
        return false;
    }
    if let Some(minor) = segments.next() {
        if !is_digits(minor) {
            return false;
        }
    }
    if let Some(patch) = segments.next() {
        if patch != "*" && !is_digits(patch) {
            return false;
        }
    }
    segments.next().is_none()
}

fn is_digits(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_validation() {
        assert!(Role::new("calc").is_ok());
        assert!(Role::new("file-store.v2").is_ok());
        assert!(Role::new("").is_err());
        assert!(Role::new("a/b").is_err());
        assert!(Role::new("a@b").is_err());
        assert!(Role::new("a b").is_err());
    }

    #[test]
    fn version_validation() {
        assert!(Version::new("1").is_ok());
        assert!(Version::new("1.0").is_ok());
        assert!(Version::new("1.0.2").is_ok());
        assert!(Version::new("1.0.*").is_ok());
        assert!(Version::new("").is_err());
        assert!(Version::new("1.*").is_err());
        assert!(Version::new("*").is_err());
        assert!(Version::new("1.0.2.3").is_err());
        assert!(Version::new("1.").is_err());
        assert!(Version::new("v1").is_err());
    }

    #[test]
    fn refs_round_trip_through_serde() {
        let role: Role = serde_json::from_str("\"calc\"").expect("role");
        assert_eq!(role.as_str(), "calc");
        assert!(serde_json::from_str::<Version>("\"nope\"").is_err());
    }
}
