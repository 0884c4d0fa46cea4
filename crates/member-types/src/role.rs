//! Role tags: the three member categories that drive navigation and content.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Member category.
///
/// Stored as a lowercase string. `School` is the default for members without
/// a stored role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTag {
    /// School student (13-18).
    #[default]
    School,
    /// College student (18-23).
    College,
    /// Working professional (24+).
    Professional,
}

/// A string that is not one of the three role tags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role tag: {0:?}")]
pub struct ParseRoleError(pub String);

impl RoleTag {
    pub const ALL: [RoleTag; 3] = [RoleTag::School, RoleTag::College, RoleTag::Professional];

    /// Wire value, as stored in the role store.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleTag::School => "school",
            RoleTag::College => "college",
            RoleTag::Professional => "professional",
        }
    }

    /// Capitalized title shown on the profile ("College").
    pub fn title(&self) -> &'static str {
        match self {
            RoleTag::School => "School",
            RoleTag::College => "College",
            RoleTag::Professional => "Professional",
        }
    }

    /// Audience description used by the signup form.
    pub fn description(&self) -> &'static str {
        match self {
            RoleTag::School => "School Student (13-18)",
            RoleTag::College => "College Student (18-23)",
            RoleTag::Professional => "Working Professional (24+)",
        }
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleTag {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "school" => Ok(RoleTag::School),
            "college" => Ok(RoleTag::College),
            "professional" => Ok(RoleTag::Professional),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_school() {
        assert_eq!(RoleTag::default(), RoleTag::School);
    }

    #[test]
    fn parse_is_case_insensitive_and_trims() {
        assert_eq!(" College ".parse::<RoleTag>().unwrap(), RoleTag::College);
        assert_eq!("PROFESSIONAL".parse::<RoleTag>().unwrap(), RoleTag::Professional);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "mentor".parse::<RoleTag>().unwrap_err();
        assert_eq!(err, ParseRoleError("mentor".to_string()));
        assert!(err.to_string().contains("mentor"));
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&RoleTag::Professional).unwrap(),
            r#""professional""#
        );
        let role: RoleTag = serde_json::from_str(r#""college""#).unwrap();
        assert_eq!(role, RoleTag::College);
    }

    #[test]
    fn titles_are_capitalized_wire_values() {
        for role in RoleTag::ALL {
            let mut chars = role.as_str().chars();
            let first = chars.next().unwrap().to_ascii_uppercase();
            let expected: String = std::iter::once(first).chain(chars).collect();
            assert_eq!(role.title(), expected);
        }
    }
}
