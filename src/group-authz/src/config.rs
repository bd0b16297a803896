//! Group-membership policy configuration
//!
//! A policy is persisted by the host as a string-keyed map. [`PolicyConfig`]
//! is the typed, immutable view resolved from that map once per evaluation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{AuthzError, Result};
use crate::pattern;

/// Config key: name of the claim carrying the identity's groups
pub const GROUPS_CLAIM: &str = "groupsClaim";
/// Config key: optional full-match regex with one capturing group
pub const PATTERN: &str = "pattern";
/// Config key: which part of the resource feeds group matching
pub const RESOURCE_MATCH_TARGET: &str = "resourceMatchTarget";
/// Config key: resource attribute read when the resource target is ATTRIBUTE
pub const RESOURCE_MATCH_ATTRIBUTE_NAME: &str = "resourceMatchAttributeName";
/// Config key: which part of the group the candidate input is compared to
pub const GROUP_MATCH_TARGET: &str = "groupMatchTarget";
/// Config key: group attribute compared when the group target is ATTRIBUTE
pub const GROUP_MATCH_ATTRIBUTE_NAME: &str = "groupMatchAttributeName";

/// Part of the resource used to derive the candidate input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceMatchTarget {
    /// The resource name
    Name,
    /// Each resource URI, in order
    Uri,
    /// Each value of a named resource attribute, in order
    Attribute,
}

impl ResourceMatchTarget {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Uri => "URI",
            Self::Attribute => "ATTRIBUTE",
        }
    }
}

impl fmt::Display for ResourceMatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceMatchTarget {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NAME" => Ok(Self::Name),
            "URI" => Ok(Self::Uri),
            "ATTRIBUTE" => Ok(Self::Attribute),
            other => Err(AuthzError::Configuration(format!(
                "unknown resource match target '{}'",
                other
            ))),
        }
    }
}

/// Part of the group compared against the candidate input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupMatchTarget {
    /// Group identifier lookup
    Id,
    /// Directory name search
    Name,
    /// First value of a named group attribute
    Attribute,
}

impl GroupMatchTarget {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Name => "NAME",
            Self::Attribute => "ATTRIBUTE",
        }
    }
}

impl fmt::Display for GroupMatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupMatchTarget {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ID" => Ok(Self::Id),
            "NAME" => Ok(Self::Name),
            "ATTRIBUTE" => Ok(Self::Attribute),
            other => Err(AuthzError::Configuration(format!(
                "unknown group match target '{}'",
                other
            ))),
        }
    }
}

/// Group-membership policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    /// Claim carrying the identity's groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_claim: Option<String>,

    /// Full-match regex; the first capturing group becomes the candidate input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Where the candidate input comes from on the resource
    pub resource_match_target: ResourceMatchTarget,

    /// Resource attribute read when `resource_match_target` is ATTRIBUTE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_match_attribute_name: Option<String>,

    /// How the candidate input selects groups
    pub group_match_target: GroupMatchTarget,

    /// Group attribute compared when `group_match_target` is ATTRIBUTE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_match_attribute_name: Option<String>,
}

impl PolicyConfig {
    /// Create a configuration with the two match targets and nothing else set
    pub fn new(resource_match_target: ResourceMatchTarget, group_match_target: GroupMatchTarget) -> Self {
        Self {
            groups_claim: None,
            pattern: None,
            resource_match_target,
            resource_match_attribute_name: None,
            group_match_target,
            group_match_attribute_name: None,
        }
    }

    /// Set the groups claim
    pub fn with_groups_claim(mut self, claim: impl Into<String>) -> Self {
        self.groups_claim = Some(claim.into());
        self
    }

    /// Set the pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Set the resource attribute name
    pub fn with_resource_match_attribute(mut self, name: impl Into<String>) -> Self {
        self.resource_match_attribute_name = Some(name.into());
        self
    }

    /// Set the group attribute name
    pub fn with_group_match_attribute(mut self, name: impl Into<String>) -> Self {
        self.group_match_attribute_name = Some(name.into());
        self
    }

    /// Groups claim, if set to a non-empty name
    pub fn groups_claim(&self) -> Option<&str> {
        non_empty(&self.groups_claim)
    }

    /// Pattern, if set to a non-empty expression
    pub fn pattern(&self) -> Option<&str> {
        non_empty(&self.pattern)
    }

    /// Resource attribute name, if set to a non-empty name
    pub fn resource_match_attribute_name(&self) -> Option<&str> {
        non_empty(&self.resource_match_attribute_name)
    }

    /// Group attribute name, if set to a non-empty name
    pub fn group_match_attribute_name(&self) -> Option<&str> {
        non_empty(&self.group_match_attribute_name)
    }

    /// Resolve a configuration from its persisted string-keyed form
    ///
    /// Match targets are parsed case-insensitively. Empty optional values are
    /// treated as unset.
    ///
    /// # Errors
    /// Returns `AuthzError::Configuration` if a match target is missing or unknown
    pub fn from_config_map(config: &HashMap<String, String>) -> Result<Self> {
        let resource_match_target: ResourceMatchTarget = config
            .get(RESOURCE_MATCH_TARGET)
            .ok_or_else(|| missing_key(RESOURCE_MATCH_TARGET))?
            .parse()?;
        let group_match_target: GroupMatchTarget = config
            .get(GROUP_MATCH_TARGET)
            .ok_or_else(|| missing_key(GROUP_MATCH_TARGET))?
            .parse()?;

        let optional = |key: &str| config.get(key).filter(|v| !v.is_empty()).cloned();

        Ok(Self {
            groups_claim: optional(GROUPS_CLAIM),
            pattern: optional(PATTERN),
            resource_match_target,
            resource_match_attribute_name: optional(RESOURCE_MATCH_ATTRIBUTE_NAME),
            group_match_target,
            group_match_attribute_name: optional(GROUP_MATCH_ATTRIBUTE_NAME),
        })
    }

    /// Render the persisted string-keyed form
    ///
    /// Attribute names are written only for ATTRIBUTE targets, each from its
    /// own field.
    pub fn to_config_map(&self) -> HashMap<String, String> {
        let mut config = HashMap::new();

        if let Some(claim) = self.groups_claim() {
            config.insert(GROUPS_CLAIM.to_string(), claim.to_string());
        }
        if let Some(pattern) = self.pattern() {
            config.insert(PATTERN.to_string(), pattern.to_string());
        }

        config.insert(
            RESOURCE_MATCH_TARGET.to_string(),
            self.resource_match_target.to_string(),
        );
        if self.resource_match_target == ResourceMatchTarget::Attribute {
            if let Some(name) = self.resource_match_attribute_name() {
                config.insert(RESOURCE_MATCH_ATTRIBUTE_NAME.to_string(), name.to_string());
            }
        }

        config.insert(GROUP_MATCH_TARGET.to_string(), self.group_match_target.to_string());
        if self.group_match_target == GroupMatchTarget::Attribute {
            if let Some(name) = self.group_match_attribute_name() {
                config.insert(GROUP_MATCH_ATTRIBUTE_NAME.to_string(), name.to_string());
            }
        }

        config
    }

    /// Validate the configuration for authoring
    ///
    /// Evaluation tolerates a missing attribute name (the policy simply never
    /// grants); this check is for rejecting such policies before they are stored.
    pub fn validate(&self) -> Result<()> {
        if self.resource_match_target == ResourceMatchTarget::Attribute
            && self.resource_match_attribute_name().is_none()
        {
            return Err(AuthzError::Configuration(format!(
                "{} is required when {} is ATTRIBUTE",
                RESOURCE_MATCH_ATTRIBUTE_NAME, RESOURCE_MATCH_TARGET
            )));
        }

        if self.group_match_target == GroupMatchTarget::Attribute
            && self.group_match_attribute_name().is_none()
        {
            return Err(AuthzError::Configuration(format!(
                "{} is required when {} is ATTRIBUTE",
                GROUP_MATCH_ATTRIBUTE_NAME, GROUP_MATCH_TARGET
            )));
        }

        if let Some(source) = self.pattern() {
            let regex = pattern::compile(source)?;
            if regex.captures_len() < 2 {
                return Err(AuthzError::Configuration(format!(
                    "pattern '{}' has no capturing group",
                    source
                )));
            }
        }

        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn missing_key(key: &str) -> AuthzError {
    AuthzError::Configuration(format!("missing required key '{}'", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_targets_parse_case_insensitively() {
        assert_eq!("name".parse::<ResourceMatchTarget>().unwrap(), ResourceMatchTarget::Name);
        assert_eq!("Uri".parse::<ResourceMatchTarget>().unwrap(), ResourceMatchTarget::Uri);
        assert_eq!("ATTRIBUTE".parse::<GroupMatchTarget>().unwrap(), GroupMatchTarget::Attribute);
        assert_eq!("id".parse::<GroupMatchTarget>().unwrap(), GroupMatchTarget::Id);

        assert!("path".parse::<ResourceMatchTarget>().is_err());
        assert!("uri".parse::<GroupMatchTarget>().is_err());
    }

    #[test]
    fn test_from_config_map() {
        let config = PolicyConfig::from_config_map(&map(&[
            (GROUPS_CLAIM, "groups"),
            (PATTERN, "^/groups/(.+)$"),
            (RESOURCE_MATCH_TARGET, "uri"),
            (GROUP_MATCH_TARGET, "id"),
        ]))
        .unwrap();

        assert_eq!(config.groups_claim(), Some("groups"));
        assert_eq!(config.pattern(), Some("^/groups/(.+)$"));
        assert_eq!(config.resource_match_target, ResourceMatchTarget::Uri);
        assert_eq!(config.group_match_target, GroupMatchTarget::Id);
        assert_eq!(config.resource_match_attribute_name(), None);
    }

    #[test]
    fn test_from_config_map_empty_values_are_unset() {
        let config = PolicyConfig::from_config_map(&map(&[
            (GROUPS_CLAIM, ""),
            (PATTERN, ""),
            (RESOURCE_MATCH_TARGET, "NAME"),
            (GROUP_MATCH_TARGET, "NAME"),
        ]))
        .unwrap();

        assert_eq!(config.groups_claim, None);
        assert_eq!(config.pattern, None);
    }

    #[test]
    fn test_from_config_map_missing_target() {
        let err = PolicyConfig::from_config_map(&map(&[(GROUP_MATCH_TARGET, "NAME")])).unwrap_err();
        assert!(matches!(err, AuthzError::Configuration(_)));

        let err = PolicyConfig::from_config_map(&map(&[(RESOURCE_MATCH_TARGET, "NAME")])).unwrap_err();
        assert!(matches!(err, AuthzError::Configuration(_)));
    }

    #[test]
    fn test_to_config_map_threads_attribute_names_independently() {
        let config = PolicyConfig::new(ResourceMatchTarget::Attribute, GroupMatchTarget::Attribute)
            .with_resource_match_attribute("team")
            .with_group_match_attribute("team-code");

        let persisted = config.to_config_map();
        assert_eq!(persisted.get(RESOURCE_MATCH_TARGET).map(String::as_str), Some("ATTRIBUTE"));
        assert_eq!(persisted.get(RESOURCE_MATCH_ATTRIBUTE_NAME).map(String::as_str), Some("team"));
        assert_eq!(persisted.get(GROUP_MATCH_ATTRIBUTE_NAME).map(String::as_str), Some("team-code"));

        assert_eq!(PolicyConfig::from_config_map(&persisted).unwrap(), config);
    }

    #[test]
    fn test_to_config_map_drops_unused_attribute_names() {
        let config = PolicyConfig::new(ResourceMatchTarget::Name, GroupMatchTarget::Id)
            .with_resource_match_attribute("stale")
            .with_group_match_attribute("stale");

        let persisted = config.to_config_map();
        assert!(!persisted.contains_key(RESOURCE_MATCH_ATTRIBUTE_NAME));
        assert!(!persisted.contains_key(GROUP_MATCH_ATTRIBUTE_NAME));
        assert!(!persisted.contains_key(GROUPS_CLAIM));
        assert!(!persisted.contains_key(PATTERN));
    }

    #[test]
    fn test_validate() {
        let valid = PolicyConfig::new(ResourceMatchTarget::Uri, GroupMatchTarget::Id)
            .with_pattern(r"/groups/(\d+)");
        assert!(valid.validate().is_ok());

        let missing_resource_attr =
            PolicyConfig::new(ResourceMatchTarget::Attribute, GroupMatchTarget::Name);
        assert!(missing_resource_attr.validate().is_err());

        let missing_group_attr = PolicyConfig::new(ResourceMatchTarget::Name, GroupMatchTarget::Attribute)
            .with_group_match_attribute("");
        assert!(missing_group_attr.validate().is_err());

        let malformed = PolicyConfig::new(ResourceMatchTarget::Name, GroupMatchTarget::Name)
            .with_pattern("(unclosed");
        assert!(malformed.validate().is_err());

        let no_group = PolicyConfig::new(ResourceMatchTarget::Name, GroupMatchTarget::Name)
            .with_pattern(r"team-\w+");
        assert!(no_group.validate().is_err());
    }

    #[test]
    fn test_serde_camel_case() {
        let config = PolicyConfig::new(ResourceMatchTarget::Attribute, GroupMatchTarget::Name)
            .with_groups_claim("groups")
            .with_resource_match_attribute("team");

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["groupsClaim"], "groups");
        assert_eq!(json["resourceMatchTarget"], "ATTRIBUTE");
        assert_eq!(json["resourceMatchAttributeName"], "team");
        assert_eq!(json["groupMatchTarget"], "NAME");
        assert!(json.get("pattern").is_none());

        let back: PolicyConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
