//! Resource to candidate input extraction, one matcher per `ResourceMatchTarget`

use regex::Regex;
use std::sync::Arc;
use tracing::debug;

use super::group::match_groups;
use super::AllowedGroups;
use crate::config::{PolicyConfig, ResourceMatchTarget};
use crate::directory::GroupDirectory;
use crate::error::Result;
use crate::pattern::{self, PatternCache};
use crate::types::Resource;

/// Resolves the groups a policy allows for a resource
///
/// Borrows its collaborators so one resolver can be built per evaluation
/// without cloning the directory handle.
pub struct ResourceGroupResolver<'a> {
    directory: &'a dyn GroupDirectory,
    patterns: &'a PatternCache,
}

impl<'a> ResourceGroupResolver<'a> {
    /// Create a resolver over a group directory and a compiled-pattern cache
    pub fn new(directory: &'a dyn GroupDirectory, patterns: &'a PatternCache) -> Self {
        Self {
            directory,
            patterns,
        }
    }

    /// Groups allowed for `resource` under `config`
    ///
    /// Returns `Ok(None)` when the policy does not apply to the resource.
    ///
    /// # Errors
    ///
    /// Returns `AuthzError::Configuration` for a malformed pattern, and
    /// propagates directory failures unchanged.
    pub fn resolve_allowed_groups(
        &self,
        resource: &Resource,
        config: &PolicyConfig,
    ) -> Result<AllowedGroups> {
        // Compiled up front so a malformed pattern fails even when the
        // resource has nothing to match against
        let regex = match config.pattern() {
            Some(source) => Some(self.patterns.get_or_compile(source)?),
            None => None,
        };

        match config.resource_match_target {
            ResourceMatchTarget::Name => self.match_by_name(resource, regex, config),
            ResourceMatchTarget::Uri => self.match_by_uris(resource, regex, config),
            ResourceMatchTarget::Attribute => self.match_by_attribute(resource, regex, config),
        }
    }

    /// Candidate input is the resource name; an unmatched pattern ends resolution
    fn match_by_name(
        &self,
        resource: &Resource,
        regex: Option<Arc<Regex>>,
        config: &PolicyConfig,
    ) -> Result<AllowedGroups> {
        match candidate(&resource.name, regex.as_deref()) {
            Some(input) => match_groups(self.directory, &input, config),
            None => {
                debug!("Resource name {:?} does not match the policy pattern", resource.name);
                Ok(None)
            }
        }
    }

    /// Candidate inputs are the resource URIs, in order
    fn match_by_uris(
        &self,
        resource: &Resource,
        regex: Option<Arc<Regex>>,
        config: &PolicyConfig,
    ) -> Result<AllowedGroups> {
        self.first_match(resource.uris.iter(), regex.as_deref(), config)
    }

    /// Candidate inputs are the values of the configured resource attribute, in order
    fn match_by_attribute(
        &self,
        resource: &Resource,
        regex: Option<Arc<Regex>>,
        config: &PolicyConfig,
    ) -> Result<AllowedGroups> {
        let Some(attribute) = config.resource_match_attribute_name() else {
            debug!("Resource match target is ATTRIBUTE but no attribute name is set");
            return Ok(None);
        };

        match resource.attribute(attribute) {
            Some(values) => self.first_match(values.iter(), regex.as_deref(), config),
            None => {
                debug!("Resource {:?} has no attribute {:?}", resource.name, attribute);
                Ok(None)
            }
        }
    }

    /// First non-empty group resolution over a sequence of raw values
    fn first_match<'v>(
        &self,
        values: impl Iterator<Item = &'v String>,
        regex: Option<&Regex>,
        config: &PolicyConfig,
    ) -> Result<AllowedGroups> {
        for value in values {
            let Some(input) = candidate(value, regex) else {
                continue;
            };

            if let Some(groups) = match_groups(self.directory, &input, config)? {
                return Ok(Some(groups));
            }
        }

        Ok(None)
    }
}

/// Candidate input for a raw value: the value itself, or the pattern's first capture
fn candidate(value: &str, regex: Option<&Regex>) -> Option<String> {
    match regex {
        Some(regex) => pattern::extract(regex, value),
        None => Some(value.to_string()),
    }
}
