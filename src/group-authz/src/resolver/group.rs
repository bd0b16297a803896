//! Candidate input to group resolution, one matcher per `GroupMatchTarget`

use tracing::debug;

use super::AllowedGroups;
use crate::config::{GroupMatchTarget, PolicyConfig};
use crate::directory::GroupDirectory;
use crate::error::Result;
use crate::types::Group;

/// Resolve the groups selected by a candidate input
///
/// Empty inputs and empty directory results both yield `None`.
pub(super) fn match_groups(
    directory: &dyn GroupDirectory,
    input: &str,
    config: &PolicyConfig,
) -> Result<AllowedGroups> {
    if input.is_empty() {
        return Ok(None);
    }

    let groups = match config.group_match_target {
        GroupMatchTarget::Id => match_by_id(directory, input)?,
        GroupMatchTarget::Name => match_by_name(directory, input)?,
        GroupMatchTarget::Attribute => match config.group_match_attribute_name() {
            Some(attribute) => match_by_attribute(directory, input, attribute)?,
            None => {
                debug!("Group match target is ATTRIBUTE but no attribute name is set");
                return Ok(None);
            }
        },
    };

    debug!(
        "Candidate {:?} matched {} group(s) by {}",
        input,
        groups.len(),
        config.group_match_target
    );

    if groups.is_empty() {
        Ok(None)
    } else {
        Ok(Some(groups))
    }
}

/// Exactly one group by identifier
fn match_by_id(directory: &dyn GroupDirectory, id: &str) -> Result<Vec<Group>> {
    Ok(directory.find_by_id(id)?.into_iter().collect())
}

/// Every group the directory's name search returns, in directory order
fn match_by_name(directory: &dyn GroupDirectory, name: &str) -> Result<Vec<Group>> {
    directory.search_by_name(name)
}

/// Every group whose first value for `attribute` equals the input
fn match_by_attribute(
    directory: &dyn GroupDirectory,
    input: &str,
    attribute: &str,
) -> Result<Vec<Group>> {
    Ok(directory
        .all_groups()?
        .into_iter()
        .filter(|group| group.first_attribute(attribute) == Some(input))
        .collect())
}
