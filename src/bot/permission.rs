//! Who may use the command, and where.

use crate::config::PluginConfig;

use super::event::ChatEvent;

/// Outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Allowed,
    BlockedUser,
    BlockedGroup,
    GroupNotAllowed,
    PrivateDisabled,
}

impl Permission {
    pub fn is_allowed(self) -> bool {
        self == Permission::Allowed
    }
}

/// Check whether `event` may trigger the command under `config`.
///
/// A blocked user is refused everywhere. Group checks apply the block list
/// before the allow list; an empty allow list admits every group.
pub fn check_permission(config: &PluginConfig, event: &ChatEvent) -> Permission {
    if config.blocked_users.contains(&event.user_id) {
        return Permission::BlockedUser;
    }

    match event.group_id {
        Some(group_id) => {
            if config.blocked_groups.contains(&group_id) {
                Permission::BlockedGroup
            } else if !config.allowed_groups.is_empty() && !config.allowed_groups.contains(&group_id) {
                Permission::GroupNotAllowed
            } else {
                Permission::Allowed
            }
        }
        None if !config.allow_private => Permission::PrivateDisabled,
        None => Permission::Allowed,
    }
}
