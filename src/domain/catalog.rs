//! Workspace catalog built once per run.
//!
//! Holds the user list and the conversation listing split into the three
//! exportable categories, plus the user name/id index used for display and
//! DM filtering.

use std::collections::HashMap;

use super::models::{Conversation, User};

/// Bidirectional user id/name lookup.
#[derive(Debug, Clone, Default)]
pub struct UserIndex {
    names_by_id: HashMap<String, String>,
    ids_by_name: HashMap<String, String>,
}

impl UserIndex {
    /// Builds the index from the user list.
    #[must_use]
    pub fn from_users(users: &[User]) -> Self {
        let mut index = Self::default();
        for user in users {
            let Some(name) = &user.name else { continue };
            index.names_by_id.insert(user.id.clone(), name.clone());
            index.ids_by_name.insert(name.clone(), user.id.clone());
        }
        index
    }

    #[must_use]
    pub fn name_of(&self, user_id: &str) -> Option<&str> {
        self.names_by_id.get(user_id).map(String::as_str)
    }

    #[must_use]
    pub fn id_of(&self, user_name: &str) -> Option<&str> {
        self.ids_by_name.get(user_name).map(String::as_str)
    }

    /// Resolves a user name to its id; anything unknown is assumed to be an id.
    #[must_use]
    pub fn resolve_id<'a>(&'a self, name_or_id: &'a str) -> &'a str {
        self.id_of(name_or_id).unwrap_or(name_or_id)
    }

    /// Label for a DM peer, falling back to the raw id.
    #[must_use]
    pub fn display_name(&self, user_id: &str) -> String {
        self.name_of(user_id)
            .map_or_else(|| format!("{user_id} (name unknown)"), str::to_string)
    }
}

/// Everything bootstrapped from the workspace before selection.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub users: Vec<User>,
    /// Public channels.
    pub channels: Vec<Conversation>,
    /// Private channels and multi-party DMs.
    pub groups: Vec<Conversation>,
    /// 1:1 DMs.
    pub dms: Vec<Conversation>,
    pub user_index: UserIndex,
}

impl Catalog {
    /// Partitions one workspace-wide conversation listing by its flags.
    #[must_use]
    pub fn from_listing(users: Vec<User>, conversations: Vec<Conversation>) -> Self {
        let mut catalog = Self {
            user_index: UserIndex::from_users(&users),
            users,
            ..Self::default()
        };

        for conversation in conversations {
            if conversation.is_public_channel() {
                catalog.channels.push(conversation);
            } else if conversation.is_private_group() {
                catalog.groups.push(conversation);
            } else if conversation.is_im() {
                catalog.dms.push(conversation);
            }
        }

        catalog
    }

    /// Label for a DM conversation.
    #[must_use]
    pub fn dm_label(&self, dm: &Conversation) -> String {
        dm.user
            .as_deref()
            .map_or_else(|| dm.id.clone(), |user| self.user_index.display_name(user))
    }

    /// Entries for `channels.json`: public channels, private groups, group
    /// DMs, then 1:1 DMs with `members` set to `[peer, token_owner]`.
    #[must_use]
    pub fn channels_file_entries(&self, token_owner_id: &str) -> Vec<Conversation> {
        let private = self.groups.iter().filter(|g| !g.is_mpim());
        let multi_party = self.groups.iter().filter(|g| g.is_mpim());
        let dms = self.dms.iter().map(|dm| {
            let mut dm = dm.clone();
            let peer = dm.user.clone().unwrap_or_default();
            dm.members = Some(vec![peer, token_owner_id.to_string()]);
            dm
        });

        self.channels
            .iter()
            .chain(private)
            .chain(multi_party)
            .cloned()
            .chain(dms)
            .collect()
    }
}
