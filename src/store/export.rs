//! Account export
//!
//! Administrative snapshot of all accounts. Built from `PublicUserView`s only,
//! so it carries no credential material.

use std::collections::BTreeMap;

use serde::Serialize;

use super::record::PublicUserView;

/// Username-keyed snapshot of every account, ordered by username
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserExport {
    users: BTreeMap<String, PublicUserView>,
}

impl UserExport {
    pub(crate) fn from_views(views: impl IntoIterator<Item = PublicUserView>) -> Self {
        Self {
            users: views
                .into_iter()
                .map(|view| (view.username.clone(), view))
                .collect(),
        }
    }

    pub fn get(&self, username: &str) -> Option<&PublicUserView> {
        self.users.get(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublicUserView> {
        self.users.values()
    }

    /// Pretty-printed JSON, two-space indented.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
