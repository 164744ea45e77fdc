//! Identifier Remap Engine
//!
//! Pure lookup of old → new identifiers plus the username and discriminator
//! substitution rules. A [`RewriteContext`] is an immutable snapshot built
//! from [`Settings`] at startup; changing rules requires a restart.

use std::collections::HashMap;

use crate::config::{IdMapRow, Settings, TagRule, UsernameRule};
use crate::domain::AuthorRecord;

/// Old → new identifier lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    entries: HashMap<String, String>,
}

impl IdentifierMap {
    /// Build from configured rows.
    ///
    /// Rows missing either id are skipped; on duplicate old ids the last row
    /// wins.
    pub fn build<'a>(rows: impl IntoIterator<Item = &'a IdMapRow>) -> Self {
        let entries = rows
            .into_iter()
            .filter(|row| row.is_complete())
            .map(|row| (row.old_id.clone(), row.new_id.clone()))
            .collect();

        Self { entries }
    }

    /// Mapped id, or the input unchanged.
    pub fn map_id(&self, id: &str) -> String {
        self.entries
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Remap an id field in place. Empty ids are left alone.
    pub fn remap_in_place(&self, id: &mut String) {
        if id.is_empty() {
            return;
        }
        if let Some(new_id) = self.entries.get(id.as_str()) {
            *id = new_id.clone();
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable rule snapshot threaded through the rewriter.
#[derive(Debug, Clone, Default)]
pub struct RewriteContext {
    pub ids: IdentifierMap,
    pub username_rules: Vec<UsernameRule>,
    pub tag_rules: Vec<TagRule>,
}

impl RewriteContext {
    pub fn new(ids: IdentifierMap, username_rules: Vec<UsernameRule>, tag_rules: Vec<TagRule>) -> Self {
        Self {
            ids,
            username_rules,
            tag_rules,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            IdentifierMap::build(&settings.id_maps),
            settings.username_rules.clone(),
            settings.tag_rules.clone(),
        )
    }

    pub fn map_id(&self, id: &str) -> String {
        self.ids.map_id(id)
    }

    /// Apply username and tag rules in configured order.
    ///
    /// Each username rule checks the id match and then the username match;
    /// both can fire for the same rule. Later matches overwrite earlier ones.
    pub fn apply_author_rules(&self, author: &mut AuthorRecord) {
        for rule in &self.username_rules {
            if rule.new_username.is_empty() {
                continue;
            }

            let id_matches = rule
                .match_id
                .as_deref()
                .is_some_and(|id| !id.is_empty() && author.id == id);
            if id_matches {
                rename(author, &rule.new_username);
            }

            let name_matches = rule
                .match_username
                .as_deref()
                .is_some_and(|name| !name.is_empty() && author.username == name);
            if name_matches {
                rename(author, &rule.new_username);
            }
        }

        for rule in &self.tag_rules {
            if !rule.old_tag.is_empty() && !rule.new_tag.is_empty() && author.discriminator == rule.old_tag {
                author.discriminator = rule.new_tag.clone();
            }
        }
    }
}

fn rename(author: &mut AuthorRecord, new_username: &str) {
    author.username = new_username.to_string();
    if author.global_name.as_deref().is_some_and(|name| !name.is_empty()) {
        author.global_name = Some(new_username.to_string());
    }
}
