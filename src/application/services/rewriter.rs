//! Content Rewriter
//!
//! Applies the remap engine to free text, Discord links and the structured
//! fields of message records. Every operation is a no-op on absent input and
//! never fails: anything that does not parse is left exactly as it was.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

use super::remap::RewriteContext;
use crate::domain::{is_snowflake, AuthorRecord, MessageRecord};

static DISCORD_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:ptb\.|canary\.)?discord\.com/[^\s)]+").expect("valid link regex")
});

static DISCORD_HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:www\.|ptb\.|canary\.)?discord\.com$").expect("valid host regex")
});

/// Rewrites identifiers in text and message records.
#[derive(Debug, Clone)]
pub struct ContentRewriter {
    context: Arc<RewriteContext>,
}

impl ContentRewriter {
    pub fn new(context: Arc<RewriteContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RewriteContext {
        &self.context
    }

    /// Rewrite a piece of user-visible text.
    ///
    /// A string that is, once trimmed, a single snowflake is replaced
    /// wholesale. Anything else has its Discord links rewritten and all
    /// surrounding text kept verbatim.
    pub fn rewrite_text(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return text.to_string();
        }
        if is_snowflake(trimmed) {
            return self.context.map_id(trimmed);
        }
        self.rewrite_links_in_text(text)
    }

    /// Rewrite every Discord link inside `text`.
    pub fn rewrite_links_in_text(&self, text: &str) -> String {
        DISCORD_LINK_RE
            .replace_all(text, |caps: &Captures| self.rewrite_link(&caps[0]))
            .into_owned()
    }

    /// Rewrite a single Discord link.
    ///
    /// Only the id segments of `channels/…`, `users/…` and `guilds/…` paths
    /// change. Links on other hosts, links that fail to parse, and links with
    /// nothing to remap are returned byte-for-byte.
    pub fn rewrite_link(&self, link: &str) -> String {
        let mut url = match Url::parse(link) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!(link = %link, error = %e, "Leaving unparseable link unchanged");
                return link.to_string();
            }
        };

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if !DISCORD_HOST_RE.is_match(&host) {
            return link.to_string();
        }

        let mut parts: Vec<String> = url
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        let id_slots = match parts.first().map(String::as_str) {
            Some("channels") => 1..4,
            Some("users") | Some("guilds") => 1..2,
            _ => return link.to_string(),
        };

        let mut changed = false;
        for index in id_slots {
            if let Some(segment) = parts.get_mut(index) {
                let mapped = self.context.map_id(segment);
                if mapped != *segment {
                    *segment = mapped;
                    changed = true;
                }
            }
        }

        if !changed {
            return link.to_string();
        }

        url.set_path(&format!("/{}", parts.join("/")));
        url.to_string()
    }

    /// Rewrite the content, mentions, reply reference and embeds of a record.
    pub fn rewrite_message(&self, message: Option<&mut MessageRecord>) {
        let Some(message) = message else {
            return;
        };
        let ids = &self.context.ids;

        if let Some(content) = message.content.as_mut() {
            *content = self.rewrite_text(content);
        }

        for mention in message.mentions.iter_mut().flatten() {
            ids.remap_in_place(&mut mention.id);
        }

        if let Some(reference) = message.message_reference.as_mut() {
            for id in [
                &mut reference.guild_id,
                &mut reference.channel_id,
                &mut reference.message_id,
            ] {
                if let Some(id) = id.as_mut() {
                    ids.remap_in_place(id);
                }
            }
        }

        for embed in message.embeds.iter_mut().flatten() {
            if let Some(title) = embed.title.as_mut() {
                *title = self.rewrite_links_in_text(title);
            }
            if let Some(description) = embed.description.as_mut() {
                *description = self.rewrite_links_in_text(description);
            }
            if let Some(url) = embed.url.as_mut() {
                *url = self.rewrite_link(url);
            }
        }
    }

    /// Remap the author id, then apply username and tag rules.
    pub fn rewrite_author(&self, author: Option<&mut AuthorRecord>) {
        let Some(author) = author else {
            return;
        };

        self.context.ids.remap_in_place(&mut author.id);
        self.context.apply_author_rules(author);
    }

    /// Author first, then the rest of the record.
    pub fn rewrite_record(&self, message: &mut MessageRecord) {
        self.rewrite_author(message.author.as_mut());
        self.rewrite_message(Some(message));
    }
}
