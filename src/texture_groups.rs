//! Texture group resolution.
//!
//! Decides which texture group an image asset is packed into and whether it
//! needs a page of its own. Assets that cannot be placed go to the console
//! (overflow) group, which is created lazily on first use and then stays in
//! the project for the rest of the export.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use crate::source::SourceData;

/// Name of the only group when grouping is off.
pub const DEFAULT_GROUP: &str = "Default";

/// Name of the synthesized overflow group.
pub const CONSOLE_GROUP: &str = "tg_console";

/// Where an asset's images go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub group: String,
    /// Asset must not share a texture page with anything else.
    pub dedicated_page: bool,
}

/// Per-export texture group resolver.
///
/// Shared by all sprite workers; the overflow flag is the only mutable state
/// and is set atomically.
#[derive(Debug, Default)]
pub struct TextureGroupResolver {
    enabled: bool,
    /// Configured groups in declaration order.
    groups: Vec<String>,
    /// Sprite name -> index into `groups`.
    membership: HashMap<String, usize>,
    /// Sprites whose pages hold nothing else.
    dedicated: HashSet<String>,
    console_used: AtomicBool,
}

impl TextureGroupResolver {
    /// Resolver that puts everything in [`DEFAULT_GROUP`].
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Resolver over an explicit partitioning.
    pub fn new(groups: Vec<String>, membership: HashMap<String, usize>, dedicated: HashSet<String>) -> Self {
        Self {
            enabled: true,
            groups,
            membership,
            dedicated,
            console_used: AtomicBool::new(false),
        }
    }

    /// Build the partitioning from the dump.
    ///
    /// Membership comes from the game's own texture group table. A sprite
    /// is considered dedicated when every page its frames live on is used by
    /// no other sprite.
    pub fn from_source(source: &SourceData, enabled: bool) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let mut groups = Vec::with_capacity(source.texture_groups.len());
        let mut membership = HashMap::new();
        for (index, group) in source.texture_groups.iter().enumerate() {
            groups.push(group.name.clone());
            for sprite in &group.sprites {
                membership.entry(sprite.clone()).or_insert(index);
            }
        }

        let mut page_users: HashMap<usize, HashSet<&str>> = HashMap::new();
        for sprite in &source.sprites {
            for item in sprite.textures.iter().flatten() {
                page_users.entry(item.page).or_default().insert(sprite.name.as_str());
            }
        }
        let dedicated = source
            .sprites
            .iter()
            .filter(|sprite| {
                let mut pages = sprite.textures.iter().flatten().map(|item| item.page).peekable();
                pages.peek().is_some()
                    && pages.all(|page| page_users.get(&page).is_some_and(|users| users.len() == 1))
            })
            .map(|sprite| sprite.name.clone())
            .collect::<HashSet<_>>();

        info!(
            "Texture groups: {} configured, {} sprites assigned, {} on dedicated pages",
            groups.len(),
            membership.len(),
            dedicated.len()
        );
        Self::new(groups, membership, dedicated)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Group and page mode for one asset.
    pub fn resolve(&self, asset_name: &str) -> Assignment {
        if !self.enabled {
            return Assignment {
                group: DEFAULT_GROUP.to_string(),
                dedicated_page: false,
            };
        }

        let dedicated_page = self.dedicated.contains(asset_name);
        match self.membership.get(asset_name).and_then(|&i| self.groups.get(i)) {
            Some(group) => Assignment {
                group: group.clone(),
                dedicated_page,
            },
            None => {
                debug!("'{}' has no texture group, using {}", asset_name, CONSOLE_GROUP);
                self.use_console_group();
                Assignment {
                    group: CONSOLE_GROUP.to_string(),
                    dedicated_page,
                }
            }
        }
    }

    /// Mark the console group as used.
    ///
    /// Returns true only for the call that created it.
    pub fn use_console_group(&self) -> bool {
        let created = !self.console_used.swap(true, Ordering::SeqCst);
        if created {
            info!("Created fallback texture group {}", CONSOLE_GROUP);
        }
        created
    }

    pub fn console_group_used(&self) -> bool {
        self.console_used.load(Ordering::SeqCst)
    }

    /// Groups the project starts with: configured ones, or just Default.
    pub fn configured_groups(&self) -> Vec<String> {
        if self.enabled {
            self.groups.clone()
        } else {
            vec![DEFAULT_GROUP.to_string()]
        }
    }

    /// Final group list, including the console group once it was used.
    pub fn final_groups(&self) -> Vec<String> {
        let mut groups = self.configured_groups();
        if self.console_group_used() && !groups.iter().any(|g| g == CONSOLE_GROUP) {
            groups.push(CONSOLE_GROUP.to_string());
        }
        groups
    }
}
