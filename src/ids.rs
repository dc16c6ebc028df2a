//! Identifier and path service.
//!
//! Everything here is a pure function of its input: exporting the same data
//! twice must produce byte-identical ids and paths so project trees diff
//! cleanly between runs.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for name-based content ids.
const CONTENT_NAMESPACE: Uuid = Uuid::from_u128(0x6d2f_1c44_8b0e_4f5a_9a71_3e0c_52d8_b1f7);

/// Characters GameMaker accepts in a resource name.
static INVALID_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("static regex"));

/// Reference to another resource: display name plus project-relative path.
///
/// Serialized as `{"name": ..., "path": ...}` which is what every `.yy`
/// file uses for cross references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdPath {
    pub name: String,
    pub path: String,
}

impl IdPath {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Id of a top-level resource living in `folder` (e.g. `sprites`).
    pub fn resource(asset_name: &str, folder: &str) -> Self {
        let name = sanitize_name(asset_name);
        let path = format!("{folder}/{name}/{name}.yy");
        Self { name, path }
    }

    /// Id of a texture group (`texturegroups/<name>`).
    pub fn texture_group(name: &str) -> Self {
        Self::new(name, format!("texturegroups/{name}"))
    }

    /// Id of an audio group (`audiogroups/<name>`).
    pub fn audio_group(name: &str) -> Self {
        Self::new(name, format!("audiogroups/{name}"))
    }

    /// Id of a project folder (`folders/<path>.yy`).
    pub fn folder(name_and_path: &str) -> Self {
        let name = name_and_path
            .rsplit('/')
            .next()
            .unwrap_or(name_and_path)
            .to_string();
        Self::new(name, format!("folders/{name_and_path}.yy"))
    }
}

/// Relative `.yy` path of a resource inside `folder`.
pub fn resource_path(asset_name: &str, folder: &str) -> String {
    IdPath::resource(asset_name, folder).path
}

/// Stable content id for a seed string.
///
/// Name-based (v5) uuid, so the same seed always maps to the same id.
pub fn content_id(seed: &str) -> String {
    Uuid::new_v5(&CONTENT_NAMESPACE, seed.as_bytes()).to_string()
}

/// Make an asset name safe for use as a file name and resource name.
///
/// Valid names pass through untouched. Anything else gets its invalid
/// characters replaced and a short hash of the original appended, so two
/// distinct broken names never land on the same path.
pub fn sanitize_name(asset_name: &str) -> String {
    if asset_name.is_empty() {
        return "unnamed".to_string();
    }
    if !INVALID_NAME_CHARS.is_match(asset_name) {
        return asset_name.to_string();
    }

    let cleaned = INVALID_NAME_CHARS.replace_all(asset_name, "_");
    let digest = Uuid::new_v5(&CONTENT_NAMESPACE, asset_name.as_bytes());
    let suffix = &digest.simple().to_string()[..8];
    format!("{cleaned}_{suffix}")
}

/// Directory holding one resource's files, relative to the project root.
pub fn resource_dir(asset_name: &str, folder: &str) -> PathBuf {
    PathBuf::from(folder).join(sanitize_name(asset_name))
}

/// Relative path of the canonical PNG for one sprite frame.
pub fn frame_image_path(sprite_name: &str, frame_id: &str) -> PathBuf {
    resource_dir(sprite_name, "sprites").join(format!("{frame_id}.png"))
}
