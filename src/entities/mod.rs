//! Entities module - target project resources and their translators
//!
//! Every exportable resource (sprite, sound, option set) implements
//! [`Resource`]; the closed [`Translated`] enum is what translators hand back
//! to the export driver and what the emitter writes out.

/// `From<Enum> for u8` for fieldless enums serialized as integers.
macro_rules! into_u8 {
    ($($ty:ty),*) => {
        $(impl From<$ty> for u8 {
            fn from(value: $ty) -> u8 {
                value as u8
            }
        })*
    };
}

pub mod included_file;
pub mod options;
pub mod project;
pub mod sequence;
pub mod sound;
pub mod sprite;
pub mod targets;

pub use included_file::{DataFile, GMIncludedFile};
pub use options::{GMMainOptions, GMWindowsOptions};
pub use project::{GMFolder, GMProject, ProjectAssembler, ResourceEntry};
pub use sequence::GMSequence;
pub use sound::GMSound;
pub use sprite::GMSprite;
pub use targets::Targets;

use std::path::PathBuf;
use std::sync::Arc;

use enum_dispatch::enum_dispatch;
use image::RgbaImage;

use crate::utils::imaging::TextureError;

/// Binary file attached to a resource.
#[derive(Debug, Clone)]
pub enum Payload {
    /// In-memory image, written as PNG to `file`
    Image { file: PathBuf, image: Arc<RgbaImage> },
    /// Existing file copied verbatim to `file`
    Copy { file: PathBuf, from: PathBuf },
}

/// Common interface of all exported resources.
#[enum_dispatch]
pub trait Resource {
    /// Resource name as written to the project.
    fn name(&self) -> &str;

    /// Directory holding the resource, relative to the project root.
    fn directory(&self) -> PathBuf;

    /// Description file name inside [`Resource::directory`].
    fn file_name(&self) -> String {
        format!("{}.yy", self.name())
    }

    /// Pretty JSON of the description file.
    fn to_json(&self) -> serde_json::Result<String>;

    /// Binary files to write next to the description, paths relative to
    /// [`Resource::directory`].
    fn payloads(&self) -> Vec<Payload> {
        Vec::new()
    }
}

/// Output of any translator.
#[enum_dispatch(Resource)]
#[derive(Debug)]
pub enum Translated {
    Sprite(GMSprite),
    Sound(GMSound),
    MainOptions(GMMainOptions),
    WindowsOptions(GMWindowsOptions),
}

/// Per-asset translation failure. Never aborts the export.
#[derive(Debug)]
pub enum TranslateError {
    Texture { frame: usize, error: TextureError },
    MissingPayload(PathBuf),
    Panicked(String),
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::Texture { frame, error } => write!(f, "Frame {}: {}", frame, error),
            TranslateError::MissingPayload(path) => {
                write!(f, "Missing payload file: {}", path.display())
            }
            TranslateError::Panicked(msg) => write!(f, "Translator panicked: {}", msg),
        }
    }
}

impl std::error::Error for TranslateError {}
