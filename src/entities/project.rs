//! Project: the `.yyp` tree every translator contributes to.
//!
//! [`ProjectAssembler`] owns the tree for the duration of one export. All
//! mutation goes through it; [`ProjectAssembler::finalize`] hands the
//! finished [`GMProject`] to the emitter and closes the assembler.

use std::collections::HashSet;

use log::{debug, info, warn};
use serde::Serialize;

use super::included_file::GMIncludedFile;
use super::options::option_ids;
use super::sound::DEFAULT_AUDIO_GROUP;
use super::targets::Targets;
use crate::config::ExportOptions;
use crate::export::ExportError;
use crate::ids::{self, IdPath};
use crate::source::SourceData;
use crate::texture_groups::{TextureGroupResolver, CONSOLE_GROUP};

/// Editor version written to project metadata.
pub const IDE_VERSION: &str = "2022.0.3.85";

/// Room resource folder.
pub const ROOMS_FOLDER: &str = "rooms";

/// Top-level folders of a fresh project, in editor order.
pub const BASE_FOLDERS: [&str; 14] = [
    "Sprites",
    "Tile Sets",
    "Sounds",
    "Paths",
    "Scripts",
    "Shaders",
    "Fonts",
    "Timelines",
    "Objects",
    "Rooms",
    "Sequences",
    "Animation Curves",
    "Notes",
    "Extensions",
];

/// One line of the resource index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceEntry {
    pub id: IdPath,
    /// Position inside the resource's folder.
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMFolder {
    pub folder_path: String,
    pub order: u32,
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    pub resource_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMTextureGroup {
    pub is_scaled: bool,
    pub compress_format: &'static str,
    pub autocrop: bool,
    pub border: u32,
    pub mips_to_generate: u32,
    pub group_parent: Option<IdPath>,
    pub targets: Targets,
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    pub resource_type: &'static str,
}

impl GMTextureGroup {
    pub fn new(name: &str, targets: Targets) -> Self {
        Self {
            is_scaled: true,
            compress_format: "bz2",
            autocrop: true,
            border: 2,
            mips_to_generate: 0,
            group_parent: None,
            targets,
            resource_version: "1.3",
            name: name.to_string(),
            tags: Vec::new(),
            resource_type: "GMTextureGroup",
        }
    }

    /// Overflow group; built for no platform.
    pub fn console() -> Self {
        Self::new(CONSOLE_GROUP, Targets::NONE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMAudioGroup {
    pub targets: Targets,
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    pub resource_type: &'static str,
}

impl GMAudioGroup {
    pub fn new(name: &str) -> Self {
        Self {
            targets: Targets::ALL,
            resource_version: "1.3",
            name: name.to_string(),
            tags: Vec::new(),
            resource_type: "GMAudioGroup",
        }
    }
}

/// Build configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub name: String,
    pub children: Vec<Config>,
}

impl Config {
    /// `Default`, with `config` as its only child unless it is `Default` itself.
    pub fn for_game(config: &str) -> Self {
        let children = if config.is_empty() || config == "Default" {
            Vec::new()
        } else {
            vec![Config {
                name: config.to_string(),
                children: Vec::new(),
            }]
        };
        Self {
            name: "Default".to_string(),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOrderNode {
    pub room_id: IdPath,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetaData {
    #[serde(rename = "IDEVersion")]
    pub ide_version: &'static str,
}

/// The `.yyp` document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GMProject {
    pub resources: Vec<ResourceEntry>,
    #[serde(rename = "Options")]
    pub options: Vec<IdPath>,
    #[serde(rename = "defaultScriptType")]
    pub default_script_type: u32,
    #[serde(rename = "isEcma")]
    pub is_ecma: bool,
    pub configs: Config,
    #[serde(rename = "RoomOrderNodes")]
    pub room_order_nodes: Vec<RoomOrderNode>,
    #[serde(rename = "Folders")]
    pub folders: Vec<GMFolder>,
    #[serde(rename = "AudioGroups")]
    pub audio_groups: Vec<GMAudioGroup>,
    #[serde(rename = "TextureGroups")]
    pub texture_groups: Vec<GMTextureGroup>,
    #[serde(rename = "IncludedFiles")]
    pub included_files: Vec<GMIncludedFile>,
    #[serde(rename = "MetaData")]
    pub meta_data: MetaData,
    #[serde(rename = "resourceVersion")]
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
}

impl GMProject {
    fn empty(name: &str) -> Self {
        Self {
            resources: Vec::new(),
            options: Vec::new(),
            default_script_type: 1,
            is_ecma: false,
            configs: Config::for_game("Default"),
            room_order_nodes: Vec::new(),
            folders: Vec::new(),
            audio_groups: Vec::new(),
            texture_groups: Vec::new(),
            included_files: Vec::new(),
            meta_data: MetaData { ide_version: IDE_VERSION },
            resource_version: "1.6",
            name: name.to_string(),
            tags: Vec::new(),
            resource_type: "GMProject",
        }
    }

    /// Project file name (`<name>.yyp`).
    pub fn file_name(&self) -> String {
        format!("{}.yyp", ids::sanitize_name(&self.name))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Entries of one resource folder, in index order.
    pub fn resources_in<'a>(&'a self, folder: &'a str) -> impl Iterator<Item = &'a ResourceEntry> + 'a {
        let prefix = format!("{folder}/");
        self.resources.iter().filter(move |e| e.id.path.starts_with(&prefix))
    }
}

/// Single writer of the project tree.
///
/// Not meant for concurrent use: the per-folder order counter depends on the
/// exact call sequence, so callers add resources grouped by folder.
#[derive(Debug)]
pub struct ProjectAssembler {
    /// `None` once finalized.
    project: Option<GMProject>,
    previous_folder: Option<String>,
    order: u32,
    paths: HashSet<String>,
}

impl ProjectAssembler {
    pub fn new(name: &str) -> Self {
        Self {
            project: Some(GMProject::empty(name)),
            previous_folder: None,
            order: 0,
            paths: HashSet::new(),
        }
    }

    /// Start a project for `source` with folders, groups, options and rooms.
    pub fn from_source(
        source: &SourceData,
        options: &ExportOptions,
        groups: &TextureGroupResolver,
    ) -> Result<Self, ExportError> {
        let general = &source.general;
        let mut assembler = Self::new(&general.name);
        assembler.project_mut()?.configs = Config::for_game(&general.config);

        for folder in BASE_FOLDERS {
            assembler.add_folder(folder)?;
        }

        if options.audio_groups && !source.audio_groups.is_empty() {
            for group in &source.audio_groups {
                assembler.add_audio_group(&group.name)?;
            }
        } else {
            assembler.add_audio_group(DEFAULT_AUDIO_GROUP)?;
        }

        for group in groups.configured_groups() {
            assembler.add_texture_group(GMTextureGroup::new(&group, Targets::ALL))?;
        }

        if options.assets.options {
            for id in option_ids(options.other_platform_options) {
                assembler.add_option(id)?;
            }
        }

        if options.assets.rooms {
            for room in &source.rooms {
                assembler.add_resource(&room.name, ROOMS_FOLDER)?;
            }
            for room in &general.room_order {
                assembler.add_room_order_node(IdPath::resource(room, ROOMS_FOLDER))?;
            }
        }

        info!(
            "Project '{}' started: {} folders, {} rooms",
            general.name,
            BASE_FOLDERS.len(),
            if options.assets.rooms { source.rooms.len() } else { 0 }
        );
        Ok(assembler)
    }

    fn project_mut(&mut self) -> Result<&mut GMProject, ExportError> {
        self.project.as_mut().ok_or(ExportError::Finalized)
    }

    /// Register resource `name` under `folder` and return its order.
    ///
    /// The order counter restarts whenever `folder` differs from the previous
    /// call. A path that is already registered keeps its first entry and
    /// yields `None`.
    pub fn add_resource(&mut self, name: &str, folder: &str) -> Result<Option<u32>, ExportError> {
        let id = IdPath::resource(name, folder);
        if self.project.is_none() {
            return Err(ExportError::Finalized);
        }
        if !self.paths.insert(id.path.clone()) {
            warn!("Duplicate resource {}, keeping the first one", id.path);
            return Ok(None);
        }

        if self.previous_folder.as_deref() != Some(folder) {
            self.previous_folder = Some(folder.to_string());
            self.order = 0;
        }
        let order = self.order;
        self.order += 1;

        self.project_mut()?.resources.push(ResourceEntry { id, order });
        Ok(Some(order))
    }

    /// Append a folder; `path` may be nested (`Sprites/UI`).
    pub fn add_folder(&mut self, path: &str) -> Result<(), ExportError> {
        let project = self.project_mut()?;
        let id = IdPath::folder(path);
        let order = project.folders.len() as u32;
        project.folders.push(GMFolder {
            folder_path: id.path,
            order,
            resource_version: "1.0",
            name: id.name,
            tags: Vec::new(),
            resource_type: "GMFolder",
        });
        Ok(())
    }

    pub fn add_texture_group(&mut self, group: GMTextureGroup) -> Result<(), ExportError> {
        self.project_mut()?.texture_groups.push(group);
        Ok(())
    }

    /// Append texture groups created during translation (the console group).
    pub fn sync_texture_groups(&mut self, groups: &TextureGroupResolver) -> Result<(), ExportError> {
        let project = self.project_mut()?;
        for name in groups.final_groups() {
            if project.texture_groups.iter().any(|g| g.name == name) {
                continue;
            }
            debug!("Adding late texture group {}", name);
            let group = if name == CONSOLE_GROUP {
                GMTextureGroup::console()
            } else {
                GMTextureGroup::new(&name, Targets::ALL)
            };
            project.texture_groups.push(group);
        }
        Ok(())
    }

    pub fn add_audio_group(&mut self, name: &str) -> Result<(), ExportError> {
        self.project_mut()?.audio_groups.push(GMAudioGroup::new(name));
        Ok(())
    }

    pub fn add_option(&mut self, id: IdPath) -> Result<(), ExportError> {
        self.project_mut()?.options.push(id);
        Ok(())
    }

    pub fn add_included_file(&mut self, file: GMIncludedFile) -> Result<(), ExportError> {
        self.project_mut()?.included_files.push(file);
        Ok(())
    }

    pub fn add_room_order_node(&mut self, room: IdPath) -> Result<(), ExportError> {
        self.project_mut()?.room_order_nodes.push(RoomOrderNode { room_id: room });
        Ok(())
    }

    /// Close the assembler and return the finished tree.
    ///
    /// Any later call, including a second `finalize`, fails.
    pub fn finalize(&mut self) -> Result<GMProject, ExportError> {
        let project = self.project.take().ok_or(ExportError::Finalized)?;
        info!(
            "Project '{}' finalized: {} resources, {} texture groups, {} included files",
            project.name,
            project.resources.len(),
            project.texture_groups.len(),
            project.included_files.len()
        );
        Ok(project)
    }
}
