//! Translation driver.
//!
//! Runs every enabled asset kind through its translator on the worker pool,
//! then folds the results into the [`ProjectAssembler`] on the calling
//! thread, one folder at a time. A failed asset is logged, counted in the
//! [`ExportSummary`] and left out of the project; only assembler and output
//! errors abort the export.

use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::config::ExportOptions;
use crate::core::{ProgressSink, Workers};
use crate::entities::included_file::{DataFile, GMIncludedFile};
use crate::entities::{
    sound, sprite, GMMainOptions, GMProject, GMSound, GMSprite, GMWindowsOptions, ProjectAssembler, Resource,
    TranslateError, Translated,
};
use crate::source::SourceData;
use crate::texture_groups::TextureGroupResolver;
use crate::utils::imaging::TextureSource;

/// Errors that abort the whole export.
#[derive(Debug)]
pub enum ExportError {
    OutputUnavailable { path: PathBuf, reason: String },
    /// The project tree was already handed out.
    Finalized,
    Write { path: PathBuf, reason: String },
    Serialize(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::OutputUnavailable { path, reason } => {
                write!(f, "Output location {} unavailable: {}", path.display(), reason)
            }
            ExportError::Finalized => write!(f, "Project already finalized"),
            ExportError::Write { path, reason } => write!(f, "Failed to write {}: {}", path.display(), reason),
            ExportError::Serialize(msg) => write!(f, "Serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Serialize(e.to_string())
    }
}

/// Everything a translator may look at during one export.
///
/// Shared read-only between workers; the texture group resolver's overflow
/// flag is its only mutable state.
pub struct ExportContext {
    pub options: ExportOptions,
    pub source: SourceData,
    pub textures: Box<dyn TextureSource>,
    pub texture_groups: TextureGroupResolver,
    /// Project root on disk.
    pub output_root: PathBuf,
}

impl ExportContext {
    pub fn new(
        options: ExportOptions,
        source: SourceData,
        textures: Box<dyn TextureSource>,
        output_root: PathBuf,
    ) -> Self {
        let texture_groups = TextureGroupResolver::from_source(&source, options.texture_groups);
        Self {
            options,
            source,
            textures,
            texture_groups,
            output_root,
        }
    }
}

/// Asset kinds with a per-item translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Sprites,
    Sounds,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Sprites => write!(f, "sprites"),
            AssetKind::Sounds => write!(f, "sounds"),
        }
    }
}

type TranslateFn = fn(&ExportContext, usize) -> Result<Translated, TranslateError>;

/// Dispatch entry: how to count, name and translate items of one kind.
struct KindEntry {
    kind: AssetKind,
    folder: &'static str,
    enabled: fn(&ExportOptions) -> bool,
    count: fn(&SourceData) -> usize,
    name: fn(&SourceData, usize) -> &str,
    translate: TranslateFn,
}

static KINDS: [KindEntry; 2] = [
    KindEntry {
        kind: AssetKind::Sprites,
        folder: sprite::FOLDER,
        enabled: sprites_enabled,
        count: sprite_count,
        name: sprite_name,
        translate: translate_sprite,
    },
    KindEntry {
        kind: AssetKind::Sounds,
        folder: sound::FOLDER,
        enabled: sounds_enabled,
        count: sound_count,
        name: sound_name,
        translate: translate_sound,
    },
];

fn sprites_enabled(options: &ExportOptions) -> bool {
    options.assets.sprites
}

fn sprite_count(source: &SourceData) -> usize {
    source.sprites.len()
}

fn sprite_name(source: &SourceData, index: usize) -> &str {
    &source.sprites[index].name
}

fn translate_sprite(ctx: &ExportContext, index: usize) -> Result<Translated, TranslateError> {
    GMSprite::translate(&ctx.source.sprites[index], ctx).map(Translated::from)
}

fn sounds_enabled(options: &ExportOptions) -> bool {
    options.assets.sounds
}

fn sound_count(source: &SourceData) -> usize {
    source.sounds.len()
}

fn sound_name(source: &SourceData, index: usize) -> &str {
    &source.sounds[index].name
}

fn translate_sound(ctx: &ExportContext, index: usize) -> Result<Translated, TranslateError> {
    GMSound::translate(&ctx.source.sounds[index], ctx).map(Translated::from)
}

/// An asset left out of the project.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedAsset {
    pub kind: AssetKind,
    pub name: String,
    pub reason: String,
}

/// What happened during an export.
#[derive(Debug, Default)]
pub struct ExportSummary {
    /// Successfully translated assets per kind, in processing order.
    pub translated: IndexMap<AssetKind, usize>,
    pub failed: Vec<FailedAsset>,
    pub included_files: usize,
}

impl ExportSummary {
    pub fn translated_count(&self, kind: AssetKind) -> usize {
        self.translated.get(&kind).copied().unwrap_or(0)
    }

    pub fn log(&self) {
        for (kind, count) in &self.translated {
            info!("Exported {} {}", count, kind);
        }
        if self.included_files > 0 {
            info!("Exported {} included files", self.included_files);
        }
        if !self.failed.is_empty() {
            warn!("{} assets could not be exported:", self.failed.len());
            for failed in &self.failed {
                warn!("  {} '{}': {}", failed.kind, failed.name, failed.reason);
            }
        }
    }
}

/// Finished export, ready for emission.
#[derive(Debug)]
pub struct ExportOutput {
    pub project: GMProject,
    /// Translated resources in project order.
    pub resources: Vec<Translated>,
    pub included: Vec<DataFile>,
    pub summary: ExportSummary,
}

pub struct Exporter {
    ctx: Arc<ExportContext>,
    workers: Workers,
    progress: Box<dyn ProgressSink>,
}

impl Exporter {
    pub fn new(ctx: ExportContext, progress: Box<dyn ProgressSink>) -> Self {
        let workers = Workers::new(ctx.options.worker_count());
        Self {
            ctx: Arc::new(ctx),
            workers,
            progress,
        }
    }

    /// Translate everything and assemble the project.
    pub fn run(mut self) -> Result<ExportOutput, ExportError> {
        self.prepare_output()?;

        let mut assembler =
            ProjectAssembler::from_source(&self.ctx.source, &self.ctx.options, &self.ctx.texture_groups)?;
        let mut resources = Vec::new();
        let mut summary = ExportSummary::default();

        for entry in KINDS.iter() {
            if !(entry.enabled)(&self.ctx.options) {
                debug!("Skipping {}", entry.kind);
                continue;
            }

            let results = self.translate_kind(entry);
            let mut translated = 0;
            for (index, result) in results {
                match result {
                    Ok(resource) => {
                        if assembler.add_resource(resource.name(), entry.folder)?.is_some() {
                            resources.push(resource);
                            translated += 1;
                        } else {
                            summary.failed.push(FailedAsset {
                                kind: entry.kind,
                                name: (entry.name)(&self.ctx.source, index).to_string(),
                                reason: format!("Duplicate resource name '{}'", resource.name()),
                            });
                        }
                    }
                    Err(e) => {
                        let name = (entry.name)(&self.ctx.source, index).to_string();
                        warn!("Failed to export {} '{}': {}", entry.kind, name, e);
                        summary.failed.push(FailedAsset {
                            kind: entry.kind,
                            name,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            summary.translated.insert(entry.kind, translated);
        }

        if self.ctx.options.assets.options {
            let general = &self.ctx.source.general;
            resources.push(Translated::from(GMMainOptions::translate(general)));
            resources.push(Translated::from(GMWindowsOptions::translate(general)));
        }

        let included = self.discover_included_files();
        for file in &included {
            assembler.add_included_file(GMIncludedFile::from_file(file))?;
        }
        summary.included_files = included.len();

        assembler.sync_texture_groups(&self.ctx.texture_groups)?;
        let project = assembler.finalize()?;

        Ok(ExportOutput {
            project,
            resources,
            included,
            summary,
        })
    }

    /// Create the output root; failing here aborts before any work is done.
    fn prepare_output(&self) -> Result<(), ExportError> {
        let root = &self.ctx.output_root;
        let unavailable = |reason: String| ExportError::OutputUnavailable {
            path: root.clone(),
            reason,
        };

        fs::create_dir_all(root).map_err(|e| unavailable(e.to_string()))?;
        let meta = fs::metadata(root).map_err(|e| unavailable(e.to_string()))?;
        if meta.permissions().readonly() {
            return Err(unavailable("read-only".to_string()));
        }
        debug!("Output root: {}", root.display());
        Ok(())
    }

    /// Run one kind on the pool; results come back sorted by source index.
    fn translate_kind(&mut self, entry: &KindEntry) -> Vec<(usize, Result<Translated, TranslateError>)> {
        let total = (entry.count)(&self.ctx.source);
        info!("Translating {} {}", total, entry.kind);
        self.progress.begin(&entry.kind.to_string(), total);

        let (tx, rx) = crossbeam_channel::unbounded();
        for index in 0..total {
            let ctx = Arc::clone(&self.ctx);
            let tx = tx.clone();
            let translate = entry.translate;
            self.workers.execute(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| translate(&ctx, index)))
                    .unwrap_or_else(|payload| Err(TranslateError::Panicked(panic_message(payload.as_ref()))));
                tx.send((index, result)).ok();
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(total);
        for (index, result) in rx.iter() {
            let name = (entry.name)(&self.ctx.source, index);
            self.progress.advance(name, result.is_ok());
            results.push((index, result));
        }
        self.progress.finish();

        if results.len() != total {
            warn!("{}: {} of {} jobs reported back", entry.kind, results.len(), total);
        }
        results.sort_by_key(|(index, _)| *index);
        results
    }

    fn discover_included_files(&self) -> Vec<DataFile> {
        let Some(dir) = &self.ctx.options.datafiles else {
            return Vec::new();
        };
        let dir = self.ctx.source.resolve(dir);
        if !dir.is_dir() {
            warn!("Data-files directory {} not found", dir.display());
            return Vec::new();
        }
        match DataFile::discover(&dir) {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to list data files: {:#}", e);
                Vec::new()
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetSelection;
    use crate::core::NullProgress;
    use crate::emit::Emitter;
    use crate::entities::project::ROOMS_FOLDER;
    use crate::source::{SourceRoom, SourceSound, SourceSprite, TexturePageItem};
    use crate::texture_groups::CONSOLE_GROUP;
    use crate::utils::imaging::{self, TextureError};
    use image::{Rgba, RgbaImage};
    use std::path::Path;

    const BROKEN_PAGE: usize = 99;
    const PANIC_PAGE: usize = 77;

    struct FakeTextures;

    impl TextureSource for FakeTextures {
        fn texture_for(&self, item: &TexturePageItem) -> Result<RgbaImage, TextureError> {
            match item.page {
                BROKEN_PAGE => Err(TextureError::PageMissing(item.page)),
                PANIC_PAGE => panic!("corrupt page"),
                _ => imaging::extract_item(&RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255])), item),
            }
        }
    }

    fn sprite(name: &str, page: Option<usize>) -> SourceSprite {
        let item = page.map(|page| TexturePageItem {
            source_width: 8,
            source_height: 8,
            target_width: 8,
            target_height: 8,
            bounding_width: 8,
            bounding_height: 8,
            page,
            ..Default::default()
        });
        SourceSprite {
            name: name.to_string(),
            width: 8,
            height: 8,
            margin_right: 7,
            margin_bottom: 7,
            textures: vec![item],
            ..Default::default()
        }
    }

    fn source() -> SourceData {
        let mut source = SourceData {
            sprites: vec![
                sprite("spr_a", Some(0)),
                sprite("spr_broken", Some(BROKEN_PAGE)),
                sprite("spr_b", Some(0)),
            ],
            sounds: vec![SourceSound { name: "snd_a".into(), ..Default::default() }],
            rooms: vec![SourceRoom { name: "rm_start".into() }],
            ..Default::default()
        };
        source.general.name = "Game".into();
        source
    }

    fn run(source: SourceData, options: ExportOptions, root: &Path) -> Result<ExportOutput, ExportError> {
        let ctx = ExportContext::new(options, source, Box::new(FakeTextures), root.to_path_buf());
        Exporter::new(ctx, Box::new(NullProgress)).run()
    }

    #[test]
    fn test_failed_asset_is_dropped_and_reported() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions { workers: Some(2), ..Default::default() };
        let out = run(source(), options, dir.path()).unwrap();

        assert_eq!(out.summary.translated_count(AssetKind::Sprites), 2);
        assert_eq!(out.summary.translated_count(AssetKind::Sounds), 1);
        assert_eq!(out.summary.failed.len(), 1);
        assert_eq!(out.summary.failed[0].name, "spr_broken");
        assert_eq!(out.summary.failed[0].kind, AssetKind::Sprites);

        let sprites: Vec<_> = out.project.resources_in("sprites").map(|e| (e.id.name.as_str(), e.order)).collect();
        assert_eq!(sprites, vec![("spr_a", 0), ("spr_b", 1)]);
        let sounds: Vec<_> = out.project.resources_in("sounds").map(|e| e.order).collect();
        assert_eq!(sounds, vec![0]);
        assert_eq!(out.project.resources_in("rooms").count(), 1);

        // 2 sprites, 1 sound, 2 option sets
        assert_eq!(out.resources.len(), 5);
    }

    #[test]
    fn test_export_is_deterministic() {
        let a_dir = tempfile::tempdir().unwrap();
        let b_dir = tempfile::tempdir().unwrap();
        let a = run(source(), ExportOptions { workers: Some(4), ..Default::default() }, a_dir.path()).unwrap();
        let b = run(source(), ExportOptions { workers: Some(1), ..Default::default() }, b_dir.path()).unwrap();

        assert_eq!(a.project.to_json().unwrap(), b.project.to_json().unwrap());
        let a_json: Vec<_> = a.resources.iter().map(|r| r.to_json().unwrap()).collect();
        let b_json: Vec<_> = b.resources.iter().map(|r| r.to_json().unwrap()).collect();
        assert_eq!(a_json, b_json);
    }

    #[test]
    fn test_panicking_translator_is_contained() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = source();
        src.sprites.push(sprite("spr_panic", Some(PANIC_PAGE)));
        let out = run(src, ExportOptions::default(), dir.path()).unwrap();

        let failed: Vec<_> = out.summary.failed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(failed, vec!["spr_broken", "spr_panic"]);
        assert!(out.summary.failed[1].reason.contains("corrupt page"));
        assert_eq!(out.summary.translated_count(AssetKind::Sprites), 2);
    }

    #[test]
    fn test_console_group_listed_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = source();
        src.sprites = (0..10).map(|i| sprite(&format!("spr_{i}"), Some(0))).collect();
        let options = ExportOptions { texture_groups: true, ..Default::default() };
        let out = run(src, options, dir.path()).unwrap();

        let consoles = out.project.texture_groups.iter().filter(|g| g.name == CONSOLE_GROUP).count();
        assert_eq!(consoles, 1);
    }

    #[test]
    fn test_missing_texture_adds_console_group_without_grouping() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = source();
        src.sprites = vec![sprite("spr_lost", None)];
        let out = run(src, ExportOptions::default(), dir.path()).unwrap();

        let names: Vec<_> = out.project.texture_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Default", CONSOLE_GROUP]);
    }

    #[test]
    fn test_asset_selection_gates_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions {
            assets: AssetSelection { sounds: true, ..AssetSelection::none() },
            ..Default::default()
        };
        let out = run(source(), options, dir.path()).unwrap();

        assert!(!out.summary.translated.contains_key(&AssetKind::Sprites));
        assert_eq!(out.resources.len(), 1);
        assert!(out.project.options.is_empty());
        assert!(out.project.room_order_nodes.is_empty());
        assert_eq!(out.project.resources_in("rooms").count(), 0);
    }

    #[test]
    fn test_included_files_registered() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("datafiles");
        fs::create_dir_all(data.join("bin")).unwrap();
        fs::write(data.join("bin/steam_api.dll"), b"MZ").unwrap();
        fs::write(data.join("save.ini"), b"").unwrap();

        let options = ExportOptions { datafiles: Some(data), ..Default::default() };
        let out = run(source(), options, &dir.path().join("out")).unwrap();

        assert_eq!(out.summary.included_files, 2);
        let paths: Vec<_> = out.project.included_files.iter().map(|f| f.file_path.as_str()).collect();
        assert_eq!(paths, vec!["datafiles/bin", "datafiles"]);
    }

    /// Every emitted resource has exactly one project entry.
    fn assert_index_matches_resources(out: &ExportOutput) {
        let indexed: Vec<_> = out
            .resources
            .iter()
            .filter(|r| !matches!(r, Translated::MainOptions(_) | Translated::WindowsOptions(_)))
            .collect();
        for resource in &indexed {
            let path = format!("{}/{}", resource.directory().to_string_lossy(), resource.file_name());
            let entries = out.project.resources.iter().filter(|e| e.id.path == path).count();
            assert_eq!(entries, 1, "{path}");
        }
        let rooms = out.project.resources_in(ROOMS_FOLDER).count();
        assert_eq!(out.project.resources.len() - rooms, indexed.len());
    }

    #[test]
    fn test_duplicate_name_keeps_first_asset() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = source();
        let mut second = sprite("spr_a", Some(0));
        second.width = 16;
        src.sprites.push(second);
        let out = run(src, ExportOptions { workers: Some(4), ..Default::default() }, dir.path()).unwrap();

        assert_index_matches_resources(&out);
        let sprites: Vec<_> = out
            .resources
            .iter()
            .filter_map(|r| match r {
                Translated::Sprite(s) => Some((s.name.as_str(), s.width)),
                _ => None,
            })
            .collect();
        assert_eq!(sprites, vec![("spr_a", 8), ("spr_b", 8)]);
        assert_eq!(out.summary.translated_count(AssetKind::Sprites), 2);

        let duplicate = out.summary.failed.last().unwrap();
        assert_eq!(duplicate.name, "spr_a");
        assert!(duplicate.reason.contains("Duplicate"));
    }

    #[test]
    fn test_empty_texture_fails_only_its_sprite() {
        let dir = tempfile::tempdir().unwrap();
        let mut src = source();
        src.sprites.push(SourceSprite {
            name: "spr_empty".into(),
            textures: vec![Some(TexturePageItem::default())],
            ..Default::default()
        });
        let out = run(src, ExportOptions::default(), dir.path()).unwrap();

        let failed: Vec<_> = out.summary.failed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(failed, vec!["spr_broken", "spr_empty"]);
        assert_index_matches_resources(&out);

        Emitter::new(dir.path()).emit(&out).unwrap();
        assert!(dir.path().join("Game.yyp").is_file());
        assert!(!dir.path().join("sprites/spr_empty").exists());
    }

    #[test]
    fn test_output_unavailable_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, b"").unwrap();

        let result = run(source(), ExportOptions::default(), &file.join("project"));
        assert!(matches!(result, Err(ExportError::OutputUnavailable { .. })));
    }
}
