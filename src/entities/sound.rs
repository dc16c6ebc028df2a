//! Sound resource and its translator.

use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;

use super::{Payload, Resource, TranslateError};
use crate::export::ExportContext;
use crate::ids::{self, IdPath};
use crate::source::SourceSound;

pub const FOLDER: &str = "sounds";
pub const PARENT_FOLDER: &str = "Sounds";

/// Audio group used when groups are not exported.
pub const DEFAULT_AUDIO_GROUP: &str = "audiogroup_default";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMSound {
    pub compression: u32,
    pub volume: f32,
    pub preload: bool,
    pub bit_rate: u32,
    pub sample_rate: u32,
    #[serde(rename = "type")]
    pub sound_type: u32,
    pub bit_depth: u32,
    pub audio_group_id: IdPath,
    pub sound_file: String,
    pub duration: f32,
    pub parent: IdPath,
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    pub resource_type: &'static str,

    /// Extracted audio to copy next to the description.
    #[serde(skip)]
    data: Option<PathBuf>,
}

impl GMSound {
    /// Translate one decompiled sound.
    ///
    /// Fails when the dump references audio data that is not on disk.
    pub fn translate(source: &SourceSound, ctx: &ExportContext) -> Result<Self, TranslateError> {
        let name = ids::sanitize_name(&source.name);

        let group = if ctx.options.audio_groups && !source.audio_group.is_empty() {
            source.audio_group.as_str()
        } else {
            DEFAULT_AUDIO_GROUP
        };

        let data = match &source.data {
            Some(relative) => {
                let path = ctx.source.resolve(relative);
                if !path.is_file() {
                    return Err(TranslateError::MissingPayload(path));
                }
                Some(path)
            }
            None => None,
        };

        let sound_file = match Path::new(&source.file).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{name}.{ext}"),
            None => format!("{name}.wav"),
        };

        let compressed = source.flags & SourceSound::FLAG_COMPRESSED != 0;
        debug!("Sound {}: group {}, file {}", name, group, sound_file);

        Ok(Self {
            compression: if compressed { 1 } else { 0 },
            volume: source.volume,
            preload: true,
            bit_rate: 128,
            sample_rate: 44100,
            sound_type: 0,
            bit_depth: 1,
            audio_group_id: IdPath::audio_group(group),
            sound_file,
            duration: 0.0,
            parent: IdPath::folder(PARENT_FOLDER),
            resource_version: "1.0",
            name,
            tags: Vec::new(),
            resource_type: "GMSound",
            data,
        })
    }
}

impl Resource for GMSound {
    fn name(&self) -> &str {
        &self.name
    }

    fn directory(&self) -> PathBuf {
        ids::resource_dir(&self.name, FOLDER)
    }

    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn payloads(&self) -> Vec<Payload> {
        self.data
            .iter()
            .map(|from| Payload::Copy {
                file: PathBuf::from(&self.sound_file),
                from: from.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportOptions;
    use crate::source::SourceData;
    use crate::utils::imaging::TexturePages;

    fn context(source: SourceData, options: ExportOptions) -> ExportContext {
        ExportContext::new(options, source, Box::new(TexturePages::new(Vec::new())), PathBuf::from("out"))
    }

    #[test]
    fn test_group_and_file_name() {
        let sound = SourceSound {
            name: "snd_jump".into(),
            file: "jump.ogg".into(),
            volume: 0.5,
            flags: SourceSound::FLAG_COMPRESSED,
            audio_group: "audiogroup_sfx".into(),
            ..Default::default()
        };
        let source = SourceData { sounds: vec![sound], ..Default::default() };

        let ctx = context(source.clone(), ExportOptions::default());
        let out = GMSound::translate(&ctx.source.sounds[0], &ctx).unwrap();
        assert_eq!(out.audio_group_id.name, DEFAULT_AUDIO_GROUP);
        assert_eq!(out.sound_file, "snd_jump.ogg");
        assert_eq!(out.compression, 1);
        assert!(out.payloads().is_empty());

        let grouped = context(source, ExportOptions { audio_groups: true, ..Default::default() });
        let out = GMSound::translate(&grouped.source.sounds[0], &grouped).unwrap();
        assert_eq!(out.audio_group_id, IdPath::audio_group("audiogroup_sfx"));
    }

    #[test]
    fn test_missing_data_fails() {
        let sound = SourceSound {
            name: "snd_gone".into(),
            data: Some(PathBuf::from("audio/snd_gone.wav")),
            ..Default::default()
        };
        let mut source = SourceData { sounds: vec![sound], ..Default::default() };
        source.base_dir = PathBuf::from("/nonexistent");

        let ctx = context(source, ExportOptions::default());
        let result = GMSound::translate(&ctx.source.sounds[0], &ctx);
        assert!(matches!(result, Err(TranslateError::MissingPayload(_))));
    }

    #[test]
    fn test_data_becomes_copy_payload() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("beep.wav"), b"RIFF").unwrap();

        let sound = SourceSound {
            name: "snd_beep".into(),
            file: "beep.wav".into(),
            data: Some(PathBuf::from("beep.wav")),
            ..Default::default()
        };
        let mut source = SourceData { sounds: vec![sound], ..Default::default() };
        source.base_dir = dir.path().to_path_buf();

        let ctx = context(source, ExportOptions::default());
        let out = GMSound::translate(&ctx.source.sounds[0], &ctx).unwrap();
        match out.payloads().as_slice() {
            [Payload::Copy { file, from }] => {
                assert_eq!(file, &PathBuf::from("snd_beep.wav"));
                assert_eq!(from, &dir.path().join("beep.wav"));
            }
            other => panic!("unexpected payloads: {:?}", other),
        }
    }
}
