//! Sprite sequence: playback settings plus the frames track.
//!
//! Every sprite owns exactly one sequence whose frames track holds one
//! keyframe per sprite frame.

use indexmap::IndexMap;
use serde::Serialize;

use crate::ids::IdPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum PlaybackType {
    Oneshot,
    Looped,
    Pingpong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum PlaybackSpeedType {
    FramesPerSecond,
    FramesPerGameFrame,
}

impl PlaybackSpeedType {
    /// Map the archive's raw value; unknown values fall back to per-second.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => PlaybackSpeedType::FramesPerGameFrame,
            _ => PlaybackSpeedType::FramesPerSecond,
        }
    }
}

into_u8!(PlaybackType, PlaybackSpeedType);

/// Channel payload of a frames-track keyframe.
#[derive(Debug, Clone, Serialize)]
pub struct SpriteFrameKeyframe {
    #[serde(rename = "Id")]
    pub id: IdPath,
    #[serde(rename = "resourceVersion")]
    resource_version: &'static str,
    #[serde(rename = "resourceType")]
    resource_type: &'static str,
}

impl SpriteFrameKeyframe {
    pub fn new(id: IdPath) -> Self {
        Self {
            id,
            resource_version: "1.0",
            resource_type: "SpriteFrameKeyframe",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Keyframe {
    #[serde(rename = "id")]
    pub id: String,
    pub key: f32,
    pub length: f32,
    pub stretch: bool,
    pub disabled: bool,
    pub is_creation_key: bool,
    pub channels: IndexMap<String, SpriteFrameKeyframe>,
    #[serde(rename = "resourceVersion")]
    resource_version: &'static str,
    #[serde(rename = "resourceType")]
    resource_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyframeStore {
    #[serde(rename = "Keyframes")]
    pub keyframes: Vec<Keyframe>,
    #[serde(rename = "resourceVersion")]
    resource_version: &'static str,
    #[serde(rename = "resourceType")]
    resource_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMSpriteFramesTrack {
    pub name: String,
    pub sprite_id: Option<IdPath>,
    pub keyframes: KeyframeStore,
    pub track_colour: u32,
    pub inherits_track_colour: bool,
    pub builtin_name: u32,
    pub traits: u32,
    pub interpolation: u32,
    pub is_creation_track: bool,
    pub resource_version: &'static str,
    pub tags: Vec<String>,
    pub resource_type: &'static str,
}

impl Default for GMSpriteFramesTrack {
    fn default() -> Self {
        Self {
            name: "frames".to_string(),
            sprite_id: None,
            keyframes: KeyframeStore {
                keyframes: Vec::new(),
                resource_version: "1.0",
                resource_type: "KeyframeStore<SpriteFrameKeyframe>",
            },
            track_colour: 0,
            inherits_track_colour: true,
            builtin_name: 0,
            traits: 0,
            interpolation: 1,
            is_creation_track: false,
            resource_version: "1.0",
            tags: Vec::new(),
            resource_type: "GMSpriteFramesTrack",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GMSequence {
    pub sprite_id: IdPath,
    pub time_units: u32,
    pub playback: PlaybackType,
    pub playback_speed: f32,
    pub playback_speed_type: PlaybackSpeedType,
    pub auto_record: bool,
    pub volume: f32,
    pub length: f32,
    pub tracks: Vec<GMSpriteFramesTrack>,
    pub visible_range: Option<()>,
    pub lock_origin: bool,
    pub show_backdrop: bool,
    pub xorigin: i32,
    pub yorigin: i32,
    pub parent: IdPath,
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    pub resource_type: &'static str,
}

impl GMSequence {
    /// Empty looping sequence owned by sprite `sprite`.
    pub fn for_sprite(sprite: &IdPath, speed: f32, speed_type: PlaybackSpeedType, origin: (i32, i32)) -> Self {
        Self {
            sprite_id: sprite.clone(),
            time_units: 1,
            playback: PlaybackType::Looped,
            playback_speed: speed,
            playback_speed_type: speed_type,
            auto_record: true,
            volume: 1.0,
            length: 0.0,
            tracks: Vec::new(),
            visible_range: None,
            lock_origin: false,
            show_backdrop: true,
            xorigin: origin.0,
            yorigin: origin.1,
            parent: sprite.clone(),
            resource_version: "1.4",
            name: sprite.name.clone(),
            tags: Vec::new(),
            resource_type: "GMSequence",
        }
    }

    /// Frames track, created on first use.
    fn frames_track(&mut self) -> &mut GMSpriteFramesTrack {
        if self.tracks.is_empty() {
            self.tracks.push(GMSpriteFramesTrack::default());
        }
        &mut self.tracks[0]
    }

    /// Append a frame keyframe at `index` and grow the sequence to cover it.
    pub fn add_frame_key(&mut self, index: usize, keyframe_id: String, frame: IdPath) {
        let mut channels = IndexMap::new();
        channels.insert("0".to_string(), SpriteFrameKeyframe::new(frame));

        self.frames_track().keyframes.keyframes.push(Keyframe {
            id: keyframe_id,
            key: index as f32,
            length: 1.0,
            stretch: false,
            disabled: false,
            is_creation_key: false,
            channels,
            resource_version: "1.0",
            resource_type: "Keyframe<SpriteFrameKeyframe>",
        });
        self.length = self.length.max(index as f32 + 1.0);
    }

    /// Keyframes of the frames track, in insertion order.
    pub fn frame_keys(&self) -> &[Keyframe] {
        self.tracks
            .first()
            .map(|t| t.keyframes.keyframes.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_keys_extend_length() {
        let id = IdPath::resource("spr_a", "sprites");
        let mut seq = GMSequence::for_sprite(&id, 15.0, PlaybackSpeedType::FramesPerSecond, (0, 0));
        assert!(seq.tracks.is_empty());

        seq.add_frame_key(0, "k0".into(), IdPath::new("f0", id.path.clone()));
        seq.add_frame_key(1, "k1".into(), IdPath::new("f1", id.path.clone()));

        assert_eq!(seq.tracks.len(), 1);
        assert_eq!(seq.length, 2.0);
        let keys = seq.frame_keys();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].key, 1.0);
        assert_eq!(keys[1].channels["0"].id.name, "f1");
    }

    #[test]
    fn test_json_shape() {
        let id = IdPath::resource("spr_a", "sprites");
        let mut seq = GMSequence::for_sprite(&id, 1.0, PlaybackSpeedType::FramesPerGameFrame, (4, 8));
        seq.add_frame_key(0, "k0".into(), IdPath::new("f0", id.path.clone()));

        let json = serde_json::to_value(&seq).unwrap();
        assert_eq!(json["playback"], 1);
        assert_eq!(json["playbackSpeedType"], 1);
        assert_eq!(json["xorigin"], 4);
        assert_eq!(json["resourceType"], "GMSequence");
        let key = &json["tracks"][0]["keyframes"]["Keyframes"][0];
        assert_eq!(key["id"], "k0");
        assert_eq!(key["Key"], 0.0);
        assert_eq!(key["Channels"]["0"]["Id"]["name"], "f0");
    }
}
