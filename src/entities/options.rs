//! Game option sets (Main, Windows).
//!
//! Only Main and Windows can be rebuilt from the archive; the other
//! platforms are listed in the project but have no source data.

use std::path::PathBuf;

use serde::Serialize;

use super::Resource;
use crate::ids::{self, IdPath};
use crate::source::GeneralInfo;

/// `(name, path)` of every option set the authoring tool knows.
pub const MAIN_OPTIONS: (&str, &str) = ("Main", "options/main/options_main.yy");
pub const WINDOWS_OPTIONS: (&str, &str) = ("Windows", "options/windows/options_windows.yy");
pub const OTHER_PLATFORM_OPTIONS: [(&str, &str); 7] = [
    ("macOS", "options/mac/options_mac.yy"),
    ("Linux", "options/linux/options_linux.yy"),
    ("HTML5", "options/html5/options_html5.yy"),
    ("Android", "options/android/options_android.yy"),
    ("iOS", "options/ios/options_ios.yy"),
    ("tvOS", "options/tvos/options_tvos.yy"),
    ("operagx", "options/operagx/options_operagx.yy"),
];

/// Option entries the project lists.
pub fn option_ids(other_platforms: bool) -> Vec<IdPath> {
    let mut ids = vec![
        IdPath::new(MAIN_OPTIONS.0, MAIN_OPTIONS.1),
        IdPath::new(WINDOWS_OPTIONS.0, WINDOWS_OPTIONS.1),
    ];
    if other_platforms {
        ids.extend(OTHER_PLATFORM_OPTIONS.iter().map(|(name, path)| IdPath::new(*name, *path)));
    }
    ids
}

fn split(path: &str) -> (PathBuf, String) {
    let path = PathBuf::from(path);
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = path.parent().map(PathBuf::from).unwrap_or_default();
    (dir, file)
}

#[derive(Debug, Clone, Serialize)]
pub struct GMMainOptions {
    pub option_gameguid: String,
    pub option_gameid: String,
    pub option_game_speed: u32,
    pub option_mips_for_3d_textures: bool,
    pub option_draw_colour: u32,
    pub option_window_colour: u32,
    pub option_steam_app_id: String,
    pub option_sci_usesci: bool,
    pub option_author: String,
    pub option_collision_compatibility: bool,
    pub option_copy_on_write_enabled: bool,
    pub option_spine_licence: bool,
    pub option_template_image: String,
    pub option_template_icon: String,
    pub option_template_description: Option<String>,
    #[serde(rename = "resourceVersion")]
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
}

impl GMMainOptions {
    pub fn translate(general: &GeneralInfo) -> Self {
        Self {
            option_gameguid: ids::content_id(&format!("{}.gameguid", general.name)),
            option_gameid: "0".to_string(),
            option_game_speed: general.game_speed,
            option_mips_for_3d_textures: false,
            option_draw_colour: 4_294_967_295,
            option_window_colour: 255,
            option_steam_app_id: "0".to_string(),
            option_sci_usesci: false,
            option_author: String::new(),
            option_collision_compatibility: true,
            option_copy_on_write_enabled: false,
            option_spine_licence: false,
            option_template_image: "${base_options_dir}/main/template_image.png".to_string(),
            option_template_icon: "${base_options_dir}/main/template_icon.png".to_string(),
            option_template_description: None,
            resource_version: "1.4",
            name: MAIN_OPTIONS.0.to_string(),
            tags: Vec::new(),
            resource_type: "GMMainOptions",
        }
    }
}

impl Resource for GMMainOptions {
    fn name(&self) -> &str {
        &self.name
    }

    fn directory(&self) -> PathBuf {
        split(MAIN_OPTIONS.1).0
    }

    fn file_name(&self) -> String {
        split(MAIN_OPTIONS.1).1
    }

    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GMWindowsOptions {
    pub option_windows_display_name: String,
    pub option_windows_executable_name: String,
    pub option_windows_version: String,
    pub option_windows_company_info: String,
    pub option_windows_product_info: String,
    pub option_windows_copyright_info: String,
    pub option_windows_description_info: String,
    pub option_windows_display_cursor: bool,
    pub option_windows_icon: String,
    pub option_windows_save_location: u32,
    pub option_windows_splash_screen: String,
    pub option_windows_use_splash: bool,
    pub option_windows_start_fullscreen: bool,
    pub option_windows_allow_fullscreen_switching: bool,
    pub option_windows_interpolate_pixels: bool,
    pub option_windows_vsync: bool,
    pub option_windows_resize_window: bool,
    pub option_windows_borderless: bool,
    pub option_windows_scale: u32,
    pub option_windows_copy_exe_to_dest: bool,
    pub option_windows_sleep_margin: u32,
    pub option_windows_texture_page: String,
    pub option_windows_steam_use_alternative_launcher: bool,
    #[serde(rename = "resourceVersion")]
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
}

impl GMWindowsOptions {
    pub fn translate(general: &GeneralInfo) -> Self {
        let display_name = if general.display_name.is_empty() {
            general.name.clone()
        } else {
            general.display_name.clone()
        };

        Self {
            option_windows_display_name: display_name.clone(),
            option_windows_executable_name: "${project_name}.exe".to_string(),
            option_windows_version: "1.0.0.0".to_string(),
            option_windows_company_info: String::new(),
            option_windows_product_info: display_name,
            option_windows_copyright_info: String::new(),
            option_windows_description_info: "A GameMaker Game".to_string(),
            option_windows_display_cursor: general.show_cursor,
            option_windows_icon: "${base_options_dir}/windows/icons/icon.ico".to_string(),
            option_windows_save_location: 0,
            option_windows_splash_screen: "${base_options_dir}/windows/splash/splash.png".to_string(),
            option_windows_use_splash: false,
            option_windows_start_fullscreen: general.fullscreen,
            option_windows_allow_fullscreen_switching: true,
            option_windows_interpolate_pixels: general.interpolate_pixels,
            option_windows_vsync: general.vsync,
            option_windows_resize_window: general.resizable,
            option_windows_borderless: general.borderless,
            option_windows_scale: 0,
            option_windows_copy_exe_to_dest: false,
            option_windows_sleep_margin: 10,
            option_windows_texture_page: "2048x2048".to_string(),
            option_windows_steam_use_alternative_launcher: false,
            resource_version: "1.1",
            name: WINDOWS_OPTIONS.0.to_string(),
            tags: Vec::new(),
            resource_type: "GMWindowsOptions",
        }
    }
}

impl Resource for GMWindowsOptions {
    fn name(&self) -> &str {
        &self.name
    }

    fn directory(&self) -> PathBuf {
        split(WINDOWS_OPTIONS.1).0
    }

    fn file_name(&self) -> String {
        split(WINDOWS_OPTIONS.1).1
    }

    fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_ids() {
        let ids = option_ids(false);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].path, "options/main/options_main.yy");

        let all = option_ids(true);
        assert_eq!(all.len(), 9);
        assert_eq!(all[8].name, "operagx");
    }

    #[test]
    fn test_option_files_land_on_listed_paths() {
        let general = GeneralInfo::default();
        let main = GMMainOptions::translate(&general);
        let windows = GMWindowsOptions::translate(&general);

        assert_eq!(main.directory().join(main.file_name()), PathBuf::from(MAIN_OPTIONS.1));
        assert_eq!(windows.directory().join(windows.file_name()), PathBuf::from(WINDOWS_OPTIONS.1));
    }

    #[test]
    fn test_windows_flags_follow_general_info() {
        let general = GeneralInfo {
            name: "Game".into(),
            fullscreen: true,
            vsync: true,
            ..Default::default()
        };
        let windows = GMWindowsOptions::translate(&general);
        assert!(windows.option_windows_start_fullscreen);
        assert!(windows.option_windows_vsync);
        assert!(!windows.option_windows_borderless);
        assert_eq!(windows.option_windows_display_name, "Game");

        let main = GMMainOptions::translate(&general);
        assert_eq!(main.option_gameguid, GMMainOptions::translate(&general).option_gameguid);
        assert_eq!(main.option_game_speed, 30);
    }
}
