//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--config`, `--ext`, `--hidden`, `--theme`, `--no-mouse`)
//! 2. `$MEMOBLE_CONFIG` environment variable (path to config file)
//! 3. Project-local `.memoble.toml` in the current working directory
//! 4. Global `~/.config/memoble/config.toml`
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::editor::DEFAULT_TAB_WIDTH;
use crate::fs::catalog::CatalogFilter;
use crate::preview::{
    ExtensionTable, PreviewLimits, DEFAULT_DOCUMENT_MAX_DIMENSION, DEFAULT_DOCUMENT_ZOOM,
    DEFAULT_IMAGE_MAX_DIMENSION,
};

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Folder opened at startup (overridden by CLI positional arg).
    pub default_path: Option<String>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Which files show up in the list.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Only list files with these extensions. Unset lists every file.
    pub extensions: Option<Vec<String>>,
    /// List dot-files.
    pub show_hidden: Option<bool>,
}

/// Preview panel settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    pub text_extensions: Option<Vec<String>>,
    pub image_extensions: Option<Vec<String>>,
    pub document_extensions: Option<Vec<String>>,
    /// Longest side of an image thumbnail, in pixels.
    pub image_max_dimension: Option<u32>,
    /// Longest side of a rendered document page, in pixels.
    pub document_max_dimension: Option<u32>,
    /// Magnification used when rasterizing document pages.
    pub document_zoom: Option<f32>,
    /// Tab rendering width.
    pub tab_width: Option<usize>,
}

/// Edit mode settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    /// Spaces inserted by Tab.
    pub tab_width: Option<usize>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub list_bg: Option<String>,
    pub list_fg: Option<String>,
    pub list_selected_bg: Option<String>,
    pub list_selected_fg: Option<String>,
    pub list_hidden_fg: Option<String>,
    pub preview_bg: Option<String>,
    pub preview_fg: Option<String>,
    pub line_nr_fg: Option<String>,
    pub page_bar_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub catalog: CatalogConfig,
    pub preview: PreviewConfig,
    pub editor: EditorConfig,
    pub theme: ThemeConfig,
}

// ── Config file locator ──────────────────────────────────────────────────────

/// Candidate config file paths in priority order, excluding `--config`.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("MEMOBLE_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".memoble.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("memoble").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (logged as a warning).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => {
            log::debug!("loaded config from {}", path.display());
            Some(cfg)
        }
        Err(e) => {
            log::warn!("failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: other
                    .general
                    .default_path
                    .clone()
                    .or(self.general.default_path),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            catalog: CatalogConfig {
                extensions: other
                    .catalog
                    .extensions
                    .clone()
                    .or(self.catalog.extensions),
                show_hidden: other.catalog.show_hidden.or(self.catalog.show_hidden),
            },
            preview: PreviewConfig {
                text_extensions: other
                    .preview
                    .text_extensions
                    .clone()
                    .or(self.preview.text_extensions),
                image_extensions: other
                    .preview
                    .image_extensions
                    .clone()
                    .or(self.preview.image_extensions),
                document_extensions: other
                    .preview
                    .document_extensions
                    .clone()
                    .or(self.preview.document_extensions),
                image_max_dimension: other
                    .preview
                    .image_max_dimension
                    .or(self.preview.image_max_dimension),
                document_max_dimension: other
                    .preview
                    .document_max_dimension
                    .or(self.preview.document_max_dimension),
                document_zoom: other.preview.document_zoom.or(self.preview.document_zoom),
                tab_width: other.preview.tab_width.or(self.preview.tab_width),
            },
            editor: EditorConfig {
                tab_width: other.editor.tab_width.or(self.editor.tab_width),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so that higher ones overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            match load_file(cli_path) {
                Some(file_cfg) => config = config.merge(&file_cfg),
                None => log::warn!("config file {} not loaded", cli_path.display()),
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Whether mouse support is enabled.
    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// Whether dot-files are listed.
    pub fn show_hidden(&self) -> bool {
        self.catalog.show_hidden.unwrap_or(true)
    }

    pub fn catalog_filter(&self) -> CatalogFilter {
        let mut filter = match &self.catalog.extensions {
            Some(exts) => CatalogFilter::with_extensions(exts),
            None => CatalogFilter::default(),
        };
        filter.show_hidden = self.show_hidden();
        filter
    }

    /// Extension table for preview classification; unset lists keep their defaults.
    pub fn extension_table(&self) -> ExtensionTable {
        let defaults = ExtensionTable::default();
        let pick = |set: &Option<Vec<String>>, fallback: Vec<String>| -> Vec<String> {
            set.clone().unwrap_or(fallback)
        };
        ExtensionTable::new(
            &pick(&self.preview.text_extensions, defaults.text),
            &pick(&self.preview.image_extensions, defaults.image),
            &pick(&self.preview.document_extensions, defaults.document),
        )
    }

    pub fn preview_limits(&self) -> PreviewLimits {
        PreviewLimits {
            image_max: self
                .preview
                .image_max_dimension
                .unwrap_or(DEFAULT_IMAGE_MAX_DIMENSION)
                .max(1),
            document_max: self
                .preview
                .document_max_dimension
                .unwrap_or(DEFAULT_DOCUMENT_MAX_DIMENSION)
                .max(1),
            document_zoom: self
                .preview
                .document_zoom
                .filter(|z| z.is_finite() && *z > 0.0)
                .unwrap_or(DEFAULT_DOCUMENT_ZOOM),
        }
    }

    /// Tab width used when drawing text previews.
    pub fn preview_tab_width(&self) -> usize {
        self.preview.tab_width.unwrap_or(DEFAULT_TAB_WIDTH).max(1)
    }

    /// Spaces inserted by Tab in edit mode.
    pub fn editor_tab_width(&self) -> usize {
        self.editor.tab_width.unwrap_or(DEFAULT_TAB_WIDTH).max(1)
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::PreviewCategory;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(cfg.mouse_enabled());
        assert!(cfg.show_hidden());
        assert_eq!(cfg.catalog_filter(), CatalogFilter::default());
        assert_eq!(cfg.extension_table(), ExtensionTable::default());
        assert_eq!(cfg.preview_limits(), PreviewLimits::default());
        assert_eq!(cfg.preview_tab_width(), 4);
        assert_eq!(cfg.editor_tab_width(), 4);
        assert_eq!(cfg.theme_scheme(), "dark");
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
default_path = "/srv/notes"
mouse = false

[catalog]
extensions = ["txt", ".MD"]
show_hidden = false

[preview]
text_extensions = ["txt", "md"]
image_extensions = ["png", "webp"]
document_extensions = ["pdf", "xps"]
image_max_dimension = 320
document_max_dimension = 800
document_zoom = 1.5
tab_width = 8

[editor]
tab_width = 2

[theme]
scheme = "light"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.general.default_path.as_deref(), Some("/srv/notes"));
        assert!(!cfg.mouse_enabled());
        let filter = cfg.catalog_filter();
        assert!(!filter.show_hidden);
        assert_eq!(filter.extensions, Some(vec!["txt".into(), "md".into()]));

        let table = cfg.extension_table();
        assert_eq!(table.classify("a.webp"), PreviewCategory::Image);
        assert_eq!(table.classify("a.xps"), PreviewCategory::Document);
        assert_eq!(table.classify("a.py"), PreviewCategory::Unsupported);

        let limits = cfg.preview_limits();
        assert_eq!(limits.image_max, 320);
        assert_eq!(limits.document_max, 800);
        assert_eq!(limits.document_zoom, 1.5);
        assert_eq!(cfg.preview_tab_width(), 8);
        assert_eq!(cfg.editor_tab_width(), 2);
        assert_eq!(cfg.theme_scheme(), "light");
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[preview]
image_extensions = ["bmp"]
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        let table = cfg.extension_table();
        assert_eq!(table.classify("x.bmp"), PreviewCategory::Image);
        assert_eq!(table.classify("x.png"), PreviewCategory::Unsupported);
        // Other lists keep their defaults
        assert_eq!(table.classify("x.txt"), PreviewCategory::Text);
        assert_eq!(table.classify("x.pdf"), PreviewCategory::Document);
        assert!(cfg.show_hidden());
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(cfg.show_hidden());
        assert!(cfg.mouse_enabled());
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let toml = r#"
[preview]
image_max_dimension = 0
document_zoom = -2.0
tab_width = 0
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        let limits = cfg.preview_limits();
        assert_eq!(limits.image_max, 1);
        assert_eq!(limits.document_zoom, DEFAULT_DOCUMENT_ZOOM);
        assert_eq!(cfg.preview_tab_width(), 1);
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            general: GeneralConfig {
                mouse: Some(false),
                ..Default::default()
            },
            catalog: CatalogConfig {
                show_hidden: Some(false),
                extensions: Some(vec!["txt".into()]),
            },
            ..Default::default()
        };

        let over = AppConfig {
            catalog: CatalogConfig {
                show_hidden: Some(true),
                // extensions not set: keep base
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(merged.show_hidden());
        assert!(!merged.mouse_enabled());
        assert_eq!(merged.catalog.extensions, Some(vec!["txt".to_string()]));
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            editor: EditorConfig { tab_width: Some(3) },
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.editor_tab_width(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[catalog]
extensions = ["txt"]

[editor]
tab_width = 6
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert_eq!(cfg.catalog.extensions, Some(vec!["txt".to_string()]));
        assert_eq!(cfg.editor_tab_width(), 6);
        assert_eq!(cfg.preview_tab_width(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[general]
mouse = false

[editor]
tab_width = 8
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            editor: EditorConfig { tab_width: Some(2) },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        // CLI override wins
        assert_eq!(cfg.editor_tab_width(), 2);
        // File value preserved
        assert!(!cfg.mouse_enabled());
    }

    #[test]
    fn test_theme_custom_colors() {
        let toml = r##"
[theme]
scheme = "custom"

[theme.custom]
list_bg = "#1a1b26"
list_fg = "#c0caf5"
page_bar_fg = "#565f89"
"##;
        let cfg: AppConfig = toml::from_str(toml).expect("parse");
        assert_eq!(cfg.theme_scheme(), "custom");
        let custom = cfg.theme.custom.as_ref().expect("custom present");
        assert_eq!(custom.list_bg.as_deref(), Some("#1a1b26"));
        assert_eq!(custom.list_fg.as_deref(), Some("#c0caf5"));
        assert_eq!(custom.page_bar_fg.as_deref(), Some("#565f89"));
        assert!(custom.dialog_bg.is_none());
    }
}
