use std::{env, path::PathBuf, time::Duration};

use config::{ConfigError, FileFormat};
use directories::{BaseDirs, ProjectDirs};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::tui::{KeyBinding, KeyBindings, TableOptions, Theme};

const CONFIG: &str = include_str!("../.config/config.json5");

/// `table` section
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub rows_per_page: usize,
    pub search_placeholder: String,
    pub search_debounce_ms: u64,
    pub discard_stale_responses: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            rows_per_page: 10,
            search_placeholder: "Search".to_string(),
            search_debounce_ms: 0,
            discard_stale_responses: true,
        }
    }
}

impl TableConfig {
    /// Copy these settings onto widget options
    pub fn apply(&self, options: TableOptions) -> TableOptions {
        TableOptions {
            rows_per_page: self.rows_per_page,
            search_placeholder: self.search_placeholder.clone(),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            discard_stale_responses: self.discard_stale_responses,
            ..options
        }
    }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Overrides merged over the built-in bindings
    #[serde(default)]
    pub keybindings: Vec<KeyBinding>,
}

fn default_theme() -> String {
    "dark".to_string()
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Built-in defaults only, no user file
    pub fn embedded() -> Result<Self, ConfigError> {
        let mut cfg: Self =
            json5::from_str(CONFIG).map_err(|e| ConfigError::Message(e.to_string()))?;
        cfg.config = AppConfig {
            data_dir: get_data_dir(),
            config_dir: get_config_dir(),
        };
        Ok(cfg)
    }

    /// Embedded defaults layered under the user's file
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let (selected_path, required) = match config_path {
            Some(p) => (expand_tilde(p), true),
            None => (config_dir.join("config.json5"), false),
        };

        let builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(config::File::from_str(CONFIG, FileFormat::Json5))
            .add_source(
                config::File::from(selected_path)
                    .format(FileFormat::Json5)
                    .required(required),
            );

        let cfg: Self = builder.build()?.try_deserialize()?;
        if cfg.table.rows_per_page == 0 {
            return Err(ConfigError::Message(
                "table.rows_per_page must be greater than zero".to_string(),
            ));
        }
        for warning in cfg.keybindings().validate() {
            warn!("Keybindings: {warning}");
        }
        Ok(cfg)
    }

    /// Built-in bindings with the configured overrides applied
    pub fn keybindings(&self) -> KeyBindings {
        let mut bindings = KeyBindings::default();
        bindings.merge(&self.keybindings);
        bindings
    }

    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.theme)
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with('~') {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen('~', base.home_dir().to_str().unwrap_or(""), 1));
            }
        }
    }
    path.clone()
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pagedtable", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::Action;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".json5")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let cfg = Config::embedded().unwrap();
        assert_eq!(cfg.config.data_dir, get_data_dir());
        assert_eq!(cfg.table, TableConfig::default());
        assert_eq!(cfg.theme, "dark");
        assert!(cfg.keybindings.is_empty());
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let file = write_config(
            r#"{
                table: { rows_per_page: 25, search_debounce_ms: 150 },
                theme: "light",
                keybindings: [ { key: "x", action: "NextPage" } ],
            }"#,
        );
        let cfg = Config::from_path(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.table.rows_per_page, 25);
        assert_eq!(cfg.table.search_debounce_ms, 150);
        assert_eq!(cfg.table.search_placeholder, "Search");
        assert!(cfg.table.discard_stale_responses);
        assert_eq!(cfg.theme().name, "Light");

        let bindings = cfg.keybindings();
        let x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        let n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE);
        assert_eq!(bindings.get_action(&x), Some(Action::NextPage));
        assert_eq!(bindings.get_action(&n), Some(Action::NextPage));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json5");
        assert!(Config::from_path(Some(&missing)).is_err());
    }

    #[test]
    fn test_zero_rows_per_page_rejected() {
        let file = write_config(r#"{ table: { rows_per_page: 0 } }"#);
        let err = Config::from_path(Some(&file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().contains("rows_per_page"));
    }

    #[test]
    fn test_table_config_apply() {
        let cfg = TableConfig {
            rows_per_page: 5,
            search_placeholder: "Find people".into(),
            search_debounce_ms: 200,
            discard_stale_responses: false,
        };
        let options = cfg.apply(TableOptions::default().with_title("People"));
        assert_eq!(options.rows_per_page, 5);
        assert_eq!(options.search_placeholder, "Find people");
        assert_eq!(options.search_debounce, Duration::from_millis(200));
        assert!(!options.discard_stale_responses);
        assert_eq!(options.title.as_deref(), Some("People"));
    }
}
