use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub default_color: String,
    pub log_filter: String,
}

fn default_data_dir() -> String {
    directories::ProjectDirs::from("dev", "diabloproject", "pixmap")
        .map(|dirs| dirs.data_dir().to_string_lossy().into_owned())
        .unwrap_or_else(|| ".pixmap".to_string())
}

/// Defaults, then `pixmap.yaml` (or `file`), then `PIXMAP_*` environment variables.
pub fn get_settings(file: Option<&Path>) -> Result<Settings, ::config::ConfigError> {
    let file_source = match file {
        Some(path) => ::config::File::from(path).required(true),
        None => ::config::File::with_name("pixmap").required(false),
    };
    ::config::Config::builder()
        .set_default("data_dir", default_data_dir())?
        .set_default("default_color", pixgrid::color::DEFAULT_COLOR)?
        .set_default("log_filter", "pixmap=info,pixgrid=warn")?
        .add_source(file_source)
        .add_source(::config::Environment::with_prefix("PIXMAP"))
        .build()?
        .try_deserialize()
}
