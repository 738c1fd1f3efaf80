use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("vfhnav-apps: No File {:?} is found ({}).", .0, .1)]
    NoFile(PathBuf, #[source] std::io::Error),
    #[error("vfhnav-apps: Failed to parse {:?} as toml ({}).", .0, .1)]
    TomlParseFailure(PathBuf, #[source] toml::de::Error),
    #[error("vfhnav-apps: Failed to serialize config as toml ({}).", .0)]
    TomlSerializeFailure(#[from] toml::ser::Error),
    #[error("vfhnav-apps: Invalid override {:?} ({:#}).", .0, .1)]
    InvalidOverride(String, #[source] anyhow::Error),
    #[error("vfhnav-apps: Invalid config `{}`: {}", field, message)]
    InvalidConfig { field: &'static str, message: String },
    #[error("vfhnav-apps: Failed to parse replay {:?} line {} ({}).", path, line, source)]
    ReplayParseFailure {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("vfhnav-apps: Failed to set up logging ({:#}).", .0)]
    Logging(#[source] anyhow::Error),
    #[error("vfhnav-apps: vfhnav-core: {:?}", .0)]
    Core(#[from] vfhnav_core::Error),
    #[error("vfhnav-apps: naci: {:?}", .0)]
    Naci(#[from] naci::Error),
}
