use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("vfhnav-core: Invalid config `{}`: {}", field, message)]
    InvalidConfig { field: &'static str, message: String },
    #[error(
        "vfhnav-core: Depth image size mismatch (width = {}, height = {}, len = {})",
        width,
        height,
        len
    )]
    DepthImageSize {
        width: usize,
        height: usize,
        len: usize,
    },
    #[error("vfhnav-core: naci: {:?}", .0)]
    Naci(#[from] naci::Error),
}

pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Error {
    Error::InvalidConfig {
        field,
        message: message.into(),
    }
}
