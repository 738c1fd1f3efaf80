use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("naci: Uninitialized : {}", message)]
    Uninitialized { message: String },
    #[error("naci: Connection error : {}", message)]
    Connection { message: String },
    #[error("naci: Canceled : {}", message)]
    Canceled { message: String },
    #[error("naci: Invalid frame : {}", message)]
    InvalidFrame { message: String },
    #[error("naci: End of stream")]
    EndOfStream,
    #[error("naci: Other: {:?}", .0)]
    Other(#[from] anyhow::Error),
}
