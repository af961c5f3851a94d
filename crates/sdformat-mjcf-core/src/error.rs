//! Conversion errors

use crate::config::ConfigError;
use crate::mjcf::MjcfError;
use crate::sdf::{FrameError, SdfError};
use crate::tree::TreeError;
use crate::xml::XmlError;

/// Errors that can occur while converting between formats
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error(transparent)]
    Sdf(#[from] SdfError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Mjcf(#[from] MjcfError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Nothing to convert: {0}")]
    Empty(String),
}
