//! SDFormat / MJCF conversion core
//!
//! This crate holds the document models and converters:
//! - sdf: SDFormat document model (URDF is accepted as input)
//! - mjcf: MuJoCo MJCF document model with default classes and geom inertia
//! - sdf_to_mjcf: SDFormat (or URDF) to MJCF
//! - mjcf_to_sdf: MJCF to SDFormat
//! - config: Conversion settings stored as RON

pub mod config;
pub mod error;
pub mod math;
pub mod mjcf;
pub mod mjcf_to_sdf;
pub mod names;
pub mod sdf;
pub mod sdf_to_mjcf;
pub mod tree;
pub mod xml;

pub use config::{ConfigError, ConversionConfig};
pub use error::ConvertError;
pub use math::Pose;
pub use mjcf::{MjcfError, Mujoco};
pub use names::UniqueNames;
pub use sdf::{Root as SdfRoot, SdfError};
pub use tree::{KinematicTree, TreeError};
