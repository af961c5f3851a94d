//! SDFormat to MJCF conversion
//!
//! A world becomes the MJCF world body; every link becomes a body nested
//! under its parent link's body, so the MJCF tree mirrors the kinematic
//! tree of each model.
//!
//! - world: physics settings and world lights
//! - model: kinematic tree and body placement
//! - link: one body per link (inertial, geoms, sensors, lights)
//! - joint, geometry, material, sensor, light: per-element conversion

mod geometry;
mod joint;
mod light;
mod link;
mod material;
mod model;
mod sensor;
mod world;

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::mjcf::{self, Assets, Mujoco};
use crate::names::UniqueNames;
use crate::sdf;

/// Geom group holding collision geometry
pub const COLLISION_GEOM_GROUP: i32 = 3;
/// Geom group holding visual geometry
pub const VISUAL_GEOM_GROUP: i32 = 0;

/// Name namespaces; MJCF names are unique per element type
pub(crate) mod ns {
    pub const BODY: &str = "body";
    pub const JOINT: &str = "joint";
    pub const GEOM: &str = "geom";
    pub const SITE: &str = "site";
    pub const CAMERA: &str = "camera";
    pub const LIGHT: &str = "light";
    pub const MATERIAL: &str = "material";
    pub const MESH: &str = "mesh";
    pub const SENSOR: &str = "sensor";
}

/// State shared by the element converters
pub(crate) struct Converter<'a> {
    pub config: &'a ConversionConfig,
    pub names: UniqueNames,
    pub assets: Assets,
    pub sensors: Vec<mjcf::Sensor>,
}

impl<'a> Converter<'a> {
    pub fn new(config: &'a ConversionConfig) -> Self {
        Self {
            config,
            names: UniqueNames::new(),
            assets: Assets::default(),
            sensors: Vec::new(),
        }
    }

    fn finish(self, mujoco: &mut Mujoco) {
        mujoco.assets = self.assets;
        mujoco.sensors = self.sensors;
    }
}

/// Convert an SDFormat document (or a URDF read as one) to MJCF
pub fn convert(root: &sdf::Root, config: &ConversionConfig) -> Result<Mujoco, ConvertError> {
    let mut converter = Converter::new(config);
    let mut mujoco = Mujoco::default();

    match (root.worlds.first(), &root.model) {
        (Some(world), _) => {
            if root.worlds.len() > 1 {
                tracing::warn!(
                    "Document has {} worlds; only '{}' is converted",
                    root.worlds.len(),
                    world.name
                );
            }
            world::add_world(&mut converter, &mut mujoco, world)?;
        }
        (None, Some(model)) => {
            mujoco.model = Some(model.name.clone());
            model::add_model(&mut converter, &mut mujoco.worldbody, model)?;
        }
        (None, None) => {
            return Err(ConvertError::Empty(
                "the SDFormat document has no world or model".to_string(),
            ));
        }
    }

    converter.finish(&mut mujoco);
    tracing::debug!(
        "Converted SDFormat to MJCF with {} top-level bodies",
        mujoco.worldbody.bodies.len()
    );
    Ok(mujoco)
}
