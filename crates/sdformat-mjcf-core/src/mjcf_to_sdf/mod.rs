//! MJCF to SDFormat conversion
//!
//! The MJCF world body becomes one SDFormat world holding two models: a
//! static model with the world body geoms, and a model with one link per
//! body. Links are posed in the model frame and connected by the body
//! joints, so the nesting of MJCF bodies turns into the joint graph.

mod geometry;
mod joint;
mod light;
mod link;
mod material;
mod sensor;
mod world;

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::mjcf::Mujoco;
use crate::names::UniqueNames;
use crate::sdf::{self, Plugin};

/// Name namespaces of the generated document
pub(crate) mod ns {
    /// Links, joints and frames share one namespace per model
    pub const FRAME: &str = "frame";
    pub const VISUAL: &str = "visual";
    pub const COLLISION: &str = "collision";
    pub const SENSOR: &str = "sensor";
    pub const LIGHT: &str = "light";
    pub const MODEL: &str = "model";
}

/// Gazebo systems added by `export_world_plugins`
pub const WORLD_PLUGINS: [(&str, &str); 4] = [
    ("ignition-gazebo-physics-system", "ignition::gazebo::systems::Physics"),
    ("ignition-gazebo-sensors-system", "ignition::gazebo::systems::Sensors"),
    ("ignition-gazebo-user-commands-system", "ignition::gazebo::systems::UserCommands"),
    (
        "ignition-gazebo-scene-broadcaster-system",
        "ignition::gazebo::systems::SceneBroadcaster",
    ),
];

/// State shared by the element converters
pub(crate) struct Exporter<'a> {
    pub config: &'a ConversionConfig,
    pub mujoco: &'a Mujoco,
    pub names: UniqueNames,
}

impl<'a> Exporter<'a> {
    pub fn new(mujoco: &'a Mujoco, config: &'a ConversionConfig) -> Self {
        Self {
            config,
            mujoco,
            names: UniqueNames::new(),
        }
    }
}

/// Convert an MJCF document into an SDFormat world
pub fn convert(mujoco: &Mujoco, config: &ConversionConfig) -> Result<sdf::Root, ConvertError> {
    let mut cx = Exporter::new(mujoco, config);
    let mut world = world::convert_world(&mut cx)?;

    if config.export_world_plugins {
        world.plugins = WORLD_PLUGINS
            .iter()
            .map(|(filename, name)| Plugin::new(*filename, *name))
            .collect();
    }

    tracing::debug!(
        "Converted MJCF to SDFormat world with {} models",
        world.models.len()
    );
    Ok(sdf::Root {
        version: config.sdf_version.clone(),
        worlds: vec![world],
        model: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_plugins_on_request() {
        let mujoco = Mujoco::from_xml("<mujoco model='m'><worldbody/></mujoco>").unwrap();

        let root = convert(&mujoco, &ConversionConfig::default()).unwrap();
        assert!(root.worlds[0].plugins.is_empty());

        let config = ConversionConfig {
            export_world_plugins: true,
            ..Default::default()
        };
        let root = convert(&mujoco, &config).unwrap();
        let names: Vec<_> = root.worlds[0].plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "ignition::gazebo::systems::Physics",
                "ignition::gazebo::systems::Sensors",
                "ignition::gazebo::systems::UserCommands",
                "ignition::gazebo::systems::SceneBroadcaster",
            ]
        );
        assert_eq!(root.version, "1.9");
    }
}
