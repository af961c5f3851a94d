use crate::error::ConvertError;
use crate::mjcf::Mujoco;
use crate::sdf::World;

use super::{Converter, light, model};

/// Convert a world: physics settings, world lights and every model
pub(crate) fn add_world(cx: &mut Converter, mujoco: &mut Mujoco, world: &World) -> Result<(), ConvertError> {
    mujoco.model = Some(world.name.clone());

    mujoco.option.gravity = world.gravity;
    mujoco.option.magnetic = world.magnetic_field;
    mujoco.option.wind = world.wind_linear_velocity;
    mujoco.option.timestep = world.max_step_size;

    for light in &world.lights {
        if let Some(frame) = &light.pose.relative_to {
            tracing::warn!(
                "Light '{}' is placed relative to '{}'; using its pose in the world frame",
                light.name,
                frame
            );
        }
        let converted = light::add_light(cx, light, light.pose.pose);
        mujoco.worldbody.lights.push(converted);
    }

    for model in &world.models {
        model::add_model(cx, &mut mujoco.worldbody, model)?;
    }

    if !world.plugins.is_empty() {
        tracing::debug!("Dropping {} world plugins", world.plugins.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::convert;
    use crate::config::ConversionConfig;
    use crate::sdf::Root;
    use glam::DVec3;

    #[test]
    fn test_world_physics_and_lights() {
        let root = Root::from_xml(
            r#"<sdf version="1.9">
                 <world name="shapes">
                   <physics name="p" type="ode"><max_step_size>0.002</max_step_size></physics>
                   <gravity>0 0 -3</gravity>
                   <wind><linear_velocity>1 0 0</linear_velocity></wind>
                   <light name="sun" type="directional">
                     <pose>0 0 10 0 0 0</pose>
                     <direction>0.5 0.1 -0.9</direction>
                   </light>
                   <model name="ground">
                     <static>true</static>
                     <link name="ground_link">
                       <collision name="plane">
                         <geometry><plane><normal>0 0 1</normal><size>10 10</size></plane></geometry>
                       </collision>
                     </link>
                   </model>
                 </world>
               </sdf>"#,
        )
        .unwrap();
        let mujoco = convert(&root, &ConversionConfig::default()).unwrap();

        assert_eq!(mujoco.model.as_deref(), Some("shapes"));
        assert_eq!(mujoco.option.timestep, Some(0.002));
        assert_eq!(mujoco.option.gravity, DVec3::new(0.0, 0.0, -3.0));
        assert_eq!(mujoco.option.wind, DVec3::X);

        let sun = &mujoco.worldbody.lights[0];
        assert_eq!(sun.name.as_deref(), Some("sun"));
        assert!(sun.directional);
        assert!(sun.pos.abs_diff_eq(DVec3::new(0.0, 0.0, 10.0), 1e-12));

        let ground = mujoco.find_body("ground_link").unwrap();
        assert!(ground.freejoint.is_none());
        assert_eq!(ground.geoms[0].size, vec![5.0, 5.0, 0.0]);
    }
}
