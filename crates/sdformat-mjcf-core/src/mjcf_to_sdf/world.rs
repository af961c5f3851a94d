use glam::DVec3;

use crate::error::ConvertError;
use crate::math::Pose;
use crate::mjcf::Body;
use crate::sdf::{Model, World};

use super::link::body_to_link;
use super::{Exporter, joint, light, ns};

/// Parent name of top-level links
const WORLD_FRAME: &str = "world";

pub(crate) fn convert_world(cx: &mut Exporter) -> Result<World, ConvertError> {
    let mujoco = cx.mujoco;
    let mut world = World::new("default");

    let option = &mujoco.option;
    world.gravity = if option.gravity_disabled { DVec3::ZERO } else { option.gravity };
    world.magnetic_field = option.magnetic;
    world.wind_linear_velocity = option.wind;
    world.max_step_size = option.timestep;

    for mj_light in &mujoco.worldbody.lights {
        world.lights.push(light::light_to_sdf(cx, mj_light));
    }

    world.models.push(static_model(cx)?);
    world.models.push(dynamic_model(cx)?);
    Ok(world)
}

/// Model holding the world body geoms, sites and cameras
fn static_model(cx: &mut Exporter) -> Result<Model, ConvertError> {
    let mujoco = cx.mujoco;
    let worldbody = &mujoco.worldbody;
    // the model name must not clash with a world body geom
    for name in worldbody.geoms.iter().filter_map(|g| g.name.as_deref()) {
        cx.names.reserve(ns::MODEL, name);
    }
    let name = cx.names.claim(ns::MODEL, "static");

    let mut model = Model::new(name.clone());
    model.is_static = true;
    let output = body_to_link(cx, worldbody, &name, Pose::IDENTITY, false)?;
    output.add_to(&mut model);
    Ok(model)
}

/// Model with one link per body
fn dynamic_model(cx: &mut Exporter) -> Result<Model, ConvertError> {
    let mujoco = cx.mujoco;
    let name = mujoco.model.as_deref().unwrap_or("model");
    let mut model = Model::new(cx.names.claim(ns::MODEL, name));

    for body in &mujoco.worldbody.bodies {
        add_body(cx, &mut model, body, WORLD_FRAME, Pose::IDENTITY)?;
    }
    tracing::debug!("Model '{}' has {} links", model.name, model.links.len());
    Ok(model)
}

/// Add the link for `body` and its joints, then recurse into child bodies
fn add_body(
    cx: &mut Exporter,
    model: &mut Model,
    body: &Body,
    parent_link: &str,
    parent_pose: Pose,
) -> Result<(), ConvertError> {
    let world_pose = parent_pose.compose(&body.pose());
    let link_name = match &body.name {
        Some(name) => cx.names.claim(ns::FRAME, name),
        None => cx.names.next_unnamed(ns::FRAME, "unnamed_link"),
    };

    let output = body_to_link(cx, body, &link_name, world_pose, true)?;
    output.add_to(model);

    for mj_joint in &body.joints {
        if let Some(converted) = joint::joint_to_sdf(cx, mj_joint, parent_link, &link_name) {
            model.joints.push(converted);
        }
    }
    if body.joints.is_empty() && body.freejoint.is_none() {
        model.joints.push(joint::fixed_joint(cx, parent_link, &link_name));
    }

    for child in &body.bodies {
        add_body(cx, model, child, &link_name, world_pose)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::ConversionConfig;
    use crate::mjcf::Mujoco;
    use crate::mjcf_to_sdf::convert;
    use crate::sdf::JointKind;
    use glam::DVec3;

    const ARM: &str = r#"
        <mujoco model="arm">
          <option timestep="0.004" gravity="0 0 -5"/>
          <worldbody>
            <light name="top" pos="0 0 3" dir="0 0 -1" directional="true"/>
            <geom name="floor" type="plane" size="5 5 0.1"/>
            <body name="base" pos="0 0 1">
              <body name="upper" pos="0 0 0.5">
                <joint name="shoulder" type="hinge" axis="0 1 0" range="-90 90"/>
                <geom type="capsule" size="0.05 0.2"/>
                <body name="lower" pos="0 0 0.4">
                  <joint name="elbow" type="hinge" axis="0 1 0"/>
                  <geom type="sphere" size="0.05"/>
                </body>
              </body>
            </body>
            <body name="ball" pos="2 0 1">
              <freejoint/>
              <geom type="sphere" size="0.1"/>
            </body>
          </worldbody>
        </mujoco>"#;

    #[test]
    fn test_bodies_become_links_and_joints() {
        let mujoco = Mujoco::from_xml(ARM).unwrap();
        let root = convert(&mujoco, &ConversionConfig::default()).unwrap();
        let world = &root.worlds[0];

        assert_eq!(world.name, "default");
        assert_eq!(world.max_step_size, Some(0.004));
        assert_eq!(world.gravity, DVec3::new(0.0, 0.0, -5.0));
        assert_eq!(world.lights[0].name, "top");

        let ground = &world.models[0];
        assert_eq!(ground.name, "static");
        assert!(ground.is_static);
        assert_eq!(ground.links[0].collisions[0].name, "collision_floor");

        let arm = &world.models[1];
        assert_eq!(arm.name, "arm");
        let names: Vec<_> = arm.links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["base", "upper", "lower", "ball"]);

        let lower = arm.link("lower").unwrap();
        assert!(lower.pose.pose.position.abs_diff_eq(DVec3::new(0.0, 0.0, 1.9), 1e-12));

        let fixed = arm.joint("world_base_fixed").unwrap();
        assert_eq!(fixed.kind, JointKind::Fixed);
        assert_eq!(fixed.parent, "world");

        let shoulder = arm.joint("shoulder").unwrap();
        assert_eq!(shoulder.kind, JointKind::Revolute);
        assert_eq!((shoulder.parent.as_str(), shoulder.child.as_str()), ("base", "upper"));
        let elbow = arm.joint("elbow").unwrap();
        assert_eq!(elbow.kind, JointKind::Continuous);

        // free bodies float
        assert!(arm.joints.iter().all(|j| j.child != "ball"));
    }

    #[test]
    fn test_static_model_name_avoids_geoms() {
        let mujoco = Mujoco::from_xml(
            r#"<mujoco><worldbody><geom name="static" type="sphere" size="1"/></worldbody></mujoco>"#,
        )
        .unwrap();
        let root = convert(&mujoco, &ConversionConfig::default()).unwrap();
        assert_eq!(root.worlds[0].models[0].name, "static_1");
        assert_eq!(root.worlds[0].models[1].name, "model");
    }

    #[test]
    fn test_disabled_gravity() {
        let mujoco = Mujoco::from_xml(
            r#"<mujoco><option><flag gravity="disable"/></option><worldbody/></mujoco>"#,
        )
        .unwrap();
        let root = convert(&mujoco, &ConversionConfig::default()).unwrap();
        assert_eq!(root.worlds[0].gravity, DVec3::ZERO);
    }
}
