//! SDFormat XML reader

use glam::{DQuat, DVec3};

use crate::math::Pose;
use crate::xml::{XmlElement, XmlError};

use super::{
    Attenuation, Camera, Collision, Frame, Geometry, Inertial, Joint, JointAxis, JointKind, Light,
    LightKind, Link, Material, Model, Plugin, Root, SdfError, SemanticPose, Sensor, SensorKind,
    Spot, Visual, World,
};

pub(crate) fn parse_root(xml: &str) -> Result<Root, SdfError> {
    let element = XmlElement::parse(xml)?;
    match element.name.as_str() {
        "sdf" => parse_sdf(&element),
        "robot" => {
            let model = super::urdf::model_from_urdf_str(xml)?;
            Ok(Root {
                model: Some(model),
                ..Default::default()
            })
        }
        other => Err(SdfError::NotSdf(other.to_string())),
    }
}

fn parse_sdf(element: &XmlElement) -> Result<Root, SdfError> {
    let version = element.attr("version").unwrap_or("1.9").to_string();

    let worlds = element
        .children_named("world")
        .map(parse_world)
        .collect::<Result<Vec<_>, _>>()?;

    let mut models = element.children_named("model");
    let model = models.next().map(parse_model).transpose()?;
    if models.next().is_some() {
        return Err(SdfError::Unsupported(
            "more than one top-level <model>".to_string(),
        ));
    }
    if model.is_some() && !worlds.is_empty() {
        return Err(SdfError::Unsupported(
            "a top-level <model> next to a <world>".to_string(),
        ));
    }

    for child in &element.children {
        if !matches!(child.name.as_str(), "world" | "model") {
            tracing::warn!("Ignoring top-level <{}>", child.name);
        }
    }

    Ok(Root {
        version,
        worlds,
        model,
    })
}

fn name_of(element: &XmlElement) -> Result<String, SdfError> {
    Ok(element.required_attr("name")?.to_string())
}

fn parse_world(element: &XmlElement) -> Result<World, SdfError> {
    let mut world = World::new(name_of(element)?);

    if let Some(gravity) = element.child_array::<3>("gravity")? {
        world.gravity = DVec3::from(gravity);
    }
    if let Some(field) = element.child_array::<3>("magnetic_field")? {
        world.magnetic_field = DVec3::from(field);
    }
    if let Some(wind) = element.child("wind")
        && let Some(velocity) = wind.child_array::<3>("linear_velocity")?
    {
        world.wind_linear_velocity = DVec3::from(velocity);
    }
    if let Some(physics) = element.child("physics") {
        world.max_step_size = physics.child_f64("max_step_size")?;
    }

    for child in &element.children {
        match child.name.as_str() {
            "light" => world.lights.push(parse_light(child)?),
            "model" => world.models.push(parse_model(child)?),
            "plugin" => world.plugins.push(Plugin::new(
                child.attr("filename").unwrap_or_default(),
                child.attr("name").unwrap_or_default(),
            )),
            "include" => tracing::warn!("Skipping <include> in world '{}'", world.name),
            _ => {}
        }
    }

    Ok(world)
}

fn parse_model(element: &XmlElement) -> Result<Model, SdfError> {
    let mut model = Model::new(name_of(element)?);
    model.is_static = element.child_bool("static")?.unwrap_or(false);
    model.pose = parse_semantic_pose(element)?;

    for child in &element.children {
        match child.name.as_str() {
            "link" => model.links.push(parse_link(child)?),
            "joint" => model.joints.push(parse_joint(child)?),
            "frame" => model.frames.push(parse_frame(child)?),
            "model" => {
                return Err(SdfError::Unsupported(format!(
                    "nested model '{}' in '{}'",
                    child.attr("name").unwrap_or_default(),
                    model.name
                )));
            }
            "include" => tracing::warn!("Skipping <include> in model '{}'", model.name),
            _ => {}
        }
    }

    Ok(model)
}

fn parse_frame(element: &XmlElement) -> Result<Frame, SdfError> {
    Ok(Frame {
        name: name_of(element)?,
        attached_to: element.attr("attached_to").map(str::to_string),
        pose: parse_semantic_pose(element)?,
    })
}

fn parse_link(element: &XmlElement) -> Result<Link, SdfError> {
    let mut link = Link::new(name_of(element)?);
    link.pose = parse_semantic_pose(element)?;

    for child in &element.children {
        match child.name.as_str() {
            "inertial" => link.inertial = Some(parse_inertial(child)?),
            "visual" => link.visuals.push(parse_visual(child)?),
            "collision" => link.collisions.push(parse_collision(child)?),
            "sensor" => link.sensors.push(parse_sensor(child)?),
            "light" => link.lights.push(parse_light(child)?),
            _ => {}
        }
    }

    Ok(link)
}

fn parse_inertial(element: &XmlElement) -> Result<Inertial, SdfError> {
    let pose = parse_semantic_pose(element)?;
    if let Some(frame) = &pose.relative_to {
        tracing::warn!(
            "Inertial pose is relative to '{}'; using it in the link frame",
            frame
        );
    }
    let mut inertial = Inertial {
        pose: pose.pose,
        ..Default::default()
    };
    if let Some(mass) = element.child_f64("mass")? {
        inertial.mass = mass;
    }
    if let Some(inertia) = element.child("inertia") {
        let names = ["ixx", "iyy", "izz", "ixy", "ixz", "iyz"];
        for (slot, name) in inertial.inertia.iter_mut().zip(names) {
            if let Some(value) = inertia.child_f64(name)? {
                *slot = value;
            }
        }
    }
    Ok(inertial)
}

fn parse_joint(element: &XmlElement) -> Result<Joint, SdfError> {
    let name = name_of(element)?;
    let type_name = element.required_attr("type")?;
    let kind =
        JointKind::parse(type_name).ok_or_else(|| SdfError::UnknownJointType(type_name.to_string()))?;
    let parent = element.required_child("parent")?.text.clone().unwrap_or_default();
    let child = element.required_child("child")?.text.clone().unwrap_or_default();

    let mut joint = Joint::new(name, kind, parent, child);
    joint.pose = parse_semantic_pose(element)?;
    joint.axis = element.child("axis").map(parse_axis).transpose()?;
    if joint.axis.is_none() && kind.has_axis() {
        joint.axis = Some(JointAxis::default());
    }
    Ok(joint)
}

fn parse_axis(element: &XmlElement) -> Result<JointAxis, SdfError> {
    let mut axis = JointAxis::default();
    if let Some(xyz) = element.child("xyz") {
        axis.xyz = DVec3::from(xyz.text_array::<3>()?);
        axis.expressed_in = xyz.attr("expressed_in").map(str::to_string);
    }
    if let Some(limit) = element.child("limit") {
        if let Some(v) = limit.child_f64("lower")? {
            axis.lower = v;
        }
        if let Some(v) = limit.child_f64("upper")? {
            axis.upper = v;
        }
        if let Some(v) = limit.child_f64("effort")? {
            axis.effort = v;
        }
        if let Some(v) = limit.child_f64("velocity")? {
            axis.velocity = v;
        }
    }
    if let Some(dynamics) = element.child("dynamics") {
        if let Some(v) = dynamics.child_f64("damping")? {
            axis.damping = v;
        }
        if let Some(v) = dynamics.child_f64("friction")? {
            axis.friction = v;
        }
        if let Some(v) = dynamics.child_f64("spring_reference")? {
            axis.spring_reference = v;
        }
        if let Some(v) = dynamics.child_f64("spring_stiffness")? {
            axis.spring_stiffness = v;
        }
    }
    Ok(axis)
}

fn parse_visual(element: &XmlElement) -> Result<Visual, SdfError> {
    Ok(Visual {
        name: name_of(element)?,
        pose: parse_semantic_pose(element)?,
        geometry: parse_geometry(element.required_child("geometry")?)?,
        material: element.child("material").map(parse_material).transpose()?,
    })
}

fn parse_collision(element: &XmlElement) -> Result<Collision, SdfError> {
    Ok(Collision {
        name: name_of(element)?,
        pose: parse_semantic_pose(element)?,
        geometry: parse_geometry(element.required_child("geometry")?)?,
    })
}

fn parse_geometry(element: &XmlElement) -> Result<Geometry, SdfError> {
    let Some(shape) = element.children.first() else {
        return Ok(Geometry::Empty);
    };

    let geometry = match shape.name.as_str() {
        "box" => Geometry::Box {
            size: DVec3::from(shape.child_array::<3>("size")?.unwrap_or([1.0; 3])),
        },
        "capsule" => Geometry::Capsule {
            radius: shape.child_f64("radius")?.unwrap_or(0.5),
            length: shape.child_f64("length")?.unwrap_or(1.0),
        },
        "cylinder" => Geometry::Cylinder {
            radius: shape.child_f64("radius")?.unwrap_or(1.0),
            length: shape.child_f64("length")?.unwrap_or(1.0),
        },
        "ellipsoid" => Geometry::Ellipsoid {
            radii: DVec3::from(shape.child_array::<3>("radii")?.unwrap_or([1.0; 3])),
        },
        "sphere" => Geometry::Sphere {
            radius: shape.child_f64("radius")?.unwrap_or(1.0),
        },
        "plane" => Geometry::Plane {
            normal: DVec3::from(shape.child_array::<3>("normal")?.unwrap_or([0.0, 0.0, 1.0])),
            size: shape.child_array::<2>("size")?.unwrap_or([1.0, 1.0]),
        },
        "mesh" => Geometry::Mesh {
            uri: shape.required_child("uri")?.text.clone().unwrap_or_default(),
            scale: DVec3::from(shape.child_array::<3>("scale")?.unwrap_or([1.0; 3])),
        },
        "empty" => Geometry::Empty,
        other => return Err(SdfError::Unsupported(format!("<{}> geometry", other))),
    };
    Ok(geometry)
}

fn parse_material(element: &XmlElement) -> Result<Material, SdfError> {
    let mut material = Material::default();
    if let Some(color) = parse_color(element, "ambient")? {
        material.ambient = color;
    }
    if let Some(color) = parse_color(element, "diffuse")? {
        material.diffuse = color;
    }
    if let Some(color) = parse_color(element, "specular")? {
        material.specular = color;
    }
    if let Some(color) = parse_color(element, "emissive")? {
        material.emissive = color;
    }
    Ok(material)
}

/// Colors may omit alpha
fn parse_color(element: &XmlElement, name: &str) -> Result<Option<[f64; 4]>, SdfError> {
    let Some(child) = element.child(name) else {
        return Ok(None);
    };
    let values = child.text_vec()?;
    match values.as_slice() {
        [r, g, b] => Ok(Some([*r, *g, *b, 1.0])),
        [r, g, b, a] => Ok(Some([*r, *g, *b, *a])),
        _ => Err(XmlError::BadText {
            element: child.name.clone(),
            value: child.text.clone().unwrap_or_default(),
        }
        .into()),
    }
}

fn parse_sensor(element: &XmlElement) -> Result<Sensor, SdfError> {
    let type_name = element.required_attr("type")?;
    let kind = match type_name {
        "imu" => SensorKind::Imu,
        "force_torque" => SensorKind::ForceTorque,
        "camera" => SensorKind::Camera(match element.child("camera") {
            Some(camera) => parse_camera(camera)?,
            None => Camera::default(),
        }),
        other => SensorKind::Other(other.to_string()),
    };

    Ok(Sensor {
        name: name_of(element)?,
        pose: parse_semantic_pose(element)?,
        kind,
    })
}

fn parse_camera(element: &XmlElement) -> Result<Camera, SdfError> {
    let mut camera = Camera::default();
    if let Some(fov) = element.child_f64("horizontal_fov")? {
        camera.horizontal_fov = fov;
    }
    if let Some(image) = element.child("image") {
        if let Some(width) = image.child_f64("width")? {
            camera.width = width as u32;
        }
        if let Some(height) = image.child_f64("height")? {
            camera.height = height as u32;
        }
    }
    if let Some(clip) = element.child("clip") {
        if let Some(near) = clip.child_f64("near")? {
            camera.near = near;
        }
        if let Some(far) = clip.child_f64("far")? {
            camera.far = far;
        }
    }
    Ok(camera)
}

fn parse_light(element: &XmlElement) -> Result<Light, SdfError> {
    let kind = match element.attr("type").unwrap_or("point") {
        "point" => LightKind::Point,
        "spot" => LightKind::Spot,
        "directional" => LightKind::Directional,
        other => return Err(SdfError::UnknownLightType(other.to_string())),
    };

    let mut light = Light::new(element.attr("name").unwrap_or_default(), kind);
    light.pose = parse_semantic_pose(element)?;
    if let Some(color) = parse_color(element, "diffuse")? {
        light.diffuse = color;
    }
    if let Some(color) = parse_color(element, "specular")? {
        light.specular = color;
    }
    if let Some(direction) = element.child_array::<3>("direction")? {
        light.direction = DVec3::from(direction);
    }
    if let Some(shadows) = element.child_bool("cast_shadows")? {
        light.cast_shadows = shadows;
    }
    if let Some(attenuation) = element.child("attenuation") {
        let defaults = Attenuation::default();
        light.attenuation = Attenuation {
            range: attenuation.child_f64("range")?.unwrap_or(defaults.range),
            constant: attenuation.child_f64("constant")?.unwrap_or(defaults.constant),
            linear: attenuation.child_f64("linear")?.unwrap_or(defaults.linear),
            quadratic: attenuation.child_f64("quadratic")?.unwrap_or(defaults.quadratic),
        };
    }
    if let Some(spot) = element.child("spot") {
        light.spot = Spot {
            inner_angle: spot.child_f64("inner_angle")?.unwrap_or(0.0),
            outer_angle: spot.child_f64("outer_angle")?.unwrap_or(0.0),
            falloff: spot.child_f64("falloff")?.unwrap_or(0.0),
        };
    }
    Ok(light)
}

/// Read the `<pose>` child of an element (identity when absent)
fn parse_semantic_pose(element: &XmlElement) -> Result<SemanticPose, SdfError> {
    let Some(pose) = element.child("pose") else {
        return Ok(SemanticPose::default());
    };
    Ok(SemanticPose {
        pose: parse_pose(pose)?,
        relative_to: pose
            .attr("relative_to")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

pub(crate) fn parse_pose(element: &XmlElement) -> Result<Pose, SdfError> {
    let text = element.text.as_deref().unwrap_or("");
    if text.trim().is_empty() {
        return Ok(Pose::IDENTITY);
    }
    let values = element.text_vec()?;
    let degrees = element.attr_bool("degrees")?.unwrap_or(false);
    let bad_text = || XmlError::BadText {
        element: element.name.clone(),
        value: text.to_string(),
    };

    match element.attr("rotation_format").unwrap_or("euler_rpy") {
        "euler_rpy" => {
            let [x, y, z, roll, pitch, yaw]: [f64; 6] =
                values.try_into().map_err(|_| bad_text())?;
            let mut rpy = [roll, pitch, yaw];
            if degrees {
                rpy = rpy.map(f64::to_radians);
            }
            Ok(Pose::from_xyz_rpy([x, y, z], rpy))
        }
        "quat_xyzw" => {
            let [x, y, z, qx, qy, qz, qw]: [f64; 7] =
                values.try_into().map_err(|_| bad_text())?;
            let rotation = DQuat::from_xyzw(qx, qy, qz, qw);
            if rotation.length_squared() == 0.0 {
                return Err(bad_text().into());
            }
            Ok(Pose::new(DVec3::new(x, y, z), rotation.normalize()))
        }
        other => Err(XmlError::BadAttribute {
            element: element.name.clone(),
            attribute: "rotation_format".to_string(),
            value: other.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MODEL: &str = r#"<?xml version="1.0"?>
        <sdf version="1.9">
          <model name="robot">
            <pose degrees="true">1 2 3 90 60 45</pose>
            <link name="base">
              <inertial>
                <pose>0 0 0.1 0 0 0</pose>
                <mass>2.5</mass>
                <inertia><ixx>1</ixx><iyy>2</iyy><izz>3</izz><ixy>0.1</ixy></inertia>
              </inertial>
              <visual name="v">
                <geometry><box><size>1 2 3</size></box></geometry>
                <material><diffuse>1 0 0</diffuse><emissive>0.1 0.1 0.1 1</emissive></material>
              </visual>
              <collision name="c">
                <pose relative_to="__model__">0 0 1 0 0 0</pose>
                <geometry><sphere><radius>0.5</radius></sphere></geometry>
              </collision>
              <sensor name="imu" type="imu"/>
              <sensor name="cam" type="camera">
                <camera><horizontal_fov>1.2</horizontal_fov><image><width>640</width><height>480</height></image></camera>
              </sensor>
            </link>
            <link name="arm"/>
            <joint name="j" type="revolute">
              <parent>base</parent>
              <child>arm</child>
              <axis>
                <xyz expressed_in="__model__">1 0 0</xyz>
                <limit><lower>-1</lower><upper>1</upper></limit>
                <dynamics><damping>0.5</damping></dynamics>
              </axis>
            </joint>
            <frame name="tip" attached_to="arm"><pose>0 0 1 0 0 0</pose></frame>
          </model>
        </sdf>"#;

    #[test]
    fn test_parse_model() {
        let root = parse_root(MODEL).unwrap();
        assert_eq!(root.version, "1.9");
        let model = root.model.unwrap();
        assert_eq!(model.name, "robot");
        assert_relative_eq!(model.pose.pose.rpy()[0], 90f64.to_radians(), epsilon = 1e-9);

        let base = model.link("base").unwrap();
        let inertial = base.inertial.as_ref().unwrap();
        assert_eq!(inertial.mass, 2.5);
        assert_eq!(inertial.inertia, [1.0, 2.0, 3.0, 0.1, 0.0, 0.0]);

        assert_eq!(base.visuals[0].geometry, Geometry::Box { size: DVec3::new(1.0, 2.0, 3.0) });
        let material = base.visuals[0].material.as_ref().unwrap();
        assert_eq!(material.diffuse, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(material.emissive, [0.1, 0.1, 0.1, 1.0]);
        assert_eq!(base.collisions[0].pose.relative_to.as_deref(), Some("__model__"));

        assert_eq!(base.sensors[0].kind, SensorKind::Imu);
        match &base.sensors[1].kind {
            SensorKind::Camera(camera) => {
                assert_eq!(camera.width, 640);
                assert_eq!(camera.horizontal_fov, 1.2);
            }
            other => panic!("expected camera, got {:?}", other),
        }

        let joint = model.joint("j").unwrap();
        assert_eq!(joint.kind, JointKind::Revolute);
        let axis = joint.axis.as_ref().unwrap();
        assert_eq!(axis.xyz, DVec3::X);
        assert_eq!(axis.expressed_in.as_deref(), Some("__model__"));
        assert!(axis.is_limited());
        assert_eq!(axis.damping, 0.5);

        assert_eq!(model.frames[0].attached_to.as_deref(), Some("arm"));
    }

    #[test]
    fn test_parse_world() {
        let xml = r#"<sdf version="1.8">
          <world name="w">
            <gravity>0 0 -1</gravity>
            <wind><linear_velocity>1 0 0</linear_velocity></wind>
            <physics name="p" type="ode"><max_step_size>0.004</max_step_size></physics>
            <light name="sun" type="directional">
              <direction>0.5 0.1 -0.9</direction>
              <cast_shadows>true</cast_shadows>
            </light>
            <plugin filename="libfoo.so" name="foo::Bar"/>
            <model name="ground"><static>true</static><link name="l"/></model>
          </world>
        </sdf>"#;
        let root = parse_root(xml).unwrap();
        let world = &root.worlds[0];
        assert_eq!(world.gravity, DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(world.wind_linear_velocity, DVec3::X);
        assert_eq!(world.magnetic_field, World::DEFAULT_MAGNETIC_FIELD);
        assert_eq!(world.max_step_size, Some(0.004));
        assert_eq!(world.lights[0].kind, LightKind::Directional);
        assert!(world.lights[0].cast_shadows);
        assert_eq!(world.plugins[0].name, "foo::Bar");
        assert!(world.models[0].is_static);
    }

    #[test]
    fn test_inertial_relative_to_taken_in_link_frame() {
        let xml = r#"<inertial>
            <pose relative_to="__model__">0 0 0.5 0 0 0</pose>
            <mass>3</mass>
          </inertial>"#;
        let inertial = parse_inertial(&XmlElement::parse(xml).unwrap()).unwrap();
        assert_eq!(inertial.mass, 3.0);
        assert!(inertial.pose.position.abs_diff_eq(glam::DVec3::new(0.0, 0.0, 0.5), 1e-12));
    }

    #[test]
    fn test_quat_pose() {
        let xml = r#"<pose rotation_format="quat_xyzw">1 2 3 0 0 0.7071067811865476 0.7071067811865476</pose>"#;
        let pose = parse_pose(&XmlElement::parse(xml).unwrap()).unwrap();
        assert_relative_eq!(pose.rpy()[2], std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_bad_pose() {
        let xml = r#"<pose>1 2 3</pose>"#;
        assert!(parse_pose(&XmlElement::parse(xml).unwrap()).is_err());
    }

    #[test]
    fn test_rejects_nested_models() {
        let xml = r#"<sdf version="1.9"><model name="a"><model name="b"/></model></sdf>"#;
        assert!(matches!(parse_root(xml), Err(SdfError::Unsupported(_))));
    }

    #[test]
    fn test_rejects_unknown_joint() {
        let xml = r#"<sdf version="1.9"><model name="a"><joint name="j" type="hovering">
            <parent>x</parent><child>y</child></joint></model></sdf>"#;
        assert!(matches!(parse_root(xml), Err(SdfError::UnknownJointType(_))));
    }

    #[test]
    fn test_rejects_other_documents() {
        assert!(matches!(parse_root("<mujoco/>"), Err(SdfError::NotSdf(_))));
    }
}
