//! SDFormat XML writer

use glam::DVec3;

use crate::math::Pose;
use crate::xml::{XmlElement, format_f64, format_list};

use super::{
    Collision, Frame, Geometry, Inertial, Joint, JointAxis, Light, LightKind, Link, Material, Model,
    Root, SemanticPose, Sensor, SensorKind, Visual, World,
};

pub(crate) fn root_to_xml(root: &Root) -> XmlElement {
    let mut element = XmlElement::new("sdf").attr_set("version", root.version.as_str());
    for world in &root.worlds {
        element.push_child(world_to_xml(world));
    }
    if let Some(model) = &root.model {
        element.push_child(model_to_xml(model));
    }
    element
}

fn vec3(v: DVec3) -> String {
    format_list(&v.to_array())
}

fn text(name: &str, value: impl Into<String>) -> XmlElement {
    XmlElement::with_text(name, value)
}

fn number(name: &str, value: f64) -> XmlElement {
    XmlElement::with_text(name, format_f64(value))
}

fn pose_text(pose: &Pose) -> String {
    let rpy = pose.rpy();
    format_list(&[
        pose.position.x,
        pose.position.y,
        pose.position.z,
        rpy[0],
        rpy[1],
        rpy[2],
    ])
}

/// Append `<pose>` unless it is an identity in the default frame
fn push_pose(element: &mut XmlElement, pose: &SemanticPose) {
    if pose.relative_to.is_none() && pose.pose.is_identity() {
        return;
    }
    let mut pose_element = text("pose", pose_text(&pose.pose));
    if let Some(frame) = &pose.relative_to {
        pose_element.set_attr("relative_to", frame.as_str());
    }
    element.push_child(pose_element);
}

fn world_to_xml(world: &World) -> XmlElement {
    let mut element = XmlElement::new("world").attr_set("name", world.name.as_str());

    if let Some(step) = world.max_step_size {
        element.push_child(
            XmlElement::new("physics")
                .attr_set("name", "default_physics")
                .attr_set("type", "ode")
                .with_child(number("max_step_size", step)),
        );
    }
    for plugin in &world.plugins {
        element.push_child(
            XmlElement::new("plugin")
                .attr_set("filename", plugin.filename.as_str())
                .attr_set("name", plugin.name.as_str()),
        );
    }
    element.push_child(text("gravity", vec3(world.gravity)));
    element.push_child(text("magnetic_field", vec3(world.magnetic_field)));
    if world.wind_linear_velocity != DVec3::ZERO {
        element.push_child(
            XmlElement::new("wind").with_child(text("linear_velocity", vec3(world.wind_linear_velocity))),
        );
    }
    for light in &world.lights {
        element.push_child(light_to_xml(light));
    }
    for model in &world.models {
        element.push_child(model_to_xml(model));
    }
    element
}

fn model_to_xml(model: &Model) -> XmlElement {
    let mut element = XmlElement::new("model").attr_set("name", model.name.as_str());
    if model.is_static {
        element.push_child(text("static", "true"));
    }
    push_pose(&mut element, &model.pose);
    for link in &model.links {
        element.push_child(link_to_xml(link));
    }
    for joint in &model.joints {
        element.push_child(joint_to_xml(joint));
    }
    for frame in &model.frames {
        element.push_child(frame_to_xml(frame));
    }
    element
}

fn frame_to_xml(frame: &Frame) -> XmlElement {
    let mut element = XmlElement::new("frame").attr_set("name", frame.name.as_str());
    if let Some(attached_to) = &frame.attached_to {
        element.set_attr("attached_to", attached_to.as_str());
    }
    push_pose(&mut element, &frame.pose);
    element
}

fn link_to_xml(link: &Link) -> XmlElement {
    let mut element = XmlElement::new("link").attr_set("name", link.name.as_str());
    push_pose(&mut element, &link.pose);
    if let Some(inertial) = &link.inertial {
        element.push_child(inertial_to_xml(inertial));
    }
    for collision in &link.collisions {
        element.push_child(collision_to_xml(collision));
    }
    for visual in &link.visuals {
        element.push_child(visual_to_xml(visual));
    }
    for sensor in &link.sensors {
        element.push_child(sensor_to_xml(sensor));
    }
    for light in &link.lights {
        element.push_child(light_to_xml(light));
    }
    element
}

fn inertial_to_xml(inertial: &Inertial) -> XmlElement {
    let mut element = XmlElement::new("inertial");
    push_pose(&mut element, &SemanticPose::new(inertial.pose));
    element.push_child(number("mass", inertial.mass));
    let mut inertia = XmlElement::new("inertia");
    for (name, value) in ["ixx", "iyy", "izz", "ixy", "ixz", "iyz"]
        .iter()
        .zip(inertial.inertia)
    {
        inertia.push_child(number(name, value));
    }
    element.push_child(inertia);
    element
}

fn joint_to_xml(joint: &Joint) -> XmlElement {
    let mut element = XmlElement::new("joint")
        .attr_set("name", joint.name.as_str())
        .attr_set("type", joint.kind.as_str());
    element.push_child(text("parent", joint.parent.as_str()));
    element.push_child(text("child", joint.child.as_str()));
    push_pose(&mut element, &joint.pose);
    if let Some(axis) = &joint.axis {
        element.push_child(axis_to_xml(axis));
    }
    element
}

fn axis_to_xml(axis: &JointAxis) -> XmlElement {
    let mut xyz = text("xyz", vec3(axis.xyz));
    if let Some(frame) = &axis.expressed_in {
        xyz.set_attr("expressed_in", frame.as_str());
    }
    XmlElement::new("axis")
        .with_child(xyz)
        .with_child(
            XmlElement::new("limit")
                .with_child(number("lower", axis.lower))
                .with_child(number("upper", axis.upper))
                .with_child(number("effort", axis.effort))
                .with_child(number("velocity", axis.velocity)),
        )
        .with_child(
            XmlElement::new("dynamics")
                .with_child(number("damping", axis.damping))
                .with_child(number("friction", axis.friction))
                .with_child(number("spring_reference", axis.spring_reference))
                .with_child(number("spring_stiffness", axis.spring_stiffness)),
        )
}

fn visual_to_xml(visual: &Visual) -> XmlElement {
    let mut element = XmlElement::new("visual").attr_set("name", visual.name.as_str());
    push_pose(&mut element, &visual.pose);
    element.push_child(geometry_to_xml(&visual.geometry));
    if let Some(material) = &visual.material {
        element.push_child(material_to_xml(material));
    }
    element
}

fn collision_to_xml(collision: &Collision) -> XmlElement {
    let mut element = XmlElement::new("collision").attr_set("name", collision.name.as_str());
    push_pose(&mut element, &collision.pose);
    element.push_child(geometry_to_xml(&collision.geometry));
    element
}

fn geometry_to_xml(geometry: &Geometry) -> XmlElement {
    let shape = match geometry {
        Geometry::Box { size } => XmlElement::new("box").with_child(text("size", vec3(*size))),
        Geometry::Capsule { radius, length } => XmlElement::new("capsule")
            .with_child(number("radius", *radius))
            .with_child(number("length", *length)),
        Geometry::Cylinder { radius, length } => XmlElement::new("cylinder")
            .with_child(number("radius", *radius))
            .with_child(number("length", *length)),
        Geometry::Ellipsoid { radii } => {
            XmlElement::new("ellipsoid").with_child(text("radii", vec3(*radii)))
        }
        Geometry::Sphere { radius } => XmlElement::new("sphere").with_child(number("radius", *radius)),
        Geometry::Plane { normal, size } => XmlElement::new("plane")
            .with_child(text("normal", vec3(*normal)))
            .with_child(text("size", format_list(size))),
        Geometry::Mesh { uri, scale } => {
            let mut mesh = XmlElement::new("mesh").with_child(text("uri", uri.as_str()));
            if *scale != DVec3::ONE {
                mesh.push_child(text("scale", vec3(*scale)));
            }
            mesh
        }
        Geometry::Empty => XmlElement::new("empty"),
    };
    XmlElement::new("geometry").with_child(shape)
}

fn material_to_xml(material: &Material) -> XmlElement {
    XmlElement::new("material")
        .with_child(text("ambient", format_list(&material.ambient)))
        .with_child(text("diffuse", format_list(&material.diffuse)))
        .with_child(text("specular", format_list(&material.specular)))
        .with_child(text("emissive", format_list(&material.emissive)))
}

fn sensor_to_xml(sensor: &Sensor) -> XmlElement {
    let mut element = XmlElement::new("sensor")
        .attr_set("name", sensor.name.as_str())
        .attr_set("type", sensor.kind.type_name());
    push_pose(&mut element, &sensor.pose);
    if let SensorKind::Camera(camera) = &sensor.kind {
        element.push_child(
            XmlElement::new("camera")
                .with_child(number("horizontal_fov", camera.horizontal_fov))
                .with_child(
                    XmlElement::new("image")
                        .with_child(text("width", camera.width.to_string()))
                        .with_child(text("height", camera.height.to_string())),
                )
                .with_child(
                    XmlElement::new("clip")
                        .with_child(number("near", camera.near))
                        .with_child(number("far", camera.far)),
                ),
        );
    }
    element
}

fn light_to_xml(light: &Light) -> XmlElement {
    let mut element = XmlElement::new("light")
        .attr_set("name", light.name.as_str())
        .attr_set("type", light.kind.as_str());
    push_pose(&mut element, &light.pose);
    element.push_child(text("cast_shadows", light.cast_shadows.to_string()));
    element.push_child(text("diffuse", format_list(&light.diffuse)));
    element.push_child(text("specular", format_list(&light.specular)));
    element.push_child(
        XmlElement::new("attenuation")
            .with_child(number("range", light.attenuation.range))
            .with_child(number("constant", light.attenuation.constant))
            .with_child(number("linear", light.attenuation.linear))
            .with_child(number("quadratic", light.attenuation.quadratic)),
    );
    if light.kind != LightKind::Point {
        element.push_child(text("direction", vec3(light.direction)));
    }
    if light.kind == LightKind::Spot {
        element.push_child(
            XmlElement::new("spot")
                .with_child(number("inner_angle", light.spot.inner_angle))
                .with_child(number("outer_angle", light.spot.outer_angle))
                .with_child(number("falloff", light.spot.falloff)),
        );
    }
    element
}

#[cfg(test)]
mod tests {
    use super::super::parse::parse_root;
    use super::*;

    #[test]
    fn test_written_model_reads_back() {
        let mut model = Model::new("m");
        let mut link = Link::new("l");
        link.pose = SemanticPose::new(Pose::from_xyz_rpy([1.0, 0.0, 0.0], [0.0, 0.0, 0.5]));
        let mut visual = Visual::new("v", Geometry::Capsule { radius: 0.1, length: 0.4 });
        visual.material = Some(Material {
            diffuse: [1.0, 0.5, 0.0, 1.0],
            ..Default::default()
        });
        link.visuals.push(visual);
        link.collisions.push(Collision::new(
            "c",
            Geometry::Mesh {
                uri: "meshes/arm.stl".to_string(),
                scale: DVec3::splat(0.001),
            },
        ));
        link.inertial = Some(Inertial {
            mass: 3.0,
            ..Default::default()
        });
        model.links.push(link);
        let mut joint = Joint::new("j", super::super::JointKind::Revolute, "world", "l");
        joint.axis = Some(JointAxis::new(DVec3::Y));
        model.joints.push(joint);

        let root = Root {
            model: Some(model.clone()),
            ..Default::default()
        };
        let xml = root.to_xml_string().unwrap();
        assert!(xml.contains("<sdf version=\"1.9\">"));

        let parsed = parse_root(&xml).unwrap().model.unwrap();
        assert_eq!(parsed.links[0].visuals, model.links[0].visuals);
        assert_eq!(parsed.links[0].collisions, model.links[0].collisions);
        assert_eq!(parsed.links[0].inertial, model.links[0].inertial);
        assert_eq!(parsed.joints, model.joints);
        assert!(
            parsed.links[0]
                .pose
                .pose
                .position
                .abs_diff_eq(DVec3::X, 1e-12)
        );
    }

    #[test]
    fn test_identity_pose_omitted() {
        let link = Link::new("l");
        let xml = link_to_xml(&link);
        assert!(xml.child("pose").is_none());

        let mut link = Link::new("l");
        link.pose.relative_to = Some("other".to_string());
        let xml = link_to_xml(&link);
        assert_eq!(xml.child("pose").unwrap().attr("relative_to"), Some("other"));
    }

    #[test]
    fn test_world_plugins_written() {
        let mut world = World::new("w");
        world.plugins.push(super::super::Plugin::new("libx.so", "x::X"));
        let xml = world_to_xml(&world);
        assert_eq!(xml.child("plugin").unwrap().attr("name"), Some("x::X"));
        assert!(xml.child("wind").is_none());
    }
}
