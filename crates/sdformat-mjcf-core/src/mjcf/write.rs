//! MJCF XML writer
//!
//! Output always declares `angle="degree"` and `eulerseq="XYZ"`, so every
//! `euler` attribute holds SDFormat roll/pitch/yaw in degrees.

use glam::{DQuat, DVec3};

use crate::math::{inertia_components, is_identity_rotation, quat_to_rpy};
use crate::xml::{XmlElement, format_f64, format_list};

use super::{Body, Camera, Geom, Joint, Light, Mujoco, PhysicsOptions, Sensor, Site};

pub(crate) fn mujoco_to_xml(mujoco: &Mujoco) -> XmlElement {
    let mut element = XmlElement::new("mujoco");
    if let Some(model) = &mujoco.model {
        element.set_attr("model", model.as_str());
    }

    element.push_child(
        XmlElement::new("compiler")
            .attr_set("angle", "degree")
            .attr_set("eulerseq", "XYZ"),
    );
    element.push_child(option_to_xml(&mujoco.option));

    if !mujoco.assets.materials.is_empty() || !mujoco.assets.meshes.is_empty() {
        let mut asset = XmlElement::new("asset");
        for material in &mujoco.assets.materials {
            asset.push_child(
                XmlElement::new("material")
                    .attr_set("name", material.name.as_str())
                    .attr_set("rgba", format_list(&material.rgba))
                    .attr_set("emission", format_f64(material.emission))
                    .attr_set("specular", format_f64(material.specular))
                    .attr_set("shininess", format_f64(material.shininess)),
            );
        }
        for mesh in &mujoco.assets.meshes {
            let mut mesh_element = XmlElement::new("mesh")
                .attr_set("name", mesh.name.as_str())
                .attr_set("file", mesh.file.as_str());
            if mesh.scale != DVec3::ONE {
                mesh_element.set_attr("scale", vec3(mesh.scale));
            }
            asset.push_child(mesh_element);
        }
        element.push_child(asset);
    }

    let mut worldbody = XmlElement::new("worldbody");
    push_body_contents(&mut worldbody, &mujoco.worldbody);
    element.push_child(worldbody);

    if !mujoco.sensors.is_empty() {
        let mut sensors = XmlElement::new("sensor");
        for sensor in &mujoco.sensors {
            sensors.push_child(sensor_to_xml(sensor));
        }
        element.push_child(sensors);
    }

    element
}

fn vec3(v: DVec3) -> String {
    format_list(&v.to_array())
}

/// Roll/pitch/yaw in degrees
fn euler_degrees(rotation: DQuat) -> String {
    format_list(&quat_to_rpy(rotation).map(f64::to_degrees))
}

/// Set `pos` and `euler`, omitting zero position and identity rotation
fn set_pose(element: &mut XmlElement, pos: DVec3, quat: DQuat) {
    if !pos.abs_diff_eq(DVec3::ZERO, crate::math::EPSILON) {
        element.set_attr("pos", vec3(pos));
    }
    if !is_identity_rotation(quat) {
        element.set_attr("euler", euler_degrees(quat));
    }
}

fn set_name(element: &mut XmlElement, name: &Option<String>) {
    if let Some(name) = name {
        element.set_attr("name", name.as_str());
    }
}

fn option_to_xml(option: &PhysicsOptions) -> XmlElement {
    let mut element = XmlElement::new("option");
    if let Some(timestep) = option.timestep {
        element.set_attr("timestep", format_f64(timestep));
    }
    element.set_attr("gravity", vec3(option.gravity));
    element.set_attr("magnetic", vec3(option.magnetic));
    if option.wind != DVec3::ZERO {
        element.set_attr("wind", vec3(option.wind));
    }
    if option.gravity_disabled {
        element.push_child(XmlElement::new("flag").attr_set("gravity", "disable"));
    }
    element
}

fn push_body_contents(element: &mut XmlElement, body: &Body) {
    if let Some(inertial) = &body.inertial {
        element.push_child(
            XmlElement::new("inertial")
                .attr_set("pos", vec3(inertial.pos))
                .attr_set("mass", format_f64(inertial.mass))
                .attr_set("fullinertia", format_list(&inertia_components(&inertial.inertia))),
        );
    }
    if let Some(freejoint) = &body.freejoint {
        let mut free = XmlElement::new("freejoint");
        set_name(&mut free, &freejoint.name);
        element.push_child(free);
    }
    for joint in &body.joints {
        element.push_child(joint_to_xml(joint));
    }
    for geom in &body.geoms {
        element.push_child(geom_to_xml(geom));
    }
    for site in &body.sites {
        element.push_child(site_to_xml(site));
    }
    for camera in &body.cameras {
        element.push_child(camera_to_xml(camera));
    }
    for light in &body.lights {
        element.push_child(light_to_xml(light));
    }
    for child in &body.bodies {
        let mut child_element = XmlElement::new("body");
        set_name(&mut child_element, &child.name);
        set_pose(&mut child_element, child.pos, child.quat);
        push_body_contents(&mut child_element, child);
        element.push_child(child_element);
    }
}

fn joint_to_xml(joint: &Joint) -> XmlElement {
    let mut element = XmlElement::new("joint");
    set_name(&mut element, &joint.name);
    element.set_attr("type", joint.kind.as_str());
    if joint.pos != DVec3::ZERO {
        element.set_attr("pos", vec3(joint.pos));
    }
    element.set_attr("axis", vec3(joint.axis));
    if let Some(limited) = joint.limited {
        element.set_attr("limited", if limited { "true" } else { "false" });
    }
    if let Some(range) = joint.range {
        let range = if joint.kind.is_angular() {
            range.map(f64::to_degrees)
        } else {
            range
        };
        element.set_attr("range", format_list(&range));
    }
    let dynamics = [
        ("damping", joint.damping),
        ("stiffness", joint.stiffness),
        (
            "springref",
            if joint.kind.is_angular() {
                joint.springref.to_degrees()
            } else {
                joint.springref
            },
        ),
        ("frictionloss", joint.frictionloss),
        ("armature", joint.armature),
    ];
    for (name, value) in dynamics {
        if value != 0.0 {
            element.set_attr(name, format_f64(value));
        }
    }
    element
}

fn geom_to_xml(geom: &Geom) -> XmlElement {
    let mut element = XmlElement::new("geom");
    set_name(&mut element, &geom.name);
    element.set_attr("type", geom.kind.as_str());
    if !geom.size.is_empty() {
        element.set_attr("size", format_list(&geom.size));
    }
    match geom.fromto {
        Some(fromto) => element.set_attr("fromto", format_list(&fromto)),
        None => set_pose(&mut element, geom.pos, geom.quat),
    }
    if let Some(rgba) = geom.rgba {
        element.set_attr("rgba", format_list(&rgba));
    }
    if let Some(material) = &geom.material {
        element.set_attr("material", material.as_str());
    }
    if let Some(mesh) = &geom.mesh {
        element.set_attr("mesh", mesh.as_str());
    }
    if geom.group != 0 {
        element.set_attr("group", geom.group.to_string());
    }
    if geom.contype != 1 {
        element.set_attr("contype", geom.contype.to_string());
    }
    if geom.conaffinity != 1 {
        element.set_attr("conaffinity", geom.conaffinity.to_string());
    }
    if let Some(mass) = geom.mass {
        element.set_attr("mass", format_f64(mass));
    }
    if let Some(density) = geom.density {
        element.set_attr("density", format_f64(density));
    }
    element
}

fn site_to_xml(site: &Site) -> XmlElement {
    let mut element = XmlElement::new("site");
    set_name(&mut element, &site.name);
    set_pose(&mut element, site.pos, site.quat);
    if !site.size.is_empty() {
        element.set_attr("size", format_list(&site.size));
    }
    element
}

fn camera_to_xml(camera: &Camera) -> XmlElement {
    let mut element = XmlElement::new("camera");
    set_name(&mut element, &camera.name);
    set_pose(&mut element, camera.pos, camera.quat);
    element.set_attr("fovy", format_f64(camera.fovy.to_degrees()));
    if let Some([width, height]) = camera.resolution {
        element.set_attr("resolution", format!("{} {}", width, height));
    }
    element
}

fn light_to_xml(light: &Light) -> XmlElement {
    let mut element = XmlElement::new("light");
    set_name(&mut element, &light.name);
    if light.pos != DVec3::ZERO {
        element.set_attr("pos", vec3(light.pos));
    }
    element.set_attr("dir", vec3(light.dir));
    element.set_attr("directional", if light.directional { "true" } else { "false" });
    element.set_attr("castshadow", if light.castshadow { "true" } else { "false" });
    element.set_attr("diffuse", format_list(&light.diffuse));
    element.set_attr("specular", format_list(&light.specular));
    element.set_attr("attenuation", format_list(&light.attenuation));
    element.set_attr("cutoff", format_f64(light.cutoff.to_degrees()));
    element.set_attr("exponent", format_f64(light.exponent));
    element
}

fn sensor_to_xml(sensor: &Sensor) -> XmlElement {
    let mut element = XmlElement::new(sensor.kind.as_str());
    set_name(&mut element, &sensor.name);
    element.set_attr("site", sensor.site.as_str());
    element
}
