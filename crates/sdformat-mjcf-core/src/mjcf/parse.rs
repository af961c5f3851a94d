//! MJCF XML reader
//!
//! Default classes are applied on the raw element tree first, then the
//! typed model is built with the document's compiler settings.

use std::path::Path;

use glam::{DQuat, DVec3};

use crate::math::{euler_to_quat, inertia_from_components, quat_from_xy_axes, quat_from_z_to, rotate_inertia};
use crate::xml::XmlElement;

use super::{
    AngleUnit, Assets, Body, Camera, Compiler, DefaultClasses, FreeJoint, Geom, GeomKind,
    InertiaFromGeom, Inertial, Joint, JointKind, Light, Material, MeshAsset, MjcfError, Mujoco,
    PhysicsOptions, Sensor, SensorKind, Site,
};

pub(crate) fn parse_mujoco(xml: &str) -> Result<Mujoco, MjcfError> {
    let mut root = XmlElement::parse(xml)?;
    if root.name != "mujoco" {
        return Err(MjcfError::NotMjcf(root.name));
    }

    let classes = DefaultClasses::from_mujoco(&root);
    for child in &mut root.children {
        match child.name.as_str() {
            "worldbody" => classes.apply_to_worldbody(child)?,
            "asset" => classes.apply_to_assets(child)?,
            _ => {}
        }
    }

    let mut compiler = Compiler::default();
    for element in root.children_named("compiler") {
        parse_compiler(element, &mut compiler)?;
    }

    let mut mujoco = Mujoco {
        model: root.attr("model").map(str::to_string),
        ..Default::default()
    };

    for child in &root.children {
        match child.name.as_str() {
            "option" => parse_option(child, &mut mujoco.option)?,
            "asset" => parse_assets(child, &compiler, &mut mujoco.assets)?,
            "worldbody" => parse_body_children(child, &compiler, &mut mujoco.worldbody)?,
            "sensor" => parse_sensors(child, &mut mujoco.sensors)?,
            "compiler" | "default" => {}
            "include" => tracing::warn!("Skipping <include>; inline included files before converting"),
            other => tracing::debug!("Ignoring <{}>", other),
        }
    }

    mujoco.compiler = compiler;
    Ok(mujoco)
}

fn bad_value(element: &XmlElement, attribute: &str, reason: impl Into<String>) -> MjcfError {
    MjcfError::BadValue {
        element: element.name.clone(),
        attribute: attribute.to_string(),
        reason: reason.into(),
    }
}

fn parse_compiler(element: &XmlElement, compiler: &mut Compiler) -> Result<(), MjcfError> {
    if let Some(angle) = element.attr("angle") {
        compiler.angle = match angle {
            "degree" => AngleUnit::Degree,
            "radian" => AngleUnit::Radian,
            other => return Err(bad_value(element, "angle", format!("'{}'", other))),
        };
    }
    if let Some(seq) = element.attr("eulerseq") {
        compiler.eulerseq = seq.to_string();
    }
    if let Some(meshdir) = element.attr("meshdir") {
        compiler.meshdir = Some(meshdir.to_string());
    }
    if let Some(mode) = element.attr("inertiafromgeom") {
        compiler.inertiafromgeom = match mode {
            "auto" => InertiaFromGeom::Auto,
            "true" => InertiaFromGeom::True,
            "false" => InertiaFromGeom::False,
            other => return Err(bad_value(element, "inertiafromgeom", format!("'{}'", other))),
        };
    }
    Ok(())
}

fn parse_option(element: &XmlElement, option: &mut PhysicsOptions) -> Result<(), MjcfError> {
    option.timestep = element.attr_f64("timestep")?.or(option.timestep);
    if let Some(gravity) = element.attr_array::<3>("gravity")? {
        option.gravity = DVec3::from(gravity);
    }
    if let Some(magnetic) = element.attr_array::<3>("magnetic")? {
        option.magnetic = DVec3::from(magnetic);
    }
    if let Some(wind) = element.attr_array::<3>("wind")? {
        option.wind = DVec3::from(wind);
    }
    if let Some(flag) = element.child("flag") {
        option.gravity_disabled = flag.attr("gravity") == Some("disable");
    }
    Ok(())
}

fn parse_assets(element: &XmlElement, compiler: &Compiler, assets: &mut Assets) -> Result<(), MjcfError> {
    for child in &element.children {
        match child.name.as_str() {
            "material" => {
                let mut material = Material::new(child.required_attr("name")?);
                if let Some(rgba) = child.attr_array::<4>("rgba")? {
                    material.rgba = rgba;
                }
                if let Some(emission) = child.attr_f64("emission")? {
                    material.emission = emission;
                }
                if let Some(specular) = child.attr_f64("specular")? {
                    material.specular = specular;
                }
                if let Some(shininess) = child.attr_f64("shininess")? {
                    material.shininess = shininess;
                }
                assets.materials.push(material);
            }
            "mesh" => assets.meshes.push(parse_mesh_asset(child, compiler)?),
            other => tracing::debug!("Ignoring <{}> asset", other),
        }
    }
    Ok(())
}

fn parse_mesh_asset(element: &XmlElement, compiler: &Compiler) -> Result<MeshAsset, MjcfError> {
    let file = element.required_attr("file")?;
    let name = match element.attr("name") {
        Some(name) => name.to_string(),
        None => Path::new(file)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .ok_or_else(|| bad_value(element, "file", "no file name"))?,
    };
    let file = match &compiler.meshdir {
        Some(dir) if !Path::new(file).is_absolute() => {
            Path::new(dir).join(file).to_string_lossy().to_string()
        }
        _ => file.to_string(),
    };
    Ok(MeshAsset {
        name,
        file,
        scale: DVec3::from(element.attr_array::<3>("scale")?.unwrap_or([1.0; 3])),
    })
}

/// Orientation from whichever of quat, axisangle, euler, xyaxes or zaxis is set
fn parse_orientation(element: &XmlElement, compiler: &Compiler) -> Result<DQuat, MjcfError> {
    if let Some([w, x, y, z]) = element.attr_array::<4>("quat")? {
        let quat = DQuat::from_xyzw(x, y, z, w);
        if quat.length_squared() == 0.0 {
            return Err(bad_value(element, "quat", "zero quaternion"));
        }
        return Ok(quat.normalize());
    }
    if let Some([x, y, z, angle]) = element.attr_array::<4>("axisangle")? {
        let axis = DVec3::new(x, y, z).normalize_or_zero();
        if axis == DVec3::ZERO {
            return Err(bad_value(element, "axisangle", "zero axis"));
        }
        return Ok(DQuat::from_axis_angle(axis, compiler.angle.to_radians(angle)));
    }
    if let Some(euler) = element.attr_array::<3>("euler")? {
        let angles = euler.map(|a| compiler.angle.to_radians(a));
        return Ok(euler_to_quat(angles, &compiler.eulerseq)?);
    }
    if let Some([x0, x1, x2, y0, y1, y2]) = element.attr_array::<6>("xyaxes")? {
        return Ok(quat_from_xy_axes(DVec3::new(x0, x1, x2), DVec3::new(y0, y1, y2)));
    }
    if let Some(zaxis) = element.attr_array::<3>("zaxis")? {
        return Ok(quat_from_z_to(DVec3::from(zaxis)));
    }
    Ok(DQuat::IDENTITY)
}

fn parse_pos(element: &XmlElement) -> Result<DVec3, MjcfError> {
    Ok(DVec3::from(element.attr_array::<3>("pos")?.unwrap_or([0.0; 3])))
}

fn parse_body(element: &XmlElement, compiler: &Compiler) -> Result<Body, MjcfError> {
    let mut body = Body {
        name: element.attr("name").map(str::to_string),
        pos: parse_pos(element)?,
        quat: parse_orientation(element, compiler)?,
        ..Default::default()
    };
    parse_body_children(element, compiler, &mut body)?;
    Ok(body)
}

fn parse_body_children(element: &XmlElement, compiler: &Compiler, body: &mut Body) -> Result<(), MjcfError> {
    for child in &element.children {
        match child.name.as_str() {
            "inertial" => body.inertial = Some(parse_inertial(child, compiler)?),
            "joint" => {
                let joint = parse_joint(child, compiler)?;
                if joint.kind == JointKind::Free {
                    body.freejoint = Some(FreeJoint { name: joint.name });
                } else {
                    body.joints.push(joint);
                }
            }
            "freejoint" => {
                body.freejoint = Some(FreeJoint {
                    name: child.attr("name").map(str::to_string),
                })
            }
            "geom" => body.geoms.push(parse_geom(child, compiler)?),
            "site" => body.sites.push(Site {
                name: child.attr("name").map(str::to_string),
                pos: parse_pos(child)?,
                quat: parse_orientation(child, compiler)?,
                size: child.attr_vec("size")?.unwrap_or_default(),
            }),
            "camera" => body.cameras.push(parse_camera(child, compiler)?),
            "light" => body.lights.push(parse_light(child)?),
            "body" => body.bodies.push(parse_body(child, compiler)?),
            "frame" | "composite" | "flexcomp" => {
                tracing::warn!("Skipping unsupported <{}> element", child.name)
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_inertial(element: &XmlElement, compiler: &Compiler) -> Result<Inertial, MjcfError> {
    let rotation = parse_orientation(element, compiler)?;
    let local = if let Some(full) = element.attr_array::<6>("fullinertia")? {
        inertia_from_components(full)
    } else {
        let [ixx, iyy, izz] = element.attr_array::<3>("diaginertia")?.unwrap_or([0.0; 3]);
        inertia_from_components([ixx, iyy, izz, 0.0, 0.0, 0.0])
    };
    Ok(Inertial {
        pos: parse_pos(element)?,
        mass: element.attr_f64("mass")?.unwrap_or(0.0),
        inertia: rotate_inertia(rotation, local),
    })
}

fn parse_joint(element: &XmlElement, compiler: &Compiler) -> Result<Joint, MjcfError> {
    let type_name = element.attr("type").unwrap_or("hinge");
    let kind = JointKind::parse(type_name).ok_or_else(|| MjcfError::UnknownJointType(type_name.to_string()))?;

    let mut joint = Joint::new(kind);
    joint.name = element.attr("name").map(str::to_string);
    joint.pos = parse_pos(element)?;
    if let Some(axis) = element.attr_array::<3>("axis")? {
        joint.axis = DVec3::from(axis);
    }

    let to_joint_units = |value: f64| {
        if kind.is_angular() {
            compiler.angle.to_radians(value)
        } else {
            value
        }
    };
    joint.range = element
        .attr_array::<2>("range")?
        .map(|range| range.map(to_joint_units));
    joint.limited = match element.attr("limited") {
        None | Some("auto") => None,
        Some(_) => element.attr_bool("limited")?,
    };
    joint.damping = element.attr_f64("damping")?.unwrap_or(0.0);
    joint.stiffness = element.attr_f64("stiffness")?.unwrap_or(0.0);
    joint.springref = element.attr_f64("springref")?.map(to_joint_units).unwrap_or(0.0);
    joint.frictionloss = element.attr_f64("frictionloss")?.unwrap_or(0.0);
    joint.armature = element.attr_f64("armature")?.unwrap_or(0.0);
    Ok(joint)
}

fn parse_geom(element: &XmlElement, compiler: &Compiler) -> Result<Geom, MjcfError> {
    let kind = match element.attr("type") {
        Some(name) => GeomKind::parse(name).ok_or_else(|| MjcfError::UnknownGeomType(name.to_string()))?,
        None if element.has_attr("mesh") => GeomKind::Mesh,
        None => GeomKind::Sphere,
    };

    let mut geom = Geom::new(kind, element.attr_vec("size")?.unwrap_or_default());
    geom.name = element.attr("name").map(str::to_string);
    geom.fromto = element.attr_array::<6>("fromto")?;
    geom.pos = parse_pos(element)?;
    geom.quat = parse_orientation(element, compiler)?;
    geom.rgba = element.attr_array::<4>("rgba")?;
    geom.material = element.attr("material").map(str::to_string);
    geom.mesh = element.attr("mesh").map(str::to_string);
    geom.group = element.attr_i32("group")?.unwrap_or(0);
    geom.contype = element.attr_i32("contype")?.unwrap_or(1);
    geom.conaffinity = element.attr_i32("conaffinity")?.unwrap_or(1);
    geom.mass = element.attr_f64("mass")?;
    geom.density = element.attr_f64("density")?;
    Ok(geom)
}

fn parse_camera(element: &XmlElement, compiler: &Compiler) -> Result<Camera, MjcfError> {
    let mut camera = Camera {
        name: element.attr("name").map(str::to_string),
        pos: parse_pos(element)?,
        quat: parse_orientation(element, compiler)?,
        ..Default::default()
    };
    // fovy is always in degrees
    if let Some(fovy) = element.attr_f64("fovy")? {
        camera.fovy = fovy.to_radians();
    }
    if let Some([width, height]) = element.attr_array::<2>("resolution")? {
        if width < 1.0 || height < 1.0 {
            return Err(bad_value(element, "resolution", "must be at least 1x1"));
        }
        camera.resolution = Some([width as u32, height as u32]);
    }
    Ok(camera)
}

fn parse_light(element: &XmlElement) -> Result<Light, MjcfError> {
    let mut light = Light {
        name: element.attr("name").map(str::to_string),
        pos: parse_pos(element)?,
        ..Default::default()
    };
    if let Some(dir) = element.attr_array::<3>("dir")? {
        light.dir = DVec3::from(dir);
    }
    light.directional =
        element.attr_bool("directional")?.unwrap_or(false) || element.attr("type") == Some("directional");
    if let Some(castshadow) = element.attr_bool("castshadow")? {
        light.castshadow = castshadow;
    }
    if let Some(diffuse) = element.attr_array::<3>("diffuse")? {
        light.diffuse = diffuse;
    }
    if let Some(specular) = element.attr_array::<3>("specular")? {
        light.specular = specular;
    }
    if let Some(attenuation) = element.attr_array::<3>("attenuation")? {
        light.attenuation = attenuation;
    }
    // cutoff is always in degrees
    if let Some(cutoff) = element.attr_f64("cutoff")? {
        light.cutoff = cutoff.to_radians();
    }
    if let Some(exponent) = element.attr_f64("exponent")? {
        light.exponent = exponent;
    }
    Ok(light)
}

fn parse_sensors(element: &XmlElement, sensors: &mut Vec<Sensor>) -> Result<(), MjcfError> {
    for child in &element.children {
        let Some(kind) = SensorKind::parse(&child.name) else {
            tracing::warn!("Skipping unsupported <{}> sensor", child.name);
            continue;
        };
        sensors.push(Sensor {
            name: child.attr("name").map(str::to_string),
            kind,
            site: child.required_attr("site")?.to_string(),
        });
    }
    Ok(())
}
