//! MJCF document model
//!
//! The subset of MuJoCo's XML format needed for SDFormat conversion.
//! Values are stored in canonical units: radians, unit quaternions and
//! MuJoCo's native size conventions (half extents, half lengths).
//!
//! - `defaults`: default classes and `childclass` resolution
//! - `inertia`: body mass properties computed from geoms

pub mod defaults;
pub mod inertia;
mod parse;
mod write;

use std::path::Path;

use glam::{DMat3, DQuat, DVec3};

use crate::math::{EulerSeqError, Pose};
use crate::xml::XmlError;

pub use defaults::DefaultClasses;
pub use inertia::body_inertial;

/// Errors raised while reading or writing MJCF
#[derive(Debug, Clone, thiserror::Error)]
pub enum MjcfError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Expected a <mujoco> document, found <{0}>")]
    NotMjcf(String),

    #[error("Unknown default class '{0}'")]
    UnknownClass(String),

    #[error("Unknown geom type '{0}'")]
    UnknownGeomType(String),

    #[error("Unknown joint type '{0}'")]
    UnknownJointType(String),

    #[error(transparent)]
    EulerSeq(#[from] EulerSeqError),

    #[error("Invalid {attribute} on <{element}>: {reason}")]
    BadValue {
        element: String,
        attribute: String,
        reason: String,
    },
}

/// `<compiler angle>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AngleUnit {
    #[default]
    Degree,
    Radian,
}

impl AngleUnit {
    /// Convert a value written in this unit to radians
    pub fn to_radians(&self, value: f64) -> f64 {
        match self {
            AngleUnit::Degree => value.to_radians(),
            AngleUnit::Radian => value,
        }
    }
}

/// `<compiler inertiafromgeom>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InertiaFromGeom {
    /// Only bodies without `<inertial>`
    #[default]
    Auto,
    /// Always, ignoring `<inertial>`
    True,
    /// Never
    False,
}

/// Compiler settings that affect how the document is read
#[derive(Debug, Clone, PartialEq)]
pub struct Compiler {
    pub angle: AngleUnit,
    pub eulerseq: String,
    pub meshdir: Option<String>,
    pub inertiafromgeom: InertiaFromGeom,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            angle: AngleUnit::Degree,
            eulerseq: "xyz".to_string(),
            meshdir: None,
            inertiafromgeom: InertiaFromGeom::Auto,
        }
    }
}

/// `<option>`
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsOptions {
    pub timestep: Option<f64>,
    pub gravity: DVec3,
    pub magnetic: DVec3,
    pub wind: DVec3,
    /// `<flag gravity="disable"/>`
    pub gravity_disabled: bool,
}

impl PhysicsOptions {
    pub const DEFAULT_GRAVITY: DVec3 = DVec3::new(0.0, 0.0, -9.81);
    pub const DEFAULT_MAGNETIC: DVec3 = DVec3::new(0.0, -0.5, 0.0);
}

impl Default for PhysicsOptions {
    fn default() -> Self {
        Self {
            timestep: None,
            gravity: Self::DEFAULT_GRAVITY,
            magnetic: Self::DEFAULT_MAGNETIC,
            wind: DVec3::ZERO,
            gravity_disabled: false,
        }
    }
}

/// `<asset><material>`
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub rgba: [f64; 4],
    pub emission: f64,
    pub specular: f64,
    pub shininess: f64,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rgba: [1.0, 1.0, 1.0, 1.0],
            emission: 0.0,
            specular: 0.5,
            shininess: 0.5,
        }
    }
}

/// `<asset><mesh>`; `file` already includes the compiler `meshdir`
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAsset {
    pub name: String,
    pub file: String,
    pub scale: DVec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assets {
    pub materials: Vec<Material>,
    pub meshes: Vec<MeshAsset>,
}

impl Assets {
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Meshes without a `name` are referenced by their file stem
    pub fn mesh(&self, name: &str) -> Option<&MeshAsset> {
        self.meshes.iter().find(|m| m.name == name)
    }
}

/// Explicit or computed mass properties; `inertia` is expressed in the body
/// frame about `pos`
#[derive(Debug, Clone, PartialEq)]
pub struct Inertial {
    pub pos: DVec3,
    pub mass: f64,
    pub inertia: DMat3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreeJoint {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    /// `None` only for the world body and unnamed bodies read from files
    pub name: Option<String>,
    pub pos: DVec3,
    pub quat: DQuat,
    pub inertial: Option<Inertial>,
    pub joints: Vec<Joint>,
    pub freejoint: Option<FreeJoint>,
    pub geoms: Vec<Geom>,
    pub sites: Vec<Site>,
    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
    pub bodies: Vec<Body>,
}

impl Body {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Pose of the body frame in its parent body frame
    pub fn pose(&self) -> Pose {
        Pose::new(self.pos, self.quat)
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pos = pose.position;
        self.quat = pose.rotation;
    }

    /// Depth-first search for a descendant body (or this body) by name
    pub fn find_body(&self, name: &str) -> Option<&Body> {
        if self.name.as_deref() == Some(name) {
            return Some(self);
        }
        self.bodies.iter().find_map(|b| b.find_body(name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeomKind {
    Plane,
    Hfield,
    Sphere,
    Capsule,
    Ellipsoid,
    Cylinder,
    Box,
    Mesh,
    Sdf,
}

impl GeomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeomKind::Plane => "plane",
            GeomKind::Hfield => "hfield",
            GeomKind::Sphere => "sphere",
            GeomKind::Capsule => "capsule",
            GeomKind::Ellipsoid => "ellipsoid",
            GeomKind::Cylinder => "cylinder",
            GeomKind::Box => "box",
            GeomKind::Mesh => "mesh",
            GeomKind::Sdf => "sdf",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "plane" => GeomKind::Plane,
            "hfield" => GeomKind::Hfield,
            "sphere" => GeomKind::Sphere,
            "capsule" => GeomKind::Capsule,
            "ellipsoid" => GeomKind::Ellipsoid,
            "cylinder" => GeomKind::Cylinder,
            "box" => GeomKind::Box,
            "mesh" => GeomKind::Mesh,
            "sdf" => GeomKind::Sdf,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Geom {
    pub name: Option<String>,
    pub kind: GeomKind,
    /// MuJoCo size convention (half extents, radius + half length, ...)
    pub size: Vec<f64>,
    pub fromto: Option<[f64; 6]>,
    pub pos: DVec3,
    pub quat: DQuat,
    /// Explicit color; `None` falls back to the material or MuJoCo's gray
    pub rgba: Option<[f64; 4]>,
    pub material: Option<String>,
    pub mesh: Option<String>,
    pub group: i32,
    pub contype: i32,
    pub conaffinity: i32,
    pub mass: Option<f64>,
    pub density: Option<f64>,
}

impl Geom {
    pub const DEFAULT_RGBA: [f64; 4] = [0.5, 0.5, 0.5, 1.0];

    pub fn new(kind: GeomKind, size: Vec<f64>) -> Self {
        Self {
            name: None,
            kind,
            size,
            fromto: None,
            pos: DVec3::ZERO,
            quat: DQuat::IDENTITY,
            rgba: None,
            material: None,
            mesh: None,
            group: 0,
            contype: 1,
            conaffinity: 1,
            mass: None,
            density: None,
        }
    }

    /// `size[i]`, or 0 when missing
    pub fn size_at(&self, index: usize) -> f64 {
        self.size.get(index).copied().unwrap_or(0.0)
    }

    /// Half length of the segment given by `fromto`
    pub fn fromto_half_length(&self) -> Option<f64> {
        self.fromto.map(|[x0, y0, z0, x1, y1, z1]| {
            (DVec3::new(x1, y1, z1) - DVec3::new(x0, y0, z0)).length() / 2.0
        })
    }

    /// Geom frame in the body frame. A `fromto` segment puts the frame at
    /// the segment midpoint with +Z along the segment.
    pub fn frame(&self) -> Pose {
        match self.fromto {
            Some([x0, y0, z0, x1, y1, z1]) => {
                let from = DVec3::new(x0, y0, z0);
                let to = DVec3::new(x1, y1, z1);
                Pose::new((from + to) / 2.0, crate::math::quat_from_z_to(to - from))
            }
            None => Pose::new(self.pos, self.quat),
        }
    }

    /// Half length along Z for capsules and cylinders
    pub fn half_length(&self) -> f64 {
        self.fromto_half_length().unwrap_or_else(|| self.size_at(1))
    }

    /// Box or ellipsoid half extents; `fromto` sets the Z extent
    pub fn half_extents(&self) -> [f64; 3] {
        let z = self.fromto_half_length().unwrap_or_else(|| self.size_at(2));
        [self.size_at(0), self.size_at(1), z]
    }

    /// Group 3 holds collision-only geoms
    pub fn is_collision_only(&self) -> bool {
        self.group == 3
    }

    /// Geoms that collide with nothing are visual-only
    pub fn is_visual_only(&self) -> bool {
        self.contype == 0 && self.conaffinity == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Free,
    Ball,
    Slide,
    Hinge,
}

impl JointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JointKind::Free => "free",
            JointKind::Ball => "ball",
            JointKind::Slide => "slide",
            JointKind::Hinge => "hinge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "free" => JointKind::Free,
            "ball" => JointKind::Ball,
            "slide" => JointKind::Slide,
            "hinge" => JointKind::Hinge,
            _ => return None,
        })
    }

    /// Ranges of these joints are angles
    pub fn is_angular(&self) -> bool {
        matches!(self, JointKind::Ball | JointKind::Hinge)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: Option<String>,
    pub kind: JointKind,
    /// Position in the body frame
    pub pos: DVec3,
    /// Axis in the body frame
    pub axis: DVec3,
    /// Radians for hinge and ball joints, meters for slide joints
    pub range: Option<[f64; 2]>,
    /// `None` means MuJoCo's `auto`: limited when a range is given
    pub limited: Option<bool>,
    pub damping: f64,
    pub stiffness: f64,
    pub springref: f64,
    pub frictionloss: f64,
    pub armature: f64,
}

impl Joint {
    pub fn new(kind: JointKind) -> Self {
        Self {
            name: None,
            kind,
            pos: DVec3::ZERO,
            axis: DVec3::Z,
            range: None,
            limited: None,
            damping: 0.0,
            stiffness: 0.0,
            springref: 0.0,
            frictionloss: 0.0,
            armature: 0.0,
        }
    }

    /// Effective range when the joint is limited
    pub fn limits(&self) -> Option<[f64; 2]> {
        let range = self.range?;
        let limited = self.limited.unwrap_or(range[0] < range[1]);
        limited.then_some(range)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub name: Option<String>,
    pub pos: DVec3,
    pub quat: DQuat,
    /// Empty means MuJoCo's default size
    pub size: Vec<f64>,
}

impl Site {
    pub fn new(name: impl Into<String>, pose: Pose) -> Self {
        Self {
            name: Some(name.into()),
            pos: pose.position,
            quat: pose.rotation,
            size: Vec::new(),
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.pos, self.quat)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: Option<String>,
    pub pos: DVec3,
    pub quat: DQuat,
    /// Vertical field of view, radians
    pub fovy: f64,
    pub resolution: Option<[u32; 2]>,
}

impl Camera {
    pub const DEFAULT_FOVY_DEGREES: f64 = 45.0;

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.pos, self.quat)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            name: None,
            pos: DVec3::ZERO,
            quat: DQuat::IDENTITY,
            fovy: Self::DEFAULT_FOVY_DEGREES.to_radians(),
            resolution: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: Option<String>,
    pub pos: DVec3,
    /// Direction in the body frame
    pub dir: DVec3,
    pub directional: bool,
    pub castshadow: bool,
    pub diffuse: [f64; 3],
    pub specular: [f64; 3],
    /// Constant, linear, quadratic
    pub attenuation: [f64; 3],
    /// Spot cone half angle, radians
    pub cutoff: f64,
    pub exponent: f64,
}

impl Light {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            name: None,
            pos: DVec3::ZERO,
            dir: DVec3::new(0.0, 0.0, -1.0),
            directional: false,
            castshadow: true,
            diffuse: [0.7; 3],
            specular: [0.3; 3],
            attenuation: [1.0, 0.0, 0.0],
            cutoff: 45f64.to_radians(),
            exponent: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Accelerometer,
    Gyro,
    Force,
    Torque,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Accelerometer => "accelerometer",
            SensorKind::Gyro => "gyro",
            SensorKind::Force => "force",
            SensorKind::Torque => "torque",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "accelerometer" => SensorKind::Accelerometer,
            "gyro" => SensorKind::Gyro,
            "force" => SensorKind::Force,
            "torque" => SensorKind::Torque,
            _ => return None,
        })
    }
}

/// Site-attached sensor
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub name: Option<String>,
    pub kind: SensorKind,
    pub site: String,
}

/// Top-level `<mujoco>` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mujoco {
    pub model: Option<String>,
    /// Settings the document was read with; writing always emits its own
    pub compiler: Compiler,
    pub option: PhysicsOptions,
    pub assets: Assets,
    pub worldbody: Body,
    pub sensors: Vec<Sensor>,
}

impl Mujoco {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Parse an MJCF document, resolving default classes
    pub fn from_xml(xml: &str) -> Result<Mujoco, MjcfError> {
        parse::parse_mujoco(xml)
    }

    pub fn load_file(path: &Path) -> Result<Mujoco, MjcfError> {
        let content = std::fs::read_to_string(path).map_err(|e| MjcfError::Io(e.to_string()))?;
        tracing::info!("Loading MJCF from {:?}", path);
        Self::from_xml(&content)
    }

    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        write::mujoco_to_xml(self).to_xml_string()
    }

    pub fn save(&self, path: &Path) -> Result<(), MjcfError> {
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml).map_err(|e| MjcfError::Io(e.to_string()))?;
        tracing::info!("Saved MJCF to {:?}", path);
        Ok(())
    }

    /// Find a body anywhere under the world body
    pub fn find_body(&self, name: &str) -> Option<&Body> {
        self.worldbody.find_body(name)
    }
}
