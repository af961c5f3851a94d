//! SDFormat document model
//!
//! The subset of SDFormat needed for MuJoCo conversion:
//! - Root: worlds or a single model
//! - World: physics settings, lights, models, plugins
//! - Model: links, joints, explicit frames
//! - Link: inertial, visuals, collisions, sensors, lights

mod frames;
mod parse;
mod urdf;
mod write;

use std::path::Path;

use glam::DVec3;

use crate::math::Pose;
use crate::xml::XmlError;

pub use frames::{FrameError, FrameGraph, MODEL_FRAME};
pub use urdf::{UrdfError, model_from_urdf, model_from_urdf_str};

/// Errors raised while reading SDFormat (or URDF) input
#[derive(Debug, Clone, thiserror::Error)]
pub enum SdfError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Expected an <sdf> or <robot> document, found <{0}>")]
    NotSdf(String),

    #[error("Unsupported SDFormat feature: {0}")]
    Unsupported(String),

    #[error("Unknown joint type '{0}'")]
    UnknownJointType(String),

    #[error("Unknown light type '{0}'")]
    UnknownLightType(String),

    #[error(transparent)]
    Urdf(#[from] UrdfError),
}

/// A pose together with the frame it is expressed in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticPose {
    pub pose: Pose,
    /// `None` means the element's default frame
    pub relative_to: Option<String>,
}

impl SemanticPose {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            relative_to: None,
        }
    }

    pub fn relative_to(pose: Pose, frame: impl Into<String>) -> Self {
        Self {
            pose,
            relative_to: Some(frame.into()),
        }
    }
}

/// Top-level `<sdf>` element
#[derive(Debug, Clone, PartialEq)]
pub struct Root {
    pub version: String,
    pub worlds: Vec<World>,
    /// A document may hold one model instead of worlds
    pub model: Option<Model>,
}

impl Default for Root {
    fn default() -> Self {
        Self {
            version: "1.9".to_string(),
            worlds: Vec::new(),
            model: None,
        }
    }
}

impl Root {
    /// Parse an SDFormat document. A `<robot>` document is read as URDF.
    pub fn from_xml(xml: &str) -> Result<Root, SdfError> {
        parse::parse_root(xml)
    }

    /// Read an SDFormat or URDF file
    pub fn load_file(path: &Path) -> Result<Root, SdfError> {
        let content = std::fs::read_to_string(path).map_err(|e| SdfError::Io(e.to_string()))?;
        tracing::info!("Loading SDFormat from {:?}", path);
        Self::from_xml(&content)
    }

    pub fn to_xml_string(&self) -> Result<String, XmlError> {
        write::root_to_xml(self).to_xml_string()
    }

    pub fn save(&self, path: &Path) -> Result<(), SdfError> {
        let xml = self.to_xml_string()?;
        std::fs::write(path, xml).map_err(|e| SdfError::Io(e.to_string()))?;
        tracing::info!("Saved SDFormat to {:?}", path);
        Ok(())
    }
}

/// Gazebo system plugin
#[derive(Debug, Clone, PartialEq)]
pub struct Plugin {
    pub filename: String,
    pub name: String,
}

impl Plugin {
    pub fn new(filename: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub name: String,
    pub gravity: DVec3,
    pub magnetic_field: DVec3,
    pub wind_linear_velocity: DVec3,
    /// `<physics><max_step_size>`
    pub max_step_size: Option<f64>,
    pub lights: Vec<Light>,
    pub models: Vec<Model>,
    pub plugins: Vec<Plugin>,
}

impl World {
    pub const DEFAULT_GRAVITY: DVec3 = DVec3::new(0.0, 0.0, -9.8);
    pub const DEFAULT_MAGNETIC_FIELD: DVec3 = DVec3::new(5.5645e-6, 22.8758e-6, -42.3884e-6);

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gravity: Self::DEFAULT_GRAVITY,
            magnetic_field: Self::DEFAULT_MAGNETIC_FIELD,
            wind_linear_velocity: DVec3::ZERO,
            max_step_size: None,
            lights: Vec::new(),
            models: Vec::new(),
            plugins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub name: String,
    pub is_static: bool,
    pub pose: SemanticPose,
    pub links: Vec<Link>,
    pub joints: Vec<Joint>,
    pub frames: Vec<Frame>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name == name)
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name == name)
    }
}

/// Explicit `<frame>` element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub name: String,
    pub attached_to: Option<String>,
    pub pose: SemanticPose,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub name: String,
    pub pose: SemanticPose,
    pub inertial: Option<Inertial>,
    pub visuals: Vec<Visual>,
    pub collisions: Vec<Collision>,
    pub sensors: Vec<Sensor>,
    pub lights: Vec<Light>,
}

impl Link {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Mass properties; `pose` is relative to the link frame
#[derive(Debug, Clone, PartialEq)]
pub struct Inertial {
    pub pose: Pose,
    pub mass: f64,
    /// `ixx iyy izz ixy ixz iyz`
    pub inertia: [f64; 6],
}

impl Default for Inertial {
    fn default() -> Self {
        Self {
            pose: Pose::IDENTITY,
            mass: 1.0,
            inertia: [1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Joint type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Fixed,
    Revolute,
    Continuous,
    Prismatic,
    Ball,
    Universal,
    Revolute2,
    Screw,
    Gearbox,
}

impl JointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JointKind::Fixed => "fixed",
            JointKind::Revolute => "revolute",
            JointKind::Continuous => "continuous",
            JointKind::Prismatic => "prismatic",
            JointKind::Ball => "ball",
            JointKind::Universal => "universal",
            JointKind::Revolute2 => "revolute2",
            JointKind::Screw => "screw",
            JointKind::Gearbox => "gearbox",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "fixed" => JointKind::Fixed,
            "revolute" => JointKind::Revolute,
            "continuous" => JointKind::Continuous,
            "prismatic" => JointKind::Prismatic,
            "ball" => JointKind::Ball,
            "universal" => JointKind::Universal,
            "revolute2" => JointKind::Revolute2,
            "screw" => JointKind::Screw,
            "gearbox" => JointKind::Gearbox,
            _ => return None,
        })
    }

    /// Check if this joint type uses `<axis>`
    pub fn has_axis(&self) -> bool {
        matches!(
            self,
            JointKind::Revolute
                | JointKind::Continuous
                | JointKind::Prismatic
                | JointKind::Universal
                | JointKind::Revolute2
                | JointKind::Screw
                | JointKind::Gearbox
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    pub kind: JointKind,
    pub parent: String,
    pub child: String,
    /// Defaults to the child link frame
    pub pose: SemanticPose,
    pub axis: Option<JointAxis>,
}

impl Joint {
    pub fn new(
        name: impl Into<String>,
        kind: JointKind,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: parent.into(),
            child: child.into(),
            pose: SemanticPose::default(),
            axis: None,
        }
    }
}

/// `<axis>` with its limits and dynamics
#[derive(Debug, Clone, PartialEq)]
pub struct JointAxis {
    pub xyz: DVec3,
    /// Frame of `xyz`; `None` is the joint frame
    pub expressed_in: Option<String>,
    pub lower: f64,
    pub upper: f64,
    pub effort: f64,
    pub velocity: f64,
    pub damping: f64,
    pub friction: f64,
    pub spring_reference: f64,
    pub spring_stiffness: f64,
}

impl JointAxis {
    /// SDFormat's stand-in for an infinite limit
    pub const UNLIMITED: f64 = 1e16;

    pub fn new(xyz: DVec3) -> Self {
        Self {
            xyz,
            ..Default::default()
        }
    }

    /// Both limits are finite
    pub fn is_limited(&self) -> bool {
        self.lower.is_finite()
            && self.upper.is_finite()
            && self.lower > -Self::UNLIMITED
            && self.upper < Self::UNLIMITED
    }
}

impl Default for JointAxis {
    fn default() -> Self {
        Self {
            xyz: DVec3::Z,
            expressed_in: None,
            lower: -Self::UNLIMITED,
            upper: Self::UNLIMITED,
            effort: -1.0,
            velocity: -1.0,
            damping: 0.0,
            friction: 0.0,
            spring_reference: 0.0,
            spring_stiffness: 0.0,
        }
    }
}

/// Shape of a visual or collision
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box { size: DVec3 },
    Capsule { radius: f64, length: f64 },
    Cylinder { radius: f64, length: f64 },
    Ellipsoid { radii: DVec3 },
    Sphere { radius: f64 },
    Plane { normal: DVec3, size: [f64; 2] },
    Mesh { uri: String, scale: DVec3 },
    Empty,
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Box { .. } => "box",
            Geometry::Capsule { .. } => "capsule",
            Geometry::Cylinder { .. } => "cylinder",
            Geometry::Ellipsoid { .. } => "ellipsoid",
            Geometry::Sphere { .. } => "sphere",
            Geometry::Plane { .. } => "plane",
            Geometry::Mesh { .. } => "mesh",
            Geometry::Empty => "empty",
        }
    }
}

/// Colors are RGBA
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub ambient: [f64; 4],
    pub diffuse: [f64; 4],
    pub specular: [f64; 4],
    pub emissive: [f64; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: [0.0, 0.0, 0.0, 1.0],
            diffuse: [0.0, 0.0, 0.0, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            emissive: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub name: String,
    /// Defaults to the link frame
    pub pose: SemanticPose,
    pub geometry: Geometry,
    pub material: Option<Material>,
}

impl Visual {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            pose: SemanticPose::default(),
            geometry,
            material: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub name: String,
    /// Defaults to the link frame
    pub pose: SemanticPose,
    pub geometry: Geometry,
}

impl Collision {
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            pose: SemanticPose::default(),
            geometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Radians
    pub horizontal_fov: f64,
    pub width: u32,
    pub height: u32,
    pub near: f64,
    pub far: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            horizontal_fov: 1.047,
            width: 320,
            height: 240,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f64 / self.height as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SensorKind {
    Imu,
    Camera(Camera),
    ForceTorque,
    /// Any other `type`, kept by name
    Other(String),
}

impl SensorKind {
    pub fn type_name(&self) -> &str {
        match self {
            SensorKind::Imu => "imu",
            SensorKind::Camera(_) => "camera",
            SensorKind::ForceTorque => "force_torque",
            SensorKind::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub name: String,
    /// Defaults to the link frame
    pub pose: SemanticPose,
    pub kind: SensorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Spot,
    Directional,
}

impl LightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightKind::Point => "point",
            LightKind::Spot => "spot",
            LightKind::Directional => "directional",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attenuation {
    pub range: f64,
    pub constant: f64,
    pub linear: f64,
    pub quadratic: f64,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            range: 10.0,
            constant: 1.0,
            linear: 1.0,
            quadratic: 0.0,
        }
    }
}

/// Spot light cone; angles in radians
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spot {
    pub inner_angle: f64,
    pub outer_angle: f64,
    pub falloff: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub pose: SemanticPose,
    pub diffuse: [f64; 4],
    pub specular: [f64; 4],
    pub attenuation: Attenuation,
    /// Expressed in the light frame
    pub direction: DVec3,
    pub spot: Spot,
    pub cast_shadows: bool,
}

impl Light {
    pub fn new(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            kind,
            pose: SemanticPose::default(),
            diffuse: [1.0, 1.0, 1.0, 1.0],
            specular: [0.1, 0.1, 0.1, 1.0],
            attenuation: Attenuation::default(),
            direction: DVec3::new(0.0, 0.0, -1.0),
            spot: Spot::default(),
            cast_shadows: false,
        }
    }
}
