use crate::math::sdf_camera_in_mujoco_camera;
use crate::mjcf::{self, Site};
use crate::sdf::{Camera, SemanticPose, Sensor, SensorKind};

use super::{Exporter, ns};

/// Sensors reading a site, placed at the site pose.
///
/// Accelerometer and gyro readers merge into one IMU, force and torque
/// readers into one force/torque sensor.
pub(crate) fn site_sensors_to_sdf(cx: &mut Exporter, site: &Site, readers: &[&mjcf::Sensor]) -> Vec<Sensor> {
    let has = |kinds: &[mjcf::SensorKind]| readers.iter().any(|r| kinds.contains(&r.kind));
    let base = site.name.clone().unwrap_or_else(|| "site".to_string());

    let mut sensors = Vec::new();
    if has(&[mjcf::SensorKind::Accelerometer, mjcf::SensorKind::Gyro]) {
        sensors.push(SensorKind::Imu);
    }
    if has(&[mjcf::SensorKind::Force, mjcf::SensorKind::Torque]) {
        sensors.push(SensorKind::ForceTorque);
    }

    sensors
        .into_iter()
        .map(|kind| Sensor {
            name: cx.names.claim(ns::SENSOR, &base),
            pose: SemanticPose::new(site.pose()),
            kind,
        })
        .collect()
}

/// Camera sensor looking along the MuJoCo camera's -Z
pub(crate) fn camera_to_sdf(cx: &mut Exporter, camera: &mjcf::Camera) -> Sensor {
    let [width, height] = camera
        .resolution
        .unwrap_or([cx.config.camera_width, cx.config.camera_height]);
    let aspect = if height == 0 { 1.0 } else { width as f64 / height as f64 };
    let horizontal_fov = 2.0 * ((camera.fovy / 2.0).tan() * aspect).atan();

    let mut pose = camera.pose();
    pose.rotation = pose.rotation * sdf_camera_in_mujoco_camera();

    let name = match &camera.name {
        Some(name) => cx.names.claim(ns::SENSOR, name),
        None => cx.names.next_unnamed(ns::SENSOR, "unnamed_camera"),
    };
    Sensor {
        name,
        pose: SemanticPose::new(pose),
        kind: SensorKind::Camera(Camera {
            horizontal_fov,
            width,
            height,
            ..Default::default()
        }),
    }
}
