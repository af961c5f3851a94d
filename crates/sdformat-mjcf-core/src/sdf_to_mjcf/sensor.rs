use crate::math::{Pose, sdf_camera_in_mujoco_camera};
use crate::mjcf::{self, Body, Site};
use crate::sdf::{Camera, Sensor, SensorKind};

use super::{Converter, ns};

/// Convert a link sensor.
///
/// IMU and force/torque sensors become a site plus site sensors, cameras
/// become a `<camera>`. Other sensor types have no MJCF equivalent.
pub(crate) fn add_sensor(cx: &mut Converter, body: &mut Body, sensor: &Sensor, pose: &Pose) {
    match &sensor.kind {
        SensorKind::Imu => add_site_sensors(
            cx,
            body,
            sensor,
            pose,
            &[("accel", mjcf::SensorKind::Accelerometer), ("gyro", mjcf::SensorKind::Gyro)],
        ),
        SensorKind::ForceTorque => add_site_sensors(
            cx,
            body,
            sensor,
            pose,
            &[("force", mjcf::SensorKind::Force), ("torque", mjcf::SensorKind::Torque)],
        ),
        SensorKind::Camera(camera) => {
            let converted = convert_camera(cx, &sensor.name, camera, pose);
            body.cameras.push(converted);
        }
        SensorKind::Other(kind) => {
            tracing::warn!("Skipping sensor '{}': type '{}' is not supported", sensor.name, kind);
        }
    }
}

fn add_site_sensors(
    cx: &mut Converter,
    body: &mut Body,
    sensor: &Sensor,
    pose: &Pose,
    outputs: &[(&str, mjcf::SensorKind)],
) {
    let site = cx.names.claim(ns::SITE, &sensor.name);
    body.sites.push(Site::new(site.clone(), *pose));
    for (suffix, kind) in outputs {
        let name = cx.names.claim(ns::SENSOR, &format!("{}_{}", sensor.name, suffix));
        cx.sensors.push(mjcf::Sensor {
            name: Some(name),
            kind: *kind,
            site: site.clone(),
        });
    }
}

fn convert_camera(cx: &mut Converter, name: &str, camera: &Camera, pose: &Pose) -> mjcf::Camera {
    let mut converted = mjcf::Camera::new(cx.names.claim(ns::CAMERA, name));
    converted.pos = pose.position;
    converted.quat = pose.rotation * sdf_camera_in_mujoco_camera().inverse();
    // MuJoCo takes the vertical field of view
    converted.fovy = 2.0 * ((camera.horizontal_fov / 2.0).tan() / camera.aspect()).atan();
    converted.resolution = Some([camera.width, camera.height]);
    converted
}
