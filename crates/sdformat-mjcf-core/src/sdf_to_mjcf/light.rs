use std::f64::consts::PI;

use crate::math::Pose;
use crate::mjcf;
use crate::sdf::{Light, LightKind};

use super::{Converter, ns};

fn rgb(color: &[f64; 4]) -> [f64; 3] {
    [color[0], color[1], color[2]]
}

/// Convert a light placed at `pose` in its body (or the world) frame
pub(crate) fn add_light(cx: &mut Converter, light: &Light, pose: Pose) -> mjcf::Light {
    let name = if light.name.is_empty() {
        cx.names.next_unnamed(ns::LIGHT, "unnamed_light")
    } else {
        cx.names.claim(ns::LIGHT, &light.name)
    };
    let mut converted = mjcf::Light::new(name);
    converted.pos = pose.position;
    converted.dir = (pose.rotation * light.direction).normalize_or_zero();
    converted.castshadow = light.cast_shadows;
    converted.diffuse = rgb(&light.diffuse);
    converted.specular = rgb(&light.specular);
    converted.attenuation = [
        light.attenuation.constant,
        light.attenuation.linear,
        light.attenuation.quadratic,
    ];

    match light.kind {
        LightKind::Directional => converted.directional = true,
        LightKind::Spot => {
            converted.cutoff = light.spot.outer_angle;
            converted.exponent = light.spot.falloff;
        }
        // A spot light with a full cone
        LightKind::Point => converted.cutoff = PI,
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use crate::sdf::Spot;
    use glam::DVec3;

    #[test]
    fn test_spot_light() {
        let config = ConversionConfig::default();
        let mut cx = Converter::new(&config);
        let mut light = Light::new("lamp", LightKind::Spot);
        light.direction = DVec3::X;
        light.spot = Spot {
            inner_angle: 0.1,
            outer_angle: 0.5,
            falloff: 2.0,
        };
        light.diffuse = [0.9, 0.8, 0.7, 1.0];
        light.cast_shadows = true;

        let pose = Pose::from_xyz_rpy([0.0, 0.0, 2.0], [0.0, 0.0, std::f64::consts::FRAC_PI_2]);
        let converted = add_light(&mut cx, &light, pose);
        assert_eq!(converted.name.as_deref(), Some("lamp"));
        assert!(!converted.directional);
        assert!(converted.castshadow);
        assert_eq!(converted.cutoff, 0.5);
        assert_eq!(converted.exponent, 2.0);
        assert_eq!(converted.diffuse, [0.9, 0.8, 0.7]);
        assert_eq!(converted.attenuation, [1.0, 1.0, 0.0]);
        assert!(converted.dir.abs_diff_eq(DVec3::Y, 1e-12));
    }

    #[test]
    fn test_point_light_has_full_cone() {
        let config = ConversionConfig::default();
        let mut cx = Converter::new(&config);
        let converted = add_light(&mut cx, &Light::new("bulb", LightKind::Point), Pose::IDENTITY);
        assert_eq!(converted.cutoff, PI);
        assert!(!converted.castshadow);
    }

    #[test]
    fn test_unnamed_lights_numbered() {
        let config = ConversionConfig::default();
        let mut cx = Converter::new(&config);
        let light = Light::new("", LightKind::Point);
        let first = add_light(&mut cx, &light, Pose::IDENTITY);
        let second = add_light(&mut cx, &light, Pose::IDENTITY);
        assert_eq!(first.name.as_deref(), Some("unnamed_light_0"));
        assert_eq!(second.name.as_deref(), Some("unnamed_light_1"));
    }
}
