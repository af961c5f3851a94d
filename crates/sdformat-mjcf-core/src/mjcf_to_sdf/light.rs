use crate::math::Pose;
use crate::mjcf;
use crate::sdf::{Attenuation, Light, LightKind, SemanticPose, Spot};

use super::{Exporter, ns};

fn rgba(rgb: [f64; 3]) -> [f64; 4] {
    [rgb[0], rgb[1], rgb[2], 1.0]
}

/// Convert a light. Non-directional MuJoCo lights are spot lights.
pub(crate) fn light_to_sdf(cx: &mut Exporter, light: &mjcf::Light) -> Light {
    let name = match &light.name {
        Some(name) => cx.names.claim(ns::LIGHT, name),
        None => cx.names.next_unnamed(ns::LIGHT, "unnamed_light"),
    };
    let kind = if light.directional {
        LightKind::Directional
    } else {
        LightKind::Spot
    };

    let mut converted = Light::new(name, kind);
    converted.pose = SemanticPose::new(Pose::from_position(light.pos));
    converted.direction = light.dir;
    converted.diffuse = rgba(light.diffuse);
    converted.specular = rgba(light.specular);
    converted.cast_shadows = light.castshadow;
    let [constant, linear, quadratic] = light.attenuation;
    converted.attenuation = Attenuation {
        constant,
        linear,
        quadratic,
        ..Default::default()
    };
    if kind == LightKind::Spot {
        converted.spot = Spot {
            inner_angle: 0.0,
            outer_angle: light.cutoff,
            falloff: light.exponent,
        };
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use crate::mjcf::Mujoco;
    use approx::assert_relative_eq;
    use glam::DVec3;

    #[test]
    fn test_spot_and_directional() {
        let mujoco = Mujoco::from_xml(
            r#"<mujoco><worldbody>
                 <light name="spot" pos="0 0 2" dir="0 1 0" cutoff="30" exponent="5" castshadow="false"/>
                 <light directional="true" diffuse="0.2 0.3 0.4"/>
               </worldbody></mujoco>"#,
        )
        .unwrap();
        let config = ConversionConfig::default();
        let mut cx = Exporter::new(&mujoco, &config);

        let spot = light_to_sdf(&mut cx, &mujoco.worldbody.lights[0]);
        assert_eq!(spot.kind, LightKind::Spot);
        assert_eq!(spot.pose.pose.position, DVec3::new(0.0, 0.0, 2.0));
        assert_eq!(spot.direction, DVec3::Y);
        assert_relative_eq!(spot.spot.outer_angle, 30f64.to_radians(), epsilon = 1e-12);
        assert_eq!(spot.spot.falloff, 5.0);
        assert!(!spot.cast_shadows);
        assert_eq!(spot.attenuation.constant, 1.0);
        assert_eq!(spot.attenuation.linear, 0.0);

        let sun = light_to_sdf(&mut cx, &mujoco.worldbody.lights[1]);
        assert_eq!(sun.name, "unnamed_light_0");
        assert_eq!(sun.kind, LightKind::Directional);
        assert_eq!(sun.diffuse, [0.2, 0.3, 0.4, 1.0]);
    }
}
