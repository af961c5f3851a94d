//! Body mass properties
//!
//! Bodies without `<inertial>` get their mass and inertia from their geoms,
//! using the same primitive formulas MuJoCo's compiler uses. Geom inertias
//! are rotated into the body frame and combined about the common center of
//! mass.

use std::f64::consts::PI;

use glam::{DMat3, DVec3};

use crate::math::{parallel_axis, rotate_inertia};

use super::{Body, Geom, GeomKind, InertiaFromGeom, Inertial};

/// Mass properties of a body.
///
/// Returns the explicit `<inertial>` unless the compiler forces geom
/// inertia, otherwise the geom-derived properties. `None` when the body has
/// no mass.
pub fn body_inertial(body: &Body, density: f64, mode: InertiaFromGeom) -> Option<Inertial> {
    let inertial = match (mode, &body.inertial) {
        (InertiaFromGeom::True, _) => inertial_from_geoms(&body.geoms, density),
        (_, Some(inertial)) => Some(inertial.clone()),
        (InertiaFromGeom::False, None) => None,
        (InertiaFromGeom::Auto, None) => inertial_from_geoms(&body.geoms, density),
    };
    inertial.filter(|inertial| inertial.mass > 0.0)
}

/// Combine the mass properties of a set of geoms
pub fn inertial_from_geoms(geoms: &[Geom], default_density: f64) -> Option<Inertial> {
    let parts: Vec<(f64, DVec3, DMat3)> = geoms
        .iter()
        .filter_map(|geom| geom_mass_properties(geom, default_density))
        .collect();

    let mass: f64 = parts.iter().map(|(m, _, _)| m).sum();
    if mass <= 0.0 {
        return None;
    }

    let com = parts.iter().map(|(m, c, _)| *c * *m).sum::<DVec3>() / mass;
    let inertia = parts
        .iter()
        .map(|(m, c, i)| *i + parallel_axis(*m, *c - com))
        .fold(DMat3::ZERO, |acc, i| acc + i);

    Some(Inertial {
        pos: com,
        mass,
        inertia,
    })
}

/// Mass, center and body-frame inertia (about the geom center) of one geom
fn geom_mass_properties(geom: &Geom, default_density: f64) -> Option<(f64, DVec3, DMat3)> {
    let volume = geom_volume(geom)?;
    let mass = geom
        .mass
        .unwrap_or_else(|| geom.density.unwrap_or(default_density) * volume);
    if mass <= 0.0 {
        return None;
    }

    let local = DMat3::from_diagonal(unit_inertia(geom, mass));
    let frame = geom.frame();
    Some((mass, frame.position, rotate_inertia(frame.rotation, local)))
}

fn geom_volume(geom: &Geom) -> Option<f64> {
    let s0 = geom.size_at(0);
    match geom.kind {
        GeomKind::Sphere => Some(4.0 / 3.0 * PI * s0.powi(3)),
        GeomKind::Capsule => {
            let height = 2.0 * geom.half_length();
            Some(PI * s0 * s0 * (4.0 / 3.0 * s0 + height))
        }
        GeomKind::Cylinder => Some(PI * s0 * s0 * 2.0 * geom.half_length()),
        GeomKind::Ellipsoid => {
            let [a, b, c] = geom.half_extents();
            Some(4.0 / 3.0 * PI * a * b * c)
        }
        GeomKind::Box => {
            let [a, b, c] = geom.half_extents();
            Some(8.0 * a * b * c)
        }
        GeomKind::Plane | GeomKind::Hfield | GeomKind::Sdf => None,
        GeomKind::Mesh => {
            tracing::warn!(
                "Skipping mass of mesh geom '{}'; mesh inertia is not computed",
                geom.name.as_deref().unwrap_or("unnamed")
            );
            None
        }
    }
}

/// Principal moments in the geom frame
fn unit_inertia(geom: &Geom, mass: f64) -> DVec3 {
    let r = geom.size_at(0);
    match geom.kind {
        GeomKind::Sphere => DVec3::splat(2.0 / 5.0 * mass * r * r),
        GeomKind::Capsule => {
            let h = 2.0 * geom.half_length();
            let sphere_mass = mass * 4.0 * r / (4.0 * r + 3.0 * h);
            let cylinder_mass = mass - sphere_mass;
            let side = cylinder_mass * (3.0 * r * r + h * h) / 12.0
                + sphere_mass * (2.0 * r * r / 5.0 + h * h / 4.0 + 3.0 * h * r / 8.0);
            let axial = cylinder_mass * r * r / 2.0 + sphere_mass * 2.0 * r * r / 5.0;
            DVec3::new(side, side, axial)
        }
        GeomKind::Cylinder => {
            let h = 2.0 * geom.half_length();
            let side = mass * (3.0 * r * r + h * h) / 12.0;
            DVec3::new(side, side, mass * r * r / 2.0)
        }
        GeomKind::Ellipsoid => {
            let [a, b, c] = geom.half_extents();
            DVec3::new(
                mass * (b * b + c * c) / 5.0,
                mass * (a * a + c * c) / 5.0,
                mass * (a * a + b * b) / 5.0,
            )
        }
        GeomKind::Box => {
            let [a, b, c] = geom.half_extents();
            DVec3::new(
                mass * (b * b + c * c) / 3.0,
                mass * (a * a + c * c) / 3.0,
                mass * (a * a + b * b) / 3.0,
            )
        }
        GeomKind::Plane | GeomKind::Hfield | GeomKind::Sdf | GeomKind::Mesh => DVec3::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mat_at;
    use approx::assert_relative_eq;
    use glam::DQuat;

    fn geom(kind: GeomKind, size: &[f64]) -> Geom {
        Geom::new(kind, size.to_vec())
    }

    #[test]
    fn test_sphere_and_box() {
        let sphere = inertial_from_geoms(&[geom(GeomKind::Sphere, &[0.1])], 1000.0).unwrap();
        let mass = 1000.0 * 4.0 / 3.0 * PI * 0.001;
        assert_relative_eq!(sphere.mass, mass, epsilon = 1e-9);
        assert_relative_eq!(mat_at(&sphere.inertia, 0, 0), 0.4 * mass * 0.01, epsilon = 1e-12);

        let mut cube = geom(GeomKind::Box, &[0.5, 0.5, 0.5]);
        cube.mass = Some(6.0);
        let cube = inertial_from_geoms(&[cube], 1000.0).unwrap();
        assert_eq!(cube.mass, 6.0);
        // m (2a)^2 * 2 / 12 with a = 0.5
        assert_relative_eq!(mat_at(&cube.inertia, 2, 2), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_capsule_matches_mujoco() {
        let mut capsule = geom(GeomKind::Capsule, &[0.1, 0.2]);
        capsule.mass = Some(1.0);
        let inertial = inertial_from_geoms(&[capsule], 1000.0).unwrap();
        let (r, h) = (0.1, 0.4);
        let sphere_mass = 4.0 * r / (4.0 * r + 3.0 * h);
        let cylinder_mass = 1.0 - sphere_mass;
        let expected_side = cylinder_mass * (3.0 * r * r + h * h) / 12.0
            + sphere_mass * (0.4 * r * r + h * h / 4.0 + 3.0 * h * r / 8.0);
        assert_relative_eq!(mat_at(&inertial.inertia, 0, 0), expected_side, epsilon = 1e-12);
        assert_relative_eq!(
            mat_at(&inertial.inertia, 2, 2),
            cylinder_mass * r * r / 2.0 + sphere_mass * 0.4 * r * r,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_parallel_axis_combination() {
        let mut a = geom(GeomKind::Sphere, &[0.1]);
        a.mass = Some(1.0);
        a.pos = DVec3::new(1.0, 0.0, 0.0);
        let mut b = a.clone();
        b.pos = DVec3::new(-1.0, 0.0, 0.0);
        let inertial = inertial_from_geoms(&[a, b], 1000.0).unwrap();
        assert_eq!(inertial.mass, 2.0);
        assert!(inertial.pos.abs_diff_eq(DVec3::ZERO, 1e-12));
        let point = 0.4 * 0.01;
        assert_relative_eq!(mat_at(&inertial.inertia, 0, 0), 2.0 * point, epsilon = 1e-12);
        assert_relative_eq!(mat_at(&inertial.inertia, 1, 1), 2.0 * point + 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fromto_cylinder_along_x() {
        let mut cylinder = geom(GeomKind::Cylinder, &[0.1]);
        cylinder.fromto = Some([0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        cylinder.mass = Some(1.0);
        let inertial = inertial_from_geoms(&[cylinder], 1000.0).unwrap();
        assert!(inertial.pos.abs_diff_eq(DVec3::new(0.5, 0.0, 0.0), 1e-12));
        // the long axis is X, so Ixx is the axial moment
        assert_relative_eq!(mat_at(&inertial.inertia, 0, 0), 0.01 / 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            mat_at(&inertial.inertia, 1, 1),
            (3.0 * 0.01 + 1.0) / 12.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_explicit_inertial_and_modes() {
        let mut body = Body::new("b");
        body.geoms.push(geom(GeomKind::Sphere, &[0.1]));
        body.inertial = Some(Inertial {
            pos: DVec3::ZERO,
            mass: 3.0,
            inertia: DMat3::IDENTITY,
        });
        assert_eq!(body_inertial(&body, 1000.0, InertiaFromGeom::Auto).unwrap().mass, 3.0);
        assert!(body_inertial(&body, 1000.0, InertiaFromGeom::True).unwrap().mass < 3.0);

        body.inertial = None;
        assert!(body_inertial(&body, 1000.0, InertiaFromGeom::False).is_none());
    }

    #[test]
    fn test_planes_have_no_mass() {
        let mut body = Body::new("b");
        let mut plane = geom(GeomKind::Plane, &[1.0, 1.0, 0.1]);
        plane.quat = DQuat::from_rotation_x(0.3);
        body.geoms.push(plane);
        assert!(body_inertial(&body, 1000.0, InertiaFromGeom::Auto).is_none());
    }
}
