//! Pose and rotation helpers shared by both converters
//!
//! Angles are radians, rotations are unit quaternions. Roll/pitch/yaw follow
//! the SDFormat convention: rotations about the fixed X, Y, then Z axes,
//! which is `R = Rz(yaw) * Ry(pitch) * Rx(roll)`.

use std::ops::Mul;

use glam::{DMat3, DQuat, DVec3, EulerRot};

/// Tolerance used when deciding if a pose component can be omitted
pub const EPSILON: f64 = 1e-12;

/// Rigid transform (position and orientation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            rotation: DQuat::IDENTITY,
        }
    }

    /// Build a pose from a position and roll/pitch/yaw (radians)
    pub fn from_xyz_rpy(xyz: [f64; 3], rpy: [f64; 3]) -> Self {
        Self {
            position: DVec3::from(xyz),
            rotation: rpy_to_quat(rpy),
        }
    }

    /// Roll, pitch, yaw in radians
    pub fn rpy(&self) -> [f64; 3] {
        quat_to_rpy(self.rotation)
    }

    /// `self * other`: express `other` (given in this frame) in the parent frame
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * other.position,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            position: -(rotation * self.position),
            rotation,
        }
    }

    /// This pose expressed in the frame of `base` (`base⁻¹ * self`)
    pub fn relative_to(&self, base: &Pose) -> Pose {
        base.inverse().compose(self)
    }

    /// Map a point from this frame into the parent frame
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.position + self.rotation * point
    }

    pub fn is_identity(&self) -> bool {
        self.position.abs_diff_eq(DVec3::ZERO, EPSILON) && is_identity_rotation(self.rotation)
    }
}

impl Mul for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        self.compose(&rhs)
    }
}

/// Roll/pitch/yaw (radians) to quaternion
pub fn rpy_to_quat(rpy: [f64; 3]) -> DQuat {
    DQuat::from_euler(EulerRot::ZYX, rpy[2], rpy[1], rpy[0])
}

/// Quaternion to roll/pitch/yaw (radians)
pub fn quat_to_rpy(rotation: DQuat) -> [f64; 3] {
    let (yaw, pitch, roll) = rotation.normalize().to_euler(EulerRot::ZYX);
    [roll, pitch, yaw]
}

/// Both `q` and `-q` describe the same rotation
pub fn is_identity_rotation(rotation: DQuat) -> bool {
    rotation.abs_diff_eq(DQuat::IDENTITY, EPSILON) || rotation.abs_diff_eq(-DQuat::IDENTITY, EPSILON)
}

/// Error returned for malformed euler sequences
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid euler sequence '{0}': expected three characters from xyzXYZ")]
pub struct EulerSeqError(pub String);

/// Compose a rotation from three angles following a MuJoCo `eulerseq`.
///
/// Lowercase axes rotate with the frame, uppercase axes stay fixed.
pub fn euler_to_quat(angles: [f64; 3], seq: &str) -> Result<DQuat, EulerSeqError> {
    let axes: Vec<char> = seq.chars().collect();
    if axes.len() != 3 {
        return Err(EulerSeqError(seq.to_string()));
    }

    let mut result = DQuat::IDENTITY;
    for (axis, angle) in axes.iter().zip(angles) {
        let unit = match axis.to_ascii_lowercase() {
            'x' => DVec3::X,
            'y' => DVec3::Y,
            'z' => DVec3::Z,
            _ => return Err(EulerSeqError(seq.to_string())),
        };
        let step = DQuat::from_axis_angle(unit, angle);
        result = if axis.is_ascii_lowercase() {
            result * step
        } else {
            step * result
        };
    }
    Ok(result.normalize())
}

/// Minimal rotation taking +Z onto `dir`
pub fn quat_from_z_to(dir: DVec3) -> DQuat {
    let dir = dir.normalize_or_zero();
    if dir == DVec3::ZERO {
        return DQuat::IDENTITY;
    }
    if dir.dot(DVec3::Z) < -1.0 + 1e-9 {
        return DQuat::from_rotation_x(std::f64::consts::PI);
    }
    DQuat::from_rotation_arc(DVec3::Z, dir)
}

/// Rotation whose X and Y axes are the given (not necessarily orthogonal) vectors
pub fn quat_from_xy_axes(x: DVec3, y: DVec3) -> DQuat {
    let x = x.normalize_or_zero();
    // Gram-Schmidt, as MuJoCo does for xyaxes
    let y = (y - x * x.dot(y)).normalize_or_zero();
    if x == DVec3::ZERO || y == DVec3::ZERO {
        return DQuat::IDENTITY;
    }
    let z = x.cross(y);
    DQuat::from_mat3(&DMat3::from_cols(x, y, z)).normalize()
}

/// Express an inertia tensor in a rotated frame (`R * I * Rᵀ`)
pub fn rotate_inertia(rotation: DQuat, inertia: DMat3) -> DMat3 {
    let r = DMat3::from_quat(rotation);
    r * inertia * r.transpose()
}

/// Inertia contribution of a point mass at `offset` (parallel axis theorem)
pub fn parallel_axis(mass: f64, offset: DVec3) -> DMat3 {
    let d2 = offset.length_squared();
    let outer = DMat3::from_cols(offset * offset.x, offset * offset.y, offset * offset.z);
    (DMat3::from_diagonal(DVec3::splat(d2)) - outer) * mass
}

/// Element `(row, col)` of a 3x3 matrix
pub fn mat_at(m: &DMat3, row: usize, col: usize) -> f64 {
    m.col(col)[row]
}

/// Symmetric matrix from `ixx iyy izz ixy ixz iyz`
pub fn inertia_from_components(c: [f64; 6]) -> DMat3 {
    let [ixx, iyy, izz, ixy, ixz, iyz] = c;
    DMat3::from_cols(
        DVec3::new(ixx, ixy, ixz),
        DVec3::new(ixy, iyy, iyz),
        DVec3::new(ixz, iyz, izz),
    )
}

/// `ixx iyy izz ixy ixz iyz` of a (symmetric) inertia matrix
pub fn inertia_components(m: &DMat3) -> [f64; 6] {
    [
        mat_at(m, 0, 0),
        mat_at(m, 1, 1),
        mat_at(m, 2, 2),
        mat_at(m, 0, 1),
        mat_at(m, 0, 2),
        mat_at(m, 1, 2),
    ]
}

/// Frame change between SDFormat and MuJoCo cameras.
///
/// SDFormat cameras look along +X with +Z up; MuJoCo cameras look along -Z
/// with +Y up. The returned rotation maps SDFormat camera axes into the
/// MuJoCo camera frame, so `mujoco_pose * rotation` is the SDFormat pose.
pub fn sdf_camera_in_mujoco_camera() -> DQuat {
    DQuat::from_mat3(&DMat3::from_cols(
        DVec3::new(0.0, 0.0, -1.0),
        DVec3::new(-1.0, 0.0, 0.0),
        DVec3::new(0.0, 1.0, 0.0),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4};

    #[test]
    fn test_rpy_round_trip() {
        let pose = Pose::from_xyz_rpy([1.0, 2.0, 3.0], [FRAC_PI_2, FRAC_PI_3, FRAC_PI_4]);
        let rpy = pose.rpy();
        assert_relative_eq!(rpy[0], FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(rpy[1], FRAC_PI_3, epsilon = 1e-9);
        assert_relative_eq!(rpy[2], FRAC_PI_4, epsilon = 1e-9);
    }

    #[test]
    fn test_rpy_is_fixed_axis() {
        // yaw of 90 degrees takes +X to +Y regardless of roll applied first
        let q = rpy_to_quat([FRAC_PI_2, 0.0, FRAC_PI_2]);
        let x = q * DVec3::X;
        assert_relative_eq!(x.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_compose_and_inverse() {
        let a = Pose::from_xyz_rpy([1.0, 0.0, 0.0], [0.0, 0.0, FRAC_PI_2]);
        let b = Pose::from_position(DVec3::new(1.0, 0.0, 0.0));
        let c = a * b;
        assert_relative_eq!(c.position.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.position.y, 1.0, epsilon = 1e-12);

        let back = c.relative_to(&a);
        assert!(back.position.abs_diff_eq(b.position, 1e-12));
        assert!((a * a.inverse()).is_identity());
    }

    #[test]
    fn test_euler_seq_extrinsic_matches_rpy() {
        let angles = [0.3, -0.2, 1.1];
        let q = euler_to_quat(angles, "XYZ").unwrap();
        assert!(q.abs_diff_eq(rpy_to_quat(angles), 1e-12));
    }

    #[test]
    fn test_euler_seq_intrinsic() {
        let angles = [0.3, -0.2, 1.1];
        let q = euler_to_quat(angles, "xyz").unwrap();
        let expected = DQuat::from_euler(EulerRot::XYZ, 0.3, -0.2, 1.1);
        assert!(q.abs_diff_eq(expected, 1e-12) || q.abs_diff_eq(-expected, 1e-12));
    }

    #[test]
    fn test_euler_seq_invalid() {
        assert!(euler_to_quat([0.0; 3], "xy").is_err());
        assert!(euler_to_quat([0.0; 3], "xyw").is_err());
    }

    #[test]
    fn test_quat_from_z_to() {
        let q = quat_from_z_to(DVec3::new(1.0, 0.0, 0.0));
        assert!((q * DVec3::Z).abs_diff_eq(DVec3::X, 1e-12));

        let flipped = quat_from_z_to(DVec3::new(0.0, 0.0, -2.0));
        assert!((flipped * DVec3::Z).abs_diff_eq(-DVec3::Z, 1e-12));
    }

    #[test]
    fn test_rotate_inertia() {
        let inertia = DMat3::from_diagonal(DVec3::new(1.0, 2.0, 3.0));
        let rotated = rotate_inertia(DQuat::from_rotation_z(FRAC_PI_2), inertia);
        assert_relative_eq!(mat_at(&rotated, 0, 0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(mat_at(&rotated, 1, 1), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mat_at(&rotated, 2, 2), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_axis() {
        let shift = parallel_axis(2.0, DVec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(mat_at(&shift, 0, 0), 2.0);
        assert_relative_eq!(mat_at(&shift, 1, 1), 2.0);
        assert_relative_eq!(mat_at(&shift, 2, 2), 0.0);
    }

    #[test]
    fn test_inertia_components_round_trip() {
        let c = [1.0, 2.0, 3.0, 0.1, 0.2, 0.3];
        assert_eq!(inertia_components(&inertia_from_components(c)), c);
    }

    #[test]
    fn test_camera_axes() {
        let q = sdf_camera_in_mujoco_camera();
        // SDFormat forward (+X) is MuJoCo -Z, SDFormat up (+Z) is MuJoCo +Y
        assert!((q * DVec3::X).abs_diff_eq(-DVec3::Z, 1e-12));
        assert!((q * DVec3::Z).abs_diff_eq(DVec3::Y, 1e-12));
    }
}
