//! Rigid-transform helpers.
//!
//! [`RigidTransform`] is an [`Isometry3<f64>`]: a unit-quaternion rotation
//! plus a translation.  Composition is `a * b` (apply `b` first, expressed in
//! `a`'s frame) and inversion is `a.inverse()`.  The helpers here cover the
//! conversions the rest of the workspace needs: XYZ/RPY construction and
//! tolerance comparison.
//!
//! ```
//! use kinbridge_frames::pose::{from_xyz_rpy, approx_eq};
//!
//! let a = from_xyz_rpy([1.0, 0.0, 0.0], [0.0, 0.0, std::f64::consts::FRAC_PI_2]);
//! let b = from_xyz_rpy([0.5, 0.0, 0.0], [0.0, 0.0, 0.0]);
//!
//! // b expressed in a's frame lands at (1.0, 0.5, 0.0).
//! let c = a * b;
//! let expected = from_xyz_rpy([1.0, 0.5, 0.0], [0.0, 0.0, std::f64::consts::FRAC_PI_2]);
//! assert!(approx_eq(&c, &expected, 1e-9));
//! assert!(approx_eq(&(c.inverse() * c), &nalgebra::Isometry3::identity(), 1e-9));
//! ```

use nalgebra::{Isometry3, Translation3, UnitQuaternion};

/// Orientation + position in 3-D Euclidean space.
pub type RigidTransform = Isometry3<f64>;

/// Build a transform from a translation and roll/pitch/yaw angles
/// (`R = Rz(yaw) * Ry(pitch) * Rx(roll)`).
pub fn from_xyz_rpy(xyz: [f64; 3], rpy: [f64; 3]) -> RigidTransform {
    Isometry3::from_parts(
        Translation3::new(xyz[0], xyz[1], xyz[2]),
        UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]),
    )
}

/// Split a transform into translation and roll/pitch/yaw angles.
pub fn to_xyz_rpy(pose: &RigidTransform) -> ([f64; 3], [f64; 3]) {
    let t = pose.translation.vector;
    let (roll, pitch, yaw) = pose.rotation.euler_angles();
    ([t.x, t.y, t.z], [roll, pitch, yaw])
}

/// Translational and angular distance between two transforms.
pub fn distance(a: &RigidTransform, b: &RigidTransform) -> (f64, f64) {
    let translation = (a.translation.vector - b.translation.vector).norm();
    // atan2 keeps full precision for nearly identical rotations.
    let delta = a.rotation.inverse() * b.rotation;
    let angle = 2.0 * delta.imag().norm().atan2(delta.scalar().abs());
    (translation, angle)
}

/// Whether `a` and `b` agree within `tolerance` in both position (meters) and
/// orientation (radians).
pub fn approx_eq(a: &RigidTransform, b: &RigidTransform, tolerance: f64) -> bool {
    let (translation, angle) = distance(a, b);
    translation <= tolerance && angle <= tolerance
}
