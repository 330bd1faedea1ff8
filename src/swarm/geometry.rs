//! Toroidal Geometry
//!
//! Wraparound and shortest-path primitives for a square area whose x and y
//! axes are periodic. Altitude is never wrapped.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// Numeric representation shared by every component of the simulation.
pub type Scalar = f64;

/// A point or a velocity in (x, y, z). `z` is altitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: Scalar,
    pub y: Scalar,
    pub z: Scalar,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Vec3 { x, y, z }
    }

    /// Horizontal magnitude `sqrt(x² + y²)`.
    #[inline]
    pub fn xy_norm(&self) -> Scalar {
        self.x.hypot(self.y)
    }

    /// `self + other * factor`, all three axes.
    #[inline]
    pub fn add_scaled(&self, other: &Vec3, factor: Scalar) -> Vec3 {
        Vec3 {
            x: self.x + other.x * factor,
            y: self.y + other.y * factor,
            z: self.z + other.z * factor,
        }
    }
}

/// `v mod size`, always in `[0, size)`.
#[inline]
pub fn wrap(v: Scalar, size: Scalar) -> Scalar {
    let r = v.rem_euclid(size);
    // rem_euclid of a tiny negative value can round up to `size` itself
    if r >= size {
        0.0
    } else {
        r
    }
}

/// Signed shortest displacement from `a` to `b` on a circle of circumference `size`.
#[inline]
pub fn toroidal_delta(a: Scalar, b: Scalar, size: Scalar) -> Scalar {
    let direct = b - a;
    if direct.abs() > size * 0.5 {
        if direct > 0.0 {
            direct - size
        } else {
            direct + size
        }
    } else {
        direct
    }
}

/// Horizontal toroidal displacement `(dx, dy)` from `from` to `to`.
#[inline]
pub fn toroidal_offset(from: (Scalar, Scalar), to: (Scalar, Scalar), size: Scalar) -> (Scalar, Scalar) {
    (
        toroidal_delta(from.0, to.0, size),
        toroidal_delta(from.1, to.1, size),
    )
}

/// Shortest horizontal distance between two points of the torus.
#[inline]
pub fn distance(a: (Scalar, Scalar), b: (Scalar, Scalar), area_size: Scalar) -> Scalar {
    let (dx, dy) = toroidal_offset(a, b, area_size);
    dx.hypot(dy)
}

/// Horizontal vector of length `magnitude` pointing along the shortest path
/// from `from` to `to`. Coincident points yield the zero vector.
pub fn direction_toward(
    from: (Scalar, Scalar),
    to: (Scalar, Scalar),
    magnitude: Scalar,
    area_size: Scalar,
) -> (Scalar, Scalar) {
    let (dx, dy) = toroidal_offset(from, to, area_size);
    let length = dx.hypot(dy);
    if length == 0.0 {
        trace!(?from, ?to, "degenerate direction between coincident points");
        return (0.0, 0.0);
    }
    let scale = magnitude / length;
    (dx * scale, dy * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const AREA: Scalar = 1000.0;

    #[test]
    fn wrap_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let v = rng.gen_range(-1.0e6..1.0e6);
            let w = wrap(v, AREA);
            assert!((0.0..AREA).contains(&w), "wrap({v}) = {w}");
        }
        assert_eq!(wrap(-1.0e-17, AREA), 0.0);
        assert_eq!(wrap(AREA, AREA), 0.0);
        assert_eq!(wrap(-1.0, AREA), 999.0);
        assert_eq!(wrap(1250.0, AREA), 250.0);
    }

    #[test]
    fn delta_takes_the_short_way_round() {
        assert_eq!(toroidal_delta(10.0, 20.0, AREA), 10.0);
        assert_eq!(toroidal_delta(10.0, 990.0, AREA), -20.0);
        assert_eq!(toroidal_delta(990.0, 10.0, AREA), 20.0);
        assert_eq!(toroidal_delta(0.0, 500.0, AREA), 500.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..5_000 {
            let a = (rng.gen_range(0.0..AREA), rng.gen_range(0.0..AREA));
            let b = (rng.gen_range(0.0..AREA), rng.gen_range(0.0..AREA));
            assert_eq!(distance(a, b, AREA), distance(b, a, AREA));
            assert!(distance(a, b, AREA) <= AREA * std::f64::consts::FRAC_1_SQRT_2 + 1e-9);
        }
    }

    #[test]
    fn distance_across_the_edge() {
        let d = distance((1.0, 1.0), (999.0, 999.0), AREA);
        assert!((d - 8.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn direction_has_requested_magnitude() {
        let (vx, vy) = direction_toward((995.0, 500.0), (5.0, 500.0), 1.0, AREA);
        assert!((vx - 1.0).abs() < 1e-12);
        assert_eq!(vy, 0.0);

        let (vx, vy) = direction_toward((100.0, 100.0), (130.0, 140.0), 2.5, AREA);
        assert!(((vx * vx + vy * vy).sqrt() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn direction_between_coincident_points_is_zero() {
        assert_eq!(direction_toward((42.0, 7.0), (42.0, 7.0), 1.0, AREA), (0.0, 0.0));
    }

    #[test]
    fn altitude_is_not_wrapped_by_integration() {
        let p = Vec3::new(10.0, 10.0, -5000.0).add_scaled(&Vec3::new(0.0, 0.0, -1.0), 0.5);
        assert_eq!(p.z, -5000.5);
    }
}
