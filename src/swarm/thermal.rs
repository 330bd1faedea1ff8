//! Thermal Field
//!
//! The immutable set of rising-air columns for one run, shared read-only by
//! every glider. Radius queries use toroidal distance and can be served by a
//! `ThermalGrid` without changing their results.

use super::geometry::{distance, wrap, Scalar, Vec3};
use super::grid::ThermalGrid;
use crate::core::error::ConfigurationError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Centre of a thermal. Identity is positional equality.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thermal {
    pub x: Scalar,
    pub y: Scalar,
}

impl Thermal {
    pub fn new(x: Scalar, y: Scalar) -> Self {
        Thermal { x, y }
    }

    #[inline]
    pub fn xy(&self) -> (Scalar, Scalar) {
        (self.x, self.y)
    }
}

/// Whatever can be measured against a thermal by horizontal position.
pub trait Located {
    fn location(&self) -> (Scalar, Scalar);
}

impl Located for Thermal {
    fn location(&self) -> (Scalar, Scalar) {
        self.xy()
    }
}

/// The candidate closest to `pos`, or `None` when there are no candidates.
/// Ties resolve to the first minimiser encountered.
pub fn nearest<'a, T: Located>(pos: &Vec3, candidates: &'a [T], area_size: Scalar) -> Option<&'a T> {
    let here = (pos.x, pos.y);
    let mut best: Option<(&T, Scalar)> = None;
    for candidate in candidates {
        let d = distance(here, candidate.location(), area_size);
        match best {
            Some((_, best_d)) if best_d <= d => {}
            _ => best = Some((candidate, d)),
        }
    }
    best.map(|(t, _)| t)
}

/// Immutable thermal field.
pub struct ThermalField {
    thermals: Vec<Thermal>,
    area_size: Scalar,
    index: Option<ThermalGrid>,
}

impl ThermalField {
    /// Field from explicit thermal positions; x and y are wrapped into the area.
    pub fn new(thermals: Vec<Thermal>, area_size: Scalar) -> Result<Self, ConfigurationError> {
        if !(area_size.is_finite() && area_size > 0.0) {
            return Err(ConfigurationError::InvalidAreaSize(area_size));
        }
        let thermals = thermals
            .into_iter()
            .map(|t| Thermal::new(wrap(t.x, area_size), wrap(t.y, area_size)))
            .collect();
        Ok(ThermalField {
            thermals,
            area_size,
            index: None,
        })
    }

    /// `count` thermals placed independently and uniformly over the area.
    pub fn generate<R: Rng + ?Sized>(
        count: usize,
        area_size: Scalar,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        if !(area_size.is_finite() && area_size > 0.0) {
            return Err(ConfigurationError::InvalidAreaSize(area_size));
        }
        let thermals = (0..count)
            .map(|_| {
                Thermal::new(
                    wrap(rng.gen::<Scalar>() * area_size, area_size),
                    wrap(rng.gen::<Scalar>() * area_size, area_size),
                )
            })
            .collect();
        info!(
            "🌤️  [ThermalField] Generated {} thermals over {}x{}",
            count, area_size, area_size
        );
        Ok(ThermalField {
            thermals,
            area_size,
            index: None,
        })
    }

    /// Build a spatial index whose cells are at least `cell_size` wide.
    pub fn indexed(mut self, cell_size: Scalar) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            self.area_size
        };
        let points: Vec<(Scalar, Scalar)> = self.thermals.iter().map(Thermal::xy).collect();
        self.index = Some(ThermalGrid::build(&points, self.area_size, cell_size));
        self
    }

    pub fn thermals(&self) -> &[Thermal] {
        &self.thermals
    }

    pub fn area_size(&self) -> Scalar {
        self.area_size
    }

    pub fn len(&self) -> usize {
        self.thermals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thermals.is_empty()
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Nearest thermal of the whole field.
    pub fn nearest_in_field(&self, pos: &Vec3) -> Result<&Thermal, ConfigurationError> {
        nearest(pos, &self.thermals, self.area_size).ok_or(ConfigurationError::NoThermals)
    }

    /// Every thermal strictly closer than `radius` to `pos`, in field order.
    pub fn within(&self, pos: &Vec3, radius: Scalar) -> Vec<&Thermal> {
        let here = (pos.x, pos.y);
        match &self.index {
            Some(grid) => grid
                .candidates(pos.x, pos.y, radius)
                .into_iter()
                .map(|i| &self.thermals[i as usize])
                .filter(|t| distance(here, t.xy(), self.area_size) < radius)
                .collect(),
            None => self
                .thermals
                .iter()
                .filter(|t| distance(here, t.xy(), self.area_size) < radius)
                .collect(),
        }
    }

    /// Whether any thermal is strictly closer than `radius` to `pos`.
    pub fn any_within(&self, pos: &Vec3, radius: Scalar) -> bool {
        !self.within(pos, radius).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force_min(pos: &Vec3, field: &ThermalField) -> Scalar {
        field
            .thermals()
            .iter()
            .map(|t| distance((pos.x, pos.y), t.xy(), field.area_size()))
            .fold(Scalar::INFINITY, Scalar::min)
    }

    #[test]
    fn generated_thermals_lie_inside_the_area() {
        let mut rng = StdRng::seed_from_u64(3);
        let field = ThermalField::generate(500, 250.0, &mut rng).unwrap();
        assert_eq!(field.len(), 500);
        for t in field.thermals() {
            assert!((0.0..250.0).contains(&t.x));
            assert!((0.0..250.0).contains(&t.y));
        }
    }

    #[test]
    fn nearest_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(99);
        for &count in &[1usize, 2, 7, 50, 333, 1000] {
            let field = ThermalField::generate(count, 1000.0, &mut rng).unwrap();
            for _ in 0..50 {
                let pos = Vec3::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0), 10.0);
                let found = field.nearest_in_field(&pos).unwrap();
                let d = distance((pos.x, pos.y), found.xy(), 1000.0);
                assert_eq!(d, brute_force_min(&pos, &field));
            }
        }
    }

    #[test]
    fn nearest_sees_across_the_edge() {
        let field = ThermalField::new(
            vec![Thermal::new(990.0, 500.0), Thermal::new(30.0, 500.0)],
            1000.0,
        )
        .unwrap();
        let found = field.nearest_in_field(&Vec3::new(5.0, 500.0, 0.0)).unwrap();
        assert_eq!(*found, Thermal::new(990.0, 500.0));
    }

    #[test]
    fn nearest_on_empty_field_is_a_configuration_error() {
        let field = ThermalField::new(Vec::new(), 1000.0).unwrap();
        assert!(matches!(
            field.nearest_in_field(&Vec3::ZERO),
            Err(ConfigurationError::NoThermals)
        ));
        assert!(nearest::<Thermal>(&Vec3::ZERO, &[], 1000.0).is_none());
    }

    #[test]
    fn within_uses_strict_toroidal_radius() {
        let field = ThermalField::new(
            vec![
                Thermal::new(0.3, 500.0),
                Thermal::new(500.0, 500.0),
                Thermal::new(501.0, 500.0),
            ],
            1000.0,
        )
        .unwrap();
        let inside = field.within(&Vec3::new(999.9, 500.0, 3.0), 1.0);
        assert_eq!(inside, vec![&Thermal::new(0.3, 500.0)]);

        // Exactly on the radius is outside
        let on_edge = field.within(&Vec3::new(500.5, 500.0, 0.0), 0.5);
        assert!(on_edge.is_empty());
        assert_eq!(field.within(&Vec3::new(500.5, 500.0, 0.0), 0.6).len(), 2);
    }

    #[test]
    fn indexed_within_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(2024);
        let plain = ThermalField::generate(800, 200.0, &mut rng).unwrap();
        let indexed = ThermalField::new(plain.thermals().to_vec(), 200.0)
            .unwrap()
            .indexed(1.0);
        assert!(indexed.is_indexed());

        for _ in 0..2_000 {
            let pos = Vec3::new(rng.gen_range(0.0..200.0), rng.gen_range(0.0..200.0), 0.0);
            for radius in [0.5, 1.0, 3.0] {
                assert_eq!(plain.within(&pos, radius), indexed.within(&pos, radius));
            }
        }
    }

    #[test]
    fn rejects_non_positive_area() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            ThermalField::generate(10, 0.0, &mut rng),
            Err(ConfigurationError::InvalidAreaSize(_))
        ));
        assert!(ThermalField::new(Vec::new(), -5.0).is_err());
    }
}
