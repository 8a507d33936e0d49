//! Module for loading and representing Euclidean TSP instances.
//!
//! City files are plain text with one `<id> <x> <y>` triple per line. Anything
//! that does not parse as exactly such a triple (TSPLIB headers, comments, blank
//! lines) is skipped, so TSPLIB `NODE_COORD_SECTION` files load as-is.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Instances up to this many cities get a precomputed distance matrix
pub const DISTANCE_MATRIX_LIMIT: usize = 2048;

/// A city with its identifier and planar coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Identifier as written in the source (not the tour index)
    pub id: i64,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl City {
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        City { id, x, y }
    }

    /// Straight-line distance to another city
    #[inline]
    pub fn distance_to(&self, other: &City) -> f64 {
        distance(self, other)
    }
}

/// Euclidean distance between two cities
#[inline]
pub fn distance(a: &City, b: &City) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Cities read from a text source, plus how many non-blank lines were dropped
#[derive(Debug, Clone, Default)]
pub struct ParsedCities {
    pub cities: Vec<City>,
    pub skipped_lines: usize,
}

/// Parse one `<id> <x> <y>` line. Returns `None` for anything else.
fn parse_city_line(line: &str) -> Option<City> {
    let mut parts = line.split_whitespace();
    let id = parts.next()?.parse::<i64>().ok()?;
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(City::new(id, x, y))
}

/// Read cities from any buffered source.
///
/// Malformed lines are skipped; an empty result is not an error here, callers
/// decide (see [`TspInstance::new`]). Invalid UTF-8 is treated like any other
/// unparseable line.
pub fn load_cities<R: BufRead>(reader: R) -> std::io::Result<ParsedCities> {
    let mut parsed = ParsedCities::default();

    for raw in reader.split(b'\n') {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_city_line(line) {
            Some(city) => parsed.cities.push(city),
            None => parsed.skipped_lines += 1,
        }
    }

    Ok(parsed)
}

/// A complete TSP instance: a non-empty, read-only set of cities.
///
/// Only built through [`TspInstance::new`], so the city set is never empty and
/// every index below `len()` addresses a city.
#[derive(Debug, Clone, Serialize)]
pub struct TspInstance {
    /// Name of the instance (file stem when loaded from disk)
    pub name: String,
    cities: Vec<City>,
    /// Precomputed distance matrix, only for small instances
    #[serde(skip)]
    distance_matrix: Option<Vec<Vec<f64>>>,
}

impl TspInstance {
    /// Build an instance from already loaded cities.
    ///
    /// Fails with `InvalidInput` when `cities` is empty.
    pub fn new(name: impl Into<String>, cities: Vec<City>) -> Result<Self> {
        let name = name.into();
        if cities.is_empty() {
            return Err(SolverError::invalid_input(format!(
                "instance '{}' contains no cities",
                name
            )));
        }

        let mut seen = HashSet::with_capacity(cities.len());
        let duplicates = cities.iter().filter(|c| !seen.insert(c.id)).count();
        if duplicates > 0 {
            log::warn!("Instance '{}' has {} duplicate city identifiers", name, duplicates);
        }

        let distance_matrix = if cities.len() <= DISTANCE_MATRIX_LIMIT {
            Some(Self::compute_distance_matrix(&cities))
        } else {
            None
        };

        Ok(TspInstance {
            name,
            cities,
            distance_matrix,
        })
    }

    /// Parse an instance from a city file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| SolverError::source_unavailable(path, e))?;
        let parsed = load_cities(BufReader::new(file))
            .map_err(|e| SolverError::source_unavailable(path, e))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        log::debug!(
            "Parsed {} cities from {:?} ({} lines skipped)",
            parsed.cities.len(),
            path,
            parsed.skipped_lines
        );

        Self::new(name, parsed.cities)
    }

    /// Compute Euclidean distance matrix
    fn compute_distance_matrix(cities: &[City]) -> Vec<Vec<f64>> {
        let n = cities.len();
        let mut matrix = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in i + 1..n {
                let d = distance(&cities[i], &cities[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        matrix
    }

    /// Read-only view of the cities, indexable by tour position values
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn city(&self, index: usize) -> &City {
        &self.cities[index]
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Number of cities
    pub fn dimension(&self) -> usize {
        self.cities.len()
    }

    /// Always false for an instance built through `new`
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Get the distance between two cities by index
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        match &self.distance_matrix {
            Some(matrix) => matrix[i][j],
            None => distance(&self.cities[i], &self.cities[j]),
        }
    }

    /// Total cyclic length of a tour, closing edge included.
    ///
    /// `tour` must be a permutation of `0..len()`; this is not re-checked here,
    /// use [`TspInstance::check_tour`] once at setup. Tours of fewer than two
    /// cities cost 0.
    pub fn tour_cost(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let mut length = 0.0;
        for pair in tour.windows(2) {
            length += self.distance(pair[0], pair[1]);
        }

        length += self.distance(tour[tour.len() - 1], tour[0]);

        length
    }

    /// Validate that `tour` is a permutation of this instance's city indices
    pub fn check_tour(&self, tour: &[usize]) -> Result<()> {
        if tour.len() != self.len() {
            return Err(SolverError::invalid_input(format!(
                "tour has {} entries but instance '{}' has {} cities",
                tour.len(),
                self.name,
                self.len()
            )));
        }

        let mut seen = vec![false; self.len()];
        for &index in tour {
            if index >= self.len() {
                return Err(SolverError::invalid_input(format!(
                    "tour index {} is out of range for {} cities",
                    index, self.len()
                )));
            }
            if seen[index] {
                return Err(SolverError::invalid_input(format!(
                    "tour visits city index {} more than once",
                    index
                )));
            }
            seen[index] = true;
        }

        Ok(())
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for city in &self.cities {
            min_x = min_x.min(city.x);
            max_x = max_x.max(city.x);
            min_y = min_y.min(city.y);
            max_y = max_y.max(city.y);
        }

        let mut total = 0.0;
        let mut pairs = 0usize;
        let mut max_distance: f64 = 0.0;
        for i in 0..self.len() {
            for j in i + 1..self.len() {
                let d = self.distance(i, j);
                total += d;
                pairs += 1;
                max_distance = max_distance.max(d);
            }
        }
        let avg_distance = if pairs > 0 { total / pairs as f64 } else { 0.0 };

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.len(),
            min_x,
            max_x,
            min_y,
            max_y,
            avg_distance,
            max_distance,
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.dimension)?;
        writeln!(f, "  X range: [{:.2}, {:.2}]", self.min_x, self.max_x)?;
        writeln!(f, "  Y range: [{:.2}, {:.2}]", self.min_y, self.max_y)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn unit_square() -> TspInstance {
        let cities = vec![
            City::new(1, 0.0, 0.0),
            City::new(2, 0.0, 1.0),
            City::new(3, 1.0, 1.0),
            City::new(4, 1.0, 0.0),
        ];
        TspInstance::new("square", cities).unwrap()
    }

    #[test]
    fn test_distance_calculation() {
        let a = City::new(0, 0.0, 0.0);
        let b = City::new(1, 3.0, 4.0);

        assert!((distance(&a, &b) - 5.0).abs() < 1e-10);
        assert!((b.distance_to(&a) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_matrix_matches_coordinates() {
        let instance = unit_square();
        for i in 0..4 {
            for j in 0..4 {
                let direct = distance(instance.city(i), instance.city(j));
                assert!((instance.distance(i, j) - direct).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_square_perimeter() {
        let instance = unit_square();
        assert!((instance.tour_cost(&[0, 1, 2, 3]) - 4.0).abs() < 1e-12);
        let crossing = 2.0 + 2.0 * 2f64.sqrt();
        assert!((instance.tour_cost(&[0, 2, 1, 3]) - crossing).abs() < 1e-12);
    }

    #[test]
    fn test_cost_invariant_under_rotation_and_reversal() {
        let cities = vec![
            City::new(0, 2.0, 7.5),
            City::new(1, -3.0, 1.0),
            City::new(2, 8.25, 0.5),
            City::new(3, 4.0, -6.0),
            City::new(4, 0.0, 0.0),
        ];
        let instance = TspInstance::new("five", cities).unwrap();
        let tour = vec![3, 0, 4, 2, 1];
        let base = instance.tour_cost(&tour);

        for shift in 1..tour.len() {
            let mut rotated = tour.clone();
            rotated.rotate_left(shift);
            assert!((instance.tour_cost(&rotated) - base).abs() < 1e-9);
        }

        let mut reversed = tour.clone();
        reversed.reverse();
        assert!((instance.tour_cost(&reversed) - base).abs() < 1e-9);
    }

    #[test]
    fn test_single_city_costs_nothing() {
        let instance = TspInstance::new("solo", vec![City::new(7, 3.0, 4.0)]).unwrap();
        assert_eq!(instance.tour_cost(&[0]), 0.0);
    }

    #[test]
    fn test_large_instance_computes_on_the_fly() {
        let cities: Vec<City> = (0..DISTANCE_MATRIX_LIMIT + 1)
            .map(|i| City::new(i as i64, i as f64, 0.0))
            .collect();
        let instance = TspInstance::new("line", cities).unwrap();
        assert!(instance.distance_matrix.is_none());
        assert!((instance.distance(0, 10) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_instance_rejected() {
        let err = TspInstance::new("empty", Vec::new()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let text = "NAME: demo\nTYPE : TSP\nNODE_COORD_SECTION\n\
                    1 0.0 0.0\n2 3 4\nbad line here\n3 1.5\n4 1 2 3\n5 nan 1\n  6   -1.5e1   2.0  \nEOF\n";
        let parsed = load_cities(Cursor::new(text)).unwrap();

        assert_eq!(parsed.cities.len(), 3);
        assert_eq!(parsed.cities[1], City::new(2, 3.0, 4.0));
        assert_eq!(parsed.cities[2], City::new(6, -15.0, 2.0));
        assert_eq!(parsed.skipped_lines, 8);
    }

    #[test]
    fn test_garbage_source_yields_empty_set() {
        let parsed = load_cities(Cursor::new("foo\nbar baz\n1 2\n")).unwrap();
        assert!(parsed.cities.is_empty());
        assert!(TspInstance::new("garbage", parsed.cities).is_err());
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let bytes: Vec<u8> = b"\xff\xfe 1 2\n1 0 0\n".to_vec();
        let parsed = load_cities(Cursor::new(bytes)).unwrap();
        assert_eq!(parsed.cities.len(), 1);
        assert_eq!(parsed.skipped_lines, 1);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".tsp").tempfile().unwrap();
        writeln!(file, "NAME: tiny").unwrap();
        writeln!(file, "1 0 0").unwrap();
        writeln!(file, "2 0 1").unwrap();
        file.flush().unwrap();

        let instance = TspInstance::from_file(file.path()).unwrap();
        assert_eq!(instance.dimension(), 2);
        assert!((instance.tour_cost(&[0, 1]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_file_all_garbage_is_invalid_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "nothing to see").unwrap();
        file.flush().unwrap();

        let err = TspInstance::from_file(file.path()).unwrap_err();
        assert!(matches!(err, SolverError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = TspInstance::from_file(dir.path().join("missing.tsp")).unwrap_err();
        assert!(matches!(err, SolverError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_check_tour() {
        let instance = unit_square();
        assert!(instance.check_tour(&[2, 0, 3, 1]).is_ok());
        assert!(instance.check_tour(&[0, 1, 2]).is_err());
        assert!(instance.check_tour(&[0, 1, 2, 2]).is_err());
        assert!(instance.check_tour(&[0, 1, 2, 4]).is_err());
    }

    #[test]
    fn test_check_tour_bounds_follow_city_count() {
        let cities = vec![City::new(1, 0.0, 0.0), City::new(2, 3.0, 4.0)];
        let instance = TspInstance::new("pair", cities).unwrap();

        assert_eq!(instance.dimension(), instance.cities().len());
        assert!(matches!(instance.check_tour(&[0, 1, 2]), Err(SolverError::InvalidInput(_))));
        assert!(matches!(instance.check_tour(&[0, 2]), Err(SolverError::InvalidInput(_))));
        assert!(instance.check_tour(&[1, 0]).is_ok());
    }

    #[test]
    fn test_statistics() {
        let stats = unit_square().statistics();
        assert_eq!(stats.dimension, 4);
        assert!((stats.max_distance - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats.max_x, 1.0);
        assert!(stats.to_string().contains("Cities: 4"));
    }
}
