//! Leg distances
//!
//! The validator needs the length of each leg to enforce the substitution
//! thresholds. Distances come from an external collaborator through
//! `DistanceOracle`; a pair the oracle does not know is simply not checked.

use std::collections::HashMap;

use geo::{Distance, Haversine, Point};

use crate::config::DistanceConfig;

const METERS_PER_MILE: f64 = 1609.344;

/// Distance lookup capability
pub trait DistanceOracle: Send + Sync {
    /// Travel distance in miles, if known
    fn distance_between(&self, from: &str, to: &str) -> Option<f64>;
}

impl<D: DistanceOracle + ?Sized> DistanceOracle for &D {
    fn distance_between(&self, from: &str, to: &str) -> Option<f64> {
        (**self).distance_between(from, to)
    }
}

impl<D: DistanceOracle + ?Sized> DistanceOracle for std::sync::Arc<D> {
    fn distance_between(&self, from: &str, to: &str) -> Option<f64> {
        (**self).distance_between(from, to)
    }
}

/// Oracle with no distance data; every threshold check is skipped
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDistanceData;

impl DistanceOracle for NoDistanceData {
    fn distance_between(&self, _from: &str, _to: &str) -> Option<f64> {
        None
    }
}

/// Table-backed oracle
///
/// Fixed leg distances win; otherwise, when both endpoints have coordinates,
/// the great-circle distance is used. Lookups are symmetric.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    legs: HashMap<(String, String), f64>,
    coordinates: HashMap<String, Point<f64>>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DistanceConfig) -> Self {
        let mut table = Self::new();
        for leg in &config.legs {
            table.insert_leg(&leg.from, &leg.to, leg.miles);
        }
        for c in &config.coordinates {
            table.insert_coordinate(&c.name, c.lat, c.lon);
        }
        table
    }

    /// Record a fixed distance in miles
    pub fn insert_leg(&mut self, from: &str, to: &str, miles: f64) {
        self.legs.insert(key(from, to), miles);
    }

    /// Record coordinates in degrees
    pub fn insert_coordinate(&mut self, name: &str, lat: f64, lon: f64) {
        self.coordinates
            .insert(name.to_string(), Point::new(lon, lat));
    }

    /// Builder form of `insert_leg`
    pub fn with_leg(mut self, from: &str, to: &str, miles: f64) -> Self {
        self.insert_leg(from, to, miles);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty() && self.coordinates.is_empty()
    }
}

impl DistanceOracle for DistanceTable {
    fn distance_between(&self, from: &str, to: &str) -> Option<f64> {
        if from == to {
            return Some(0.0);
        }
        if let Some(miles) = self.legs.get(&key(from, to)) {
            return miles.is_finite().then_some(*miles);
        }
        let a = self.coordinates.get(from)?;
        let b = self.coordinates.get(to)?;
        let miles = Haversine.distance(*a, *b) / METERS_PER_MILE;
        miles.is_finite().then_some(miles)
    }
}

fn key(from: &str, to: &str) -> (String, String) {
    if from <= to {
        (from.to_string(), to.to_string())
    } else {
        (to.to_string(), from.to_string())
    }
}
