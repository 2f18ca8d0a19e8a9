use crate::config::{CityDefinition, Settings};

/// A city anchor with its proximity radius in tiles. Defined once from the
/// settings registry and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub radius: i32,
}

impl City {
    pub fn from_definition(definition: &CityDefinition) -> Self {
        City {
            name: definition.name.clone(),
            x: definition.x,
            y: definition.y,
            z: definition.z,
            radius: definition.radius,
        }
    }

    /// Squared Euclidean distance check in the (x, y) plane, integer tile
    /// semantics, no square root. The z level is intentionally not compared:
    /// spawns on other floors still count toward the city.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let dx = i64::from(x) - i64::from(self.x);
        let dy = i64::from(y) - i64::from(self.y);
        let radius = i64::from(self.radius);
        dx * dx + dy * dy <= radius * radius
    }
}

/// Registration order follows the settings file; the proximity pass depends
/// on it for its first-match assignment.
pub fn cities_from_settings(settings: &Settings) -> Vec<City> {
    settings.cities.iter().map(City::from_definition).collect()
}
