use crate::world::city::City;
use crate::world::spawn::SpawnObservation;
use std::collections::BTreeMap;

/// Aggregate fact: how many placements of one monster fall inside one city's
/// radius.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterCount {
    pub city: String,
    pub radius: i32,
    pub monster: String,
    pub count: u32,
}

/// Assigns every observation to the first city (in registration order) whose
/// radius contains it; overlapping circles never double-count and unmatched
/// observations are dropped. Rows come back sorted by (city, monster) so
/// repeated runs diff cleanly.
pub fn analyze(observations: &[SpawnObservation], cities: &[City]) -> Vec<MonsterCount> {
    let mut counts: BTreeMap<(String, String), u32> = BTreeMap::new();

    for observation in observations {
        for city in cities {
            if city.contains(observation.x, observation.y) {
                *counts
                    .entry((city.name.clone(), observation.monster.clone()))
                    .or_insert(0) += 1;
                break;
            }
        }
    }

    counts
        .into_iter()
        .map(|((city_name, monster), count)| {
            let radius = cities
                .iter()
                .find(|city| city.name == city_name)
                .map(|city| city.radius)
                .unwrap_or(0);
            MonsterCount {
                city: city_name,
                radius,
                monster,
                count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, x: i32, y: i32, radius: i32) -> City {
        City {
            name: name.to_string(),
            x,
            y,
            z: 7,
            radius,
        }
    }

    fn observation(monster: &str, x: i32, y: i32) -> SpawnObservation {
        SpawnObservation {
            monster: monster.to_string(),
            x,
            y,
            z: 7,
        }
    }

    #[test]
    fn analyze_counts_only_observations_within_radius() {
        let cities = vec![city("Sagvana", 1299, 1553, 200)];
        let observations = vec![
            observation("Rat", 1300, 1554),
            observation("Rat", 2000, 2000),
        ];
        let result = analyze(&observations, &cities);
        assert_eq!(
            result,
            vec![MonsterCount {
                city: "Sagvana".to_string(),
                radius: 200,
                monster: "Rat".to_string(),
                count: 1,
            }]
        );
    }

    #[test]
    fn analyze_assigns_overlapping_circles_to_first_registered_city() {
        let cities = vec![city("First", 0, 0, 100), city("Second", 50, 0, 100)];
        // inside both circles
        let observations = vec![observation("Wolf", 40, 0)];
        let result = analyze(&observations, &cities);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].city, "First");
        // registration order decides, so reversing it flips the winner
        let reversed: Vec<City> = cities.into_iter().rev().collect();
        let result = analyze(&observations, &reversed);
        assert_eq!(result[0].city, "Second");
    }

    #[test]
    fn analyze_emits_no_rows_for_city_without_matches() {
        let cities = vec![city("Empty", 0, 0, 10), city("Busy", 500, 500, 10)];
        let observations = vec![observation("Rat", 500, 500)];
        let result = analyze(&observations, &cities);
        assert_eq!(result.len(), 1);
        assert!(result.iter().all(|row| row.city == "Busy"));
    }

    #[test]
    fn analyze_sorts_rows_by_city_then_monster() {
        let cities = vec![city("Zeta", 1000, 1000, 50), city("Alpha", 0, 0, 50)];
        let observations = vec![
            observation("Wolf", 1000, 1000),
            observation("Bear", 1001, 1000),
            observation("Rat", 1, 0),
            observation("Rat", 0, 1),
        ];
        let result = analyze(&observations, &cities);
        let keys: Vec<(&str, &str)> = result
            .iter()
            .map(|row| (row.city.as_str(), row.monster.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("Alpha", "Rat"), ("Zeta", "Bear"), ("Zeta", "Wolf")]
        );
        assert_eq!(result[0].count, 2);
    }

    #[test]
    fn analyze_total_counts_match_assigned_observations() {
        let cities = vec![city("A", 0, 0, 100), city("B", 1000, 0, 100)];
        let mut observations = Vec::new();
        let mut state = 0x00c0_ffee_u64;
        let mut expected = 0u32;
        for _ in 0..200 {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let x = ((state >> 32) % 1500) as i32;
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let y = ((state >> 32) % 300) as i32;
            if cities.iter().any(|c| c.contains(x, y)) {
                expected += 1;
            }
            observations.push(observation("Rat", x, y));
        }
        let total: u32 = analyze(&observations, &cities)
            .iter()
            .map(|row| row.count)
            .sum();
        assert_eq!(total, expected);
    }
}
