use crate::loot::loader::LootProvider;
use crate::loot::table::MonsterLoot;
use crate::world::proximity::MonsterCount;
use std::collections::BTreeMap;

/// (city → monster → loot) for every pair the spawn aggregation produced.
/// Loot is monster-intrinsic, so the same monster near two cities indexes
/// the same table twice.
pub type LootIndex = BTreeMap<String, BTreeMap<String, MonsterLoot>>;

pub fn index_by_city_and_monster(
    spawn_counts: &[MonsterCount],
    provider: &LootProvider,
) -> LootIndex {
    let mut index: LootIndex = BTreeMap::new();

    for entry in spawn_counts {
        let monsters = index.entry(entry.city.clone()).or_default();
        if monsters.contains_key(&entry.monster) {
            continue;
        }
        if let Some(loot) = provider.loot(&entry.monster) {
            monsters.insert(entry.monster.clone(), loot.clone());
        }
    }

    // Cities whose every monster lacks loot data would otherwise linger as
    // empty maps.
    index.retain(|_, monsters| !monsters.is_empty());
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::table::LootItem;
    use std::collections::HashMap;

    fn count(city: &str, monster: &str, count: u32) -> MonsterCount {
        MonsterCount {
            city: city.to_string(),
            radius: 200,
            monster: monster.to_string(),
            count,
        }
    }

    fn provider(monsters: &[&str]) -> LootProvider {
        let mut loots = HashMap::new();
        for monster in monsters {
            loots.insert(
                monster.to_string(),
                MonsterLoot::new(*monster, vec![LootItem::leaf("gold coin", 100)]),
            );
        }
        LootProvider::new(loots)
    }

    #[test]
    fn index_includes_only_pairs_with_loot_data() {
        let counts = vec![
            count("Sagvana", "Rat", 4),
            count("Sagvana", "Ghost", 1),
            count("Agren", "Rat", 2),
        ];
        let index = index_by_city_and_monster(&counts, &provider(&["Rat"]));
        assert_eq!(index.len(), 2);
        assert!(index["Sagvana"].contains_key("Rat"));
        assert!(!index["Sagvana"].contains_key("Ghost"));
        assert!(index["Agren"].contains_key("Rat"));
    }

    #[test]
    fn index_drops_cities_with_no_loot_at_all() {
        let counts = vec![count("Ohara", "Ghost", 3)];
        let index = index_by_city_and_monster(&counts, &provider(&["Rat"]));
        assert!(index.is_empty());
    }

    #[test]
    fn index_looks_up_each_pair_once() {
        // Duplicate rows for the same pair must not change the result.
        let counts = vec![count("Sagvana", "Rat", 4), count("Sagvana", "Rat", 9)];
        let index = index_by_city_and_monster(&counts, &provider(&["Rat"]));
        assert_eq!(index["Sagvana"].len(), 1);
    }
}
