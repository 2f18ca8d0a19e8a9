use crate::loot::index::LootIndex;
use crate::pricing::baseline::{resolve_baseline, PriceKind};
use crate::world::proximity::MonsterCount;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Loot pressure at which the market counts as fully saturated. Calibration
/// constant, not derived.
const PRESSURE_SATURATION: f64 = 100_000.0;

const BUY_DISCOUNT: f64 = 0.3;
const SELL_MARKUP: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricePair {
    pub buy: Option<i64>,
    pub sell: Option<i64>,
}

/// item name (lowercased) → city → suggested prices. Rebuilt from scratch on
/// every run.
pub type SuggestionTable = BTreeMap<String, BTreeMap<String, PricePair>>;

/// One reference item row as far as pricing is concerned: its identity and
/// the raw scraped baseline cells.
#[derive(Debug, Clone)]
pub struct ReferenceItem {
    pub name: String,
    pub raw_buy: Option<String>,
    pub raw_sell: Option<String>,
}

/// Derives per-city suggestions: baseline prices adjusted by how much of the
/// item nearby spawns drop, then denomination-rounded, then corrected so no
/// city buys below the highest sell anywhere (closing the buy-low/sell-high
/// arbitrage loop).
pub fn suggest_prices(
    spawn_counts: &[MonsterCount],
    reference_items: &[ReferenceItem],
    loot_index: &LootIndex,
    excluded_npcs: &[String],
) -> SuggestionTable {
    let cities: BTreeSet<&str> = spawn_counts
        .iter()
        .map(|entry| entry.city.as_str())
        .collect();
    let pressure_by_city = loot_pressure_by_city(spawn_counts, loot_index);

    let mut table: SuggestionTable = BTreeMap::new();
    for item in reference_items {
        let item_key = item.name.trim().to_lowercase();
        if item_key.is_empty() {
            continue;
        }

        let mut per_city: BTreeMap<String, PricePair> = BTreeMap::new();
        for &city in &cities {
            let base_buy = resolve_baseline(
                item.raw_buy.as_deref(),
                city,
                PriceKind::Buy,
                excluded_npcs,
            );
            let base_sell = resolve_baseline(
                item.raw_sell.as_deref(),
                city,
                PriceKind::Sell,
                excluded_npcs,
            );

            let pressure = pressure_by_city
                .get(city)
                .and_then(|items| items.get(&item_key))
                .copied()
                .unwrap_or(0);

            let pair = if pressure > 0 {
                let factor = (pressure as f64 / PRESSURE_SATURATION).min(1.0);
                PricePair {
                    buy: base_buy
                        .map(|buy| (buy as f64 * (1.0 - BUY_DISCOUNT * factor)).round() as i64)
                        .map(round_price),
                    sell: base_sell
                        .map(|sell| (sell as f64 * (1.0 + SELL_MARKUP * factor)).round() as i64)
                        .map(round_price),
                }
            } else {
                PricePair {
                    buy: base_buy.map(round_price),
                    sell: base_sell.map(round_price),
                }
            };
            per_city.insert(city.to_string(), pair);
        }
        table.insert(item_key, per_city);
    }

    enforce_cross_city_consistency(&mut table);
    table
}

/// city → item name (lowercased) → Σ chance × spawn count over every nearby
/// monster whose flattened loot names the item.
fn loot_pressure_by_city(
    spawn_counts: &[MonsterCount],
    loot_index: &LootIndex,
) -> HashMap<String, HashMap<String, u64>> {
    let mut pressure: HashMap<String, HashMap<String, u64>> = HashMap::new();
    for entry in spawn_counts {
        let Some(loot) = loot_index
            .get(&entry.city)
            .and_then(|monsters| monsters.get(&entry.monster))
        else {
            continue;
        };
        let per_item = pressure.entry(entry.city.clone()).or_default();
        for item in loot.all_items_recursive() {
            let Some(name) = item.name.as_deref() else {
                continue;
            };
            let key = name.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            *per_item.entry(key).or_insert(0) +=
                u64::from(item.chance) * u64::from(entry.count);
        }
    }
    pressure
}

/// A buy price below the highest sell observed anywhere for the same item is
/// raised to that maximum, so buying in one city and selling in another can
/// never profit.
fn enforce_cross_city_consistency(table: &mut SuggestionTable) {
    for per_city in table.values_mut() {
        let Some(max_sell) = per_city.values().filter_map(|pair| pair.sell).max() else {
            continue;
        };
        for pair in per_city.values_mut() {
            if let Some(buy) = pair.buy {
                if buy < max_sell {
                    pair.buy = Some(round_price(max_sell));
                }
            }
        }
    }
}

/// Rounds to a "nice" increment scaled to the price's magnitude, half away
/// from zero.
pub fn round_price(price: i64) -> i64 {
    let magnitude = price.abs();
    let step = if magnitude < 100 {
        5
    } else if magnitude < 1_000 {
        10
    } else if magnitude < 10_000 {
        50
    } else {
        100
    };
    ((price as f64 / step as f64).round() * step as f64) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::loader::LootProvider;
    use crate::loot::table::{LootItem, MonsterLoot};
    use crate::loot::index::index_by_city_and_monster;

    fn count(city: &str, monster: &str, count: u32) -> MonsterCount {
        MonsterCount {
            city: city.to_string(),
            radius: 200,
            monster: monster.to_string(),
            count,
        }
    }

    fn reference(name: &str, buy: &str, sell: &str) -> ReferenceItem {
        ReferenceItem {
            name: name.to_string(),
            raw_buy: Some(buy.to_string()),
            raw_sell: Some(sell.to_string()),
        }
    }

    fn rat_index(spawn_counts: &[MonsterCount], chance: u32) -> LootIndex {
        let mut loots = std::collections::HashMap::new();
        loots.insert(
            "Rat".to_string(),
            MonsterLoot::new("Rat", vec![LootItem::leaf("plate armor", chance)]),
        );
        index_by_city_and_monster(spawn_counts, &LootProvider::new(loots))
    }

    #[test]
    fn round_price_uses_denomination_steps() {
        assert_eq!(round_price(97), 95);
        assert_eq!(round_price(103), 100);
        assert_eq!(round_price(1234), 1250);
        assert_eq!(round_price(10450), 10500);
    }

    #[test]
    fn round_price_half_rounds_away_from_zero() {
        assert_eq!(round_price(95), 95);
        assert_eq!(round_price(98), 100);
        assert_eq!(round_price(97), 95); // 19.4 → 19
        assert_eq!(round_price(-97), -95);
        assert_eq!(round_price(-98), -100);
    }

    #[test]
    fn pressure_adjusts_buy_down_and_sell_up() {
        // chance 50000 × count 1 → factor 0.5 → buy −15%, sell +25%
        let counts = vec![count("Sagvana", "Rat", 1)];
        let index = rat_index(&counts, 50_000);
        let items = vec![reference(
            "Plate Armor",
            r#"{"Sagvana":400}"#,
            r#"{"Sagvana":100}"#,
        )];
        let table = suggest_prices(&counts, &items, &index, &[]);
        let pair = table["plate armor"]["Sagvana"];
        // 400 × 0.85 = 340; 100 × 1.25 = 125 → rounded to 130
        assert_eq!(pair.sell, Some(130));
        // buy 340 ≥ max sell 130, untouched by the correction pass
        assert_eq!(pair.buy, Some(340));
    }

    #[test]
    fn factor_saturates_at_one() {
        let counts = vec![count("Sagvana", "Rat", 10)];
        let index = rat_index(&counts, 90_000); // pressure 900000 ≫ saturation
        let items = vec![reference(
            "Plate Armor",
            r#"{"Sagvana":1000}"#,
            r#"{"Sagvana":200}"#,
        )];
        let table = suggest_prices(&counts, &items, &index, &[]);
        let pair = table["plate armor"]["Sagvana"];
        assert_eq!(pair.sell, Some(300)); // 200 × 1.5
        assert_eq!(pair.buy, Some(700)); // 1000 × 0.7
    }

    #[test]
    fn zero_pressure_keeps_baseline_modulo_rounding() {
        let counts = vec![count("Sagvana", "Rat", 1)];
        // Rat drops nothing relevant
        let index = rat_index(&counts, 50_000);
        let items = vec![reference(
            "Magic Sword",
            r#"{"Sagvana":1234}"#,
            r#"{"Sagvana":97}"#,
        )];
        let table = suggest_prices(&counts, &items, &index, &[]);
        let pair = table["magic sword"]["Sagvana"];
        assert_eq!(pair.buy, Some(1250));
        assert_eq!(pair.sell, Some(95));
    }

    #[test]
    fn null_baselines_stay_null() {
        let counts = vec![count("Sagvana", "Rat", 1)];
        let index = rat_index(&counts, 50_000);
        let items = vec![ReferenceItem {
            name: "plate armor".to_string(),
            raw_buy: None,
            raw_sell: Some(r#"{"Sagvana":100}"#.to_string()),
        }];
        let table = suggest_prices(&counts, &items, &index, &[]);
        let pair = table["plate armor"]["Sagvana"];
        assert_eq!(pair.buy, None);
        assert_eq!(pair.sell, Some(130));
    }

    #[test]
    fn cross_city_correction_closes_arbitrage() {
        let counts = vec![count("Agren", "Rat", 1), count("Sagvana", "Rat", 1)];
        let index = rat_index(&counts, 0);
        // Sagvana sells high, Agren would buy cheap
        let items = vec![reference(
            "plate armor",
            r#"{"Agren":100,"Sagvana":600}"#,
            r#"{"Agren":80,"Sagvana":400}"#,
        )];
        let table = suggest_prices(&counts, &items, &index, &[]);
        let per_city = &table["plate armor"];
        let max_sell = per_city.values().filter_map(|p| p.sell).max().expect("sell");
        let min_buy = per_city.values().filter_map(|p| p.buy).min().expect("buy");
        assert!(min_buy >= max_sell);
        assert_eq!(per_city["Agren"].buy, Some(400));
        assert_eq!(per_city["Sagvana"].buy, Some(600));
    }

    #[test]
    fn cross_city_invariant_holds_for_every_item() {
        let counts = vec![
            count("Agren", "Rat", 3),
            count("Ohara", "Rat", 7),
            count("Sagvana", "Rat", 1),
        ];
        let index = rat_index(&counts, 40_000);
        let items = vec![
            reference(
                "plate armor",
                r#"{"Agren":[120,120,90],"Ohara":300,"Sagvana":150}"#,
                r#"{"Agren":[80,75],"Ohara":220,"Sagvana":90}"#,
            ),
            reference("brass shield", "40-60", "25"),
        ];
        let table = suggest_prices(&counts, &items, &index, &[]);
        for per_city in table.values() {
            let max_sell = per_city.values().filter_map(|p| p.sell).max();
            let min_buy = per_city.values().filter_map(|p| p.buy).min();
            if let (Some(min_buy), Some(max_sell)) = (min_buy, max_sell) {
                assert!(min_buy >= max_sell, "buy {} < sell {}", min_buy, max_sell);
            }
        }
    }

    #[test]
    fn suggestion_table_is_deterministic() {
        let counts = vec![count("Sagvana", "Rat", 2), count("Agren", "Rat", 5)];
        let index = rat_index(&counts, 30_000);
        let items = vec![
            reference("plate armor", r#"{"Sagvana":500}"#, r#"{"Sagvana":300}"#),
            reference("brass shield", "100", "60"),
        ];
        let first = suggest_prices(&counts, &items, &index, &[]);
        let second = suggest_prices(&counts, &items, &index, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn blank_item_names_are_skipped() {
        let counts = vec![count("Sagvana", "Rat", 1)];
        let index = rat_index(&counts, 0);
        let items = vec![reference("   ", "100", "50")];
        let table = suggest_prices(&counts, &items, &index, &[]);
        assert!(table.is_empty());
    }
}
