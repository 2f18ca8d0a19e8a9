use crate::config::Settings;
use crate::pricing::suggest::{suggest_prices, PricePair, ReferenceItem};
use crate::tables::equipment::EquipmentFile;
use crate::tables::loot::read_loot_csv;
use crate::tables::spawn::read_spawn_analysis;
use crate::telemetry::logging;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub fn run(
    equipment_csv: &Path,
    loot_csv: &Path,
    spawn_csv: &Path,
    settings_path: Option<&Path>,
) -> Result<(), String> {
    let settings = Settings::load(settings_path)?;
    let spawn_counts = read_spawn_analysis(spawn_csv)?;
    let loot_index = read_loot_csv(loot_csv)?;
    let mut equipment = EquipmentFile::load(equipment_csv)?;
    logging::log_pipeline(&format!(
        "suggest-prices: {} spawn rows, {} loot cities, {} equipment rows",
        spawn_counts.len(),
        loot_index.len(),
        equipment.len()
    ));

    let reference_items: Vec<ReferenceItem> = equipment
        .rows
        .iter()
        .map(|row| ReferenceItem {
            name: equipment.name(row).unwrap_or("").to_string(),
            raw_buy: equipment
                .field(row, "Tibia Buy Price")
                .map(str::to_string),
            raw_sell: equipment
                .field(row, "Tibia Sell Price")
                .map(str::to_string),
        })
        .collect();

    let table = suggest_prices(
        &spawn_counts,
        &reference_items,
        &loot_index,
        &settings.excluded_npcs,
    );

    let mut updated = 0usize;
    for row_index in 0..equipment.rows.len() {
        let key = equipment
            .name(&equipment.rows[row_index])
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let Some(per_city) = table.get(&key) else {
            continue;
        };
        equipment.set_field(row_index, "Buy", encode_prices(per_city, |pair| pair.buy));
        equipment.set_field(row_index, "Sell", encode_prices(per_city, |pair| pair.sell));
        updated += 1;
    }

    equipment.write(equipment_csv)?;
    println!(
        "merchantry: updated Buy/Sell for {} of {} rows in {}",
        updated,
        equipment.len(),
        equipment_csv.display()
    );
    logging::log_pipeline(&format!(
        "suggest-prices: updated {} rows in {}",
        updated,
        equipment_csv.display()
    ));
    Ok(())
}

fn encode_prices(
    per_city: &BTreeMap<String, PricePair>,
    side: impl Fn(&PricePair) -> Option<i64>,
) -> String {
    let map: serde_json::Map<String, Value> = per_city
        .iter()
        .map(|(city, pair)| {
            let value = match side(pair) {
                Some(price) => Value::from(price),
                None => Value::Null,
            };
            (city.clone(), value)
        })
        .collect();
    Value::Object(map).to_string()
}
