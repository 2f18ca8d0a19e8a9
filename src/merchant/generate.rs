use crate::merchant::lua::{LuaKey, LuaValue};
use crate::tables::equipment::EquipmentFile;
use crate::telemetry::logging;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;

const WEAPON_TYPES: [&str; 8] = [
    "sword",
    "axe",
    "club",
    "distance",
    "bow",
    "crossbow",
    "spear",
    "throwing",
];

#[derive(Debug, Default)]
pub struct GenerationStats {
    pub total: usize,
    pub weapons: usize,
    pub weapons_by_type: BTreeMap<String, usize>,
    pub wands: usize,
    pub equipment: usize,
    pub empty_buy: usize,
    pub empty_sell: usize,
    pub missing_group: usize,
    pub routed_equipment_unknown: usize,
}

#[derive(Debug)]
pub struct GenerationReport {
    pub written: Vec<(String, usize)>,
    pub stats: GenerationStats,
    pub warnings: Vec<String>,
}

/// Partitions the equipment table into the merchant module's three item
/// files and writes them, together with a JSON stamp describing the run.
pub fn generate(
    file: &EquipmentFile,
    dst_dir: &Path,
    source_name: &str,
) -> Result<GenerationReport, String> {
    std::fs::create_dir_all(dst_dir)
        .map_err(|err| format!("cannot create {}: {}", dst_dir.display(), err))?;

    let mut weapons: BTreeMap<i64, LuaValue> = BTreeMap::new();
    let mut wands: BTreeMap<i64, LuaValue> = BTreeMap::new();
    let mut equipment: BTreeMap<i64, LuaValue> = BTreeMap::new();
    let mut stats = GenerationStats::default();
    let mut warnings = Vec::new();

    for (idx, row) in file.rows.iter().enumerate() {
        let row_no = idx + 2;
        stats.total += 1;

        let name = file.name(row).unwrap_or("").to_string();
        let Some(id) = file.id(row) else {
            warnings.push(format!(
                "Row {}: missing numeric id (name='{}'), skipped.",
                row_no, name
            ));
            continue;
        };
        let weapon_type = file
            .field(row, "weaponType")
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let slot_type = file
            .field(row, "slotType")
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let group_column = file.field(row, "group").map(str::to_string);

        let group = derive_group(&weapon_type, &slot_type, group_column.as_deref());
        if group.is_none() {
            warnings.push(format!(
                "Row {}: missing/unknown group (weaponType='{}', slotType='{}'). Routed to equipment.",
                row_no, weapon_type, slot_type
            ));
            stats.missing_group += 1;
        }

        let buy_map = parse_city_price_map(file.field(row, "Buy").unwrap_or(""));
        let sell_map = parse_city_price_map(file.field(row, "Sell").unwrap_or(""));
        if buy_map.is_empty() {
            stats.empty_buy += 1;
            warnings.push(format!(
                "Row {}: Buy JSON empty (id={}, name='{}').",
                row_no, id, name
            ));
        }
        if sell_map.is_empty() {
            stats.empty_sell += 1;
            warnings.push(format!(
                "Row {}: Sell JSON empty (id={}, name='{}').",
                row_no, id, name
            ));
        }

        let item = build_lua_item(id, &name, &slot_type, group.as_deref(), &buy_map, &sell_map);

        if is_wand_or_rod(&weapon_type, &name, group_column.as_deref()) {
            wands.insert(id, item);
            stats.wands += 1;
        } else if WEAPON_TYPES.contains(&weapon_type.as_str()) {
            weapons.insert(id, item);
            stats.weapons += 1;
            *stats
                .weapons_by_type
                .entry(weapon_type.clone())
                .or_insert(0) += 1;
        } else {
            equipment.insert(id, item);
            stats.equipment += 1;
            if group.is_none() {
                stats.routed_equipment_unknown += 1;
            }
        }
    }

    let mut written = Vec::new();
    for (file_name, items) in [
        ("weapons.lua", &weapons),
        ("wands.lua", &wands),
        ("equipment.lua", &equipment),
    ] {
        let path = dst_dir.join(file_name);
        write_items_file(&path, items)?;
        logging::log_pipeline(&format!("written {} ({} items)", file_name, items.len()));
        written.push((file_name.to_string(), items.len()));
    }

    write_stamp(dst_dir, source_name, &stats, &warnings, &written)?;

    Ok(GenerationReport {
        written,
        stats,
        warnings,
    })
}

fn build_lua_item(
    id: i64,
    name: &str,
    slot_type: &str,
    group: Option<&str>,
    buy_map: &BTreeMap<String, i64>,
    sell_map: &BTreeMap<String, i64>,
) -> LuaValue {
    let mut item = LuaValue::table();
    item.push(LuaKey::Str("id".to_string()), LuaValue::Int(id));
    item.push(
        LuaKey::Str("name".to_string()),
        LuaValue::Str(name.to_string()),
    );
    item.push(
        LuaKey::Str("slotType".to_string()),
        if slot_type.is_empty() {
            LuaValue::Nil
        } else {
            LuaValue::Str(slot_type.to_string())
        },
    );
    item.push(
        LuaKey::Str("group".to_string()),
        match group {
            Some(group) => LuaValue::Str(group.to_string()),
            None => LuaValue::Nil,
        },
    );
    item.push(LuaKey::Str("subType".to_string()), LuaValue::Int(0));
    item.push(LuaKey::Str("buy".to_string()), price_table(buy_map));
    item.push(LuaKey::Str("sell".to_string()), price_table(sell_map));
    item
}

fn price_table(prices: &BTreeMap<String, i64>) -> LuaValue {
    let mut table = LuaValue::table();
    for (city, price) in prices {
        table.push(LuaKey::Str(city.clone()), LuaValue::Int(*price));
    }
    table
}

fn write_items_file(path: &Path, items: &BTreeMap<i64, LuaValue>) -> Result<(), String> {
    let mut root = LuaValue::table();
    for (id, item) in items {
        root.push(LuaKey::Int(*id), item.clone());
    }
    let lua = format!(
        "-- Auto-generated. Do not edit by hand.\nlocal ITEMS = {}\nreturn ITEMS\n",
        root.dump()
    );
    std::fs::write(path, lua)
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

fn write_stamp(
    dst_dir: &Path,
    source_name: &str,
    stats: &GenerationStats,
    warnings: &[String],
    written: &[(String, usize)],
) -> Result<(), String> {
    let counts: serde_json::Map<String, Value> = written
        .iter()
        .map(|(name, count)| {
            (
                name.trim_end_matches(".lua").to_string(),
                json!(count),
            )
        })
        .collect();
    let stamp = json!({
        "generatedAt": logging::format_timestamp(),
        "source": source_name,
        "counts": counts,
        "stats": {
            "total": stats.total,
            "weapons": stats.weapons,
            "weapons_by_type": stats.weapons_by_type,
            "wands": stats.wands,
            "equipment": stats.equipment,
            "empty_buy": stats.empty_buy,
            "empty_sell": stats.empty_sell,
            "missing_group": stats.missing_group,
            "routed_equipment_unknown": stats.routed_equipment_unknown,
        },
        "warnings": warnings,
    });
    let path = dst_dir.join(".validation.json");
    let pretty = serde_json::to_string_pretty(&stamp)
        .map_err(|err| format!("stamp serialization failed: {}", err))?;
    std::fs::write(&path, pretty)
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

/// Numeric entries only; nulls and non-numbers are dropped so a half-filled
/// suggestion table still generates.
pub fn parse_city_price_map(cell: &str) -> BTreeMap<String, i64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return BTreeMap::new();
    }
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(cell) else {
        return BTreeMap::new();
    };
    map.into_iter()
        .filter_map(|(city, price)| price.as_i64().map(|price| (city, price)))
        .collect()
}

fn is_wand_or_rod(weapon_type: &str, name: &str, group_column: Option<&str>) -> bool {
    if matches!(weapon_type, "wand" | "rod") {
        return true;
    }
    let name = name.to_lowercase();
    let group = group_column.unwrap_or("").to_lowercase();
    group.contains("wands") || name.contains("wand") || name.contains("rod")
}

fn derive_group(
    weapon_type: &str,
    slot_type: &str,
    group_column: Option<&str>,
) -> Option<String> {
    let group = match weapon_type {
        "sword" => "weapons/swords",
        "axe" => "weapons/axes",
        "club" => "weapons/clubs",
        "distance" | "bow" | "crossbow" | "spear" | "throwing" => "weapons/distance",
        "wand" | "rod" => "wands",
        _ => "",
    };
    if !group.is_empty() {
        return Some(group.to_string());
    }
    let group = match slot_type {
        "head" | "helmet" => "equipment/helmet",
        "armor" | "body" => "equipment/armor",
        "legs" => "equipment/legs",
        "feet" | "boots" => "equipment/boots",
        "shield" => "equipment/shield",
        "hand" | "two-hand" => "equipment/hand",
        "tool" | "utility" => "equipment/tools",
        _ => "",
    };
    if !group.is_empty() {
        return Some(group.to_string());
    }
    group_column
        .filter(|group| !group.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_city_price_map_keeps_numeric_entries_only() {
        let map = parse_city_price_map(r#"{"Sagvana":120,"Agren":null,"Ohara":"90"}"#);
        assert_eq!(map.len(), 1);
        assert_eq!(map["Sagvana"], 120);
        assert!(parse_city_price_map("").is_empty());
        assert!(parse_city_price_map("not json").is_empty());
        assert!(parse_city_price_map("[1,2]").is_empty());
    }

    #[test]
    fn derive_group_covers_weapons_slots_and_fallback() {
        assert_eq!(derive_group("sword", "", None).as_deref(), Some("weapons/swords"));
        assert_eq!(
            derive_group("crossbow", "", None).as_deref(),
            Some("weapons/distance")
        );
        assert_eq!(
            derive_group("", "helmet", None).as_deref(),
            Some("equipment/helmet")
        );
        assert_eq!(
            derive_group("", "two-hand", None).as_deref(),
            Some("equipment/hand")
        );
        assert_eq!(
            derive_group("", "", Some("custom/misc")).as_deref(),
            Some("custom/misc")
        );
        assert_eq!(derive_group("", "", None), None);
        assert_eq!(derive_group("", "", Some("  ")), None);
    }

    #[test]
    fn is_wand_or_rod_uses_type_then_heuristics() {
        assert!(is_wand_or_rod("wand", "anything", None));
        assert!(is_wand_or_rod("rod", "anything", None));
        assert!(is_wand_or_rod("", "Wand of Inferno", None));
        assert!(is_wand_or_rod("", "moonlight rod", None));
        assert!(is_wand_or_rod("", "thing", Some("wands")));
        assert!(!is_wand_or_rod("sword", "broadsword", None));
    }

    #[test]
    fn generate_partitions_and_writes_files() {
        let file = EquipmentFile::from_content(
            "id;name;weaponType;slotType;Buy;Sell\n\
3264;sword;sword;hand;\"{\"\"Sagvana\"\":85}\";\"{\"\"Sagvana\"\":25}\"\n\
3072;wand of vortex;wand;;\"{\"\"Sagvana\"\":500}\";\n\
3357;plate armor;;armor;\"{\"\"Sagvana\"\":1200}\";\"{\"\"Sagvana\"\":400}\"\n\
9999;oddity;;;;\n",
        )
        .expect("load");
        let dir = std::env::temp_dir().join(format!(
            "merchantry-generate-test-{}",
            std::process::id()
        ));
        let report = generate(&file, &dir, "test.csv").expect("generate");

        assert_eq!(report.stats.total, 4);
        assert_eq!(report.stats.weapons, 1);
        assert_eq!(report.stats.wands, 1);
        assert_eq!(report.stats.equipment, 2);
        assert_eq!(report.stats.missing_group, 1);
        assert_eq!(report.stats.routed_equipment_unknown, 1);
        assert_eq!(report.stats.empty_buy, 1);
        assert_eq!(report.stats.empty_sell, 2);

        let weapons = std::fs::read_to_string(dir.join("weapons.lua")).expect("weapons");
        assert!(weapons.starts_with("-- Auto-generated. Do not edit by hand.\n"));
        assert!(weapons.contains("[3264]"));
        assert!(weapons.contains("group = \"weapons/swords\""));
        assert!(weapons.contains("Sagvana = 85"));
        assert!(weapons.ends_with("return ITEMS\n"));

        let equipment = std::fs::read_to_string(dir.join("equipment.lua")).expect("equipment");
        assert!(equipment.contains("[3357]"));
        assert!(equipment.contains("group = \"equipment/armor\""));
        assert!(equipment.contains("[9999]"));
        assert!(equipment.contains("group = nil"));
        assert!(equipment.contains("buy = {}"));

        let stamp = std::fs::read_to_string(dir.join(".validation.json")).expect("stamp");
        let stamp: Value = serde_json::from_str(&stamp).expect("stamp json");
        assert_eq!(stamp["counts"]["weapons"], 1);
        assert_eq!(stamp["stats"]["total"], 4);
        assert_eq!(stamp["source"], "test.csv");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
