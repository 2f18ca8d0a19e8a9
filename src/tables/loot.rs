use crate::items::ItemCatalog;
use crate::loot::index::LootIndex;
use crate::loot::table::{LootItem, MonsterLoot};
use crate::tables::csv;
use std::collections::BTreeMap;
use std::path::Path;

const HEADER: [&str; 6] = [
    "City",
    "Monster",
    "Item Name",
    "Item ID",
    "Drop Chance",
    "Max Count",
];

/// Writes the integrated loot index flat: container contents follow their
/// container in document order. Names and ids are backfilled from the item
/// catalog where the loot file only carried one of them.
pub fn write_loot_csv(
    path: &Path,
    index: &LootIndex,
    catalog: &ItemCatalog,
) -> Result<(), String> {
    let mut out = csv::format_record(
        &HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        ';',
    );
    for (city, monsters) in index {
        for (monster, loot) in monsters {
            let mut stack: Vec<&LootItem> = loot.items().iter().rev().collect();
            while let Some(item) = stack.pop() {
                let (name, id) = resolve_identity(item, catalog);
                out.push_str(&csv::format_record(
                    &[
                        city.clone(),
                        monster.clone(),
                        name.unwrap_or_else(|| "unknown".to_string()),
                        id.map(|id| id.to_string())
                            .unwrap_or_else(|| "unknown".to_string()),
                        item.chance.to_string(),
                        item.count_max
                            .map(|max| max.to_string())
                            .unwrap_or_else(|| "n/a".to_string()),
                    ],
                    ';',
                ));
                stack.extend(item.inside.iter().rev());
            }
        }
    }
    std::fs::write(path, out)
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

pub fn resolve_identity(
    item: &LootItem,
    catalog: &ItemCatalog,
) -> (Option<String>, Option<u32>) {
    let mut name = item.name.clone();
    let mut id = item.id;
    if name.is_none() {
        if let Some(id) = id {
            name = catalog.name_by_id(id).map(str::to_string);
        }
    }
    if id.is_none() {
        if let Some(name) = name.as_deref() {
            id = catalog.id_by_name(name);
        }
    }
    (name, id)
}

/// Reads the loot CSV back into a (city → monster → loot) index. Nesting was
/// flattened on write, so every item comes back as a direct drop, which is
/// all the pricing pass needs.
pub fn read_loot_csv(path: &Path) -> Result<LootIndex, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    parse_loot_csv(&content).map_err(|err| format!("loot csv {}: {}", path.display(), err))
}

fn parse_loot_csv(content: &str) -> Result<LootIndex, String> {
    let records = csv::read_records(content, ';');
    let mut records = records.into_iter();
    let header = records.next().ok_or_else(|| "file is empty".to_string())?;
    if header != HEADER {
        return Err(format!("invalid header, expected {}", HEADER.join(";")));
    }

    let mut index: LootIndex = BTreeMap::new();
    for (idx, record) in records.enumerate() {
        let line_no = idx + 2;
        if record.len() < 6 {
            return Err(format!("line {}: expected 6 fields", line_no));
        }
        let city = record[0].trim().to_string();
        let monster = record[1].trim().to_string();
        let name = record[2].trim_matches(|c| c == ' ' || c == '"').to_string();
        let chance = record[4]
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("line {}: invalid chance '{}'", line_no, record[4]))?;
        let item = LootItem {
            name: if name.is_empty() { None } else { Some(name) },
            id: record[3].trim().parse::<u32>().ok(),
            chance,
            count_max: match record[5].trim() {
                "n/a" => None,
                raw => Some(raw.parse::<u32>().map_err(|_| {
                    format!("line {}: invalid max count '{}'", line_no, raw)
                })?),
            },
            inside: Vec::new(),
        };
        index
            .entry(city)
            .or_default()
            .entry(monster.clone())
            .or_insert_with(|| MonsterLoot::new(monster, Vec::new()))
            .items
            .push(item);
    }
    Ok(index)
}
