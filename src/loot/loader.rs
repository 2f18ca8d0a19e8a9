use crate::loot::table::{LootItem, MonsterLoot};
use crate::telemetry::logging;
use crate::xml::{self, XmlElement};
use std::collections::HashMap;
use std::path::Path;

/// Answers loot lookups by monster name. Monsters without loot data are
/// simply absent; callers treat absence as "no loot contribution".
#[derive(Debug, Default)]
pub struct LootProvider {
    loots: HashMap<String, MonsterLoot>,
}

impl LootProvider {
    pub fn new(loots: HashMap<String, MonsterLoot>) -> Self {
        LootProvider { loots }
    }

    pub fn loot(&self, monster: &str) -> Option<&MonsterLoot> {
        self.loots.get(monster)
    }

    pub fn len(&self) -> usize {
        self.loots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loots.is_empty()
    }
}

/// Reads the monster manifest and loads loot for the named monsters only.
/// A missing manifest is fatal; a monster missing from the manifest, a
/// missing monster file, or a file without a loot node is not.
pub fn load_from_directory(
    base_path: &Path,
    monster_names: &[String],
) -> Result<LootProvider, String> {
    let manifest = xml::load_document(&base_path.join("monsters.xml"))?;
    if !manifest.name.eq_ignore_ascii_case("monsters") {
        return Err(format!(
            "monster manifest has <{}> root, expected <monsters>",
            manifest.name
        ));
    }

    let mut files: HashMap<&str, &str> = HashMap::new();
    for entry in manifest.children_named("monster") {
        if let (Some(name), Some(file)) = (entry.attribute("name"), entry.attribute("file")) {
            files.insert(name, file);
        }
    }

    let mut loots = HashMap::new();
    for name in monster_names {
        let Some(file) = files.get(name.as_str()) else {
            logging::log_debug(&format!("no manifest entry for monster '{}'", name));
            continue;
        };
        let path = base_path.join(file);
        if !path.is_file() {
            logging::log_debug(&format!(
                "monster file {} missing for '{}'",
                path.display(),
                name
            ));
            continue;
        }
        let document = match xml::load_document(&path) {
            Ok(document) => document,
            Err(err) => {
                logging::log_error(&format!("skipping monster '{}': {}", name, err));
                continue;
            }
        };
        let Some(loot_node) = document.first_child("loot") else {
            continue;
        };
        let items = parse_loot_items(loot_node);
        loots.insert(name.clone(), MonsterLoot::new(name.clone(), items));
    }

    Ok(LootProvider::new(loots))
}

pub fn parse_loot_items(node: &XmlElement) -> Vec<LootItem> {
    node.children_named("item")
        .map(|item| {
            let inside = item
                .first_child("inside")
                .map(parse_loot_items)
                .unwrap_or_default();
            LootItem {
                name: item
                    .attribute("name")
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string),
                id: item.attribute_u32("id"),
                chance: item.attribute_u32("chance").unwrap_or(0),
                count_max: item.attribute_u32("countmax"),
                inside,
            }
        })
        .collect()
}
