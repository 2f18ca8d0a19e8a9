use crate::items::ItemCatalog;
use crate::loot::index::index_by_city_and_monster;
use crate::loot::loader::load_from_directory;
use crate::loot::table::LootItem;
use crate::tables::loot::{resolve_identity, write_loot_csv};
use crate::tables::spawn::read_spawn_analysis;
use crate::telemetry::logging;
use std::collections::HashSet;
use std::path::Path;

pub fn run(
    monster_dir: &Path,
    spawn_csv: &Path,
    items_xml: &Path,
    output_csv: &Path,
) -> Result<(), String> {
    if !monster_dir.is_dir() {
        return Err(format!(
            "monster directory not found: {}",
            monster_dir.display()
        ));
    }

    let spawn_counts = read_spawn_analysis(spawn_csv)?;
    println!(
        "merchantry: loaded spawn data for {} entries",
        spawn_counts.len()
    );

    let mut seen = HashSet::new();
    let monster_names: Vec<String> = spawn_counts
        .iter()
        .map(|entry| entry.monster.clone())
        .filter(|monster| seen.insert(monster.clone()))
        .collect();
    println!("detected {} unique monsters", monster_names.len());
    logging::log_pipeline(&format!(
        "load-loot: {} spawn entries, {} unique monsters",
        spawn_counts.len(),
        monster_names.len()
    ));

    let provider = load_from_directory(monster_dir, &monster_names)?;
    logging::log_pipeline(&format!(
        "load-loot: loot data loaded for {} monsters",
        provider.len()
    ));

    let index = index_by_city_and_monster(&spawn_counts, &provider);
    let catalog = ItemCatalog::load(items_xml)?;

    for (city, monsters) in &index {
        println!("city: {}", city);
        for (monster, loot) in monsters {
            println!("  {}:", monster);
            let mut stack: Vec<(&LootItem, usize)> =
                loot.items().iter().rev().map(|item| (item, 2)).collect();
            while let Some((item, depth)) = stack.pop() {
                print_loot_item(item, depth, &catalog);
                stack.extend(item.inside.iter().rev().map(|nested| (nested, depth + 1)));
            }
        }
    }

    write_loot_csv(output_csv, &index, &catalog)?;
    println!("monster loot written to {}", output_csv.display());
    Ok(())
}

fn print_loot_item(item: &LootItem, depth: usize, catalog: &ItemCatalog) {
    let (name, id) = resolve_identity(item, catalog);
    let label = match (&name, id) {
        (Some(name), Some(id)) => format!("{} (ID: {})", name, id),
        (Some(name), None) => format!("{} (ID: unknown)", name),
        (None, Some(id)) => format!("ID: {}", id),
        (None, None) => "unknown".to_string(),
    };
    println!(
        "{}- {} (chance: {}, countMax: {})",
        " ".repeat(depth * 2),
        label,
        item.chance,
        item.count_max
            .map(|max| max.to_string())
            .unwrap_or_else(|| "n/a".to_string())
    );
}
