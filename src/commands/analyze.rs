use crate::config::Settings;
use crate::tables::spawn::write_spawn_analysis;
use crate::telemetry::logging;
use crate::world::city::cities_from_settings;
use crate::world::proximity::analyze;
use crate::world::spawn::load_spawn_file;
use std::path::Path;

pub fn run(
    spawn_file: &Path,
    settings_path: Option<&Path>,
    output_csv: Option<&Path>,
) -> Result<(), String> {
    let settings = Settings::load(settings_path)?;
    let cities = cities_from_settings(&settings);

    let observations = load_spawn_file(spawn_file)?;
    println!("merchantry: loaded {} spawn entries", observations.len());
    logging::log_pipeline(&format!(
        "analyze-spawns: {} entries from {}, {} cities",
        observations.len(),
        spawn_file.display(),
        cities.len()
    ));

    let results = analyze(&observations, &cities);
    println!("monster count near each city:");
    let mut current_city = "";
    for entry in &results {
        if entry.city != current_city {
            current_city = entry.city.as_str();
            println!();
        }
        println!(
            "{}, radius: {} - {} -> {}",
            entry.city, entry.radius, entry.monster, entry.count
        );
    }

    if let Some(output_csv) = output_csv {
        write_spawn_analysis(output_csv, &results)?;
        println!(
            "spawn analysis written to {} ({} rows)",
            output_csv.display(),
            results.len()
        );
        logging::log_pipeline(&format!(
            "analyze-spawns: wrote {} rows to {}",
            results.len(),
            output_csv.display()
        ));
    }

    Ok(())
}
