use crate::merchant::generate::generate;
use crate::merchant::validate::validate;
use crate::tables::equipment::EquipmentFile;
use crate::telemetry::logging;
use std::path::Path;

pub fn run(
    equipment_csv: &Path,
    dst_dir: &Path,
    fail_on_warnings: bool,
) -> Result<(), String> {
    let file = EquipmentFile::load(equipment_csv)?;

    let errors = validate(&file);
    if !errors.is_empty() {
        for error in &errors {
            eprintln!("merchantry: {}", error);
            logging::log_error(error);
        }
        // Generation continues on validation errors; the stamp and warnings
        // give reviewers the trail.
        println!(
            "merchant data validation failed with {} errors; output may be incorrect",
            errors.len()
        );
    }

    let source_name = equipment_csv
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| equipment_csv.display().to_string());
    let report = generate(&file, dst_dir, &source_name)?;

    for (file_name, count) in &report.written {
        println!("written {} ({} items)", file_name, count);
    }

    if logging::debug_enabled() {
        let stats = &report.stats;
        println!();
        println!("=== generation stats ===");
        println!("total rows:        {}", stats.total);
        println!("weapons total:     {}", stats.weapons);
        for (weapon_type, count) in &stats.weapons_by_type {
            println!("  {:<12} {}", format!("{}:", weapon_type), count);
        }
        println!("wands/rods:        {}", stats.wands);
        println!("equipment:         {}", stats.equipment);
        println!("empty Buy JSON:    {}", stats.empty_buy);
        println!("empty Sell JSON:   {}", stats.empty_sell);
        println!("missing group:     {}", stats.missing_group);
        println!("unknown->equipment: {}", stats.routed_equipment_unknown);
        if !report.warnings.is_empty() {
            println!();
            println!("=== warnings ===");
            for warning in &report.warnings {
                println!("- {}", warning);
            }
        }
    }

    if fail_on_warnings && !report.warnings.is_empty() {
        return Err(format!(
            "{} warnings present and --fail-on-warnings enabled",
            report.warnings.len()
        ));
    }

    println!("merchant items generated successfully.");
    Ok(())
}
