mod commands;
mod config;
pub mod items;
pub mod loot;
pub mod merchant;
pub mod pricing;
pub mod tables;
pub mod telemetry;
pub mod world;
pub mod xml;

pub use config::{AppConfig, CityDefinition, Command, Settings, USAGE};

pub fn run(args: &[String]) -> Result<(), String> {
    let config = AppConfig::from_args(args)?;
    telemetry::logging::init(&config.log_dir, config.debug)?;

    match &config.command {
        Command::AnalyzeSpawns {
            spawn_file,
            settings,
            output_csv,
        } => commands::analyze::run(spawn_file, settings.as_deref(), output_csv.as_deref()),
        Command::LoadLoot {
            monster_dir,
            spawn_csv,
            items_xml,
            output_csv,
        } => commands::loot::run(monster_dir, spawn_csv, items_xml, output_csv),
        Command::SuggestPrices {
            equipment_csv,
            loot_csv,
            spawn_csv,
            settings,
        } => commands::suggest::run(equipment_csv, loot_csv, spawn_csv, settings.as_deref()),
        Command::GenerateMerchant {
            equipment_csv,
            dst_dir,
            fail_on_warnings,
        } => commands::generate::run(equipment_csv, dst_dir, *fail_on_warnings),
    }
    .map_err(|err| {
        telemetry::logging::log_error(&err);
        err
    })
}
