use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_FILE: &str = "merchantry.yaml";

pub const USAGE: &str = "usage: merchantry <command> [options]
commands:
  analyze-spawns --spawn-file=PATH [--settings=PATH] [--output-csv=PATH]
  load-loot --monster-dir=PATH [--spawn-csv=PATH] [--items-xml=PATH] [--output-csv=PATH]
  suggest-prices [--equipment-csv=PATH] [--loot-csv=PATH] [--spawn-csv=PATH] [--settings=PATH]
  generate-merchant [--equipment-csv=PATH] [--dst-dir=PATH] [--fail-on-warnings]
common options:
  --log-dir=PATH   log directory (default: logs)
  --debug          also write debug.log";

#[derive(Debug)]
pub struct AppConfig {
    pub command: Command,
    pub debug: bool,
    pub log_dir: PathBuf,
}

#[derive(Debug)]
pub enum Command {
    AnalyzeSpawns {
        spawn_file: PathBuf,
        settings: Option<PathBuf>,
        output_csv: Option<PathBuf>,
    },
    LoadLoot {
        monster_dir: PathBuf,
        spawn_csv: PathBuf,
        items_xml: PathBuf,
        output_csv: PathBuf,
    },
    SuggestPrices {
        equipment_csv: PathBuf,
        loot_csv: PathBuf,
        spawn_csv: PathBuf,
        settings: Option<PathBuf>,
    },
    GenerateMerchant {
        equipment_csv: PathBuf,
        dst_dir: PathBuf,
        fail_on_warnings: bool,
    },
}

impl AppConfig {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let command_name = args.get(1).ok_or_else(|| USAGE.to_string())?;
        let mut options = parse_options(&args[2..])?;

        let debug = options.take_flag("debug");
        let log_dir = options
            .take_value("log-dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        let command = match command_name.as_str() {
            "analyze-spawns" => Command::AnalyzeSpawns {
                spawn_file: options
                    .take_value("spawn-file")
                    .map(PathBuf::from)
                    .ok_or_else(|| "analyze-spawns requires --spawn-file=PATH".to_string())?,
                settings: options.take_value("settings").map(PathBuf::from),
                output_csv: options.take_value("output-csv").map(PathBuf::from),
            },
            "load-loot" => Command::LoadLoot {
                monster_dir: options
                    .take_value("monster-dir")
                    .map(PathBuf::from)
                    .ok_or_else(|| "load-loot requires --monster-dir=PATH".to_string())?,
                spawn_csv: options
                    .take_value("spawn-csv")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        PathBuf::from("data/output/spawn_analysis_output.csv")
                    }),
                items_xml: options
                    .take_value("items-xml")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data/input/items.xml")),
                output_csv: options
                    .take_value("output-csv")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        PathBuf::from("data/output/monster_loot_output.csv")
                    }),
            },
            "suggest-prices" => Command::SuggestPrices {
                equipment_csv: options
                    .take_value("equipment-csv")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        PathBuf::from("data/output/workCopyEquipment_extended.csv")
                    }),
                loot_csv: options
                    .take_value("loot-csv")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        PathBuf::from("data/output/monster_loot_output.csv")
                    }),
                spawn_csv: options
                    .take_value("spawn-csv")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        PathBuf::from("data/output/spawn_analysis_output.csv")
                    }),
                settings: options.take_value("settings").map(PathBuf::from),
            },
            "generate-merchant" => Command::GenerateMerchant {
                equipment_csv: options
                    .take_value("equipment-csv")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        PathBuf::from("data/output/workCopyEquipment_extended.csv")
                    }),
                dst_dir: options
                    .take_value("dst-dir")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| {
                        PathBuf::from("data/lib/core/customs/merchant/items")
                    }),
                fail_on_warnings: options.take_flag("fail-on-warnings"),
            },
            other => {
                return Err(format!("unknown command '{}'\n{}", other, USAGE));
            }
        };

        options.reject_unused(command_name)?;

        Ok(Self {
            command,
            debug,
            log_dir,
        })
    }
}

struct Options {
    entries: Vec<(String, Option<String>)>,
}

impl Options {
    fn take_value(&mut self, name: &str) -> Option<String> {
        let idx = self
            .entries
            .iter()
            .position(|(key, value)| key == name && value.is_some())?;
        self.entries.remove(idx).1
    }

    fn take_flag(&mut self, name: &str) -> bool {
        let idx = self
            .entries
            .iter()
            .position(|(key, value)| key == name && value.is_none());
        match idx {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    fn reject_unused(&self, command_name: &str) -> Result<(), String> {
        if let Some((key, _)) = self.entries.first() {
            return Err(format!(
                "unknown option '--{}' for {}\n{}",
                key, command_name, USAGE
            ));
        }
        Ok(())
    }
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut entries = Vec::new();
    for arg in args {
        let stripped = arg
            .strip_prefix("--")
            .ok_or_else(|| format!("unexpected argument '{}'\n{}", arg, USAGE))?;
        match stripped.split_once('=') {
            Some((key, value)) => entries.push((key.to_string(), Some(value.to_string()))),
            None => entries.push((stripped.to_string(), None)),
        }
    }
    Ok(Options { entries })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityDefinition {
    pub name: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: i32,
    pub radius: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_cities")]
    pub cities: Vec<CityDefinition>,
    #[serde(default = "default_excluded_npcs")]
    pub excluded_npcs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cities: default_cities(),
            excluded_npcs: default_excluded_npcs(),
        }
    }
}

impl Settings {
    // An explicit --settings path must load; the implicit default file is
    // optional and silently falls back to the built-in registry.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        match path {
            Some(path) => Self::read_file(path),
            None => {
                let default_path = Path::new(DEFAULT_SETTINGS_FILE);
                if default_path.is_file() {
                    Self::read_file(default_path)
                } else {
                    Ok(Settings::default())
                }
            }
        }
    }

    fn read_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read settings {}: {}", path.display(), err))?;
        let settings: Settings = serde_yaml::from_str(&content)
            .map_err(|err| format!("invalid settings {}: {}", path.display(), err))?;
        if settings.cities.is_empty() {
            return Err(format!("settings {} define no cities", path.display()));
        }
        Ok(settings)
    }
}

fn default_cities() -> Vec<CityDefinition> {
    [
        ("Sagvana", 1299, 1553),
        ("Estimar", 1195, 1031),
        ("Agren", 1786, 1313),
        ("Ohara", 849, 938),
        ("Sacrus", 691, 1146),
    ]
    .into_iter()
    .map(|(name, x, y)| CityDefinition {
        name: name.to_string(),
        x,
        y,
        z: 7,
        radius: 200,
    })
    .collect()
}

// Travelling and faction traders whose posted prices track their own stock
// cycles rather than any city's market.
fn default_excluded_npcs() -> Vec<String> {
    [
        "Rashid",
        "Yasir",
        "Alesar",
        "Nah'Bob",
        "Haroun",
        "Yaman",
        "Houses and Guildhalls",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        std::iter::once("merchantry")
            .chain(parts.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn from_args_parses_analyze_spawns() {
        let config = AppConfig::from_args(&args(&[
            "analyze-spawns",
            "--spawn-file=data/input/world-spawn.xml",
            "--output-csv=out.csv",
            "--debug",
        ]))
        .expect("parse");
        assert!(config.debug);
        match config.command {
            Command::AnalyzeSpawns {
                spawn_file,
                output_csv,
                settings,
            } => {
                assert_eq!(spawn_file, PathBuf::from("data/input/world-spawn.xml"));
                assert_eq!(output_csv, Some(PathBuf::from("out.csv")));
                assert!(settings.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn from_args_applies_suggest_defaults() {
        let config = AppConfig::from_args(&args(&["suggest-prices"])).expect("parse");
        match config.command {
            Command::SuggestPrices {
                equipment_csv,
                loot_csv,
                spawn_csv,
                ..
            } => {
                assert_eq!(
                    equipment_csv,
                    PathBuf::from("data/output/workCopyEquipment_extended.csv")
                );
                assert_eq!(loot_csv, PathBuf::from("data/output/monster_loot_output.csv"));
                assert_eq!(
                    spawn_csv,
                    PathBuf::from("data/output/spawn_analysis_output.csv")
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn from_args_rejects_unknown_option() {
        let err = AppConfig::from_args(&args(&["suggest-prices", "--bogus=1"]))
            .expect_err("should fail");
        assert!(err.contains("unknown option '--bogus'"));
    }

    #[test]
    fn from_args_requires_spawn_file() {
        let err =
            AppConfig::from_args(&args(&["analyze-spawns"])).expect_err("should fail");
        assert!(err.contains("--spawn-file"));
    }

    #[test]
    fn settings_default_has_five_cities() {
        let settings = Settings::default();
        assert_eq!(settings.cities.len(), 5);
        assert_eq!(settings.cities[0].name, "Sagvana");
        assert_eq!(settings.cities[0].x, 1299);
        assert_eq!(settings.cities[0].radius, 200);
        assert!(settings
            .excluded_npcs
            .iter()
            .any(|name| name == "Rashid"));
    }

    #[test]
    fn settings_parse_from_yaml() {
        let yaml = "cities:\n  - name: Thais\n    x: 100\n    y: 200\n    radius: 150\n";
        let settings: Settings = serde_yaml::from_str(yaml).expect("yaml");
        assert_eq!(settings.cities.len(), 1);
        assert_eq!(settings.cities[0].z, 0);
        // denylist falls back to the default when omitted
        assert!(!settings.excluded_npcs.is_empty());
    }
}
