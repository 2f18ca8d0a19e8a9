use crate::xml::{self, XmlElement};
use std::path::Path;

/// One monster placement at an absolute world coordinate, expanded from a
/// spawn group's center plus the monster's offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnObservation {
    pub monster: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

pub fn load_spawn_file(path: &Path) -> Result<Vec<SpawnObservation>, String> {
    let root = xml::load_document(path)?;
    parse_spawn_document(&root)
        .map_err(|err| format!("spawn file {}: {}", path.display(), err))
}

pub fn parse_spawn_document(root: &XmlElement) -> Result<Vec<SpawnObservation>, String> {
    if !root.name.eq_ignore_ascii_case("spawns") {
        return Err(format!("expected <spawns> root, got <{}>", root.name));
    }

    let mut observations = Vec::new();
    for spawn in root.children_named("spawn") {
        let center_x = spawn.attribute_i64("centerx").unwrap_or(0) as i32;
        let center_y = spawn.attribute_i64("centery").unwrap_or(0) as i32;
        let center_z = spawn.attribute_i64("centerz").unwrap_or(0) as i32;

        for monster in spawn.children_named("monster") {
            let Some(name) = monster.attribute("name") else {
                // Nameless entries cannot be matched against loot data.
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            observations.push(SpawnObservation {
                monster: name.to_string(),
                x: center_x + monster.attribute_i64("x").unwrap_or(0) as i32,
                y: center_y + monster.attribute_i64("y").unwrap_or(0) as i32,
                z: center_z + monster.attribute_i64("z").unwrap_or(0) as i32,
            });
        }
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_spawn_document_expands_center_plus_offset() {
        let root = xml::parse_document(
            r#"<spawns>
    <spawn centerx="1299" centery="1553" centerz="7" radius="10">
        <monster name="Rat" x="1" y="1" z="0" spawntime="60"/>
        <monster name="Rat" x="-2" y="0" z="0" spawntime="60"/>
        <monster name="Snake" x="0" y="3" z="0" spawntime="90"/>
    </spawn>
</spawns>"#,
        )
        .expect("xml");
        let observations = parse_spawn_document(&root).expect("parse");
        assert_eq!(observations.len(), 3);
        assert_eq!(
            observations[0],
            SpawnObservation {
                monster: "Rat".to_string(),
                x: 1300,
                y: 1554,
                z: 7,
            }
        );
        assert_eq!(observations[1].x, 1297);
        assert_eq!(observations[2].monster, "Snake");
    }

    #[test]
    fn parse_spawn_document_skips_nameless_monsters() {
        let root = xml::parse_document(
            r#"<spawns>
    <spawn centerx="10" centery="20" centerz="7">
        <monster x="0" y="0" z="0"/>
        <monster name="  " x="0" y="0" z="0"/>
        <monster name="Wolf" x="0" y="0" z="0"/>
    </spawn>
</spawns>"#,
        )
        .expect("xml");
        let observations = parse_spawn_document(&root).expect("parse");
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].monster, "Wolf");
    }

    #[test]
    fn parse_spawn_document_defaults_missing_coordinates_to_zero() {
        let root = xml::parse_document(
            r#"<spawns><spawn><monster name="Bug"/></spawn></spawns>"#,
        )
        .expect("xml");
        let observations = parse_spawn_document(&root).expect("parse");
        assert_eq!(observations[0].x, 0);
        assert_eq!(observations[0].y, 0);
        assert_eq!(observations[0].z, 0);
    }

    #[test]
    fn parse_spawn_document_rejects_wrong_root() {
        let root = xml::parse_document("<monsters/>").expect("xml");
        let err = parse_spawn_document(&root).expect_err("should fail");
        assert!(err.contains("expected <spawns>"));
    }
}
