use crate::xml::{self, XmlElement};
use std::collections::HashMap;
use std::path::Path;

/// Lookup between item ids and lowercased item names, built from the item
/// database file. Later duplicates win, matching the source file's own
/// override convention.
#[derive(Debug, Default)]
pub struct ItemCatalog {
    id_to_name: HashMap<u32, String>,
    name_to_id: HashMap<String, u32>,
}

impl ItemCatalog {
    pub fn load(path: &Path) -> Result<Self, String> {
        let root = xml::load_document(path)?;
        Self::from_document(&root)
            .map_err(|err| format!("items file {}: {}", path.display(), err))
    }

    pub fn from_document(root: &XmlElement) -> Result<Self, String> {
        if !root.name.eq_ignore_ascii_case("items") {
            return Err(format!("expected <items> root, got <{}>", root.name));
        }
        let mut catalog = ItemCatalog::default();
        for item in root.children_named("item") {
            let Some(id) = item.attribute_u32("id") else {
                continue;
            };
            let Some(name) = item.attribute("name") else {
                continue;
            };
            let name = name.trim().to_lowercase();
            if name.is_empty() {
                continue;
            }
            catalog.id_to_name.insert(id, name.clone());
            catalog.name_to_id.insert(name, id);
        }
        Ok(catalog)
    }

    pub fn name_by_id(&self, id: u32) -> Option<&str> {
        self.id_to_name.get(&id).map(String::as_str)
    }

    pub fn id_by_name(&self, name: &str) -> Option<u32> {
        self.name_to_id.get(&name.trim().to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.id_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_name.is_empty()
    }
}
