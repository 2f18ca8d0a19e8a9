/// One node of a monster's loot tree. Container drops carry their contents
/// in `inside`; chance is parts per 100000.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LootItem {
    pub name: Option<String>,
    pub id: Option<u32>,
    pub chance: u32,
    pub count_max: Option<u32>,
    pub inside: Vec<LootItem>,
}

impl LootItem {
    pub fn leaf(name: &str, chance: u32) -> Self {
        LootItem {
            name: Some(name.to_string()),
            id: None,
            chance,
            count_max: None,
            inside: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonsterLoot {
    pub monster: String,
    pub items: Vec<LootItem>,
}

impl MonsterLoot {
    pub fn new(monster: impl Into<String>, items: Vec<LootItem>) -> Self {
        MonsterLoot {
            monster: monster.into(),
            items,
        }
    }

    pub fn items(&self) -> &[LootItem] {
        &self.items
    }

    /// Every item in the tree, container contents included, as one flat
    /// sequence. Walked with an explicit stack so arbitrarily deep nesting
    /// cannot exhaust the call stack; the stack reverses sibling order,
    /// which consumers must not rely on (they only ever sum).
    pub fn all_items_recursive(&self) -> Vec<&LootItem> {
        let mut flattened = Vec::new();
        let mut stack: Vec<&LootItem> = self.items.iter().collect();
        while let Some(item) = stack.pop() {
            flattened.push(item);
            stack.extend(item.inside.iter());
        }
        flattened
    }
}
