use crate::tables::csv;
use std::collections::HashMap;
use std::path::Path;

/// Canonical columns every loaded table exposes, appended empty when the
/// source file lacks them.
pub const CANONICAL_COLUMNS: [&str; 8] = [
    "id",
    "name",
    "Buy",
    "Sell",
    "weaponType",
    "slotType",
    "Tibia Buy Price",
    "Tibia Sell Price",
];

/// The equipment reference table: header-normalized, canonical-padded rows
/// with every unrecognized column carried through untouched so a rewrite
/// preserves the file's layout.
#[derive(Debug)]
pub struct EquipmentFile {
    pub headers: Vec<String>,
    separator: char,
    columns: HashMap<&'static str, usize>,
    pub rows: Vec<Vec<String>>,
}

impl EquipmentFile {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
        Self::from_content(&content)
            .map_err(|err| format!("equipment csv {}: {}", path.display(), err))
    }

    pub fn from_content(content: &str) -> Result<Self, String> {
        let first_line = content.lines().find(|line| !line.trim().is_empty());
        let separator = csv::detect_separator(first_line.unwrap_or(""));
        let mut records = csv::read_records(content, separator).into_iter();

        let raw_headers = records.next().ok_or_else(|| "file is empty".to_string())?;
        let mut headers: Vec<String> = raw_headers
            .iter()
            .map(|header| strip_bom(header).trim().to_string())
            .collect();

        let mut columns: HashMap<&'static str, usize> = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(canonical) = canonical_for(header) {
                columns.entry(canonical).or_insert(idx);
            }
        }
        // A file exported under friendlier names still has to land on
        // Buy/Sell; "tibia" columns are baselines, never suggestion targets.
        for (canonical, word) in [("Buy", "buy"), ("Sell", "sell")] {
            if !columns.contains_key(canonical) {
                if let Some(idx) = headers.iter().position(|header| {
                    contains_word(header, word) && !header.to_lowercase().contains("tibia")
                }) {
                    columns.insert(canonical, idx);
                }
            }
        }
        for canonical in CANONICAL_COLUMNS {
            if !columns.contains_key(canonical) {
                columns.insert(canonical, headers.len());
                headers.push(canonical.to_string());
            }
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for record in records {
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            let mut row: Vec<String> = record
                .iter()
                .map(|cell| strip_bom(cell).trim().to_string())
                .collect();
            row.resize(width, String::new());
            if row[columns["name"]].is_empty() {
                continue;
            }
            rows.push(row);
        }

        Ok(EquipmentFile {
            headers,
            separator,
            columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of a row by canonical column name, falling back to a literal
    /// header match for passthrough columns; empty cells read as `None`.
    pub fn field<'a>(&self, row: &'a [String], column: &str) -> Option<&'a str> {
        let idx = match self.columns.get(column) {
            Some(&idx) => idx,
            None => self
                .headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(column))?,
        };
        let cell = row.get(idx)?.as_str();
        if cell.is_empty() {
            None
        } else {
            Some(cell)
        }
    }

    pub fn name<'a>(&self, row: &'a [String]) -> Option<&'a str> {
        self.field(row, "name")
    }

    pub fn id(&self, row: &[String]) -> Option<i64> {
        self.field(row, "id")?.trim().parse::<i64>().ok()
    }

    pub fn set_field(&mut self, row_index: usize, column: &str, value: String) {
        if let (Some(&idx), Some(row)) = (self.columns.get(column), self.rows.get_mut(row_index))
        {
            row[idx] = value;
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        let mut out = csv::format_record(&self.headers, self.separator);
        for row in &self.rows {
            out.push_str(&csv::format_record(row, self.separator));
        }
        std::fs::write(path, out)
            .map_err(|err| format!("failed to write {}: {}", path.display(), err))
    }
}

fn canonical_for(header: &str) -> Option<&'static str> {
    let normalized = normalize_header(header);
    match normalized.as_str() {
        "id" => Some("id"),
        "name" => Some("name"),
        "buy" => Some("Buy"),
        "sell" => Some("Sell"),
        "weapontype" | "weapon type" => Some("weaponType"),
        "slottype" | "slot type" => Some("slotType"),
        "tibia buy price" => Some("Tibia Buy Price"),
        "tibia sell price" => Some("Tibia Sell Price"),
        _ => None,
    }
}

fn normalize_header(header: &str) -> String {
    strip_bom(header)
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_bom(cell: &str) -> &str {
    cell.strip_prefix('\u{feff}').unwrap_or(cell)
}

fn contains_word(haystack: &str, word: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let begin = start + pos;
        let end = begin + word.len();
        let boundary_before = begin == 0
            || !haystack[..begin]
                .chars()
                .next_back()
                .is_some_and(|ch| ch.is_alphanumeric());
        let boundary_after = !haystack[end..]
            .chars()
            .next()
            .is_some_and(|ch| ch.is_alphanumeric());
        if boundary_before && boundary_after {
            return true;
        }
        start = end;
    }
    false
}
