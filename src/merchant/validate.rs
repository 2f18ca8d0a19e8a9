use crate::tables::equipment::EquipmentFile;
use serde_json::Value;
use std::collections::HashMap;

/// Checks the rows the merchant generator is about to consume. Returns one
/// message per defect; callers decide whether defects abort the run.
pub fn validate(file: &EquipmentFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen_ids: HashMap<i64, usize> = HashMap::new();

    for (idx, row) in file.rows.iter().enumerate() {
        // header occupies line 1
        let row_no = idx + 2;

        if file.name(row).is_none() {
            errors.push(format!("Row {}: missing required column 'name'.", row_no));
        }
        match file.field(row, "id") {
            None => errors.push(format!("Row {}: missing required column 'id'.", row_no)),
            Some(raw) => match raw.trim().parse::<i64>() {
                Err(_) => errors.push(format!("Row {}: id must be numeric.", row_no)),
                Ok(id) if id <= 0 => {
                    errors.push(format!("Row {}: id must be > 0.", row_no));
                }
                Ok(id) => {
                    if let Some(first_row) = seen_ids.get(&id) {
                        errors.push(format!(
                            "Row {}: duplicate id {} (also on row {}).",
                            row_no, id, first_row
                        ));
                    } else {
                        seen_ids.insert(id, row_no);
                    }
                }
            },
        }

        for column in ["Buy", "Sell"] {
            let Some(cell) = file.field(row, column) else {
                continue;
            };
            match serde_json::from_str::<Value>(cell) {
                Err(_) => errors.push(format!(
                    "Row {}: column '{}' is not valid JSON.",
                    row_no, column
                )),
                Ok(Value::Object(map)) => {
                    for (city, price) in &map {
                        if !matches!(price, Value::Null | Value::Number(_)) {
                            errors.push(format!(
                                "Row {}: '{}' price for city '{}' must be integer or null.",
                                row_no, column, city
                            ));
                        }
                    }
                }
                Ok(_) => errors.push(format!(
                    "Row {}: column '{}' must be a JSON object of city prices.",
                    row_no, column
                )),
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content: &str) -> EquipmentFile {
        EquipmentFile::from_content(content).expect("load")
    }

    #[test]
    fn validate_accepts_clean_rows() {
        let file = file(
            "id;name;Buy;Sell\n\
1;sword;\"{\"\"Sagvana\"\":100}\";\"{\"\"Sagvana\"\":40}\"\n\
2;shield;;\n",
        );
        assert!(validate(&file).is_empty());
    }

    #[test]
    fn validate_flags_duplicate_ids() {
        let file = file("id;name\n9;sword\n9;shield\n");
        let errors = validate(&file);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("duplicate id 9"));
        assert!(errors[0].contains("row 2"));
    }

    #[test]
    fn validate_flags_bad_ids() {
        let file = file("id;name\nx;sword\n0;shield\n;mace\n");
        let errors = validate(&file);
        assert!(errors.iter().any(|e| e.contains("id must be numeric")));
        assert!(errors.iter().any(|e| e.contains("id must be > 0")));
        assert!(errors.iter().any(|e| e.contains("missing required column 'id'")));
    }

    #[test]
    fn validate_flags_malformed_price_cells() {
        let file = file(
            "id;name;Buy;Sell\n\
1;sword;{broken;\"[1,2]\"\n\
2;shield;\"{\"\"Agren\"\":\"\"high\"\"}\";\n",
        );
        let errors = validate(&file);
        assert!(errors.iter().any(|e| e.contains("not valid JSON")));
        assert!(errors
            .iter()
            .any(|e| e.contains("must be a JSON object of city prices")));
        assert!(errors
            .iter()
            .any(|e| e.contains("price for city 'Agren' must be integer or null")));
    }
}
