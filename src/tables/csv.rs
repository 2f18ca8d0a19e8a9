//! Record-level parsing and formatting for the `;`-separated table files the
//! pipeline exchanges. Quoting follows the usual CSV rules: fields containing
//! the separator, a quote, or a line break are wrapped in `"` with embedded
//! quotes doubled.

pub fn detect_separator(header_line: &str) -> char {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons >= commas {
        ';'
    } else {
        ','
    }
}

pub fn read_records(content: &str, separator: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }
        match ch {
            '"' if field.is_empty() && !field_started => {
                in_quotes = true;
                field_started = true;
            }
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                field_started = false;
                if !(record.len() == 1 && record[0].is_empty()) {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ if ch == separator => {
                record.push(std::mem::take(&mut field));
                field_started = false;
            }
            _ => {
                field.push(ch);
                field_started = true;
            }
        }
    }

    if field_started || !field.is_empty() || !record.is_empty() {
        record.push(field);
        if !(record.len() == 1 && record[0].is_empty()) {
            records.push(record);
        }
    }

    records
}

pub fn format_record(fields: &[String], separator: char) -> String {
    let mut line = String::new();
    for (idx, raw) in fields.iter().enumerate() {
        if idx > 0 {
            line.push(separator);
        }
        if needs_quoting(raw, separator) {
            line.push('"');
            for ch in raw.chars() {
                if ch == '"' {
                    line.push('"');
                }
                line.push(ch);
            }
            line.push('"');
        } else {
            line.push_str(raw);
        }
    }
    line.push('\n');
    line
}

fn needs_quoting(field: &str, separator: char) -> bool {
    field
        .chars()
        .any(|ch| ch == separator || ch == '"' || ch == '\n' || ch == '\r')
}
