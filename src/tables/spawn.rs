use crate::tables::csv;
use crate::world::proximity::MonsterCount;
use std::path::Path;

const HEADER: [&str; 4] = ["City", "Radius", "Monster", "Count"];

pub fn write_spawn_analysis(path: &Path, rows: &[MonsterCount]) -> Result<(), String> {
    let mut out = csv::format_record(
        &HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        ';',
    );
    for row in rows {
        out.push_str(&csv::format_record(
            &[
                row.city.clone(),
                row.radius.to_string(),
                row.monster.clone(),
                row.count.to_string(),
            ],
            ';',
        ));
    }
    std::fs::write(path, out)
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))
}

pub fn read_spawn_analysis(path: &Path) -> Result<Vec<MonsterCount>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {}", path.display(), err))?;
    parse_spawn_analysis(&content)
        .map_err(|err| format!("spawn analysis {}: {}", path.display(), err))
}

fn parse_spawn_analysis(content: &str) -> Result<Vec<MonsterCount>, String> {
    let records = csv::read_records(content, ';');
    let mut records = records.into_iter();
    let header = records.next().ok_or_else(|| "file is empty".to_string())?;
    if header != HEADER {
        return Err(format!(
            "invalid header, expected {}",
            HEADER.join(";")
        ));
    }

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        let line_no = idx + 2;
        if record.len() < 4 {
            return Err(format!("line {}: expected 4 fields", line_no));
        }
        let radius = record[1]
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("line {}: invalid radius '{}'", line_no, record[1]))?;
        let count = record[3]
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("line {}: invalid count '{}'", line_no, record[3]))?;
        rows.push(MonsterCount {
            city: record[0].trim().to_string(),
            radius,
            monster: record[2].trim_matches(|c| c == ' ' || c == '"').to_string(),
            count,
        });
    }
    Ok(rows)
}
