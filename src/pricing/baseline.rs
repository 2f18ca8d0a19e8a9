use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Buy,
    Sell,
}

/// Reduces one raw scraped price cell to a single baseline price for a city.
///
/// Accepted shapes, tried in order:
/// - a JSON object mapping city name to samples (a list of integers, a
///   single integer, or an object NPC-name → integer),
/// - a plain integer or a "low-high" range string (averaged, half up),
/// - anything else → `None`. Malformed JSON is not an error; it degrades to
///   the scalar path.
pub fn resolve_baseline(
    raw: Option<&str>,
    city: &str,
    kind: PriceKind,
    excluded_npcs: &[String],
) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        if let Some(value) = map.get(city) {
            let samples = collect_samples(value, excluded_npcs);
            if !samples.is_empty() {
                return Some(resolve_samples(&samples, kind));
            }
        }
        // No usable data for this city: reduce every non-denylisted entry
        // city-agnostically instead.
        let mut samples = Vec::new();
        for (key, value) in &map {
            if is_excluded(key, excluded_npcs) {
                continue;
            }
            samples.extend(collect_samples(value, excluded_npcs));
        }
        if samples.is_empty() {
            return None;
        }
        return Some(resolve_samples(&samples, kind));
    }

    parse_scalar(raw)
}

/// Mode of the samples; frequency ties fall back to the median of the whole
/// list, and if that resolves nothing either, to the lowest tied value for
/// sell and the highest for buy (both protect the shop's margin).
pub fn resolve_samples(samples: &[i64], kind: PriceKind) -> i64 {
    debug_assert!(!samples.is_empty());
    if samples.len() == 1 {
        return samples[0];
    }

    let mut counts: std::collections::BTreeMap<i64, usize> = std::collections::BTreeMap::new();
    for &sample in samples {
        *counts.entry(sample).or_insert(0) += 1;
    }
    let top_frequency = counts.values().copied().max().unwrap_or(0);
    let tied: Vec<i64> = counts
        .iter()
        .filter(|(_, &frequency)| frequency == top_frequency)
        .map(|(&value, _)| value)
        .collect();
    if tied.len() == 1 {
        return tied[0];
    }

    // Doubled median keeps even-length medians integral for the equality
    // check below.
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    let median_doubled = if n % 2 == 1 {
        2 * sorted[n / 2]
    } else {
        sorted[n / 2 - 1] + sorted[n / 2]
    };
    if let Some(&resolved) = tied.iter().find(|&&candidate| 2 * candidate == median_doubled) {
        return resolved;
    }

    match kind {
        PriceKind::Sell => tied[0],
        PriceKind::Buy => tied[tied.len() - 1],
    }
}

fn collect_samples(value: &Value, excluded_npcs: &[String]) -> Vec<i64> {
    match value {
        Value::Number(_) | Value::String(_) => sample_from_scalar(value).into_iter().collect(),
        Value::Array(entries) => entries.iter().filter_map(sample_from_scalar).collect(),
        Value::Object(per_npc) => per_npc
            .iter()
            .filter(|(npc, _)| !is_excluded(npc, excluded_npcs))
            .filter_map(|(_, price)| sample_from_scalar(price))
            .collect(),
        _ => Vec::new(),
    }
}

fn sample_from_scalar(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn is_excluded(name: &str, excluded_npcs: &[String]) -> bool {
    excluded_npcs
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(name.trim()))
}

fn parse_scalar(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        return Some(value);
    }
    let (low, high) = raw.split_once('-')?;
    let low = low.trim().parse::<i64>().ok()?;
    let high = high.trim().parse::<i64>().ok()?;
    Some(((low + high) as f64 / 2.0).round() as i64)
}
