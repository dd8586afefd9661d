use serde_json::Value;

/// Flatten a raw per-stat dataset into its row sequence.
///
/// The scraper emits either a paginated envelope (`[{ "data": [...] }, ...]`)
/// or a bare row array; both are accepted. Row order follows page order and
/// carries no meaning afterwards. Anything else yields no rows.
pub fn flatten_pages(dataset: &Value) -> Vec<&Value> {
    let Some(items) = dataset.as_array() else {
        return Vec::new();
    };
    let has_data_pages = items
        .iter()
        .any(|page| page.get("data").is_some_and(Value::is_array));
    if has_data_pages {
        items
            .iter()
            .filter_map(|page| page.get("data").and_then(Value::as_array))
            .flatten()
            .collect()
    } else {
        items.iter().collect()
    }
}

/// Parse a stat cell into a number. Numbers pass through; strings have any
/// `%` stripped and are parsed as floats. Everything else is no data.
pub fn parse_stat_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.replace('%', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Extract the team name of a row, if present and non-empty.
pub fn row_team(row: &Value) -> Option<&str> {
    let team = row.get("Team")?.as_str()?;
    if team.is_empty() { None } else { Some(team) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_paginated_envelope() {
        let paged = json!([
            { "data": [ { "Team": "A" }, { "Team": "B" } ] },
            { "data": [ { "Team": "C" } ] },
        ]);
        let rows = flatten_pages(&paged);
        assert_eq!(rows.len(), 3);
        assert_eq!(row_team(rows[2]), Some("C"));
    }

    #[test]
    fn accepts_bare_row_array() {
        let flat = json!([ { "Team": "A", "Pct": "91.4" } ]);
        assert_eq!(flatten_pages(&flat).len(), 1);
    }

    #[test]
    fn skips_malformed_pages_in_envelope() {
        let paged = json!([
            { "data": [ { "Team": "A" } ] },
            { "note": "truncated page" },
            { "data": "not an array" },
        ]);
        assert_eq!(flatten_pages(&paged).len(), 1);
    }

    #[test]
    fn non_array_dataset_is_empty() {
        assert!(flatten_pages(&json!({ "data": [] })).is_empty());
        assert!(flatten_pages(&Value::Null).is_empty());
    }

    #[test]
    fn parses_numbers_and_percent_strings() {
        assert_eq!(parse_stat_number(&json!(12.5)), Some(12.5));
        assert_eq!(parse_stat_number(&json!("91.4%")), Some(91.4));
        assert_eq!(parse_stat_number(&json!(" 48.0 ")), Some(48.0));
        assert_eq!(parse_stat_number(&json!("n/a")), None);
        assert_eq!(parse_stat_number(&json!("")), None);
        assert_eq!(parse_stat_number(&Value::Null), None);
        assert_eq!(parse_stat_number(&json!(true)), None);
    }
}
