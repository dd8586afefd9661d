use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Canonicalize a free-text team name into the key used to join datasets
/// that spell the same school differently.
///
/// Lower-cases, drops parenthesized segments (records like "(37-3)"),
/// replaces `.` `'` `’` `&` `-` with spaces, and collapses whitespace.
/// Total and idempotent; never fails.
pub fn normalize_name(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut paren_depth = 0usize;
    for ch in raw.to_lowercase().chars() {
        match ch {
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            _ if paren_depth > 0 => {}
            '.' | '\'' | '’' | '&' | '-' => cleaned.push(' '),
            other => cleaned.push(other),
        }
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One-way map from a normalized bracket-side key to the canonical key used
/// by the statistical/historical datasets. Curated by hand; a lookup chain
/// follows at most one hop, and the map is neither reflexive nor transitive.
static NAME_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // "St" vs "State" (bracket abbreviates, history spells out).
        ("michigan st", "michigan state"),
        ("iowa st", "iowa state"),
        ("utah st", "utah state"),
        ("oklahoma st", "oklahoma state"),
        ("mississippi st", "mississippi state"),
        ("norfolk st", "norfolk state"),
        ("colorado st", "colorado state"),
        // "St" vs "Saint".
        ("st johns", "saint johns"),
        ("st marys", "saint marys"),
        ("st josephs", "saint josephs"),
        // Common abbreviations.
        ("ole miss", "mississippi"),
        ("uconn", "connecticut"),
        ("byu", "brigham young"),
        ("lsu", "louisiana state"),
        ("tcu", "texas christian"),
        ("smu", "southern methodist"),
        ("unlv", "nevada las vegas"),
        ("uncw", "unc wilmington"),
        ("siue", "siu edwardsville"),
        ("unc", "north carolina"),
        ("nc state", "north carolina state"),
    ])
});

/// Resolve one alias hop for an already-normalized key.
pub fn alias_for(normalized: &str) -> Option<&'static str> {
    NAME_ALIASES.get(normalized).copied()
}

/// Every curated alias pair, for data-driven regression tests.
pub fn alias_pairs() -> impl Iterator<Item = (&'static str, &'static str)> {
    NAME_ALIASES.iter().map(|(k, v)| (*k, *v))
}
