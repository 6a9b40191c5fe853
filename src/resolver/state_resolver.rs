//! Block state to variant selection.

use crate::catalog::blockstate::parse_state_string;
use crate::catalog::{BlockStateEntry, VariantSpec};

/// The variant picked for a state string.
#[derive(Debug, Clone, Copy)]
pub struct VariantSelection<'a> {
    pub spec: &'a VariantSpec,
    /// Canonical key the variant is stored under.
    pub key: &'a str,
    /// True when the exact state combination had no variant of its own.
    pub fallback: bool,
}

/// Pick the variant for a canonical state string.
///
/// Order: exact key, then the empty (base) key, then the best partial key
/// whose every property agrees with the state, then the most default-looking
/// key overall. Unknown or partial combinations never fail while the entry
/// has at least one variant.
pub fn select_variant<'a>(entry: &'a BlockStateEntry, state: &str) -> Option<VariantSelection<'a>> {
    if let Some((key, specs)) = entry.variants.get_key_value(state) {
        return specs.first().map(|spec| VariantSelection {
            spec,
            key,
            fallback: false,
        });
    }

    let chosen = entry
        .variants
        .get_key_value("")
        .or_else(|| best_consistent_variant(entry, state))
        .or_else(|| most_default_variant(entry))?;

    let (key, specs) = chosen;
    specs.first().map(|spec| VariantSelection {
        spec,
        key,
        fallback: true,
    })
}

/// Variant keys that do not contradict any property of the state. Extra
/// state properties missing from the key are ignored. Prefers keys matching
/// more properties, then keys whose remaining properties look like defaults.
fn best_consistent_variant<'a>(
    entry: &'a BlockStateEntry,
    state: &str,
) -> Option<(&'a String, &'a Vec<VariantSpec>)> {
    let state_pairs = parse_state_string(state);
    let state_value = |prop: &str| {
        state_pairs
            .iter()
            .find(|(k, _)| *k == prop)
            .map(|(_, v)| *v)
    };

    entry
        .variants
        .iter()
        .filter_map(|(key, specs)| {
            let mut matched = 0;
            let mut default_score = 0;
            for (prop, value) in parse_state_string(key) {
                match state_value(prop) {
                    Some(actual) if actual == value => matched += 1,
                    Some(_) => return None,
                    None => default_score += value_default_score(prop, value),
                }
            }
            Some(((matched, default_score), (key, specs)))
        })
        .max_by(|(a, (ka, _)), (b, (kb, _))| a.cmp(b).then_with(|| kb.cmp(ka)))
        .map(|(_, found)| found)
}

fn most_default_variant(entry: &BlockStateEntry) -> Option<(&String, &Vec<VariantSpec>)> {
    entry
        .variants
        .iter()
        .map(|(key, specs)| {
            let score: i32 = parse_state_string(key)
                .into_iter()
                .map(|(prop, value)| value_default_score(prop, value))
                .sum();
            (score, (key, specs))
        })
        .max_by(|(a, (ka, _)), (b, (kb, _))| a.cmp(b).then_with(|| kb.cmp(ka)))
        .map(|(_, found)| found)
}

/// How "default-like" a property value is. Higher is more default.
fn value_default_score(property: &str, value: &str) -> i32 {
    if let Ok(num) = value.parse::<i32>() {
        return -num * 10;
    }

    match (property, value) {
        ("axis", "y") => 50,
        ("half", "bottom" | "lower") => 50,
        ("half", "top" | "upper") => -50,
        ("type", "single" | "normal" | "bottom") => 50,
        ("type", "double" | "top") => -50,
        ("facing", "north") => 50,
        ("facing", "south") => 40,
        ("facing", "east") => 30,
        ("facing", "west") => 20,
        ("shape", "straight") => 50,
        ("north" | "south" | "east" | "west", "none" | "false") => 50,
        ("north" | "south" | "east" | "west", "true" | "tall") => -50,
        (_, "false" | "off" | "none") => 100,
        (_, "true" | "on") => -100,
        _ => 0,
    }
}
