//! Block-state tables: state-property combinations mapped to model variants.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// A block-state table entry for one block type.
///
/// Variant keys are stored in canonical form (pairs sorted by property name),
/// so lookups can compare them directly against [`build_state_string`] output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStateEntry {
    pub variants: BTreeMap<String, Vec<VariantSpec>>,
}

impl<'de> Deserialize<'de> for BlockStateEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawEntry {
            #[serde(default)]
            variants: HashMap<String, VariantValue>,
        }

        let raw = RawEntry::deserialize(deserializer)?;
        let variants = raw
            .variants
            .into_iter()
            .map(|(key, value)| (canonicalize_state_string(&key), value.into_vec()))
            .filter(|(_, specs)| !specs.is_empty())
            .collect();
        Ok(BlockStateEntry { variants })
    }
}

impl BlockStateEntry {
    /// First (authoritative) variant stored under a canonical key.
    pub fn variant(&self, key: &str) -> Option<&VariantSpec> {
        self.variants.get(key).and_then(|specs| specs.first())
    }
}

/// A single variant or an array of weighted alternatives.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum VariantValue {
    Single(VariantSpec),
    Multiple(Vec<VariantSpec>),
}

impl VariantValue {
    fn into_vec(self) -> Vec<VariantSpec> {
        match self {
            VariantValue::Single(v) => vec![v],
            VariantValue::Multiple(v) => v,
        }
    }
}

/// The model and whole-model rotation chosen for one state combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSpec {
    pub model: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub uvlock: bool,
    /// Only the first alternative is used, so weights are carried but ignored.
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl VariantSpec {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            x: 0,
            y: 0,
            uvlock: false,
            weight: 1,
        }
    }
}

/// Build the canonical state string: `key=value` pairs sorted by key and
/// joined with commas. No properties gives the empty string.
///
/// e.g. {"waterlogged": false, "age": 2} -> "age=2,waterlogged=false"
pub fn build_state_string<I, K, V>(properties: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let sorted: BTreeMap<String, String> = properties
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.to_string()))
        .collect();

    sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a state string back into `(property, value)` pairs.
pub fn parse_state_string(key: &str) -> Vec<(&str, &str)> {
    key.split(',')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .collect()
}

/// Re-sort a state string written in arbitrary order.
fn canonicalize_state_string(key: &str) -> String {
    build_state_string(parse_state_string(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_variants() {
        let json = r#"{ "variants": { "": { "model": "block/stone" } } }"#;
        let entry: BlockStateEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.variant("").unwrap().model, "block/stone");
    }

    #[test]
    fn test_parse_variants_with_rotation() {
        let json = r#"{
            "variants": {
                "facing=north": { "model": "block/furnace" },
                "facing=east": { "model": "block/furnace", "y": 90 },
                "facing=up": { "model": "block/furnace", "x": 270, "uvlock": true }
            }
        }"#;
        let entry: BlockStateEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.variants.len(), 3);
        assert_eq!(entry.variant("facing=east").unwrap().y, 90);
        let up = entry.variant("facing=up").unwrap();
        assert_eq!(up.x, 270);
        assert!(up.uvlock);
    }

    #[test]
    fn test_weighted_variants_keep_first() {
        let json = r#"{
            "variants": {
                "": [
                    { "model": "block/stone", "weight": 10 },
                    { "model": "block/stone_mirrored", "weight": 5 }
                ]
            }
        }"#;
        let entry: BlockStateEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.variants[""].len(), 2);
        assert_eq!(entry.variant("").unwrap().model, "block/stone");
    }

    #[test]
    fn test_variant_keys_are_canonicalized() {
        let json = r#"{ "variants": { "half=top,facing=north": { "model": "block/door_top" } } }"#;
        let entry: BlockStateEntry = serde_json::from_str(json).unwrap();
        assert!(entry.variant("facing=north,half=top").is_some());
    }

    #[test]
    fn test_build_state_string_sorts_and_stringifies() {
        let props = vec![("waterlogged", false.to_string()), ("age", 2.to_string())];
        assert_eq!(build_state_string(props), "age=2,waterlogged=false");

        let typed: Vec<(&str, bool)> = vec![("powered", true)];
        assert_eq!(build_state_string(typed), "powered=true");
    }

    #[test]
    fn test_build_state_string_empty() {
        let props: HashMap<String, String> = HashMap::new();
        assert_eq!(build_state_string(&props), "");
    }

    #[test]
    fn test_parse_state_string() {
        assert_eq!(
            parse_state_string("facing=north,half=top"),
            vec![("facing", "north"), ("half", "top")]
        );
        assert!(parse_state_string("").is_empty());
    }
}
