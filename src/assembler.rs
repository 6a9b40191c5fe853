//! Instance assembly and scene registration.
//!
//! One [`RenderUnit`] holds shared geometry, a shared material and one
//! translation per block occurrence. Orientation is already baked into the
//! geometry, so instances never rotate.

use crate::atlas::AtlasHandle;
use crate::baker::GeometryBuffer;
use crate::types::StateKey;
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Scene identity of a render unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderUnitKey {
    pub chunk: (i32, i32, i32),
    pub state: StateKey,
}

impl RenderUnitKey {
    pub fn new(chunk: (i32, i32, i32), state: StateKey) -> Self {
        Self { chunk, state }
    }
}

impl fmt::Display for RenderUnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y, z) = self.chunk;
        write!(f, "{}@{},{},{}", self.state, x, y, z)
    }
}

/// Material shared by every instance of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Material {
    pub name: String,
    pub atlas: AtlasHandle,
}

impl Material {
    pub fn new(name: impl Into<String>, atlas: AtlasHandle) -> Self {
        Self {
            name: name.into(),
            atlas,
        }
    }
}

/// Shared geometry and material drawn once per instance transform.
#[derive(Debug, Clone)]
pub struct RenderUnit {
    pub key: RenderUnitKey,
    pub geometry: Arc<GeometryBuffer>,
    pub material: Material,
    /// Translation-only local transforms.
    pub instances: Vec<Mat4>,
}

impl RenderUnit {
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Translation part of each instance transform.
    pub fn translations(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.instances
            .iter()
            .map(|m| m.w_axis.truncate().to_array())
    }
}

/// Build a render unit with one translation per world position.
pub fn assemble(
    key: RenderUnitKey,
    geometry: Arc<GeometryBuffer>,
    material: Material,
    positions: &[[f32; 3]],
) -> RenderUnit {
    let instances = positions
        .iter()
        .map(|p| Mat4::from_translation(Vec3::from(*p)))
        .collect();
    RenderUnit {
        key,
        geometry,
        material,
        instances,
    }
}

/// The scene graph a conversion run feeds.
pub trait SceneSink {
    /// Register a unit, returning the unit it replaced under the same key.
    fn register(&mut self, unit: RenderUnit) -> Option<RenderUnit>;
}

/// A scene that just keeps the registered units, ordered by key.
#[derive(Debug, Default)]
pub struct InMemoryScene {
    units: BTreeMap<RenderUnitKey, RenderUnit>,
}

impl InMemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &RenderUnitKey) -> Option<&RenderUnit> {
        self.units.get(key)
    }

    pub fn units(&self) -> impl Iterator<Item = &RenderUnit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn total_instances(&self) -> usize {
        self.units.values().map(RenderUnit::instance_count).sum()
    }

    pub fn remove(&mut self, key: &RenderUnitKey) -> Option<RenderUnit> {
        self.units.remove(key)
    }
}

impl SceneSink for InMemoryScene {
    fn register(&mut self, unit: RenderUnit) -> Option<RenderUnit> {
        let replaced = self.units.insert(unit.key.clone(), unit);
        if let Some(old) = &replaced {
            log::debug!("Replaced render unit {}", old.key);
        }
        replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn key(block: &str) -> RenderUnitKey {
        RenderUnitKey::new((0, 0, 0), StateKey::new(block, &HashMap::new()))
    }

    #[test]
    fn test_instances_are_translations() {
        let unit = assemble(
            key("stone"),
            Arc::new(GeometryBuffer::new()),
            Material::default(),
            &[[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]],
        );
        assert_eq!(unit.instance_count(), 2);
        assert_eq!(
            unit.translations().collect::<Vec<_>>(),
            vec![[0.0, 0.0, 0.0], [1.0, 2.0, 3.0]]
        );
        for m in &unit.instances {
            assert_eq!(Mat4::from_translation(m.w_axis.truncate()), *m);
        }
    }

    #[test]
    fn test_register_replaces_same_key() {
        let mut scene = InMemoryScene::new();
        let geometry = Arc::new(GeometryBuffer::new());

        let first = assemble(key("stone"), Arc::clone(&geometry), Material::default(), &[[0.0; 3]]);
        assert!(scene.register(first).is_none());

        let second = assemble(
            key("stone"),
            Arc::clone(&geometry),
            Material::default(),
            &[[0.0; 3], [1.0, 0.0, 0.0]],
        );
        let replaced = scene.register(second).unwrap();
        assert_eq!(replaced.instance_count(), 1);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.total_instances(), 2);

        scene.register(assemble(key("dirt"), geometry, Material::default(), &[[0.0; 3]]));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_key_display() {
        let props: HashMap<String, String> =
            [("hanging".to_string(), "true".to_string())].into_iter().collect();
        let k = RenderUnitKey::new((1, -2, 3), StateKey::new("lantern", &props));
        assert_eq!(k.to_string(), "lantern[hanging=true]@1,-2,3");
    }
}
