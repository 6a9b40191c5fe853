//! Composite models that a single parent chain cannot express.
//!
//! Hanging fixtures pick one of two templates from a boolean property.
//! Connected panes are assembled from a post, rotated side panels and a
//! fallback used when nothing connects.

use super::model_resolver::{finalize, flatten, flatten_definition};
use super::{Degradation, ResolvedModel};
use crate::catalog::{CubeElement, ModelCatalog, ModelDefinition};
use crate::error::Result;
use crate::types::{Axis, BlockTransform, Direction};
use std::collections::HashMap;

const STAINED_GLASS_PANE_SUFFIX: &str = "_stained_glass_pane";

/// How a block type is turned into a resolved model. Decided once per
/// canonical block name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockFamily {
    /// Blockstate variant plus parent chain.
    Generic,
    HangingFixture(FixtureTemplates),
    ConnectedPane(PaneTemplates),
}

/// The two base models of a fixture and the texture bound into them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureTemplates {
    pub standing: String,
    pub hanging: String,
    /// State property selecting the hanging template when "true".
    pub property: String,
    pub texture: String,
}

/// Post, side and no-side models of a pane plus its two textures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneTemplates {
    pub post: String,
    pub side: String,
    pub noside: String,
    pub pane_texture: String,
    pub edge_texture: String,
}

/// Map a canonical block name to the family that builds it.
pub fn dispatch(block: &str) -> BlockFamily {
    match block {
        "lantern" | "soul_lantern" => BlockFamily::HangingFixture(FixtureTemplates {
            standing: "block/template_lantern".to_string(),
            hanging: "block/template_hanging_lantern".to_string(),
            property: "hanging".to_string(),
            texture: format!("block/{}", block),
        }),
        "glass_pane" => BlockFamily::ConnectedPane(pane_templates("glass")),
        _ => match block.strip_suffix(STAINED_GLASS_PANE_SUFFIX) {
            Some(color) if !color.is_empty() => {
                BlockFamily::ConnectedPane(pane_templates(&format!("{}_stained_glass", color)))
            }
            _ => BlockFamily::Generic,
        },
    }
}

fn pane_templates(glass: &str) -> PaneTemplates {
    PaneTemplates {
        post: "block/template_glass_pane_post".to_string(),
        side: "block/template_glass_pane_side".to_string(),
        noside: "block/template_glass_pane_noside".to_string(),
        pane_texture: format!("block/{}", glass),
        edge_texture: format!("block/{}_pane_top", glass),
    }
}

fn is_true(properties: &HashMap<String, String>, key: &str) -> bool {
    properties
        .get(key)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Select the standing or hanging template and resolve it with the fixture
/// texture attached, exactly like an ordinary child model.
pub fn build_fixture(
    catalog: &ModelCatalog,
    block: &str,
    templates: &FixtureTemplates,
    properties: &HashMap<String, String>,
) -> Result<ResolvedModel> {
    let hanging = is_true(properties, &templates.property);
    let template = if hanging {
        &templates.hanging
    } else {
        &templates.standing
    };
    log::debug!("{}: using fixture template {}", block, template);

    let name = if hanging {
        format!("block/{}_hanging", block)
    } else {
        format!("block/{}", block)
    };
    let definition = ModelDefinition::with_parent(template.as_str())
        .with_texture("lantern", templates.texture.as_str())
        .with_texture("particle", templates.texture.as_str());

    let flat = flatten_definition(catalog, &name, &definition)?;
    Ok(finalize(
        catalog,
        &name,
        flat,
        BlockTransform::default(),
        Degradation::default(),
    ))
}

/// Concatenate the post with one rotated side panel per connected direction,
/// or with the no-side model when no direction connects.
pub fn build_pane(
    catalog: &ModelCatalog,
    block: &str,
    templates: &PaneTemplates,
    properties: &HashMap<String, String>,
) -> Result<ResolvedModel> {
    let post = flatten(catalog, &templates.post)?;
    let mut textures = post.textures.clone();
    let mut elements = post.elements;

    let connected: Vec<Direction> = Direction::HORIZONTAL
        .into_iter()
        .filter(|dir| is_true(properties, &dir.to_string()))
        .collect();

    if connected.is_empty() {
        let noside = flatten(catalog, &templates.noside)?;
        textures.extend(noside.textures);
        elements.extend(noside.elements);
    } else {
        let side = flatten(catalog, &templates.side)?;
        textures.extend(side.textures);
        for dir in &connected {
            let degrees = dir.y_rotation_from_north().unwrap_or(0);
            elements.extend(side.elements.iter().map(|e| rotate_element_y(e, degrees)));
        }
    }
    log::debug!("{}: pane with {} connected sides", block, connected.len());

    textures.insert("pane".to_string(), templates.pane_texture.clone());
    textures.insert("edge".to_string(), templates.edge_texture.clone());
    textures.insert("particle".to_string(), templates.pane_texture.clone());

    let flat = ModelDefinition {
        parent: None,
        textures,
        elements,
    };
    Ok(finalize(
        catalog,
        &format!("block/{}", block),
        flat,
        BlockTransform::default(),
        Degradation::default(),
    ))
}

/// Rotate an element about the block center [8, 8, 8] by a multiple of 90
/// degrees, clockwise seen from above (north goes to east).
///
/// The cuboid is remapped exactly, so the result stays axis-aligned. Auto-UVs
/// are pinned before the turn so every face keeps sampling the same texels.
pub fn rotate_element_y(element: &CubeElement, degrees: i32) -> CubeElement {
    let steps = (degrees / 90).rem_euclid(4);
    let mut rotated = element.clone();
    for _ in 0..steps {
        rotated = quarter_turn(&rotated);
    }
    rotated
}

fn quarter_turn(element: &CubeElement) -> CubeElement {
    let [x1, y1, z1] = element.from;
    let [x2, y2, z2] = element.to;

    let rotation = element.rotation.map(|mut r| {
        let [ox, oy, oz] = r.origin;
        r.origin = [16.0 - oz, oy, ox];
        match r.axis {
            Axis::X => r.axis = Axis::Z,
            Axis::Z => {
                r.axis = Axis::X;
                r.angle = -r.angle;
            }
            Axis::Y => {}
        }
        r
    });

    let faces = element
        .faces
        .iter()
        .map(|(dir, face)| {
            let mut face = face.clone();
            face.uv = Some(face.uv_for(*dir, element));
            face.cullface = face.cullface.map(|c| c.rotate_y(90));
            match dir {
                Direction::Up => face.rotation = (face.rotation + 90).rem_euclid(360),
                Direction::Down => face.rotation = (face.rotation + 270).rem_euclid(360),
                _ => {}
            }
            (dir.rotate_y(90), face)
        })
        .collect();

    CubeElement {
        from: [16.0 - z2, y1, x1],
        to: [16.0 - z1, y2, x2],
        rotation,
        shade: element.shade,
        faces,
    }
}
