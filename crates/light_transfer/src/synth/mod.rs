//! Light synthesis: rebuild destination lights from canonical records.
//!
//! Each record section is applied by a renderer-specific module; both
//! share the destroy-then-recreate contract, so re-importing the same
//! document converges to the same scene state.

mod arnold;
mod mantra;

use log::{error, info};

use crate::catalog::{CatalogEntry, MappingCatalog};
use crate::config::ImportOptions;
use crate::error::TransferError;
use crate::record::{LightRecord, LightTypeTag, ParamValue, RecordSection, Renderer};
use crate::scene::{NodeId, TargetScene};

/// Builds destination lights from records using one catalog.
pub struct Synthesizer<'a> {
    catalog: &'a MappingCatalog,
}

impl<'a> Synthesizer<'a> {
    /// Bind a synthesizer to a catalog.
    #[must_use]
    pub const fn new(catalog: &'a MappingCatalog) -> Self {
        Self { catalog }
    }

    /// Create one destination light per record and enabled renderer,
    /// replacing any light of the same derived name.
    ///
    /// A light that fails to apply is logged and skipped; catalog
    /// inconsistencies abort the pass. Returns the number of lights
    /// created.
    ///
    /// # Errors
    ///
    /// Fatal [`TransferError`]s only; per-light failures are logged.
    pub fn synthesize(
        &self,
        scene: &mut impl TargetScene,
        records: &[LightRecord],
        options: &ImportOptions,
    ) -> Result<usize, TransferError> {
        let mut created = Vec::new();

        for record in records {
            for (renderer, section) in &record.sections {
                if !options.renderer_enabled(*renderer) {
                    continue;
                }
                match self.build_light(scene, record, *renderer, section, options.scale) {
                    Ok(node) => created.push(node),
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(err) => error!("failed to build {renderer} '{}': {err}", record.name),
                }
            }
        }

        scene.layout(&created);
        info!("created {} lights from {} records", created.len(), records.len());
        Ok(created.len())
    }

    fn build_light(
        &self,
        scene: &mut impl TargetScene,
        record: &LightRecord,
        renderer: Renderer,
        section: &RecordSection,
        scale: f64,
    ) -> Result<NodeId, TransferError> {
        let entry = self.catalog.mapping_for(renderer, section.light_type)?;

        let name = format!("{}{}", renderer.node_prefix(), record.name);
        if let Some(existing) = scene.find_node(&name) {
            scene.destroy(existing)?;
        }
        let node = scene.create_node(&entry.node_type, &name)?;

        match renderer {
            Renderer::Mantra => {
                mantra::apply(scene, node, &record.name, section, self.catalog, scale)?;
            }
            Renderer::Arnold => {
                arnold::apply(scene, node, &record.name, section, entry, scale)?;
            }
        }
        Ok(node)
    }
}

/// Single destination for a canonical parameter, or the error that makes
/// the whole batch unusable.
fn dest<'a>(
    entry: &'a CatalogEntry,
    tag: LightTypeTag,
    parm: &str,
) -> Result<&'a str, TransferError> {
    entry
        .dest_single(parm)
        .ok_or_else(|| TransferError::MissingDestination {
            tag,
            parm: parm.to_owned(),
        })
}

fn require_number(light: &str, parm: &str, value: &ParamValue) -> Result<f64, TransferError> {
    value.as_f64().ok_or_else(|| TransferError::ValueShape {
        light: light.to_owned(),
        parm: parm.to_owned(),
        expected: "number",
    })
}

/// Numeric sibling read from the record, for handlers that combine
/// several canonical parameters.
fn sibling_number(light: &str, section: &RecordSection, parm: &str) -> Result<f64, TransferError> {
    section.number(parm).ok_or_else(|| TransferError::ValueShape {
        light: light.to_owned(),
        parm: parm.to_owned(),
        expected: "number",
    })
}

/// Numeric parameter read back from the destination node.
fn node_number(
    scene: &impl TargetScene,
    node: NodeId,
    light: &str,
    parm: &str,
) -> Result<f64, TransferError> {
    let value = scene.parm(node, parm)?;
    require_number(light, parm, &value)
}
