//! Arnold-side application of one record section.
//!
//! Both sides of this transfer speak the same photometric conventions,
//! so most parameters copy straight through; the handlers here cover
//! scene-scale compensation, the size conventions of each shape, and
//! the cone/penumbra algebra of spot lights.

use crate::catalog::CatalogEntry;
use crate::error::TransferError;
use crate::photometry::scaled_exposure;
use crate::record::{LightTypeTag, ParamValue, RecordSection};
use crate::scene::{NodeId, TargetScene};

use super::{dest, require_number, sibling_number};

pub(super) fn apply(
    scene: &mut impl TargetScene,
    node: NodeId,
    light: &str,
    section: &RecordSection,
    entry: &CatalogEntry,
    scale: f64,
) -> Result<(), TransferError> {
    let tag = section.light_type;

    if tag != LightTypeTag::Dome {
        scene.set_parm(node, "l_iconscale", scale.into())?;
    }
    if let Some(subtype) = entry.subtype {
        scene.set_parm(node, "ar_light_type", subtype.into())?;
    }

    for (parm, value) in &section.params {
        match parm.as_str() {
            "translateX" | "translateY" | "translateZ" => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, (v * scale).into())?;
            }

            "scaleX" => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, (v * 2.0 * scale).into())?;
            }
            "scaleY" => {
                let v = require_number(light, parm, value)?;
                let v = match tag {
                    // The disk radius averages both radial extents.
                    LightTypeTag::Disk => {
                        let radial = sibling_number(light, section, "scaleX")?;
                        (v + radial) / 2.0 * scale
                    }
                    LightTypeTag::Area | LightTypeTag::Quad | LightTypeTag::Cylinder => {
                        v * 2.0 * scale
                    }
                    _ => v * scale,
                };
                scene.set_parm(node, dest(entry, tag, parm)?, v.into())?;
            }
            "scaleZ" => {
                let v = require_number(light, parm, value)?;
                let v = if tag == LightTypeTag::Cylinder {
                    let radial = sibling_number(light, section, "scaleX")?;
                    (v + radial) / 2.0 * scale
                } else {
                    v * scale
                };
                scene.set_parm(node, dest(entry, tag, parm)?, v.into())?;
            }

            // Directional lights have no physical size; their exposure
            // is scale-invariant and keeps the destination default.
            "aiExposure" => {
                if tag != LightTypeTag::Directional {
                    let v = require_number(light, parm, value)?;
                    let exposure = if flag_truthy(section, "aiNormalize") {
                        scaled_exposure(v, 1.0, 1.0, scale)?
                    } else {
                        v
                    };
                    scene.set_parm(node, dest(entry, tag, parm)?, exposure.into())?;
                }
            }
            "exposure" => {
                if tag != LightTypeTag::Directional {
                    let v = require_number(light, parm, value)?;
                    let exposure = if flag_truthy(section, "normalize") {
                        scaled_exposure(v, 1.0, 1.0, scale)?
                    } else {
                        v
                    };
                    scene.set_parm(node, dest(entry, tag, parm)?, exposure.into())?;
                }
            }

            "aiRadius" => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, (v * scale).into())?;
            }

            // The source cone angle excludes the penumbra; fold a
            // non-negative penumbra back in on both sides.
            "coneAngle" => {
                let v = require_number(light, parm, value)?;
                let penumbra = sibling_number(light, section, "penumbraAngle")?;
                let cone = if penumbra < 0.0 { v } else { penumbra.mul_add(2.0, v) };
                scene.set_parm(node, dest(entry, tag, parm)?, cone.into())?;
            }
            "penumbraAngle" => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, v.abs().into())?;
            }

            "texture_map" => {
                scene.set_parm(node, "ar_light_color_type", 1_i64.into())?;
                scene.set_parm(node, "ar_light_color_texture", value.clone())?;
            }

            _ => {
                scene.set_parm(node, dest(entry, tag, parm)?, value.clone())?;
            }
        }
    }

    Ok(())
}

/// Present-and-truthy test: unlike the Mantra side, an absent normalize
/// flag here means the raw exposure passes through.
fn flag_truthy(section: &RecordSection, flag: &str) -> bool {
    section.get(flag).is_some_and(ParamValue::is_truthy)
}
