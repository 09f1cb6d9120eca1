//! Mantra-side application of one record section.
//!
//! The handlers here carry the photometric differences between the two
//! renderers: exposure corrections, cone remapping, spread banding and
//! the soft-edge exposure floor. Parameters with no special handler copy
//! straight through the catalog mapping.

use crate::catalog::MappingCatalog;
use crate::error::TransferError;
use crate::photometry::{
    contribution_enabled, point_factor, remap_dropoff, remap_spread, scaled_exposure,
    soft_edge_exposure, DropoffRemap, SpreadBand,
};
use crate::record::{LightTypeTag, ParamValue, RecordSection, Renderer};
use crate::scene::{NodeId, TargetScene};

use super::{dest, node_number, require_number, sibling_number};

/// Canonical parameters that resolve to a boolean contribution toggle.
const CONTRIBUTION_TOGGLES: [&str; 6] = [
    "aiCamera",
    "aiDiffuse",
    "aiSss",
    "aiIndirect",
    "aiVolume",
    "aiTransmission",
];

pub(super) fn apply(
    scene: &mut impl TargetScene,
    node: NodeId,
    light: &str,
    section: &RecordSection,
    catalog: &MappingCatalog,
    scale: f64,
) -> Result<(), TransferError> {
    let tag = section.light_type;
    let entry = catalog.mapping_for(Renderer::Mantra, tag)?;

    if tag != LightTypeTag::Dome {
        scene.set_parm(node, "iconscale", scale.into())?;
    }
    if let Some(subtype) = entry.subtype {
        scene.set_parm(node, "light_type", subtype.into())?;
    }
    apply_type_setup(scene, node, tag)?;

    let channels = catalog.contribution_channels_for(tag)?;
    scene.set_parm(node, "light_contrib", (channels.count() as i64).into())?;
    for slot in 0..channels.count() {
        let parm = format!("light_contribname{}", slot + 1);
        scene.set_parm(node, &parm, channels.name(slot).into())?;
    }

    for (parm, value) in &section.params {
        match parm.as_str() {
            "translateX" | "translateY" | "translateZ" => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, (v * scale).into())?;
            }

            "rotateX" => {
                let v = require_number(light, parm, value)?;
                let v = if tag.is_cylinder() { -v } else { v };
                scene.set_parm(node, dest(entry, tag, parm)?, v.into())?;
            }
            "rotateY" => {
                let v = require_number(light, parm, value)?;
                let v = if tag == LightTypeTag::Dome { v + 180.0 } else { v };
                scene.set_parm(node, dest(entry, tag, parm)?, v.into())?;
            }
            "rotateZ" => {
                let v = require_number(light, parm, value)?;
                let v = if tag.is_cylinder() { v + 90.0 } else { v };
                scene.set_parm(node, dest(entry, tag, parm)?, v.into())?;
            }

            // Source sizes are half-extents; the destination wants full.
            "scaleX" | "scaleY" => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, (v * 2.0 * scale).into())?;
            }
            "scaleZ" => {
                let v = require_number(light, parm, value)?;
                let v = if tag == LightTypeTag::CylinderCapped {
                    let radial = sibling_number(light, section, "scaleX")?;
                    (v + radial) / 2.0 * (40.0 / 3.0) * scale
                } else {
                    v * scale
                };
                scene.set_parm(node, dest(entry, tag, parm)?, v.into())?;
            }

            "aiExposure" => {
                let v = require_number(light, parm, value)?;
                let exposure = match tag {
                    LightTypeTag::Dome => v,
                    LightTypeTag::DirectionalPlain | LightTypeTag::DirectionalSun => {
                        scaled_exposure(v, point_factor(), 1.0, 1.0)?
                    }
                    _ if flag_absent_or_truthy(section, "aiNormalize") => {
                        scaled_exposure(v, point_factor(), 1.0, scale)?
                    }
                    _ => v,
                };
                scene.set_parm(node, dest(entry, tag, parm)?, exposure.into())?;
            }
            "exposure" => {
                let v = require_number(light, parm, value)?;
                let exposure = match tag {
                    LightTypeTag::Dome => v,
                    LightTypeTag::CylinderLine => {
                        scaled_exposure(v, crate::photometry::LINE_FACTOR, 1.0, scale)?
                    }
                    _ if flag_absent_or_truthy(section, "normalize") => {
                        scaled_exposure(v, point_factor(), 1.0, scale)?
                    }
                    _ => v,
                };
                scene.set_parm(node, dest(entry, tag, parm)?, exposure.into())?;
            }

            // A radius becomes a full diameter on both area axes.
            "aiRadius" => {
                let v = require_number(light, parm, value)?;
                for name in fan_out(entry, tag, parm)? {
                    scene.set_parm(node, name, (v * 2.0 * scale).into())?;
                }
            }

            "aiAngle" => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, (v / 2.0).into())?;
            }

            // Folded into the dropoff handler below.
            "coneAngle" | "penumbraAngle" => {}

            "dropoff" => {
                let v = require_number(light, parm, value)?;
                let cone = sibling_number(light, section, "coneAngle")?;
                let penumbra = sibling_number(light, section, "penumbraAngle")?;
                let roll_dest = dest(entry, tag, "dropoff")?;
                let cone_dest = dest(entry, tag, "coneAngle")?;
                let penumbra_dest = dest(entry, tag, "penumbraAngle")?;

                match remap_dropoff(v, cone, penumbra, tag == LightTypeTag::SpotPlain) {
                    DropoffRemap::Snap { cone, penumbra } => {
                        scene.set_parm(node, roll_dest, 1.0.into())?;
                        if let Some(cone) = cone {
                            scene.set_parm(node, cone_dest, cone.into())?;
                        }
                        scene.set_parm(node, penumbra_dest, penumbra.into())?;
                    }
                    DropoffRemap::Gradual { roll } => {
                        scene.set_parm(node, roll_dest, roll.into())?;
                    }
                    DropoffRemap::Sharp {
                        sharp_spot,
                        roll,
                        cone,
                        penumbra,
                    } => {
                        scene.set_parm(node, "sharpspot", sharp_spot.into())?;
                        scene.set_parm(node, roll_dest, roll.into())?;
                        scene.set_parm(node, cone_dest, cone.into())?;
                        scene.set_parm(node, penumbra_dest, penumbra.into())?;
                    }
                }
            }

            "aiSpread" => {
                let v = require_number(light, parm, value)?;
                let remap = remap_spread(v);
                for (name, spread) in fan_out(entry, tag, parm)?.into_iter().zip(remap.cone_values) {
                    scene.set_parm(node, name, spread.into())?;
                }

                let exposure_dest = entry.exposure_dest(tag)?;
                match remap.band {
                    SpreadBand::Wide => {
                        if remap.exposure_delta != 0.0 {
                            let current = node_number(scene, node, light, exposure_dest)?;
                            let corrected = current + remap.exposure_delta;
                            let unscaled = scaled_exposure(corrected, 1.0, 1.0, 1.0 / scale)?;
                            let rescaled = scaled_exposure(unscaled, 1.0, 1.0, scale)?;
                            scene.set_parm(node, exposure_dest, rescaled.into())?;
                        }
                    }
                    SpreadBand::Narrow => {
                        let current = node_number(scene, node, light, exposure_dest)?;
                        let corrected = current + remap.exposure_delta;
                        scene.set_parm(node, exposure_dest, corrected.into())?;
                    }
                    SpreadBand::Pinhole => {
                        let current = node_number(scene, node, light, exposure_dest)?;
                        let corrected = current + remap.exposure_delta;
                        let rescaled = scaled_exposure(corrected, 1.0, 1.0, scale)?;
                        scene.set_parm(node, exposure_dest, rescaled.into())?;
                    }
                }
            }

            // Past the halfway point a rounded quad reads as a disk.
            "aiRoundness" => {
                let v = require_number(light, parm, value)?;
                if v > 0.5 {
                    let disk = catalog.mapping_for(Renderer::Mantra, LightTypeTag::Disk)?;
                    if let Some(subtype) = disk.subtype {
                        scene.set_parm(node, "light_type", subtype.into())?;
                    }
                }
            }

            "aiSoftEdge" => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, v.into())?;
                if v != 0.0 {
                    let normalize = section
                        .get("aiNormalize")
                        .or_else(|| section.get("normalize"))
                        .ok_or_else(|| TransferError::ValueShape {
                            light: light.to_owned(),
                            parm: "aiNormalize".to_owned(),
                            expected: "boolean",
                        })?
                        .is_truthy();
                    let exposure = section
                        .number("aiExposure")
                        .or_else(|| section.number("exposure"))
                        .ok_or_else(|| TransferError::ValueShape {
                            light: light.to_owned(),
                            parm: "aiExposure".to_owned(),
                            expected: "number",
                        })?;
                    let softened = soft_edge_exposure(normalize, exposure, scale, v)?;
                    scene.set_parm(node, "light_exposure", softened.into())?;
                }
            }

            // Consumed by the texture_map handler.
            "texture_node" => {}

            "texture_map" => {
                apply_texture(scene, node, light, section, value)?;
            }

            "aiSpecular" => {
                let v = require_number(light, parm, value)?;
                for name in fan_out(entry, tag, parm)? {
                    scene.set_parm(node, name, contribution_enabled(v).into())?;
                }
            }

            name if CONTRIBUTION_TOGGLES.contains(&name) => {
                let v = require_number(light, parm, value)?;
                scene.set_parm(node, dest(entry, tag, parm)?, contribution_enabled(v).into())?;
            }

            _ => {
                scene.set_parm(node, dest(entry, tag, parm)?, value.clone())?;
            }
        }
    }

    Ok(())
}

/// Per-type destination defaults that have no source counterpart.
fn apply_type_setup(
    scene: &mut impl TargetScene,
    node: NodeId,
    tag: LightTypeTag,
) -> Result<(), TransferError> {
    match tag {
        LightTypeTag::SpotPlain | LightTypeTag::SpotSphere => {
            scene.set_parm(node, "coneenable", true.into())?;
        }
        LightTypeTag::Area | LightTypeTag::Quad => {
            scene.set_parm(node, "coneenable", true.into())?;
            scene.set_parm(node, "singlesided", true.into())?;
            scene.set_parm(node, "edgeenable", true.into())?;
        }
        LightTypeTag::Disk => {
            scene.set_parm(node, "coneenable", true.into())?;
            scene.set_parm(node, "singlesided", true.into())?;
        }
        LightTypeTag::CylinderCapped | LightTypeTag::CylinderLine => {
            scene.set_parm(node, "rOrd", 2_i64.into())?;
            scene.set_parm(node, "singlesided", true.into())?;
        }
        _ => {}
    }
    Ok(())
}

/// Route the captured texture to the destination that can display it:
/// the environment map slot on a dome, a light material on the quad
/// family, nothing anywhere else.
fn apply_texture(
    scene: &mut impl TargetScene,
    node: NodeId,
    light: &str,
    section: &RecordSection,
    value: &ParamValue,
) -> Result<(), TransferError> {
    match section.light_type {
        LightTypeTag::Dome => {
            scene.set_parm(node, "env_map", value.clone())?;
        }
        LightTypeTag::Area | LightTypeTag::Quad => {
            let material_name = section
                .get("texture_node")
                .and_then(ParamValue::as_str)
                .ok_or_else(|| TransferError::ValueShape {
                    light: light.to_owned(),
                    parm: "texture_node".to_owned(),
                    expected: "string",
                })?;
            let material = match scene.find_material(material_name) {
                Some(existing) => existing,
                None => {
                    let created = scene.create_material("texture::2.0", material_name)?;
                    scene.set_parm(created, "orient", 1_i64.into())?;
                    scene.set_parm(created, "map", value.clone())?;
                    created
                }
            };
            let path = scene.node_path(material)?;
            scene.set_parm(node, "shop_materialpath", path.into())?;
        }
        _ => {}
    }
    Ok(())
}

/// Absent-or-truthy test for normalize flags: a light type whose catalog
/// never captured the flag behaves as normalized.
fn flag_absent_or_truthy(section: &RecordSection, flag: &str) -> bool {
    section.get(flag).is_none_or(ParamValue::is_truthy)
}

fn fan_out<'a>(
    entry: &'a crate::catalog::CatalogEntry,
    tag: LightTypeTag,
    parm: &str,
) -> Result<Vec<&'a str>, TransferError> {
    entry
        .dest(parm)
        .map(crate::catalog::MappingEntry::names)
        .ok_or_else(|| TransferError::MissingDestination {
            tag,
            parm: parm.to_owned(),
        })
}
