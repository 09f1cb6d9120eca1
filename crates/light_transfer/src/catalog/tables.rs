//! Built-in declarative mapping tables.
//!
//! Each destination renderer gets one entry per light type, assembled
//! from shared parameter groups the same way the persisted catalog
//! document lays them out. Order inside each table is contractual: the
//! synthesizer walks record parameters in this order, and fan-out lists
//! are consumed positionally.

use super::{CatalogEntry, MappingEntry};
use crate::record::LightTypeTag;

type Parms = Vec<(&'static str, MappingEntry)>;

fn single(dest: &str) -> MappingEntry {
    MappingEntry::Single(dest.to_owned())
}

fn sequence(dests: &[&str]) -> MappingEntry {
    MappingEntry::Sequence(dests.iter().map(|d| (*d).to_owned()).collect())
}

/// Python-dict-merge semantics: first occurrence fixes the position,
/// the last occurrence fixes the value.
fn merge(parts: Vec<Parms>) -> Vec<(String, MappingEntry)> {
    let mut merged: Vec<(String, MappingEntry)> = Vec::new();
    for part in parts {
        for (name, entry) in part {
            if let Some(slot) = merged.iter_mut().find(|(n, _)| n == name) {
                slot.1 = entry;
            } else {
                merged.push((name.to_owned(), entry));
            }
        }
    }
    merged
}

/// Contribution channel names in slot order, paired with the indexed
/// destination toggles they correspond to.
pub(super) fn contribution_parms() -> Vec<(String, String)> {
    [
        ("diffuse", "light_contribenable1"),
        ("reflect", "light_contribenable2"),
        ("coat", "light_contribenable3"),
        ("sss", "light_contribenable4"),
        ("indirect", "light_contribenable5"),
        ("volume", "light_contribenable6"),
        ("refract", "light_contribenable7"),
        ("camera", "light_contribprimary"),
    ]
    .into_iter()
    .map(|(name, dest)| (name.to_owned(), dest.to_owned()))
    .collect()
}

/// Color channel parameters, shared by every light type.
pub(super) fn color_parms() -> Vec<(String, String)> {
    [
        ("colorR", "light_colorr"),
        ("colorG", "light_colorg"),
        ("colorB", "light_colorb"),
    ]
    .into_iter()
    .map(|(name, dest)| (name.to_owned(), dest.to_owned()))
    .collect()
}

fn color_group() -> Parms {
    vec![
        ("colorR", single("light_colorr")),
        ("colorG", single("light_colorg")),
        ("colorB", single("light_colorb")),
    ]
}

fn translate_group() -> Parms {
    vec![
        ("translateX", single("tx")),
        ("translateY", single("ty")),
        ("translateZ", single("tz")),
    ]
}

fn rotate_group() -> Parms {
    vec![
        ("rotateX", single("rx")),
        ("rotateY", single("ry")),
        ("rotateZ", single("rz")),
    ]
}

// --- Mantra destination ---------------------------------------------------

fn mantra_common_group() -> Parms {
    vec![
        ("visibility", single("light_enable")),
        ("intensity", single("light_intensity")),
        ("aiSamples", single("vm_samplingquality")),
        ("aiCastShadows", single("shadow_type")),
        ("aiShadowDensity", single("shadow_intensity")),
        ("aiAov", single("vm_lpetag")),
        ("aiDiffuse", single("light_contribenable1")),
        (
            "aiSpecular",
            sequence(&["light_contribenable2", "light_contribenable3"]),
        ),
        ("aiSss", single("light_contribenable4")),
        ("aiIndirect", single("light_contribenable5")),
        ("aiVolume", single("light_contribenable6")),
    ]
}

fn mantra_shadow_color_group() -> Parms {
    vec![
        ("shadColorR", single("shadow_colorr")),
        ("shadColorG", single("shadow_colorg")),
        ("shadColorB", single("shadow_colorb")),
    ]
}

fn mantra_area_shadow_color_group() -> Parms {
    vec![
        ("aiShadowColorR", single("shadow_colorr")),
        ("aiShadowColorG", single("shadow_colorg")),
        ("aiShadowColorB", single("shadow_colorb")),
    ]
}

fn mantra_point_plain() -> Parms {
    let mut parms = vec![("aiExposure", single("light_exposure"))];
    parms.extend(mantra_shadow_color_group());
    parms
}

fn mantra_point_sphere() -> Parms {
    let mut parms = vec![
        ("aiExposure", single("light_exposure")),
        ("aiRadius", sequence(&["areasize1", "areasize2"])),
        ("aiNormalize", single("normalizearea")),
    ];
    parms.extend(mantra_shadow_color_group());
    parms.push(("aiCamera", single("light_contribprimary")));
    parms.push(("aiTransmission", single("light_contribenable7")));
    parms
}

fn mantra_directional_plain() -> Parms {
    let mut parms = vec![("aiExposure", single("light_exposure"))];
    parms.extend(mantra_shadow_color_group());
    parms
}

fn mantra_directional_sun() -> Parms {
    let mut parms = vec![
        ("aiExposure", single("light_exposure")),
        ("aiAngle", single("vm_envangle")),
    ];
    parms.extend(mantra_shadow_color_group());
    parms
}

fn mantra_spot_plain() -> Parms {
    let mut parms = vec![
        ("coneAngle", single("coneangle")),
        ("penumbraAngle", single("conedelta")),
        ("dropoff", single("coneroll")),
        ("aiExposure", single("light_exposure")),
    ];
    parms.extend(mantra_shadow_color_group());
    parms
}

fn mantra_spot_sphere() -> Parms {
    let mut parms = vec![
        ("coneAngle", single("coneangle")),
        ("penumbraAngle", single("conedelta")),
        ("dropoff", single("coneroll")),
        ("aiExposure", single("light_exposure")),
        ("aiRadius", sequence(&["areasize1", "areasize2"])),
        ("aiNormalize", single("normalizearea")),
    ];
    parms.extend(mantra_shadow_color_group());
    parms
}

fn mantra_area() -> Parms {
    let mut parms = vec![
        ("aiExposure", single("light_exposure")),
        ("scaleX", single("areasize1")),
        ("scaleY", single("areasize2")),
        ("aiNormalize", single("normalizearea")),
        (
            "aiSpread",
            sequence(&["coneangle", "conedelta", "coneroll"]),
        ),
        ("aiSoftEdge", single("edgewidth")),
        ("aiRoundness", single("")),
    ];
    parms.extend(mantra_area_shadow_color_group());
    parms.push(("aiCamera", single("light_contribprimary")));
    parms.push(("aiTransmission", single("light_contribenable7")));
    parms
}

fn mantra_quad() -> Parms {
    let mut parms = vec![
        ("exposure", single("light_exposure")),
        ("scaleX", single("areasize1")),
        ("scaleY", single("areasize2")),
        ("normalize", single("normalizearea")),
        (
            "aiSpread",
            sequence(&["coneangle", "conedelta", "coneroll"]),
        ),
        ("aiSoftEdge", single("edgewidth")),
        ("aiRoundness", single("")),
    ];
    parms.extend(mantra_area_shadow_color_group());
    parms.push(("aiCamera", single("light_contribprimary")));
    parms.push(("aiTransmission", single("light_contribenable7")));
    parms
}

fn mantra_disk() -> Parms {
    let mut parms = vec![
        ("exposure", single("light_exposure")),
        ("scaleX", single("areasize1")),
        ("scaleY", single("areasize2")),
        ("normalize", single("normalizearea")),
        (
            "aiSpread",
            sequence(&["coneangle", "conedelta", "coneroll"]),
        ),
    ];
    parms.extend(mantra_area_shadow_color_group());
    parms.push(("aiCamera", single("light_contribprimary")));
    parms.push(("aiTransmission", single("light_contribenable7")));
    parms
}

fn mantra_cylinder_capped() -> Parms {
    // The cylinder swaps its first two rotation axes on the way over.
    let mut parms = vec![
        ("rotateX", single("ry")),
        ("rotateY", single("rx")),
        ("rotateZ", single("rz")),
        ("exposure", single("light_exposure")),
        ("scaleX", single("areasize2")),
        ("scaleY", single("areasize1")),
        ("scaleZ", single("areasize2")),
        ("normalize", single("normalizearea")),
    ];
    parms.extend(mantra_area_shadow_color_group());
    parms.push(("aiCamera", single("light_contribprimary")));
    parms.push(("aiTransmission", single("light_contribenable7")));
    parms
}

fn mantra_cylinder_line() -> Parms {
    let mut parms = vec![
        ("rotateX", single("ry")),
        ("rotateY", single("rx")),
        ("rotateZ", single("rz")),
        ("exposure", single("light_exposure")),
        ("scaleY", single("areasize1")),
        ("normalize", single("normalizearea")),
    ];
    parms.extend(mantra_area_shadow_color_group());
    parms
}

fn mantra_dome() -> Parms {
    vec![
        ("exposure", single("light_exposure")),
        ("camera", single("light_contribprimary")),
        ("transmission", single("light_contribenable7")),
    ]
}

/// All Mantra catalog entries, keyed by tag.
pub(super) fn mantra_entries() -> Vec<(LightTypeTag, CatalogEntry)> {
    let hlight = "hlight::2.0";
    let rows: Vec<(LightTypeTag, &str, Option<i64>, usize, Parms)> = vec![
        (LightTypeTag::PointPlain, hlight, Some(0), 6, mantra_point_plain()),
        (LightTypeTag::PointSphere, hlight, Some(4), 7, mantra_point_sphere()),
        (LightTypeTag::DirectionalPlain, hlight, Some(7), 6, mantra_directional_plain()),
        (LightTypeTag::DirectionalSun, hlight, Some(8), 6, mantra_directional_sun()),
        (LightTypeTag::SpotPlain, hlight, Some(0), 6, mantra_spot_plain()),
        (LightTypeTag::SpotSphere, hlight, Some(4), 6, mantra_spot_sphere()),
        (LightTypeTag::Area, hlight, Some(2), 7, mantra_area()),
        (LightTypeTag::Quad, hlight, Some(2), 7, mantra_quad()),
        (LightTypeTag::Disk, hlight, Some(3), 7, mantra_disk()),
        (LightTypeTag::CylinderCapped, hlight, Some(5), 7, mantra_cylinder_capped()),
        (LightTypeTag::CylinderLine, hlight, Some(1), 6, mantra_cylinder_line()),
        (LightTypeTag::Dome, "envlight", None, 7, mantra_dome()),
    ];

    rows.into_iter()
        .map(|(tag, node_type, subtype, contrib_count, specific)| {
            let groups = if tag.is_cylinder() {
                // Cylinders carry their own (swapped) rotate mapping.
                vec![
                    translate_group(),
                    mantra_common_group(),
                    color_group(),
                    specific,
                ]
            } else {
                vec![
                    translate_group(),
                    rotate_group(),
                    mantra_common_group(),
                    color_group(),
                    specific,
                ]
            };
            (
                tag,
                CatalogEntry {
                    node_type: node_type.to_owned(),
                    subtype,
                    contrib_count,
                    parms: merge(groups),
                },
            )
        })
        .collect()
}

// --- Arnold destination ---------------------------------------------------

fn arnold_common_group() -> Parms {
    vec![
        ("visibility", single("light_enable")),
        ("intensity", single("ar_intensity")),
        ("aiSamples", single("ar_samples")),
        ("aiVolumeSamples", single("ar_volume_samples")),
        ("aiShadowDensity", single("ar_shadow_density")),
        ("aiCastShadows", single("ar_cast_shadows")),
        ("aiCastVolumetricShadows", single("ar_cast_volumetric_shadows")),
        ("aiDiffuse", single("ar_diffuse")),
        ("aiSpecular", single("ar_specular")),
        ("aiSss", single("ar_sss")),
        ("aiIndirect", single("ar_indirect")),
        ("aiVolume", single("ar_volume")),
        ("aiMaxBounces", single("ar_max_bounces")),
        ("aiAov", single("ar_aov")),
    ]
}

fn arnold_shadow_color_group() -> Parms {
    vec![
        ("shadColorR", single("ar_shadow_colorr")),
        ("shadColorG", single("ar_shadow_colorg")),
        ("shadColorB", single("ar_shadow_colorb")),
    ]
}

fn arnold_area_shadow_color_group() -> Parms {
    vec![
        ("aiShadowColorR", single("ar_shadow_colorr")),
        ("aiShadowColorG", single("ar_shadow_colorg")),
        ("aiShadowColorB", single("ar_shadow_colorb")),
    ]
}

fn arnold_point() -> Parms {
    let mut parms = vec![
        ("aiExposure", single("ar_exposure")),
        ("aiRadius", single("ar_point_radius")),
        ("aiNormalize", single("ar_normalize")),
    ];
    parms.extend(arnold_shadow_color_group());
    parms.push(("aiCamera", single("ar_camera")));
    parms.push(("aiTransmission", single("ar_transmission")));
    parms
}

fn arnold_directional() -> Parms {
    let mut parms = vec![
        ("aiExposure", single("ar_exposure")),
        ("aiAngle", single("ar_angle")),
        ("aiNormalize", single("ar_normalize")),
    ];
    parms.extend(arnold_shadow_color_group());
    parms
}

fn arnold_spot() -> Parms {
    let mut parms = vec![
        ("aiExposure", single("ar_exposure")),
        ("aiRoundness", single("ar_spot_roundness")),
        ("coneAngle", single("ar_cone_angle")),
        ("penumbraAngle", single("ar_penumbra_angle")),
        ("aiRadius", single("ar_spot_radius")),
        ("aiLensRadius", single("ar_lens_radius")),
        ("aiAspectRatio", single("ar_aspect_ratio")),
        ("aiNormalize", single("ar_normalize")),
    ];
    parms.extend(arnold_shadow_color_group());
    parms
}

fn arnold_area() -> Parms {
    let mut parms = vec![
        ("aiExposure", single("ar_exposure")),
        ("aiRoundness", single("ar_quad_roundness")),
        ("aiSoftEdge", single("ar_soft_edge")),
        ("aiSpread", single("ar_spread")),
        ("scaleX", single("ar_quad_sizex")),
        ("scaleY", single("ar_quad_sizey")),
        ("aiNormalize", single("ar_normalize")),
    ];
    parms.extend(arnold_shadow_color_group());
    parms.push(("aiCamera", single("ar_camera")));
    parms.push(("aiTransmission", single("ar_transmission")));
    parms
}

fn arnold_quad() -> Parms {
    let mut parms = vec![
        ("exposure", single("ar_exposure")),
        ("aiRoundness", single("ar_quad_roundness")),
        ("aiSoftEdge", single("ar_soft_edge")),
        ("aiSpread", single("ar_spread")),
        ("scaleX", single("ar_quad_sizex")),
        ("scaleY", single("ar_quad_sizey")),
        ("normalize", single("ar_normalize")),
    ];
    parms.extend(arnold_area_shadow_color_group());
    parms.push(("aiCamera", single("ar_camera")));
    parms.push(("aiTransmission", single("ar_transmission")));
    parms
}

fn arnold_disk() -> Parms {
    let mut parms = vec![
        ("exposure", single("ar_exposure")),
        ("aiRoundness", single("ar_quad_roundness")),
        ("aiSoftEdge", single("ar_soft_edge")),
        ("aiSpread", single("ar_spread")),
        ("scaleX", single("ar_disk_radius")),
        ("scaleY", single("ar_disk_radius")),
        ("normalize", single("ar_normalize")),
    ];
    parms.extend(arnold_area_shadow_color_group());
    parms.push(("aiCamera", single("ar_camera")));
    parms.push(("aiTransmission", single("ar_transmission")));
    parms
}

fn arnold_cylinder() -> Parms {
    let mut parms = vec![
        ("exposure", single("ar_exposure")),
        ("scaleX", single("ar_cylinder_radius")),
        ("scaleY", single("ar_height")),
        ("scaleZ", single("ar_cylinder_radius")),
        ("normalize", single("ar_normalize")),
    ];
    parms.extend(arnold_area_shadow_color_group());
    parms.push(("aiCamera", single("ar_camera")));
    parms.push(("aiTransmission", single("ar_transmission")));
    parms
}

fn arnold_dome() -> Parms {
    let mut parms = vec![
        ("resolution", single("ar_resolution")),
        ("format", single("ar_format")),
        ("exposure", single("ar_exposure")),
    ];
    parms.extend(arnold_area_shadow_color_group());
    parms.push(("camera", single("ar_camera")));
    parms.push(("transmission", single("ar_transmission")));
    parms.push(("aiAovIndirect", single("ar_aov_indirect")));
    parms
}

/// All Arnold catalog entries, keyed by tag.
pub(super) fn arnold_entries() -> Vec<(LightTypeTag, CatalogEntry)> {
    let rows: Vec<(LightTypeTag, i64, Parms)> = vec![
        (LightTypeTag::Point, 0, arnold_point()),
        (LightTypeTag::Directional, 1, arnold_directional()),
        (LightTypeTag::Spot, 2, arnold_spot()),
        (LightTypeTag::Area, 3, arnold_area()),
        (LightTypeTag::Quad, 3, arnold_quad()),
        (LightTypeTag::Disk, 4, arnold_disk()),
        (LightTypeTag::Cylinder, 5, arnold_cylinder()),
        (LightTypeTag::Dome, 6, arnold_dome()),
    ];

    rows.into_iter()
        .map(|(tag, subtype, specific)| {
            (
                tag,
                CatalogEntry {
                    node_type: "arnold_light".to_owned(),
                    subtype: Some(subtype),
                    contrib_count: 0,
                    parms: merge(vec![
                        translate_group(),
                        rotate_group(),
                        arnold_common_group(),
                        color_group(),
                        specific,
                    ]),
                },
            )
        })
        .collect()
}
