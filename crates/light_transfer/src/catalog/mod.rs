//! The mapping catalog: which canonical parameter lands on which
//! destination attribute, per light type and per destination renderer.
//!
//! The catalog is an immutable value constructed once (built-in tables
//! or a loaded JSON document) and passed into the extractor and
//! synthesizer explicitly. Lookups are pure; a missing type/renderer
//! pair is a [`TransferError::CatalogMismatch`], which for a tag the
//! extractor produced signals a catalog/classifier inconsistency.

mod tables;

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::TransferError;
use crate::record::{LightTypeTag, Renderer};

/// Destination side of one canonical parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingEntry {
    /// One destination attribute.
    Single(String),
    /// Ordered fan-out onto several destination attributes. The order
    /// is part of the mapping contract and is consumed positionally.
    Sequence(Vec<String>),
}

impl MappingEntry {
    /// The sole destination name, if this is not a fan-out.
    #[must_use]
    pub fn single(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name),
            Self::Sequence(_) => None,
        }
    }

    /// All destination names, fan-out or not.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Sequence(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Everything the synthesizer needs to build one light type for one
/// destination renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Destination node type to create.
    pub node_type: String,
    /// Destination light subtype selector; `None` for node types that
    /// have no subtype switch (the environment light).
    pub subtype: Option<i64>,
    /// How many indexed contribution slots this type populates.
    pub contrib_count: usize,
    /// Canonical parameter name → destination, in contractual order.
    pub parms: Vec<(String, MappingEntry)>,
}

impl CatalogEntry {
    /// Destination entry for a canonical parameter.
    #[must_use]
    pub fn dest(&self, parm: &str) -> Option<&MappingEntry> {
        self.parms
            .iter()
            .find(|(name, _)| name == parm)
            .map(|(_, entry)| entry)
    }

    /// Single destination name for a canonical parameter.
    #[must_use]
    pub fn dest_single(&self, parm: &str) -> Option<&str> {
        self.dest(parm).and_then(MappingEntry::single)
    }

    /// The destination attribute carrying this type's exposure.
    ///
    /// Types route exposure through either the `aiExposure` or the
    /// `exposure` canonical key; the catalog is deliberately not
    /// authoritative about which, so both are probed in that order.
    ///
    /// # Errors
    ///
    /// [`TransferError::MissingDestination`] if neither key is mapped.
    pub fn exposure_dest(&self, tag: LightTypeTag) -> Result<&str, TransferError> {
        self.dest_single("aiExposure")
            .or_else(|| self.dest_single("exposure"))
            .ok_or_else(|| TransferError::MissingDestination {
                tag,
                parm: "exposure".to_owned(),
            })
    }

    /// Canonical parameter names in declared order.
    pub fn canonical_names(&self) -> impl Iterator<Item = &str> {
        self.parms.iter().map(|(name, _)| name.as_str())
    }
}

/// Ordered contribution channel names for one light type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContributionChannels<'a> {
    /// Channel names, one per indexed destination slot, in slot order.
    pub ordered: &'a [(String, String)],
}

impl ContributionChannels<'_> {
    /// Number of slots to populate.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.ordered.len()
    }

    /// Name of slot `index` (zero-based).
    #[must_use]
    pub fn name(&self, index: usize) -> &str {
        &self.ordered[index].0
    }
}

/// Immutable lookup tables for both destination renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingCatalog {
    mantra: Vec<(LightTypeTag, CatalogEntry)>,
    arnold: Vec<(LightTypeTag, CatalogEntry)>,
    contribution_parms: Vec<(String, String)>,
    color_parms: Vec<(String, String)>,
}

impl MappingCatalog {
    /// The built-in catalog, equivalent to the persisted document the
    /// generator tool writes.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            mantra: tables::mantra_entries(),
            arnold: tables::arnold_entries(),
            contribution_parms: tables::contribution_parms(),
            color_parms: tables::color_parms(),
        }
    }

    /// Mapping entry set for a type/renderer pair.
    ///
    /// # Errors
    ///
    /// [`TransferError::CatalogMismatch`] when the pair is not declared.
    pub fn mapping_for(
        &self,
        renderer: Renderer,
        tag: LightTypeTag,
    ) -> Result<&CatalogEntry, TransferError> {
        let table = match renderer {
            Renderer::Mantra => &self.mantra,
            Renderer::Arnold => &self.arnold,
        };
        table
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, entry)| entry)
            .ok_or(TransferError::CatalogMismatch { renderer, tag })
    }

    /// Ordered contribution channels for a type (an indexed-slot concept
    /// of the Mantra destination).
    ///
    /// # Errors
    ///
    /// [`TransferError::CatalogMismatch`] when the tag has no Mantra
    /// entry.
    pub fn contribution_channels_for(
        &self,
        tag: LightTypeTag,
    ) -> Result<ContributionChannels<'_>, TransferError> {
        let entry = self.mapping_for(Renderer::Mantra, tag)?;
        Ok(ContributionChannels {
            ordered: &self.contribution_parms[..entry.contrib_count],
        })
    }

    /// Color channel parameters shared by every light type.
    #[must_use]
    pub fn color_parms(&self) -> &[(String, String)] {
        &self.color_parms
    }

    /// Serialize to the persisted catalog document.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("Mantra".to_owned(), section_to_json(&self.mantra, true));
        root.insert("Arnold".to_owned(), section_to_json(&self.arnold, false));
        root.insert(
            "light_contribution_parms".to_owned(),
            pairs_to_json(&self.contribution_parms),
        );
        root.insert(
            "color_light_params".to_owned(),
            pairs_to_json(&self.color_parms),
        );
        Value::Object(root)
    }

    /// Deserialize from the persisted catalog document, tolerating both
    /// fan-out value shapes (single string or list of strings).
    ///
    /// # Errors
    ///
    /// [`TransferError::Document`] on any shape violation.
    pub fn from_json(value: &Value) -> Result<Self, TransferError> {
        let root = value
            .as_object()
            .ok_or_else(|| TransferError::Document("catalog root is not an object".to_owned()))?;
        Ok(Self {
            mantra: section_from_json(root, "Mantra")?,
            arnold: section_from_json(root, "Arnold")?,
            contribution_parms: pairs_from_json(root, "light_contribution_parms")?,
            color_parms: pairs_from_json(root, "color_light_params")?,
        })
    }

    /// Load the catalog document from disk.
    ///
    /// # Errors
    ///
    /// IO, parse, or shape errors from the underlying document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TransferError> {
        let contents = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents)?;
        Self::from_json(&value)
    }

    /// Write the catalog document to disk.
    ///
    /// # Errors
    ///
    /// IO errors from the write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TransferError> {
        let contents = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn pairs_to_json(pairs: &[(String, String)]) -> Value {
    let mut map = Map::new();
    for (name, dest) in pairs {
        map.insert(name.clone(), Value::String(dest.clone()));
    }
    Value::Object(map)
}

fn section_to_json(entries: &[(LightTypeTag, CatalogEntry)], mantra: bool) -> Value {
    let mut section = Map::new();
    for (tag, entry) in entries {
        let mut object = Map::new();
        if mantra {
            object.insert(
                "light_node_type".to_owned(),
                Value::String(entry.node_type.clone()),
            );
        }
        let subtype = entry
            .subtype
            .map_or_else(|| json!(""), |subtype| json!(subtype));
        object.insert("light_node_sub_type".to_owned(), subtype);
        if mantra {
            object.insert(
                "num_of_light_contrib".to_owned(),
                json!(entry.contrib_count),
            );
        }
        let mut parms = Map::new();
        for (name, dest) in &entry.parms {
            let value = match dest {
                MappingEntry::Single(name) => Value::String(name.clone()),
                MappingEntry::Sequence(names) => json!(names),
            };
            parms.insert(name.clone(), value);
        }
        object.insert("light_parms".to_owned(), Value::Object(parms));
        section.insert(tag.as_str().to_owned(), Value::Object(object));
    }
    Value::Object(section)
}

fn section_from_json(
    root: &Map<String, Value>,
    renderer: &str,
) -> Result<Vec<(LightTypeTag, CatalogEntry)>, TransferError> {
    let section = root
        .get(renderer)
        .and_then(Value::as_object)
        .ok_or_else(|| TransferError::Document(format!("missing '{renderer}' section")))?;

    let mut entries = Vec::with_capacity(section.len());
    for (name, value) in section {
        let tag = LightTypeTag::parse(name)
            .ok_or_else(|| TransferError::Document(format!("unknown light type '{name}'")))?;
        let object = value
            .as_object()
            .ok_or_else(|| TransferError::Document(format!("entry '{name}' is not an object")))?;

        let node_type = object
            .get("light_node_type")
            .and_then(Value::as_str)
            .unwrap_or("arnold_light")
            .to_owned();
        let subtype = object.get("light_node_sub_type").and_then(Value::as_i64);
        let contrib_count = object
            .get("num_of_light_contrib")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;

        let parms_object = object
            .get("light_parms")
            .and_then(Value::as_object)
            .ok_or_else(|| TransferError::Document(format!("entry '{name}' has no parms")))?;
        let mut parms = Vec::with_capacity(parms_object.len());
        for (parm, dest) in parms_object {
            let entry = match dest {
                Value::String(single) => MappingEntry::Single(single.clone()),
                Value::Array(names) => MappingEntry::Sequence(
                    names
                        .iter()
                        .map(|n| {
                            n.as_str().map(str::to_owned).ok_or_else(|| {
                                TransferError::Document(format!(
                                    "fan-out for '{parm}' holds a non-string"
                                ))
                            })
                        })
                        .collect::<Result<_, _>>()?,
                ),
                _ => {
                    return Err(TransferError::Document(format!(
                        "destination for '{parm}' is neither string nor list"
                    )))
                }
            };
            parms.push((parm.clone(), entry));
        }

        entries.push((
            tag,
            CatalogEntry {
                node_type,
                subtype,
                contrib_count,
                parms,
            },
        ));
    }
    Ok(entries)
}

fn pairs_from_json(
    root: &Map<String, Value>,
    key: &str,
) -> Result<Vec<(String, String)>, TransferError> {
    let object = root
        .get(key)
        .and_then(Value::as_object)
        .ok_or_else(|| TransferError::Document(format!("missing '{key}' section")))?;
    object
        .iter()
        .map(|(name, dest)| {
            dest.as_str()
                .map(|d| (name.clone(), d.to_owned()))
                .ok_or_else(|| TransferError::Document(format!("'{key}.{name}' is not a string")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANTRA_TAGS: [LightTypeTag; 12] = [
        LightTypeTag::PointPlain,
        LightTypeTag::PointSphere,
        LightTypeTag::DirectionalPlain,
        LightTypeTag::DirectionalSun,
        LightTypeTag::SpotPlain,
        LightTypeTag::SpotSphere,
        LightTypeTag::Area,
        LightTypeTag::Quad,
        LightTypeTag::Disk,
        LightTypeTag::CylinderCapped,
        LightTypeTag::CylinderLine,
        LightTypeTag::Dome,
    ];

    const ARNOLD_TAGS: [LightTypeTag; 8] = [
        LightTypeTag::Point,
        LightTypeTag::Directional,
        LightTypeTag::Spot,
        LightTypeTag::Area,
        LightTypeTag::Quad,
        LightTypeTag::Disk,
        LightTypeTag::Cylinder,
        LightTypeTag::Dome,
    ];

    #[test]
    fn every_mantra_tag_has_an_entry() {
        let catalog = MappingCatalog::builtin();
        for tag in MANTRA_TAGS {
            let entry = catalog.mapping_for(Renderer::Mantra, tag).unwrap();
            assert!(!entry.parms.is_empty(), "{tag} has no parameters");
        }
    }

    #[test]
    fn every_arnold_tag_has_an_entry() {
        let catalog = MappingCatalog::builtin();
        for tag in ARNOLD_TAGS {
            catalog.mapping_for(Renderer::Arnold, tag).unwrap();
        }
        // Mantra-granularity tags must not leak into the Arnold table.
        assert!(catalog
            .mapping_for(Renderer::Arnold, LightTypeTag::PointPlain)
            .is_err());
    }

    #[test]
    fn contribution_channels_are_ordered_and_counted() {
        let catalog = MappingCatalog::builtin();
        let full = [
            "diffuse", "reflect", "coat", "sss", "indirect", "volume", "refract", "camera",
        ];
        for tag in MANTRA_TAGS {
            let channels = catalog.contribution_channels_for(tag).unwrap();
            let entry = catalog.mapping_for(Renderer::Mantra, tag).unwrap();
            assert_eq!(channels.count(), entry.contrib_count);
            for (i, expected) in full.iter().take(channels.count()).enumerate() {
                assert_eq!(channels.name(i), *expected, "slot {i} of {tag}");
            }
        }
    }

    #[test]
    fn fan_out_orders_are_contractual() {
        let catalog = MappingCatalog::builtin();
        let quad = catalog
            .mapping_for(Renderer::Mantra, LightTypeTag::Quad)
            .unwrap();
        assert_eq!(
            quad.dest("aiSpread").unwrap().names(),
            ["coneangle", "conedelta", "coneroll"]
        );
        let sphere = catalog
            .mapping_for(Renderer::Mantra, LightTypeTag::PointSphere)
            .unwrap();
        assert_eq!(
            sphere.dest("aiRadius").unwrap().names(),
            ["areasize1", "areasize2"]
        );
        let common = catalog
            .mapping_for(Renderer::Mantra, LightTypeTag::PointPlain)
            .unwrap();
        assert_eq!(
            common.dest("aiSpecular").unwrap().names(),
            ["light_contribenable2", "light_contribenable3"]
        );
    }

    #[test]
    fn exposure_probe_tries_both_keys() {
        let catalog = MappingCatalog::builtin();
        let area = catalog
            .mapping_for(Renderer::Mantra, LightTypeTag::Area)
            .unwrap();
        assert_eq!(area.exposure_dest(LightTypeTag::Area).unwrap(), "light_exposure");
        let quad = catalog
            .mapping_for(Renderer::Mantra, LightTypeTag::Quad)
            .unwrap();
        // Quad routes exposure through the plain key.
        assert!(quad.dest("aiExposure").is_none());
        assert_eq!(quad.exposure_dest(LightTypeTag::Quad).unwrap(), "light_exposure");
    }

    #[test]
    fn cylinder_swaps_rotation_axes() {
        let catalog = MappingCatalog::builtin();
        let cylinder = catalog
            .mapping_for(Renderer::Mantra, LightTypeTag::CylinderCapped)
            .unwrap();
        assert_eq!(cylinder.dest_single("rotateX"), Some("ry"));
        assert_eq!(cylinder.dest_single("rotateY"), Some("rx"));
        assert_eq!(cylinder.dest_single("rotateZ"), Some("rz"));
    }

    #[test]
    fn json_round_trip_preserves_catalog() {
        let catalog = MappingCatalog::builtin();
        let restored = MappingCatalog::from_json(&catalog.to_json()).unwrap();
        assert_eq!(catalog, restored);
    }

    #[test]
    fn json_load_tolerates_both_fanout_shapes() {
        let document = serde_json::json!({
            "Mantra": {
                "pointLightP": {
                    "light_node_type": "hlight::2.0",
                    "light_node_sub_type": 0,
                    "num_of_light_contrib": 6,
                    "light_parms": {
                        "intensity": "light_intensity",
                        "aiRadius": ["areasize1", "areasize2"]
                    }
                }
            },
            "Arnold": {
                "pointLight": {
                    "light_node_sub_type": 0,
                    "light_parms": { "intensity": "ar_intensity" }
                }
            },
            "light_contribution_parms": { "diffuse": "light_contribenable1" },
            "color_light_params": { "colorR": "light_colorr" }
        });
        let catalog = MappingCatalog::from_json(&document).unwrap();
        let entry = catalog
            .mapping_for(Renderer::Mantra, LightTypeTag::PointPlain)
            .unwrap();
        assert_eq!(entry.dest_single("intensity"), Some("light_intensity"));
        assert_eq!(
            entry.dest("aiRadius").unwrap().names(),
            ["areasize1", "areasize2"]
        );
        let arnold = catalog
            .mapping_for(Renderer::Arnold, LightTypeTag::Point)
            .unwrap();
        assert_eq!(arnold.node_type, "arnold_light");
    }

    #[test]
    fn dome_has_no_subtype() {
        let catalog = MappingCatalog::builtin();
        let dome = catalog.mapping_for(Renderer::Mantra, LightTypeTag::Dome).unwrap();
        assert_eq!(dome.node_type, "envlight");
        assert_eq!(dome.subtype, None);
        let value = catalog.to_json();
        assert_eq!(value["Mantra"]["aiSkyDomeLight"]["light_node_sub_type"], "");
    }
}
