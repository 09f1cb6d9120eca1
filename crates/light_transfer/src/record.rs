//! Canonical light records exchanged between the extractor and synthesizer.

use serde::{Deserialize, Serialize};

/// Destination renderers a record section can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Renderer {
    /// Houdini's Mantra (`hlight::2.0` / `envlight` nodes).
    Mantra,
    /// Arnold for Houdini (`arnold_light` nodes).
    Arnold,
}

impl Renderer {
    /// Wire name used in persisted documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mantra => "Mantra",
            Self::Arnold => "Arnold",
        }
    }

    /// Parse a wire name back into a renderer.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Mantra" => Some(Self::Mantra),
            "Arnold" => Some(Self::Arnold),
            _ => None,
        }
    }

    /// Prefix for destination node names derived from a light name.
    #[must_use]
    pub const fn node_prefix(self) -> &'static str {
        match self {
            Self::Mantra => "mantra_",
            Self::Arnold => "arnold_",
        }
    }
}

impl std::fmt::Display for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical light kinds keying every mapping table.
///
/// The Mantra side distinguishes physical-size and angular-size variants
/// (`…P`/`…S`, `…D`/`…S`, `cylinderC`/`cylinderL`); the Arnold side keeps
/// the source granularity. Tags are derived by the extractor, never set
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightTypeTag {
    /// Point light without a physical radius (Mantra).
    #[serde(rename = "pointLightP")]
    PointPlain,
    /// Point light with a non-zero radius, a small sphere (Mantra).
    #[serde(rename = "pointLightS")]
    PointSphere,
    /// Directional light with hard shadows (Mantra).
    #[serde(rename = "directionalLightD")]
    DirectionalPlain,
    /// Directional light with a non-zero angular diameter (Mantra).
    #[serde(rename = "directionalLightS")]
    DirectionalSun,
    /// Spot light emitting from a point (Mantra).
    #[serde(rename = "spotLightP")]
    SpotPlain,
    /// Spot light emitting from a sphere (Mantra).
    #[serde(rename = "spotLightS")]
    SpotSphere,
    /// Rectangular area light (both renderers).
    #[serde(rename = "areaLight")]
    Area,
    /// Quad area light (both renderers).
    #[serde(rename = "quad")]
    Quad,
    /// Disk area light (both renderers).
    #[serde(rename = "disk")]
    Disk,
    /// Cylinder light with non-zero caps radius (Mantra).
    #[serde(rename = "cylinderC")]
    CylinderCapped,
    /// Cylinder light degenerated to a line (Mantra).
    #[serde(rename = "cylinderL")]
    CylinderLine,
    /// Dome / environment light (both renderers).
    #[serde(rename = "aiSkyDomeLight")]
    Dome,
    /// Point light (Arnold granularity).
    #[serde(rename = "pointLight")]
    Point,
    /// Directional light (Arnold granularity).
    #[serde(rename = "directionalLight")]
    Directional,
    /// Spot light (Arnold granularity).
    #[serde(rename = "spotLight")]
    Spot,
    /// Cylinder light (Arnold granularity).
    #[serde(rename = "cylinder")]
    Cylinder,
}

impl LightTypeTag {
    /// Wire name stored under the record's `nodeType` key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointPlain => "pointLightP",
            Self::PointSphere => "pointLightS",
            Self::DirectionalPlain => "directionalLightD",
            Self::DirectionalSun => "directionalLightS",
            Self::SpotPlain => "spotLightP",
            Self::SpotSphere => "spotLightS",
            Self::Area => "areaLight",
            Self::Quad => "quad",
            Self::Disk => "disk",
            Self::CylinderCapped => "cylinderC",
            Self::CylinderLine => "cylinderL",
            Self::Dome => "aiSkyDomeLight",
            Self::Point => "pointLight",
            Self::Directional => "directionalLight",
            Self::Spot => "spotLight",
            Self::Cylinder => "cylinder",
        }
    }

    /// Parse a wire name back into a tag.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        [
            Self::PointPlain,
            Self::PointSphere,
            Self::DirectionalPlain,
            Self::DirectionalSun,
            Self::SpotPlain,
            Self::SpotSphere,
            Self::Area,
            Self::Quad,
            Self::Disk,
            Self::CylinderCapped,
            Self::CylinderLine,
            Self::Dome,
            Self::Point,
            Self::Directional,
            Self::Spot,
            Self::Cylinder,
        ]
        .into_iter()
        .find(|tag| tag.as_str() == name)
    }

    /// Whether this tag names one of the cylinder variants.
    #[must_use]
    pub const fn is_cylinder(self) -> bool {
        matches!(
            self,
            Self::CylinderCapped | Self::CylinderLine | Self::Cylinder
        )
    }
}

impl std::fmt::Display for LightTypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value carried by one canonical parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean toggle (visibility, normalize flags).
    Bool(bool),
    /// Numeric value; all numerics travel as doubles.
    Number(f64),
    /// Texture path, AOV tag, or the empty string for "none".
    Text(String),
}

impl ParamValue {
    /// Numeric view; booleans coerce to 0/1 like the source host does.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Bool(b) => Some(f64::from(*b)),
            Self::Text(_) => None,
        }
    }

    /// String view.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Host-style truthiness: non-zero, `true`, or a non-empty string.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ParamValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parameters captured for one light, for one destination renderer.
///
/// Parameter order follows the catalog's declared order. The order is
/// contractual: the spread handler folds a correction into an exposure
/// written by an earlier parameter, so it is preserved through
/// serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSection {
    /// Tag this section was classified as.
    pub light_type: LightTypeTag,
    /// Canonical parameter name → raw value, in catalog order.
    pub params: Vec<(String, ParamValue)>,
}

impl RecordSection {
    /// Create an empty section for a tag.
    #[must_use]
    pub const fn new(light_type: LightTypeTag) -> Self {
        Self {
            light_type,
            params: Vec::new(),
        }
    }

    /// Look up a parameter by canonical name.
    #[must_use]
    pub fn get(&self, parm: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(name, _)| name == parm)
            .map(|(_, value)| value)
    }

    /// Numeric view of a parameter, if present and numeric.
    #[must_use]
    pub fn number(&self, parm: &str) -> Option<f64> {
        self.get(parm).and_then(ParamValue::as_f64)
    }

    /// Insert a parameter, replacing in place if the key already exists.
    pub fn set(&mut self, parm: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        if let Some(slot) = self.params.iter_mut().find(|(name, _)| name == parm) {
            slot.1 = value;
        } else {
            self.params.push((parm.to_owned(), value));
        }
    }
}

/// One exported light: sanitized name plus a section per destination.
///
/// Built once per export pass and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LightRecord {
    /// Unique name derived from the light's scene path.
    pub name: String,
    /// Per-renderer parameter sections, in extraction order.
    pub sections: Vec<(Renderer, RecordSection)>,
}

impl LightRecord {
    /// The section targeting `renderer`, if one was extracted.
    #[must_use]
    pub fn section(&self, renderer: Renderer) -> Option<&RecordSection> {
        self.sections
            .iter()
            .find(|(r, _)| *r == renderer)
            .map(|(_, s)| s)
    }
}

/// Sanitize a scene path into a record name: path separators become
/// underscores and the leading separator is dropped.
#[must_use]
pub fn sanitize_name(path: &str) -> String {
    let flat = path.replace('|', "_");
    flat.strip_prefix('_').map_or(flat.clone(), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_wire_names_round_trip() {
        for name in [
            "pointLightP",
            "directionalLightS",
            "cylinderL",
            "aiSkyDomeLight",
            "pointLight",
        ] {
            let tag = LightTypeTag::parse(name).unwrap();
            assert_eq!(tag.as_str(), name);
        }
        assert!(LightTypeTag::parse("volumeLight").is_none());
    }

    #[test]
    fn sanitize_strips_leading_separator() {
        assert_eq!(sanitize_name("|group|keyLight"), "group_keyLight");
        assert_eq!(sanitize_name("plain"), "plain");
    }

    #[test]
    fn section_set_replaces_in_place() {
        let mut section = RecordSection::new(LightTypeTag::PointPlain);
        section.set("intensity", 1.0);
        section.set("aiExposure", 0.0);
        section.set("intensity", 2.0);
        assert_eq!(section.params[0].0, "intensity");
        assert_eq!(section.number("intensity"), Some(2.0));
        assert_eq!(section.params.len(), 2);
    }

    #[test]
    fn truthiness_matches_host_semantics() {
        assert!(ParamValue::Number(0.5).is_truthy());
        assert!(!ParamValue::Number(0.0).is_truthy());
        assert!(!ParamValue::Text(String::new()).is_truthy());
        assert!(ParamValue::Bool(true).is_truthy());
    }
}
