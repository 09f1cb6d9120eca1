//! Persisted light documents.
//!
//! The native form is the dual document: one object per light holding a
//! `Mantra` and an `Arnold` section, each led by a `nodeType` key. A
//! flat form (sections inlined directly under the light name) is also
//! accepted on load and treated as Mantra-only; hand-trimmed documents
//! from earlier pipeline versions use it.
//!
//! Key order inside a section is meaningful and survives both
//! directions.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::TransferError;
use crate::record::{LightRecord, LightTypeTag, ParamValue, RecordSection, Renderer};

/// Serialize records into the dual document form.
#[must_use]
pub fn records_to_json(records: &[LightRecord]) -> Value {
    let mut root = Map::new();
    for record in records {
        let mut sections = Map::new();
        for (renderer, section) in &record.sections {
            sections.insert(renderer.as_str().to_owned(), section_to_json(section));
        }
        root.insert(record.name.clone(), Value::Object(sections));
    }
    Value::Object(root)
}

/// Deserialize records from either document form.
///
/// # Errors
///
/// [`TransferError::Document`] on shape violations: a non-object root,
/// an unknown `nodeType`, or a section value that is not a scalar.
pub fn records_from_json(value: &Value) -> Result<Vec<LightRecord>, TransferError> {
    let root = value
        .as_object()
        .ok_or_else(|| TransferError::Document("document root is not an object".to_owned()))?;

    let mut records = Vec::with_capacity(root.len());
    for (name, body) in root {
        let body = body.as_object().ok_or_else(|| {
            TransferError::Document(format!("light '{name}' is not an object"))
        })?;

        let mut sections = Vec::new();
        if body.contains_key("nodeType") {
            // Flat form: the light object is itself one Mantra section.
            sections.push((Renderer::Mantra, section_from_json(name, body)?));
        } else {
            for (key, section) in body {
                let renderer = Renderer::parse(key).ok_or_else(|| {
                    TransferError::Document(format!(
                        "light '{name}' has unknown renderer section '{key}'"
                    ))
                })?;
                let section = section.as_object().ok_or_else(|| {
                    TransferError::Document(format!(
                        "section '{key}' of light '{name}' is not an object"
                    ))
                })?;
                sections.push((renderer, section_from_json(name, section)?));
            }
        }

        records.push(LightRecord {
            name: name.clone(),
            sections,
        });
    }
    Ok(records)
}

/// Write records to disk in the dual document form.
///
/// # Errors
///
/// IO errors from the write.
pub fn save_records(records: &[LightRecord], path: impl AsRef<Path>) -> Result<(), TransferError> {
    let contents = serde_json::to_string_pretty(&records_to_json(records))?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Load records from a document on disk.
///
/// # Errors
///
/// IO, parse, or shape errors from the underlying document.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<LightRecord>, TransferError> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    records_from_json(&value)
}

fn section_to_json(section: &RecordSection) -> Value {
    let mut object = Map::new();
    object.insert(
        "nodeType".to_owned(),
        Value::String(section.light_type.as_str().to_owned()),
    );
    for (parm, value) in &section.params {
        object.insert(parm.clone(), value_to_json(value));
    }
    Value::Object(object)
}

fn value_to_json(value: &ParamValue) -> Value {
    match value {
        ParamValue::Bool(b) => Value::Bool(*b),
        ParamValue::Number(n) => serde_json::json!(n),
        ParamValue::Text(s) => Value::String(s.clone()),
    }
}

fn section_from_json(
    light: &str,
    object: &Map<String, Value>,
) -> Result<RecordSection, TransferError> {
    let tag = object
        .get("nodeType")
        .and_then(Value::as_str)
        .and_then(LightTypeTag::parse)
        .ok_or_else(|| {
            TransferError::Document(format!("light '{light}' has no usable 'nodeType'"))
        })?;

    let mut section = RecordSection::new(tag);
    for (parm, value) in object {
        if parm == "nodeType" {
            continue;
        }
        let value = match value {
            Value::Bool(b) => ParamValue::Bool(*b),
            Value::Number(n) => ParamValue::Number(n.as_f64().ok_or_else(|| {
                TransferError::Document(format!(
                    "parameter '{parm}' of light '{light}' is not a double"
                ))
            })?),
            Value::String(s) => ParamValue::Text(s.clone()),
            _ => {
                return Err(TransferError::Document(format!(
                    "parameter '{parm}' of light '{light}' is not a scalar"
                )))
            }
        };
        section.params.push((parm.clone(), value));
    }
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> LightRecord {
        let mut mantra = RecordSection::new(LightTypeTag::PointPlain);
        mantra.set("translateX", 1.0);
        mantra.set("visibility", true);
        mantra.set("aiExposure", 2.5);
        mantra.set("aiAov", "");
        let mut arnold = RecordSection::new(LightTypeTag::Point);
        arnold.set("translateX", 1.0);
        LightRecord {
            name: "key".to_owned(),
            sections: vec![(Renderer::Mantra, mantra), (Renderer::Arnold, arnold)],
        }
    }

    #[test]
    fn dual_form_round_trips_with_order() {
        let records = vec![sample_record()];
        let value = records_to_json(&records);
        let restored = records_from_json(&value).unwrap();
        assert_eq!(restored, records);

        // nodeType leads each section, then parameters in record order.
        let keys: Vec<&String> = value["key"]["Mantra"].as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            ["nodeType", "translateX", "visibility", "aiExposure", "aiAov"]
        );
    }

    #[test]
    fn flat_form_loads_as_mantra_only() {
        let value = serde_json::json!({
            "rim": {
                "nodeType": "quad",
                "translateX": -4.0,
                "exposure": 1.0
            }
        });
        let records = records_from_json(&value).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sections.len(), 1);
        let (renderer, section) = &records[0].sections[0];
        assert_eq!(*renderer, Renderer::Mantra);
        assert_eq!(section.light_type, LightTypeTag::Quad);
        assert_eq!(section.number("translateX"), Some(-4.0));
    }

    #[test]
    fn unknown_node_type_is_a_document_error() {
        let value = serde_json::json!({
            "bad": { "nodeType": "volumeLight" }
        });
        let err = records_from_json(&value).unwrap_err();
        assert!(matches!(err, TransferError::Document(_)));
    }

    #[test]
    fn nested_values_are_rejected() {
        let value = serde_json::json!({
            "bad": {
                "Mantra": {
                    "nodeType": "pointLightP",
                    "translateX": [1.0, 2.0]
                }
            }
        });
        assert!(records_from_json(&value).is_err());
    }
}
