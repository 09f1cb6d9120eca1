//! Light extraction: walk the source selection and build canonical
//! records for both destination renderers.
//!
//! Classification happens here and nowhere else. The Mantra side splits
//! point, spot, directional and cylinder lights into physical-size and
//! angular-size variants; the Arnold side keeps the source granularity
//! and only resolves the area-light translator.

use log::{info, warn};

use crate::catalog::MappingCatalog;
use crate::error::TransferError;
use crate::record::{
    sanitize_name, LightRecord, LightTypeTag, ParamValue, RecordSection, Renderer,
};
use crate::scene::{SourceLight, SourceScene};

/// How the light's color input is resolved, decided once per light and
/// applied to both renderer sections.
///
/// A live color connection together with an enabled color temperature
/// means the temperature wins: the texture is dropped and both sections
/// get an empty texture path so the destination does not keep a stale
/// map.
#[derive(Debug, Clone, PartialEq)]
enum ColorCapture {
    /// Color input is driven by a texture node.
    Texture {
        /// Source node feeding the color input.
        node: String,
        /// Resolved image path, empty when the node type is unknown.
        path: String,
    },
    /// Color temperature converted to RGB.
    Kelvin {
        rgb: [f64; 3],
        /// A connection was present and must be cleared downstream.
        clear_texture: bool,
    },
    /// Plain color channels read as-is.
    Channels([f64; 3]),
}

/// Builds [`LightRecord`]s from a source scene using one catalog.
pub struct Extractor<'a> {
    catalog: &'a MappingCatalog,
}

impl<'a> Extractor<'a> {
    /// Bind an extractor to a catalog.
    #[must_use]
    pub const fn new(catalog: &'a MappingCatalog) -> Self {
        Self { catalog }
    }

    /// Extract every selected light.
    ///
    /// A light that cannot be classified or read is skipped with a
    /// warning; every attribute its catalog entry declares must be
    /// readable, so an exported record's key set always equals the
    /// declared set. Catalog inconsistencies abort the whole pass since
    /// every later light would hit the same table.
    ///
    /// # Errors
    ///
    /// Fatal [`TransferError`]s only; per-light failures are logged.
    pub fn extract(&self, scene: &impl SourceScene) -> Result<Vec<LightRecord>, TransferError> {
        let selected = scene.selected_lights()?;
        let total = selected.len();

        let mut records = Vec::with_capacity(total);
        for light in &selected {
            match self.build_record(scene, light) {
                Ok(record) => records.push(record),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => warn!("skipping light '{}': {err}", light.transform),
            }
        }

        info!("extracted {} of {total} selected lights", records.len());
        Ok(records)
    }

    fn build_record(
        &self,
        scene: &impl SourceScene,
        light: &SourceLight,
    ) -> Result<LightRecord, TransferError> {
        let node_type = scene.node_type(&light.shape)?;
        let translate = scene.world_translation(&light.transform)?;
        let color = self.capture_color(scene, light)?;

        let mut sections = Vec::with_capacity(2);
        for renderer in [Renderer::Mantra, Renderer::Arnold] {
            let tag = classify(scene, renderer, light, &node_type)?;
            let entry = self.catalog.mapping_for(renderer, tag)?;

            let mut section = RecordSection::new(tag);
            for parm in entry.canonical_names() {
                match parm {
                    "translateX" => section.set(parm, translate[0]),
                    "translateY" => section.set(parm, translate[1]),
                    "translateZ" => section.set(parm, translate[2]),
                    _ => {
                        let value = scene.attr(&light.transform, parm)?;
                        // "default" is the host's unset AOV marker.
                        if parm == "aiAov" && value.as_str() == Some("default") {
                            section.set(parm, "");
                        } else {
                            section.set(parm, value);
                        }
                    }
                }
            }

            apply_color(&mut section, renderer, &color, self.catalog.color_parms());
            sections.push((renderer, section));
        }

        Ok(LightRecord {
            name: sanitize_name(&light.transform),
            sections,
        })
    }

    fn capture_color(
        &self,
        scene: &impl SourceScene,
        light: &SourceLight,
    ) -> Result<ColorCapture, TransferError> {
        let connected = scene.connected_source(&light.transform, "color")?;
        let use_temperature = attr_truthy(scene, &light.transform, "aiUseColorTemperature");

        if let Some(source) = connected {
            if use_temperature {
                let kelvin = scene.attr(&light.transform, "aiColorTemperature")?;
                let kelvin = expect_number(&light.transform, "aiColorTemperature", &kelvin)?;
                return Ok(ColorCapture::Kelvin {
                    rgb: crate::photometry::kelvin_to_rgb(kelvin),
                    clear_texture: true,
                });
            }
            let path = texture_path(scene, &source);
            return Ok(ColorCapture::Texture { node: source, path });
        }

        if use_temperature {
            let kelvin = scene.attr(&light.transform, "aiColorTemperature")?;
            let kelvin = expect_number(&light.transform, "aiColorTemperature", &kelvin)?;
            return Ok(ColorCapture::Kelvin {
                rgb: crate::photometry::kelvin_to_rgb(kelvin),
                clear_texture: false,
            });
        }

        let mut rgb = [1.0; 3];
        for (slot, (channel, _)) in rgb.iter_mut().zip(self.catalog.color_parms()) {
            let value = scene.attr(&light.transform, channel)?;
            *slot = expect_number(&light.transform, channel, &value)?;
        }
        Ok(ColorCapture::Channels(rgb))
    }
}

/// Resolve the image path behind a color connection. Only the two file
/// node types carry one; anything else yields an empty path.
fn texture_path(scene: &impl SourceScene, node: &str) -> String {
    let path_attr = match scene.node_type(node).as_deref() {
        Ok("file") => "fileTextureName",
        Ok("aiImage") => "filename",
        _ => return String::new(),
    };
    scene
        .attr(node, path_attr)
        .ok()
        .and_then(|value| value.as_str().map(str::to_owned))
        .unwrap_or_default()
}

fn apply_color(
    section: &mut RecordSection,
    renderer: Renderer,
    color: &ColorCapture,
    color_parms: &[(String, String)],
) {
    match color {
        ColorCapture::Texture { node, path } => {
            for (channel, _) in color_parms {
                section.set(channel, 1.0);
            }
            if renderer == Renderer::Mantra {
                section.set("texture_node", node.as_str());
            }
            section.set("texture_map", path.as_str());
        }
        ColorCapture::Kelvin { rgb, clear_texture } => {
            for ((channel, _), value) in color_parms.iter().zip(rgb) {
                section.set(channel, *value);
            }
            if *clear_texture {
                section.set("texture_map", "");
            }
        }
        ColorCapture::Channels(rgb) => {
            for ((channel, _), value) in color_parms.iter().zip(rgb) {
                section.set(channel, *value);
            }
        }
    }
}

fn attr_truthy(scene: &impl SourceScene, node: &str, attr: &str) -> bool {
    scene
        .attr(node, attr)
        .map(|value| value.is_truthy())
        .unwrap_or(false)
}

fn expect_number(light: &str, parm: &str, value: &ParamValue) -> Result<f64, TransferError> {
    value.as_f64().ok_or_else(|| TransferError::ValueShape {
        light: light.to_owned(),
        parm: parm.to_owned(),
        expected: "number",
    })
}

/// Derive the canonical tag for one light and one destination renderer.
fn classify(
    scene: &impl SourceScene,
    renderer: Renderer,
    light: &SourceLight,
    node_type: &str,
) -> Result<LightTypeTag, TransferError> {
    let unknown = || TransferError::Classification {
        light: light.transform.clone(),
        node_type: node_type.to_owned(),
    };

    let tag = match (renderer, node_type) {
        (Renderer::Mantra, "pointLight") => {
            if attr_truthy(scene, &light.shape, "aiRadius") {
                LightTypeTag::PointSphere
            } else {
                LightTypeTag::PointPlain
            }
        }
        (Renderer::Mantra, "directionalLight") => {
            if attr_truthy(scene, &light.shape, "aiAngle") {
                LightTypeTag::DirectionalSun
            } else {
                LightTypeTag::DirectionalPlain
            }
        }
        (Renderer::Mantra, "spotLight") => {
            if attr_truthy(scene, &light.shape, "aiRadius") {
                LightTypeTag::SpotSphere
            } else {
                LightTypeTag::SpotPlain
            }
        }
        (Renderer::Arnold, "pointLight") => LightTypeTag::Point,
        (Renderer::Arnold, "directionalLight") => LightTypeTag::Directional,
        (Renderer::Arnold, "spotLight") => LightTypeTag::Spot,
        (_, "areaLight") => LightTypeTag::Area,
        (_, "aiSkyDomeLight") => LightTypeTag::Dome,
        (_, "aiAreaLight") => {
            let translator = scene.attr(&light.shape, "aiTranslator")?;
            match (renderer, translator.as_str()) {
                (_, Some("quad")) => LightTypeTag::Quad,
                (_, Some("disk")) => LightTypeTag::Disk,
                (Renderer::Arnold, Some("cylinder")) => LightTypeTag::Cylinder,
                (Renderer::Mantra, Some("cylinder")) => {
                    // A cylinder squashed flat on both radial axes is a line.
                    let sx = scene.attr(&light.transform, "scaleX")?;
                    let sz = scene.attr(&light.transform, "scaleZ")?;
                    if sx.as_f64() == Some(0.0) && sz.as_f64() == Some(0.0) {
                        LightTypeTag::CylinderLine
                    } else {
                        LightTypeTag::CylinderCapped
                    }
                }
                _ => return Err(unknown()),
            }
        }
        _ => return Err(unknown()),
    };
    Ok(tag)
}

/// Seed every catalog-declared attribute on a transform with a zero so
/// sparse test scenes satisfy the strict read contract; individual
/// tests then set only the values they assert on.
#[cfg(test)]
pub(crate) fn seed_declared(scene: &mut crate::scene::memory::MemoryScene, transform: &str) {
    use LightTypeTag as Tag;
    let catalog = MappingCatalog::builtin();
    let tags = [
        Tag::PointPlain,
        Tag::PointSphere,
        Tag::DirectionalPlain,
        Tag::DirectionalSun,
        Tag::SpotPlain,
        Tag::SpotSphere,
        Tag::Area,
        Tag::Quad,
        Tag::Disk,
        Tag::CylinderCapped,
        Tag::CylinderLine,
        Tag::Dome,
        Tag::Point,
        Tag::Directional,
        Tag::Spot,
        Tag::Cylinder,
    ];
    for renderer in [Renderer::Mantra, Renderer::Arnold] {
        for tag in tags {
            if let Ok(entry) = catalog.mapping_for(renderer, tag) {
                for parm in entry.canonical_names() {
                    if !parm.starts_with("translate") {
                        scene.set_attr(transform, parm, 0.0);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::memory::MemoryScene;

    fn light_scene(node_type: &str) -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.add_node("|key", "transform");
        scene.add_node("|key|keyShape", node_type);
        scene.select_light("|key", "|key|keyShape");
        seed_declared(&mut scene, "|key");
        scene
    }

    fn set_common(scene: &mut MemoryScene) {
        for (attr, value) in [
            ("rotateX", 0.0),
            ("rotateY", 0.0),
            ("rotateZ", 0.0),
            ("intensity", 1.0),
            ("aiExposure", 0.0),
            ("colorR", 1.0),
            ("colorG", 1.0),
            ("colorB", 1.0),
        ] {
            scene.set_attr("|key", attr, value);
        }
        scene.set_attr("|key", "visibility", true);
    }

    #[test]
    fn point_light_splits_on_radius() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = light_scene("pointLight");
        set_common(&mut scene);
        scene.set_attr("|key|keyShape", "aiRadius", 0.0);
        let records = extractor.extract(&scene).unwrap();
        assert_eq!(
            records[0].section(Renderer::Mantra).unwrap().light_type,
            LightTypeTag::PointPlain
        );
        assert_eq!(
            records[0].section(Renderer::Arnold).unwrap().light_type,
            LightTypeTag::Point
        );

        scene.set_attr("|key|keyShape", "aiRadius", 0.4);
        let records = extractor.extract(&scene).unwrap();
        assert_eq!(
            records[0].section(Renderer::Mantra).unwrap().light_type,
            LightTypeTag::PointSphere
        );
    }

    #[test]
    fn cylinder_degenerates_to_a_line() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = light_scene("aiAreaLight");
        set_common(&mut scene);
        scene.set_attr("|key|keyShape", "aiTranslator", "cylinder");
        scene.set_attr("|key", "scaleX", 0.0);
        scene.set_attr("|key", "scaleY", 3.0);
        scene.set_attr("|key", "scaleZ", 0.0);

        let records = extractor.extract(&scene).unwrap();
        assert_eq!(
            records[0].section(Renderer::Mantra).unwrap().light_type,
            LightTypeTag::CylinderLine
        );
        assert_eq!(
            records[0].section(Renderer::Arnold).unwrap().light_type,
            LightTypeTag::Cylinder
        );

        scene.set_attr("|key", "scaleX", 1.0);
        let records = extractor.extract(&scene).unwrap();
        assert_eq!(
            records[0].section(Renderer::Mantra).unwrap().light_type,
            LightTypeTag::CylinderCapped
        );
    }

    #[test]
    fn world_position_beats_local_translate() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = light_scene("pointLight");
        set_common(&mut scene);
        scene.set_attr("|key|keyShape", "aiRadius", 0.0);
        scene.set_attr("|key", "translateX", 1.0);
        scene.set_world_position("|key", [10.0, 20.0, 30.0]);

        let records = extractor.extract(&scene).unwrap();
        let section = records[0].section(Renderer::Mantra).unwrap();
        assert_eq!(section.number("translateX"), Some(10.0));
        assert_eq!(section.number("translateY"), Some(20.0));
        assert_eq!(section.number("translateZ"), Some(30.0));
    }

    #[test]
    fn default_aov_becomes_empty() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = light_scene("pointLight");
        set_common(&mut scene);
        scene.set_attr("|key|keyShape", "aiRadius", 0.0);
        scene.set_attr("|key", "aiAov", "default");

        let records = extractor.extract(&scene).unwrap();
        let section = records[0].section(Renderer::Mantra).unwrap();
        assert_eq!(section.get("aiAov").unwrap().as_str(), Some(""));
    }

    #[test]
    fn temperature_beats_texture_connection() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = light_scene("pointLight");
        set_common(&mut scene);
        scene.set_attr("|key|keyShape", "aiRadius", 0.0);
        scene.add_node("ramp1", "ramp");
        scene.connect("|key", "color", "ramp1");
        scene.set_attr("|key", "aiUseColorTemperature", true);
        scene.set_attr("|key", "aiColorTemperature", 6500.0);

        let records = extractor.extract(&scene).unwrap();
        for renderer in [Renderer::Mantra, Renderer::Arnold] {
            let section = records[0].section(renderer).unwrap();
            assert_eq!(section.get("texture_map").unwrap().as_str(), Some(""));
            assert!(section.get("texture_node").is_none());
            // 6500K is close to white.
            let red = section.number("colorR").unwrap();
            assert!((0.9..=1.0).contains(&red), "red was {red}");
        }
    }

    #[test]
    fn texture_connection_whitens_color_and_records_the_path() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = light_scene("aiSkyDomeLight");
        set_common(&mut scene);
        scene.set_attr("|key", "colorR", 0.25);
        scene.add_node("env_file", "file");
        scene.set_attr("env_file", "fileTextureName", "/show/maps/sky.exr");
        scene.connect("|key", "color", "env_file");

        let records = extractor.extract(&scene).unwrap();
        let mantra = records[0].section(Renderer::Mantra).unwrap();
        assert_eq!(mantra.number("colorR"), Some(1.0));
        assert_eq!(
            mantra.get("texture_map").unwrap().as_str(),
            Some("/show/maps/sky.exr")
        );
        assert_eq!(
            mantra.get("texture_node").unwrap().as_str(),
            Some("env_file")
        );
        let arnold = records[0].section(Renderer::Arnold).unwrap();
        assert!(arnold.get("texture_node").is_none());
        assert_eq!(
            arnold.get("texture_map").unwrap().as_str(),
            Some("/show/maps/sky.exr")
        );
    }

    #[test]
    fn unknown_light_kinds_are_skipped_not_fatal() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = light_scene("volumeLight");
        scene.add_node("|fill", "transform");
        scene.add_node("|fill|fillShape", "pointLight");
        scene.set_attr("|fill|fillShape", "aiRadius", 0.0);
        scene.select_light("|fill", "|fill|fillShape");
        seed_declared(&mut scene, "|fill");

        let records = extractor.extract(&scene).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "fill");
    }

    #[test]
    fn record_names_are_sanitized_scene_paths() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = MemoryScene::new();
        scene.add_node("|rig|key", "transform");
        scene.add_node("|rig|key|keyShape", "aiSkyDomeLight");
        scene.select_light("|rig|key", "|rig|key|keyShape");
        seed_declared(&mut scene, "|rig|key");

        let records = extractor.extract(&scene).unwrap();
        assert_eq!(records[0].name, "rig_key");
    }

    #[test]
    fn missing_declared_attribute_aborts_that_light_only() {
        let catalog = MappingCatalog::builtin();
        let extractor = Extractor::new(&catalog);

        let mut scene = light_scene("pointLight");
        set_common(&mut scene);
        scene.set_attr("|key|keyShape", "aiRadius", 0.0);
        scene.clear_attr("|key", "intensity");

        scene.add_node("|fill", "transform");
        scene.add_node("|fill|fillShape", "pointLight");
        scene.set_attr("|fill|fillShape", "aiRadius", 0.0);
        scene.select_light("|fill", "|fill|fillShape");
        seed_declared(&mut scene, "|fill");

        let records = extractor.extract(&scene).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "fill");
    }
}
