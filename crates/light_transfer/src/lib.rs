//! # Light Transfer
//!
//! A library for moving light rigs between a source DCC scene and a
//! Houdini scene, targeting the Mantra and Arnold renderers.
//!
//! ## Features
//!
//! - **Mapping Catalog**: Declarative per-type parameter tables for both
//!   destination renderers, loadable from a JSON document
//! - **Extraction**: Classifies selected source lights and captures
//!   their parameters into renderer-agnostic records
//! - **Synthesis**: Rebuilds destination light nodes from records,
//!   converting exposure, cone, spread and soft-edge photometry
//! - **Scene Abstraction**: Host scenes sit behind traits, with an
//!   in-memory implementation for tests and headless pipelines
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use light_transfer::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = MappingCatalog::builtin();
//!     let mut scene = MemoryScene::new();
//!
//!     let records = load_records("lights.json")?;
//!     let options = ImportOptions { scale: 0.1, ..ImportOptions::default() };
//!     import_lights(&mut scene, &catalog, &records, &options)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod photometry;
pub mod record;
pub mod scene;

mod extract;
mod synth;


pub use document::{load_records, records_from_json, records_to_json, save_records};
pub use extract::Extractor;
pub use synth::Synthesizer;

use catalog::MappingCatalog;
use config::ImportOptions;
use error::TransferError;
use record::LightRecord;
use scene::{SourceScene, TargetScene};

/// Export the source scene's selected lights as canonical records.
///
/// # Errors
///
/// Fatal [`TransferError`]s only; lights that fail individually are
/// logged and skipped.
pub fn export_lights(
    scene: &impl SourceScene,
    catalog: &MappingCatalog,
) -> Result<Vec<LightRecord>, TransferError> {
    Extractor::new(catalog).extract(scene)
}

/// Import records into the destination scene, replacing same-named
/// lights. Returns the number of lights created.
///
/// # Errors
///
/// Fatal [`TransferError`]s only; lights that fail individually are
/// logged and skipped.
pub fn import_lights(
    scene: &mut impl TargetScene,
    catalog: &MappingCatalog,
    records: &[LightRecord],
    options: &ImportOptions,
) -> Result<usize, TransferError> {
    Synthesizer::new(catalog).synthesize(scene, records, options)
}

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        catalog::MappingCatalog,
        config::{Config, ImportOptions},
        document::{load_records, save_records},
        error::TransferError,
        export_lights, import_lights,
        record::{LightRecord, LightTypeTag, ParamValue, RecordSection, Renderer},
        scene::{memory::MemoryScene, SourceScene, TargetScene},
        Extractor, Synthesizer,
    };
}
