//! Error taxonomy for export/import passes.

use crate::record::{LightTypeTag, Renderer};
use crate::scene::SceneError;

/// Errors raised while transferring lights between scenes.
///
/// Per-light errors (classification, numeric domain, host interaction)
/// abort only the light that raised them; [`TransferError::CatalogMismatch`]
/// signals a catalog/classifier inconsistency and aborts the whole batch.
#[derive(thiserror::Error, Debug)]
pub enum TransferError {
    /// A selected light has a native type no catalog tag covers.
    #[error("light '{light}' has unsupported node type '{node_type}'")]
    Classification {
        /// Scene path of the offending light.
        light: String,
        /// Native node type that failed to classify.
        node_type: String,
    },

    /// A classified tag has no mapping entry for the requested renderer.
    #[error("no {renderer} mapping for light type '{tag}'")]
    CatalogMismatch {
        /// Destination renderer that was asked for.
        renderer: Renderer,
        /// Tag missing from the catalog.
        tag: LightTypeTag,
    },

    /// A mapping entry is missing a destination the handler requires.
    #[error("mapping for '{tag}' declares no '{parm}' destination")]
    MissingDestination {
        /// Tag whose entry is incomplete.
        tag: LightTypeTag,
        /// Canonical parameter with no destination.
        parm: String,
    },

    /// A conversion function received an input outside its domain.
    #[error("numeric domain error in {function}: {detail}")]
    NumericDomain {
        /// Conversion function that rejected the input.
        function: &'static str,
        /// What was wrong with it.
        detail: String,
    },

    /// The host scene rejected a read or write.
    #[error(transparent)]
    Host(#[from] SceneError),

    /// A record carried a value of the wrong shape for its handler.
    #[error("parameter '{parm}' of light '{light}' is not a {expected}")]
    ValueShape {
        /// Light whose record is malformed.
        light: String,
        /// Offending parameter key.
        parm: String,
        /// Shape the handler needed.
        expected: &'static str,
    },

    /// Reading or writing a persisted document failed.
    #[error("document IO failed: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted document did not parse.
    #[error("document parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// A persisted document parsed but had an unexpected shape.
    #[error("malformed document: {0}")]
    Document(String),
}

impl TransferError {
    /// Whether this error must abort the whole batch rather than one light.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CatalogMismatch { .. } | Self::MissingDestination { .. }
        )
    }
}
