use std::path::Path;

use crate::document::Document;
use crate::errors::{DecodeError, StructuralError};

/// Container flavour, chosen from the file extension before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Plain structured text (`.gltf`).
    Text,
    /// Binary chunked container (`.glb`).
    Binary,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self, StructuralError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "gltf" => Ok(SourceKind::Text),
            "glb" => Ok(SourceKind::Binary),
            _ => Err(StructuralError::UnrecognizedExtension(format!(".{ext}"))),
        }
    }
}

/// External collaborator that turns a file into a fully-populated [`Document`].
pub trait DocumentDecoder {
    fn decode(&mut self, path: &Path, kind: SourceKind) -> Result<Document, DecodeError>;
}

impl<F> DocumentDecoder for F
where
    F: FnMut(&Path, SourceKind) -> Result<Document, DecodeError>,
{
    fn decode(&mut self, path: &Path, kind: SourceKind) -> Result<Document, DecodeError> {
        self(path, kind)
    }
}
