//! Pipeline entry points shared by the CLI and library users.
//! Everything here is synchronous and file-at-a-time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::decoder::BankMap;
use crate::parser::netlist::{NetlistParser, DEFAULT_TARGET_REF};
use crate::parser::sexp::ParseError;
use crate::pinout::{PinoutAssembler, PinoutDocument};

#[derive(Debug, thiserror::Error)]
pub enum PinoutError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Netlist has no (nets ...) section")]
    MissingNetsSection,
    #[error("No pins found for component {target}")]
    NoPins { target: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
}

/// Options for a pipeline run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PinoutOptions {
    /// Reference designator of the component to extract.
    pub target_ref: String,
    pub bank_map: BankMap,
}

impl Default for PinoutOptions {
    fn default() -> Self {
        Self {
            target_ref: DEFAULT_TARGET_REF.to_string(),
            bank_map: BankMap::default(),
        }
    }
}

impl PinoutOptions {
    /// Load options from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, PinoutError> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| PinoutError::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Core pipeline API.
pub struct PinoutCore;

impl PinoutCore {
    /// Netlist text to an assembled (not yet decoded) pinout document.
    pub fn extract_str(text: &str, options: &PinoutOptions) -> Result<PinoutDocument, PinoutError> {
        let pins = NetlistParser::parse(text, &options.target_ref)?;
        if pins.is_empty() {
            return Err(PinoutError::NoPins {
                target: options.target_ref.clone(),
            });
        }

        let count = pins.len();
        let document = PinoutAssembler::assemble(pins);
        tracing::info!(
            target_ref = %options.target_ref,
            pins = count,
            pages = document.pages().count(),
            "extracted pinout"
        );
        Ok(document)
    }

    pub fn extract(path: &Path, options: &PinoutOptions) -> Result<PinoutDocument, PinoutError> {
        tracing::debug!(path = %path.display(), "reading netlist");
        let text = fs::read_to_string(path)?;
        Self::extract_str(&text, options)
    }

    /// Merge decoded pin-function metadata into every record.
    pub fn augment(document: &mut PinoutDocument, options: &PinoutOptions) {
        document.decode_pins(&options.bank_map);
        tracing::info!(pins = document.pin_count(), "augmented pinout");
    }

    pub fn read_document(path: &Path) -> Result<PinoutDocument, PinoutError> {
        let text = fs::read_to_string(path)?;
        let mut document: PinoutDocument = serde_json::from_str(&text)?;
        document.annotate();
        Ok(document)
    }

    pub fn to_json(document: &PinoutDocument) -> Result<String, PinoutError> {
        let mut json = serde_json::to_string_pretty(document)?;
        json.push('\n');
        Ok(json)
    }

    /// Write pretty JSON to `path` through a sibling temporary file, so the
    /// destination is either fully replaced or left as it was.
    pub fn write_document(document: &PinoutDocument, path: &Path) -> Result<(), PinoutError> {
        let json = Self::to_json(document)?;
        let tmp = temp_sibling(path);
        if let Err(e) = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        tracing::debug!(path = %path.display(), "wrote pinout document");
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pinout.json".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PinoutOptions::default();
        assert_eq!(options.target_ref, "U1");
        assert_eq!(options.bank_map, BankMap::default());
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: PinoutOptions = serde_json::from_str(r#"{"target_ref": "U7"}"#).unwrap();
        assert_eq!(options.target_ref, "U7");
        assert_eq!(options.bank_map, BankMap::default());
    }

    #[test]
    fn test_no_pins_is_an_error() {
        let text = r#"(export (nets (net (code "1") (name "GND") (node (ref "C1") (pin "2")))))"#;
        let err = PinoutCore::extract_str(text, &PinoutOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "No pins found for component U1");
    }

    #[test]
    fn test_temp_sibling_stays_in_directory() {
        let tmp = temp_sibling(Path::new("/out/pinout.json"));
        assert_eq!(tmp.parent(), Some(Path::new("/out")));
        assert_ne!(tmp, Path::new("/out/pinout.json"));
    }
}
