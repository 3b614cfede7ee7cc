//! fpga-pinout - KiCad netlist to FPGA pinout extraction
//!
//! This library reads a KiCad s-expression netlist, pulls out every pin of
//! one FPGA, sorts the pins into pages and categories by signal role, and
//! decodes Lattice ECP5 pin-function mnemonics into bank, edge, pairing and
//! capability metadata.
//!
//! # Quick Start
//!
//! ```no_run
//! use fpga_pinout::{PinoutCore, PinoutOptions};
//! use std::path::Path;
//!
//! let options = PinoutOptions::default();
//! let mut document = PinoutCore::extract(Path::new("board.net"), &options).unwrap();
//! PinoutCore::augment(&mut document, &options);
//!
//! for pin in document.signal_pins() {
//!     println!("{} {} ({})", pin.ball, pin.net_name, pin.category);
//! }
//! ```
//!
//! # Features
//!
//! - **Netlist parsing**: bracket-aware s-expression reader
//! - **Classification**: ordered heuristics over net and pin names
//! - **Deterministic ordering**: bus bits, supply rails, control groups
//! - **Mnemonic decoding**: ECP5 banks, LVDS pairing, clock and config pins

pub mod core;
pub mod decoder;
pub mod parser;
pub mod pinout;

pub use crate::core::{PinoutCore, PinoutError, PinoutOptions};
pub use decoder::{decode, BankMap, Capability, DecodedPinInfo, Differential, Edge, EdgeBanks, Pair};
pub use parser::netlist::NetlistParser;
pub use pinout::{
    Category, Page, PinClassifier, PinRecord, PinoutAssembler, PinoutDocument, SignalPin,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BankMap, Category, DecodedPinInfo, Page, PinRecord, PinoutCore, PinoutDocument,
        PinoutError, PinoutOptions,
    };
}
