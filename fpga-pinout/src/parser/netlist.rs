//! KiCad Netlist Extraction
//!
//! Reads the `nets` section of a KiCad s-expression netlist and pulls out
//! every pin of one component (the FPGA, `U1` by default):
//!
//! ```text
//! (export
//!   (nets
//!     (net (code "12") (name "A3_3V3") (class "Default")
//!       (node (ref "U1") (pin "C4") (pinfunction "PL12A") (pintype "bidirectional"))
//!       (node (ref "J2") (pin "5") (pintype "passive")))))
//! ```
//!
//! The reader works on the parsed tree, so extra parenthesized terms inside a
//! net or node never cut a record short.

use std::collections::HashSet;

use crate::core::PinoutError;
use crate::parser::sexp::{SExp, SExpParser};
use crate::pinout::PinRecord;

pub const DEFAULT_TARGET_REF: &str = "U1";

pub struct NetlistParser;

impl NetlistParser {
    /// Extract the target component's pins in netlist order.
    ///
    /// An empty result is not an error here; the caller decides whether a
    /// netlist without target pins is fatal.
    pub fn parse(text: &str, target_ref: &str) -> Result<Vec<PinRecord>, PinoutError> {
        let root = SExpParser::new(text).parse()?;
        let nets = Self::nets_section(&root).ok_or(PinoutError::MissingNetsSection)?;

        let mut pins = Vec::new();
        let mut seen_balls = HashSet::new();

        for net in nets.get_all("net") {
            let code = net.value("code").unwrap_or("?");
            let Some(name) = net.value("name") else {
                tracing::debug!(code, "skipping net without a name");
                continue;
            };

            let before = pins.len();
            for node in net.get_all("node") {
                if node.value("ref") != Some(target_ref) {
                    continue;
                }
                let (Some(ball), Some(function)) = (node.value("pin"), node.value("pinfunction"))
                else {
                    tracing::debug!(net = name, "skipping {target_ref} node without pin or pinfunction");
                    continue;
                };
                if !seen_balls.insert(ball.to_string()) {
                    tracing::warn!(ball, net = name, "ball appears on more than one net");
                }
                pins.push(PinRecord::new(ball, function, name));
            }

            if pins.len() == before {
                tracing::debug!(code, net = name, "no {target_ref} nodes on net");
            }
        }

        tracing::debug!(target_ref, pins = pins.len(), "netlist parsed");
        Ok(pins)
    }

    /// `(nets ...)` as a direct child of the root, else anywhere below it.
    fn nets_section(root: &SExp) -> Option<&SExp> {
        root.get("nets").or_else(|| root.find("nets"))
    }
}
