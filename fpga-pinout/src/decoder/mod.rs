//! Pin Function Decoding
//!
//! Turns Lattice ECP5 pin-function mnemonics (`PL12A`, `VCCio2`,
//! `PCLKT6_0`, `HDTXP0_D0CH1`, ...) into structured metadata: package edge,
//! bank, PIO group, differential pairing and a capability set.
//!
//! Naming conventions follow the ECP5 family data sheet (FPGA-DS-02012,
//! pinout information):
//!
//! - `P[L|R]<group>[A-D]` left/right edge I/O, true LVDS on A/B
//! - `P[T|B]<group>[A|B]` top/bottom edge I/O, emulated differential only
//! - `PCLK[T|C]<bank>_<n>` primary clock, `GR_PCLK<bank>_<n>` general routing
//! - `VCC`, `VCCAUX`, `VCCio<bank>`, `VCCA<n>`, `VREF1_<bank>` supplies
//!
//! Decoding is a pure function of the mnemonic and a [`BankMap`]; merging the
//! result into a [`PinRecord`] only sets what the decoder produced, so it can
//! be repeated without changing the record.

mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pinout::PinRecord;

pub use rules::{decode, rule_names};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    fn title(self) -> &'static str {
        match self {
            Edge::Left => "Left",
            Edge::Right => "Right",
            Edge::Top => "Top",
            Edge::Bottom => "Bottom",
        }
    }
}

/// Which PIO pair within a group the pin belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pair {
    AB,
    CD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Differential {
    /// True LVDS input and output (left/right A/B pairs).
    TrueLvds,
    /// LVDS input only (left/right C/D pairs).
    LvdsInput,
    /// Emulated differential output (top/bottom).
    Emulated,
    ClockPair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Power,
    Ground,
    Serdes,
    Vref,
    Gpio,
    LvdsInput,
    LvdsOutput,
    EmulatedLvdsOutput,
    PrimaryClock,
    PllInput,
    GeneralRoutingClock,
    Jtag,
    Config,
    Spi,
    ReferenceClock,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Power => "power",
            Capability::Ground => "ground",
            Capability::Serdes => "serdes",
            Capability::Vref => "vref",
            Capability::Gpio => "gpio",
            Capability::LvdsInput => "lvds_input",
            Capability::LvdsOutput => "lvds_output",
            Capability::EmulatedLvdsOutput => "emulated_lvds_output",
            Capability::PrimaryClock => "primary_clock",
            Capability::PllInput => "pll_input",
            Capability::GeneralRoutingClock => "general_routing_clock",
            Capability::Jtag => "jtag",
            Capability::Config => "config",
            Capability::Spi => "spi",
            Capability::ReferenceClock => "reference_clock",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata decoded from one pin-function mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedPinInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<Pair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,
    pub capabilities: Vec<Capability>,
    pub description: String,
}

impl DecodedPinInfo {
    pub(crate) fn new(capabilities: &[Capability], description: impl Into<String>) -> Self {
        Self {
            edge: None,
            bank: None,
            group: None,
            pair: None,
            differential: None,
            capabilities: capabilities.to_vec(),
            description: description.into(),
        }
    }

    pub(crate) fn with_bank(mut self, bank: Option<u32>) -> Self {
        self.bank = bank;
        self
    }

    pub(crate) fn with_differential(mut self, differential: Differential) -> Self {
        self.differential = Some(differential);
        self
    }

    /// Merge into `pin`: fields the decoder produced overwrite, everything
    /// else on the record is left alone. Capabilities are replaced, not
    /// appended, so merging twice is the same as merging once.
    pub fn apply_to(&self, pin: &mut PinRecord) {
        if let Some(edge) = self.edge {
            pin.edge = Some(edge);
        }
        if let Some(bank) = self.bank {
            pin.bank = Some(bank);
        }
        if let Some(group) = self.group {
            pin.group = Some(group);
        }
        if let Some(pair) = self.pair {
            pin.pair = Some(pair);
        }
        if let Some(differential) = self.differential {
            pin.differential = Some(differential);
        }

        let mut capabilities = Vec::with_capacity(self.capabilities.len());
        for capability in &self.capabilities {
            if !capabilities.contains(capability) {
                capabilities.push(*capability);
            }
        }
        pin.capabilities = Some(capabilities);
        pin.description = Some(self.description.clone());
    }
}

/// Bank assignment for one package edge: groups below `split_group` sit in
/// `lower_bank`, the rest in `upper_bank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeBanks {
    pub split_group: u32,
    pub lower_bank: u32,
    pub upper_bank: u32,
}

impl EdgeBanks {
    pub const fn new(split_group: u32, lower_bank: u32, upper_bank: u32) -> Self {
        Self {
            split_group,
            lower_bank,
            upper_bank,
        }
    }

    pub fn bank_for(&self, group: u32) -> u32 {
        if group < self.split_group {
            self.lower_bank
        } else {
            self.upper_bank
        }
    }
}

/// Edge I/O bank inference by PIO group number.
///
/// This is an approximation: real bank boundaries depend on the package, and
/// the defaults (left 6/7 and right 2/3 split at group 50, top 0/1 split at
/// group 60, bottom unassigned) are only known to hold for the CABGA256/381
/// ECP5 parts. Override per package through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankMap {
    pub left: Option<EdgeBanks>,
    pub right: Option<EdgeBanks>,
    pub top: Option<EdgeBanks>,
    pub bottom: Option<EdgeBanks>,
}

impl Default for BankMap {
    fn default() -> Self {
        Self {
            left: Some(EdgeBanks::new(50, 6, 7)),
            right: Some(EdgeBanks::new(50, 2, 3)),
            top: Some(EdgeBanks::new(60, 0, 1)),
            bottom: None,
        }
    }
}

impl BankMap {
    pub fn bank_for(&self, edge: Edge, group: u32) -> Option<u32> {
        let banks = match edge {
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        };
        banks.map(|b| b.bank_for(group))
    }
}
