//! Pinout Data Model
//!
//! Pin records, the fixed category/page vocabularies and the nested
//! `page → category → [pin]` document consumed by constraint generation.
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌──────────┐    ┌───────────┐
//! │ Netlist  │───▶│ Classifier │───▶│  Sorter  │───▶│ Assembler │
//! │  Parser  │    │ (category) │    │ (order)  │    │ (document)│
//! └──────────┘    └────────────┘    └──────────┘    └─────┬─────┘
//!                                                         │
//!                                                         ▼
//!                                                   ┌───────────┐
//!                                                   │  Decoder  │
//!                                                   └───────────┘
//! ```

pub mod assembler;
pub mod classifier;
pub mod sorter;

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::decoder::{BankMap, Capability, Differential, Edge, Pair};

pub use assembler::PinoutAssembler;
pub use classifier::PinClassifier;
pub use sorter::{sort_key, BallKey, SortKey};

/// Semantic pin category. Serialized by its display name, which downstream
/// constraint generation matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Power,
    Ground,
    #[serde(rename = "Flash/Config")]
    FlashConfig,
    #[serde(rename = "SDRAM")]
    Sdram,
    #[serde(rename = "JTAG")]
    Jtag,
    #[serde(rename = "USB/Serial")]
    UsbSerial,
    #[serde(rename = "Apple II Address")]
    AppleAddress,
    #[serde(rename = "Apple II Data")]
    AppleData,
    #[serde(rename = "Apple II Control")]
    AppleControl,
    #[serde(rename = "Apple II I/O")]
    AppleIo,
    Clock,
    #[serde(rename = "GPIO Breakout")]
    GpioBreakout,
    #[serde(rename = "GPIO Header")]
    GpioHeader,
    Unconnected,
    Other,
}

/// Category → page lookup. Categories missing here land on [`Page::Other`].
const CATEGORY_PAGES: &[(Category, Page)] = &[
    (Category::Power, Page::Power),
    (Category::Ground, Page::Power),
    (Category::FlashConfig, Page::Flash),
    (Category::Sdram, Page::Ram),
    (Category::Jtag, Page::Usb),
    (Category::UsbSerial, Page::Usb),
    (Category::AppleAddress, Page::Card),
    (Category::AppleData, Page::Card),
    (Category::AppleControl, Page::Card),
    (Category::AppleIo, Page::Card),
    (Category::Clock, Page::Card),
    (Category::GpioBreakout, Page::Gpio),
    (Category::Unconnected, Page::Unconnected),
    (Category::Other, Page::Other),
];

impl Category {
    pub const ALL: [Category; 15] = [
        Category::Power,
        Category::Ground,
        Category::FlashConfig,
        Category::Sdram,
        Category::Jtag,
        Category::UsbSerial,
        Category::AppleAddress,
        Category::AppleData,
        Category::AppleControl,
        Category::AppleIo,
        Category::Clock,
        Category::GpioBreakout,
        Category::GpioHeader,
        Category::Unconnected,
        Category::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Power => "Power",
            Category::Ground => "Ground",
            Category::FlashConfig => "Flash/Config",
            Category::Sdram => "SDRAM",
            Category::Jtag => "JTAG",
            Category::UsbSerial => "USB/Serial",
            Category::AppleAddress => "Apple II Address",
            Category::AppleData => "Apple II Data",
            Category::AppleControl => "Apple II Control",
            Category::AppleIo => "Apple II I/O",
            Category::Clock => "Clock",
            Category::GpioBreakout => "GPIO Breakout",
            Category::GpioHeader => "GPIO Header",
            Category::Unconnected => "Unconnected",
            Category::Other => "Other",
        }
    }

    /// The schematic page this category is documented on.
    pub fn page(self) -> Page {
        CATEGORY_PAGES
            .iter()
            .find(|(category, _)| *category == self)
            .map(|(_, page)| *page)
            .unwrap_or(Page::Other)
    }

    pub fn is_supply(self) -> bool {
        matches!(self, Category::Power | Category::Ground)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Schematic page, in document display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Power,
    Flash,
    Ram,
    Usb,
    Card,
    Gpio,
    Unconnected,
    Other,
}

impl Page {
    pub const ORDER: [Page; 8] = [
        Page::Power,
        Page::Flash,
        Page::Ram,
        Page::Usb,
        Page::Card,
        Page::Gpio,
        Page::Unconnected,
        Page::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Page::Power => "power",
            Page::Flash => "flash",
            Page::Ram => "ram",
            Page::Usb => "usb",
            Page::Card => "card",
            Page::Gpio => "gpio",
            Page::Unconnected => "unconnected",
            Page::Other => "other",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One FPGA pin and the net it is wired to.
///
/// `category` and `page` are annotations used while assembling and are not
/// serialized; the document structure already carries them. Decoded fields
/// are present only once the pin-function decoder has run, and any other
/// fields found in a document read from disk survive in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinRecord {
    pub ball: String,
    pub pin_function: String,
    pub net_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair: Option<Pair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<Capability>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    #[serde(skip)]
    pub category: Option<Category>,
    #[serde(skip)]
    pub page: Option<Page>,
}

impl PinRecord {
    pub fn new(
        ball: impl Into<String>,
        pin_function: impl Into<String>,
        net_name: impl Into<String>,
    ) -> Self {
        Self {
            ball: ball.into(),
            pin_function: pin_function.into(),
            net_name: net_name.into(),
            edge: None,
            bank: None,
            group: None,
            pair: None,
            differential: None,
            capabilities: None,
            description: None,
            extra: serde_json::Map::new(),
            category: None,
            page: None,
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities
            .as_ref()
            .is_some_and(|caps| caps.contains(&capability))
    }
}

/// A supply-free view of one pin for constraint emitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalPin<'a> {
    pub ball: &'a str,
    pub net_name: &'a str,
    pub category: Category,
}

type CategorySections = IndexMap<Category, Vec<PinRecord>>;

/// Ordered `page → category → [pin]` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinoutDocument {
    pages: IndexMap<Page, CategorySections>,
}

impl PinoutDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Append `pin` to the end of its page/category section, creating both
    /// on first use.
    pub fn push(&mut self, page: Page, category: Category, pin: PinRecord) {
        self.section_mut(page, category).push(pin);
    }

    pub(crate) fn section_mut(&mut self, page: Page, category: Category) -> &mut Vec<PinRecord> {
        self.pages
            .entry(page)
            .or_default()
            .entry(category)
            .or_default()
    }

    pub fn pages(&self) -> impl Iterator<Item = (Page, &CategorySections)> {
        self.pages.iter().map(|(page, sections)| (*page, sections))
    }

    pub fn page(&self, page: Page) -> Option<&CategorySections> {
        self.pages.get(&page)
    }

    pub fn section(&self, page: Page, category: Category) -> Option<&[PinRecord]> {
        self.pages.get(&page)?.get(&category).map(Vec::as_slice)
    }

    /// Every pin, in document order, with its page and category.
    pub fn pins(&self) -> impl Iterator<Item = (Page, Category, &PinRecord)> {
        self.pages.iter().flat_map(|(page, sections)| {
            sections.iter().flat_map(move |(category, pins)| {
                pins.iter().map(move |pin| (*page, *category, pin))
            })
        })
    }

    /// Restore each record's `category` and `page` from the section it sits
    /// in, as after reading a document from disk.
    pub fn annotate(&mut self) {
        for (page, sections) in self.pages.iter_mut() {
            for (category, pins) in sections.iter_mut() {
                for pin in pins {
                    pin.category = Some(*category);
                    pin.page = Some(*page);
                }
            }
        }
    }

    pub fn pins_mut(&mut self) -> impl Iterator<Item = &mut PinRecord> {
        self.pages
            .values_mut()
            .flat_map(|sections| sections.values_mut().flat_map(|pins| pins.iter_mut()))
    }

    pub fn pin_count(&self) -> usize {
        self.pages
            .values()
            .flat_map(|sections| sections.values())
            .map(Vec::len)
            .sum()
    }

    pub fn find_ball(&self, ball: &str) -> Option<&PinRecord> {
        self.pins().map(|(_, _, pin)| pin).find(|pin| pin.ball == ball)
    }

    /// Non-supply pins as `(ball, net, category)`, the view a constraint
    /// file generator locates and configures.
    pub fn signal_pins(&self) -> impl Iterator<Item = SignalPin<'_>> {
        self.pins()
            .filter(|(_, category, _)| !category.is_supply())
            .map(|(_, category, pin)| SignalPin {
                ball: &pin.ball,
                net_name: &pin.net_name,
                category,
            })
    }

    /// Pin counts per page and category, in document order.
    pub fn summary(&self) -> Vec<(Page, Category, usize)> {
        self.pages
            .iter()
            .flat_map(|(page, sections)| {
                sections
                    .iter()
                    .map(move |(category, pins)| (*page, *category, pins.len()))
            })
            .collect()
    }

    /// Decode every pin function and merge the result into its record.
    pub fn decode_pins(&mut self, banks: &BankMap) {
        for pin in self.pins_mut() {
            crate::decoder::decode(&pin.pin_function, banks).apply_to(pin);
        }
    }

    /// How many pins carry each capability tag.
    pub fn capability_counts(&self) -> BTreeMap<Capability, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, pin) in self.pins() {
            for capability in pin.capabilities.iter().flatten() {
                *counts.entry(*capability).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Capability tallies, most common first. Equal counts keep tag order.
    pub fn capability_ranking(&self) -> Vec<(Capability, usize)> {
        let mut ranking: Vec<_> = self.capability_counts().into_iter().collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1));
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_maps_to_one_page() {
        for category in Category::ALL {
            let pages: Vec<_> = Page::ORDER
                .iter()
                .filter(|page| category.page() == **page)
                .collect();
            assert_eq!(pages.len(), 1, "{} maps to {:?}", category, pages);
        }
        assert_eq!(Category::GpioHeader.page(), Page::Other);
        assert_eq!(Category::Clock.page(), Page::Card);
    }

    #[test]
    fn test_category_names_match_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.name()));
        }
    }

    #[test]
    fn test_document_serializes_in_insertion_order() {
        let mut doc = PinoutDocument::new();
        doc.push(Page::Card, Category::Clock, PinRecord::new("B3", "PL11C", "CLK_25MHz"));
        doc.push(Page::Power, Category::Ground, PinRecord::new("A1", "GND", "GND"));

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"card":{"Clock":[{"ball":"B3","pin_function":"PL11C","net_name":"CLK_25MHz"}]},"power":{"Ground":[{"ball":"A1","pin_function":"GND","net_name":"GND"}]}}"#
        );
    }

    #[test]
    fn test_unknown_record_fields_survive_round_trip() {
        let json = r#"{"gpio":{"GPIO Breakout":[{"ball":"C4","pin_function":"PT4A","net_name":"I_O_PIN_1","note":"keep me"}]}}"#;
        let doc: PinoutDocument = serde_json::from_str(json).unwrap();
        let pin = doc.find_ball("C4").unwrap();
        assert_eq!(pin.extra["note"], "keep me");
        assert_eq!(serde_json::to_string(&doc).unwrap(), json);
    }

    #[test]
    fn test_capability_ranking_most_common_first() {
        let mut doc = PinoutDocument::new();
        doc.push(Page::Power, Category::Ground, PinRecord::new("A1", "GND", "GND"));
        doc.push(Page::Card, Category::AppleAddress, PinRecord::new("C4", "PL12A", "A3_3V3"));
        doc.push(Page::Card, Category::AppleAddress, PinRecord::new("C5", "PL12C", "A0_3V3"));
        doc.decode_pins(&BankMap::default());

        let ranking = doc.capability_ranking();
        assert_eq!(
            ranking,
            [
                (Capability::Gpio, 2),
                (Capability::LvdsInput, 2),
                (Capability::Ground, 1),
                (Capability::LvdsOutput, 1),
            ]
        );
    }

    #[test]
    fn test_signal_pins_skip_supplies() {
        let mut doc = PinoutDocument::new();
        doc.push(Page::Power, Category::Power, PinRecord::new("F6", "VCC", "+1V1"));
        doc.push(Page::Card, Category::AppleData, PinRecord::new("K2", "PL20A", "D0_3V3"));

        let signals: Vec<_> = doc.signal_pins().collect();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].ball, "K2");
        assert_eq!(signals[0].category, Category::AppleData);
        assert_eq!(doc.pin_count(), 2);
    }
}
