//! End-to-end tests for netlist extraction and augmentation

use fpga_pinout::prelude::*;
use fpga_pinout::{Capability, Differential, Edge, NetlistParser, Pair};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn extract_fixture() -> PinoutDocument {
    PinoutCore::extract(&fixture_path("byte_hamr.net"), &PinoutOptions::default())
        .expect("fixture netlist should extract")
}

fn nets(document: &PinoutDocument, page: Page, category: Category) -> Vec<String> {
    document
        .section(page, category)
        .unwrap_or_default()
        .iter()
        .map(|pin| pin.net_name.clone())
        .collect()
}

#[test]
fn test_one_record_per_target_node() {
    let text = std::fs::read_to_string(fixture_path("byte_hamr.net")).unwrap();
    let pins = NetlistParser::parse(&text, "U1").unwrap();
    let document = extract_fixture();

    // 24 U1 nodes in the fixture, one of them without a pinfunction
    assert_eq!(pins.len(), 23);
    assert_eq!(document.pin_count(), pins.len());
    assert!(document.find_ball("99").is_none(), "node without pinfunction is skipped");
}

#[test]
fn test_pages_in_display_order() {
    let document = extract_fixture();
    let pages: Vec<_> = document.pages().map(|(page, _)| page).collect();
    assert_eq!(
        pages,
        [
            Page::Power,
            Page::Flash,
            Page::Ram,
            Page::Usb,
            Page::Card,
            Page::Gpio,
            Page::Unconnected,
            Page::Other,
        ]
    );
}

#[test]
fn test_supply_rails_ordered_by_voltage_then_rail() {
    let document = extract_fixture();
    let balls: Vec<_> = document
        .section(Page::Power, Category::Power)
        .unwrap()
        .iter()
        .map(|pin| pin.ball.as_str())
        .collect();
    assert_eq!(balls, ["H9", "L9", "K8", "F6", "G6"]);

    let grounds: Vec<_> = document
        .section(Page::Power, Category::Ground)
        .unwrap()
        .iter()
        .map(|pin| pin.ball.as_str())
        .collect();
    assert_eq!(grounds, ["A1", "T16"]);
}

#[test]
fn test_card_page_categories_and_order() {
    let document = extract_fixture();
    let card = document.page(Page::Card).unwrap();
    let categories: Vec<_> = card.keys().copied().collect();
    assert_eq!(
        categories,
        [
            Category::AppleAddress,
            Category::AppleData,
            Category::Clock,
            Category::AppleControl,
        ]
    );
    assert_eq!(nets(&document, Page::Card, Category::AppleAddress), ["A0_3V3", "A3_3V3"]);
    assert_eq!(nets(&document, Page::Card, Category::Clock), ["CLK_25MHz", "PHI0_3V3"]);
}

#[test]
fn test_bus_tables() {
    let document = extract_fixture();
    assert_eq!(
        nets(&document, Page::Ram, Category::Sdram),
        ["/ram/SDRAM_CLK", "/ram/SDRAM_A4"]
    );
    assert_eq!(
        nets(&document, Page::Flash, Category::FlashConfig),
        ["/flash/FLASH_SCK", "/flash/FLASH_MOSI"]
    );
    assert_eq!(nets(&document, Page::Gpio, Category::GpioBreakout), ["I{slash}O_PIN_12"]);
    assert_eq!(
        nets(&document, Page::Other, Category::GpioHeader),
        ["LED1"]
    );
}

#[test]
fn test_signal_pins_skip_supplies() {
    let document = extract_fixture();
    let signals: Vec<_> = document.signal_pins().collect();
    assert_eq!(signals.len(), 23 - 7);
    assert!(signals.iter().all(|pin| !pin.category.is_supply()));

    let address = signals.iter().find(|pin| pin.ball == "C4").unwrap();
    assert_eq!(address.net_name, "A3_3V3");
    assert_eq!(address.category.name(), "Apple II Address");
}

#[test]
fn test_augment_decodes_every_pin() {
    let mut document = extract_fixture();
    PinoutCore::augment(&mut document, &PinoutOptions::default());

    for (_, _, pin) in document.pins() {
        assert!(pin.description.is_some(), "{} has no description", pin.ball);
        assert!(pin.capabilities.is_some());
    }

    let c4 = document.find_ball("C4").unwrap();
    assert_eq!(c4.edge, Some(Edge::Left));
    assert_eq!(c4.group, Some(12));
    assert_eq!(c4.pair, Some(Pair::AB));
    assert_eq!(c4.differential, Some(Differential::TrueLvds));
    assert_eq!(
        c4.capabilities.as_deref(),
        Some(&[Capability::Gpio, Capability::LvdsInput, Capability::LvdsOutput][..])
    );

    let f6 = document.find_ball("F6").unwrap();
    assert_eq!(f6.bank, Some(2));
    assert_eq!(f6.description.as_deref(), Some("I/O bank 2 power supply"));

    let counts = document.capability_counts();
    assert_eq!(counts[&Capability::Ground], 2);
    assert_eq!(counts[&Capability::Jtag], 1);
}

#[test]
fn test_augment_twice_is_stable() {
    let options = PinoutOptions::default();
    let mut document = extract_fixture();
    PinoutCore::augment(&mut document, &options);
    let once = PinoutCore::to_json(&document).unwrap();
    PinoutCore::augment(&mut document, &options);
    assert_eq!(PinoutCore::to_json(&document).unwrap(), once);
}

#[test]
fn test_runs_are_byte_identical() {
    let first = PinoutCore::to_json(&extract_fixture()).unwrap();
    let second = PinoutCore::to_json(&extract_fixture()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_write_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pinout.json");

    let mut document = extract_fixture();
    PinoutCore::augment(&mut document, &PinoutOptions::default());
    PinoutCore::write_document(&document, &out).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("{\n  \"power\": {\n    \"Power\": ["));
    assert_eq!(PinoutCore::read_document(&out).unwrap(), document);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1, "temporary file should be renamed away");
}

#[test]
fn test_missing_nets_section_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("pinout.json");

    let result = PinoutCore::extract(&fixture_path("no_nets.net"), &PinoutOptions::default())
        .and_then(|document| PinoutCore::write_document(&document, &out));

    assert!(matches!(result, Err(PinoutError::MissingNetsSection)));
    assert!(!out.exists());
}

#[test]
fn test_unknown_target_has_no_pins() {
    let options = PinoutOptions {
        target_ref: "U9".to_string(),
        ..PinoutOptions::default()
    };
    let err = PinoutCore::extract(&fixture_path("byte_hamr.net"), &options).unwrap_err();
    assert!(matches!(err, PinoutError::NoPins { ref target } if target == "U9"));
}

#[test]
fn test_options_file_overrides_bank_map() {
    let options = PinoutOptions::from_file(&fixture_path("bank_map.json")).unwrap();
    let mut document = extract_fixture();
    PinoutCore::augment(&mut document, &options);

    // D5_3V3 sits on PB6A, bottom edge group 6
    assert_eq!(document.find_ball("P2").unwrap().bank, Some(8));
    assert_eq!(document.find_ball("C4").unwrap().bank, Some(6));
}

#[test]
fn test_bad_options_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    std::fs::write(&path, "{ \"target_ref\": 7 }").unwrap();
    let err = PinoutOptions::from_file(&path).unwrap_err();
    assert!(matches!(err, PinoutError::Config(_)));
}
