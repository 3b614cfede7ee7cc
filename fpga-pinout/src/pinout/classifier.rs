//! Pin Classification
//!
//! Assigns every pin a [`Category`] from its net name and pin function using
//! an ordered predicate table. Several predicates overlap (a clock net on the
//! address bus, a `+3V3` net on a data-named pin), so the table order is the
//! classification: the first predicate that matches wins.

use std::sync::LazyLock;

use regex::Regex;

use super::{Category, PinRecord};

static ADDRESS_BUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^a\d+_3v3").expect("address bus pattern"));
static BREAKOUT_PIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"i.*o_pin_\d+").expect("breakout pin pattern"));

const DATA_BUS_MARKERS: &[&str] = &["d0_", "d1_", "d2_", "d3_", "d4_", "d5_", "d6_", "d7_"];
const FLASH_MARKERS: &[&str] = &["flash", "miso", "mosi", "sck", "csspin"];
const JTAG_MARKERS: &[&str] = &["jtag", "tdi", "tdo", "tck", "tms"];
const BUS_CONTROL_MARKERS: &[&str] = &["dma", "irq", "nmi", "rdy", "res", "inh"];
const GPIO_HEADER_MARKERS: &[&str] = &["gp", "gn", "led", "sw", "audio", "wifi"];
const SLOT_CONTROL_MARKERS: &[&str] = &[
    "7m_",
    "q3_",
    "sync",
    "int_in",
    "int_out",
    "r{slash}~{w}",
    "device_select",
];

/// Names as seen by the predicates.
struct PinNames<'a> {
    net: &'a str,
    net_lower: String,
    function_lower: String,
}

impl PinNames<'_> {
    fn net_has_any(&self, markers: &[&str]) -> bool {
        markers.iter().any(|m| self.net_lower.contains(m))
    }
}

struct ClassRule {
    category: Category,
    matches: fn(&PinNames) -> bool,
}

/// Ordered classification table.
const RULES: &[ClassRule] = &[
    ClassRule { category: Category::Unconnected, matches: is_unconnected },
    ClassRule { category: Category::Power, matches: is_power },
    ClassRule { category: Category::Ground, matches: is_ground },
    ClassRule { category: Category::Sdram, matches: is_sdram },
    ClassRule { category: Category::FlashConfig, matches: is_flash },
    ClassRule { category: Category::Jtag, matches: is_jtag },
    ClassRule { category: Category::AppleData, matches: is_data_bus },
    ClassRule { category: Category::AppleAddress, matches: is_address_bus },
    ClassRule { category: Category::Clock, matches: is_clock },
    ClassRule { category: Category::AppleControl, matches: is_bus_control },
    ClassRule { category: Category::GpioBreakout, matches: is_breakout_pin },
    ClassRule { category: Category::AppleIo, matches: is_slot_io },
    ClassRule { category: Category::GpioHeader, matches: is_gpio_header },
    ClassRule { category: Category::UsbSerial, matches: is_usb_serial },
    ClassRule { category: Category::AppleControl, matches: is_slot_control },
];

fn is_unconnected(p: &PinNames) -> bool {
    p.net_lower.contains("unconnected")
}

fn is_power(p: &PinNames) -> bool {
    p.function_lower.contains("vcc") || p.net.contains('+')
}

fn is_ground(p: &PinNames) -> bool {
    p.net_lower.contains("gnd")
}

fn is_sdram(p: &PinNames) -> bool {
    p.net_lower.contains("sdram") || p.net.starts_with("RAM_")
}

fn is_flash(p: &PinNames) -> bool {
    p.net_has_any(FLASH_MARKERS)
}

fn is_jtag(p: &PinNames) -> bool {
    p.net_has_any(JTAG_MARKERS)
}

fn is_data_bus(p: &PinNames) -> bool {
    p.net_has_any(DATA_BUS_MARKERS)
}

fn is_address_bus(p: &PinNames) -> bool {
    ADDRESS_BUS.is_match(&p.net_lower)
}

fn is_clock(p: &PinNames) -> bool {
    p.net_lower.contains("clk") || p.net_lower.contains("phi")
}

fn is_bus_control(p: &PinNames) -> bool {
    p.net_has_any(BUS_CONTROL_MARKERS)
}

/// J1 breakout header, wired straight to the FPGA.
fn is_breakout_pin(p: &PinNames) -> bool {
    BREAKOUT_PIN.is_match(&p.net_lower)
}

/// Slot I/O select and strobe lines. KiCad escapes `/` in net names.
fn is_slot_io(p: &PinNames) -> bool {
    p.net_lower.contains("i{slash}o") || p.net_lower.contains("i/o")
}

fn is_gpio_header(p: &PinNames) -> bool {
    p.net_has_any(GPIO_HEADER_MARKERS)
}

fn is_usb_serial(p: &PinNames) -> bool {
    p.net_lower.contains("usb") || p.net_lower.contains("ftdi")
}

fn is_slot_control(p: &PinNames) -> bool {
    p.net_has_any(SLOT_CONTROL_MARKERS)
}

/// Rule-table classifier.
pub struct PinClassifier;

impl PinClassifier {
    /// Category for a net/pin-function pair. Total: unmatched pins are
    /// [`Category::Other`].
    pub fn classify(net_name: &str, pin_function: &str) -> Category {
        let names = PinNames {
            net: net_name,
            net_lower: net_name.to_lowercase(),
            function_lower: pin_function.to_lowercase(),
        };

        RULES
            .iter()
            .find(|rule| (rule.matches)(&names))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }

    /// Annotate a record with its category and page.
    pub fn classify_pin(pin: &mut PinRecord) -> Category {
        let category = Self::classify(&pin.net_name, &pin.pin_function);
        pin.category = Some(category);
        pin.page = Some(category.page());
        category
    }
}
