//! Signal Ordering
//!
//! Computes a composite sort key per pin so that each category lists its
//! pins in a stable, meaningful order: supplies by voltage then rail type,
//! buses by bit index, fixed protocols in their canonical order, and
//! everything else by name.
//!
//! Every key ends with the net name and the ball, so two distinct pins of one
//! component never compare equal.

use std::sync::LazyLock;

use regex::Regex;

use super::{Category, PinRecord};

static BALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)(\d+)").expect("ball pattern"));
static SUPPLY_VOLTAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?(?P<int>\d+)(?:V(?P<frac>\d*)|\.(?P<dec>\d+)V)").expect("voltage pattern")
});
static BANK_SUPPLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"VCCio(\d+)").expect("bank supply pattern"));
static ADDRESS_BIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^A(\d+)_3V3").expect("address bit pattern"));
static DATA_BIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^D(\d+)_3V3").expect("data bit pattern"));
static BREAKOUT_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"I.*O_PIN_(\d+)").expect("breakout index pattern"));
static SDRAM_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^A(\d+)").expect("sdram address pattern"));
static SDRAM_DATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^D(\d+)").expect("sdram data pattern"));

const SDRAM_CONTROL_ORDER: &[&str] = &[
    "CLK", "CKE", "nCS", "nRAS", "nCAS", "nWE", "DQM0", "DQM1", "BA0", "BA1",
];

const FLASH_ORDER: &[&str] = &[
    "/flash/FLASH_nCS",
    "/flash/FLASH_SCK",
    "/flash/FLASH_MOSI",
    "/flash/FLASH_MISO",
    "/flash/FLASH_nWP",
    "/flash/FLASH_nHOLD",
    "/flash/FPGA_PROGRAMN",
    "/flash/FPGA_INITN",
    "/flash/FPGA_DONE",
];

const JTAG_ORDER: &[&str] = &["TCK", "TMS", "TDI", "TDO"];

const CLOCK_ORDER: &[&str] = &["CLK_25MHz", "PHI0_3V3", "PHI1_3V3"];

/// Slot control prefixes, matched as case-insensitive substrings in order
/// against the net name with KiCad escapes (`{slash}`, `~{W}`) undone.
const CONTROL_GROUPS: &[(&str, u32)] = &[
    ("PHI0", 0),
    ("PHI1", 1),
    ("7M", 2),
    ("Q3", 3),
    ("Sync", 4),
    ("R/~W", 10),
    ("RDY", 11),
    ("IRQ", 20),
    ("NMI", 21),
    ("RES", 22),
    ("DMA", 30),
    ("INH", 31),
    ("DEVICE_SELECT", 40),
    ("I/O_SELECT", 41),
    ("I/O_STROBE", 42),
    ("INT_IN", 50),
    ("INT_OUT", 51),
];

const FALLBACK_CLASS: u32 = 99;
const UNKNOWN_VOLTAGE: u32 = u32::MAX;
const UNKNOWN_RAIL: u32 = 99;

/// Package location split into row letters and column number. Rows compare
/// lexically and columns numerically, so `B2` sorts before `B10` and `AA1`
/// before `B1`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BallKey {
    pub row: String,
    pub column: u32,
}

impl BallKey {
    pub fn parse(ball: &str) -> Self {
        BALL.captures(ball)
            .and_then(|caps| {
                Some(BallKey {
                    row: caps[1].to_string(),
                    column: caps[2].parse().ok()?,
                })
            })
            .unwrap_or_else(|| BallKey {
                row: ball.to_string(),
                column: 0,
            })
    }
}

/// Ordering key within one category.
///
/// `location` is only set for supply pins, whose tertiary key is the package
/// location; other pins fall through to net name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub class: u32,
    pub rank: u32,
    pub location: Option<BallKey>,
    pub net_name: String,
    pub ball: BallKey,
}

impl SortKey {
    fn new(pin: &PinRecord, class: u32, rank: u32, location: Option<BallKey>) -> Self {
        Self {
            class,
            rank,
            location,
            net_name: pin.net_name.clone(),
            ball: BallKey::parse(&pin.ball),
        }
    }
}

type SignalPolicy = fn(&PinRecord) -> Option<(u32, u32)>;

/// Ordered `(class, rank)` policies for non-supply pins.
const SIGNAL_POLICIES: &[(&str, SignalPolicy)] = &[
    ("address bus", address_bus),
    ("data bus", data_bus),
    ("breakout header", breakout_header),
    ("sdram", sdram),
    ("flash/config", flash_config),
    ("jtag", jtag),
    ("clock", clock),
    ("control group", control_group),
];

/// Sort key for `pin` within `category`.
pub fn sort_key(pin: &PinRecord, category: Category) -> SortKey {
    if category.is_supply() {
        return supply_key(pin);
    }

    for (name, policy) in SIGNAL_POLICIES {
        if let Some((class, rank)) = policy(pin) {
            tracing::trace!(net = %pin.net_name, policy = name, class, rank, "sort key");
            return SortKey::new(pin, class, rank, None);
        }
    }

    SortKey::new(pin, FALLBACK_CLASS, 0, None)
}

fn supply_key(pin: &PinRecord) -> SortKey {
    let location = Some(BallKey::parse(&pin.ball));
    if pin.net_name.contains("GND") {
        return SortKey::new(pin, 0, 0, location);
    }
    SortKey::new(
        pin,
        supply_millivolts(&pin.net_name).unwrap_or(UNKNOWN_VOLTAGE),
        rail_rank(&pin.pin_function),
        location,
    )
}

/// Nominal voltage of a supply net (`+1V1`, `+3V3`, `2.5V`, `/power/+5V`).
fn supply_millivolts(net_name: &str) -> Option<u32> {
    let leaf = net_name.rsplit('/').next().unwrap_or(net_name);
    let caps = SUPPLY_VOLTAGE.captures(leaf)?;
    let volts: u32 = caps["int"].parse().ok()?;
    let fraction = caps
        .name("frac")
        .or_else(|| caps.name("dec"))
        .map(|m| m.as_str())
        .unwrap_or("");
    let millis = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(3)
        .collect::<String>()
        .parse::<u32>()
        .ok()?;
    volts.checked_mul(1000)?.checked_add(millis).filter(|mv| *mv > 0)
}

/// Core < PLL analog < auxiliary < per-bank I/O (banks ascending).
fn rail_rank(pin_function: &str) -> u32 {
    if pin_function == "VCC" {
        0
    } else if pin_function.contains("VCCAUX") {
        2
    } else if pin_function.contains("VCCA") {
        1
    } else if pin_function.contains("VCCio") {
        let bank = BANK_SUPPLY
            .captures(pin_function)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .unwrap_or(0);
        3u32.saturating_add(bank)
    } else {
        UNKNOWN_RAIL
    }
}

fn captured_index(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?[1].parse().ok()
}

fn address_bus(pin: &PinRecord) -> Option<(u32, u32)> {
    captured_index(&ADDRESS_BIT, &pin.net_name).map(|bit| (0, bit))
}

fn data_bus(pin: &PinRecord) -> Option<(u32, u32)> {
    captured_index(&DATA_BIT, &pin.net_name).map(|bit| (0, bit))
}

fn breakout_header(pin: &PinRecord) -> Option<(u32, u32)> {
    captured_index(&BREAKOUT_INDEX, &pin.net_name).map(|index| (0, index))
}

/// Control lines, then address bits, then data bits.
fn sdram(pin: &PinRecord) -> Option<(u32, u32)> {
    if !pin.net_name.contains("SDRAM") {
        return None;
    }
    let leaf = pin.net_name.rsplit('/').next().unwrap_or(&pin.net_name);
    let signal = leaf.replace("SDRAM_", "");
    if let Some(rank) = table_position(SDRAM_CONTROL_ORDER, &signal) {
        return Some((0, rank));
    }
    if let Some(bit) = captured_index(&SDRAM_ADDRESS, &signal) {
        return Some((1, bit));
    }
    if let Some(bit) = captured_index(&SDRAM_DATA, &signal) {
        return Some((2, bit));
    }
    Some((3, 0))
}

fn flash_config(pin: &PinRecord) -> Option<(u32, u32)> {
    table_position(FLASH_ORDER, &pin.net_name).map(|rank| (0, rank))
}

fn jtag(pin: &PinRecord) -> Option<(u32, u32)> {
    table_position(JTAG_ORDER, &pin.pin_function).map(|rank| (0, rank))
}

fn clock(pin: &PinRecord) -> Option<(u32, u32)> {
    table_position(CLOCK_ORDER, &pin.net_name).map(|rank| (0, rank))
}

fn control_group(pin: &PinRecord) -> Option<(u32, u32)> {
    let net = pin
        .net_name
        .replace("{slash}", "/")
        .replace(['{', '}'], "")
        .to_lowercase();
    CONTROL_GROUPS
        .iter()
        .find(|(prefix, _)| net.contains(&prefix.to_lowercase()))
        .map(|(_, rank)| (0, *rank))
}

fn table_position(table: &[&str], name: &str) -> Option<u32> {
    table
        .iter()
        .position(|entry| *entry == name)
        .and_then(|i| u32::try_from(i).ok())
}
