//! Ordered mnemonic rule table.
//!
//! Each rule is a named pattern anchored at the start of the mnemonic plus a
//! builder. Rules are tried top to bottom; the first whose pattern matches
//! and whose builder accepts the captures wins. Anything left over is a
//! plain GPIO.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{BankMap, Capability, DecodedPinInfo, Differential, Edge, Pair};

use super::Capability::*;

type Builder = fn(&Captures, &BankMap) -> Option<DecodedPinInfo>;

struct DecodeRule {
    name: &'static str,
    pattern: Regex,
    build: Builder,
}

fn rule(name: &'static str, pattern: &str, build: Builder) -> DecodeRule {
    DecodeRule {
        name,
        pattern: Regex::new(pattern).expect("pin function pattern"),
        build,
    }
}

static RULES: LazyLock<Vec<DecodeRule>> = LazyLock::new(|| {
    vec![
        rule("core_power", r"^VCC$", core_power),
        rule("ground", r"^GND$", ground),
        rule("aux_power", r"^VCCAUX$", aux_power),
        rule("bank_power", r"^VCCio(\d+)", bank_power),
        rule("pll_power", r"^VCCA(\d+)", pll_power),
        rule("serdes_power", r"^VCC(?:HRX|HTX|AUXA)", serdes_power),
        rule("vref", r"^VREF1_(\d+)", vref),
        rule("lr_edge_io", r"^P([LR])(\d+)([A-D])", left_right_io),
        rule("tb_edge_io", r"^P([TB])(\d+)([AB])", top_bottom_io),
        rule("primary_clock", r"^PCLK([TC])(\d)_(\d)", primary_clock),
        rule("general_routing_clock", r"^GR_PCLK(\d)_(\d)", general_routing_clock),
        rule("pll_input", r"^GPLL(\d)([TC])_IN", pll_input),
        rule("config", &config_pattern(), config_pin),
        rule("serdes_lane", r"^HD(TX|RX)([PN])(\d)_D(\d)CH(\d)", serdes_lane),
        rule("serdes_refclk", r"^REFCLK([PN])_D(\d)", serdes_refclk),
    ]
});

/// Dedicated configuration and JTAG pins, matched exactly.
const CONFIG_PINS: &[(&str, &str, &[Capability])] = &[
    ("TMS", "Test Mode Select - JTAG state machine control", &[Jtag]),
    ("TCK", "Test Clock - JTAG clock input", &[Jtag]),
    ("TDI", "Test Data In - JTAG data input", &[Jtag]),
    ("TDO", "Test Data Out - JTAG data output", &[Jtag]),
    ("INITN", "Configuration ready indicator (active low, open drain)", &[Config]),
    ("PROGRAMN", "Configuration initiate (active low)", &[Config]),
    ("DONE", "Configuration complete indicator (open drain)", &[Config]),
    ("CCLK", "Configuration clock", &[Config]),
    ("CSSPIN", "SPI flash chip select", &[Config, Spi]),
    ("D0/MOSI", "SPI MOSI / Parallel config D0", &[Config, Spi, Gpio]),
    ("D1/MISO", "SPI MISO / Parallel config D1", &[Config, Spi, Gpio]),
    ("D2/WPn", "SPI Write Protect / Parallel config D2", &[Config, Spi, Gpio]),
    ("D3/HOLDn", "SPI Hold / Parallel config D3", &[Config, Spi, Gpio]),
    ("SN/CSn", "Chip select for parallel config", &[Config, Gpio]),
    ("CS1n", "Secondary chip select", &[Config, Gpio]),
    ("WRITEn", "Write enable for parallel config", &[Config, Gpio]),
    ("DOUT/CSOn", "Serial data out / SPI chip select out", &[Config, Gpio]),
    ("CFG_0", "Configuration mode bit 0", &[Config]),
    ("CFG_1", "Configuration mode bit 1", &[Config]),
    ("CFG_2", "Configuration mode bit 2", &[Config]),
];

fn config_pattern() -> String {
    let names: Vec<String> = CONFIG_PINS
        .iter()
        .map(|(name, _, _)| regex::escape(name))
        .collect();
    format!("^(?:{})$", names.join("|"))
}

/// Decode one pin-function mnemonic.
pub fn decode(pin_function: &str, banks: &BankMap) -> DecodedPinInfo {
    for rule in RULES.iter() {
        let Some(caps) = rule.pattern.captures(pin_function) else {
            continue;
        };
        if let Some(info) = (rule.build)(&caps, banks) {
            tracing::trace!(pin_function, rule = rule.name, "decoded pin function");
            return info;
        }
    }

    tracing::debug!(pin_function, "no decode rule matched, treating as gpio");
    DecodedPinInfo::new(&[Gpio], format!("Pin function: {pin_function}"))
}

/// Rule names in evaluation order.
pub fn rule_names() -> Vec<&'static str> {
    RULES.iter().map(|r| r.name).collect()
}

fn number(caps: &Captures, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}

fn polarity(flag: &str) -> &'static str {
    if flag == "T" {
        "true"
    } else {
        "complement"
    }
}

fn signal_polarity(flag: &str) -> &'static str {
    if flag == "P" {
        "positive"
    } else {
        "negative"
    }
}

fn core_power(_: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    Some(DecodedPinInfo::new(&[Power], "Core power supply (1.1V)"))
}

fn ground(_: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    Some(DecodedPinInfo::new(&[Ground], "Ground"))
}

fn aux_power(_: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    Some(DecodedPinInfo::new(
        &[Power],
        "Auxiliary power for differential/referenced inputs (2.5V)",
    ))
}

fn bank_power(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    let bank = number(caps, 1)?;
    Some(
        DecodedPinInfo::new(&[Power], format!("I/O bank {bank} power supply"))
            .with_bank(Some(bank)),
    )
}

fn pll_power(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    Some(DecodedPinInfo::new(
        &[Power],
        format!("PLL {} analog power (1.1V)", &caps[1]),
    ))
}

fn serdes_power(_: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    Some(DecodedPinInfo::new(&[Power, Serdes], "SERDES power supply"))
}

fn vref(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    let bank = number(caps, 1)?;
    Some(
        DecodedPinInfo::new(&[Vref, Gpio], format!("Reference voltage input for bank {bank}"))
            .with_bank(Some(bank)),
    )
}

/// Left/right PIOs: A/B form a true LVDS pair, C/D are LVDS input only.
fn left_right_io(caps: &Captures, banks: &BankMap) -> Option<DecodedPinInfo> {
    let edge = if &caps[1] == "L" { Edge::Left } else { Edge::Right };
    let group = number(caps, 2)?;
    let pio = &caps[3];
    let true_lvds = matches!(pio, "A" | "B");

    let mut info = if true_lvds {
        DecodedPinInfo::new(&[Gpio, LvdsInput, LvdsOutput], "")
            .with_differential(Differential::TrueLvds)
    } else {
        DecodedPinInfo::new(&[Gpio, LvdsInput], "").with_differential(Differential::LvdsInput)
    };
    info.edge = Some(edge);
    info.group = Some(group);
    info.pair = Some(if true_lvds { Pair::AB } else { Pair::CD });
    info.bank = banks.bank_for(edge, group);
    info.description = format!("{} edge PIO group {group}{pio}", edge.title());
    Some(info)
}

/// Top/bottom PIOs only support emulated differential outputs.
fn top_bottom_io(caps: &Captures, banks: &BankMap) -> Option<DecodedPinInfo> {
    let edge = if &caps[1] == "T" { Edge::Top } else { Edge::Bottom };
    let group = number(caps, 2)?;

    let mut info = DecodedPinInfo::new(&[Gpio, EmulatedLvdsOutput], "")
        .with_differential(Differential::Emulated);
    info.edge = Some(edge);
    info.group = Some(group);
    info.pair = Some(Pair::AB);
    info.bank = banks.bank_for(edge, group);
    info.description = format!("{} edge PIO group {group}{}", edge.title(), &caps[3]);
    Some(info)
}

fn primary_clock(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    let bank = number(caps, 2)?;
    let clock = number(caps, 3)?;
    Some(
        DecodedPinInfo::new(
            &[Gpio, PrimaryClock, PllInput],
            format!(
                "Primary clock {clock} ({}) for bank {bank}",
                polarity(&caps[1])
            ),
        )
        .with_bank(Some(bank))
        .with_differential(Differential::ClockPair),
    )
}

fn general_routing_clock(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    let bank = number(caps, 1)?;
    let clock = number(caps, 2)?;
    Some(
        DecodedPinInfo::new(
            &[Gpio, GeneralRoutingClock],
            format!("General routing to primary clock {clock} for bank {bank}"),
        )
        .with_bank(Some(bank)),
    )
}

fn pll_input(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    Some(DecodedPinInfo::new(
        &[Gpio, PllInput],
        format!("General purpose PLL input ({})", polarity(&caps[2])),
    ))
}

fn config_pin(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    let name = &caps[0];
    CONFIG_PINS
        .iter()
        .find(|(pin, _, _)| *pin == name)
        .map(|(_, description, capabilities)| DecodedPinInfo::new(capabilities, *description))
}

fn serdes_lane(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    let direction = if &caps[1] == "TX" { "transmit" } else { "receive" };
    Some(DecodedPinInfo::new(
        &[Serdes],
        format!(
            "SERDES {direction} differential {}",
            signal_polarity(&caps[2])
        ),
    ))
}

fn serdes_refclk(caps: &Captures, _: &BankMap) -> Option<DecodedPinInfo> {
    Some(DecodedPinInfo::new(
        &[Serdes, ReferenceClock],
        format!("SERDES reference clock {}", signal_polarity(&caps[1])),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_default(pin_function: &str) -> DecodedPinInfo {
        decode(pin_function, &BankMap::default())
    }

    #[test]
    fn test_left_edge_true_lvds() {
        let info = decode_default("PL12A");
        assert_eq!(info.edge, Some(Edge::Left));
        assert_eq!(info.group, Some(12));
        assert_eq!(info.pair, Some(Pair::AB));
        assert_eq!(info.differential, Some(Differential::TrueLvds));
        assert_eq!(info.capabilities, vec![Gpio, LvdsInput, LvdsOutput]);
        assert_eq!(info.bank, Some(6));
        assert_eq!(info.description, "Left edge PIO group 12A");
    }

    #[test]
    fn test_right_edge_input_only_pair() {
        let info = decode_default("PR65D");
        assert_eq!(info.edge, Some(Edge::Right));
        assert_eq!(info.pair, Some(Pair::CD));
        assert_eq!(info.differential, Some(Differential::LvdsInput));
        assert_eq!(info.capabilities, vec![Gpio, LvdsInput]);
        assert_eq!(info.bank, Some(3));
    }

    #[test]
    fn test_top_and_bottom_edges() {
        let top = decode_default("PT62B");
        assert_eq!(top.edge, Some(Edge::Top));
        assert_eq!(top.bank, Some(1));
        assert_eq!(top.differential, Some(Differential::Emulated));
        assert_eq!(top.capabilities, vec![Gpio, EmulatedLvdsOutput]);
        assert_eq!(top.description, "Top edge PIO group 62B");

        let bottom = decode_default("PB4A");
        assert_eq!(bottom.edge, Some(Edge::Bottom));
        assert_eq!(bottom.bank, None);
    }

    #[test]
    fn test_supplies() {
        let bank = decode_default("VCCio2");
        assert_eq!(bank.bank, Some(2));
        assert_eq!(bank.description, "I/O bank 2 power supply");
        assert_eq!(bank.capabilities, vec![Power]);

        assert_eq!(decode_default("VCC").description, "Core power supply (1.1V)");
        assert_eq!(decode_default("GND").capabilities, vec![Ground]);
        assert_eq!(decode_default("VCCA0").description, "PLL 0 analog power (1.1V)");
        assert_eq!(decode_default("VCCAUX").capabilities, vec![Power]);
        assert_eq!(decode_default("VCCAUXA0").capabilities, vec![Power, Serdes]);
        assert_eq!(decode_default("VCCHRX_D1CH0").description, "SERDES power supply");

        let vref = decode_default("VREF1_3");
        assert_eq!(vref.bank, Some(3));
        assert_eq!(vref.capabilities, vec![Vref, Gpio]);
    }

    #[test]
    fn test_clock_pins() {
        let pclk = decode_default("PCLKT6_0");
        assert_eq!(pclk.bank, Some(6));
        assert_eq!(pclk.differential, Some(Differential::ClockPair));
        assert_eq!(pclk.description, "Primary clock 0 (true) for bank 6");

        let gr = decode_default("GR_PCLK3_1");
        assert_eq!(gr.bank, Some(3));
        assert_eq!(gr.capabilities, vec![Gpio, GeneralRoutingClock]);

        let pll = decode_default("GPLL0C_IN");
        assert_eq!(pll.description, "General purpose PLL input (complement)");
    }

    #[test]
    fn test_config_pins_are_exact() {
        let mosi = decode_default("D0/MOSI");
        assert_eq!(mosi.capabilities, vec![Config, Spi, Gpio]);
        assert_eq!(decode_default("TCK").capabilities, vec![Jtag]);
        assert_eq!(decode_default("DONE").description, "Configuration complete indicator (open drain)");
        assert_eq!(decode_default("DONEX").description, "Pin function: DONEX");
    }

    #[test]
    fn test_serdes() {
        assert_eq!(
            decode_default("HDTXP0_D0CH1").description,
            "SERDES transmit differential positive"
        );
        assert_eq!(
            decode_default("HDRXN0_D1CH0").description,
            "SERDES receive differential negative"
        );
        let refclk = decode_default("REFCLKN_D1");
        assert_eq!(refclk.capabilities, vec![Serdes, ReferenceClock]);
        assert_eq!(refclk.description, "SERDES reference clock negative");
    }

    #[test]
    fn test_fallback() {
        let info = decode_default("UNKNOWN_XYZ");
        assert_eq!(info.description, "Pin function: UNKNOWN_XYZ");
        assert_eq!(info.capabilities, vec![Gpio]);
        assert_eq!(info.edge, None);
    }

    #[test]
    fn test_partial_prefix_falls_through() {
        assert_eq!(decode_default("VCCioX").description, "Pin function: VCCioX");
        assert_eq!(decode_default("HDTX").capabilities, vec![Gpio]);
    }

    #[test]
    fn test_custom_bank_map() {
        let mut banks = BankMap::default();
        banks.bottom = Some(crate::decoder::EdgeBanks::new(30, 8, 4));
        assert_eq!(decode("PB4A", &banks).bank, Some(8));
        assert_eq!(decode("PB40B", &banks).bank, Some(4));
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names = rule_names();
        assert_eq!(names.first(), Some(&"core_power"));
        assert_eq!(names.last(), Some(&"serdes_refclk"));
        assert_eq!(names.len(), 15);
    }
}
