//! Extract an FPGA pinout from a KiCad netlist and print it by page.

use fpga_pinout::prelude::*;
use std::path::Path;

fn main() -> Result<(), PinoutError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/byte_hamr.net".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example extract_pinout [path/to/netlist.net]");
        std::process::exit(1);
    }

    let options = PinoutOptions::default();
    let mut document = PinoutCore::extract(path, &options)?;
    PinoutCore::augment(&mut document, &options);

    println!("Pinout for {} ({} pins)", options.target_ref, document.pin_count());
    for (page, sections) in document.pages() {
        println!();
        println!("[{}]", page);
        for (category, pins) in sections {
            println!("  {}:", category);
            for pin in pins {
                println!(
                    "    {:<5} {:<12} {}",
                    pin.ball,
                    pin.pin_function,
                    pin.description.as_deref().unwrap_or(&pin.net_name)
                );
            }
        }
    }

    Ok(())
}
