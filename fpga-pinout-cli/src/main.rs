//! fpga-pinout CLI - annotated FPGA pinouts from KiCad netlists.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use fpga_pinout::decoder::rule_names;
use fpga_pinout::{decode, PinoutCore, PinoutDocument, PinoutError, PinoutOptions};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "fpga-pinout")]
#[command(about = "Extract and annotate FPGA pinouts from KiCad netlists", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the target component's pins from a netlist
    Extract {
        /// Path to a KiCad .net file
        #[arg(value_name = "NETLIST")]
        netlist: PathBuf,

        /// Write the pinout document here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Reference designator of the FPGA
        #[arg(long, value_name = "REF")]
        target: Option<String>,

        /// JSON options file (target_ref, bank_map)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Decode pin functions into bank/edge/capability metadata
        #[arg(long)]
        augment: bool,

        /// Run summary format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Decode pin functions into an existing pinout document
    Augment {
        /// Path to a pinout JSON document
        #[arg(value_name = "PINOUT")]
        pinout: PathBuf,

        /// Write here instead of updating PINOUT in place
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// JSON options file (target_ref, bank_map)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Run summary format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Decode pin-function mnemonics and print them as JSON
    Decode {
        /// Mnemonics such as PL12A, VCCio2 or PCLKT6_0
        #[arg(value_name = "MNEMONIC", required_unless_present = "rules")]
        mnemonics: Vec<String>,

        /// List the decode rules in evaluation order
        #[arg(long)]
        rules: bool,

        /// JSON options file (target_ref, bank_map)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Human,
    /// JSON summary
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            netlist,
            output,
            target,
            config,
            augment,
            format,
        } => handle_extract(&netlist, output.as_deref(), target, config.as_deref(), augment, format),
        Commands::Augment {
            pinout,
            output,
            config,
            format,
        } => handle_augment(&pinout, output.as_deref(), config.as_deref(), format),
        Commands::Decode {
            mnemonics,
            rules,
            config,
        } => {
            if rules {
                handle_rules();
                Ok(())
            } else {
                handle_decode(&mnemonics, config.as_deref())
            }
        }
    };

    let exit_code = match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_options(config: Option<&Path>) -> Result<PinoutOptions, PinoutError> {
    match config {
        Some(path) => PinoutOptions::from_file(path),
        None => Ok(PinoutOptions::default()),
    }
}

fn handle_extract(
    netlist: &Path,
    output: Option<&Path>,
    target: Option<String>,
    config: Option<&Path>,
    augment: bool,
    format: OutputFormat,
) -> Result<(), PinoutError> {
    let mut options = load_options(config)?;
    if let Some(target) = target {
        options.target_ref = target;
    }

    let mut document = PinoutCore::extract(netlist, &options)?;
    if augment {
        PinoutCore::augment(&mut document, &options);
    }

    match output {
        Some(path) => {
            PinoutCore::write_document(&document, path)?;
            output_summary(&document, path, format)
        }
        None => {
            print!("{}", PinoutCore::to_json(&document)?);
            Ok(())
        }
    }
}

fn handle_augment(
    pinout: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    format: OutputFormat,
) -> Result<(), PinoutError> {
    let options = load_options(config)?;
    let mut document = PinoutCore::read_document(pinout)?;
    PinoutCore::augment(&mut document, &options);

    let destination = output.unwrap_or(pinout);
    PinoutCore::write_document(&document, destination)?;
    output_summary(&document, destination, format)
}

fn handle_decode(mnemonics: &[String], config: Option<&Path>) -> Result<(), PinoutError> {
    let options = load_options(config)?;
    for mnemonic in mnemonics {
        let info = decode(mnemonic, &options.bank_map);
        let line = serde_json::json!({
            "pin_function": mnemonic,
            "decoded": info,
        });
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

fn handle_rules() {
    println!("Decode rules (first match wins):\n");
    for (index, name) in rule_names().into_iter().enumerate() {
        println!("  {:>2}. {}", index + 1, name);
    }
    println!("\n  Anything else decodes as a plain gpio pin.");
}

fn output_summary(
    document: &PinoutDocument,
    path: &Path,
    format: OutputFormat,
) -> Result<(), PinoutError> {
    match format {
        OutputFormat::Human => {
            output_human(document, path);
            Ok(())
        }
        OutputFormat::Json => output_json(document, path),
    }
}

fn output_human(document: &PinoutDocument, path: &Path) {
    println!("\nWrote: {}", path.display());
    println!("{}", "─".repeat(60));

    let mut current_page = None;
    for (page, category, count) in document.summary() {
        if current_page != Some(page) {
            println!("\n  {}:", page);
            current_page = Some(page);
        }
        println!("    {:<20} {:>4}", category.name(), count);
    }

    let capabilities = document.capability_ranking();
    if !capabilities.is_empty() {
        println!("\n  Capabilities:");
        for (capability, count) in &capabilities {
            println!("    {:<22} {:>4}", capability.as_str(), count);
        }
    }

    println!("\n  Total pins: {}", document.pin_count());
}

fn output_json(document: &PinoutDocument, path: &Path) -> Result<(), PinoutError> {
    let output = serde_json::json!({
        "output": path.display().to_string(),
        "pins": document.pin_count(),
        "sections": document.summary().into_iter().map(|(page, category, count)| {
            serde_json::json!({
                "page": page,
                "category": category,
                "pins": count,
            })
        }).collect::<Vec<_>>(),
        "capabilities": document.capability_ranking().into_iter().map(|(capability, count)| {
            serde_json::json!({
                "capability": capability,
                "pins": count,
            })
        }).collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
