use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;

use intel_hex::convert_file;

mod logger;

/*
Usage:
  hex2bin arduplane.hex
  hex2bin arduplane.hex -o arduplane.bin --fill 0x00 --force

  NOTE: The output defaults to the input path with a .bin extension.

 */

#[derive(Debug, Parser)]
#[command(name = "hex2bin", about = "Converts an Intel HEX file into a flat binary image.")]
struct Args {
    /// Intel HEX file to convert.
    input: PathBuf,

    /// Binary file to write. Defaults to INPUT with a .bin extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Byte written to addresses no record covers, in hex (e.g. 0xFF or 00).
    #[arg(short, long, default_value = "0xFF", value_parser = parse_fill_byte)]
    fill: u8,

    /// Overwrite OUTPUT if it already exists.
    #[arg(long)]
    force: bool,

    /// Log every record as it is processed.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("ERROR: {e:#}");
        process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(logger::Logger {
        verbose: args.verbose,
    })
    .context("failed to install logger")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    if output == args.input {
        bail!("output path {} is the input file", output.display());
    }
    if output.exists() && !args.force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            output.display()
        );
    }

    info!("converting {} with fill byte {:#04x}", args.input.display(), args.fill);
    let image = convert_file(&args.input, args.fill)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    fs::write(&output, image.data())
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "wrote {} bytes covering {} to {}",
        image.len(),
        image.range(),
        output.display()
    );
    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("bin")
}

fn parse_fill_byte(arg: &str) -> Result<u8, String> {
    let digits = arg
        .strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .unwrap_or(arg);
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid fill byte '{arg}': {e}"))
}
