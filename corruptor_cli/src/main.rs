use corruptor_core::config::CorruptorConfig;
use corruptor_core::job::{corrupt_file, rng_for};
use corruptor_core::method::MethodKind;
use corruptor_core::report::{ChangeReport, ReportWriter};
use corruptor_core::sampler::RandomSampler;
use corruptor_core::settings::{RawSettings, Settings, parse_number};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

const AFTER_HELP: &str = "\
Addresses are picked from START ... START + LENGTH - 1, where 0 is the first byte
of the file. No byte is corrupted more than once. Numeric arguments accept a 0x
prefix for hexadecimal.

Examples:
    Corrupt one byte anywhere, save as smb-corrupt1.nes:
        corruptor smb.nes
    Corrupt 4 bytes between 0x8000 and 0x8fff by XOR with 0x20:
        corruptor smb.nes -o corrupt.nes -c 4 -s 0x8000 -l 0x1000 -m xor -x 0x20";

/// Method names accepted on the command line, with the single-letter aliases
/// of the classic tool.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum CliMethod {
    /// Flip one random bit
    #[value(alias = "f")]
    Flip,
    /// Invert all bits
    #[value(alias = "v")]
    Invert,
    /// Add one (wrapping)
    #[value(alias = "i")]
    Increment,
    /// Subtract one (wrapping)
    #[value(alias = "d")]
    Decrement,
    /// Add or subtract one at random
    #[value(alias = "a")]
    Nudge,
    /// Any value except the original
    #[value(alias = "r")]
    Randomize,
    /// XOR with --xor-value
    #[value(alias = "x")]
    Xor,
}

impl From<CliMethod> for MethodKind {
    fn from(method: CliMethod) -> Self {
        match method {
            CliMethod::Flip => MethodKind::Flip,
            CliMethod::Invert => MethodKind::Invert,
            CliMethod::Increment => MethodKind::Increment,
            CliMethod::Decrement => MethodKind::Decrement,
            CliMethod::Nudge => MethodKind::Nudge,
            CliMethod::Randomize => MethodKind::Randomize,
            CliMethod::Xor => MethodKind::Xor,
        }
    }
}

/// Copies a file while corrupting randomly chosen bytes.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, after_help = AFTER_HELP)]
struct Cli {
    /// File to read
    source: PathBuf,
    /// File to write, or a directory to write the source's name into.
    /// Must not exist. Default: <source stem>-corrupt<N><ext>
    #[clap(short = 'o', long)]
    output_file: Option<PathBuf>,
    /// Number of bytes to corrupt (1 ... LENGTH) [default: 1]
    #[clap(short, long, value_parser = parse_number)]
    count: Option<u64>,
    /// First address that may be corrupted [default: 0]
    #[clap(short, long, value_parser = parse_number)]
    start: Option<u64>,
    /// Number of addresses that may be corrupted [default: rest of file]
    #[clap(short, long, value_parser = parse_number)]
    length: Option<u64>,
    /// Corruption method [default: flip]
    #[clap(short, long, value_enum, ignore_case = true)]
    method: Option<CliMethod>,
    /// Constant for the xor method (0x01 ... 0xff) [default: 0xff]
    #[clap(short = 'x', long, value_parser = parse_number)]
    xor_value: Option<u64>,
    /// Seed for a reproducible run
    #[clap(long, value_parser = parse_number)]
    seed: Option<u64>,
    /// Do not print the list of changed bytes
    #[clap(short, long)]
    quiet: bool,
    /// TOML file with default settings [default: ./corruptor.toml if present]
    #[clap(long, value_parser)]
    config_file: Option<PathBuf>,
}

impl Cli {
    fn into_raw_settings(self, config: &CorruptorConfig) -> RawSettings {
        let verbose = !self.quiet && config.run_defaults().verbose;
        config.apply_to(RawSettings {
            source: self.source,
            destination: self.output_file,
            start: self.start,
            length: self.length,
            count: self.count,
            method: self.method.map(MethodKind::from),
            xor_value: self.xor_value,
            chunk_size: None,
            seed: self.seed,
            verbose,
        })
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let working_dir = std::env::current_dir().context("Failed to read working directory")?;
    let config = CorruptorConfig::discover(cli.config_file.as_ref(), &working_dir)?;

    let settings = Settings::resolve(cli.into_raw_settings(&config))?;
    let mut rng = rng_for(settings.seed());
    let mut sampler = RandomSampler::new();

    let stdout = std::io::stdout();
    let mut report = ReportWriter::new(
        stdout.lock(),
        ChangeReport::for_file_size(settings.file_size()),
    );
    let verbose = settings.verbose();

    corrupt_file(&settings, &mut sampler, &mut rng, |record| {
        if verbose {
            report.record(&record);
        }
    })
    .with_context(|| format!("Failed to write {:?}", settings.destination()))?;

    let _stdout = report.finish()?;
    Ok(())
}
