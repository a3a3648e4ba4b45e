use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Suffix added to compressed files.
const EXTENSION: &str = "huff";

/// Compress or decompress a file with a static Huffman code.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// File to read
    #[clap()]
    input: PathBuf,

    /// File to write. Defaults to INPUT.huff, or INPUT without .huff when decompressing
    #[clap()]
    output: Option<PathBuf>,

    /// Compress the input (default)
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Decompress the input
    #[clap(short = 'd', long = "decompress", conflicts_with = "compress")]
    decompress: bool,

    /// Overwrite the output file if it exists
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Sets verbosity. -v shows progress, -vv is chatty
    #[clap(short = 'v', long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Only report errors
    #[clap(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Compress,
    Decompress,
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Args {
    fn mode(&self) -> Mode {
        if self.decompress {
            Mode::Decompress
        } else {
            Mode::Compress
        }
    }

    fn level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Warn,
            (false, 1) => LevelFilter::Info,
            (false, 2) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }

    fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        default_output(&self.input, self.mode())
    }
}

fn default_output(input: &Path, mode: Mode) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    match mode {
        Mode::Compress => {
            name.push(".");
            name.push(EXTENSION);
            name.into()
        }
        Mode::Decompress => {
            if input.extension().map_or(false, |ext| ext == EXTENSION) {
                input.with_extension("")
            } else {
                name.push(".out");
                name.into()
            }
        }
    }
}

/// Resolves the output path and runs the selected mode.
fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mode = args.mode();
    let output = args.output_path();
    if output.exists() && !args.force {
        return Err(format!(
            "{} already exists, use --force to overwrite it",
            output.display()
        )
        .into());
    }

    info!(
        "{}: {} -> {}",
        mode,
        args.input.display(),
        output.display()
    );
    match mode {
        Mode::Compress => {
            huffpack::compress_file(&args.input, &output)?;
        }
        Mode::Decompress => {
            huffpack::decompress_file(&args.input, &output)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Available log levels are Error, Warn, Info, Debug, Trace
    let _ = TermLogger::init(
        args.level(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    match run(&args) {
        Ok(()) => {
            info!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
