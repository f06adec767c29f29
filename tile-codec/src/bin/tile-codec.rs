use std::fs::File;
use std::io::{self, BufRead as _, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context as _, bail};
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tile_codec::{TileCoord, quadkey_to_tile, tile_id_to_tile};
use tile_codec_observability::{LogFormat, LogFormatOptions, LogLevel, Observability};
use tracing::{debug, error};

/// Defines the styles used for the CLI help output.
const HELP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Blue.on_default().bold())
    .usage(AnsiColor::Blue.on_default().bold())
    .literal(AnsiColor::White.on_default())
    .placeholder(AnsiColor::Green.on_default());

/// ASCII record separator, used by `--seq` (RFC 8142 style sequences)
const RECORD_SEPARATOR: char = '\x1e';

#[derive(Parser, PartialEq, Debug)]
#[command(
    version,
    name = "tile-codec",
    about = "Convert map tiles to and from quadkeys and PMTiles tile ids",
    after_help = "Use RUST_LOG environment variable or --log-level to control logging level, e.g. RUST_LOG=debug or RUST_LOG=tile_codec=debug.",
    styles = HELP_STYLES
)]
pub struct Args {
    /// Optional YAML config file with `seq`, `log_level` and `log_format` keys
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log directives, e.g. `debug` or `tile_codec=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// How log lines are formatted, also read from `TILE_CODEC_LOG_FORMAT`
    #[arg(long, global = true, value_enum, ignore_case = true)]
    log_format: Option<LogFormatOptions>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, PartialEq, Debug)]
enum Commands {
    /// Converts tiles to/from quadkeys.
    ///
    /// Inputs starting with `[` or `{` are tiles, anything else is a quadkey.
    ///
    /// Examples:
    ///
    ///   > echo "[486, 332, 10]" | tile-codec quadkey
    ///   0313102310
    ///   > tile-codec quadkey 0313102310
    ///   [486, 332, 10]
    #[command(name = "quadkey", visible_alias = "qk", verbatim_doc_comment)]
    Quadkey(ConvertArgs),
    /// Converts tiles to/from `PMTiles` tile ids.
    ///
    /// Inputs starting with `[` or `{` are tiles, anything else is a tile id.
    ///
    /// Examples:
    ///
    ///   > echo "[486, 332, 10]" | tile-codec pmtileid
    ///   506307
    ///   > tile-codec pmtileid 506307
    ///   [486, 332, 10]
    #[command(name = "pmtileid", visible_alias = "pmid", verbatim_doc_comment)]
    Pmtileid(ConvertArgs),
}

#[derive(Clone, Default, PartialEq, Debug, clap::Args)]
pub struct ConvertArgs {
    /// Values to convert. Read from stdin, one per line, if none are given.
    inputs: Vec<String>,
    /// Prefix every output line with an ASCII record separator
    #[arg(long)]
    seq: bool,
}

/// Settings read from the `--config` file.
///
/// `log_level` and `log_format` are read from the same file before the arguments are parsed,
/// any other key is ignored.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct FileConfig {
    seq: bool,
}

impl FileConfig {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Unable to open config file {}", path.display()))?;
        serde_yaml::from_reader(file)
            .with_context(|| format!("Unable to parse config file {}", path.display()))
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Encoding {
    Quadkey,
    TileId,
}

impl Encoding {
    /// Convert one input: tiles are encoded, anything else is decoded back into a tile.
    fn convert(self, input: &str) -> anyhow::Result<String> {
        let input = input.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'');
        if input.starts_with('[') || input.starts_with('{') {
            let tile = TileCoord::from_json(input)?;
            return Ok(match self {
                Self::Quadkey => tile.quadkey(),
                Self::TileId => tile.tile_id()?.to_string(),
            });
        }
        let tile = match self {
            Self::Quadkey => quadkey_to_tile(input)?,
            Self::TileId => {
                let id = input
                    .parse::<u64>()
                    .with_context(|| format!("Invalid tile id {input:?}"))?;
                tile_id_to_tile(id)?
            }
        };
        Ok(tile.json_arr())
    }
}

fn main() {
    let filter = LogLevel::from_argument("--log-level")
        .or_in_config_file("--config", "log_level")
        .or_env_var("RUST_LOG")
        .lossy_parse_to_filter_with_default("tile_codec=info");
    let log_format = LogFormat::from_argument("--log-format")
        .or_in_config_file("--config", "log_format")
        .or_env_var("TILE_CODEC_LOG_FORMAT")
        .or_default(LogFormatOptions::Compact);
    if let Err(err) = Observability::from((filter, log_format))
        .with_initialised_log_tracing()
        .and_then(Observability::set_global_subscriber)
    {
        eprintln!("Unable to initialize logging: {err}");
    }

    if let Err(err) = main_int(Args::parse()) {
        error!("{err:#}");
        exit(1);
    }
}

impl Args {
    /// Pick the encoding and its arguments, with `seq` also switched on by the config file.
    fn resolve(self) -> anyhow::Result<(Encoding, ConvertArgs)> {
        let config = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let (encoding, mut convert_args) = match self.command {
            Commands::Quadkey(convert_args) => (Encoding::Quadkey, convert_args),
            Commands::Pmtileid(convert_args) => (Encoding::TileId, convert_args),
        };
        convert_args.seq |= config.seq;
        Ok((encoding, convert_args))
    }
}

fn main_int(args: Args) -> anyhow::Result<()> {
    let (encoding, convert_args) = args.resolve()?;
    let mut out = BufWriter::new(io::stdout().lock());
    if convert_args.inputs.is_empty() {
        debug!("Reading {encoding:?} inputs from stdin");
        run(encoding, io::stdin().lock().lines(), convert_args.seq, &mut out)
    } else {
        let inputs = convert_args.inputs.into_iter().map(Ok::<_, io::Error>);
        run(encoding, inputs, convert_args.seq, &mut out)
    }
}

/// Convert every non-blank input and write one line per converted value.
///
/// Inputs that fail are logged and skipped; the error is returned once all inputs are done.
fn run(
    encoding: Encoding,
    inputs: impl IntoIterator<Item = io::Result<String>>,
    seq: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut failed = 0_usize;
    for input in inputs {
        let input = input.context("Unable to read input")?;
        if input.trim().is_empty() {
            continue;
        }
        match encoding.convert(&input) {
            Ok(output) => {
                if seq {
                    writeln!(out, "{RECORD_SEPARATOR}")?;
                }
                writeln!(out, "{output}")?;
            }
            Err(err) => {
                failed += 1;
                error!("Unable to convert {input:?}: {err:#}");
            }
        }
    }
    out.flush()?;

    if failed > 0 {
        bail!("{failed} input(s) could not be converted");
    }
    Ok(())
}
