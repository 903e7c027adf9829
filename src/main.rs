use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use syncdance::sync::{generate_bit_layer, generate_receive_layer};
use syncdance::tree::BranchPath;
use syncdance::{
    build, minimum_bits, BitWidth, ChannelAssignment, DecisionParameter, StateGraph, SyncConfig,
    ToDot,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "syncdance", about = "Binary decision trees for synced animation ids")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the number of channels needed for COUNT entries plus idle.
    Bits {
        /// Number of selectable entries.
        #[arg(allow_negative_numbers = true)]
        count: i64,
    },
    /// Show the channel pattern and tree path of an id.
    Encode {
        /// Number of selectable entries (sets the width).
        #[arg(long)]
        count: usize,
        /// Id to encode (0 = idle).
        id: u32,
    },
    /// Decode channel flags (most significant first, e.g. `101`) through the tree.
    Decode {
        /// Flags as a string of 0/1.
        flags: String,
    },
    /// List every leaf of the tree for COUNT entries.
    Table {
        /// Number of selectable entries.
        #[arg(long)]
        count: usize,
    },
    /// Render a generated layer as Graphviz dot.
    Dot {
        /// Generation settings (JSON).
        config: PathBuf,
        /// Layer to render.
        #[arg(long, value_enum, default_value_t = LayerArg::Receive)]
        layer: LayerArg,
        /// Write to a file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LayerArg {
    /// Bit converter layer (local encode + remote decode).
    Bits,
    /// Receive layer.
    Receive,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bits { count } => run_bits(count)?,
        Commands::Encode { count, id } => run_encode(count, id)?,
        Commands::Decode { flags } => run_decode(&flags)?,
        Commands::Table { count } => run_table(count)?,
        Commands::Dot {
            config,
            layer,
            output,
        } => run_dot(config, layer, output)?,
    }

    Ok(())
}

fn run_bits(count: i64) -> Result<()> {
    let bits = minimum_bits(count).context("cannot size encoding")?;
    let width = BitWidth::new(bits).context("encoding too wide")?;
    println!(
        "{count} entries\t{width}\t{} ids ({} unused)",
        width.capacity(),
        width.capacity() as i64 - count - 1
    );
    Ok(())
}

fn run_encode(count: usize, id: u32) -> Result<()> {
    let width = BitWidth::for_count(count).context("cannot size encoding")?;
    let channels = ChannelAssignment::from_id(id, width.get())
        .with_context(|| format!("id {id} out of range for {count} entries"))?;
    let path = BranchPath::for_id(id, width.get())?;

    println!("id={id}\tflags={channels}\tpath={path}");
    for (channel, flag) in channels.iter().enumerate() {
        println!("  bit[{channel}] = {}", u8::from(flag));
    }
    Ok(())
}

/// Parse `0`/`1` flags written most significant first
fn parse_flags(flags: &str) -> Result<ChannelAssignment> {
    let flags = flags.trim();
    if flags.is_empty() {
        bail!("no flags given");
    }
    // channel 0 is the last character
    let values = flags
        .chars()
        .rev()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(anyhow::anyhow!("invalid flag character '{other}'")),
        })
        .collect::<Result<Vec<_>>>()?;
    ChannelAssignment::from_flags(values).context("unsupported number of flags")
}

fn run_decode(flags: &str) -> Result<()> {
    let channels = parse_flags(flags)?;
    let width = channels.width();

    let names: Vec<String> = (0..width).map(|i| format!("bit{i}")).collect();
    let mut graph = StateGraph::new("Decode");
    let root = graph.root();
    let leaves = build(&mut graph, &root, DecisionParameter::bool_group(names, width)?)
        .context("failed to build decoder tree")?;

    let state = graph
        .resolve(&channels)
        .context("decoder tree selected no state")?;
    let leaf = leaves
        .iter()
        .find(|leaf| leaf.handle == state)
        .context("resolved state is not a tree leaf")?;

    println!(
        "flags={channels}\tid={}\tpath={}",
        leaf.param.id(),
        graph.path_to(state).join(" / ")
    );
    Ok(())
}

fn run_table(count: usize) -> Result<()> {
    let width = BitWidth::for_count(count).context("cannot size encoding")?;
    let mut graph = StateGraph::new("Table");
    let root = graph.root();
    let leaves = build(
        &mut graph,
        &root,
        DecisionParameter::int("id", width.get())?,
    )?;

    println!("id\tflags\tpath\tentry");
    for leaf in leaves {
        let id = leaf.param.id();
        let entry = match id as usize {
            0 => "idle".to_string(),
            n if n <= count => format!("#{n}"),
            _ => "unused".to_string(),
        };
        println!(
            "{id}\t{}\t{}\t{entry}",
            leaf.param.bits(),
            BranchPath::for_id(id, width.get())?
        );
    }
    Ok(())
}

fn run_dot(config_path: PathBuf, layer: LayerArg, output: Option<PathBuf>) -> Result<()> {
    let config = SyncConfig::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    let graph = match layer {
        LayerArg::Bits => generate_bit_layer(&config)?.graph,
        LayerArg::Receive => generate_receive_layer(&config)?.graph,
    };

    match output {
        Some(path) => graph
            .dot_to_file(&path)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => graph.dot_to_stdout()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_msb_first() {
        let channels = parse_flags(" 110\n").unwrap();
        assert_eq!(channels.width(), 3);
        assert_eq!(channels.id(), 6);
        assert!(!channels.flag(0));
        assert!(channels.flag(2));
    }

    #[test]
    fn test_parse_flags_rejects_bad_input() {
        assert!(parse_flags("").is_err());
        assert!(parse_flags("   ").is_err());
        let err = parse_flags("10x1").unwrap_err();
        assert!(err.to_string().contains("'x'"));
        assert!(parse_flags(&"1".repeat(40)).is_err());
    }

    #[test]
    fn test_decode_and_encode_commands() {
        run_decode("101").unwrap();
        run_encode(5, 5).unwrap();
        assert!(run_encode(5, 8).is_err());
        run_table(5).unwrap();
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["syncdance", "decode", "011"]).unwrap();
        assert!(matches!(cli.command, Commands::Decode { ref flags } if flags == "011"));
        let cli = Cli::try_parse_from(["syncdance", "bits", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Bits { count: -1 }));
        assert!(Cli::try_parse_from(["syncdance", "encode", "3"]).is_err());
    }
}
