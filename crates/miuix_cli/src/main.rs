use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use miuix_layout::MiuixConfig;

mod sim;

#[derive(Parser)]
#[command(name = "miuix-sim")]
#[command(author, version, about = "Replay Miuix spring-back and app bar scenarios frame by frame")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Frame interval in milliseconds
    #[arg(long, global = true, default_value_t = 16)]
    frame_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Overscroll an edge by dragging, release, and print the spring-back
    Pull {
        /// Finger travel past the edge (px)
        #[arg(short, long, default_value_t = 300)]
        distance: i32,
        /// Which edge to pull
        #[arg(short, long, value_enum, default_value_t = Edge::Top)]
        edge: Edge,
        /// Hit the edge with a fling at this speed (px/s) instead of dragging
        #[arg(long)]
        fling: Option<f32>,
    },
    /// Release a half-collapsed app bar and print the snap
    Snap {
        /// Collapsible range of the app bar (px)
        #[arg(short, long, default_value_t = 300)]
        range: i32,
        /// Offset at release (px)
        #[arg(short, long, default_value_t = 120)]
        offset: i32,
        /// Last drag moved the content down (snap open)
        #[arg(long)]
        scroll_down: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum Edge {
    Top,
    Bottom,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MiuixConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => MiuixConfig::default(),
    };

    match cli.command {
        Commands::Pull {
            distance,
            edge,
            fling,
        } => {
            let edge = match edge {
                Edge::Top => sim::PullEdge::Top,
                Edge::Bottom => sim::PullEdge::Bottom,
            };
            let frames = match fling {
                Some(velocity) => sim::fling_into_edge(&config, edge, distance, velocity, cli.frame_ms)?,
                None => sim::pull_and_release(&config, edge, distance, cli.frame_ms)?,
            };
            println!("{:>6} {:>8} {:>8}  state", "t(ms)", "x", "y");
            for frame in &frames {
                println!(
                    "{:>6} {:>8} {:>8}  {:?}",
                    frame.time_ms, frame.x, frame.y, frame.state
                );
            }
        }
        Commands::Snap {
            range,
            offset,
            scroll_down,
        } => {
            let frames = sim::release_app_bar(&config, range, offset, scroll_down, cli.frame_ms)?;
            println!(
                "{:>6} {:>7} {:>9} {:>9} {:>9}",
                "t(ms)", "offset", "fraction", "large_a", "toolbar_a"
            );
            for frame in &frames {
                println!(
                    "{:>6} {:>7} {:>9.3} {:>9.3} {:>9.3}",
                    frame.time_ms,
                    frame.offset,
                    frame.values.collapse_fraction,
                    frame.values.large_title_alpha,
                    frame.values.toolbar_title_alpha
                );
            }
        }
        Commands::Config => {
            let text = config
                .to_toml_string()
                .context("Failed to serialize config")?;
            print!("{}", text);
        }
    }

    Ok(())
}
