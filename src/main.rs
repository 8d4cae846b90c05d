use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rucie::{EngineConfig, RasAddrEngine, RasParams, RasciStates, ReportConfig};

#[derive(Parser)]
#[command(name = "rucie")]
#[command(author, version, about = "Address and decode RAS configuration strings")]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Active-space definition, from a TOML file or from flags
#[derive(Args)]
struct EngineArgs {
    /// Engine configuration file (TOML)
    #[arg(long, global = true, conflicts_with_all = ["norb", "nelec"])]
    config: Option<PathBuf>,

    /// Number of active spin-orbitals
    #[arg(long, global = true)]
    norb: Option<usize>,

    /// Number of active electrons
    #[arg(long, global = true)]
    nelec: Option<usize>,

    /// Maximum holes in RAS1
    #[arg(long, global = true, default_value_t = 0)]
    max_hole: usize,

    /// Number of RAS1 orbitals
    #[arg(long, global = true, default_value_t = 0)]
    ras1: usize,

    /// Maximum particles in RAS3
    #[arg(long, global = true, default_value_t = 0)]
    max_elec: usize,

    /// Number of RAS3 orbitals
    #[arg(long, global = true, default_value_t = 0)]
    ras3: usize,
}

impl EngineArgs {
    fn build(&self) -> Result<RasAddrEngine> {
        if let Some(path) = &self.config {
            let cfg = EngineConfig::from_path(path)
                .with_context(|| format!("failed to load engine config {}", path.display()))?;
            return Ok(cfg.build_engine()?);
        }
        let (Some(n_orb), Some(n_elec)) = (self.norb, self.nelec) else {
            bail!("either --config or both --norb and --nelec are required");
        };
        let params = RasParams {
            n_orb,
            n_elec,
            max_hole: self.max_hole,
            n_ras1: self.ras1,
            max_elec: self.max_elec,
            n_ras3: self.ras3,
        };
        Ok(RasAddrEngine::new(params)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of configurations
    Count,

    /// Address occupation strings
    Address {
        /// Strings of '0'/'1', one symbol per spin-orbital
        #[arg(required = true)]
        configs: Vec<String>,
    },

    /// Decode addresses into occupation strings
    Decode {
        /// 1-based addresses
        #[arg(required = true)]
        addresses: Vec<u64>,

        /// Print RAS1, RAS2 and RAS3 separately
        #[arg(long)]
        split: bool,
    },

    /// Print the category table
    Categories,

    /// Report the leading configurations of a RASCI log
    Report {
        /// RASCI output log
        log: PathBuf,

        /// Minimum |C|^2 of a listed coefficient
        #[arg(long)]
        threshold: Option<f64>,

        /// Coefficients read per state
        #[arg(long)]
        max_coeffs: Option<usize>,

        /// Report options and orbital groups (TOML)
        #[arg(long)]
        groups: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Count => {
            let engine = cli.engine.build()?;
            println!("{}", engine.n_configs());
        }
        Commands::Address { configs } => {
            let engine = cli.engine.build()?;
            let addresses = engine.addressing_batch(&configs)?;
            for (config, addr) in configs.iter().zip(addresses) {
                println!("{} {}", config, addr);
            }
        }
        Commands::Decode { addresses, split } => {
            let engine = cli.engine.build()?;
            for addr in addresses {
                let parts = engine
                    .de_addressing(addr)
                    .with_context(|| format!("failed to decode address {}", addr))?;
                if split {
                    println!("{} {}", addr, parts.join(" "));
                } else {
                    println!("{} {}", addr, parts.concat());
                }
            }
        }
        Commands::Categories => {
            let engine = cli.engine.build()?;
            println!(
                "{:>5} {:>5} {:>5} {:>5} {:>12} {:>12}",
                "index", "holes", "part", "ras2", "size", "offset"
            );
            for c in engine.categories() {
                let ras2 = c.ras2_electrons.map_or("-".to_string(), |n| n.to_string());
                let offset = c.offset.map_or("-".to_string(), |o| o.to_string());
                println!(
                    "{:>5} {:>5} {:>5} {:>5} {:>12} {:>12}",
                    c.index, c.holes, c.particles, ras2, c.size, offset
                );
            }
            let levels = engine.gas_categories()?.excitation_levels();
            for (level, members) in levels.iter().enumerate() {
                println!("excitation level {}: {:?}", level, members);
            }
        }
        Commands::Report {
            log,
            threshold,
            max_coeffs,
            groups,
        } => {
            let mut cfg = match &groups {
                Some(path) => ReportConfig::from_path(path)
                    .with_context(|| format!("failed to load report config {}", path.display()))?,
                None => ReportConfig::default(),
            };
            if let Some(t) = threshold {
                cfg.threshold = t;
            }
            if let Some(n) = max_coeffs {
                cfg.max_coeffs = n;
            }
            let states = RasciStates::from_path(&log, cfg.max_coeffs)
                .with_context(|| format!("failed to read {}", log.display()))?;
            print!("{}", states.state_config_report(cfg.threshold, &cfg.groups)?);
        }
    }

    Ok(())
}
