use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ar_placement::AppConfig;

#[derive(Parser, Debug)]
#[command(about = "Load the layered AR config and report problems", version)]
struct Args {
    /// Layers in merge order; later files override earlier keys.
    #[arg(default_values = ["assets/config/ar.ron", "assets/config/ar.local.ron"])]
    layers: Vec<PathBuf>,
    /// Treat validation warnings as failures.
    #[arg(long)]
    strict: bool,
    /// Print the merged config.
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let first = args.layers.first().context("at least one config layer is required")?;
    if !first.exists() {
        bail!("base config {} not found", first.display());
    }
    let (cfg, used, errors) = AppConfig::load_layered(&args.layers);
    println!("layers used: {}", used.join(", "));
    for e in &errors {
        // Missing optional layers are expected; anything else is a load error.
        println!("load: {e}");
    }
    let warnings = cfg.validate();
    for w in &warnings {
        println!("warning: {w}");
    }
    if args.dump {
        println!("{cfg:#?}");
    }
    let load_failures = errors.iter().filter(|e| !e.contains("read error")).count();
    if load_failures > 0 {
        bail!("{load_failures} config layer(s) failed to parse");
    }
    if args.strict && !warnings.is_empty() {
        bail!("{} validation warning(s) in strict mode", warnings.len());
    }
    println!("config ok");
    Ok(())
}
