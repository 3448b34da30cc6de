//! release-prep - CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_prep::Settings;
use release_prep::release;

/// Bump the version, regenerate the changelog, commit and tag.
///
/// Run from inside the repository. Settings come from the environment:
/// RELEASE_PREP_CHANGELOG, RELEASE_PREP_CLIFF_BIN, RELEASE_PREP_COMMENT_CHAR.
#[derive(Parser, Debug)]
#[command(name = "release-prep")]
#[command(about = "Prepare a release commit and annotated tag from conventional commits")]
#[command(version)]
struct Cli {}

fn main() -> Result<()> {
    // Usage errors exit 1 like every other failure; help and version exit 0.
    if let Err(err) = Cli::try_parse() {
        let code = if err.use_stderr() { 1 } else { 0 };
        let _ = err.print();
        std::process::exit(code);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("release_prep=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env();
    let cwd = std::env::current_dir().context("Could not determine the current directory")?;

    println!("Preparing release:");
    let prepared = release::run(&settings, &cwd)?;

    println!();
    println!("Release {} prepared.", prepared.version);
    println!(
        "Push it with: git push --follow-tags (or git push origin {})",
        prepared.version
    );

    Ok(())
}
