//! Downloads NEX-GDDP-CMIP6 grid subsets for a region, then converts them
//! into SWAT and SWAT+ weather input trees. The two phases always run in
//! sequence over one working directory.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nexswat::{
    convert_all, download_all, BoundsProvider, Config, HttpSource, NetcdfReader, ShapefileBounds,
};

#[derive(Parser, Debug)]
#[command(version, about = "NEX-GDDP-CMIP6 downloader and SWAT/SWAT+ converter")]
struct Args {
    /// Directory holding the region shapefile and an optional nexswat.json.
    /// All downloads and output trees are written here.
    #[arg(default_value = ".")]
    working_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = Config::load(&args.working_dir)?;

    let bounds = ShapefileBounds::new(&config.working_dir).region_bounds()?;
    log::info!(
        "fetching {} over {:.3}W..{:.3}E {:.3}S..{:.3}N",
        config.dataset.model,
        bounds.west,
        bounds.east,
        bounds.south,
        bounds.north
    );
    let summary = download_all(&config, bounds, HttpSource::new()?).await?;
    log::info!("download finished: {summary}");
    if summary.failed > 0 {
        log::warn!(
            "{} files failed; see {} before trusting the converted series",
            summary.failed,
            config.ledger_path().display()
        );
    }

    convert_all(&config, &NetcdfReader)?;
    log::info!(
        "wrote {} and {}",
        config.swat_dir().display(),
        config.swatplus_dir().display()
    );
    Ok(())
}
