use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;

use banner_forge::{BannerRenderer, BannerSettings, RenderOutcome, RendererConfig};

#[derive(Parser)]
#[command(name = "banner-forge", version, about = "Render banner settings to PNG")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a settings JSON file to a PNG
    Render {
        /// Settings JSON (camelCase keys); omitted fields take their defaults
        #[arg(long)]
        settings: PathBuf,
        /// Output PNG path
        #[arg(long)]
        output: PathBuf,
        /// Font/icon wait budget in milliseconds (0 waits forever)
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Use platform fonts only
        #[arg(long)]
        offline: bool,
        /// Font stylesheet service base URL
        #[arg(long)]
        font_service: Option<String>,
    },
    /// Print the default settings as JSON
    Defaults,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Defaults => {
            println!("{}", serde_json::to_string_pretty(&BannerSettings::default())?);
            Ok(())
        }
        Command::Render { settings, output, timeout_ms, offline, font_service } => {
            let json = std::fs::read_to_string(&settings)
                .with_context(|| format!("reading {}", settings.display()))?;
            let banner = BannerSettings::from_json(&json)
                .with_context(|| format!("parsing {}", settings.display()))?;

            let mut config = if offline { RendererConfig::offline() } else { RendererConfig::default() };
            if let Some(ms) = timeout_ms {
                config.resource_timeout_ms = ms;
            }
            if let Some(url) = font_service {
                config.font_service_url = url;
            }

            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            let shot = runtime.block_on(async {
                let renderer = BannerRenderer::new(config)?;
                match renderer.render(&banner).await? {
                    RenderOutcome::Committed { .. } => renderer.snapshot(),
                    RenderOutcome::Superseded { generation, latest } => Err(banner_forge::Error::Other(
                        format!("render #{generation} superseded by #{latest}"),
                    )),
                }
            })?;
            if shot.is_empty() {
                bail!("renderer produced no image");
            }

            std::fs::write(&output, &shot.png_data)
                .with_context(|| format!("writing {}", output.display()))?;
            info!("wrote {}x{} banner to {}", shot.width, shot.height, output.display());
            println!("{} ({}x{}, sha256 {})", output.display(), shot.width, shot.height, shot.digest());
            Ok(())
        }
    }
}
