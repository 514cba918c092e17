//! Pitch Battle Server
//!
//! Axum server streaming battle snapshots over SSE, plus a CLI mode that
//! runs one battle in the terminal.

use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use pitch_battle_core::pitch::{find_preset, presets, PitchForm};
use pitch_battle_core::state::{self, BattleConfig};
use pitch_battle_core::swarm::{
    spawn_battle, BattleCoordinator, LlmCrewRuntime, Snapshot, SLOT_LABELS,
};

mod api;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5002;

#[derive(Parser, Clone)]
#[command(author, version, about = "Pitch Battle - two pitches, one jury")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the HTTP server (default)
    Serve {
        /// Interface to bind
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Run one battle in the terminal
    Run(RunArgs),
    /// List bundled presets
    Presets,
}

#[derive(clap::Args, Clone, Debug, Default)]
struct RunArgs {
    /// Start from a preset (key or label); explicit fields override it
    #[arg(long)]
    preset: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    industry: Option<String>,
    #[arg(long)]
    mission: Option<String>,
    #[arg(long)]
    product: Option<String>,
    #[arg(long)]
    target_market: Option<String>,
    #[arg(long)]
    funding_stage: Option<String>,
}

impl RunArgs {
    fn into_form(self) -> anyhow::Result<PitchForm> {
        let base = match &self.preset {
            Some(key) => {
                find_preset(key)
                    .ok_or_else(|| anyhow::anyhow!("Unknown preset: {}", key))?
                    .form
            }
            None => PitchForm::default(),
        };

        Ok(PitchForm {
            startup_name: self.name.unwrap_or(base.startup_name),
            industry: self.industry.unwrap_or(base.industry),
            mission: self.mission.unwrap_or(base.mission),
            product: self.product.unwrap_or(base.product),
            target_market: self.target_market.unwrap_or(base.target_market),
            funding_stage: self.funding_stage.unwrap_or(base.funding_stage),
        })
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the `info` default.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .ok();
}

/// Provider API keys: the runtime dir's `.env` first, then `./.env`.
fn load_env() {
    let path = state::env_path();
    match dotenvy::from_path(&path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Loaded API keys"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not read .env"),
    }
    dotenvy::dotenv().ok();
}

async fn run_cli_battle(args: RunArgs) -> anyhow::Result<()> {
    let request = args.into_form()?.into_request()?;
    let config = BattleConfig::load().await?;

    println!("⚔️  Pitch battle for {}", request.startup_name);
    let coordinator = BattleCoordinator::new(Arc::new(LlmCrewRuntime::new(config)));
    let (mut snapshots, handle) = spawn_battle(coordinator, request);

    let mut previous = Snapshot::default();
    while let Some(snapshot) = snapshots.next().await {
        for index in snapshot.changed_since(&previous) {
            if !snapshot[index].is_empty() {
                println!("\n=== {} ===\n\n{}", SLOT_LABELS[index], &snapshot[index]);
            }
        }
        previous = snapshot;
    }

    let outcome = handle.await??;
    tracing::info!(?outcome, "Battle finished");
    let status = previous.status_line();
    if !status.is_empty() {
        eprintln!("\n{}", status);
    }
    Ok(())
}

fn print_presets() {
    for preset in presets() {
        println!(
            "{:<14} {} ({})",
            preset.key, preset.form.startup_name, preset.form.industry
        );
    }
}

pub async fn run_server(host: &str, port: u16) -> anyhow::Result<()> {
    let config = BattleConfig::load().await?;
    let state = api::AppState::new(config, state::config_path());
    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!(%addr, "Pitch Battle server running");
    tracing::info!("Battle:  POST /api/v1/battle (SSE)");
    tracing::info!("Catalog: /api/v1/presets, /api/v1/industries, /api/v1/providers");
    tracing::info!("Config:  /api/v1/config (GET, PATCH)");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    load_env();

    let args = Args::parse();
    match args.command {
        Some(CliCommand::Serve { host, port }) => run_server(&host, port).await,
        Some(CliCommand::Run(run)) => run_cli_battle(run).await,
        Some(CliCommand::Presets) => {
            print_presets();
            Ok(())
        }
        None => run_server(DEFAULT_HOST, DEFAULT_PORT).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_serve_defaults() {
        let args = Args::try_parse_from(["pitch-battle", "serve"]).unwrap();
        match args.command {
            Some(CliCommand::Serve { host, port }) => {
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 5002);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_preset_fields_can_be_overridden() {
        let args = RunArgs {
            preset: Some("coffee-shop".to_string()),
            name: Some("Brewly".to_string()),
            ..Default::default()
        };
        let form = args.into_form().unwrap();
        assert_eq!(form.startup_name, "Brewly");
        assert_eq!(form.industry, "Food & Beverage");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_unknown_preset() {
        let args = RunArgs {
            preset: Some("spaceship".to_string()),
            ..Default::default()
        };
        assert!(args.into_form().is_err());
    }

    #[test]
    fn test_blank_run_fails_validation() {
        let form = RunArgs::default().into_form().unwrap();
        let err = form.validate().unwrap_err();
        assert_eq!(err.missing.len(), 6);
    }
}
