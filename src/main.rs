use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lineup_builder::api::state::AppState;
use lineup_builder::calculate::{summarize_lineups, SalaryAmount};
use lineup_builder::config::AppConfig;
use lineup_builder::lineup::{
    BudgetPolicy, JsonlLineupRepository, LineupAssembler, LineupDraft, LineupRepository,
};
use lineup_builder::models::{MatchId, RoleSlot, Scope};
use lineup_builder::stats::StatsClient;
use lineup_builder::storage::FixtureStore;

#[derive(Parser)]
#[command(name = "lineup-builder")]
#[command(about = "Fantasy esports lineup builder with salary-cap validation")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the config value
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// List players eligible for a match
    Players {
        /// Match ID
        match_id: String,

        /// Eligibility scope (game, day, event)
        #[arg(long, default_value = "day")]
        scope: String,

        /// Slot being filled, e.g. "Player 2"
        #[arg(long)]
        role: Option<String>,

        /// Case-insensitive filter on player name or team
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Assemble a lineup from a JSON draft file and save it
    Build {
        /// Path to the draft JSON
        draft: PathBuf,

        /// Validate and print without saving
        #[arg(long)]
        dry_run: bool,

        /// Save over-cap lineups flagged instead of rejecting them
        #[arg(long)]
        lenient: bool,
    },

    /// List saved lineups
    Lineups {
        /// Only lineups for this match
        #[arg(long)]
        match_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting lineup-builder v{}", env!("CARGO_PKG_VERSION"));

    let storage = config.storage();

    match cli.command {
        Commands::Serve { host, port } => {
            let fixtures = FixtureStore::load(&storage)?;
            let repository = JsonlLineupRepository::new(storage.lineups_path());
            let stats = StatsClient::new(config.stats.client_config())?;

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            tracing::info!(
                "Stats proxy upstream: {}, budget policy: {:?}",
                stats.upstream(),
                config.lineup.budget_policy
            );

            let state = AppState {
                fixtures: Arc::new(fixtures),
                repository: Arc::new(repository),
                stats: Arc::new(stats),
                config: Arc::new(config),
            };
            let app = lineup_builder::api::build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Players {
            match_id,
            scope,
            role,
            search,
        } => {
            let fixtures = Arc::new(FixtureStore::load(&storage)?);
            let scope: Scope = scope.parse().unwrap_or_default();
            let assembler = LineupAssembler::new(fixtures, &MatchId::from(match_id), scope)?;
            let role = match role {
                Some(raw) => assembler.parse_role(&raw)?,
                None => RoleSlot::Captain,
            };

            let active = assembler.active_match();
            println!(
                "{} vs {} ({}, scope {}, cap {})",
                active.team_a,
                active.team_b,
                assembler.mode(),
                scope,
                SalaryAmount::from_units(i64::from(assembler.salary_cap()))
            );
            println!();
            println!("{:<24} {:<16} {:>10}", "Player", "Team", "Salary");
            for candidate in assembler.selectable_players(role, &search)? {
                let p = &candidate.player;
                println!(
                    "{:<24} {:<16} {:>10}",
                    p.name,
                    p.team,
                    SalaryAmount::from_units(i64::from(p.salary)).to_string()
                );
            }
        }
        Commands::Build {
            draft,
            dry_run,
            lenient,
        } => {
            let contents = std::fs::read_to_string(&draft)
                .with_context(|| format!("reading {}", draft.display()))?;
            let draft: LineupDraft = serde_json::from_str(&contents)?;
            let policy = if lenient {
                BudgetPolicy::Lenient
            } else {
                config.lineup.budget_policy
            };

            let fixtures = Arc::new(FixtureStore::load(&storage)?);
            let mut assembler = draft.assemble(fixtures, policy)?;
            let entry_fee = draft.entry_fee.unwrap_or(config.lineup.default_entry_fee);

            let budget = assembler.cost();
            println!(
                "Salary used: {} of {} ({:.1}%), remaining {}",
                budget.total_salary,
                SalaryAmount::from_units(i64::from(budget.salary_cap)),
                budget.percent_used(),
                budget.remaining
            );

            let lineup = if dry_run {
                assembler.build_lineup(&draft.lineup_name, entry_fee)?
            } else {
                let repository = JsonlLineupRepository::new(storage.lineups_path());
                assembler
                    .save(&repository, &draft.lineup_name, entry_fee)
                    .await?
            };
            println!("{}", serde_json::to_string_pretty(&lineup)?);
            if dry_run {
                println!("\n(dry run - lineup not saved)");
            }
        }
        Commands::Lineups { match_id } => {
            let repository = JsonlLineupRepository::new(storage.lineups_path());
            let mut lineups = repository.list().await?;
            let summary = summarize_lineups(&lineups);
            if let Some(ref id) = match_id {
                lineups.retain(|l| l.match_id.as_str() == id.as_str());
            }

            println!(
                "Lineups: {} total, {} active, {} completed, {} cancelled",
                summary.total, summary.active, summary.completed, summary.cancelled
            );
            for lineup in &lineups {
                println!(
                    "  {}  {:<28} {:<6} {:>10}  {}{}",
                    lineup.id,
                    lineup.lineup_name,
                    lineup.mode.label(),
                    lineup.total_salary,
                    lineup.status,
                    if lineup.over_budget { " (over budget)" } else { "" }
                );
            }
        }
    }

    Ok(())
}
