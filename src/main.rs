mod cli;
mod commands;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, PlanAction, PlantsAction, SchedulesAction, WeatherAction};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Some(Commands::Init) => commands::cmd_init(),
        Some(Commands::Check) => commands::cmd_check(&cli).await,
        Some(Commands::Plants { action }) => match action {
            None | Some(PlantsAction::List { all: false }) => {
                commands::cmd_plants_list(&cli, false)
            }
            Some(PlantsAction::List { all: true }) => commands::cmd_plants_list(&cli, true),
            Some(PlantsAction::Add {
                name,
                kind,
                scientific_name,
                amount_ml,
                frequency_days,
            }) => commands::cmd_plants_add(
                &cli,
                name,
                kind,
                scientific_name.as_deref(),
                *amount_ml,
                *frequency_days,
            ),
            Some(PlantsAction::Show { plant }) => commands::cmd_plants_show(&cli, plant),
            Some(PlantsAction::Pause { plant }) => {
                commands::cmd_plants_set_active(&cli, plant, false)
            }
            Some(PlantsAction::Resume { plant }) => {
                commands::cmd_plants_set_active(&cli, plant, true)
            }
            Some(PlantsAction::Remove { plant }) => commands::cmd_plants_remove(&cli, plant),
        },
        Some(Commands::Water {
            plant,
            amount_ml,
            notes,
        }) => commands::cmd_water(&cli, plant, *amount_ml, notes.as_deref()),
        Some(Commands::Weather { action }) => match action {
            WeatherAction::Sync => commands::cmd_weather_sync(&cli).await,
            WeatherAction::Show => commands::cmd_weather_show(&cli),
        },
        Some(Commands::Plan { action }) => match action {
            PlanAction::Daily => commands::cmd_plan_daily(&cli).await,
            PlanAction::Plant { plant, date } => commands::cmd_plan_plant(&cli, plant, *date),
        },
        Some(Commands::Schedules { action }) => match action {
            None => commands::cmd_schedules_list(&cli, None),
            Some(SchedulesAction::List { date }) => commands::cmd_schedules_list(&cli, *date),
            Some(SchedulesAction::Pending) => commands::cmd_schedules_pending(&cli),
            Some(SchedulesAction::Overdue) => commands::cmd_schedules_overdue(&cli),
            Some(SchedulesAction::Complete {
                id,
                amount_ml,
                notes,
            }) => commands::cmd_schedules_complete(&cli, *id, *amount_ml, notes.as_deref()),
            Some(SchedulesAction::Skip { id, reason }) => {
                commands::cmd_schedules_skip(&cli, *id, reason.as_deref())
            }
        },
        Some(Commands::Prune) => commands::cmd_prune(&cli),
        None => commands::cmd_overview(&cli),
    }
}
