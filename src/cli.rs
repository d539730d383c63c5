use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "plantops",
    version,
    about = "Houseplant watering tracker with weather-driven scheduling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
    /// Manage plant profiles
    Plants {
        #[command(subcommand)]
        action: Option<PlantsAction>,
    },
    /// Record a manual watering
    Water {
        /// Plant id or name
        plant: String,
        /// Amount in milliliters (defaults to the plant's base amount)
        #[arg(short, long)]
        amount_ml: Option<f64>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Fetch or display weather data
    Weather {
        #[command(subcommand)]
        action: WeatherAction,
    },
    /// Generate watering schedules
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
    /// Manage watering schedules
    Schedules {
        #[command(subcommand)]
        action: Option<SchedulesAction>,
    },
    /// Remove stale weather and resolved schedules
    Prune,
}

#[derive(Subcommand)]
pub enum PlantsAction {
    /// Register a new plant
    Add {
        name: String,
        /// Succulent, Tropical, Mediterranean, Temperate, Desert or Aquatic
        #[arg(short, long, default_value = "Temperate")]
        kind: String,
        #[arg(long)]
        scientific_name: Option<String>,
        /// Base water amount in milliliters
        #[arg(long)]
        amount_ml: Option<f64>,
        /// Base watering frequency in days
        #[arg(long)]
        frequency_days: Option<u32>,
    },
    /// List plants
    List {
        /// Include paused plants
        #[arg(short, long)]
        all: bool,
    },
    /// Show one plant in detail
    Show {
        /// Plant id or name
        plant: String,
    },
    /// Stop scheduling a plant without deleting it
    Pause {
        /// Plant id or name
        plant: String,
    },
    /// Resume scheduling a paused plant
    Resume {
        /// Plant id or name
        plant: String,
    },
    /// Delete a plant and its history
    Remove {
        /// Plant id or name
        plant: String,
    },
}

#[derive(Subcommand)]
pub enum WeatherAction {
    /// Fetch current conditions and forecast from OpenWeatherMap
    Sync,
    /// Show the cached weather window
    Show,
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Evaluate all active plants and schedule today's waterings
    Daily,
    /// Generate or refresh a schedule for one plant
    Plant {
        /// Plant id or name
        plant: String,
        /// Target date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum SchedulesAction {
    /// List schedules for a date (defaults to today)
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List all pending schedules
    Pending,
    /// List pending schedules whose date has passed
    Overdue,
    /// Mark a schedule as done and record the watering
    Complete {
        id: i64,
        /// Actual amount in milliliters, if different from planned
        #[arg(long)]
        amount_ml: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Skip a schedule without watering
    Skip {
        id: i64,
        #[arg(long)]
        reason: Option<String>,
    },
}
