use crate::cli::Cli;
use crate::config::Config;
use crate::datasources::OpenWeatherMapClient;
use crate::db::Database;
use crate::logic::SchedulePlanner;
use crate::models::{PlantKind, PlantProfile, WateringEvent, WateringSchedule};
use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, Utc};

pub fn open_db(cli: &Cli) -> Result<Database> {
    Database::open(cli.data_dir.as_ref()).context("Failed to open database")
}

fn load_config(cli: &Cli) -> Result<Config> {
    Config::load(cli.config.clone()).context("Failed to load configuration")
}

fn weather_client(config: &Config) -> Option<OpenWeatherMapClient> {
    config
        .openweathermap
        .as_ref()
        .filter(|c| c.enabled && !c.api_key.is_empty())
        .map(|c| OpenWeatherMapClient::new(c.clone()))
}

/// Accept either a numeric id or a (case-insensitive) plant name.
fn resolve_plant(db: &Database, ident: &str) -> Result<PlantProfile> {
    if let Ok(id) = ident.parse::<i64>() {
        if let Some(plant) = db.get_plant(id)? {
            return Ok(plant);
        }
    }
    db.get_plant_by_name(ident)?
        .ok_or_else(|| anyhow!("No plant matching '{}'", ident))
}

fn planner(db: &Database, config: &Config) -> SchedulePlanner {
    SchedulePlanner::new(db.clone()).with_lookahead(config.scheduler.forecast_lookahead_days)
}

pub fn cmd_init() -> Result<()> {
    let (_, path) = Config::setup_interactive()?;
    println!("Run `plantops plants add <name>` to register your first plant.");
    println!("Config: {}", path.display());
    Ok(())
}

pub async fn cmd_check(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    println!("Config: OK");

    let db = open_db(cli)?;
    println!("Database: OK ({})", db.path().display());

    match weather_client(&config) {
        Some(client) => match client.test_connection().await {
            Ok(true) => println!("OpenWeatherMap: OK"),
            Ok(false) => println!("OpenWeatherMap: FAILED (unexpected response)"),
            Err(e) => println!("OpenWeatherMap: FAILED ({})", e),
        },
        None => println!("OpenWeatherMap: not configured"),
    }

    Ok(())
}

pub fn cmd_overview(cli: &Cli) -> Result<()> {
    let db = open_db(cli)?;
    let today = Utc::now().date_naive();

    let plants = db.list_plants(true)?;
    let todays = db.schedules_for_date(today)?;
    let overdue = db.overdue_schedules(today)?;

    println!("PlantOps — {}", today);
    println!("  Active plants:     {}", plants.len());
    println!("  Schedules today:   {}", todays.len());
    println!("  Overdue schedules: {}", overdue.len());

    if !todays.is_empty() {
        println!();
        print_schedules(&db, &todays)?;
    }
    if todays.is_empty() && !plants.is_empty() {
        println!();
        println!("Run `plantops plan daily` to generate today's watering plan.");
    }
    Ok(())
}

// Plants

pub fn cmd_plants_add(
    cli: &Cli,
    name: &str,
    kind: &str,
    scientific_name: Option<&str>,
    amount_ml: Option<f64>,
    frequency_days: Option<u32>,
) -> Result<()> {
    let kind = PlantKind::from_str(kind)
        .ok_or_else(|| anyhow!("Unknown plant kind '{}' (try Tropical, Succulent, ...)", kind))?;

    let db = open_db(cli)?;
    let mut plant = PlantProfile::new(name.to_string(), kind);
    if let Some(scientific) = scientific_name {
        plant = plant.with_scientific_name(scientific);
    }
    if let Some(amount) = amount_ml {
        if amount <= 0.0 {
            bail!("Water amount must be positive");
        }
        plant = plant.with_base_amount(amount);
    }
    if let Some(days) = frequency_days {
        if days == 0 {
            bail!("Watering frequency must be at least 1 day");
        }
        plant = plant.with_frequency(days);
    }

    let id = db.create_plant(&plant)?;
    println!(
        "Added {} ({}) — {:.0}ml every {} days [id {}]",
        plant.name, plant.kind, plant.base_water_amount_ml, plant.base_frequency_days, id
    );
    Ok(())
}

pub fn cmd_plants_list(cli: &Cli, all: bool) -> Result<()> {
    let db = open_db(cli)?;
    let plants = db.list_plants(!all)?;

    if plants.is_empty() {
        println!("No plants yet. Add one with `plantops plants add <name>`.");
        return Ok(());
    }

    println!(
        "{:<4} {:<20} {:<14} {:>8} {:>7}  {}",
        "ID", "Name", "Kind", "Amount", "Every", "Status"
    );
    for plant in &plants {
        println!(
            "{:<4} {:<20} {:<14} {:>6}ml {:>4}d   {}",
            plant.id.unwrap_or(0),
            plant.name,
            plant.kind.as_str(),
            plant.base_water_amount_ml.round(),
            plant.base_frequency_days,
            if plant.is_active { "active" } else { "paused" },
        );
    }
    Ok(())
}

pub fn cmd_plants_show(cli: &Cli, ident: &str) -> Result<()> {
    let db = open_db(cli)?;
    let plant = resolve_plant(&db, ident)?;
    let plant_id = plant.id.unwrap_or(0);

    println!("{} [id {}]", plant.name, plant_id);
    if let Some(ref scientific) = plant.scientific_name {
        println!("  Scientific name: {}", scientific);
    }
    println!("  Kind:            {}", plant.kind);
    println!(
        "  Watering:        {:.0}ml every {} days",
        plant.base_water_amount_ml, plant.base_frequency_days
    );
    println!(
        "  Seasonal:        spring ×{} summer ×{} autumn ×{} winter ×{}",
        plant.spring_multiplier,
        plant.summer_multiplier,
        plant.autumn_multiplier,
        plant.winter_multiplier
    );
    println!(
        "  Temperature:     {:.0}–{:.0}°C, ideal humidity {:.0}%",
        plant.min_temperature_c, plant.max_temperature_c, plant.ideal_humidity_percent
    );
    println!("  Rain threshold:  {:.1}mm", plant.rain_threshold_mm);
    println!("  Status:          {}", if plant.is_active { "active" } else { "paused" });

    let events = db.recent_waterings(plant_id, 5)?;
    if events.is_empty() {
        println!("  Never watered.");
    } else {
        println!("  Recent waterings:");
        for event in &events {
            println!(
                "    {} — {:.0}ml{}",
                event.watered_at.format("%Y-%m-%d %H:%M"),
                event.water_amount_ml,
                if event.was_scheduled { " (scheduled)" } else { "" },
            );
        }
    }
    Ok(())
}

pub fn cmd_plants_set_active(cli: &Cli, ident: &str, active: bool) -> Result<()> {
    let db = open_db(cli)?;
    let plant = resolve_plant(&db, ident)?;
    db.set_plant_active(plant.id.unwrap_or(0), active)?;
    println!(
        "{} is now {}",
        plant.name,
        if active { "active" } else { "paused" }
    );
    Ok(())
}

pub fn cmd_plants_remove(cli: &Cli, ident: &str) -> Result<()> {
    let db = open_db(cli)?;
    let plant = resolve_plant(&db, ident)?;
    db.delete_plant(plant.id.unwrap_or(0))?;
    println!("Removed {} and its history", plant.name);
    Ok(())
}

// Watering

pub fn cmd_water(cli: &Cli, ident: &str, amount_ml: Option<f64>, notes: Option<&str>) -> Result<()> {
    let db = open_db(cli)?;
    let plant = resolve_plant(&db, ident)?;
    let amount = amount_ml.unwrap_or(plant.base_water_amount_ml);
    if amount <= 0.0 {
        bail!("Water amount must be positive");
    }

    let mut event = WateringEvent::new(plant.id.unwrap_or(0), Utc::now(), amount);
    if let Some(notes) = notes {
        event = event.with_notes(notes);
    }
    db.record_watering(&event)?;

    println!("Recorded {:.0}ml for {}", amount, plant.name);
    Ok(())
}

// Weather

pub async fn cmd_weather_sync(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let client = weather_client(&config)
        .ok_or_else(|| anyhow!("OpenWeatherMap is not configured. Run `plantops init`."))?;

    let db = open_db(cli)?;
    let samples = client.fetch_daily().await?;
    for sample in &samples {
        db.upsert_weather_sample(sample)?;
    }

    let forecast_count = samples.iter().filter(|s| s.is_forecast).count();
    println!(
        "Stored {} weather samples ({} observed, {} forecast)",
        samples.len(),
        samples.len() - forecast_count,
        forecast_count
    );
    Ok(())
}

pub fn cmd_weather_show(cli: &Cli) -> Result<()> {
    let db = open_db(cli)?;
    let today = Utc::now().date_naive();
    let window = db.weather_window(today, 7)?;

    if window.is_empty() {
        println!("No cached weather. Run `plantops weather sync` first.");
        return Ok(());
    }

    println!(
        "{:<12} {:<13} {:>5} {:>5} {:>5} {:>6} {:>7}",
        "Date", "Condition", "Min", "Max", "Avg", "Hum", "Rain"
    );
    for sample in &window {
        println!(
            "{:<12} {:<13} {:>4}° {:>4}° {:>4}° {:>5}% {:>5}mm{}",
            sample.date.to_string(),
            sample.condition.as_str(),
            sample.temperature_min_c.round(),
            sample.temperature_max_c.round(),
            sample.temperature_avg_c.round(),
            sample.humidity_percent.round(),
            sample.precipitation_mm,
            if sample.is_forecast { "  (forecast)" } else { "" },
        );
    }
    Ok(())
}

// Planning

pub async fn cmd_plan_daily(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let db = open_db(cli)?;
    let now = Utc::now();

    // Refresh weather first when a client is configured; stale cache is
    // still usable if the fetch fails.
    if let Some(client) = weather_client(&config) {
        match client.fetch_daily().await {
            Ok(samples) => {
                for sample in &samples {
                    db.upsert_weather_sample(sample)?;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Weather refresh failed, using cached data"),
        }
    }

    if db.weather_window(now.date_naive(), 7)?.is_empty() {
        bail!("No weather data available. Run `plantops weather sync` first.");
    }

    let created = planner(&db, &config).generate_daily_schedules(now)?;
    if created.is_empty() {
        println!("No watering needed today.");
    } else {
        println!("Created {} schedule(s):", created.len());
        print_schedules(&db, &created)?;
    }
    Ok(())
}

pub fn cmd_plan_plant(cli: &Cli, ident: &str, date: Option<NaiveDate>) -> Result<()> {
    let config = load_config(cli)?;
    let db = open_db(cli)?;
    let plant = resolve_plant(&db, ident)?;

    match planner(&db, &config).generate_for_plant(plant.id.unwrap_or(0), date, Utc::now())? {
        Some(schedule) => {
            println!(
                "Scheduled {:.0}ml for {} on {} — {}",
                schedule.water_amount_ml,
                plant.name,
                schedule.scheduled_date,
                schedule.reason.as_deref().unwrap_or("-"),
            );
        }
        None => println!("No watering recommended for {} right now.", plant.name),
    }
    Ok(())
}

// Schedules

pub fn cmd_schedules_list(cli: &Cli, date: Option<NaiveDate>) -> Result<()> {
    let db = open_db(cli)?;
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let schedules = db.schedules_for_date(date)?;

    if schedules.is_empty() {
        println!("No schedules for {}.", date);
        return Ok(());
    }
    print_schedules(&db, &schedules)?;
    Ok(())
}

pub fn cmd_schedules_pending(cli: &Cli) -> Result<()> {
    let db = open_db(cli)?;
    let schedules = db.pending_schedules()?;
    if schedules.is_empty() {
        println!("No pending schedules.");
        return Ok(());
    }
    print_schedules(&db, &schedules)?;
    Ok(())
}

pub fn cmd_schedules_overdue(cli: &Cli) -> Result<()> {
    let db = open_db(cli)?;
    let schedules = db.overdue_schedules(Utc::now().date_naive())?;
    if schedules.is_empty() {
        println!("Nothing overdue.");
        return Ok(());
    }
    print_schedules(&db, &schedules)?;
    Ok(())
}

pub fn cmd_schedules_complete(
    cli: &Cli,
    id: i64,
    amount_ml: Option<f64>,
    notes: Option<&str>,
) -> Result<()> {
    let config = load_config(cli).unwrap_or_default();
    let db = open_db(cli)?;
    let schedule = planner(&db, &config).complete_schedule(id, amount_ml, notes, Utc::now())?;
    println!(
        "Completed schedule {} ({:.0}ml)",
        id,
        schedule.actual_water_amount_ml.unwrap_or(schedule.water_amount_ml)
    );
    Ok(())
}

pub fn cmd_schedules_skip(cli: &Cli, id: i64, reason: Option<&str>) -> Result<()> {
    let config = load_config(cli).unwrap_or_default();
    let db = open_db(cli)?;
    planner(&db, &config).skip_schedule(id, reason)?;
    println!("Skipped schedule {}", id);
    Ok(())
}

pub fn cmd_prune(cli: &Cli) -> Result<()> {
    let config = load_config(cli).unwrap_or_default();
    let db = open_db(cli)?;
    let (weather_rows, schedule_rows) = planner(&db, &config).prune(Utc::now())?;
    println!(
        "Removed {} weather row(s) and {} schedule row(s)",
        weather_rows, schedule_rows
    );
    Ok(())
}

fn print_schedules(db: &Database, schedules: &[WateringSchedule]) -> Result<()> {
    println!(
        "{:<4} {:<12} {:<20} {:>8} {:<10} {}",
        "ID", "Date", "Plant", "Amount", "Status", "Reason"
    );
    for schedule in schedules {
        let plant_name = db
            .get_plant(schedule.plant_id)?
            .map(|p| p.name)
            .unwrap_or_else(|| format!("plant {}", schedule.plant_id));
        println!(
            "{:<4} {:<12} {:<20} {:>6}ml {:<10} {}",
            schedule.id.unwrap_or(0),
            schedule.scheduled_date.to_string(),
            plant_name,
            schedule.water_amount_ml.round(),
            schedule.status.as_str(),
            schedule.reason.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
