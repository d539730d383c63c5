use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS plants (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        kind TEXT NOT NULL,
        scientific_name TEXT,
        base_water_amount_ml REAL NOT NULL DEFAULT 250.0,
        base_frequency_days INTEGER NOT NULL DEFAULT 7,
        spring_multiplier REAL NOT NULL DEFAULT 1.0,
        summer_multiplier REAL NOT NULL DEFAULT 1.2,
        autumn_multiplier REAL NOT NULL DEFAULT 0.8,
        winter_multiplier REAL NOT NULL DEFAULT 0.5,
        min_temperature_c REAL NOT NULL DEFAULT 15.0,
        max_temperature_c REAL NOT NULL DEFAULT 30.0,
        ideal_humidity_percent REAL NOT NULL DEFAULT 50.0,
        rain_threshold_mm REAL NOT NULL DEFAULT 5.0,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS watering_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plant_id INTEGER NOT NULL REFERENCES plants(id) ON DELETE CASCADE,
        watered_at TEXT NOT NULL,
        water_amount_ml REAL NOT NULL,
        was_scheduled INTEGER NOT NULL DEFAULT 0,
        schedule_id INTEGER,
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS watering_schedules (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plant_id INTEGER NOT NULL REFERENCES plants(id) ON DELETE CASCADE,
        scheduled_date TEXT NOT NULL,
        water_amount_ml REAL NOT NULL,
        status TEXT NOT NULL DEFAULT 'Pending',
        reason TEXT,
        actual_water_amount_ml REAL,
        completed_at TEXT,
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(plant_id, scheduled_date)
    );

    CREATE TABLE IF NOT EXISTS weather_cache (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        temperature_min_c REAL NOT NULL,
        temperature_max_c REAL NOT NULL,
        temperature_avg_c REAL NOT NULL,
        humidity_percent REAL NOT NULL,
        precipitation_mm REAL NOT NULL DEFAULT 0.0,
        wind_speed_ms REAL,
        uv_index REAL,
        condition TEXT NOT NULL,
        is_forecast INTEGER NOT NULL DEFAULT 0,
        fetched_at TEXT NOT NULL DEFAULT (datetime('now')),
        UNIQUE(date, is_forecast)
    );

    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS schema_migrations (
        version INTEGER PRIMARY KEY,
        applied_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // Migration 2: Add indexes
    r#"
    CREATE INDEX IF NOT EXISTS idx_watering_history_plant_id
        ON watering_history(plant_id);
    CREATE INDEX IF NOT EXISTS idx_watering_history_watered_at
        ON watering_history(watered_at);
    CREATE INDEX IF NOT EXISTS idx_watering_schedules_plant_id
        ON watering_schedules(plant_id);
    CREATE INDEX IF NOT EXISTS idx_watering_schedules_date
        ON watering_schedules(scheduled_date);
    CREATE INDEX IF NOT EXISTS idx_weather_cache_date
        ON weather_cache(date);
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        // Ensure schema_migrations table exists
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        // Get current version
        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        // Apply pending migrations
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                conn.execute_batch(migration)?;
                conn.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
            }
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        // open_in_memory already ran them once
        run(&db).unwrap();
        run(&db).unwrap();

        let version: i32 = db
            .with_conn(|conn| {
                Ok(conn
                    .query_row(
                        "SELECT MAX(version) FROM schema_migrations",
                        [],
                        |row| row.get(0),
                    )
                    .unwrap())
            })
            .unwrap();
        assert_eq!(version as usize, MIGRATIONS.len());
    }
}
