use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Meteorological seasons, Northern-hemisphere convention.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantKind {
    Succulent,
    Tropical,
    Mediterranean,
    Temperate,
    Desert,
    Aquatic,
}

impl PlantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantKind::Succulent => "Succulent",
            PlantKind::Tropical => "Tropical",
            PlantKind::Mediterranean => "Mediterranean",
            PlantKind::Temperate => "Temperate",
            PlantKind::Desert => "Desert",
            PlantKind::Aquatic => "Aquatic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "succulent" => Some(PlantKind::Succulent),
            "tropical" => Some(PlantKind::Tropical),
            "mediterranean" => Some(PlantKind::Mediterranean),
            "temperate" => Some(PlantKind::Temperate),
            "desert" => Some(PlantKind::Desert),
            "aquatic" => Some(PlantKind::Aquatic),
            _ => None,
        }
    }

    pub fn all() -> &'static [PlantKind] {
        &[
            PlantKind::Succulent,
            PlantKind::Tropical,
            PlantKind::Mediterranean,
            PlantKind::Temperate,
            PlantKind::Desert,
            PlantKind::Aquatic,
        ]
    }
}

impl std::fmt::Display for PlantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Watering parameters for a single plant.
///
/// Amounts are in milliliters, temperatures in degrees Celsius, humidity in
/// percent. The four multipliers scale the base amount by season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantProfile {
    pub id: Option<i64>,
    pub name: String,
    pub kind: PlantKind,
    pub scientific_name: Option<String>,
    pub base_water_amount_ml: f64,
    pub base_frequency_days: u32,
    pub spring_multiplier: f64,
    pub summer_multiplier: f64,
    pub autumn_multiplier: f64,
    pub winter_multiplier: f64,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    pub ideal_humidity_percent: f64,
    pub rain_threshold_mm: f64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PlantProfile {
    pub fn new(name: String, kind: PlantKind) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: None,
            name,
            kind,
            scientific_name: None,
            base_water_amount_ml: 250.0,
            base_frequency_days: 7,
            spring_multiplier: 1.0,
            summer_multiplier: 1.2,
            autumn_multiplier: 0.8,
            winter_multiplier: 0.5,
            min_temperature_c: 15.0,
            max_temperature_c: 30.0,
            ideal_humidity_percent: 50.0,
            rain_threshold_mm: 5.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_scientific_name(mut self, name: &str) -> Self {
        self.scientific_name = Some(name.to_string());
        self
    }

    pub fn with_base_amount(mut self, amount_ml: f64) -> Self {
        self.base_water_amount_ml = amount_ml;
        self
    }

    pub fn with_frequency(mut self, days: u32) -> Self {
        self.base_frequency_days = days;
        self
    }

    pub fn seasonal_multiplier(&self, season: Season) -> f64 {
        match season {
            Season::Spring => self.spring_multiplier,
            Season::Summer => self.summer_multiplier,
            Season::Autumn => self.autumn_multiplier,
            Season::Winter => self.winter_multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_from_month_all_months() {
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Autumn);
        assert_eq!(Season::from_month(11), Season::Autumn);
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
    }

    #[test]
    fn plant_kind_from_str_valid() {
        assert_eq!(PlantKind::from_str("Tropical"), Some(PlantKind::Tropical));
        assert_eq!(PlantKind::from_str("tropical"), Some(PlantKind::Tropical));
        assert_eq!(PlantKind::from_str("SUCCULENT"), Some(PlantKind::Succulent));
        assert_eq!(PlantKind::from_str("desert"), Some(PlantKind::Desert));
    }

    #[test]
    fn plant_kind_from_str_invalid() {
        assert_eq!(PlantKind::from_str("cactus"), None);
        assert_eq!(PlantKind::from_str(""), None);
    }

    #[test]
    fn plant_kind_round_trip() {
        // Test that Debug format round-trips through from_str
        for kind in PlantKind::all() {
            let debug_str = format!("{:?}", kind);
            assert_eq!(
                PlantKind::from_str(&debug_str),
                Some(*kind),
                "Round-trip failed for {:?}",
                kind
            );
        }
    }

    #[test]
    fn seasonal_multiplier_selects_season() {
        let mut plant = PlantProfile::new("Monstera".to_string(), PlantKind::Tropical);
        plant.spring_multiplier = 1.1;
        plant.summer_multiplier = 1.4;
        plant.autumn_multiplier = 0.9;
        plant.winter_multiplier = 0.4;

        assert_eq!(plant.seasonal_multiplier(Season::Spring), 1.1);
        assert_eq!(plant.seasonal_multiplier(Season::Summer), 1.4);
        assert_eq!(plant.seasonal_multiplier(Season::Autumn), 0.9);
        assert_eq!(plant.seasonal_multiplier(Season::Winter), 0.4);
    }

    #[test]
    fn plant_builder_pattern() {
        let plant = PlantProfile::new("Aloe".to_string(), PlantKind::Succulent)
            .with_scientific_name("Aloe vera")
            .with_base_amount(100.0)
            .with_frequency(14);

        assert_eq!(plant.scientific_name, Some("Aloe vera".to_string()));
        assert_eq!(plant.base_water_amount_ml, 100.0);
        assert_eq!(plant.base_frequency_days, 14);
        assert!(plant.is_active);
    }
}
