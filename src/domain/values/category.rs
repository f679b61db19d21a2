use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Protest,
    Crime,
    ReligiousFreedom,
    CulturalDisruption,
    Displacement,
    Political,
    Economic,
    Infrastructure,
    Health,
    Environment,
    /// Catch-all for events the enrichment stage could not classify.
    Other,
}

/// Keyword fallback used by [`Category::classify`] when a label is not an
/// exact category name. Checked in order; first hit wins.
const KEYWORD_TABLE: &[(&str, Category)] = &[
    ("religio", Category::ReligiousFreedom),
    ("church", Category::ReligiousFreedom),
    ("mosque", Category::ReligiousFreedom),
    ("temple", Category::ReligiousFreedom),
    ("synagogue", Category::ReligiousFreedom),
    ("worship", Category::ReligiousFreedom),
    ("protest", Category::Protest),
    ("demonstrat", Category::Protest),
    ("rally", Category::Protest),
    ("march", Category::Protest),
    ("strike", Category::Protest),
    ("crime", Category::Crime),
    ("criminal", Category::Crime),
    ("arrest", Category::Crime),
    ("robbery", Category::Crime),
    ("murder", Category::Crime),
    ("assault", Category::Crime),
    ("theft", Category::Crime),
    ("cultur", Category::CulturalDisruption),
    ("heritage", Category::CulturalDisruption),
    ("tradition", Category::CulturalDisruption),
    ("displace", Category::Displacement),
    ("refugee", Category::Displacement),
    ("evict", Category::Displacement),
    ("migra", Category::Displacement),
    ("politic", Category::Political),
    ("election", Category::Political),
    ("government", Category::Political),
    ("econom", Category::Economic),
    ("market", Category::Economic),
    ("trade", Category::Economic),
    ("infrastructure", Category::Infrastructure),
    ("transport", Category::Infrastructure),
    ("power", Category::Infrastructure),
    ("health", Category::Health),
    ("disease", Category::Health),
    ("hospital", Category::Health),
    ("environment", Category::Environment),
    ("climate", Category::Environment),
    ("flood", Category::Environment),
    ("wildfire", Category::Environment),
];

impl Category {
    pub const ALL: [Category; 11] = [
        Category::Protest,
        Category::Crime,
        Category::ReligiousFreedom,
        Category::CulturalDisruption,
        Category::Displacement,
        Category::Political,
        Category::Economic,
        Category::Infrastructure,
        Category::Health,
        Category::Environment,
        Category::Other,
    ];

    /// Total label parser: exact name first, then the keyword table, then
    /// [`Category::Other`]. Never fails.
    pub fn classify(label: &str) -> Category {
        if let Ok(cat) = label.parse() {
            return cat;
        }
        let lower = label.to_lowercase();
        KEYWORD_TABLE
            .iter()
            .find(|(kw, _)| lower.contains(kw))
            .map(|(_, cat)| *cat)
            .unwrap_or(Category::Other)
    }

    /// Base relevance weight fed into the relevance score.
    pub fn base_weight(&self) -> f64 {
        match self {
            Category::Crime => 0.95,
            Category::ReligiousFreedom => 0.95,
            Category::Protest => 0.85,
            Category::CulturalDisruption => 0.85,
            Category::Displacement => 0.80,
            Category::Political => 0.70,
            Category::Infrastructure => 0.60,
            Category::Economic => 0.55,
            Category::Health => 0.55,
            Category::Environment => 0.50,
            Category::Other => 0.20,
        }
    }

    /// The four highest-risk categories, where negative sentiment is boosted.
    pub fn is_high_risk(&self) -> bool {
        matches!(
            self,
            Category::Crime
                | Category::ReligiousFreedom
                | Category::Protest
                | Category::CulturalDisruption
        )
    }

    pub fn is_specific(&self) -> bool {
        *self != Category::Other
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Protest => write!(f, "protest"),
            Category::Crime => write!(f, "crime"),
            Category::ReligiousFreedom => write!(f, "religious_freedom"),
            Category::CulturalDisruption => write!(f, "cultural_disruption"),
            Category::Displacement => write!(f, "displacement"),
            Category::Political => write!(f, "political"),
            Category::Economic => write!(f, "economic"),
            Category::Infrastructure => write!(f, "infrastructure"),
            Category::Health => write!(f, "health"),
            Category::Environment => write!(f, "environment"),
            Category::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "protest" => Ok(Category::Protest),
            "crime" => Ok(Category::Crime),
            "religious_freedom" => Ok(Category::ReligiousFreedom),
            "cultural_disruption" => Ok(Category::CulturalDisruption),
            "displacement" => Ok(Category::Displacement),
            "political" => Ok(Category::Political),
            "economic" => Ok(Category::Economic),
            "infrastructure" => Ok(Category::Infrastructure),
            "health" => Ok(Category::Health),
            "environment" => Ok(Category::Environment),
            "other" => Ok(Category::Other),
            _ => Err(format!("Unknown category: {s}")),
        }
    }
}
