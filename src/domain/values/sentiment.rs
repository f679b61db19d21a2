use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Numeric mapping used for trend comparison.
    pub fn value(&self) -> i8 {
        match self {
            Sentiment::Negative => -1,
            Sentiment::Neutral => 0,
            Sentiment::Positive => 1,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "pos" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" | "neg" => Ok(Sentiment::Negative),
            _ => Err(format!("Unknown sentiment: {s}")),
        }
    }
}

/// Direction of sentiment across a fused group, oldest to newest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityTrend {
    Increasing,
    #[default]
    Neutral,
    Decreasing,
}

impl StabilityTrend {
    pub fn between(first: Sentiment, last: Sentiment) -> Self {
        match last.value().cmp(&first.value()) {
            std::cmp::Ordering::Greater => StabilityTrend::Increasing,
            std::cmp::Ordering::Less => StabilityTrend::Decreasing,
            std::cmp::Ordering::Equal => StabilityTrend::Neutral,
        }
    }
}

impl fmt::Display for StabilityTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StabilityTrend::Increasing => write!(f, "increasing"),
            StabilityTrend::Neutral => write!(f, "neutral"),
            StabilityTrend::Decreasing => write!(f, "decreasing"),
        }
    }
}
