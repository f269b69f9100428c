//! Intent tags
//!
//! The closed vocabulary shared by the classifier, the variant table keys
//! and the statistics keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Classified topic of a customer's message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Customer says they lack time
    Time,
    /// Customer asks about cost
    Price,
    /// Customer asks whether the program is certified
    Certification,
    /// Customer asks about job prospects
    Employment,
    /// Customer compares with another provider
    Competitor,
    /// Customer wants the overview
    Pitch,
    /// Nothing matched
    #[default]
    General,
}

impl Intent {
    /// All intents, in classification priority order
    pub const ALL: [Intent; 7] = [
        Intent::Time,
        Intent::Price,
        Intent::Certification,
        Intent::Employment,
        Intent::Competitor,
        Intent::Pitch,
        Intent::General,
    ];

    /// Tag used as variant and stats key
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Time => "time",
            Intent::Price => "price",
            Intent::Certification => "certification",
            Intent::Employment => "employment",
            Intent::Competitor => "competitor",
            Intent::Pitch => "pitch",
            Intent::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" | "tiempo" => Ok(Intent::Time),
            "price" | "precio" => Ok(Intent::Price),
            "certification" | "certificacion" | "certificación" => Ok(Intent::Certification),
            "employment" | "empleo" | "trabajo" => Ok(Intent::Employment),
            "competitor" | "competencia" => Ok(Intent::Competitor),
            "pitch" => Ok(Intent::Pitch),
            "general" | "default" => Ok(Intent::General),
            other => Err(Error::InvalidInput(format!("unknown intent '{}'", other))),
        }
    }
}
