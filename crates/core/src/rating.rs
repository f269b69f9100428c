//! Reply ratings sent back by the widget

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Customer-facing rating of a shown reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Good,
    Regular,
    Bad,
}

impl Rating {
    /// Contribution of this rating to the win score
    pub fn win_value(&self) -> f64 {
        match self {
            Rating::Good => 1.0,
            Rating::Regular => 0.5,
            Rating::Bad => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Good => "good",
            Rating::Regular => "regular",
            Rating::Bad => "bad",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "good" | "bueno" | "buena" => Ok(Rating::Good),
            "regular" => Ok(Rating::Regular),
            "bad" | "malo" | "mala" => Ok(Rating::Bad),
            other => Err(Error::InvalidRating(format!(
                "'{}' is not one of good, regular, bad",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_values() {
        assert_eq!(Rating::Good.win_value(), 1.0);
        assert_eq!(Rating::Regular.win_value(), 0.5);
        assert_eq!(Rating::Bad.win_value(), 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("GOOD".parse::<Rating>().unwrap(), Rating::Good);
        assert_eq!("mala".parse::<Rating>().unwrap(), Rating::Bad);
        assert!(matches!(
            "excellent".parse::<Rating>(),
            Err(Error::InvalidRating(_))
        ));
    }
}
