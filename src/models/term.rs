// Academic terms: season + year, with the quarter rotation used by the planner.
//
// Naming follows the source college catalog: the academic year starts in Fall,
// so "Winter 2024" comes right after "Fall 2024" and the year only advances
// when the rotation wraps back to Fall.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Years accepted when parsing a term name.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Fall,
    Winter,
    Spring,
    Summer,
}

impl Season {
    pub const ROTATION: [Season; 4] = [Season::Fall, Season::Winter, Season::Spring, Season::Summer];

    pub fn next(self) -> Season {
        match self {
            Season::Fall => Season::Winter,
            Season::Winter => Season::Spring,
            Season::Spring => Season::Summer,
            Season::Summer => Season::Fall,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Fall => "Fall",
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = TermParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fall" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            _ => Err(TermParseError::UnknownSeason(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermParseError {
    #[error("unknown season '{0}' (expected Fall, Winter, Spring or Summer)")]
    UnknownSeason(String),
    #[error("invalid term '{0}' (expected '<Season> <Year>', e.g. 'Fall 2024')")]
    Malformed(String),
    #[error("year {0} is out of range ({min}-{max})", min = MIN_YEAR, max = MAX_YEAR)]
    YearOutOfRange(i32),
}

/// One academic term. Field order matters: the derived `Ord` compares the
/// year first and then the season in rotation order, which is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term {
    pub year: i32,
    pub season: Season,
}

impl Term {
    pub fn new(season: Season, year: i32) -> Self {
        Term { year, season }
    }

    /// Next term in the rotation (Fall -> Winter -> Spring -> Summer -> Fall of year+1).
    pub fn next(self) -> Term {
        let season = self.season.next();
        let year = if season == Season::Fall { self.year.saturating_add(1) } else { self.year };
        Term { year, season }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

impl FromStr for Term {
    type Err = TermParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(season), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(TermParseError::Malformed(s.to_string()));
        };
        let season = season.parse::<Season>()?;
        let year = year
            .parse::<i32>()
            .map_err(|_| TermParseError::Malformed(s.to_string()))?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(TermParseError::YearOutOfRange(year));
        }
        Ok(Term { year, season })
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Term>().map_err(serde::de::Error::custom)
    }
}

/// `count` consecutive terms starting at `start`.
pub fn generate_term_sequence(start: Term, count: usize) -> Vec<Term> {
    let mut terms = Vec::with_capacity(count);
    let mut current = start;
    for _ in 0..count {
        terms.push(current);
        current = current.next();
    }
    terms
}
