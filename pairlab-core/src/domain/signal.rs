//! Signal: the discrete trade direction shared by every stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-bar trade direction: -1 short/sell, 0 flat, 1 long/buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Short,
    #[default]
    Flat,
    Long,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    /// Map a real-valued score onto a signal by its sign. NaN is flat.
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            Signal::Long
        } else if score < 0.0 {
            Signal::Short
        } else {
            Signal::Flat
        }
    }

    pub fn is_long(self) -> bool {
        self == Signal::Long
    }

    pub fn is_short(self) -> bool {
        self == Signal::Short
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> i8 {
        signal.as_i8()
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Short),
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            other => Err(format!("signal must be -1, 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_score_uses_sign() {
        assert_eq!(Signal::from_score(0.7), Signal::Long);
        assert_eq!(Signal::from_score(-2.0), Signal::Short);
        assert_eq!(Signal::from_score(0.0), Signal::Flat);
        assert_eq!(Signal::from_score(f64::NAN), Signal::Flat);
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Signal::Short).unwrap(), "-1");
        let parsed: Signal = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, Signal::Long);
        assert!(serde_json::from_str::<Signal>("2").is_err());
    }
}
