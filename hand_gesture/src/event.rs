//! The closed set of gesture labels.
//!
//! The wire form of a gesture is its label, verbatim (`"FIST"`), so
//! `Display`, `FromStr` and serde all agree on the same spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A gesture recognised by the [`Classifier`](crate::Classifier).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureEvent {
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    Pinch,
    OpenPalm,
    Fist,
}

impl GestureEvent {
    pub const ALL: [GestureEvent; 7] = [
        GestureEvent::SwipeLeft,
        GestureEvent::SwipeRight,
        GestureEvent::SwipeUp,
        GestureEvent::SwipeDown,
        GestureEvent::Pinch,
        GestureEvent::OpenPalm,
        GestureEvent::Fist,
    ];

    /// Label sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SwipeLeft  => "SWIPE_LEFT",
            Self::SwipeRight => "SWIPE_RIGHT",
            Self::SwipeUp    => "SWIPE_UP",
            Self::SwipeDown  => "SWIPE_DOWN",
            Self::Pinch      => "PINCH",
            Self::OpenPalm   => "OPEN_PALM",
            Self::Fist       => "FIST",
        }
    }

    pub fn is_swipe(&self) -> bool {
        matches!(
            self,
            Self::SwipeLeft | Self::SwipeRight | Self::SwipeUp | Self::SwipeDown
        )
    }
}

impl fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gesture label {0:?}")]
pub struct ParseGestureError(pub String);

impl FromStr for GestureEvent {
    type Err = ParseGestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GestureEvent::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ParseGestureError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_serde_names() {
        for g in GestureEvent::ALL {
            let json = serde_json::to_string(&g).unwrap();
            assert_eq!(json, format!("\"{}\"", g.as_str()));
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!("OPEN_PALM".parse::<GestureEvent>(), Ok(GestureEvent::OpenPalm));
        assert!("open_palm".parse::<GestureEvent>().is_err());
        assert_eq!(
            "WAVE".parse::<GestureEvent>(),
            Err(ParseGestureError("WAVE".to_string()))
        );
    }

    #[test]
    fn swipe_family() {
        let swipes: Vec<_> = GestureEvent::ALL.into_iter().filter(|g| g.is_swipe()).collect();
        assert_eq!(swipes.len(), 4);
        assert!(!GestureEvent::Pinch.is_swipe());
    }
}
