use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Render color for cancelled subscriptions. Never stored on a record.
pub(crate) const MUTED_GRAY: (u8, u8, u8) = (0x9C, 0xA3, 0xAF);

/// The fixed set of colors a subscription can be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) enum PaletteColor {
    Red,
    Amber,
    Emerald,
    Blue,
    Indigo,
    Violet,
    Pink,
    Teal,
}

impl PaletteColor {
    pub(crate) fn all() -> &'static [PaletteColor] {
        &[
            Self::Red,
            Self::Amber,
            Self::Emerald,
            Self::Blue,
            Self::Indigo,
            Self::Violet,
            Self::Pink,
            Self::Teal,
        ]
    }

    pub(crate) fn hex(&self) -> &'static str {
        match self {
            Self::Red => "#EF4444",
            Self::Amber => "#F59E0B",
            Self::Emerald => "#10B981",
            Self::Blue => "#3B82F6",
            Self::Indigo => "#6366F1",
            Self::Violet => "#8B5CF6",
            Self::Pink => "#EC4899",
            Self::Teal => "#14B8A6",
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Amber => "amber",
            Self::Emerald => "emerald",
            Self::Blue => "blue",
            Self::Indigo => "indigo",
            Self::Violet => "violet",
            Self::Pink => "pink",
            Self::Teal => "teal",
        }
    }

    pub(crate) fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Red => (0xEF, 0x44, 0x44),
            Self::Amber => (0xF5, 0x9E, 0x0B),
            Self::Emerald => (0x10, 0xB9, 0x81),
            Self::Blue => (0x3B, 0x82, 0xF6),
            Self::Indigo => (0x63, 0x66, 0xF1),
            Self::Violet => (0x8B, 0x5C, 0xF6),
            Self::Pink => (0xEC, 0x48, 0x99),
            Self::Teal => (0x14, 0xB8, 0xA6),
        }
    }

    /// Accepts either the hex value (any case, `#` optional) or the color name.
    pub(crate) fn parse(s: &str) -> Result<Self, ValidationError> {
        let wanted = s.trim().trim_start_matches('#').to_ascii_lowercase();
        Self::all()
            .iter()
            .find(|c| c.name() == wanted || c.hex()[1..].eq_ignore_ascii_case(&wanted))
            .copied()
            .ok_or_else(|| ValidationError::InvalidColor(s.to_string()))
    }

    pub(crate) fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *Self::all().choose(rng).unwrap_or(&Self::Blue)
    }

    /// Next color in palette order, wrapping around. `step` may be negative.
    pub(crate) fn cycled(&self, step: i32) -> Self {
        let all = Self::all();
        let len = all.len() as i32;
        let idx = all.iter().position(|c| c == self).unwrap_or(0) as i32;
        all[(idx + step).rem_euclid(len) as usize]
    }
}

impl std::fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl TryFrom<String> for PaletteColor {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PaletteColor> for String {
    fn from(color: PaletteColor) -> Self {
        color.hex().to_string()
    }
}
