use serde::{Deserialize, Serialize};
use std::fmt;

/// Preset coding widths, in symbols.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Width {
    /// 8 symbols.
    _8,
    /// 16 symbols.
    _16,
    /// 32 symbols.
    _32,
    /// 64 symbols.
    _64,
}

impl Width {
    /// Every preset, narrowest first.
    pub const ALL: [Self; 4] = [Self::_8, Self::_16, Self::_32, Self::_64];

    /// Symbols combined per coded symbol.
    #[must_use]
    pub const fn symbols(self) -> usize {
        match self {
            Self::_8 => 8,
            Self::_16 => 16,
            Self::_32 => 32,
            Self::_64 => 64,
        }
    }

    /// The preset with exactly `value` symbols.
    #[must_use]
    pub const fn from_value(value: usize) -> Option<Self> {
        match value {
            8 => Some(Self::_8),
            16 => Some(Self::_16),
            32 => Some(Self::_32),
            64 => Some(Self::_64),
            _ => None,
        }
    }
}

impl From<Width> for usize {
    fn from(width: Width) -> Self {
        width.symbols()
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "width {}", self.symbols())
    }
}
