//! The six interest categories.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RiasecError;

/// A Holland interest category.
///
/// Declaration order (R, I, A, S, E, C) is the enumeration order used for
/// every deterministic tie-break in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Realistic.
    R,
    /// Investigative.
    I,
    /// Artistic.
    A,
    /// Social.
    S,
    /// Enterprising.
    E,
    /// Conventional.
    C,
}

impl Category {
    /// All categories in enumeration order.
    pub const ALL: [Category; 6] = [
        Category::R,
        Category::I,
        Category::A,
        Category::S,
        Category::E,
        Category::C,
    ];

    /// One-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Category::R => "R",
            Category::I => "I",
            Category::A => "A",
            Category::S => "S",
            Category::E => "E",
            Category::C => "C",
        }
    }

    /// English name.
    pub fn english_name(&self) -> &'static str {
        match self {
            Category::R => "Realistic",
            Category::I => "Investigative",
            Category::A => "Artistic",
            Category::S => "Social",
            Category::E => "Enterprising",
            Category::C => "Conventional",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Category {
    type Err = RiasecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "R" | "REALISTIC" => Ok(Category::R),
            "I" | "INVESTIGATIVE" => Ok(Category::I),
            "A" | "ARTISTIC" => Ok(Category::A),
            "S" | "SOCIAL" => Ok(Category::S),
            "E" | "ENTERPRISING" => Ok(Category::E),
            "C" | "CONVENTIONAL" => Ok(Category::C),
            other => Err(RiasecError::other(format!("Unknown category: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_order() {
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
        assert!(Category::R < Category::C);
    }

    #[test]
    fn test_parse() {
        assert_eq!("r".parse::<Category>().unwrap(), Category::R);
        assert_eq!("Social".parse::<Category>().unwrap(), Category::S);
        assert!("X".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_uses_letter_codes() {
        let json = serde_json::to_string(&Category::E).unwrap();
        assert_eq!(json, "\"E\"");
        let back: Category = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(back, Category::C);
    }
}
