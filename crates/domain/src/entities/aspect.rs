//! Aspect entity - raid-reward item subtypes with tiered passive effects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The five playable classes an aspect can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Archer,
    Warrior,
    Mage,
    Assassin,
    Shaman,
}

impl AspectClass {
    pub fn display_name(&self) -> &'static str {
        match self {
            AspectClass::Archer => "Archer",
            AspectClass::Warrior => "Warrior",
            AspectClass::Mage => "Mage",
            AspectClass::Assassin => "Assassin",
            AspectClass::Shaman => "Shaman",
        }
    }

    /// Lowercase name as used in API paths.
    pub fn api_name(&self) -> &'static str {
        match self {
            AspectClass::Archer => "archer",
            AspectClass::Warrior => "warrior",
            AspectClass::Mage => "mage",
            AspectClass::Assassin => "assassin",
            AspectClass::Shaman => "shaman",
        }
    }

    /// All classes in a stable order.
    pub fn all() -> [AspectClass; 5] {
        [
            AspectClass::Archer,
            AspectClass::Warrior,
            AspectClass::Mage,
            AspectClass::Assassin,
            AspectClass::Shaman,
        ]
    }
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AspectClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "archer" => Ok(Self::Archer),
            "warrior" => Ok(Self::Warrior),
            "mage" => Ok(Self::Mage),
            "assassin" => Ok(Self::Assassin),
            "shaman" => Ok(Self::Shaman),
            _ => Err(DomainError::parse(format!("Unknown class: {s}"))),
        }
    }
}

/// Aspect rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRarity {
    Mythic,
    Fabled,
    Legendary,
}

impl AspectRarity {
    /// Lowercase name as used in API paths and storage.
    pub fn api_name(&self) -> &'static str {
        match self {
            AspectRarity::Mythic => "mythic",
            AspectRarity::Fabled => "fabled",
            AspectRarity::Legendary => "legendary",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AspectRarity::Mythic => "Mythic",
            AspectRarity::Fabled => "Fabled",
            AspectRarity::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for AspectRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AspectRarity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mythic" => Ok(Self::Mythic),
            "fabled" => Ok(Self::Fabled),
            "legendary" => Ok(Self::Legendary),
            _ => Err(DomainError::parse(format!("Unknown rarity: {s}"))),
        }
    }
}

/// One unlockable tier of an aspect's passive effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectTier {
    /// How many copies of the aspect are needed to reach this tier.
    pub threshold: u32,
    pub description: String,
}

/// An aspect: a class-bound raid reward with tiered passive effects.
///
/// Data-carrying struct with no invariants to protect; any combination of
/// values is a valid aspect, so all fields are public.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub name: String,
    pub class: AspectClass,
    pub rarity: AspectRarity,
    pub icon: Option<String>,
    /// Class ability tree the aspect requires, if any.
    pub required_ability: Option<String>,
    pub tiers: Vec<AspectTier>,
}

/// Filter for listing aspects. An empty filter means "list all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AspectFilter {
    pub class: Option<AspectClass>,
    pub rarity: Option<AspectRarity>,
}

impl AspectFilter {
    pub fn is_empty(&self) -> bool {
        self.class.is_none() && self.rarity.is_none()
    }

    pub fn matches(&self, aspect: &Aspect) -> bool {
        self.class.is_none_or(|c| c == aspect.class)
            && self.rarity.is_none_or(|r| r == aspect.rarity)
    }
}
