//! Weight entity - community-authored scoring formulas over item rolls.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::WeightId;

/// Fraction sums are accepted within this tolerance of 1.0.
const SUM_TOLERANCE: f64 = 1e-6;

/// A community-authored weighting of an item's identifications.
///
/// Each identification carries a fraction of the total score; the fractions
/// must sum to one. Scoring an item roll multiplies each identification's
/// roll quality (0 = worst possible roll, 1 = best) by its fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub id: WeightId,
    pub item_name: String,
    pub weight_name: String,
    pub author: String,
    pub description: Option<String>,
    /// Identification name -> fraction of the total score, each in [0, 1].
    pub identifications: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming payload for creating or updating a weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightDraft {
    pub item_name: String,
    pub weight_name: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    pub identifications: BTreeMap<String, f64>,
}

impl WeightDraft {
    /// Check the draft's invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.item_name.trim().is_empty() {
            return Err(DomainError::validation("item_name cannot be empty"));
        }
        if self.weight_name.trim().is_empty() {
            return Err(DomainError::validation("weight_name cannot be empty"));
        }
        if self.identifications.is_empty() {
            return Err(DomainError::validation(
                "a weight needs at least one identification",
            ));
        }
        for (ident, fraction) in &self.identifications {
            if !(0.0..=1.0).contains(fraction) || !fraction.is_finite() {
                return Err(DomainError::validation(format!(
                    "fraction for {ident} must be in [0, 1], got {fraction}"
                )));
            }
        }
        let sum: f64 = self.identifications.values().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(DomainError::validation(format!(
                "identification fractions must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

/// Per-identification contributions and the resulting score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Overall score as a percentage, rounded to two decimals.
    pub score: f64,
    /// Identification name -> contributed percentage points.
    pub contributions: BTreeMap<String, f64>,
}

impl Weight {
    /// Build a new weight from a validated draft.
    pub fn from_draft(draft: WeightDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        draft.validate()?;
        Ok(Self {
            id: WeightId::new(),
            item_name: draft.item_name,
            weight_name: draft.weight_name,
            author: draft.author,
            description: draft.description,
            identifications: draft.identifications,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the weight's contents from a validated draft, keeping identity
    /// and creation time.
    pub fn apply_draft(&mut self, draft: WeightDraft, now: DateTime<Utc>) -> Result<(), DomainError> {
        draft.validate()?;
        self.item_name = draft.item_name;
        self.weight_name = draft.weight_name;
        self.author = draft.author;
        self.description = draft.description;
        self.identifications = draft.identifications;
        self.updated_at = now;
        Ok(())
    }

    /// Score a roll against this weight.
    ///
    /// `qualities` maps identification names to roll qualities in [0, 1].
    /// Identifications present in the weight but missing from the roll score
    /// zero; extra entries in `qualities` are ignored.
    pub fn score(&self, qualities: &BTreeMap<String, f64>) -> Result<ScoreBreakdown, DomainError> {
        for (ident, quality) in qualities {
            if !(0.0..=1.0).contains(quality) || !quality.is_finite() {
                return Err(DomainError::validation(format!(
                    "roll quality for {ident} must be in [0, 1], got {quality}"
                )));
            }
        }

        let mut contributions = BTreeMap::new();
        let mut total = 0.0;
        for (ident, fraction) in &self.identifications {
            let quality = qualities.get(ident).copied().unwrap_or(0.0);
            let points = fraction * quality * 100.0;
            total += points;
            contributions.insert(ident.clone(), round2(points));
        }

        Ok(ScoreBreakdown {
            score: round2(total),
            contributions,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
