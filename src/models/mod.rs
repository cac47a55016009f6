//! Data models for Sommelier entities.
//!
//! This module defines the core data structures:
//! - `WineReport` - The full sommelier report for one analyzed wine
//! - `WineMatch` - A lightweight disambiguation candidate
//! - `CellarItem` - A quantity-tracked holding of a wine in the cellar
//! - `Toast` - Transient feedback attached to command results
//!
//! All persisted and wire types serialize as camelCase JSON: the shape is
//! fixed by the sommelier model's response contract, and the on-disk
//! collections reuse it unchanged.

pub mod ranges;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// A critic score as reported by the model (score kept as free text, e.g. "95/100").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticScore {
    pub critic: String,
    pub score: String,
}

/// Vineyard conditions for the wine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Terroir {
    #[serde(default)]
    pub soil: Vec<String>,

    #[serde(default)]
    pub oak: String,

    #[serde(default)]
    pub farming: Vec<String>,
}

/// Structural tasting profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub acidity: String,

    #[serde(default)]
    pub tannins: String,
}

/// One vintage's quality score (0-100) in the comparison trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VintageScore {
    pub year: String,

    pub score: f64,

    #[serde(default)]
    pub notes: String,
}

/// Aging and investment outlook. `peak_years` stays free text ("YYYY-YYYY")
/// at this layer; parse it through [`ranges::YearRange`] at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aging {
    #[serde(default)]
    pub drink_from: String,

    #[serde(default)]
    pub drink_until: String,

    #[serde(default)]
    pub peak_years: String,

    #[serde(default)]
    pub investment_potential: String,

    #[serde(default)]
    pub estimated_value_5_years: String,
}

/// Serving suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    #[serde(default)]
    pub foods: Vec<String>,

    #[serde(default)]
    pub temperature: String,

    #[serde(default)]
    pub decanting: String,

    #[serde(default)]
    pub glassware: String,
}

/// A celebrated past vintage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendaryVintage {
    pub year: String,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub awards: Vec<String>,
}

/// The model has returned `bestVintages` both as rich objects and as a plain
/// list of year strings; accept either shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BestVintage {
    Rich(LegendaryVintage),
    Year(String),
}

impl BestVintage {
    /// The vintage year regardless of shape.
    pub fn year(&self) -> &str {
        match self {
            BestVintage::Rich(v) => &v.year,
            BestVintage::Year(y) => y,
        }
    }
}

/// Estimated share of one grape in the blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrapeShare {
    pub grape: String,
    pub percentage: f64,
}

/// A similar-wine suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,

    #[serde(default)]
    pub reason: String,
}

/// A label term and its meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTerm {
    pub term: String,
    pub definition: String,
}

/// Native and phonetic pronunciation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pronunciation {
    #[serde(default)]
    pub native: String,

    #[serde(default)]
    pub phonetic: String,
}

/// Regional background for the curious drinker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub climate: String,

    #[serde(default)]
    pub geography: String,

    #[serde(default)]
    pub vibe: String,

    #[serde(default)]
    pub label_terms: Vec<LabelTerm>,

    #[serde(default)]
    pub pronunciation: Pronunciation,
}

/// The full sommelier report for one wine.
///
/// Produced by the model at analysis time. Every field except the user
/// overlay (`user_rating`, `user_notes`) is treated as an immutable fact
/// about the wine; `id` is the join key across the current slot, the
/// history list, and cellar items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineReport {
    /// Unique identifier (e.g., "som-a1b2"), stamped after parsing.
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub vintage: String,

    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub region: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_region: Option<String>,

    #[serde(default)]
    pub varietals: Vec<String>,

    /// Broad style, e.g. "Red", "Pinot Noir".
    #[serde(rename = "type", default)]
    pub wine_type: String,

    #[serde(default)]
    pub abv: String,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub nose: String,

    #[serde(default)]
    pub taste: String,

    #[serde(default)]
    pub closure: String,

    #[serde(default)]
    pub size: String,

    /// Market price range as free text, e.g. "$50 - $80". Parse through
    /// [`ranges::PriceRange`]; never interpret this string elsewhere.
    #[serde(default)]
    pub market_price: String,

    #[serde(default)]
    pub winery_info: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_image: Option<String>,

    #[serde(default)]
    pub image_candidates: Vec<String>,

    #[serde(default)]
    pub awards: Vec<String>,

    #[serde(default)]
    pub fun_facts: Vec<String>,

    #[serde(default)]
    pub best_vintages: Vec<BestVintage>,

    /// Grounding attributions collected from the model response.
    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub critic_scores: Vec<CriticScore>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terroir: Option<Terroir>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_profile: Option<StyleProfile>,

    #[serde(default)]
    pub vintage_comparison: Vec<VintageScore>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aging: Option<Aging>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pairing: Option<Pairing>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grape_composition: Option<Vec<GrapeShare>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Suggestion>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Education>,

    /// User star rating, 0-5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<u8>,

    /// Free-text personal notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_notes: Option<String>,

    /// When the analysis ran; stamped alongside `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl WineReport {
    /// Two reports describe the same wine when name and vintage match.
    /// This is the history de-dup key and the cellar merge key; record
    /// identity (`id`) stays distinct because each analysis run is its
    /// own snapshot.
    pub fn same_wine(&self, other: &WineReport) -> bool {
        self.name == other.name && self.vintage == other.vintage
    }

    /// Headline critic score, if any.
    pub fn headline_score(&self) -> Option<&str> {
        self.critic_scores.first().map(|c| c.score.as_str())
    }
}

/// A lightweight match candidate for disambiguation searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineMatch {
    pub name: String,
    pub vintage: String,
    pub region: String,
}

/// A quantity-tracked holding of a wine in the user's cellar.
///
/// `id` is a synthetic instance id distinct from `wine.id`: the same wine
/// could in principle be tracked as separate acquisitions, though the add
/// merge policy collapses on (name, vintage) in practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarItem {
    /// Unique instance identifier (e.g., "somc-c3d4").
    pub id: String,

    pub wine: WineReport,

    pub quantity: u32,

    /// Per-bottle purchase price; latest add wins on merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,

    pub added_at: DateTime<Utc>,
}

impl CellarItem {
    /// Create a new cellar item wrapping the given wine.
    pub fn new(wine: WineReport, quantity: u32, purchase_price: Option<f64>) -> Self {
        let id = generate_id("somc", &wine.id);
        Self {
            id,
            wine,
            quantity,
            purchase_price,
            added_at: Utc::now(),
        }
    }
}

/// Feedback category for a [`Toast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Info,
}

/// Transient feedback attached to a command result. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: String,
    pub text: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            kind: ToastKind::Success,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            kind: ToastKind::Info,
        }
    }
}

/// Generate a unique ID for a wine report or cellar item.
///
/// Format: `<prefix>-<4 hex chars>`, hashed from the seed plus the creation
/// time so the same wine analyzed twice gets distinct record ids.
/// - Wine report prefix: "som", seeded with "name|vintage"
/// - Cellar item prefix: "somc", seeded with the wrapped wine's id
pub fn generate_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..4])
}

/// Validate that an ID matches the expected format.
pub fn validate_id(id: &str, prefix: &str) -> Result<()> {
    if !id.starts_with(&format!("{}-", prefix)) {
        return Err(Error::InvalidId(format!(
            "ID must start with '{}-', got: {}",
            prefix, id
        )));
    }

    let suffix = &id[prefix.len() + 1..];
    if suffix.len() != 4 || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidId(format!(
            "ID suffix must be 4 hex characters, got: {}",
            suffix
        )));
    }

    Ok(())
}
