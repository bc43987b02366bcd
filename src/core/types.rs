use std::fmt;

use serde::{Serialize, Deserialize};

use crate::synthesis::dsl::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transformation,
    SizeChange,
    ValueCreation,
    ValueRemoval,
    PatternManipulation,
    Unknown,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Transformation => "transformation",
            Category::SizeChange => "size_change",
            Category::ValueCreation => "value_creation",
            Category::ValueRemoval => "value_removal",
            Category::PatternManipulation => "pattern_manipulation",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse verdict for a puzzle. A `Transformation` verdict always carries
/// its subtype and full confidence; construct it through
/// [`Classification::transformation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub category: Category,
    pub subtype: Option<Transform>,
    pub confidence: f64,
}

impl Classification {
    pub fn transformation(t: Transform) -> Self {
        Self { category: Category::Transformation, subtype: Some(t), confidence: 1.0 }
    }

    pub fn heuristic(category: Category, confidence: f64) -> Self {
        debug_assert!(category != Category::Transformation);
        Self { category, subtype: None, confidence: confidence.clamp(0.0, 1.0) }
    }

    pub fn unknown() -> Self {
        Self::heuristic(Category::Unknown, 0.0)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.subtype {
            Some(t) => write!(f, "{}({}) @ {:.2}", self.category, t, self.confidence),
            None => write!(f, "{} @ {:.2}", self.category, self.confidence),
        }
    }
}
