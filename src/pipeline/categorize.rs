//! Keyword-based categorization of extracted paper text.

use serde::Serialize;
use std::fmt;

/// Category label assigned to each digest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    /// Control theory, feedback loops, and system dynamics.
    #[serde(rename = "Control Systems")]
    ControlSystems,
    /// Perception from images and camera streams.
    #[serde(rename = "Robot Vision")]
    RobotVision,
    /// Learning-based approaches, including reinforcement learning.
    #[serde(rename = "Robot Learning")]
    RobotLearning,
    /// No rule matched the paper text.
    #[serde(rename = "Uncategorized")]
    Uncategorized,
}

/// Ordered rule table: the first category with a matching keyword wins, so a
/// paper mentioning both feedback control and cameras lands in
/// [`Category::ControlSystems`].
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::ControlSystems,
        &["control", "feedback", "dynamics"],
    ),
    (Category::RobotVision, &["vision", "image", "camera"]),
    (
        Category::RobotLearning,
        &["learning", "reinforcement", "training"],
    ),
];

/// Assign a category by scanning text for rule keywords.
///
/// Matching is case-insensitive substring containment, so "Controllers"
/// matches the `control` keyword. Text matching no rule maps to
/// [`Category::Uncategorized`].
pub fn categorize(text: &str) -> Category {
    let haystack = text.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|keyword| haystack.contains(keyword)) {
            return *category;
        }
    }
    Category::Uncategorized
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ControlSystems => "Control Systems",
            Self::RobotVision => "Robot Vision",
            Self::RobotLearning => "Robot Learning",
            Self::Uncategorized => "Uncategorized",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Control Systems" => Ok(Self::ControlSystems),
            "Robot Vision" => Ok(Self::RobotVision),
            "Robot Learning" => Ok(Self::RobotLearning),
            "Uncategorized" => Ok(Self::Uncategorized),
            _ => Err(()),
        }
    }
}
