//! Suggested values offered by registration and search forms.
//!
//! Suggestions only: free-form skills and cities are accepted everywhere.

use serde::Serialize;

pub const SUGGESTED_SKILLS: &[&str] = &[
    "Mathématiques", "Français", "Anglais", "Physique",
    "Chimie", "Informatique", "SVT", "Histoire",
    "Géographie", "Lecture", "Autre",
];

pub const SUGGESTED_CITIES: &[&str] = &["Abidjan", "Bingerville", "Cocody", "Yamoussoukro", "Autre"];

/// Placeholder entry meaning "type your own value".
pub const OTHER: &str = "Autre";

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Catalog {
    pub skills: Vec<String>,
    pub cities: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            skills: SUGGESTED_SKILLS.iter().map(|s| s.to_string()).collect(),
            cities: SUGGESTED_CITIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Catalog {
    /// Search forms do not offer the "Autre" placeholder.
    pub fn searchable(&self) -> Self {
        Self {
            skills: self.skills.iter().filter(|s| *s != OTHER).cloned().collect(),
            cities: self.cities.iter().filter(|c| *c != OTHER).cloned().collect(),
        }
    }
}
