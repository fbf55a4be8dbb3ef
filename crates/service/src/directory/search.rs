use models::Profile;
use serde::{Deserialize, Serialize};

/// Directory filters. An empty list means "no constraint" for that dimension.
///
/// A profile matches when it offers at least one of the wanted skills (if any are
/// given) and its city is one of the wanted cities (if any are given). Labels are
/// compared exactly.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub cities: Vec<String>,
}

impl SearchQuery {
    pub fn new<S, C>(skills: S, cities: C) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            skills: clean(skills.into_iter().map(Into::into)),
            cities: clean(cities.into_iter().map(Into::into)),
        }
    }

    /// Build from comma-separated lists, e.g. `?skills=Anglais,SVT&cities=Cocody`.
    ///
    /// A comma always separates labels, so a label that itself contains a comma
    /// cannot be searched this way; use `SearchQuery::new` for those.
    pub fn from_csv(skills: Option<&str>, cities: Option<&str>) -> Self {
        Self::new(split_csv(skills), split_csv(cities))
    }

    pub fn is_unfiltered(&self) -> bool {
        self.skills.is_empty() && self.cities.is_empty()
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        let skill_ok = self.skills.is_empty() || profile.has_any_skill(&self.skills);
        let city_ok = self.cities.is_empty() || self.cities.iter().any(|c| *c == profile.city);
        skill_ok && city_ok
    }
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

fn clean(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.trim();
        if !item.is_empty() && !out.iter().any(|o| o == item) {
            out.push(item.to_string());
        }
    }
    out
}
