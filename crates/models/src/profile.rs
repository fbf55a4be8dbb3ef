use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ModelError;
use crate::timestamp;

/// A tutor's registered record, keyed by `email`.
///
/// Serde field names match the persisted document (`nom`, `telephone`, ...),
/// so existing data files load unchanged.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    #[serde(rename = "nom")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telephone")]
    pub phone: String,
    #[serde(rename = "ville")]
    pub city: String,
    #[serde(rename = "tarif")]
    pub rate: String,
    #[serde(rename = "competences")]
    pub skills: Vec<String>,
    #[serde(default, with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(rename = "date_inscription", with = "timestamp::minute")]
    pub registered_at: NaiveDateTime,
}

/// Registration form as submitted by a tutor.
/// Missing fields deserialize as empty so `validate` can report them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProfileInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub rate: String,
    pub skills: Vec<String>,
    pub description: Option<String>,
}

impl ProfileInput {
    /// Trim every text field, drop blank skills and repeated skills (first occurrence wins),
    /// and turn a blank description into `None`.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            city: self.city.trim().to_string(),
            rate: self.rate.trim().to_string(),
            skills: dedup_skills(self.skills),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }

    /// Required fields: name, email, phone and at least one skill.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.email.trim().is_empty() {
            missing.push("email");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.skills.iter().all(|s| s.trim().is_empty()) {
            missing.push("skills");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ModelError::Validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }
}

impl Profile {
    /// Build a profile from a submitted form. The input is normalized and validated first.
    pub fn from_input(input: ProfileInput, registered_at: NaiveDateTime) -> Result<Self, ModelError> {
        let input = input.normalized();
        input.validate()?;
        Ok(Self {
            name: input.name,
            email: input.email,
            phone: input.phone,
            city: input.city,
            rate: input.rate,
            skills: input.skills,
            description: input.description,
            registered_at: timestamp::truncate_to_minute(registered_at),
        })
    }

    /// Check a record read back from storage against its map key.
    ///
    /// Looser than `validate`: older data files hold untrimmed values, so only
    /// truly empty required fields are refused.
    pub fn check_persisted(&self, key: &str) -> Result<(), ModelError> {
        if self.email != key {
            return Err(ModelError::Validation(format!(
                "record keyed {key:?} carries email {:?}",
                self.email
            )));
        }
        if self.name.is_empty() || self.phone.is_empty() {
            return Err(ModelError::Validation(format!("record {key:?} has empty name or phone")));
        }
        if self.skills.is_empty() {
            return Err(ModelError::Validation(format!("record {key:?} has no skills")));
        }
        Ok(())
    }

    pub fn has_any_skill(&self, wanted: &[String]) -> bool {
        self.skills.iter().any(|s| wanted.contains(s))
    }
}

fn dedup_skills(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() && !out.iter().any(|s| s == skill) {
            out.push(skill.to_string());
        }
    }
    out
}

/// Absent descriptions are stored as `""`; `""` and `null` both read back as `None`.
mod empty_as_none {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> ProfileInput {
        ProfileInput {
            name: " Jean Kouadio ".into(),
            email: "jean@example.com".into(),
            phone: "+225 01 23 45 67".into(),
            city: "Abidjan".into(),
            rate: "3000/h".into(),
            skills: vec!["Mathématiques".into(), "Anglais".into(), "Mathématiques".into(), " ".into()],
            description: Some("   ".into()),
        }
    }

    #[test]
    fn from_input_normalizes_fields() -> Result<(), anyhow::Error> {
        let at = timestamp::parse("2025-01-02 10:30")?;
        let p = Profile::from_input(input(), at)?;
        assert_eq!(p.name, "Jean Kouadio");
        assert_eq!(p.skills, vec!["Mathématiques".to_string(), "Anglais".to_string()]);
        assert_eq!(p.description, None);
        assert_eq!(p.registered_at, at);
        Ok(())
    }

    #[test]
    fn validate_lists_every_missing_field() {
        let err = ProfileInput { skills: vec![], ..Default::default() }.validate().unwrap_err();
        let msg = err.to_string();
        for field in ["name", "email", "phone", "skills"] {
            assert!(msg.contains(field), "{msg} should mention {field}");
        }
    }

    #[test]
    fn city_rate_and_description_are_optional() {
        let form = ProfileInput {
            name: "A".into(),
            email: "a@x.com".into(),
            phone: "1".into(),
            skills: vec!["SVT".into()],
            ..Default::default()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn persisted_layout_uses_document_field_names() -> Result<(), anyhow::Error> {
        let p = Profile::from_input(input(), timestamp::parse("2025-01-02 10:30")?)?;
        let v = serde_json::to_value(&p)?;
        assert_eq!(
            v,
            json!({
                "nom": "Jean Kouadio",
                "email": "jean@example.com",
                "telephone": "+225 01 23 45 67",
                "ville": "Abidjan",
                "tarif": "3000/h",
                "competences": ["Mathématiques", "Anglais"],
                "description": "",
                "date_inscription": "2025-01-02 10:30"
            })
        );
        let back: Profile = serde_json::from_value(v)?;
        assert_eq!(back, p);
        Ok(())
    }

    #[test]
    fn null_description_reads_as_none() -> Result<(), anyhow::Error> {
        let p: Profile = serde_json::from_value(json!({
            "nom": "B", "email": "b@x.com", "telephone": "2", "ville": "Cocody",
            "tarif": "", "competences": ["Français"], "description": null,
            "date_inscription": "2024-12-31 23:59"
        }))?;
        assert_eq!(p.description, None);
        Ok(())
    }

    #[test]
    fn missing_field_is_rejected() {
        let res: Result<Profile, _> = serde_json::from_value(json!({
            "nom": "B", "email": "b@x.com", "ville": "Cocody",
            "tarif": "", "competences": ["Français"], "description": "",
            "date_inscription": "2024-12-31 23:59"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn check_persisted_catches_key_mismatch() -> Result<(), anyhow::Error> {
        let p = Profile::from_input(input(), timestamp::now_minute())?;
        assert!(p.check_persisted("jean@example.com").is_ok());
        assert!(p.check_persisted("other@example.com").is_err());
        Ok(())
    }

    #[test]
    fn check_persisted_tolerates_untrimmed_values() -> Result<(), anyhow::Error> {
        let mut p = Profile::from_input(input(), timestamp::now_minute())?;
        p.name = "  ".into();
        assert!(p.check_persisted("jean@example.com").is_ok());
        p.phone.clear();
        assert!(p.check_persisted("jean@example.com").is_err());
        Ok(())
    }
}
