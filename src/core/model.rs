use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::core::error::ValidationError;

pub const DEFAULT_TONE: &str = "Professional";
pub const DEFAULT_AUDIENCE: &str = "Investors";

/// A pitch section the backend knows how to write. Declaration order is the
/// order the checkboxes appear in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ElevatorPitch,
    SlideBullets,
    Tagline,
    ValueProposition,
    Competitors,
    RevenueModels,
    SwotAnalysis,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::ElevatorPitch,
        Section::SlideBullets,
        Section::Tagline,
        Section::ValueProposition,
        Section::Competitors,
        Section::RevenueModels,
        Section::SwotAnalysis,
    ];

    /// Wire value, also used as the checkbox `value` attribute.
    pub fn key(self) -> &'static str {
        match self {
            Section::ElevatorPitch => "elevator_pitch",
            Section::SlideBullets => "slide_bullets",
            Section::Tagline => "tagline",
            Section::ValueProposition => "value_proposition",
            Section::Competitors => "competitors",
            Section::RevenueModels => "revenue_models",
            Section::SwotAnalysis => "swot_analysis",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Section::ElevatorPitch => "Elevator Pitch",
            Section::SlideBullets => "Slide Bullets",
            Section::Tagline => "Tagline",
            Section::ValueProposition => "Value Proposition",
            Section::Competitors => "Potential Competitors",
            Section::RevenueModels => "Possible Revenue Models",
            Section::SwotAnalysis => "SWOT Analysis",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub tone: String,
    pub audience: String,
    pub sections: BTreeSet<Section>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            tone: DEFAULT_TONE.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            sections: BTreeSet::new(),
        }
    }
}

/// The value of every form control at one moment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    pub idea: String,
    pub options: GenerationOptions,
}

impl FormState {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.idea.trim().is_empty() {
            return Err(ValidationError::EmptyIdea);
        }
        if self.options.sections.is_empty() {
            return Err(ValidationError::NoSections);
        }
        Ok(())
    }
}

/// One past generation. `id` is the creation time in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub idea: String,
    pub options: GenerationOptions,
    pub pitch: String,
}

impl HistoryEntry {
    pub fn new(idea: &str, options: GenerationOptions, pitch: &str, now: DateTime<Utc>) -> Self {
        let id = now.timestamp_millis();
        // Keep the stored timestamp at the same precision as the id.
        let timestamp = DateTime::from_timestamp_millis(id).unwrap_or(now);
        Self {
            id,
            timestamp,
            idea: idea.to_string(),
            options,
            pitch: pitch.to_string(),
        }
    }

    pub fn form(&self) -> FormState {
        FormState {
            idea: self.idea.clone(),
            options: self.options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(sections: &[Section]) -> GenerationOptions {
        GenerationOptions {
            sections: sections.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_blank_idea() {
        let form = FormState {
            idea: "  \n\t".to_string(),
            options: options(&[Section::Tagline]),
        };
        assert_eq!(form.validate(), Err(ValidationError::EmptyIdea));
    }

    #[test]
    fn test_validate_rejects_missing_sections() {
        let form = FormState {
            idea: "AI fridge".to_string(),
            options: options(&[]),
        };
        assert_eq!(form.validate(), Err(ValidationError::NoSections));
    }

    #[test]
    fn test_options_serialize_sections_in_checkbox_order() {
        let opts = options(&[Section::SwotAnalysis, Section::ElevatorPitch, Section::Tagline]);
        let json = serde_json::to_value(&opts).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "tone": "Professional",
                "audience": "Investors",
                "sections": ["elevator_pitch", "tagline", "swot_analysis"]
            })
        );
    }

    #[test]
    fn test_entry_reads_browser_written_json() {
        let json = r###"{
            "id": 1717000000123,
            "timestamp": "2024-05-29T16:26:40.123Z",
            "idea": "AI fridge",
            "options": {
                "tone": "Casual",
                "audience": "Customers",
                "sections": ["tagline", "competitors"]
            },
            "pitch": "## Tagline\nStay cool"
        }"###;

        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, 1717000000123);
        assert_eq!(entry.timestamp.timestamp_millis(), entry.id);
        assert!(entry.options.sections.contains(&Section::Competitors));
    }

    #[test]
    fn test_section_keys_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_key(section.key()), Some(section));
        }
        assert_eq!(Section::from_key("problem"), None);
    }
}
