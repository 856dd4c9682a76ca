use crate::query::{CmpOp, Filter};
use bson::Bson;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Fixed filter configuration for a named rescue-suitability query.
/// The table is static; profiles are not editable at runtime.
#[derive(Debug, Clone)]
pub struct RescueProfile {
    pub name: &'static str,
    pub breeds: &'static [&'static str],
    pub sex: &'static str,
    /// Inclusive age bounds, in weeks.
    pub age_min_weeks: i64,
    pub age_max_weeks: i64,
}

static PROFILES: Lazy<Vec<RescueProfile>> = Lazy::new(|| {
    vec![
        RescueProfile {
            name: "Water Rescue",
            breeds: &["Labrador Retriever Mix", "Chesapeake Bay Retriever", "Newfoundland"],
            sex: "Intact Female",
            age_min_weeks: 26,
            age_max_weeks: 156,
        },
        RescueProfile {
            name: "Mountain Rescue",
            breeds: &[
                "German Shepherd",
                "Alaskan Malamute",
                "Old English Sheepdog",
                "Siberian Husky",
                "Rottweiler",
            ],
            sex: "Intact Male",
            age_min_weeks: 26,
            age_max_weeks: 156,
        },
        RescueProfile {
            name: "Disaster Rescue",
            breeds: &[
                "Doberman Pinscher",
                "German Shepherd",
                "Golden Retriever",
                "Bloodhound",
                "Rottweiler",
            ],
            sex: "Intact Male",
            age_min_weeks: 20,
            age_max_weeks: 300,
        },
    ]
});

/// Looks up a profile by its exact name.
#[must_use]
pub fn profile_for(name: &str) -> Option<&'static RescueProfile> {
    PROFILES.iter().find(|p| p.name == name)
}

impl RescueProfile {
    /// The match predicate this profile prepends to the stats pipeline.
    #[must_use]
    pub fn filter(&self) -> Filter {
        Filter::And(vec![
            Filter::In {
                path: "breed".into(),
                values: self.breeds.iter().map(|b| Bson::String((*b).to_string())).collect(),
            },
            Filter::Cmp {
                path: "sex_upon_outcome".into(),
                op: CmpOp::Eq,
                value: Bson::String(self.sex.to_string()),
            },
            Filter::Cmp {
                path: "age_upon_outcome_in_weeks".into(),
                op: CmpOp::Gte,
                value: Bson::Int64(self.age_min_weeks),
            },
            Filter::Cmp {
                path: "age_upon_outcome_in_weeks".into(),
                op: CmpOp::Lte,
                value: Bson::Int64(self.age_max_weeks),
            },
        ])
    }
}

/// Aggregated statistics over the (possibly profile-filtered) record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescueStats {
    pub total_animals: u64,
    pub avg_age: f64,
    /// Distinct breeds present, sorted lexicographically.
    pub breeds: Vec<String>,
}

impl Default for RescueStats {
    fn default() -> Self {
        Self { total_animals: 0, avg_age: 0.0, breeds: Vec::new() }
    }
}
