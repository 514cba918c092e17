//! # Pitch Requests
//!
//! The immutable input of a battle and everything derived from it:
//! persona context, template variables for the crews, and the jury's
//! [`EvaluationInput`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::swarm::slots::{self, Snapshot};

/// Variables substituted into task templates (`{name}`, `{industry}`, ...)
pub type TemplateInputs = BTreeMap<String, String>;

/// Industry (normalized) -> persona context injected into agent input
const PERSONA_CONTEXTS: &[(&str, &str)] = &[
    (
        "fnb",
        "You are a veteran with 30 years in the food & beverage industry.",
    ),
    (
        "healthcare",
        "You are a healthcare industry executive with 25 years of experience.",
    ),
];

/// Industries offered by the form dropdown
pub const COMMON_INDUSTRIES: [&str; 13] = [
    "Food & Beverage",
    "Hospitality",
    "Healthcare",
    "Fintech",
    "Education",
    "Manufacturing",
    "Green Energy",
    "Retail & E-Commerce",
    "Transportation & Mobility",
    "Entertainment & Media",
    "Real Estate & PropTech",
    "Software",
    "Other",
];

/// Resolve the persona context for an industry.
///
/// Matching is case-insensitive; unknown industries resolve to `""`.
pub fn persona_context(industry: &str) -> &'static str {
    let key = industry.trim().to_lowercase();
    PERSONA_CONTEXTS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, context)| *context)
        .unwrap_or("")
}

/// Which of the two pitch packages a pipeline run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variation {
    First,
    Second,
}

impl Variation {
    /// Both variations, in execution order
    pub fn all() -> [Variation; 2] {
        [Variation::First, Variation::Second]
    }

    /// The discriminant handed to the agents (1 or 2)
    pub fn number(self) -> u8 {
        match self {
            Variation::First => 1,
            Variation::Second => 2,
        }
    }

    /// First output slot owned by this variation
    pub fn slot_offset(self) -> usize {
        match self {
            Variation::First => slots::V1_PITCH,
            Variation::Second => slots::V2_PITCH,
        }
    }
}

/// Raw form input, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchForm {
    pub startup_name: String,
    pub industry: String,
    pub mission: String,
    pub product: String,
    pub target_market: String,
    pub funding_stage: String,
}

/// Required form fields that were left blank
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required fields: {}", .missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl PitchForm {
    /// Check that every field carries non-whitespace text.
    ///
    /// All blank fields are reported at once, in form order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("Startup Name", &self.startup_name),
            ("Industry", &self.industry),
            ("Mission", &self.mission),
            ("Product", &self.product),
            ("Target Market", &self.target_market),
            ("Funding Stage", &self.funding_stage),
        ];

        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Validate and build the request for variation 1
    pub fn into_request(self) -> Result<PitchRequest, ValidationError> {
        self.validate()?;
        Ok(PitchRequest::new(self))
    }
}

/// Immutable input of a battle run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRequest {
    pub startup_name: String,
    pub industry: String,
    pub mission: String,
    pub product: String,
    pub target_market: String,
    pub funding_stage: String,
    /// Derived from `industry` once, at construction
    pub persona_context: String,
    pub variation: Variation,
}

impl PitchRequest {
    /// Build the variation-1 request. Assumes the form was validated.
    pub fn new(form: PitchForm) -> Self {
        let persona_context = persona_context(&form.industry).to_string();
        Self {
            startup_name: form.startup_name,
            industry: form.industry,
            mission: form.mission,
            product: form.product,
            target_market: form.target_market,
            funding_stage: form.funding_stage,
            persona_context,
            variation: Variation::First,
        }
    }

    /// Same request, different discriminant. The persona is not looked up again.
    pub fn with_variation(&self, variation: Variation) -> Self {
        Self {
            variation,
            ..self.clone()
        }
    }

    /// Variables for the pitch crew's task templates
    pub fn template_inputs(&self) -> TemplateInputs {
        [
            ("name", self.startup_name.clone()),
            ("industry", self.industry.clone()),
            ("mission", self.mission.clone()),
            ("product", self.product.clone()),
            ("target_market", self.target_market.clone()),
            ("initial_funding", self.funding_stage.clone()),
            ("plugin_context", self.persona_context.clone()),
            ("variation", self.variation.number().to_string()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }
}

/// Read-only view of both finished variations, handed to the jury
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub startup: String,
    pub variation_1_pitch: String,
    pub variation_1_financials: String,
    pub variation_1_engineering: String,
    pub variation_2_pitch: String,
    pub variation_2_financials: String,
    pub variation_2_engineering: String,
}

impl EvaluationInput {
    /// Assemble from slots 0..=5 of a snapshot. Pure.
    pub fn from_slots(startup: &str, snapshot: &Snapshot) -> Self {
        Self {
            startup: startup.to_string(),
            variation_1_pitch: snapshot[slots::V1_PITCH].to_string(),
            variation_1_financials: snapshot[slots::V1_FINANCIALS].to_string(),
            variation_1_engineering: snapshot[slots::V1_ENGINEERING].to_string(),
            variation_2_pitch: snapshot[slots::V2_PITCH].to_string(),
            variation_2_financials: snapshot[slots::V2_FINANCIALS].to_string(),
            variation_2_engineering: snapshot[slots::V2_ENGINEERING].to_string(),
        }
    }

    /// Variables for the jury crew's task template
    pub fn template_inputs(&self) -> TemplateInputs {
        [
            ("startup", &self.startup),
            ("variation_1_pitch", &self.variation_1_pitch),
            ("variation_1_financials", &self.variation_1_financials),
            ("variation_1_engineering", &self.variation_1_engineering),
            ("variation_2_pitch", &self.variation_2_pitch),
            ("variation_2_financials", &self.variation_2_financials),
            ("variation_2_engineering", &self.variation_2_engineering),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
    }
}

/// A ready-made startup idea for quick demos
#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub key: &'static str,
    pub label: &'static str,
    pub form: PitchForm,
}

fn preset(key: &'static str, label: &'static str, fields: [&str; 6]) -> Preset {
    let [startup_name, industry, mission, product, target_market, funding_stage] = fields;
    Preset {
        key,
        label,
        form: PitchForm {
            startup_name: startup_name.to_string(),
            industry: industry.to_string(),
            mission: mission.to_string(),
            product: product.to_string(),
            target_market: target_market.to_string(),
            funding_stage: funding_stage.to_string(),
        },
    }
}

/// All bundled presets
pub fn presets() -> Vec<Preset> {
    vec![
        preset(
            "hospitality",
            "Hospitality",
            [
                "StaySmart",
                "Hospitality",
                "Affordable smart hotel experiences",
                "AI-powered booking and room automation platform",
                "Business travelers and digital nomads",
                "Seed, $1.5M",
            ],
        ),
        preset(
            "mobile-app",
            "Mobile App",
            [
                "FitTrack",
                "Software",
                "Gamify fitness and personal health goals",
                "Mobile app with AI-coaching and wearable sync",
                "Health-conscious millennials",
                "Series A, $5M",
            ],
        ),
        preset(
            "coffee-shop",
            "Coffee Shop",
            [
                "Veronika's Coffee Palace",
                "Food & Beverage",
                "Redefine the coffeehouse experience by blending tradition with innovation.",
                "AI-powered tools and services to enhance customer engagement and streamline operations.",
                "Young professionals and students seeking convenience and quality.",
                "Seed Round - $800,000",
            ],
        ),
        preset(
            "manufacturing",
            "Manufacturing",
            [
                "RoboFab",
                "Manufacturing",
                "Automated small-scale production for SMEs",
                "Robotics-based flexible manufacturing line",
                "Small to mid-sized manufacturers",
                "Series B, $15M",
            ],
        ),
    ]
}

/// Look up a preset by key or label, case-insensitively
pub fn find_preset(name: &str) -> Option<Preset> {
    let wanted = name.trim().to_lowercase();
    presets()
        .into_iter()
        .find(|p| p.key == wanted || p.label.to_lowercase() == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::slots::OutputSlots;

    fn form() -> PitchForm {
        PitchForm {
            startup_name: "Brewly".to_string(),
            industry: "FnB".to_string(),
            mission: "Better coffee".to_string(),
            product: "Smart espresso machine".to_string(),
            target_market: "Cafes".to_string(),
            funding_stage: "Seed, $1M".to_string(),
        }
    }

    #[test]
    fn test_persona_context_is_case_insensitive() {
        let fnb = "You are a veteran with 30 years in the food & beverage industry.";
        assert_eq!(persona_context("FnB"), fnb);
        assert_eq!(persona_context("FNB"), fnb);
        assert_eq!(persona_context("fnb"), fnb);
        assert!(persona_context("HealthCare").contains("healthcare industry executive"));
    }

    #[test]
    fn test_unknown_industry_has_empty_persona() {
        assert_eq!(persona_context("quantum"), "");
        assert_eq!(persona_context(""), "");
    }

    #[test]
    fn test_variation_offsets() {
        assert_eq!(Variation::First.slot_offset(), 0);
        assert_eq!(Variation::Second.slot_offset(), 3);
        assert_eq!(Variation::First.number(), 1);
        assert_eq!(Variation::Second.number(), 2);
    }

    #[test]
    fn test_request_resolves_persona_once() {
        let request = PitchRequest::new(form());
        assert_eq!(request.variation, Variation::First);
        assert!(request.persona_context.contains("food & beverage"));

        let second = request.with_variation(Variation::Second);
        assert_eq!(second.variation, Variation::Second);
        assert_eq!(second.persona_context, request.persona_context);
        assert_eq!(second.startup_name, request.startup_name);
    }

    #[test]
    fn test_template_inputs() {
        let inputs = PitchRequest::new(form())
            .with_variation(Variation::Second)
            .template_inputs();
        assert_eq!(inputs["name"], "Brewly");
        assert_eq!(inputs["initial_funding"], "Seed, $1M");
        assert_eq!(inputs["variation"], "2");
        assert!(inputs["plugin_context"].contains("30 years"));
    }

    #[test]
    fn test_validation_lists_every_missing_field() {
        let mut incomplete = form();
        incomplete.industry = "   ".to_string();
        incomplete.funding_stage = String::new();

        let err = incomplete.validate().unwrap_err();
        assert_eq!(err.missing, vec!["Industry", "Funding Stage"]);
        assert_eq!(
            err.to_string(),
            "Missing required fields: Industry, Funding Stage"
        );
    }

    #[test]
    fn test_valid_form_builds_request() {
        let request = form().into_request().unwrap();
        assert_eq!(request.startup_name, "Brewly");
    }

    #[test]
    fn test_evaluation_input_from_slots() {
        let mut buffer = OutputSlots::new();
        for (index, text) in ["p1", "f1", "e1", "p2", "f2", "e2", "verdict"]
            .iter()
            .enumerate()
        {
            buffer.set(index, *text).unwrap();
        }
        let snapshot = buffer.snapshot();

        let input = EvaluationInput::from_slots("Brewly", &snapshot);
        assert_eq!(input.variation_1_pitch, "p1");
        assert_eq!(input.variation_2_engineering, "e2");
        assert_eq!(input, EvaluationInput::from_slots("Brewly", &snapshot));

        let inputs = input.template_inputs();
        assert_eq!(inputs["startup"], "Brewly");
        assert_eq!(inputs["variation_2_financials"], "f2");
        assert!(!inputs.values().any(|v| v == "verdict"));
    }

    #[test]
    fn test_find_preset() {
        assert_eq!(presets().len(), 4);
        let coffee = find_preset("Coffee Shop").unwrap();
        assert_eq!(coffee.form.startup_name, "Veronika's Coffee Palace");
        assert!(find_preset("mobile-app").is_some());
        assert!(find_preset("space elevator").is_none());
        for preset in presets() {
            assert!(preset.form.validate().is_ok());
        }
    }
}
