//! Default prompt templates bundled at compile time.
//!
//! Agent prompts are used verbatim as system instructions. Task prompts
//! are templates: `{placeholder}` names are substituted from the crew's
//! inputs by [`render_template`].

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::pitch::TemplateInputs;

/// Visionary - drafts the pitch narrative
pub const VISIONARY: &str = include_str!("defaults/visionary.md");

/// Financial Analyst - models the numbers
pub const FINANCIAL_ANALYST: &str = include_str!("defaults/financial_analyst.md");

/// Engineer - assesses technical feasibility
pub const ENGINEER: &str = include_str!("defaults/engineer.md");

/// Jury - compares both variations
pub const JURY: &str = include_str!("defaults/jury.md");

pub const PITCH_TASK: &str = include_str!("defaults/pitch_task.md");
pub const FINANCIAL_TASK: &str = include_str!("defaults/financial_task.md");
pub const ENGINEERING_TASK: &str = include_str!("defaults/engineering_task.md");
pub const EVALUATION_TASK: &str = include_str!("defaults/evaluation_task.md");

/// All default prompts with their slugs
pub fn all_defaults() -> Vec<(&'static str, &'static str)> {
    vec![
        ("visionary", VISIONARY),
        ("financial_analyst", FINANCIAL_ANALYST),
        ("engineer", ENGINEER),
        ("jury", JURY),
        ("pitch_task", PITCH_TASK),
        ("financial_task", FINANCIAL_TASK),
        ("engineering_task", ENGINEERING_TASK),
        ("evaluation_task", EVALUATION_TASK),
    ]
}

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{([a-z][a-z0-9_]*)\}").ok())
        .as_ref()
}

/// Substitute every `{placeholder}` in `template` from `inputs`.
///
/// Substituted values are not scanned again. Returns the first
/// placeholder with no matching input as the error.
pub fn render_template(template: &str, inputs: &TemplateInputs) -> Result<String, String> {
    let Some(pattern) = placeholder_pattern() else {
        return Ok(template.to_string());
    };

    let mut missing: Option<String> = None;
    let rendered = pattern.replace_all(template, |caps: &Captures| {
        let key = &caps[1];
        match inputs.get(key) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                caps[0].to_string()
            }
        }
    });

    match missing {
        Some(key) => Err(key),
        None => Ok(rendered.into_owned()),
    }
}
