//! Best-effort recovery of an [`AssessmentResult`] from free-form text.
//!
//! Providers are asked for JSON, but models drift. When JSON parsing fails
//! the adapters hand the raw answer to [`extract_assessment`], which scans
//! for labeled sections instead. This path never fails; at worst it returns
//! a generic result saying the response could not be parsed.

use lazy_static::lazy_static;
use regex::Regex;

use crate::guidance::types::{AssessmentResult, Severity, SeverityLevel};

lazy_static! {
    static ref LABEL_RE: Regex =
        Regex::new(r"(?i)\b(assessment|steps|warnings|severity|level|description)\s*:").unwrap();
    static ref LIST_ITEM_RE: Regex = Regex::new(r"(?m)(?:^|\s)(?:\d+\.\s+|[*-]\s+)").unwrap();
}

/// Recover a result from unstructured text. Each labeled section runs to
/// the start of the next recognized label or the end of the text.
pub fn extract_assessment(text: &str) -> AssessmentResult {
    let sections = scan_sections(text);
    if sections.is_empty() {
        return unparsed_fallback();
    }

    let assessment = first_section(&sections, "assessment")
        .map(str::to_string)
        .unwrap_or_else(|| "The response did not include a clear assessment.".to_string());

    let steps = first_section(&sections, "steps")
        .map(split_list_items)
        .unwrap_or_default();

    let warnings = first_section(&sections, "warnings")
        .map(split_list_items)
        .unwrap_or_default();

    let severity_text = first_section(&sections, "level").or_else(|| first_section(&sections, "severity"));
    let level = severity_text
        .map(SeverityLevel::from_label)
        .unwrap_or(SeverityLevel::RequiresAttention);
    let description = first_section(&sections, "description")
        .or(severity_text)
        .unwrap_or("Severity could not be determined from the response.")
        .to_string();

    AssessmentResult {
        assessment,
        steps,
        warnings,
        severity: Some(Severity { level, description }),
    }
}

fn unparsed_fallback() -> AssessmentResult {
    AssessmentResult {
        assessment: "The AI response could not be parsed into structured guidance. If you are \
                     concerned about the situation, seek medical attention."
            .to_string(),
        steps: vec![],
        warnings: vec![
            "The system had trouble processing the AI answer; this guidance may be incomplete."
                .to_string(),
        ],
        severity: Some(Severity {
            level: SeverityLevel::RequiresAttention,
            description: "Severity could not be determined from the response.".to_string(),
        }),
    }
}

/// All labeled sections in order of appearance, bodies trimmed.
fn scan_sections(text: &str) -> Vec<(String, String)> {
    let labels: Vec<(String, usize, usize)> = LABEL_RE
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            (caps[1].to_lowercase(), whole.start(), whole.end())
        })
        .collect();

    labels
        .iter()
        .enumerate()
        .map(|(i, (label, _, body_start))| {
            let body_end = labels
                .get(i + 1)
                .map(|(_, next_start, _)| *next_start)
                .unwrap_or(text.len());
            (label.clone(), text[*body_start..body_end].trim().to_string())
        })
        .collect()
}

fn first_section<'a>(sections: &'a [(String, String)], label: &str) -> Option<&'a str> {
    sections
        .iter()
        .find(|(name, body)| name == label && !body.is_empty())
        .map(|(_, body)| body.as_str())
}

/// Split a section on numbered (`1.`) or bulleted (`*`, `-`) markers. A
/// section with no markers is a single item.
fn split_list_items(section: &str) -> Vec<String> {
    LIST_ITEM_RE
        .split(section)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
