//! Prompt assembly shared by all provider adapters.

use crate::guidance::types::MedicalHistory;

/// System instruction fixing the output schema and severity semantics.
/// Every provider gets the same instruction; only the transport differs.
pub const SYSTEM_PROMPT: &str = r#"You are a first-aid guidance assistant. The user will describe a medical situation with text, photos, or an audio transcript. Assess the situation and respond with practical first-aid guidance.

You MUST return a valid JSON object in exactly this format:
{
  "assessment": "Brief assessment of the situation",
  "steps": ["First thing to do", "Second thing to do"],
  "warnings": ["Things to watch out for or avoid"],
  "severity": {
    "level": "minor | requires_attention | emergency",
    "description": "Why this severity level applies"
  }
}

Severity levels:
- "minor": can be treated at home with basic first aid
- "requires_attention": needs medical care soon, but is not immediately life-threatening
- "emergency": call emergency services immediately

Always include the steps and warnings arrays, even if empty. Do not add any text outside the JSON object."#;

/// Injected in place of a transcript when the provider cannot transcribe.
pub const AUDIO_UNAVAILABLE_NOTE: &str = "Note: the user attached an audio recording, but \
audio transcription is not available for this analysis. Base the assessment on the text \
and images only.";

/// Audio context as seen by one adapter.
#[derive(Debug, Clone, Copy)]
pub enum AudioContext<'a> {
    /// The provider transcribed the recording.
    Transcript(&'a str),
    /// The provider has no speech-to-text capability.
    Unavailable,
}

/// Render the patient context as labeled lines. Absent fields get an
/// explicit "none known" phrase so the model never sees a blank label.
pub fn render_medical_history(history: &MedicalHistory) -> String {
    let allergies = if history.allergies.is_empty() {
        "None known".to_string()
    } else {
        history.allergies.join(", ")
    };
    let medications = if history.medications.is_empty() {
        "No current medications".to_string()
    } else {
        history.medications.join(", ")
    };
    let conditions = if history.conditions.is_empty() {
        "No known medical conditions".to_string()
    } else {
        history.conditions.join(", ")
    };
    let blood_type = history.blood_type.as_deref().unwrap_or("Unknown");

    let mut block = format!(
        "Patient medical history:\n- Allergies: {}\n- Current medications: {}\n- Medical conditions: {}\n- Blood type: {}",
        allergies, medications, conditions, blood_type
    );
    if let Some(notes) = history.notes.as_deref() {
        if !notes.trim().is_empty() {
            block.push_str("\n- Notes: ");
            block.push_str(notes.trim());
        }
    }
    block
}

/// Assemble the user-facing prompt from the description, the optional
/// history block, and the optional audio context.
pub fn build_user_prompt(
    text: &str,
    history: Option<&MedicalHistory>,
    audio: Option<AudioContext<'_>>,
) -> String {
    let mut sections = Vec::new();

    if text.trim().is_empty() {
        sections.push("The user did not provide a written description.".to_string());
    } else {
        sections.push(format!("Situation described by the user:\n{}", text.trim()));
    }

    if let Some(history) = history {
        sections.push(render_medical_history(history));
    }

    match audio {
        Some(AudioContext::Transcript(transcript)) => {
            sections.push(format!(
                "Transcript of the user's audio recording:\n{}",
                transcript.trim()
            ));
        }
        Some(AudioContext::Unavailable) => sections.push(AUDIO_UNAVAILABLE_NOTE.to_string()),
        None => {}
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_fixes_schema_and_severity_semantics() {
        assert!(SYSTEM_PROMPT.contains(r#""assessment""#));
        assert!(SYSTEM_PROMPT.contains(r#""steps""#));
        assert!(SYSTEM_PROMPT.contains(r#""warnings""#));
        assert!(SYSTEM_PROMPT.contains("minor | requires_attention | emergency"));
        assert!(SYSTEM_PROMPT.contains("call emergency services"));
        assert!(SYSTEM_PROMPT.contains("valid JSON"));
    }

    #[test]
    fn history_renders_known_fields_and_explicit_defaults() {
        let history = MedicalHistory {
            allergies: vec!["penicillin".to_string()],
            medications: vec![],
            conditions: vec![],
            blood_type: Some("O+".to_string()),
            notes: None,
        };
        let rendered = render_medical_history(&history);
        assert!(rendered.contains("penicillin"));
        assert!(rendered.contains("No current medications"));
        assert!(rendered.contains("No known medical conditions"));
        assert!(rendered.contains("Blood type: O+"));
        assert!(!rendered.contains("Notes:"));
    }

    #[test]
    fn history_renders_notes_when_present() {
        let history = MedicalHistory {
            notes: Some("On blood thinners since 2023.".to_string()),
            ..MedicalHistory::default()
        };
        let rendered = render_medical_history(&history);
        assert!(rendered.contains("Notes: On blood thinners since 2023."));
        assert!(rendered.contains("Allergies: None known"));
        assert!(rendered.contains("Blood type: Unknown"));
    }

    #[test]
    fn prompt_includes_text_history_and_transcript() {
        let history = MedicalHistory {
            allergies: vec!["latex".to_string()],
            ..MedicalHistory::default()
        };
        let prompt = build_user_prompt(
            "Cut my finger while cooking.",
            Some(&history),
            Some(AudioContext::Transcript("It will not stop bleeding.")),
        );
        assert!(prompt.contains("Cut my finger while cooking."));
        assert!(prompt.contains("latex"));
        assert!(prompt.contains("Transcript of the user's audio recording:"));
        assert!(prompt.contains("It will not stop bleeding."));
    }

    #[test]
    fn prompt_substitutes_placeholder_when_transcription_unavailable() {
        let prompt = build_user_prompt("Fell off a bike.", None, Some(AudioContext::Unavailable));
        assert!(prompt.contains(AUDIO_UNAVAILABLE_NOTE));
        assert!(!prompt.contains("Transcript of"));
    }

    #[test]
    fn empty_text_gets_an_explicit_line() {
        let prompt = build_user_prompt("   ", None, None);
        assert!(prompt.contains("did not provide a written description"));
    }
}
