//! Prompt templates and the prompt builder.
//!
//! Templates are a closed set fixed at compile time. Rendering is pure string
//! substitution: `{name}` placeholders are replaced verbatim with the supplied
//! variable values, newlines and all. No escaping — the full résumé / job
//! description text is embedded as-is.

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use crate::schema::SchemaKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("missing required variable '{0}'")]
    MissingVariable(&'static str),
}

/// The closed set of prompt templates the engine knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    ResumeAnalysis,
    JdMatching,
    ResumeImprovement,
}

impl TemplateId {
    /// Variable names the template requires. `build` rejects any binding set
    /// that does not cover all of them.
    pub fn required_vars(self) -> &'static [&'static str] {
        match self {
            TemplateId::ResumeAnalysis => &["resume_text"],
            TemplateId::JdMatching | TemplateId::ResumeImprovement => {
                &["resume_text", "job_description"]
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::ResumeAnalysis => "resume_analysis",
            TemplateId::JdMatching => "jd_matching",
            TemplateId::ResumeImprovement => "resume_improvement",
        }
    }

    fn template(self) -> &'static str {
        match self {
            TemplateId::ResumeAnalysis => RESUME_ANALYSIS_TEMPLATE,
            TemplateId::JdMatching => JD_MATCHING_TEMPLATE,
            TemplateId::ResumeImprovement => RESUME_IMPROVEMENT_TEMPLATE,
        }
    }
}

impl FromStr for TemplateId {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resume_analysis" => Ok(TemplateId::ResumeAnalysis),
            "jd_matching" => Ok(TemplateId::JdMatching),
            "resume_improvement" => Ok(TemplateId::ResumeImprovement),
            other => Err(TemplateError::UnknownTemplate(other.to_string())),
        }
    }
}

/// Renders a prompt from a template and variable bindings.
///
/// Deterministic and side-effect free: the same inputs always produce the
/// same string. Fails before touching the template if any required variable
/// is absent.
pub fn build(
    template: TemplateId,
    variables: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut rendered = template.template().to_string();
    for &name in template.required_vars() {
        let value = variables
            .get(name)
            .ok_or(TemplateError::MissingVariable(name))?;
        rendered = rendered.replace(&format!("{{{name}}}"), value);
    }
    Ok(rendered)
}

/// Default system prompt per result schema, used when the caller does not
/// override it.
pub fn default_system_prompt(kind: SchemaKind) -> &'static str {
    match kind {
        SchemaKind::ResumeAnalysis => {
            "You are an expert recruiter AI. Respond only with a valid JSON object \
            matching the exact structure provided."
        }
        SchemaKind::JdMatch => {
            "You are a smart recruiter assistant. Always reply in pure JSON format."
        }
        SchemaKind::ResumeImprovement => {
            "You are an expert career coach. Respond only with a valid JSON structure."
        }
    }
}

/// Resume analysis prompt. Replace `{resume_text}` before sending.
const RESUME_ANALYSIS_TEMPLATE: &str = r#"You are a professional technical recruiter AI. Your response *must be* a valid JSON object with no additional text before or after it. Use the following structure exactly:

{
    "skills": [list of technical and soft skills extracted from the resume],
    "summary": "short professional summary",
    "suggestions": [list of tips to improve the resume],
    "job_fit_score": number between 0 and 100
}

Resume:
{resume_text}"#;

/// JD matching prompt. Replace `{resume_text}` and `{job_description}`.
const JD_MATCHING_TEMPLATE: &str = r#"You are an expert recruiter AI. Compare the following resume with the job description and return a JSON with:
{
    "fit_percentage": number between 0 to 100,
    "matching_skills": [list of overlapping skills or experiences],
    "missing_skills": [list of important but missing skills],
    "strengths": [list of resume strengths],
    "weaknesses": [list of resume weaknesses],
    "verdict": "short sentence whether the resume fits or not"
}

Resume:
{resume_text}

Job Description:
{job_description}"#;

/// Resume improvement prompt. Replace `{resume_text}` and `{job_description}`.
const RESUME_IMPROVEMENT_TEMPLATE: &str = r#"You are an AI Career Coach helping a candidate improve their resume to match a given job description.

Job Description:
{job_description}

Candidate Resume:
{resume_text}

Analyze the resume and provide structured suggestions in the following JSON format:

{
  "matching_skills": [...],
  "missing_skills": [...],
  "tools_to_learn": [...],
  "resources_to_explore": [...],
  "strengths": [...],
  "weaknesses": [...],
  "fit_summary": {
    "technical_fit": "...",
    "upside": "...",
    "recommendation": "...",
    "alternative_roles": [...]
  }
}

Strictly return only the JSON. No explanation, no markdown, no commentary."#;
