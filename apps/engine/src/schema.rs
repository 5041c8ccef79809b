//! Result schemas and validation.
//!
//! Three closed result shapes, selected by the caller up front — never
//! inferred from the document. Validation walks each schema's field table in
//! declared order and stops at the first missing or mistyped required field,
//! so the reported field name is deterministic. Unknown extra fields are
//! ignored; optional fields absent from the document get their declared
//! default. A validation failure never yields a partially populated result.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidateError {
    /// Candidate text is not syntactically valid JSON. The inner error
    /// carries the parser's line/column.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Parsed fine, but a required field is missing or has the wrong type.
    #[error("field '{field}': expected {expected}")]
    Invalid { field: String, expected: &'static str },
}

/// Which of the three result schemas a response must conform to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    ResumeAnalysis,
    JdMatch,
    ResumeImprovement,
}

/// Full resume analysis: extracted skills plus an overall fit score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub skills: Vec<String>,
    pub summary: String,
    pub suggestions: Vec<String>,
    /// 0–100 inclusive.
    pub job_fit_score: u8,
}

/// Resume-vs-job-description comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JdMatch {
    /// 0–100 inclusive.
    pub fit_percentage: u8,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    pub verdict: String,
}

/// Nested summary inside a resume improvement report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub technical_fit: String,
    pub upside: String,
    pub recommendation: String,
    pub alternative_roles: Vec<String>,
}

/// Coaching-style improvement suggestions against a target job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeImprovement {
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub tools_to_learn: Vec<String>,
    pub resources_to_explore: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub fit_summary: FitSummary,
}

/// A fully validated result, one variant per schema kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypedResult {
    ResumeAnalysis(ResumeAnalysis),
    JdMatch(JdMatch),
    ResumeImprovement(ResumeImprovement),
}

/// Parses `candidate` as JSON and checks it against the chosen schema.
pub fn validate(candidate: &str, kind: SchemaKind) -> Result<TypedResult, ValidateError> {
    let value: Value = serde_json::from_str(candidate)?;
    let doc = value.as_object().ok_or(ValidateError::Invalid {
        field: "(root)".to_string(),
        expected: "JSON object",
    })?;

    match kind {
        SchemaKind::ResumeAnalysis => Ok(TypedResult::ResumeAnalysis(ResumeAnalysis {
            skills: required_string_seq(doc, "skills")?,
            summary: required_string(doc, "summary")?,
            suggestions: required_string_seq(doc, "suggestions")?,
            job_fit_score: required_score(doc, "job_fit_score")?,
        })),
        SchemaKind::JdMatch => Ok(TypedResult::JdMatch(JdMatch {
            fit_percentage: required_score(doc, "fit_percentage")?,
            matching_skills: required_string_seq(doc, "matching_skills")?,
            missing_skills: required_string_seq(doc, "missing_skills")?,
            strengths: optional_string_seq(doc, "strengths")?,
            weaknesses: optional_string_seq(doc, "weaknesses")?,
            verdict: required_string(doc, "verdict")?,
        })),
        SchemaKind::ResumeImprovement => Ok(TypedResult::ResumeImprovement(ResumeImprovement {
            matching_skills: required_string_seq(doc, "matching_skills")?,
            missing_skills: required_string_seq(doc, "missing_skills")?,
            tools_to_learn: required_string_seq(doc, "tools_to_learn")?,
            resources_to_explore: required_string_seq(doc, "resources_to_explore")?,
            strengths: required_string_seq(doc, "strengths")?,
            weaknesses: required_string_seq(doc, "weaknesses")?,
            fit_summary: required_fit_summary(doc, "fit_summary")?,
        })),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field accessors — each reports the first offending field by name
// ────────────────────────────────────────────────────────────────────────────

fn invalid(field: impl Into<String>, expected: &'static str) -> ValidateError {
    ValidateError::Invalid {
        field: field.into(),
        expected,
    }
}

fn required_string(doc: &Map<String, Value>, field: &str) -> Result<String, ValidateError> {
    doc.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(field, "string"))
}

fn required_score(doc: &Map<String, Value>, field: &str) -> Result<u8, ValidateError> {
    doc.get(field)
        .and_then(Value::as_u64)
        .filter(|n| *n <= 100)
        .map(|n| n as u8)
        .ok_or_else(|| invalid(field, "integer (0-100)"))
}

fn string_seq(value: &Value, field: &str) -> Result<Vec<String>, ValidateError> {
    value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| invalid(field, "sequence of strings"))
}

fn required_string_seq(doc: &Map<String, Value>, field: &str) -> Result<Vec<String>, ValidateError> {
    let value = doc
        .get(field)
        .ok_or_else(|| invalid(field, "sequence of strings"))?;
    string_seq(value, field)
}

/// Absent optional sequences default to empty; present ones must still be
/// well typed.
fn optional_string_seq(doc: &Map<String, Value>, field: &str) -> Result<Vec<String>, ValidateError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => string_seq(value, field),
    }
}

fn required_fit_summary(doc: &Map<String, Value>, field: &str) -> Result<FitSummary, ValidateError> {
    let nested = doc
        .get(field)
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(field, "object"))?;

    // Nested failures report a dotted path so the caller sees which inner
    // field broke.
    let path = |inner: &str| format!("{field}.{inner}");
    Ok(FitSummary {
        technical_fit: required_string(nested, "technical_fit")
            .map_err(|_| invalid(path("technical_fit"), "string"))?,
        upside: required_string(nested, "upside").map_err(|_| invalid(path("upside"), "string"))?,
        recommendation: required_string(nested, "recommendation")
            .map_err(|_| invalid(path("recommendation"), "string"))?,
        alternative_roles: required_string_seq(nested, "alternative_roles")
            .map_err(|_| invalid(path("alternative_roles"), "sequence of strings"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ValidateError) -> (String, &'static str) {
        match err {
            ValidateError::Invalid { field, expected } => (field, expected),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_resume_analysis_valid() {
        let doc = r#"{"skills":["Go"],"summary":"ok","suggestions":[],"job_fit_score":82}"#;
        let result = validate(doc, SchemaKind::ResumeAnalysis).unwrap();
        match result {
            TypedResult::ResumeAnalysis(r) => {
                assert_eq!(r.skills, vec!["Go"]);
                assert_eq!(r.summary, "ok");
                assert!(r.suggestions.is_empty());
                assert_eq!(r.job_fit_score, 82);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_resume_analysis_score_must_be_integer() {
        let doc = r#"{"skills":["Go"],"summary":"ok","suggestions":[],"job_fit_score":"high"}"#;
        let (field, expected) = field_of(validate(doc, SchemaKind::ResumeAnalysis).unwrap_err());
        assert_eq!(field, "job_fit_score");
        assert_eq!(expected, "integer (0-100)");
    }

    #[test]
    fn test_resume_analysis_score_out_of_range() {
        let doc = r#"{"skills":[],"summary":"ok","suggestions":[],"job_fit_score":140}"#;
        let (field, _) = field_of(validate(doc, SchemaKind::ResumeAnalysis).unwrap_err());
        assert_eq!(field, "job_fit_score");
    }

    #[test]
    fn test_first_missing_field_in_declared_order_wins() {
        // Both summary and job_fit_score are absent; summary is declared first.
        let doc = r#"{"skills":[],"suggestions":[]}"#;
        let (field, expected) = field_of(validate(doc, SchemaKind::ResumeAnalysis).unwrap_err());
        assert_eq!(field, "summary");
        assert_eq!(expected, "string");
    }

    #[test]
    fn test_unknown_extra_fields_are_ignored() {
        let doc = r#"{"skills":[],"summary":"s","suggestions":[],"job_fit_score":50,"debug":true}"#;
        assert!(validate(doc, SchemaKind::ResumeAnalysis).is_ok());
    }

    #[test]
    fn test_syntactically_broken_candidate_is_a_parse_error() {
        let err = validate("not json at all", SchemaKind::ResumeAnalysis).unwrap_err();
        assert!(matches!(err, ValidateError::Parse(_)));
    }

    #[test]
    fn test_non_object_root_is_invalid() {
        let (field, expected) = field_of(validate("[1,2,3]", SchemaKind::JdMatch).unwrap_err());
        assert_eq!(field, "(root)");
        assert_eq!(expected, "JSON object");
    }

    #[test]
    fn test_jd_match_optional_fields_default_empty() {
        let doc = r#"{
            "fit_percentage": 64,
            "matching_skills": ["Rust"],
            "missing_skills": ["Kubernetes"],
            "verdict": "partial fit"
        }"#;
        match validate(doc, SchemaKind::JdMatch).unwrap() {
            TypedResult::JdMatch(m) => {
                assert_eq!(m.fit_percentage, 64);
                assert!(m.strengths.is_empty());
                assert!(m.weaknesses.is_empty());
                assert_eq!(m.verdict, "partial fit");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_jd_match_present_optional_field_must_be_well_typed() {
        let doc = r#"{
            "fit_percentage": 64,
            "matching_skills": [],
            "missing_skills": [],
            "strengths": "not a list",
            "verdict": "ok"
        }"#;
        let (field, expected) = field_of(validate(doc, SchemaKind::JdMatch).unwrap_err());
        assert_eq!(field, "strengths");
        assert_eq!(expected, "sequence of strings");
    }

    #[test]
    fn test_resume_improvement_valid() {
        let doc = r#"{
            "matching_skills": ["Rust"],
            "missing_skills": ["Go"],
            "tools_to_learn": ["k8s"],
            "resources_to_explore": ["rustlings"],
            "strengths": ["systems"],
            "weaknesses": ["frontend"],
            "fit_summary": {
                "technical_fit": "strong",
                "upside": "high",
                "recommendation": "apply",
                "alternative_roles": ["SRE"]
            }
        }"#;
        match validate(doc, SchemaKind::ResumeImprovement).unwrap() {
            TypedResult::ResumeImprovement(r) => {
                assert_eq!(r.fit_summary.recommendation, "apply");
                assert_eq!(r.fit_summary.alternative_roles, vec!["SRE"]);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_resume_improvement_nested_failure_names_dotted_path() {
        let doc = r#"{
            "matching_skills": [], "missing_skills": [], "tools_to_learn": [],
            "resources_to_explore": [], "strengths": [], "weaknesses": [],
            "fit_summary": {
                "technical_fit": "strong",
                "upside": "high",
                "recommendation": "apply",
                "alternative_roles": "SRE"
            }
        }"#;
        let (field, expected) = field_of(validate(doc, SchemaKind::ResumeImprovement).unwrap_err());
        assert_eq!(field, "fit_summary.alternative_roles");
        assert_eq!(expected, "sequence of strings");
    }

    #[test]
    fn test_resume_improvement_fit_summary_must_be_object() {
        let doc = r#"{
            "matching_skills": [], "missing_skills": [], "tools_to_learn": [],
            "resources_to_explore": [], "strengths": [], "weaknesses": [],
            "fit_summary": "looks good"
        }"#;
        let (field, expected) = field_of(validate(doc, SchemaKind::ResumeImprovement).unwrap_err());
        assert_eq!(field, "fit_summary");
        assert_eq!(expected, "object");
    }

    #[test]
    fn test_mixed_type_sequence_is_rejected() {
        let doc = r#"{"skills":["Go", 7],"summary":"s","suggestions":[],"job_fit_score":10}"#;
        let (field, _) = field_of(validate(doc, SchemaKind::ResumeAnalysis).unwrap_err());
        assert_eq!(field, "skills");
    }

    #[test]
    fn test_typed_result_serializes_with_kind_tag() {
        let result = TypedResult::JdMatch(JdMatch {
            fit_percentage: 70,
            matching_skills: vec!["Rust".into()],
            missing_skills: vec![],
            strengths: vec![],
            weaknesses: vec![],
            verdict: "fits".into(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "jd_match");
        assert_eq!(json["fit_percentage"], 70);
    }
}
