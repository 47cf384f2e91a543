//! Field extraction from GitHub issue-form bodies.
//!
//! Issue forms render each answer as a `### <Label>` heading, a blank line,
//! and the answer text (or `_No response_` for a skipped optional field).
//! [`IssueBody`] looks answers up by label; [`split_values`] breaks
//! multi-select answers into their options.

mod cleanup;

use regex::Regex;
use tracing::{trace, warn};

pub use cleanup::NO_RESPONSE;

// ---------------------------------------------------------------------------
// IssueBody
// ---------------------------------------------------------------------------

/// A normalized issue body ready for field lookups.
#[derive(Debug, Clone)]
pub struct IssueBody {
    text: String,
}

impl IssueBody {
    /// Normalize `raw` (line endings, BOM) for extraction.
    pub fn parse(raw: &str) -> Self {
        Self {
            text: cleanup::normalize_body(raw),
        }
    }

    /// The answer under `### <label>`, or an empty string.
    ///
    /// The answer is the first non-empty line after the heading's blank
    /// line, trimmed of whitespace and underscores. A missing heading and a
    /// "No response" answer both yield an empty string.
    pub fn field(&self, label: &str) -> String {
        let pattern = format!(r"(?:^|\n)###\s+{}\s*\n\n([^\n]+)", regex::escape(label));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(label, error = %e, "could not build field pattern");
                return String::new();
            }
        };

        match re.captures(&self.text) {
            Some(caps) => {
                let value = cleanup::clean_value(&caps[1]);
                trace!(label, value = %value, "field extracted");
                value
            }
            None => {
                trace!(label, "field heading not found");
                String::new()
            }
        }
    }

    /// [`field`](Self::field) split into its individual options.
    pub fn values(&self, label: &str) -> Vec<String> {
        split_values(&self.field(label))
    }
}

// ---------------------------------------------------------------------------
// Multi-value answers
// ---------------------------------------------------------------------------

/// Split a multi-select answer on commas and newlines, dropping blanks.
pub fn split_values(raw: &str) -> Vec<String> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "### DOI\n\n10.1000/xyz123\n\n### Year\n\n2024\n\n### Domain\n\nAutomotive, Avionics\n\n### Attack Scenarios\n\n_No response_\n";

    #[test]
    fn extracts_present_field() {
        let body = IssueBody::parse(SAMPLE);
        assert_eq!(body.field("DOI"), "10.1000/xyz123");
        assert_eq!(body.field("Year"), "2024");
    }

    #[test]
    fn no_response_is_empty() {
        let body = IssueBody::parse(SAMPLE);
        assert_eq!(body.field("Attack Scenarios"), "");
    }

    #[test]
    fn missing_heading_is_empty() {
        let body = IssueBody::parse(SAMPLE);
        assert_eq!(body.field("Lessons Learned"), "");
    }

    #[test]
    fn label_must_match_exactly() {
        let body = IssueBody::parse("### Year of study\n\n1999\n\n### Year\n\n2024\n");
        assert_eq!(body.field("Year"), "2024");
    }

    #[test]
    fn label_metacharacters_are_literal() {
        let label = "If Domain is 'Other', please specify below";
        let body = IssueBody::parse(&format!("### {label}\n\nRailway\n"));
        assert_eq!(body.field(label), "Railway");
        assert_eq!(body.field("AI-based"), "");

        let body = IssueBody::parse("### AI-based\n\nYes\n");
        assert_eq!(body.field("AI-based"), "Yes");
    }

    #[test]
    fn skips_extra_blank_lines_before_answer() {
        let body = IssueBody::parse("### Year\n\n\n2021\n");
        assert_eq!(body.field("Year"), "2021");
    }

    #[test]
    fn only_first_answer_line_is_taken() {
        let body = IssueBody::parse("### Contributions\n\nFirst line\nSecond line\n");
        assert_eq!(body.field("Contributions"), "First line");
    }

    #[test]
    fn heading_without_blank_line_is_absent() {
        let body = IssueBody::parse("### Year\n2024\n");
        assert_eq!(body.field("Year"), "");
    }

    #[test]
    fn crlf_bodies_are_supported() {
        let body = IssueBody::parse("### Year\r\n\r\n2022\r\n");
        assert_eq!(body.field("Year"), "2022");
    }

    #[test]
    fn values_splits_multi_select() {
        let body = IssueBody::parse(SAMPLE);
        assert_eq!(body.values("Domain"), vec!["Automotive", "Avionics"]);
        assert!(body.values("Attack Scenarios").is_empty());
    }

    #[test]
    fn split_values_drops_blanks() {
        assert_eq!(
            split_values(" S (Spoofing), ,T (Tampering)\nE (Elevation of Privilege) "),
            vec!["S (Spoofing)", "T (Tampering)", "E (Elevation of Privilege)"]
        );
        assert!(split_values("").is_empty());
    }

    #[test]
    fn fixture_issue_body() {
        let raw = std::fs::read_to_string("../../../fixtures/issue_body.sample.md")
            .expect("read fixture");
        let body = IssueBody::parse(&raw);
        assert_eq!(body.field("Year"), "2023");
        assert_eq!(body.field("TRL"), "4-6");
        assert_eq!(body.values("Targeted Threats").len(), 2);
        assert_eq!(body.field("Lessons Learned"), "");
    }
}
