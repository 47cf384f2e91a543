//! Fixed schema of the SLR issue form and dataset.
//!
//! A [`Field`] ties together the issue-form label an answer is extracted
//! from, the form element id, and the CSV column the answer lands in.

/// Trailing option offered on taxonomy dropdowns for free-text additions.
pub const OTHER_OPTION: &str = "Other (please specify below)";

/// Placeholder for "not applicable" answers and backfilled blanks.
pub const NA: &str = "NA";

/// Every field of the issue form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Doi,
    Year,
    Domain,
    DomainOther,
    Trl,
    Ai,
    TargetedThreats,
    AttackScenarios,
    FaultInjection,
    FaultInjectionOther,
    EvaluationMethod,
    SecurityChallenges,
    Contributions,
    UseCaseDescription,
    Prerequisites,
    SceApproach,
    RequiredResources,
    EvaluationApproachDescription,
    EvaluationMetrics,
    EvaluationResults,
    LessonsLearned,
    AdditionalInformation,
}

impl Field {
    /// Required fields, in CSV order. Blank values become [`NA`].
    pub const REQUIRED: [Field; 9] = [
        Field::Doi,
        Field::Year,
        Field::Domain,
        Field::Trl,
        Field::Ai,
        Field::TargetedThreats,
        Field::AttackScenarios,
        Field::FaultInjection,
        Field::EvaluationMethod,
    ];

    /// Optional free-text fields, in CSV order.
    pub const OPTIONAL: [Field; 11] = [
        Field::SecurityChallenges,
        Field::Contributions,
        Field::UseCaseDescription,
        Field::Prerequisites,
        Field::SceApproach,
        Field::RequiredResources,
        Field::EvaluationApproachDescription,
        Field::EvaluationMetrics,
        Field::EvaluationResults,
        Field::LessonsLearned,
        Field::AdditionalInformation,
    ];

    /// Heading text of the answer in the issue body.
    pub fn label(self) -> &'static str {
        match self {
            Field::Doi => "DOI",
            Field::Year => "Year",
            Field::Domain => "Domain",
            Field::DomainOther => "If Domain is 'Other', please specify below",
            Field::Trl => "TRL",
            Field::Ai => "AI-based",
            Field::TargetedThreats => "Targeted Threats",
            Field::AttackScenarios => "Attack Scenarios",
            Field::FaultInjection => "Fault Injection",
            Field::FaultInjectionOther => {
                "If Fault Injection is 'Other', please specify below new fault Injection types separated by commas (new ID will be automatically generated)"
            }
            Field::EvaluationMethod => "Evaluation Method",
            Field::SecurityChallenges => "Identified Security Challenges",
            Field::Contributions => "Contributions",
            Field::UseCaseDescription => "Use Case Description",
            Field::Prerequisites => "Prerequisites",
            Field::SceApproach => "SCE Approach Description",
            Field::RequiredResources => "Required Resources",
            Field::EvaluationApproachDescription => "Evaluation Approach Description",
            Field::EvaluationMetrics => "Evaluation Metrics",
            Field::EvaluationResults => "Evaluation Results",
            Field::LessonsLearned => "Lessons Learned",
            Field::AdditionalInformation => "Additional Information",
        }
    }

    /// Element id in the issue-form YAML.
    pub fn form_id(self) -> &'static str {
        match self {
            Field::Doi => "doi",
            Field::Year => "year",
            Field::Domain => "domain",
            Field::DomainOther => "domain_other_specify",
            Field::Trl => "trl",
            Field::Ai => "ai",
            Field::TargetedThreats => "targeted_threats",
            Field::AttackScenarios => "attack_scenarios",
            Field::FaultInjection => "fault_injections",
            Field::FaultInjectionOther => "fault_injection_other_specify",
            Field::EvaluationMethod => "evaluation_method",
            Field::SecurityChallenges => "security_challenges",
            Field::Contributions => "contributions",
            Field::UseCaseDescription => "use_case_description",
            Field::Prerequisites => "prerequisites",
            Field::SceApproach => "sce_approach",
            Field::RequiredResources => "required_resources",
            Field::EvaluationApproachDescription => "evaluation_approach_description",
            Field::EvaluationMetrics => "evaluation_metrics",
            Field::EvaluationResults => "evaluation_results",
            Field::LessonsLearned => "lessons_learned",
            Field::AdditionalInformation => "additional_info",
        }
    }

    /// CSV column, or `None` for form-only helper fields.
    pub fn column(self) -> Option<&'static str> {
        match self {
            Field::DomainOther | Field::FaultInjectionOther => None,
            Field::Ai => Some("AI"),
            other => Some(other.label()),
        }
    }
}

/// CSV header of a fresh dataset: required columns, then optional ones.
pub fn dataset_columns() -> Vec<&'static str> {
    Field::REQUIRED
        .iter()
        .chain(Field::OPTIONAL.iter())
        .filter_map(|f| f.column())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_column_differs_from_label() {
        assert_eq!(Field::Ai.label(), "AI-based");
        assert_eq!(Field::Ai.column(), Some("AI"));
    }

    #[test]
    fn helper_fields_have_no_column() {
        assert_eq!(Field::DomainOther.column(), None);
        assert_eq!(Field::FaultInjectionOther.column(), None);
    }

    #[test]
    fn dataset_columns_in_order() {
        let cols = dataset_columns();
        assert_eq!(cols.len(), 20);
        assert_eq!(&cols[..3], &["DOI", "Year", "Domain"]);
        assert_eq!(cols[8], "Evaluation Method");
        assert_eq!(cols.last(), Some(&"Additional Information"));
    }
}
