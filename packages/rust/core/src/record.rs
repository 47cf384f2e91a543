//! Dataset record assembled from an issue submission.

use slrkit_markdown::{IssueBody, split_values};
use slrkit_shared::{FaultId, Result, SlrError};

use crate::schema::{Field, NA};

/// One row of the SLR dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlrEntry {
    pub doi: String,
    pub year: i32,
    pub domain: String,
    pub trl: String,
    pub ai: String,
    /// Comma-separated STRIDE codes (`S, T`).
    pub targeted_threats: String,
    pub attack_scenarios: String,
    /// Comma-separated fault-injection ids (`T1, T4`).
    pub fault_injection: String,
    pub evaluation_method: String,
    /// Optional free-text answers, one per [`Field::OPTIONAL`] entry.
    pub notes: Vec<(Field, String)>,
}

impl SlrEntry {
    /// Assemble an entry from `body`.
    ///
    /// `domain` and `fault_ids` come from the taxonomy step since they
    /// depend on "Other" answers. Fails if the year is missing or not an
    /// integer; nothing else is mandatory.
    pub fn from_submission(body: &IssueBody, domain: String, fault_ids: &[FaultId]) -> Result<Self> {
        let year = parse_year(&body.field(Field::Year.label()))?;

        let threats = threat_codes(&body.values(Field::TargetedThreats.label()));

        Ok(Self {
            doi: body.field(Field::Doi.label()),
            year,
            domain,
            trl: body.field(Field::Trl.label()),
            ai: body.field(Field::Ai.label()),
            targeted_threats: threats.join(", "),
            attack_scenarios: body.field(Field::AttackScenarios.label()),
            fault_injection: join_ids(fault_ids),
            evaluation_method: body.field(Field::EvaluationMethod.label()),
            notes: Field::OPTIONAL
                .iter()
                .map(|f| (*f, body.field(f.label())))
                .collect(),
        })
    }

    /// Replace blank required fields with [`NA`].
    pub fn backfill_required(&mut self) {
        for value in [
            &mut self.doi,
            &mut self.domain,
            &mut self.trl,
            &mut self.ai,
            &mut self.targeted_threats,
            &mut self.attack_scenarios,
            &mut self.fault_injection,
            &mut self.evaluation_method,
        ] {
            if value.trim().is_empty() {
                *value = NA.to_string();
            }
        }
    }

    /// `(column, value)` pairs in dataset column order.
    pub fn cells(&self) -> Vec<(&'static str, String)> {
        let required = [
            (Field::Doi, self.doi.clone()),
            (Field::Year, self.year.to_string()),
            (Field::Domain, self.domain.clone()),
            (Field::Trl, self.trl.clone()),
            (Field::Ai, self.ai.clone()),
            (Field::TargetedThreats, self.targeted_threats.clone()),
            (Field::AttackScenarios, self.attack_scenarios.clone()),
            (Field::FaultInjection, self.fault_injection.clone()),
            (Field::EvaluationMethod, self.evaluation_method.clone()),
        ];

        required
            .into_iter()
            .chain(self.notes.iter().cloned())
            .filter_map(|(field, value)| field.column().map(|c| (c, value)))
            .collect()
    }
}

/// Parse the Year answer as an integer.
pub fn parse_year(raw: &str) -> Result<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SlrError::validation("Year field is required but missing."));
    }
    raw.parse().map_err(|_| {
        SlrError::validation(format!("Invalid Year value: {raw}. Must be an integer."))
    })
}

/// Leading code of each selected threat (`"S (Spoofing)"` → `S`).
///
/// Options starting with a non-word character have no code and are dropped.
pub fn threat_codes(selected: &[String]) -> Vec<String> {
    selected
        .iter()
        .filter_map(|t| {
            // The `NA` option yields `N`.
            t.chars()
                .next()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .map(String::from)
        })
        .collect()
}

/// `T<n>` ids of the selected fault-injection options.
///
/// Options without an id (the `Other`/`NA` sentinels) are skipped.
pub fn fault_ids(selected: &[String]) -> Result<Vec<FaultId>> {
    let mut ids = Vec::with_capacity(selected.len());
    for option in selected {
        ids.extend(FaultId::leading(option)?);
    }
    Ok(ids)
}

/// Options of a free-text "Other" answer.
pub fn other_values(raw: &str) -> Vec<String> {
    split_values(raw)
}

fn join_ids(ids: &[FaultId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
