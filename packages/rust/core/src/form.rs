//! Issue-form template generation.
//!
//! The form is rebuilt in full from the fixed [`schema`](crate::schema) and the
//! current taxonomy lists, then written as GitHub issue-form YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use slrkit_shared::{FormConfig, Result, SlrError};
use tracing::{info, instrument};

use crate::schema::{Field, NA, OTHER_OPTION};
use crate::taxonomy::Taxonomy;

const TRL_OPTIONS: [&str; 4] = ["1-3", "4-6", "7-9", NA];
const AI_OPTIONS: [&str; 2] = ["Yes", "No"];
const THREAT_OPTIONS: [&str; 7] = [
    "S (Spoofing)",
    "T (Tampering)",
    "R (Repudiation)",
    "I (Information Disclosure)",
    "D (Denial of Service)",
    "E (Elevation of Privilege)",
    NA,
];
const EVALUATION_OPTIONS: [&str; 3] = ["Empirical", "Analytical", NA];
const LEAVE_BLANK: &str = "Leave blank if not applicable";
const OPTIONAL_HEADER: &str =
    "---\n## 📝 Optional Information\n*(Fill in if applicable, otherwise leave blank)*";

// ---------------------------------------------------------------------------
// Form model
// ---------------------------------------------------------------------------

/// A GitHub issue form (`.github/ISSUE_TEMPLATE/*.yml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueForm {
    pub name: String,
    pub description: String,
    pub title: String,
    pub labels: Vec<String>,
    pub body: Vec<FormElement>,
}

/// One element of the form body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<Validations>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Input,
    Dropdown,
    Markdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validations {
    pub required: bool,
}

impl FormElement {
    fn input(field: Field, required: bool) -> Self {
        Self {
            kind: ElementKind::Input,
            id: Some(field.form_id().to_string()),
            attributes: Attributes {
                label: Some(field.label().to_string()),
                ..Attributes::default()
            },
            validations: Some(Validations { required }),
        }
    }

    fn dropdown<S: AsRef<str>>(field: Field, options: &[S], multiple: bool) -> Self {
        Self {
            kind: ElementKind::Dropdown,
            id: Some(field.form_id().to_string()),
            attributes: Attributes {
                label: Some(field.label().to_string()),
                multiple: multiple.then_some(true),
                options: Some(options.iter().map(|o| o.as_ref().to_string()).collect()),
                ..Attributes::default()
            },
            validations: Some(Validations { required: true }),
        }
    }

    fn markdown(value: &str) -> Self {
        Self {
            kind: ElementKind::Markdown,
            id: None,
            attributes: Attributes {
                value: Some(value.to_string()),
                ..Attributes::default()
            },
            validations: None,
        }
    }

    fn placeholder(mut self, text: &str) -> Self {
        self.attributes.placeholder = Some(text.to_string());
        self
    }

    fn description(mut self, text: &str) -> Self {
        self.attributes.description = Some(text.to_string());
        self
    }

    /// The element's label, if it has one.
    pub fn label(&self) -> Option<&str> {
        self.attributes.label.as_deref()
    }
}

impl IssueForm {
    /// Element with form id `id`.
    pub fn element(&self, id: &str) -> Option<&FormElement> {
        self.body.iter().find(|e| e.id.as_deref() == Some(id))
    }
}

// ---------------------------------------------------------------------------
// Building and writing
// ---------------------------------------------------------------------------

/// Taxonomy labels followed by the `Other`/`NA` sentinels, without duplicates.
pub fn with_sentinels(labels: Vec<String>) -> Vec<String> {
    let mut options = labels;
    for sentinel in [OTHER_OPTION, NA] {
        if !options.iter().any(|o| o == sentinel) {
            options.push(sentinel.to_string());
        }
    }
    options
}

/// Build the complete form from its metadata and the current taxonomy.
pub fn build_form(meta: &FormConfig, taxonomy: &Taxonomy) -> IssueForm {
    let domains = with_sentinels(taxonomy.domains.labels());
    let fault_injections = with_sentinels(taxonomy.fault_injections.labels());

    let mut body = vec![
        FormElement::input(Field::Doi, false).placeholder("10.5281/zenodo.XXXXXXX"),
        FormElement::input(Field::Year, true)
            .placeholder("YYYY")
            .description("Enter the 4-digit publication year (e.g., 2025)"),
        FormElement::dropdown(Field::Domain, &domains, true),
        FormElement::input(Field::DomainOther, false).description(LEAVE_BLANK),
        FormElement::dropdown(Field::Trl, &TRL_OPTIONS, false),
        FormElement::dropdown(Field::Ai, &AI_OPTIONS, false),
        FormElement::dropdown(Field::TargetedThreats, &THREAT_OPTIONS, true),
        FormElement::input(Field::AttackScenarios, false).description(LEAVE_BLANK),
        FormElement::dropdown(Field::FaultInjection, &fault_injections, true),
        FormElement::input(Field::FaultInjectionOther, false).description(LEAVE_BLANK),
        FormElement::dropdown(Field::EvaluationMethod, &EVALUATION_OPTIONS, true),
        FormElement::markdown(OPTIONAL_HEADER),
    ];
    body.extend(Field::OPTIONAL.iter().map(|f| FormElement::input(*f, false)));

    IssueForm {
        name: meta.name.clone(),
        description: meta.description.clone(),
        title: meta.title.clone(),
        labels: meta.labels.clone(),
        body,
    }
}

/// Render `form` as YAML, keys in declaration order.
pub fn render_form(form: &IssueForm) -> Result<String> {
    serde_yaml::to_string(form)
        .map_err(|e| SlrError::Serialization(format!("YAML serialization failed: {e}")))
}

/// Overwrite the template at `path` with `form`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_form(path: &Path, form: &IssueForm) -> Result<()> {
    let yaml = render_form(form)?;
    slrkit_storage::write_atomic(path, yaml.as_bytes())?;
    info!(elements = form.body.len(), "issue form written");
    Ok(())
}
