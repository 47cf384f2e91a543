//! End-to-end `add` pipeline: issue body → fields → taxonomy → CSV row → form.
//!
//! The run is split in two. [`prepare_entry`] does all parsing, taxonomy
//! merging, and validation in memory; [`commit_entry`] performs the writes.
//! A submission that fails validation therefore leaves every file untouched.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use slrkit_markdown::IssueBody;
use slrkit_shared::{FaultId, FormConfig, PathsConfig, Result};
use slrkit_storage::{Dataset, load_list, save_list};
use tracing::{debug, info, instrument};

use crate::form::{self, IssueForm};
use crate::record::{self, SlrEntry};
use crate::schema::{self, Field};
use crate::taxonomy::{self, Taxonomy};

/// Configuration for the `add_entry` pipeline.
#[derive(Debug, Clone)]
pub struct AddEntryConfig {
    /// Dataset, category store, and template locations.
    pub paths: PathsConfig,
    /// Metadata for a regenerated issue form.
    pub form: FormConfig,
    /// Stop after validation; write nothing.
    pub dry_run: bool,
}

/// A validated entry plus the taxonomy it was merged against.
#[derive(Debug, Clone)]
pub struct PreparedEntry {
    pub entry: SlrEntry,
    pub taxonomy: Taxonomy,
    /// Identifiers assigned to "Other" fault-injection types.
    pub new_fault_ids: Vec<FaultId>,
    /// The domain "Other" answer was new to the list.
    pub domain_added: bool,
}

/// Result of the `add_entry` pipeline.
#[derive(Debug)]
pub struct AddEntryResult {
    pub entry: SlrEntry,
    pub new_fault_ids: Vec<FaultId>,
    pub domain_added: bool,
    /// Dataset rows before and after the append.
    pub rows_before: usize,
    pub rows_after: usize,
    /// The issue form was regenerated.
    pub form_written: bool,
    pub dataset_path: PathBuf,
    pub dry_run: bool,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &AddEntryResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &AddEntryResult) {}
}

/// Load both category lists.
pub fn load_taxonomy(paths: &PathsConfig) -> Result<Taxonomy> {
    Ok(Taxonomy {
        domains: load_list(&paths.domains)?,
        fault_injections: load_list(&paths.fault_injections)?,
    })
}

/// Extract fields, merge "Other" answers, and build the dataset row.
///
/// Pure apart from logging: `taxonomy` is consumed and returned inside the
/// [`PreparedEntry`].
#[instrument(skip_all)]
pub fn prepare_entry(body: &IssueBody, taxonomy: Taxonomy) -> Result<PreparedEntry> {
    let Taxonomy {
        domains,
        fault_injections,
    } = taxonomy;

    // --- Fault injections ---
    let mut fault_ids = record::fault_ids(&body.values(Field::FaultInjection.label()))?;
    let others = record::other_values(&body.field(Field::FaultInjectionOther.label()));
    let merge = taxonomy::merge_fault_injections(fault_injections, &others)?;
    fault_ids.extend(merge.assigned.iter().copied());
    let new_fault_ids = merge.assigned;

    // --- Domain ---
    let mut domain = body.field(Field::Domain.label());
    let domain_other = body.field(Field::DomainOther.label());
    let domains_before = domains.version();
    let domains = taxonomy::merge_domain(domains, &domain_other);
    let domain_added = domains.version() != domains_before;
    if !domain_other.is_empty() {
        domain = domain_other;
    }

    // --- Record ---
    let mut entry = SlrEntry::from_submission(body, domain, &fault_ids)?;
    entry.backfill_required();

    debug!(
        year = entry.year,
        domain = %entry.domain,
        fault_injection = %entry.fault_injection,
        "entry prepared"
    );

    Ok(PreparedEntry {
        entry,
        taxonomy: Taxonomy {
            domains,
            fault_injections: merge.list,
        },
        new_fault_ids,
        domain_added,
    })
}

/// Persist a prepared entry.
///
/// Order: the dataset is read first so a broken CSV aborts before anything
/// is written; then changed category lists, the dataset, and finally the
/// issue form (only if a list changed). Returns `(rows_before, rows_after,
/// form_written)`.
#[instrument(skip_all, fields(dataset = %config.paths.dataset.display()))]
pub fn commit_entry(
    prepared: &PreparedEntry,
    config: &AddEntryConfig,
    progress: &dyn ProgressReporter,
) -> Result<(usize, usize, bool)> {
    let paths = &config.paths;

    progress.phase("Loading dataset");
    let mut dataset = Dataset::open_or_create(&paths.dataset, &schema::dataset_columns())?;
    let rows_before = dataset.len();

    let taxonomy = &prepared.taxonomy;
    if taxonomy.domains.is_modified() {
        progress.phase("Saving domains");
        save_list(&paths.domains, &taxonomy.domains)?;
    }
    if taxonomy.fault_injections.is_modified() {
        progress.phase("Saving fault injection types");
        save_list(&paths.fault_injections, &taxonomy.fault_injections)?;
    }

    progress.phase("Appending entry");
    dataset.append(&prepared.entry.cells());
    dataset.save()?;

    let form_written = taxonomy.is_modified();
    if form_written {
        progress.phase("Regenerating issue form");
        let issue_form = form::build_form(&config.form, taxonomy);
        form::write_form(&paths.template, &issue_form)?;
    }

    Ok((rows_before, dataset.len(), form_written))
}

/// Run the full `add` pipeline on a raw issue body.
///
/// 1. Load taxonomies
/// 2. Extract and validate the submission
/// 3. Persist lists, dataset row, and (if needed) the issue form
#[instrument(skip_all, fields(dry_run = config.dry_run))]
pub fn add_entry(
    config: &AddEntryConfig,
    raw_body: &str,
    progress: &dyn ProgressReporter,
) -> Result<AddEntryResult> {
    let start = Instant::now();

    progress.phase("Loading taxonomies");
    let taxonomy = load_taxonomy(&config.paths)?;

    progress.phase("Extracting fields");
    let body = IssueBody::parse(raw_body);
    let prepared = prepare_entry(&body, taxonomy)?;

    let (rows_before, rows_after, form_written) = if config.dry_run {
        info!("dry run, nothing written");
        let rows = Dataset::open_or_create(&config.paths.dataset, &schema::dataset_columns())?.len();
        (rows, rows, false)
    } else {
        commit_entry(&prepared, config, progress)?
    };

    let result = AddEntryResult {
        entry: prepared.entry,
        new_fault_ids: prepared.new_fault_ids,
        domain_added: prepared.domain_added,
        rows_before,
        rows_after,
        form_written,
        dataset_path: config.paths.dataset.clone(),
        dry_run: config.dry_run,
        elapsed: start.elapsed(),
    };

    info!(
        year = result.entry.year,
        rows = result.rows_after,
        form_written,
        "entry added"
    );
    progress.done(&result);

    Ok(result)
}

/// Rebuild the issue form from the stored lists, regardless of changes.
#[instrument(skip_all, fields(template = %paths.template.display()))]
pub fn regenerate_form(paths: &PathsConfig, meta: &FormConfig) -> Result<IssueForm> {
    let taxonomy = load_taxonomy(paths)?;
    let issue_form = form::build_form(meta, &taxonomy);
    form::write_form(&paths.template, &issue_form)?;
    Ok(issue_form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use slrkit_storage::{load_labels, save_labels};

    use crate::schema::NA;

    const HEADER: &str = "DOI,Year,Domain,TRL,AI,Targeted Threats,Attack Scenarios,Fault Injection,Evaluation Method\n";
    const EXISTING_ROW: &str = "10.1/old,2019,Avionics,1-3,No,S,NA,T1,Analytical\n";

    fn setup() -> AddEntryConfig {
        let root = std::env::temp_dir().join(format!("slrkit-pipeline-test-{}", uuid::Uuid::now_v7()));
        let paths = PathsConfig::default().resolved_against(&root);

        save_labels(&paths.domains, &["Automotive".into(), "Avionics".into()]).unwrap();
        save_labels(
            &paths.fault_injections,
            &["T1 (Voltage glitching)".into(), "T3 (EM pulses)".into()],
        )
        .unwrap();
        std::fs::write(&paths.dataset, format!("{HEADER}{EXISTING_ROW}")).unwrap();

        AddEntryConfig {
            paths,
            form: FormConfig::default(),
            dry_run: false,
        }
    }

    fn body(pairs: &[(Field, &str)]) -> String {
        let mut out = String::new();
        for field in Field::REQUIRED
            .iter()
            .chain([Field::DomainOther, Field::FaultInjectionOther].iter())
            .chain(Field::OPTIONAL.iter())
        {
            let value = pairs
                .iter()
                .find(|(f, _)| f == field)
                .map_or("_No response_", |(_, v)| *v);
            out.push_str(&format!("### {}\n\n{}\n\n", field.label(), value));
        }
        out
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap_or_default()
    }

    #[test]
    fn end_to_end_backfills_na() {
        let config = setup();
        let raw = body(&[(Field::Year, "2023"), (Field::Domain, "Automotive")]);

        let result = add_entry(&config, &raw, &SilentProgress).expect("add");
        assert_eq!(result.rows_before, 1);
        assert_eq!(result.rows_after, 2);
        assert!(!result.form_written);

        let ds = Dataset::open(&config.paths.dataset).expect("reopen");
        assert_eq!(ds.cell(1, "Year"), Some("2023"));
        assert_eq!(ds.cell(1, "Domain"), Some("Automotive"));
        for column in ["DOI", "TRL", "AI", "Targeted Threats", "Attack Scenarios", "Fault Injection", "Evaluation Method"] {
            assert_eq!(ds.cell(1, column), Some(NA), "column {column}");
        }
        assert!(!config.paths.template.exists());
    }

    #[test]
    fn existing_rows_are_untouched() {
        let config = setup();
        let raw = body(&[(Field::Year, "2024")]);
        add_entry(&config, &raw, &SilentProgress).expect("add");

        let ds = Dataset::open(&config.paths.dataset).expect("reopen");
        assert_eq!(ds.len(), 2);
        let first: Vec<&str> = ds.rows()[0].iter().take(9).map(String::as_str).collect();
        assert_eq!(first.join(","), EXISTING_ROW.trim_end());
        assert_eq!(ds.cell(0, "Lessons Learned"), Some(""));
    }

    #[test]
    fn invalid_year_writes_nothing() {
        let config = setup();
        let domains_before = read(&config.paths.domains);
        let faults_before = read(&config.paths.fault_injections);
        let dataset_before = read(&config.paths.dataset);

        let raw = body(&[
            (Field::Year, "abc"),
            (Field::DomainOther, "Railway"),
            (Field::FaultInjectionOther, "Laser"),
        ]);
        let err = add_entry(&config, &raw, &SilentProgress).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(read(&config.paths.dataset), dataset_before);
        assert_eq!(read(&config.paths.domains), domains_before);
        assert_eq!(read(&config.paths.fault_injections), faults_before);
        assert!(!config.paths.template.exists());
    }

    #[test]
    fn missing_year_writes_nothing() {
        let config = setup();
        let dataset_before = read(&config.paths.dataset);
        let err = add_entry(&config, &body(&[]), &SilentProgress).unwrap_err();
        assert!(err.to_string().contains("required but missing"));
        assert_eq!(read(&config.paths.dataset), dataset_before);
    }

    #[test]
    fn other_answers_extend_taxonomies_and_regenerate_form() {
        let config = setup();
        let raw = body(&[
            (Field::Year, "2022"),
            (Field::Domain, "Other (please specify below)"),
            (Field::DomainOther, "Railway"),
            (Field::FaultInjection, "T1 (Voltage glitching), Other (please specify below)"),
            (Field::FaultInjectionOther, "Baz, Qux"),
            (Field::TargetedThreats, "S (Spoofing), E (Elevation of Privilege)"),
        ]);

        let result = add_entry(&config, &raw, &SilentProgress).expect("add");
        assert_eq!(result.new_fault_ids, vec![FaultId(4), FaultId(5)]);
        assert!(result.domain_added);
        assert!(result.form_written);

        assert_eq!(
            load_labels(&config.paths.fault_injections).unwrap(),
            vec!["T1 (Voltage glitching)", "T3 (EM pulses)", "T4 (Baz)", "T5 (Qux)"]
        );
        assert_eq!(
            load_labels(&config.paths.domains).unwrap(),
            vec!["Automotive", "Avionics", "Railway"]
        );

        let ds = Dataset::open(&config.paths.dataset).expect("reopen");
        assert_eq!(ds.cell(1, "Domain"), Some("Railway"));
        assert_eq!(ds.cell(1, "Fault Injection"), Some("T1, T4, T5"));
        assert_eq!(ds.cell(1, "Targeted Threats"), Some("S, E"));

        let yaml = read(&config.paths.template);
        let parsed: IssueForm = serde_yaml::from_str(&yaml).expect("form yaml");
        let options = parsed
            .element("fault_injections")
            .and_then(|e| e.attributes.options.clone())
            .expect("options");
        assert_eq!(options[3], "T5 (Qux)");
        assert_eq!(options.last().map(String::as_str), Some(NA));
    }

    #[test]
    fn known_domain_other_does_not_regenerate_form() {
        let config = setup();
        let raw = body(&[(Field::Year, "2021"), (Field::DomainOther, "Avionics")]);

        let result = add_entry(&config, &raw, &SilentProgress).expect("add");
        assert!(!result.domain_added);
        assert!(!result.form_written);
        assert_eq!(load_labels(&config.paths.domains).unwrap().len(), 2);

        let ds = Dataset::open(&config.paths.dataset).expect("reopen");
        assert_eq!(ds.cell(1, "Domain"), Some("Avionics"));
    }

    #[test]
    fn dry_run_validates_without_writing() {
        let mut config = setup();
        config.dry_run = true;
        let dataset_before = read(&config.paths.dataset);

        let raw = body(&[(Field::Year, "2020"), (Field::FaultInjectionOther, "Laser")]);
        let result = add_entry(&config, &raw, &SilentProgress).expect("dry run");

        assert_eq!(result.new_fault_ids, vec![FaultId(4)]);
        assert_eq!(result.rows_before, result.rows_after);
        assert_eq!(read(&config.paths.dataset), dataset_before);
        assert_eq!(load_labels(&config.paths.fault_injections).unwrap().len(), 2);
    }

    #[test]
    fn fresh_repository_creates_dataset() {
        let root = std::env::temp_dir().join(format!("slrkit-pipeline-fresh-{}", uuid::Uuid::now_v7()));
        let config = AddEntryConfig {
            paths: PathsConfig::default().resolved_against(&root),
            form: FormConfig::default(),
            dry_run: false,
        };

        let result = add_entry(&config, &body(&[(Field::Year, "2018")]), &SilentProgress)
            .expect("add");
        assert_eq!(result.rows_after, 1);

        let ds = Dataset::open(&config.paths.dataset).expect("open");
        assert_eq!(ds.headers().len(), 20);
        assert_eq!(ds.cell(0, "Year"), Some("2018"));
    }

    #[test]
    fn regenerate_form_uses_stored_lists() {
        let config = setup();
        let issue_form = regenerate_form(&config.paths, &config.form).expect("form");
        let domains = issue_form
            .element("domain")
            .and_then(|e| e.attributes.options.clone())
            .expect("options");
        assert_eq!(domains[..2], ["Automotive".to_string(), "Avionics".to_string()]);
        assert!(config.paths.template.exists());
    }
}
