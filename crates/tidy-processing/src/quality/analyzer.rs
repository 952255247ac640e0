use crate::cleaner::normalize_text;
use crate::error::Result;
use crate::pipeline::zscore_outlier_mask;
use crate::table::Table;
use crate::types::{DataQualityIssue, IssueKind, Severity, TableProfile};
use crate::utils::{numeric_values, text_values};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const MAX_EXAMPLES: usize = 5;

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Detect quality issues the cleaning steps can address.
    ///
    /// `z_threshold` is the absolute z-score used to flag potential outliers.
    pub fn identify_issues(
        table: &Table,
        profile: &TableProfile,
        z_threshold: f64,
    ) -> Result<Vec<DataQualityIssue>> {
        let mut issues = Vec::new();

        issues.extend(Self::analyze_missing_values(profile));
        issues.extend(Self::analyze_duplicates(profile));
        issues.extend(Self::analyze_text_consistency(table)?);
        issues.extend(Self::analyze_outliers(table, z_threshold)?);
        issues.extend(Self::analyze_constant_columns(profile));

        debug!("Identified {} data quality issues", issues.len());
        Ok(issues)
    }

    fn analyze_missing_values(profile: &TableProfile) -> Vec<DataQualityIssue> {
        profile
            .column_profiles
            .iter()
            .filter(|col| col.missing_count > 0)
            .map(|col| {
                let severity = if col.missing_percentage > 30.0 {
                    Severity::High
                } else if col.missing_percentage > 5.0 {
                    Severity::Medium
                } else {
                    Severity::Low
                };
                DataQualityIssue {
                    issue_type: IssueKind::MissingValues,
                    severity,
                    column: Some(col.name.clone()),
                    description: format!(
                        "{} missing values ({:.2}%)",
                        col.missing_count, col.missing_percentage
                    ),
                    affected_count: col.missing_count,
                    examples: Vec::new(),
                }
            })
            .collect()
    }

    fn analyze_duplicates(profile: &TableProfile) -> Option<DataQualityIssue> {
        if profile.duplicate_count == 0 {
            return None;
        }
        let severity = if profile.duplicate_percentage > 10.0 {
            Severity::High
        } else {
            Severity::Medium
        };
        Some(DataQualityIssue {
            issue_type: IssueKind::DuplicateRows,
            severity,
            column: None,
            description: format!(
                "{} exact duplicate rows ({:.2}%)",
                profile.duplicate_count, profile.duplicate_percentage
            ),
            affected_count: profile.duplicate_count,
            examples: Vec::new(),
        })
    }

    /// Text values that differ only by case or surrounding whitespace.
    fn analyze_text_consistency(table: &Table) -> Result<Vec<DataQualityIssue>> {
        let mut issues = Vec::new();

        for col_name in table.text_columns() {
            let values = text_values(table.series(&col_name)?)?;

            let mut variants: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
            for v in values.iter().flatten() {
                variants
                    .entry(normalize_text(v))
                    .or_default()
                    .insert(v.as_str());
            }

            let inconsistent: Vec<(&String, &BTreeSet<&str>)> =
                variants.iter().filter(|(_, raw)| raw.len() > 1).collect();
            if inconsistent.is_empty() {
                continue;
            }

            let affected_count = values
                .iter()
                .flatten()
                .filter(|v| {
                    variants
                        .get(&normalize_text(v))
                        .is_some_and(|raw| raw.len() > 1)
                })
                .count();
            let examples = inconsistent
                .iter()
                .flat_map(|(_, raw)| raw.iter().map(|v| format!("'{}'", v)))
                .take(MAX_EXAMPLES)
                .collect();

            issues.push(DataQualityIssue {
                issue_type: IssueKind::InconsistentText,
                severity: Severity::Medium,
                column: Some(col_name.clone()),
                description: format!(
                    "{} values spelled with inconsistent case or whitespace",
                    inconsistent.len()
                ),
                affected_count,
                examples,
            });
        }

        Ok(issues)
    }

    fn analyze_outliers(table: &Table, z_threshold: f64) -> Result<Vec<DataQualityIssue>> {
        let mut issues = Vec::new();

        for col_name in table.numeric_columns() {
            let values = numeric_values(table.series(&col_name)?)?;
            let mask = zscore_outlier_mask(&values, z_threshold);

            let flagged: Vec<f64> = values
                .iter()
                .zip(&mask)
                .filter(|(_, is_outlier)| **is_outlier)
                .filter_map(|(v, _)| *v)
                .collect();
            if flagged.is_empty() {
                continue;
            }

            issues.push(DataQualityIssue {
                issue_type: IssueKind::PotentialOutliers,
                severity: Severity::Medium,
                column: Some(col_name.clone()),
                description: format!(
                    "{} values with |z| >= {}",
                    flagged.len(),
                    z_threshold
                ),
                affected_count: flagged.len(),
                examples: flagged
                    .iter()
                    .take(MAX_EXAMPLES)
                    .map(|v| format!("{:.2}", v))
                    .collect(),
            });
        }

        Ok(issues)
    }

    fn analyze_constant_columns(profile: &TableProfile) -> Vec<DataQualityIssue> {
        if profile.shape.0 < 2 {
            return Vec::new();
        }
        profile
            .column_profiles
            .iter()
            .filter(|col| col.unique_count == 1)
            .map(|col| DataQualityIssue {
                issue_type: IssueKind::ConstantColumn,
                severity: Severity::Low,
                column: Some(col.name.clone()),
                description: "Column has a single distinct value".to_string(),
                affected_count: profile.shape.0 - col.missing_count,
                examples: col.sample_values.iter().take(1).cloned().collect(),
            })
            .collect()
    }
}
