//! Schema validation
//!
//! Static checks of a parsed schema against platform constraints. Issues are
//! data, not errors: every rule runs over every field and all findings are
//! collected, tagged `error` (blocking) or `warning` (advisory).
//!
//! ## Rules
//! - `EMPTY_LABEL`: label is blank after trimming
//! - `EMPTY_OPTIONS`: selection field without options
//! - `MISSING_OPTION_LABEL` / `MISSING_OPTION_INDEX`: option entry lacks an attribute
//! - `EMPTY_EXPRESSION`: CALC field without an expression
//! - `MISSING_LINK_PROTOCOL`: LINK field without a protocol (warning)
//! - `INVALID_THUMBNAIL_SIZE`: FILE thumbnail outside the supported sizes
//! - `INVALID_REFERENCE_TABLE_SIZE`: REFERENCE_TABLE page size outside the supported sizes
//! - `EMPTY_RELATED_APP`: REFERENCE_TABLE without a related app
//! - `EMPTY_LOOKUP_RELATED_APP` / `EMPTY_LOOKUP_KEY_FIELD`: incomplete lookup

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::schema::{FieldCode, FieldDefinition, FieldProperties, Schema};

pub const EMPTY_LABEL: &str = "EMPTY_LABEL";
pub const EMPTY_OPTIONS: &str = "EMPTY_OPTIONS";
pub const MISSING_OPTION_LABEL: &str = "MISSING_OPTION_LABEL";
pub const MISSING_OPTION_INDEX: &str = "MISSING_OPTION_INDEX";
pub const EMPTY_EXPRESSION: &str = "EMPTY_EXPRESSION";
pub const MISSING_LINK_PROTOCOL: &str = "MISSING_LINK_PROTOCOL";
pub const INVALID_THUMBNAIL_SIZE: &str = "INVALID_THUMBNAIL_SIZE";
pub const INVALID_REFERENCE_TABLE_SIZE: &str = "INVALID_REFERENCE_TABLE_SIZE";
pub const EMPTY_RELATED_APP: &str = "EMPTY_RELATED_APP";
pub const EMPTY_LOOKUP_RELATED_APP: &str = "EMPTY_LOOKUP_RELATED_APP";
pub const EMPTY_LOOKUP_KEY_FIELD: &str = "EMPTY_LOOKUP_KEY_FIELD";

const THUMBNAIL_SIZES: [&str; 4] = ["50", "150", "250", "500"];
const REFERENCE_TABLE_SIZES: [&str; 8] = ["1", "3", "5", "10", "20", "30", "40", "50"];

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding about one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub rule: &'static str,
    pub field_code: FieldCode,
    pub message: String,
}

/// Result of validating a schema
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
    /// True when no issue has `error` severity
    pub is_valid: bool,
}

impl ValidationResult {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let is_valid = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { issues, is_valid }
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }
}

/// The schema validator
#[derive(Debug, Default, Clone)]
pub struct SchemaValidator {
    ignored_rules: HashSet<String>,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip a rule by code
    pub fn ignore_rule(mut self, rule: impl Into<String>) -> Self {
        self.ignored_rules.insert(rule.into());
        self
    }

    /// Validate every top-level field and every sub-table column
    pub fn validate(&self, schema: &Schema) -> ValidationResult {
        let mut issues = Vec::new();
        let mut visited: HashSet<&FieldCode> = HashSet::new();

        for field in schema.fields.values() {
            if visited.insert(&field.code) {
                self.validate_field(field, &mut issues);
            }
            if let Some(inner) = field.properties.subtable_fields() {
                for column in inner.values() {
                    if visited.insert(&column.code) {
                        self.validate_field(column, &mut issues);
                    }
                }
            }
        }

        issues.retain(|issue| !self.ignored_rules.contains(issue.rule));
        let result = ValidationResult::from_issues(issues);
        debug!(
            issues = result.issues.len(),
            valid = result.is_valid,
            "validated form schema"
        );
        result
    }

    fn validate_field(&self, field: &FieldDefinition, issues: &mut Vec<ValidationIssue>) {
        check_label(field, issues);
        check_options(field, issues);
        check_lookup(field, issues);

        match &field.properties {
            FieldProperties::Calc(p) => {
                if is_blank(p.expression.as_deref()) {
                    issues.push(error(
                        field,
                        EMPTY_EXPRESSION,
                        "CALC field requires an expression",
                    ));
                }
            }
            FieldProperties::Link(p) => {
                if p.protocol.is_none() {
                    issues.push(warning(
                        field,
                        MISSING_LINK_PROTOCOL,
                        "LINK field has no protocol; the platform default will apply",
                    ));
                }
            }
            FieldProperties::File(p) => {
                if let Some(size) = p.thumbnail_size.as_deref() {
                    if !THUMBNAIL_SIZES.contains(&size) {
                        issues.push(error(
                            field,
                            INVALID_THUMBNAIL_SIZE,
                            format!(
                                "thumbnailSize '{}' must be one of: {}",
                                size,
                                THUMBNAIL_SIZES.join(", ")
                            ),
                        ));
                    }
                }
            }
            FieldProperties::ReferenceTable(p) => {
                let table = &p.reference_table;
                if let Some(size) = table.size.as_deref() {
                    if !REFERENCE_TABLE_SIZES.contains(&size) {
                        issues.push(error(
                            field,
                            INVALID_REFERENCE_TABLE_SIZE,
                            format!(
                                "referenceTable.size '{}' must be one of: {}",
                                size,
                                REFERENCE_TABLE_SIZES.join(", ")
                            ),
                        ));
                    }
                }
                if table.related_app.app.trim().is_empty() {
                    issues.push(error(
                        field,
                        EMPTY_RELATED_APP,
                        "referenceTable.relatedApp.app must not be empty",
                    ));
                }
            }
            _ => {}
        }
    }
}

/// Validate a schema with the default rule set
pub fn validate(schema: &Schema) -> ValidationResult {
    SchemaValidator::new().validate(schema)
}

fn check_label(field: &FieldDefinition, issues: &mut Vec<ValidationIssue>) {
    if field.label.trim().is_empty() {
        issues.push(error(field, EMPTY_LABEL, "label must not be empty"));
    }
}

fn check_options(field: &FieldDefinition, issues: &mut Vec<ValidationIssue>) {
    let Some(options) = field.properties.options() else {
        return;
    };

    if options.is_empty() {
        issues.push(error(
            field,
            EMPTY_OPTIONS,
            format!("{} field requires at least one option", field.field_type()),
        ));
        return;
    }

    for (name, option) in options {
        if option.label.is_none() {
            issues.push(error(
                field,
                MISSING_OPTION_LABEL,
                format!("option '{}' is missing `label`", name),
            ));
        }
        if option.index.is_none() {
            issues.push(error(
                field,
                MISSING_OPTION_INDEX,
                format!("option '{}' is missing `index`", name),
            ));
        }
    }
}

fn check_lookup(field: &FieldDefinition, issues: &mut Vec<ValidationIssue>) {
    let Some(lookup) = field.properties.lookup() else {
        return;
    };

    if lookup.related_app.app.trim().is_empty() {
        issues.push(error(
            field,
            EMPTY_LOOKUP_RELATED_APP,
            "lookup.relatedApp.app must not be empty",
        ));
    }
    if lookup.related_key_field.trim().is_empty() {
        issues.push(error(
            field,
            EMPTY_LOOKUP_KEY_FIELD,
            "lookup.relatedKeyField must not be empty",
        ));
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn error(
    field: &FieldDefinition,
    rule: &'static str,
    message: impl Into<String>,
) -> ValidationIssue {
    issue(Severity::Error, field, rule, message)
}

fn warning(
    field: &FieldDefinition,
    rule: &'static str,
    message: impl Into<String>,
) -> ValidationIssue {
    issue(Severity::Warning, field, rule, message)
}

fn issue(
    severity: Severity,
    field: &FieldDefinition,
    rule: &'static str,
    message: impl Into<String>,
) -> ValidationIssue {
    ValidationIssue {
        severity,
        rule,
        field_code: field.code.clone(),
        message: message.into(),
    }
}
