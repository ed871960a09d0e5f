//! Diff detection between a local schema and a previously fetched remote one
//!
//! Produces an itemized list of added, modified and deleted fields. Entries
//! are always ordered added → modified → deleted; within one kind they keep
//! the order they were found in.

use serde::Serialize;
use tracing::debug;

use crate::schema::{FieldCode, FieldDefinition, FieldMap, FieldProperties, Layout, Schema};

/// Kind of change to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    Added,
    Modified,
    Deleted,
}

/// One changed field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffEntry {
    #[serde(rename = "type")]
    pub diff_type: DiffType,
    pub field_code: FieldCode,
    pub field_label: String,
    /// Human-readable description of the change
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<FieldDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<FieldDefinition>,
}

impl DiffEntry {
    fn added(field: &FieldDefinition) -> Self {
        Self {
            diff_type: DiffType::Added,
            field_code: field.code.clone(),
            field_label: field.label.clone(),
            details: format!("{} field added", field.field_type()),
            before: None,
            after: Some(field.clone()),
        }
    }

    fn modified(before: &FieldDefinition, after: &FieldDefinition) -> Self {
        Self {
            diff_type: DiffType::Modified,
            field_code: after.code.clone(),
            field_label: after.label.clone(),
            details: describe_changes(before, after),
            before: Some(before.clone()),
            after: Some(after.clone()),
        }
    }

    fn deleted(field: &FieldDefinition) -> Self {
        Self {
            diff_type: DiffType::Deleted,
            field_code: field.code.clone(),
            field_label: field.label.clone(),
            details: format!("{} field deleted", field.field_type()),
            before: Some(field.clone()),
            after: None,
        }
    }
}

/// Counts per change kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub total: usize,
}

/// Result of a field diff
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormDiff {
    pub entries: Vec<DiffEntry>,
    pub summary: DiffSummary,
}

impl FormDiff {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn added(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.diff_type == DiffType::Added)
    }

    pub fn modified(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.diff_type == DiffType::Modified)
    }

    pub fn deleted(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.diff_type == DiffType::Deleted)
    }
}

/// Sort entries into added, modified, deleted order and count them
pub fn build_diff_result(mut entries: Vec<DiffEntry>) -> FormDiff {
    entries.sort_by_key(|e| e.diff_type);

    let count = |kind: DiffType| entries.iter().filter(|e| e.diff_type == kind).count();
    let summary = DiffSummary {
        added: count(DiffType::Added),
        modified: count(DiffType::Modified),
        deleted: count(DiffType::Deleted),
        total: entries.len(),
    };

    FormDiff { entries, summary }
}

/// Structural diff of form fields
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffDetector;

impl DiffDetector {
    pub fn new() -> Self {
        Self
    }

    /// Compare a local schema against the fields currently on the platform
    pub fn detect(&self, schema: &Schema, current: &FieldMap) -> FormDiff {
        self.detect_fields(&schema.fields, current)
    }

    /// Compare two field maps
    pub fn detect_fields(&self, local: &FieldMap, current: &FieldMap) -> FormDiff {
        let mut entries = Vec::new();

        for (code, field) in local {
            match current.get(code) {
                None => entries.push(DiffEntry::added(field)),
                Some(existing) if !fields_equal(existing, field) => {
                    entries.push(DiffEntry::modified(existing, field))
                }
                Some(_) => {}
            }
        }

        for (code, field) in current {
            if !local.contains_key(code) {
                entries.push(DiffEntry::deleted(field));
            }
        }

        let diff = build_diff_result(entries);
        debug!(
            added = diff.summary.added,
            modified = diff.summary.modified,
            deleted = diff.summary.deleted,
            "detected field changes"
        );
        diff
    }

    /// True when two layout trees differ anywhere
    pub fn detect_layout_changes(&self, a: &Layout, b: &Layout) -> bool {
        a != b
    }
}

/// Compare a local schema against the current field map with the default detector
pub fn detect(schema: &Schema, current: &FieldMap) -> FormDiff {
    DiffDetector::new().detect(schema, current)
}

/// True when two layout trees differ anywhere
pub fn detect_layout_changes(a: &Layout, b: &Layout) -> bool {
    DiffDetector::new().detect_layout_changes(a, b)
}

/// Variant-aware field equality
pub fn fields_equal(a: &FieldDefinition, b: &FieldDefinition) -> bool {
    a.code == b.code
        && a.label == b.label
        && a.no_label == b.no_label
        && properties_equal(&a.properties, &b.properties)
}

fn properties_equal(a: &FieldProperties, b: &FieldProperties) -> bool {
    match (a, b) {
        (FieldProperties::Subtable(a), FieldProperties::Subtable(b)) => {
            field_maps_equal(&a.fields, &b.fields)
        }
        (FieldProperties::ReferenceTable(a), FieldProperties::ReferenceTable(b)) => {
            a.reference_table == b.reference_table
        }
        _ => a == b,
    }
}

/// Key-set equality plus per-key field equality
fn field_maps_equal(a: &FieldMap, b: &FieldMap) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(code, field)| {
        b.get(code)
            .map_or(false, |other| fields_equal(field, other))
    })
}

fn describe_changes(before: &FieldDefinition, after: &FieldDefinition) -> String {
    let mut changes = Vec::new();

    if before.field_type() != after.field_type() {
        changes.push(format!(
            "type: {} -> {}",
            before.field_type(),
            after.field_type()
        ));
    }
    if before.label != after.label {
        changes.push(format!("label: {} -> {}", before.label, after.label));
    }
    if before.no_label != after.no_label {
        changes.push(format!(
            "noLabel: {} -> {}",
            display_flag(before.no_label),
            display_flag(after.no_label)
        ));
    }
    if payloads_differ(&before.properties, &after.properties) {
        changes.push("properties changed".to_string());
    }

    if changes.is_empty() {
        "no visible changes".to_string()
    } else {
        changes.join(", ")
    }
}

/// Payload comparison ignoring the `type` tag
fn payloads_differ(a: &FieldProperties, b: &FieldProperties) -> bool {
    if a.field_type() == b.field_type() {
        return !properties_equal(a, b);
    }
    match (untagged_payload(a), untagged_payload(b)) {
        (Some(a), Some(b)) => a != b,
        _ => true,
    }
}

fn untagged_payload(properties: &FieldProperties) -> Option<serde_json::Value> {
    let mut value = serde_json::to_value(properties).ok()?;
    if let Some(map) = value.as_object_mut() {
        map.remove("type");
    }
    Some(value)
}

fn display_flag(flag: Option<bool>) -> String {
    flag.map_or_else(|| "unset".to_string(), |f| f.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::schema::{
        NumberProperties, ReferenceCondition, ReferenceTable, ReferenceTableProperties,
        RelatedApp, SingleLineTextProperties, SubtableProperties,
    };

    fn code(s: &str) -> FieldCode {
        FieldCode::new(s).unwrap()
    }

    fn text(name: &str, label: &str) -> FieldDefinition {
        FieldDefinition::new(
            code(name),
            label,
            FieldProperties::SingleLineText(SingleLineTextProperties::default()),
        )
    }

    fn map(fields: Vec<FieldDefinition>) -> FieldMap {
        fields.into_iter().map(|f| (f.code.clone(), f)).collect()
    }

    fn reference(display: &[&str]) -> FieldDefinition {
        FieldDefinition::new(
            code("orders"),
            "Orders",
            FieldProperties::ReferenceTable(ReferenceTableProperties {
                reference_table: ReferenceTable {
                    related_app: RelatedApp {
                        app: "10".to_string(),
                        code: None,
                    },
                    condition: ReferenceCondition {
                        field: code("id"),
                        related_field: code("customer"),
                    },
                    display_fields: display.iter().map(|d| code(d)).collect(),
                    filter_cond: None,
                    sort: None,
                    size: None,
                },
            }),
        )
    }

    #[test]
    fn test_identical_schema_has_no_changes() {
        let schema = parse(
            r#"
layout:
  - type: ROW
    fields:
      - {code: name, type: SINGLE_LINE_TEXT, label: Name}
  - type: SUBTABLE
    code: lines
    label: Lines
    fields:
      - {code: qty, type: NUMBER, label: Qty}
"#,
        )
        .unwrap();
        let diff = detect(&schema, &schema.fields);
        assert!(diff.is_empty());
        assert_eq!(diff.summary, DiffSummary::default());
    }

    #[test]
    fn test_subtable_against_empty_map() {
        let schema = parse(
            r#"
layout:
  - type: SUBTABLE
    code: lines
    label: Lines
    fields:
      - {code: item, type: SINGLE_LINE_TEXT, label: Item}
      - {code: qty, type: NUMBER, label: Qty}
"#,
        )
        .unwrap();
        let diff = detect(&schema, &FieldMap::new());
        assert_eq!(diff.summary.added, 3);
        assert_eq!(diff.summary.total, 3);
        assert!(diff.entries.iter().all(|e| e.after.is_some() && e.before.is_none()));
        let codes: Vec<&str> = diff.entries.iter().map(|e| e.field_code.as_str()).collect();
        assert_eq!(codes, vec!["lines", "item", "qty"]);
    }

    #[test]
    fn test_label_change_is_single_modification() {
        let local = map(vec![text("name", "Full name"), text("memo", "Memo")]);
        let current = map(vec![text("name", "Name"), text("memo", "Memo")]);

        let diff = DiffDetector::new().detect_fields(&local, &current);
        assert_eq!(diff.entries.len(), 1);
        let entry = &diff.entries[0];
        assert_eq!(entry.diff_type, DiffType::Modified);
        assert_eq!(entry.field_code, code("name"));
        assert!(entry.details.contains("label:"));
        assert_eq!(entry.details, "label: Name -> Full name");
        assert!(entry.before.is_some() && entry.after.is_some());
    }

    #[test]
    fn test_entries_partitioned_by_kind() {
        let local = map(vec![
            text("changed", "After"),
            text("new_one", "New"),
            text("new_two", "New"),
        ]);
        let current = map(vec![
            text("gone", "Gone"),
            text("changed", "Before"),
        ]);

        let diff = DiffDetector::new().detect_fields(&local, &current);
        let kinds: Vec<DiffType> = diff.entries.iter().map(|e| e.diff_type).collect();
        assert_eq!(
            kinds,
            vec![
                DiffType::Added,
                DiffType::Added,
                DiffType::Modified,
                DiffType::Deleted
            ]
        );
        let codes: Vec<&str> = diff.entries.iter().map(|e| e.field_code.as_str()).collect();
        assert_eq!(codes, vec!["new_one", "new_two", "changed", "gone"]);
        assert_eq!(
            diff.summary,
            DiffSummary {
                added: 2,
                modified: 1,
                deleted: 1,
                total: 4
            }
        );
    }

    #[test]
    fn test_type_and_properties_details() {
        let before = text("amount", "Amount");
        let after = FieldDefinition::new(
            code("amount"),
            "Amount",
            FieldProperties::Number(NumberProperties::default()),
        )
        .with_no_label(true);

        let diff = DiffDetector::new().detect_fields(&map(vec![after]), &map(vec![before]));
        assert_eq!(
            diff.entries[0].details,
            "type: SINGLE_LINE_TEXT -> NUMBER, noLabel: unset -> true"
        );

        let before = text("name", "Name");
        let mut after = text("name", "Name");
        after.properties = FieldProperties::SingleLineText(SingleLineTextProperties {
            required: Some(true),
            ..Default::default()
        });
        let diff = DiffDetector::new().detect_fields(&map(vec![after]), &map(vec![before]));
        assert_eq!(diff.entries[0].details, "properties changed");
    }

    #[test]
    fn test_type_change_with_different_payload() {
        let before = FieldDefinition::new(
            code("limit"),
            "Limit",
            FieldProperties::SingleLineText(SingleLineTextProperties {
                max_length: Some("10".to_string()),
                ..Default::default()
            }),
        );
        let after = FieldDefinition::new(
            code("limit"),
            "Limit",
            FieldProperties::Number(NumberProperties {
                min_value: Some("1".to_string()),
                ..Default::default()
            }),
        );

        let diff = DiffDetector::new().detect_fields(&map(vec![after]), &map(vec![before]));
        assert_eq!(
            diff.entries[0].details,
            "type: SINGLE_LINE_TEXT -> NUMBER, properties changed"
        );
    }

    #[test]
    fn test_no_visible_changes() {
        let mut current = FieldMap::new();
        current.insert(code("alias"), text("original", "Same"));
        let mut local = FieldMap::new();
        local.insert(code("alias"), text("renamed", "Same"));

        let diff = DiffDetector::new().detect_fields(&local, &current);
        assert_eq!(diff.entries.len(), 1);
        assert_eq!(diff.entries[0].details, "no visible changes");
    }

    #[test]
    fn test_subtable_inner_changes() {
        let table = |inner: Vec<FieldDefinition>| {
            FieldDefinition::new(
                code("lines"),
                "Lines",
                FieldProperties::Subtable(SubtableProperties { fields: map(inner) }),
            )
        };

        let a = table(vec![text("x", "X"), text("y", "Y")]);
        let reordered = table(vec![text("y", "Y"), text("x", "X")]);
        let smaller = table(vec![text("x", "X")]);
        let relabeled = table(vec![text("x", "X"), text("y", "Why")]);

        assert!(fields_equal(&a, &reordered));
        assert!(!fields_equal(&a, &smaller));
        assert!(!fields_equal(&a, &relabeled));
    }

    #[test]
    fn test_reference_display_field_order_matters() {
        assert!(fields_equal(&reference(&["a", "b"]), &reference(&["a", "b"])));
        assert!(!fields_equal(&reference(&["a", "b"]), &reference(&["b", "a"])));
    }

    #[test]
    fn test_layout_change_detection() {
        let a = parse(
            r#"
layout:
  - type: ROW
    fields:
      - {code: a, type: DATE, label: A}
      - {code: b, type: DATE, label: B}
"#,
        )
        .unwrap();
        let b = parse(
            r#"
layout:
  - type: ROW
    fields:
      - {code: b, type: DATE, label: B}
      - {code: a, type: DATE, label: A}
"#,
        )
        .unwrap();

        assert!(!detect_layout_changes(&a.layout, &a.layout.clone()));
        assert!(detect_layout_changes(&a.layout, &b.layout));
        assert!(detect(&a, &b.fields).is_empty());
    }

    #[test]
    fn test_diff_serializes_with_type_tag() {
        let schema =
            parse("layout:\n  - type: ROW\n    fields:\n      - {code: a, type: DATE, label: A}\n")
                .unwrap();
        let diff = detect(&schema, &FieldMap::new());
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["entries"][0]["type"], "added");
        assert_eq!(json["entries"][0]["fieldCode"], "a");
        assert_eq!(json["entries"][0]["after"]["type"], "DATE");
        assert_eq!(json["summary"]["total"], 1);
    }
}
