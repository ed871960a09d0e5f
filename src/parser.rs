//! Schema parser
//!
//! Turns form schema text into a typed [`Schema`]. The text is tokenized into a
//! generic YAML tree first, then walked depth-first through the layout. The
//! walk is fail-fast: the first structural violation aborts the parse and no
//! partial schema is returned.
//!
//! Field codes share one namespace across the whole schema. Top-level fields,
//! fields nested in groups, group codes, sub-table codes and sub-table columns
//! are all registered in a single map, and every insertion re-checks for a
//! duplicate.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};
use tracing::{debug, trace};

use crate::error::{FormSchemaError, Result};
use crate::schema::scalar::{self, kind_name, scalar_to_string};
use crate::schema::{
    DecorationElement, DecorationKind, ElementSize, FieldCode, FieldDefinition, FieldMap,
    FieldProperties, FieldType, GroupLayout, GroupProperties, Layout, LayoutElement, LayoutItem,
    ReferenceTable, ReferenceTableLayout, ReferenceTableProperties, RowLayout, Schema,
    SubtableLayout, SubtableProperties, SystemFieldElement, SystemFieldType,
};

/// Keys that belong to the field line itself rather than its payload
const FIELD_LINE_KEYS: [&str; 5] = ["code", "type", "label", "noLabel", "size"];
const GROUP_KEYS: [&str; 6] = ["type", "code", "label", "noLabel", "openGroup", "layout"];
const SUBTABLE_KEYS: [&str; 5] = ["type", "code", "label", "noLabel", "fields"];
const REFERENCE_TABLE_KEYS: [&str; 5] = ["type", "code", "label", "noLabel", "referenceTable"];
const DECORATION_KEYS: [&str; 4] = ["type", "elementId", "label", "size"];
const SYSTEM_FIELD_KEYS: [&str; 3] = ["type", "code", "size"];
const ROW_KEYS: [&str; 2] = ["type", "fields"];
const REFERENCE_TABLE_REQUIRED: [&str; 3] = ["relatedApp", "condition", "displayFields"];

/// Where an element sits, which decides what it may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Row,
    Subtable,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawSize {
    #[serde(default, deserialize_with = "scalar::option_string")]
    width: Option<String>,
    #[serde(default, deserialize_with = "scalar::option_string")]
    height: Option<String>,
    #[serde(default, deserialize_with = "scalar::option_string")]
    inner_height: Option<String>,
}

/// Parser for form schema text
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaParser;

impl SchemaParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse schema text into a validated schema
    pub fn parse(&self, text: &str) -> Result<Schema> {
        if text.trim().is_empty() {
            return Err(FormSchemaError::EmptySchemaText);
        }

        let root: Value = serde_yaml_ng::from_str(text)
            .map_err(|e| FormSchemaError::InvalidSchemaFormat(e.to_string()))?;

        self.parse_value(&root)
    }

    /// Parse an already tokenized YAML tree
    pub fn parse_value(&self, root: &Value) -> Result<Schema> {
        let root = root.as_mapping().ok_or_else(|| {
            FormSchemaError::structure(format!(
                "top-level value must be a mapping, found {}",
                kind_name(root)
            ))
        })?;

        let layout_value = match root.get("layout") {
            Some(value) => value,
            None if root.get("fields").is_some() => {
                return Err(FormSchemaError::structure(
                    "found `fields` without `layout`; this is the legacy format, \
                     rewrite it as `layout: [...]`",
                ))
            }
            None => return Err(FormSchemaError::structure("missing `layout`")),
        };

        let items = layout_value.as_sequence().ok_or_else(|| {
            FormSchemaError::structure(format!(
                "`layout` must be a sequence, found {}",
                kind_name(layout_value)
            ))
        })?;

        let mut walker = Walker::default();
        let mut layout: Layout = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let path = format!("layout[{}]", index);
            layout.push(walker.layout_item(item, &path)?);
        }

        debug!(
            fields = walker.fields.len(),
            items = layout.len(),
            "parsed form schema"
        );

        Ok(Schema::new(walker.fields, layout))
    }
}

/// Parse schema text with the default parser
pub fn parse(text: &str) -> Result<Schema> {
    SchemaParser::new().parse(text)
}

/// Accumulates the global field map during one parse
#[derive(Default)]
struct Walker {
    fields: FieldMap,
}

impl Walker {
    fn register(&mut self, field: FieldDefinition) -> Result<()> {
        if self.fields.contains_key(&field.code) {
            return Err(FormSchemaError::DuplicateFieldCode(field.code.into_inner()));
        }
        trace!(code = %field.code, field_type = %field.field_type(), "registered field");
        self.fields.insert(field.code.clone(), field);
        Ok(())
    }

    fn layout_item(&mut self, value: &Value, path: &str) -> Result<LayoutItem> {
        let map = expect_mapping(value, path)?;
        let item_type = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| FormSchemaError::layout(format!("{}: missing `type`", path)))?;

        match item_type {
            "ROW" => self.row(map, path).map(LayoutItem::Row),
            "GROUP" => self.group(map, path).map(LayoutItem::Group),
            "SUBTABLE" => self.subtable(map, path).map(LayoutItem::Subtable),
            "REFERENCE_TABLE" => self.reference_table(map, path).map(LayoutItem::ReferenceTable),
            other => Err(FormSchemaError::layout(format!(
                "{}: unknown layout item type `{}`",
                path, other
            ))),
        }
    }

    fn row(&mut self, map: &Mapping, path: &str) -> Result<RowLayout> {
        reject_unknown_keys(map, &ROW_KEYS, path)?;
        let elements = required_sequence(map, "fields", path)?;
        let mut fields = Vec::with_capacity(elements.len());

        for (index, element) in elements.iter().enumerate() {
            let element_path = format!("{}.fields[{}]", path, index);
            let element = layout_element(element, &element_path, Scope::Row)?;
            if let LayoutElement::Field { field, .. } = &element {
                self.register(field.clone())?;
            }
            fields.push(element);
        }

        Ok(RowLayout { fields })
    }

    fn group(&mut self, map: &Mapping, path: &str) -> Result<GroupLayout> {
        reject_unknown_keys(map, &GROUP_KEYS, path)?;
        let code = field_code(map, path)?;
        let label = required_text(map, "label", path)?;
        let no_label = optional_bool(map, "noLabel", path)?;
        let open_group = optional_bool(map, "openGroup", path)?;

        let rows = required_sequence(map, "layout", path)?;
        let mut layout = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let row_path = format!("{}.layout[{}]", path, index);
            let row_map = expect_mapping(row, &row_path)?;
            match row_map.get("type").and_then(Value::as_str) {
                Some("ROW") => layout.push(self.row(row_map, &row_path)?),
                Some(other) => {
                    return Err(FormSchemaError::layout(format!(
                        "{}: groups may only contain ROW items, found `{}`",
                        row_path, other
                    )))
                }
                None => {
                    return Err(FormSchemaError::layout(format!(
                        "{}: missing `type`",
                        row_path
                    )))
                }
            }
        }

        let members: Vec<&FieldCode> = layout
            .iter()
            .flat_map(|row| row.fields.iter().filter_map(LayoutElement::field_code))
            .collect();
        trace!(group = %code, members = members.len(), "collected group members");

        let definition = FieldDefinition {
            code: code.clone(),
            label: label.clone(),
            no_label,
            properties: FieldProperties::Group(GroupProperties { open_group }),
        };
        self.register(definition)?;

        Ok(GroupLayout {
            code,
            label,
            no_label,
            open_group,
            layout,
        })
    }

    fn subtable(&mut self, map: &Mapping, path: &str) -> Result<SubtableLayout> {
        reject_unknown_keys(map, &SUBTABLE_KEYS, path)?;
        let code = field_code(map, path)?;
        let label = required_text(map, "label", path)?;
        let no_label = optional_bool(map, "noLabel", path)?;

        let elements = required_sequence(map, "fields", path)?;
        let mut fields = Vec::with_capacity(elements.len());
        let mut inner = FieldMap::new();
        for (index, element) in elements.iter().enumerate() {
            let element_path = format!("{}.fields[{}]", path, index);
            let element = layout_element(element, &element_path, Scope::Subtable)?;
            if let LayoutElement::Field { field, .. } = &element {
                if inner.contains_key(&field.code) {
                    return Err(FormSchemaError::DuplicateFieldCode(field.code.to_string()));
                }
                inner.insert(field.code.clone(), field.clone());
            }
            fields.push(element);
        }

        let definition = FieldDefinition {
            code: code.clone(),
            label: label.clone(),
            no_label,
            properties: FieldProperties::Subtable(SubtableProperties {
                fields: inner.clone(),
            }),
        };
        self.register(definition)?;
        for (_, field) in inner {
            self.register(field)?;
        }

        Ok(SubtableLayout {
            code,
            label,
            no_label,
            fields,
        })
    }

    fn reference_table(&mut self, map: &Mapping, path: &str) -> Result<ReferenceTableLayout> {
        reject_unknown_keys(map, &REFERENCE_TABLE_KEYS, path)?;
        let code = field_code(map, path)?;
        let label = required_text(map, "label", path)?;
        let no_label = optional_bool(map, "noLabel", path)?;

        let settings = match map.get("referenceTable") {
            Some(Value::Mapping(settings)) => settings,
            Some(other) => {
                return Err(FormSchemaError::structure(format!(
                    "{}: `referenceTable` must be a mapping, found {}",
                    path,
                    kind_name(other)
                )))
            }
            None => {
                return Err(FormSchemaError::structure(format!(
                    "{}: REFERENCE_TABLE `{}` is missing `referenceTable`",
                    path, code
                )))
            }
        };
        for key in REFERENCE_TABLE_REQUIRED {
            if settings.get(key).is_none() {
                return Err(FormSchemaError::structure(format!(
                    "{}: REFERENCE_TABLE `{}` is missing `referenceTable.{}`",
                    path, code, key
                )));
            }
        }
        let reference_table: ReferenceTable =
            decode(Value::Mapping(settings.clone()), &code)?;

        let definition = FieldDefinition {
            code: code.clone(),
            label: label.clone(),
            no_label,
            properties: FieldProperties::ReferenceTable(ReferenceTableProperties {
                reference_table,
            }),
        };
        self.register(definition)?;

        Ok(ReferenceTableLayout {
            code,
            label,
            no_label,
        })
    }
}

fn layout_element(value: &Value, path: &str, scope: Scope) -> Result<LayoutElement> {
    let map = expect_mapping(value, path)?;
    let type_name = map.get("type").and_then(Value::as_str);

    if let Some(kind) = type_name.and_then(|t| t.parse::<DecorationKind>().ok()) {
        return decoration(map, kind, path).map(LayoutElement::Decoration);
    }

    let system_type = match type_name {
        Some(t) => t.parse::<SystemFieldType>().ok(),
        None => map
            .get("code")
            .and_then(Value::as_str)
            .and_then(|c| c.parse::<SystemFieldType>().ok()),
    };
    if let Some(field_type) = system_type {
        return system_field(map, field_type, path).map(LayoutElement::SystemField);
    }

    let (field, size) = field_definition(map, path, scope)?;
    Ok(LayoutElement::Field { field, size })
}

fn decoration(map: &Mapping, kind: DecorationKind, path: &str) -> Result<DecorationElement> {
    for key in map.keys() {
        let known = key.as_str().map_or(false, |k| DECORATION_KEYS.contains(&k));
        if !known || (key.as_str() == Some("label") && kind != DecorationKind::Label) {
            return Err(FormSchemaError::InvalidDecorationElement(format!(
                "{}: unexpected key {:?} on {} decoration",
                path,
                key.as_str().unwrap_or("<non-string>"),
                kind.as_str()
            )));
        }
    }

    let element_id = match map.get("elementId") {
        Some(value) => scalar_to_string(value).map_err(|e| {
            FormSchemaError::InvalidDecorationElement(format!("{}: `elementId` {}", path, e))
        })?,
        None => {
            return Err(FormSchemaError::InvalidDecorationElement(format!(
                "{}: {} decoration is missing `elementId`",
                path,
                kind.as_str()
            )))
        }
    };

    let label = match map.get("label") {
        Some(value) => Some(scalar_to_string(value).map_err(|e| {
            FormSchemaError::InvalidDecorationElement(format!("{}: `label` {}", path, e))
        })?),
        None => None,
    };

    Ok(DecorationElement {
        kind,
        element_id,
        label,
        size: element_size(map.get("size"), path)?,
    })
}

fn system_field(
    map: &Mapping,
    field_type: SystemFieldType,
    path: &str,
) -> Result<SystemFieldElement> {
    reject_unknown_keys(map, &SYSTEM_FIELD_KEYS, path)?;
    let code = match map.get("code") {
        Some(value) => scalar_to_string(value)
            .map_err(|e| FormSchemaError::structure(format!("{}: `code` {}", path, e)))?,
        None => field_type.as_str().to_string(),
    };

    Ok(SystemFieldElement {
        code,
        field_type,
        size: element_size(map.get("size"), path)?,
    })
}

fn field_definition(
    map: &Mapping,
    path: &str,
    scope: Scope,
) -> Result<(FieldDefinition, Option<ElementSize>)> {
    let type_name = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| FormSchemaError::structure(format!("{}: field is missing `type`", path)))?;
    let field_type: FieldType = type_name.parse()?;

    if field_type.is_layout_container() {
        return Err(match scope {
            Scope::Row => FormSchemaError::layout(format!(
                "{}: {} must be declared as a layout item, not inside a row",
                path, field_type
            )),
            Scope::Subtable => FormSchemaError::structure(format!(
                "{}: sub-tables cannot contain {} fields",
                path, field_type
            )),
        });
    }

    let code = field_code(map, path)?;
    let label = required_text(map, "label", path)?;
    let no_label = optional_bool(map, "noLabel", path)?;
    let size = element_size(map.get("size"), path)?;

    let payload: Mapping = map
        .iter()
        .filter(|(key, _)| {
            key.as_str()
                .map_or(true, |k| !FIELD_LINE_KEYS.contains(&k))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let payload = Value::Mapping(payload);

    let properties = match field_type {
        FieldType::SingleLineText => FieldProperties::SingleLineText(decode(payload, &code)?),
        FieldType::MultiLineText => FieldProperties::MultiLineText(decode(payload, &code)?),
        FieldType::RichText => FieldProperties::RichText(decode(payload, &code)?),
        FieldType::Number => FieldProperties::Number(decode(payload, &code)?),
        FieldType::Calc => FieldProperties::Calc(decode(payload, &code)?),
        FieldType::CheckBox => FieldProperties::CheckBox(decode(payload, &code)?),
        FieldType::RadioButton => FieldProperties::RadioButton(decode(payload, &code)?),
        FieldType::MultiSelect => FieldProperties::MultiSelect(decode(payload, &code)?),
        FieldType::DropDown => FieldProperties::DropDown(decode(payload, &code)?),
        FieldType::Date => FieldProperties::Date(decode(payload, &code)?),
        FieldType::Time => FieldProperties::Time(decode(payload, &code)?),
        FieldType::DateTime => FieldProperties::DateTime(decode(payload, &code)?),
        FieldType::Link => FieldProperties::Link(decode(payload, &code)?),
        FieldType::UserSelect => FieldProperties::UserSelect(decode(payload, &code)?),
        FieldType::OrganizationSelect => {
            FieldProperties::OrganizationSelect(decode(payload, &code)?)
        }
        FieldType::GroupSelect => FieldProperties::GroupSelect(decode(payload, &code)?),
        FieldType::File => FieldProperties::File(decode(payload, &code)?),
        FieldType::Group | FieldType::Subtable | FieldType::ReferenceTable => {
            unreachable!("layout containers are rejected above")
        }
    };

    let field = FieldDefinition {
        code,
        label,
        no_label,
        properties,
    };
    Ok((field, size))
}

fn decode<T: DeserializeOwned>(payload: Value, code: &FieldCode) -> Result<T> {
    serde_yaml_ng::from_value(payload)
        .map_err(|e| FormSchemaError::structure(format!("field `{}`: {}", code, e)))
}

fn element_size(value: Option<&Value>, path: &str) -> Result<Option<ElementSize>> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value @ Value::Mapping(_)) => value,
        Some(other) => {
            return Err(FormSchemaError::structure(format!(
                "{}: `size` must be a mapping, found {}",
                path,
                kind_name(other)
            )))
        }
    };

    let raw: RawSize = serde_yaml_ng::from_value(value.clone())
        .map_err(|e| FormSchemaError::structure(format!("{}: `size` {}", path, e)))?;
    let size = ElementSize {
        width: raw.width,
        height: raw.height,
        inner_height: raw.inner_height,
    };

    Ok(if size.is_empty() { None } else { Some(size) })
}

fn expect_mapping<'a>(value: &'a Value, path: &str) -> Result<&'a Mapping> {
    value.as_mapping().ok_or_else(|| {
        FormSchemaError::layout(format!(
            "{}: expected a mapping, found {}",
            path,
            kind_name(value)
        ))
    })
}

fn required_sequence<'a>(map: &'a Mapping, key: &str, path: &str) -> Result<&'a Vec<Value>> {
    match map.get(key) {
        Some(Value::Sequence(items)) => Ok(items),
        Some(other) => Err(FormSchemaError::layout(format!(
            "{}: `{}` must be a sequence, found {}",
            path,
            key,
            kind_name(other)
        ))),
        None => Err(FormSchemaError::layout(format!("{}: missing `{}`", path, key))),
    }
}

fn field_code(map: &Mapping, path: &str) -> Result<FieldCode> {
    FieldCode::new(required_text(map, "code", path)?)
}

fn required_text(map: &Mapping, key: &str, path: &str) -> Result<String> {
    let value = map
        .get(key)
        .ok_or_else(|| FormSchemaError::structure(format!("{}: missing `{}`", path, key)))?;
    scalar_to_string(value)
        .map_err(|e| FormSchemaError::structure(format!("{}: `{}` {}", path, key, e)))
}

fn optional_bool(map: &Mapping, key: &str, path: &str) -> Result<Option<bool>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(other) => Err(FormSchemaError::structure(format!(
            "{}: `{}` must be a boolean, found {}",
            path,
            key,
            kind_name(other)
        ))),
    }
}

fn reject_unknown_keys(map: &Mapping, allowed: &[&str], path: &str) -> Result<()> {
    for key in map.keys() {
        match key.as_str() {
            Some(k) if allowed.contains(&k) => {}
            Some(k) => {
                return Err(FormSchemaError::structure(format!(
                    "{}: unexpected key `{}`",
                    path, k
                )))
            }
            None => {
                return Err(FormSchemaError::structure(format!(
                    "{}: keys must be strings",
                    path
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        Align, CalcFormat, LinkProtocol, SingleLineTextProperties, UnitPosition,
    };

    fn error_code(text: &str) -> &'static str {
        parse(text).unwrap_err().code()
    }

    #[test]
    fn test_single_text_field() {
        let schema = parse(
            r#"
layout:
  - type: ROW
    fields:
      - code: name
        type: SINGLE_LINE_TEXT
        label: "名前"
        required: true
"#,
        )
        .unwrap();

        assert_eq!(schema.fields.len(), 1);
        let field = schema.field("name").unwrap();
        assert_eq!(field.label, "名前");
        assert_eq!(field.no_label, None);
        assert_eq!(
            field.properties,
            FieldProperties::SingleLineText(SingleLineTextProperties {
                required: Some(true),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(error_code(""), "EmptySchemaText");
        assert_eq!(error_code("   \n\t "), "EmptySchemaText");
    }

    #[test]
    fn test_invalid_yaml() {
        assert_eq!(error_code("layout: [unclosed"), "InvalidSchemaFormat");
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        assert_eq!(error_code("- a\n- b"), "InvalidSchemaStructure");
        assert_eq!(error_code("just text"), "InvalidSchemaStructure");
    }

    #[test]
    fn test_legacy_format_detected() {
        let err = parse("fields:\n  name:\n    type: SINGLE_LINE_TEXT").unwrap_err();
        assert_eq!(err.code(), "InvalidSchemaStructure");
        assert!(err.to_string().contains("legacy"));
    }

    #[test]
    fn test_layout_missing_or_not_sequence() {
        assert_eq!(error_code("title: x"), "InvalidSchemaStructure");
        assert_eq!(error_code("layout: {}"), "InvalidSchemaStructure");
    }

    #[test]
    fn test_json_input_accepted() {
        let schema = parse(
            r#"{"layout": [{"type": "ROW", "fields": [
                {"code": "n", "type": "NUMBER", "label": "N", "minValue": 0}
            ]}]}"#,
        )
        .unwrap();
        assert!(schema.field("n").is_some());
    }

    #[test]
    fn test_unknown_field_type() {
        let text = r#"
layout:
  - type: ROW
    fields:
      - code: name
        type: TEXT
        label: Name
"#;
        assert_eq!(error_code(text), "InvalidFieldType");
    }

    #[test]
    fn test_unknown_layout_item_type() {
        assert_eq!(
            error_code("layout:\n  - type: COLUMN\n    fields: []"),
            "InvalidLayoutStructure"
        );
    }

    #[test]
    fn test_numeric_scalars_normalized() {
        let schema = parse(
            r#"
layout:
  - type: ROW
    fields:
      - code: amount
        type: NUMBER
        label: Amount
        minValue: 0
        maxValue: 100
        displayScale: 2
        unitPosition: AFTER
"#,
        )
        .unwrap();

        match &schema.field("amount").unwrap().properties {
            FieldProperties::Number(p) => {
                assert_eq!(p.min_value.as_deref(), Some("0"));
                assert_eq!(p.max_value.as_deref(), Some("100"));
                assert_eq!(p.display_scale.as_deref(), Some("2"));
                assert_eq!(p.unit_position, Some(UnitPosition::After));
            }
            other => panic!("Expected NUMBER, got {:?}", other),
        }
    }

    #[test]
    fn test_enum_properties_rejected_out_of_range() {
        let cases = [
            ("NUMBER", "unitPosition: LEFT"),
            ("CALC", "format: PERCENT"),
            ("CHECK_BOX", "align: DIAGONAL"),
            ("LINK", "protocol: FTP"),
        ];
        for (field_type, property) in cases {
            let text = format!(
                "layout:\n  - type: ROW\n    fields:\n      - code: f\n        type: {}\n        label: F\n        {}\n",
                field_type, property
            );
            assert_eq!(error_code(&text), "InvalidSchemaStructure", "{}", field_type);
        }
    }

    #[test]
    fn test_enum_properties_accepted() {
        let schema = parse(
            r#"
layout:
  - type: ROW
    fields:
      - {code: total, type: CALC, label: Total, expression: "a*b", format: NUMBER_DIGIT}
      - {code: site, type: LINK, label: Site, protocol: WEB}
      - code: color
        type: RADIO_BUTTON
        label: Color
        align: VERTICAL
        options:
          red: {label: Red, index: 0}
"#,
        )
        .unwrap();

        match &schema.field("total").unwrap().properties {
            FieldProperties::Calc(p) => assert_eq!(p.format, Some(CalcFormat::NumberDigit)),
            other => panic!("Expected CALC, got {:?}", other),
        }
        match &schema.field("site").unwrap().properties {
            FieldProperties::Link(p) => assert_eq!(p.protocol, Some(LinkProtocol::Web)),
            other => panic!("Expected LINK, got {:?}", other),
        }
        match &schema.field("color").unwrap().properties {
            FieldProperties::RadioButton(p) => {
                assert_eq!(p.align, Some(Align::Vertical));
                assert_eq!(p.options["red"].index.as_deref(), Some("0"));
            }
            other => panic!("Expected RADIO_BUTTON, got {:?}", other),
        }
    }

    #[test]
    fn test_selection_defaults_normalized() {
        let schema = parse(
            r#"
layout:
  - type: ROW
    fields:
      - {code: a, type: DROP_DOWN, label: A, defaultValue: [x], options: {x: {label: X, index: 0}}}
      - {code: b, type: CHECK_BOX, label: B, defaultValue: x, options: {x: {label: X, index: 0}}}
      - {code: c, type: RADIO_BUTTON, label: C, defaultValue: "", options: {x: {label: X, index: 0}}}
      - {code: d, type: MULTI_SELECT, label: D, defaultValue: [], options: {x: {label: X, index: 0}}}
"#,
        )
        .unwrap();

        match &schema.field("a").unwrap().properties {
            FieldProperties::DropDown(p) => assert_eq!(p.default_value.as_deref(), Some("x")),
            other => panic!("Expected DROP_DOWN, got {:?}", other),
        }
        match &schema.field("b").unwrap().properties {
            FieldProperties::CheckBox(p) => {
                assert_eq!(p.default_value, Some(vec!["x".to_string()]))
            }
            other => panic!("Expected CHECK_BOX, got {:?}", other),
        }
        match &schema.field("c").unwrap().properties {
            FieldProperties::RadioButton(p) => assert_eq!(p.default_value, None),
            other => panic!("Expected RADIO_BUTTON, got {:?}", other),
        }
        match &schema.field("d").unwrap().properties {
            FieldProperties::MultiSelect(p) => assert_eq!(p.default_value, None),
            other => panic!("Expected MULTI_SELECT, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_option_keys() {
        let schema = parse(
            r#"
layout:
  - type: ROW
    fields:
      - code: rating
        type: RADIO_BUTTON
        label: Rating
        defaultValue: [1]
        options:
          1: {label: One, index: 0}
          2: {label: Two, index: 1}
"#,
        )
        .unwrap();

        match &schema.field("rating").unwrap().properties {
            FieldProperties::RadioButton(p) => {
                let keys: Vec<&str> = p.options.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["1", "2"]);
                assert_eq!(p.options["2"].label.as_deref(), Some("Two"));
                assert_eq!(p.default_value.as_deref(), Some("1"));
            }
            other => panic!("Expected RADIO_BUTTON, got {:?}", other),
        }
    }

    #[test]
    fn test_option_keys_colliding_after_normalization() {
        let text = r#"
layout:
  - type: ROW
    fields:
      - code: rating
        type: DROP_DOWN
        label: Rating
        options:
          1: {label: One, index: 0}
          "1": {label: Uno, index: 1}
"#;
        assert_eq!(error_code(text), "InvalidSchemaStructure");
    }

    #[test]
    fn test_numeric_reference_codes_normalized() {
        let schema = parse(
            r#"
layout:
  - type: ROW
    fields:
      - code: score
        type: NUMBER
        label: Score
        lookup:
          relatedApp: {app: 7}
          relatedKeyField: 3
          fieldMappings:
            - {field: 1, relatedField: 2}
          lookupPickerFields: [10, name]
  - type: REFERENCE_TABLE
    code: history
    label: History
    referenceTable:
      relatedApp: {app: 12}
      condition: {field: 5, relatedField: 6}
      displayFields: [100, amount]
"#,
        )
        .unwrap();

        match &schema.field("score").unwrap().properties {
            FieldProperties::Number(p) => {
                let lookup = p.lookup.as_ref().unwrap();
                assert_eq!(lookup.related_key_field, "3");
                assert_eq!(lookup.field_mappings[0].field, "1");
                assert_eq!(lookup.field_mappings[0].related_field, "2");
                assert_eq!(lookup.lookup_picker_fields, vec!["10", "name"]);
            }
            other => panic!("Expected NUMBER, got {:?}", other),
        }
        match &schema.field("history").unwrap().properties {
            FieldProperties::ReferenceTable(p) => {
                let table = &p.reference_table;
                assert_eq!(table.condition.field.as_str(), "5");
                assert_eq!(table.condition.related_field.as_str(), "6");
                let columns: Vec<&str> = table.display_fields.iter().map(|c| c.as_str()).collect();
                assert_eq!(columns, vec!["100", "amount"]);
            }
            other => panic!("Expected REFERENCE_TABLE, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_reference_code_rejected() {
        let text = r#"
layout:
  - type: ROW
    fields:
      - code: score
        type: NUMBER
        label: Score
        lookup:
          relatedApp: {app: 7}
          relatedKeyField: id
          lookupPickerFields: [true]
"#;
        assert_eq!(error_code(text), "InvalidSchemaStructure");
    }

    #[test]
    fn test_unknown_property_rejected() {
        let text = r#"
layout:
  - type: ROW
    fields:
      - {code: memo, type: MULTI_LINE_TEXT, label: Memo, maxLength: 10}
"#;
        assert_eq!(error_code(text), "InvalidSchemaStructure");
    }

    #[test]
    fn test_group_registers_members_and_itself() {
        let schema = parse(
            r#"
layout:
  - type: GROUP
    code: details
    label: Details
    openGroup: true
    layout:
      - type: ROW
        fields:
          - {code: note, type: MULTI_LINE_TEXT, label: Note}
"#,
        )
        .unwrap();

        let codes: Vec<&str> = schema.fields.keys().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["note", "details"]);
        match &schema.field("details").unwrap().properties {
            FieldProperties::Group(p) => assert_eq!(p.open_group, Some(true)),
            other => panic!("Expected GROUP, got {:?}", other),
        }
        match &schema.layout[0] {
            LayoutItem::Group(group) => {
                assert_eq!(group.open_group, Some(true));
                assert_eq!(group.layout.len(), 1);
            }
            other => panic!("Expected GROUP item, got {:?}", other),
        }
    }

    #[test]
    fn test_group_rejects_non_row_children() {
        let text = r#"
layout:
  - type: GROUP
    code: g
    label: G
    layout:
      - type: SUBTABLE
        code: t
        label: T
        fields: []
"#;
        assert_eq!(error_code(text), "InvalidLayoutStructure");
    }

    #[test]
    fn test_subtable_registers_table_and_columns() {
        let schema = parse(
            r#"
layout:
  - type: SUBTABLE
    code: items
    label: Items
    fields:
      - {code: item_name, type: SINGLE_LINE_TEXT, label: Name}
      - {code: qty, type: NUMBER, label: Qty}
"#,
        )
        .unwrap();

        let codes: Vec<&str> = schema.fields.keys().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["items", "item_name", "qty"]);
        let inner = schema
            .field("items")
            .unwrap()
            .properties
            .subtable_fields()
            .unwrap();
        assert_eq!(inner.len(), 2);
        assert!(inner.contains_key("qty"));
    }

    #[test]
    fn test_subtable_cannot_nest_containers() {
        let text = r#"
layout:
  - type: SUBTABLE
    code: outer
    label: Outer
    fields:
      - {code: inner, type: SUBTABLE, label: Inner}
"#;
        assert_eq!(error_code(text), "InvalidSchemaStructure");
    }

    #[test]
    fn test_container_inside_row_rejected() {
        let text = r#"
layout:
  - type: ROW
    fields:
      - {code: g, type: GROUP, label: G}
"#;
        assert_eq!(error_code(text), "InvalidLayoutStructure");
    }

    #[test]
    fn test_duplicate_between_top_level_and_subtable() {
        let text = r#"
layout:
  - type: ROW
    fields:
      - {code: name, type: SINGLE_LINE_TEXT, label: Name}
  - type: SUBTABLE
    code: items
    label: Items
    fields:
      - {code: name, type: SINGLE_LINE_TEXT, label: Item name}
"#;
        assert_eq!(error_code(text), "DuplicateFieldCode");
    }

    #[test]
    fn test_duplicate_within_subtable() {
        let text = r#"
layout:
  - type: SUBTABLE
    code: items
    label: Items
    fields:
      - {code: a, type: NUMBER, label: A}
      - {code: a, type: NUMBER, label: A again}
"#;
        assert_eq!(error_code(text), "DuplicateFieldCode");
    }

    #[test]
    fn test_duplicate_group_code() {
        let text = r#"
layout:
  - type: ROW
    fields:
      - {code: info, type: SINGLE_LINE_TEXT, label: Info}
  - type: GROUP
    code: info
    label: Info group
    layout: []
"#;
        assert_eq!(error_code(text), "DuplicateFieldCode");
    }

    #[test]
    fn test_reference_table_requires_settings() {
        let missing = r#"
layout:
  - type: REFERENCE_TABLE
    code: orders
    label: Orders
"#;
        assert_eq!(error_code(missing), "InvalidSchemaStructure");

        let partial = r#"
layout:
  - type: REFERENCE_TABLE
    code: orders
    label: Orders
    referenceTable:
      relatedApp: {app: 12}
      condition: {field: customer_id, relatedField: customer_id}
"#;
        let err = parse(partial).unwrap_err();
        assert_eq!(err.code(), "InvalidSchemaStructure");
        assert!(err.to_string().contains("displayFields"));
    }

    #[test]
    fn test_reference_table_parsed() {
        let schema = parse(
            r#"
layout:
  - type: REFERENCE_TABLE
    code: orders
    label: Orders
    noLabel: true
    referenceTable:
      relatedApp: {app: 12}
      condition: {field: customer_id, relatedField: customer_id}
      displayFields: [order_no, amount]
      size: 5
"#,
        )
        .unwrap();

        let field = schema.field("orders").unwrap();
        assert_eq!(field.no_label, Some(true));
        match &field.properties {
            FieldProperties::ReferenceTable(p) => {
                let table = &p.reference_table;
                assert_eq!(table.related_app.app, "12");
                assert_eq!(table.size.as_deref(), Some("5"));
                let columns: Vec<&str> = table.display_fields.iter().map(|c| c.as_str()).collect();
                assert_eq!(columns, vec!["order_no", "amount"]);
            }
            other => panic!("Expected REFERENCE_TABLE, got {:?}", other),
        }
    }

    #[test]
    fn test_decorations_and_system_fields() {
        let schema = parse(
            r#"
layout:
  - type: ROW
    fields:
      - {type: LABEL, elementId: title, label: "<b>Order</b>", size: {width: 200}}
      - {type: SPACER, elementId: gap}
      - {type: RECORD_NUMBER, code: record_no}
      - {code: CREATOR}
"#,
        )
        .unwrap();

        assert!(schema.fields.is_empty());
        let LayoutItem::Row(row) = &schema.layout[0] else {
            panic!("Expected ROW");
        };
        match &row.fields[0] {
            LayoutElement::Decoration(d) => {
                assert_eq!(d.kind, DecorationKind::Label);
                assert_eq!(d.size.as_ref().unwrap().width.as_deref(), Some("200"));
            }
            other => panic!("Expected decoration, got {:?}", other),
        }
        match &row.fields[2] {
            LayoutElement::SystemField(s) => {
                assert_eq!(s.field_type, SystemFieldType::RecordNumber);
                assert_eq!(s.code, "record_no");
            }
            other => panic!("Expected system field, got {:?}", other),
        }
        match &row.fields[3] {
            LayoutElement::SystemField(s) => assert_eq!(s.field_type, SystemFieldType::Creator),
            other => panic!("Expected system field, got {:?}", other),
        }
    }

    #[test]
    fn test_system_field_unknown_key_rejected() {
        let text = r#"
layout:
  - type: ROW
    fields:
      - {type: CREATOR, code: creator, label: X}
"#;
        assert_eq!(error_code(text), "InvalidSchemaStructure");
    }

    #[test]
    fn test_row_unknown_key_rejected() {
        let text = r#"
layout:
  - type: ROW
    label: Header
    fields:
      - {code: d, type: DATE, label: D}
"#;
        assert_eq!(error_code(text), "InvalidSchemaStructure");
    }

    #[test]
    fn test_decoration_without_element_id() {
        let text = "layout:\n  - type: ROW\n    fields:\n      - {type: HR}\n";
        assert_eq!(error_code(text), "InvalidDecorationElement");
    }

    #[test]
    fn test_empty_field_code() {
        let text = "layout:\n  - type: ROW\n    fields:\n      - {code: '', type: DATE, label: D}\n";
        assert_eq!(error_code(text), "EmptyFieldCode");
    }

    #[test]
    fn test_empty_size_dropped() {
        let schema = parse(
            "layout:\n  - type: ROW\n    fields:\n      - {code: d, type: DATE, label: D, size: {}}\n",
        )
        .unwrap();
        let LayoutItem::Row(row) = &schema.layout[0] else {
            panic!("Expected ROW");
        };
        match &row.fields[0] {
            LayoutElement::Field { size, .. } => assert!(size.is_none()),
            other => panic!("Expected field, got {:?}", other),
        }
    }
}
