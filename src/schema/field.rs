//! Field definitions: the closed set of field kinds and their property payloads.
//!
//! Each field kind carries its own payload struct. Payloads deserialize with
//! `deny_unknown_fields` so an unexpected key is reported instead of dropped,
//! and every API-facing scalar constraint is held as a string.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::scalar;
use super::{FieldCode, FieldMap};
use crate::error::FormSchemaError;

/// Discriminator of a field definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    SingleLineText,
    MultiLineText,
    RichText,
    Number,
    Calc,
    CheckBox,
    RadioButton,
    MultiSelect,
    DropDown,
    Date,
    Time,
    #[serde(rename = "DATETIME")]
    DateTime,
    Link,
    UserSelect,
    OrganizationSelect,
    GroupSelect,
    File,
    Group,
    Subtable,
    ReferenceTable,
}

impl FieldType {
    /// Every field type, in declaration order
    pub const ALL: [FieldType; 20] = [
        FieldType::SingleLineText,
        FieldType::MultiLineText,
        FieldType::RichText,
        FieldType::Number,
        FieldType::Calc,
        FieldType::CheckBox,
        FieldType::RadioButton,
        FieldType::MultiSelect,
        FieldType::DropDown,
        FieldType::Date,
        FieldType::Time,
        FieldType::DateTime,
        FieldType::Link,
        FieldType::UserSelect,
        FieldType::OrganizationSelect,
        FieldType::GroupSelect,
        FieldType::File,
        FieldType::Group,
        FieldType::Subtable,
        FieldType::ReferenceTable,
    ];

    /// Wire name of this type (e.g. `SINGLE_LINE_TEXT`)
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::SingleLineText => "SINGLE_LINE_TEXT",
            FieldType::MultiLineText => "MULTI_LINE_TEXT",
            FieldType::RichText => "RICH_TEXT",
            FieldType::Number => "NUMBER",
            FieldType::Calc => "CALC",
            FieldType::CheckBox => "CHECK_BOX",
            FieldType::RadioButton => "RADIO_BUTTON",
            FieldType::MultiSelect => "MULTI_SELECT",
            FieldType::DropDown => "DROP_DOWN",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::DateTime => "DATETIME",
            FieldType::Link => "LINK",
            FieldType::UserSelect => "USER_SELECT",
            FieldType::OrganizationSelect => "ORGANIZATION_SELECT",
            FieldType::GroupSelect => "GROUP_SELECT",
            FieldType::File => "FILE",
            FieldType::Group => "GROUP",
            FieldType::Subtable => "SUBTABLE",
            FieldType::ReferenceTable => "REFERENCE_TABLE",
        }
    }

    /// Types that are declared as layout items rather than row elements
    pub fn is_layout_container(&self) -> bool {
        matches!(
            self,
            FieldType::Group | FieldType::Subtable | FieldType::ReferenceTable
        )
    }

    /// Selection types that must declare `options`
    pub fn is_selection(&self) -> bool {
        matches!(
            self,
            FieldType::CheckBox
                | FieldType::RadioButton
                | FieldType::MultiSelect
                | FieldType::DropDown
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FormSchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FormSchemaError::InvalidFieldType(s.to_string()))
    }
}

/// Where a unit is displayed relative to the value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitPosition {
    Before,
    After,
}

/// Display format of a calculated value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalcFormat {
    Number,
    NumberDigit,
    Date,
    Time,
    #[serde(rename = "DATETIME")]
    DateTime,
    HourMinute,
    DayHourMinute,
}

/// Orientation of check box and radio button options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Align {
    Horizontal,
    Vertical,
}

/// Kind of link rendered by a LINK field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkProtocol {
    Web,
    Call,
    Mail,
}

/// App targeted by a lookup or reference table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelatedApp {
    #[serde(default, deserialize_with = "scalar::string")]
    pub app: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub code: Option<String>,
}

/// One copied field of a lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldMapping {
    #[serde(deserialize_with = "scalar::string")]
    pub field: String,
    #[serde(deserialize_with = "scalar::string")]
    pub related_field: String,
}

/// Lookup settings shared by SINGLE_LINE_TEXT, NUMBER and LINK
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Lookup {
    #[serde(default)]
    pub related_app: RelatedApp,
    #[serde(default, deserialize_with = "scalar::string")]
    pub related_key_field: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_mappings: Vec<FieldMapping>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "scalar::string_list"
    )]
    pub lookup_picker_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_cond: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// One choice of a selection field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SelectOption {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub label: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub index: Option<String>,
}

/// Options keyed by option name, in declaration order
pub type SelectOptions = IndexMap<String, SelectOption>;

/// A user, group or organization referenced by an entity-select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(deserialize_with = "scalar::string")]
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SingleLineTextProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub max_length: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub min_length: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_expression: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<Lookup>,
}

/// Payload of MULTI_LINE_TEXT and RICH_TEXT
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextAreaProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumberProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub max_value: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub min_value: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digit: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub display_scale: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_position: Option<UnitPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<Lookup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalcProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<CalcFormat>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub display_scale: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_position: Option<UnitPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_expression: Option<bool>,
}

/// Payload of CHECK_BOX and MULTI_SELECT
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MultiChoiceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "scalar::string_keyed"
    )]
    pub options: SelectOptions,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::multi_default"
    )]
    pub default_value: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

/// Payload of RADIO_BUTTON and DROP_DOWN
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SingleChoiceProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "scalar::string_keyed"
    )]
    pub options: SelectOptions,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::single_default"
    )]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

/// Payload of DATE and DATETIME
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DateProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_now_value: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_now_value: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LinkProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub max_length: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub min_length: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<LinkProtocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<Lookup>,
}

/// Payload of USER_SELECT, ORGANIZATION_SELECT and GROUP_SELECT
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntitySelectProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<Entity>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Vec<Entity>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub thumbnail_size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_group: Option<bool>,
}

/// Columns of a sub-table. Inner fields never nest further.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubtableProperties {
    pub fields: FieldMap,
}

/// Join condition between this app and the referenced app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReferenceCondition {
    pub field: FieldCode,
    pub related_field: FieldCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReferenceTable {
    pub related_app: RelatedApp,
    pub condition: ReferenceCondition,
    /// Columns shown from the related app; order is significant
    pub display_fields: Vec<FieldCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_cond: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar::option_string"
    )]
    pub size: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableProperties {
    pub reference_table: ReferenceTable,
}

/// Variant-specific payload, tagged by field type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldProperties {
    SingleLineText(SingleLineTextProperties),
    MultiLineText(TextAreaProperties),
    RichText(TextAreaProperties),
    Number(NumberProperties),
    Calc(CalcProperties),
    CheckBox(MultiChoiceProperties),
    RadioButton(SingleChoiceProperties),
    MultiSelect(MultiChoiceProperties),
    DropDown(SingleChoiceProperties),
    Date(DateProperties),
    Time(TimeProperties),
    #[serde(rename = "DATETIME")]
    DateTime(DateProperties),
    Link(LinkProperties),
    UserSelect(EntitySelectProperties),
    OrganizationSelect(EntitySelectProperties),
    GroupSelect(EntitySelectProperties),
    File(FileProperties),
    Group(GroupProperties),
    Subtable(SubtableProperties),
    ReferenceTable(ReferenceTableProperties),
}

impl FieldProperties {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldProperties::SingleLineText(_) => FieldType::SingleLineText,
            FieldProperties::MultiLineText(_) => FieldType::MultiLineText,
            FieldProperties::RichText(_) => FieldType::RichText,
            FieldProperties::Number(_) => FieldType::Number,
            FieldProperties::Calc(_) => FieldType::Calc,
            FieldProperties::CheckBox(_) => FieldType::CheckBox,
            FieldProperties::RadioButton(_) => FieldType::RadioButton,
            FieldProperties::MultiSelect(_) => FieldType::MultiSelect,
            FieldProperties::DropDown(_) => FieldType::DropDown,
            FieldProperties::Date(_) => FieldType::Date,
            FieldProperties::Time(_) => FieldType::Time,
            FieldProperties::DateTime(_) => FieldType::DateTime,
            FieldProperties::Link(_) => FieldType::Link,
            FieldProperties::UserSelect(_) => FieldType::UserSelect,
            FieldProperties::OrganizationSelect(_) => FieldType::OrganizationSelect,
            FieldProperties::GroupSelect(_) => FieldType::GroupSelect,
            FieldProperties::File(_) => FieldType::File,
            FieldProperties::Group(_) => FieldType::Group,
            FieldProperties::Subtable(_) => FieldType::Subtable,
            FieldProperties::ReferenceTable(_) => FieldType::ReferenceTable,
        }
    }

    /// Lookup settings, for the kinds that support them
    pub fn lookup(&self) -> Option<&Lookup> {
        match self {
            FieldProperties::SingleLineText(p) => p.lookup.as_ref(),
            FieldProperties::Number(p) => p.lookup.as_ref(),
            FieldProperties::Link(p) => p.lookup.as_ref(),
            _ => None,
        }
    }

    /// Options of a selection field
    pub fn options(&self) -> Option<&SelectOptions> {
        match self {
            FieldProperties::CheckBox(p) | FieldProperties::MultiSelect(p) => Some(&p.options),
            FieldProperties::RadioButton(p) | FieldProperties::DropDown(p) => Some(&p.options),
            _ => None,
        }
    }

    /// Inner fields of a sub-table
    pub fn subtable_fields(&self) -> Option<&FieldMap> {
        match self {
            FieldProperties::Subtable(p) => Some(&p.fields),
            _ => None,
        }
    }
}

/// A typed field definition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub code: FieldCode,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_label: Option<bool>,
    #[serde(flatten)]
    pub properties: FieldProperties,
}

impl FieldDefinition {
    /// Create a field definition without a `noLabel` flag
    pub fn new(code: FieldCode, label: impl Into<String>, properties: FieldProperties) -> Self {
        Self {
            code,
            label: label.into(),
            no_label: None,
            properties,
        }
    }

    /// Set the `noLabel` flag
    pub fn with_no_label(mut self, no_label: bool) -> Self {
        self.no_label = Some(no_label);
        self
    }

    pub fn field_type(&self) -> FieldType {
        self.properties.field_type()
    }
}
