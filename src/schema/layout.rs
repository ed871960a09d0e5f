//! Layout tree: rows, groups, sub-tables and reference tables

use std::fmt;
use std::str::FromStr;

use super::{FieldCode, FieldDefinition};

/// Element dimensions. Values are strings, as the platform reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSize {
    pub width: Option<String>,
    pub height: Option<String>,
    pub inner_height: Option<String>,
}

impl ElementSize {
    /// True when no dimension is set
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.inner_height.is_none()
    }
}

/// Non-field layout decorations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Label,
    Spacer,
    Hr,
}

impl DecorationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecorationKind::Label => "LABEL",
            DecorationKind::Spacer => "SPACER",
            DecorationKind::Hr => "HR",
        }
    }
}

impl FromStr for DecorationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LABEL" => Ok(DecorationKind::Label),
            "SPACER" => Ok(DecorationKind::Spacer),
            "HR" => Ok(DecorationKind::Hr),
            _ => Err(()),
        }
    }
}

/// Platform-reserved fields that may be placed in a layout but never appear
/// in the field map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemFieldType {
    RecordNumber,
    Creator,
    CreatedTime,
    Modifier,
    UpdatedTime,
    Category,
    Status,
    StatusAssignee,
}

impl SystemFieldType {
    pub const ALL: [SystemFieldType; 8] = [
        SystemFieldType::RecordNumber,
        SystemFieldType::Creator,
        SystemFieldType::CreatedTime,
        SystemFieldType::Modifier,
        SystemFieldType::UpdatedTime,
        SystemFieldType::Category,
        SystemFieldType::Status,
        SystemFieldType::StatusAssignee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemFieldType::RecordNumber => "RECORD_NUMBER",
            SystemFieldType::Creator => "CREATOR",
            SystemFieldType::CreatedTime => "CREATED_TIME",
            SystemFieldType::Modifier => "MODIFIER",
            SystemFieldType::UpdatedTime => "UPDATED_TIME",
            SystemFieldType::Category => "CATEGORY",
            SystemFieldType::Status => "STATUS",
            SystemFieldType::StatusAssignee => "STATUS_ASSIGNEE",
        }
    }
}

impl FromStr for SystemFieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemFieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for SystemFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecorationElement {
    pub kind: DecorationKind,
    pub element_id: String,
    /// Text of a LABEL decoration
    pub label: Option<String>,
    pub size: Option<ElementSize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemFieldElement {
    pub code: String,
    pub field_type: SystemFieldType,
    pub size: Option<ElementSize>,
}

/// One cell of a row or sub-table
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutElement {
    Field {
        field: FieldDefinition,
        size: Option<ElementSize>,
    },
    Decoration(DecorationElement),
    SystemField(SystemFieldElement),
}

impl LayoutElement {
    /// Code of the business field placed here, if any
    pub fn field_code(&self) -> Option<&FieldCode> {
        match self {
            LayoutElement::Field { field, .. } => Some(&field.code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowLayout {
    pub fields: Vec<LayoutElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    pub code: FieldCode,
    pub label: String,
    pub no_label: Option<bool>,
    pub open_group: Option<bool>,
    pub layout: Vec<RowLayout>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtableLayout {
    pub code: FieldCode,
    pub label: String,
    pub no_label: Option<bool>,
    pub fields: Vec<LayoutElement>,
}

/// Reference tables keep their columns in the field map only
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTableLayout {
    pub code: FieldCode,
    pub label: String,
    pub no_label: Option<bool>,
}

/// Top-level layout entry
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutItem {
    Row(RowLayout),
    Group(GroupLayout),
    Subtable(SubtableLayout),
    ReferenceTable(ReferenceTableLayout),
}

impl LayoutItem {
    /// Wire discriminator of this item
    pub fn type_name(&self) -> &'static str {
        match self {
            LayoutItem::Row(_) => "ROW",
            LayoutItem::Group(_) => "GROUP",
            LayoutItem::Subtable(_) => "SUBTABLE",
            LayoutItem::ReferenceTable(_) => "REFERENCE_TABLE",
        }
    }
}

/// Ordered sequence of layout items
pub type Layout = Vec<LayoutItem>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_size() {
        assert!(ElementSize::default().is_empty());
        let size = ElementSize {
            inner_height: Some("120".to_string()),
            ..Default::default()
        };
        assert!(!size.is_empty());
    }

    #[test]
    fn test_reserved_names() {
        assert_eq!("STATUS_ASSIGNEE".parse(), Ok(SystemFieldType::StatusAssignee));
        assert!("NAME".parse::<SystemFieldType>().is_err());
        assert_eq!("HR".parse(), Ok(DecorationKind::Hr));
        assert!("ROW".parse::<DecorationKind>().is_err());
    }
}
