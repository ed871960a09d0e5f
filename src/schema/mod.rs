//! Schema types and structures
//!
//! A [`Schema`] pairs the authoritative field map with the layout tree that
//! places those fields on the form. Field maps keep insertion order, which
//! drives serialization and layout rendering.

mod field;
mod field_code;
mod layout;
pub(crate) mod scalar;

use indexmap::IndexMap;

pub use field::{
    Align, CalcFormat, CalcProperties, DateProperties, Entity, EntitySelectProperties,
    FieldDefinition, FieldMapping, FieldProperties, FieldType, FileProperties, GroupProperties,
    LinkProperties, LinkProtocol, Lookup, MultiChoiceProperties, NumberProperties,
    ReferenceCondition, ReferenceTable, ReferenceTableProperties, RelatedApp, SelectOption,
    SelectOptions, SingleChoiceProperties, SingleLineTextProperties, SubtableProperties,
    TextAreaProperties, TimeProperties, UnitPosition,
};
pub use field_code::FieldCode;
pub use layout::{
    DecorationElement, DecorationKind, ElementSize, GroupLayout, Layout, LayoutElement,
    LayoutItem, ReferenceTableLayout, RowLayout, SubtableLayout, SystemFieldElement,
    SystemFieldType,
};

/// Field definitions keyed by code, in declaration order
pub type FieldMap = IndexMap<FieldCode, FieldDefinition>;

/// A parsed form schema
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Every field placed anywhere in the layout, sub-table columns included
    pub fields: FieldMap,
    /// Visual arrangement of the fields
    pub layout: Layout,
}

impl Schema {
    /// Create a schema from its parts
    pub fn new(fields: FieldMap, layout: Layout) -> Self {
        Self { fields, layout }
    }

    /// Look up a field definition by code
    pub fn field(&self, code: &str) -> Option<&FieldDefinition> {
        self.fields.get(code)
    }

    /// Number of field definitions, sub-table columns included
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
