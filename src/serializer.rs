//! Schema serialization: the structural inverse of the parser
//!
//! Output is deterministic for a given layout and field map. Keys are emitted
//! in a fixed order (`type`, `code`, `label`, `noLabel`, properties, `size`),
//! optional flags only when explicitly set.

use serde_yaml_ng::{Mapping, Value};

use crate::error::Result;
use crate::schema::{
    DecorationElement, DecorationKind, ElementSize, FieldDefinition, FieldMap, FieldProperties,
    GroupLayout, Layout, LayoutElement, LayoutItem, ReferenceTableLayout, RowLayout,
    SubtableLayout, SystemFieldElement,
};

/// Renders layouts back to schema text
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaSerializer;

impl SchemaSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize `layout` to YAML text.
    ///
    /// With `fields`, REFERENCE_TABLE items carry their full `referenceTable`
    /// block; without it they are written sparsely as code and label only.
    pub fn serialize(&self, layout: &Layout, fields: Option<&FieldMap>) -> Result<String> {
        let document = self.to_value(layout, fields)?;
        Ok(serde_yaml_ng::to_string(&document)?)
    }

    /// Build the document tree without rendering it
    pub fn to_value(&self, layout: &Layout, fields: Option<&FieldMap>) -> Result<Value> {
        let items = layout
            .iter()
            .map(|item| layout_item(item, fields))
            .collect::<Result<Vec<_>>>()?;

        let mut root = Mapping::new();
        root.insert(key("layout"), Value::Sequence(items));
        Ok(Value::Mapping(root))
    }
}

/// Serialize `layout` with the default serializer
pub fn serialize(layout: &Layout, fields: Option<&FieldMap>) -> Result<String> {
    SchemaSerializer::new().serialize(layout, fields)
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn text(value: &str) -> Value {
    Value::String(value.to_string())
}

fn layout_item(item: &LayoutItem, fields: Option<&FieldMap>) -> Result<Value> {
    match item {
        LayoutItem::Row(row) => row_item(row),
        LayoutItem::Group(group) => group_item(group),
        LayoutItem::Subtable(table) => subtable_item(table),
        LayoutItem::ReferenceTable(table) => reference_table_item(table, fields),
    }
}

fn row_item(row: &RowLayout) -> Result<Value> {
    let mut map = Mapping::new();
    map.insert(key("type"), text("ROW"));
    map.insert(key("fields"), elements(&row.fields)?);
    Ok(Value::Mapping(map))
}

fn group_item(group: &GroupLayout) -> Result<Value> {
    let mut map = Mapping::new();
    map.insert(key("type"), text("GROUP"));
    map.insert(key("code"), text(group.code.as_str()));
    map.insert(key("label"), text(&group.label));
    if let Some(no_label) = group.no_label {
        map.insert(key("noLabel"), Value::Bool(no_label));
    }
    if let Some(open_group) = group.open_group {
        map.insert(key("openGroup"), Value::Bool(open_group));
    }
    let rows = group
        .layout
        .iter()
        .map(row_item)
        .collect::<Result<Vec<_>>>()?;
    map.insert(key("layout"), Value::Sequence(rows));
    Ok(Value::Mapping(map))
}

fn subtable_item(table: &SubtableLayout) -> Result<Value> {
    let mut map = Mapping::new();
    map.insert(key("type"), text("SUBTABLE"));
    map.insert(key("code"), text(table.code.as_str()));
    map.insert(key("label"), text(&table.label));
    if let Some(no_label) = table.no_label {
        map.insert(key("noLabel"), Value::Bool(no_label));
    }
    map.insert(key("fields"), elements(&table.fields)?);
    Ok(Value::Mapping(map))
}

fn reference_table_item(table: &ReferenceTableLayout, fields: Option<&FieldMap>) -> Result<Value> {
    let mut map = Mapping::new();
    map.insert(key("type"), text("REFERENCE_TABLE"));
    map.insert(key("code"), text(table.code.as_str()));
    map.insert(key("label"), text(&table.label));
    if let Some(no_label) = table.no_label {
        map.insert(key("noLabel"), Value::Bool(no_label));
    }

    let settings = fields
        .and_then(|fields| fields.get(&table.code))
        .and_then(|field| match &field.properties {
            FieldProperties::ReferenceTable(p) => Some(&p.reference_table),
            _ => None,
        });
    if let Some(settings) = settings {
        map.insert(key("referenceTable"), serde_yaml_ng::to_value(settings)?);
    }
    Ok(Value::Mapping(map))
}

fn elements(elements: &[LayoutElement]) -> Result<Value> {
    elements
        .iter()
        .map(|element| match element {
            LayoutElement::Field { field, size } => field_line(field, size.as_ref()),
            LayoutElement::Decoration(decoration) => Ok(decoration_line(decoration)),
            LayoutElement::SystemField(system) => Ok(system_field_line(system)),
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::Sequence)
}

fn field_line(field: &FieldDefinition, size: Option<&ElementSize>) -> Result<Value> {
    let mut map = Mapping::new();
    map.insert(key("type"), text(field.field_type().as_str()));
    map.insert(key("code"), text(field.code.as_str()));
    map.insert(key("label"), text(&field.label));
    if let Some(no_label) = field.no_label {
        map.insert(key("noLabel"), Value::Bool(no_label));
    }

    // Container payloads are carried by the layout item structure
    if !field.field_type().is_layout_container() {
        if let Value::Mapping(properties) = serde_yaml_ng::to_value(&field.properties)? {
            for (name, value) in properties {
                if name.as_str() != Some("type") {
                    map.insert(name, value);
                }
            }
        }
    }

    if let Some(size) = size.and_then(size_value) {
        map.insert(key("size"), size);
    }
    Ok(Value::Mapping(map))
}

fn decoration_line(decoration: &DecorationElement) -> Value {
    let mut map = Mapping::new();
    map.insert(key("type"), text(decoration.kind.as_str()));
    map.insert(key("elementId"), text(&decoration.element_id));
    if decoration.kind == DecorationKind::Label {
        if let Some(label) = &decoration.label {
            map.insert(key("label"), text(label));
        }
    }
    if let Some(size) = decoration.size.as_ref().and_then(size_value) {
        map.insert(key("size"), size);
    }
    Value::Mapping(map)
}

fn system_field_line(system: &SystemFieldElement) -> Value {
    let mut map = Mapping::new();
    map.insert(key("type"), text(system.field_type.as_str()));
    map.insert(key("code"), text(&system.code));
    if let Some(size) = system.size.as_ref().and_then(size_value) {
        map.insert(key("size"), size);
    }
    Value::Mapping(map)
}

fn size_value(size: &ElementSize) -> Option<Value> {
    if size.is_empty() {
        return None;
    }
    let mut map = Mapping::new();
    let dimensions = [
        ("width", &size.width),
        ("height", &size.height),
        ("innerHeight", &size.inner_height),
    ];
    for (name, value) in dimensions {
        if let Some(value) = value {
            map.insert(key(name), text(value));
        }
    }
    Some(Value::Mapping(map))
}
