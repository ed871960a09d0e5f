//! Layout enrichment
//!
//! A layout captured independently of field metadata only carries field
//! stubs. Enrichment rewrites each stub with the authoritative definition from
//! a field map, keeping the layout's shape and size annotations untouched.
//! Containers whose code is unknown are left exactly as given.

use std::collections::HashSet;

use tracing::trace;

use crate::schema::{
    FieldCode, FieldMap, FieldProperties, GroupLayout, Layout, LayoutElement, LayoutItem,
    RowLayout, SubtableLayout,
};

/// Rewrites layout field stubs from an authoritative field map
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutEnricher;

impl LayoutEnricher {
    pub fn new() -> Self {
        Self
    }

    /// Return a copy of `layout` whose field elements carry the definitions in `fields`
    pub fn enrich(&self, layout: &Layout, fields: &FieldMap) -> Layout {
        layout
            .iter()
            .map(|item| match item {
                LayoutItem::Row(row) => LayoutItem::Row(enrich_row(row, fields)),
                LayoutItem::Group(group) => LayoutItem::Group(enrich_group(group, fields)),
                LayoutItem::Subtable(table) => LayoutItem::Subtable(enrich_subtable(table, fields)),
                LayoutItem::ReferenceTable(table) => match fields.get(&table.code) {
                    Some(field)
                        if matches!(field.properties, FieldProperties::ReferenceTable(_)) =>
                    {
                        let mut table = table.clone();
                        table.label = field.label.clone();
                        table.no_label = field.no_label;
                        LayoutItem::ReferenceTable(table)
                    }
                    _ => item.clone(),
                },
            })
            .collect()
    }

    /// Codes of every field that lives inside a sub-table
    pub fn collect_subtable_inner_field_codes(&self, fields: &FieldMap) -> HashSet<FieldCode> {
        fields
            .values()
            .filter_map(|field| field.properties.subtable_fields())
            .flat_map(|inner| inner.keys().cloned())
            .collect()
    }
}

/// Enrich `layout` from `fields` with the default enricher
pub fn enrich(layout: &Layout, fields: &FieldMap) -> Layout {
    LayoutEnricher::new().enrich(layout, fields)
}

/// Codes of every field that lives inside a sub-table
pub fn collect_subtable_inner_field_codes(fields: &FieldMap) -> HashSet<FieldCode> {
    LayoutEnricher::new().collect_subtable_inner_field_codes(fields)
}

fn enrich_row(row: &RowLayout, fields: &FieldMap) -> RowLayout {
    RowLayout {
        fields: enrich_elements(&row.fields, fields),
    }
}

fn enrich_group(group: &GroupLayout, fields: &FieldMap) -> GroupLayout {
    let Some(field) = fields.get(&group.code) else {
        trace!(code = %group.code, "group not in field map; left as given");
        return group.clone();
    };
    let FieldProperties::Group(properties) = &field.properties else {
        trace!(code = %group.code, "field map entry is not a group; left as given");
        return group.clone();
    };

    GroupLayout {
        code: group.code.clone(),
        label: field.label.clone(),
        no_label: field.no_label,
        open_group: properties.open_group,
        layout: group.layout.iter().map(|row| enrich_row(row, fields)).collect(),
    }
}

fn enrich_subtable(table: &SubtableLayout, fields: &FieldMap) -> SubtableLayout {
    let Some(field) = fields.get(&table.code) else {
        trace!(code = %table.code, "sub-table not in field map; left as given");
        return table.clone();
    };
    let FieldProperties::Subtable(properties) = &field.properties else {
        trace!(code = %table.code, "field map entry is not a sub-table; left as given");
        return table.clone();
    };

    SubtableLayout {
        code: table.code.clone(),
        label: field.label.clone(),
        no_label: field.no_label,
        fields: enrich_elements(&table.fields, &properties.fields),
    }
}

fn enrich_elements(elements: &[LayoutElement], fields: &FieldMap) -> Vec<LayoutElement> {
    elements
        .iter()
        .map(|element| match element {
            LayoutElement::Field { field, size } => match fields.get(&field.code) {
                Some(authoritative) => LayoutElement::Field {
                    field: authoritative.clone(),
                    size: size.clone(),
                },
                None => element.clone(),
            },
            LayoutElement::Decoration(_) | LayoutElement::SystemField(_) => element.clone(),
        })
        .collect()
}
