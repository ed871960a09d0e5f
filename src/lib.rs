//! Form Schema Engine
//!
//! Declarative form definitions for a business-application platform: parse a
//! human-editable YAML layout into a typed schema, validate it against
//! platform constraints, diff it against the fields currently deployed, and
//! serialize it back to canonical text.
//!
//! ## Features
//!
//! - **Typed Field Model**: 20 field kinds as a closed enum, each with its own property payload
//! - **Recursive Layouts**: rows, groups of rows, sub-tables and reference tables
//! - **Validation**: severity-tagged issues collected across every field
//! - **Diffing**: itemized added / modified / deleted report against a remote field map
//! - **Round-trip Serialization**: deterministic output, stable checksums
//!
//! ## Pipeline
//!
//! ```text
//! text ──parse──▶ Schema ──validate──▶ ValidationResult
//!                   │
//!                   ├──detect(remote fields)──▶ FormDiff
//!                   │
//!                   └──serialize──▶ text
//!
//! captured layout + field map ──enrich──▶ Layout
//! ```
//!
//! ## Example
//!
//! ```
//! use form_schema::{parse, serialize, validate};
//!
//! let schema = parse(
//!     "layout:\n  - type: ROW\n    fields:\n      - {code: name, type: SINGLE_LINE_TEXT, label: Name}\n",
//! )?;
//! assert!(validate(&schema).is_valid);
//!
//! let text = serialize(&schema.layout, Some(&schema.fields))?;
//! assert_eq!(parse(&text)?, schema);
//! # Ok::<(), form_schema::FormSchemaError>(())
//! ```

pub mod checksum;
pub mod config;
pub mod diff;
pub mod enricher;
pub mod error;
pub mod parser;
pub mod schema;
pub mod serializer;
pub mod validator;

pub use checksum::Checksum;
pub use config::FormSchemaConfig;
pub use diff::{
    detect, detect_layout_changes, DiffDetector, DiffEntry, DiffSummary, DiffType, FormDiff,
};
pub use enricher::{collect_subtable_inner_field_codes, enrich, LayoutEnricher};
pub use error::{FormSchemaError, Result};
pub use parser::{parse, SchemaParser};
pub use schema::{
    FieldCode, FieldDefinition, FieldMap, FieldProperties, FieldType, Layout, LayoutElement,
    LayoutItem, Schema,
};
pub use serializer::{serialize, SchemaSerializer};
pub use validator::{validate, SchemaValidator, Severity, ValidationIssue, ValidationResult};
