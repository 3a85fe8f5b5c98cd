//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod catalog;
mod column;
mod entity;
mod field;
mod form;
mod record;
mod security;

pub use catalog::EntityCatalog;
pub use column::{CellRenderer, ColumnDescriptor, ColumnRender};
pub use entity::{EntityBinding, EntityBindingInput, EntityBindingKind};
pub use field::{
    CascadingSelect, DependsOn, FieldDescriptor, FieldKind, OptionLabel, RemoteOptions, ResolveTo,
    SelectOptions, StaticOption,
};
pub use form::FormSchema;
pub use record::{EntityRecord, scalar_text};
pub use security::{Capability, PermissionSet, Role, has_permission};
