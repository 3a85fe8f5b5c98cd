//! Application services and ports.

#![forbid(unsafe_code)]

mod csv_codec;
mod entity_ports;
mod entity_table_service;
mod form_draft;
mod options_resolver;
mod role_session;

#[cfg(test)]
mod test_support;

pub use csv_codec::{export_csv, export_file_name, import_csv};
pub use entity_ports::{ConfirmationPrompt, EntityCollectionApi, MutationReceipt, RoleStore};
pub use entity_table_service::{
    CsvExport, DELETE_CONFIRMATION, EntityTableController, TableAffordances, TableOutcome,
    TableRow, TableView,
};
pub use form_draft::{FieldState, FieldWidget, FormDraft, RenderedField};
pub use options_resolver::{OptionsResolver, ResolvedOptions, SelectOption};
pub use role_session::RoleSession;
