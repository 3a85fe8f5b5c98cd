pub mod health;
pub mod import;
pub mod records;
