use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cmms_domain::Role;

#[derive(Debug, Parser)]
#[command(name = "cmms-console")]
#[command(about = "Terminal client for the campus maintenance entity tables")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with a role (Admin, Executive or Staff)
    Login {
        /// Role to activate
        role: Role,
    },
    /// Clear the active role
    Logout,
    /// Show the active role and its capabilities
    Whoami,
    /// List the entity tables
    Entities,
    /// Show the records of an entity table
    List {
        /// Collection name, e.g. persons
        entity: String,
    },
    /// Create a record from field assignments
    Create {
        /// Collection name
        entity: String,
        /// Field assignment `name=value`, applied in order
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
    /// Update fields of one record
    Update {
        /// Collection name
        entity: String,
        /// Record identifier
        id: String,
        /// Field assignment `name=value`
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
    /// Delete one record
    Delete {
        /// Collection name
        entity: String,
        /// Record identifier
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Bulk import records from a CSV file
    Import {
        /// Collection name
        entity: String,
        /// CSV file with a header row
        file: PathBuf,
    },
    /// Export the table as CSV
    Export {
        /// Collection name
        entity: String,
        /// Output path; defaults to `{entity}_export_{date}.csv`
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the creation form with its resolved options
    Options {
        /// Collection name
        entity: String,
        /// Field assignment `name=value` applied before rendering
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }

    Ok((name.to_owned(), value.to_owned()))
}
