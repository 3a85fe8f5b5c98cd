use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use cmms_application::{
    EntityCollectionApi, EntityTableController, RoleSession, TableOutcome,
};
use cmms_core::{AppError, AppResult};
use cmms_domain::{Capability, EntityCatalog};
use cmms_infrastructure::{FileRoleStore, HttpEntityCollectionApi};
use tracing::debug;

use crate::cli::Command;
use crate::console_config::ConsoleConfig;
use crate::prompt::StdinConfirmationPrompt;
use crate::render::{render_form, render_table};


/// Wiring shared by every console command.
pub struct Console {
    catalog: EntityCatalog,
    api: Arc<dyn EntityCollectionApi>,
    session: RoleSession,
}

impl Console {
    pub async fn connect(config: &ConsoleConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
        let api = HttpEntityCollectionApi::new(http_client, &config.api_url)?;
        debug!(api_url = %api.base_url(), "using entity collection API");

        let session = RoleSession::new(Arc::new(FileRoleStore::new(config.role_file.clone())));
        session.restore().await?;

        Ok(Self::new(EntityCatalog::campus()?, Arc::new(api), session))
    }

    pub fn new(
        catalog: EntityCatalog,
        api: Arc<dyn EntityCollectionApi>,
        session: RoleSession,
    ) -> Self {
        Self {
            catalog,
            api,
            session,
        }
    }

    pub async fn run(&self, command: Command) -> AppResult<ExitCode> {
        match command {
            Command::Login { role } => {
                self.session.login(role).await?;
                println!("Logged in as {role}");
                Ok(ExitCode::SUCCESS)
            }
            Command::Logout => {
                self.session.logout().await?;
                println!("Logged out");
                Ok(ExitCode::SUCCESS)
            }
            Command::Whoami => {
                self.whoami();
                Ok(ExitCode::SUCCESS)
            }
            Command::Entities => {
                for binding in self.catalog.bindings() {
                    println!("{:<16} {}", binding.collection(), binding.title());
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::List { entity } => {
                let table = self.table(&entity, false)?;
                let outcome = table.list().await;
                println!("{}", render_table(&table.view().await));
                Ok(self.report(&table, outcome).await)
            }
            Command::Create { entity, values } => {
                let table = self.table(&entity, false)?;
                if let denied @ TableOutcome::Denied = table.mount().await {
                    return Ok(self.report(&table, denied).await);
                }
                if let denied @ TableOutcome::Denied = table.begin_create().await {
                    return Ok(self.report(&table, denied).await);
                }
                for (name, value) in &values {
                    table.set_draft_value(name, value).await?;
                }
                let outcome = table.create().await;
                Ok(self.report(&table, outcome).await)
            }
            Command::Update { entity, id, values } => {
                let table = self.table(&entity, false)?;
                let loaded = table.list().await;
                if loaded != TableOutcome::Applied {
                    return Ok(self.report(&table, loaded).await);
                }
                table.start_edit(&id).await?;
                if values.is_empty() {
                    table.cancel_edit().await;
                    return Ok(self.report(&table, TableOutcome::Idle).await);
                }
                for (name, value) in &values {
                    table.set_edit_value(name, value).await?;
                }
                let outcome = table.save_edit().await;
                Ok(self.report(&table, outcome).await)
            }
            Command::Delete { entity, id, yes } => {
                let table = self.table(&entity, yes)?;
                let outcome = table.remove(&id).await;
                Ok(self.report(&table, outcome).await)
            }
            Command::Import { entity, file } => {
                let text = tokio::fs::read_to_string(&file).await.map_err(|error| {
                    AppError::Validation(format!(
                        "failed to read '{}': {error}",
                        file.display()
                    ))
                })?;
                let table = self.table(&entity, false)?;
                let outcome = table.import_csv(&text).await;
                Ok(self.report(&table, outcome).await)
            }
            Command::Export { entity, output } => self.export(&entity, output).await,
            Command::Options { entity, values } => {
                let table = self.table(&entity, false)?;
                table.refresh_options().await;
                if let denied @ TableOutcome::Denied = table.begin_create().await {
                    return Ok(self.report(&table, denied).await);
                }
                for (name, value) in &values {
                    table.set_draft_value(name, value).await?;
                }
                let form = table.view().await.create_form.unwrap_or_default();
                print!("{}", render_form(&form));
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    async fn export(&self, entity: &str, output: Option<PathBuf>) -> AppResult<ExitCode> {
        let table = self.table(entity, false)?;
        let loaded = table.list().await;
        if loaded != TableOutcome::Applied {
            return Ok(self.report(&table, loaded).await);
        }

        let Some(export) = table.export_all(chrono::Local::now().date_naive()).await else {
            if let Some(error) = table.error().await {
                eprintln!("{error}");
            }
            return Ok(ExitCode::FAILURE);
        };

        let path = output.unwrap_or_else(|| PathBuf::from(&export.file_name));
        tokio::fs::write(&path, export.content)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write '{}': {error}", path.display()))
            })?;
        println!("Exported to {}", path.display());
        Ok(ExitCode::SUCCESS)
    }

    fn table(&self, entity: &str, assume_yes: bool) -> AppResult<EntityTableController> {
        let binding = self.catalog.require(entity)?.clone();

        Ok(EntityTableController::new(
            Arc::new(binding),
            self.api.clone(),
            Arc::new(StdinConfirmationPrompt::new(assume_yes)),
            self.session.clone(),
        ))
    }

    fn whoami(&self) {
        let Some(role) = self.session.active_role() else {
            println!("Not logged in");
            return;
        };

        println!("Role: {role}");
        for capability in Capability::all() {
            if self.session.has_permission(*capability) {
                println!("  {}", capability.as_str());
            }
        }
    }

    async fn report(&self, table: &EntityTableController, outcome: TableOutcome) -> ExitCode {
        match outcome {
            TableOutcome::Applied => {
                if let Some(notice) = table.notice().await {
                    println!("{notice}");
                }
                ExitCode::SUCCESS
            }
            TableOutcome::Declined => {
                println!("Cancelled");
                ExitCode::SUCCESS
            }
            TableOutcome::Idle => {
                println!("Nothing to submit");
                ExitCode::SUCCESS
            }
            TableOutcome::Denied => {
                match self.session.active_role() {
                    Some(role) => eprintln!(
                        "Role {role} may not do this on {}",
                        table.binding().collection()
                    ),
                    None => eprintln!("Not logged in; run `cmms-console login <role>` first"),
                }
                ExitCode::FAILURE
            }
            TableOutcome::Incomplete { missing } => {
                eprintln!("Please fill in: {}", missing.join(", "));
                ExitCode::FAILURE
            }
            TableOutcome::Failed(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
            TableOutcome::Detached => ExitCode::FAILURE,
        }
    }
}
