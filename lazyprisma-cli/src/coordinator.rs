//! Workflow coordinator
//!
//! Owns the user-facing action set and is the only place that launches
//! long-running external commands. Every action follows the same shape:
//! acquire the gate, check preconditions against the latest snapshot, run
//! the subprocess with streamed output, release the gate, refresh.
//!
//! All collaborator-visible effects leave through the event channel; the
//! coordinator never mutates frontend state.

use crate::config::AppConfig;
use crate::events::{
    ModalAction, ModalInput, ModalRequest, ModalStyle, UiEvent, WorkspaceSnapshot,
};
use crate::gate::CommandGate;
use chrono::Utc;
use lazyprisma_commands::{CommandError, KillSwitch};
use lazyprisma_core::cli::{PrismaCli, ResolveKind};
use lazyprisma_core::{categorize, mask_password, migrations, resolve_datasource};
use lazyprisma_db::Client;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc::UnboundedSender;

/// Work chained onto a completed refresh, running with the fresh snapshot
pub type RefreshFollowUp = Box<dyn FnOnce(Arc<Coordinator>, Arc<WorkspaceSnapshot>) + Send>;

/// Per-action workflow logic over the core components
pub struct Coordinator {
    project_dir: PathBuf,
    cli: PrismaCli,
    config: AppConfig,
    gate: Arc<CommandGate>,
    events: UnboundedSender<UiEvent>,
    snapshot: RwLock<Arc<WorkspaceSnapshot>>,
    studio: Mutex<Option<KillSwitch>>,
    studio_running: AtomicBool,
}

impl Coordinator {
    pub fn new(
        project_dir: impl Into<PathBuf>,
        config: AppConfig,
        events: UnboundedSender<UiEvent>,
    ) -> Arc<Self> {
        let project_dir = project_dir.into();
        Arc::new(Self {
            cli: PrismaCli::new(&project_dir),
            project_dir,
            config,
            gate: Arc::new(CommandGate::new()),
            events,
            snapshot: RwLock::new(Arc::new(WorkspaceSnapshot::default())),
            studio: Mutex::new(None),
            studio_running: AtomicBool::new(false),
        })
    }

    pub fn gate(&self) -> Arc<CommandGate> {
        self.gate.clone()
    }

    /// The latest published snapshot
    pub fn snapshot(&self) -> Arc<WorkspaceSnapshot> {
        self.snapshot.read().unwrap().clone()
    }

    /// `(running, name, spinner glyph)` for status display
    pub fn command_status(&self) -> (bool, String, char) {
        let (running, name, _) = self.gate.status();
        (running, name, self.gate.frame_char())
    }

    pub fn studio_active(&self) -> bool {
        self.studio_running.load(Ordering::SeqCst)
    }

    fn send(&self, event: UiEvent) {
        let _ = self.events.send(event);
    }

    fn message_modal(&self, title: &str, body: Vec<String>, style: ModalStyle) {
        self.send(UiEvent::OpenModal(ModalRequest::message(title, body, style)));
    }

    fn log_blocked(&self, attempted: &str) {
        let running = self.gate.running_name();
        let mut message = format!("Cannot execute '{attempted}'");
        if !running.is_empty() {
            message.push_str(&format!(" ('{running}' is currently running)"));
        }
        self.send(UiEvent::log_red("Operation Blocked", message));
    }

    /// Clone of the output sender for streaming callbacks
    fn output_sink(&self) -> UnboundedSender<UiEvent> {
        self.events.clone()
    }

    // ---- refresh ----------------------------------------------------------

    /// Rebuild and publish the workspace snapshot. Runs outside the gate so
    /// actions that already hold it can reuse it.
    async fn build_snapshot(self: &Arc<Self>) -> Arc<WorkspaceSnapshot> {
        let mut snapshot = WorkspaceSnapshot::default();

        match resolve_datasource(&self.project_dir) {
            Ok(ds) if ds.url.is_empty() => {
                snapshot.datasource_error = Some("database URL not configured".to_string());
                snapshot.datasource = Some(ds);
            }
            Ok(ds) => {
                snapshot.masked_url = Some(mask_password(&ds.url));
                match Client::from_schema_url(&ds.provider, &ds.url).await {
                    Ok(client) => {
                        match categorize(&self.project_dir, Some(&client)).await {
                            Ok(outcome) => {
                                snapshot.category = outcome.category;
                                snapshot.db_connected = outcome.db_connected;
                                snapshot.table_exists = outcome.table_exists;
                            }
                            Err(err) => {
                                self.send(UiEvent::log_red("Refresh Error", err.to_string()));
                            }
                        }
                        client.close().await;
                    }
                    Err(err) => {
                        snapshot.datasource_error = Some(err.to_string());
                    }
                }
                snapshot.datasource = Some(ds);
            }
            Err(err) => {
                snapshot.datasource_error = Some(err.to_string());
            }
        }

        // With no usable connection, still list the local migrations
        if !snapshot.db_connected && snapshot.category.local.is_empty() {
            if let Ok(outcome) = categorize(&self.project_dir, None).await {
                snapshot.category = outcome.category;
            }
        }

        let snapshot = Arc::new(snapshot);
        *self.snapshot.write().unwrap() = snapshot.clone();
        self.send(UiEvent::Snapshot(snapshot.clone()));
        snapshot
    }

    /// Refresh the workspace state. Returns false when the gate is held.
    pub fn refresh(self: &Arc<Self>) -> bool {
        self.refresh_then(None)
    }

    /// Refresh, then run `follow_up` with the fresh snapshot after the gate
    /// has been released. Composite actions chain their precondition checks
    /// here so they always see current data.
    pub fn refresh_then(self: &Arc<Self>, follow_up: Option<RefreshFollowUp>) -> bool {
        if !self.gate.try_start("Refresh") {
            self.log_blocked("Refresh");
            return false;
        }

        let this = self.clone();
        tokio::spawn(async move {
            let snapshot = this.build_snapshot().await;
            this.send(UiEvent::log("Refresh", "Workspace state refreshed"));
            this.gate.finish();
            if let Some(follow_up) = follow_up {
                follow_up(this.clone(), snapshot);
            }
        });
        true
    }

    // ---- deploy -----------------------------------------------------------

    pub fn deploy(self: &Arc<Self>) {
        if !self.gate.try_start("Migrate Deploy") {
            self.log_blocked("Migrate Deploy");
            return;
        }

        let this = self.clone();
        tokio::spawn(async move {
            // Fresh state before the connectivity check
            let snapshot = this.build_snapshot().await;
            if !snapshot.db_connected {
                this.gate.finish();
                this.message_modal(
                    "Database Connection Required",
                    vec![
                        "No database connection detected.".to_string(),
                        "Please ensure your database is running and accessible.".to_string(),
                    ],
                    ModalStyle::Error,
                );
                return;
            }

            this.send(UiEvent::log("Migrate Deploy", "Running prisma migrate deploy..."));

            let sink = this.output_sink();
            let err_sink = this.output_sink();
            let on_complete = this.clone();
            let on_error = this.clone();

            let cmd = this
                .cli
                .migrate_deploy()
                .stream_output()
                .on_stdout(move |line| {
                    let _ = sink.send(UiEvent::CommandOutput(format!("  {line}")));
                })
                .on_stderr(move |line| {
                    let _ = err_sink.send(UiEvent::CommandOutput(format!("  {line}")));
                })
                .on_complete(move |code| {
                    on_complete.gate.finish();
                    if code == 0 {
                        on_complete.send(UiEvent::log(
                            "Migrate Deploy Complete",
                            "Migrations applied successfully",
                        ));
                        on_complete.refresh();
                        on_complete.message_modal(
                            "Migrate Deploy Successful",
                            vec!["Migrations applied successfully!".to_string()],
                            ModalStyle::Success,
                        );
                    } else {
                        on_complete.send(UiEvent::log_red(
                            "Migrate Deploy Failed",
                            format!("Migrate deploy failed with exit code: {code}"),
                        ));
                        // The database may have advanced even on failure
                        on_complete.refresh();
                        on_complete.message_modal(
                            "Migrate Deploy Failed",
                            vec![
                                format!("Prisma migrate deploy failed with exit code: {code}"),
                                "Check the output log for details.".to_string(),
                            ],
                            ModalStyle::Error,
                        );
                    }
                })
                .on_error(move |err| {
                    if matches!(err, CommandError::Spawn { .. }) {
                        on_error.gate.finish();
                        on_error.send(UiEvent::log_red("Migrate Deploy Error", err.to_string()));
                        on_error.message_modal(
                            "Migrate Deploy Error",
                            vec![
                                "Failed to start prisma migrate deploy:".to_string(),
                                err.to_string(),
                            ],
                            ModalStyle::Error,
                        );
                    }
                });

            cmd.run_async();
        });
    }

    // ---- create (schema diff) ---------------------------------------------

    /// Schema-diff based migration creation, chained on a fresh refresh.
    ///
    /// Preconditions, in order: database reachable, no DB-only rows, no
    /// checksum mismatches, no empty pending migrations. Non-empty pending
    /// migrations require confirmation because the CLI will apply them.
    pub fn create_schema_diff_migration(self: &Arc<Self>) {
        let follow_up: RefreshFollowUp = Box::new(|this, snapshot| {
            if !snapshot.db_connected {
                this.message_modal(
                    "Database Connection Required",
                    vec![
                        "No database connection detected.".to_string(),
                        "Please ensure your database is running and accessible.".to_string(),
                    ],
                    ModalStyle::Error,
                );
                return;
            }

            if !snapshot.category.db_only.is_empty() {
                this.message_modal(
                    "DB-Only Migrations Detected",
                    vec![
                        "Cannot create a new migration while DB-only migrations exist.".to_string(),
                        "Please resolve the DB-only migrations first.".to_string(),
                    ],
                    ModalStyle::Error,
                );
                return;
            }

            if let Some(m) = snapshot.category.local.iter().find(|m| m.checksum_mismatch) {
                this.message_modal(
                    "Checksum Mismatch Detected",
                    vec![
                        "Cannot create a new migration while a checksum mismatch exists.".to_string(),
                        format!("Migration '{}' has been modified locally.", m.name),
                    ],
                    ModalStyle::Error,
                );
                return;
            }

            if let Some(m) = snapshot.category.pending.iter().find(|m| m.is_empty) {
                this.message_modal(
                    "Empty Pending Migration Detected",
                    vec![
                        "Cannot create a new migration while empty pending migrations exist."
                            .to_string(),
                        format!("Migration '{}' is pending and empty.", m.name),
                        "Please delete it or add SQL content.".to_string(),
                    ],
                    ModalStyle::Error,
                );
                return;
            }

            if !snapshot.category.pending.is_empty() {
                this.send(UiEvent::OpenModal(
                    ModalRequest::message(
                        "Pending Migrations Detected",
                        vec![
                            "Pending migrations are applied automatically before a new one is \
                             created. Continue?"
                                .to_string(),
                        ],
                        ModalStyle::Warning,
                    )
                    .with_action(ModalAction::ConfirmPendingBeforeCreate),
                ));
                return;
            }

            this.prompt_migration_name();
        });

        if !self.refresh_then(Some(follow_up)) {
            self.message_modal(
                "Operation Blocked",
                vec![
                    "Another operation is currently running.".to_string(),
                    "Please wait for it to complete.".to_string(),
                ],
                ModalStyle::Error,
            );
        }
    }

    fn prompt_migration_name(&self) {
        self.send(UiEvent::OpenModal(
            ModalRequest::message(
                "Enter migration name",
                vec!["Spaces will be replaced with underscores".to_string()],
                ModalStyle::Info,
            )
            .with_action(ModalAction::EnterMigrationName),
        ));
    }

    /// Manual migration creation: prompt for a name, no CLI involved
    pub fn create_manual_migration(self: &Arc<Self>) {
        self.send(UiEvent::OpenModal(
            ModalRequest::message(
                "Enter migration name",
                vec!["Spaces will be replaced with underscores".to_string()],
                ModalStyle::Info,
            )
            .with_action(ModalAction::EnterManualMigrationName),
        ));
    }

    fn execute_create_migration(self: &Arc<Self>, name: String) {
        if !self.gate.try_start("Create Migration") {
            self.log_blocked("Create Migration");
            return;
        }

        self.send(UiEvent::log("Migrate Dev", format!("Creating migration: {name}")));

        let sink = self.output_sink();
        let err_sink = self.output_sink();
        let on_complete = self.clone();
        let on_error = self.clone();
        let display_name = name.clone();

        let cmd = self
            .cli
            .migrate_dev(&name, true)
            .stream_output()
            .on_stdout(move |line| {
                let _ = sink.send(UiEvent::CommandOutput(format!("  {line}")));
            })
            .on_stderr(move |line| {
                let _ = err_sink.send(UiEvent::CommandOutput(format!("  {line}")));
            })
            .on_complete(move |code| {
                on_complete.gate.finish();
                on_complete.refresh();
                if code == 0 {
                    on_complete.send(UiEvent::log("Migrate Complete", "Migration created successfully"));
                    on_complete.message_modal(
                        "Migration Created",
                        vec![
                            format!("Migration '{display_name}' created successfully!"),
                            "You can find it in the prisma/migrations directory.".to_string(),
                        ],
                        ModalStyle::Success,
                    );
                } else {
                    on_complete.send(UiEvent::log_red(
                        "Migrate Failed",
                        format!("Migration creation failed with exit code: {code}"),
                    ));
                    on_complete.message_modal(
                        "Migration Failed",
                        vec![
                            format!("Prisma migrate dev failed with exit code: {code}"),
                            "Check the output log for details.".to_string(),
                        ],
                        ModalStyle::Error,
                    );
                }
            })
            .on_error(move |err| {
                if matches!(err, CommandError::Spawn { .. }) {
                    on_error.gate.finish();
                    on_error.send(UiEvent::log_red("Migration Error", err.to_string()));
                    on_error.message_modal(
                        "Migration Error",
                        vec!["Failed to run prisma migrate dev:".to_string(), err.to_string()],
                        ModalStyle::Error,
                    );
                }
            });

        cmd.run_async();
    }

    fn write_manual_migration(self: &Arc<Self>, name: String) {
        // UTC timestamp in the conventional format the CLI uses
        let timestamp = Utc::now().format("%Y%m%d%H%M%S");
        let folder_name = format!("{timestamp}_{name}");
        let folder = migrations::migrations_dir(&self.project_dir).join(&folder_name);

        if let Err(err) = std::fs::create_dir_all(&folder) {
            self.send(UiEvent::log_red("Manual Migration Error", err.to_string()));
            self.message_modal(
                "Manual Migration Error",
                vec!["Failed to create migration folder:".to_string(), err.to_string()],
                ModalStyle::Error,
            );
            return;
        }

        let initial_content = "-- This migration was manually created via lazyprisma\n\n";
        if let Err(err) = std::fs::write(folder.join("migration.sql"), initial_content) {
            self.send(UiEvent::log_red("Manual Migration Error", err.to_string()));
            self.message_modal(
                "Manual Migration Error",
                vec!["Failed to create migration.sql:".to_string(), err.to_string()],
                ModalStyle::Error,
            );
            return;
        }

        self.refresh();
        self.message_modal(
            "Manual Migration Created",
            vec![
                format!("Created: {folder_name}"),
                format!("Location: {}", folder.display()),
            ],
            ModalStyle::Success,
        );
    }

    // ---- resolve ----------------------------------------------------------

    /// Offer resolution choices for a failed migration
    pub fn resolve(self: &Arc<Self>, name: &str) {
        let snapshot = self.snapshot();
        let selected = snapshot
            .category
            .local
            .iter()
            .chain(&snapshot.category.db_only)
            .find(|m| m.name == name);

        match selected {
            None => {
                self.message_modal(
                    "No Migration Selected",
                    vec!["Please select a migration to resolve.".to_string()],
                    ModalStyle::Warning,
                );
            }
            Some(m) if !m.is_failed => {
                self.message_modal(
                    "Cannot Resolve Migration",
                    vec![
                        "Only migrations in the in-transaction state can be resolved.".to_string(),
                        format!("Migration '{}' is not in a failed state.", m.name),
                    ],
                    ModalStyle::Error,
                );
            }
            Some(m) => {
                self.send(UiEvent::OpenModal(
                    ModalRequest::message(
                        format!("Resolve Migration: {}", m.name),
                        vec![
                            "applied: the changes are present in the database".to_string(),
                            "rolled-back: the changes have been reverted".to_string(),
                        ],
                        ModalStyle::Info,
                    )
                    .with_action(ModalAction::ChooseResolve { name: m.name.clone() }),
                ));
            }
        }
    }

    fn execute_resolve(self: &Arc<Self>, name: String, kind: ResolveKind) {
        if !self.gate.try_start("Migrate Resolve") {
            self.log_blocked("Migrate Resolve");
            return;
        }

        self.send(UiEvent::log(
            "Migrate Resolve",
            format!("Marking migration as {}: {name}", kind.label()),
        ));

        let sink = self.output_sink();
        let err_sink = self.output_sink();
        let on_complete = self.clone();
        let on_error = self.clone();
        let label = kind.label();

        let cmd = self
            .cli
            .migrate_resolve(&name, kind)
            .stream_output()
            .on_stdout(move |line| {
                let _ = sink.send(UiEvent::CommandOutput(format!("  {line}")));
            })
            .on_stderr(move |line| {
                let _ = err_sink.send(UiEvent::CommandOutput(format!("  {line}")));
            })
            .on_complete(move |code| {
                on_complete.gate.finish();
                on_complete.refresh();
                if code == 0 {
                    on_complete.send(UiEvent::log(
                        "Migrate Resolve Complete",
                        format!("Migration marked as {label} successfully"),
                    ));
                    on_complete.message_modal(
                        "Migrate Resolve Successful",
                        vec![format!("Migration marked as {label} successfully!")],
                        ModalStyle::Success,
                    );
                } else {
                    on_complete.send(UiEvent::log_red(
                        "Migrate Resolve Failed",
                        format!("Migrate resolve failed with exit code: {code}"),
                    ));
                    on_complete.message_modal(
                        "Migrate Resolve Failed",
                        vec![
                            format!("Prisma migrate resolve failed with exit code: {code}"),
                            "Check the output log for details.".to_string(),
                        ],
                        ModalStyle::Error,
                    );
                }
            })
            .on_error(move |err| {
                if matches!(err, CommandError::Spawn { .. }) {
                    on_error.gate.finish();
                    on_error.send(UiEvent::log_red("Migrate Resolve Error", err.to_string()));
                    on_error.message_modal(
                        "Migrate Resolve Error",
                        vec![
                            "Failed to run prisma migrate resolve:".to_string(),
                            err.to_string(),
                        ],
                        ModalStyle::Error,
                    );
                }
            });

        cmd.run_async();
    }

    // ---- delete -----------------------------------------------------------

    /// Ask to delete a locally present migration.
    ///
    /// Applied migrations are protected while the database is reachable.
    /// With the database unreachable, any local migration may be deleted;
    /// the user is trusted to know what they are doing.
    pub fn delete_pending(self: &Arc<Self>, name: &str) {
        let snapshot = self.snapshot();
        let selected = snapshot
            .category
            .local
            .iter()
            .chain(&snapshot.category.db_only)
            .find(|m| m.name == name);

        let Some(selected) = selected else {
            self.message_modal(
                "No Selection",
                vec!["Please select a migration to delete.".to_string()],
                ModalStyle::Warning,
            );
            return;
        };

        if selected.is_db_only() {
            self.message_modal(
                "Cannot Delete",
                vec![
                    "This migration exists only in the database.".to_string(),
                    "Cannot delete a migration that has no local directory.".to_string(),
                ],
                ModalStyle::Error,
            );
            return;
        }

        if snapshot.db_connected && selected.applied_at.is_some() {
            self.message_modal(
                "Cannot Delete",
                vec![
                    "This migration has already been applied to the database.".to_string(),
                    "Deleting it locally would cause inconsistency.".to_string(),
                ],
                ModalStyle::Error,
            );
            return;
        }

        self.send(UiEvent::OpenModal(
            ModalRequest::message(
                "Delete Migration",
                vec![
                    format!("Are you sure you want to delete '{}'?", selected.name),
                    "This action cannot be undone.".to_string(),
                ],
                ModalStyle::Warning,
            )
            .with_action(ModalAction::ConfirmDelete {
                name: selected.name.clone(),
                path: selected.path.clone(),
            }),
        ));
    }

    fn execute_delete(self: &Arc<Self>, name: String, path: PathBuf) {
        if let Err(err) = std::fs::remove_dir_all(&path) {
            self.send(UiEvent::log_red(
                "Delete Error",
                format!("Failed to delete migration: {err}"),
            ));
            self.message_modal(
                "Delete Error",
                vec!["Failed to delete migration folder:".to_string(), err.to_string()],
                ModalStyle::Error,
            );
            return;
        }

        self.send(UiEvent::log("Deleted", format!("Migration '{name}' deleted")));
        self.refresh();
        self.message_modal(
            "Deleted",
            vec!["Migration deleted successfully.".to_string()],
            ModalStyle::Success,
        );
    }

    // ---- studio -----------------------------------------------------------

    /// Bistable Studio toggle: start the subprocess when off, kill its
    /// process group when on.
    pub fn toggle_studio(self: &Arc<Self>) {
        if self.studio_active() {
            let switch = self.studio.lock().unwrap().take();
            if let Some(switch) = switch {
                if let Err(err) = switch.kill_group() {
                    self.send(UiEvent::log_red(
                        "Studio Error",
                        format!("Failed to stop Prisma Studio: {err}"),
                    ));
                    self.message_modal(
                        "Studio Error",
                        vec!["Failed to stop Prisma Studio:".to_string(), err.to_string()],
                        ModalStyle::Error,
                    );
                    *self.studio.lock().unwrap() = Some(switch);
                    return;
                }
            }
            self.studio_running.store(false, Ordering::SeqCst);
            self.send(UiEvent::log("Studio Stopped", "Prisma Studio has been stopped"));
            self.send(UiEvent::StudioChanged {
                running: false,
                url: None,
            });
            self.message_modal(
                "Studio Stopped",
                vec!["Prisma Studio has been stopped.".to_string()],
                ModalStyle::Warning,
            );
            return;
        }

        if !self.gate.try_start("Start Studio") {
            self.log_blocked("Start Studio");
            return;
        }

        self.send(UiEvent::log("Studio", "Starting Prisma Studio..."));

        // No streaming: the handle is kept so the process can be killed later
        let switch = self.cli.studio().run_async();
        *self.studio.lock().unwrap() = Some(switch.clone());

        let this = self.clone();
        let url = self.config.studio_url.clone();
        let warmup = self.config.studio_warmup();
        tokio::spawn(async move {
            tokio::time::sleep(warmup).await;
            this.gate.finish();

            if switch.pid().is_none() {
                // Never spawned
                this.studio.lock().unwrap().take();
                this.send(UiEvent::log_red("Studio Error", "Prisma Studio did not start"));
                this.message_modal(
                    "Studio Error",
                    vec!["Failed to start Prisma Studio.".to_string()],
                    ModalStyle::Error,
                );
                return;
            }

            this.studio_running.store(true, Ordering::SeqCst);
            this.send(UiEvent::log(
                "Studio Started",
                format!("Prisma Studio is running at {url}"),
            ));
            this.send(UiEvent::StudioChanged {
                running: true,
                url: Some(url.clone()),
            });
            this.message_modal(
                "Prisma Studio Started",
                vec![
                    format!("Prisma Studio is running at {url}"),
                    "Toggle again to stop it.".to_string(),
                ],
                ModalStyle::Success,
            );
        });
    }

    // ---- generate ---------------------------------------------------------

    /// Run `generate` with streamed output. On failure, a validate probe
    /// distinguishes schema errors from other failures.
    pub fn generate(self: &Arc<Self>) {
        if !self.gate.try_start("Generate") {
            self.log_blocked("Generate");
            return;
        }

        self.send(UiEvent::log("Generate", "Running prisma generate..."));

        let sink = self.output_sink();
        let err_sink = self.output_sink();
        let on_complete = self.clone();
        let on_error = self.clone();

        let cmd = self
            .cli
            .generate()
            .stream_output()
            .on_stdout(move |line| {
                let _ = sink.send(UiEvent::CommandOutput(format!("  {line}")));
            })
            .on_stderr(move |line| {
                let _ = err_sink.send(UiEvent::CommandOutput(format!("  {line}")));
            })
            .on_complete(move |code| {
                if code == 0 {
                    on_complete.gate.finish();
                    on_complete.send(UiEvent::log(
                        "Generate Complete",
                        "Prisma Client generated successfully",
                    ));
                    on_complete.message_modal(
                        "Generate Successful",
                        vec!["Prisma Client generated successfully!".to_string()],
                        ModalStyle::Success,
                    );
                } else {
                    // Keep the gate until the validate probe is done
                    on_complete.send(UiEvent::log("Generate Failed", "Checking schema for errors..."));
                    let this = on_complete.clone();
                    tokio::spawn(async move {
                        let validation = this.cli.validate().await;
                        this.gate.finish();

                        match validation {
                            Ok(result) if !result.valid => {
                                this.send(UiEvent::log_red(
                                    "Schema Validation Failed",
                                    format!("Found {} schema errors", result.errors.len()),
                                ));
                                let mut body =
                                    vec!["Generate failed due to schema errors.".to_string()];
                                body.extend(result.errors);
                                this.message_modal(
                                    "Schema Validation Failed",
                                    body,
                                    ModalStyle::Error,
                                );
                            }
                            _ => {
                                this.send(UiEvent::log_red(
                                    "Generate Failed",
                                    format!("Generate failed with exit code: {code}"),
                                ));
                                this.message_modal(
                                    "Generate Failed",
                                    vec![
                                        format!("Prisma generate failed with exit code: {code}"),
                                        "Schema is valid. Check the output log for details."
                                            .to_string(),
                                    ],
                                    ModalStyle::Error,
                                );
                            }
                        }
                    });
                }
            })
            .on_error(move |err| {
                if matches!(err, CommandError::Spawn { .. }) {
                    on_error.gate.finish();
                    on_error.send(UiEvent::log_red("Generate Error", err.to_string()));
                    on_error.message_modal(
                        "Generate Error",
                        vec!["Failed to run prisma generate:".to_string(), err.to_string()],
                        ModalStyle::Error,
                    );
                }
            });

        cmd.run_async();
    }

    // ---- reset ------------------------------------------------------------

    /// Ask for confirmation before a destructive `migrate reset`
    pub fn reset(self: &Arc<Self>) {
        self.send(UiEvent::OpenModal(
            ModalRequest::message(
                "Reset Database",
                vec![
                    "This drops the database, recreates it, and applies all migrations."
                        .to_string(),
                    "All data will be lost. Continue?".to_string(),
                ],
                ModalStyle::Warning,
            )
            .with_action(ModalAction::ConfirmReset),
        ));
    }

    fn execute_reset(self: &Arc<Self>) {
        if !self.gate.try_start("Migrate Reset") {
            self.log_blocked("Migrate Reset");
            return;
        }

        self.send(UiEvent::log("Migrate Reset", "Running prisma migrate reset..."));

        let sink = self.output_sink();
        let err_sink = self.output_sink();
        let on_complete = self.clone();
        let on_error = self.clone();

        let cmd = self
            .cli
            .migrate_reset()
            .stream_output()
            .on_stdout(move |line| {
                let _ = sink.send(UiEvent::CommandOutput(format!("  {line}")));
            })
            .on_stderr(move |line| {
                let _ = err_sink.send(UiEvent::CommandOutput(format!("  {line}")));
            })
            .on_complete(move |code| {
                on_complete.gate.finish();
                on_complete.refresh();
                if code == 0 {
                    on_complete.send(UiEvent::log("Migrate Reset Complete", "Database reset"));
                    on_complete.message_modal(
                        "Migrate Reset Successful",
                        vec!["Database reset and all migrations applied.".to_string()],
                        ModalStyle::Success,
                    );
                } else {
                    on_complete.send(UiEvent::log_red(
                        "Migrate Reset Failed",
                        format!("Migrate reset failed with exit code: {code}"),
                    ));
                    on_complete.message_modal(
                        "Migrate Reset Failed",
                        vec![format!("Prisma migrate reset failed with exit code: {code}")],
                        ModalStyle::Error,
                    );
                }
            })
            .on_error(move |err| {
                if matches!(err, CommandError::Spawn { .. }) {
                    on_error.gate.finish();
                    on_error.send(UiEvent::log_red("Migrate Reset Error", err.to_string()));
                }
            });

        cmd.run_async();
    }

    // ---- ancillary probes (bypass the gate) -------------------------------

    /// Synchronous validate probe; reports through a modal
    pub fn validate_schema(self: &Arc<Self>) {
        let this = self.clone();
        tokio::spawn(async move {
            match this.cli.validate().await {
                Ok(result) if result.valid => {
                    this.message_modal(
                        "Schema Validation Passed",
                        vec!["Your Prisma schema is valid!".to_string()],
                        ModalStyle::Success,
                    );
                }
                Ok(result) => {
                    let mut body = vec!["Schema validation failed:".to_string()];
                    if result.errors.is_empty() {
                        body.push(result.output);
                    } else {
                        body.extend(result.errors);
                    }
                    this.message_modal("Schema Validation Failed", body, ModalStyle::Error);
                }
                Err(err) => {
                    this.message_modal(
                        "Validation Error",
                        vec!["Failed to run validation:".to_string(), err.to_string()],
                        ModalStyle::Error,
                    );
                }
            }
        });
    }

    /// Run `format` and log the result
    pub fn format_schema(self: &Arc<Self>) {
        let this = self.clone();
        tokio::spawn(async move {
            match this.cli.format().run_with_output().await {
                Ok(result) if result.success() => {
                    this.send(UiEvent::log("Format", "Schema formatted"));
                }
                Ok(result) => {
                    this.send(UiEvent::log_red(
                        "Format Failed",
                        format!("prisma format exited with code {}", result.exit_code),
                    ));
                }
                Err(err) => {
                    this.send(UiEvent::log_red("Format Error", err.to_string()));
                }
            }
        });
    }

    // ---- modal answers ----------------------------------------------------

    /// Dispatch the frontend's answer to a modal that carried an action
    pub fn modal_response(self: &Arc<Self>, action: ModalAction, input: ModalInput) {
        self.send(UiEvent::CloseModal);

        match (action, input) {
            (_, ModalInput::Cancelled) => {}
            (ModalAction::ConfirmPendingBeforeCreate, ModalInput::Confirmed) => {
                self.prompt_migration_name();
            }
            (ModalAction::EnterMigrationName, ModalInput::Text(raw)) => {
                match normalize_migration_name(&raw) {
                    Some(name) => self.execute_create_migration(name),
                    None => self.message_modal(
                        "Validation Failed",
                        vec!["A migration name is required.".to_string()],
                        ModalStyle::Error,
                    ),
                }
            }
            (ModalAction::EnterManualMigrationName, ModalInput::Text(raw)) => {
                match normalize_migration_name(&raw) {
                    Some(name) => self.write_manual_migration(name),
                    None => self.message_modal(
                        "Validation Failed",
                        vec!["A migration name is required.".to_string()],
                        ModalStyle::Error,
                    ),
                }
            }
            (ModalAction::ConfirmDelete { name, path }, ModalInput::Confirmed) => {
                self.execute_delete(name, path);
            }
            (ModalAction::ChooseResolve { name }, ModalInput::Resolve(kind)) => {
                self.execute_resolve(name, kind);
            }
            (ModalAction::ConfirmReset, ModalInput::Confirmed) => {
                self.execute_reset();
            }
            (action, input) => {
                tracing::debug!(?action, ?input, "ignoring mismatched modal answer");
            }
        }
    }

    // ---- teardown ---------------------------------------------------------

    /// Kill the Studio subprocess if it is still alive
    pub fn shutdown(&self) {
        if let Some(switch) = self.studio.lock().unwrap().take() {
            let _ = switch.kill_group();
        }
        self.studio_running.store(false, Ordering::SeqCst);
    }
}

/// Trim and replace spaces with underscores; None when nothing remains
pub fn normalize_migration_name(raw: &str) -> Option<String> {
    let name = raw.trim().replace(' ', "_");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
