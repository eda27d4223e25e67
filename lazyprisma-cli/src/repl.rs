//! Line-oriented frontend
//!
//! A thin collaborator: reads commands with rustyline, renders
//! coordinator events as they arrive, and answers modals through the
//! coordinator's modal-response entry point. Input runs on its own thread so
//! event rendering never blocks behind the prompt.

use crate::coordinator::Coordinator;
use crate::error::CliError;
use crate::events::{
    LogStyle, ModalAction, ModalInput, ModalRequest, ModalStyle, UiEvent, WorkspaceSnapshot,
};
use lazyprisma_core::cli::ResolveKind;
use lazyprisma_core::Migration;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

enum Flow {
    Continue,
    Quit,
}

/// Run the interactive loop until the user quits or input ends
pub async fn run(
    coordinator: Arc<Coordinator>,
    mut events: UnboundedReceiver<UiEvent>,
) -> Result<(), CliError> {
    print_welcome();

    let (line_tx, mut line_rx) = tokio::sync::mpsc::channel::<String>(1);
    std::thread::spawn(move || {
        let Ok(mut editor) = rustyline::DefaultEditor::new() else {
            return;
        };
        loop {
            match editor.readline("lazyprisma> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if line_tx.blocking_send(line).is_err() {
                        return;
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted) => continue,
                Err(_) => return,
            }
        }
    });

    let mut pending_modal: Option<ModalAction> = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                render_event(event, &mut pending_modal);
            }
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                if let Some(action) = pending_modal.take() {
                    let input = interpret_modal_answer(&action, line.trim());
                    coordinator.modal_response(action, input);
                    continue;
                }
                match dispatch(&coordinator, line.trim()) {
                    Flow::Quit => break,
                    Flow::Continue => {}
                }
            }
        }
    }

    Ok(())
}

fn print_welcome() {
    println!("lazyprisma v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands, 'quit' to exit.");
    println!();
}

fn dispatch(coordinator: &Arc<Coordinator>, line: &str) -> Flow {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let argument = parts.collect::<Vec<_>>().join(" ");

    match command {
        "" => {}
        "help" | "?" => print_help(),
        "status" => print_status(coordinator),
        "list" | "ls" => print_migrations(&coordinator.snapshot()),
        "refresh" | "r" => {
            coordinator.refresh();
        }
        "deploy" => coordinator.deploy(),
        "create" => coordinator.create_schema_diff_migration(),
        "create-manual" => coordinator.create_manual_migration(),
        "resolve" => match select_migration(coordinator, &argument) {
            Some(name) => coordinator.resolve(&name),
            None => println!("usage: resolve <name or number from 'list'>"),
        },
        "delete" => match select_migration(coordinator, &argument) {
            Some(name) => coordinator.delete_pending(&name),
            None => println!("usage: delete <name or number from 'list'>"),
        },
        "studio" => coordinator.toggle_studio(),
        "generate" => coordinator.generate(),
        "validate" => coordinator.validate_schema(),
        "format" => coordinator.format_schema(),
        "reset" => coordinator.reset(),
        "quit" | "exit" | "q" => return Flow::Quit,
        unknown => println!("unknown command '{unknown}' (try 'help')"),
    }

    Flow::Continue
}

fn print_help() {
    println!("Commands:");
    println!("  status          workspace, database, and command status");
    println!("  list            local, pending, and DB-only migrations");
    println!("  refresh         re-read migrations and database state");
    println!("  create          create a migration from schema changes");
    println!("  create-manual   create an empty migration folder by hand");
    println!("  deploy          apply pending migrations");
    println!("  resolve <m>     mark a failed migration applied/rolled back");
    println!("  delete <m>      delete a pending local migration");
    println!("  generate        run the client generator");
    println!("  validate        check the schema");
    println!("  format          format the schema");
    println!("  reset           drop and re-create the database");
    println!("  studio          start/stop the database browser");
    println!("  quit            exit");
}

/// Accepts a 1-based index into the local list or a migration name
fn select_migration(coordinator: &Arc<Coordinator>, argument: &str) -> Option<String> {
    if argument.is_empty() {
        return None;
    }
    let snapshot = coordinator.snapshot();
    if let Ok(index) = argument.parse::<usize>() {
        return snapshot
            .category
            .local
            .get(index.checked_sub(1)?)
            .map(|m| m.name.clone());
    }
    Some(argument.to_string())
}

fn print_status(coordinator: &Arc<Coordinator>) {
    let snapshot = coordinator.snapshot();

    match &snapshot.datasource {
        Some(ds) => {
            let connectivity = if snapshot.db_connected {
                format!("{GREEN}connected{RESET}")
            } else {
                format!("{RED}disconnected{RESET}")
            };
            println!(
                "Database: {} ({connectivity})",
                lazyprisma_db::display_name(&ds.provider)
            );
            if let Some(url) = &snapshot.masked_url {
                if ds.is_hardcoded {
                    println!("URL:      {url} {YELLOW}(hardcoded){RESET}");
                } else {
                    println!("URL:      {url}");
                }
            }
        }
        None => println!("Database: {RED}not configured{RESET}"),
    }
    if let Some(error) = &snapshot.datasource_error {
        println!("{RED}Error:    {error}{RESET}");
    }

    let (running, name, frame) = coordinator.command_status();
    if running {
        println!("Running:  {frame} {name}");
    }
    if coordinator.studio_active() {
        println!("Studio:   running");
    }

    println!(
        "Migrations: {} local, {} pending, {} DB-only",
        snapshot.category.local.len(),
        snapshot.category.pending.len(),
        snapshot.category.db_only.len()
    );
}

fn migration_marker(snapshot: &WorkspaceSnapshot, migration: &Migration) -> String {
    if migration.is_failed {
        format!("{CYAN}in-transaction{RESET}")
    } else if migration.checksum_mismatch {
        format!("{YELLOW}checksum mismatch{RESET}")
    } else if migration.is_empty {
        format!("{RED}empty{RESET}")
    } else if snapshot.db_connected && migration.applied_at.is_none() {
        format!("{YELLOW}pending{RESET}")
    } else if migration.applied_at.is_some() {
        format!("{GREEN}applied{RESET}")
    } else {
        String::new()
    }
}

fn print_migrations(snapshot: &WorkspaceSnapshot) {
    if snapshot.category.local.is_empty() && snapshot.category.db_only.is_empty() {
        println!("No migrations found.");
        return;
    }

    for (index, migration) in snapshot.category.local.iter().enumerate() {
        let marker = migration_marker(snapshot, migration);
        let down = if migration.has_down_sql { " [down.sql]" } else { "" };
        println!("{:>4} | {}{down}  {marker}", index + 1, migration.name);
    }

    for migration in &snapshot.category.db_only {
        println!("   - | {} {DIM}(DB-only){RESET}", migration.name);
    }
}

fn render_event(event: UiEvent, pending_modal: &mut Option<ModalAction>) {
    match event {
        UiEvent::Snapshot(snapshot) => {
            println!(
                "{DIM}[{} local / {} pending / {} DB-only]{RESET}",
                snapshot.category.local.len(),
                snapshot.category.pending.len(),
                snapshot.category.db_only.len()
            );
        }
        UiEvent::LogAction { title, details, style } => {
            let color = match style {
                LogStyle::Normal => CYAN,
                LogStyle::Red => RED,
            };
            println!("{color}* {title}{RESET}");
            for detail in details {
                println!("  {detail}");
            }
        }
        UiEvent::CommandOutput(line) => println!("{DIM}{line}{RESET}"),
        UiEvent::OpenModal(modal) => render_modal(modal, pending_modal),
        UiEvent::CloseModal => {}
        UiEvent::StudioChanged { running, url } => {
            if running {
                if let Some(url) = url {
                    println!("{GREEN}Studio listening on {url}{RESET}");
                }
            }
        }
        // A line frontend has no spinner row to repaint
        UiEvent::Tick => {}
    }
}

fn render_modal(modal: ModalRequest, pending_modal: &mut Option<ModalAction>) {
    let color = match modal.style {
        ModalStyle::Info => CYAN,
        ModalStyle::Success => GREEN,
        ModalStyle::Warning => YELLOW,
        ModalStyle::Error => RED,
    };

    println!("{color}== {} =={RESET}", modal.title);
    for line in &modal.body {
        println!("   {line}");
    }

    if let Some(action) = modal.action {
        match &action {
            ModalAction::ConfirmPendingBeforeCreate
            | ModalAction::ConfirmDelete { .. }
            | ModalAction::ConfirmReset => println!("   answer: y / n"),
            ModalAction::EnterMigrationName | ModalAction::EnterManualMigrationName => {
                println!("   answer: <migration name> (empty cancels)")
            }
            ModalAction::ChooseResolve { .. } => {
                println!("   answer: 1 = applied, 2 = rolled-back (empty cancels)")
            }
        }
        *pending_modal = Some(action);
    }
}

fn interpret_modal_answer(action: &ModalAction, answer: &str) -> ModalInput {
    match action {
        ModalAction::ConfirmPendingBeforeCreate
        | ModalAction::ConfirmDelete { .. }
        | ModalAction::ConfirmReset => match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => ModalInput::Confirmed,
            _ => ModalInput::Cancelled,
        },
        ModalAction::EnterMigrationName | ModalAction::EnterManualMigrationName => {
            if answer.is_empty() {
                ModalInput::Cancelled
            } else {
                ModalInput::Text(answer.to_string())
            }
        }
        ModalAction::ChooseResolve { .. } => match answer {
            "1" | "applied" => ModalInput::Resolve(ResolveKind::Applied),
            "2" | "rolled-back" | "rolled_back" => ModalInput::Resolve(ResolveKind::RolledBack),
            _ => ModalInput::Cancelled,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_answers() {
        assert_eq!(
            interpret_modal_answer(&ModalAction::ConfirmReset, "y"),
            ModalInput::Confirmed
        );
        assert_eq!(
            interpret_modal_answer(&ModalAction::ConfirmReset, "YES"),
            ModalInput::Confirmed
        );
        assert_eq!(
            interpret_modal_answer(&ModalAction::ConfirmReset, "n"),
            ModalInput::Cancelled
        );
        assert_eq!(
            interpret_modal_answer(&ModalAction::ConfirmReset, ""),
            ModalInput::Cancelled
        );
    }

    #[test]
    fn name_answers() {
        assert_eq!(
            interpret_modal_answer(&ModalAction::EnterMigrationName, "add users"),
            ModalInput::Text("add users".to_string())
        );
        assert_eq!(
            interpret_modal_answer(&ModalAction::EnterMigrationName, ""),
            ModalInput::Cancelled
        );
    }

    #[test]
    fn resolve_answers() {
        let action = ModalAction::ChooseResolve {
            name: "m".to_string(),
        };
        assert_eq!(
            interpret_modal_answer(&action, "1"),
            ModalInput::Resolve(ResolveKind::Applied)
        );
        assert_eq!(
            interpret_modal_answer(&action, "rolled-back"),
            ModalInput::Resolve(ResolveKind::RolledBack)
        );
        assert_eq!(interpret_modal_answer(&action, "x"), ModalInput::Cancelled);
    }
}
