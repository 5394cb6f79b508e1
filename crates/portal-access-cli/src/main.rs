// crates/portal-access-cli/src/main.rs
// ============================================================================
// Module: Portal Access CLI Entry Point
// Description: Command dispatcher for portal user and authority administration.
// Purpose: Drive the access admin service against the configured database.
// Dependencies: clap, portal-access-config, portal-access-core,
//               portal-access-store-sqlite, serde_json, thiserror, time.
// ============================================================================

//! ## Overview
//! The `portal-access` binary loads `portal-access.toml`, opens the portal
//! database, and runs one administrative command: browsing users, studies,
//! and groups, editing grants, or exporting and importing the user snapshot.
//! Every mutation goes through [`AccessAdmin`] so it is validated and audited.
//! All user-facing strings are routed through the message catalog.
//! Security posture: command arguments and import files are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use portal_access_cli::t;
use portal_access_config::AuditConfig;
use portal_access_config::PortalAccessConfig;
use portal_access_core::AccessAdmin;
use portal_access_core::AuditSink;
use portal_access_core::Email;
use portal_access_core::FileAuditSink;
use portal_access_core::NoopAuditSink;
use portal_access_core::PortalError;
use portal_access_core::StderrAuditSink;
use portal_access_core::StudyCatalog;
use portal_access_core::User;
use portal_access_core::UserRegistry;
use portal_access_core::export_filename_with_suffix;
use portal_access_store_sqlite::SqlitePortalStore;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Portal access administration CLI.
#[derive(Parser, Debug)]
#[command(name = "portal-access", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print the CLI version and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Path to `portal-access.toml` (overrides `PORTAL_ACCESS_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show user, study, and group counts.
    Dashboard,
    /// User account and grant operations.
    User {
        /// Selected user subcommand.
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Study browsing and study grant operations.
    Study {
        /// Selected study subcommand.
        #[command(subcommand)]
        command: StudyCommand,
    },
    /// Group browsing and group grant operations.
    Group {
        /// Selected group subcommand.
        #[command(subcommand)]
        command: GroupCommand,
    },
    /// Export all users and grants as a YAML snapshot.
    Export(ExportCommand),
    /// Replace all users and grants from a YAML snapshot.
    Import(ImportCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// User subcommands.
#[derive(Subcommand, Debug)]
enum UserCommand {
    /// List all users.
    List,
    /// Show a user and the user's classified grants.
    Show(EmailArg),
    /// Create a user.
    Create(UserCreateCommand),
    /// Update a user's name or enabled flag.
    Update(UserUpdateCommand),
    /// Delete a user and the user's grants.
    Delete(EmailArg),
    /// Replace a user's grants with the given targets.
    Grant(UserGrantCommand),
    /// List the targets that can be granted.
    Choices,
    /// Check whether a user can read a study.
    Access(UserAccessCommand),
}

/// Study subcommands.
#[derive(Subcommand, Debug)]
enum StudyCommand {
    /// List all studies.
    List,
    /// Show everyone with access to a study.
    Show(StudyArg),
    /// Replace the users holding a direct grant on a study.
    Users(StudyUsersCommand),
}

/// Group subcommands.
#[derive(Subcommand, Debug)]
enum GroupCommand {
    /// List all groups.
    List,
    /// Show a group, its studies, and its grantees.
    Show(GroupArg),
    /// Replace the users holding a grant on a group.
    Users(GroupUsersCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration file.
    Validate,
}

/// A single user email argument.
#[derive(Args, Debug)]
struct EmailArg {
    /// User email.
    email: String,
}

/// A single study identifier argument.
#[derive(Args, Debug)]
struct StudyArg {
    /// Study identifier (case-insensitive).
    study: String,
}

/// A single group name argument.
#[derive(Args, Debug)]
struct GroupArg {
    /// Group name.
    group: String,
}

/// Arguments for `user create`.
#[derive(Args, Debug)]
struct UserCreateCommand {
    /// User email.
    email: String,
    /// Display name.
    #[arg(long, default_value = "")]
    name: String,
    /// Create the account disabled.
    #[arg(long, action = ArgAction::SetTrue)]
    disabled: bool,
}

/// Arguments for `user update`.
#[derive(Args, Debug)]
struct UserUpdateCommand {
    /// User email.
    email: String,
    /// New display name.
    #[arg(long)]
    name: Option<String>,
    /// Enable the account.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "disable")]
    enable: bool,
    /// Disable the account.
    #[arg(long, action = ArgAction::SetTrue)]
    disable: bool,
}

/// Arguments for `user grant`.
#[derive(Args, Debug)]
struct UserGrantCommand {
    /// User email.
    email: String,
    /// Targets to grant (`ALL`, study identifiers, or group names).
    targets: Vec<String>,
}

/// Arguments for `user access`.
#[derive(Args, Debug)]
struct UserAccessCommand {
    /// User email.
    email: String,
    /// Study identifier.
    study: String,
}

/// Arguments for `study users`.
#[derive(Args, Debug)]
struct StudyUsersCommand {
    /// Study identifier.
    study: String,
    /// Emails to hold the study grant; empty clears it.
    emails: Vec<String>,
}

/// Arguments for `group users`.
#[derive(Args, Debug)]
struct GroupUsersCommand {
    /// Group name.
    group: String,
    /// Emails to hold the group grant; empty clears it.
    emails: Vec<String>,
}

/// Arguments for `export`.
#[derive(Args, Debug)]
struct ExportCommand {
    /// Output path; defaults to a timestamped file in the working directory.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// Arguments for `import`.
#[derive(Args, Debug)]
struct ImportCommand {
    /// Snapshot file to import.
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog-rendered messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a rendered message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Access admin bound to the SQLite store.
type Admin = AccessAdmin<SqlitePortalStore>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = load_config(cli.config.as_deref())?;
    match command {
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(),
        Commands::Dashboard => command_dashboard(&open_admin(&config)?),
        Commands::User {
            command,
        } => command_user(&open_admin(&config)?, command),
        Commands::Study {
            command,
        } => command_study(&open_admin(&config)?, command),
        Commands::Group {
            command,
        } => command_group(&open_admin(&config)?, command),
        Commands::Export(command) => command_export(&open_admin(&config)?, &config, command),
        Commands::Import(command) => command_import(&open_admin(&config)?, &config, &command),
    }
}

/// Prints the top-level help text.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

/// Loads and validates the configuration.
fn load_config(path: Option<&Path>) -> CliResult<PortalAccessConfig> {
    PortalAccessConfig::load(path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Opens the portal database and wires the configured audit sink.
fn open_admin(config: &PortalAccessConfig) -> CliResult<Admin> {
    let store = SqlitePortalStore::new(&config.database.to_store_config())
        .map_err(|err| CliError::new(t!("store.open_failed", error = err)))?;
    let audit = build_audit_sink(&config.audit)?;
    Ok(AccessAdmin::new(store, audit).with_max_import_bytes(config.export.max_import_bytes))
}

/// Builds the audit sink selected by the `[audit]` section.
fn build_audit_sink(config: &AuditConfig) -> CliResult<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => {
            let sink = FileAuditSink::new(path).map_err(|err| {
                CliError::new(t!("audit.open_failed", path = path.display(), error = err))
            })?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes `config validate`; loading already validated the file.
fn command_config_validate() -> CliResult<ExitCode> {
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Browse Commands
// ============================================================================

/// Executes `dashboard`.
fn command_dashboard(admin: &Admin) -> CliResult<ExitCode> {
    let dashboard = admin.dashboard().map_err(command_failed)?;
    write_stdout_line(&t!(
        "dashboard.summary",
        users = dashboard.users,
        studies = dashboard.studies,
        groups = dashboard.groups
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes a `study` subcommand.
fn command_study(admin: &Admin, command: StudyCommand) -> CliResult<ExitCode> {
    match command {
        StudyCommand::List => {
            let studies = admin.store().list_studies().map_err(command_failed)?;
            write_json(&studies)?;
        }
        StudyCommand::Show(arg) => {
            let access = admin.study_access(&arg.study).map_err(command_failed)?;
            write_json(&access)?;
        }
        StudyCommand::Users(command) => {
            let emails = to_emails(command.emails);
            admin.set_study_users(&command.study, &emails).map_err(command_failed)?;
            write_stdout_line(&t!("study.users.set", count = emails.len(), study = command.study))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes a `group` subcommand.
fn command_group(admin: &Admin, command: GroupCommand) -> CliResult<ExitCode> {
    match command {
        GroupCommand::List => {
            let groups = admin.store().list_groups().map_err(command_failed)?;
            write_json(&groups)?;
        }
        GroupCommand::Show(arg) => {
            let access = admin.group_access(&arg.group).map_err(command_failed)?;
            write_json(&access)?;
        }
        GroupCommand::Users(command) => {
            let emails = to_emails(command.emails);
            admin.set_group_users(&command.group, &emails).map_err(command_failed)?;
            write_stdout_line(&t!("group.users.set", count = emails.len(), group = command.group))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: User Commands
// ============================================================================

/// Executes a `user` subcommand.
fn command_user(admin: &Admin, command: UserCommand) -> CliResult<ExitCode> {
    let message = match command {
        UserCommand::List => {
            let users = admin.store().list_users().map_err(command_failed)?;
            return write_json(&users).map(|()| ExitCode::SUCCESS);
        }
        UserCommand::Show(arg) => {
            let access = admin.user_access(&Email::new(arg.email)).map_err(command_failed)?;
            return write_json(&access).map(|()| ExitCode::SUCCESS);
        }
        UserCommand::Choices => {
            let choices = admin.authority_choices().map_err(command_failed)?;
            return write_json(&choices).map(|()| ExitCode::SUCCESS);
        }
        UserCommand::Create(command) => {
            let user = User::new(command.email, command.name, !command.disabled);
            admin.create_user(&user).map_err(command_failed)?;
            t!("user.created", email = user.email)
        }
        UserCommand::Update(command) => command_user_update(admin, command)?,
        UserCommand::Delete(arg) => {
            let email = Email::new(arg.email);
            admin.delete_user(&email).map_err(command_failed)?;
            t!("user.deleted", email = email)
        }
        UserCommand::Grant(command) => {
            let email = Email::new(command.email);
            admin.set_user_authorities(&email, &command.targets).map_err(command_failed)?;
            t!("user.granted", count = command.targets.len(), email = email)
        }
        UserCommand::Access(command) => {
            let email = Email::new(command.email);
            if admin.has_access(&email, &command.study).map_err(command_failed)? {
                t!("user.access.allowed", email = email, study = command.study)
            } else {
                t!("user.access.denied", email = email, study = command.study)
            }
        }
    };
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Applies `user update` on top of the stored record.
fn command_user_update(admin: &Admin, command: UserUpdateCommand) -> CliResult<String> {
    if command.name.is_none() && !command.enable && !command.disable {
        return Err(CliError::new(t!("user.update.nothing")));
    }
    let email = Email::new(command.email);
    let mut user = admin.store().get_user(&email).map_err(command_failed)?;
    if let Some(name) = command.name {
        user.name = name;
    }
    if command.enable {
        user.enabled = true;
    }
    if command.disable {
        user.enabled = false;
    }
    admin.update_user(&user).map_err(command_failed)?;
    Ok(t!("user.updated", email = email))
}

// ============================================================================
// SECTION: Transfer Commands
// ============================================================================

/// Executes `export`.
fn command_export(
    admin: &Admin,
    config: &PortalAccessConfig,
    command: ExportCommand,
) -> CliResult<ExitCode> {
    let document = admin.export_all().map_err(command_failed)?;
    let path = command.output.unwrap_or_else(|| {
        PathBuf::from(export_filename_with_suffix(
            OffsetDateTime::now_utc(),
            &config.export.filename_suffix,
        ))
    });
    fs::write(&path, document.as_bytes()).map_err(|err| {
        CliError::new(t!("export.write_failed", path = path.display(), error = err))
    })?;
    write_stdout_line(&t!("export.written", path = path.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `import`.
fn command_import(
    admin: &Admin,
    config: &PortalAccessConfig,
    command: &ImportCommand,
) -> CliResult<ExitCode> {
    let path = &command.file;
    let bytes = read_bytes_with_limit(path, config.export.max_import_bytes).map_err(|err| {
        match err {
            ReadLimitError::Io(err) => {
                CliError::new(t!("import.read_failed", path = path.display(), error = err))
            }
            ReadLimitError::TooLarge {
                size,
                limit,
            } => CliError::new(t!(
                "import.too_large",
                path = path.display(),
                size = size,
                limit = limit
            )),
        }
    })?;
    let text = String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("import.not_utf8", path = path.display())))?;
    let (users, authorities) = admin.import_all(&text).map_err(command_failed)?;
    write_stdout_line(&t!("import.done", users = users, authorities = authorities))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: File Helpers
// ============================================================================

/// Errors raised while reading a bounded input file.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Converts raw email arguments into [`Email`] values.
fn to_emails(raw: Vec<String>) -> Vec<Email> {
    raw.into_iter().map(Email::new).collect()
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Wraps a service error for display.
fn command_failed(error: PortalError) -> CliError {
    CliError::new(t!("command.failed", error = error))
}

/// Writes a value to stdout as pretty JSON.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Renders an output failure for the named stream.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
