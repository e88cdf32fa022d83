//! # openclinica-ws-cli
//!
//! Command-line front end for the OpenClinica SOAP webservices. One
//! subcommand per remote operation; responses are printed as JSON on
//! stdout and the service result on stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

mod app;
mod commands;

use commands::{
    cmd_create_subject, cmd_import, cmd_metadata, cmd_schedule_event, cmd_studies,
    cmd_subject_exists, cmd_subjects,
};

use openclinica_ws::{NewEvent, NewSubject, OcwsConfig, Webservices};

/// Command-line client for OpenClinica SOAP webservices.
#[derive(Parser)]
#[command(name = "ocws", version, about)]
struct Cli {
    /// Path to ocws.toml config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Webservices base URL override
    #[arg(long)]
    url: Option<String>,

    /// Enable verbose logging (set RUST_LOG for fine-grained control)
    #[arg(short, long)]
    verbose: bool,

    /// Log every SOAP envelope and reply (implies --verbose)
    #[arg(long)]
    log_messages: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List studies and their sites
    Studies,

    /// Fetch a study's ODM metadata
    Metadata {
        study: String,
        #[arg(long)]
        site: Option<String>,
        /// Print event definition and item OIDs instead of the document
        #[arg(long)]
        oids: bool,
    },

    /// List the study subjects of a study or site
    Subjects {
        study: String,
        #[arg(long)]
        site: Option<String>,
    },

    /// Enroll a study subject
    CreateSubject {
        study: String,
        label: String,
        /// Enrollment date (YYYY-MM-DD)
        #[arg(long)]
        enrollment_date: String,
        /// m or f
        #[arg(long)]
        gender: String,
        #[arg(long)]
        secondary_label: Option<String>,
        #[arg(long)]
        person_id: Option<String>,
        /// Date of birth (YYYY-MM-DD) or year of birth (YYYY)
        #[arg(long)]
        dob: Option<String>,
        #[arg(long)]
        site: Option<String>,
    },

    /// Print a study subject's OID if it exists
    SubjectExists {
        study: String,
        label: String,
        #[arg(long)]
        site: Option<String>,
    },

    /// Schedule a study event
    ScheduleEvent {
        study: String,
        label: String,
        /// Study event definition OID
        event: String,
        #[arg(long)]
        location: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: String,
        #[arg(long)]
        site: Option<String>,
        /// Start time (HH:MM)
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        end_time: Option<String>,
    },

    /// Import ODM clinical data (`-` reads stdin)
    Import { file: PathBuf },
}

impl Command {
    /// Subcommand name as typed on the command line.
    fn name(&self) -> &'static str {
        match self {
            Command::Studies => "studies",
            Command::Metadata { .. } => "metadata",
            Command::Subjects { .. } => "subjects",
            Command::CreateSubject { .. } => "create-subject",
            Command::SubjectExists { .. } => "subject-exists",
            Command::ScheduleEvent { .. } => "schedule-event",
            Command::Import { .. } => "import",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose || cli.log_messages {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("openclinica_ws=debug,ocws=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("openclinica_ws=warn")
            .init();
    }

    let mut config = match OcwsConfig::discover(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", "Configuration error:".red(), e);
            eprintln!(
                "  Set {}, {} and {} env vars, or create an ocws.toml file.",
                "OCWS_URL".cyan(),
                "OCWS_USERNAME".cyan(),
                "OCWS_PASSWORD".cyan()
            );
            return ExitCode::FAILURE;
        }
    };

    if let Some(url) = &cli.url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if cli.log_messages {
        config.log_messages = true;
    }

    tracing::debug!(command = cli.command.name(), base_url = %config.base_url, "Dispatching");

    let ws = Webservices::new(config);
    let result = match &cli.command {
        Command::Studies => cmd_studies(&ws).await,
        Command::Metadata { study, site, oids } => {
            cmd_metadata(&ws, study, site.as_deref(), *oids).await
        }
        Command::Subjects { study, site } => cmd_subjects(&ws, study, site.as_deref()).await,
        Command::CreateSubject {
            study,
            label,
            enrollment_date,
            gender,
            secondary_label,
            person_id,
            dob,
            site,
        } => {
            let subject = NewSubject {
                study_id: study,
                subject_label: label,
                enrollment_date,
                gender,
                secondary_label: secondary_label.as_deref(),
                person_id: person_id.as_deref(),
                date_of_birth: dob.as_deref(),
                site_id: site.as_deref(),
            };
            cmd_create_subject(&ws, &subject).await
        }
        Command::SubjectExists { study, label, site } => {
            cmd_subject_exists(&ws, study, label, site.as_deref()).await
        }
        Command::ScheduleEvent {
            study,
            label,
            event,
            location,
            start_date,
            site,
            start_time,
            end_date,
            end_time,
        } => {
            let event = NewEvent {
                study_id: study,
                subject_label: label,
                event_definition_oid: event,
                location,
                start_date,
                site_id: site.as_deref(),
                start_time: start_time.as_deref(),
                end_date: end_date.as_deref(),
                end_time: end_time.as_deref(),
            };
            cmd_schedule_event(&ws, &event).await
        }
        Command::Import { file } => cmd_import(&ws, Path::new(file)).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(command = cli.command.name(), error = %e, "Command failed");
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}
