//! Command handlers module
//!
//! This module defines the CLI subcommands and dispatches each one to its
//! handler.

pub mod auth;
pub mod certificate;
pub mod checkin;
pub mod events;
pub mod settings;
pub mod surveys;

use std::path::PathBuf;
use clap::{Subcommand, ValueEnum};

use crate::models::{EventCategory, EventStatus, Recurrence, Semester};
use surveys::{parse_question, QuestionArg};
use crate::state::{Action, Notice};
use crate::utils::errors::Result;
use super::CliContext;

/// All available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Ask the backend for a long-lived token
        #[arg(long, default_value_t = false)]
        stay_signed_in: bool,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Request a password reset email
    PasswordReset {
        email: String,
    },
    /// Browse and manage events
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },
    /// Build surveys and read their results (admin only)
    Surveys {
        #[command(subcommand)]
        command: SurveysCommand,
    },
    /// Time in, time out, answer the survey and get the certificate for an event
    Checkin {
        event_id: i64,
        /// Continue an attendance recorded earlier
        #[arg(long)]
        attendance: Option<i64>,
        /// Where certificates are saved
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Show the completion status of an attendance
    Status {
        attendance_id: i64,
    },
    /// Review a generated certificate
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },
    /// Download or email an approved certificate
    Certificate {
        #[command(subcommand)]
        command: CertificateCommand,
    },
    /// List the signed-in user's attendances and certificates
    Certificates,
    /// Inspect or write the client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum EventsCommand {
    List {
        #[arg(long, value_enum)]
        status: Option<StatusCli>,
    },
    Show {
        event_id: i64,
    },
    /// Create an event (admin only)
    Create {
        #[command(flatten)]
        form: EventForm,
    },
    /// Update an event (admin only); omitted fields keep their values
    Update {
        event_id: i64,
        #[command(flatten)]
        form: EventFormUpdate,
    },
    /// Delete an event (admin only)
    Delete {
        event_id: i64,
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// List attendances of an event (admin only)
    Attendees {
        event_id: i64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SurveysCommand {
    /// Surveys attached to an event
    List {
        event_id: i64,
    },
    /// Create a survey for an event
    Create {
        event_id: i64,
        #[arg(long)]
        title: String,
        /// Repeatable; `kind:text` with kind one of text, rating, yesno
        #[arg(long = "question", value_parser = parse_question, required = true)]
        questions: Vec<QuestionArg>,
    },
    /// Replace the title and/or questions of a survey
    Update {
        survey_id: i64,
        #[arg(long)]
        title: Option<String>,
        /// Replaces every question when given
        #[arg(long = "question", value_parser = parse_question)]
        questions: Vec<QuestionArg>,
    },
    /// Show every answer given to a survey
    Results {
        survey_id: i64,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct EventForm {
    #[arg(long)]
    pub title: String,
    /// RFC 3339 start time
    #[arg(long)]
    pub start: String,
    /// RFC 3339 end time
    #[arg(long)]
    pub end: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, value_enum, default_value_t = CategoryCli::Other)]
    pub category: CategoryCli,
    /// 0 means unlimited
    #[arg(long, default_value_t = 0)]
    pub max_capacity: u32,
    #[arg(long, default_value = "default")]
    pub certificate_template: String,
    #[arg(long, value_enum, default_value_t = RecurrenceCli::None)]
    pub recurrence: RecurrenceCli,
    #[arg(long)]
    pub recurrence_end_date: Option<String>,
    #[arg(long, value_enum, default_value_t = SemesterCli::None)]
    pub semester: SemesterCli,
    #[arg(long, default_value = "")]
    pub academic_year: String,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EventFormUpdate {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_enum)]
    pub category: Option<CategoryCli>,
    #[arg(long)]
    pub max_capacity: Option<u32>,
    #[arg(long)]
    pub certificate_template: Option<String>,
    #[arg(long, value_enum)]
    pub semester: Option<SemesterCli>,
    #[arg(long)]
    pub academic_year: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ReviewCommand {
    Show {
        attendance_id: i64,
    },
    Approve {
        attendance_id: i64,
    },
    /// Ask for changes to the certificate
    Modify {
        attendance_id: i64,
        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CertificateCommand {
    Download {
        attendance_id: i64,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    Email {
        attendance_id: i64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Write the default configuration to a TOML file
    Init {
        #[arg(long, default_value = "config.toml")]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StatusCli {
    Upcoming,
    Ongoing,
    Completed,
}

impl From<StatusCli> for EventStatus {
    fn from(value: StatusCli) -> Self {
        match value {
            StatusCli::Upcoming => EventStatus::Upcoming,
            StatusCli::Ongoing => EventStatus::Ongoing,
            StatusCli::Completed => EventStatus::Completed,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CategoryCli {
    Seminar,
    Workshop,
    Conference,
    Training,
    Meeting,
    Other,
}

impl From<CategoryCli> for EventCategory {
    fn from(value: CategoryCli) -> Self {
        match value {
            CategoryCli::Seminar => EventCategory::Seminar,
            CategoryCli::Workshop => EventCategory::Workshop,
            CategoryCli::Conference => EventCategory::Conference,
            CategoryCli::Training => EventCategory::Training,
            CategoryCli::Meeting => EventCategory::Meeting,
            CategoryCli::Other => EventCategory::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SemesterCli {
    None,
    First,
    Second,
    Summer,
}

impl From<SemesterCli> for Semester {
    fn from(value: SemesterCli) -> Self {
        match value {
            SemesterCli::None => Semester::None,
            SemesterCli::First => Semester::First,
            SemesterCli::Second => Semester::Second,
            SemesterCli::Summer => Semester::Summer,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RecurrenceCli {
    None,
    Daily,
    Weekly,
    Monthly,
}

impl From<RecurrenceCli> for Recurrence {
    fn from(value: RecurrenceCli) -> Self {
        match value {
            RecurrenceCli::None => Recurrence::None,
            RecurrenceCli::Daily => Recurrence::Daily,
            RecurrenceCli::Weekly => Recurrence::Weekly,
            RecurrenceCli::Monthly => Recurrence::Monthly,
        }
    }
}

impl Command {
    /// Action whose failure message applies when the command fails
    pub fn action(&self) -> Option<Action> {
        match self {
            Command::Login { .. } => Some(Action::Login),
            Command::Register { .. } => Some(Action::Register),
            Command::PasswordReset { .. } => Some(Action::PasswordReset),
            Command::Events { command } => match command {
                EventsCommand::Create { .. } | EventsCommand::Update { .. } => Some(Action::SaveEvent),
                EventsCommand::Delete { .. } => Some(Action::DeleteEvent),
                _ => None,
            },
            Command::Surveys { command } => match command {
                SurveysCommand::Create { .. } => Some(Action::CreateSurvey),
                SurveysCommand::Update { .. } => Some(Action::UpdateSurvey),
                _ => None,
            },
            Command::Review { command } => match command {
                ReviewCommand::Approve { .. } => Some(Action::ApproveCertificate),
                ReviewCommand::Modify { .. } => Some(Action::RequestModification),
                ReviewCommand::Show { .. } => None,
            },
            Command::Certificate { command } => match command {
                CertificateCommand::Download { .. } => Some(Action::DownloadCertificate),
                CertificateCommand::Email { .. } => Some(Action::EmailCertificate),
            },
            _ => None,
        }
    }
}

/// Print a confirmation notice
pub(crate) fn announce(notice: &Notice) {
    println!("{}", notice);
}

/// Main command dispatcher
pub async fn handle_command(ctx: &mut CliContext, cmd: Command) -> Result<()> {
    match cmd {
        Command::Login { email, stay_signed_in } => auth::handle_login(ctx, email, stay_signed_in).await,
        Command::Register { email } => auth::handle_register(ctx, email).await,
        Command::Logout => auth::handle_logout(ctx).await,
        Command::Whoami => auth::handle_whoami(ctx).await,
        Command::PasswordReset { email } => auth::handle_password_reset(ctx, &email).await,
        Command::Events { command } => events::handle_events(ctx, command).await,
        Command::Surveys { command } => surveys::handle_surveys(ctx, command).await,
        Command::Checkin { event_id, attendance, output_dir } => {
            checkin::handle_checkin(ctx, event_id, attendance, &output_dir).await
        }
        Command::Status { attendance_id } => checkin::handle_status(ctx, attendance_id).await,
        Command::Review { command } => certificate::handle_review(ctx, command).await,
        Command::Certificate { command } => certificate::handle_certificate(ctx, command).await,
        Command::Certificates => certificate::handle_my_certificates(ctx).await,
        Command::Config { command } => settings::handle_config(ctx, command).await,
    }
}
