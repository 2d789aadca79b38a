//! Check-in command handlers
//!
//! `checkin` walks the attendee through the stages of one event in the
//! terminal. Each loop iteration renders the current stage and offers the
//! single action that stage allows.

use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::models::{Attendee, User};
use crate::services::Permission;
use crate::state::{alert_text, select_stage, Action, CheckInFlow, Navigation, Stage, StageInput};
use crate::utils::errors::Result;
use super::{announce, certificate};
use super::super::CliContext;

/// Polls of a waiting stage before giving up
const MAX_WAIT_POLLS: u32 = 10;

pub async fn handle_checkin(
    ctx: &mut CliContext,
    event_id: i64,
    attendance_id: Option<i64>,
    output_dir: &Path,
) -> Result<()> {
    let user = ctx.signed_in(Permission::User).await?;
    let (mut flow, mut navigation) =
        CheckInFlow::open(ctx.services().clone(), &ctx.settings, event_id).await?;
    println!("{}", flow.event().title);

    if let Some(attendance_id) = attendance_id {
        flow.resume(attendance_id).await?;
    }

    let result = run_flow(ctx, &mut flow, &mut navigation, &user, output_dir).await;
    flow.teardown();

    if !flow.anomalies().is_empty() {
        warn!(count = flow.anomalies().len(), "Completion status went backwards during check-in");
    }
    result
}

async fn run_flow(
    ctx: &mut CliContext,
    flow: &mut CheckInFlow,
    navigation: &mut UnboundedReceiver<Navigation>,
    user: &User,
    output_dir: &Path,
) -> Result<()> {
    let poll_interval = ctx.settings.redirect_delay().max(Duration::from_millis(500));
    let mut waited = 0;

    loop {
        let stage = flow.stage();
        println!();
        println!("[{}/4] {}", stage.progress_step(), stage.headline());

        match stage {
            Stage::TimeIn => {
                let attendee = ask_attendee(ctx, user).await?;
                match flow.time_in(attendee).await {
                    Ok(notice) => announce(&notice),
                    Err(e) => {
                        eprintln!("{}", alert_text(Action::TimeIn, &e));
                        if !ctx.prompt.confirm("Try again?").await? {
                            return Ok(());
                        }
                    }
                }
            }
            Stage::TimeOutPrompt => {
                if !ctx.prompt.confirm("Time out now?").await? {
                    if let Some(attendance) = flow.attendance() {
                        println!("Resume later with: vpass checkin {} --attendance {}", flow.event().id, attendance.id);
                    }
                    return Ok(());
                }
                match flow.time_out().await {
                    Ok(notice) => announce(&notice),
                    Err(e) => eprintln!("{}", alert_text(Action::TimeOut, &e)),
                }
            }
            Stage::SurveyForm => {
                let answers = ask_survey(ctx, flow).await?;
                match flow.submit_survey(&answers).await {
                    Ok(notice) => announce(&notice),
                    Err(e) => eprintln!("{}", alert_text(Action::SubmitSurvey, &e)),
                }
            }
            Stage::LoadingSurvey
            | Stage::SurveyEmpty
            | Stage::GeneratingCertificate
            | Stage::AwaitingCertificate => {
                if waited >= MAX_WAIT_POLLS {
                    if let Some(attendance) = flow.attendance() {
                        println!("Still waiting. Check again later with: vpass status {}", attendance.id);
                    }
                    return Ok(());
                }
                waited += 1;
                tokio::time::sleep(poll_interval).await;
                if let Err(e) = flow.refresh().await {
                    eprintln!("{}", e.user_message("Failed to check completion status"));
                }
            }
            Stage::ReviewRequired => {
                // The flow schedules the move to the review screen; follow it when it fires
                let wait = ctx.settings.redirect_delay() + Duration::from_secs(1);
                match tokio::time::timeout(wait, navigation.recv()).await {
                    Ok(Some(Navigation::CertificateReview { attendance_id })) => {
                        flow.teardown();
                        return certificate::run_review(ctx, attendance_id, output_dir).await;
                    }
                    Ok(Some(Navigation::Dashboard)) | Ok(None) => return Ok(()),
                    Err(_) => {
                        warn!("Review navigation did not arrive");
                        return Ok(());
                    }
                }
            }
            Stage::CertificateReady => {
                return certificate_menu(ctx, flow, output_dir).await;
            }
            Stage::PendingReview => {
                if let Some(attendance) = flow.attendance() {
                    println!("Open the review screen with: vpass review show {}", attendance.id);
                }
                return Ok(());
            }
        }
    }
}

async fn ask_attendee(ctx: &mut CliContext, user: &User) -> Result<Attendee> {
    let full_name = ctx.prompt.ask(&format!("Full name [{}]", user.display_name())).await?;
    let full_name = if full_name.is_empty() { user.display_name() } else { full_name };

    let email = ctx.prompt.ask(&format!("Email [{}]", user.email)).await?;
    let email = if email.is_empty() { user.email.clone() } else { email };

    let student_id = ctx.prompt.ask_optional("Student ID").await?;
    Ok(Attendee::new(full_name, email, student_id))
}

async fn ask_survey(ctx: &mut CliContext, flow: &CheckInFlow) -> Result<Vec<String>> {
    let Some(survey) = flow.survey() else {
        return Ok(Vec::new());
    };

    println!("{}", survey.title);
    let mut answers = Vec::with_capacity(survey.questions.len());
    for (index, question) in survey.questions.iter().enumerate() {
        loop {
            let label = format!("{}. {} ({})", index + 1, question.question, question.kind.hint());
            let answer = ctx.prompt.ask(&label).await?;
            match question.kind.normalize(&answer) {
                Ok(_) => {
                    answers.push(answer);
                    break;
                }
                Err(e) => eprintln!("{}", e.user_message("Invalid answer")),
            }
        }
    }
    Ok(answers)
}

async fn certificate_menu(ctx: &mut CliContext, flow: &CheckInFlow, output_dir: &Path) -> Result<()> {
    loop {
        let choice = ctx.prompt.ask("[d]ownload, [e]mail, [p]rint or [q]uit").await?;
        match choice.to_ascii_lowercase().as_str() {
            "d" | "download" | "p" | "print" => match flow.download_certificate(output_dir).await {
                Ok(path) => {
                    info!(path = %path.display(), "Certificate saved");
                    println!("Certificate saved to {}", path.display());
                }
                Err(e) => eprintln!("{}", alert_text(Action::DownloadCertificate, &e)),
            },
            "e" | "email" => match flow.email_certificate().await {
                Ok(notice) => announce(&notice),
                Err(e) => eprintln!("{}", alert_text(Action::EmailCertificate, &e)),
            },
            "q" | "quit" | "" => return Ok(()),
            other => println!("Unknown choice: {}", other),
        }
    }
}

pub async fn handle_status(ctx: &mut CliContext, attendance_id: i64) -> Result<()> {
    ctx.signed_in(Permission::User).await?;
    let status = ctx.services().attendance_service.check_completion(attendance_id).await?;

    let stage = select_stage(&StageInput {
        has_attendance: true,
        status: Some(status),
        survey_loaded: true,
        survey_empty: false,
    });

    println!("Attendance #{}", attendance_id);
    for (flag, done) in status.progress_flags() {
        println!("  [{}] {}", if done { "x" } else { " " }, flag);
    }
    println!("  survey required: {}", if status.event_has_survey { "yes" } else { "no" });
    println!("[{}/4] {}", stage.progress_step(), stage.headline());
    Ok(())
}
