//! Certificate review and delivery handlers

use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::services::Permission;
use crate::state::{alert_text, Action, CertificateReview, Navigation, Notice};
use crate::utils::errors::Result;
use crate::utils::helpers::{format_timestamp, truncate_text};
use super::{announce, CertificateCommand, ReviewCommand};
use super::super::CliContext;

pub async fn handle_review(ctx: &mut CliContext, command: ReviewCommand) -> Result<()> {
    ctx.signed_in(Permission::User).await?;

    match command {
        ReviewCommand::Show { attendance_id } => {
            let (review, _navigation) =
                CertificateReview::open(ctx.services().clone(), &ctx.settings, attendance_id).await?;
            print_review(&review);
            Ok(())
        }
        ReviewCommand::Approve { attendance_id } => {
            let (mut review, _navigation) =
                CertificateReview::open(ctx.services().clone(), &ctx.settings, attendance_id).await?;
            let notice = review.approve().await?;
            announce(&notice);
            Ok(())
        }
        ReviewCommand::Modify { attendance_id, message } => {
            let message = match message {
                Some(message) => message,
                None => ctx.prompt.ask_required("Describe the modifications you need").await?,
            };
            let (mut review, _navigation) =
                CertificateReview::open(ctx.services().clone(), &ctx.settings, attendance_id).await?;
            let notice = review.request_modification(&message).await?;
            announce(&notice);
            Ok(())
        }
    }
}

fn print_review(review: &CertificateReview) {
    let attendance = review.attendance();
    println!(
        "Certificate for {} ({})",
        attendance.attendee_name(),
        attendance.event_title.as_deref().unwrap_or("event")
    );

    let state = match review.status() {
        Some(status) if status.certificate_approved => "approved",
        Some(status) if status.certificate_reviewed => "modification requested",
        Some(status) if status.certificate_ready => "ready for review",
        Some(_) => "not generated yet",
        None if attendance.certificate_approved => "approved",
        None => "unknown",
    };
    println!("Status: {}", state);
}

/// Interactive review screen reached from the check-in flow
pub async fn run_review(ctx: &mut CliContext, attendance_id: i64, output_dir: &Path) -> Result<()> {
    let (mut review, mut navigation) =
        CertificateReview::open(ctx.services().clone(), &ctx.settings, attendance_id).await?;
    print_review(&review);

    while review.can_approve() {
        let choice = ctx.prompt.ask("[a]pprove, [m]odify, [d]ownload a preview or [q]uit").await?;
        match choice.to_ascii_lowercase().as_str() {
            "a" | "approve" => match review.approve().await {
                Ok(notice) => {
                    announce(&notice);
                    // Approval schedules the return to the dashboard
                    let wait = ctx.settings.redirect_delay() + Duration::from_secs(1);
                    if let Ok(Some(Navigation::Dashboard)) = tokio::time::timeout(wait, navigation.recv()).await {
                        println!("Returning to the dashboard");
                    }
                    break;
                }
                Err(e) => eprintln!("{}", alert_text(Action::ApproveCertificate, &e)),
            },
            "m" | "modify" => {
                let message = ctx.prompt.ask_required("Describe the modifications you need").await?;
                match review.request_modification(&message).await {
                    Ok(notice) => {
                        announce(&notice);
                        break;
                    }
                    Err(e) => eprintln!("{}", alert_text(Action::RequestModification, &e)),
                }
            }
            "d" | "download" => match review.download(output_dir).await {
                Ok(path) => println!("Certificate saved to {}", path.display()),
                Err(e) => eprintln!("{}", alert_text(Action::DownloadCertificate, &e)),
            },
            "q" | "quit" | "" => break,
            other => println!("Unknown choice: {}", other),
        }
    }

    review.teardown();
    Ok(())
}

pub async fn handle_certificate(ctx: &mut CliContext, command: CertificateCommand) -> Result<()> {
    ctx.signed_in(Permission::User).await?;
    let attendances = &ctx.services().attendance_service;

    match command {
        CertificateCommand::Download { attendance_id, output_dir } => {
            let attendance = attendances.get_attendance(attendance_id).await?;
            let path = attendances
                .download_certificate_to(attendance_id, &output_dir, attendance.event_title.as_deref())
                .await?;
            info!(attendance_id = attendance_id, path = %path.display(), "Certificate downloaded");
            println!("Certificate saved to {}", path.display());
        }
        CertificateCommand::Email { attendance_id } => {
            let detail = attendances.email_certificate(attendance_id).await?;
            announce(&Notice::new(Action::EmailCertificate, detail));
        }
    }
    Ok(())
}

pub async fn handle_my_certificates(ctx: &mut CliContext) -> Result<()> {
    let user = ctx.signed_in(Permission::User).await?;
    let attendances = ctx.services().attendance_service.list_for_email(&user.email).await?;

    if attendances.is_empty() {
        println!("No attendances recorded for {}", user.email);
        return Ok(());
    }

    for attendance in &attendances {
        let certificate = if attendance.certificate_available() {
            "approved"
        } else if attendance.certificate_ready && !attendance.certificate_reviewed {
            "ready for review"
        } else if attendance.certificate_ready {
            "pending review"
        } else {
            "-"
        };
        println!(
            "#{:<5} {:<40} {}  certificate: {}",
            attendance.id,
            truncate_text(attendance.event_title.as_deref().unwrap_or("(untitled event)"), 40),
            attendance.time_in.map(format_timestamp).unwrap_or_else(|| "-".to_string()),
            certificate
        );
    }
    Ok(())
}
