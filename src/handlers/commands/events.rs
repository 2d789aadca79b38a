//! Event command handlers

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::models::{Event, EventRequest};
use crate::services::Permission;
use crate::state::{Action, Notice};
use crate::utils::errors::{VpassError, Result};
use crate::utils::helpers::{format_timestamp, truncate_text};
use crate::utils::logging::log_admin_action;
use super::{announce, EventForm, EventFormUpdate, EventsCommand};
use super::super::CliContext;

pub async fn handle_events(ctx: &mut CliContext, command: EventsCommand) -> Result<()> {
    match command {
        EventsCommand::List { status } => handle_list(ctx, status.map(Into::into)).await,
        EventsCommand::Show { event_id } => handle_show(ctx, event_id).await,
        EventsCommand::Create { form } => handle_create(ctx, form).await,
        EventsCommand::Update { event_id, form } => handle_update(ctx, event_id, form).await,
        EventsCommand::Delete { event_id, yes } => handle_delete(ctx, event_id, yes).await,
        EventsCommand::Attendees { event_id } => handle_attendees(ctx, event_id).await,
    }
}

async fn handle_list(ctx: &mut CliContext, status: Option<crate::models::EventStatus>) -> Result<()> {
    ctx.signed_in(Permission::User).await?;

    let events = match status {
        Some(status) => ctx.services().event_service.filter_by_status(status).await?,
        None => ctx.services().event_service.list_events().await?,
    };
    debug!(count = events.len(), "Listing events");

    if events.is_empty() {
        println!("No events found");
        return Ok(());
    }
    for event in &events {
        println!(
            "#{:<5} {:<40} {}  [{}]",
            event.id,
            truncate_text(&event.title, 40),
            format_timestamp(event.start),
            event.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

fn print_event(event: &Event, base_url: &str) {
    println!("{} (#{})", event.title, event.id);
    if !event.description.is_empty() {
        println!("{}", event.description);
    }
    println!("Starts:   {}", format_timestamp(event.start));
    println!("Ends:     {}", format_timestamp(event.end));
    println!("Category: {:?}", event.category);
    if event.has_capacity_limit() {
        println!("Capacity: {}", event.max_capacity.unwrap_or(0));
    }
    if let Some(status) = event.status {
        println!("Status:   {}", status);
    }
    if let Some(qr) = &event.qr_code {
        println!("QR code:  {}{}", base_url, qr);
    }
}

async fn handle_show(ctx: &mut CliContext, event_id: i64) -> Result<()> {
    ctx.signed_in(Permission::User).await?;
    let event = ctx.services().event_service.get_event(event_id).await?;
    print_event(&event, ctx.services().api.base_url());
    Ok(())
}

fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| VpassError::InvalidInput(format!("Invalid {} time '{}': {}", field, value, e)))
}

fn request_from_form(form: EventForm) -> Result<EventRequest> {
    let mut request = EventRequest::new(
        form.title,
        parse_time("start", &form.start)?,
        parse_time("end", &form.end)?,
    );
    request.description = form.description;
    request.category = form.category.into();
    request.max_capacity = form.max_capacity;
    request.certificate_template = form.certificate_template;
    request.recurrence = form.recurrence.into();
    request.recurrence_end_date = form
        .recurrence_end_date
        .as_deref()
        .map(|value| parse_time("recurrence end", value))
        .transpose()?;
    request.semester = form.semester.into();
    request.academic_year = form.academic_year;
    Ok(request)
}

async fn handle_create(ctx: &mut CliContext, form: EventForm) -> Result<()> {
    let admin = ctx.signed_in(Permission::Admin).await?;
    let request = request_from_form(form)?;

    let event = ctx.services().event_service.create_event(&request).await?;
    log_admin_action(&admin.email, "create_event", Some(&event.id.to_string()), Some(&event.title));
    announce(&Notice::new(Action::SaveEvent, format!("Event created (#{})", event.id)));
    Ok(())
}

async fn handle_update(ctx: &mut CliContext, event_id: i64, form: EventFormUpdate) -> Result<()> {
    let admin = ctx.signed_in(Permission::Admin).await?;
    let current = ctx.services().event_service.get_event(event_id).await?;

    let mut request = EventRequest::from(&current);
    if let Some(title) = form.title {
        request.title = title;
    }
    if let Some(start) = form.start {
        request.start = parse_time("start", &start)?;
    }
    if let Some(end) = form.end {
        request.end = parse_time("end", &end)?;
    }
    if let Some(description) = form.description {
        request.description = description;
    }
    if let Some(category) = form.category {
        request.category = category.into();
    }
    if let Some(capacity) = form.max_capacity {
        request.max_capacity = capacity;
    }
    if let Some(template) = form.certificate_template {
        request.certificate_template = template;
    }
    if let Some(semester) = form.semester {
        request.semester = semester.into();
    }
    if let Some(year) = form.academic_year {
        request.academic_year = year;
    }

    let event = ctx.services().event_service.update_event(event_id, &request).await?;
    log_admin_action(&admin.email, "update_event", Some(&event_id.to_string()), None);
    announce(&Notice::new(Action::SaveEvent, format!("Event updated: {}", event.title)));
    Ok(())
}

async fn handle_delete(ctx: &mut CliContext, event_id: i64, yes: bool) -> Result<()> {
    let admin = ctx.signed_in(Permission::Admin).await?;

    if !yes && !ctx.prompt.confirm(&format!("Delete event #{}?", event_id)).await? {
        println!("Cancelled");
        return Ok(());
    }

    ctx.services().event_service.delete_event(event_id).await?;
    log_admin_action(&admin.email, "delete_event", Some(&event_id.to_string()), None);
    announce(&Notice::new(Action::DeleteEvent, "Event deleted"));
    Ok(())
}

async fn handle_attendees(ctx: &mut CliContext, event_id: i64) -> Result<()> {
    ctx.signed_in(Permission::Admin).await?;
    let attendances = ctx.services().event_service.list_attendees(event_id).await?;

    if attendances.is_empty() {
        println!("No attendees yet");
        return Ok(());
    }
    for attendance in &attendances {
        println!(
            "#{:<5} {:<30} {:<30} in: {}  out: {}  certificate: {}",
            attendance.id,
            truncate_text(attendance.attendee_name(), 30),
            attendance.attendee_email().unwrap_or("-"),
            attendance.time_in.map(format_timestamp).unwrap_or_else(|| "-".to_string()),
            attendance.time_out.map(format_timestamp).unwrap_or_else(|| "-".to_string()),
            if attendance.certificate_available() { "approved" } else { "pending" }
        );
    }
    println!("{} attendee(s)", attendances.len());
    Ok(())
}
