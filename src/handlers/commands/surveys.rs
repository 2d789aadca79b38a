//! Survey administration handlers

use tracing::debug;

use crate::models::{QuestionKind, Survey, SurveyRequest};
use crate::services::Permission;
use crate::state::{Action, Notice};
use crate::utils::errors::Result;
use crate::utils::helpers::truncate_text;
use crate::utils::logging::log_admin_action;
use super::{announce, SurveysCommand};
use super::super::CliContext;

/// One `--question` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionArg {
    pub text: String,
    pub kind: QuestionKind,
}

/// Parse `kind:text`; without a known kind prefix the whole value is a text question
pub fn parse_question(value: &str) -> std::result::Result<QuestionArg, String> {
    let (kind, text) = match value.split_once(':') {
        Some((prefix, rest)) => match prefix.trim().to_ascii_lowercase().as_str() {
            "text" => (QuestionKind::Text, rest),
            "rating" => (QuestionKind::Rating, rest),
            "yesno" => (QuestionKind::Yesno, rest),
            _ => (QuestionKind::Text, value),
        },
        None => (QuestionKind::Text, value),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err("question text is empty".to_string());
    }
    Ok(QuestionArg { text: text.to_string(), kind })
}

fn question_pairs(questions: Vec<QuestionArg>) -> Vec<(String, QuestionKind)> {
    questions.into_iter().map(|q| (q.text, q.kind)).collect()
}

pub async fn handle_surveys(ctx: &mut CliContext, command: SurveysCommand) -> Result<()> {
    match command {
        SurveysCommand::List { event_id } => handle_list(ctx, event_id).await,
        SurveysCommand::Create { event_id, title, questions } => {
            handle_create(ctx, event_id, title, questions).await
        }
        SurveysCommand::Update { survey_id, title, questions } => {
            handle_update(ctx, survey_id, title, questions).await
        }
        SurveysCommand::Results { survey_id } => handle_results(ctx, survey_id).await,
    }
}

fn print_survey_line(survey: &Survey) {
    println!(
        "#{:<5} {:<40} {} question(s){}",
        survey.id,
        truncate_text(&survey.title, 40),
        survey.questions.len(),
        if survey.is_active { "" } else { "  (inactive)" }
    );
}

async fn handle_list(ctx: &mut CliContext, event_id: i64) -> Result<()> {
    ctx.signed_in(Permission::Admin).await?;
    let surveys = ctx.services().survey_service.surveys_for_event(event_id).await?;

    if surveys.is_empty() {
        println!("No surveys for this event yet");
        return Ok(());
    }
    surveys.iter().for_each(print_survey_line);
    Ok(())
}

async fn handle_create(
    ctx: &mut CliContext,
    event_id: i64,
    title: String,
    questions: Vec<QuestionArg>,
) -> Result<()> {
    let admin = ctx.signed_in(Permission::Admin).await?;
    let request = SurveyRequest::new(event_id, title, question_pairs(questions));

    let survey = ctx.services().survey_service.create_survey(&request).await?;
    log_admin_action(&admin.email, "create_survey", Some(&survey.id.to_string()), Some(&survey.title));
    announce(&Notice::new(Action::CreateSurvey, "Survey created successfully!"));
    print_survey_line(&survey);
    Ok(())
}

async fn handle_update(
    ctx: &mut CliContext,
    survey_id: i64,
    title: Option<String>,
    questions: Vec<QuestionArg>,
) -> Result<()> {
    let admin = ctx.signed_in(Permission::Admin).await?;
    let current = ctx.services().survey_service.get_survey(survey_id).await?;

    let questions = if questions.is_empty() {
        current.questions.iter().map(|q| (q.question.clone(), q.kind)).collect()
    } else {
        question_pairs(questions)
    };
    let request = SurveyRequest::new(current.event, title.unwrap_or(current.title), questions);

    let survey = ctx.services().survey_service.update_survey(survey_id, &request).await?;
    log_admin_action(&admin.email, "update_survey", Some(&survey_id.to_string()), None);
    announce(&Notice::new(Action::UpdateSurvey, "Survey updated successfully!"));
    print_survey_line(&survey);
    Ok(())
}

async fn handle_results(ctx: &mut CliContext, survey_id: i64) -> Result<()> {
    ctx.signed_in(Permission::Admin).await?;
    let results = ctx.services().survey_service.results(survey_id).await?;
    debug!(survey_id = survey_id, responses = results.responses.len(), "Showing survey results");

    println!("Survey results: {}", results.survey.title);
    println!(
        "{} response(s), {} question(s)",
        results.responses.len(),
        results.survey.questions.len()
    );

    for (idx, question) in results.survey.questions.iter().enumerate() {
        let answers = results.answers_for(idx);
        println!();
        println!("Q{}: {} ({})", idx + 1, question.question, question.kind.hint());
        if answers.is_empty() {
            println!("   No responses yet");
            continue;
        }
        for (n, answer) in answers.iter().enumerate() {
            println!("   {}. {}", n + 1, answer);
        }
    }

    if results.responses.is_empty() {
        println!();
        println!("Responses will appear here once attendees complete the survey.");
    }
    Ok(())
}
