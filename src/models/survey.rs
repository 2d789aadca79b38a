//! Survey model

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::errors::VpassError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Survey {
    pub id: i64,
    pub event: i64,
    pub title: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub id: Option<i64>,
    /// Older surveys store the prompt under `text`
    #[serde(alias = "text")]
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Rating,
    Yesno,
    #[default]
    #[serde(other)]
    Text,
}

impl QuestionKind {
    /// Hint shown next to the prompt
    pub fn hint(&self) -> &'static str {
        match self {
            QuestionKind::Text => "free text",
            QuestionKind::Rating => "1-5",
            QuestionKind::Yesno => "Yes/No",
        }
    }

    /// Check and normalize an answer for this kind of question
    pub fn normalize(&self, answer: &str) -> Result<String, VpassError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(VpassError::InvalidInput("An answer is required".to_string()));
        }
        match self {
            QuestionKind::Text => Ok(answer.to_string()),
            QuestionKind::Rating => match answer.parse::<u8>() {
                Ok(n) if (1..=5).contains(&n) => Ok(n.to_string()),
                _ => Err(VpassError::InvalidInput("Rating must be a number from 1 to 5".to_string())),
            },
            QuestionKind::Yesno => match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => Ok("Yes".to_string()),
                "n" | "no" => Ok("No".to_string()),
                _ => Err(VpassError::InvalidInput("Please answer Yes or No".to_string())),
            },
        }
    }
}

/// Answers keyed by question position, as the backend stores them
pub type SurveyAnswers = BTreeMap<String, String>;

impl Survey {
    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }

    /// Validate raw answers (in question order) and key them by position
    pub fn build_answers(&self, raw: &[String]) -> Result<SurveyAnswers, VpassError> {
        if raw.len() != self.questions.len() {
            return Err(VpassError::InvalidInput(format!(
                "Expected {} answers, got {}",
                self.questions.len(),
                raw.len()
            )));
        }

        self.questions
            .iter()
            .zip(raw)
            .enumerate()
            .map(|(idx, (question, answer))| {
                question
                    .kind
                    .normalize(answer)
                    .map(|normalized| (idx.to_string(), normalized))
                    .map_err(|e| match e {
                        VpassError::InvalidInput(msg) => VpassError::InvalidInput(format!(
                            "Question {} ({}): {}",
                            idx + 1,
                            question.question,
                            msg
                        )),
                        other => other,
                    })
            })
            .collect()
    }
}

/// Body of `POST /api/survey-responses/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponseRequest {
    pub attendance: i64,
    pub survey: i64,
    pub answers: SurveyAnswers,
}

/// Body of `POST /api/surveys/` and `PUT /api/surveys/:id/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyRequest {
    pub event: i64,
    pub title: String,
    pub is_active: bool,
    pub questions: Vec<Question>,
}

impl SurveyRequest {
    /// Number the questions from 1 in the order given
    pub fn new(event: i64, title: impl Into<String>, questions: Vec<(String, QuestionKind)>) -> Self {
        let questions = questions
            .into_iter()
            .enumerate()
            .map(|(idx, (question, kind))| Question {
                id: Some(idx as i64 + 1),
                question: question.trim().to_string(),
                kind,
            })
            .collect();
        Self {
            event,
            title: title.into().trim().to_string(),
            is_active: true,
            questions,
        }
    }

    pub fn validate(&self) -> Result<(), VpassError> {
        if self.title.is_empty() {
            return Err(VpassError::InvalidInput("Survey title is required".to_string()));
        }
        if self.questions.is_empty() {
            return Err(VpassError::InvalidInput("Add at least one question".to_string()));
        }
        if let Some(idx) = self.questions.iter().position(|q| q.question.is_empty()) {
            return Err(VpassError::InvalidInput(format!("Question {} has no text", idx + 1)));
        }
        Ok(())
    }
}

/// One stored survey response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponse {
    #[serde(default)]
    pub id: Option<i64>,
    pub attendance: i64,
    pub survey: i64,
    #[serde(default)]
    pub answers: SurveyAnswers,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A survey together with every response to it
#[derive(Debug, Clone)]
pub struct SurveyResults {
    pub survey: Survey,
    pub responses: Vec<SurveyResponse>,
}

impl SurveyResults {
    /// Non-empty answers given to the question at `position`.
    ///
    /// Answers are looked up by the question id first and by position second,
    /// since both keyings exist in stored responses.
    pub fn answers_for(&self, position: usize) -> Vec<&str> {
        let Some(question) = self.survey.questions.get(position) else {
            return Vec::new();
        };
        let by_id = question.id.map(|id| id.to_string());
        let by_position = position.to_string();

        self.responses
            .iter()
            .filter_map(|response| {
                by_id
                    .as_ref()
                    .and_then(|key| response.answers.get(key))
                    .or_else(|| response.answers.get(&by_position))
            })
            .map(String::as_str)
            .filter(|answer| !answer.is_empty())
            .collect()
    }
}
