//! Data models module
//!
//! This module contains the wire types exchanged with the VPass backend

pub mod user;
pub mod event;
pub mod attendance;
pub mod survey;

// Re-export commonly used models
pub use user::{User, LoginRequest, RegisterRequest, AuthResponse, RefreshResponse, VerifyResponse, DetailMessage};
pub use event::{Event, EventRequest, EventStatus, EventCategory, Semester, Recurrence};
pub use attendance::{Attendance, Attendee, TimeInRequest, CompletionStatus, ModificationRequest};
pub use survey::{
    Survey, Question, QuestionKind, SurveyAnswers, SurveyRequest, SurveyResponse, SurveyResponseRequest,
    SurveyResults,
};
