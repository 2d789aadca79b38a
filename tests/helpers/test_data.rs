//! Test data builders
//!
//! JSON payloads shaped like the backend's answers, plus randomized
//! attendee data.

use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use vpass::models::Attendee;

pub const EVENT_ID: i64 = 7;
pub const ATTENDANCE_ID: i64 = 41;

pub fn user_json(email: &str, admin: bool) -> Value {
    json!({
        "id": 3,
        "username": email.split('@').next().unwrap_or(email),
        "email": email,
        "first_name": "Ana",
        "last_name": "Reyes",
        "is_staff": admin,
        "is_superuser": false,
        "role": if admin { "ADMIN" } else { "STUDENT" },
    })
}

pub fn event_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "Annual research colloquium",
        "start": "2024-05-01T09:00:00Z",
        "end": "2024-05-01T12:00:00Z",
        "category": "SEMINAR",
        "max_capacity": 0,
        "semester": "2ND",
        "academic_year": "2023-2024",
        "certificate_template": "default",
        "recurrence": "NONE",
        "status": "ongoing",
        "qr_code": format!("/media/qr_codes/event_{}.png", id),
    })
}

pub fn attendance_json(id: i64, event_id: i64, attendee: &Attendee) -> Value {
    json!({
        "id": id,
        "event": event_id,
        "attendee": {
            "full_name": attendee.full_name,
            "email": attendee.email,
            "student_id": attendee.student_id,
        },
        "time_in": "2024-05-01T09:05:00Z",
        "time_out": null,
        "survey_completed": false,
        "certificate_ready": false,
        "certificate_approved": false,
        "certificate_reviewed": false,
        "event_title": "Research Colloquium",
    })
}

/// Completion snapshot; flags in order time_out, survey_completed,
/// event_has_survey, certificate_ready, certificate_reviewed, certificate_approved
pub fn status_json(flags: [bool; 6]) -> Value {
    json!({
        "time_out": flags[0],
        "survey_completed": flags[1],
        "event_has_survey": flags[2],
        "certificate_ready": flags[3],
        "certificate_reviewed": flags[4],
        "certificate_approved": flags[5],
    })
}

pub fn surveys_json(event_id: i64) -> Value {
    json!([{
        "id": 5,
        "event": event_id,
        "title": "Post-event feedback",
        "is_active": true,
        "questions": [
            { "question": "How would you rate the event?", "type": "rating" },
            { "question": "Would you attend again?", "type": "yesno" },
            { "question": "Any comments?", "type": "text" },
        ],
    }])
}

pub fn random_attendee() -> Attendee {
    let name: String = Name().fake();
    let email: String = SafeEmail().fake();
    Attendee::new(name, email, Some("2021-00123".to_string()))
}
