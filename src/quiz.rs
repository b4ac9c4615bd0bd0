//! Quiz grading and the synthetic engagement sample it feeds back into the
//! session stream.

use crate::domain::{
    AlertSeverity, AlertType, EngagementAlert, EngagementSample, QuizResponse, RawMetrics,
};
use crate::error::AppError;
use crate::store::{SharedStore, write_store};
use std::time::SystemTime;
use tracing::info;
use uuid::Uuid;

/// Window of most recent responses inspected for quiz-pattern alerts.
pub const PATTERN_WINDOW: usize = 10;
/// Minimum responses before a pattern alert can fire.
pub const PATTERN_MIN_RESPONSES: usize = 3;

#[derive(Debug)]
pub struct QuizOutcome {
    pub response: QuizResponse,
    pub synthetic_sample: EngagementSample,
    pub alerts: Vec<EngagementAlert>,
}

/// Grades the answer, stores the response, injects one synthetic sample
/// reflecting quiz performance, and checks the recent-response window for
/// concerning patterns. Runs as a single atomic operation on the store.
#[allow(clippy::too_many_arguments)]
pub fn record_quiz_response(
    store: &SharedStore,
    session_id: &str,
    student_id: &str,
    quiz_question: &str,
    student_response: &str,
    correct_answer: &str,
    response_time_seconds: f64,
    confidence_level: Option<f64>,
    now: SystemTime,
) -> Result<QuizOutcome, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id"));
    }
    if student_id.trim().is_empty() {
        return Err(AppError::Validation("student_id"));
    }
    if quiz_question.trim().is_empty() {
        return Err(AppError::Validation("quiz_question"));
    }

    let is_correct = grade(student_response, correct_answer);
    let confidence = confidence_level
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or_else(|| estimate_confidence(is_correct, response_time_seconds));

    let response = QuizResponse {
        session_id: session_id.to_string(),
        student_id: student_id.to_string(),
        quiz_question: quiz_question.to_string(),
        student_response: student_response.to_string(),
        correct_answer: correct_answer.to_string(),
        response_time_seconds,
        is_correct,
        confidence_level: confidence,
        created_at: now,
    };

    let mut guard = write_store(store)?;

    // The student's zone is approximated by the session's first registered
    // zone; zone-level quiz tracking is a collaborator concern.
    let zone_id = guard
        .zones_for_session(session_id)
        .first()
        .map(|z| z.zone_id.clone());

    guard.insert_quiz_response(response.clone());

    let synthetic_sample = EngagementSample::from_raw(
        session_id.to_string(),
        zone_id,
        synthetic_metrics(is_correct, confidence),
        now,
    );
    guard.insert_sample(synthetic_sample.clone());

    let recent = guard.recent_quiz_responses(session_id, PATTERN_WINDOW);
    let alerts = pattern_alerts(session_id, &recent, now);
    guard.insert_alerts(alerts.clone());
    drop(guard);

    info!(
        session_id = session_id,
        student_id = student_id,
        correct = is_correct,
        confidence = confidence,
        "Quiz response recorded"
    );

    Ok(QuizOutcome {
        response,
        synthetic_sample,
        alerts,
    })
}

/// Case-insensitive, whitespace-trimmed exact match.
pub fn grade(student_response: &str, correct_answer: &str) -> bool {
    student_response.trim().to_lowercase() == correct_answer.trim().to_lowercase()
}

/// Confidence estimate when the student did not supply one: a base from
/// correctness plus a bonus for answering faster than 30 seconds.
pub fn estimate_confidence(is_correct: bool, response_time_seconds: f64) -> f64 {
    let base = if is_correct { 0.7 } else { 0.3 };
    let time_bonus = ((30.0 - response_time_seconds) / 30.0 * 0.3).max(0.0);
    (base + time_bonus).min(1.0)
}

/// Raw metrics for the synthetic sample a graded response injects into the
/// engagement stream.
fn synthetic_metrics(is_correct: bool, confidence: f64) -> RawMetrics {
    RawMetrics {
        attention_score: (0.7 + confidence * 0.15).min(1.0),
        participation_score: (0.6_f64 + if is_correct { 0.2 } else { 0.1 }).min(1.0),
        confusion_level: (0.3_f64 + if is_correct { -0.1 } else { 0.05 }).max(0.0),
        audio_sentiment: if is_correct { 0.3 } else { -0.1 },
        noise_level: 0.2,
        face_presence_count: 1,
        hand_raise_count: 0,
        posture_engagement: confidence,
    }
}

/// Pattern checks over the recent-response window. Both rules require at
/// least [`PATTERN_MIN_RESPONSES`] responses.
fn pattern_alerts(
    session_id: &str,
    recent: &[QuizResponse],
    now: SystemTime,
) -> Vec<EngagementAlert> {
    let mut alerts = Vec::new();
    if recent.len() < PATTERN_MIN_RESPONSES {
        return alerts;
    }

    let correct_rate =
        recent.iter().filter(|r| r.is_correct).count() as f64 / recent.len() as f64;
    let average_response_time = recent
        .iter()
        .map(|r| r.response_time_seconds)
        .sum::<f64>()
        / recent.len() as f64;

    if correct_rate < 0.4 {
        alerts.push(EngagementAlert {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            zone_id: None,
            alert_type: AlertType::LowQuizPerformance,
            severity: AlertSeverity::High,
            message: format!(
                "Low quiz performance detected - {}% correct rate",
                (correct_rate * 100.0).round() as u32
            ),
            current_value: correct_rate,
            threshold_value: 0.4,
            created_at: now,
            is_resolved: false,
            resolved_at: None,
        });
    }

    if average_response_time > 45.0 {
        alerts.push(EngagementAlert {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            zone_id: None,
            alert_type: AlertType::SlowQuizResponses,
            severity: AlertSeverity::Medium,
            message: "Students taking longer than expected to respond to quizzes".to_string(),
            current_value: average_response_time,
            threshold_value: 45.0,
            created_at: now,
            is_resolved: false,
            resolved_at: None,
        });
    }

    alerts
}
