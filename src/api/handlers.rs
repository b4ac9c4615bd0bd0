use crate::api::responses::{
    AlertsResponse, ApiErrorCode, ErrorResponse, InterventionHistoryResponse,
    QuizResponseResponse, RecordSampleResponse, RegisterZoneResponse, ResolveAlertResponse,
    SendInterventionResponse, SessionSummaryResponse, TriggerBoosterResponse, format_timestamp,
};
use crate::domain::{
    AlertSeverity, BoosterType, InterventionType, RawMetrics, StudentResponses, ZoneRecord,
};
use crate::error::AppError;
use crate::random::RandomSource;
use crate::store::{SharedStore, write_store};
use crate::{alerts, booster, intervention, quiz, summary};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::error;
use uuid::Uuid;

/// Shared state handed to every handler: the session store plus the
/// randomness seam used by the delivery/broadcast simulations.
pub struct ApiContext {
    pub store: SharedStore,
    pub random: Mutex<Box<dyn RandomSource>>,
}

impl ApiContext {
    pub fn new(store: SharedStore, random: Box<dyn RandomSource>) -> Self {
        Self {
            store,
            random: Mutex::new(random),
        }
    }
}

/// Typed error surface: every core error maps to one status code and one
/// SCREAMING_SNAKE_CASE error code.
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ApiErrorCode::ValidationError),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ApiErrorCode::NotFound),
            AppError::NoData => (StatusCode::UNPROCESSABLE_ENTITY, ApiErrorCode::NoData),
            AppError::Store(_) | AppError::StateLock => {
                error!(error = %self.0, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::InternalError,
                )
            }
        };

        let body = ErrorResponse {
            error_code,
            error_message: self.0.to_string(),
            timestamp: format_timestamp(SystemTime::now()),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterZoneRequest {
    pub session_id: Option<String>,
    pub zone_id: Option<String>,
    pub zone_name: Option<String>,
}

pub async fn register_zone(
    State(context): State<Arc<ApiContext>>,
    Json(request): Json<RegisterZoneRequest>,
) -> Result<(StatusCode, Json<RegisterZoneResponse>), ApiError> {
    let session_id = required(request.session_id, "session_id")?;
    let zone_id = required(request.zone_id, "zone_id")?;
    let zone_name = required(request.zone_name, "zone_name")?;

    let mut guard = write_store(&context.store)?;
    guard.register_zone(ZoneRecord {
        session_id: session_id.clone(),
        zone_id: zone_id.clone(),
        zone_name: zone_name.clone(),
    });
    drop(guard);

    Ok((
        StatusCode::CREATED,
        Json(RegisterZoneResponse {
            session_id,
            zone_id,
            zone_name,
            timestamp: format_timestamp(SystemTime::now()),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct RecordSampleRequest {
    pub session_id: Option<String>,
    pub zone_id: Option<String>,
    #[serde(flatten)]
    pub metrics: RawMetrics,
}

pub async fn record_sample(
    State(context): State<Arc<ApiContext>>,
    Json(request): Json<RecordSampleRequest>,
) -> Result<Json<RecordSampleResponse>, ApiError> {
    let session_id = required(request.session_id, "session_id")?;
    let now = SystemTime::now();

    let outcome = alerts::record_sample(
        &context.store,
        &session_id,
        request.zone_id.as_deref(),
        request.metrics,
        now,
    )?;

    Ok(Json(RecordSampleResponse {
        engagement_data: (&outcome.sample).into(),
        alerts: outcome.alerts.iter().map(Into::into).collect(),
        timestamp: format_timestamp(now),
    }))
}

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub session_id: Option<String>,
    #[serde(default)]
    pub include_resolved: bool,
    pub severity: Option<String>,
}

pub async fn get_alerts(
    State(context): State<Arc<ApiContext>>,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<AlertsResponse>, ApiError> {
    let session_id = required(query.session_id, "session_id")?;
    let severity = query.severity.as_deref().map(parse_severity).transpose()?;

    let view = alerts::get_alerts(&context.store, &session_id, query.include_resolved, severity)?;

    Ok(Json(AlertsResponse {
        alerts: view.alerts.iter().map(Into::into).collect(),
        zone_statistics: view.zone_statistics.iter().map(Into::into).collect(),
        overall_metrics: (&view.overall_metrics).into(),
        timestamp: format_timestamp(SystemTime::now()),
    }))
}

pub async fn resolve_alert(
    State(context): State<Arc<ApiContext>>,
    Path(alert_id): Path<Uuid>,
) -> Result<Json<ResolveAlertResponse>, ApiError> {
    let now = SystemTime::now();
    let alert = alerts::resolve_alert(&context.store, alert_id, now)?;

    Ok(Json(ResolveAlertResponse {
        alert: (&alert).into(),
        timestamp: format_timestamp(now),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SendInterventionRequest {
    pub session_id: Option<String>,
    pub zone_id: Option<String>,
    pub intervention_type: Option<String>,
    pub message: Option<String>,
}

pub async fn send_intervention(
    State(context): State<Arc<ApiContext>>,
    Json(request): Json<SendInterventionRequest>,
) -> Result<Json<SendInterventionResponse>, ApiError> {
    let session_id = required(request.session_id, "session_id")?;
    let zone_id = required(request.zone_id, "zone_id")?;
    let intervention_type =
        parse_intervention_type(&required(request.intervention_type, "intervention_type")?)?;
    let message = required(request.message, "message")?;

    let mut random = context.random.lock().map_err(|_| AppError::StateLock)?;
    let outcome = intervention::send_intervention(
        &context.store,
        &session_id,
        &zone_id,
        intervention_type,
        &message,
        random.as_mut(),
        SystemTime::now(),
    )?;
    drop(random);

    Ok(Json(SendInterventionResponse {
        intervention_id: outcome.record.id,
        delivery_status: outcome.delivery_status,
        students_reached: outcome.students_reached,
        estimated_effectiveness: outcome.record.effectiveness_score.unwrap_or_default(),
        student_responses: outcome.record.student_responses.unwrap_or(StudentResponses {
            delivered: 0,
            acknowledged: 0,
            positive_response: 0,
        }),
        timestamp: format_timestamp(outcome.record.sent_at),
    }))
}

#[derive(Debug, Deserialize)]
pub struct InterventionHistoryQuery {
    pub session_id: Option<String>,
}

pub async fn get_intervention_history(
    State(context): State<Arc<ApiContext>>,
    Query(query): Query<InterventionHistoryQuery>,
) -> Result<Json<InterventionHistoryResponse>, ApiError> {
    let session_id = required(query.session_id, "session_id")?;
    let records = intervention::intervention_history(&context.store, &session_id)?;

    Ok(Json(InterventionHistoryResponse {
        interventions: records.iter().map(Into::into).collect(),
        timestamp: format_timestamp(SystemTime::now()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TriggerBoosterRequest {
    pub session_id: Option<String>,
    pub booster_type: Option<String>,
}

pub async fn trigger_booster(
    State(context): State<Arc<ApiContext>>,
    Json(request): Json<TriggerBoosterRequest>,
) -> Result<Json<TriggerBoosterResponse>, ApiError> {
    let session_id = required(request.session_id, "session_id")?;
    let booster_name = required(request.booster_type, "booster_type")?;
    // Unknown names deliberately fall back to the quick poll template.
    let booster_type = BoosterType::parse_or_default(&booster_name);

    let mut random = context.random.lock().map_err(|_| AppError::StateLock)?;
    let outcome = booster::trigger_booster(
        &context.store,
        &session_id,
        booster_type,
        random.as_mut(),
        SystemTime::now(),
    )?;
    drop(random);

    Ok(Json(TriggerBoosterResponse::from_outcome(&outcome)))
}

#[derive(Debug, Deserialize)]
pub struct QuizResponseRequest {
    pub session_id: Option<String>,
    pub student_id: Option<String>,
    pub quiz_question: Option<String>,
    #[serde(default)]
    pub student_response: String,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub response_time_seconds: f64,
    pub confidence_level: Option<f64>,
}

pub async fn record_quiz_response(
    State(context): State<Arc<ApiContext>>,
    Json(request): Json<QuizResponseRequest>,
) -> Result<Json<QuizResponseResponse>, ApiError> {
    let session_id = required(request.session_id, "session_id")?;
    let student_id = required(request.student_id, "student_id")?;
    let quiz_question = required(request.quiz_question, "quiz_question")?;
    let now = SystemTime::now();

    let outcome = quiz::record_quiz_response(
        &context.store,
        &session_id,
        &student_id,
        &quiz_question,
        &request.student_response,
        &request.correct_answer,
        request.response_time_seconds,
        request.confidence_level,
        now,
    )?;

    Ok(Json(QuizResponseResponse {
        is_correct: outcome.response.is_correct,
        confidence_level: outcome.response.confidence_level,
        alerts_generated: outcome.alerts.len(),
        engagement_sample: (&outcome.synthetic_sample).into(),
        timestamp: format_timestamp(now),
    }))
}

pub async fn generate_summary(
    State(context): State<Arc<ApiContext>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummaryResponse>, ApiError> {
    let summary = summary::generate_summary(&context.store, &session_id, SystemTime::now())?;
    Ok(Json((&summary).into()))
}

fn required(value: Option<String>, field: &'static str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AppError::Validation(field)),
    }
}

fn parse_severity(value: &str) -> Result<AlertSeverity, AppError> {
    match value {
        "low" => Ok(AlertSeverity::Low),
        "medium" => Ok(AlertSeverity::Medium),
        "high" => Ok(AlertSeverity::High),
        "critical" => Ok(AlertSeverity::Critical),
        _ => Err(AppError::Validation("severity")),
    }
}

fn parse_intervention_type(value: &str) -> Result<InterventionType, AppError> {
    match value {
        "attention_boost" => Ok(InterventionType::AttentionBoost),
        "participation_prompt" => Ok(InterventionType::ParticipationPrompt),
        "confusion_help" => Ok(InterventionType::ConfusionHelp),
        "gamification" => Ok(InterventionType::Gamification),
        _ => Err(AppError::Validation("intervention_type")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank_values() {
        assert!(matches!(
            required(None, "session_id"),
            Err(AppError::Validation("session_id"))
        ));
        assert!(matches!(
            required(Some("   ".to_string()), "session_id"),
            Err(AppError::Validation("session_id"))
        ));
        assert_eq!(
            required(Some("abc".to_string()), "session_id").unwrap(),
            "abc"
        );
    }

    #[test]
    fn severity_parses_exact_names_only() {
        assert_eq!(parse_severity("critical").unwrap(), AlertSeverity::Critical);
        assert!(matches!(
            parse_severity("CRITICAL"),
            Err(AppError::Validation("severity"))
        ));
    }

    #[test]
    fn intervention_type_rejects_unknown_names() {
        assert_eq!(
            parse_intervention_type("confusion_help").unwrap(),
            InterventionType::ConfusionHelp
        );
        assert!(matches!(
            parse_intervention_type("pep_talk"),
            Err(AppError::Validation("intervention_type"))
        ));
    }
}
