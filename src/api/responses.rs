use crate::booster::BoosterOutcome;
use crate::domain::{
    AlertSeverity, AlertType, BoostPrediction, BoosterType, CompletionStatus, EngagementAlert,
    EngagementSample, InterventionRecord, InterventionType, PerformanceData, SessionMetrics,
    SessionSummary, StudentResponses, SummaryData, ZoneStatistics, ZoneStatus,
};
use crate::intervention::DeliveryStatus;
use serde::Serialize;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    ValidationError,
    NotFound,
    NoData,
    InternalError,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorResponse {
    pub error_code: ApiErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

pub fn format_timestamp(timestamp: SystemTime) -> String {
    OffsetDateTime::from(timestamp)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SampleBody {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    pub attention_score: f64,
    pub participation_score: f64,
    pub confusion_level: f64,
    pub audio_sentiment: f64,
    pub noise_level: f64,
    pub face_presence_count: u32,
    pub hand_raise_count: u32,
    pub posture_engagement: f64,
    pub timestamp: String,
}

impl From<&EngagementSample> for SampleBody {
    fn from(sample: &EngagementSample) -> Self {
        Self {
            session_id: sample.session_id.clone(),
            zone_id: sample.zone_id.clone(),
            attention_score: sample.attention_score,
            participation_score: sample.participation_score,
            confusion_level: sample.confusion_level,
            audio_sentiment: sample.audio_sentiment,
            noise_level: sample.noise_level,
            face_presence_count: sample.face_presence_count,
            hand_raise_count: sample.hand_raise_count,
            posture_engagement: sample.posture_engagement,
            timestamp: format_timestamp(sample.timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AlertBody {
    pub id: Uuid,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub created_at: String,
    pub is_resolved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
}

impl From<&EngagementAlert> for AlertBody {
    fn from(alert: &EngagementAlert) -> Self {
        Self {
            id: alert.id,
            session_id: alert.session_id.clone(),
            zone_id: alert.zone_id.clone(),
            alert_type: alert.alert_type,
            severity: alert.severity,
            message: alert.message.clone(),
            current_value: alert.current_value,
            threshold_value: alert.threshold_value,
            created_at: format_timestamp(alert.created_at),
            is_resolved: alert.is_resolved,
            resolved_at: alert.resolved_at.map(format_timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RecordSampleResponse {
    pub engagement_data: SampleBody,
    pub alerts: Vec<AlertBody>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ZoneStatisticsBody {
    pub zone_id: String,
    pub zone_name: String,
    pub status: ZoneStatus,
    pub attention_score: f64,
    pub participation_score: f64,
    pub confusion_level: f64,
    pub noise_level: f64,
    pub student_count: u32,
    pub hand_raises: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl From<&ZoneStatistics> for ZoneStatisticsBody {
    fn from(stats: &ZoneStatistics) -> Self {
        Self {
            zone_id: stats.zone_id.clone(),
            zone_name: stats.zone_name.clone(),
            status: stats.status,
            attention_score: stats.attention_score,
            participation_score: stats.participation_score,
            confusion_level: stats.confusion_level,
            noise_level: stats.noise_level,
            student_count: stats.student_count,
            hand_raises: stats.hand_raises,
            last_updated: stats.last_updated.map(format_timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OverallMetricsBody {
    pub total_alerts: usize,
    pub critical_alerts: usize,
    pub high_alerts: usize,
    pub average_attention: f64,
    pub average_participation: f64,
    pub total_students: u32,
    pub active_zones: usize,
    pub problematic_zones: usize,
}

impl From<&SessionMetrics> for OverallMetricsBody {
    fn from(metrics: &SessionMetrics) -> Self {
        Self {
            total_alerts: metrics.total_alerts,
            critical_alerts: metrics.critical_alerts,
            high_alerts: metrics.high_alerts,
            average_attention: metrics.average_attention,
            average_participation: metrics.average_participation,
            total_students: metrics.total_students,
            active_zones: metrics.active_zones,
            problematic_zones: metrics.problematic_zones,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AlertsResponse {
    pub alerts: Vec<AlertBody>,
    pub zone_statistics: Vec<ZoneStatisticsBody>,
    pub overall_metrics: OverallMetricsBody,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ResolveAlertResponse {
    pub alert: AlertBody,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InterventionBody {
    pub id: Uuid,
    pub session_id: String,
    pub zone_id: String,
    pub intervention_type: InterventionType,
    pub message: String,
    pub sent_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effectiveness_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_responses: Option<StudentResponses>,
}

impl From<&InterventionRecord> for InterventionBody {
    fn from(record: &InterventionRecord) -> Self {
        Self {
            id: record.id,
            session_id: record.session_id.clone(),
            zone_id: record.zone_id.clone(),
            intervention_type: record.intervention_type,
            message: record.message.clone(),
            sent_at: format_timestamp(record.sent_at),
            effectiveness_score: record.effectiveness_score,
            student_responses: record.student_responses,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SendInterventionResponse {
    pub intervention_id: Uuid,
    pub delivery_status: DeliveryStatus,
    pub students_reached: u32,
    pub estimated_effectiveness: f64,
    pub student_responses: StudentResponses,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InterventionHistoryResponse {
    pub interventions: Vec<InterventionBody>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ActivityDetailsBody {
    pub name: &'static str,
    pub description: &'static str,
    pub base_points: u32,
    pub duration_minutes: u32,
    pub expected_boost: f64,
    pub performance_data: PerformanceData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InsightBody {
    pub prediction: BoostPrediction,
    pub confidence_score: f64,
    pub recommended_action: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TriggerBoosterResponse {
    pub activity_id: Uuid,
    pub activity_type: BoosterType,
    pub completion_status: CompletionStatus,
    pub activity_details: ActivityDetailsBody,
    pub total_students: u32,
    pub students_engaged: u32,
    pub insight: InsightBody,
    pub timestamp: String,
}

impl TriggerBoosterResponse {
    pub fn from_outcome(outcome: &BoosterOutcome) -> Self {
        Self {
            activity_id: outcome.record.id,
            activity_type: outcome.record.activity_type,
            completion_status: outcome.record.completion_status,
            activity_details: ActivityDetailsBody {
                name: outcome.activity.name,
                description: outcome.activity.description,
                base_points: outcome.activity.base_points,
                duration_minutes: outcome.activity.duration_minutes,
                expected_boost: outcome.activity.expected_boost,
                performance_data: outcome.activity.performance_data.clone(),
            },
            total_students: outcome.total_students,
            students_engaged: outcome.students_engaged,
            insight: InsightBody {
                prediction: outcome.insight.prediction.clone(),
                confidence_score: outcome.insight.confidence_score,
                recommended_action: outcome.insight.recommended_action.clone(),
            },
            timestamp: format_timestamp(outcome.record.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct QuizResponseResponse {
    pub is_correct: bool,
    pub confidence_level: f64,
    pub alerts_generated: usize,
    pub engagement_sample: SampleBody,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionSummaryResponse {
    pub summary_id: Uuid,
    pub session_id: String,
    pub total_students: u32,
    pub average_attention: f64,
    pub average_participation: f64,
    pub confusion_incidents: usize,
    pub intervention_count: usize,
    pub quiz_completion_rate: f64,
    pub overall_engagement_score: f64,
    pub summary_data: SummaryData,
    pub timestamp: String,
}

impl From<&SessionSummary> for SessionSummaryResponse {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            summary_id: summary.id,
            session_id: summary.session_id.clone(),
            total_students: summary.total_students,
            average_attention: summary.average_attention,
            average_participation: summary.average_participation,
            confusion_incidents: summary.confusion_incidents,
            intervention_count: summary.intervention_count,
            quiz_completion_rate: summary.quiz_completion_rate,
            overall_engagement_score: summary.overall_engagement_score,
            summary_data: summary.summary_data.clone(),
            timestamp: format_timestamp(summary.generated_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RegisterZoneResponse {
    pub session_id: String,
    pub zone_id: String,
    pub zone_name: String,
    pub timestamp: String,
}
