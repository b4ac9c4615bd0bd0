use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

pub type SessionId = String;
pub type ZoneId = String;

/// Raw per-zone metrics as produced by the sampler boundary, before clamping.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawMetrics {
    pub attention_score: f64,
    pub participation_score: f64,
    pub confusion_level: f64,
    pub audio_sentiment: f64,
    pub noise_level: f64,
    pub face_presence_count: u32,
    pub hand_raise_count: u32,
    pub posture_engagement: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngagementSample {
    pub session_id: SessionId,
    pub zone_id: Option<ZoneId>,
    pub attention_score: f64,
    pub participation_score: f64,
    pub confusion_level: f64,
    pub audio_sentiment: f64,
    pub noise_level: f64,
    pub face_presence_count: u32,
    pub hand_raise_count: u32,
    pub posture_engagement: f64,
    pub timestamp: SystemTime,
}

impl EngagementSample {
    /// Builds a sample from raw metrics, clamping every score to its valid
    /// range. Samples are immutable once built.
    pub fn from_raw(
        session_id: SessionId,
        zone_id: Option<ZoneId>,
        metrics: RawMetrics,
        timestamp: SystemTime,
    ) -> Self {
        Self {
            session_id,
            zone_id,
            attention_score: clamp_unit(metrics.attention_score),
            participation_score: clamp_unit(metrics.participation_score),
            confusion_level: clamp_unit(metrics.confusion_level),
            audio_sentiment: metrics.audio_sentiment.clamp(-1.0, 1.0),
            noise_level: clamp_unit(metrics.noise_level),
            face_presence_count: metrics.face_presence_count,
            hand_raise_count: metrics.hand_raise_count,
            posture_engagement: clamp_unit(metrics.posture_engagement),
            timestamp,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    Good,
    Warning,
    Critical,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRecord {
    pub session_id: SessionId,
    pub zone_id: ZoneId,
    pub zone_name: String,
}

/// Derived per-zone view, recomputed on read from the latest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStatistics {
    pub zone_id: ZoneId,
    pub zone_name: String,
    pub status: ZoneStatus,
    pub attention_score: f64,
    pub participation_score: f64,
    pub confusion_level: f64,
    pub noise_level: f64,
    pub student_count: u32,
    pub hand_raises: u32,
    pub last_updated: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionMetrics {
    pub total_alerts: usize,
    pub critical_alerts: usize,
    pub high_alerts: usize,
    pub average_attention: f64,
    pub average_participation: f64,
    pub total_students: u32,
    pub active_zones: usize,
    pub problematic_zones: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Disengagement,
    ConfusionSpike,
    NoiseDisruption,
    LowParticipation,
    LowQuizPerformance,
    SlowQuizResponses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngagementAlert {
    pub id: Uuid,
    pub session_id: SessionId,
    pub zone_id: Option<ZoneId>,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub current_value: f64,
    pub threshold_value: f64,
    pub created_at: SystemTime,
    pub is_resolved: bool,
    pub resolved_at: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    AttentionBoost,
    ParticipationPrompt,
    ConfusionHelp,
    Gamification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentResponses {
    pub delivered: u32,
    pub acknowledged: u32,
    pub positive_response: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterventionRecord {
    pub id: Uuid,
    pub session_id: SessionId,
    pub zone_id: ZoneId,
    pub intervention_type: InterventionType,
    pub message: String,
    pub sent_at: SystemTime,
    pub effectiveness_score: Option<f64>,
    pub student_responses: Option<StudentResponses>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoosterType {
    AttentionGame,
    QuickPoll,
    TeamChallenge,
    KnowledgeRace,
}

impl BoosterType {
    /// Unknown booster names fall back to the quick poll template rather
    /// than erroring.
    pub fn parse_or_default(name: &str) -> Self {
        match name {
            "attention_game" => Self::AttentionGame,
            "quick_poll" => Self::QuickPoll,
            "team_challenge" => Self::TeamChallenge,
            "knowledge_race" => Self::KnowledgeRace,
            _ => Self::QuickPoll,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AttentionGame => "attention_game",
            Self::QuickPoll => "quick_poll",
            Self::TeamChallenge => "team_challenge",
            Self::KnowledgeRace => "knowledge_race",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    InProgress,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionQuestion {
    pub instruction: String,
    pub choices: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub category: String,
}

/// Activity-specific payload carried by a gamification record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PerformanceData {
    AttentionGame {
        game_type: String,
        difficulty: String,
        time_limit_seconds: u32,
        questions: Vec<AttentionQuestion>,
    },
    QuickPoll {
        question: String,
        options: Vec<String>,
        anonymous: bool,
    },
    TeamChallenge {
        team_size: u32,
        problem: String,
        hints: Vec<String>,
    },
    KnowledgeRace {
        questions_count: u32,
        time_per_question_seconds: u32,
        categories: Vec<String>,
        questions: Vec<RaceQuestion>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GamificationRecord {
    pub id: Uuid,
    pub session_id: SessionId,
    pub activity_type: BoosterType,
    pub points_earned: u32,
    pub completion_status: CompletionStatus,
    pub performance_data: PerformanceData,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostPrediction {
    pub activity_type: BoosterType,
    pub expected_engagement_boost: f64,
    pub duration_minutes: u32,
    pub participation_prediction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveInsight {
    pub id: Uuid,
    pub session_id: SessionId,
    pub insight_type: &'static str,
    pub prediction: BoostPrediction,
    pub confidence_score: f64,
    pub recommended_action: String,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizResponse {
    pub session_id: SessionId,
    pub student_id: String,
    pub quiz_question: String,
    pub student_response: String,
    pub correct_answer: String,
    pub response_time_seconds: f64,
    pub is_correct: bool,
    pub confidence_level: f64,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineSlice {
    pub offset_seconds: u64,
    pub attention_score: f64,
    pub participation_score: f64,
    pub confusion_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryData {
    Timeline { slices: Vec<TimelineSlice> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: Uuid,
    pub session_id: SessionId,
    pub total_students: u32,
    pub average_attention: f64,
    pub average_participation: f64,
    pub confusion_incidents: usize,
    pub intervention_count: usize,
    pub quiz_completion_rate: f64,
    pub overall_engagement_score: f64,
    pub summary_data: SummaryData,
    pub generated_at: SystemTime,
}
