//! Session-level rollup persisted at export time.
//!
//! Generation is deliberately not idempotent: each call appends a new
//! summary row.

use crate::domain::{SessionSummary, SummaryData, TimelineSlice};
use crate::error::AppError;
use crate::store::{SharedStore, write_store};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use uuid::Uuid;

const CONFUSION_INCIDENT_THRESHOLD: f64 = 0.6;

/// Folds all samples, alerts and quiz responses for the session into one
/// summary row. Fails with `NoData` when the session has no samples.
pub fn generate_summary(
    store: &SharedStore,
    session_id: &str,
    now: SystemTime,
) -> Result<SessionSummary, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id"));
    }

    let mut guard = write_store(store)?;
    let mut samples = guard.samples_for_session(session_id);
    if samples.is_empty() {
        return Err(AppError::NoData);
    }
    samples.sort_by_key(|s| s.timestamp);

    let count = samples.len() as f64;
    let average_attention =
        round2(samples.iter().map(|s| s.attention_score).sum::<f64>() / count);
    let average_participation =
        round2(samples.iter().map(|s| s.participation_score).sum::<f64>() / count);

    let confusion_incidents = samples
        .iter()
        .filter(|s| s.confusion_level > CONFUSION_INCIDENT_THRESHOLD)
        .count();

    // Resolved and unresolved alike, per the export contract.
    let intervention_count = guard.alerts_for_session(session_id).len();

    let quiz_responses = guard.quiz_responses_for_session(session_id);
    let quiz_completion_rate = if quiz_responses.is_empty() {
        0.0
    } else {
        quiz_responses
            .iter()
            .filter(|r| !r.student_response.trim().is_empty())
            .count() as f64
            / quiz_responses.len() as f64
    };

    let session_start = samples
        .first()
        .map(|s| s.timestamp)
        .unwrap_or(UNIX_EPOCH);
    let slices = samples
        .iter()
        .map(|s| TimelineSlice {
            offset_seconds: s
                .timestamp
                .duration_since(session_start)
                .unwrap_or_default()
                .as_secs(),
            attention_score: s.attention_score,
            participation_score: s.participation_score,
            confusion_level: s.confusion_level,
        })
        .collect();

    let summary = SessionSummary {
        id: Uuid::new_v4(),
        session_id: session_id.to_string(),
        total_students: samples
            .iter()
            .map(|s| s.face_presence_count)
            .max()
            .unwrap_or(0),
        average_attention,
        average_participation,
        confusion_incidents,
        intervention_count,
        quiz_completion_rate,
        overall_engagement_score: round2((average_attention + average_participation) / 2.0),
        summary_data: SummaryData::Timeline { slices },
        generated_at: now,
    };

    guard.insert_summary(summary.clone());
    drop(guard);

    info!(
        session_id = session_id,
        samples = samples.len(),
        overall = summary.overall_engagement_score,
        "Session summary generated"
    );

    Ok(summary)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts;
    use crate::domain::RawMetrics;
    use crate::quiz;
    use crate::store::{self, read_store};
    use std::time::Duration;

    fn metrics(attention: f64, participation: f64, confusion: f64) -> RawMetrics {
        RawMetrics {
            attention_score: attention,
            participation_score: participation,
            confusion_level: confusion,
            audio_sentiment: 0.0,
            noise_level: 0.2,
            face_presence_count: 14,
            hand_raise_count: 1,
            posture_engagement: 0.6,
        }
    }

    #[test]
    fn empty_session_is_a_no_data_error() {
        let store = store::shared();
        let result = generate_summary(&store, "session-1", UNIX_EPOCH);
        assert!(matches!(result, Err(AppError::NoData)));
    }

    #[test]
    fn single_sample_average_equals_that_sample() -> Result<(), AppError> {
        let store = store::shared();
        alerts::record_sample(&store, "session-1", None, metrics(0.73, 0.6, 0.2), UNIX_EPOCH)?;

        let summary = generate_summary(&store, "session-1", UNIX_EPOCH)?;

        assert_eq!(summary.average_attention, 0.73);
        assert_eq!(summary.total_students, 14);
        assert_eq!(summary.confusion_incidents, 0);
        Ok(())
    }

    #[test]
    fn averages_and_overall_score_round_to_two_decimals() -> Result<(), AppError> {
        let store = store::shared();
        let scores = [0.2, 0.9, 0.5, 0.8];
        for (i, attention) in scores.iter().enumerate() {
            alerts::record_sample(
                &store,
                "session-1",
                None,
                metrics(*attention, 0.333, 0.7),
                UNIX_EPOCH + Duration::from_secs(i as u64),
            )?;
        }

        let summary = generate_summary(&store, "session-1", UNIX_EPOCH)?;

        assert_eq!(summary.average_attention, 0.6);
        assert_eq!(summary.average_participation, 0.33);
        assert_eq!(summary.overall_engagement_score, 0.47);
        assert_eq!(summary.confusion_incidents, 4);
        Ok(())
    }

    #[test]
    fn intervention_count_includes_resolved_alerts() -> Result<(), AppError> {
        let store = store::shared();
        let outcome =
            alerts::record_sample(&store, "session-1", None, metrics(0.2, 0.2, 0.1), UNIX_EPOCH)?;
        assert_eq!(outcome.alerts.len(), 1);
        alerts::resolve_alert(&store, outcome.alerts[0].id, UNIX_EPOCH)?;

        let summary = generate_summary(&store, "session-1", UNIX_EPOCH)?;
        assert_eq!(summary.intervention_count, 1);
        Ok(())
    }

    #[test]
    fn quiz_completion_rate_counts_non_empty_responses() -> Result<(), AppError> {
        let store = store::shared();
        alerts::record_sample(&store, "session-1", None, metrics(0.8, 0.8, 0.1), UNIX_EPOCH)?;
        quiz::record_quiz_response(
            &store, "session-1", "s1", "Q?", "answer", "answer", 10.0, None, UNIX_EPOCH,
        )?;
        quiz::record_quiz_response(
            &store, "session-1", "s2", "Q?", "", "answer", 10.0, None, UNIX_EPOCH,
        )?;

        let summary = generate_summary(&store, "session-1", UNIX_EPOCH)?;
        assert_eq!(summary.quiz_completion_rate, 0.5);
        Ok(())
    }

    #[test]
    fn timeline_slices_follow_sample_order() -> Result<(), AppError> {
        let store = store::shared();
        // Inserted out of order; the timeline must sort by timestamp.
        alerts::record_sample(
            &store,
            "session-1",
            None,
            metrics(0.9, 0.9, 0.1),
            UNIX_EPOCH + Duration::from_secs(60),
        )?;
        alerts::record_sample(&store, "session-1", None, metrics(0.5, 0.5, 0.1), UNIX_EPOCH)?;

        let summary = generate_summary(&store, "session-1", UNIX_EPOCH)?;
        let SummaryData::Timeline { slices } = summary.summary_data;
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].offset_seconds, 0);
        assert_eq!(slices[0].attention_score, 0.5);
        assert_eq!(slices[1].offset_seconds, 60);
        Ok(())
    }

    #[test]
    fn generation_is_not_idempotent() -> Result<(), AppError> {
        let store = store::shared();
        alerts::record_sample(&store, "session-1", None, metrics(0.8, 0.8, 0.1), UNIX_EPOCH)?;

        generate_summary(&store, "session-1", UNIX_EPOCH)?;
        generate_summary(&store, "session-1", UNIX_EPOCH)?;

        let guard = read_store(&store)?;
        assert_eq!(guard.summaries_for_session("session-1").len(), 2);
        Ok(())
    }
}
