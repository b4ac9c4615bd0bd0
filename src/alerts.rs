//! Threshold rules over incoming samples and the alert lifecycle.
//!
//! Repeated violations intentionally create repeated alert rows; there is
//! no deduplication against open alerts, and alerts never auto-resolve.

use crate::domain::{
    AlertSeverity, AlertType, EngagementAlert, EngagementSample, RawMetrics, SessionMetrics,
    ZoneStatistics,
};
use crate::error::AppError;
use crate::scoring;
use crate::store::{SharedStore, read_store, write_store};
use std::time::SystemTime;
use tracing::info;
use uuid::Uuid;

#[derive(Debug)]
pub struct SampleOutcome {
    pub sample: EngagementSample,
    pub alerts: Vec<EngagementAlert>,
}

#[derive(Debug)]
pub struct AlertsView {
    pub alerts: Vec<EngagementAlert>,
    pub zone_statistics: Vec<ZoneStatistics>,
    pub overall_metrics: SessionMetrics,
}

/// Stores one sample (clamped) and appends every alert its metrics fire.
/// The insert and the alert generation happen under one write lock.
pub fn record_sample(
    store: &SharedStore,
    session_id: &str,
    zone_id: Option<&str>,
    metrics: RawMetrics,
    now: SystemTime,
) -> Result<SampleOutcome, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id"));
    }

    let sample = EngagementSample::from_raw(
        session_id.to_string(),
        zone_id.map(str::to_string),
        metrics,
        now,
    );
    let alerts = evaluate_sample(&sample, now);

    let mut guard = write_store(store)?;
    guard.insert_sample(sample.clone());
    guard.insert_alerts(alerts.clone());
    drop(guard);

    if !alerts.is_empty() {
        info!(
            session_id = session_id,
            zone_id = zone_id.unwrap_or("-"),
            count = alerts.len(),
            "Engagement alerts raised"
        );
    }

    Ok(SampleOutcome { sample, alerts })
}

/// Evaluates the four threshold rules independently; one sample may fire
/// several alerts.
pub fn evaluate_sample(sample: &EngagementSample, now: SystemTime) -> Vec<EngagementAlert> {
    let mut alerts = Vec::new();
    let zone_label = sample.zone_id.as_deref();

    if sample.attention_score < 0.5 && sample.participation_score < 0.4 {
        alerts.push(build_alert(
            sample,
            AlertType::Disengagement,
            if sample.attention_score < 0.3 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::High
            },
            format!(
                "{} showing low engagement levels",
                zone_label.unwrap_or("Classroom")
            ),
            (sample.attention_score + sample.participation_score) / 2.0,
            0.5,
            now,
        ));
    }

    if sample.confusion_level > 0.6 {
        alerts.push(build_alert(
            sample,
            AlertType::ConfusionSpike,
            if sample.confusion_level > 0.8 {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            },
            format!(
                "Elevated confusion levels detected in {}",
                zone_label.unwrap_or("classroom")
            ),
            sample.confusion_level,
            0.6,
            now,
        ));
    }

    if sample.noise_level > 0.7 {
        alerts.push(build_alert(
            sample,
            AlertType::NoiseDisruption,
            if sample.noise_level > 0.9 {
                AlertSeverity::High
            } else {
                AlertSeverity::Medium
            },
            format!(
                "Disruptive noise levels in {}",
                zone_label.unwrap_or("classroom")
            ),
            sample.noise_level,
            0.7,
            now,
        ));
    }

    if sample.participation_score < 0.3 && sample.hand_raise_count == 0 {
        alerts.push(build_alert(
            sample,
            AlertType::LowParticipation,
            AlertSeverity::Medium,
            format!(
                "Very low participation in {}",
                zone_label.unwrap_or("classroom")
            ),
            sample.participation_score,
            0.3,
            now,
        ));
    }

    alerts
}

fn build_alert(
    sample: &EngagementSample,
    alert_type: AlertType,
    severity: AlertSeverity,
    message: String,
    current_value: f64,
    threshold_value: f64,
    now: SystemTime,
) -> EngagementAlert {
    EngagementAlert {
        id: Uuid::new_v4(),
        session_id: sample.session_id.clone(),
        zone_id: sample.zone_id.clone(),
        alert_type,
        severity,
        message,
        current_value,
        threshold_value,
        created_at: now,
        is_resolved: false,
        resolved_at: None,
    }
}

/// Query contract: alerts newest first, filtered by resolution state and
/// optionally by exact severity, plus the per-zone statistics and the
/// session rollup.
pub fn get_alerts(
    store: &SharedStore,
    session_id: &str,
    include_resolved: bool,
    severity: Option<AlertSeverity>,
) -> Result<AlertsView, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id"));
    }

    let guard = read_store(store)?;
    let mut alerts = guard.alerts_for_session(session_id);
    let samples = guard.samples_for_session(session_id);
    let zones = guard.zones_for_session(session_id);
    drop(guard);

    if !include_resolved {
        alerts.retain(|a| !a.is_resolved);
    }
    if let Some(severity) = severity {
        alerts.retain(|a| a.severity == severity);
    }
    alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let zone_statistics = scoring::zone_statistics(&zones, &samples);
    let overall_metrics = scoring::session_metrics(&samples, &zone_statistics, &alerts);

    Ok(AlertsView {
        alerts,
        zone_statistics,
        overall_metrics,
    })
}

/// Sole transition to `is_resolved = true`. Idempotent on repeat calls.
pub fn resolve_alert(
    store: &SharedStore,
    alert_id: Uuid,
    now: SystemTime,
) -> Result<EngagementAlert, AppError> {
    let mut guard = write_store(store)?;
    guard.resolve_alert(alert_id, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store;
    use std::time::{Duration, UNIX_EPOCH};

    fn metrics(attention: f64, participation: f64) -> RawMetrics {
        RawMetrics {
            attention_score: attention,
            participation_score: participation,
            confusion_level: 0.1,
            audio_sentiment: 0.0,
            noise_level: 0.2,
            face_presence_count: 12,
            hand_raise_count: 2,
            posture_engagement: 0.6,
        }
    }

    fn sample_with(metrics: RawMetrics) -> EngagementSample {
        EngagementSample::from_raw("session-1".to_string(), None, metrics, UNIX_EPOCH)
    }

    #[test]
    fn disengagement_severity_depends_on_attention() {
        let critical = evaluate_sample(&sample_with(metrics(0.25, 0.3)), UNIX_EPOCH);
        assert_eq!(critical[0].alert_type, AlertType::Disengagement);
        assert_eq!(critical[0].severity, AlertSeverity::Critical);

        let high = evaluate_sample(&sample_with(metrics(0.45, 0.3)), UNIX_EPOCH);
        assert_eq!(high[0].severity, AlertSeverity::High);
        assert!((high[0].current_value - 0.375).abs() < 1e-12);
        assert_eq!(high[0].threshold_value, 0.5);
    }

    #[test]
    fn one_sample_can_fire_multiple_alerts() {
        let raw = RawMetrics {
            attention_score: 0.2,
            participation_score: 0.2,
            confusion_level: 0.9,
            audio_sentiment: -0.5,
            noise_level: 0.95,
            face_presence_count: 8,
            hand_raise_count: 0,
            posture_engagement: 0.3,
        };

        let alerts = evaluate_sample(&sample_with(raw), UNIX_EPOCH);

        let types: Vec<AlertType> = alerts.iter().map(|a| a.alert_type).collect();
        assert_eq!(
            types,
            vec![
                AlertType::Disengagement,
                AlertType::ConfusionSpike,
                AlertType::NoiseDisruption,
                AlertType::LowParticipation,
            ]
        );
        assert_eq!(alerts[1].severity, AlertSeverity::High);
        assert_eq!(alerts[2].severity, AlertSeverity::High);
        assert_eq!(alerts[3].severity, AlertSeverity::Medium);
    }

    #[test]
    fn session_wide_sample_uses_classroom_in_message() {
        let alerts = evaluate_sample(&sample_with(metrics(0.2, 0.2)), UNIX_EPOCH);
        assert_eq!(alerts[0].message, "Classroom showing low engagement levels");
    }

    #[test]
    fn healthy_sample_fires_nothing() {
        let alerts = evaluate_sample(&sample_with(metrics(0.8, 0.8)), UNIX_EPOCH);
        assert!(alerts.is_empty());
    }

    #[test]
    fn repeated_violations_are_not_deduplicated() -> Result<(), AppError> {
        let store = store::shared();
        record_sample(&store, "session-1", Some("zone-a"), metrics(0.2, 0.2), UNIX_EPOCH)?;
        record_sample(
            &store,
            "session-1",
            Some("zone-a"),
            metrics(0.2, 0.2),
            UNIX_EPOCH + Duration::from_secs(5),
        )?;

        let view = get_alerts(&store, "session-1", false, None)?;
        assert_eq!(view.alerts.len(), 2);
        Ok(())
    }

    #[test]
    fn record_sample_requires_session_id() {
        let store = store::shared();
        let result = record_sample(&store, "  ", None, metrics(0.5, 0.5), UNIX_EPOCH);
        assert!(matches!(result, Err(AppError::Validation("session_id"))));
    }

    #[test]
    fn unresolved_filter_hides_resolved_alerts() -> Result<(), AppError> {
        let store = store::shared();
        let outcome =
            record_sample(&store, "session-1", None, metrics(0.2, 0.2), UNIX_EPOCH)?;
        resolve_alert(&store, outcome.alerts[0].id, UNIX_EPOCH + Duration::from_secs(1))?;

        let open = get_alerts(&store, "session-1", false, None)?;
        assert!(open.alerts.is_empty());

        let all = get_alerts(&store, "session-1", true, None)?;
        assert_eq!(all.alerts.len(), 1);
        assert!(all.alerts[0].is_resolved);
        Ok(())
    }

    #[test]
    fn severity_filter_matches_exactly() -> Result<(), AppError> {
        let store = store::shared();
        // Critical disengagement plus medium low_participation.
        let raw = RawMetrics {
            hand_raise_count: 0,
            ..metrics(0.2, 0.2)
        };
        record_sample(&store, "session-1", None, raw, UNIX_EPOCH)?;

        let view = get_alerts(&store, "session-1", false, Some(AlertSeverity::Medium))?;
        assert_eq!(view.alerts.len(), 1);
        assert_eq!(view.alerts[0].alert_type, AlertType::LowParticipation);
        Ok(())
    }

    #[test]
    fn alerts_are_returned_newest_first() -> Result<(), AppError> {
        let store = store::shared();
        record_sample(&store, "session-1", Some("zone-a"), metrics(0.2, 0.2), UNIX_EPOCH)?;
        record_sample(
            &store,
            "session-1",
            Some("zone-b"),
            metrics(0.2, 0.2),
            UNIX_EPOCH + Duration::from_secs(30),
        )?;

        let view = get_alerts(&store, "session-1", false, None)?;
        assert_eq!(view.alerts[0].zone_id.as_deref(), Some("zone-b"));
        assert_eq!(view.alerts[1].zone_id.as_deref(), Some("zone-a"));
        Ok(())
    }
}
