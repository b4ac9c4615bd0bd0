//! Zone health classification and session-wide rollups, recomputed on read
//! from the stored samples.

use crate::domain::{
    EngagementAlert, EngagementSample, SessionMetrics, ZoneRecord, ZoneStatistics, ZoneStatus,
    AlertSeverity,
};

/// Classifies the latest sample of a zone. Rules are checked in precedence
/// order; the first match wins.
pub fn classify(sample: &EngagementSample) -> ZoneStatus {
    if sample.attention_score < 0.4 || sample.participation_score < 0.3 {
        ZoneStatus::Critical
    } else if sample.attention_score < 0.6 || sample.confusion_level > 0.5 {
        ZoneStatus::Warning
    } else {
        ZoneStatus::Good
    }
}

/// One statistics row per known zone. Zones without samples report
/// `no_data` with zeroed scores. The latest sample is chosen by timestamp,
/// not arrival order.
pub fn zone_statistics(
    zones: &[ZoneRecord],
    samples: &[EngagementSample],
) -> Vec<ZoneStatistics> {
    zones
        .iter()
        .map(|zone| {
            let latest = samples
                .iter()
                .filter(|s| s.zone_id.as_deref() == Some(zone.zone_id.as_str()))
                .max_by_key(|s| s.timestamp);

            match latest {
                Some(sample) => ZoneStatistics {
                    zone_id: zone.zone_id.clone(),
                    zone_name: zone.zone_name.clone(),
                    status: classify(sample),
                    attention_score: sample.attention_score,
                    participation_score: sample.participation_score,
                    confusion_level: sample.confusion_level,
                    noise_level: sample.noise_level,
                    student_count: sample.face_presence_count,
                    hand_raises: sample.hand_raise_count,
                    last_updated: Some(sample.timestamp),
                },
                None => ZoneStatistics {
                    zone_id: zone.zone_id.clone(),
                    zone_name: zone.zone_name.clone(),
                    status: ZoneStatus::NoData,
                    attention_score: 0.0,
                    participation_score: 0.0,
                    confusion_level: 0.0,
                    noise_level: 0.0,
                    student_count: 0,
                    hand_raises: 0,
                    last_updated: None,
                },
            }
        })
        .collect()
}

/// Session-wide rollup across all samples. With zero samples the averages
/// are 0, never NaN.
pub fn session_metrics(
    samples: &[EngagementSample],
    zone_stats: &[ZoneStatistics],
    alerts: &[EngagementAlert],
) -> SessionMetrics {
    let count = samples.len();
    let (average_attention, average_participation) = if count == 0 {
        (0.0, 0.0)
    } else {
        let attention: f64 = samples.iter().map(|s| s.attention_score).sum();
        let participation: f64 = samples.iter().map(|s| s.participation_score).sum();
        (attention / count as f64, participation / count as f64)
    };

    SessionMetrics {
        total_alerts: alerts.len(),
        critical_alerts: alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count(),
        high_alerts: alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::High)
            .count(),
        average_attention,
        average_participation,
        total_students: samples
            .iter()
            .map(|s| s.face_presence_count)
            .max()
            .unwrap_or(0),
        active_zones: zone_stats
            .iter()
            .filter(|z| z.status != ZoneStatus::NoData)
            .count(),
        problematic_zones: zone_stats
            .iter()
            .filter(|z| matches!(z.status, ZoneStatus::Warning | ZoneStatus::Critical))
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawMetrics;
    use std::time::{Duration, UNIX_EPOCH};

    fn sample(zone: Option<&str>, attention: f64, participation: f64, confusion: f64) -> EngagementSample {
        sample_at(zone, attention, participation, confusion, 0)
    }

    fn sample_at(
        zone: Option<&str>,
        attention: f64,
        participation: f64,
        confusion: f64,
        offset_secs: u64,
    ) -> EngagementSample {
        EngagementSample::from_raw(
            "session-1".to_string(),
            zone.map(str::to_string),
            RawMetrics {
                attention_score: attention,
                participation_score: participation,
                confusion_level: confusion,
                audio_sentiment: 0.0,
                noise_level: 0.2,
                face_presence_count: 10,
                hand_raise_count: 1,
                posture_engagement: 0.6,
            },
            UNIX_EPOCH + Duration::from_secs(offset_secs),
        )
    }

    fn zone(id: &str, name: &str) -> ZoneRecord {
        ZoneRecord {
            session_id: "session-1".to_string(),
            zone_id: id.to_string(),
            zone_name: name.to_string(),
        }
    }

    #[test]
    fn critical_takes_precedence_over_warning() {
        // attention 0.2 also matches the warning rule; critical must win.
        let sample = sample(Some("zone-a"), 0.2, 0.9, 0.0);
        assert_eq!(classify(&sample), ZoneStatus::Critical);
    }

    #[test]
    fn high_confusion_alone_is_warning() {
        let sample = sample(Some("zone-a"), 0.8, 0.7, 0.6);
        assert_eq!(classify(&sample), ZoneStatus::Warning);
    }

    #[test]
    fn healthy_sample_is_good() {
        let sample = sample(Some("zone-a"), 0.8, 0.7, 0.2);
        assert_eq!(classify(&sample), ZoneStatus::Good);
    }

    #[test]
    fn zone_without_samples_reports_no_data() {
        let zones = vec![zone("zone-a", "Front"), zone("zone-b", "Back")];
        let samples = vec![sample(Some("zone-a"), 0.8, 0.7, 0.2)];

        let stats = zone_statistics(&zones, &samples);

        assert_eq!(stats[0].status, ZoneStatus::Good);
        assert_eq!(stats[1].status, ZoneStatus::NoData);
        assert_eq!(stats[1].attention_score, 0.0);
        assert_eq!(stats[1].student_count, 0);
        assert!(stats[1].last_updated.is_none());
    }

    #[test]
    fn latest_sample_wins_by_timestamp_not_arrival_order() {
        let zones = vec![zone("zone-a", "Front")];
        // The later timestamp is inserted first.
        let samples = vec![
            sample_at(Some("zone-a"), 0.9, 0.9, 0.1, 100),
            sample_at(Some("zone-a"), 0.1, 0.1, 0.9, 50),
        ];

        let stats = zone_statistics(&zones, &samples);

        assert_eq!(stats[0].attention_score, 0.9);
        assert_eq!(stats[0].status, ZoneStatus::Good);
    }

    #[test]
    fn metrics_average_across_all_samples() {
        let zones = vec![zone("zone-a", "Front"), zone("zone-b", "Back")];
        let samples = vec![
            sample(Some("zone-a"), 0.2, 0.2, 0.1),
            sample(Some("zone-a"), 0.9, 0.9, 0.1),
            sample(Some("zone-b"), 0.5, 0.9, 0.1),
            sample(Some("zone-b"), 0.8, 0.9, 0.1),
        ];
        let stats = zone_statistics(&zones, &samples);

        let metrics = session_metrics(&samples, &stats, &[]);

        assert!((metrics.average_attention - 0.6).abs() < 1e-12);
        assert_eq!(metrics.total_students, 10);
        assert_eq!(metrics.active_zones, 2);
    }

    #[test]
    fn metrics_with_no_samples_are_zero() {
        let metrics = session_metrics(&[], &[], &[]);
        assert_eq!(metrics.average_attention, 0.0);
        assert_eq!(metrics.average_participation, 0.0);
        assert_eq!(metrics.total_students, 0);
    }
}
