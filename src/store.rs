use crate::domain::{
    EngagementAlert, EngagementSample, GamificationRecord, InterventionRecord, PredictiveInsight,
    QuizResponse, SessionSummary, StudentResponses, ZoneRecord,
};
use crate::error::AppError;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use uuid::Uuid;

pub type SharedStore = Arc<RwLock<SessionStore>>;

pub fn shared() -> SharedStore {
    Arc::new(RwLock::new(SessionStore::new()))
}

/// In-memory persistence for all engagement entities. Every core operation
/// runs against this store under a single read or write lock, which makes
/// each operation atomic with respect to the others.
#[derive(Debug, Default)]
pub struct SessionStore {
    zones: Vec<ZoneRecord>,
    samples: Vec<EngagementSample>,
    alerts: Vec<EngagementAlert>,
    interventions: Vec<InterventionRecord>,
    gamification: Vec<GamificationRecord>,
    insights: Vec<PredictiveInsight>,
    quiz_responses: Vec<QuizResponse>,
    summaries: Vec<SessionSummary>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_zone(&mut self, zone: ZoneRecord) {
        // Re-registering the same zone id replaces the name.
        if let Some(existing) = self
            .zones
            .iter_mut()
            .find(|z| z.session_id == zone.session_id && z.zone_id == zone.zone_id)
        {
            existing.zone_name = zone.zone_name;
        } else {
            self.zones.push(zone);
        }
    }

    pub fn zones_for_session(&self, session_id: &str) -> Vec<ZoneRecord> {
        self.zones
            .iter()
            .filter(|z| z.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn insert_sample(&mut self, sample: EngagementSample) {
        self.samples.push(sample);
    }

    pub fn samples_for_session(&self, session_id: &str) -> Vec<EngagementSample> {
        self.samples
            .iter()
            .filter(|s| s.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn insert_alerts(&mut self, alerts: Vec<EngagementAlert>) {
        self.alerts.extend(alerts);
    }

    pub fn alerts_for_session(&self, session_id: &str) -> Vec<EngagementAlert> {
        self.alerts
            .iter()
            .filter(|a| a.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Marks an alert resolved, stamping `resolved_at` on the first call.
    /// Resolving an already-resolved alert is a no-op and returns the alert
    /// unchanged.
    pub fn resolve_alert(
        &mut self,
        alert_id: Uuid,
        now: SystemTime,
    ) -> Result<EngagementAlert, AppError> {
        let alert = self
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or(AppError::NotFound("alert"))?;
        if !alert.is_resolved {
            alert.is_resolved = true;
            alert.resolved_at = Some(now);
        }
        Ok(alert.clone())
    }

    pub fn insert_intervention(&mut self, record: InterventionRecord) {
        self.interventions.push(record);
    }

    /// Single-shot back-fill of the delivery outcome. The record is
    /// immutable once effectiveness has been written.
    pub fn set_intervention_outcome(
        &mut self,
        intervention_id: Uuid,
        effectiveness_score: f64,
        responses: StudentResponses,
    ) -> Result<InterventionRecord, AppError> {
        let record = self
            .interventions
            .iter_mut()
            .find(|r| r.id == intervention_id)
            .ok_or(AppError::NotFound("intervention"))?;
        if record.effectiveness_score.is_none() {
            record.effectiveness_score = Some(effectiveness_score);
            record.student_responses = Some(responses);
        }
        Ok(record.clone())
    }

    /// Most recent first, capped at `limit`.
    pub fn interventions_for_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Vec<InterventionRecord> {
        let mut records: Vec<InterventionRecord> = self
            .interventions
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        records.truncate(limit);
        records
    }

    pub fn insert_gamification(&mut self, record: GamificationRecord) {
        self.gamification.push(record);
    }

    pub fn insert_insight(&mut self, insight: PredictiveInsight) {
        self.insights.push(insight);
    }

    pub fn insert_quiz_response(&mut self, response: QuizResponse) {
        self.quiz_responses.push(response);
    }

    /// Most recent responses first, capped at `limit`.
    pub fn recent_quiz_responses(&self, session_id: &str, limit: usize) -> Vec<QuizResponse> {
        let mut responses: Vec<QuizResponse> = self
            .quiz_responses
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect();
        responses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        responses.truncate(limit);
        responses
    }

    pub fn quiz_responses_for_session(&self, session_id: &str) -> Vec<QuizResponse> {
        self.quiz_responses
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn insert_summary(&mut self, summary: SessionSummary) {
        self.summaries.push(summary);
    }

    pub fn summaries_for_session(&self, session_id: &str) -> Vec<SessionSummary> {
        self.summaries
            .iter()
            .filter(|s| s.session_id == session_id)
            .cloned()
            .collect()
    }
}

pub fn read_store(store: &SharedStore) -> Result<std::sync::RwLockReadGuard<'_, SessionStore>, AppError> {
    store.read().map_err(|_| AppError::StateLock)
}

pub fn write_store(store: &SharedStore) -> Result<std::sync::RwLockWriteGuard<'_, SessionStore>, AppError> {
    store.write().map_err(|_| AppError::StateLock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertSeverity, AlertType};
    use std::time::{Duration, UNIX_EPOCH};

    fn alert(id: Uuid) -> EngagementAlert {
        EngagementAlert {
            id,
            session_id: "session-1".to_string(),
            zone_id: None,
            alert_type: AlertType::Disengagement,
            severity: AlertSeverity::High,
            message: "Classroom showing low engagement levels".to_string(),
            current_value: 0.3,
            threshold_value: 0.5,
            created_at: UNIX_EPOCH,
            is_resolved: false,
            resolved_at: None,
        }
    }

    #[test]
    fn resolve_alert_stamps_resolved_at_once() -> Result<(), AppError> {
        let mut store = SessionStore::new();
        let id = Uuid::new_v4();
        store.insert_alerts(vec![alert(id)]);

        let first = store.resolve_alert(id, UNIX_EPOCH + Duration::from_secs(5))?;
        assert!(first.is_resolved);
        assert_eq!(first.resolved_at, Some(UNIX_EPOCH + Duration::from_secs(5)));

        // A second resolve must not move the timestamp.
        let second = store.resolve_alert(id, UNIX_EPOCH + Duration::from_secs(90))?;
        assert_eq!(second.resolved_at, Some(UNIX_EPOCH + Duration::from_secs(5)));
        Ok(())
    }

    #[test]
    fn resolve_unknown_alert_is_not_found() {
        let mut store = SessionStore::new();
        let result = store.resolve_alert(Uuid::new_v4(), UNIX_EPOCH);
        assert!(matches!(result, Err(AppError::NotFound("alert"))));
    }

    #[test]
    fn register_zone_replaces_existing_name() {
        let mut store = SessionStore::new();
        store.register_zone(ZoneRecord {
            session_id: "session-1".to_string(),
            zone_id: "zone-a".to_string(),
            zone_name: "Front".to_string(),
        });
        store.register_zone(ZoneRecord {
            session_id: "session-1".to_string(),
            zone_id: "zone-a".to_string(),
            zone_name: "Front rows".to_string(),
        });

        let zones = store.zones_for_session("session-1");
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].zone_name, "Front rows");
    }

    #[test]
    fn intervention_history_is_newest_first_and_capped() {
        let mut store = SessionStore::new();
        for i in 0..25u64 {
            store.insert_intervention(InterventionRecord {
                id: Uuid::new_v4(),
                session_id: "session-1".to_string(),
                zone_id: "zone-a".to_string(),
                intervention_type: crate::domain::InterventionType::AttentionBoost,
                message: format!("message {i}"),
                sent_at: UNIX_EPOCH + Duration::from_secs(i),
                effectiveness_score: None,
                student_responses: None,
            });
        }

        let history = store.interventions_for_session("session-1", 20);
        assert_eq!(history.len(), 20);
        assert_eq!(history[0].message, "message 24");
        assert_eq!(history[19].message, "message 5");
    }

    #[test]
    fn intervention_outcome_is_written_once() -> Result<(), AppError> {
        let mut store = SessionStore::new();
        let id = Uuid::new_v4();
        store.insert_intervention(InterventionRecord {
            id,
            session_id: "session-1".to_string(),
            zone_id: "zone-a".to_string(),
            intervention_type: crate::domain::InterventionType::Gamification,
            message: "Quick fun round?".to_string(),
            sent_at: UNIX_EPOCH,
            effectiveness_score: None,
            student_responses: None,
        });

        let responses = StudentResponses {
            delivered: 12,
            acknowledged: 9,
            positive_response: 7,
        };
        store.set_intervention_outcome(id, 0.85, responses)?;
        let updated = store.set_intervention_outcome(
            id,
            0.1,
            StudentResponses {
                delivered: 1,
                acknowledged: 1,
                positive_response: 1,
            },
        )?;

        assert_eq!(updated.effectiveness_score, Some(0.85));
        assert_eq!(updated.student_responses, Some(responses));
        Ok(())
    }
}
