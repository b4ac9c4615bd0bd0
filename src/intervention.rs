//! Targeted zone messages: validation, simulated delivery over the
//! notification channel stand-in, and the effectiveness heuristic.

use crate::domain::{InterventionRecord, InterventionType, StudentResponses};
use crate::error::AppError;
use crate::random::RandomSource;
use crate::store::{SharedStore, read_store, write_store};
use std::time::SystemTime;
use tracing::info;
use uuid::Uuid;

pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Delivered,
    PartialDelivery,
}

#[derive(Debug)]
pub struct InterventionOutcome {
    pub record: InterventionRecord,
    pub delivery_status: DeliveryStatus,
    pub students_reached: u32,
}

/// Creates the record, simulates delivery to the zone, and back-fills the
/// effectiveness score in the same operation. The record is stored before
/// the simulated channel runs, matching a push channel that confirms
/// delivery after enqueueing.
pub fn send_intervention(
    store: &SharedStore,
    session_id: &str,
    zone_id: &str,
    intervention_type: InterventionType,
    message: &str,
    random: &mut dyn RandomSource,
    now: SystemTime,
) -> Result<InterventionOutcome, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id"));
    }
    if zone_id.trim().is_empty() {
        return Err(AppError::Validation("zone_id"));
    }
    if message.trim().is_empty() {
        return Err(AppError::Validation("message"));
    }

    let record = InterventionRecord {
        id: Uuid::new_v4(),
        session_id: session_id.to_string(),
        zone_id: zone_id.to_string(),
        intervention_type,
        message: message.to_string(),
        sent_at: now,
        effectiveness_score: None,
        student_responses: None,
    };
    let intervention_id = record.id;

    let mut guard = write_store(store)?;
    guard.insert_intervention(record);

    let delivery = simulate_delivery(random);
    let jitter = random.in_range(-0.05, 0.05);
    let effectiveness = effectiveness_score(intervention_type, message, jitter);

    let record =
        guard.set_intervention_outcome(intervention_id, effectiveness, delivery.responses)?;
    drop(guard);

    info!(
        session_id = session_id,
        zone_id = zone_id,
        students = delivery.students_in_zone,
        effectiveness = effectiveness,
        "Intervention dispatched"
    );

    Ok(InterventionOutcome {
        record,
        delivery_status: delivery.status,
        students_reached: delivery.students_in_zone,
    })
}

struct DeliveryResult {
    status: DeliveryStatus,
    students_in_zone: u32,
    responses: StudentResponses,
}

fn simulate_delivery(random: &mut dyn RandomSource) -> DeliveryResult {
    let students_in_zone = random.int_in_range(5, 20);
    let acknowledged = (students_in_zone as f64 * random.in_range(0.7, 0.9)) as u32;
    let positive_response = (students_in_zone as f64 * random.in_range(0.5, 0.8)) as u32;
    let status = if random.chance(0.9) {
        DeliveryStatus::Delivered
    } else {
        DeliveryStatus::PartialDelivery
    };

    DeliveryResult {
        status,
        students_in_zone,
        responses: StudentResponses {
            delivered: students_in_zone,
            acknowledged,
            positive_response,
        },
    }
}

/// Deterministic given the inputs and the jitter draw. Questions, an
/// optimal message length and energetic wording each add a small bonus.
pub fn effectiveness_score(
    intervention_type: InterventionType,
    message: &str,
    jitter: f64,
) -> f64 {
    let mut score = 0.6;

    score += match intervention_type {
        InterventionType::AttentionBoost => 0.10,
        InterventionType::ParticipationPrompt => 0.15,
        InterventionType::ConfusionHelp => 0.20,
        InterventionType::Gamification => 0.25,
    };

    if message.contains('?') {
        score += 0.05;
    }
    if (50..150).contains(&message.len()) {
        score += 0.05;
    }
    let lowered = message.to_lowercase();
    if lowered.contains("quick") || lowered.contains("fun") {
        score += 0.05;
    }

    (score + jitter).clamp(0.0, 1.0)
}

/// Most recent interventions for the session, capped at [`HISTORY_LIMIT`].
pub fn intervention_history(
    store: &SharedStore,
    session_id: &str,
) -> Result<Vec<InterventionRecord>, AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id"));
    }
    let guard = read_store(store)?;
    Ok(guard.interventions_for_session(session_id, HISTORY_LIMIT))
}
