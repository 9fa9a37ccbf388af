use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::Citation;

/// One question/answer exchange, with per-fragment citation metadata.
/// Held in memory only; discarded at session end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub citations: Vec<Citation>,
    /// RFC3339 timestamp taken when the turn was recorded.
    pub asked_at: String,
}

impl ConversationTurn {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        citations: Vec<Citation>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            citations,
            asked_at: now_rfc3339(),
        }
    }
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Explicit session state: the active patient, the set of known patient
/// ids, and per-patient conversation history. Created at session start,
/// mutated only through these methods, discarded at session end.
///
/// Turns asked with no patient selected land in a separate general
/// bucket so selecting a patient later does not mix histories.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    current_patient: Option<String>,
    patients: BTreeSet<String>,
    history: BTreeMap<Option<String>, Vec<ConversationTurn>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_patient(&self) -> Option<&str> {
        self.current_patient.as_deref()
    }

    /// Make a patient active, registering it if unseen.
    pub fn select_patient(&mut self, patient_id: impl Into<String>) {
        let patient_id = patient_id.into();
        self.patients.insert(patient_id.clone());
        self.current_patient = Some(patient_id);
    }

    pub fn clear_patient(&mut self) {
        self.current_patient = None;
    }

    pub fn register_patient(&mut self, patient_id: impl Into<String>) {
        self.patients.insert(patient_id.into());
    }

    /// Fold live namespace names from the vector store's stats into the
    /// known-patient set. Every namespace except the reference one is a
    /// patient namespace by construction.
    pub fn register_patients_from_stats(
        &mut self,
        stats: &BTreeMap<String, u64>,
        reference_namespace: &str,
    ) {
        for namespace in stats.keys() {
            if namespace != reference_namespace && !namespace.is_empty() {
                self.patients.insert(namespace.clone());
            }
        }
    }

    pub fn known_patients(&self) -> Vec<&str> {
        self.patients.iter().map(String::as_str).collect()
    }

    /// Append a turn to the active patient's history.
    pub fn record_turn(&mut self, turn: ConversationTurn) {
        self.history
            .entry(self.current_patient.clone())
            .or_default()
            .push(turn);
    }

    pub fn history(&self) -> &[ConversationTurn] {
        self.history_for(self.current_patient.as_deref())
    }

    pub fn history_for(&self, patient_id: Option<&str>) -> &[ConversationTurn] {
        self.history
            .get(&patient_id.map(str::to_string))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
