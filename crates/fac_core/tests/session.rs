use std::collections::BTreeMap;

use fac_core::domain::Citation;
use fac_core::session::{ConversationTurn, SessionContext};
use pretty_assertions::assert_eq;

#[test]
fn history_is_isolated_per_patient() {
    let mut session = SessionContext::new();

    session.select_patient("john_doe");
    session.record_turn(ConversationTurn::new("q1", "a1", Vec::new()));

    session.select_patient("jane_roe");
    session.record_turn(ConversationTurn::new("q2", "a2", Vec::new()));
    session.record_turn(ConversationTurn::new("q3", "a3", Vec::new()));

    assert_eq!(session.history_for(Some("john_doe")).len(), 1);
    assert_eq!(session.history_for(Some("jane_roe")).len(), 2);
    assert_eq!(session.history().len(), 2);
    assert!(session.history_for(Some("unknown")).is_empty());
}

#[test]
fn turns_keep_citations_in_order() {
    let citations = vec![
        Citation {
            source_path: "book.pdf".to_string(),
            page_number: Some(3),
            namespace: "Medical_Course".to_string(),
            fragment_text: "Apply firm pressure to stop bleeding".to_string(),
        },
        Citation {
            source_path: "john_doe.pdf".to_string(),
            page_number: None,
            namespace: "john_doe".to_string(),
            fragment_text: "Patient takes anticoagulants".to_string(),
        },
    ];
    let turn = ConversationTurn::new("How do I stop bleeding?", "Apply pressure.", citations);
    assert_eq!(turn.citations.len(), 2);
    assert_eq!(turn.citations[0].page_number, Some(3));
    assert_eq!(turn.citations[1].page_number, None);
    assert!(!turn.asked_at.is_empty());
}

#[test]
fn stats_feed_the_known_patient_set() {
    let mut session = SessionContext::new();
    let mut stats = BTreeMap::new();
    stats.insert("Medical_Course".to_string(), 812u64);
    stats.insert("john_doe".to_string(), 14u64);
    stats.insert("jane_roe".to_string(), 9u64);

    session.register_patients_from_stats(&stats, "Medical_Course");
    assert_eq!(session.known_patients(), vec!["jane_roe", "john_doe"]);
    assert_eq!(session.current_patient(), None);
}
