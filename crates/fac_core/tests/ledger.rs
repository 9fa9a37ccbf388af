use fac_core::ledger::IngestionLedger;
use pretty_assertions::assert_eq;

#[test]
fn missing_file_loads_as_empty_ledger() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ledger = IngestionLedger::load(dir.path().join("ingested_books.json")).expect("load");
    assert!(!ledger.contains("Medical_Course", "anatomy.pdf"));
    assert!(ledger.filenames("Medical_Course").is_empty());
}

#[test]
fn marked_filenames_survive_a_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ingested_books.json");

    let mut ledger = IngestionLedger::load(&path).expect("load");
    assert!(ledger.mark("Medical_Course", "first_aid.pdf").expect("mark"));
    assert!(ledger.mark("Medical_Course", "anatomy.pdf").expect("mark"));

    let reloaded = IngestionLedger::load(&path).expect("reload");
    assert!(reloaded.contains("Medical_Course", "first_aid.pdf"));
    assert!(reloaded.contains("Medical_Course", "anatomy.pdf"));
    assert_eq!(
        reloaded.filenames("Medical_Course"),
        vec!["anatomy.pdf".to_string(), "first_aid.pdf".to_string()]
    );
}

#[test]
fn marking_twice_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ingested_books.json");

    let mut ledger = IngestionLedger::load(&path).expect("load");
    assert!(ledger.mark("Medical_Course", "first_aid.pdf").expect("mark"));
    assert!(!ledger.mark("Medical_Course", "first_aid.pdf").expect("mark again"));
    assert_eq!(ledger.filenames("Medical_Course").len(), 1);
}

#[test]
fn unmark_drops_a_stale_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ingested_books.json");

    let mut ledger = IngestionLedger::load(&path).expect("load");
    ledger.mark("Medical_Course", "first_aid.pdf").expect("mark");
    assert!(ledger.unmark("Medical_Course", "first_aid.pdf").expect("unmark"));
    assert!(!ledger.unmark("Medical_Course", "first_aid.pdf").expect("unmark again"));

    let reloaded = IngestionLedger::load(&path).expect("reload");
    assert!(!reloaded.contains("Medical_Course", "first_aid.pdf"));
}

#[test]
fn rejects_a_corrupt_ledger_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ingested_books.json");
    std::fs::write(&path, b"not json").expect("write");

    let err = IngestionLedger::load(&path).unwrap_err();
    assert_eq!(err.code, "LEDGER_FAILED");
}
