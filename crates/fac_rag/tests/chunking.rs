use fac_core::config::ChunkingParams;
use fac_rag::chunking::chunk_pages;
use fac_rag::pdf::PageText;
use pretty_assertions::assert_eq;

fn pages(texts: &[(u32, &str)]) -> Vec<PageText> {
    texts
        .iter()
        .map(|(page_number, text)| PageText {
            page_number: *page_number,
            text: text.to_string(),
        })
        .collect()
}

#[test]
fn dropping_the_overlap_reconstructs_each_page() {
    let original = "The quick brown fox jumps over the lazy dog, twice, on page one.";
    let params = ChunkingParams::new(20, 5).expect("params");
    let chunks = chunk_pages(&pages(&[(1, original)]), "book.pdf", "Medical_Course", params)
        .expect("chunk");
    assert!(chunks.len() > 1);

    let mut reconstructed = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            reconstructed.push_str(&chunk.text);
        } else {
            let tail: String = chunk.text.chars().skip(params.overlap).collect();
            reconstructed.push_str(&tail);
        }
    }
    assert_eq!(reconstructed, original);
}

#[test]
fn chunks_never_span_two_pages() {
    let params = ChunkingParams::new(30, 10).expect("params");
    let chunks = chunk_pages(
        &pages(&[
            (1, "Airway first: tilt the head back and check for breathing."),
            (3, "For burns, cool the area under running water for twenty minutes."),
        ]),
        "book.pdf",
        "Medical_Course",
        params,
    )
    .expect("chunk");

    for chunk in &chunks {
        assert!(chunk.page_number == 1 || chunk.page_number == 3);
    }
    let page_one: String = chunks
        .iter()
        .filter(|c| c.page_number == 1)
        .map(|c| c.text.as_str())
        .collect();
    assert!(!page_one.contains("burns"));
}

#[test]
fn every_chunk_carries_source_and_namespace() {
    let params = ChunkingParams::default();
    let chunks = chunk_pages(
        &pages(&[(2, "Short page.")]),
        "data/medical_course/first_aid.pdf",
        "Medical_Course",
        params,
    )
    .expect("chunk");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].source_path, "data/medical_course/first_aid.pdf");
    assert_eq!(chunks[0].namespace, "Medical_Course");
    assert_eq!(chunks[0].page_number, 2);
}

#[test]
fn invalid_overlap_is_a_configuration_error() {
    let err = ChunkingParams::new(100, 100).unwrap_err();
    assert_eq!(err.code, "CONFIG_INVALID");

    // The precondition is also enforced on the chunking entry point.
    let params = ChunkingParams {
        size: 100,
        overlap: 150,
    };
    let err = chunk_pages(&pages(&[(1, "text")]), "book.pdf", "ns", params).unwrap_err();
    assert_eq!(err.code, "CONFIG_INVALID");
}
