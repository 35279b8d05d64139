use super::*;

fn reassemble(windows: &[String], overlap: usize) -> String {
    let mut text = String::new();
    for (i, window) in windows.iter().enumerate() {
        if i == 0 {
            text.push_str(window);
        } else {
            text.extend(window.chars().skip(overlap));
        }
    }
    text
}

#[test]
fn empty_text_yields_no_windows() {
    let windows = chunk("", 10, 0).expect("chunk should succeed");
    assert!(windows.is_empty());
}

#[test]
fn exact_partition_without_overlap() {
    let text = "a".repeat(20);
    let windows = chunk(&text, 10, 0).expect("chunk should succeed");

    assert_eq!(windows.len(), 2);
    assert!(windows.iter().all(|w| w.chars().count() == 10));
}

#[test]
fn text_of_one_window_yields_one_chunk() {
    let text = "b".repeat(10);
    let windows = chunk(&text, 10, 0).expect("chunk should succeed");

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0], text);
}

#[test]
fn trailing_remainder_becomes_short_final_window() {
    let text = "c".repeat(11);
    let windows = chunk(&text, 10, 0).expect("chunk should succeed");

    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].chars().count(), 10);
    assert_eq!(windows[1].chars().count(), 1);
}

#[test]
fn window_larger_than_text_returns_full_text() {
    let windows = chunk("short", 100, 10).expect("chunk should succeed");

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0], "short");
}

#[test]
fn overlap_repeats_trailing_characters() {
    let text = "0123456789abcdefghij";
    let windows = chunk(text, 10, 5).expect("chunk should succeed");

    // stride=5; the window starting at 10 reaches the end, so no further
    // window is emitted
    assert_eq!(windows.len(), 3);
    assert_eq!(windows[0], "0123456789");
    assert_eq!(windows[1], "56789abcde");
    assert_eq!(windows[2], "abcdefghij");
}

#[test]
fn near_total_overlap_is_legal() {
    let windows = chunk("abcde", 3, 2).expect("chunk should succeed");

    // stride=1, so each window advances a single code point
    assert_eq!(windows, vec!["abc", "bcd", "cde"]);
}

#[test]
fn reconstruction_roundtrip() {
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(37);
    for (window_size, overlap) in [(50, 0), (50, 10), (300, 30), (7, 6)] {
        let windows = chunk(&text, window_size, overlap).expect("chunk should succeed");
        assert_eq!(
            reassemble(&windows, overlap),
            text,
            "reconstruction failed for window {} overlap {}",
            window_size,
            overlap
        );
    }
}

#[test]
fn multibyte_characters_are_never_split() {
    let text = "héllo wörld 👋🌍 ünïcode".repeat(10);
    let windows = chunk(&text, 7, 2).expect("chunk should succeed");

    // Collecting chars guarantees valid UTF-8 per window; verify the counts
    // line up with code points rather than bytes.
    assert!(windows.iter().all(|w| w.chars().count() <= 7));
    assert_eq!(reassemble(&windows, 2), text);
}

#[test]
fn zero_window_size_is_rejected() {
    let result = chunk("some text", 0, 0);
    assert!(matches!(result, Err(RaglineError::InvalidArgument(_))));
}

#[test]
fn overlap_equal_to_window_is_rejected() {
    let result = chunk("some text", 10, 10);
    assert!(matches!(result, Err(RaglineError::InvalidArgument(_))));
}

#[test]
fn overlap_larger_than_window_is_rejected() {
    let result = chunk("some text", 10, 25);
    assert!(matches!(result, Err(RaglineError::InvalidArgument(_))));
}

#[test]
fn chunk_documents_derives_ids_and_indices() {
    let documents = vec![Document::new("a", "X".repeat(700))];
    let config = ChunkingConfig {
        window_size: 300,
        overlap: 30,
    };

    let chunks = chunk_documents(&documents, &config).expect("chunk_documents should succeed");

    // stride=270, windows start at 0, 270, 540
    assert_eq!(chunks.len(), 3);
    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a_0", "a_1", "a_2"]);
    let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(chunks.iter().all(|c| c.source_document_id == "a"));
}

#[test]
fn chunk_documents_preserves_input_order() {
    let documents = vec![
        Document::new("first", "1".repeat(12)),
        Document::new("second", "2".repeat(5)),
    ];
    let config = ChunkingConfig {
        window_size: 10,
        overlap: 0,
    };

    let chunks = chunk_documents(&documents, &config).expect("chunk_documents should succeed");

    let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["first_0", "first_1", "second_0"]);
    // Indices restart at zero for each document
    assert_eq!(chunks[2].chunk_index, 0);
}

#[test]
fn chunk_documents_skips_empty_documents() {
    let documents = vec![
        Document::new("empty", ""),
        Document::new("full", "some text"),
    ];
    let config = ChunkingConfig::default();

    let chunks = chunk_documents(&documents, &config).expect("chunk_documents should succeed");

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].id, "full_0");
}

#[test]
fn chunk_documents_rejects_invalid_config() {
    let documents = vec![Document::new("a", "text")];
    let config = ChunkingConfig {
        window_size: 10,
        overlap: 10,
    };

    let result = chunk_documents(&documents, &config);
    assert!(matches!(result, Err(RaglineError::InvalidArgument(_))));
}

#[test]
fn document_source_label_falls_back_to_id() {
    let plain = Document::new("doc-1", "text");
    assert_eq!(plain.source_label(), "doc-1");

    let labeled = Document::new("doc-1", "text").with_source_label("notes/doc one");
    assert_eq!(labeled.source_label(), "notes/doc one");
}

#[test]
fn clean_text_collapses_whitespace() {
    assert_eq!(clean_text("hello   \t world"), "hello world");
    assert_eq!(clean_text("  padded  "), "padded");
    assert_eq!(clean_text("line one  \n   line two"), "line one\nline two");
}

#[test]
fn clean_text_collapses_blank_lines() {
    assert_eq!(clean_text("one\n\n\n\ntwo"), "one\n\ntwo");
    assert_eq!(clean_text("one\n  \n\t\ntwo"), "one\n\ntwo");
}

#[test]
fn clean_text_handles_empty_input() {
    assert_eq!(clean_text(""), "");
    assert_eq!(clean_text("   \n \n  "), "");
}

#[test]
fn clean_text_is_idempotent() {
    let samples = [
        "",
        "plain text",
        "  a\tb\r\nc  \n\n\n\nd  ",
        "mixed   spacing\n\n\nacross\n \nlines",
    ];
    for sample in samples {
        let once = clean_text(sample);
        assert_eq!(clean_text(&once), once, "not idempotent for {:?}", sample);
    }
}
