// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sanitizer tests: identity on clean input, order-preserving filtering

use fabstir_embed_node::embeddings::{sanitize, TextInput};
use serde_json::json;

fn clean_batches() -> Vec<Vec<String>> {
    vec![
        vec!["hello".to_string()],
        vec!["向量检索测试".to_string(), "文档".to_string()],
        (0..50).map(|i| format!("text number {}", i)).collect(),
        vec![" leading".to_string(), "trailing ".to_string(), "x".to_string()],
    ]
}

#[test]
fn test_clean_batches_pass_unchanged() {
    for batch in clean_batches() {
        let input: Vec<TextInput> = batch.iter().cloned().map(TextInput::from).collect();
        let sanitized = sanitize(&input);
        assert_eq!(sanitized.len(), batch.len());
        assert_eq!(sanitized.as_slice(), batch.as_slice());
    }
}

#[test]
fn test_malformed_items_removed_order_kept() {
    let junk = [
        json!(""),
        json!("    "),
        json!("\t\r\n"),
        json!(0),
        json!(-1.5),
        json!(false),
        json!(null),
        json!([]),
        json!({}),
    ];

    for batch in clean_batches() {
        // Interleave one junk item after every clean item
        let mut input = Vec::new();
        for (i, text) in batch.iter().enumerate() {
            input.push(TextInput::from(junk[i % junk.len()].clone()));
            input.push(TextInput::from(text.clone()));
        }
        input.push(TextInput::from(junk[0].clone()));

        let sanitized = sanitize(&input);
        assert_eq!(sanitized.as_slice(), batch.as_slice());
    }
}

#[test]
fn test_only_junk_yields_empty_batch() {
    let input: Vec<TextInput> = vec![json!("   ").into(), json!(123).into()];
    assert!(sanitize(&input).is_empty());
}

#[test]
fn test_unicode_whitespace_is_blank() {
    // U+3000 ideographic space, U+00A0 no-break space, U+0085 next line
    let input: Vec<TextInput> = vec![
        "\u{3000}".into(),
        "\u{00A0}".into(),
        "\u{85}".into(),
        "ok".into(),
    ];
    assert_eq!(sanitize(&input).as_slice(), &["ok"]);

    // File, group, record and unit separators count as blank too
    let input: Vec<TextInput> = vec![
        "\u{1c}".into(),
        "\u{1d}".into(),
        "\u{1e}".into(),
        "\u{1f}".into(),
        " \u{1f}\t".into(),
        "kept\u{1f}".into(),
    ];
    assert_eq!(sanitize(&input).as_slice(), &["kept\u{1f}"]);
}
