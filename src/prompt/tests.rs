use super::*;

fn item(content: &str, source: Option<&str>) -> RetrievedItem {
    RetrievedItem {
        id: "chunk_0".to_string(),
        content: content.to_string(),
        source_document_id: source.map(str::to_string),
        similarity_score: Some(0.87),
    }
}

#[test]
fn format_single_item() {
    let rendered = format_context(&[item("hi", Some("d1"))]);
    assert_eq!(rendered, "[Document 1]\nhi\n[Source: d1]");
}

#[test]
fn format_numbers_items_from_one() {
    let rendered = format_context(&[
        item("first chunk", Some("d1")),
        item("second chunk", Some("d2")),
    ]);

    assert_eq!(
        rendered,
        "[Document 1]\nfirst chunk\n[Source: d1]\n\n[Document 2]\nsecond chunk\n[Source: d2]"
    );
}

#[test]
fn format_missing_source_renders_unknown() {
    let rendered = format_context(&[item("orphan", None)]);
    assert_eq!(rendered, "[Document 1]\norphan\n[Source: unknown]");
}

#[test]
fn format_empty_input_renders_empty_string() {
    assert_eq!(format_context(&[]), "");
}

#[test]
fn build_prompt_substitutes_query_and_context() {
    let template = PromptTemplate::default();
    let prompt = build_prompt("Q", "C", &template);

    assert!(prompt.contains("Question: Q"));
    assert!(prompt.contains("Context:\nC"));
    assert!(prompt.ends_with("Answer:"));
}

#[test]
fn build_prompt_uses_custom_template() {
    let template = PromptTemplate {
        instruction: "CTX={context} Q={question} =>".to_string(),
    };
    let prompt = build_prompt("why?", "because", &template);

    assert_eq!(prompt, "CTX=because Q=why? =>");
}

#[test]
fn default_template_validates() {
    assert!(PromptTemplate::default().validate().is_ok());
}

#[test]
fn template_without_placeholders_is_rejected() {
    let missing_question = PromptTemplate {
        instruction: "Context: {context}\nAnswer:".to_string(),
    };
    assert!(matches!(
        missing_question.validate(),
        Err(crate::RaglineError::InvalidArgument(_))
    ));

    let missing_context = PromptTemplate {
        instruction: "Question: {question}\nAnswer:".to_string(),
    };
    assert!(missing_context.validate().is_err());
}
