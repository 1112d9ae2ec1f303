//! Tests extraction of answer text from response bodies.

use paper_analyzer_analysis_contract::{ContractError, parse_generate_response};

#[test]
fn response_parsing_tests_returns_text_verbatim() {
    let raw = r##"{
        "candidates":[{
            "content":{"role":"model","parts":[{"text":"# Result\n\n| a | b |\n"},{"text":"|---|---|\n"}]},
            "finishReason":"STOP"
        }]
    }"##;

    let text = parse_generate_response(raw).expect("response should parse");
    assert_eq!(text, "# Result\n\n| a | b |\n|---|---|\n");
}

#[test]
fn response_parsing_tests_skips_reasoning_parts() {
    let raw = r#"{"candidates":[{"content":{"parts":[
        {"text":"thinking about papers","thought":true},
        {"text":"answer"}
    ]}}]}"#;

    assert_eq!(parse_generate_response(raw).unwrap(), "answer");
}

#[test]
fn response_parsing_tests_candidate_without_content_is_empty_text() {
    let raw = r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#;
    assert_eq!(parse_generate_response(raw).unwrap(), "");
}

#[test]
fn response_parsing_tests_reports_blocked_and_missing_candidates() {
    let blocked = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
    assert!(matches!(
        parse_generate_response(blocked),
        Err(ContractError::Blocked(reason)) if reason == "SAFETY"
    ));

    assert!(matches!(
        parse_generate_response("{}"),
        Err(ContractError::NoCandidates)
    ));
    assert!(matches!(
        parse_generate_response("<html>502</html>"),
        Err(ContractError::Codec(_))
    ));
}
