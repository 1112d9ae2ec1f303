//! Tests redaction of credentials in logged failure causes.

use paper_analyzer_client::redact_sensitive;

#[test]
fn log_redaction_tests_removes_query_and_header_keys() {
    let raw = "error sending request for url (https://example.test/v1beta?key=AIzaSecret)";
    let redacted = redact_sensitive(raw);
    assert!(redacted.contains("<redacted>"));
    assert!(!redacted.contains("AIzaSecret"));

    let header = redact_sensitive("x-goog-api-key: AIzaOther");
    assert!(!header.contains("AIzaOther"));
}

#[test]
fn log_redaction_tests_leaves_plain_messages_alone() {
    let raw = "remote returned status 503: overloaded";
    assert_eq!(redact_sensitive(raw), raw);
}

#[test]
fn log_redaction_tests_keeps_quota_diagnostics() {
    let raw = "remote returned status 429: Quota exceeded for metric: \
               generativelanguage.googleapis.com/generate_content_free_tier_input_token_count, \
               limit: 0, quotaId: GenerateContentInputTokensPerModelPerDay-FreeTier";
    assert_eq!(redact_sensitive(raw), raw);
}

#[test]
fn log_redaction_tests_replaces_only_the_secret_value() {
    let raw = "request to https://example.test/v1beta?key=AIzaSecret&alt=json failed; token=abc123, retry later";
    let redacted = redact_sensitive(raw);
    assert_eq!(
        redacted,
        "request to https://example.test/v1beta?key=<redacted>&alt=json failed; token=<redacted>, retry later"
    );

    let header = redact_sensitive("Authorization: Bearer sk-live-42 was rejected");
    assert!(!header.contains("sk-live-42"));
    assert!(header.ends_with("was rejected"));
}
