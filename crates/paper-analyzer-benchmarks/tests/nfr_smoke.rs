//! Benchmark smoke test for the encode -> request -> render loop.

use std::time::Instant;

use paper_analyzer_analysis_contract::GenerateContentRequest;
use paper_analyzer_client::{ANALYSIS_PROMPT, request_fingerprint};
use paper_analyzer_core::{AnalysisRequest, RawFile};
use paper_analyzer_encoder::encode_all;
use paper_analyzer_render::render;

const LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[tokio::test]
async fn benchmark_submission_smoke_prints_latency() {
    let files: Vec<RawFile> = (0..4_u8)
        .map(|index| {
            let bytes: Vec<u8> = (0..LIMIT_BYTES / 4)
                .map(|offset| (offset as u8).wrapping_mul(31).wrapping_add(index))
                .collect();
            RawFile::from_bytes(format!("page-{index}.png"), "image/png", bytes)
                .expect("file should be valid")
        })
        .collect();

    let start = Instant::now();
    let parts = encode_all(&files).await.expect("memory files should encode");
    let encoded_ms = start.elapsed().as_millis();

    let request = AnalysisRequest::new(ANALYSIS_PROMPT, parts).expect("request should build");
    let fingerprint = request_fingerprint(&request);
    let body = GenerateContentRequest::from(&request)
        .to_json_bytes()
        .expect("request should serialize");
    let request_ms = start.elapsed().as_millis();

    println!("benchmark_encode_elapsed_ms={encoded_ms}");
    println!("benchmark_request_elapsed_ms={request_ms}");
    println!("benchmark_request_body_bytes={}", body.len());

    assert_eq!(fingerprint.len(), 64);
    assert!(body.len() > LIMIT_BYTES * 4 / 3);
    // This is a lightweight guardrail; strict NFR checks are environment-specific.
    assert!(request_ms < 10_000, "submission smoke should stay bounded");
}

#[test]
fn benchmark_render_smoke_prints_latency() {
    let mut markup = String::from("# Comparative Analysis\n\n| Aspect | Paper 1 | Paper 2 |\n|---|---|---|\n");
    for row in 0..500 {
        markup.push_str(&format!("| Row {row} | **method** {row} | _dataset_ {row} |\n"));
    }
    markup.push_str("\n## Future Research Directions\n\n");
    for item in 0..200 {
        markup.push_str(&format!("- Direction {item} with a [link](https://example.org/{item})\n"));
    }

    let start = Instant::now();
    let document = render(&markup);
    let text = document.to_terminal(100);
    let elapsed_ms = start.elapsed().as_millis();

    println!("benchmark_render_elapsed_ms={elapsed_ms}");
    assert!(text.contains("Row 499"));
    assert!(elapsed_ms < 5_000, "render smoke should stay bounded");
}
