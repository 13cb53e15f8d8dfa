//! Prompt construction for the two model-facing calls.
//!
//! Both prompts demand a strict JSON reply whose shape matches the wire
//! structs in [`crate::types`]; anything off-shape is handled by the
//! caller's extract-and-retry loop, not here.

use gapscan_common::AnalysisMode;
use gapscan_web::SourceDocument;

use crate::types::WorkItem;

/// Chars of each document included verbatim in the analysis prompt. Full
/// normalized text would blow the context on multi-document runs.
const DOC_PREVIEW_CHARS: usize = 1000;

/// Build the query fan-out prompt for a topic. The minimum query count
/// comes from the mode (10 simple, 20 deep).
pub fn fanout_prompt(topic: &str, mode: AnalysisMode) -> String {
    let minimum = mode.minimum_queries();
    let focus = match mode {
        AnalysisMode::Simple => format!(
            "Analyze the topic \"{topic}\" for content gap analysis. \
             Generate at least {minimum} queries that would help identify content gaps. \
             Focus on variations competitors might rank for but current content might miss. \
             Include long-tail variations, question-based queries, and related search intents."
        ),
        AnalysisMode::Deep => format!(
            "Analyze the topic \"{topic}\" for comprehensive content gap analysis. \
             Generate at least {minimum} queries for deep content analysis. \
             Include semantic variations, user journey stages, related topics, and competitive angles. \
             Consider informational, transactional, and navigational search intents."
        ),
    };

    format!(
        "You are generating queries for content gap analysis and competitive research.\n\
         Original topic: \"{topic}\". Analysis mode: \"{mode}\".\n\n\
         {focus}\n\n\
         Each query should help identify potential content gaps by covering semantic \
         variations, related questions, long-tail keywords, comparison queries, \
         problem-solution queries, and feature-specific queries.\n\
         Avoid queries requiring real-time data or personal information.\n\n\
         Return valid JSON in exactly this format:\n\
         {{\n\
         \x20 \"analysis_details\": {{\n\
         \x20   \"target_query_count\": 12,\n\
         \x20   \"reasoning_for_count\": \"Why this number was chosen\",\n\
         \x20   \"analysis_focus\": \"Content gap identification\"\n\
         \x20 }},\n\
         \x20 \"content_gap_queries\": [\n\
         \x20   {{\n\
         \x20     \"query\": \"Example query\",\n\
         \x20     \"type\": \"semantic_variation\",\n\
         \x20     \"search_intent\": \"informational\",\n\
         \x20     \"gap_potential\": \"high\",\n\
         \x20     \"reasoning\": \"Why this query surfaces a gap\"\n\
         \x20   }}\n\
         \x20 ]\n\
         }}"
    )
}

/// Build the batch analysis prompt: one batch of queries scored against
/// every available document. Documents that failed to fetch are excluded;
/// the breakdown must be keyed by the exact URLs listed.
pub fn analysis_prompt(batch: &[WorkItem], documents: &[SourceDocument]) -> String {
    let queries_block: String = batch
        .iter()
        .map(|item| format!("- {}\n", item.query))
        .collect();

    let mut content_block = String::new();
    for doc in documents.iter().filter(|d| d.is_available()) {
        let preview: String = doc.text.chars().take(DOC_PREVIEW_CHARS).collect();
        content_block.push_str(&format!("URL: {}\nContent:\n{preview}\n\n", doc.url));
    }

    format!(
        "Analyze the following page content against these queries to identify content gaps.\n\n\
         QUERIES TO ANALYZE:\n\
         {queries_block}\n\
         PAGE CONTENT:\n\
         {content_block}\
         For each query and each URL, determine:\n\
         1. coverage_score (integer 0-10): how well that URL covers the query\n\
         2. gap_description: what specific information is missing\n\
         3. optimization_suggestion: how to improve the content for this query\n\n\
         Return valid JSON in exactly this format, with \"analysis_per_url\" keyed by the \
         exact URLs listed above:\n\
         {{\n\
         \x20 \"batch_analysis\": [\n\
         \x20   {{\n\
         \x20     \"query\": \"query text\",\n\
         \x20     \"analysis_per_url\": {{\n\
         \x20       \"https://example.com/page\": {{\n\
         \x20         \"coverage_score\": 7,\n\
         \x20         \"gap_description\": \"what is missing\",\n\
         \x20         \"optimization_suggestion\": \"what to add\"\n\
         \x20       }}\n\
         \x20     }}\n\
         \x20   }}\n\
         \x20 ],\n\
         \x20 \"overall_insights\": {{\n\
         \x20   \"strongest_areas\": [\"area\"],\n\
         \x20   \"biggest_gaps\": [\"gap\"],\n\
         \x20   \"quick_wins\": [\"win\"]\n\
         \x20 }}\n\
         }}"
    )
}
