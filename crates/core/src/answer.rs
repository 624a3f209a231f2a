//! Response shaping for the chat and door-schedule endpoints.

use crate::models::{ChatResponse, Citation, DoorScheduleResponse, DoorScheduleRow, ScoredHit};
use crate::TextIndex;

pub const CHAT_TOP_K: usize = 5;
pub const DOOR_SCHEDULE_TOP_K: usize = 10;
pub const SNIPPET_CHARS: usize = 600;
pub const DEFAULT_DOOR_QUERY: &str = "door schedule";

pub const NO_MATCH_ANSWER: &str =
    "I searched the project documents but couldn't find anything matching your question.";
pub const NO_DOOR_TEXT_NOTE: &str = "No relevant text found for door schedule.";
pub const DOOR_SCHEDULE_NOTE: &str = "This is a simple keyword-based extraction of lines that look door-related. \
In a production system an LLM would convert this into richer structured fields.";

fn citations(hits: &[ScoredHit<'_>]) -> Vec<Citation> {
    hits.iter().map(|hit| hit.chunk.citation()).collect()
}

/// Answers with the opening of the best matching page.
pub fn chat(index: &TextIndex, message: &str) -> ChatResponse {
    let hits = index.search(message, CHAT_TOP_K);

    let Some(top) = hits.first() else {
        return ChatResponse {
            answer: NO_MATCH_ANSWER.to_string(),
            citations: Vec::new(),
        };
    };

    let snippet: String = top.chunk.text.chars().take(SNIPPET_CHARS).collect();
    let answer = format!(
        "I am running in keyword-search-only mode (no external AI API available). \
Here is the most relevant text I found in the project documents for your question:\n\n\
{snippet}\n\n(From {}, page {})",
        top.chunk.file_name, top.chunk.page
    );

    ChatResponse {
        answer,
        citations: citations(&hits),
    }
}

/// Every character that ends a line, including the ASCII group/record
/// separators and the Unicode line and paragraph separators.
const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\u{000b}', '\u{000c}', '\u{001c}', '\u{001d}', '\u{001e}', '\u{0085}',
    '\u{2028}', '\u{2029}',
];

/// Lines that mention a door or carry a `D-` style mark.
pub fn is_door_line(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered.contains("door") || lowered.contains("d-")
}

/// Collects door-related lines from the pages matching `query`, which
/// defaults to "door schedule" when missing or blank.
pub fn door_schedule(index: &TextIndex, query: Option<&str>) -> DoorScheduleResponse {
    let query = query
        .filter(|query| !query.trim().is_empty())
        .unwrap_or(DEFAULT_DOOR_QUERY);
    let hits = index.search(query, DOOR_SCHEDULE_TOP_K);

    if hits.is_empty() {
        return DoorScheduleResponse {
            rows: Vec::new(),
            citations: Vec::new(),
            note: NO_DOOR_TEXT_NOTE.to_string(),
        };
    }

    let rows = hits
        .iter()
        .flat_map(|hit| {
            hit.chunk
                .text
                .split(LINE_BREAKS)
                .map(str::trim)
                .filter(|line| !line.is_empty() && is_door_line(line))
                .map(move |line| DoorScheduleRow {
                    file_name: hit.chunk.file_name.clone(),
                    page: hit.chunk.page,
                    line: line.to_string(),
                })
        })
        .collect();

    DoorScheduleResponse {
        rows,
        citations: citations(&hits),
        note: DOOR_SCHEDULE_NOTE.to_string(),
    }
}
