// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fenced-code-block extraction (C8 step 4): pulls the first fenced block
//! out of an LLM reply, preferring a ` ```python ` tag but accepting any
//! language tag (or none) so the orchestrator isn't coupled to one
//! language's fence convention.

/// Extract the first fenced code block's contents from `reply`. Prefers a
/// block explicitly tagged `python`; falls back to the first fenced block
/// of any kind.
pub fn extract_code_block(reply: &str) -> Option<String> {
    let blocks = find_fenced_blocks(reply);
    blocks
        .iter()
        .find(|b| b.lang.eq_ignore_ascii_case("python"))
        .or_else(|| blocks.first())
        .map(|b| b.body.clone())
}

struct FencedBlock {
    lang: String,
    body: String,
}

fn find_fenced_blocks(text: &str) -> Vec<FencedBlock> {
    let mut blocks = Vec::new();
    let mut lines = text.lines().peekable();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if let Some(lang) = trimmed.strip_prefix("```") {
            let lang = lang.trim().to_string();
            let mut body_lines = Vec::new();
            for body_line in lines.by_ref() {
                if body_line.trim_start().starts_with("```") {
                    break;
                }
                body_lines.push(body_line);
            }
            blocks.push(FencedBlock {
                lang,
                body: body_lines.join("\n"),
            });
        }
    }
    blocks
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
