//! Response Decoder
//!
//! Splits a raw model reply into the text shown in the chat transcript and
//! an optional code artifact embedded as a fenced JSON block:
//!
//! ````text
//! Here is your page:
//! ```json
//! {"html": "...", "css": "...", "javascript": "..."}
//! ```
//! Let me know what to change.
//! ````
//!
//! Only the first fenced JSON block is considered. The block is removed from
//! the display text only when an artifact was actually extracted from it.

use serde::Deserialize;

use crate::types::GeneratedCode;

/// Opening fence marker
const OPEN_FENCE: &str = "```json";
/// Closing fence marker, always on its own line
const CLOSE_FENCE: &str = "\n```";

/// What the decoder found in a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeBlock {
    /// A block was found and yielded an artifact with at least one non-empty field
    Parsed(GeneratedCode),
    /// A block parsed, but every field was absent or empty
    Empty,
    /// No fenced JSON block in the reply
    NotFound,
    /// A block was found but its interior is not a valid artifact object
    Malformed(String),
}

/// Result of decoding one reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReply {
    /// Text for the chat transcript
    pub display_text: String,
    /// Decoder outcome
    pub block: CodeBlock,
}

impl DecodedReply {
    /// Extracted artifact, if any
    pub fn code(&self) -> Option<&GeneratedCode> {
        match &self.block {
            CodeBlock::Parsed(code) => Some(code),
            _ => None,
        }
    }

    /// Split into display text and artifact
    pub fn into_parts(self) -> (String, Option<GeneratedCode>) {
        match self.block {
            CodeBlock::Parsed(code) => (self.display_text, Some(code)),
            _ => (self.display_text, None),
        }
    }
}

/// Byte span of a fenced block within a reply
struct FencedBlock<'a> {
    /// Start of the opening fence
    start: usize,
    /// End of the closing fence
    end: usize,
    /// Text between the fences
    body: &'a str,
}

/// Artifact object as the model writes it; every key optional
#[derive(Debug, Deserialize)]
struct RawArtifact {
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    css: Option<String>,
    #[serde(default)]
    javascript: Option<String>,
}

/// Find the first ```` ```json ```` fence that is followed by a line break and
/// later closed by a bare fence on its own line.
fn find_fenced_block(raw: &str) -> Option<FencedBlock<'_>> {
    let mut search_from = 0;

    while let Some(offset) = raw[search_from..].find(OPEN_FENCE) {
        let start = search_from + offset;
        let after_marker = start + OPEN_FENCE.len();
        let rest = &raw[after_marker..];

        let body_start = if rest.starts_with('\n') {
            Some(after_marker + 1)
        } else if rest.starts_with("\r\n") {
            Some(after_marker + 2)
        } else {
            None
        };

        if let Some(body_start) = body_start {
            // The closing fence's newline may be the one ending the opening line
            // when the block is empty, so search from the newline itself.
            let close_search = body_start - 1;
            if let Some(close_offset) = raw[close_search..].find(CLOSE_FENCE) {
                let close_start = close_search + close_offset;
                let body = if close_start > body_start {
                    &raw[body_start..close_start]
                } else {
                    ""
                };
                return Some(FencedBlock {
                    start,
                    end: close_start + CLOSE_FENCE.len(),
                    body,
                });
            }
            return None;
        }

        search_from = after_marker;
    }

    None
}

fn parse_artifact(body: &str) -> Result<Option<GeneratedCode>, serde_json::Error> {
    let raw: RawArtifact = serde_json::from_str(body)?;
    let code = GeneratedCode {
        html: raw.html.unwrap_or_default(),
        css: raw.css.unwrap_or_default(),
        javascript: raw.javascript.unwrap_or_default(),
    };
    Ok(if code.is_blank() { None } else { Some(code) })
}

/// Join the prose around a removed block, trimming whitespace at the seam
fn strip_block(raw: &str, block: &FencedBlock<'_>) -> String {
    let before = raw[..block.start].trim();
    let after = raw[block.end..].trim();

    match (before.is_empty(), after.is_empty()) {
        (true, true) => String::new(),
        (false, true) => before.to_string(),
        (true, false) => after.to_string(),
        (false, false) => format!("{}\n{}", before, after),
    }
}

/// Decode a raw model reply.
///
/// Pure and synchronous. Decoding text that holds no fenced block returns it
/// unchanged, so decoding is idempotent on its own output.
pub fn decode_reply(raw: &str) -> DecodedReply {
    let Some(block) = find_fenced_block(raw) else {
        return DecodedReply {
            display_text: raw.to_string(),
            block: CodeBlock::NotFound,
        };
    };

    match parse_artifact(block.body) {
        Ok(Some(code)) => {
            log::debug!(
                "Decoded artifact: html={} css={} js={} bytes",
                code.html.len(),
                code.css.len(),
                code.javascript.len()
            );
            DecodedReply {
                display_text: strip_block(raw, &block),
                block: CodeBlock::Parsed(code),
            }
        }
        Ok(None) => {
            log::debug!("Fenced JSON block parsed but every artifact field was empty");
            DecodedReply {
                display_text: raw.to_string(),
                block: CodeBlock::Empty,
            }
        }
        Err(e) => {
            log::warn!("Failed to parse JSON block in model reply: {}", e);
            DecodedReply {
                display_text: raw.to_string(),
                block: CodeBlock::Malformed(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_full_artifact() {
        let raw = "Intro\n```json\n{\"html\":\"A\",\"css\":\"B\",\"javascript\":\"C\"}\n```\nOutro";
        let decoded = decode_reply(raw);

        assert_eq!(decoded.code(), Some(&GeneratedCode::new("A", "B", "C")));
        assert_eq!(decoded.display_text, "Intro\nOutro");
        assert!(!decoded.display_text.contains("```"));
        assert!(!decoded.display_text.contains("\"html\""));
    }

    #[test]
    fn test_no_block_returns_input_unchanged() {
        let raw = "  Just some prose.\nNo code here.  ";
        let decoded = decode_reply(raw);

        assert_eq!(decoded.display_text, raw);
        assert_eq!(decoded.block, CodeBlock::NotFound);
        assert!(decoded.code().is_none());
    }

    #[test]
    fn test_malformed_block_preserves_text() {
        let raw = "Here:\n```json\n{\"html\": \"<p>unterminated}\n```\nBye";
        let decoded = decode_reply(raw);

        assert_eq!(decoded.display_text, raw);
        assert!(matches!(decoded.block, CodeBlock::Malformed(_)));
        assert!(decoded.code().is_none());
    }

    #[test]
    fn test_non_string_field_is_malformed() {
        let raw = "```json\n{\"html\": 42}\n```";
        let decoded = decode_reply(raw);
        assert!(matches!(decoded.block, CodeBlock::Malformed(_)));
        assert_eq!(decoded.display_text, raw);
    }

    #[test]
    fn test_array_is_malformed() {
        let raw = "```json\n[1, 2, 3]\n```";
        assert!(matches!(decode_reply(raw).block, CodeBlock::Malformed(_)));
    }

    #[test]
    fn test_all_empty_fields_yield_no_code() {
        let raw = "Nothing:\n```json\n{\"html\":\"\",\"css\":\"\",\"javascript\":\"\"}\n```";
        let decoded = decode_reply(raw);

        assert_eq!(decoded.block, CodeBlock::Empty);
        assert!(decoded.code().is_none());
        assert_eq!(decoded.display_text, raw);
    }

    #[test]
    fn test_empty_object_yields_no_code() {
        let decoded = decode_reply("```json\n{}\n```");
        assert_eq!(decoded.block, CodeBlock::Empty);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let decoded = decode_reply("```json\n{\"css\":\"body{}\",\"extra\":true}\n```");
        assert_eq!(decoded.code(), Some(&GeneratedCode::new("", "body{}", "")));
        assert_eq!(decoded.display_text, "");
    }

    #[test]
    fn test_null_field_treated_as_absent() {
        let decoded = decode_reply("```json\n{\"html\":\"<a/>\",\"css\":null}\n```");
        assert_eq!(decoded.code(), Some(&GeneratedCode::new("<a/>", "", "")));
    }

    #[test]
    fn test_first_block_wins() {
        let raw = concat!(
            "one\n```json\n{\"html\":\"first\"}\n```\n",
            "two\n```json\n{\"html\":\"second\"}\n```\nthree"
        );
        let decoded = decode_reply(raw);

        assert_eq!(decoded.code().unwrap().html, "first");
        assert!(decoded.display_text.starts_with("one\ntwo"));
        assert!(decoded.display_text.contains("second"));
    }

    #[test]
    fn test_first_block_wins_even_when_malformed() {
        let raw = "```json\nnot json\n```\n```json\n{\"html\":\"ok\"}\n```";
        let decoded = decode_reply(raw);
        assert!(matches!(decoded.block, CodeBlock::Malformed(_)));
        assert_eq!(decoded.display_text, raw);
    }

    #[test]
    fn test_decoding_is_idempotent() {
        let raw = "Intro\n```json\n{\"html\":\"A\"}\n```\nOutro";
        let first = decode_reply(raw);
        let second = decode_reply(&first.display_text);

        assert_eq!(second.display_text, first.display_text);
        assert_eq!(second.block, CodeBlock::NotFound);
    }

    #[test]
    fn test_button_scenario() {
        let raw = "Here:\n```json\n{\"html\":\"<button>Hi</button>\",\"css\":\"\",\"javascript\":\"\"}\n```\nEnjoy.";
        let decoded = decode_reply(raw);

        assert_eq!(decoded.display_text, "Here:\nEnjoy.");
        assert_eq!(decoded.code().unwrap().html, "<button>Hi</button>");
        assert_eq!(decoded.code().unwrap().css, "");
        assert_eq!(decoded.code().unwrap().javascript, "");
    }

    #[test]
    fn test_pretty_printed_multiline_block() {
        let raw = "Done.\n\n```json\n{\n  \"html\": \"<div>\\n  <p>x</p>\\n</div>\",\n  \"css\": \"p { color: red; }\"\n}\n```\n";
        let decoded = decode_reply(raw);

        assert_eq!(decoded.code().unwrap().html, "<div>\n  <p>x</p>\n</div>");
        assert_eq!(decoded.display_text, "Done.");
    }

    #[test]
    fn test_crlf_line_endings() {
        let raw = "Hi\r\n```json\r\n{\"html\":\"<i/>\"}\r\n```\r\nBye";
        let decoded = decode_reply(raw);
        assert_eq!(decoded.code().unwrap().html, "<i/>");
        assert_eq!(decoded.display_text, "Hi\nBye");
    }

    #[test]
    fn test_unclosed_fence_is_not_found() {
        let raw = "```json\n{\"html\":\"A\"}";
        let decoded = decode_reply(raw);
        assert_eq!(decoded.block, CodeBlock::NotFound);
        assert_eq!(decoded.display_text, raw);
    }

    #[test]
    fn test_other_fence_languages_ignored() {
        let raw = "```html\n<p>x</p>\n```";
        assert_eq!(decode_reply(raw).block, CodeBlock::NotFound);

        // `jsonc` is not the JSON marker
        let raw = "```jsonc\n{\"html\":\"A\"}\n```";
        assert_eq!(decode_reply(raw).block, CodeBlock::NotFound);
    }

    #[test]
    fn test_into_parts() {
        let (text, code) = decode_reply("a\n```json\n{\"javascript\":\"go()\"}\n```").into_parts();
        assert_eq!(text, "a");
        assert_eq!(code.unwrap().javascript, "go()");

        let (text, code) = decode_reply("plain").into_parts();
        assert_eq!(text, "plain");
        assert!(code.is_none());
    }
}
