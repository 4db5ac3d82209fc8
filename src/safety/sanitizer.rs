use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

/// Replacement token for filtered injection patterns. Deliberately inert:
/// it matches none of the patterns below, so sanitization is a fixed point.
pub const FILTERED_MARKER: &str = "[FILTERED]";

/// Maximum content length fed into pattern matching. Bounds both regex cost
/// and the blast radius of anything that slips through.
const MAX_CONTENT_LENGTH: usize = 10_000;

/// Category of detected prompt injection pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionCategory {
    InstructionOverride,
    RoleManipulation,
    PromptExtraction,
    StructuralMarker,
    Obfuscation,
    OutputHijack,
}

struct InjectionPattern {
    category: InjectionCategory,
    name: &'static str,
    regex: Regex,
}

/// Strips known prompt-injection patterns from untrusted content before it
/// reaches a model prompt.
///
/// Defense layers, in order:
/// 1. Unicode NFKC normalization to collapse homoglyphs and fullwidth
///    variants before any pattern match
/// 2. Invisible/zero-width/bidi codepoint stripping
/// 3. Truncation to a fixed maximum length (after normalization: NFKC can
///    expand characters, so truncating first would not bound the output)
/// 4. Ordered regex pattern filtering across 6 categories
///
/// Every text that crosses into a model prompt must pass through
/// [`Sanitizer::sanitize`] — including model output that is fed into a
/// second model call.
pub struct Sanitizer {
    patterns: Vec<InjectionPattern>,
}

static GLOBAL: LazyLock<Sanitizer> = LazyLock::new(Sanitizer::new);

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        let pattern_defs: Vec<(InjectionCategory, &str, &str)> = vec![
            // Direct instruction overrides
            (
                InjectionCategory::InstructionOverride,
                "ignore_previous",
                r"(?i)ignore\s+(all\s+)?previous\s+instructions",
            ),
            (
                InjectionCategory::InstructionOverride,
                "disregard_prior",
                r"(?i)disregard\s+(all\s+)?(prior|previous|above)",
            ),
            (
                InjectionCategory::InstructionOverride,
                "forget_previous",
                r"(?i)forget\s+(all\s+)?(previous|prior|above|your)\s+\w+",
            ),
            (
                InjectionCategory::InstructionOverride,
                "override_system",
                r"(?i)override\s+(your\s+)?(system|instructions|rules)",
            ),
            (
                InjectionCategory::InstructionOverride,
                "do_not_follow",
                r"(?i)do\s+not\s+follow\s+(your|the)\s+(previous|original)",
            ),
            // Role manipulation
            (
                InjectionCategory::RoleManipulation,
                "you_are_now",
                r"(?i)you\s+are\s+now\s+a",
            ),
            (
                InjectionCategory::RoleManipulation,
                "pretend_to_be",
                r"(?i)pretend\s+(you\s+are|to\s+be)",
            ),
            (
                InjectionCategory::RoleManipulation,
                "act_as",
                r"(?i)act\s+as\s+(if\s+you\s+are|a|an)",
            ),
            (
                InjectionCategory::RoleManipulation,
                "switch_mode",
                r"(?i)switch\s+to\s+\w+\s+mode",
            ),
            (
                InjectionCategory::RoleManipulation,
                "enter_mode",
                r"(?i)enter\s+(developer|debug|admin|god)\s+mode",
            ),
            // Prompt extraction
            (
                InjectionCategory::PromptExtraction,
                "reveal_prompt",
                r"(?i)reveal\s+your\s+(system\s+)?prompt",
            ),
            (
                InjectionCategory::PromptExtraction,
                "show_instructions",
                r"(?i)(show|print|output|repeat)\s+(your\s+)?(system\s+)?(prompt|instructions)",
            ),
            (
                InjectionCategory::PromptExtraction,
                "what_is_your_prompt",
                r"(?i)what\s+(are|is)\s+your\s+(system\s+)?(prompt|instructions)",
            ),
            // Structural markers (chat-format role tags)
            (
                InjectionCategory::StructuralMarker,
                "system_colon",
                r"(?i)system\s*:",
            ),
            (
                InjectionCategory::StructuralMarker,
                "system_tag",
                r"(?i)<\s*/?\s*system\s*>",
            ),
            (
                InjectionCategory::StructuralMarker,
                "inst_tag",
                r"(?i)\[/?INST\]",
            ),
            (
                InjectionCategory::StructuralMarker,
                "sys_delimiter",
                r"(?i)<<\s*/?SYS\s*>>",
            ),
            (
                InjectionCategory::StructuralMarker,
                "im_start",
                r"(?is)<\s*\|im_start\|.*?\|im_end\|?\s*>",
            ),
            (
                InjectionCategory::StructuralMarker,
                "markdown_role",
                r"(?i)###\s*(System|Human|Assistant)\s*:",
            ),
            // Encoded / obfuscated attempts
            (
                InjectionCategory::Obfuscation,
                "base64_blob",
                r"(?i)base64\s*[:\-]\s*[A-Za-z0-9+/=]{20,}",
            ),
            (
                InjectionCategory::Obfuscation,
                "eval_call",
                r"(?i)eval\s*\(",
            ),
            // Output hijacking
            (
                InjectionCategory::OutputHijack,
                "respond_with_only",
                r"(?i)respond\s+with\s+(only|exactly|just)",
            ),
            (
                InjectionCategory::OutputHijack,
                "response_must",
                r"(?i)your\s+(response|output|reply)\s+must\s+(be|start|begin|contain)",
            ),
        ];

        let patterns = pattern_defs
            .into_iter()
            .filter_map(|(category, name, pattern)| match Regex::new(pattern) {
                Ok(regex) => Some(InjectionPattern {
                    category,
                    name,
                    regex,
                }),
                Err(e) => {
                    warn!("failed to compile sanitizer pattern '{}': {}", name, e);
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    /// NFKC-fold the text so lookalike glyphs (fullwidth variants,
    /// compatibility forms) collapse to their plain equivalents, then strip
    /// zero-width, invisible, and bidi-control codepoints used to split
    /// keywords (e.g. "ig\u{200B}nore" → "ignore"). Must run before any
    /// pattern match or an attacker can smuggle instructions past the regexes.
    fn normalize(text: &str) -> String {
        text.nfkc()
            .filter(|c| {
                !matches!(
                    *c,
                    '\u{200B}' // zero-width space
                    | '\u{200C}' // zero-width non-joiner
                    | '\u{200D}' // zero-width joiner
                    | '\u{200E}' // left-to-right mark
                    | '\u{200F}' // right-to-left mark
                    | '\u{FEFF}' // byte-order mark / zero-width no-break space
                    | '\u{00AD}' // soft hyphen
                    | '\u{034F}' // combining grapheme joiner
                    | '\u{2060}' // word joiner
                    | '\u{202A}'..='\u{202E}' // bidi control (LRE, RLE, PDF, LRO, RLO)
                    | '\u{2066}'..='\u{2069}' // bidi isolates (LRI, RLI, FSI, PDI)
                )
            })
            .collect()
    }

    fn truncate(text: &str) -> &str {
        match text.char_indices().nth(MAX_CONTENT_LENGTH) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Remove prompt injection patterns and truncate overly long content.
    /// Each match is replaced with [`FILTERED_MARKER`]; the result is
    /// trimmed. Re-running on sanitized output is a no-op.
    pub fn sanitize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let normalized = Self::normalize(text);
        let mut out = Self::truncate(&normalized).to_string();
        for pattern in &self.patterns {
            if pattern.regex.is_match(&out) {
                out = pattern
                    .regex
                    .replace_all(&out, FILTERED_MARKER)
                    .into_owned();
            }
        }
        out.trim().to_string()
    }

    /// Check whether content contains potential prompt injection attempts,
    /// without mutating it. Used to reject a post outright rather than
    /// merely scrub it.
    pub fn is_suspicious(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let normalized = Self::normalize(text);
        self.patterns.iter().any(|p| p.regex.is_match(&normalized))
    }

    /// Category of the first matching pattern, for logging.
    pub fn classify(&self, text: &str) -> Option<(InjectionCategory, &'static str)> {
        let normalized = Self::normalize(text);
        self.patterns
            .iter()
            .find(|p| p.regex.is_match(&normalized))
            .map(|p| (p.category, p.name))
    }
}

/// Sanitize text through the process-wide pattern set.
pub fn sanitize(text: &str) -> String {
    GLOBAL.sanitize(text)
}

/// Check text for injection attempts through the process-wide pattern set.
pub fn is_suspicious(text: &str) -> bool {
    GLOBAL.is_suspicious(text)
}
