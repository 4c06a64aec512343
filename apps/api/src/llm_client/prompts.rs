// Cross-cutting prompt fragments shared by the stage modules.
// Each stage keeps its own templates in a prompts.rs alongside it.

/// Appended to system prompts of every JSON-mode stage.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Extra user turn used when re-asking after a malformed or error response.
pub const STRICT_JSON_INSTRUCTION: &str = "STRICT MODE: return ONLY a valid JSON object \
    that follows the requested schema exactly. No free text, no markdown, \
    and no \"error\" field.";
