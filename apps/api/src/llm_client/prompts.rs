// Shared prompt fragments used across agent roles.
// Role-specific system prompts and task builders live in `crate::prompts`.

/// Appended to every writer role. The model, not the code, enforces this.
pub const NO_FABRICATION: &str = "\
    CRITICAL: Use ONLY facts present in the provided resume data. \
    Do NOT invent employers, titles, dates, metrics, technologies or achievements. \
    If the data does not support a claim, leave it out.";

/// System fragment for roles whose whole reply is parsed as JSON.
pub const JSON_ONLY: &str = "\
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System fragment for roles whose reply is shown to the user verbatim.
pub const PLAIN_TEXT_ONLY: &str = "\
    Respond with the requested text only: no preamble, no headings, \
    no markdown formatting (no bold, italics, strikethrough or code), \
    no commentary about what you changed.";

/// Reply protocol for every reviewer/critic role.
pub const REVIEW_PROTOCOL: &str = "\
    Reply in exactly one of these forms:\n\
    APPROVED\n\
    CRITIQUE: <one-line reason>\n\
    Optionally, after a CRITIQUE line, put a fully corrected version on the \
    following lines. Only include a correction if it is complete and ready to use; \
    never include a partial fix.";
