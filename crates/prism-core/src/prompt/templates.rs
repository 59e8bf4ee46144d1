//! Outer system templates the selected prompt body is substituted into.

/// Placeholder token replaced by the selected prompt body.
pub(crate) const PLACEHOLDER: &str = "{{$type_prompt}}";

/// Standard outer template for short-output requests.
pub const MAIN_TEMPLATE: &str = r#"
You are an information-extraction assistant for scanned financial documents.
You are given one page image and the raw text recovered from it. Follow the
instructions below exactly and answer with the structured data only — no
commentary, no apologies, no code fences.

{{$type_prompt}}
"#;

/// Outer template for long-output requests. Same placeholder contract as
/// [`MAIN_TEMPLATE`], with explicit instructions against truncation since
/// long-mode completions cover multi-page entity lists.
pub const LONG_RESPONSE_TEMPLATE: &str = r#"
You are an information-extraction assistant for scanned financial documents.
You are given one page image and the raw text recovered from it. Follow the
instructions below exactly and answer with the structured data only — no
commentary, no apologies, no code fences. Emit every entity in full: never
summarize a run of rows with a placeholder like "additional entities follow
the same pattern".

{{$type_prompt}}
"#;

/// Minimal template used when the document type could not be determined.
/// Deliberately has no placeholder: an unrecognized type swaps the whole
/// outer template rather than just the body fragment.
pub const NO_TYPE_TEMPLATE: &str = r#"
You are an information-extraction assistant for scanned financial documents.
You are given one page image and the raw text recovered from it. Extract the
structured data the page contains, keeping the printed column headings as
field names, and answer with the data only — no commentary, no apologies,
no code fences. Report a field as None when its value is not present in the
image.
"#;

/// Substitute a prompt body into an outer template's placeholder.
pub fn render(outer: &str, body: &str) -> String {
    outer.replace(PLACEHOLDER, body)
}
