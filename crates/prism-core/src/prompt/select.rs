//! Document-type tag resolution.

use super::bodies;

/// Closed enumeration of recognized prompt types.
///
/// Resolution from a wire tag is exact and case-sensitive; anything outside
/// the recognized set (including the empty string) maps to [`NoType`].
///
/// [`NoType`]: PromptKind::NoType
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Type1,
    Type2,
    Type3,
    Type4,
    Type5,
    Type6,
    Type7,
    Type8,
    /// Fallback for unrecognized or empty tags.
    NoType,
}

impl PromptKind {
    /// Resolve a caller-supplied tag to a prompt kind.
    ///
    /// `TYPE11` is a legacy alias kept for callers that still send it; it
    /// resolves to [`PromptKind::Type5`], so its resolved tag reads
    /// `TYPE5_PROMPT`.
    pub fn resolve(tag: &str) -> Self {
        match tag {
            "TYPE1_PROMPT" => Self::Type1,
            "TYPE2_PROMPT" => Self::Type2,
            "TYPE3_PROMPT" => Self::Type3,
            "TYPE4_PROMPT" => Self::Type4,
            "TYPE5_PROMPT" | "TYPE11" => Self::Type5,
            "TYPE6_PROMPT" => Self::Type6,
            "TYPE7_PROMPT" => Self::Type7,
            "TYPE8_PROMPT" => Self::Type8,
            _ => Self::NoType,
        }
    }

    /// The prompt body text for this kind.
    pub fn body(&self) -> &'static str {
        match self {
            Self::Type1 => bodies::TYPE1,
            Self::Type2 => bodies::TYPE2,
            Self::Type3 => bodies::TYPE3,
            Self::Type4 => bodies::TYPE4,
            Self::Type5 => bodies::TYPE5,
            Self::Type6 => bodies::TYPE6,
            Self::Type7 => bodies::TYPE7,
            Self::Type8 => bodies::TYPE8,
            Self::NoType => bodies::NO_TYPE,
        }
    }

    /// The canonical tag string for this kind.
    pub fn resolved_tag(&self) -> &'static str {
        match self {
            Self::Type1 => "TYPE1_PROMPT",
            Self::Type2 => "TYPE2_PROMPT",
            Self::Type3 => "TYPE3_PROMPT",
            Self::Type4 => "TYPE4_PROMPT",
            Self::Type5 => "TYPE5_PROMPT",
            Self::Type6 => "TYPE6_PROMPT",
            Self::Type7 => "TYPE7_PROMPT",
            Self::Type8 => "TYPE8_PROMPT",
            Self::NoType => "NO_TYPE_PROMPT",
        }
    }
}

/// The outcome of one prompt selection. Immutable, created per request.
#[derive(Debug, Clone)]
pub struct PromptSelection {
    /// Tag as supplied by the caller, unmodified.
    pub type_tag: String,
    /// Body text actually used.
    pub body_text: String,
    /// Canonical tag of the body actually used.
    pub resolved_type: String,
    /// Resolved kind, for callers that branch on it.
    pub kind: PromptKind,
}

/// Select the prompt body for a document-type tag.
///
/// Pure function: exact, case-sensitive matching with no normalization.
/// Mismatches silently fall through to the default body and the
/// `NO_TYPE_PROMPT` resolved type.
pub fn select_prompt_body(type_tag: &str) -> PromptSelection {
    let kind = PromptKind::resolve(type_tag);
    PromptSelection {
        type_tag: type_tag.to_string(),
        body_text: kind.body().to_string(),
        resolved_type: kind.resolved_tag().to_string(),
        kind,
    }
}
