//! Prompt template selection for document-type-specific extraction.
//!
//! A caller-supplied document-type tag picks one of a fixed set of prompt
//! bodies; the body is substituted into an outer system template before a
//! chat request is assembled. Selection is a pure function over a closed
//! enumeration — unrecognized tags fall through to a designated default.

mod bodies;
mod select;
mod templates;

pub use select::{select_prompt_body, PromptKind, PromptSelection};
pub use templates::{render, LONG_RESPONSE_TEMPLATE, MAIN_TEMPLATE, NO_TYPE_TEMPLATE};
