//! Output rendering: pretty JSON for exports, markdown for the terminal view.

pub(crate) mod json;
pub(crate) mod markdown;
