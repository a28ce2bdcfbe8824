//! System instruction assembly.
//!
//! The instruction is a fixed persona template, the caller's context tag, and
//! one extra clause when the tag names the pathway-comparison screen.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Context tag reserved for the pathway-comparison screen.
pub const COMPARISON_CONTEXT: &str = "comparison";

/// Clause appended only for [`COMPARISON_CONTEXT`].
const COMPARISON_CLAUSE: &str = " Pay particular attention to contrasting ecological adaptation, \
anatomy (such as Kranz anatomy) and the enzymes involved (Rubisco vs PEPC).";

/// Opaque tag naming the screen a question came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(transparent)]
pub struct TutorContext(String);

impl TutorContext {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the pathway-comparison context.
    pub fn is_comparison(&self) -> bool {
        self.0 == COMPARISON_CONTEXT
    }
}

impl fmt::Display for TutorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TutorContext {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Builds the tutor's system instruction.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Build the system instruction for a question asked from `context`.
    pub fn system_instruction(context: &TutorContext, response_language: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(
            "You are a professional biology professor who explains photosynthesis in plain \
             yet scientifically rigorous language.\n",
        );
        prompt.push_str("Your answers should focus on plant-physiology mechanisms.\n");
        prompt.push_str(&format!("Answer in {}.\n", response_language));
        prompt.push_str(&format!("The current context is: {}.\n", context));
        prompt.push_str(
            "If the user asks about the primary reaction, the light reactions, the dark \
             reactions, or the differences between C3/C4/CAM, explain in detail.",
        );

        if context.is_comparison() {
            prompt.push_str(COMPARISON_CLAUSE);
        }

        prompt
    }
}
