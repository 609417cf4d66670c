// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming generation and chat orchestration for Parley.
//!
//! - [`GenerationSession`] runs one cancellable streaming request and writes
//!   the answer into the conversation store as it arrives.
//! - [`GenerationRegistry`] allows one live generation per chat and lets the
//!   UI stop it by chat id.
//! - [`ChatController`] ties a send together: attachments, the user message,
//!   the generation, and the web search flow.

pub mod controller;
pub mod extract;
pub mod generation;
pub mod prompt;
pub mod registry;
pub mod search_flow;

pub use controller::ChatController;
pub use extract::PlainTextExtractor;
pub use generation::{
    ERROR_NOTICE, GenerationReport, GenerationSession, GenerationState, STOPPED_MARKER,
};
pub use prompt::{PreparedMessage, display_content, prepare_message};
pub use registry::{GenerationGuard, GenerationRegistry};
pub use search_flow::{ANALYZING_STATUS, SEARCHING_STATUS, SearchAnswer, search_prompt};
