//! # strand-core
//!
//! Foundation types for the Strand agent's context core.
//!
//! This crate provides the shared vocabulary the other Strand crates depend
//! on:
//!
//! - **Messages**: `Message` enum with `System`, `User`, `Assistant`, and
//!   `Tool` variants, role-tagged on the wire
//! - **Tool invocations**: validated `ToolInvocation` plus the unvalidated
//!   `RawToolCall` as it arrives from the model
//! - **Tool schema**: `Tool` and `ToolParameterSchema` describing what the
//!   model may call
//! - **File context**: `FileContext` tag (source path, content hash, size)
//!   carried by injected file snippets for duplicate detection

#![deny(unsafe_code)]

pub mod messages;
pub mod tools;

pub use messages::{FileContext, Message, ToolInvocation};
pub use tools::{RawToolCall, Tool, ToolParameterSchema};
