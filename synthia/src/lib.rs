//! Thin client for OpenAI-compatible chat completion backends, plus a
//! terminal monitor that watches a JSONL generation log fill up.
//!
//! The two halves are independent. [`Client`] sends a single chat completion
//! request with a fixed long-reasoning system prompt and fixed sampling
//! parameters, classifies upstream failures and pauses before surfacing
//! them. [`Monitor`] polls a line-delimited record file and redraws a status
//! table at a fixed cadence until the process is killed.
//!
//! Retry orchestration is deliberately left to callers: every failure except
//! a context-length truncation crosses this crate's boundary as a
//! [`ClientError`].

pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod monitor;
pub mod prompt;

pub use client::{Client, ClientBuilder};
pub use completion::{
    ChatMessage, ChatRequest, Completion, CompletionModel, MessageRole, request_completion,
};
pub use config::RequestConfig;
pub use error::{ClientError, ErrorKind};
pub use monitor::{Monitor, MonitorSample, Progress, count_jsonl_items};
