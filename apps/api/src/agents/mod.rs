//! Agent runtime: role-bound wrappers around a `ChatModel`, plus the parsing
//! utilities every graph shares (verdicts, lenient JSON, markdown cleanup) and
//! the progress-reporting contract.

pub mod agent;
pub mod cleanup;
pub mod json;
pub mod progress;
pub mod tool;
pub mod verdict;

pub use agent::Agent;
pub use cleanup::{clean_job_title, strip_markdown};
pub use json::{extract_json, extract_json_or};
pub use progress::{Progress, ProgressCallback, ProgressEvent};
pub use tool::Tool;
pub use verdict::{parse_verdict, Verdict};
