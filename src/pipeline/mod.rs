//! Pipeline stages for a single analysis request.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ encode ──▶ llm
//! (bytes)   (JPEG +    (chat-completions
//!            data URL)  POST, text out)
//! ```
//!
//! 1. [`encode`] — decode any supported format, flatten to RGB when needed,
//!    re-encode as JPEG and wrap as a base64 data URL; runs on the blocking
//!    pool because it is CPU-bound
//! 2. [`llm`]    — build the multimodal request and make the one network call

pub mod encode;
pub mod llm;
