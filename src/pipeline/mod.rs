//! The deal extraction decision pipeline.
//!
//! Every inbound email flows through:
//! 1. `prompts` — deterministic snippet/full renderers
//! 2. `DecisionRouter::route()` — one cheap classification call
//! 3. `ExtractionEngine::extract()` — minimal always, deep when warranted,
//!    concurrent and joined all-or-nothing
//! 4. `evidence::sanitize()` — grounding validation per payload
//!
//! The generative step is treated as probabilistic; the validation layer is
//! the actual correctness boundary.

pub mod engine;
pub mod evidence;
pub mod processor;
pub mod prompts;
pub mod router;
pub mod schema;
pub mod types;
pub mod worker;
