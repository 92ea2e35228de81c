//! Pipeline Comprehensive Test Suite
//!
//! End-to-end checks of the command pipeline through the public API.
//!
//! ## Test Tiers
//!
//! - **Tier 1**: Session flush order on the success path
//! - **Tier 2**: Concurrent completes on one execution
//! - **Tier 3**: Concurrent claims on one task
//! - **Tier 4**: Transitions out of terminal states
//! - **Tier 5**: Batched authorization denial
//! - **Tier 6**: Variable bundle ordering
//! - **Tier 7**: Revision round-trip for every legal transition
//! - **Tier 8**: ENABLED at revision 3, completed
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test pipeline_comprehensive
//! ```

// Test modules
mod test_utils;

// Tier 1: Unit of work
mod tier1_flush_order;

// Tier 2-3: Cross-caller concurrency
mod tier2_concurrent_complete;
mod tier3_concurrent_claim;

// Tier 4: Lifecycle guards
mod tier4_terminal_states;

// Tier 5: Authorization
mod tier5_batched_denial;

// Tier 6-8: State machine
mod tier6_variable_bundle;
mod tier7_revision_roundtrip;
mod tier8_enabled_completion;
