//! Reconciliation Pipeline
//!
//! This module turns element trees into host mutations and keeps them in sync.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Element tree → mount → host tree
//!                  ↑         ↓ events, timers
//! next tree → reconcile ← send / dispatch_event / advance
//! ```
//!
//! ## Data Flow
//!
//! 1. **mount** - Creates host nodes for tags, instantiates and renders components
//! 2. **reconcile** - Diffs a mounted tree against its next description
//! 3. **keyed** - Matches child lists by key and restores host order
//! 4. **runtime** - Entry points, the pending-action queue and the clock
//!
//! ## Key Design Principles
//!
//! - **Minimal mutations**: unchanged props and text are never rewritten
//! - **Moved links**: host and instance links pass from the previous description to the next
//! - **No re-entrancy**: actions raised during an update run after it commits

mod diff;
mod keyed;
mod mount;
mod runtime;

pub use runtime::Runtime;
