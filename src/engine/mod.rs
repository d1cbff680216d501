//! Engine - Slot registry and timer queue.
//!
//! The engine owns the bookkeeping structures the reconciler builds on:
//! - Registry: generational slots for host nodes and component instances
//! - Timers: deadline-ordered virtual clock for delayed self-dispatch
//!
//! # Architecture
//!
//! Instances and host nodes are not referenced by pointer. They are handles
//! into generational arenas:
//!
//! ```text
//! InstanceId(i0v0) → Transition { status: Entered }
//! InstanceId(i1v0) → TransitionGroup { children: [1, 2, 3] }
//! InstanceId(i0v1) → (slot 0 reused after i0v0 was removed)
//! ```
//!
//! A handle that outlives its value stops resolving instead of aliasing the
//! next occupant, which is what keeps late timers harmless.

mod registry;
mod timers;

pub use registry::*;
pub use timers::*;
