//! Transition - Enter/exit state machine for one element.
//!
//! A `Transition` follows its `in` prop through four states:
//!
//! ```text
//!            in: false                 timeout
//!  Entered ────────────▶ Exiting ──────────────▶ Exited
//!     ▲                     │                       │
//!     │ 10 (20 on mount)    │ in: true              │ in: true
//!     │                     ▼                       │
//!  Entering ◀───────────────────────────────────────┘
//! ```
//!
//! Each props update applies at most one transition. Timed steps are
//! self-dispatched actions; at most one timer is pending per instance.
//! Reaching `Exited` fires the `on_exited` listener prop, which is how a
//! [`TransitionGroup`](super::TransitionGroup) learns a child may go.
//!
//! # Props
//!
//! - `in` (bool, default true)
//! - `status` (`"appear"` starts in `Entering`; read on first mount only)
//! - `timeout` (exit duration, default [`DEFAULT_EXIT_TIMEOUT`])
//! - `render` (`PropValue::Render`, receives the status string and `passed`)
//! - `passed` (any value, forwarded to `render`)
//! - `on_exited` (listener)
//!
//! # Example
//!
//! ```ignore
//! Element::component::<Transition>(
//!     Props::new()
//!         .with("key", id)
//!         .with("timeout", 500)
//!         .with("render", PropValue::render(|status, _| {
//!             Element::tag("path", Props::new().with("class", status))
//!         })),
//! )
//! ```

use std::fmt;

use tracing::{debug, warn};

use super::child_mapping::{IN, STATUS};
use crate::component::{Component, Cx, Hooks, Scope};
use crate::element::{Element, Props};
use crate::engine::TimerId;
use crate::types::{Event, PropValue};

/// Exit duration when no `timeout` prop is given.
pub const DEFAULT_EXIT_TIMEOUT: u64 = 200;

/// Delay before an update-triggered `Entering` settles.
pub const ENTER_DELAY: u64 = 10;

/// Delay before a mount-time `Entering` settles.
pub const APPEAR_DELAY: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionStatus {
    Entering,
    #[default]
    Entered,
    Exiting,
    Exited,
}

impl TransitionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionStatus::Entering => "entering",
            TransitionStatus::Entered => "entered",
            TransitionStatus::Exiting => "exiting",
            TransitionStatus::Exited => "exited",
        }
    }
}

impl fmt::Display for TransitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionState {
    pub status: TransitionStatus,
    /// Last `in` value seen. None until the first props arrive.
    pub input: Option<bool>,
}

/// Timed steps the transition sends itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    Entered,
    Exited,
}

/// State after `in` and `hint` arrive in props, or None if nothing changes.
pub fn next_state(input: bool, hint: Option<&str>, prev: &TransitionState) -> Option<TransitionState> {
    use TransitionStatus::*;

    let Some(was_in) = prev.input else {
        let status = match (input, hint) {
            (false, _) => Exited,
            (true, Some("appear")) => Entering,
            (true, _) => Entered,
        };
        return Some(TransitionState {
            status,
            input: Some(input),
        });
    };

    let status = match (was_in, input, prev.status) {
        (true, false, Entered | Entering) => Exiting,
        (false, true, Exited | Exiting) => Entering,
        _ => return None,
    };
    Some(TransitionState {
        status,
        input: Some(input),
    })
}

#[derive(Debug, Default)]
pub struct Transition {
    timer: Option<TimerId>,
}

impl Transition {
    fn clear_timer(&mut self, cx: &mut Cx<'_>) {
        if let Some(timer) = self.timer.take() {
            cx.clear_timeout(timer);
        }
    }

    fn restart_timer(&mut self, cx: &mut Cx<'_>, delay: u64, action: TransitionAction) {
        self.clear_timer(cx);
        debug!(instance = %cx.id(), delay, ?action, "schedule transition step");
        self.timer = Some(cx.set_timeout(delay, action));
    }

    fn exit_timeout(props: &Props) -> u64 {
        props
            .int("timeout")
            .map_or(DEFAULT_EXIT_TIMEOUT, |t| t.max(0) as u64)
    }
}

impl Component for Transition {
    type State = TransitionState;
    type Action = TransitionAction;

    const HOOKS: Hooks = Hooks::DERIVE_STATE
        .union(Hooks::REDUCER)
        .union(Hooks::DID_MOUNT)
        .union(Hooks::DID_UPDATE)
        .union(Hooks::WILL_REMOVE);

    fn derive_state_from_props(&self, props: &Props, state: &TransitionState) -> Option<TransitionState> {
        next_state(props.bool(IN).unwrap_or(true), props.text(STATUS), state)
    }

    fn reducer(&self, action: TransitionAction, state: &TransitionState) -> Option<TransitionState> {
        let status = match (action, state.status) {
            (TransitionAction::Entered, TransitionStatus::Entering) => TransitionStatus::Entered,
            (TransitionAction::Exited, TransitionStatus::Exiting) => TransitionStatus::Exited,
            _ => return None,
        };
        Some(TransitionState { status, ..*state })
    }

    fn render(&self, _scope: Scope, props: &Props, state: &TransitionState) -> Element {
        match props.get("render").and_then(PropValue::as_render) {
            Some(render) => render(state.status.as_str(), props.get("passed")),
            None => {
                warn!("transition has no `render` prop; rendering an empty group");
                Element::tag("g", Props::new())
            }
        }
    }

    fn did_mount(&mut self, cx: &mut Cx<'_>, state: &TransitionState) {
        if state.status == TransitionStatus::Entering {
            self.restart_timer(cx, APPEAR_DELAY, TransitionAction::Entered);
        }
    }

    fn did_update(&mut self, cx: &mut Cx<'_>, _prev_props: &Props, prev: &TransitionState, state: &TransitionState) {
        let changed = prev.status != state.status;
        let pending = self.timer.is_some_and(|t| cx.is_timer_pending(t));

        match state.status {
            TransitionStatus::Exiting if changed || !pending => {
                let timeout = Self::exit_timeout(cx.props());
                self.restart_timer(cx, timeout, TransitionAction::Exited);
            }
            TransitionStatus::Entering if changed || !pending => {
                self.restart_timer(cx, ENTER_DELAY, TransitionAction::Entered);
            }
            TransitionStatus::Entered => self.clear_timer(cx),
            TransitionStatus::Exited => {
                self.clear_timer(cx);
                if changed {
                    cx.emit("on_exited", Event::new("exited"));
                }
            }
            _ => {}
        }
    }

    fn will_remove(&mut self, cx: &mut Cx<'_>, _state: &TransitionState) {
        self.clear_timer(cx);
    }
}

// =============================================================================
// Tests
// =============================================================================
