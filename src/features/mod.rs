//! Interaction pipeline: an ordered list of independent, stateful handlers.
//!
//! Every input event is offered to each attached feature in order. A feature
//! answers [`Flow::Continue`] to pass the event on or [`Flow::Stop`] to end
//! dispatch for that event. An error also ends dispatch for that event and is
//! returned to the caller; the next event starts from the top again.
//!
//! A feature may detach the pipeline during a gesture. While detached, no
//! feature after it sees any event. Reattachment is either immediate or
//! scheduled on the timer queue, which the host drives with
//! [`Pipeline::tick`].

mod cell_selection;
mod column_fixation;
mod column_moving;
mod column_resizing;
mod column_selection;
mod context_menu;
mod hover;
mod key_paging;
mod overlay;
mod row_fixation;
mod row_selection;

use serde::{Deserialize, Serialize};

use crate::cursor::CellCursor;
use crate::error::{GridError, Result};
use crate::grid::GridModel;
use crate::layout::{VisibleColumn, VisibleRow};
use crate::types::{DataCell, GridCell, Point};

pub use cell_selection::CellSelection;
pub use column_fixation::ColumnFixation;
pub use column_moving::{ColumnMoving, MoveDrag, MoveState};
pub use column_resizing::ColumnResizing;
pub use column_selection::ColumnSelection;
pub use context_menu::ContextMenu;
pub use hover::OnHover;
pub use key_paging::KeyPaging;
pub use overlay::{Bar, Overlays};
pub use row_fixation::RowFixation;
pub use row_selection::RowSelection;

/// What dispatch does after a feature has handled an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Button {
    #[default]
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn any(self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn toggle(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer shape a host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorIcon {
    #[default]
    Default,
    Pointer,
    ColResize,
    RowResize,
    Grab,
    Grabbing,
}

/// Resolved cell under a pointer, with the classification flags features
/// branch on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellInfo {
    pub column: VisibleColumn,
    pub row: VisibleRow,
    /// Pointer position relative to the cell's top-left corner
    pub offset: Point,
    pub grid_cell: GridCell,
    pub data_cell: DataCell,
    pub is_header_row: bool,
    pub is_filter_row: bool,
    pub is_data_row: bool,
    pub is_data_column: bool,
    pub is_handle_column: bool,
    pub is_tree_column: bool,
    pub is_column_fixed: bool,
    pub is_row_fixed: bool,
}

impl CellInfo {
    pub fn is_header_cell(&self) -> bool {
        self.is_header_row && self.is_data_column
    }

    pub fn is_data_cell(&self) -> bool {
        self.is_data_row && self.is_data_column
    }

    pub fn active_index(&self) -> Option<usize> {
        self.grid_cell.x.active_index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub point: Point,
    pub button: Button,
    pub modifiers: Modifiers,
    /// `None` when the pointer is outside every rendered cell.
    pub cell: Option<CellInfo>,
}

impl PointerEvent {
    pub fn new(point: Point, button: Button, modifiers: Modifiers) -> Self {
        Self {
            point,
            button,
            modifiers,
            cell: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// DOM-style key name: `"Escape"`, `"PageDown"`, `"a"`, ...
    pub key: String,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

/// Handle identifying one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerTarget {
    Reattach,
    Feature(usize),
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due_ms: f64,
    target: TimerTarget,
    token: TimerToken,
}

/// Pending delayed work, fired by [`Pipeline::tick`].
#[derive(Debug, Default)]
struct TimerQueue {
    timers: Vec<Timer>,
    next: u64,
}

impl TimerQueue {
    fn schedule(&mut self, target: TimerTarget, due_ms: f64) -> TimerToken {
        let token = TimerToken(self.next);
        self.next += 1;
        self.timers.push(Timer {
            due_ms,
            target,
            token,
        });
        token
    }

    /// Remove and return every timer due at `now_ms`, earliest first.
    fn take_due(&mut self, now_ms: f64) -> Vec<Timer> {
        let (mut due, rest): (Vec<Timer>, Vec<Timer>) =
            self.timers.drain(..).partition(|t| t.due_ms <= now_ms);
        self.timers = rest;
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due
    }

    fn next_due(&self) -> Option<f64> {
        self.timers.iter().map(|t| t.due_ms).min_by(f64::total_cmp)
    }
}

#[derive(Debug, Default)]
struct ChainControl {
    detach: bool,
    reattach_now: bool,
    reattach_after: Option<f64>,
}

/// What a feature can see and touch while handling one event.
pub struct FeatureContext<'a> {
    pub model: &'a mut GridModel,
    pub cursor: &'a mut CellCursor,
    timers: &'a mut TimerQueue,
    control: &'a mut ChainControl,
    index: usize,
    now_ms: f64,
}

impl FeatureContext<'_> {
    /// Host clock at dispatch time.
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Stop every later feature from seeing events until reattached.
    pub fn detach(&mut self) {
        self.control.detach = true;
    }

    pub fn reattach_now(&mut self) {
        self.control.reattach_now = true;
    }

    /// Reattach after `reattach_delay_ms`, swallowing any trailing event.
    pub fn reattach_later(&mut self) {
        self.control.reattach_after = Some(self.model.config.reattach_delay_ms);
    }

    /// Ask for [`Feature::on_timer`] to be called on this feature after
    /// `delay_ms`.
    pub fn schedule(&mut self, delay_ms: f64) -> TimerToken {
        self.timers
            .schedule(TimerTarget::Feature(self.index), self.now_ms + delay_ms)
    }
}

/// One pipeline handler. Every method defaults to passing the event on.
#[allow(unused_variables)]
pub trait Feature {
    /// Name used in the `features` configuration list.
    fn name(&self) -> &'static str;

    fn on_pointer_down(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    fn on_pointer_move(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    fn on_pointer_drag(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    fn on_pointer_up(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    fn on_double_click(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    fn on_context_menu(&mut self, ctx: &mut FeatureContext<'_>, event: &PointerEvent) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    fn on_key_down(&mut self, ctx: &mut FeatureContext<'_>, event: &KeyEvent) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    fn on_key_up(&mut self, ctx: &mut FeatureContext<'_>, event: &KeyEvent) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    /// Called after every layout rebuild.
    fn on_rendered(&mut self, ctx: &mut FeatureContext<'_>) -> Result<Flow> {
        Ok(Flow::Continue)
    }

    /// A timer this feature scheduled has fired.
    fn on_timer(&mut self, ctx: &mut FeatureContext<'_>, token: TimerToken) -> Result<()> {
        Ok(())
    }

    /// Pointer shape this feature wants right now, if any.
    fn cursor_icon(&self) -> Option<CursorIcon> {
        None
    }
}

/// Build a feature from its configuration name.
///
/// # Errors
/// Returns [`GridError::InvalidArgument`] for an unknown name.
pub fn feature_by_name(name: &str) -> Result<Box<dyn Feature>> {
    let feature: Box<dyn Feature> = match name {
        "on_hover" => Box::new(OnHover::default()),
        "column_fixation" => Box::new(ColumnFixation::default()),
        "row_fixation" => Box::new(RowFixation::default()),
        "column_resizing" => Box::new(ColumnResizing::default()),
        "row_selection" => Box::new(RowSelection::default()),
        "column_selection" => Box::new(ColumnSelection::default()),
        "column_moving" => Box::new(ColumnMoving::default()),
        "cell_selection" => Box::new(CellSelection::default()),
        "key_paging" => Box::new(KeyPaging),
        "context_menu" => Box::new(ContextMenu::default()),
        other => {
            return Err(GridError::InvalidArgument(format!("unknown feature '{other}'")));
        }
    };
    Ok(feature)
}

/// Ordered feature list plus its detach state and timer queue.
#[derive(Default)]
pub struct Pipeline {
    features: Vec<Box<dyn Feature>>,
    detached_at: Option<usize>,
    timers: TimerQueue,
    reattach_token: Option<TimerToken>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("features", &self.names())
            .field("detached_at", &self.detached_at)
            .field("timers", &self.timers.timers.len())
            .finish()
    }
}

impl Pipeline {
    pub fn new(features: Vec<Box<dyn Feature>>) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    /// Build the pipeline in the order `names` lists.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidArgument`] if any name is unknown.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let features = names
            .iter()
            .map(|n| feature_by_name(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(features))
    }

    pub fn push(&mut self, feature: Box<dyn Feature>) {
        self.features.push(feature);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    pub fn is_detached(&self) -> bool {
        self.detached_at.is_some()
    }

    /// Earliest pending timer, so a host knows when to call `tick` next.
    pub fn next_due(&self) -> Option<f64> {
        self.timers.next_due()
    }

    /// Offer one event to the attached features in order.
    ///
    /// # Errors
    /// Returns the first error a feature raises; later features do not see
    /// the event.
    pub fn dispatch<F>(
        &mut self,
        model: &mut GridModel,
        cursor: &mut CellCursor,
        now_ms: f64,
        mut call: F,
    ) -> Result<()>
    where
        F: FnMut(&mut dyn Feature, &mut FeatureContext<'_>) -> Result<Flow>,
    {
        let mut index = 0;
        while index < self.attached_len() {
            let Some(feature) = self.features.get_mut(index) else {
                break;
            };
            let mut control = ChainControl::default();
            let mut ctx = FeatureContext {
                model: &mut *model,
                cursor: &mut *cursor,
                timers: &mut self.timers,
                control: &mut control,
                index,
                now_ms,
            };
            let outcome = call(feature.as_mut(), &mut ctx);
            let name = feature.name();
            self.apply_control(control, index, now_ms);
            match outcome {
                Ok(Flow::Continue) => index += 1,
                Ok(Flow::Stop) => break,
                Err(err) => {
                    tracing::warn!(
                        target: "vgrid::pipeline",
                        feature = name,
                        error = %err,
                        "event aborted"
                    );
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Fire every timer due at `now_ms`.
    ///
    /// # Errors
    /// Returns the first error a timer callback raises. Remaining due timers
    /// are dropped for this tick.
    pub fn tick(&mut self, model: &mut GridModel, cursor: &mut CellCursor, now_ms: f64) -> Result<()> {
        for timer in self.timers.take_due(now_ms) {
            match timer.target {
                TimerTarget::Reattach => {
                    if self.reattach_token == Some(timer.token) {
                        tracing::debug!(target: "vgrid::pipeline", "reattached");
                        self.detached_at = None;
                        self.reattach_token = None;
                    } else {
                        tracing::trace!(target: "vgrid::pipeline", "stale reattach timer");
                    }
                }
                TimerTarget::Feature(index) => {
                    let Some(feature) = self.features.get_mut(index) else {
                        continue;
                    };
                    let mut control = ChainControl::default();
                    let mut ctx = FeatureContext {
                        model: &mut *model,
                        cursor: &mut *cursor,
                        timers: &mut self.timers,
                        control: &mut control,
                        index,
                        now_ms,
                    };
                    let outcome = feature.on_timer(&mut ctx, timer.token);
                    self.apply_control(control, index, now_ms);
                    outcome?;
                }
            }
        }
        Ok(())
    }

    /// First icon offered by an attached feature.
    pub fn cursor_icon(&self) -> CursorIcon {
        self.features
            .iter()
            .take(self.attached_len())
            .find_map(|f| f.cursor_icon())
            .unwrap_or_default()
    }

    fn attached_len(&self) -> usize {
        self.detached_at
            .map_or(self.features.len(), |i| (i + 1).min(self.features.len()))
    }

    fn apply_control(&mut self, control: ChainControl, index: usize, now_ms: f64) {
        if control.detach {
            tracing::debug!(target: "vgrid::pipeline", index, "detached");
            self.detached_at = Some(index);
            self.reattach_token = None;
        }
        if control.reattach_now {
            self.detached_at = None;
            self.reattach_token = None;
        }
        if let Some(delay) = control.reattach_after {
            self.reattach_token = Some(self.timers.schedule(TimerTarget::Reattach, now_ms + delay));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FEATURES;

    #[test]
    fn builds_default_order() {
        let p = Pipeline::from_names(DEFAULT_FEATURES).unwrap();
        assert_eq!(p.names(), DEFAULT_FEATURES);
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let err = Pipeline::from_names(&["on_hover", "spin"]).unwrap_err();
        assert!(matches!(err, GridError::InvalidArgument(msg) if msg.contains("spin")));
    }

    #[test]
    fn due_timers_come_out_in_order() {
        let mut q = TimerQueue::default();
        let late = q.schedule(TimerTarget::Reattach, 50.0);
        let early = q.schedule(TimerTarget::Feature(0), 10.0);
        q.schedule(TimerTarget::Feature(1), 99.0);
        let due: Vec<TimerToken> = q.take_due(60.0).iter().map(|t| t.token).collect();
        assert_eq!(due, vec![early, late]);
        assert_eq!(q.next_due(), Some(99.0));
    }
}
