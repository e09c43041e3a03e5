//! Reconciles the engine-driven play position with user scrubbing.
//!
//! Two writers race over the visible position: the engine pulses while
//! playing, and the user edits the numeric fields or drags the indicator.
//! Every user edit opens a short mask-out window for the category it touched;
//! engine updates to that category are dropped until the window expires, so a
//! fresh edit is never clobbered by a stale echo. A drag in progress masks
//! the indicator continuously.
//!
//! The engine's position pulse carries no payload; it only sets the
//! "update needed" latch. The tick consumes the latch, re-reads the engine
//! and refreshes whatever categories are unmasked. The latch is the single
//! field shared with the engine's notification path and sits behind its own
//! mutex; everything else here is touched only from the UI-affine context.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::engine::{EngineStatus, PracticeEngine};
use crate::timecode::TimeCode;

/// How long engine echoes are suppressed after a user edit.
pub const MASK_OUT_WINDOW: Duration = Duration::from_millis(500);

/// Cloneable handle the engine event pump uses to request a refresh.
#[derive(Clone, Default)]
pub struct PositionPulse(Arc<Mutex<bool>>);

impl PositionPulse {
    /// Mark that a position pulse arrived. Bursts coalesce into one refresh.
    pub fn pulse(&self) {
        if let Ok(mut needed) = self.0.lock() {
            *needed = true;
        }
    }

    fn consume(&self) -> bool {
        match self.0.lock() {
            Ok(mut needed) => std::mem::replace(&mut *needed, false),
            Err(_) => false,
        }
    }
}

/// The position state the UI renders from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionDisplay {
    /// Value shown in the numeric minute/second/millisecond fields.
    pub numeric: TimeCode,
    /// Indicator position as a fraction of the file duration.
    pub indicator: f32,
    /// Whether the indicator is shown at all.
    pub indicator_visible: bool,
}

/// Gates engine-driven position updates against user-edit mask windows.
pub struct PlayPositionSynchronizer {
    pulse: PositionPulse,
    numeric_mask_until: Option<Instant>,
    indicator_mask_until: Option<Instant>,
    dragging: bool,
    display: PositionDisplay,
}

impl Default for PlayPositionSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayPositionSynchronizer {
    /// A synchronizer with no pending pulse and no masks.
    pub fn new() -> Self {
        Self {
            pulse: PositionPulse::default(),
            numeric_mask_until: None,
            indicator_mask_until: None,
            dragging: false,
            display: PositionDisplay::default(),
        }
    }

    /// Handle for the engine event pump to request refreshes with.
    pub fn pulse_handle(&self) -> PositionPulse {
        self.pulse.clone()
    }

    /// What the UI should currently show.
    pub fn display(&self) -> PositionDisplay {
        self.display
    }

    /// Whether an indicator drag gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Record a user edit of the numeric fields.
    ///
    /// The edited value takes effect visually at once and engine echoes to
    /// the numeric fields are masked for [`MASK_OUT_WINDOW`].
    pub fn note_numeric_edit(&mut self, position: TimeCode) {
        self.note_numeric_edit_at(Instant::now(), position);
    }

    pub(crate) fn note_numeric_edit_at(&mut self, now: Instant, position: TimeCode) {
        self.numeric_mask_until = Some(now + MASK_OUT_WINDOW);
        self.display.numeric = position;
    }

    /// Record a user seek through the indicator (click, not drag).
    pub fn note_indicator_edit(&mut self, fraction: f32) {
        self.note_indicator_edit_at(Instant::now(), fraction);
    }

    pub(crate) fn note_indicator_edit_at(&mut self, now: Instant, fraction: f32) {
        self.indicator_mask_until = Some(now + MASK_OUT_WINDOW);
        self.display.indicator = fraction.clamp(0.0, 1.0);
        self.display.indicator_visible = true;
    }

    /// Begin an indicator drag; engine updates to the indicator are
    /// suppressed entirely until the gesture ends.
    pub fn begin_indicator_drag(&mut self) {
        self.dragging = true;
    }

    /// Move the in-progress drag; the dragged value is authoritative.
    pub fn drag_indicator_to(&mut self, fraction: f32) {
        if self.dragging {
            self.display.indicator = fraction.clamp(0.0, 1.0);
            self.display.indicator_visible = true;
        }
    }

    /// Finish the drag and open a mask window against the next stale echo.
    pub fn end_indicator_drag(&mut self) {
        self.end_indicator_drag_at(Instant::now());
    }

    pub(crate) fn end_indicator_drag_at(&mut self, now: Instant) {
        if self.dragging {
            self.dragging = false;
            self.indicator_mask_until = Some(now + MASK_OUT_WINDOW);
        }
    }

    /// Consume a pending pulse and refresh unmasked categories.
    ///
    /// Bounded work: at most one numeric refresh and one indicator refresh.
    /// Returns whether anything was consumed.
    pub fn tick<E: PracticeEngine>(&mut self, engine: &E) -> bool {
        self.tick_at(Instant::now(), engine)
    }

    pub(crate) fn tick_at<E: PracticeEngine>(&mut self, now: Instant, engine: &E) -> bool {
        // Only the engine drives the display while playing; otherwise the
        // pending pulse stays latched and the tick stays cheap.
        if engine.status() != EngineStatus::Playing {
            return false;
        }
        if !self.pulse.consume() {
            return false;
        }
        let position = engine.current_play_time();
        if mask_expired(self.numeric_mask_until, now) {
            self.display.numeric = position;
        }
        if !self.dragging && mask_expired(self.indicator_mask_until, now) {
            self.display.indicator = position.fraction_of(engine.file_play_duration());
            self.display.indicator_visible = true;
        }
        true
    }

    /// Drop any visible indicator, e.g. when playback halts on an error.
    pub fn hide_indicator(&mut self) {
        self.display.indicator_visible = false;
    }
}

fn mask_expired(mask_until: Option<Instant>, now: Instant) -> bool {
    mask_until.is_none_or(|until| now > until)
}
