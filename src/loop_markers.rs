//! Loop region markers and their clamping rules.
//!
//! Marker assignments are total: out-of-range input is silently clamped
//! against the opposite marker and the file duration, never rejected.

use crate::timecode::{TimeCode, TimeField};

/// A start/end pair holding `start <= end <= duration` at all times.
///
/// Only constructible through clamping, so the invariant cannot be bypassed;
/// persistence stores the two markers as separate timecodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopRegion {
    start: TimeCode,
    end: TimeCode,
}

impl LoopRegion {
    /// Build a region, clamping both markers into a valid arrangement.
    pub fn clamped(start: TimeCode, end: TimeCode, duration: TimeCode) -> Self {
        let end = clamp_end(end, TimeCode::ZERO, duration);
        let start = clamp_start(start, end);
        Self { start, end }
    }

    /// The start marker.
    pub fn start(self) -> TimeCode {
        self.start
    }

    /// The end marker.
    pub fn end(self) -> TimeCode {
        self.end
    }
}

/// Clamp a proposed start marker into `[0, end]`.
pub fn clamp_start(proposed: TimeCode, end: TimeCode) -> TimeCode {
    proposed.min(end)
}

/// Clamp a proposed end marker into `[start, duration]`.
pub fn clamp_end(proposed: TimeCode, start: TimeCode, duration: TimeCode) -> TimeCode {
    proposed.min(duration).max(start)
}

/// Applies marker edits against the current region and file duration.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoopMarkerController {
    region: LoopRegion,
    duration: TimeCode,
}

impl LoopMarkerController {
    /// Start fresh for a file of the given duration.
    pub fn new(duration: TimeCode) -> Self {
        Self {
            region: LoopRegion::default(),
            duration,
        }
    }

    /// The current region.
    pub fn region(&self) -> LoopRegion {
        self.region
    }

    /// The file duration markers are clamped against.
    pub fn duration(&self) -> TimeCode {
        self.duration
    }

    /// Replace the whole region, clamping it to the current duration.
    pub fn set_region(&mut self, region: LoopRegion) -> LoopRegion {
        self.region = LoopRegion::clamped(region.start, region.end, self.duration);
        self.region
    }

    /// Change the file duration and re-clamp the region against it.
    pub fn set_duration(&mut self, duration: TimeCode) -> LoopRegion {
        self.duration = duration;
        self.region = LoopRegion::clamped(self.region.start, self.region.end, duration);
        self.region
    }

    /// Propose a new start marker; returns the applied (clamped) region.
    pub fn set_start(&mut self, proposed: TimeCode) -> LoopRegion {
        self.region.start = clamp_start(proposed, self.region.end);
        self.region
    }

    /// Propose a new end marker; returns the applied (clamped) region.
    pub fn set_end(&mut self, proposed: TimeCode) -> LoopRegion {
        self.region.end = clamp_end(proposed, self.region.start, self.duration);
        self.region
    }

    /// Edit a single field of the start marker with borrow/carry semantics.
    pub fn edit_start(&mut self, field: TimeField, raw: i64) -> LoopRegion {
        self.set_start(self.region.start.with_field(field, raw))
    }

    /// Edit a single field of the end marker with borrow/carry semantics.
    pub fn edit_end(&mut self, field: TimeField, raw: i64) -> LoopRegion {
        self.set_end(self.region.end.with_field(field, raw))
    }

    /// Move the start marker to the current play position.
    ///
    /// When the position sits past the end marker, the end marker is pulled
    /// up to the position first so the start assignment is not clamped away.
    pub fn mark_start_now(&mut self, position: TimeCode) -> LoopRegion {
        if position > self.region.end {
            self.set_end(position);
        }
        self.set_start(position)
    }

    /// Move the end marker to the current play position.
    pub fn mark_end_now(&mut self, position: TimeCode) -> LoopRegion {
        self.set_end(position)
    }
}
