//! Sprite-sheet layout & frame timing
//!
//! A [`SheetLayout`] describes where the frames of one animation live inside a
//! shared atlas. An [`AnimationState`] walks those frames on a wall-clock timer.

use std::time::Instant;

use glam::{UVec2, Vec2, uvec2, vec2};

/// Grid of animation frames packed into an atlas
///
/// Frames are laid out row by row starting at the top-left of the atlas, or at
/// `offset` pixels from it. The last row may be partial, in which case
/// `total_frames` is less than `columns * rows`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SheetLayout {
    atlas_size: UVec2,
    frame_size: UVec2,
    columns: u32,
    rows: u32,
    total_frames: u32,
    offset: UVec2,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            atlas_size: uvec2(256, 256),
            frame_size: uvec2(256, 256),
            columns: 1,
            rows: 1,
            total_frames: 1,
            offset: UVec2::ZERO,
        }
    }
}

impl SheetLayout {
    /// Creates a layout anchored at the atlas top-left corner
    ///
    /// Degenerate grids are clamped: every count & size is at least 1 and
    /// `total_frames` never exceeds `columns * rows`. The frame geometry is not
    /// checked against the real atlas image.
    pub fn new(
        atlas_size: UVec2,
        frame_size: UVec2,
        columns: u32,
        rows: u32,
        total_frames: u32,
    ) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let capacity = columns.saturating_mul(rows);
        let clamped_total = total_frames.clamp(1, capacity);
        if clamped_total != total_frames {
            log::warn!(
                "sheet of {columns}x{rows} cells cannot hold {total_frames} frames, using {clamped_total}"
            );
        }

        Self {
            atlas_size: atlas_size.max(UVec2::ONE),
            frame_size: frame_size.max(UVec2::ONE),
            columns,
            rows,
            total_frames: clamped_total,
            offset: UVec2::ZERO,
        }
    }

    /// Moves the first frame's top-left corner to `offset` pixels into the atlas
    pub fn with_offset(mut self, offset: UVec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn atlas_size(&self) -> UVec2 {
        self.atlas_size
    }

    pub fn frame_size(&self) -> UVec2 {
        self.frame_size
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn offset(&self) -> UVec2 {
        self.offset
    }

    /// Grid cell `(row, column)` holding the given linear frame
    pub fn cell(&self, frame: u32) -> (u32, u32) {
        (frame / self.columns, frame % self.columns)
    }

    /// Fraction of the atlas covered by the whole frame grid
    pub fn sub_range(&self) -> Vec2 {
        // float math; oversized grids only give odd coordinates
        let grid = self.frame_size.as_vec2() * uvec2(self.columns, self.rows).as_vec2();
        grid / self.atlas_size.as_vec2()
    }

    /// Fraction of the atlas covered by a single frame
    pub fn cell_size(&self) -> Vec2 {
        self.sub_range() / uvec2(self.columns, self.rows).as_vec2()
    }

    /// Texture coordinates of the four corners of a frame
    ///
    /// Uses a bottom-left texture origin, so row 0 sits at the top of the atlas
    /// (`v` close to 1.0).
    pub fn frame_uv(&self, frame: u32) -> FrameUv {
        let (row, column) = self.cell(frame);
        let cell = self.cell_size();

        let left = column as f32 * cell.x;
        let right = left + cell.x;
        let top = 1.0 - row as f32 * cell.y;
        let bottom = top - cell.y;

        let uv = FrameUv {
            lower_left: vec2(left, bottom),
            lower_right: vec2(right, bottom),
            upper_right: vec2(right, top),
            upper_left: vec2(left, top),
        };

        if self.offset == UVec2::ZERO {
            uv
        } else {
            // pixel offsets grow downwards while `v` grows upwards
            let shift = self.offset.as_vec2() / self.atlas_size.as_vec2();
            uv.translate(vec2(shift.x, -shift.y))
        }
    }
}

/// Corner texture coordinates of one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUv {
    pub lower_left: Vec2,
    pub lower_right: Vec2,
    pub upper_right: Vec2,
    pub upper_left: Vec2,
}

impl FrameUv {
    /// Corners in triangle-fan order: lower-left, lower-right, upper-right, upper-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.lower_left,
            self.lower_right,
            self.upper_right,
            self.upper_left,
        ]
    }

    fn translate(self, delta: Vec2) -> Self {
        Self {
            lower_left: self.lower_left + delta,
            lower_right: self.lower_right + delta,
            upper_right: self.upper_right + delta,
            upper_left: self.upper_left + delta,
        }
    }
}

/// Playback position of one sprite
///
/// The linear frame index is the only stored position; row & column are
/// derived from it through the [`SheetLayout`] so they can never disagree.
#[derive(Clone, Debug, Default)]
pub struct AnimationState {
    frame: u32,
    frame_delay: f32,
    last_advance: Option<Instant>,
}

impl AnimationState {
    /// Current linear frame, `0 <= frame < total_frames`
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Minimum time in seconds a frame is held before advancing
    pub fn frame_delay(&self) -> f32 {
        self.frame_delay
    }

    /// Zero or negative delays advance on every tick
    pub fn set_frame_delay(&mut self, seconds: f32) {
        self.frame_delay = seconds;
    }

    /// Jumps back to the first frame & forgets the timing baseline
    pub fn rewind(&mut self) {
        self.frame = 0;
        self.last_advance = None;
    }

    /// Steps one frame forward, wrapping to 0 after the last one
    pub fn advance(&mut self, layout: &SheetLayout) {
        self.frame = (self.frame + 1) % layout.total_frames();
    }

    /// Seconds since the last advance at millisecond resolution
    ///
    /// The first call establishes the baseline & reports zero.
    fn elapsed(&mut self, now: Instant) -> f32 {
        let last = *self.last_advance.get_or_insert(now);
        now.saturating_duration_since(last).as_millis() as f32 / 1000.0
    }

    /// Advances at most one frame if the delay has passed, returning whether it did
    ///
    /// Overshooting the delay never skips frames: a late tick still moves by one.
    pub fn tick(&mut self, now: Instant, layout: &SheetLayout) -> bool {
        if self.elapsed(now) < self.frame_delay {
            return false;
        }

        self.last_advance = Some(now);
        self.advance(layout);
        true
    }
}
