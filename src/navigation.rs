//! Thumbnail strip position model.
//!
//! Tracks the active image index over the ordered image sequence and the
//! horizontal scroll offset of the strip. Supports discrete stepping,
//! direct jumps, and a continuous 0..=1 position control.

/// Step direction for keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Position and scroll state of the thumbnail strip.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailStrip {
    /// Number of images
    len: usize,
    /// Active image index (0 when empty)
    active: usize,
    /// Width of one thumbnail slot
    thumb_extent: f32,
    /// Visible width of the strip
    viewport_extent: f32,
    /// Current scroll offset from the strip start
    scroll_offset: f32,
}

impl ThumbnailStrip {
    /// Create an empty strip.
    pub fn new(thumb_extent: f32, viewport_extent: f32) -> Self {
        Self {
            len: 0,
            active: 0,
            thumb_extent: thumb_extent.max(1.0),
            viewport_extent: viewport_extent.max(0.0),
            scroll_offset: 0.0,
        }
    }

    /// Replace the sequence length; the active index is clamped.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.active = self.active.min(len.saturating_sub(1));
        self.scroll_into_view();
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if there are no images.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Active index, or None when empty.
    pub fn active(&self) -> Option<usize> {
        (self.len > 0).then_some(self.active)
    }

    /// Step one image; stops at both ends. Returns true if the index changed.
    pub fn step(&mut self, direction: Direction) -> bool {
        if self.len == 0 {
            return false;
        }
        let target = match direction {
            Direction::Previous => self.active.saturating_sub(1),
            Direction::Next => (self.active + 1).min(self.len - 1),
        };
        self.jump_to(target)
    }

    /// Jump to an index. Out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.len || index == self.active {
            return false;
        }
        self.active = index;
        self.scroll_into_view();
        true
    }

    /// Move to the image nearest a 0..=1 position. Non-finite input is ignored.
    pub fn scrub_to(&mut self, fraction: f32) -> bool {
        if self.len == 0 || !fraction.is_finite() {
            return false;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let index = (fraction * (self.len - 1) as f32).round() as usize;
        self.jump_to(index)
    }

    /// Active index as a 0..=1 position.
    pub fn position(&self) -> f32 {
        if self.len <= 1 {
            0.0
        } else {
            self.active as f32 / (self.len - 1) as f32
        }
    }

    /// Width of one thumbnail slot.
    pub fn thumb_extent(&self) -> f32 {
        self.thumb_extent
    }

    /// Total width of all thumbnails.
    pub fn content_extent(&self) -> f32 {
        self.len as f32 * self.thumb_extent
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Update the visible width, keeping the active thumbnail visible.
    pub fn set_viewport(&mut self, extent: f32) {
        self.viewport_extent = extent.max(0.0);
        self.scroll_into_view();
    }

    /// Scroll the minimum amount needed to show the active thumbnail.
    /// Returns the new offset.
    pub fn scroll_into_view(&mut self) -> f32 {
        let max_offset = (self.content_extent() - self.viewport_extent).max(0.0);

        if self.len > 0 {
            let start = self.active as f32 * self.thumb_extent;
            let end = start + self.thumb_extent;

            if start < self.scroll_offset {
                self.scroll_offset = start;
            } else if end > self.scroll_offset + self.viewport_extent {
                self.scroll_offset = end - self.viewport_extent;
            }
        }

        self.scroll_offset = self.scroll_offset.clamp(0.0, max_offset);
        self.scroll_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(len: usize) -> ThumbnailStrip {
        let mut s = ThumbnailStrip::new(100.0, 300.0);
        s.set_len(len);
        s
    }

    #[test]
    fn test_empty_strip() {
        let mut s = strip(0);
        assert_eq!(s.active(), None);
        assert!(!s.step(Direction::Next));
        assert!(!s.scrub_to(0.5));
        assert_eq!(s.position(), 0.0);
        assert_eq!(s.scroll_offset(), 0.0);
    }

    #[test]
    fn test_step_clamps_at_ends() {
        let mut s = strip(3);
        assert!(!s.step(Direction::Previous));
        assert!(s.step(Direction::Next));
        assert!(s.step(Direction::Next));
        assert_eq!(s.active(), Some(2));
        assert!(!s.step(Direction::Next));
        assert!(s.step(Direction::Previous));
        assert_eq!(s.active(), Some(1));
    }

    #[test]
    fn test_scrub_maps_fraction_to_nearest_index() {
        let mut s = strip(11);
        assert!(s.scrub_to(0.5));
        assert_eq!(s.active(), Some(5));
        assert!(s.scrub_to(1.7));
        assert_eq!(s.active(), Some(10));
        assert!(s.scrub_to(-3.0));
        assert_eq!(s.active(), Some(0));
        assert!(!s.scrub_to(f32::NAN));
        assert_eq!(s.active(), Some(0));
    }

    #[test]
    fn test_position_roundtrip() {
        let mut s = strip(5);
        s.jump_to(3);
        assert_eq!(s.position(), 0.75);
        let mut other = strip(5);
        other.scrub_to(s.position());
        assert_eq!(other.active(), Some(3));
    }

    #[test]
    fn test_jump_out_of_range_ignored() {
        let mut s = strip(2);
        assert!(!s.jump_to(7));
        assert_eq!(s.active(), Some(0));
    }

    #[test]
    fn test_scroll_into_view() {
        let mut s = strip(10);
        // Viewport shows slots 0..3
        s.jump_to(5);
        // Slot 5 spans 500..600, so the viewport must end at 600
        assert_eq!(s.scroll_offset(), 300.0);

        s.jump_to(4);
        // Still visible, no scroll
        assert_eq!(s.scroll_offset(), 300.0);

        s.jump_to(1);
        assert_eq!(s.scroll_offset(), 100.0);

        s.jump_to(9);
        assert_eq!(s.scroll_offset(), 700.0);
    }

    #[test]
    fn test_viewport_wider_than_content() {
        let mut s = strip(2);
        s.set_viewport(1000.0);
        s.jump_to(1);
        assert_eq!(s.scroll_offset(), 0.0);
    }

    #[test]
    fn test_shrinking_len_clamps_active() {
        let mut s = strip(10);
        s.jump_to(9);
        s.set_len(4);
        assert_eq!(s.active(), Some(3));
    }
}
