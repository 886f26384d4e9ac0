//! Scroll state for the detail pane.

use std::ops::Range;

/// The visible window over a rendered note.
///
/// The offset always stays within `[0, content - height]`.
///
/// # Example
///
/// ```
/// use notecase::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(24, 100);
/// vp.scroll_by(10);
/// assert_eq!(vp.visible_range(), 10..34);
/// vp.scroll_by(-50);
/// assert_eq!(vp.offset(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    height: u16,
    offset: usize,
    content_height: usize,
}

impl Viewport {
    pub const fn new(height: u16, content_height: usize) -> Self {
        Self {
            height,
            offset: 0,
            content_height,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn content_height(&self) -> usize {
        self.content_height
    }

    /// Lines currently on screen, clamped to the content.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + self.height as usize).min(self.content_height);
        self.offset.min(end)..end
    }

    /// Scroll position as a percentage, 100 when everything fits.
    pub fn scroll_percent(&self) -> u8 {
        let max = self.max_offset();
        if max == 0 {
            return 100;
        }
        let percent = self.offset.saturating_mul(100) / max;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    /// Move by `delta` lines, negative meaning up.
    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta.unsigned_abs())
        };
        self.offset = target.min(self.max_offset());
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-self.page());
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.page());
    }

    pub fn half_page_up(&mut self) {
        self.scroll_by(-(self.page() / 2));
    }

    pub fn half_page_down(&mut self) {
        self.scroll_by(self.page() / 2);
    }

    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    pub const fn go_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    pub fn resize(&mut self, height: u16) {
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    /// Replace the content length, e.g. after re-rendering at a new width.
    pub fn set_content_height(&mut self, content_height: usize) {
        self.content_height = content_height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub const fn max_offset(&self) -> usize {
        self.content_height.saturating_sub(self.height as usize)
    }

    fn page(&self) -> isize {
        isize::try_from(self.height).unwrap_or(isize::MAX)
    }
}
