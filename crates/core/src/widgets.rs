//! Index state for rotating widgets (hero slider, announcement ticker, gallery lightbox).

/// Wrap-around position over `len` items with an auto-advance pause flag.
///
/// An empty carousel is inert: every move is a no-op and `index` stays 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
    paused: bool,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            index: 0,
            paused: false,
        }
    }

    /// Carousel opened at `start` (e.g. the clicked gallery image). Out-of-range starts at 0.
    pub fn starting_at(len: usize, start: usize) -> Self {
        let mut carousel = Self::new(len);
        carousel.go_to(start);
        carousel
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }

    /// Jump to `index`; out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize) -> usize {
        if index < self.len {
            self.index = index;
        }
        self.index
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Auto-advance step. Does nothing while paused.
    pub fn tick(&mut self) -> usize {
        if self.paused {
            return self.index;
        }
        self.next()
    }
}
