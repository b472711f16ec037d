//! Navigation-state boundary handed to the session instead of ambient location globals.

use url::Url;

use crate::controller::VisitOptions;

pub trait NavigationBoundary: Send {
    fn location(&self) -> &Url;
    fn visit(&mut self, url: Url, options: VisitOptions);
}

/// In-memory history stack with a scroll offset for the current entry.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    back: Vec<Url>,
    current: Url,
    scroll_offset: u32,
}

impl MemoryHistory {
    pub fn new(location: Url) -> Self {
        Self {
            back: Vec::new(),
            current: location,
            scroll_offset: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.back.len() + 1
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }
}

impl NavigationBoundary for MemoryHistory {
    fn location(&self) -> &Url {
        &self.current
    }

    fn visit(&mut self, url: Url, options: VisitOptions) {
        let previous = std::mem::replace(&mut self.current, url);
        if !options.replace {
            self.back.push(previous);
        }
        if !options.preserve_scroll {
            self.scroll_offset = 0;
        }
    }
}
