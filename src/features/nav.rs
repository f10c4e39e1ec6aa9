use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct NavSection {
    pub id: String,
    pub label: String,
    pub top: f32,
    pub height: f32,
}

/// Tracks which labelled section sits under the middle of the viewport.
#[derive(Debug, Clone)]
pub struct SectionNav {
    sections: Vec<NavSection>,
    active: usize,
}

impl SectionNav {
    pub fn new(sections: Vec<NavSection>) -> Self {
        Self { sections, active: 0 }
    }

    pub fn sections(&self) -> &[NavSection] {
        &self.sections
    }

    pub fn active(&self) -> Option<&NavSection> {
        self.sections.get(self.active)
    }

    /// Re-evaluates after a scroll. Returns the new section id if the
    /// active section changed. Outside every section the last one sticks.
    pub fn update(&mut self, scroll_y: f32, viewport: f32) -> Option<&str> {
        let midline = scroll_y + viewport / 2.0;
        let hit = self
            .sections
            .iter()
            .rposition(|s| midline >= s.top && midline < s.top + s.height)?;
        if hit == self.active {
            return None;
        }
        self.active = hit;
        let id = self.sections[hit].id.as_str();
        debug!("nav: active section is now {id:?}");
        Some(id)
    }

    /// Scroll offset that brings a section's top to the top of the viewport.
    pub fn scroll_target(&self, id: &str) -> Option<f32> {
        self.sections.iter().find(|s| s.id == id).map(|s| s.top)
    }
}
