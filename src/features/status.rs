use time::OffsetDateTime;

/// `HH:MM` clock shown in the mockups' status bars.
#[derive(Debug, Clone)]
pub struct StatusClock {
    text: String,
}

impl StatusClock {
    pub fn new() -> Self {
        Self {
            text: "10:42".to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Reads the wall clock. Returns true if the text changed.
    pub fn refresh(&mut self) -> bool {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        self.set(now)
    }

    pub fn set(&mut self, now: OffsetDateTime) -> bool {
        let text = format!("{:02}:{:02}", now.hour(), now.minute());
        if text == self.text {
            return false;
        }
        self.text = text;
        true
    }
}

impl Default for StatusClock {
    fn default() -> Self {
        Self::new()
    }
}
