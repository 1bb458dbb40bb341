//! Text metrics used to size committed text boxes.

use crate::config::EngineConfig;

/// Measures rendered text. Hosts with a real font stack supply their own.
pub trait TextMeasure {
    /// Advance width of `text` in world units.
    fn width(&self, text: &str) -> f64;

    /// Height of one line in world units.
    fn line_height(&self) -> f64;
}

/// Fixed-advance metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub char_width: f64,
    pub line_height: f64,
}

impl MonospaceMetrics {
    pub fn new(char_width: f64, line_height: f64) -> Self {
        Self {
            char_width,
            line_height,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.text_char_width, config.text_line_height)
    }
}

impl TextMeasure for MonospaceMetrics {
    fn width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_width
    }

    fn line_height(&self) -> f64 {
        self.line_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_counts_chars_not_bytes() {
        let metrics = MonospaceMetrics::new(10.0, 24.0);
        assert!((metrics.width("héllo") - 50.0).abs() < f64::EPSILON);
    }
}
