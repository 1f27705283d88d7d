//! Font metrics for height estimation

use unicode_segmentation::UnicodeSegmentation;

/// Metrics needed for text layout
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Line height in logical pixels
    pub line_height: f32,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<f32>,
    /// Default width for non-ASCII characters
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // 14px * 1.2 = 16.8
        // 8.41px for monospace char
        let default_width = 8.41;
        Self {
            line_height: 16.8,
            char_widths: vec![default_width; 128],
            default_width,
        }
    }
}

impl FontMetrics {
    pub fn new(line_height: f32, char_widths: Vec<f32>, default_width: f32) -> Self {
        Self {
            line_height,
            char_widths,
            default_width,
        }
    }

    /// Get width of a character
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }

    /// Width of one grapheme cluster
    pub fn grapheme_width(&self, grapheme: &str) -> f32 {
        if grapheme == "\t" {
            self.default_width * 4.0
        } else if grapheme.chars().all(|c| c.is_control()) {
            0.0
        } else {
            // combining marks ride on their base character
            grapheme.chars().next().map(|c| self.width(c)).unwrap_or(0.0)
        }
    }

    /// Advance width of a run of text
    pub fn text_width(&self, text: &str) -> f32 {
        text.graphemes(true).map(|g| self.grapheme_width(g)).sum()
    }

    /// Same font at a different size
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            line_height: self.line_height * factor,
            char_widths: self.char_widths.iter().map(|w| w * factor).collect(),
            default_width: self.default_width * factor,
        }
    }
}
