//! Plain-text outline of a generated deck.
//!
//! One block per position, separated by blank lines. Gaps are listed in
//! place so the outline always has one block per position.

use crate::types::{Presentation, Slide, SlideContent, SlideGap};

/// Formatter for human-readable deck outlines.
#[derive(Debug, Clone)]
pub struct OutlineFormatter {
    /// Whether to list the generator that produced each slide.
    show_generators: bool,
}

impl Default for OutlineFormatter {
    fn default() -> Self {
        Self {
            show_generators: true,
        }
    }
}

impl OutlineFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generators(mut self, show: bool) -> Self {
        self.show_generators = show;
        self
    }

    /// Format the whole deck.
    ///
    /// # Example output
    /// ```text
    /// Cat
    /// by Ada Lovelace
    ///
    /// 1. [title] The Secret Life Of Cat
    ///    A Talk About Whiskers
    ///
    /// 2. (no slide; tried Inspirobot)
    /// ```
    pub fn format(&self, presentation: &Presentation) -> String {
        let mut blocks = vec![format!("{}\nby {}", presentation.topic, presentation.presenter)];

        let mut slides = presentation.slides.iter().peekable();
        let mut gaps = presentation.gaps.iter().peekable();
        for index in 0..presentation.positions() {
            if slides.peek().is_some_and(|s| s.index == index) {
                if let Some(slide) = slides.next() {
                    blocks.push(self.format_slide(slide));
                }
            } else if gaps.peek().is_some_and(|g| g.index == index) {
                if let Some(gap) = gaps.next() {
                    blocks.push(format_gap(gap));
                }
            }
        }

        blocks.join("\n\n")
    }

    /// Format and add a trailing newline.
    pub fn format_with_newline(&self, presentation: &Presentation) -> String {
        format!("{}\n", self.format(presentation))
    }

    fn format_slide(&self, slide: &Slide) -> String {
        let mut heading = format!("{}. [{}]", slide.index + 1, slide.layout.as_str());
        if let Some(title) = &slide.title {
            heading.push(' ');
            heading.push_str(title);
        }
        if self.show_generators && !slide.generator.is_empty() {
            heading.push_str(&format!(" ({})", slide.generator));
        }

        let mut lines = vec![heading];
        if let Some(subtitle) = &slide.subtitle {
            lines.push(format!("   {}", subtitle));
        }
        for column in &slide.columns {
            let content = match &column.content {
                Some(SlideContent::Text(text)) => format!("\"{}\"", text),
                Some(SlideContent::Image(path)) => path.display().to_string(),
                None => "-".to_string(),
            };
            match &column.caption {
                Some(caption) => lines.push(format!("   - {}: {}", caption, content)),
                None => lines.push(format!("   - {}", content)),
            }
        }

        lines.join("\n")
    }
}

fn format_gap(gap: &SlideGap) -> String {
    if gap.attempted.is_empty() {
        format!("{}. (no slide)", gap.index + 1)
    } else {
        format!("{}. (no slide; tried {})", gap.index + 1, gap.attempted.join(", "))
    }
}
