/// Ordered text fragments with integer repeat counts.
///
/// Repetition lets a plain frequency counter downstream treat structurally
/// important fragments as more important.
#[derive(Debug, Default, Clone)]
pub struct WeightedText {
    fragments: Vec<(String, usize)>,
}

impl WeightedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment; blank fragments and zero weights are ignored
    pub fn push(&mut self, text: impl Into<String>, weight: usize) {
        let text = text.into();
        if weight == 0 || text.trim().is_empty() {
            return;
        }
        self.fragments.push((text, weight));
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Total number of fragment copies in the rendered blob
    pub fn copies(&self) -> usize {
        self.fragments.iter().map(|(_, weight)| weight).sum()
    }

    /// Join every fragment copy with single spaces
    pub fn render(&self) -> String {
        let mut copies = Vec::with_capacity(self.copies());
        for (text, weight) in &self.fragments {
            for _ in 0..*weight {
                copies.push(text.as_str());
            }
        }
        copies.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_repeats_by_weight() {
        let mut text = WeightedText::new();
        text.push("Laptop", 3);
        text.push("Fast", 2);
        text.push("   ", 5);
        text.push("Ignored", 0);

        assert_eq!(text.copies(), 5);
        assert_eq!(text.render(), "Laptop Laptop Laptop Fast Fast");
    }

    #[test]
    fn test_empty_render() {
        let text = WeightedText::new();
        assert!(text.is_empty());
        assert_eq!(text.render(), "");
    }
}
