//! Summary renderer: turn ordered sections into titled blocks of points.
//!
//! Rendering is pure. Each section becomes exactly one [`RenderedBlock`]
//! keyed by the section id, with its points in their original order.
//! Entrance animation is reduced to a stagger schedule the caller may honour
//! (the CLI sleeps between blocks) or ignore.

use crate::output::SummarySection;
use std::fmt::Write as _;
use std::time::Duration;

/// Default delay between successive sections appearing.
pub const SECTION_STAGGER: Duration = Duration::from_millis(200);

/// One titled block ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    /// Stable key: the section id.
    pub key: i64,
    pub title: String,
    pub points: Vec<String>,
}

impl RenderedBlock {
    /// Plain-text form: the title, then one `•` bullet per point.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        for point in &self.points {
            let _ = writeln!(out, "  • {point}");
        }
        out
    }

    /// Markdown form: a `##` heading followed by a bullet list.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "## {}\n", self.title);
        for point in &self.points {
            let _ = writeln!(out, "- {point}");
        }
        out
    }
}

/// One block per section, in input order.
pub fn render_blocks(sections: &[SummarySection]) -> Vec<RenderedBlock> {
    sections
        .iter()
        .map(|s| RenderedBlock {
            key: s.id,
            title: s.title.clone(),
            points: s.points.clone(),
        })
        .collect()
}

/// All blocks as plain text separated by blank lines.
pub fn render_text(sections: &[SummarySection]) -> String {
    join_blocks(sections, RenderedBlock::to_text)
}

/// All blocks as a Markdown document.
pub fn render_markdown(sections: &[SummarySection]) -> String {
    join_blocks(sections, RenderedBlock::to_markdown)
}

fn join_blocks(sections: &[SummarySection], f: fn(&RenderedBlock) -> String) -> String {
    render_blocks(sections)
        .iter()
        .map(f)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Entrance delay of each block, measured from when rendering starts.
pub fn stagger_schedule(blocks: usize, step: Duration) -> Vec<Duration> {
    (0..blocks as u32).map(|i| step * i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: i64, title: &str, points: &[&str]) -> SummarySection {
        SummarySection {
            id,
            title: title.into(),
            points: points.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn one_block_per_section_keyed_by_id() {
        let sections = vec![
            section(0, "Overview", &["intro"]),
            section(1, "Methods", &["a", "b", "c"]),
            section(2, "Results", &[]),
        ];
        let blocks = render_blocks(&sections);
        assert_eq!(blocks.len(), 3);
        let keys: Vec<i64> = blocks.iter().map(|b| b.key).collect();
        assert_eq!(keys, vec![0, 1, 2]);
        assert_eq!(blocks[1].points, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_summary_renders_nothing() {
        assert!(render_blocks(&[]).is_empty());
        assert_eq!(render_text(&[]), "");
    }

    #[test]
    fn text_lists_points_in_order() {
        let text = render_text(&[section(1, "A", &["first", "second"])]);
        assert_eq!(text, "A\n  • first\n  • second\n");
    }

    #[test]
    fn markdown_form() {
        let md = render_markdown(&[section(1, "A", &["x"]), section(2, "B", &["y"])]);
        assert_eq!(md, "## A\n\n- x\n\n## B\n\n- y\n");
    }

    #[test]
    fn stagger_is_linear() {
        let s = stagger_schedule(3, SECTION_STAGGER);
        assert_eq!(
            s,
            vec![
                Duration::ZERO,
                Duration::from_millis(200),
                Duration::from_millis(400)
            ]
        );
        assert!(stagger_schedule(0, SECTION_STAGGER).is_empty());
    }
}
