//! Turns a ranked list into styled display lines.
//!
//! Pure presentation: the input is already sorted and ranked by the score
//! store. Colour follows the entity's rank, so tied entities share a colour.

use crate::config::DisplayConfig;
use crate::types::{Color, DisplayLine, RankedEntity};

/// Font size for every line.
pub const FONT_SIZE: u32 = 24;
/// World scale of the title line.
pub const TITLE_SCALE: f32 = 0.45;
/// World scale of ranked rows.
pub const ROW_SCALE: f32 = 0.35;

/// Builds display lines from ranked entities.
#[derive(Debug, Clone)]
pub struct ContentFormatter {
    title: String,
    top_count: usize,
}

impl ContentFormatter {
    /// Formatter with an explicit title and row limit.
    #[must_use]
    pub fn new(title: impl Into<String>, top_count: usize) -> Self {
        Self {
            title: title.into(),
            top_count,
        }
    }

    /// Formatter configured from `[display]`.
    #[must_use]
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.title_text.clone(), config.top_count)
    }

    /// Maximum number of ranked rows produced.
    #[must_use]
    pub fn top_count(&self) -> usize {
        self.top_count
    }

    /// Title line followed by up to `top_count` ranked rows.
    #[must_use]
    pub fn format(&self, ranked: &[RankedEntity]) -> Vec<DisplayLine> {
        let mut lines = Vec::with_capacity(1 + ranked.len().min(self.top_count));
        lines.push(DisplayLine {
            text: self.title.clone(),
            color: Color::Pink,
            font_size: FONT_SIZE,
            full_bright: true,
            scale: TITLE_SCALE,
        });

        lines.extend(ranked.iter().take(self.top_count).map(|entity| DisplayLine {
            text: format!("{}. {} - {} points", entity.rank, entity.name, entity.score),
            color: rank_color(entity.rank),
            font_size: FONT_SIZE,
            full_bright: true,
            scale: ROW_SCALE,
        }));

        lines
    }
}

/// Podium colours for ranks 1–3, white for the rest.
#[must_use]
pub fn rank_color(rank: u32) -> Color {
    match rank {
        1 => Color::Red,
        2 => Color::Orange,
        3 => Color::Yellow,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(rows: &[(&str, i64, u32)]) -> Vec<RankedEntity> {
        rows.iter()
            .map(|(name, score, rank)| RankedEntity::new(*name, *score, *rank))
            .collect()
    }

    #[test]
    fn empty_ranking_is_title_only() {
        let lines = ContentFormatter::new("Top", 5).format(&[]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Top");
        assert_eq!(lines[0].color, Color::Pink);
        assert!((lines[0].scale - TITLE_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn rows_are_truncated_to_top_count() {
        let input = ranked(&[("a", 50, 1), ("b", 40, 2), ("c", 30, 3), ("d", 20, 4)]);
        let lines = ContentFormatter::new("Top", 2).format(&input);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].text, "2. b - 40 points");
    }

    #[test]
    fn podium_colors_follow_rank() {
        let input = ranked(&[
            ("alice", 900, 1),
            ("bob", 900, 1),
            ("carol", 700, 2),
            ("dave", 500, 3),
            ("erin", 100, 4),
        ]);
        let lines = ContentFormatter::new("Top", 5).format(&input);
        let colors: Vec<Color> = lines.iter().skip(1).map(|l| l.color).collect();
        assert_eq!(
            colors,
            vec![Color::Red, Color::Red, Color::Orange, Color::Yellow, Color::White]
        );
        assert_eq!(lines[1].text, "1. alice - 900 points");
        assert_eq!(lines[2].text, "1. bob - 900 points");
        assert!(lines.iter().all(|l| l.full_bright && l.font_size == FONT_SIZE));
    }
}
