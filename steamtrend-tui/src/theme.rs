//! Neon-on-charcoal theme tokens for the tier viewer.
//!
//! # Color Palette
//! - **Background**: deep charcoal
//! - **Accent**: electric cyan (focused chart border, titles)
//! - **Muted**: steel blue (axes, hints)
//! - **Series**: eight high-contrast line colors, cycled per column

use ratatui::style::{Color, Modifier, Style};

const SERIES: [Color; 8] = [
    Color::Rgb(0, 255, 255),
    Color::Rgb(255, 20, 147),
    Color::Rgb(0, 255, 128),
    Color::Rgb(255, 140, 0),
    Color::Rgb(147, 112, 219),
    Color::Rgb(255, 255, 0),
    Color::Rgb(30, 144, 255),
    Color::Rgb(255, 99, 71),
];

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Deep charcoal background.
    pub background: Color,
    /// Electric cyan accent.
    pub accent: Color,
    /// Neon orange, for empty-tier notices.
    pub warning: Color,
    /// Steel blue axes and hints.
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            warning: Color::Rgb(255, 140, 0),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Line color for the `index`-th series of a chart.
    pub fn series_color(&self, index: usize) -> Color {
        SERIES[index % SERIES.len()]
    }

    pub fn axis(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn axis_title(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.muted)
        }
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }
}
