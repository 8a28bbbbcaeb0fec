//! Theme configuration and colors.
//!
//! Palettes come from the `ratatui-themes` crate; `ThemeColors` layers the
//! styles the screens need (likes, bookmarks, form inputs) on top.

use ratatui::style::{Color, Modifier, Style};
use ratatui_themes::{ThemeName, ThemePalette};
use serde::{Deserialize, Serialize};

/// Theme wrapper around `ThemeName` from ratatui-themes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme(pub ThemeName);

impl Theme {
    /// Get all available theme names.
    #[must_use]
    pub const fn all() -> &'static [ThemeName] {
        ThemeName::all()
    }

    /// Get the next theme in rotation
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0.next())
    }

    /// Get the display name for the theme.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.0.display_name()
    }

    /// Get the color palette for this theme
    #[must_use]
    pub fn colors(&self) -> ThemeColors {
        ThemeColors::from_palette(self.0.palette())
    }

    /// Get the inner `ThemeName`
    #[must_use]
    pub const fn inner(&self) -> ThemeName {
        self.0
    }

    /// Get the kebab-case slug for config files
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        self.0.slug()
    }

    /// Find a theme by slug or display name
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim().to_lowercase();
        Self::all()
            .iter()
            .find(|t| t.slug() == slug || t.display_name().to_lowercase() == slug)
            .map(|t| Self(*t))
    }
}

impl From<ThemeName> for Theme {
    fn from(name: ThemeName) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Colors and styles the screens draw with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    /// Screen background
    pub bg: Color,
    /// Status bar and popup background
    pub bg_secondary: Color,
    /// Background of the focused input field
    pub bg_input: Color,
    /// Body text
    pub fg: Color,
    /// Timestamps, hints and placeholders
    pub muted: Color,
    /// Titles, author names and focused borders
    pub primary: Color,
    /// Tags, key hints and status messages
    pub secondary: Color,
    /// Failed requests and destructive confirms
    pub error: Color,
    /// Confirm dialogs
    pub warning: Color,
    /// Informational markers
    pub info: Color,
    /// Unfocused borders
    pub border: Color,
    /// Selected list row
    pub selection: Color,
    /// Liked heart
    pub like: Color,
    /// Bookmark marker
    pub bookmark: Color,
}

/// Heart color shared by every theme
const LIKE_PINK: Color = Color::Rgb(236, 72, 153);

/// Lighten an RGB color by `amount` per channel; named colors pass through
fn lighten(color: Color, amount: u8) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            r.saturating_add(amount),
            g.saturating_add(amount),
            b.saturating_add(amount),
        ),
        other => other,
    }
}

impl ThemeColors {
    /// Derive screen colors from a `ThemePalette`
    #[must_use]
    pub fn from_palette(p: ThemePalette) -> Self {
        Self {
            bg: p.bg,
            bg_secondary: lighten(p.bg, 10),
            bg_input: lighten(p.bg, 20),
            fg: p.fg,
            muted: p.muted,
            primary: p.accent,
            secondary: p.secondary,
            error: p.error,
            warning: p.warning,
            info: p.info,
            border: p.muted,
            selection: p.selection,
            like: LIKE_PINK,
            bookmark: p.warning,
        }
    }

    /// Body text
    #[must_use]
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Secondary text (bios, descriptions)
    #[must_use]
    pub fn text_dim(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::DIM)
    }

    /// Timestamps, placeholders and hint labels
    #[must_use]
    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Titles and author names
    #[must_use]
    pub fn heading(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Tags and status messages
    #[must_use]
    pub fn accent(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    /// Semantic foreground for errors, warnings and info markers
    #[must_use]
    pub fn tone(&self, color: Color) -> Style {
        Style::default().fg(color)
    }

    /// Panel border, highlighted when the panel has focus
    #[must_use]
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.primary } else { self.border })
    }

    /// Selected list row
    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Header tab
    #[must_use]
    pub fn tab(&self, active: bool) -> Style {
        if active {
            self.heading().add_modifier(Modifier::BOLD)
        } else {
            self.text_muted()
        }
    }

    /// Keyboard shortcut in a hint line
    #[must_use]
    pub fn key_hint(&self) -> Style {
        self.accent().add_modifier(Modifier::BOLD)
    }

    /// Like counter
    #[must_use]
    pub fn like(&self, liked: bool) -> Style {
        if liked {
            Style::default().fg(self.like).add_modifier(Modifier::BOLD)
        } else {
            self.text_muted()
        }
    }

    /// Bookmark marker
    #[must_use]
    pub fn bookmark(&self, bookmarked: bool) -> Style {
        if bookmarked {
            Style::default().fg(self.bookmark)
        } else {
            self.text_muted()
        }
    }

    /// Form input box
    #[must_use]
    pub fn input(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.fg).bg(self.bg_input)
        } else {
            Style::default().fg(self.muted).bg(self.bg_secondary)
        }
    }

    /// Logo row; the top half uses the primary color
    #[must_use]
    pub fn logo(&self, top: bool) -> Style {
        let color = if top { self.primary } else { self.secondary };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_cycles_and_finds_by_slug() {
        let theme = Theme::default();
        assert_ne!(theme.next(), theme);
        assert_eq!(Theme::from_slug(theme.slug()), Some(theme));
        assert_eq!(Theme::from_slug(&theme.name().to_uppercase()), Some(theme));
        assert_eq!(Theme::from_slug("no-such-theme"), None);
    }

    #[test]
    fn test_like_style_differs_when_liked() {
        let colors = Theme::default().colors();
        assert_ne!(colors.like(true), colors.like(false));
        assert_eq!(colors.like(true).fg, Some(LIKE_PINK));
    }

    #[test]
    fn test_lighten_saturates() {
        assert_eq!(lighten(Color::Rgb(250, 0, 10), 10), Color::Rgb(255, 10, 20));
        assert_eq!(lighten(Color::Reset, 10), Color::Reset);
    }

    #[test]
    fn test_focused_border_uses_primary() {
        let colors = Theme::default().colors();
        assert_eq!(colors.border_style(true).fg, Some(colors.primary));
        assert_eq!(colors.border_style(false).fg, Some(colors.border));
    }
}
