use owo_colors::Style;
use std::sync::OnceLock;

use crate::rescue::RescueCategory;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles: status messages plus one accent per rescue category
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    pub water: Style,
    pub mountain: Style,
    pub disaster: Style,
}

impl Theme {
    /// Colors only when stdout is a terminal and colors are not disabled
    pub fn detect() -> Self {
        let colored = console::Term::stdout().is_term() && console::colors_enabled();
        if colored { Self::colored() } else { Self::plain() }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            water: Style::new().blue().bold(),
            mountain: Style::new().green().bold(),
            disaster: Style::new().bright_red().bold(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            header: none.clone(),
            success: none.clone(),
            error: none.clone(),
            warn: none.clone(),
            info: none.clone(),
            dim: none.clone(),
            water: none.clone(),
            mountain: none.clone(),
            disaster: none,
        }
    }

    /// Accent for a category heading; `All` uses the plain header style
    pub fn category(&self, category: RescueCategory) -> &Style {
        match category {
            RescueCategory::All => &self.header,
            RescueCategory::Water => &self.water,
            RescueCategory::Mountain => &self.mountain,
            RescueCategory::Disaster => &self.disaster,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
