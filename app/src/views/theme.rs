//! Terminal styling, installed once per process.

use std::sync::OnceLock;

use owo_colors::{OwoColorize, Style};

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    color: bool,
}

impl Theme {
    pub const PLAIN: Theme = Theme { color: false };

    pub const fn new(color: bool) -> Self {
        Self { color }
    }

    /// Install the process theme. Later calls return the first one installed.
    pub fn install(color: bool) -> &'static Theme {
        THEME.get_or_init(|| Theme::new(color))
    }

    pub fn color(&self) -> bool {
        self.color
    }

    fn paint(&self, text: &str, style: Style) -> String {
        if self.color {
            text.style(style).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint(text, Style::new().bold().underline())
    }

    pub fn strong(&self, text: &str) -> String {
        self.paint(text, Style::new().bold())
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed())
    }

    pub fn accent(&self, text: &str) -> String {
        self.paint(text, Style::new().blue().bold())
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, Style::new().green().bold())
    }

    pub fn danger(&self, text: &str) -> String {
        self.paint(text, Style::new().red().bold())
    }

    pub fn done(&self, text: &str) -> String {
        self.paint(text, Style::new().dimmed().strikethrough())
    }

    /// Bar in one of the chart palette's hex colours.
    pub fn bar(&self, text: &str, hex: &str) -> String {
        match (self.color, parse_hex(hex)) {
            (true, Some((r, g, b))) => text.truecolor(r, g, b).to_string(),
            _ => text.to_string(),
        }
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
