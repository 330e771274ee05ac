//! Glyph colors and the palette that resolves them to RGB
//!
//! A [`Color`] remembers how the application asked for it (default, one of
//! the 16 ANSI colors, a 256-color index or direct RGB). The renderer only
//! ever needs RGB, so [`Palette::resolve`] maps every variant to a concrete
//! triple.

use serde::{Deserialize, Serialize};

/// An RGB triple
pub type Rgb = (u8, u8, u8);

/// Color of a glyph's foreground or background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Color {
    /// Default foreground or background
    #[default]
    Default,
    /// ANSI color 0-15 (SGR 30-37, 90-97 and their backgrounds)
    Basic(u8),
    /// 256-color palette index (SGR 38;5;N)
    Indexed(u8),
    /// Direct color (SGR 38;2;R;G;B)
    Rgb(u8, u8, u8),
}

/// Which color space a [`Color`] was specified in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    Default,
    Basic,
    Palette256,
    TrueColor,
}

impl Color {
    pub const BLACK: Color = Color::Basic(0);
    pub const RED: Color = Color::Basic(1);
    pub const GREEN: Color = Color::Basic(2);
    pub const YELLOW: Color = Color::Basic(3);
    pub const BLUE: Color = Color::Basic(4);
    pub const MAGENTA: Color = Color::Basic(5);
    pub const CYAN: Color = Color::Basic(6);
    pub const WHITE: Color = Color::Basic(7);

    pub fn mode(&self) -> ColorMode {
        match self {
            Color::Default => ColorMode::Default,
            Color::Basic(_) => ColorMode::Basic,
            Color::Indexed(_) => ColorMode::Palette256,
            Color::Rgb(..) => ColorMode::TrueColor,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Color::Default)
    }
}

/// Default xterm color for a 256-color index
pub fn xterm_rgb(index: u8) -> Rgb {
    match index {
        0 => (0, 0, 0),
        1 => (205, 0, 0),
        2 => (0, 205, 0),
        3 => (205, 205, 0),
        4 => (0, 0, 238),
        5 => (205, 0, 205),
        6 => (0, 205, 205),
        7 => (229, 229, 229),
        8 => (127, 127, 127),
        9 => (255, 0, 0),
        10 => (0, 255, 0),
        11 => (255, 255, 0),
        12 => (92, 92, 255),
        13 => (255, 0, 255),
        14 => (0, 255, 255),
        15 => (255, 255, 255),
        // 6x6x6 color cube
        16..=231 => {
            let n = index - 16;
            let level = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (level(n / 36), level((n % 36) / 6), level(n % 6))
        }
        // Grayscale ramp
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            (gray, gray, gray)
        }
    }
}

pub const DEFAULT_FOREGROUND: Rgb = (229, 229, 229);
pub const DEFAULT_BACKGROUND: Rgb = (0, 0, 0);
pub const DEFAULT_CURSOR: Rgb = (229, 229, 229);

/// Parse an X11 color spec as used by OSC 4/10/11/12
///
/// Accepts `#rgb`, `#rrggbb`, `#rrrgggbbb`, `#rrrrggggbbbb` and
/// `rgb:r/g/b` with 1 to 4 hex digits per channel.
pub fn parse_color_spec(spec: &str) -> Option<Rgb> {
    let spec = spec.trim();
    if let Some(hex) = spec.strip_prefix('#') {
        if hex.is_empty() || hex.len() % 3 != 0 || hex.len() > 12 {
            return None;
        }
        let width = hex.len() / 3;
        let r = scale_channel(&hex[..width])?;
        let g = scale_channel(&hex[width..2 * width])?;
        let b = scale_channel(&hex[2 * width..])?;
        return Some((r, g, b));
    }

    let body = spec.strip_prefix("rgb:")?;
    let mut parts = body.split('/');
    let r = scale_channel(parts.next()?)?;
    let g = scale_channel(parts.next()?)?;
    let b = scale_channel(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b))
}

/// Scale a 1-4 digit hex channel to 8 bits
fn scale_channel(digits: &str) -> Option<u8> {
    if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let max = (1u32 << (4 * digits.len() as u32)) - 1;
    Some(((value * 255 + max / 2) / max) as u8)
}

/// Format a color the way xterm answers color queries
pub fn format_color_spec(rgb: Rgb) -> String {
    let (r, g, b) = rgb;
    format!(
        "rgb:{:04x}/{:04x}/{:04x}",
        u16::from(r) * 0x101,
        u16::from(g) * 0x101,
        u16::from(b) * 0x101
    )
}

/// The live color table: 256 indexed colors plus the dynamic colors
///
/// `base` keeps the configured values so OSC 104/110/111/112 can restore
/// them after an application changed the live ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb; 256],
    foreground: Rgb,
    background: Rgb,
    cursor: Rgb,
    base: Box<PaletteBase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PaletteBase {
    colors: [Rgb; 256],
    foreground: Rgb,
    background: Rgb,
    cursor: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        let colors: [Rgb; 256] = std::array::from_fn(|i| xterm_rgb(i as u8));
        Self::with_base(colors, DEFAULT_FOREGROUND, DEFAULT_BACKGROUND, DEFAULT_CURSOR)
    }
}

impl Palette {
    fn with_base(colors: [Rgb; 256], foreground: Rgb, background: Rgb, cursor: Rgb) -> Self {
        Self {
            colors,
            foreground,
            background,
            cursor,
            base: Box::new(PaletteBase {
                colors,
                foreground,
                background,
                cursor,
            }),
        }
    }

    /// Build the palette from configured overrides, ignoring unparsable entries
    pub fn from_config(config: &crate::config::PaletteConfig) -> Self {
        let mut colors: [Rgb; 256] = std::array::from_fn(|i| xterm_rgb(i as u8));
        for (index, spec) in config.ansi.iter().enumerate().take(16) {
            if let Some(rgb) = spec.as_deref().and_then(parse_color_spec) {
                colors[index] = rgb;
            }
        }
        let pick = |spec: &Option<String>, fallback: Rgb| {
            spec.as_deref().and_then(parse_color_spec).unwrap_or(fallback)
        };
        Self::with_base(
            colors,
            pick(&config.foreground, DEFAULT_FOREGROUND),
            pick(&config.background, DEFAULT_BACKGROUND),
            pick(&config.cursor, DEFAULT_CURSOR),
        )
    }

    /// Resolve any color to RGB
    pub fn resolve(&self, color: Color, is_foreground: bool) -> Rgb {
        match color {
            Color::Default if is_foreground => self.foreground,
            Color::Default => self.background,
            Color::Basic(i) => self.colors[usize::from(i & 0x0F)],
            Color::Indexed(i) => self.colors[usize::from(i)],
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }

    pub fn indexed(&self, index: u8) -> Rgb {
        self.colors[usize::from(index)]
    }

    pub fn set_indexed(&mut self, index: u8, rgb: Rgb) {
        self.colors[usize::from(index)] = rgb;
    }

    pub fn reset_indexed(&mut self, index: u8) {
        self.colors[usize::from(index)] = self.base.colors[usize::from(index)];
    }

    pub fn reset_all_indexed(&mut self) {
        self.colors = self.base.colors;
    }

    pub fn foreground(&self) -> Rgb {
        self.foreground
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn cursor(&self) -> Rgb {
        self.cursor
    }

    pub fn set_foreground(&mut self, rgb: Rgb) {
        self.foreground = rgb;
    }

    pub fn set_background(&mut self, rgb: Rgb) {
        self.background = rgb;
    }

    pub fn set_cursor(&mut self, rgb: Rgb) {
        self.cursor = rgb;
    }

    pub fn reset_foreground(&mut self) {
        self.foreground = self.base.foreground;
    }

    pub fn reset_background(&mut self) {
        self.background = self.base.background;
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.base.cursor;
    }

    /// Restore every live color to its configured value
    pub fn reset(&mut self) {
        self.colors = self.base.colors;
        self.foreground = self.base.foreground;
        self.background = self.base.background;
        self.cursor = self.base.cursor;
    }
}
