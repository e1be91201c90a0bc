//! Terminal capability detection and styling helpers.

use routesync_lib::TransportMode;

/// ANSI escape sequences used by the text renderer.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
}

/// Colors resolved for the current terminal. Every field is empty when
/// color output is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub bold: &'static str,
    pub dim: &'static str,
    pub land: &'static str,
    pub sea: &'static str,
    pub air: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
}

impl ColorPalette {
    pub fn colored() -> Self {
        Self {
            reset: colors::RESET,
            bold: colors::BOLD,
            dim: colors::DIM,
            land: colors::GREEN,
            sea: colors::BLUE,
            air: colors::CYAN,
            warning: colors::YELLOW,
            error: colors::RED,
        }
    }

    pub fn plain() -> Self {
        Self {
            reset: "",
            bold: "",
            dim: "",
            land: "",
            sea: "",
            air: "",
            warning: "",
            error: "",
        }
    }

    /// Pick a palette from the environment.
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn mode(&self, mode: TransportMode) -> &'static str {
        match mode {
            TransportMode::Land => self.land,
            TransportMode::Sea => self.sea,
            TransportMode::Air => self.air,
        }
    }
}

/// Whether ANSI colors should be emitted.
///
/// Honors the `NO_COLOR` convention and `TERM=dumb`.
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    !matches!(std::env::var("TERM").as_deref(), Ok("dumb"))
}

/// Format an integer with thousands separators (`1234567` -> `1,234,567`).
pub fn format_with_separators(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a non-negative amount with separators and two decimals.
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}{}.{:02}",
        sign,
        format_with_separators(cents / 100),
        cents % 100
    )
}
