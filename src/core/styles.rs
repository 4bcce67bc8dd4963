//! Style roles expressed as an enum + macro mapping logical names to `colored::Color`.
//!
//! Each logical style (Header, Label, etc.) is a variant of `StyleRole`. Colouring is
//! applied only when the `enabled` flag passed to `paint()` is true, so callers decide
//! per output stream and no global colour state is kept.
//!
//! ```
//! use ecoscan::core::styles::StyleRole;
//! let plain = StyleRole::Header.paint("Product Details", false);
//! assert_eq!(plain, "Product Details");
//! let colored = StyleRole::Header.paint("Product Details", true);
//! assert!(colored.starts_with("\x1b["));
//! assert!(colored.ends_with("\x1b[0m"));
//! ```

use clap::builder::styling::AnsiColor;
use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }

            pub fn ansi_code(self) -> Option<String> {
                map_color_code(self.color()?)
            }

            pub fn paint(self, text: &str, enabled: bool) -> String {
                if !enabled { return text.to_string(); }
                if let Some(code) = self.ansi_code() { return format!("\x1b[{}m{}\x1b[0m", code, text); }
                text.to_string()
            }
        }
    }
}

// Value => None (uncoloured)
style! {
    Header      => Some(Color::Green),
    Label       => Some(Color::BrightGreen),
    Value       => None,
    Literal     => Some(Color::Cyan),
    Placeholder => Some(Color::Green),
    Good        => Some(Color::Green),
    Caution     => Some(Color::Yellow),
    Error       => Some(Color::BrightRed),
    Dim         => Some(Color::BrightBlack)
}

impl StyleRole {
    /// Role for a 0-100 sustainability score
    pub fn for_score(score: Option<f64>) -> StyleRole {
        match score {
            Some(s) if s >= 60.0 => StyleRole::Good,
            Some(s) if s >= 30.0 => StyleRole::Caution,
            Some(_) => StyleRole::Error,
            None => StyleRole::Dim,
        }
    }
}

fn map_color_code(c: Color) -> Option<String> {
    use Color::*;
    match c {
        Black => Some("30".to_string()),
        Red => Some("31".to_string()),
        Green => Some("32".to_string()),
        Yellow => Some("33".to_string()),
        Blue => Some("34".to_string()),
        Magenta => Some("35".to_string()),
        Cyan => Some("36".to_string()),
        White => Some("37".to_string()),
        BrightBlack => Some("90".to_string()),
        BrightRed => Some("91".to_string()),
        BrightGreen => Some("92".to_string()),
        BrightYellow => Some("93".to_string()),
        BrightBlue => Some("94".to_string()),
        BrightMagenta => Some("95".to_string()),
        BrightCyan => Some("96".to_string()),
        BrightWhite => Some("97".to_string()),
        TrueColor { r, g, b } => Some(format!("38;2;{};{};{}", r, g, b)),
    }
}

fn color_to_ansi(c: Color) -> Option<AnsiColor> {
    use AnsiColor as A;
    use Color::*;
    Some(match c {
        Black => A::Black,
        Red => A::Red,
        Green => A::Green,
        Yellow => A::Yellow,
        Blue => A::Blue,
        Magenta => A::Magenta,
        Cyan => A::Cyan,
        White => A::White,
        BrightBlack => A::BrightBlack,
        BrightRed => A::BrightRed,
        BrightGreen => A::BrightGreen,
        BrightYellow => A::BrightYellow,
        BrightBlue => A::BrightBlue,
        BrightMagenta => A::BrightMagenta,
        BrightCyan => A::BrightCyan,
        BrightWhite => A::BrightWhite,
        _ => return None,
    })
}

/// Build clap Styles for help output using enum roles.
pub fn palette_to_clap(enabled: bool) -> clap::builder::Styles {
    use clap::builder::styling::{Color as ClapColor, Style};
    if !enabled {
        return clap::builder::Styles::plain();
    }

    let style = |role: StyleRole, bold: bool| {
        let mut s = Style::new();
        if let Some(col) = role.color().and_then(color_to_ansi) {
            s = s.fg_color(Some(ClapColor::Ansi(col)));
        }
        if bold {
            s = s.bold();
        }
        s
    };

    clap::builder::Styles::styled()
        .header(style(StyleRole::Header, true))
        .literal(style(StyleRole::Literal, false))
        .placeholder(style(StyleRole::Placeholder, false))
        .valid(style(StyleRole::Good, false))
        .invalid(style(StyleRole::Caution, false))
        .error(style(StyleRole::Error, false))
}
