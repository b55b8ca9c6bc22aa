use ratatui::style::Color;

/// One UI palette. Cycled at runtime with Ctrl+T; the selection is persisted
/// by name in the preferences file.
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "noir",
    bg: Color::Rgb(17, 17, 20),
    fg: Color::Rgb(219, 217, 210),
    accent: Color::Rgb(229, 181, 103),
    muted: Color::Rgb(122, 120, 112),
    border: Color::Rgb(58, 58, 64),
    highlight_fg: Color::Rgb(17, 17, 20),
    highlight_bg: Color::Rgb(229, 181, 103),
    stripe_bg: Color::Rgb(25, 25, 29),
    status: Color::Rgb(142, 184, 133),
    error: Color::Rgb(226, 110, 110),
    key_fg: Color::Rgb(17, 17, 20),
    key_bg: Color::Rgb(122, 120, 112),
  },
  Theme {
    name: "matinee",
    bg: Color::Rgb(34, 25, 23),
    fg: Color::Rgb(236, 224, 209),
    accent: Color::Rgb(217, 87, 74),
    muted: Color::Rgb(150, 132, 118),
    border: Color::Rgb(82, 62, 55),
    highlight_fg: Color::Rgb(34, 25, 23),
    highlight_bg: Color::Rgb(217, 87, 74),
    stripe_bg: Color::Rgb(42, 32, 29),
    status: Color::Rgb(181, 175, 110),
    error: Color::Rgb(240, 120, 100),
    key_fg: Color::Rgb(34, 25, 23),
    key_bg: Color::Rgb(150, 132, 118),
  },
  Theme {
    name: "midnight",
    bg: Color::Rgb(13, 17, 27),
    fg: Color::Rgb(203, 213, 225),
    accent: Color::Rgb(94, 198, 206),
    muted: Color::Rgb(100, 113, 132),
    border: Color::Rgb(44, 54, 72),
    highlight_fg: Color::Rgb(13, 17, 27),
    highlight_bg: Color::Rgb(94, 198, 206),
    stripe_bg: Color::Rgb(19, 24, 36),
    status: Color::Rgb(134, 192, 145),
    error: Color::Rgb(235, 111, 126),
    key_fg: Color::Rgb(13, 17, 27),
    key_bg: Color::Rgb(100, 113, 132),
  },
];
