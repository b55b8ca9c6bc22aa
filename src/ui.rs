use image::imageops::FilterType;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, List, ListItem, Padding, Paragraph},
};

use crate::app::{App, AppMode};
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::graphics::PosterWidget;
use crate::movie::Movie;
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// One list row: title left, genre names right-aligned and muted.
fn movie_line<'a>(movie: &Movie, inner_w: usize, fg: ratatui::style::Color, theme: &Theme, seen_mark: bool) -> Line<'a> {
  let prefix = if seen_mark { "✓ " } else { "" };
  let genres = movie.genres.join(", ");

  if genres.is_empty() {
    let title = truncate_str(&movie.title, inner_w.saturating_sub(prefix.chars().count()));
    let mut spans = Vec::new();
    if seen_mark {
      spans.push(Span::styled(prefix.to_string(), Style::default().fg(theme.status)));
    }
    spans.push(Span::styled(title, Style::default().fg(fg)));
    return Line::from(spans);
  }

  let genres_w = genres.chars().count();
  let title_max = inner_w.saturating_sub(genres_w + 2 + prefix.chars().count());
  let title = truncate_str(&movie.title, title_max);
  let used = title.chars().count() + genres_w + prefix.chars().count();
  let gap = inner_w.saturating_sub(used);

  let mut spans = Vec::new();
  if seen_mark {
    spans.push(Span::styled(prefix.to_string(), Style::default().fg(theme.status)));
  }
  spans.push(Span::styled(title, Style::default().fg(fg)));
  spans.push(Span::raw(" ".repeat(gap)));
  spans.push(Span::styled(genres, Style::default().fg(theme.muted)));
  Line::from(spans)
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left = Line::from(Span::styled(" ▶ cine ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  if app.results.is_empty() && app.seen.is_empty() {
    render_welcome(frame, app.theme(), area);
    return;
  }

  let [results_area, side_area] =
    Layout::horizontal([Constraint::Percentage(58), Constraint::Percentage(42)]).areas(area);

  render_results(frame, app, results_area);

  let [poster_area, seen_area, recommended_area] = Layout::vertical([
    Constraint::Length(constants().poster_height_rows),
    Constraint::Percentage(40),
    Constraint::Min(3),
  ])
  .areas(side_area);

  render_poster(frame, app, poster_area);
  render_seen(frame, app, seen_area);
  render_recommended(frame, app, recommended_area);
}

fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  Welcome to cine", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Search movies. Track what you've seen. In the terminal.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Type a query below and press Enter.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
    Block::bordered()
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
  );
  frame.render_widget(paragraph, area);
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .results
    .iter()
    .enumerate()
    .map(|(i, movie)| {
      let is_selected = app.mode != AppMode::Input && Some(i) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };
      let seen_mark = app.seen.iter().any(|s| s.id == movie.id);
      ListItem::new(movie_line(movie, inner_w, fg, theme, seen_mark)).bg(bg)
    })
    .collect();

  let refreshed = app
    .catalog_refreshed_at
    .map(|t| format!(" · updated {}", t.format("%H:%M")))
    .unwrap_or_default();
  let title = format!(" Titles — {}{} ", app.results.len(), refreshed);

  let border_color = if app.mode == AppMode::Results { theme.accent } else { theme.border };
  let list = List::new(items)
    .block(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(border_color)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_poster(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = Block::bordered()
    .title(" Poster ")
    .title_style(Style::default().fg(theme.accent))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border));
  let inner = block.inner(area);
  frame.render_widget(block, area);

  let Some(movie) = app.selected_result() else {
    return;
  };

  if movie.poster_url.is_empty() {
    let placeholder = Paragraph::new("no poster").alignment(Alignment::Center).style(Style::default().fg(theme.muted));
    frame.render_widget(placeholder, inner);
    return;
  }

  let movie_id = movie.id;
  if let Some((id, ref image)) = app.poster.cached
    && id == movie_id
  {
    let needs_resize = match app.poster.resized {
      Some((rid, w, h, _)) => rid != id || w != inner.width || h != inner.height,
      None => true,
    };
    if needs_resize {
      let target_w = inner.width as u32;
      // Half-block cells hold two pixels vertically; ASCII cells hold one.
      let target_h = match app.display_mode {
        DisplayMode::Direct => inner.height as u32 * 2,
        DisplayMode::Ascii => inner.height as u32,
      };
      let resized = image.resize_to_fill(target_w.max(1), target_h.max(1), FilterType::Lanczos3);
      app.poster.resized = Some((id, inner.width, inner.height, resized));
    }

    if let Some((_, _, _, ref resized)) = app.poster.resized {
      let widget = PosterWidget { image: resized, display_mode: app.display_mode };
      frame.render_widget(widget, inner);
    }
  } else {
    let placeholder = Paragraph::new("loading…").alignment(Alignment::Center).style(Style::default().fg(theme.muted));
    frame.render_widget(placeholder, inner);
  }
}

fn render_seen(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .seen
    .iter()
    .enumerate()
    .map(|(i, movie)| {
      let is_selected = app.mode == AppMode::Seen && Some(i) == app.seen_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected { theme.highlight_bg } else { theme.bg };
      ListItem::new(movie_line(movie, inner_w, fg, theme, false)).bg(bg)
    })
    .collect();

  let border_color = if app.mode == AppMode::Seen { theme.accent } else { theme.border };
  let list = List::new(items)
    .block(
      Block::bordered()
        .title(format!(" Seen — {} ", app.seen.len()))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(border_color)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg));

  frame.render_stateful_widget(list, area, &mut app.seen_state);
}

fn render_recommended(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let inner_w = area.width.saturating_sub(2) as usize;

  let items: Vec<ListItem> = app
    .recommended
    .iter()
    .enumerate()
    .map(|(i, movie)| {
      let bg = if i % 2 == 1 { theme.stripe_bg } else { theme.bg };
      ListItem::new(movie_line(movie, inner_w, theme.fg, theme, false)).bg(bg)
    })
    .collect();

  let list = List::new(items).block(
    Block::bordered()
      .title(format!(" Recommended — {} ", app.recommended.len()))
      .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
  );

  frame.render_widget(list, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else {
    (
      format!(" {} titles · {} seen · {} recommended", app.catalog.len(), app.seen.len(), app.recommended.len()),
      Style::default().fg(theme.muted),
    )
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Input { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(" Search movies ")
    .title_style(Style::default().fg(border_color))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if app.mode == AppMode::Input {
    let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let has_results = !app.results.is_empty();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Input => {
      let mut k = vec![("Enter", "Search"), ("^t", "Theme")];
      if has_results {
        k.push(("↓", "Results"));
        k.push(("Esc", "Results"));
      } else {
        k.push(("Esc", "Quit"));
      }
      k
    }
    AppMode::Results => {
      let mut k = vec![("Enter", "Mark seen"), ("j/k", "Navigate")];
      if !app.seen.is_empty() {
        k.push(("Tab", "Seen"));
        k.push(("^x", "Clear history"));
      }
      k.push(("Esc", "Search"));
      k
    }
    AppMode::Seen => vec![("j/k", "Navigate"), ("^x", "Clear history"), ("Tab", "Results"), ("Esc", "Back")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
