use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::Label;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(2), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Clusters ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    let map_widget = MapWidget {
        icons: &app.frame.icons,
        badges: &app.frame.badges,
        labels: &app.frame.labels,
        cursor_pos,
    };
    frame.render_widget(map_widget, inner);
}

/// Braille canvases with badge labels overlaid
struct MapWidget<'a> {
    icons: &'a BrailleCanvas,
    badges: &'a BrailleCanvas,
    labels: &'a [Label],
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget<'_> {
    /// Copy a canvas into the buffer, leaving empty cells untouched
    fn render_layer(&self, canvas: &BrailleCanvas, area: Rect, buf: &mut Buffer) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                if let Some((ch, [r, g, b])) = canvas.cell(col, row) {
                    let (x, y) = (area.x + col as u16, area.y + row as u16);
                    buf[(x, y)].set_char(ch).set_fg(Color::Rgb(r, g, b));
                }
            }
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Icons at the back, badges over them
        self.render_layer(self.icons, area, buf);
        self.render_layer(self.badges, area, buf);

        for label in self.labels {
            if label.row >= area.height || label.col >= area.width {
                continue;
            }
            let [r, g, b] = label.fg;
            let mut style = Style::default()
                .fg(Color::Rgb(r, g, b))
                .add_modifier(Modifier::BOLD);
            if let Some([r, g, b]) = label.bg {
                style = style.bg(Color::Rgb(r, g, b));
            }

            let y = area.y + label.row;
            let max_len = (area.width - label.col) as usize;
            for (i, ch) in label.text.chars().take(max_len).enumerate() {
                buf[(area.x + label.col + i as u16, y)].set_char(ch).set_style(style);
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

fn toggle(on: bool, label_on: &'static str, label_off: &'static str) -> Span<'static> {
    Span::styled(
        if on { label_on } else { label_off },
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.settings;
    let dim = Style::default().fg(Color::DarkGray);

    let top = Line::from(vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        Span::styled(app.cluster_summary(), Style::default().fg(Color::Magenta)),
        Span::styled(" | ", dim),
        Span::styled(app.layer_settings(), Style::default().fg(Color::White)),
        Span::styled(" | ", dim),
        toggle(settings.show_icons, "[I]cons ", "[i]cons "),
        toggle(settings.show_nodes, "[N]odes ", "[n]odes "),
        toggle(settings.show_labels, "[L]abels ", "[l]abels "),
        Span::styled("| ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
    ]);

    let detail = match (&app.error, app.pick_summary()) {
        (Some(error), _) => Span::styled(format!(" {error}"), Style::default().fg(Color::Red)),
        (None, Some(summary)) => Span::styled(format!(" {summary}"), Style::default().fg(Color::White)),
        (None, None) => Span::styled(" click a badge to expand it", dim),
    };
    let bottom = Line::from(vec![
        detail,
        Span::styled(
            " | hjkl:pan +/-:zoom [/]:radius s/S:scale enter:query x:clear r:reset q:quit",
            dim,
        ),
    ]);

    frame.render_widget(Paragraph::new(vec![top, bottom]), area);
}
