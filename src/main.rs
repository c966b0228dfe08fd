mod app;
mod braille;
mod config;
mod data;
mod hash;
mod map;
mod trace;
mod ui;

use anyhow::Result;
use app::{App, Point};
use config::Config;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tui_cluster::layer::LayerProps;
use tui_cluster::render::{Accessor, IconMapping};

fn main() -> Result<()> {
    let config = Config::from_env()?;
    trace::initialize_tracer(config.log_file.as_deref())?;
    let props = layer_props(&config);

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, props);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Points from the configured file, or synthetic ones when it cannot be read
fn load_data(config: &Config) -> Vec<Point> {
    if config.data_path.exists() {
        match data::load_points(&config.data_path) {
            Ok(points) => return points,
            Err(e) => warn!(error = %e, "falling back to synthetic points"),
        }
    }
    info!(count = config.synthetic, "generating synthetic points");
    data::generate_synthetic(config.synthetic)
}

/// Demo icon set: "star" is a mask tinted by the icon color, the rest draw as-is
fn icon_mapping() -> HashMap<String, IconMapping> {
    ["marker", "pin", "star"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let mapping = IconMapping {
                x: i as u32 * 64,
                y: 0,
                width: 64,
                height: 64,
                anchor_x: None,
                anchor_y: None,
                mask: name == "star",
            };
            (name.to_string(), mapping)
        })
        .collect()
}

fn layer_props(config: &Config) -> LayerProps<Point> {
    LayerProps {
        data: Arc::new(load_data(config)),
        max_zoom: config.max_zoom,
        radius: config.radius,
        icon_atlas: "icons.png".to_string(),
        icon_mapping: Arc::new(icon_mapping()),
        get_icon_color: Accessor::constant([255, 96, 200, 255]),
        ..LayerProps::default()
    }
}

/// Handle mouse events for panning, zooming and picking
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Moved => app.hover(mouse.column, mouse.row),
        // Press and release in place picks, press and drag pans
        MouseEventKind::Down(MouseButton::Left) => app.start_press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_press(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, props: LayerProps<Point>) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, props);

    // Main loop
    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Clustering
                            KeyCode::Char('[') => app.adjust_radius(-1),
                            KeyCode::Char(']') => app.adjust_radius(1),
                            KeyCode::Char('s') => app.adjust_size_scale(-1),
                            KeyCode::Char('S') => app.adjust_size_scale(1),

                            // Sub-layer toggles
                            KeyCode::Char('i') | KeyCode::Char('I') => app.toggle_icons(),
                            KeyCode::Char('n') | KeyCode::Char('N') => app.toggle_nodes(),
                            KeyCode::Char('L') => app.toggle_labels(),

                            // Picking
                            KeyCode::Enter => app.query_center(),
                            KeyCode::Char('x') => app.clear_selection(),

                            // Reset view
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
