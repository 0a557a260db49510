//! Ratatui-based terminal front-end for the guess session.
//!
//! The chart shows the data, the model curve and one editable shape per
//! component. Mouse and keyboard input is translated into session gestures;
//! the session draws into an in-memory `Scene`, which is what gets rendered.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};
use tracing::{debug, info};

use crate::app::pipeline::Prepared;
use crate::domain::{ParamSet, SessionConfig};
use crate::error::AppError;
use crate::models::parse_model;
use crate::session::{start_interactive_session, Gesture, Outcome, Scene, Session, SessionState, Target};

mod plotters_chart;

use plotters_chart::GuessPlottersChart;

/// Grab radius for vertices, in range-normalized data units.
const GRAB_RADIUS: f64 = 0.05;
/// Arrow-key nudge, as a fraction of the visible axis span.
const NUDGE_FRACTION: f64 = 0.01;

/// How the interactive session ended.
#[derive(Debug, Clone)]
pub struct TuiOutcome {
    pub state: SessionState,
    /// Committed parameters, or the seed after a cancel.
    pub params: ParamSet,
}

/// Start the TUI and block until the session is committed or cancelled.
pub fn run(prepared: &Prepared, config: &SessionConfig) -> Result<TuiOutcome, AppError> {
    let session = start_interactive_session(
        parse_model(&prepared.model_expr)?,
        prepared.data.y.clone(),
        Some(prepared.data.x.clone()),
        Some(prepared.params.clone()),
        Some(crate::session::plot_grid(&prepared.data.x, config.grid_points)),
        Scene::new(),
    )?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(session, prepared, config.ticks_per_notch);
    app.event_loop(&mut terminal)?;

    let state = app.session.state();
    info!(state = state.label(), "TUI closed");
    Ok(TuiOutcome {
        state,
        params: app.session.params().clone(),
    })
}

/// Restores the terminal (raw mode, alternate screen, mouse capture) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

/// Axis bounds of the plotting area.
type View = ([f64; 2], [f64; 2]);

struct App {
    session: Session<Scene>,
    data_label: String,
    model_label: String,
    ticks_per_notch: i32,
    selected: usize,
    vertex: usize,
    /// Vertex held by the mouse: (component, vertex).
    grab: Option<(usize, usize)>,
    /// Bounds frozen while dragging, so the mapping does not shift under the cursor.
    frozen_view: Option<View>,
    /// Where the chart was last drawn.
    chart_rect: Option<Rect>,
    note: Option<String>,
}

impl App {
    fn new(session: Session<Scene>, prepared: &Prepared, ticks_per_notch: i32) -> Self {
        let selected = (0..session.component_count())
            .find(|&i| session.shape(i).is_some())
            .unwrap_or(0);
        Self {
            data_label: prepared.data.label.clone(),
            model_label: prepared.model.describe(),
            session,
            ticks_per_notch,
            selected,
            vertex: 1,
            grab: None,
            frozen_view: None,
            chart_rect: None,
            note: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if self.session.state().is_terminal() {
                break;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    self.handle_key(key.code);
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    needs_redraw = self.handle_mouse(mouse);
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        self.note = None;
        match code {
            KeyCode::Enter => {
                self.apply(Gesture::Commit);
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.apply(Gesture::Cancel);
            }
            KeyCode::Tab => self.select_next(1),
            KeyCode::BackTab => self.select_next(-1),
            KeyCode::Char('+') | KeyCode::Char('=') => self.scroll_selected(self.ticks_per_notch),
            KeyCode::Char('-') => self.scroll_selected(-self.ticks_per_notch),
            KeyCode::Char('[') => self.vertex = self.vertex.saturating_sub(1),
            KeyCode::Char(']') => {
                let last = self.session.shape(self.selected).map_or(0, |s| s.len().saturating_sub(1));
                self.vertex = (self.vertex + 1).min(last);
            }
            KeyCode::Left => self.nudge(-1.0, 0.0),
            KeyCode::Right => self.nudge(1.0, 0.0),
            KeyCode::Up => self.nudge(0.0, 1.0),
            KeyCode::Down => self.nudge(0.0, -1.0),
            KeyCode::Char('d') => {
                self.note = Some(match crate::debug::write_debug_bundle(&self.session, &self.data_label) {
                    Ok(path) => format!("Wrote debug bundle: {}", path.display()),
                    Err(err) => format!("Debug write failed: {err}"),
                });
            }
            _ => {}
        }
    }

    /// Returns whether the picture may have changed.
    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let view = self.view();
        let point = self
            .chart_rect
            .and_then(|rect| cell_to_data(rect, view, mouse.column, mouse.row));

        match mouse.kind {
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let ticks = if mouse.kind == MouseEventKind::ScrollUp {
                    self.ticks_per_notch
                } else {
                    -self.ticks_per_notch
                };
                let target = match point {
                    Some((x, y)) => Target::Cursor { x, y },
                    None => Target::Component(self.selected),
                };
                if let Some(hit) = point.and_then(|(x, y)| self.session.nearest_vertex(x, y)) {
                    self.selected = hit.component;
                }
                self.apply(Gesture::Scroll { ticks, target });
                true
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((x, y)) = point else { return false };
                match self.session.nearest_vertex(x, y) {
                    Some(hit) if hit.distance <= GRAB_RADIUS => {
                        debug!(component = hit.component, vertex = hit.vertex, "grabbed vertex");
                        self.grab = Some((hit.component, hit.vertex));
                        self.selected = hit.component;
                        self.vertex = hit.vertex;
                        self.frozen_view = Some(view);
                    }
                    _ => self.note = Some("no vertex under the cursor".to_string()),
                }
                true
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let (Some((component, vertex)), Some((x, y))) = (self.grab, point) else {
                    return false;
                };
                self.apply(Gesture::Drag {
                    target: Target::Component(component),
                    vertex,
                    x,
                    y,
                });
                true
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let was_grabbing = self.grab.take().is_some();
                self.frozen_view = None;
                was_grabbing
            }
            _ => false,
        }
    }

    fn apply(&mut self, gesture: Gesture) -> Outcome {
        let outcome = self.session.handle(gesture);
        if let Outcome::Rejected(reason) = &outcome {
            self.note = Some(format!("rejected: {reason}"));
        }
        outcome
    }

    fn select_next(&mut self, step: isize) {
        let n = self.session.component_count() as isize;
        if n == 0 {
            return;
        }
        self.selected = (self.selected as isize + step).rem_euclid(n) as usize;
        self.vertex = self
            .session
            .shape(self.selected)
            .map_or(0, |s| s.len().saturating_sub(1));
    }

    fn scroll_selected(&mut self, ticks: i32) {
        self.apply(Gesture::Scroll {
            ticks,
            target: Target::Component(self.selected),
        });
    }

    fn nudge(&mut self, dx: f64, dy: f64) {
        let Some((vx, vy)) = self
            .session
            .shape(self.selected)
            .and_then(|s| s.vertex(self.vertex))
        else {
            self.note = Some("selected component has no editable shape".to_string());
            return;
        };
        let ([x0, x1], [y0, y1]) = self.view();
        let (step_x, step_y) = (dx * NUDGE_FRACTION * (x1 - x0), dy * NUDGE_FRACTION * (y1 - y0));
        let outcome = self.apply(Gesture::Drag {
            target: Target::Component(self.selected),
            vertex: self.vertex,
            x: vx + step_x,
            y: vy + step_y,
        });
        if outcome != Outcome::Updated {
            return;
        }
        // Some vertices carry only one coordinate (a peak's width vertex ignores y).
        let Some((nx, ny)) = self.session.shape(self.selected).and_then(|s| s.vertex(self.vertex)) else {
            return;
        };
        let (moved, axis) = if dy != 0.0 {
            ((ny - vy).abs() >= 0.5 * step_y.abs(), "vertically")
        } else {
            ((nx - vx).abs() >= 0.5 * step_x.abs(), "horizontally")
        };
        if !moved {
            self.note = Some(format!("vertex {} does not move {axis}", self.vertex));
        }
    }

    fn view(&self) -> View {
        self.frozen_view.unwrap_or_else(|| self.session.canvas().bounds())
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("guess", Style::default().fg(Color::Cyan)),
                Span::raw(" - interactive initial parameters"),
            ]),
            Line::from(Span::styled(
                format!(
                    "data: {} | n={} | model: {} | state: {}",
                    self.data_label,
                    self.session.y().len(),
                    self.model_label,
                    self.session.state().label()
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let list_height = (self.session.component_count() as u16 + 2).min(area.height / 3).max(3);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(list_height)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_components(frame, chunks[1]);
    }

    fn draw_chart(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Model vs data").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (x_bounds, y_bounds) = self.view();
        let (chart_rect, insets) = chart_layout(inner);
        let scene = self.session.canvas();
        let widget = GuessPlottersChart {
            data: &scene.data,
            curve: &scene.curve,
            shapes: &scene.shapes,
            selected: Some(self.selected),
            selected_vertex: Some(self.vertex),
            x_bounds,
            y_bounds,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds);
        }
        self.chart_rect = Some(chart_rect);
    }

    fn draw_components(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let params = self.session.params();
        let items: Vec<ListItem> = self
            .session
            .model()
            .leaves()
            .iter()
            .map(|c| {
                let values: Vec<String> = c
                    .param_names()
                    .iter()
                    .filter_map(|name| params.get(name))
                    .map(|p| format!("{}={}", p.name.trim_start_matches(c.prefix()), fmt_value(p.value)))
                    .collect();
                ListItem::new(format!("{:<20} {}", c.label(), values.join("  ")))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Components").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);

        if self.grab.is_some() {
            let hint = Paragraph::new("Dragging…")
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
            let rect = Rect {
                x: area.x + area.width.saturating_sub(14),
                y: area.y,
                width: 12.min(area.width),
                height: 1,
            };
            frame.render_widget(hint, rect);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "wheel/+/- resize  drag/arrows move  Tab component  [/] vertex  Enter commit  Esc cancel  d debug";
        let status = self.note.as_deref().unwrap_or(self.session.status());
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Map a terminal cell to data coordinates within the chart rect.
fn cell_to_data(rect: Rect, view: View, column: u16, row: u16) -> Option<(f64, f64)> {
    if rect.width == 0
        || rect.height == 0
        || column < rect.x
        || row < rect.y
        || column >= rect.x + rect.width
        || row >= rect.y + rect.height
    {
        return None;
    }
    let ([x0, x1], [y0, y1]) = view;
    let u = ((column - rect.x) as f64 + 0.5) / rect.width as f64;
    let v = ((row - rect.y) as f64 + 0.5) / rect.height as f64;
    Some((x0 + u * (x1 - x0), y1 - v * (y1 - y0)))
}

fn fmt_value(v: f64) -> String {
    if v.is_finite() && v != 0.0 && (v.abs() >= 1e5 || v.abs() < 1e-3) {
        format!("{v:.3e}")
    } else {
        format!("{v:.4}")
    }
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10 || inner.height <= insets.top + insets.bottom + 5 {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = fmt_tick(x_val);
        let label_len = label.len() as u16;
        let start = x.saturating_sub((label.len() / 2) as u16);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = fmt_tick(y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new("x")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new("y").style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

fn fmt_tick(v: f64) -> String {
    if v != 0.0 && (v.abs() >= 1e4 || v.abs() < 1e-2) {
        format!("{v:.1e}")
    } else {
        format!("{v:.2}")
    }
}
