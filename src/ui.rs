//! TUI rendering for the flight dashboard.
//!
//! This module draws every view with `ratatui`: the overview (totals,
//! activity chart, flight list), analytics (country table, aircraft table),
//! the sortable records table, the world map, and the single-flight view
//! with its route replay. Rendering only reads [`App`]; all numbers come
//! precomputed from [`App::dashboard`](crate::app::App::dashboard).

use crate::app::{App, ChartMode, InputMode, LoadState, ViewMode};
use crate::filter::SortDirection;
use crate::format::{format_currency, format_distance, format_duration};
use crate::geocoding::{flag_emoji, resolve_country};
use crate::models::{Country, FlightRecord, GeoPoint, RoutePath};
use crate::stats::estimate_flight_cost;
use ratatui::{
    prelude::*,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
        *,
    },
};

use ratatui::text::Line;

const ACCENT: Color = Color::Rgb(240, 60, 170);
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Renders one frame of the TUI based on current application state.
///
/// While the data is loading (or after it failed to load) a status screen
/// is drawn instead of the dashboard.
pub fn render(f: &mut Frame, app: &App) {
    match &app.load_state {
        LoadState::Loading => {
            render_loading_screen(f, app);
            return;
        }
        LoadState::Failed(message) => {
            render_failed_screen(f, message);
            return;
        }
        LoadState::Ready => {}
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(f.size());

    render_header(f, app, chunks[0]);
    match app.view_mode {
        ViewMode::Overview => render_overview(f, app, chunks[1]),
        ViewMode::Analytics => render_analytics(f, app, chunks[1]),
        ViewMode::Records => render_records(f, app, chunks[1]),
        ViewMode::Map => render_map_view(f, app, chunks[1]),
        ViewMode::Detail => render_detail(f, app, chunks[1]),
    }
    render_footer(f, app, chunks[2]);
}

/// Tabs on the left, active filters on the right.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let titles: Vec<Line> = ViewMode::tabs()
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.title())))
        .collect();
    let selected = ViewMode::tabs()
        .iter()
        .position(|v| *v == app.view_mode)
        .unwrap_or(usize::MAX);

    let mut tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(" ✈ jetstats ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    if selected != usize::MAX {
        tabs = tabs.select(selected);
    }
    f.render_widget(tabs, chunks[0]);

    let filter_value = |v: Option<&str>| v.unwrap_or("all").to_string();
    let filters = Line::from(vec![
        Span::styled("owner: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(filter_value(app.criteria.owner.as_deref()), Style::default().fg(Color::Cyan)),
        Span::raw("  │  "),
        Span::styled("aircraft: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            filter_value(app.criteria.registration.as_deref()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  │  "),
        Span::styled("search: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(if app.criteria.search.is_empty() {
            "-".to_string()
        } else {
            app.criteria.search.clone()
        }),
    ]);
    let p = Paragraph::new(filters).block(
        Block::default()
            .title(format!(" {} of {} flights ", app.visible.len(), app.records.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(p, chunks[1]);
}

fn render_footer(f: &mut Frame, app: &App, area: Rect) {
    let line = if app.input_mode == InputMode::Search {
        Line::from(vec![
            Span::styled(" search: ", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            Span::raw(app.criteria.search.clone()),
            Span::styled("█", Style::default().fg(ACCENT)),
            Span::styled("   Enter keep  Esc clear", Style::default().fg(Color::DarkGray)),
        ])
    } else if let Some(msg) = &app.status_message {
        Line::from(Span::styled(format!(" {}", msg), Style::default().fg(Color::Yellow)))
    } else {
        let view_keys = match app.view_mode {
            ViewMode::Records => "  s sort  r reverse  e export",
            ViewMode::Detail => "  space play  f speed  r reset  n/p next/prev  Esc back",
            _ => "  m daily/monthly",
        };
        Line::from(Span::styled(
            format!(" 1-4/Tab views  j/k select  Enter flight  o owner  a aircraft  c clear  / search{view_keys}  q quit"),
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_overview(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Percentage(45), Constraint::Min(0)])
        .split(area);

    let stats = &app.dashboard.stats;
    render_stat_cards(
        f,
        chunks[0],
        &[
            ("Flights", stats.total_flights.to_string(), "recorded".to_string()),
            (
                "Flight time",
                format_duration(stats.total_duration_minutes),
                format!("avg {}", format_duration(stats.average_flight_duration)),
            ),
            ("Distance", format_distance(stats.total_distance_km), "great-circle".to_string()),
            ("Estimated cost", format_currency(stats.estimated_cost), "~€5,000 / hour".to_string()),
        ],
    );

    render_activity_chart(f, app, chunks[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    render_flight_list(f, app, bottom[0]);
    render_hotspots(f, app, bottom[1]);
}

fn render_analytics(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let stats = &app.dashboard.stats;
    render_stat_cards(
        f,
        chunks[0],
        &[
            ("Countries", app.dashboard.countries.len().to_string(), "touched".to_string()),
            ("Flights", stats.total_flights.to_string(), "recorded".to_string()),
            (
                "Flight time",
                format_duration(stats.total_duration_minutes),
                format!("avg {}", format_duration(stats.average_flight_duration)),
            ),
            ("Estimated cost", format_currency(stats.estimated_cost), "~€5,000 / hour".to_string()),
        ],
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_country_table(f, app, body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body[1]);
    render_activity_chart(f, app, right[0]);
    render_aircraft_table(f, app, right[1]);
}

fn render_stat_cards(f: &mut Frame, area: Rect, cards: &[(&str, String, String)]) {
    let constraints: Vec<Constraint> = cards
        .iter()
        .map(|_| Constraint::Ratio(1, cards.len() as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, (title, value, subtitle)) in cards.iter().enumerate() {
        let text = vec![
            Line::from(Span::styled(
                value.clone(),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(subtitle.clone(), Style::default().fg(Color::DarkGray))),
        ];
        let card = Paragraph::new(text).block(
            Block::default()
                .title(format!(" {} ", title.to_uppercase()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::horizontal(1)),
        );
        f.render_widget(card, chunks[i]);
    }
}

/// Daily flights as a line chart, monthly flights as bars.
fn render_activity_chart(f: &mut Frame, app: &App, area: Rect) {
    match app.chart_mode {
        ChartMode::Daily => {
            let daily = &app.dashboard.daily;
            let points: Vec<(f64, f64)> = daily
                .iter()
                .enumerate()
                .map(|(i, b)| (i as f64, b.flights as f64))
                .collect();
            let max_y = daily.iter().map(|b| b.flights).max().unwrap_or(0).max(1) as f64;
            let max_x = (points.len().saturating_sub(1)).max(1) as f64;

            let first = daily.first().map(|b| b.date.clone()).unwrap_or_default();
            let last = daily.last().map(|b| b.date.clone()).unwrap_or_default();
            let busiest = daily
                .iter()
                .max_by_key(|b| b.flights)
                .map(|b| format!(" busiest {} ({}) ", b.date, b.flights))
                .unwrap_or_default();

            let dataset = Dataset::default()
                .name("flights")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(ACCENT))
                .data(&points);

            let chart = Chart::new(vec![dataset])
                .block(
                    Block::default()
                        .title(" Daily flights ")
                        .title_bottom(busiest)
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded),
                )
                .x_axis(
                    Axis::default()
                        .style(Style::default().fg(Color::DarkGray))
                        .bounds([0.0, max_x])
                        .labels(vec![Span::raw(first), Span::raw(last)]),
                )
                .y_axis(
                    Axis::default()
                        .style(Style::default().fg(Color::DarkGray))
                        .bounds([0.0, max_y])
                        .labels(vec![Span::raw("0"), Span::raw(format!("{}", max_y as u64))]),
                );
            f.render_widget(chart, area);
        }
        ChartMode::Monthly => {
            let labels: Vec<(String, u64)> = app
                .dashboard
                .monthly
                .iter()
                .map(|m| (short_month(&m.month), m.flights as u64))
                .collect();
            let data: Vec<(&str, u64)> = labels.iter().map(|(l, v)| (l.as_str(), *v)).collect();
            let total_cost: i64 = app.dashboard.monthly.iter().map(|m| m.estimated_cost).sum();

            let chart = BarChart::default()
                .block(
                    Block::default()
                        .title(" Monthly flights ")
                        .title_bottom(format!(" ~{} ", format_currency(total_cost)))
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded),
                )
                .data(data.as_slice())
                .bar_width(6)
                .bar_gap(2)
                .bar_style(Style::default().fg(ACCENT))
                .value_style(Style::default().fg(Color::Black).bg(ACCENT));
            f.render_widget(chart, area);
        }
    }
}

// "2024-03" -> "Mar 24"
fn short_month(month: &str) -> String {
    chrono::NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|d| d.format("%b %y").to_string())
        .unwrap_or_else(|_| month.to_string())
}

fn render_flight_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .visible
        .iter()
        .map(|fl| {
            ListItem::new(Line::from(vec![
                Span::raw(format!(" {} ", fl.date.format("%Y-%m-%d"))),
                Span::styled(format!("{:<8}", fl.registration), Style::default().fg(ACCENT)),
                Span::raw(format!(
                    " {} → {}",
                    endpoint(&fl.start_city, &fl.start_country),
                    endpoint(&fl.end_city, &fl.end_country)
                )),
                Span::styled(
                    format!("  {}", format_duration(fl.duration_minutes)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Flights ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .bg(Color::Rgb(30, 30, 60))
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.visible.is_empty() {
        state.select(Some(app.selected_index));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// City when known, otherwise the country.
fn endpoint(city: &str, country: &Country) -> String {
    if city.is_empty() {
        country.name().to_string()
    } else {
        city.to_string()
    }
}

/// Densest endpoint cells.
fn render_hotspots(f: &mut Frame, app: &App, area: Rect) {
    let max = app.dashboard.density.first().map(|d| d.count).unwrap_or(1).max(1);
    let rows: Vec<Row> = app
        .dashboard
        .density
        .iter()
        .map(|d| {
            let country = resolve_country(d.lat, d.lon);
            Row::new(vec![
                Cell::from(format!("{:>7.2} {:>7.2}", d.lat, d.lon)),
                Cell::from(format!("{} {}", flag_emoji(country.code), country.code)),
                Cell::from(Span::styled(d.count.to_string(), Style::default().fg(heat_color(d.count, max)))),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(16), Constraint::Length(6), Constraint::Min(4)])
        .header(
            Row::new(vec!["Cell", "Ctry", "Ends"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title(" Hotspots ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(table, area);
}

fn render_country_table(f: &mut Frame, app: &App, area: Rect) {
    let total = app.dashboard.total_country_visits().max(1);
    let rows: Vec<Row> = app
        .dashboard
        .countries
        .iter()
        .map(|c| {
            let share = c.visits as f64 / total as f64;
            let bar_len = (share * 10.0).round() as usize;
            Row::new(vec![
                Cell::from(format!("{} {}", flag_emoji(&c.code), c.country)),
                Cell::from(Span::styled(c.visits.to_string(), Style::default().fg(ACCENT))),
                Cell::from(Span::styled(c.departures.to_string(), Style::default().fg(Color::Green))),
                Cell::from(Span::styled(c.arrivals.to_string(), Style::default().fg(Color::Red))),
                Cell::from(format!("{:<10} {:>3.0}%", "█".repeat(bar_len), share * 100.0)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(18),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(15),
        ],
    )
    .header(
        Row::new(vec!["Country", "Total", "Dep", "Arr", "Share"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title(" Countries ")
            .title_bottom(" departures and arrivals per country ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(table, area);
}

fn render_aircraft_table(f: &mut Frame, app: &App, area: Rect) {
    let rows: Vec<Row> = app
        .dashboard
        .aircraft
        .iter()
        .map(|a| {
            let style = if app.criteria.registration.as_deref() == Some(a.registration.as_str()) {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(a.registration.clone()),
                Cell::from(a.aircraft_type.clone()),
                Cell::from(a.operator.clone()),
                Cell::from(a.flight_count.to_string()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Min(10),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new(vec!["Aircraft", "Type", "Operator", "Flights"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title(" Aircraft ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(table, area);
}

fn render_records(f: &mut Frame, app: &App, area: Rect) {
    let arrow = match app.sort.direction {
        SortDirection::Ascending => "▲",
        SortDirection::Descending => "▼",
    };

    let rows: Vec<Row> = app
        .visible
        .iter()
        .map(|fl| {
            Row::new(vec![
                Cell::from(fl.date.format("%Y-%m-%d").to_string()),
                Cell::from(Span::styled(
                    fl.registration.clone(),
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
                )),
                Cell::from(fl.aircraft_type.clone()),
                Cell::from(fl.owner.clone()),
                Cell::from(place(&fl.start_city, &fl.start_country)),
                Cell::from(place(&fl.end_city, &fl.end_country)),
                Cell::from(format_duration(fl.duration_minutes)),
                Cell::from(format_distance(fl.distance_km())),
                Cell::from(fl.icao.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Min(12),
            Constraint::Min(12),
            Constraint::Min(16),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(7),
        ],
    )
    .header(
        Row::new(vec![
            "Date", "Aircraft", "Type", "Owner", "Departure", "Arrival", "Duration", "Distance", "ICAO",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title(format!(" All flights · sorted by {} {} ", app.sort.key.label(), arrow))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    )
    .highlight_style(
        Style::default()
            .fg(Color::Cyan)
            .bg(Color::Rgb(30, 30, 60))
            .add_modifier(Modifier::BOLD),
    );

    let mut state = TableState::default();
    if !app.visible.is_empty() {
        state.select(Some(app.selected_index));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn place(city: &str, country: &Country) -> String {
    match (city.is_empty(), country.is_empty()) {
        (false, false) => format!("{}, {}", city, country.name()),
        (false, true) => city.to_string(),
        _ => country.name().to_string(),
    }
}

/// All visible routes over a world map, endpoint density as dots.
fn render_map_view(f: &mut Frame, app: &App, area: Rect) {
    let routes: Vec<Vec<GeoPoint>> = app.visible.iter().map(|fl| fl.route().points()).collect();
    let selected = app.selected_index;
    let (x_bounds, y_bounds) = fit_bounds(routes.iter().flatten(), 3.0);
    let max = app.dashboard.density.first().map(|d| d.count).unwrap_or(1).max(1);
    let density = &app.dashboard.density;

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(" Routes · {} flights · {} endpoint cells ", routes.len(), density.len()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(50, 50, 50),
                resolution: MapResolution::High,
            });
            ctx.layer();

            for (i, points) in routes.iter().enumerate() {
                let color = if i == selected { Color::Yellow } else { Color::Rgb(120, 40, 90) };
                draw_path(ctx, points, color);
            }
            ctx.layer();

            for cell in density {
                ctx.print(
                    cell.lon,
                    cell.lat,
                    Line::from(Span::styled("●", Style::default().fg(heat_color(cell.count, max)))),
                );
            }

            if let Some(fl) = app.visible.get(selected) {
                ctx.print(
                    fl.end_lon,
                    fl.end_lat,
                    Line::from(Span::styled(
                        format!(" {} ", fl.registration),
                        Style::default().fg(Color::Black).bg(Color::Yellow),
                    )),
                );
            }
        });

    f.render_widget(canvas, area);
}

fn draw_path(ctx: &mut canvas::Context, points: &[GeoPoint], color: Color) {
    for pair in points.windows(2) {
        ctx.draw(&CanvasLine {
            x1: pair[0].lon,
            y1: pair[0].lat,
            x2: pair[1].lon,
            y2: pair[1].lat,
            color,
        });
    }
}

/// Lon/lat bounds around `points` with `padding` degrees.
fn fit_bounds<'a>(points: impl Iterator<Item = &'a GeoPoint>, padding: f64) -> ([f64; 2], [f64; 2]) {
    let bounds = points.fold(
        (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
        |(min_lon, max_lon, min_lat, max_lat), p| {
            (min_lon.min(p.lon), max_lon.max(p.lon), min_lat.min(p.lat), max_lat.max(p.lat))
        },
    );
    pad_bounds(bounds, padding)
}

/// Pads a `(min_lon, max_lon, min_lat, max_lat)` box and clamps it to the
/// globe. An empty box becomes the whole world.
fn pad_bounds(
    (min_lon, max_lon, min_lat, max_lat): (f64, f64, f64, f64),
    padding: f64,
) -> ([f64; 2], [f64; 2]) {
    if min_lon > max_lon {
        return ([-180.0, 180.0], [-90.0, 90.0]);
    }
    (
        [(min_lon - padding).max(-180.0), (max_lon + padding).min(180.0)],
        [(min_lat - padding).max(-90.0), (max_lat + padding).min(90.0)],
    )
}

/// Single flight: facts on the left, route replay on the right.
fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let Some(fl) = app.selected_flight() else {
        let p = Paragraph::new("No flight selected.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_flight_facts(f, app, fl, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(chunks[1]);
    render_replay_canvas(f, app, fl, right[0]);

    let state = if app.replay.playing { "▶" } else { "⏸" };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(" {} {}x ", state, app.replay.speed)))
        .gauge_style(Style::default().fg(ACCENT).bg(Color::Rgb(20, 20, 20)))
        .ratio(app.replay.fraction().clamp(0.0, 1.0))
        .label(format!("{:.0}%", app.replay.progress));
    f.render_widget(gauge, right[1]);
}

fn render_flight_facts(f: &mut Frame, app: &App, fl: &FlightRecord, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let field = |label: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{label:<13}"), bold), Span::raw(value)])
    };
    let endpoint_line = |label: &'static str, city: &str, country: &Country, time: &str| {
        Line::from(vec![
            Span::styled(format!("{label:<13}"), bold),
            Span::raw(format!("{} ", flag_emoji(country.code()))),
            Span::raw(place(city, country)),
            Span::styled(format!("  {}", time), Style::default().fg(Color::DarkGray)),
        ])
    };

    let details = vec![
        Line::from(vec![
            Span::styled(
                fl.registration.clone(),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {} · {}", fl.aircraft_type, fl.operator)),
        ]),
        Line::from(Span::styled(
            format!("flight {} of {}", app.selected_index + 1, app.visible.len()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        field("Date:", fl.date.format("%Y-%m-%d").to_string()),
        field("Owner:", fl.owner.clone()),
        endpoint_line("Departure:", &fl.start_city, &fl.start_country, &fl.start_time),
        endpoint_line("Arrival:", &fl.end_city, &fl.end_country, &fl.end_time),
        Line::from(""),
        field("Duration:", format_duration(fl.duration_minutes)),
        field("Distance:", format_distance(fl.distance_km())),
        field("Est. cost:", format_currency(estimate_flight_cost(fl.duration_minutes))),
        field("Status:", fl.status.clone()),
        field("ICAO:", if fl.icao.is_empty() { "-".to_string() } else { fl.icao.clone() }),
        field(
            "Track:",
            if fl.route_data.is_empty() {
                "start/end only".to_string()
            } else {
                format!("{} samples", fl.route_data.len())
            },
        ),
        Line::from(""),
        Line::from(Span::styled(fl.adsb_exchange_url(), Style::default().fg(Color::Blue))),
    ];

    let p = Paragraph::new(details).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(" Flight ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .padding(Padding::new(2, 2, 1, 1)),
    );
    f.render_widget(p, area);
}

fn render_replay_canvas(f: &mut Frame, app: &App, fl: &FlightRecord, area: Rect) {
    let route = fl.route();
    let points = route.points();
    let (x_bounds, y_bounds) = pad_bounds(route.bounds(), 2.0);
    let position = route.position_at(app.replay.fraction());
    let travelled: Vec<GeoPoint> = travelled_path(&points, &route, app.replay.fraction());

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(
                    " {} → {} ",
                    endpoint(&fl.start_city, &fl.start_country),
                    endpoint(&fl.end_city, &fl.end_country)
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .marker(symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::Rgb(50, 50, 50),
                resolution: MapResolution::High,
            });
            ctx.layer();
            draw_path(ctx, &points, Color::Rgb(90, 40, 70));
            draw_path(ctx, &travelled, ACCENT);
            ctx.layer();

            ctx.print(fl.start_lon, fl.start_lat, Line::from(Span::styled("●", Style::default().fg(Color::Green))));
            ctx.print(fl.end_lon, fl.end_lat, Line::from(Span::styled("●", Style::default().fg(Color::Red))));
            ctx.print(
                position.lon,
                position.lat,
                Line::from(Span::styled(
                    "✈".to_string(),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
            );
        });

    f.render_widget(canvas, area);
}

/// The part of the path already flown at `fraction`, ending at the aircraft.
fn travelled_path(points: &[GeoPoint], route: &RoutePath, fraction: f64) -> Vec<GeoPoint> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let scaled = fraction.clamp(0.0, 1.0) * (points.len() - 1) as f64;
    let whole = (scaled.floor() as usize).min(points.len() - 1);
    let mut path: Vec<GeoPoint> = points[..=whole].to_vec();
    path.push(route.position_at(fraction));
    path
}

/// Pink-to-magenta ramp by share of the maximum count.
fn heat_color(count: usize, max: usize) -> Color {
    let intensity = (count as f64 / max.max(1) as f64).clamp(0.0, 1.0);
    let r = 250.0 - intensity * 60.0;
    let g = 170.0 - intensity * 150.0;
    let b = 210.0 - intensity * 70.0;
    Color::Rgb(r as u8, g as u8, b as u8)
}

fn render_loading_screen(f: &mut Frame, app: &App) {
    let area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height / 2 - area.height.min(2) / 2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let spinner = SPINNER[app.tick_count % SPINNER.len()];
    let msg = Paragraph::new(format!("{} Loading flight data...", spinner))
        .alignment(Alignment::Center)
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    f.render_widget(msg, chunks[1]);

    let source = Paragraph::new(app.config.data.source.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(source, chunks[2]);
}

fn render_failed_screen(f: &mut Frame, message: &str) {
    let area = f.size();
    let text = vec![
        Line::from(Span::styled(
            "Failed to load flight data",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Check [data] source in config.toml · press q to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let p = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .padding(Padding::new(2, 2, area.height / 3, 0)),
        );
    f.render_widget(p, area);
}
