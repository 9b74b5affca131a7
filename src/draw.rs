use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::ui::layout::LayoutAreas;
use match_discovery::GeoBounds;
use match_discovery::projection::{DisplayRecord, RecordOrigin};

static TABS: &[&str; 2] = &["Matches", "Venues"];

const HELP_TEXT: &str = "\
q        quit
1 / 2    matches / venue pins
arrows   pan the map (also h j k l)
+ / -    zoom in / out
[ / ]    move the date window by a week
s        toggle the viewport filter
J / K    move through the match list
r        reload the match file
f        full screen
\"        show logs
Esc      leave help";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    terminal
        .draw(|f| {
            layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

            if !app.settings.full_screen {
                draw_tabs(f, layout.tab_bar, app);
                draw_header(f, layout.header, app);
            }

            match app.state.active_tab {
                MenuItem::Matches => draw_matches(f, layout.main, app),
                MenuItem::Venues => draw_venues(f, layout.main, app),
                MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
            }

            if let Some(logs) = layout.logs {
                draw_logs(f, logs);
            }
        })
        .unwrap();
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Matches => 0,
        MenuItem::Venues => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let tracker = &app.state.tracker;
    let window = &app.state.window;

    let viewport = match tracker.current_bounds() {
        Some(bounds) => format_bounds(&bounds),
        None => "crosses the antimeridian or a pole".to_string(),
    };
    let mut status = Vec::new();
    if tracker.has_moved() {
        status.push(Span::styled(" moved ", Style::default().fg(Color::Yellow)));
    }
    if tracker.deadline().is_some() {
        status.push(Span::styled(" settling ", Style::default().fg(Color::DarkGray)));
    }

    let filter = if app.state.spatial_filter { "viewport" } else { "off" };
    let source = match (app.state.source_label.as_deref(), app.state.session.skipped()) {
        (None, _) => "loading...".to_string(),
        (Some(label), 0) => label.to_string(),
        (Some(label), skipped) => format!("{label} ({skipped} unreadable)"),
    };

    let mut first = vec![Span::raw(format!("Map {viewport}"))];
    first.extend(status);
    let lines = vec![
        Line::from(first),
        Line::from(format!(
            "Trip {} to {}  |  filter: {filter}  |  {} matches, {} venues  |  {source}",
            window.from.format("%a %d %b %Y"),
            window.to.format("%a %d %b %Y"),
            app.state.list.visible.len(),
            app.state.list.pins.len(),
        )),
    ];

    let block = default_border(Color::DarkGray);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_matches(f: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.state.list.unlocated_count() {
        0 => " Matches ".to_string(),
        n => format!(" Matches ({n} without location) "),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(msg) = empty_list_message(app) {
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(inner);

    let list = &mut app.state.list;
    let height = list_area.height as usize;
    if height > 0 {
        let offset = list.scroll_offset as usize;
        if list.selected < offset {
            list.scroll_offset = list.selected as u16;
        } else if list.selected >= offset + height {
            list.scroll_offset = (list.selected + 1 - height) as u16;
        }
    }

    let lines: Vec<Line> = list
        .visible
        .iter()
        .enumerate()
        .map(|(idx, record)| match_line(record, idx == list.selected))
        .collect();
    f.render_widget(Paragraph::new(lines).scroll((list.scroll_offset, 0)), list_area);

    if let Some(record) = list.selected_record() {
        draw_match_detail(f, detail_area, record);
    }
}

fn empty_list_message(app: &App) -> Option<String> {
    if !app.state.list.visible.is_empty() {
        return None;
    }
    if let Some(err) = app.state.last_error.as_deref() {
        return Some(format!("Load failed:\n{err}"));
    }
    if app.state.spatial_filter && app.state.unsupported_viewport {
        return Some(
            "This viewport crosses the antimeridian or a pole and cannot be searched.\nZoom in or pan back."
                .to_string(),
        );
    }
    if app.state.source_label.is_none() {
        return Some("Loading matches...".to_string());
    }
    Some("No matches in this window and viewport.\nTry [ / ] to move the dates, s to drop the map filter.".to_string())
}

fn match_line(record: &DisplayRecord, selected: bool) -> Line<'static> {
    let marker = if selected { ">" } else { " " };
    let kickoff = record.fixture.date.format("%d %b %H:%M");
    let mut spans = vec![Span::raw(format!(
        "{marker} {kickoff}  {} vs {}",
        record.teams.home.name, record.teams.away.name
    ))];
    if record.is_suggested() {
        spans.push(Span::styled(" *", Style::default().fg(Color::Magenta)));
    }
    if record.fixture.venue.coordinates.is_none() {
        spans.push(Span::styled(" (no location)", Style::default().fg(Color::DarkGray)));
    }

    let style = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(spans).style(style)
}

fn draw_match_detail(f: &mut Frame, area: Rect, record: &DisplayRecord) {
    let venue = &record.fixture.venue;
    let mut lines = vec![
        format!("{} vs {}", record.teams.home.name, record.teams.away.name),
        record.league.name.clone(),
        record.fixture.date.format("%A %d %B %Y, %H:%M UTC").to_string(),
        String::new(),
        if venue.name.is_empty() { "Venue unknown".to_string() } else { venue.name.clone() },
    ];

    let place: Vec<&str> = [venue.city.as_deref(), venue.country.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !place.is_empty() {
        lines.push(place.join(", "));
    }
    match venue.coordinates {
        Some(point) => lines.push(format!("{:.4}, {:.4}", point.lat, point.lng)),
        None => lines.push("Location not available; not shown on the map".to_string()),
    }

    lines.push(String::new());
    lines.push(match record.origin {
        RecordOrigin::Saved => "Saved to your trip".to_string(),
        RecordOrigin::Suggested => "Suggested for your trip".to_string(),
        RecordOrigin::Provider => "From the fixture list".to_string(),
    });
    if let Some(reason) = record
        .recommendation
        .as_ref()
        .and_then(|r| r.get("reason"))
        .and_then(|r| r.as_str())
    {
        lines.push(reason.to_string());
    }

    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(
        Paragraph::new(lines.join("\n")).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_venues(f: &mut Frame, area: Rect, app: &mut App) {
    let total_venues = app.state.session.venue_groups().len();
    let title = format!(" Venues ({} in view, {total_venues} loaded) ", app.state.list.pins.len());
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(msg) = empty_list_message(app) {
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let mut lines = Vec::with_capacity(app.state.list.pins.len());
    for pin in &app.state.list.pins {
        let name = if pin.venue.name.is_empty() { "Unknown venue" } else { pin.venue.name.as_str() };
        let location = match pin.venue.coordinates {
            Some(p) => format!("{:>8.3} {:>8.3}", p.lat, p.lng),
            None => format!("{:>17}", "no location"),
        };
        let plural = if pin.match_ids.len() == 1 { "match" } else { "matches" };
        lines.push(format!("{location}  {name}  ({} {plural})", pin.match_ids.len()));
    }
    f.render_widget(Paragraph::new(lines.join("\n")), inner);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logger = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Green))
        .style_trace(Style::default().fg(Color::Gray));
    f.render_widget(logger, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Left),
        inner,
    );
}

fn format_bounds(bounds: &GeoBounds) -> String {
    let GeoBounds { northeast: ne, southwest: sw } = bounds;
    format!(
        "N {:.2}  S {:.2}  W {:.2}  E {:.2}",
        ne.lat, sw.lat, sw.lng, ne.lng
    )
}
