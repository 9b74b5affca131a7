use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const HEADER_HEIGHT: u16 = 4;
pub const LOG_PANE_PERCENT: u16 = 30;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub header: Rect,
    pub main: Rect,
    pub logs: Option<Rect>,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let (body, logs) = if show_logs {
            let [body, logs] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Percentage(LOG_PANE_PERCENT),
            ])
            .areas(area);
            (body, Some(logs))
        } else {
            (area, None)
        };

        if full_screen {
            let [main] = Layout::vertical([Constraint::Fill(1)]).areas(body);
            return LayoutAreas {
                tab_bar: [Rect::ZERO, Rect::ZERO],
                header: Rect::ZERO,
                main,
                logs,
            };
        }

        let [tab, header, main] = Layout::vertical([
            Constraint::Length(TAB_BAR_HEIGHT),
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Fill(1),
        ])
        .areas(body);

        LayoutAreas {
            tab_bar: Self::split_tab_bar(tab),
            header,
            main,
            logs,
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}
