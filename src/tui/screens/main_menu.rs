//! Main menu screen
//!
//! Entry point listing every administrable module plus the bespoke SMS
//! balance screen.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::resources;
use crate::tui::ui::Styles;

/// Where a menu entry leads.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuTarget {
    /// Index into the resource catalog.
    Resource(usize),
    SmsBalance,
    Help,
}

#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub title: String,
    pub description: String,
    pub target: MenuTarget,
}

/// Main menu screen state
pub struct MainMenuScreen {
    pub entries: Vec<MenuEntry>,
    pub state: ListState,
}

impl MainMenuScreen {
    pub fn new() -> Self {
        let mut entries: Vec<MenuEntry> = resources::catalog()
            .iter()
            .enumerate()
            .map(|(i, spec)| MenuEntry {
                title: spec.title.to_string(),
                description: spec.description.to_string(),
                target: MenuTarget::Resource(i),
            })
            .collect();
        entries.push(MenuEntry {
            title: "SMS Balance".to_string(),
            description: "Current balance, purchase history and top-up".to_string(),
            target: MenuTarget::SmsBalance,
        });
        entries.push(MenuEntry {
            title: "Help".to_string(),
            description: "Keyboard shortcuts and usage notes".to_string(),
            target: MenuTarget::Help,
        });

        let mut state = ListState::default();
        state.select(Some(0));
        Self { entries, state }
    }

    pub fn next(&mut self) {
        let i = match self.state.selected() {
            Some(i) => (i + 1) % self.entries.len(),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.entries.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn selected_target(&self) -> Option<MenuTarget> {
        self.state
            .selected()
            .and_then(|i| self.entries.get(i))
            .map(|entry| entry.target.clone())
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let banner = Paragraph::new("Shikkhaloy Administration Console")
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(banner, chunks[0]);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let selected = Some(i) == self.state.selected();
                let style = if selected {
                    Styles::selected()
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<20}", entry.title), style),
                    Span::styled(entry.description.clone(), Styles::inactive()),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Modules (↑/↓ + Enter, q to quit)")
                .borders(Borders::ALL)
                .border_style(Styles::active_border()),
        );
        f.render_stateful_widget(list, chunks[1], &mut self.state);
    }
}
