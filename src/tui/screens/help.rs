//! Help screen

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::ui::Styles;

use super::ScreenAction;

pub struct HelpScreen {
    pub scroll_offset: u16,
}

impl HelpScreen {
    pub fn new() -> Self {
        Self { scroll_offset: 0 }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        match key.code {
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            KeyCode::Down => self.scroll_offset += 1,
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            KeyCode::PageDown => self.scroll_offset += 10,
            KeyCode::Home => self.scroll_offset = 0,
            KeyCode::Esc => return Ok(ScreenAction::Back),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let text = "Shikkhaloy Administration Console\n\
            \n\
            Every module is the same list/form pair. The list always shows\n\
            what the server returned on the most recent fetch; after any\n\
            create, update or delete the collection is fetched again, so the\n\
            table is never a locally patched guess.\n\
            \n\
            List screen:\n\
            \x20 ↑/↓        Select a row\n\
            \x20 n          New record\n\
            \x20 e / Enter  Edit the selected record\n\
            \x20 d / Del    Delete (asks for confirmation)\n\
            \x20 a          Toggle active (where the backend supports it)\n\
            \x20 r          Re-fetch the list\n\
            \x20 Esc        Back to the menu\n\
            \n\
            Form screen:\n\
            \x20 Tab / ↓    Next field       Shift+Tab / ↑  Previous field\n\
            \x20 ←/→        Cursor, or cycle a dropdown's options\n\
            \x20 Space      Toggle a checkbox\n\
            \x20 Enter      Save (inserts a newline in multi-line fields)\n\
            \x20 Ctrl+S     Save from anywhere\n\
            \x20 Ctrl+N     Add a repeating-group row\n\
            \x20 Ctrl+X     Remove the focused row (the last row stays)\n\
            \x20 Esc        Discard the form and return to the list\n\
            \n\
            Image fields take a local file path; the file is uploaded when\n\
            the form is saved and the record stores the returned filename.\n\
            \n\
            SMS balance:\n\
            \x20 Type a quantity and press Enter to purchase. The balance\n\
            \x20 and history are fetched fresh afterwards.\n\
            \n\
            Configuration comes from SHIKKHALOY_* environment variables;\n\
            see the README for the full list.";

        let help = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll_offset, 0))
            .style(Styles::default())
            .block(
                Block::default()
                    .title("Help (↑/↓ to scroll, Esc to go back)")
                    .borders(Borders::ALL)
                    .border_style(Styles::active_border()),
            );
        f.render_widget(help, area);
    }
}
