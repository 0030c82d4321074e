//! Main TUI application state and event loop
//!
//! The shell owns the active screen. Screens are constructed when the user
//! enters them and dropped when they leave, so no screen state outlives its
//! mount. Async handlers are awaited inline on the event loop, which keeps
//! mutating actions strictly sequential within one user flow.

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::api::{ApiClient, HttpApiClient};
use crate::config::Config;
use crate::resources;

use super::screens::{
    HelpScreen, MainMenuScreen, MenuTarget, ResourceScreen, ScreenAction, SmsBalanceScreen,
};
use super::ui::centered_rect;

/// Application screens
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    MainMenu,
    Resource,
    SmsBalance,
    Help,
}

/// Main TUI application state
pub struct App {
    pub current_screen: Screen,
    pub config: Config,
    api: Arc<dyn ApiClient>,

    pub main_menu: MainMenuScreen,
    pub resource: Option<ResourceScreen>,
    pub sms_balance: Option<SmsBalanceScreen>,
    pub help: HelpScreen,

    pub should_quit: bool,
    pub show_help_popup: bool,
}

impl App {
    /// Create the application with the real HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(&config)?);
        Ok(Self::with_client(config, api))
    }

    /// Create the application with an injected client.
    pub fn with_client(config: Config, api: Arc<dyn ApiClient>) -> Self {
        Self {
            current_screen: Screen::MainMenu,
            config,
            api,
            main_menu: MainMenuScreen::new(),
            resource: None,
            sms_balance: None,
            help: HelpScreen::new(),
            should_quit: false,
            show_help_popup: false,
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if let crossterm::event::Event::Key(key) = crossterm::event::read()? {
                if key.kind == crossterm::event::KeyEventKind::Press {
                    self.handle_key_event(key).await?;
                }
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Global shortcuts
        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = !self.show_help_popup;
                return Ok(());
            }
            KeyCode::Esc if self.show_help_popup => {
                self.show_help_popup = false;
                return Ok(());
            }
            _ => {}
        }
        if self.show_help_popup {
            return Ok(());
        }

        match self.current_screen {
            Screen::MainMenu => self.handle_main_menu_event(key).await?,
            Screen::Resource => {
                let action = match self.resource.as_mut() {
                    Some(screen) => screen.handle_key(key).await?,
                    None => ScreenAction::Back,
                };
                if action == ScreenAction::Back {
                    // Dropping the screen discards all of its state.
                    self.resource = None;
                    self.current_screen = Screen::MainMenu;
                }
            }
            Screen::SmsBalance => {
                let action = match self.sms_balance.as_mut() {
                    Some(screen) => screen.handle_key(key).await?,
                    None => ScreenAction::Back,
                };
                if action == ScreenAction::Back {
                    self.sms_balance = None;
                    self.current_screen = Screen::MainMenu;
                }
            }
            Screen::Help => {
                if self.help.handle_key(key).await? == ScreenAction::Back {
                    self.current_screen = Screen::MainMenu;
                }
            }
        }
        Ok(())
    }

    async fn handle_main_menu_event(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Up => self.main_menu.previous(),
            KeyCode::Down => self.main_menu.next(),
            KeyCode::Enter => {
                if let Some(target) = self.main_menu.selected_target() {
                    self.open(target).await;
                }
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
        Ok(())
    }

    /// Construct the chosen screen and fetch its data on entry.
    async fn open(&mut self, target: MenuTarget) {
        match target {
            MenuTarget::Resource(index) => {
                let specs = resources::catalog();
                if let Some(spec) = specs.into_iter().nth(index) {
                    let mut screen =
                        ResourceScreen::new(spec, self.api.clone(), self.config.clone());
                    screen.enter().await;
                    self.resource = Some(screen);
                    self.current_screen = Screen::Resource;
                }
            }
            MenuTarget::SmsBalance => {
                let mut screen = SmsBalanceScreen::new(self.api.clone());
                screen.enter().await;
                self.sms_balance = Some(screen);
                self.current_screen = Screen::SmsBalance;
            }
            MenuTarget::Help => self.current_screen = Screen::Help,
        }
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        match self.current_screen {
            Screen::MainMenu => self.main_menu.draw(f, chunks[0]),
            Screen::Resource => {
                if let Some(screen) = self.resource.as_mut() {
                    screen.draw(f, chunks[0]);
                }
            }
            Screen::SmsBalance => {
                if let Some(screen) = self.sms_balance.as_mut() {
                    screen.draw(f, chunks[0]);
                }
            }
            Screen::Help => self.help.draw(f, chunks[0]),
        }

        self.draw_status_bar(f, chunks[1]);

        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let screen_name = match self.current_screen {
            Screen::MainMenu => "Main Menu",
            Screen::Resource => self
                .resource
                .as_ref()
                .map(|s| s.spec.title)
                .unwrap_or("Resource"),
            Screen::SmsBalance => "SMS Balance",
            Screen::Help => "Help",
        };
        let status_text = format!(
            "Shikkhaloy Admin - {} | ESC: Back | F1: Help",
            screen_name
        );

        let status_bar = Paragraph::new(status_text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(status_bar, area);
    }

    fn draw_help_popup(&self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 60, area);
        f.render_widget(Clear, popup_area);

        let help_popup = Paragraph::new(self.get_context_help())
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));
        f.render_widget(help_popup, popup_area);
    }

    fn get_context_help(&self) -> String {
        let global_help = "Global Shortcuts:\n\
            ESC - Go back\n\
            F1 - Toggle this help\n\n";

        let screen_help = match self.current_screen {
            Screen::MainMenu => {
                "Main Menu:\n\
                ↑/↓ - Navigate modules\n\
                Enter - Open module\n\
                q - Quit"
            }
            Screen::Resource => {
                "List: ↑/↓ select, n new, e/Enter edit, d delete,\n\
                a toggle active, r refresh\n\
                Form: Tab/↑/↓ move, ←/→ cursor or dropdown,\n\
                Space checkbox, Enter/Ctrl+S save, Esc cancel,\n\
                Ctrl+N add row, Ctrl+X remove row"
            }
            Screen::SmsBalance => {
                "SMS Balance:\n\
                Type a quantity, Enter to purchase\n\
                r - Refresh balance and history"
            }
            Screen::Help => {
                "Help Screen:\n\
                ↑/↓ - Scroll help content"
            }
        };

        format!("{}{}", global_help, screen_help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApiClient;
    use crate::config::HttpConfig;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use serde_json::json;

    fn test_config() -> Config {
        Config {
            base_url: "http://localhost:5000/api/v1".to_string(),
            api_token: None,
            media_base_url: "http://localhost:5000/uploads".to_string(),
            log_dir: ".".into(),
            http: HttpConfig::default(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_menu_enter_mounts_screen_and_esc_drops_it() {
        let api = Arc::new(MockApiClient::new());
        api.script("GET /holidays", Ok(json!([{"_id": "h1", "name": "Eid"}])));

        let mut app = App::with_client(test_config(), api);
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.current_screen, Screen::Resource);
        assert_eq!(app.resource.as_ref().unwrap().rows.len(), 1);

        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.current_screen, Screen::MainMenu);
        // The screen is gone; nothing survives its mount.
        assert!(app.resource.is_none());
    }

    #[tokio::test]
    async fn test_quit_only_from_main_menu() {
        let api = Arc::new(MockApiClient::new());
        let mut app = App::with_client(test_config(), api);

        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('q'))).await.unwrap();
        assert!(!app.should_quit);

        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        app.handle_key_event(key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }
}
