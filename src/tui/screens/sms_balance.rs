//! SMS balance screen
//!
//! The one screen that is not a plain CRUD pair: it shows the current
//! balance with the purchase history and posts top-up orders.

use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::{json, Value};
use tracing::warn;

use crate::api::ApiClient;
use crate::forms::FieldInput;
use crate::records::Record;
use crate::resources::{ColumnSpec, FieldKind, FieldSpec};
use crate::tui::components::form_field::render_field;
use crate::tui::components::record_table::render_record_table;
use crate::tui::ui::Styles;

use super::ScreenAction;

pub struct SmsBalanceScreen {
    api: Arc<dyn ApiClient>,
    pub balance: Option<i64>,
    pub history: Vec<Record>,
    pub quantity: FieldInput,
    columns: Vec<ColumnSpec>,
    pub loading: bool,
    pub in_flight: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl SmsBalanceScreen {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            balance: None,
            history: Vec::new(),
            quantity: FieldInput::new(
                FieldSpec::new("quantity", "SMS to purchase", FieldKind::Number)
                    .required()
                    .with_placeholder("500"),
            ),
            columns: vec![
                ColumnSpec::new("quantity", "Quantity", 10),
                ColumnSpec::new("amount", "Amount", 10),
                ColumnSpec::new("createdAt", "Date", 24),
            ],
            loading: false,
            in_flight: false,
            error: None,
            notice: None,
        }
    }

    pub async fn enter(&mut self) {
        self.refresh().await;
    }

    pub async fn refresh(&mut self) {
        self.loading = true;
        let api = self.api.clone();

        match api.fetch_value("/sms-balance").await {
            Ok(Value::Object(map)) => {
                self.balance = map.get("balance").and_then(Value::as_i64);
                self.error = None;
            }
            Ok(other) => {
                warn!("unexpected balance payload: {}", other);
                self.balance = None;
            }
            Err(e) => {
                self.balance = None;
                self.error = Some(e.to_string());
            }
        }

        match api.fetch_list("/sms-balance/history").await {
            Ok(history) => self.history = history,
            Err(e) => {
                self.history.clear();
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }

    /// Positive-quantity validation, then POST the purchase and re-fetch.
    pub async fn purchase(&mut self) {
        if self.in_flight {
            return;
        }
        let quantity: i64 = match self.quantity.value.trim().parse() {
            Ok(n) if n > 0 => n,
            _ => {
                self.quantity.error = Some("Quantity must be a positive number".to_string());
                self.error = self.quantity.error.clone();
                return;
            }
        };

        self.in_flight = true;
        let api = self.api.clone();
        match api
            .create("/sms-balance/purchase", &json!({ "quantity": quantity }))
            .await
        {
            Ok(_) => {
                self.notice = Some(format!("Purchased {} SMS", quantity));
                self.error = None;
                self.quantity.value.clear();
                self.quantity.cursor = 0;
                self.refresh().await;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.in_flight = false;
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        match key.code {
            KeyCode::Esc => return Ok(ScreenAction::Back),
            KeyCode::Enter => self.purchase().await,
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Char(c) if c.is_ascii_digit() => self.quantity.insert_char(c),
            KeyCode::Backspace => self.quantity.backspace(),
            KeyCode::Left => self.quantity.move_cursor_left(),
            KeyCode::Right => self.quantity.move_cursor_right(),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        let balance_text = match self.balance {
            Some(balance) => format!("Current balance: {} SMS", balance),
            None => "Current balance unavailable".to_string(),
        };
        let balance = Paragraph::new(balance_text)
            .style(Styles::title())
            .block(Block::default().borders(Borders::ALL).title("SMS Balance"));
        f.render_widget(balance, chunks[0]);

        render_record_table(
            f,
            chunks[1],
            "Purchase history",
            &self.columns,
            &self.history,
            None,
            self.loading,
        );

        render_field(f, chunks[2], &self.quantity, true);

        let footer = if let Some(ref error) = self.error {
            Paragraph::new(error.clone()).style(Styles::error())
        } else if let Some(ref notice) = self.notice {
            Paragraph::new(notice.clone()).style(Styles::success())
        } else {
            Paragraph::new("Enter:purchase  r:refresh  Esc:back").style(Styles::inactive())
        };
        f.render_widget(footer, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ApiCall, MockApiClient};

    #[tokio::test]
    async fn test_refresh_reads_balance_and_history() {
        let api = Arc::new(MockApiClient::new());
        api.script("GET /sms-balance", Ok(json!({"balance": 1200})));
        api.script(
            "GET /sms-balance/history",
            Ok(json!([{"_id": "p1", "quantity": 500, "amount": 150}])),
        );

        let mut screen = SmsBalanceScreen::new(api);
        screen.enter().await;

        assert_eq!(screen.balance, Some(1200));
        assert_eq!(screen.history.len(), 1);
    }

    #[tokio::test]
    async fn test_purchase_requires_positive_quantity() {
        let api = Arc::new(MockApiClient::new());
        let mut screen = SmsBalanceScreen::new(api.clone());

        screen.quantity.value = "0".to_string();
        screen.purchase().await;

        assert_eq!(
            screen.error.as_deref(),
            Some("Quantity must be a positive number")
        );
        assert!(api
            .calls()
            .iter()
            .all(|call| !matches!(call, ApiCall::Create(_, _))));
    }

    #[tokio::test]
    async fn test_purchase_posts_then_refreshes() {
        let api = Arc::new(MockApiClient::new());
        api.script("POST /sms-balance/purchase", Ok(json!({"_id": "p2"})));
        api.script("GET /sms-balance", Ok(json!({"balance": 1700})));

        let mut screen = SmsBalanceScreen::new(api.clone());
        screen.quantity.value = "500".to_string();
        screen.purchase().await;

        assert!(api.calls().iter().any(|call| matches!(
            call,
            ApiCall::Create(path, body)
                if path == "/sms-balance/purchase" && body["quantity"] == 500
        )));
        assert_eq!(screen.balance, Some(1700));
        assert_eq!(screen.notice.as_deref(), Some("Purchased 500 SMS"));
    }
}
