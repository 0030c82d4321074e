//! Generic list/form screen, instantiated per resource
//!
//! Every administrable entity runs through this one screen pair: fetch the
//! collection, render the table, open a form, validate, submit, re-fetch.
//! The displayed list is always server truth after a mutation; nothing is
//! patched optimistically.

use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::config::Config;
use crate::forms::{Focus, FormState, SelectOption};
use crate::records::{self, Record};
use crate::resources::{summary, FieldKind, ResourceSpec};
use crate::tui::components::form_field::{render_field, render_options};
use crate::tui::components::record_table::render_record_table;
use crate::tui::ui::{centered_rect, Styles};

use super::ScreenAction;

/// Explicit screen mode. Transitions are exhaustive; there is no ad hoc
/// flag soup behind this.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Listing,
    Creating,
    Editing(String),
    ConfirmingDelete(String),
}

pub struct ResourceScreen {
    pub spec: ResourceSpec,
    api: Arc<dyn ApiClient>,
    config: Config,

    pub mode: Mode,
    pub rows: Vec<Record>,
    pub selected: Option<usize>,
    pub summaries: Vec<String>,
    pub form: Option<FormState>,

    pub loading: bool,
    /// One in-flight mutation at a time; the submit control is disabled
    /// for the duration of exactly one request.
    pub in_flight: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub upload_progress: Arc<AtomicU8>,
}

impl ResourceScreen {
    pub fn new(spec: ResourceSpec, api: Arc<dyn ApiClient>, config: Config) -> Self {
        Self {
            spec,
            api,
            config,
            mode: Mode::Listing,
            rows: Vec::new(),
            selected: None,
            summaries: Vec::new(),
            form: None,
            loading: false,
            in_flight: false,
            error: None,
            notice: None,
            upload_progress: Arc::new(AtomicU8::new(0)),
        }
    }

    /// Fetch on entry; the screen owns no state from before its mount.
    pub async fn enter(&mut self) {
        self.refresh().await;
    }

    /// Re-fetch the full collection. On failure the list is left empty and
    /// the error is shown; the user re-triggers with 'r'.
    pub async fn refresh(&mut self) {
        self.loading = true;
        let api = self.api.clone();
        match api.fetch_list(self.spec.path).await {
            Ok(rows) => {
                info!("fetched {} rows from {}", rows.len(), self.spec.path);
                self.rows = rows;
                self.error = None;
            }
            Err(e) => {
                warn!("list fetch failed for {}: {}", self.spec.path, e);
                self.rows.clear();
                self.error = Some(e.to_string());
            }
        }
        self.summaries = self
            .spec
            .summaries
            .iter()
            .map(|s| summary::compute(s, &self.rows))
            .collect();
        self.selected = match self.selected {
            Some(i) if i < self.rows.len() => Some(i),
            _ if self.rows.is_empty() => None,
            _ => Some(0),
        };
        self.loading = false;
    }

    fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % self.rows.len(),
            None => 0,
        });
    }

    fn select_previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        });
    }

    fn selected_record(&self) -> Option<&Record> {
        self.selected.and_then(|i| self.rows.get(i))
    }

    /// Switch to the create form: blank detached state, reference lists
    /// fetched independently.
    pub async fn open_create(&mut self) {
        let mut form = FormState::for_create(&self.spec);
        self.load_options(&mut form).await;
        self.form = Some(form);
        self.mode = Mode::Creating;
        self.notice = None;
    }

    /// Switch to the edit form seeded from the selected record.
    pub async fn open_edit(&mut self) {
        let record = match self.selected_record() {
            Some(record) => record.clone(),
            None => return,
        };
        let id = match records::id(&record) {
            Some(id) => id.to_string(),
            None => return,
        };
        let mut form = FormState::for_edit(&self.spec, &record);
        self.load_options(&mut form).await;
        self.form = Some(form);
        self.mode = Mode::Editing(id);
        self.notice = None;
    }

    /// Fetch reference lists for every dropdown. A failure here is
    /// non-fatal: the dropdown renders empty with an inline note and the
    /// form stays usable.
    async fn load_options(&self, form: &mut FormState) {
        let api = self.api.clone();
        for input in &mut form.fields {
            let (path, statics) = match input.spec.kind {
                FieldKind::Select {
                    options_path,
                    options,
                } => (options_path, options),
                _ => continue,
            };
            match path {
                Some(path) => match api.fetch_list(path).await {
                    Ok(rows) => {
                        let options = rows
                            .iter()
                            .filter_map(|record| {
                                Some(SelectOption {
                                    id: records::id(record)?.to_string(),
                                    name: records::cell_text(record, "name"),
                                })
                            })
                            .collect();
                        input.set_options(options);
                    }
                    Err(e) => {
                        warn!("dropdown fetch failed for {}: {}", path, e);
                        input.options_error = Some(format!("options unavailable: {}", e));
                    }
                },
                None => {
                    let options = statics
                        .iter()
                        .map(|name| SelectOption {
                            id: name.to_string(),
                            name: name.to_string(),
                        })
                        .collect();
                    input.set_options(options);
                }
            }
        }
    }

    /// Validate, upload any pending image, then POST or PUT. Validation
    /// failure aborts before any request; a server failure keeps the form
    /// open with the message verbatim.
    pub async fn submit(&mut self) {
        if self.in_flight {
            return;
        }
        let api = self.api.clone();
        let path = self.spec.path;

        let form = match self.form.as_mut() {
            Some(form) => form,
            None => return,
        };
        if form.validate().is_err() {
            return;
        }

        self.in_flight = true;
        self.upload_progress.store(0, Ordering::Relaxed);

        // Image fields holding a local path are uploaded first; the record
        // then references the stored filename. A failed save after a
        // successful upload is not compensated.
        for input in &mut form.fields {
            if input.spec.kind != FieldKind::Image || input.value.is_empty() {
                continue;
            }
            let local = Path::new(&input.value);
            if !local.exists() {
                continue;
            }
            match api
                .upload(path, local, self.upload_progress.clone())
                .await
            {
                Ok(filename) => {
                    input.value = filename;
                    input.cursor = input.value.len();
                }
                Err(e) => {
                    form.error = Some(e.to_string());
                    self.in_flight = false;
                    return;
                }
            }
        }

        let payload = form.payload();
        let result = match form.entity_id.clone() {
            Some(id) => api.update(path, &id, &payload).await,
            None => api.create(path, &payload).await,
        };

        match result {
            Ok(_) => {
                info!("saved record on {}", path);
                self.form = None;
                self.mode = Mode::Listing;
                self.notice = Some("Saved".to_string());
                self.refresh().await;
            }
            Err(e) => {
                // Stays in form mode; the message is the server's, verbatim.
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(e.to_string());
                }
            }
        }
        self.in_flight = false;
    }

    /// DELETE then re-fetch; no optimistic removal. A failure leaves the
    /// list unchanged and surfaces the error.
    pub async fn delete_confirmed(&mut self, id: &str) {
        if self.in_flight {
            return;
        }
        self.in_flight = true;
        let api = self.api.clone();
        match api.delete(self.spec.path, id).await {
            Ok(()) => {
                self.notice = Some("Deleted".to_string());
                self.mode = Mode::Listing;
                self.refresh().await;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.mode = Mode::Listing;
            }
        }
        self.in_flight = false;
    }

    /// Flip `isActive` in place via the dedicated endpoint, then re-fetch.
    pub async fn toggle_active(&mut self) {
        if !self.spec.can_toggle_active || self.in_flight {
            return;
        }
        let (id, active) = match self.selected_record() {
            Some(record) => match records::id(record) {
                Some(id) => (id.to_string(), records::flag(record, "isActive")),
                None => return,
            },
            None => return,
        };
        self.in_flight = true;
        let api = self.api.clone();
        match api.toggle_active(self.spec.path, &id, !active).await {
            Ok(()) => {
                self.notice = Some(if active { "Deactivated" } else { "Activated" }.to_string());
                self.refresh().await;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.in_flight = false;
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        match self.mode.clone() {
            Mode::Listing => self.handle_listing_key(key).await,
            Mode::ConfirmingDelete(id) => self.handle_confirm_key(key, &id).await,
            Mode::Creating | Mode::Editing(_) => self.handle_form_key(key).await,
        }
    }

    async fn handle_listing_key(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        match key.code {
            KeyCode::Up => self.select_previous(),
            KeyCode::Down => self.select_next(),
            KeyCode::Char('n') => self.open_create().await,
            KeyCode::Char('e') | KeyCode::Enter => self.open_edit().await,
            KeyCode::Char('d') | KeyCode::Delete => {
                let id = self
                    .selected_record()
                    .and_then(records::id)
                    .map(str::to_string);
                if let Some(id) = id {
                    self.mode = Mode::ConfirmingDelete(id);
                }
            }
            KeyCode::Char('a') => self.toggle_active().await,
            KeyCode::Char('r') => self.refresh().await,
            KeyCode::Esc => return Ok(ScreenAction::Back),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    async fn handle_confirm_key(&mut self, key: KeyEvent, id: &str) -> Result<ScreenAction> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => self.delete_confirmed(id).await,
            KeyCode::Char('n') | KeyCode::Esc => self.mode = Mode::Listing,
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    async fn handle_form_key(&mut self, key: KeyEvent) -> Result<ScreenAction> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl {
            match key.code {
                KeyCode::Char('s') => self.submit().await,
                KeyCode::Char('n') => {
                    if let Some(form) = self.form.as_mut() {
                        form.add_row();
                    }
                }
                KeyCode::Char('x') => {
                    if let Some(form) = self.form.as_mut() {
                        if let Some(row) = form.focused_row() {
                            form.remove_row(row);
                        }
                    }
                }
                _ => {}
            }
            return Ok(ScreenAction::None);
        }

        // In-progress edits are discarded on exit, like a page refresh.
        if key.code == KeyCode::Esc {
            self.form = None;
            self.mode = Mode::Listing;
            return Ok(ScreenAction::None);
        }

        if key.code == KeyCode::Enter {
            let multiline = self
                .form
                .as_ref()
                .and_then(FormState::focused)
                .map(|input| input.spec.kind.is_multiline())
                .unwrap_or(false);
            if multiline {
                if let Some(input) = self.form.as_mut().and_then(FormState::focused_mut) {
                    input.insert_char('\n');
                }
            } else {
                self.submit().await;
            }
            return Ok(ScreenAction::None);
        }

        let form = match self.form.as_mut() {
            Some(form) => form,
            None => return Ok(ScreenAction::None),
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.next_focus(),
            KeyCode::BackTab | KeyCode::Up => form.prev_focus(),
            KeyCode::Left => {
                if let Some(input) = form.focused_mut() {
                    match input.spec.kind {
                        FieldKind::Select { .. } => input.cycle_option(-1),
                        _ => input.move_cursor_left(),
                    }
                }
            }
            KeyCode::Right => {
                if let Some(input) = form.focused_mut() {
                    match input.spec.kind {
                        FieldKind::Select { .. } => input.cycle_option(1),
                        _ => input.move_cursor_right(),
                    }
                }
            }
            KeyCode::Home => {
                if let Some(input) = form.focused_mut() {
                    input.move_cursor_to_start();
                }
            }
            KeyCode::End => {
                if let Some(input) = form.focused_mut() {
                    input.move_cursor_to_end();
                }
            }
            KeyCode::Char(' ') => {
                if let Some(input) = form.focused_mut() {
                    if input.spec.kind == FieldKind::Checkbox {
                        input.toggle();
                    } else {
                        input.insert_char(' ');
                    }
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = form.focused_mut() {
                    input.insert_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = form.focused_mut() {
                    input.backspace();
                }
            }
            KeyCode::Delete => {
                if let Some(input) = form.focused_mut() {
                    input.delete_forward();
                }
            }
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    pub fn draw(&mut self, f: &mut Frame, area: Rect) {
        match self.mode.clone() {
            Mode::Listing => self.draw_listing(f, area, None),
            Mode::ConfirmingDelete(id) => self.draw_listing(f, area, Some(id)),
            Mode::Creating | Mode::Editing(_) => self.draw_form(f, area),
        }
    }

    fn draw_listing(&mut self, f: &mut Frame, area: Rect, confirming: Option<String>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let header = if let Some(ref error) = self.error {
            Paragraph::new(error.clone()).style(Styles::error())
        } else if let Some(ref notice) = self.notice {
            Paragraph::new(notice.clone()).style(Styles::success())
        } else {
            Paragraph::new(self.summaries.join("  |  ")).style(Styles::info())
        };
        f.render_widget(header, chunks[0]);

        render_record_table(
            f,
            chunks[1],
            self.spec.title,
            &self.spec.columns,
            &self.rows,
            self.selected,
            self.loading,
        );

        let mut hints = "n:new  e:edit  d:delete  r:refresh  Esc:back".to_string();
        if self.spec.can_toggle_active {
            hints.push_str("  a:toggle active");
        }
        f.render_widget(Paragraph::new(hints).style(Styles::inactive()), chunks[2]);

        if let Some(id) = confirming {
            let name = self
                .rows
                .iter()
                .find(|record| records::id(record) == Some(id.as_str()))
                .map(|record| {
                    let key = self.spec.columns.first().map(|c| c.key).unwrap_or("name");
                    records::cell_text(record, key)
                })
                .unwrap_or_default();
            let popup = centered_rect(50, 20, area);
            f.render_widget(Clear, popup);
            let prompt = Paragraph::new(format!("Delete \"{}\"?\n\ny: delete    n: keep", name))
                .wrap(Wrap { trim: false })
                .style(Styles::error())
                .block(
                    Block::default()
                        .title("Confirm delete")
                        .borders(Borders::ALL)
                        .border_style(Styles::error()),
                );
            f.render_widget(prompt, popup);
        }
    }

    fn draw_form(&mut self, f: &mut Frame, area: Rect) {
        let form = match self.form.as_ref() {
            Some(form) => form,
            None => return,
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);
        let content = chunks[0];

        // One 3-line box per field, one per repeat row; scroll the window
        // so the focused box stays visible.
        let field_count = form.fields.len();
        let box_count = field_count + form.rows.len();
        let visible = (content.height / 3).max(1) as usize;
        let focused_box = match form.focus {
            Focus::Field(i) => i,
            Focus::Row { row, .. } => field_count + row,
        };
        let start = (focused_box + 1).saturating_sub(visible);

        let mut dropdown: Option<(Rect, usize)> = None;
        for (slot, box_index) in (start..box_count.min(start + visible)).enumerate() {
            let box_area = Rect {
                x: content.x,
                y: content.y + (slot as u16) * 3,
                width: content.width,
                height: 3,
            };
            if box_index < field_count {
                let input = &form.fields[box_index];
                let focused = form.focus == Focus::Field(box_index);
                render_field(f, box_area, input, focused);
                if focused
                    && matches!(input.spec.kind, FieldKind::Select { .. })
                    && !input.options.is_empty()
                {
                    dropdown = Some((box_area, box_index));
                }
            } else {
                let row = box_index - field_count;
                let inputs = &form.rows[row];
                let cells = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints(
                        inputs
                            .iter()
                            .map(|_| Constraint::Ratio(1, inputs.len() as u32))
                            .collect::<Vec<_>>(),
                    )
                    .split(box_area);
                for (field, input) in inputs.iter().enumerate() {
                    let focused = form.focus == (Focus::Row { row, field });
                    render_field(f, cells[field], input, focused);
                }
            }
        }

        if let Some((anchor, box_index)) = dropdown {
            let input = &form.fields[box_index];
            let height = (input.options.len() as u16 + 2)
                .min(area.bottom().saturating_sub(anchor.y + 2));
            if height > 2 {
                let popup = Rect {
                    x: anchor.x,
                    y: anchor.y + 2,
                    width: anchor.width,
                    height,
                };
                render_options(f, popup, input);
            }
        }

        let stored_image = form.focused().filter(|input| {
            input.spec.kind == FieldKind::Image
                && !input.value.is_empty()
                && !Path::new(&input.value).exists()
        });
        let status = if self.in_flight {
            let pct = self.upload_progress.load(Ordering::Relaxed);
            if pct > 0 && pct < 100 {
                Paragraph::new(format!("Uploading... {}%", pct)).style(Styles::info())
            } else {
                Paragraph::new("Saving...").style(Styles::info())
            }
        } else if let Some(ref error) = form.error {
            Paragraph::new(error.clone()).style(Styles::error())
        } else if let Some(input) = stored_image {
            Paragraph::new(format!("Stored at {}", self.config.media_url(&input.value)))
                .style(Styles::info())
        } else {
            let title = if form.is_edit() { "editing" } else { "new record" };
            Paragraph::new(format!("{}: {}", self.spec.title, title)).style(Styles::info())
        };
        f.render_widget(status, chunks[1]);

        let mut hints = "Enter:save  Esc:cancel  Tab:next field".to_string();
        if form.repeat.is_some() {
            hints.push_str("  Ctrl+N:add row  Ctrl+X:remove row");
        }
        f.render_widget(Paragraph::new(hints).style(Styles::inactive()), chunks[2]);
    }
}
