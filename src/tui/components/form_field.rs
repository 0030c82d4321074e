//! Form field rendering
//!
//! Draws a [`FieldInput`] as a bordered box with label, placeholder, error
//! and cursor handling. Editing state itself lives in [`crate::forms`]; this
//! component only paints it.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::forms::FieldInput;
use crate::resources::FieldKind;
use crate::tui::ui::Styles;

/// Render one field. The cursor is placed for focused text-editable kinds.
pub fn render_field(f: &mut Frame, area: Rect, input: &FieldInput, focused: bool) {
    let display = input.display_value();
    let show_placeholder = display.is_empty() && !input.spec.placeholder.is_empty();
    let text = if show_placeholder {
        input.spec.placeholder.to_string()
    } else {
        display
    };

    let border_style = if focused {
        Styles::active_border()
    } else if input.error.is_some() {
        Styles::error()
    } else {
        Styles::inactive_border()
    };

    let mut title = input.spec.label.to_string();
    if input.spec.required {
        title.push_str(" *");
    }
    if let Some(ref error) = input.error {
        title = format!("{} - {}", title, error);
    } else if let Some(ref note) = input.options_error {
        title = format!("{} - {}", title, note);
    } else if matches!(input.spec.kind, FieldKind::Select { .. }) {
        title.push_str(" (←/→)");
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let text_style = if show_placeholder {
        Styles::inactive()
    } else {
        Styles::default()
    };

    let paragraph = Paragraph::new(text).style(text_style).block(block);
    f.render_widget(paragraph, area);

    if focused && input.is_text_editable() {
        let cursor_cols = input.value[..input.cursor].chars().count() as u16;
        let cursor_x = area.x + 1 + cursor_cols;
        let cursor_y = area.y + 1;
        if cursor_x < area.x + area.width.saturating_sub(1) {
            f.set_cursor(cursor_x, cursor_y);
        }
    }
}

/// Render the option list of a focused dropdown below its field.
pub fn render_options(f: &mut Frame, area: Rect, input: &FieldInput) {
    if input.options.is_empty() {
        return;
    }

    let items: Vec<ListItem> = input
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let style = if Some(i) == input.selected_option {
                Styles::selected()
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(option.name.clone(), style)))
        })
        .collect();

    let block = Block::default()
        .title("Options")
        .borders(Borders::ALL)
        .border_style(Styles::active_border());

    f.render_widget(Clear, area);
    f.render_widget(List::new(items).block(block), area);
}
