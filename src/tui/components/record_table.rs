//! Record table for list screens
//!
//! One row per fetched entity, columns from the resource's [`ColumnSpec`]s,
//! plus the loading and empty states the list contract requires.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::records::{self, Record};
use crate::resources::ColumnSpec;
use crate::tui::ui::{pad_cell, Styles};

pub fn render_record_table(
    f: &mut Frame,
    area: Rect,
    title: &str,
    columns: &[ColumnSpec],
    rows: &[Record],
    selected: Option<usize>,
    loading: bool,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Styles::active_border());

    if loading {
        let paragraph = Paragraph::new("Loading...")
            .style(Styles::info())
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    if rows.is_empty() {
        let paragraph = Paragraph::new("No records yet. Press 'n' to add the first one.")
            .style(Styles::inactive())
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let header = Line::from(
        columns
            .iter()
            .map(|col| Span::styled(format!("{} ", pad_cell(col.label, col.width)), Styles::title()))
            .collect::<Vec<_>>(),
    );

    let mut items = vec![ListItem::new(header)];
    items.extend(rows.iter().enumerate().map(|(i, record)| {
        let style = if Some(i) == selected {
            Styles::selected()
        } else {
            Style::default()
        };
        let content = columns
            .iter()
            .map(|col| format!("{} ", pad_cell(&records::cell_text(record, col.key), col.width)))
            .collect::<String>();
        ListItem::new(Line::from(Span::styled(content, style)))
    }));

    f.render_widget(List::new(items).block(block), area);
}
