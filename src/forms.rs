//! Form state for the create/edit half of the CRUD screen contract
//!
//! A form's copy of an entity is a detached clone seeded once on entry;
//! nothing here is shared with the list. Validation is synchronous and
//! pre-submit: the first failing rule aborts with a deterministic message
//! and no request is issued.

use chrono::NaiveDate;
use serde_json::{Map, Number, Value};

use crate::records::{self, Record};
use crate::resources::{FieldKind, FieldSpec, RepeatSpec, ResourceSpec, Rule};

/// One option of a reference dropdown.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
}

/// Editable state of a single field.
#[derive(Debug, Clone)]
pub struct FieldInput {
    pub spec: FieldSpec,
    pub value: String,
    pub checked: bool,
    pub cursor: usize,
    pub options: Vec<SelectOption>,
    pub selected_option: Option<usize>,
    /// Reference list failed to load; the dropdown renders empty with this
    /// note and the form stays usable.
    pub options_error: Option<String>,
    pub error: Option<String>,
}

impl FieldInput {
    pub fn new(spec: FieldSpec) -> Self {
        Self {
            spec,
            value: String::new(),
            checked: false,
            cursor: 0,
            options: Vec::new(),
            selected_option: None,
            options_error: None,
            error: None,
        }
    }

    /// Seed from an existing record's field, converting wire shapes to
    /// editable text (ISO datetimes to `yyyy-mm-dd`, embedded references to
    /// their id).
    pub fn seed(&mut self, value: &Value) {
        match self.spec.kind {
            FieldKind::Checkbox => self.checked = value.as_bool().unwrap_or(false),
            FieldKind::Date => self.value = records::date_input(value),
            FieldKind::Select { .. } => self.value = records::ref_id(value).unwrap_or_default(),
            FieldKind::Number => {
                self.value = match value {
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => s.clone(),
                    _ => String::new(),
                }
            }
            _ => self.value = value.as_str().unwrap_or_default().to_string(),
        }
        self.cursor = self.value.len();
    }

    pub fn is_text_editable(&self) -> bool {
        !matches!(self.spec.kind, FieldKind::Checkbox | FieldKind::Select { .. })
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.is_text_editable() {
            return;
        }
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.error = None;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.value.replace_range(prev..self.cursor, "");
        self.cursor = prev;
        self.error = None;
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.value.len() {
            let next = self.value[self.cursor..]
                .chars()
                .next()
                .map(|c| self.cursor + c.len_utf8())
                .unwrap_or(self.value.len());
            self.value.replace_range(self.cursor..next, "");
            self.error = None;
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = self.value[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.value.len());
    }

    pub fn move_cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_to_end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Checkbox fields carry a boolean, not text.
    pub fn toggle(&mut self) {
        if self.spec.kind == FieldKind::Checkbox {
            self.checked = !self.checked;
            self.error = None;
        }
    }

    /// Attach the fetched reference list, aligning the selection with any
    /// seeded id. A seeded id that no longer exists server-side keeps its
    /// raw value with no selection.
    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.selected_option = options.iter().position(|o| o.id == self.value);
        self.options = options;
        self.options_error = None;
    }

    /// Cycle the dropdown selection; the field value follows the option id.
    pub fn cycle_option(&mut self, delta: i64) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len() as i64;
        let current = self.selected_option.map(|i| i as i64).unwrap_or(-1);
        let next = (current + delta).rem_euclid(len) as usize;
        self.selected_option = Some(next);
        self.value = self.options[next].id.clone();
        self.error = None;
    }

    /// What the field shows: dropdowns show the chosen option's name.
    pub fn display_value(&self) -> String {
        match self.spec.kind {
            FieldKind::Select { .. } => self
                .options
                .iter()
                .find(|o| o.id == self.value)
                .map(|o| o.name.clone())
                .unwrap_or_else(|| self.value.clone()),
            FieldKind::Checkbox => (if self.checked { "[x]" } else { "[ ]" }).to_string(),
            _ => self.value.clone(),
        }
    }

    fn validate(&mut self) -> Result<(), String> {
        self.error = None;
        let label = self.spec.label;
        let value = self.value.trim().to_string();

        if self.spec.required
            && self.spec.kind != FieldKind::Checkbox
            && value.is_empty()
        {
            return self.fail(format!("{} is required", label));
        }
        if self.spec.min_len > 0 && !value.is_empty() && value.chars().count() < self.spec.min_len {
            return self.fail(format!(
                "{} must be at least {} characters",
                label, self.spec.min_len
            ));
        }
        match self.spec.kind {
            FieldKind::Date if !value.is_empty() => {
                if NaiveDate::parse_from_str(&value, "%Y-%m-%d").is_err() {
                    return self.fail(format!("{} must be a valid date (YYYY-MM-DD)", label));
                }
            }
            FieldKind::Number if !value.is_empty() => {
                if value.parse::<f64>().is_err() {
                    return self.fail(format!("{} must be a number", label));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn fail(&mut self, message: String) -> Result<(), String> {
        self.error = Some(message.clone());
        Err(message)
    }

    fn as_value(&self) -> Value {
        match self.spec.kind {
            FieldKind::Checkbox => Value::Bool(self.checked),
            FieldKind::Number => {
                let trimmed = self.value.trim();
                if trimmed.is_empty() {
                    return Value::Null;
                }
                match trimmed.parse::<i64>() {
                    Ok(n) => Value::Number(Number::from(n)),
                    Err(_) => trimmed
                        .parse::<f64>()
                        .ok()
                        .and_then(Number::from_f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                }
            }
            _ => Value::String(self.value.clone()),
        }
    }
}

/// Where key input is currently routed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Field(usize),
    Row { row: usize, field: usize },
}

/// Detached, editable copy of one entity.
#[derive(Debug, Clone)]
pub struct FormState {
    /// `None` means create (POST); `Some` means full-object update (PUT).
    pub entity_id: Option<String>,
    pub fields: Vec<FieldInput>,
    pub repeat: Option<RepeatSpec>,
    pub rows: Vec<Vec<FieldInput>>,
    pub rules: Vec<Rule>,
    pub focus: Focus,
    pub error: Option<String>,
}

impl FormState {
    /// Blank form: empty strings, one empty repeating-group row.
    pub fn for_create(spec: &ResourceSpec) -> Self {
        let fields = spec.fields.iter().cloned().map(FieldInput::new).collect();
        let rows = spec
            .repeat
            .as_ref()
            .map(|repeat| vec![blank_row(repeat)])
            .unwrap_or_default();
        Self {
            entity_id: None,
            fields,
            repeat: spec.repeat.clone(),
            rows,
            rules: spec.rules.clone(),
            focus: Focus::Field(0),
            error: None,
        }
    }

    /// Form seeded from an existing record.
    pub fn for_edit(spec: &ResourceSpec, record: &Record) -> Self {
        let mut form = Self::for_create(spec);
        form.entity_id = records::id(record).map(str::to_string);

        for input in &mut form.fields {
            if let Some(value) = record.get(input.spec.key) {
                input.seed(value);
            }
        }

        if let Some(repeat) = &form.repeat {
            let seeded: Vec<Vec<FieldInput>> = record
                .get(repeat.key)
                .and_then(Value::as_array)
                .map(|rows| {
                    rows.iter()
                        .map(|row| {
                            let mut inputs = blank_row(repeat);
                            if let Some(map) = row.as_object() {
                                for input in &mut inputs {
                                    if let Some(value) = map.get(input.spec.key) {
                                        input.seed(value);
                                    }
                                }
                            }
                            inputs
                        })
                        .collect()
                })
                .unwrap_or_default();
            if !seeded.is_empty() {
                form.rows = seeded;
            }
        }

        form
    }

    pub fn is_edit(&self) -> bool {
        self.entity_id.is_some()
    }

    /// Flattened focus order: fields first, then repeat rows left to right.
    pub fn focus_slots(&self) -> Vec<Focus> {
        let mut slots: Vec<Focus> = (0..self.fields.len()).map(Focus::Field).collect();
        for (row, inputs) in self.rows.iter().enumerate() {
            for field in 0..inputs.len() {
                slots.push(Focus::Row { row, field });
            }
        }
        slots
    }

    pub fn next_focus(&mut self) {
        self.shift_focus(1);
    }

    pub fn prev_focus(&mut self) {
        self.shift_focus(-1);
    }

    fn shift_focus(&mut self, delta: i64) {
        let slots = self.focus_slots();
        if slots.is_empty() {
            return;
        }
        let current = slots.iter().position(|s| *s == self.focus).unwrap_or(0) as i64;
        let next = (current + delta).rem_euclid(slots.len() as i64) as usize;
        self.focus = slots[next];
    }

    pub fn focused(&self) -> Option<&FieldInput> {
        match self.focus {
            Focus::Field(i) => self.fields.get(i),
            Focus::Row { row, field } => self.rows.get(row).and_then(|r| r.get(field)),
        }
    }

    pub fn focused_mut(&mut self) -> Option<&mut FieldInput> {
        match self.focus {
            Focus::Field(i) => self.fields.get_mut(i),
            Focus::Row { row, field } => self.rows.get_mut(row).and_then(|r| r.get_mut(field)),
        }
    }

    /// Append a blank repeating-group row and focus its first field.
    pub fn add_row(&mut self) {
        if let Some(repeat) = &self.repeat {
            self.rows.push(blank_row(repeat));
            self.focus = Focus::Row {
                row: self.rows.len() - 1,
                field: 0,
            };
        }
    }

    /// Remove a row by index. The array never drops below one row, so
    /// removing the last remaining row is a no-op.
    pub fn remove_row(&mut self, index: usize) {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return;
        }
        self.rows.remove(index);
        if let Focus::Row { row, field } = self.focus {
            if row >= self.rows.len() {
                self.focus = Focus::Row {
                    row: self.rows.len() - 1,
                    field,
                };
            }
        }
    }

    /// Index of the row the focus sits in, if any.
    pub fn focused_row(&self) -> Option<usize> {
        match self.focus {
            Focus::Row { row, .. } => Some(row),
            Focus::Field(_) => None,
        }
    }

    /// Synchronous pre-submit validation. The first failing rule sets the
    /// owning field's error plus the form error, and aborts.
    pub fn validate(&mut self) -> Result<(), String> {
        self.error = None;
        for input in &mut self.fields {
            input.error = None;
        }
        for row in &mut self.rows {
            for input in row {
                input.error = None;
            }
        }

        let result = self.validate_inner();
        if let Err(ref message) = result {
            self.error = Some(message.clone());
        }
        result
    }

    fn validate_inner(&mut self) -> Result<(), String> {
        for input in &mut self.fields {
            input.validate()?;
        }

        let rules = self.rules.clone();
        for rule in &rules {
            if let Err(message) = check_rule(rule, &self.fields) {
                self.mark_rule_failure(rule, &message);
                return Err(message);
            }
        }

        let repeat = match self.repeat.clone() {
            Some(repeat) => repeat,
            None => return Ok(()),
        };
        for (index, row) in self.rows.iter_mut().enumerate() {
            for input in row.iter_mut() {
                if let Err(message) = input.validate() {
                    return Err(format!("{} #{}: {}", repeat.label, index + 1, message));
                }
            }
            for rule in &repeat.rules {
                if let Err(message) = check_rule(rule, row) {
                    mark_rule_failure_in(rule, row, &message);
                    return Err(format!("{} #{}: {}", repeat.label, index + 1, message));
                }
            }
        }
        Ok(())
    }

    fn mark_rule_failure(&mut self, rule: &Rule, message: &str) {
        mark_rule_failure_in(rule, &mut self.fields, message);
    }

    /// Build the JSON payload the backend expects: select fields contribute
    /// the reference id string, checkboxes a boolean, repeat groups an array
    /// of row objects.
    pub fn payload(&self) -> Value {
        let mut map = Map::new();
        for input in &self.fields {
            map.insert(input.spec.key.to_string(), input.as_value());
        }
        if let Some(repeat) = &self.repeat {
            let rows: Vec<Value> = self
                .rows
                .iter()
                .map(|row| {
                    let mut object = Map::new();
                    for input in row {
                        object.insert(input.spec.key.to_string(), input.as_value());
                    }
                    Value::Object(object)
                })
                .collect();
            map.insert(repeat.key.to_string(), Value::Array(rows));
        }
        Value::Object(map)
    }
}

fn blank_row(repeat: &RepeatSpec) -> Vec<FieldInput> {
    repeat.fields.iter().cloned().map(FieldInput::new).collect()
}

fn label_for<'a>(inputs: &'a [FieldInput], key: &'a str) -> &'a str {
    inputs
        .iter()
        .find(|i| i.spec.key == key)
        .map(|i| i.spec.label)
        .unwrap_or(key)
}

fn number_of(inputs: &[FieldInput], key: &str) -> Option<f64> {
    inputs
        .iter()
        .find(|i| i.spec.key == key)
        .and_then(|i| i.value.trim().parse::<f64>().ok())
}

fn date_of(inputs: &[FieldInput], key: &str) -> Option<NaiveDate> {
    inputs
        .iter()
        .find(|i| i.spec.key == key)
        .and_then(|i| NaiveDate::parse_from_str(i.value.trim(), "%Y-%m-%d").ok())
}

fn check_rule(rule: &Rule, inputs: &[FieldInput]) -> Result<(), String> {
    match rule {
        Rule::DateOrder { from, to } => {
            if let (Some(from_date), Some(to_date)) = (date_of(inputs, from), date_of(inputs, to)) {
                if from_date > to_date {
                    return Err(format!(
                        "{} must not be after {}",
                        label_for(inputs, from),
                        label_for(inputs, to)
                    ));
                }
            }
            Ok(())
        }
        Rule::Positive { field } => {
            if let Some(n) = number_of(inputs, field) {
                if n <= 0.0 {
                    return Err(format!(
                        "{} must be greater than zero",
                        label_for(inputs, field)
                    ));
                }
            }
            Ok(())
        }
        Rule::BoundedPair { lower, upper } => {
            if let (Some(low), Some(high)) = (number_of(inputs, lower), number_of(inputs, upper)) {
                if low > high {
                    return Err(format!(
                        "{} must not exceed {}",
                        label_for(inputs, lower),
                        label_for(inputs, upper)
                    ));
                }
            }
            Ok(())
        }
    }
}

fn mark_rule_failure_in(rule: &Rule, inputs: &mut [FieldInput], message: &str) {
    let key = match rule {
        Rule::DateOrder { from, .. } => from,
        Rule::Positive { field } => field,
        Rule::BoundedPair { lower, .. } => lower,
    };
    if let Some(input) = inputs.iter_mut().find(|i| i.spec.key == *key) {
        input.error = Some(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::catalog;
    use serde_json::json;

    fn spec(key: &str) -> ResourceSpec {
        catalog::find(key).unwrap()
    }

    fn holiday_record() -> Record {
        json!({
            "_id": "h1",
            "name": "শীতকালীন ছুটি",
            "session": {"_id": "s1", "name": "2025-2026"},
            "dates": [
                {"fromDate": "2025-01-01T00:00:00.000Z", "toDate": "2025-01-05T00:00:00.000Z", "isFullDay": true}
            ]
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn set_text(input: &mut FieldInput, text: &str) {
        input.value = text.to_string();
        input.cursor = text.len();
    }

    #[test]
    fn test_create_form_starts_blank_with_one_row() {
        let form = FormState::for_create(&spec("holidays"));
        assert!(form.entity_id.is_none());
        assert!(form.fields.iter().all(|f| f.value.is_empty()));
        assert_eq!(form.rows.len(), 1);
        assert_eq!(form.focus, Focus::Field(0));
    }

    #[test]
    fn test_edit_form_seeds_from_record() {
        let form = FormState::for_edit(&spec("holidays"), &holiday_record());
        assert_eq!(form.entity_id.as_deref(), Some("h1"));
        assert_eq!(form.fields[0].value, "শীতকালীন ছুটি");
        // Embedded reference collapses to its id for writing.
        assert_eq!(form.fields[1].value, "s1");
        // ISO datetimes become yyyy-mm-dd for the date inputs.
        assert_eq!(form.rows[0][0].value, "2025-01-01");
        assert_eq!(form.rows[0][1].value, "2025-01-05");
        assert!(form.rows[0][2].checked);
    }

    #[test]
    fn test_add_then_remove_rows_keeps_untouched_data() {
        let mut form = FormState::for_create(&spec("holidays"));
        form.add_row();
        form.add_row();
        assert_eq!(form.rows.len(), 3);
        set_text(&mut form.rows[0][0], "2025-01-01");
        set_text(&mut form.rows[1][0], "2025-02-01");
        set_text(&mut form.rows[2][0], "2025-03-01");

        form.remove_row(1);
        assert_eq!(form.rows.len(), 2);
        assert_eq!(form.rows[0][0].value, "2025-01-01");
        assert_eq!(form.rows[1][0].value, "2025-03-01");
    }

    #[test]
    fn test_removing_last_row_is_a_noop() {
        let mut form = FormState::for_create(&spec("holidays"));
        assert_eq!(form.rows.len(), 1);
        form.remove_row(0);
        assert_eq!(form.rows.len(), 1);
    }

    #[test]
    fn test_required_field_aborts_with_deterministic_message() {
        let mut form = FormState::for_create(&spec("holidays"));
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Name is required");
        assert_eq!(form.fields[0].error.as_deref(), Some("Name is required"));
        assert_eq!(form.error.as_deref(), Some("Name is required"));
    }

    #[test]
    fn test_min_len_rule() {
        let mut form = FormState::for_create(&spec("holidays"));
        set_text(&mut form.fields[0], "ab");
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Name must be at least 3 characters");
    }

    #[test]
    fn test_date_order_rule_in_repeat_rows() {
        let mut form = FormState::for_create(&spec("holidays"));
        set_text(&mut form.fields[0], "Winter break");
        set_text(&mut form.fields[1], "s1");
        set_text(&mut form.rows[0][0], "2025-01-07");
        set_text(&mut form.rows[0][1], "2025-01-05");
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Date ranges #1: From must not be after To");
        assert!(form.rows[0][0].error.is_some());
    }

    #[test]
    fn test_invalid_date_format_is_rejected() {
        let mut form = FormState::for_create(&spec("sessions"));
        set_text(&mut form.fields[0], "2025-2026");
        set_text(&mut form.fields[1], "soon");
        set_text(&mut form.fields[2], "2026-06-30");
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Start date must be a valid date (YYYY-MM-DD)");
    }

    #[test]
    fn test_pass_marks_bounded_by_total_marks() {
        let mut form = FormState::for_create(&spec("exam-groups"));
        set_text(&mut form.fields[0], "Midterm");
        set_text(&mut form.fields[1], "c1");
        set_text(&mut form.fields[2], "100");
        set_text(&mut form.fields[3], "120");
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Pass marks must not exceed Total marks");
        assert!(form.fields[3].error.is_some());
    }

    #[test]
    fn test_positive_rule() {
        let mut form = FormState::for_create(&spec("exam-groups"));
        set_text(&mut form.fields[0], "Midterm");
        set_text(&mut form.fields[1], "c1");
        set_text(&mut form.fields[2], "0");
        set_text(&mut form.fields[3], "0");
        let err = form.validate().unwrap_err();
        assert_eq!(err, "Total marks must be greater than zero");
    }

    #[test]
    fn test_valid_holiday_passes_and_builds_payload() {
        let mut form = FormState::for_create(&spec("holidays"));
        set_text(&mut form.fields[0], "Winter break");
        set_text(&mut form.fields[1], "s1");
        set_text(&mut form.rows[0][0], "2025-01-01");
        set_text(&mut form.rows[0][1], "2025-01-05");
        form.rows[0][2].toggle();
        form.validate().unwrap();

        let payload = form.payload();
        assert_eq!(
            payload,
            json!({
                "name": "Winter break",
                "session": "s1",
                "dates": [
                    {"fromDate": "2025-01-01", "toDate": "2025-01-05", "isFullDay": true}
                ]
            })
        );
    }

    #[test]
    fn test_number_fields_serialize_as_numbers() {
        let mut form = FormState::for_create(&spec("exam-groups"));
        set_text(&mut form.fields[2], "100");
        set_text(&mut form.fields[3], "33.5");
        let payload = form.payload();
        assert_eq!(payload["totalMarks"], json!(100));
        assert_eq!(payload["passMarks"], json!(33.5));
    }

    #[test]
    fn test_checkbox_branch_reads_checked_not_value() {
        let mut form = FormState::for_create(&spec("sessions"));
        let current = form
            .fields
            .iter_mut()
            .find(|f| f.spec.key == "isCurrent")
            .unwrap();
        current.insert_char('x');
        assert!(current.value.is_empty());
        current.toggle();
        assert!(current.checked);
        assert_eq!(form.payload()["isCurrent"], json!(true));
    }

    #[test]
    fn test_select_cycling_tracks_option_ids() {
        let mut form = FormState::for_create(&spec("holidays"));
        form.fields[1].set_options(vec![
            SelectOption { id: "s1".into(), name: "2024-2025".into() },
            SelectOption { id: "s2".into(), name: "2025-2026".into() },
        ]);
        form.fields[1].cycle_option(1);
        assert_eq!(form.fields[1].value, "s1");
        form.fields[1].cycle_option(1);
        assert_eq!(form.fields[1].value, "s2");
        assert_eq!(form.fields[1].display_value(), "2025-2026");
        form.fields[1].cycle_option(1);
        assert_eq!(form.fields[1].value, "s1");
    }

    #[test]
    fn test_focus_walks_fields_then_rows() {
        let mut form = FormState::for_create(&spec("holidays"));
        assert_eq!(form.focus, Focus::Field(0));
        form.next_focus();
        assert_eq!(form.focus, Focus::Field(1));
        form.next_focus();
        assert_eq!(form.focus, Focus::Row { row: 0, field: 0 });
        form.prev_focus();
        assert_eq!(form.focus, Focus::Field(1));
    }

    #[test]
    fn test_multibyte_editing_stays_on_char_boundaries() {
        let mut input = FieldInput::new(FieldSpec::new("name", "Name", FieldKind::Text));
        for c in "ছুটি".chars() {
            input.insert_char(c);
        }
        assert_eq!(input.value, "ছুটি");
        input.backspace();
        assert_eq!(input.value, "ছুট");
        input.move_cursor_left();
        input.delete_forward();
        assert_eq!(input.value, "ছু");
    }
}
