//! Per-entity configuration for the CRUD screen contract
//!
//! Every administrable resource is one [`ResourceSpec`]: its backend path,
//! form fields, validation rules, list columns and client-side summaries.
//! The generic list/form screen pair is instantiated from these specs.

pub mod catalog;
pub mod summary;

pub use catalog::catalog;

/// Kind of a form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    /// Multi-line plain text.
    TextArea,
    /// Long-form description, edited as an opaque multi-line editor.
    RichText,
    /// `yyyy-mm-dd`
    Date,
    Checkbox,
    Number,
    /// Reference dropdown fed by a collection fetch, or a static option list.
    Select {
        options_path: Option<&'static str>,
        options: &'static [&'static str],
    },
    /// Local file path, uploaded as multipart form data before the save.
    Image,
}

impl FieldKind {
    /// Dropdown over another resource's collection.
    pub fn select_from(path: &'static str) -> Self {
        FieldKind::Select {
            options_path: Some(path),
            options: &[],
        }
    }

    /// Dropdown over a fixed option list.
    pub fn select_static(options: &'static [&'static str]) -> Self {
        FieldKind::Select {
            options_path: None,
            options,
        }
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldKind::TextArea | FieldKind::RichText)
    }
}

/// One form field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_len: usize,
    pub placeholder: &'static str,
}

impl FieldSpec {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
            min_len: 0,
            placeholder: "",
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = len;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }
}

/// A repeating group of rows edited client-side before submit.
///
/// Add appends a blank row; remove filters by index and is a no-op on the
/// last remaining row, so the array never empties.
#[derive(Debug, Clone)]
pub struct RepeatSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub fields: Vec<FieldSpec>,
    pub rules: Vec<Rule>,
}

/// Cross-field validation rules, checked synchronously before submit.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// `from` must not be later than `to`.
    DateOrder {
        from: &'static str,
        to: &'static str,
    },
    /// Numeric field must be strictly positive.
    Positive { field: &'static str },
    /// `lower` must not exceed `upper` (pass marks vs total marks).
    BoundedPair {
        lower: &'static str,
        upper: &'static str,
    },
}

/// Client-side aggregate shown above the list, recomputed from the fetched
/// rows on every refresh. The backend has no aggregation endpoint.
#[derive(Debug, Clone)]
pub enum SummarySpec {
    /// Inclusive day span summed across every row's date ranges.
    TotalRangeDays {
        rows: &'static str,
        from: &'static str,
        to: &'static str,
        label: &'static str,
    },
    /// Count of distinct referenced ids.
    UniqueRefs {
        field: &'static str,
        label: &'static str,
    },
    /// Rows whose field contains the keyword.
    KeywordCount {
        field: &'static str,
        keyword: &'static str,
        label: &'static str,
    },
}

/// One column of the list table.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub width: usize,
}

impl ColumnSpec {
    pub fn new(key: &'static str, label: &'static str, width: usize) -> Self {
        Self { key, label, width }
    }
}

/// Full configuration of one administrable resource.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    /// Stable identifier, e.g. `holidays`.
    pub key: &'static str,
    /// Screen title.
    pub title: &'static str,
    /// One-line menu description.
    pub description: &'static str,
    /// Relative backend path, e.g. `/holidays`.
    pub path: &'static str,
    pub fields: Vec<FieldSpec>,
    pub repeat: Option<RepeatSpec>,
    pub rules: Vec<Rule>,
    pub columns: Vec<ColumnSpec>,
    pub summaries: Vec<SummarySpec>,
    /// Whether the backend exposes the in-place `isActive` toggle endpoint.
    pub can_toggle_active: bool,
}

impl ResourceSpec {
    pub fn new(
        key: &'static str,
        title: &'static str,
        description: &'static str,
        path: &'static str,
    ) -> Self {
        Self {
            key,
            title,
            description,
            path,
            fields: Vec::new(),
            repeat: None,
            rules: Vec::new(),
            columns: Vec::new(),
            summaries: Vec::new(),
            can_toggle_active: false,
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn repeat(mut self, repeat: RepeatSpec) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn column(mut self, key: &'static str, label: &'static str, width: usize) -> Self {
        self.columns.push(ColumnSpec::new(key, label, width));
        self
    }

    pub fn summary(mut self, summary: SummarySpec) -> Self {
        self.summaries.push(summary);
        self
    }

    pub fn with_toggle_active(mut self) -> Self {
        self.can_toggle_active = true;
        self
    }
}
