//! The administrable resource catalog
//!
//! One entry per backend collection. Field keys match the wire names the
//! backend reads and writes; reference fields name the collection their
//! dropdown is fed from.

use super::{FieldKind, FieldSpec, RepeatSpec, ResourceSpec, Rule, SummarySpec};

const SOCIAL_PLATFORMS: &[&str] = &["Facebook", "YouTube", "WhatsApp", "Twitter", "LinkedIn"];
const MEDIA_KINDS: &[&str] = &["photo", "video"];

/// Every resource the console administers, in menu order.
pub fn catalog() -> Vec<ResourceSpec> {
    vec![
        holidays(),
        holiday_types(),
        classes(),
        sections(),
        batches(),
        sessions(),
        branches(),
        exam_categories(),
        exam_groups(),
        exam_halls(),
        contacts(),
        facilities(),
        social_links(),
        institute_media(),
        expense_categories(),
        expenses(),
    ]
}

/// Lookup by stable key.
pub fn find(key: &str) -> Option<ResourceSpec> {
    catalog().into_iter().find(|spec| spec.key == key)
}

fn holidays() -> ResourceSpec {
    ResourceSpec::new("holidays", "Holidays", "Holiday calendar with date ranges", "/holidays")
        .field(
            FieldSpec::new("name", "Name", FieldKind::Text)
                .required()
                .min_len(3)
                .with_placeholder("শীতকালীন ছুটি"),
        )
        .field(FieldSpec::new("session", "Session", FieldKind::select_from("/sessions")).required())
        .repeat(RepeatSpec {
            key: "dates",
            label: "Date ranges",
            fields: vec![
                FieldSpec::new("fromDate", "From", FieldKind::Date).required(),
                FieldSpec::new("toDate", "To", FieldKind::Date).required(),
                FieldSpec::new("isFullDay", "Full day", FieldKind::Checkbox),
            ],
            rules: vec![Rule::DateOrder {
                from: "fromDate",
                to: "toDate",
            }],
        })
        .column("name", "Name", 28)
        .column("session", "Session", 14)
        .column("dates", "Ranges", 10)
        .summary(SummarySpec::TotalRangeDays {
            rows: "dates",
            from: "fromDate",
            to: "toDate",
            label: "Total days",
        })
        .summary(SummarySpec::UniqueRefs {
            field: "session",
            label: "Sessions",
        })
}

fn holiday_types() -> ResourceSpec {
    ResourceSpec::new(
        "holiday-types",
        "Holiday Types",
        "Categories the holiday calendar draws from",
        "/holiday-types",
    )
    .field(FieldSpec::new("name", "Name", FieldKind::Text).required().min_len(2))
    .field(FieldSpec::new("description", "Description", FieldKind::TextArea))
    .column("name", "Name", 30)
    .column("description", "Description", 36)
    .summary(SummarySpec::KeywordCount {
        field: "name",
        keyword: "সরকারি",
        label: "Government",
    })
    .summary(SummarySpec::KeywordCount {
        field: "name",
        keyword: "ধর্মীয়",
        label: "Religious",
    })
}

fn classes() -> ResourceSpec {
    ResourceSpec::new("classes", "Classes", "Grade levels offered by the institute", "/class")
        .field(FieldSpec::new("name", "Name", FieldKind::Text).required().min_len(2))
        .field(FieldSpec::new("numericGrade", "Numeric grade", FieldKind::Number).required())
        .rule(Rule::Positive {
            field: "numericGrade",
        })
        .column("name", "Name", 24)
        .column("numericGrade", "Grade", 8)
        .column("isActive", "Active", 8)
        .with_toggle_active()
}

fn sections() -> ResourceSpec {
    ResourceSpec::new("sections", "Sections", "Per-class sections", "/sections")
        .field(FieldSpec::new("name", "Name", FieldKind::Text).required())
        .field(FieldSpec::new("class", "Class", FieldKind::select_from("/class")).required())
        .field(FieldSpec::new("capacity", "Capacity", FieldKind::Number))
        .rule(Rule::Positive { field: "capacity" })
        .column("name", "Name", 20)
        .column("class", "Class", 20)
        .column("capacity", "Capacity", 10)
}

fn batches() -> ResourceSpec {
    ResourceSpec::new("batches", "Batches", "Class batches per session", "/batches")
        .field(FieldSpec::new("name", "Name", FieldKind::Text).required())
        .field(FieldSpec::new("class", "Class", FieldKind::select_from("/class")).required())
        .field(FieldSpec::new("session", "Session", FieldKind::select_from("/sessions")).required())
        .column("name", "Name", 20)
        .column("class", "Class", 18)
        .column("session", "Session", 14)
}

fn sessions() -> ResourceSpec {
    ResourceSpec::new("sessions", "Sessions", "Academic years", "/sessions")
        .field(
            FieldSpec::new("name", "Name", FieldKind::Text)
                .required()
                .min_len(4)
                .with_placeholder("2025-2026"),
        )
        .field(FieldSpec::new("startDate", "Start date", FieldKind::Date).required())
        .field(FieldSpec::new("endDate", "End date", FieldKind::Date).required())
        .field(FieldSpec::new("isCurrent", "Current session", FieldKind::Checkbox))
        .rule(Rule::DateOrder {
            from: "startDate",
            to: "endDate",
        })
        .column("name", "Name", 16)
        .column("startDate", "Start", 12)
        .column("endDate", "End", 12)
        .column("isCurrent", "Current", 8)
}

fn branches() -> ResourceSpec {
    ResourceSpec::new("branches", "Branches", "Institute branches and their contacts", "/branches")
        .field(FieldSpec::new("name", "Name", FieldKind::Text).required().min_len(2))
        .field(FieldSpec::new("address", "Address", FieldKind::TextArea).required())
        .field(
            FieldSpec::new("phone", "Phone", FieldKind::Text)
                .required()
                .min_len(6)
                .with_placeholder("+8801XXXXXXXXX"),
        )
        .field(FieldSpec::new("email", "Email", FieldKind::Text))
        .field(FieldSpec::new("logo", "Logo", FieldKind::Image))
        .column("name", "Name", 22)
        .column("phone", "Phone", 16)
        .column("isActive", "Active", 8)
        .with_toggle_active()
}

fn exam_categories() -> ResourceSpec {
    ResourceSpec::new(
        "exam-categories",
        "Exam Categories",
        "Top-level exam groupings",
        "/exam-categories",
    )
    .field(FieldSpec::new("name", "Name", FieldKind::Text).required().min_len(2))
    .field(FieldSpec::new("description", "Description", FieldKind::TextArea))
    .column("name", "Name", 28)
    .column("description", "Description", 36)
}

fn exam_groups() -> ResourceSpec {
    ResourceSpec::new("exam-groups", "Exam Groups", "Graded exam groups with mark bounds", "/exam-group")
        .field(FieldSpec::new("name", "Name", FieldKind::Text).required())
        .field(
            FieldSpec::new("examCategory", "Exam category", FieldKind::select_from("/exam-categories"))
                .required(),
        )
        .field(FieldSpec::new("totalMarks", "Total marks", FieldKind::Number).required())
        .field(FieldSpec::new("passMarks", "Pass marks", FieldKind::Number).required())
        .rule(Rule::Positive {
            field: "totalMarks",
        })
        .rule(Rule::Positive { field: "passMarks" })
        .rule(Rule::BoundedPair {
            lower: "passMarks",
            upper: "totalMarks",
        })
        .column("name", "Name", 22)
        .column("examCategory", "Category", 18)
        .column("totalMarks", "Total", 8)
        .column("passMarks", "Pass", 8)
}

fn exam_halls() -> ResourceSpec {
    ResourceSpec::new("exam-halls", "Exam Halls", "Halls and their seat layout", "/exam-hall")
        .field(FieldSpec::new("name", "Name", FieldKind::Text).required())
        .field(FieldSpec::new("image", "Image", FieldKind::Image))
        .repeat(RepeatSpec {
            key: "rooms",
            label: "Rooms",
            fields: vec![
                FieldSpec::new("roomNo", "Room no", FieldKind::Text).required(),
                FieldSpec::new("seats", "Seats", FieldKind::Number).required(),
            ],
            rules: vec![Rule::Positive { field: "seats" }],
        })
        .column("name", "Name", 26)
        .column("rooms", "Rooms", 10)
}

fn contacts() -> ResourceSpec {
    ResourceSpec::new("contacts", "Contacts", "Administrative contact directory", "/admin-contact")
        .field(FieldSpec::new("name", "Name", FieldKind::Text).required().min_len(2))
        .field(FieldSpec::new("designation", "Designation", FieldKind::Text))
        .field(FieldSpec::new("phone", "Phone", FieldKind::Text).required().min_len(6))
        .field(FieldSpec::new("email", "Email", FieldKind::Text))
        .column("name", "Name", 22)
        .column("designation", "Designation", 18)
        .column("phone", "Phone", 16)
}

fn facilities() -> ResourceSpec {
    ResourceSpec::new("facilities", "Facilities", "Campus facilities shown on the site", "/facilities")
        .field(FieldSpec::new("name", "Name", FieldKind::Text).required())
        .field(FieldSpec::new("description", "Description", FieldKind::RichText))
        .field(FieldSpec::new("image", "Image", FieldKind::Image))
        .column("name", "Name", 26)
        .column("description", "Description", 36)
}

fn social_links() -> ResourceSpec {
    ResourceSpec::new("social-links", "Social Links", "Public social profiles", "/social-links")
        .field(
            FieldSpec::new("platform", "Platform", FieldKind::select_static(SOCIAL_PLATFORMS))
                .required(),
        )
        .field(
            FieldSpec::new("url", "URL", FieldKind::Text)
                .required()
                .min_len(8)
                .with_placeholder("https://"),
        )
        .column("platform", "Platform", 14)
        .column("url", "URL", 42)
}

fn institute_media() -> ResourceSpec {
    ResourceSpec::new(
        "institute-media",
        "Institute Media",
        "Photo and video gallery entries",
        "/institute-media",
    )
    .field(FieldSpec::new("title", "Title", FieldKind::Text).required())
    .field(FieldSpec::new("kind", "Kind", FieldKind::select_static(MEDIA_KINDS)).required())
    .field(FieldSpec::new("url", "Video URL", FieldKind::Text))
    .field(FieldSpec::new("image", "Image", FieldKind::Image))
    .column("title", "Title", 28)
    .column("kind", "Kind", 8)
}

fn expense_categories() -> ResourceSpec {
    ResourceSpec::new(
        "expense-categories",
        "Expense Categories",
        "Categories the expense ledger draws from",
        "/expense-category",
    )
    .field(FieldSpec::new("name", "Name", FieldKind::Text).required().min_len(2))
    .field(FieldSpec::new("description", "Description", FieldKind::TextArea))
    .column("name", "Name", 28)
    .column("description", "Description", 36)
}

fn expenses() -> ResourceSpec {
    ResourceSpec::new("expenses", "Expenses", "Expense records with line items", "/expense-items")
        .field(FieldSpec::new("title", "Title", FieldKind::Text).required())
        .field(
            FieldSpec::new(
                "expenseCategory",
                "Category",
                FieldKind::select_from("/expense-category"),
            )
            .required(),
        )
        .field(FieldSpec::new("date", "Date", FieldKind::Date).required())
        .repeat(RepeatSpec {
            key: "items",
            label: "Items",
            fields: vec![
                FieldSpec::new("name", "Item", FieldKind::Text).required(),
                FieldSpec::new("amount", "Amount", FieldKind::Number).required(),
            ],
            rules: vec![Rule::Positive { field: "amount" }],
        })
        .column("title", "Title", 24)
        .column("expenseCategory", "Category", 18)
        .column("date", "Date", 12)
        .column("items", "Items", 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_paths_are_unique_and_relative() {
        let specs = catalog();
        assert_eq!(specs.len(), 16);
        let mut paths: Vec<_> = specs.iter().map(|s| s.path).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), specs.len());
        assert!(specs.iter().all(|s| s.path.starts_with('/')));
    }

    #[test]
    fn test_every_resource_has_columns_and_fields() {
        for spec in catalog() {
            assert!(!spec.fields.is_empty(), "{} has no fields", spec.key);
            assert!(!spec.columns.is_empty(), "{} has no columns", spec.key);
        }
    }

    #[test]
    fn test_repeat_groups_declare_their_row_fields() {
        for spec in catalog() {
            if let Some(repeat) = &spec.repeat {
                assert!(!repeat.fields.is_empty(), "{} repeat has no fields", spec.key);
            }
        }
    }

    #[test]
    fn test_find_by_key() {
        assert_eq!(find("holidays").unwrap().path, "/holidays");
        assert!(find("nonexistent").is_none());
    }
}
