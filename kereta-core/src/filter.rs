use serde::{Deserialize, Serialize};

use crate::history::{BookingRecord, BookingStatus};

/// History tab category. Anything unrecognized parses as `All`, so a stale
/// or mistyped filter degrades to showing everything instead of nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Upcoming,
    Completed,
    Cancelled,
}

impl Category {
    pub fn parse(value: &str) -> Category {
        match value.to_ascii_lowercase().as_str() {
            "upcoming" => Category::Upcoming,
            "completed" => Category::Completed,
            "cancelled" => Category::Cancelled,
            _ => Category::All,
        }
    }

    fn matches(&self, status: BookingStatus) -> bool {
        match self {
            Category::All => true,
            Category::Upcoming => status == BookingStatus::Upcoming,
            Category::Completed => status == BookingStatus::Completed,
            Category::Cancelled => status == BookingStatus::Cancelled,
        }
    }
}

/// Stable filter by category; `All` returns the input unchanged.
pub fn filter_by_category(records: &[BookingRecord], category: Category) -> Vec<BookingRecord> {
    records
        .iter()
        .filter(|r| category.matches(r.status))
        .cloned()
        .collect()
}

/// Case-insensitive substring search across train name, order number, the
/// two endpoint display names, and fare class. A blank term returns the
/// full set. Input order is preserved.
pub fn search_text(records: &[BookingRecord], term: &str) -> Vec<BookingRecord> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|r| {
            r.train_name.to_lowercase().contains(&term)
                || r.order_number.to_lowercase().contains(&term)
                || r.route.from.display().to_lowercase().contains(&term)
                || r.route.to.display().to_lowercase().contains(&term)
                || r.class.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}
