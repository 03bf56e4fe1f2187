use serde::{Deserialize, Serialize};

/// Fixed number of rows per listing page.
pub const ITEMS_PER_PAGE: i64 = 6;

/// Headline numbers for the dashboard overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardData {
    pub number_of_masters: i64,
    pub number_of_applications: i64,
    pub total_paid_applications: String,
    pub total_pending_applications: String,
}

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: i64,
}

/// Number of pages needed to show `count` rows.
pub fn total_pages(count: i64) -> i64 {
    (count + ITEMS_PER_PAGE - 1) / ITEMS_PER_PAGE
}

/// Row offset of a 1-based page. Pages below 1 are treated as the first page.
pub fn page_offset(page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * ITEMS_PER_PAGE
}

/// Format an amount in cents as US dollars, e.g. `$1,234.56`.
pub fn format_currency(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
