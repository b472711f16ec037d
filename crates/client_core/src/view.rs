//! Presentation model handed back to the hosting page.

use serde::Serialize;
use shared::{
    domain::{
        role_badge_tone, BadgeTone, CompanySummary, InventoryItemSummary,
        MaintenanceReportSummary, StoreSummary, UserSummary,
    },
    filter::{FilterState, PageNumber},
    protocol::{ListingPage, PaginationLink},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<BadgeTone>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            badge: None,
        }
    }

    pub fn badge(text: impl Into<String>, tone: BadgeTone) -> Self {
        Self {
            text: text.into(),
            badge: Some(tone),
        }
    }
}

pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<Cell>;
}

impl TableRow for UserSummary {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Email", "Role", "Company", "Joined"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.to_string()),
            Cell::text(&self.name),
            Cell::text(&self.email),
            Cell::badge(&self.role, role_badge_tone(&self.role)),
            Cell::text(self.company_name.as_deref().unwrap_or("-")),
            Cell::text(self.created_at.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl TableRow for CompanySummary {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Contact", "Stores"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.to_string()),
            Cell::text(&self.name),
            Cell::text(self.contact_email.as_deref().unwrap_or("-")),
            Cell::text(self.stores_count.to_string()),
        ]
    }
}

impl TableRow for StoreSummary {
    fn headers() -> &'static [&'static str] {
        &["ID", "Name", "Company", "Address"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.to_string()),
            Cell::text(&self.name),
            Cell::text(&self.company_name),
            Cell::text(&self.address),
        ]
    }
}

impl TableRow for InventoryItemSummary {
    fn headers() -> &'static [&'static str] {
        &["ID", "SKU", "Item", "Store", "Qty"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.to_string()),
            Cell::text(&self.sku),
            Cell::text(&self.name),
            Cell::text(&self.store_name),
            Cell::badge(self.quantity.to_string(), self.stock_tone()),
        ]
    }
}

impl TableRow for MaintenanceReportSummary {
    fn headers() -> &'static [&'static str] {
        &["ID", "Title", "Store", "Technician", "Status", "Reported"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(self.id.to_string()),
            Cell::text(&self.title),
            Cell::text(&self.store_name),
            Cell::text(self.technician_name.as_deref().unwrap_or("unassigned")),
            Cell::badge(self.status.label(), self.status.badge_tone()),
            Cell::text(self.reported_at.format("%Y-%m-%d %H:%M").to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControl {
    pub label: String,
    pub target_page: Option<PageNumber>,
    pub active: bool,
    pub enabled: bool,
}

impl From<&PaginationLink> for PaginationControl {
    fn from(link: &PaginationLink) -> Self {
        Self {
            label: link.display_label().to_string(),
            target_page: link.target_page,
            active: link.is_active,
            enabled: link.is_enabled(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub pagination: Vec<PaginationControl>,
    pub filters: FilterState,
    pub pending: bool,
}

impl ListingView {
    pub fn render<T: TableRow>(page: &ListingPage<T>, filters: &FilterState, pending: bool) -> Self {
        Self {
            headers: T::headers().iter().map(|h| h.to_string()).collect(),
            rows: page.items.iter().map(TableRow::cells).collect(),
            pagination: page.pagination_links.iter().map(PaginationControl::from).collect(),
            filters: filters.clone(),
            pending,
        }
    }

    /// Plain-text table for terminal hosts.
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.text.chars().count());
                }
            }
        }

        let mut out = String::new();
        push_line(&mut out, self.headers.iter().map(String::as_str), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, rule.iter().map(String::as_str), &widths);
        for row in &self.rows {
            push_line(&mut out, row.iter().map(|cell| cell.text.as_str()), &widths);
        }
        if self.rows.is_empty() {
            out.push_str("(no results)\n");
        }

        let controls = self
            .pagination
            .iter()
            .map(|control| match (control.enabled, control.active) {
                (_, true) => format!("[{}]", control.label),
                (true, false) => control.label.clone(),
                (false, false) => format!("({})", control.label),
            })
            .collect::<Vec<_>>();
        if !controls.is_empty() {
            out.push_str(&controls.join(" "));
            out.push('\n');
        }
        out
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths.iter().copied())
        .map(|(text, width)| format!("{text:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
