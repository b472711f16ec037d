use super::*;

use chrono::{TimeZone, Utc};
use shared::domain::{ReportId, ReportStatus, UserId};

fn user(id: i64, name: &str, role: &str) -> UserSummary {
    UserSummary {
        id: UserId(id),
        name: name.into(),
        email: format!("{}@example.test", name.to_ascii_lowercase()),
        role: role.into(),
        company_name: None,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
    }
}

fn links() -> Vec<PaginationLink> {
    vec![
        PaginationLink::disabled("&laquo; Previous"),
        PaginationLink::page("1", PageNumber::FIRST, true),
        PaginationLink::page("2", PageNumber::new(2).unwrap(), false),
        PaginationLink::page("Next &raquo;", PageNumber::new(2).unwrap(), false),
    ]
}

#[test]
fn pagination_controls_use_display_labels() {
    let page = ListingPage::new(vec![user(1, "Ana", "admin")], links());
    let view = ListingView::render(&page, &FilterState::default(), false);

    let labels: Vec<_> = view.pagination.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, vec!["Previous", "1", "2", "Next"]);
    assert!(!view.pagination[0].enabled);
    assert!(view.pagination[1].active);
    assert_eq!(view.pagination[3].target_page, PageNumber::new(2));
}

#[test]
fn user_rows_carry_role_badges() {
    let page = ListingPage::new(vec![user(7, "Tina", "technician")], vec![]);
    let view = ListingView::render(&page, &FilterState::default(), true);

    assert_eq!(view.headers[3], "Role");
    assert_eq!(view.rows[0][3], Cell::badge("technician", BadgeTone::Info));
    assert_eq!(view.rows[0][4].text, "-");
    assert_eq!(view.rows[0][5].text, "2024-03-01");
    assert!(view.pending);
}

#[test]
fn report_status_renders_as_badge() {
    let report = MaintenanceReportSummary {
        id: ReportId(3),
        title: "Chlorinator leak".into(),
        store_name: "Harbor".into(),
        technician_name: None,
        status: ReportStatus::Completed,
        reported_at: Utc.with_ymd_and_hms(2024, 5, 9, 14, 30, 0).unwrap(),
    };
    let cells = report.cells();
    assert_eq!(cells[3].text, "unassigned");
    assert_eq!(cells[4], Cell::badge("Completed", BadgeTone::Success));
}

#[test]
fn text_table_aligns_columns_and_marks_controls() {
    let page = ListingPage::new(
        vec![user(1, "Ana", "admin"), user(22, "Bartholomew", "technician")],
        links(),
    );
    let text = ListingView::render(&page, &FilterState::default(), false).to_text();
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].starts_with("ID  Name         Email"));
    assert!(lines[1].starts_with("--  -----------"));
    assert!(lines[3].starts_with("22  Bartholomew"));
    assert_eq!(lines[4], "(Previous) [1] 2 Next");
}

#[test]
fn empty_page_says_so() {
    let page: ListingPage<UserSummary> = ListingPage::empty();
    let text = ListingView::render(&page, &FilterState::default(), false).to_text();
    assert!(text.contains("(no results)"));
}
