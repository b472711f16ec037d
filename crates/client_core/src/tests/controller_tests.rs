use super::*;

use shared::filter::PageNumber;

const DEBOUNCE: Duration = Duration::from_millis(400);

fn page(n: u32) -> PageNumber {
    PageNumber::new(n).expect("page")
}

fn filter(search: &str, role: &str, company_id: &str, n: u32) -> FilterState {
    FilterState {
        search: search.into(),
        role: role.into(),
        company_id: company_id.into(),
        page: page(n),
    }
}

fn listing(items: Vec<&'static str>) -> ListingPage<&'static str> {
    ListingPage::new(
        items,
        vec![
            PaginationLink::disabled("&laquo; Previous"),
            PaginationLink::page("1", page(1), true),
            PaginationLink::page("2", page(2), false),
            PaginationLink::page("Next &raquo;", page(2), false),
        ],
    )
}

fn mounted(initial: FilterState) -> ListingController<&'static str> {
    ListingController::new(initial, listing(vec!["alpha"]), DEBOUNCE)
}

fn echo(request: &ListingRequest, items: Vec<&'static str>) -> ListingResponse<&'static str> {
    ListingResponse {
        page: listing(items),
        filters: Some(request.filter.clone()),
    }
}

#[test]
fn mounting_issues_nothing_and_mirrors_initial_state() {
    let initial = filter("pump", "", "", 2);
    let controller = mounted(initial.clone());
    assert_eq!(controller.draft(), &initial);
    assert_eq!(controller.committed(), &initial);
    assert_eq!(controller.canonical(), &initial);
    assert_eq!(controller.status(), CommitStatus::Settled);
    assert_eq!(controller.next_deadline(), None);
}

#[test]
fn rapid_search_edits_coalesce_into_one_commit() {
    let mut controller = mounted(FilterState::default());
    let start = Instant::now();

    for (offset, text) in [(0, "p"), (50, "pu"), (120, "pum"), (200, "pump")] {
        let now = start + Duration::from_millis(offset);
        controller.set_search_text(text, now);
        assert_eq!(controller.poll_debounce(now), None);
        assert_eq!(controller.draft().search, text);
    }

    assert_eq!(
        controller.poll_debounce(start + Duration::from_millis(599)),
        None
    );
    let request = controller
        .poll_debounce(start + Duration::from_millis(600))
        .expect("one commit");
    assert_eq!(request.seq, 1);
    assert_eq!(request.reason, CommitReason::Search);
    assert_eq!(request.filter, filter("pump", "", "", 1));
    assert_eq!(
        controller.poll_debounce(start + Duration::from_secs(5)),
        None
    );
}

#[test]
fn debounced_search_skips_commit_when_value_returns_to_committed() {
    let mut controller = mounted(filter("pump", "", "", 1));
    let start = Instant::now();
    controller.set_search_text("pumps", start);
    controller.set_search_text("pump", start + Duration::from_millis(100));
    assert_eq!(
        controller.poll_debounce(start + Duration::from_millis(500)),
        None
    );
    assert_eq!(controller.status(), CommitStatus::Settled);
}

#[test]
fn filter_changes_reset_page_to_first() {
    let mut controller = mounted(filter("", "", "", 5));

    let role = controller.set_role("technician").expect("role commit");
    assert_eq!(role.filter.page, PageNumber::FIRST);
    assert_eq!(role.reason, CommitReason::Role);

    controller.apply_response(role.seq, echo(&role, vec![]));
    let paged = controller
        .go_to_page(&PaginationLink::page("4", page(4), false))
        .expect("page commit");
    controller.apply_response(paged.seq, echo(&paged, vec![]));

    let company = controller.set_company("12").expect("company commit");
    assert_eq!(company.filter, filter("", "technician", "12", 1));

    let start = Instant::now();
    controller.set_search_text("pump", start);
    let search = controller
        .poll_debounce(start + DEBOUNCE)
        .expect("search commit");
    assert_eq!(search.filter, filter("pump", "technician", "12", 1));
}

#[test]
fn selecting_committed_value_again_does_not_commit() {
    let mut controller = mounted(filter("", "technician", "3", 2));
    assert_eq!(controller.set_role("technician"), None);
    assert_eq!(controller.set_company("3"), None);
    assert_eq!(controller.committed().page, page(2));
}

#[test]
fn pagination_keeps_committed_filters() {
    let mut controller = mounted(filter("foo", "tech", "", 1));
    let request = controller
        .go_to_page(&PaginationLink::page("3", page(3), false))
        .expect("page commit");
    assert_eq!(request.reason, CommitReason::Page);
    assert_eq!(request.filter, filter("foo", "tech", "", 3));
}

#[test]
fn pagination_ignores_uncommitted_draft_text() {
    let mut controller = mounted(filter("foo", "", "", 1));
    controller.set_search_text("foobar", Instant::now());
    let request = controller
        .go_to_page(&PaginationLink::page("2", page(2), false))
        .expect("page commit");
    assert_eq!(request.filter.search, "foo");
    assert_eq!(controller.draft().search, "foobar");
}

#[test]
fn disabled_link_is_a_no_op() {
    let initial = filter("pump", "technician", "", 2);
    let mut controller = mounted(initial.clone());
    assert_eq!(
        controller.go_to_page(&PaginationLink::disabled("Next &raquo;")),
        None
    );
    assert_eq!(controller.committed(), &initial);
    assert_eq!(controller.canonical(), &initial);
    assert_eq!(controller.status(), CommitStatus::Settled);
}

#[test]
fn committing_same_state_twice_yields_identical_queries() {
    let mut controller = mounted(filter("pump", "", "7", 1));
    let first = controller.commit();
    let second = controller.commit();
    assert_eq!(first.query(), second.query());
    assert_eq!(first.filter, second.filter);
    assert_eq!(first.options, second.options);
    assert_eq!(second.seq, first.seq + 1);
}

#[test]
fn commits_request_replace_and_preserve_flags() {
    let mut controller = mounted(FilterState::default());
    let request = controller.set_role("admin").expect("commit");
    assert_eq!(
        request.options,
        VisitOptions {
            preserve_state: true,
            replace: true,
            preserve_scroll: true,
        }
    );
}

#[test]
fn commit_is_pending_until_response_settles_it() {
    let mut controller = mounted(FilterState::default());
    let request = controller.set_role("admin").expect("commit");
    assert_eq!(controller.status(), CommitStatus::Pending { seq: request.seq });
    assert_eq!(controller.canonical(), &FilterState::default());

    let outcome = controller.apply_response(request.seq, echo(&request, vec!["bob"]));
    assert_eq!(outcome, ResponseOutcome::Applied);
    assert_eq!(controller.status(), CommitStatus::Settled);
    assert_eq!(controller.canonical(), &request.filter);
    assert_eq!(controller.page().items, vec!["bob"]);
}

#[test]
fn stale_response_is_dropped() {
    let mut controller = mounted(FilterState::default());
    let older = controller.set_role("admin").expect("first");
    let newer = controller.set_role("technician").expect("second");

    let applied = controller.apply_response(newer.seq, echo(&newer, vec!["tina"]));
    assert_eq!(applied, ResponseOutcome::Applied);

    let stale = controller.apply_response(older.seq, echo(&older, vec!["adam"]));
    assert_eq!(stale, ResponseOutcome::Stale { latest: newer.seq });
    assert_eq!(controller.canonical().role, "technician");
    assert_eq!(controller.page().items, vec!["tina"]);
}

#[test]
fn response_page_is_replaced_not_mutated() {
    let mut controller = mounted(FilterState::default());
    let before = controller.page();
    let request = controller.commit();
    controller.apply_response(request.seq, echo(&request, vec!["new"]));
    assert_eq!(before.items, vec!["alpha"]);
    assert_eq!(controller.page().items, vec!["new"]);
}

#[test]
fn response_keeps_search_draft_while_user_is_typing() {
    let mut controller = mounted(FilterState::default());
    let request = controller.set_role("admin").expect("commit");
    controller.set_search_text("pu", Instant::now());

    controller.apply_response(request.seq, echo(&request, vec![]));
    assert_eq!(controller.draft().search, "pu");
    assert_eq!(controller.draft().role, "admin");
}

#[test]
fn response_resyncs_draft_from_server_filters() {
    let mut controller = mounted(FilterState::default());
    let start = Instant::now();
    controller.set_search_text("  pump ", start);
    let request = controller.poll_debounce(start + DEBOUNCE).expect("commit");

    let response = ListingResponse {
        page: listing(vec![]),
        filters: Some(filter("pump", "", "", 1)),
    };
    controller.apply_response(request.seq, response);
    assert_eq!(controller.draft().search, "pump");
    assert_eq!(controller.canonical().search, "pump");
}

#[test]
fn missing_server_filters_fall_back_to_committed_filter() {
    let mut controller = mounted(FilterState::default());
    let request = controller
        .go_to_page(&PaginationLink::page("2", page(2), false))
        .expect("commit");
    controller.apply_response(
        request.seq,
        ListingResponse {
            page: listing(vec![]),
            filters: None,
        },
    );
    assert_eq!(controller.canonical(), &filter("", "", "", 2));
    assert_eq!(controller.draft().page, page(2));
}

#[test]
fn failed_fetch_settles_and_allows_retry() {
    let mut controller = mounted(FilterState::default());
    let request = controller.set_role("admin").expect("commit");
    controller.fail(request.seq);

    assert_eq!(controller.status(), CommitStatus::Settled);
    assert_eq!(controller.canonical(), &FilterState::default());
    assert_eq!(controller.committed(), &FilterState::default());
    assert_eq!(controller.draft(), &FilterState::default());

    let retry = controller.set_role("admin").expect("retry commit");
    assert_eq!(retry.filter.role, "admin");
}

#[test]
fn server_normalized_filter_becomes_the_pagination_base() {
    let mut controller = mounted(FilterState::default());
    let request = controller.set_role("bogus").expect("commit");
    controller.apply_response(
        request.seq,
        ListingResponse {
            page: listing(vec![]),
            filters: Some(filter("", "", "", 1)),
        },
    );

    assert_eq!(controller.committed(), &FilterState::default());
    assert_eq!(controller.draft().role, "");

    let paged = controller
        .go_to_page(&PaginationLink::page("2", page(2), false))
        .expect("page commit");
    assert_eq!(paged.query().to_query_string(), "page=2");

    let reselect = controller.set_role("bogus").expect("re-selecting commits again");
    assert_eq!(reselect.filter.role, "bogus");
}

#[test]
fn failed_fetch_rolls_draft_back_before_next_page_click() {
    let mut controller = mounted(filter("", "technician", "", 1));
    let request = controller.set_role("admin").expect("commit");
    controller.fail(request.seq);

    assert_eq!(controller.draft(), &filter("", "technician", "", 1));
    let paged = controller
        .go_to_page(&PaginationLink::page("2", page(2), false))
        .expect("page commit");
    assert_eq!(paged.filter, filter("", "technician", "", 2));
    assert_eq!(controller.draft().role, "technician");
}

#[test]
fn failure_keeps_search_draft_while_user_is_typing() {
    let mut controller = mounted(FilterState::default());
    let request = controller.set_company("4").expect("commit");
    controller.set_search_text("chlor", Instant::now());
    controller.fail(request.seq);

    assert_eq!(controller.draft().search, "chlor");
    assert_eq!(controller.draft().company_id, "");
    assert!(controller.next_deadline().is_some());
}

#[test]
fn immediate_commit_carrying_draft_search_cancels_debounce() {
    let mut controller = mounted(FilterState::default());
    let start = Instant::now();
    controller.set_search_text("pump", start);

    let request = controller.set_role("technician").expect("role commit");
    assert_eq!(request.filter, filter("pump", "technician", "", 1));
    assert_eq!(controller.next_deadline(), None);
    assert_eq!(controller.poll_debounce(start + DEBOUNCE), None);
}

#[test]
fn failure_of_older_commit_is_ignored() {
    let mut controller = mounted(FilterState::default());
    let older = controller.set_role("admin").expect("first");
    let newer = controller.set_company("9").expect("second");
    controller.fail(older.seq);
    assert_eq!(controller.status(), CommitStatus::Pending { seq: newer.seq });
    assert_eq!(controller.committed().company_id, "9");
}

#[test]
fn end_to_end_listing_scenario() {
    let mut controller = mounted(FilterState::default());
    let start = Instant::now();

    for (offset, text) in [(0, "p"), (60, "pu"), (130, "pum"), (200, "pump")] {
        controller.set_search_text(text, start + Duration::from_millis(offset));
    }
    let search = controller
        .poll_debounce(start + Duration::from_millis(600))
        .expect("search commit");
    assert_eq!(search.query().to_query_string(), "search=pump&page=1");
    controller.apply_response(search.seq, echo(&search, vec![]));

    let role = controller.set_role("technician").expect("role commit");
    assert_eq!(
        role.query().to_query_string(),
        "search=pump&role=technician&page=1"
    );
    controller.apply_response(role.seq, echo(&role, vec![]));

    let paged = controller
        .go_to_page(&PaginationLink::page("2", page(2), false))
        .expect("page commit");
    assert_eq!(
        paged.query().to_query_string(),
        "search=pump&role=technician&page=2"
    );
    controller.apply_response(paged.seq, echo(&paged, vec![]));

    assert_eq!(
        controller.go_to_page(&PaginationLink::disabled("Next &raquo;")),
        None
    );
    assert_eq!(controller.canonical(), &filter("pump", "technician", "", 2));
}
