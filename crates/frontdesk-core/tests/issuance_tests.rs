//! Ticket issuance integration tests, driven through the `FrontDesk` facade.

use frontdesk_core::{
    ChangeKind, Department, DeskConfig, FrontDesk, Ticket, TicketStatus, Topic, VisitRequest,
};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

fn today() -> String {
    chrono::Utc::now().date_naive().to_string()
}

fn desk_with_department(name: &str, capacity: u32) -> (FrontDesk, Department) {
    let desk = FrontDesk::open_in_memory(DeskConfig::default()).unwrap();
    let dept = Department::new(name.into(), capacity);
    desk.create_department(&dept).unwrap();
    (desk, dept)
}

fn visit(dept: &Department, name: &str, national_id: &str) -> VisitRequest {
    let mut request = VisitRequest::new(name.into(), dept.id.clone(), today());
    request.national_id = Some(national_id.into());
    request
}

#[test]
fn test_submission_issues_sequential_numbers() {
    let (desk, dept) = desk_with_department("Pediatrics", 30);

    for (n, expected) in [(1u32, "P001"), (2, "P002"), (3, "P003")] {
        let issued = desk
            .submit_visit(&visit(&dept, &format!("Patient {}", n), &format!("id-{}", n)))
            .unwrap();
        assert_eq!(issued.ticket.queue_number, expected);
        assert_eq!(issued.ticket.status, TicketStatus::Pending);
    }
}

#[test]
fn test_submission_publishes_patient_and_ticket_events() {
    let (desk, dept) = desk_with_department("Pediatrics", 30);

    let patient_events = Arc::new(Mutex::new(Vec::new()));
    let ticket_events = Arc::new(Mutex::new(Vec::new()));
    let p = patient_events.clone();
    let t = ticket_events.clone();
    let _p_sub = desk
        .events()
        .subscribe(Topic::Patients, move |e| p.lock().unwrap().push(e.kind));
    let _t_sub = desk
        .events()
        .subscribe(Topic::Tickets, move |e| t.lock().unwrap().push(e.kind));

    desk.submit_visit(&visit(&dept, "Amira Hassan", "29901011234567"))
        .unwrap();
    // Same national ID: existing patient updated, not created
    desk.submit_visit(&visit(&dept, "Amira Hassan", "29901011234567"))
        .unwrap();

    assert_eq!(
        *patient_events.lock().unwrap(),
        vec![ChangeKind::Insert, ChangeKind::Update]
    );
    assert_eq!(
        *ticket_events.lock().unwrap(),
        vec![ChangeKind::Insert, ChangeKind::Insert]
    );
}

#[test]
fn test_returning_patient_is_not_duplicated() {
    let (desk, dept) = desk_with_department("Pediatrics", 30);

    desk.submit_visit(&visit(&dept, "Tarek Aziz", "28812150001122"))
        .unwrap();
    let second = desk
        .submit_visit(&visit(&dept, "Tarek Aziz", "28812150001122"))
        .unwrap();

    assert!(!second.patient_created);
    assert_eq!(desk.patients().unwrap().len(), 1);
    assert_eq!(second.ticket.queue_number, "P002");
}

#[test]
fn test_inactive_department_not_offered_and_not_accepted() {
    let (desk, mut dept) = desk_with_department("Radiology", 10);
    dept.active = false;
    desk.update_department(&dept).unwrap();

    assert!(desk.active_departments().unwrap().is_empty());
    assert!(desk
        .submit_visit(&visit(&dept, "Layla Mansour", "30003030009876"))
        .is_err());
}

#[test]
fn test_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frontdesk.db");

    let dept = {
        let desk = FrontDesk::open(&path, DeskConfig::default()).unwrap();
        let dept = Department::new("Pediatrics".into(), 30);
        desk.create_department(&dept).unwrap();
        desk.submit_visit(&visit(&dept, "Amira Hassan", "29901011234567"))
            .unwrap();
        dept
    };

    let reopened = FrontDesk::open(&path, DeskConfig::default()).unwrap();
    let tickets = reopened.tickets_for_date(&today(), None).unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].ticket.department_id, dept.id);
    assert_eq!(tickets[0].patient_name, "Amira Hassan");
}

#[test]
fn test_free_text_filter_matches_queue_number_and_name() {
    let (desk, dept) = desk_with_department("Pediatrics", 30);
    desk.submit_visit(&visit(&dept, "Amira Hassan", "id-1"))
        .unwrap();
    desk.submit_visit(&visit(&dept, "Tarek Aziz", "id-2"))
        .unwrap();

    let by_number = desk.tickets_for_date(&today(), Some("P002")).unwrap();
    assert_eq!(by_number.len(), 1);
    assert_eq!(by_number[0].patient_name, "Tarek Aziz");

    let by_name = desk.tickets_for_date(&today(), Some("Amira")).unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].ticket.queue_number, "P001");

    let none = desk.tickets_for_date(&today(), Some("Nobody")).unwrap();
    assert!(none.is_empty());
}

proptest! {
    #[test]
    fn prop_queue_number_is_prefix_plus_three_digits(seq in 1u32..999) {
        let number = Ticket::format_queue_number('P', seq);
        prop_assert_eq!(number.len(), 4);
        prop_assert!(number.starts_with('P'));
        prop_assert_eq!(number[1..].parse::<u32>().unwrap(), seq);
    }

    #[test]
    fn prop_department_prefix_is_uppercase(name in "[a-zA-Z][a-zA-Z ]{0,20}") {
        let dept = Department::new(name, 10);
        let prefix = dept.queue_prefix();
        prop_assert!(prefix.is_ascii_uppercase());
    }
}
