//! Integration tests for scripted sessions.

use std::fs;
use std::path::PathBuf;

use medbook_cli::session::{CatalogSource, Session};
use medbook_cli::settings::Settings;

const CATALOG: &str = include_str!("../../medbook-model/data/catalog.json");

fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.display.appointment_year = 2031;
    settings.display.table_width = 200;
    settings
}

fn builtin_session() -> Session {
    Session::new(CatalogSource::Builtin, &settings()).unwrap()
}

fn run(session: &mut Session, line: &str) -> String {
    session
        .run_line(line)
        .unwrap_or_else(|| panic!("no output for {line:?}"))
}

fn unique_temp_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "medbook-session-{}-{}-{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir.join("catalog.json")
}

#[test]
fn test_book_and_cancel_script() {
    let mut session = builtin_session();
    let script = "\
# book and cancel
book 1
slot 10:00 AM
confirm

popover
cancel 1
cancel 1
";
    let mut out = Vec::new();
    session.run_script(script.as_bytes(), &mut out).unwrap();

    insta::assert_snapshot!(String::from_utf8(out).unwrap(), @r"
    Book Dr. Sarah Johnson (Available) at top 60, left 16
      ( ) 10:00 AM - Apr 23
      ( ) 1:00 PM - Apr 24
      ( ) 3:00 PM - Apr 25
      [Confirm] (pick a time first)
    Book Dr. Sarah Johnson (Available) at top 60, left 16
      (x) 10:00 AM - Apr 23
      ( ) 1:00 PM - Apr 24
      ( ) 3:00 PM - Apr 25
      [Confirm]
    Booked Dr. Sarah Johnson on Apr 23, 10:00 AM
    No booking in progress
    Cancelled appointment with Dr. Sarah Johnson
    No appointment with 1
    ");
    assert_eq!(session.listeners().active_count(), 0);
    assert!(session.store().state().appointments.is_empty());
}

#[test]
fn test_booking_updates_store_and_appointments() {
    let mut session = builtin_session();
    run(&mut session, "book 6");
    run(&mut session, "slot 3:00 PM");
    assert_eq!(
        run(&mut session, "confirm"),
        "Booked Dr. Robert Kim on Apr 30, 3:00 PM"
    );

    let state = session.store().state();
    assert!(!state.visible);
    assert!(state.selected_doctor.is_none());
    assert_eq!(state.appointments.len(), 1);
    assert_eq!(state.appointments[0].date, "Apr 30, 3:00 PM");

    let table = run(&mut session, "appointments");
    assert!(table.contains("April 30, 2031 3:00 PM"));
    assert!(table.contains("Arrhythmia, Preventive Cardiology"));

    assert_eq!(
        run(&mut session, "book 6"),
        "Dr. Robert Kim already has an appointment"
    );
    assert!(run(&mut session, "list").contains("Booked"));
}

#[test]
fn test_unavailable_doctor_cannot_be_booked() {
    let mut session = builtin_session();
    assert_eq!(
        run(&mut session, "book 3"),
        "Dr. Emily Rodriguez is not available"
    );
    assert_eq!(run(&mut session, "book 99"), "error: unknown doctor: 99");
    assert_eq!(run(&mut session, "confirm"), "error: no booking in progress");
    assert_eq!(session.change_count(), 0);
}

#[test]
fn test_confirm_without_slot_keeps_popover_open() {
    let mut session = builtin_session();
    run(&mut session, "book 2");
    assert_eq!(run(&mut session, "confirm"), "Pick a time first");
    assert_eq!(run(&mut session, "slot 3:00 PM"), "error: no slot at 3:00 PM");
    assert!(session.store().state().visible);
    assert!(session.store().state().appointments.is_empty());
}

#[test]
fn test_availability_filter_requires_two_slots() {
    let mut session = builtin_session();
    assert_eq!(run(&mut session, "time 3:00 PM"), "[3:00 PM ▼]");

    let list = run(&mut session, "list");
    assert!(list.contains("Dr. Sarah Johnson"));
    assert!(list.contains("Dr. Robert Kim"));
    assert!(!list.contains("Dr. James Wilson"));

    run(&mut session, "list");
    assert_eq!(session.filter_runs(), 1);

    run(&mut session, "time none");
    assert!(run(&mut session, "list").contains("Dr. James Wilson"));
    assert_eq!(session.filter_runs(), 2);
}

#[test]
fn test_photos_load_after_first_display() {
    let mut session = builtin_session();
    let first = run(&mut session, "list");
    assert!(first.contains("loading"));
    assert!(!first.contains("sarah-johnson.jpg"));

    let second = run(&mut session, "list");
    assert!(second.contains("https://images.example.com/doctors/sarah-johnson.jpg"));
    assert!(!second.contains("loading"));
}

#[test]
fn test_unknown_filter_value_is_rejected() {
    let mut session = builtin_session();
    assert_eq!(
        run(&mut session, "specialty Astrology"),
        "error: unknown specialty: Astrology"
    );
    assert!(run(&mut session, "list").contains("Dr. Aisha Patel"));
}

#[test]
fn test_dropdown_keyboard_selection_filters_list() {
    let mut session = builtin_session();
    run(&mut session, "dropdown specialty enter");
    run(&mut session, "dropdown specialty down");
    assert_eq!(
        run(&mut session, "dropdown specialty enter"),
        "[Cardiology ▼]"
    );
    assert_eq!(session.listeners().active_count(), 0);

    let list = run(&mut session, "list");
    assert!(list.contains("Dr. Sarah Johnson"));
    assert!(list.contains("Dr. Robert Kim"));
    assert!(!list.contains("Dr. Michael Chen"));

    run(&mut session, "dropdown specialty click");
    run(&mut session, "dropdown specialty pick 0");
    assert!(run(&mut session, "list").contains("Dr. Michael Chen"));
}

#[test]
fn test_escape_closes_every_open_control() {
    let mut session = builtin_session();
    run(&mut session, "dropdown time click");
    run(&mut session, "book 2");
    assert_eq!(session.listeners().active_count(), 2);

    assert_eq!(run(&mut session, "escape"), "Closed time, booking");
    assert_eq!(session.listeners().active_count(), 0);
    assert!(!session.store().state().visible);
    assert_eq!(run(&mut session, "popover"), "No booking in progress");
    assert_eq!(run(&mut session, "click-outside"), "Nothing to close");
}

#[test]
fn test_state_command_prints_json() {
    let mut session = builtin_session();
    run(&mut session, "book 1");
    let json: serde_json::Value = serde_json::from_str(&run(&mut session, "state")).unwrap();
    assert_eq!(json["visible"], true);
    assert_eq!(json["selectedDoctor"]["id"], "1");
    assert_eq!(json["popoverPosition"]["top"], 60.0);
}

#[test]
fn test_failed_reload_falls_back_until_reloaded() {
    let path = unique_temp_file("fallback");
    fs::write(&path, CATALOG).unwrap();
    let mut settings = settings();
    settings.display.show_error_details = true;
    let mut session = Session::new(CatalogSource::File(path.clone()), &settings).unwrap();

    run(&mut session, "book 1");
    run(&mut session, "slot 1:00 PM");
    run(&mut session, "confirm");

    fs::write(&path, "{ not json").unwrap();
    let notice = run(&mut session, "reload");
    assert!(notice.starts_with("Something went wrong\n"));
    assert!(notice.contains("[Refresh Page]"));
    assert!(notice.contains("details: catalog unavailable"));
    assert!(session.is_crashed());
    assert_eq!(
        run(&mut session, "list"),
        "error: the session failed; run `reload` to start over"
    );

    fs::write(&path, CATALOG).unwrap();
    assert_eq!(run(&mut session, "reload"), "Reloaded 6 doctors");
    assert!(!session.is_crashed());
    assert!(session.store().state().appointments.is_empty());
    assert!(run(&mut session, "appointments").starts_with("No Appointments Yet"));
}

#[test]
fn test_parse_errors_are_reported() {
    let mut session = builtin_session();
    assert_eq!(
        run(&mut session, "teleport now"),
        "error: unknown command: teleport"
    );
    assert!(session.run_line("   ").is_none());
    assert!(session.run_line("# comment").is_none());
    assert!(!session.is_crashed());
}
