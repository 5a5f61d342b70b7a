use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;

use appointment_cell::models::{BookAppointmentRequest, BookingError, BookingOutcome};
use appointment_cell::services::{BookingService, SlotLocks};
use shared_models::{AppointmentStatus, PHONE_NOT_PROVIDED};
use shared_utils::test_utils::{appointment, clinic_date, doctor, InMemorySlotStore};

fn request(patient: &str, doctor: &str, time: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_name: patient.to_string(),
        patient_phone: None,
        doctor: doctor.to_string(),
        date: clinic_date(),
        time: time.to_string(),
    }
}

#[tokio::test]
async fn test_scenario_b_taken_slot_is_rejected() {
    let store = Arc::new(InMemorySlotStore::clinic());
    let service = BookingService::new(store.clone());

    let outcome = service.book_appointment(request("Jane", "Ahmed", "10:00 AM")).await.unwrap();

    assert_matches!(outcome, BookingOutcome::SlotTaken { doctor, time, .. } => {
        assert_eq!(doctor, "Dr. Ahmed Khan");
        assert_eq!(time, "10:00 AM");
    });
    assert_eq!(store.appointments().len(), 1);
}

#[tokio::test]
async fn test_scenario_c_other_doctor_same_time_books() {
    let store = Arc::new(InMemorySlotStore::clinic());
    let service = BookingService::new(store.clone());

    let outcome = service.book_appointment(request("Jane", "Sara", "10:00 AM")).await.unwrap();

    let created = assert_matches!(outcome, BookingOutcome::Confirmed(a) => a);
    assert_eq!(created.patient_name, "Jane");
    assert_eq!(created.doctor, "Dr. Sara Malik");
    assert_eq!(created.time, "10:00 AM");
    assert_eq!(created.status, AppointmentStatus::Confirmed);
    assert_eq!(created.patient_phone.as_deref(), Some(PHONE_NOT_PROVIDED));
    assert_eq!(store.appointments().len(), 2);
}

#[tokio::test]
async fn test_cancelled_appointment_does_not_block() {
    let store = Arc::new(
        InMemorySlotStore::new(vec![doctor("Dr. Ahmed Khan", "General")]).with_appointments(vec![appointment(
            "Dr. Ahmed Khan",
            clinic_date(),
            "03:00 PM",
            AppointmentStatus::Cancelled,
        )]),
    );
    let service = BookingService::new(store.clone());

    let outcome = service.book_appointment(request("Jane", "ahmed", "03:00 PM")).await.unwrap();

    assert_matches!(outcome, BookingOutcome::Confirmed(_));
}

#[tokio::test]
async fn test_unknown_doctor_offers_roster() {
    let store = Arc::new(InMemorySlotStore::clinic());
    let service = BookingService::new(store.clone());

    let outcome = service.book_appointment(request("Jane", "Dr. Unknown", "09:00 AM")).await.unwrap();

    assert_matches!(outcome, BookingOutcome::DoctorNotFound { roster, .. } => {
        assert_eq!(roster, vec!["Dr. Ahmed Khan", "Dr. Sara Malik"]);
    });
    assert_eq!(store.appointments().len(), 1);
}

#[tokio::test]
async fn test_guard_reads_fresh_appointments() {
    let store = Arc::new(InMemorySlotStore::clinic());
    let service = BookingService::new(store.clone());

    service.book_appointment(request("Jane", "Sara", "11:00 AM")).await.unwrap();
    let second = service.book_appointment(request("Omar", "Sara", "11:00 AM")).await.unwrap();

    assert_matches!(second, BookingOutcome::SlotTaken { .. });
    assert_eq!(store.appointment_reads(), 2);
}

#[tokio::test]
async fn test_store_outage_is_an_error() {
    let store = Arc::new(InMemorySlotStore::clinic());
    store.set_unavailable(true);
    let service = BookingService::new(store);

    let result = service.book_appointment(request("Jane", "Sara", "11:00 AM")).await;

    assert_matches!(result, Err(BookingError::Store(_)));
}

#[tokio::test]
async fn test_concurrent_bookings_race_without_locks() {
    let store = Arc::new(InMemorySlotStore::clinic().with_read_delay(Duration::from_millis(50)));
    let service = BookingService::new(store.clone());

    let (first, second) = futures::join!(
        service.book_appointment(request("Jane", "Sara", "02:00 PM")),
        service.book_appointment(request("Omar", "Sara", "02:00 PM")),
    );

    // Both guards read before either insert lands.
    assert_matches!(first.unwrap(), BookingOutcome::Confirmed(_));
    assert_matches!(second.unwrap(), BookingOutcome::Confirmed(_));
    let double_booked = store
        .appointments()
        .iter()
        .filter(|a| a.doctor == "Dr. Sara Malik" && a.time == "02:00 PM")
        .count();
    assert_eq!(double_booked, 2);
}

#[tokio::test]
async fn test_slot_locks_serialize_same_slot() {
    let store = Arc::new(InMemorySlotStore::clinic().with_read_delay(Duration::from_millis(50)));
    let locks = Arc::new(SlotLocks::new());
    let service = BookingService::new(store.clone()).with_slot_locks(locks.clone());

    let (first, second) = futures::join!(
        service.book_appointment(request("Jane", "Sara", "02:00 PM")),
        service.book_appointment(request("Omar", "sara malik", "02:00 PM")),
    );

    let outcomes = [first.unwrap(), second.unwrap()];
    let confirmed = outcomes.iter().filter(|o| matches!(o, BookingOutcome::Confirmed(_))).count();
    let taken = outcomes.iter().filter(|o| matches!(o, BookingOutcome::SlotTaken { .. })).count();
    assert_eq!((confirmed, taken), (1, 1));
    assert!(locks.is_empty());
}

#[tokio::test]
async fn test_abandoned_bookings_release_slot_locks() {
    let store = Arc::new(InMemorySlotStore::clinic().with_read_delay(Duration::from_millis(200)));
    let locks = Arc::new(SlotLocks::new());
    let service = BookingService::new(store.clone()).with_slot_locks(locks.clone());
    let deadline = Duration::from_millis(20);

    // One caller holds the slot, two wait on it; all three are dropped.
    let (first, second, third) = futures::join!(
        tokio::time::timeout(deadline, service.book_appointment(request("Jane", "Sara", "02:00 PM"))),
        tokio::time::timeout(deadline, service.book_appointment(request("Omar", "Sara", "02:00 PM"))),
        tokio::time::timeout(deadline, service.book_appointment(request("Lina", "Sara", "02:00 PM"))),
    );

    assert!(first.is_err() && second.is_err() && third.is_err());
    assert!(locks.is_empty());
    assert_eq!(store.appointments().len(), 1);

    let outcome = service.book_appointment(request("Jane", "Sara", "02:00 PM")).await.unwrap();
    assert_matches!(outcome, BookingOutcome::Confirmed(_));
    assert!(locks.is_empty());
}

#[tokio::test]
async fn test_ambiguous_name_is_stored_as_spoken() {
    let store = Arc::new(InMemorySlotStore::new(vec![
        doctor("Dr. Sara Malik", "Cosmetic Dentistry"),
        doctor("Dr. Sara Lodhi", "Orthodontics"),
    ]));
    let service = BookingService::new(store.clone());

    let outcome = service.book_appointment(request("Jane", "Sara", "10:00 AM")).await.unwrap();
    assert_matches!(outcome, BookingOutcome::Confirmed(a) if a.doctor == "Sara");

    // "Sara" does not contain the full name, so that booking does not
    // block Dr. Sara Malik's 10:00 AM.
    let outcome = service.book_appointment(request("Omar", "Dr. Sara Malik", "10:00 AM")).await.unwrap();
    assert_matches!(outcome, BookingOutcome::Confirmed(a) if a.doctor == "Dr. Sara Malik");
    assert_eq!(store.appointments().len(), 2);
}
