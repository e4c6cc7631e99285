use std::sync::Arc;

use assert_matches::assert_matches;
use futures::future::join_all;
use uuid::Uuid;

use appointment_cell::{AppointmentBookingService, AppointmentError, BookAppointmentRequest};
use shared_database::{RecordStore, Repository};
use shared_models::{AppointmentFilter, AppointmentStatus, TimeSlotFilter};
use shared_utils::test_utils::{at, seed_doctor, seed_slot};

fn book_request(patient_id: Uuid, time_slot_id: Uuid) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id: Some(patient_id),
        time_slot_id: Some(time_slot_id),
        note: Some("check-up".to_string()),
    }
}

async fn slot_available(store: &RecordStore, slot_id: Uuid) -> bool {
    store.time_slots.get(slot_id).await.unwrap().unwrap().available
}

/// A slot is available iff no PENDING or APPROVED appointment references it.
async fn assert_availability_invariant(store: &RecordStore) {
    let appointments = store.appointments.list(&AppointmentFilter::default()).await.unwrap();

    for slot in store.time_slots.list(&TimeSlotFilter::default()).await.unwrap() {
        let active = appointments
            .iter()
            .filter(|a| a.time_slot_id == slot.id && a.status.is_active())
            .count();

        assert!(active <= 1, "slot {} has {} active appointments", slot.id, active);
        assert_eq!(slot.available, active == 0, "slot {} availability", slot.id);
    }
}

#[tokio::test]
async fn booking_copies_slot_details_and_occupies_it() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let slot = seed_slot(&store, doctor.id, 10, 0).await;
    let service = AppointmentBookingService::new(&store);
    let patient = Uuid::new_v4();

    let appointment = service.book_appointment(book_request(patient, slot.id)).await.unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.doctor_id, doctor.id);
    assert_eq!(appointment.patient_id, patient);
    assert_eq!(appointment.appointment_time, at(10, 0));
    assert_eq!(appointment.note.as_deref(), Some("check-up"));
    assert!(!slot_available(&store, slot.id).await);
    assert_availability_invariant(&store).await;
}

#[tokio::test]
async fn booking_validates_inputs_and_slot() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let slot = seed_slot(&store, doctor.id, 10, 0).await;
    let service = AppointmentBookingService::new(&store);

    let no_patient = BookAppointmentRequest { patient_id: None, ..book_request(Uuid::nil(), slot.id) };
    assert_matches!(service.book_appointment(no_patient).await, Err(AppointmentError::InvalidArgument(_)));

    let no_slot = BookAppointmentRequest { time_slot_id: None, ..book_request(Uuid::new_v4(), slot.id) };
    assert_matches!(service.book_appointment(no_slot).await, Err(AppointmentError::InvalidArgument(_)));

    let missing = Uuid::new_v4();
    assert_matches!(
        service.book_appointment(book_request(Uuid::new_v4(), missing)).await,
        Err(AppointmentError::SlotNotFound(id)) if id == missing
    );

    service.book_appointment(book_request(Uuid::new_v4(), slot.id)).await.unwrap();
    assert_matches!(
        service.book_appointment(book_request(Uuid::new_v4(), slot.id)).await,
        Err(AppointmentError::SlotNotAvailable(_))
    );

    let all = service.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn approve_then_reject_is_an_invalid_transition() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let slot = seed_slot(&store, doctor.id, 10, 0).await;
    let service = AppointmentBookingService::new(&store);
    let booked = service.book_appointment(book_request(Uuid::new_v4(), slot.id)).await.unwrap();

    let approved = service.approve_appointment(booked.id).await.unwrap();
    assert_eq!(approved.status, AppointmentStatus::Approved);

    assert_matches!(
        service.reject_appointment(booked.id).await,
        Err(AppointmentError::InvalidStatusTransition {
            from: AppointmentStatus::Approved,
            to: AppointmentStatus::Rejected,
        })
    );
    assert_eq!(service.get_appointment(booked.id).await.unwrap().status, AppointmentStatus::Approved);
}

#[tokio::test]
async fn reject_keeps_the_slot_occupied() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let slot = seed_slot(&store, doctor.id, 10, 0).await;
    let service = AppointmentBookingService::new(&store);
    let booked = service.book_appointment(book_request(Uuid::new_v4(), slot.id)).await.unwrap();

    let rejected = service.reject_appointment(booked.id).await.unwrap();

    assert_eq!(rejected.status, AppointmentStatus::Rejected);
    assert!(!slot_available(&store, slot.id).await);
    assert_matches!(
        service.cancel_appointment(booked.id).await,
        Err(AppointmentError::InvalidStatusTransition { from: AppointmentStatus::Rejected, .. })
    );
}

#[tokio::test]
async fn cancel_frees_the_slot_for_another_patient() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let slot = seed_slot(&store, doctor.id, 10, 0).await;
    let service = AppointmentBookingService::new(&store);
    let booked = service.book_appointment(book_request(Uuid::new_v4(), slot.id)).await.unwrap();
    service.approve_appointment(booked.id).await.unwrap();

    let cancelled = service.cancel_appointment(booked.id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert!(slot_available(&store, slot.id).await);
    assert_availability_invariant(&store).await;

    let second = service.book_appointment(book_request(Uuid::new_v4(), slot.id)).await.unwrap();
    assert_eq!(second.status, AppointmentStatus::Pending);
    assert_availability_invariant(&store).await;

    assert_matches!(
        service.cancel_appointment(booked.id).await,
        Err(AppointmentError::InvalidStatusTransition { from: AppointmentStatus::Cancelled, .. })
    );
}

#[tokio::test]
async fn cancel_with_missing_slot_changes_nothing() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let slot = seed_slot(&store, doctor.id, 10, 0).await;
    let service = AppointmentBookingService::new(&store);
    let booked = service.book_appointment(book_request(Uuid::new_v4(), slot.id)).await.unwrap();

    store.time_slots.delete(slot.id).await.unwrap();

    assert_matches!(
        service.cancel_appointment(booked.id).await,
        Err(AppointmentError::SlotNotFound(id)) if id == slot.id
    );
    assert_eq!(service.get_appointment(booked.id).await.unwrap().status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn missing_appointment_is_not_found() {
    let service = AppointmentBookingService::new(&RecordStore::in_memory());
    let missing = Uuid::new_v4();

    assert_matches!(service.approve_appointment(missing).await, Err(AppointmentError::AppointmentNotFound(_)));
    assert_matches!(service.reject_appointment(missing).await, Err(AppointmentError::AppointmentNotFound(_)));
    assert_matches!(service.cancel_appointment(missing).await, Err(AppointmentError::AppointmentNotFound(_)));
    assert_matches!(
        service.reschedule_appointment(missing, Some(Uuid::new_v4())).await,
        Err(AppointmentError::AppointmentNotFound(_))
    );
}

#[tokio::test]
async fn reschedule_creates_a_new_appointment() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let old_slot = seed_slot(&store, doctor.id, 10, 0).await;
    let new_slot = seed_slot(&store, doctor.id, 11, 0).await;
    let service = AppointmentBookingService::new(&store);
    let patient = Uuid::new_v4();
    let booked = service.book_appointment(book_request(patient, old_slot.id)).await.unwrap();

    let rebooked = service.reschedule_appointment(booked.id, Some(new_slot.id)).await.unwrap();

    assert_ne!(rebooked.id, booked.id);
    assert_eq!(rebooked.status, AppointmentStatus::Pending);
    assert_eq!(rebooked.patient_id, patient);
    assert_eq!(rebooked.time_slot_id, new_slot.id);
    assert_eq!(rebooked.appointment_time, at(11, 0));
    assert_eq!(rebooked.note, booked.note);
    assert_eq!(service.get_appointment(booked.id).await.unwrap().status, AppointmentStatus::Cancelled);
    assert!(slot_available(&store, old_slot.id).await);
    assert!(!slot_available(&store, new_slot.id).await);
    assert_availability_invariant(&store).await;

    assert_eq!(service.list_by_patient(patient).await.unwrap().len(), 2);
}

#[tokio::test]
async fn reschedule_onto_taken_slot_leaves_old_appointment_cancelled() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let old_slot = seed_slot(&store, doctor.id, 10, 0).await;
    let taken = seed_slot(&store, doctor.id, 11, 0).await;
    let service = AppointmentBookingService::new(&store);
    let booked = service.book_appointment(book_request(Uuid::new_v4(), old_slot.id)).await.unwrap();
    service.book_appointment(book_request(Uuid::new_v4(), taken.id)).await.unwrap();

    let err = service.reschedule_appointment(booked.id, Some(taken.id)).await.unwrap_err();

    match err {
        AppointmentError::RescheduleIncomplete { cancelled_appointment_id, reason } => {
            assert_eq!(cancelled_appointment_id, booked.id);
            assert_matches!(*reason, AppointmentError::SlotNotAvailable(id) if id == taken.id);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(service.get_appointment(booked.id).await.unwrap().status, AppointmentStatus::Cancelled);
    assert!(slot_available(&store, old_slot.id).await);
    assert_availability_invariant(&store).await;
}

#[tokio::test]
async fn reschedule_checks_arguments_before_writing() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let slot = seed_slot(&store, doctor.id, 10, 0).await;
    let other = seed_slot(&store, doctor.id, 11, 0).await;
    let service = AppointmentBookingService::new(&store);
    let booked = service.book_appointment(book_request(Uuid::new_v4(), slot.id)).await.unwrap();

    assert_matches!(
        service.reschedule_appointment(booked.id, None).await,
        Err(AppointmentError::InvalidArgument(_))
    );

    service.reject_appointment(booked.id).await.unwrap();
    assert_matches!(
        service.reschedule_appointment(booked.id, Some(other.id)).await,
        Err(AppointmentError::InvalidStatusTransition { from: AppointmentStatus::Rejected, .. })
    );
    assert!(slot_available(&store, other.id).await);
}

#[tokio::test]
async fn listings_by_status_set_patient_and_doctor() {
    let store = RecordStore::in_memory();
    let ada = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let bob = seed_doctor(&store, "Dr. Bob", "Dermatology").await;
    let service = AppointmentBookingService::new(&store);
    let patient = Uuid::new_v4();

    let mut ids = Vec::new();
    for (doctor, hour) in [(&ada, 9), (&ada, 10), (&bob, 11), (&bob, 12)] {
        let slot = seed_slot(&store, doctor.id, hour, 0).await;
        let booked = service.book_appointment(book_request(patient, slot.id)).await.unwrap();
        ids.push(booked.id);
    }
    service.approve_appointment(ids[1]).await.unwrap();
    service.reject_appointment(ids[2]).await.unwrap();
    service.cancel_appointment(ids[3]).await.unwrap();

    assert_eq!(service.list_by_status(AppointmentStatus::Pending).await.unwrap().len(), 1);
    assert_eq!(service.list_upcoming().await.unwrap().len(), 2);
    assert_eq!(service.list_history().await.unwrap().len(), 2);
    assert_eq!(service.list_by_patient(patient).await.unwrap().len(), 4);
    assert!(service.list_by_patient(Uuid::new_v4()).await.unwrap().is_empty());
    assert_eq!(service.list_by_doctor(bob.id).await.unwrap().len(), 2);
    assert_availability_invariant(&store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_of_one_slot_have_one_winner() {
    let store = RecordStore::in_memory();
    let doctor = seed_doctor(&store, "Dr. Ada", "Cardiology").await;
    let slot = seed_slot(&store, doctor.id, 10, 0).await;
    let service = Arc::new(AppointmentBookingService::new(&store));

    let attempts = (0..20).map(|_| {
        let service = Arc::clone(&service);
        let request = book_request(Uuid::new_v4(), slot.id);
        tokio::spawn(async move { service.book_appointment(request).await })
    });

    let results: Vec<_> = join_all(attempts).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, AppointmentError::SlotNotAvailable(_))));
    assert_eq!(service.list_all().await.unwrap().len(), 1);
    assert_availability_invariant(&store).await;
}
