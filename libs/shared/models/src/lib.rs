pub mod error;
pub mod scheduling;

pub use scheduling::{
    name_contains, Appointment, AppointmentStatus, Doctor, NewAppointment, PHONE_NOT_PROVIDED,
    SLOT_LABELS,
};
