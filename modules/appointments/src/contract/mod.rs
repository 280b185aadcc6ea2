pub mod client;
pub mod error;
pub mod model;

pub use error::AppointmentsError;
pub use model::{Appointment, AppointmentPatch, Customer, NewAppointment, ServiceItem, SlotTime};
