pub mod bookings;
pub mod deliveries;
pub mod health;
pub mod options;
pub mod quotes;
