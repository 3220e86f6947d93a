pub mod audit;
pub mod bookings;
pub mod payments;
pub mod pricing;
pub mod scheduler;
pub mod upi;
pub mod verification;
