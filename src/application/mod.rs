pub mod booking;

// Re-export key types for convenience
pub use booking::{
    start_pending_expiry_task, BookingRequest, BookingStatusSource, BookingSubmissionService,
    PaymentInitiator, PaymentNotification, PaymentReconciler, PollerConfig, PollerState,
    SlotAvailability, SlotAvailabilityResolver, StatusReconciliationPoller,
};
