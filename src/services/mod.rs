pub mod booking_service;
pub mod countdown_service;
pub mod notification_service;
pub mod schedule_service;
pub mod scheduling_service;
pub mod slot_service;
