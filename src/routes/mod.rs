pub mod attendance;

pub mod auth;

pub mod courses;

pub mod dashboard;

pub mod notifications;

pub mod reports;

pub mod room_access;

pub mod system;

pub mod users;

pub use attendance::configure_attendance_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use dashboard::configure_dashboard_routes;
pub use notifications::configure_notification_routes;
pub use reports::configure_report_routes;
pub use room_access::configure_room_access_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
