pub mod calendar;
pub mod extractor;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod schedule;
pub mod sql;
pub mod validate;

pub use extractor::{
    SafeClassIdI64, SafeCourseIdI64, SafeIDI64, SafeLecturerIdI64, SafeSessionIdI64,
    SafeSettingKey, SafeStudentIdI64,
};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::{contains_pattern, escape_like_pattern};
