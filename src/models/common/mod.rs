pub mod pagination;
pub mod response;
pub mod string_enum;

pub use pagination::{
    PaginatedResponse, PaginationInfo, PaginationQuery, deserialize_option_from_str,
};
pub use response::ApiResponse;
pub(crate) use string_enum::define_string_enum;
