pub mod api_response;
pub mod pagination;

pub use api_response::{ApiException, ApiResponse};
pub use pagination::{PaginationMetaData, X_PAGINATION};
