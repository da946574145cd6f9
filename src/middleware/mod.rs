pub mod failures;
pub mod json_body;
pub mod path_param;
pub mod response;

pub use failures::{log_failures, FailureDetail};
pub use json_body::JsonBody;
pub use path_param::PathParam;
pub use response::{AckResult, ApiAck, ApiResponse, ApiResult};
