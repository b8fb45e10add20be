use serde::Serialize;

/// Standard envelope for successful JSON responses.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}
