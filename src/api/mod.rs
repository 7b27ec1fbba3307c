pub mod request;
pub mod response;
pub mod routes;

pub use request::CalculateRequest;
pub use response::{CalculateResponse, ErrorResponse};
pub use routes::{create_router, AppState};
