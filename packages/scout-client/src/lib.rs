pub mod backend;
pub mod request;
pub mod session;

mod error;

pub use error::{Error, Result};
pub use request::{Method, RequestClient, RequestOptions, RetryPolicy};
pub use session::{RegisterRequest, SessionManager};
