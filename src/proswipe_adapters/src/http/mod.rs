pub mod backend_client;
mod wire;

pub use backend_client::{HttpBackendClient, REQUEST_ID_HEADER};
