//! HTTP transport layer.

pub mod transport;

pub use transport::{
    HttpMethod, HttpTransport, ServiceRequest, ServiceResponse, Transport, TransportError,
};
