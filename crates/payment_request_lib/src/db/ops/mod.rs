mod payment_request_ops;

pub use payment_request_ops::*;
