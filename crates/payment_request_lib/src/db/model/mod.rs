mod payment_request_dao;

pub use payment_request_dao::PaymentRequestDbObj;
