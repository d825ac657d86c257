use http::Response;

/// Type alias for a response head before its body is attached.
pub type ResponseHead = Response<()>;
