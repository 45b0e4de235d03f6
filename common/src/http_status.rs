//! HTTP status codes used by the transport adapter.

/// HTTP status code chosen for a session outcome.
///
/// Kept independent of the HTTP framework so the status table can be
/// reasoned about (and tested) without a running server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpStatusCode(pub u16);

impl HttpStatusCode {
    pub const OK: Self = Self(200);
    pub const CREATED: Self = Self(201);
    pub const ACCEPTED: Self = Self(202);
    pub const BAD_REQUEST: Self = Self(400);
    pub const CONFLICT: Self = Self(409);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// 4xx client errors.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// 5xx server errors.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl From<u16> for HttpStatusCode {
    fn from(code: u16) -> Self {
        HttpStatusCode(code)
    }
}

impl std::fmt::Display for HttpStatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::HttpStatusCode;

    #[test]
    fn given_named_codes_when_classified_then_fall_in_expected_ranges() {
        assert!(HttpStatusCode::CREATED.is_success());
        assert!(HttpStatusCode::ACCEPTED.is_success());
        assert!(HttpStatusCode::CONFLICT.is_client_error());
        assert!(!HttpStatusCode::CONFLICT.is_server_error());
        assert!(HttpStatusCode::INTERNAL_SERVER_ERROR.is_server_error());
    }
}
