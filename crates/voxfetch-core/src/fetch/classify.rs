//! Map fetch errors onto the install error taxonomy.

use crate::error::{ErrorKind, InstallFailure};

use super::FetchError;

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_ssl_connect_error()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::ConnectFailure;
    }
    if e.is_aborted_by_callback() {
        return ErrorKind::Cancelled;
    }
    ErrorKind::Io
}

pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => ErrorKind::HttpStatus(*code),
        FetchError::Storage(_) => ErrorKind::Io,
        FetchError::Cancelled => ErrorKind::Cancelled,
    }
}

impl From<FetchError> for InstallFailure {
    fn from(e: FetchError) -> Self {
        InstallFailure::new(classify(&e), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_keeps_code() {
        assert_eq!(classify(&FetchError::Http(404)), ErrorKind::HttpStatus(404));
        assert_eq!(classify(&FetchError::Http(503)), ErrorKind::HttpStatus(503));
    }

    #[test]
    fn curl_timeout_and_connect() {
        // CURLE_OPERATION_TIMEDOUT = 28, CURLE_COULDNT_CONNECT = 7
        assert_eq!(classify_curl_error(&curl::Error::new(28)), ErrorKind::Timeout);
        assert_eq!(
            classify_curl_error(&curl::Error::new(7)),
            ErrorKind::ConnectFailure
        );
    }

    #[test]
    fn storage_and_cancel() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(classify(&FetchError::Storage(io)), ErrorKind::Io);
        let failure = InstallFailure::from(FetchError::Cancelled);
        assert_eq!(failure.kind, ErrorKind::Cancelled);
    }
}
