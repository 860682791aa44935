pub(super) fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

pub(super) fn default_poll_timeout() -> u64 {
    30
}

pub(super) fn default_retry_delay() -> u64 {
    500
}

pub(super) fn default_request_timeout() -> u64 {
    40
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}
