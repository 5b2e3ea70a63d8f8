use std::time::Duration;

const REMOTE_TIMEOUT_SECONDS: u64 = 10;
const LOCAL_BACKEND_TIMEOUT_SECONDS: u64 = 5;
const HEALTH_TIMEOUT_SECONDS: u64 = 5;
const GEOCODE_TIMEOUT_SECONDS: u64 = 10;

pub fn remote_answer_timeout() -> Duration {
    Duration::from_secs(REMOTE_TIMEOUT_SECONDS)
}

pub fn local_backend_timeout() -> Duration {
    Duration::from_secs(LOCAL_BACKEND_TIMEOUT_SECONDS)
}

pub fn health_check_timeout() -> Duration {
    Duration::from_secs(HEALTH_TIMEOUT_SECONDS)
}

pub fn geocode_timeout() -> Duration {
    Duration::from_secs(GEOCODE_TIMEOUT_SECONDS)
}
