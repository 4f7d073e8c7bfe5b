use exec_queue::config::Config;
use std::time::Duration;

// Env vars are process-global, so every case runs inside one test.
#[test]
fn config_from_env() {
    unsafe {
        std::env::remove_var("REDIS_URL");
        std::env::remove_var("QUEUE_TTL_SECS");
    }
    assert!(Config::from_env().is_err());

    unsafe {
        std::env::set_var("REDIS_URL", "redis://localhost:6379");
    }
    let config = Config::from_env().unwrap();
    assert!(!config.log_level.is_empty());
    assert_eq!(config.queue_ttl, Duration::from_secs(86_400));

    unsafe {
        std::env::set_var("QUEUE_TTL_SECS", "120");
    }
    assert_eq!(
        Config::from_env().unwrap().queue_ttl,
        Duration::from_secs(120)
    );

    unsafe {
        std::env::set_var("QUEUE_TTL_SECS", "0");
    }
    assert!(Config::from_env().is_err());

    unsafe {
        std::env::set_var("QUEUE_TTL_SECS", "soon");
    }
    assert!(Config::from_env().is_err());

    // Clean up
    unsafe {
        std::env::remove_var("REDIS_URL");
        std::env::remove_var("QUEUE_TTL_SECS");
    }
}
