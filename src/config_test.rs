use super::*;
use std::sync::Mutex;

const ALL_KEYS: [&str; 7] = [
    "MONGO_URL",
    "MONGO_DB",
    "REVIEWS_COLLECTION",
    "REVIEWS_UNIQUE_INDEX",
    "PORT",
    "AUTH_USER_HEADER",
    "REVIEWS_MAX_PER_PAGE",
];

// Env vars are process-global; every test here holds this lock.
static ENV_LOCK: Mutex<()> = Mutex::new(());

/// # Safety
/// Caller must hold `ENV_LOCK`.
unsafe fn clear_env() {
    for key in ALL_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn from_env_requires_mongo_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_env() };
    assert!(matches!(AppConfig::from_env(), Err(ConfigError::Missing("MONGO_URL"))));
}

#[test]
fn from_env_applies_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("MONGO_URL", "mongodb://localhost:27017");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(
        cfg.mongo,
        MongoConfig {
            url: "mongodb://localhost:27017".into(),
            database: DEFAULT_MONGO_DB.into(),
            collection: DEFAULT_REVIEWS_COLLECTION.into(),
            unique_index: true,
        }
    );
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.auth_user_header, DEFAULT_AUTH_USER_HEADER);
    assert_eq!(cfg.max_per_page, None);

    unsafe { clear_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("MONGO_URL", "mongodb://db:27017");
        std::env::set_var("MONGO_DB", "movies");
        std::env::set_var("REVIEWS_COLLECTION", "film_reviews");
        std::env::set_var("REVIEWS_UNIQUE_INDEX", "off");
        std::env::set_var("PORT", "9100");
        std::env::set_var("AUTH_USER_HEADER", "X-Forwarded-User");
        std::env::set_var("REVIEWS_MAX_PER_PAGE", "200");
    }

    let cfg = AppConfig::from_env().unwrap();
    assert_eq!(cfg.mongo.database, "movies");
    assert_eq!(cfg.mongo.collection, "film_reviews");
    assert!(!cfg.mongo.unique_index);
    assert_eq!(cfg.port, 9100);
    assert_eq!(cfg.auth_user_header, "x-forwarded-user");
    assert_eq!(cfg.max_per_page, Some(200));

    unsafe { clear_env() };
}

#[test]
fn from_env_rejects_bad_port() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("MONGO_URL", "mongodb://localhost:27017");
        std::env::set_var("PORT", "eighty");
    }

    assert!(matches!(AppConfig::from_env(), Err(ConfigError::Invalid { key: "PORT", .. })));

    unsafe { clear_env() };
}

#[test]
fn from_env_rejects_zero_max_per_page() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_env();
        std::env::set_var("MONGO_URL", "mongodb://localhost:27017");
        std::env::set_var("REVIEWS_MAX_PER_PAGE", "0");
    }

    assert!(matches!(AppConfig::from_env(), Err(ConfigError::Invalid { key: "REVIEWS_MAX_PER_PAGE", .. })));

    unsafe { clear_env() };
}

#[test]
fn parse_bool_variants() {
    assert_eq!(parse_bool("K", Some("YES".into())).unwrap(), Some(true));
    assert_eq!(parse_bool("K", Some("0".into())).unwrap(), Some(false));
    assert_eq!(parse_bool("K", None).unwrap(), None);
    assert!(parse_bool("K", Some("maybe".into())).is_err());
}
