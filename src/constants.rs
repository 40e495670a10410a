use rand::Rng;

/// SHA3-512 digest of the portal password, lowercase hex
/// Overridable through `[auth] password_sha3_512` in the config file
pub const REFERENCE_PASSWORD_SHA3_512: &str = "b0367be16b66930f935c4576151c97903302576e9cca8dd51b8624b556c498be8418db3afff86d25eec680cc003dd6e5c9c98397d1644d2b8aba741d38608045";

/// Logical database holding recordings, movement samples and purchases
pub const RECORDINGS_DB: &str = "recordings";

/// Logical database holding mirrored log records
pub const LOGS_DB: &str = "logs";

/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE: &str = "portal_session";

/// Unit prices in EUR
pub const APPLE_PRICE_EUR: f64 = 1.0;
pub const BANANA_PRICE_EUR: f64 = 2.0;

/// EUR per BTC used whenever the live rate source cannot be reached
pub const FALLBACK_BTC_RATE_EUR: f64 = 60000.0;

/// Generate a fresh random nonce for transaction hashing
/// Two checkouts with the same order fields still get distinct seeds
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect::<String>()
}
