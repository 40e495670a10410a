//! Toy shop checkout: EUR total, live BTC rate, transaction hash, payment QR.
//!
//! The QR file and the purchase row are written independently; a failed
//! insert leaves the QR image in place.

use chrono::Local;
use log::{info, warn};
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::Duration;

use crate::audio::round_to;
use crate::config::CheckoutConfig;
use crate::constants::{generate_nonce, APPLE_PRICE_EUR, BANANA_PRICE_EUR};
use crate::db::{self, Storage};
use crate::error::PortalError;
use crate::models::NewPurchase;
use crate::outcome::Outcome;

pub const QR_SUBDIR: &str = "qr";

/// Order form as submitted by `/checkout` (form) and `/update_payment` (JSON)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderFields {
    pub apples: i64,
    pub bananas: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
}

pub fn compute_total(apples: i64, bananas: i64) -> f64 {
    apples as f64 * APPLE_PRICE_EUR + bananas as f64 * BANANA_PRICE_EUR
}

/// Fetch the EUR price of one BTC
///
/// Expects `{"bitcoin": {"eur": <rate>}}`. Any network error, timeout or
/// unexpected body is reported as degraded.
pub async fn fetch_rate(client: &reqwest::Client, url: &str, timeout: Duration) -> Outcome<f64> {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(r) => r,
        Err(e) => return Outcome::Degraded(format!("rate request failed: {}", e)),
    };
    if !response.status().is_success() {
        return Outcome::Degraded(format!("rate source returned {}", response.status()));
    }
    let body: serde_json::Value = match response.json().await {
        Ok(v) => v,
        Err(e) => return Outcome::Degraded(format!("malformed rate response: {}", e)),
    };
    match body["bitcoin"]["eur"].as_f64() {
        Some(rate) if rate > 0.0 => Outcome::Ok(rate),
        _ => Outcome::Degraded(format!("no positive bitcoin.eur in {}", body)),
    }
}

/// Live rate, or the configured fallback when the source is unavailable
pub async fn rate_or_fallback(client: &reqwest::Client, config: &CheckoutConfig) -> (f64, bool) {
    match fetch_rate(client, &config.rate_url, Duration::from_secs(config.rate_timeout_secs)).await {
        Outcome::Ok(rate) => (rate, false),
        Outcome::Degraded(reason) => {
            warn!("Using fallback BTC rate {}: {}", config.fallback_rate, reason);
            (config.fallback_rate, true)
        }
    }
}

/// BTC amount for a EUR total, rounded to satoshis
pub fn btc_amount(total_eur: f64, rate: f64) -> f64 {
    if rate <= 0.0 {
        return 0.0;
    }
    round_to(total_eur / rate, 8)
}

/// SHA-256 over the order fields and a nonce, 64 lowercase hex chars
pub fn derive_tx_hash(order: &OrderFields, total_eur: f64, nonce: &str) -> String {
    let seed = format!(
        "{}|{}|{}|{}|{}|{:.2}|{}",
        order.apples, order.bananas, order.name, order.address, order.email, total_eur, nonce
    );
    format!("{:x}", Sha256::digest(seed.as_bytes()))
}

/// `bitcoin:<address>?amount=<btc>`
pub fn payment_uri(address: &str, amount_btc: f64) -> String {
    format!("bitcoin:{}?amount={:.8}", address, amount_btc)
}

/// Encode data as an SVG QR code with high error correction
pub fn render_qr_svg(data: &str) -> Result<String, PortalError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)
        .map_err(|e| PortalError::Qr(e.to_string()))?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .build())
}

/// Render `data` into `<static_dir>/qr/qr_<stem>.svg` and return the file name
pub async fn write_qr(static_dir: &Path, stem: &str, data: &str) -> Result<String, PortalError> {
    let image = render_qr_svg(data)?;
    let dir = static_dir.join(QR_SUBDIR);
    tokio::fs::create_dir_all(&dir).await?;
    let filename = format!("qr_{}.svg", stem);
    tokio::fs::write(dir.join(&filename), image).await?;
    Ok(filename)
}

/// QR for arbitrary content; the file name is derived from the content
pub async fn write_content_qr(static_dir: &Path, data: &str) -> Result<String, PortalError> {
    let digest = format!("{:x}", Sha256::digest(data.as_bytes()));
    write_qr(static_dir, &digest[..16], data).await
}

/// Input of the standalone QR generator
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QrRequest {
    /// `url`, `text` or `btc`
    pub qr_type: String,
    pub url: String,
    pub text: String,
    pub btc_address: String,
    pub btc_amount: String,
}

impl QrRequest {
    /// The string to encode, or a message describing what is missing
    pub fn content(&self) -> Result<String, &'static str> {
        match self.qr_type.as_str() {
            "url" if !self.url.trim().is_empty() => Ok(self.url.trim().to_string()),
            "url" => Err("Enter a URL"),
            "text" if !self.text.is_empty() => Ok(self.text.clone()),
            "text" => Err("Enter some text"),
            "btc" => {
                let address = self.btc_address.trim();
                if address.is_empty() {
                    return Err("Enter a Bitcoin address");
                }
                match self.btc_amount.trim().parse::<f64>() {
                    Ok(amount) if amount >= 0.0 => Ok(payment_uri(address, amount)),
                    _ => Err("Enter a valid BTC amount"),
                }
            }
            _ => Err("Unknown QR type"),
        }
    }
}

/// Priced order with its payment QR
#[derive(Debug, Clone, Serialize)]
pub struct PaymentQuote {
    pub tx_hash: String,
    pub qr_filename: String,
    pub total_eur: f64,
    pub total_btc: f64,
    pub btc_rate: f64,
    pub payment_uri: String,
    /// True when `btc_rate` is the fallback constant
    pub rate_is_fallback: bool,
}

/// Price an order and render its payment QR without recording a purchase
pub async fn quote(
    client: &reqwest::Client,
    config: &CheckoutConfig,
    static_dir: &Path,
    order: &OrderFields,
) -> Result<PaymentQuote, PortalError> {
    let total_eur = compute_total(order.apples, order.bananas);
    let (btc_rate, rate_is_fallback) = rate_or_fallback(client, config).await;
    let total_btc = btc_amount(total_eur, btc_rate);
    let tx_hash = derive_tx_hash(order, total_eur, &generate_nonce());
    let payment_uri = payment_uri(&config.btc_address, total_btc);
    let qr_filename = write_qr(static_dir, &tx_hash, &payment_uri).await?;

    Ok(PaymentQuote {
        tx_hash,
        qr_filename,
        total_eur,
        total_btc,
        btc_rate,
        payment_uri,
        rate_is_fallback,
    })
}

/// Full checkout: quote, then record the purchase
pub async fn checkout(
    storage: &Storage,
    client: &reqwest::Client,
    config: &CheckoutConfig,
    static_dir: &Path,
    order: &OrderFields,
) -> Result<PaymentQuote, PortalError> {
    let quote = quote(client, config, static_dir, order).await?;

    let purchase = NewPurchase {
        timestamp: Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        apples: order.apples,
        bananas: order.bananas,
        name: order.name.clone(),
        address: order.address.clone(),
        email: order.email.clone(),
        total_eur: quote.total_eur,
        total_btc: quote.total_btc,
        tx_hash: quote.tx_hash.clone(),
    };
    db::save_purchase(storage, &purchase).await?;
    info!(
        "Recorded purchase {} ({:.2} EUR = {:.8} BTC)",
        quote.tx_hash, quote.total_eur, quote.total_btc
    );

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> OrderFields {
        OrderFields {
            apples: 3,
            bananas: 2,
            name: "Ada".to_string(),
            address: "1 Main St".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_compute_total() {
        assert_eq!(compute_total(3, 2), 7.0);
        assert_eq!(compute_total(0, 0), 0.0);
        assert_eq!(compute_total(10, 0), 10.0);
    }

    #[test]
    fn test_btc_amount_rounds_to_eight_places() {
        assert_eq!(btc_amount(7.0, 60000.0), 0.00011667);
        assert_eq!(btc_amount(7.0, 0.0), 0.0);
    }

    #[test]
    fn test_tx_hash_format() {
        let hash = derive_tx_hash(&order(), 7.0, "nonce");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hash, derive_tx_hash(&order(), 7.0, "nonce"));
    }

    #[test]
    fn test_tx_hash_differs_by_nonce() {
        let a = derive_tx_hash(&order(), 7.0, &generate_nonce());
        let b = derive_tx_hash(&order(), 7.0, &generate_nonce());
        assert_ne!(a, b);
    }

    #[test]
    fn test_payment_uri() {
        assert_eq!(
            payment_uri("bc1qexample", 0.00011667),
            "bitcoin:bc1qexample?amount=0.00011667"
        );
    }

    #[test]
    fn test_qr_svg_renders() {
        let svg = render_qr_svg("bitcoin:bc1qexample?amount=0.00011667").unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_qr_request_content() {
        let req = |qr_type: &str| QrRequest {
            qr_type: qr_type.to_string(),
            url: " https://example.com ".to_string(),
            text: "hello".to_string(),
            btc_address: "bc1qexample".to_string(),
            btc_amount: "0.5".to_string(),
        };
        assert_eq!(req("url").content().unwrap(), "https://example.com");
        assert_eq!(req("text").content().unwrap(), "hello");
        assert_eq!(
            req("btc").content().unwrap(),
            "bitcoin:bc1qexample?amount=0.50000000"
        );
        assert!(req("vcard").content().is_err());

        let bad_amount = QrRequest {
            btc_amount: "lots".to_string(),
            ..req("btc")
        };
        assert!(bad_amount.content().is_err());
        assert!(QrRequest::default().content().is_err());
    }

    #[tokio::test]
    async fn test_write_content_qr_is_stable_per_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_content_qr(dir.path(), "https://example.com").await.unwrap();
        let b = write_content_qr(dir.path(), "https://example.com").await.unwrap();
        let c = write_content_qr(dir.path(), "hello").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(dir.path().join(QR_SUBDIR).join(&a).exists());
    }
}
