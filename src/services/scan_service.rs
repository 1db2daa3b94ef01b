use base64::Engine as _;
use image::DynamicImage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use crate::error::{Result, ScanError};
use crate::models::analysis::ScanResponse;
use crate::models::config::ServiceConfig;
use crate::services::pipeline::Analyzer;

/// Rolling window of the per-client request limit.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Per-client request counter over a rolling window
pub struct RateLimiter {
    limit: usize,
    window: Duration,
    clients: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request; false when the client is over its limit.
    pub fn check(&self, client_id: &str) -> bool {
        self.check_at(client_id, Instant::now())
    }

    pub fn check_at(&self, client_id: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock();
        // Clients with nothing left in the window are dropped entirely.
        clients.retain(|_, requests| {
            requests.retain(|at| now.saturating_duration_since(*at) < self.window);
            !requests.is_empty()
        });

        let requests = clients.entry(client_id.to_string()).or_default();
        if requests.len() >= self.limit {
            return false;
        }
        requests.push(now);
        true
    }

    /// Number of clients with requests still inside the window.
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }
}

/// Status code plus envelope for one request
#[derive(Debug, Clone, PartialEq)]
pub struct ScanReply {
    pub status: u16,
    pub body: ScanResponse,
}

impl ScanReply {
    fn error(err: &ScanError) -> Self {
        Self {
            status: status_for(err),
            body: ScanResponse::failure(err.to_string()),
        }
    }
}

/// HTTP-style status for a failure that happened around the core call.
pub fn status_for(err: &ScanError) -> u16 {
    match err {
        ScanError::RateLimited => 429,
        ScanError::Decode(_) | ScanError::InvalidImage(_) => 400,
        ScanError::Timeout(_) => 408,
        _ => 500,
    }
}

/// Decode a base64 image payload, with or without a `data:` URL prefix.
pub fn decode_payload(payload: &str) -> Result<DynamicImage> {
    let data = payload
        .split_once(',')
        .map_or(payload, |(_, data)| data)
        .trim();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| ScanError::Decode(format!("Failed to decode base64: {}", e)))?;

    image::load_from_memory(&bytes)
        .map_err(|e| ScanError::Decode(format!("Failed to load image: {}", e)))
}

/// Request-handling shell around the analyzer: rate limit, payload
/// decoding, a bounded worker pool and a wall-clock timeout.
pub struct ScanService {
    analyzer: Arc<Analyzer>,
    limiter: RateLimiter,
    workers: Arc<Semaphore>,
    timeout: Duration,
}

impl ScanService {
    pub fn new(analyzer: Arc<Analyzer>, config: &ServiceConfig) -> Self {
        Self {
            analyzer,
            limiter: RateLimiter::new(config.requests_per_minute, RATE_WINDOW),
            workers: Arc::new(Semaphore::new(config.max_workers.max(1))),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Handle one uploaded payload from `client_id`.
    pub async fn handle(&self, client_id: &str, payload: &str) -> ScanReply {
        if !self.limiter.check(client_id) {
            warn!(client = client_id, "Rate limit exceeded");
            return ScanReply::error(&ScanError::RateLimited);
        }

        match decode_payload(payload) {
            Ok(image) => self.run(image).await,
            Err(e) => {
                debug!(client = client_id, "Rejected payload: {}", e);
                ScanReply::error(&e)
            }
        }
    }

    /// Run the analyzer on an already decoded image.
    ///
    /// A scan that outlives the timeout keeps its worker slot until it
    /// returns; only the reply is given up.
    pub async fn run(&self, image: DynamicImage) -> ScanReply {
        let analyzer = Arc::clone(&self.analyzer);
        let workers = Arc::clone(&self.workers);

        let work = async move {
            let permit = workers
                .acquire_owned()
                .await
                .map_err(|e| ScanError::Worker(e.to_string()))?;

            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                analyzer.scan(&image)
            })
            .await
            .map_err(|e| {
                if e.is_panic() {
                    ScanError::Worker("analysis worker panicked".to_string())
                } else {
                    ScanError::Worker(e.to_string())
                }
            })
        };

        let outcome = match tokio::time::timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(ScanError::Timeout(self.timeout.as_secs())),
        };

        match outcome {
            Ok(body) => ScanReply { status: 200, body },
            Err(e) => {
                error!("Scan request failed: {}", e);
                ScanReply::error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::AnalysisResult;
    use crate::services::catalog::ReferenceCatalog;
    use crate::services::ocr::{IconMatcher, OcrEngine, RecognitionOptions};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    struct SlowEngine(Duration);

    impl OcrEngine for SlowEngine {
        fn recognize(
            &self,
            _image: &DynamicImage,
            _options: &RecognitionOptions,
        ) -> Result<String> {
            std::thread::sleep(self.0);
            Ok(String::new())
        }
    }

    struct PanickingEngine;

    impl OcrEngine for PanickingEngine {
        fn recognize(
            &self,
            _image: &DynamicImage,
            _options: &RecognitionOptions,
        ) -> Result<String> {
            panic!("engine crashed");
        }
    }

    fn service(engine: impl OcrEngine + 'static, requests_per_minute: usize) -> ScanService {
        let analyzer = Analyzer::new(
            Arc::new(engine),
            ReferenceCatalog::empty(),
            IconMatcher::from_icons(Vec::new()),
        );
        let config = ServiceConfig {
            timeout_secs: 30,
            requests_per_minute,
            max_workers: 2,
        };
        ScanService::new(Arc::new(analyzer), &config)
    }

    fn png_payload() -> String {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 36, Rgb([10, 10, 10])));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
    }

    #[test]
    fn test_rate_limiter_window() {
        let limiter = RateLimiter::new(2, RATE_WINDOW);
        let start = Instant::now();

        assert!(limiter.check_at("a", start));
        assert!(limiter.check_at("a", start + Duration::from_secs(1)));
        assert!(!limiter.check_at("a", start + Duration::from_secs(2)));
        // Other clients are counted separately.
        assert!(limiter.check_at("b", start + Duration::from_secs(2)));
        // The first request has left the window.
        assert!(limiter.check_at("a", start + Duration::from_secs(61)));
    }

    #[test]
    fn test_rate_limiter_forgets_idle_clients() {
        let limiter = RateLimiter::new(2, RATE_WINDOW);
        let start = Instant::now();

        for id in 0..50 {
            assert!(limiter.check_at(&format!("10.0.0.{}", id), start));
        }
        assert_eq!(limiter.tracked_clients(), 50);

        // Once their window has passed only the newest caller is kept.
        assert!(limiter.check_at("late", start + Duration::from_secs(61)));
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&ScanError::RateLimited), 429);
        assert_eq!(status_for(&ScanError::Decode("x".to_string())), 400);
        assert_eq!(status_for(&ScanError::Timeout(30)), 408);
        assert_eq!(status_for(&ScanError::Worker("x".to_string())), 500);
    }

    #[test]
    fn test_decode_payload_strips_data_url_prefix() {
        let payload = format!("data:image/png;base64,{}", png_payload());
        let image = decode_payload(&payload).unwrap();
        assert_eq!((image.width(), image.height()), (64, 36));
    }

    #[test]
    fn test_decode_payload_rejects_garbage() {
        assert!(matches!(decode_payload("!!!"), Err(ScanError::Decode(_))));

        let not_an_image = base64::engine::general_purpose::STANDARD.encode(b"hello");
        assert!(matches!(decode_payload(&not_an_image), Err(ScanError::Decode(_))));
    }

    #[tokio::test]
    async fn test_handle_success() {
        let reply = service(SlowEngine(Duration::ZERO), 5)
            .handle("client", &png_payload())
            .await;

        assert_eq!(reply.status, 200);
        assert!(reply.body.success);
        assert_eq!(reply.body.analysis, Some(AnalysisResult::Unknown));
    }

    #[tokio::test]
    async fn test_handle_rate_limited() {
        let service = service(SlowEngine(Duration::ZERO), 1);
        let payload = png_payload();

        assert_eq!(service.handle("10.0.0.1", &payload).await.status, 200);
        let reply = service.handle("10.0.0.1", &payload).await;
        assert_eq!(reply.status, 429);
        assert_eq!(
            reply.body.error.as_deref(),
            Some("Rate limit exceeded. Please try again later.")
        );
    }

    #[tokio::test]
    async fn test_handle_bad_payload() {
        let reply = service(SlowEngine(Duration::ZERO), 5).handle("c", "not base64").await;
        assert_eq!(reply.status, 400);
        assert!(!reply.body.success);
        assert!(reply
            .body
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Image processing error")));
    }

    #[tokio::test]
    async fn test_handle_timeout() {
        let service = service(SlowEngine(Duration::from_millis(500)), 5)
            .with_timeout(Duration::from_millis(50));
        let reply = service.handle("c", &png_payload()).await;
        assert_eq!(reply.status, 408);
    }

    #[tokio::test]
    async fn test_handle_worker_panic() {
        let reply = service(PanickingEngine, 5).handle("c", &png_payload()).await;
        assert_eq!(reply.status, 500);
        assert!(!reply.body.success);
    }

    #[test]
    fn test_run_from_sync_context() {
        let service = service(SlowEngine(Duration::ZERO), 5);
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 36, Rgb([0, 0, 0])));
        let reply = tokio_test::block_on(service.run(image));
        assert_eq!(reply.status, 200);
    }
}
