//! Background environment loading
//!
//! The fetch and decode run on a single worker thread. The result travels back over a
//! channel and is only ever handed to the session on the UI thread, when it polls.

use super::EnvironmentMap;
use crate::error::LoadError;
use log::{debug, info, warn};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Something that can produce a decoded environment, possibly slowly
pub trait EnvironmentSource: Send + 'static {
    /// Human readable origin, used in logs
    fn describe(&self) -> String;

    fn fetch(&self) -> Result<EnvironmentMap, LoadError>;
}

/// Fetches a Radiance HDR image with a single GET
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl EnvironmentSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<EnvironmentMap, LoadError> {
        let response = reqwest::blocking::get(&self.url)?.error_for_status()?;
        let bytes = response.bytes()?;
        debug!("Fetched {} bytes from {}", bytes.len(), self.url);
        decode_hdr(&bytes)
    }
}

/// Decodes a Radiance `.hdr` file into an environment map
pub fn decode_hdr(bytes: &[u8]) -> Result<EnvironmentMap, LoadError> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Hdr)?;
    let rgba = image.into_rgba32f();
    let (width, height) = rgba.dimensions();
    EnvironmentMap::from_rgba(width, height, rgba.into_raw())
}

/// Starts environment loads
pub struct AssetLoader;

impl AssetLoader {
    /// Starts fetching `source` on a worker thread and returns immediately
    pub fn spawn<S: EnvironmentSource>(source: S) -> PendingLoad {
        let (sender, receiver) = mpsc::channel();
        let origin = source.describe();
        info!("Requesting environment from {}", origin);

        let spawned = thread::Builder::new()
            .name("environment-loader".to_string())
            .spawn(move || {
                let result = source.fetch();
                if sender.send(result).is_err() {
                    debug!("Environment from {} arrived after its session ended", origin);
                }
            });

        // A failed spawn drops the sender, so the first poll reports `Disconnected`
        if let Err(e) = spawned {
            warn!("Could not start environment loader thread: {}", e);
        }

        PendingLoad { receiver }
    }
}

/// Handle to an in-flight load. Dropping it abandons the result.
pub struct PendingLoad {
    receiver: Receiver<Result<EnvironmentMap, LoadError>>,
}

impl PendingLoad {
    /// Non-blocking check; `None` while the load is still running
    pub fn poll(&self) -> Option<Result<EnvironmentMap, LoadError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(LoadError::Disconnected)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct MemorySource(Option<[f32; 3]>);

    impl EnvironmentSource for MemorySource {
        fn describe(&self) -> String {
            "memory".to_string()
        }

        fn fetch(&self) -> Result<EnvironmentMap, LoadError> {
            match self.0 {
                Some(rgb) => Ok(EnvironmentMap::solid(8, 4, rgb)),
                None => Err(LoadError::Http("404 Not Found".to_string())),
            }
        }
    }

    fn wait(pending: &PendingLoad) -> Result<EnvironmentMap, LoadError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = pending.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "loader never delivered");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_loader_delivers_success() {
        let pending = AssetLoader::spawn(MemorySource(Some([0.25, 0.5, 1.0])));
        let map = wait(&pending).expect("load should succeed");
        assert_eq!((map.width(), map.height()), (8, 4));
        assert_eq!(map.levels()[0].pixels[0], [0.25, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_loader_delivers_failure() {
        let pending = AssetLoader::spawn(MemorySource(None));
        assert!(matches!(wait(&pending), Err(LoadError::Http(_))));
    }

    #[test]
    fn test_radiance_hdr_decodes_into_mip_chain() {
        use image::codecs::hdr::HdrEncoder;
        use image::Rgb;

        let (width, height) = (8usize, 4usize);
        let texels: Vec<Rgb<f32>> = (0..width * height)
            .map(|i| Rgb([i as f32 * 0.5, 1.0, 2.0]))
            .collect();
        let mut bytes = Vec::new();
        HdrEncoder::new(&mut bytes)
            .encode(&texels, width, height)
            .expect("encode hdr");

        let map = decode_hdr(&bytes).expect("decode hdr");
        assert_eq!((map.width(), map.height()), (8, 4));
        assert_eq!(map.mip_level_count(), 4);
        let base = &map.levels()[0].pixels;
        assert_eq!(base[0], [0.0, 1.0, 2.0, 1.0]);
        assert_eq!(base[5], [2.5, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        assert!(matches!(decode_hdr(b"not an image"), Err(LoadError::Decode(_))));
    }
}
