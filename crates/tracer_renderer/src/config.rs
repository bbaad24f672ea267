//! Render configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Fixed parameters of a [`crate::Raytracer`].
///
/// Everything here is fixed for the lifetime of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Framebuffer width in pixels
    pub width: u32,
    /// Framebuffer height in pixels
    pub height: u32,
    /// Samples per pixel per pass
    pub rays_per_pixel: u32,
    /// Maximum path depth; a hit at this depth contributes black
    pub max_bounces: u32,
    /// Worker count, `None` for one per hardware thread
    pub threads: Option<usize>,
    /// Session seed, mixed with the frame and pixel index per sample stream
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 300,
            rays_per_pixel: 1,
            max_bounces: 5,
            threads: None,
            seed: 1337,
        }
    }
}

impl RenderConfig {
    /// Set framebuffer resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, rays_per_pixel: u32, max_bounces: u32) -> Self {
        self.rays_per_pixel = rays_per_pixel;
        self.max_bounces = max_bounces;
        self
    }

    /// Set an explicit worker count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the session seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of cells the accumulation buffer must have.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Worker count after resolving `None` against the machine.
    pub fn worker_count(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check the configuration can drive a render.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.rays_per_pixel == 0 {
            return Err(RenderError::InvalidConfig(
                "rays_per_pixel must be at least 1".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(RenderError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pixel_count(), 500 * 300);
    }

    #[test]
    fn test_zero_max_bounces_is_valid() {
        let config = RenderConfig::default().with_quality(4, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        assert!(RenderConfig::default().with_resolution(0, 10).validate().is_err());
        assert!(RenderConfig::default().with_resolution(10, 0).validate().is_err());
        assert!(RenderConfig::default().with_quality(0, 5).validate().is_err());
        assert!(RenderConfig::default().with_threads(0).validate().is_err());
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(RenderConfig::default().with_threads(3).worker_count(), 3);
        assert!(RenderConfig::default().worker_count() >= 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "width": 64, "height": 32, "rays_per_pixel": 4 }"#)
                .unwrap();

        assert_eq!(config.width, 64);
        assert_eq!(config.height, 32);
        assert_eq!(config.rays_per_pixel, 4);
        assert_eq!(config.max_bounces, 5);
        assert_eq!(config.threads, None);
        assert_eq!(config.seed, 1337);
    }
}
