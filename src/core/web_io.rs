#[cfg(target_arch = "wasm32")]
use crate::core::io::Storage;
#[cfg(target_arch = "wasm32")]
use anyhow::{anyhow, Result};
#[cfg(target_arch = "wasm32")]
use async_trait::async_trait;

/// `window.localStorage` backend.
#[cfg(target_arch = "wasm32")]
pub struct WebStorage {
    local: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl WebStorage {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| anyhow!("No window available"))?;
        let local = window
            .local_storage()
            .map_err(|e| anyhow!("Failed to open localStorage: {:?}", e))?
            .ok_or_else(|| anyhow!("localStorage is disabled"))?;
        Ok(Self { local })
    }
}

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl Storage for WebStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.local
            .get_item(key)
            .map_err(|e| anyhow!("Get error: {:?}", e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.local
            .set_item(key, value)
            .map_err(|e| anyhow!("Set error: {:?}", e))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.local
            .remove_item(key)
            .map_err(|e| anyhow!("Remove error: {:?}", e))
    }
}
