use sitecanvas_common::{Clock, KeyValueStore};

/// Clock backed by `Date.now()`
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}

/// Key-value store backed by `window.localStorage`.
///
/// Storage failures (quota, private browsing) degrade to a no-op store:
/// the editor keeps working, persistence is simply absent.
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        match Self::storage() {
            Some(storage) => storage
                .set_item(key, value)
                .map_err(|_| format!("localStorage write failed for {key}")),
            None => Err("localStorage is unavailable".to_string()),
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}
