//! Browser Local Storage
//!
//! The session token lives in `localStorage["supermaya_token"]`, so a reload
//! keeps the user logged in.

use supermaya::session::TOKEN_KEY;
use supermaya::{AccessToken, ClientError, ClientResult, TokenStore};

pub fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// [`TokenStore`] backed by `localStorage`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageTokenStore;

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<AccessToken> {
        let token = local_storage()?.get_item(TOKEN_KEY).ok().flatten()?;
        if token.is_empty() {
            None
        } else {
            Some(AccessToken::new(token))
        }
    }

    fn save(&self, token: &AccessToken) -> ClientResult<()> {
        let storage = local_storage()
            .ok_or_else(|| ClientError::Storage("localStorage is unavailable".to_string()))?;
        storage
            .set_item(TOKEN_KEY, token.as_str())
            .map_err(|e| ClientError::Storage(format!("{:?}", e)))
    }

    fn clear(&self) -> ClientResult<()> {
        match local_storage() {
            Some(storage) => storage
                .remove_item(TOKEN_KEY)
                .map_err(|e| ClientError::Storage(format!("{:?}", e))),
            None => Ok(()),
        }
    }
}
