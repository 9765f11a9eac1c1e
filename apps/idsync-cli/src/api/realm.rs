//! Realm and tenant URL resolution

use idsync_core::error::{SyncError, SyncResult};
use reqwest::Url;

/// Path segment addressing `realm` below the root realm.
///
/// Leading and repeated slashes are ignored; `/` is the root realm itself
/// and `parent/child` nests.
pub fn realm_path(realm: &str) -> String {
    realm
        .split('/')
        .filter(|s| !s.is_empty())
        .fold("/realms/root".to_string(), |mut path, segment| {
            path.push_str("/realms/");
            path.push_str(segment);
            path
        })
}

/// Scheme, host and port of `host`, dropping any path.
pub fn tenant_url(host: &str) -> SyncResult<String> {
    let url = Url::parse(host)
        .map_err(|e| SyncError::Validation(format!("invalid host URL '{host}': {e}")))?;
    let name = url
        .host_str()
        .ok_or_else(|| SyncError::Validation(format!("host URL '{host}' has no host name")))?;
    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), name, port),
        None => format!("{}://{}", url.scheme(), name),
    })
}
