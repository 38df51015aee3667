//! Refresh-and-retry-once around calls that need a user access token.

use std::future::Future;

use tracing::warn;

use super::auth::TokenRefresher;
use super::data::MusicError;
use super::models::{Refreshed, TokenPair};

/// Run `call` with the current access token. If the provider rejects it as
/// unauthorized, refresh once and run `call` a second and final time with the
/// new token. Any failure of the second attempt, including another 401, is
/// returned as is.
pub(crate) async fn with_refresh<T, F, Fut>(
    refresher: &dyn TokenRefresher,
    tokens: &TokenPair,
    mut call: F,
) -> Result<Refreshed<T>, MusicError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, MusicError>>,
{
    match call(tokens.access_token.clone()).await {
        Ok(data) => Ok(Refreshed {
            data,
            tokens: tokens.clone(),
        }),
        Err(e) if e.is_unauthorized() => {
            warn!("access token rejected, refreshing and retrying once");
            let refreshed = refresher.refresh(&tokens.refresh_token).await?;
            let data = call(refreshed.access_token.clone()).await?;
            Ok(Refreshed {
                data,
                tokens: refreshed,
            })
        }
        Err(e) => Err(e),
    }
}
