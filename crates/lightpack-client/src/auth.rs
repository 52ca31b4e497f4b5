//! API key authentication

use lightpack_core::{verbs, Command, Response};
use tracing::{debug, warn};

use crate::channel::CommandChannel;
use crate::error::{ClientError, Result};

/// Run the one-shot credential exchange
///
/// Without a key this succeeds without sending anything. With a key it sends
/// `apikey:<key>` and requires a literal `ok`. Any other response, including
/// a controller error token, becomes [`ClientError::AuthenticationFailed`];
/// transport failures are passed through unchanged.
pub async fn authenticate(channel: &mut CommandChannel, api_key: Option<&str>) -> Result<()> {
    let Some(key) = api_key else {
        debug!("No API key configured, skipping authentication");
        return Ok(());
    };

    match channel.execute(&Command::with_arg(verbs::API_KEY, key)).await {
        Ok(Response::Success) => {
            debug!("API key accepted");
            Ok(())
        }
        Ok(other) => {
            warn!("API key rejected: {}", other);
            Err(ClientError::AuthenticationFailed(format!(
                "controller answered {}",
                other
            )))
        }
        Err(ClientError::Protocol(e)) => {
            warn!("API key rejected: {}", e);
            Err(ClientError::AuthenticationFailed(e.to_string()))
        }
        Err(e) => Err(e),
    }
}
