//! Waiting for the first pairing code.
//!
//! Connecting and reading the stream both run on their own task under one
//! deadline, so a stalled connect or a silent stream cannot hold the
//! controller past it.

use crate::backend::{PairingEvent, ProtocolClient};
use crate::error::SessionError;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::time::timeout;

pub(crate) const PAIRING_CODE_UNAVAILABLE: &str = "Unable to obtain pairing code";

/// Open the pairing stream, connect `client` and wait for the first code.
///
/// The stream has to be opened before connecting, otherwise the first code
/// can be emitted before anybody listens. `deadline` covers the connect and
/// the wait for the code.
///
/// # Errors
///
/// - [`SessionError::PairingStream`] if the stream cannot be opened or ends without a code
/// - [`SessionError::Connect`] if the client fails to connect
/// - [`SessionError::PairingTimeout`] if no code arrives within `deadline`
pub(crate) async fn obtain_code(
    client: &Arc<dyn ProtocolClient>,
    deadline: Duration,
) -> Result<String, SessionError> {
    let mut events = client.pairing_events().await.map_err(|e| {
        SessionError::pairing_stream(format!("Unable to open pairing stream: {}", e.message()))
    })?;

    let connecting = Arc::clone(client);
    let mut worker = tokio::spawn(async move {
        connecting.connect().await.map_err(|e| SessionError::connect(e))?;
        debug!("Client connected, waiting for pairing code");

        while let Some(event) = events.recv().await {
            match event {
                PairingEvent::Code(code) => return Ok(Some(code)),
                other => debug!("Skipping pairing event before first code: {other:?}"),
            }
        }
        Ok::<_, SessionError>(None)
    });

    match timeout(deadline, &mut worker).await {
        Ok(Ok(Ok(Some(code)))) => {
            info!("Pairing code received");
            Ok(code)
        }
        Ok(Ok(Ok(None))) => Err(SessionError::pairing_stream(PAIRING_CODE_UNAVAILABLE)),
        Ok(Ok(Err(e))) => Err(e),
        Ok(Err(e)) => Err(SessionError::pairing_stream(format!(
            "{PAIRING_CODE_UNAVAILABLE}: pairing worker failed: {e}"
        ))),
        Err(_) => {
            worker.abort();
            Err(SessionError::pairing_timeout(deadline))
        }
    }
}
