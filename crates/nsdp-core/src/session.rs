// ── Operation context ──
//
// Everything a lifecycle call needs from its host, passed explicitly: the
// controller that binds device handles, the password lookup, and the
// cancellation token every device exchange is raced against.

use std::future::Future;

use nsdp_api::{Controller, MacAddress};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::credentials::Credentials;
use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct OperationContext<C> {
    controller: C,
    credentials: Credentials,
    cancel: CancellationToken,
}

impl<C: Controller> OperationContext<C> {
    pub fn new(controller: C, credentials: Credentials) -> Self {
        Self {
            controller,
            credentials,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Look up the password and open a session with the switch.
    pub(crate) async fn bind(&self, mac: MacAddress) -> Result<C::Switch, CoreError> {
        let password = self
            .credentials
            .password_for(mac)
            .ok_or(CoreError::NoCredentials { mac })?;

        let switch = guarded(
            &self.cancel,
            self.controller.use_switch(mac, password),
            |source| CoreError::SessionFailed { mac, source },
        )
        .await?;
        debug!(%mac, "session established");
        Ok(switch)
    }
}

/// Race one device exchange against cancellation, mapping transport errors
/// with `on_err`.
pub(crate) async fn guarded<T, F, E>(
    cancel: &CancellationToken,
    exchange: F,
    on_err: E,
) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, nsdp_api::Error>>,
    E: FnOnce(nsdp_api::Error) -> CoreError,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CoreError::Cancelled),
        result = exchange => result.map_err(on_err),
    }
}
