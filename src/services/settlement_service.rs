//! Settlement workflow: validate the form, call the remote endpoint once and
//! reflect the outcome in the form and the notification area.

use tokio::time::timeout;
use tracing::{info, warn};

use crate::{
    dto::{notification::NotificationKind, settlement::SettlementResponse},
    error::{ServiceError, SettlementError},
    services::{form_service, validator},
    state::SharedState,
};

/// Run one settlement attempt.
///
/// Only a concurrent attempt is reported as an error; every other failure is
/// shown as an error notification and returned as an unsuccessful response.
pub async fn submit(state: &SharedState) -> Result<SettlementResponse, ServiceError> {
    match state.run_submission(|| settle(state)).await {
        Ok(message) => {
            info!("settlement accepted by remote endpoint");
            state
                .notifications()
                .show(message.clone(), NotificationKind::Success);
            Ok(SettlementResponse::settled(message))
        }
        Err(SettlementError::AlreadyInFlight(err)) => {
            Err(ServiceError::InvalidState(err.to_string()))
        }
        Err(err) => {
            warn!(error = %err, "settlement failed");
            let message = err.to_string();
            state
                .notifications()
                .show(message.clone(), NotificationKind::Error);
            Ok(SettlementResponse::failed(message))
        }
    }
}

async fn settle(state: &SharedState) -> Result<String, SettlementError> {
    let settings = form_service::load_settings(state).await?;
    let (rows, rate, sanma) = state
        .read_form(|form| {
            let rows: Vec<_> = form.players().map(|(_, row)| row.clone()).collect();
            (rows, form.rate(), form.sanma())
        })
        .await;

    let request = validator::validate(&settings, &rows, rate, sanma)?;

    if let Some(rate) = validator::usable_rate(rate) {
        if let Err(err) = form_service::persist_rate(state, rate).await {
            warn!(error = %err, "failed to remember settlement rate");
        }
    }

    info!(
        players = request.players.len(),
        sanma = request.sanma,
        "sending settlement"
    );
    let call = state.gateway().submit(&settings.endpoint_url, &request);
    let reply = match timeout(state.request_timeout(), call).await {
        Ok(reply) => reply?,
        Err(_) => return Err(SettlementError::Timeout),
    };

    if !reply.is_success() {
        return Err(SettlementError::Remote {
            message: reply.message,
        });
    }

    state.with_form_mut(|form| form.clear_scores()).await;
    if let Err(err) = form_service::persist_inputs(state).await {
        warn!(error = %err, "failed to save cleared scores");
    }
    Ok(reply.message)
}
