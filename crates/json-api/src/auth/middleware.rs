//! Auth middleware.

use std::sync::Arc;

use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::error;

use storefront_app::auth::{AuthServiceError, AuthenticatedUser};

use crate::{extensions::*, state::State};

/// Resolve the bearer token, when one is sent, into an [`AuthenticatedUser`]
/// in the depot. Anonymous requests pass through; a bad token is rejected.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if req.headers().contains_key(AUTHORIZATION) {
        let Some(token) = extract_bearer_token(req) else {
            res.render(StatusError::unauthorized().brief("Missing or invalid Authorization header"));
            ctrl.skip_rest();

            return;
        };

        match authenticate(depot, token).await {
            Ok(user) => depot.insert_user(user),
            Err(status) => {
                res.render(status);
                ctrl.skip_rest();

                return;
            }
        }
    }

    ctrl.call_next(req, depot, res).await;
}

/// Reject anonymous callers. Mount after [`handler`].
#[salvo::handler]
pub(crate) async fn require_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if let Err(status) = depot.user_or_401() {
        res.render(status);
        ctrl.skip_rest();

        return;
    }

    ctrl.call_next(req, depot, res).await;
}

/// Reject callers that are not staff. Mount after [`handler`].
#[salvo::handler]
pub(crate) async fn staff_only(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if let Err(status) = depot.staff_or_403() {
        res.render(status);
        ctrl.skip_rest();

        return;
    }

    ctrl.call_next(req, depot, res).await;
}

async fn authenticate(depot: &Depot, token: &str) -> Result<AuthenticatedUser, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .auth
        .authenticate_bearer(token)
        .await
        .map_err(|auth_error| match auth_error {
            AuthServiceError::NotFound => StatusError::unauthorized().brief("Invalid API token"),
            AuthServiceError::UnknownUser => {
                error!("api token resolved to a missing user");

                StatusError::internal_server_error()
            }
            AuthServiceError::Sql(source) => {
                error!("failed to validate api token: {source}");

                StatusError::internal_server_error()
            }
            AuthServiceError::Token(source) => {
                error!("failed to process api token: {source}");

                StatusError::internal_server_error()
            }
        })
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
