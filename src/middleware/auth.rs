use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::typed_header::TypedHeaderRejection;
use chrono::Utc;
use headers::{Authorization, authorization::Bearer};

use crate::error::MarketError;
use crate::router::MarketState;
use crate::service::authenticator::AuthScope;

fn rejection_to_error(rejection: TypedHeaderRejection) -> MarketError {
    if rejection.is_missing() {
        MarketError::MissingToken
    } else {
        MarketError::InvalidAuthHeader(rejection.to_string())
    }
}

/// Resolve `Authorization: Bearer <token>` into the caller's scope.
/// Handlers that take an `AuthScope` are authenticated; marketplace checks
/// are left to the handler via [`AuthScope::require`].
impl FromRequestParts<MarketState> for AuthScope {
    type Rejection = MarketError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &MarketState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(rejection_to_error)?;

        state
            .authenticator
            .authenticate(bearer.token(), Utc::now())
            .await
    }
}
