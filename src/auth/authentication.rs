use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};

use crate::error::AppError;

use super::{Principal, TokenService};

fn bearer_token<'r>(request: &'r Request<'_>) -> Option<&'r str> {
    request
        .headers()
        .get_one("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Principal {
    type Error = AppError;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_span = tracing::info_span!("bearer_auth_guard");
        let _guard = auth_span.enter();

        let Some(token) = bearer_token(request) else {
            tracing::warn!("Request without bearer token");
            return Outcome::Error((
                Status::Unauthorized,
                AppError::Authentication("Bearer token required".to_string()),
            ));
        };

        let tokens = match request.rocket().state::<TokenService>() {
            Some(tokens) => tokens,
            _ => {
                tracing::error!("Token service not found in managed state");
                return Outcome::Error((
                    Status::InternalServerError,
                    AppError::Internal("Token service unavailable".to_string()),
                ));
            }
        };

        match tokens.verify(token) {
            Ok(claims) => {
                let principal = Principal::from(claims);
                tracing::debug!(username = %principal.username, role = %principal.role, "Bearer token accepted");
                Outcome::Success(principal)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Invalid bearer token");
                Outcome::Error((Status::Unauthorized, err))
            }
        }
    }
}
