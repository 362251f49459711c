use crate::{
    error::AppError,
    models::{Identity, User, UserModel},
    utils::{
        cookie::{extract_cookie, SESSION_COOKIE},
        SessionCodec,
    },
};
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// The signed-in user, loaded fresh from the database for each request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: UserModel,
}

impl Identity for AuthUser {
    fn id(&self) -> i32 {
        self.user.id
    }

    fn is_authenticated(&self) -> bool {
        self.user.is_authenticated()
    }

    fn is_active(&self) -> bool {
        self.user.is_active()
    }
}

/// Session authentication middleware
///
/// Reads the session token from `Authorization: Bearer` or the `session`
/// cookie, resolves it to a verified user and stores an [`AuthUser`] in the
/// request extensions. Anything else is answered with 401 and a login link.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    Extension(sessions): Extension<SessionCodec>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers)
        .or_else(|| extract_cookie(&headers, SESSION_COOKIE))
        .ok_or(AppError::Unauthorized)?;

    let claims = sessions.decode(&token).map_err(|_| AppError::Unauthorized)?;
    let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;

    let user = User::find_by_id(user_id)
        .one(&db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // A session outliving its account's verified state is not honoured.
    if !user.is_active() {
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(AuthUser { user });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
