//! Request layer that binds every request to an anonymous [`Identity`].

use crate::security::identity::{CookieJar, Identity, IdentityResolver};
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

/// Resolves the caller identity before any handler runs.
///
/// The identity is stored in the request extensions; handlers read it with
/// `Extension<Identity>`. A request that already carries one is passed through untouched, so
/// stacking the layer never issues a second cookie. A newly issued identity is persisted with
/// a `Set-Cookie` header on whatever response the handler produced, errors included.
///
/// ```rust,ignore
/// let app = router.layer(axum::middleware::from_fn_with_state(resolver, resolve_identity));
/// ```
pub async fn resolve_identity(
    State(resolver): State<IdentityResolver>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<Identity>().is_some() {
        return next.run(request).await;
    }

    let resolution = resolver.resolve(
        request.extensions().get::<CookieJar>(),
        request.headers().get_all(COOKIE).iter().filter_map(|v| v.to_str().ok()),
    );
    request.extensions_mut().insert(resolution.identity);

    let mut response = next.run(request).await;

    if let Some(directive) = resolution.directive {
        match HeaderValue::from_str(&directive.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            },
            Err(e) => warn!(error = %e, "Identity cookie is not a valid header value"),
        }
    }

    response
}
