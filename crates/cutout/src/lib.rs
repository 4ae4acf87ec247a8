//! Facade crate for the cutout features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it composes other crates and holds no business logic.
//!
//! ## Usage
//! - Depend on `cutout` with the `server` feature.
//! - Call [`init`] to build the feature slices, then `server::router::app_router` to mount them.

pub use cutout_domain as domain;
use cutout_domain::config::ApiConfig;
use cutout_domain::registry::InitializedSlice;
pub use cutout_kernel as kernel;

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        use axum::middleware::from_fn_with_state;
        use cutout_domain::config::ApiConfig;
        use cutout_kernel::security::identity::IdentityResolver;
        use cutout_kernel::server::ApiState;
        use cutout_kernel::server::identity::resolve_identity;
        use utoipa_axum::router::OpenApiRouter;

        pub use cutout_kernel::server::router::system_router;

        /// System routes plus every feature router, ready for state.
        ///
        /// Feature routes run behind the identity layer; system routes never issue cookies.
        pub fn app_router(config: &ApiConfig) -> OpenApiRouter<ApiState> {
            let resolver = IdentityResolver::from_config(&config.identity);
            let assets = cutout_assets::handler::router(config.server.max_body_bytes)
                .layer(from_fn_with_state(resolver, resolve_identity));

            system_router().merge(assets)
        }
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use cutout_assets as assets;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "assets",
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initializes every feature slice.
///
/// # Errors
/// Returns the first feature initialization failure.
pub async fn init(config: &ApiConfig) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error>> {
    let slices = vec![features::assets::init(config).await?];

    Ok(slices)
}
