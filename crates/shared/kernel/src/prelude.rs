pub use crate::security::identity::{CookieJar, Identity, IdentityResolver, Resolution, SetIdentity};
#[cfg(feature = "server")]
pub use crate::server::{ApiState, ApiStateBuilder, ApiStateError};
pub use cutout_domain::config::ApiConfig;
pub use cutout_domain::registry::{FeatureSlice, InitializedSlice};
