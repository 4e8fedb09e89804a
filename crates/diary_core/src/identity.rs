//! Identity resolver: display names for signed-in principals.

use std::sync::Arc;
use tracing::debug;

use crate::domain::{Identity, Role, User};
use crate::paths;
use crate::ports::{ClientContext, PortResult, TreeStore};

pub struct IdentityResolver {
    store: Arc<dyn TreeStore>,
}

impl IdentityResolver {
    pub fn new(ctx: &ClientContext) -> Self {
        Self {
            store: ctx.store.clone(),
        }
    }

    /// Reads `users/{identity}/name`, falling back to the role placeholder when
    /// the name is absent or not a string.
    pub async fn display_name(&self, identity: &Identity, role: Role) -> PortResult<String> {
        let snapshot = self.store.get(&paths::user_name(identity)).await?;
        match snapshot.as_ref().and_then(|v| v.as_str()) {
            Some(name) => Ok(name.to_string()),
            None => {
                debug!("No display name stored for {}, using placeholder", identity);
                Ok(role.placeholder_name().to_string())
            }
        }
    }

    pub async fn user(&self, identity: &Identity, role: Role) -> PortResult<User> {
        let display_name = self.display_name(identity, role).await?;
        Ok(User {
            identity: identity.clone(),
            display_name,
            role,
        })
    }
}
