use serde::Serialize;

use crate::error::AppError;

use super::{Claims, Permission, Role};

/// The caller identified by a verified bearer token.
#[derive(Debug, Serialize, Clone)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            role: claims.role,
        }
    }
}

impl Principal {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            tracing::warn!(
                username = %self.username,
                role = %self.role.as_str(),
                permission = ?permission,
                "Permission denied"
            );
            Err(AppError::Authorization(format!(
                "role '{}' may not perform this action",
                self.role
            )))
        }
    }
}
