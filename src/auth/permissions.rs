use anyhow::Error;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewOwnAccount,
    CreateCandidates,
    ViewVacancies,
    SubmitApplications,
    ViewApplications,
    ViewTests,
    TakeTests,

    ViewAdminArea,
    ManageCandidates,
    ManageVacancies,
    ManageApplications,
    AssignTests,
    ReportTestResults,
    ManageTests,
    ManageSessions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

static USER_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ViewOwnAccount);
    permissions.insert(Permission::CreateCandidates);
    permissions.insert(Permission::ViewVacancies);
    permissions.insert(Permission::SubmitApplications);
    permissions.insert(Permission::ViewApplications);
    permissions.insert(Permission::ViewTests);
    permissions.insert(Permission::TakeTests);

    permissions
});

static ADMIN_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(USER_PERMISSIONS.iter().copied());

    permissions.insert(Permission::ViewAdminArea);
    permissions.insert(Permission::ManageCandidates);
    permissions.insert(Permission::ManageVacancies);
    permissions.insert(Permission::ManageApplications);
    permissions.insert(Permission::AssignTests);
    permissions.insert(Permission::ReportTestResults);
    permissions.insert(Permission::ManageTests);
    permissions.insert(Permission::ManageSessions);

    permissions
});

impl Role {
    pub fn permissions(&self) -> &'static HashSet<Permission> {
        match self {
            Role::User => &USER_PERMISSIONS,
            Role::Admin => &ADMIN_PERMISSIONS,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(Error::msg(format!("Unknown role: {}", s))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
