use std::fmt::{Display, Formatter};
use std::str::FromStr;

use cmms_core::AppError;
use serde::{Deserialize, Serialize};

/// Roles a user can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access, including mutations and the dev console.
    Admin,
    /// Read access to entities, dashboards and reports.
    Executive,
    /// Read access to entities and safety search.
    Staff,
}

impl Role {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Executive => "Executive",
            Self::Staff => "Staff",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Admin, Role::Executive, Role::Staff];

        ALL
    }

    /// Returns the capabilities granted to this role.
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        match self {
            Self::Admin => PermissionSet {
                can_create: true,
                can_update: true,
                can_delete: true,
                can_view_entities: true,
                can_view_dashboard: true,
                can_view_reports: true,
                can_view_safety_search: true,
                can_view_dev_console: true,
                can_view_building_supervision: true,
            },
            Self::Executive => PermissionSet {
                can_view_entities: true,
                can_view_dashboard: true,
                can_view_reports: true,
                can_view_safety_search: true,
                can_view_building_supervision: true,
                ..PermissionSet::none()
            },
            Self::Staff => PermissionSet {
                can_view_entities: true,
                can_view_safety_search: true,
                ..PermissionSet::none()
            },
        }
    }
}

impl Display for Role {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Executive" => Ok(Self::Executive),
            "Staff" => Ok(Self::Staff),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Single boolean capability checked by the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Create records and run bulk imports.
    #[serde(rename = "canCreate")]
    Create,
    /// Edit records.
    #[serde(rename = "canUpdate")]
    Update,
    /// Delete records.
    #[serde(rename = "canDelete")]
    Delete,
    /// Browse entity tables.
    #[serde(rename = "canViewEntities")]
    ViewEntities,
    /// Open the dashboard.
    #[serde(rename = "canViewDashboard")]
    ViewDashboard,
    /// Generate reports.
    #[serde(rename = "canViewReports")]
    ViewReports,
    /// Use safety search.
    #[serde(rename = "canViewSafetySearch")]
    ViewSafetySearch,
    /// Use the raw SQL console.
    #[serde(rename = "canViewDevConsole")]
    ViewDevConsole,
    /// Open building supervision.
    #[serde(rename = "canViewBuildingSupervision")]
    ViewBuildingSupervision,
}

impl Capability {
    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "canCreate",
            Self::Update => "canUpdate",
            Self::Delete => "canDelete",
            Self::ViewEntities => "canViewEntities",
            Self::ViewDashboard => "canViewDashboard",
            Self::ViewReports => "canViewReports",
            Self::ViewSafetySearch => "canViewSafetySearch",
            Self::ViewDevConsole => "canViewDevConsole",
            Self::ViewBuildingSupervision => "canViewBuildingSupervision",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::Create,
            Capability::Update,
            Capability::Delete,
            Capability::ViewEntities,
            Capability::ViewDashboard,
            Capability::ViewReports,
            Capability::ViewSafetySearch,
            Capability::ViewDevConsole,
            Capability::ViewBuildingSupervision,
        ];

        ALL
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|capability| capability.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown capability '{value}'")))
    }
}

/// Capabilities granted to one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    /// Create records and run bulk imports.
    pub can_create: bool,
    /// Edit records.
    pub can_update: bool,
    /// Delete records.
    pub can_delete: bool,
    /// Browse entity tables.
    pub can_view_entities: bool,
    /// Open the dashboard.
    pub can_view_dashboard: bool,
    /// Generate reports.
    pub can_view_reports: bool,
    /// Use safety search.
    pub can_view_safety_search: bool,
    /// Use the raw SQL console.
    pub can_view_dev_console: bool,
    /// Open building supervision.
    pub can_view_building_supervision: bool,
}

impl PermissionSet {
    /// Returns a set granting nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            can_create: false,
            can_update: false,
            can_delete: false,
            can_view_entities: false,
            can_view_dashboard: false,
            can_view_reports: false,
            can_view_safety_search: false,
            can_view_dev_console: false,
            can_view_building_supervision: false,
        }
    }

    /// Returns whether `capability` is granted.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Create => self.can_create,
            Capability::Update => self.can_update,
            Capability::Delete => self.can_delete,
            Capability::ViewEntities => self.can_view_entities,
            Capability::ViewDashboard => self.can_view_dashboard,
            Capability::ViewReports => self.can_view_reports,
            Capability::ViewSafetySearch => self.can_view_safety_search,
            Capability::ViewDevConsole => self.can_view_dev_console,
            Capability::ViewBuildingSupervision => self.can_view_building_supervision,
        }
    }
}

/// Returns whether `role` grants `capability`. An absent role grants nothing.
#[must_use]
pub fn has_permission(role: Option<Role>, capability: Capability) -> bool {
    role.is_some_and(|role| role.permissions().allows(capability))
}
