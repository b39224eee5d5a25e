//! Role naming rules and the provisioned system roles.

use std::fmt::{Display, Formatter};

use assetkeep_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::Permission;

/// Maximum length of a role identifier.
pub const ROLE_NAME_MAX_LENGTH: usize = 50;

/// Maximum length of a role display label.
pub const ROLE_DISPLAY_NAME_MAX_LENGTH: usize = 100;

/// Maximum length of a role description.
pub const ROLE_DESCRIPTION_MAX_LENGTH: usize = 500;

/// Name of the role that may override system-role protections.
pub const SUPER_ADMINISTRATOR_ROLE: &str = "super_administrator";

/// Validated unique role identifier (`[A-Za-z0-9_-]`, at most 50 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleName(String);

impl RoleName {
    /// Creates a validated role name.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_owned();

        if value.is_empty() {
            return Err(AppError::Validation("role name must not be empty".to_owned()));
        }

        if value.chars().count() > ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must not exceed {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        if !value
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '_' | '-'))
        {
            return Err(AppError::Validation(format!(
                "role name '{value}' may only contain letters, numbers, dashes and underscores"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the role name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this name belongs to the super administrator role.
    #[must_use]
    pub fn is_super_administrator(&self) -> bool {
        self.0 == SUPER_ADMINISTRATOR_ROLE
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

/// Roles created at provisioning time and protected from ordinary mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemRole {
    /// Full access to every permission.
    SuperAdministrator,
    /// Manages all property operations.
    PropertyAdministrator,
    /// Handles day-to-day property operations.
    PropertyManager,
    /// Handles basic inventory tasks.
    InventoryClerk,
    /// Handles item assignments and returns.
    AssignmentOfficer,
    /// Manages maintenance operations.
    MaintenanceCoordinator,
    /// View-only access for auditing.
    Auditor,
    /// Views and requests items for a department.
    DepartmentHead,
    /// Views own assigned items.
    StaffUser,
    /// Views reports only.
    ReportViewer,
}

impl SystemRole {
    /// Returns every system role in provisioning order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemRole] = &[
            SystemRole::SuperAdministrator,
            SystemRole::PropertyAdministrator,
            SystemRole::PropertyManager,
            SystemRole::InventoryClerk,
            SystemRole::AssignmentOfficer,
            SystemRole::MaintenanceCoordinator,
            SystemRole::Auditor,
            SystemRole::DepartmentHead,
            SystemRole::StaffUser,
            SystemRole::ReportViewer,
        ];

        ALL
    }

    /// Returns the stable role identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SuperAdministrator => SUPER_ADMINISTRATOR_ROLE,
            Self::PropertyAdministrator => "property_administrator",
            Self::PropertyManager => "property_manager",
            Self::InventoryClerk => "inventory_clerk",
            Self::AssignmentOfficer => "assignment_officer",
            Self::MaintenanceCoordinator => "maintenance_coordinator",
            Self::Auditor => "auditor",
            Self::DepartmentHead => "department_head",
            Self::StaffUser => "staff_user",
            Self::ReportViewer => "report_viewer",
        }
    }

    /// Returns the display label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SuperAdministrator => "Super Administrator",
            Self::PropertyAdministrator => "Property Administrator",
            Self::PropertyManager => "Property Manager",
            Self::InventoryClerk => "Inventory Clerk",
            Self::AssignmentOfficer => "Assignment Officer",
            Self::MaintenanceCoordinator => "Maintenance Coordinator",
            Self::Auditor => "Auditor",
            Self::DepartmentHead => "Department Head",
            Self::StaffUser => "Staff User",
            Self::ReportViewer => "Report Viewer",
        }
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::SuperAdministrator => "Full system access with all permissions",
            Self::PropertyAdministrator => "Manage all property operations",
            Self::PropertyManager => "Day-to-day property operations",
            Self::InventoryClerk => "Handle basic inventory tasks",
            Self::AssignmentOfficer => "Handle item assignments and returns",
            Self::MaintenanceCoordinator => "Manage maintenance operations",
            Self::Auditor => "View-only access for auditing",
            Self::DepartmentHead => "View and request for their department",
            Self::StaffUser => "View own assigned items",
            Self::ReportViewer => "View reports only",
        }
    }

    /// Returns the validated role name.
    pub fn role_name(&self) -> AppResult<RoleName> {
        RoleName::new(self.name())
    }

    /// Returns the permission bundle provisioned for this role.
    #[must_use]
    pub fn permissions(&self) -> Vec<Permission> {
        use Permission as P;

        match self {
            Self::SuperAdministrator => Permission::all().to_vec(),
            Self::PropertyAdministrator => Permission::in_categories(&[
                "items",
                "assignments",
                "returns",
                "maintenance",
                "disposals",
                "reports",
                "activity_logs",
                "categories",
                "locations",
                "dashboard",
            ]),
            Self::PropertyManager => vec![
                P::ItemsViewAny,
                P::ItemsView,
                P::ItemsCreate,
                P::ItemsUpdate,
                P::ItemsGenerateQr,
                P::ItemsPrintQr,
                P::ItemsViewHistory,
                P::AssignmentsViewAny,
                P::AssignmentsCreate,
                P::AssignmentsAssignToOthers,
                P::ReturnsViewAny,
                P::ReturnsCreate,
                P::ReturnsMarkReturned,
                P::MaintenanceViewAny,
                P::MaintenanceCreate,
                P::MaintenanceSchedule,
                P::ReportsView,
                P::ReportsUserAssignments,
                P::ReportsItemHistory,
                P::ReportsInventorySummary,
                P::ActivityLogsViewAny,
                P::DashboardView,
                P::DashboardViewStats,
                P::DashboardViewCharts,
            ],
            Self::InventoryClerk => vec![
                P::ItemsViewAny,
                P::ItemsView,
                P::ItemsCreate,
                P::ItemsUpdate,
                P::ItemsGenerateQr,
                P::ItemsPrintQr,
                P::CategoriesViewAny,
                P::LocationsViewAny,
                P::AssignmentsViewAny,
                P::AssignmentsCreate,
                P::ReturnsViewAny,
                P::ReturnsCreate,
                P::ReturnsMarkReturned,
                P::ReportsView,
                P::ReportsInventorySummary,
                P::DashboardView,
            ],
            Self::AssignmentOfficer => vec![
                P::ItemsViewAny,
                P::ItemsView,
                P::AssignmentsViewAny,
                P::AssignmentsView,
                P::AssignmentsCreate,
                P::AssignmentsAssignToOthers,
                P::ReturnsViewAny,
                P::ReturnsView,
                P::ReturnsCreate,
                P::ReturnsMarkReturned,
                P::ReturnsInspect,
                P::ReportsView,
                P::ReportsUserAssignments,
                P::DashboardView,
                P::DashboardViewPending,
            ],
            Self::MaintenanceCoordinator => vec![
                P::ItemsViewAny,
                P::ItemsView,
                P::MaintenanceViewAny,
                P::MaintenanceView,
                P::MaintenanceCreate,
                P::MaintenanceUpdate,
                P::MaintenanceSchedule,
                P::MaintenanceComplete,
                P::MaintenanceAssign,
                P::ReportsView,
                P::ReportsMaintenance,
                P::DashboardView,
            ],
            Self::Auditor => Permission::all()
                .iter()
                .copied()
                .filter(|permission| {
                    let name = permission.as_str();
                    name.contains(".view")
                        || matches!(permission.category(), "reports" | "activity_logs")
                })
                .collect(),
            Self::DepartmentHead => vec![
                P::ItemsViewAny,
                P::ItemsView,
                P::AssignmentsViewAny,
                P::AssignmentsView,
                P::RequestsView,
                P::RequestsCreate,
                P::ReportsView,
                P::ReportsUserAssignments,
                P::DashboardView,
            ],
            Self::StaffUser => vec![
                P::ItemsView,
                P::AssignmentsViewOwn,
                P::ReturnsCreate,
                P::RequestsCreate,
                P::NotificationsView,
                P::DashboardView,
            ],
            Self::ReportViewer => Permission::all()
                .iter()
                .copied()
                .filter(|permission| {
                    permission.category() == "reports"
                        || permission.as_str().starts_with("dashboard.view")
                        || matches!(permission, P::ItemsViewAny | P::ItemsView)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{RoleName, SystemRole};
    use crate::Permission;

    #[test]
    fn role_name_accepts_alpha_dash() {
        assert!(RoleName::new("inventory_clerk").is_ok());
        assert!(RoleName::new("night-shift-2").is_ok());
    }

    #[test]
    fn role_name_rejects_spaces_and_overlong_values() {
        assert!(RoleName::new("night shift").is_err());
        assert!(RoleName::new("").is_err());
        assert!(RoleName::new("x".repeat(51)).is_err());
    }

    #[test]
    fn system_role_names_are_valid() {
        for role in SystemRole::all() {
            assert!(role.role_name().is_ok(), "{}", role.name());
        }
    }

    #[test]
    fn super_administrator_holds_every_permission() {
        assert_eq!(
            SystemRole::SuperAdministrator.permissions().len(),
            Permission::all().len()
        );
        assert!(
            SystemRole::SuperAdministrator
                .role_name()
                .map(|name| name.is_super_administrator())
                .unwrap_or(false)
        );
    }

    #[test]
    fn inventory_clerk_creates_but_cannot_delete_items() {
        let permissions = SystemRole::InventoryClerk.permissions();
        assert!(permissions.contains(&Permission::ItemsCreate));
        assert!(!permissions.contains(&Permission::ItemsDelete));
    }

    #[test]
    fn auditor_is_read_only() {
        let permissions = SystemRole::Auditor.permissions();
        assert!(permissions.contains(&Permission::ItemsViewCost));
        assert!(permissions.contains(&Permission::ReportsExport));
        assert!(!permissions.contains(&Permission::ItemsCreate));
        assert!(!permissions.contains(&Permission::RolesAssign));
    }

    proptest! {
        #[test]
        fn alpha_dash_names_within_limit_are_accepted(value in "[A-Za-z0-9_-]{1,50}") {
            prop_assert!(RoleName::new(value).is_ok());
        }

        #[test]
        fn names_with_whitespace_inside_are_rejected(
            left in "[a-z]{1,10}",
            right in "[a-z]{1,10}",
        ) {
            let name = format!("{left} {right}");
            prop_assert!(RoleName::new(name).is_err());
        }
    }
}
