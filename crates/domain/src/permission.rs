use std::fmt::{Display, Formatter};
use std::str::FromStr;

use assetkeep_core::AppError;

/// Generates the permission registry from one table of
/// `Variant => "storage.name", "Label", "Description";` rows.
macro_rules! permission_registry {
    ($($variant:ident => $name:literal, $label:literal, $description:literal;)+) => {
        /// Atomic capability gating one protected action.
        ///
        /// The variant list is the permission registry: every identifier stored in
        /// an edge table must parse into one of these values.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Permission {
            $(
                #[doc = $description]
                $variant,
            )+
        }

        impl Permission {
            /// Returns the stable dotted storage value for this permission.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Returns the human-readable label.
            #[must_use]
            pub fn display_name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }

            /// Returns the registry description.
            #[must_use]
            pub fn description(&self) -> &'static str {
                match self {
                    $(Self::$variant => $description,)+
                }
            }

            /// Returns every registered permission in registry order.
            #[must_use]
            pub fn all() -> &'static [Self] {
                const ALL: &[Permission] = &[$(Permission::$variant,)+];

                ALL
            }
        }

        impl FromStr for Permission {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(AppError::Validation(format!(
                        "unknown permission value '{value}'"
                    ))),
                }
            }
        }
    };
}

permission_registry! {
    UsersViewAny => "users.view_any", "View All Users", "View list of all users";
    UsersView => "users.view", "View User", "View individual user details";
    UsersCreate => "users.create", "Create User", "Create new user accounts";
    UsersUpdate => "users.update", "Update User", "Update user information";
    UsersDelete => "users.delete", "Delete User", "Delete user accounts";
    UsersRestore => "users.restore", "Restore User", "Restore soft-deleted users";
    UsersForceDelete => "users.force_delete", "Force Delete User", "Permanently delete users";
    RolesViewAny => "roles.view_any", "View All Roles", "View all roles";
    RolesView => "roles.view", "View Role", "View role details";
    RolesCreate => "roles.create", "Create Role", "Create new roles";
    RolesUpdate => "roles.update", "Update Role", "Update role details";
    RolesDelete => "roles.delete", "Delete Role", "Delete roles";
    RolesAssign => "roles.assign", "Assign Role", "Assign roles to users";
    RolesRevoke => "roles.revoke", "Revoke Role", "Remove roles from users";
    PermissionsViewAny => "permissions.view_any", "View All Permissions", "View all permissions";
    PermissionsView => "permissions.view", "View Permission", "View permission details";
    PermissionsAssign => "permissions.assign", "Assign Permission", "Assign permissions to roles/users";
    PermissionsRevoke => "permissions.revoke", "Revoke Permission", "Remove permissions from roles/users";
    ItemsViewAny => "items.view_any", "View All Items", "View all items in inventory";
    ItemsView => "items.view", "View Item", "View individual item details";
    ItemsCreate => "items.create", "Create Item", "Add new items to inventory";
    ItemsUpdate => "items.update", "Update Item", "Edit item information";
    ItemsDelete => "items.delete", "Delete Item", "Soft delete items";
    ItemsRestore => "items.restore", "Restore Item", "Restore deleted items";
    ItemsForceDelete => "items.force_delete", "Force Delete Item", "Permanently delete items";
    ItemsExport => "items.export", "Export Items", "Export item lists to Excel/CSV";
    ItemsImport => "items.import", "Import Items", "Bulk import items from Excel/CSV";
    ItemsViewCost => "items.view_cost", "View Item Cost", "View purchase costs/financial data";
    ItemsUpdateCost => "items.update_cost", "Update Item Cost", "Update financial information";
    ItemsViewHistory => "items.view_history", "View Item History", "View complete item history";
    ItemsGenerateQr => "items.generate_qr", "Generate QR Code", "Generate QR codes for items";
    ItemsPrintQr => "items.print_qr", "Print QR Code", "Print QR codes";
    ItemsBulkGenerateQr => "items.bulk_generate_qr", "Bulk Generate QR", "Bulk generate QR codes";
    CategoriesViewAny => "categories.view_any", "View All Categories", "View all categories";
    CategoriesView => "categories.view", "View Category", "View category details";
    CategoriesCreate => "categories.create", "Create Category", "Create new categories";
    CategoriesUpdate => "categories.update", "Update Category", "Update categories";
    CategoriesDelete => "categories.delete", "Delete Category", "Delete categories";
    LocationsViewAny => "locations.view_any", "View All Locations", "View all locations";
    LocationsView => "locations.view", "View Location", "View location details";
    LocationsCreate => "locations.create", "Create Location", "Create new locations";
    LocationsUpdate => "locations.update", "Update Location", "Update locations";
    LocationsDelete => "locations.delete", "Delete Location", "Delete locations";
    AssignmentsViewAny => "assignments.view_any", "View All Assignments", "View all assignments";
    AssignmentsView => "assignments.view", "View Assignment", "View specific assignment details";
    AssignmentsViewOwn => "assignments.view_own", "View Own Assignments", "View only own assignments";
    AssignmentsCreate => "assignments.create", "Create Assignment", "Assign items to users";
    AssignmentsUpdate => "assignments.update", "Update Assignment", "Update assignment details";
    AssignmentsCancel => "assignments.cancel", "Cancel Assignment", "Cancel assignments";
    AssignmentsAssignToSelf => "assignments.assign_to_self", "Assign to Self", "Assign items to themselves";
    AssignmentsAssignToOthers => "assignments.assign_to_others", "Assign to Others", "Assign items to other users";
    AssignmentsViewUserItems => "assignments.view_user_items", "View User Items", "View items assigned to specific user";
    AssignmentsApprove => "assignments.approve", "Approve Assignment", "Approve assignment requests";
    AssignmentsReject => "assignments.reject", "Reject Assignment", "Reject assignment requests";
    ReturnsViewAny => "returns.view_any", "View All Returns", "View all return records";
    ReturnsView => "returns.view", "View Return", "View specific return details";
    ReturnsCreate => "returns.create", "Create Return", "Process item returns";
    ReturnsUpdate => "returns.update", "Update Return", "Update return information";
    ReturnsApprove => "returns.approve", "Approve Return", "Approve return requests";
    ReturnsReject => "returns.reject", "Reject Return", "Reject return requests";
    ReturnsMarkReturned => "returns.mark_returned", "Mark Returned", "Mark items as returned";
    ReturnsInspect => "returns.inspect", "Inspect Return", "Perform return inspection";
    ReturnsNoteDamage => "returns.note_damage", "Note Damage", "Document damage on return";
    MaintenanceViewAny => "maintenance.view_any", "View All Maintenance", "View all maintenance records";
    MaintenanceView => "maintenance.view", "View Maintenance", "View specific maintenance record";
    MaintenanceCreate => "maintenance.create", "Create Maintenance", "Create maintenance requests";
    MaintenanceUpdate => "maintenance.update", "Update Maintenance", "Update maintenance records";
    MaintenanceDelete => "maintenance.delete", "Delete Maintenance", "Delete maintenance records";
    MaintenanceSchedule => "maintenance.schedule", "Schedule Maintenance", "Schedule maintenance";
    MaintenanceComplete => "maintenance.complete", "Complete Maintenance", "Mark maintenance as completed";
    MaintenanceAssign => "maintenance.assign", "Assign Maintenance", "Assign maintenance tasks";
    MaintenanceViewCosts => "maintenance.view_costs", "View Maintenance Costs", "View maintenance costs";
    MaintenanceApprove => "maintenance.approve", "Approve Maintenance", "Approve maintenance requests";
    MaintenanceReject => "maintenance.reject", "Reject Maintenance", "Reject maintenance requests";
    DisposalsViewAny => "disposals.view_any", "View All Disposals", "View all disposal records";
    DisposalsView => "disposals.view", "View Disposal", "View specific disposal";
    DisposalsCreate => "disposals.create", "Create Disposal", "Mark items for disposal";
    DisposalsUpdate => "disposals.update", "Update Disposal", "Update disposal information";
    DisposalsDelete => "disposals.delete", "Delete Disposal", "Remove disposal records";
    DisposalsApprove => "disposals.approve", "Approve Disposal", "Approve disposal requests";
    DisposalsReject => "disposals.reject", "Reject Disposal", "Reject disposal requests";
    DisposalsExecute => "disposals.execute", "Execute Disposal", "Execute approved disposals";
    DisposalsViewReasons => "disposals.view_reasons", "View Disposal Reasons", "View disposal reasons";
    ReportsView => "reports.view", "View Reports", "Access reports section";
    ReportsUserAssignments => "reports.user_assignments", "User Assignment Reports", "View user assignment reports";
    ReportsItemHistory => "reports.item_history", "Item History Reports", "View item history reports";
    ReportsInventorySummary => "reports.inventory_summary", "Inventory Summary", "View inventory summary";
    ReportsFinancial => "reports.financial", "Financial Reports", "View financial reports";
    ReportsDisposal => "reports.disposal", "Disposal Reports", "View disposal reports";
    ReportsMaintenance => "reports.maintenance", "Maintenance Reports", "View maintenance reports";
    ReportsActivityLogs => "reports.activity_logs", "Activity Log Reports", "View activity log reports";
    ReportsUtilization => "reports.utilization", "Utilization Reports", "View item utilization reports";
    ReportsExport => "reports.export", "Export Reports", "Export reports to Excel/PDF";
    ReportsSchedule => "reports.schedule", "Schedule Reports", "Schedule automated reports";
    ReportsShare => "reports.share", "Share Reports", "Share reports with others";
    ActivityLogsViewAny => "activity_logs.view_any", "View All Activity Logs", "View all activity logs";
    ActivityLogsView => "activity_logs.view", "View Activity Log", "View specific log entries";
    ActivityLogsViewOwn => "activity_logs.view_own", "View Own Activity", "View only own activity";
    ActivityLogsExport => "activity_logs.export", "Export Activity Logs", "Export activity logs";
    ActivityLogsDelete => "activity_logs.delete", "Delete Activity Logs", "Delete old logs";
    ActivityLogsViewUserLogs => "activity_logs.view_user_logs", "View User Logs", "View logs for specific user";
    ActivityLogsViewItemLogs => "activity_logs.view_item_logs", "View Item Logs", "View logs for specific item";
    DashboardView => "dashboard.view", "View Dashboard", "Access main dashboard";
    DashboardViewStats => "dashboard.view_stats", "View Statistics", "View statistics";
    DashboardViewCharts => "dashboard.view_charts", "View Charts", "View analytics charts";
    DashboardViewAlerts => "dashboard.view_alerts", "View Alerts", "View system alerts";
    DashboardViewPending => "dashboard.view_pending", "View Pending", "View pending actions";
    AnalyticsView => "analytics.view", "View Analytics", "Access analytics section";
    AnalyticsAdvanced => "analytics.advanced", "Advanced Analytics", "Access advanced analytics";
    AnalyticsExport => "analytics.export", "Export Analytics", "Export analytics data";
    SettingsView => "settings.view", "View Settings", "View system settings";
    SettingsUpdate => "settings.update", "Update Settings", "Update system settings";
    SettingsViewSecurity => "settings.view_security", "View Security Settings", "View security settings";
    SettingsUpdateSecurity => "settings.update_security", "Update Security Settings", "Update security settings";
    SystemBackup => "system.backup", "System Backup", "Create system backups";
    SystemRestore => "system.restore", "System Restore", "Restore from backups";
    SystemViewLogs => "system.view_logs", "View System Logs", "View system logs";
    SystemMaintenance => "system.maintenance", "System Maintenance", "Put system in maintenance mode";
    NotificationsView => "notifications.view", "View Notifications", "View notifications";
    NotificationsCreate => "notifications.create", "Create Notifications", "Send notifications to users";
    NotificationsDelete => "notifications.delete", "Delete Notifications", "Delete notifications";
    NotificationsConfigure => "notifications.configure", "Configure Notifications", "Configure notification settings";
    RequestsViewAny => "requests.view_any", "View All Requests", "View all requests";
    RequestsView => "requests.view", "View Request", "View specific request";
    RequestsCreate => "requests.create", "Create Request", "Create requests";
    RequestsUpdate => "requests.update", "Update Request", "Update requests";
    RequestsDelete => "requests.delete", "Delete Request", "Delete requests";
    RequestsApprove => "requests.approve", "Approve Request", "Approve requests";
    RequestsReject => "requests.reject", "Reject Request", "Reject requests";
}

impl Permission {
    /// Returns the grouping key, the namespace before the first dot.
    #[must_use]
    pub fn category(&self) -> &'static str {
        let name = self.as_str();
        match name.split_once('.') {
            Some((category, _)) => category,
            None => name,
        }
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value.trim())
    }

    /// Returns all permissions whose category is one of `categories`.
    #[must_use]
    pub fn in_categories(categories: &[&str]) -> Vec<Self> {
        Self::all()
            .iter()
            .copied()
            .filter(|permission| categories.contains(&permission.category()))
            .collect()
    }

    /// Returns the distinct categories in registry order.
    #[must_use]
    pub fn categories() -> Vec<&'static str> {
        let mut categories: Vec<&'static str> = Vec::new();
        for permission in Self::all() {
            if !categories.contains(&permission.category()) {
                categories.push(permission.category());
            }
        }

        categories
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::Permission;

    #[test]
    fn storage_values_are_unique() {
        let names: HashSet<&str> = Permission::all().iter().map(Permission::as_str).collect();
        assert_eq!(names.len(), Permission::all().len());
    }

    #[test]
    fn every_storage_value_parses_back() {
        for permission in Permission::all() {
            assert_eq!(Permission::from_str(permission.as_str()).ok(), Some(*permission));
        }
    }

    #[test]
    fn category_is_namespace_prefix() {
        assert_eq!(Permission::ItemsCreate.category(), "items");
        assert_eq!(Permission::ActivityLogsViewOwn.category(), "activity_logs");
    }

    #[test]
    fn in_categories_selects_whole_groups() {
        let selected = Permission::in_categories(&["roles", "permissions"]);
        assert_eq!(selected.len(), 11);
        assert!(selected.contains(&Permission::RolesAssign));
        assert!(!selected.contains(&Permission::ItemsCreate));
    }

    #[test]
    fn categories_are_distinct() {
        let categories = Permission::categories();
        let unique: HashSet<&str> = categories.iter().copied().collect();
        assert_eq!(categories.len(), unique.len());
        assert_eq!(categories.first().copied(), Some("users"));
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Permission::from_str("items.teleport").is_err());
        assert!(Permission::from_transport(" items.create ").is_ok());
    }

    proptest! {
        #[test]
        fn unregistered_names_never_parse(value in "[a-z_]{1,12}\\.[a-z_]{1,12}") {
            let registered = Permission::all()
                .iter()
                .any(|permission| permission.as_str() == value);
            prop_assert_eq!(Permission::from_str(&value).is_ok(), registered);
        }
    }
}
