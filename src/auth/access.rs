//! Client-side capability matrix
//!
//! One place answering "may this role do that to this resource",
//! mirroring the server's unconditional grants. Ownership-conditional
//! rules (own record, own department, managed project) live on the
//! server only, so a deny here is advisory for update/delete.

use crate::models::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Employees,
    Departments,
    Locations,
    Projects,
    Tasks,
    Users,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

/// Resolve whether `role` holds an unconditional grant for the
/// resource/action pair.
pub fn is_allowed(role: UserRole, resource: Resource, action: Action) -> bool {
    use Action::*;
    use Resource::*;
    use UserRole::*;

    let admin = matches!(role, SystemAdmin | HrManager);
    match (resource, action) {
        (Employees | Departments, View) => true,
        (Employees | Departments, _) => admin,
        (Locations, View) => role != Employee,
        (Locations, Create | Update) => admin,
        (Locations, Delete) => role == SystemAdmin,
        (Projects | Tasks, View) => true,
        (Projects | Tasks, Create) => matches!(role, SystemAdmin | HrManager | DepartmentManager),
        (Projects | Tasks, Update | Delete) => role == SystemAdmin,
        (Users, _) => role == SystemAdmin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Action::*;
    use Resource::*;
    use UserRole::*;

    #[test]
    fn everyone_views_employees_and_projects() {
        for role in UserRole::all() {
            assert!(is_allowed(role, Employees, View));
            assert!(is_allowed(role, Projects, View));
            assert!(is_allowed(role, Tasks, View));
        }
    }

    #[test]
    fn employees_are_managed_by_admins_only() {
        assert!(is_allowed(HrManager, Employees, Create));
        assert!(is_allowed(SystemAdmin, Employees, Delete));
        assert!(!is_allowed(DepartmentManager, Employees, Create));
        assert!(!is_allowed(Employee, Employees, Update));
    }

    #[test]
    fn locations_are_hidden_from_plain_employees() {
        assert!(!is_allowed(Employee, Locations, View));
        assert!(is_allowed(DepartmentManager, Locations, View));
        assert!(!is_allowed(HrManager, Locations, Delete));
        assert!(is_allowed(SystemAdmin, Locations, Delete));
    }

    #[test]
    fn department_managers_create_but_do_not_delete_projects() {
        assert!(is_allowed(DepartmentManager, Projects, Create));
        assert!(is_allowed(DepartmentManager, Tasks, Create));
        assert!(!is_allowed(DepartmentManager, Projects, Delete));
        assert!(!is_allowed(HrManager, Tasks, Update));
    }

    #[test]
    fn user_provisioning_is_system_admin_only() {
        for action in [View, Create, Update, Delete] {
            assert!(is_allowed(SystemAdmin, Users, action));
            assert!(!is_allowed(HrManager, Users, action));
        }
    }
}
