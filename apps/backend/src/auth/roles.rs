//! Application roles and menu access.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    CustomerExperience,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::CustomerExperience => "CustomerExperience",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            s if s.eq_ignore_ascii_case("Admin") => Ok(Role::Admin),
            s if s.eq_ignore_ascii_case("CustomerExperience") => Ok(Role::CustomerExperience),
            _ => Err(()),
        }
    }
}

/// Dashboard sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Menu,
    Users,
    Financials,
    Dashboard,
    ReferenceData,
    Audits,
    LoginLogs,
    CompanyInfo,
    Clients,
    FrequentlyQuestions,
    Payments,
    Financial,
    ProductManagement,
    Notifications,
    CompetitiveAdvantages,
    ContactUsMessages,
    OurTeams,
    Services,
    Testimonials,
    SmsHistory,
    Gallery,
}

fn allowed_roles(item: MenuItem) -> &'static [Role] {
    match item {
        // Not yet assigned to any role.
        MenuItem::Clients | MenuItem::ProductManagement => &[],
        _ => &[Role::Admin],
    }
}

/// True when `role` may open any of `items`.
pub fn has_access(role: Role, items: &[MenuItem]) -> bool {
    items.iter().any(|item| allowed_roles(*item).contains(&role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_sees_assigned_items() {
        assert!(has_access(Role::Admin, &[MenuItem::Users]));
        assert!(has_access(Role::Admin, &[MenuItem::Clients, MenuItem::Audits]));
        assert!(!has_access(Role::Admin, &[MenuItem::Clients]));
        assert!(!has_access(Role::Admin, &[]));
    }

    #[test]
    fn customer_experience_sees_nothing() {
        assert!(!has_access(Role::CustomerExperience, &[MenuItem::Users, MenuItem::Gallery]));
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("CustomerExperience".parse::<Role>(), Ok(Role::CustomerExperience));
        assert!("Root".parse::<Role>().is_err());
    }
}
