//! Role-based route gating and sidebar filtering.
//!
//! Everything here is a pure function of the caller's role and static
//! configuration. An absent role (`None`) is the unauthenticated state and is
//! never treated as either enumerated role.

use serde::Serialize;

use crate::domain::Role;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: &'static str,
    pub allowed_roles: &'static [Role],
}

/// Who may open a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    /// An empty slice admits any authenticated role.
    Authenticated(&'static [Role]),
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub access: RouteAccess,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render,
    Redirect(String),
    NotFound,
}

const ADMIN: &[Role] = &[Role::Admin];
const SELLER: &[Role] = &[Role::Seller];
const ANY_ROLE: &[Role] = &[];
const BOTH: &[Role] = &[Role::Admin, Role::Seller];

pub const DASHBOARD_MENU: &[MenuItem] = &[
    MenuItem {
        label: "Panel General",
        path: "/dashboard",
        allowed_roles: ADMIN,
    },
    MenuItem {
        label: "Tiendas",
        path: "/dashboard/stores",
        allowed_roles: ADMIN,
    },
    MenuItem {
        label: "Usuarios",
        path: "/dashboard/users",
        allowed_roles: ADMIN,
    },
    MenuItem {
        label: "Mi Tienda",
        path: "/dashboard/store",
        allowed_roles: SELLER,
    },
    MenuItem {
        label: "Productos",
        path: "/dashboard/products",
        allowed_roles: SELLER,
    },
    MenuItem {
        label: "Pedidos",
        path: "/dashboard/orders",
        allowed_roles: SELLER,
    },
    MenuItem {
        label: "Configuración",
        path: "/dashboard/settings",
        allowed_roles: BOTH,
    },
];

pub const ROUTES: &[Route] = &[
    Route {
        pattern: "/register",
        access: RouteAccess::Public,
    },
    Route {
        pattern: "/login",
        access: RouteAccess::Public,
    },
    Route {
        pattern: "/store/:storeId",
        access: RouteAccess::Public,
    },
    Route {
        pattern: "/dashboard",
        access: RouteAccess::Authenticated(ANY_ROLE),
    },
    Route {
        pattern: "/dashboard/store",
        access: RouteAccess::Authenticated(SELLER),
    },
    Route {
        pattern: "/dashboard/products",
        access: RouteAccess::Authenticated(SELLER),
    },
    Route {
        pattern: "/dashboard/orders",
        access: RouteAccess::Authenticated(SELLER),
    },
    Route {
        pattern: "/dashboard/stores",
        access: RouteAccess::Authenticated(ADMIN),
    },
    Route {
        pattern: "/dashboard/users",
        access: RouteAccess::Authenticated(ADMIN),
    },
    Route {
        pattern: "/dashboard/settings",
        access: RouteAccess::Authenticated(ANY_ROLE),
    },
    Route {
        pattern: "/",
        access: RouteAccess::Redirect(LOGIN_PATH),
    },
];

/// `required_roles` empty means "any logged-in identity".
pub fn is_authorized(role: Option<Role>, required_roles: &[Role]) -> bool {
    match role {
        None => false,
        Some(_) if required_roles.is_empty() => true,
        Some(role) => required_roles.contains(&role),
    }
}

pub fn visible_menu(role: Option<Role>, items: &[MenuItem]) -> Vec<MenuItem> {
    let Some(role) = role else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.allowed_roles.contains(&role))
        .copied()
        .collect()
}

/// The static route table and sidebar of one deployment.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    routes: &'static [Route],
    menu: &'static [MenuItem],
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(ROUTES, DASHBOARD_MENU)
    }
}

impl AccessPolicy {
    pub const fn new(routes: &'static [Route], menu: &'static [MenuItem]) -> Self {
        Self { routes, menu }
    }

    pub fn menu_for(&self, role: Option<Role>) -> Vec<MenuItem> {
        visible_menu(role, self.menu)
    }

    pub fn route_for(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| path_matches(route.pattern, path))
    }

    pub fn check(&self, role: Option<Role>, path: &str) -> Navigation {
        let Some(route) = self.route_for(path) else {
            return Navigation::NotFound;
        };
        match route.access {
            RouteAccess::Public => Navigation::Render,
            RouteAccess::Redirect(target) => Navigation::Redirect(target.to_string()),
            RouteAccess::Authenticated(required) if is_authorized(role, required) => {
                Navigation::Render
            }
            RouteAccess::Authenticated(_) => Navigation::Redirect(LOGIN_PATH.to_string()),
        }
    }
}

/// `:name` segments match exactly one non-empty segment. Query strings and a
/// trailing slash are ignored.
fn path_matches(pattern: &str, path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    if pattern == "/" {
        return path == "/";
    }
    let mut expected = pattern.trim_matches('/').split('/');
    let mut actual = path.trim_matches('/').split('/');
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return true,
            (Some(want), Some(got)) => {
                if got.is_empty() {
                    return false;
                }
                if !want.starts_with(':') && want != got {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
#[path = "tests/access_tests.rs"]
mod tests;
