use super::*;

const ALL_ROLES: [Role; 2] = [Role::Admin, Role::Seller];

#[test]
fn empty_requirement_admits_every_role_but_not_anonymous() {
    for role in ALL_ROLES {
        assert!(is_authorized(Some(role), &[]));
    }
    assert!(!is_authorized(None, &[]));
}

#[test]
fn non_empty_requirement_is_membership() {
    let requirements: [&[Role]; 3] = [&[Role::Admin], &[Role::Seller], &[Role::Admin, Role::Seller]];
    for required in requirements {
        for role in ALL_ROLES {
            assert_eq!(is_authorized(Some(role), required), required.contains(&role));
        }
        assert!(!is_authorized(None, required));
    }
}

#[test]
fn seller_is_denied_admin_routes() {
    assert!(!is_authorized(Some(Role::Seller), &[Role::Admin]));
    assert!(is_authorized(Some(Role::Admin), &[Role::Admin]));
    assert!(is_authorized(Some(Role::Seller), &[]));
}

#[test]
fn menu_filter_preserves_order_and_membership() {
    let seller_menu = visible_menu(Some(Role::Seller), DASHBOARD_MENU);
    let paths: Vec<_> = seller_menu.iter().map(|item| item.path).collect();
    assert_eq!(
        paths,
        vec![
            "/dashboard/store",
            "/dashboard/products",
            "/dashboard/orders",
            "/dashboard/settings",
        ]
    );

    let admin_menu = visible_menu(Some(Role::Admin), DASHBOARD_MENU);
    assert_eq!(admin_menu.len(), 4);
    assert_eq!(admin_menu[0].label, "Panel General");
    assert_eq!(admin_menu[3].label, "Configuración");
    assert!(admin_menu
        .iter()
        .all(|item| item.allowed_roles.contains(&Role::Admin)));
}

#[test]
fn menu_is_empty_without_identity() {
    assert!(visible_menu(None, DASHBOARD_MENU).is_empty());
}

#[test]
fn menu_filter_is_stable_across_calls() {
    let first = visible_menu(Some(Role::Seller), DASHBOARD_MENU);
    let second = visible_menu(Some(Role::Seller), DASHBOARD_MENU);
    assert_eq!(first, second);
}

#[test]
fn navigation_follows_route_table() {
    let policy = AccessPolicy::default();

    assert_eq!(policy.check(None, "/login"), Navigation::Render);
    assert_eq!(policy.check(None, "/store/fashion-store"), Navigation::Render);
    assert_eq!(
        policy.check(None, "/"),
        Navigation::Redirect(LOGIN_PATH.to_string())
    );
    assert_eq!(
        policy.check(None, "/dashboard"),
        Navigation::Redirect(LOGIN_PATH.to_string())
    );
    assert_eq!(policy.check(Some(Role::Seller), "/dashboard"), Navigation::Render);
    assert_eq!(
        policy.check(Some(Role::Seller), "/dashboard/users"),
        Navigation::Redirect(LOGIN_PATH.to_string())
    );
    assert_eq!(
        policy.check(Some(Role::Admin), "/dashboard/users?page=2"),
        Navigation::Render
    );
    assert_eq!(
        policy.check(Some(Role::Admin), "/dashboard/products"),
        Navigation::Redirect(LOGIN_PATH.to_string())
    );
    assert_eq!(policy.check(Some(Role::Admin), "/nowhere"), Navigation::NotFound);
}

#[test]
fn path_parameters_need_a_segment() {
    assert!(path_matches("/store/:storeId", "/store/abc"));
    assert!(path_matches("/store/:storeId", "/store/abc/"));
    assert!(!path_matches("/store/:storeId", "/store/"));
    assert!(!path_matches("/store/:storeId", "/store/abc/extra"));
    assert!(!path_matches("/dashboard", "/"));
}
