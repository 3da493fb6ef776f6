use super::*;

fn user() -> SessionUser {
    SessionUser::resolved("alice", false)
}

fn admin() -> SessionUser {
    SessionUser::resolved("root", true)
}

// =============================================================================
// route_guard
// =============================================================================

#[test]
fn anonymous_visitor_is_sent_to_login() {
    assert_eq!(route_guard(&Route::Journals, false), Navigation::Redirect(Route::Login));
    assert_eq!(route_guard(&Route::Profile, false), Navigation::Redirect(Route::Login));
}

#[test]
fn anonymous_visitor_sees_public_views() {
    assert_eq!(route_guard(&Route::Login, false), Navigation::Render(Route::Login));
    assert_eq!(route_guard(&Route::Register, false), Navigation::Render(Route::Register));
}

#[test]
fn authenticated_user_skips_login_and_register() {
    assert_eq!(route_guard(&Route::Login, true), Navigation::Redirect(Route::Dashboard));
    assert_eq!(route_guard(&Route::Register, true), Navigation::Redirect(Route::Dashboard));
}

#[test]
fn authenticated_user_sees_protected_views() {
    let edit = Route::JournalEdit("e1".to_owned());
    assert_eq!(route_guard(&edit, true), Navigation::Render(edit.clone()));
}

// =============================================================================
// admin_gate
// =============================================================================

#[test]
fn non_admin_is_bounced_from_admin() {
    assert_eq!(admin_gate(&Route::Admin, Some(&user())), Navigation::Redirect(Route::Dashboard));
}

#[test]
fn admin_sees_admin_view() {
    assert_eq!(admin_gate(&Route::Admin, Some(&admin())), Navigation::Render(Route::Admin));
}

#[test]
fn admin_gate_ignores_other_views() {
    assert_eq!(admin_gate(&Route::Journals, Some(&user())), Navigation::Render(Route::Journals));
}

#[test]
fn show_admin_ui_requires_admin_role() {
    assert!(!show_admin_ui(None));
    assert!(!show_admin_ui(Some(&user())));
    assert!(show_admin_ui(Some(&admin())));
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolve_sends_anonymous_admin_visit_to_login() {
    assert_eq!(resolve(&Route::Admin, None), Navigation::Redirect(Route::Login));
}

#[test]
fn resolve_applies_admin_gate_after_guard() {
    assert_eq!(resolve(&Route::Admin, Some(&user())), Navigation::Redirect(Route::Dashboard));
    assert_eq!(resolve(&Route::Admin, Some(&admin())), Navigation::Render(Route::Admin));
}

#[test]
fn navigation_target_reports_final_route() {
    assert_eq!(resolve(&Route::Login, Some(&user())).target(), &Route::Dashboard);
}
