//! Role → permission mapping
//!
//! Permissions are `resource:action` strings; `:*` is a wildcard for all
//! actions on a resource and `"all"` grants everything. Admins bypass the
//! list entirely (see [`CurrentUser::is_admin`](super::CurrentUser)).

use shared::models::{ROLE_ADMIN, ROLE_CUSTOMER};

/// Permissions granted to a freshly issued token for the given role.
pub fn permissions_for_role(role: &str) -> Vec<String> {
    match role {
        ROLE_ADMIN => vec!["all".to_string()],
        ROLE_CUSTOMER => [
            "profile:*",
            "addresses:*",
            "cart:*",
            "orders:place",
            "orders:read",
            "orders:cancel",
            "preorders:place",
            "preorders:read",
            "preorders:cancel",
            "reviews:*",
            "wishlist:*",
        ]
        .into_iter()
        .map(str::to_string)
        .collect(),
        // Unknown roles get nothing; auth still succeeds but every
        // permission-guarded route rejects.
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_gets_all() {
        assert_eq!(permissions_for_role(ROLE_ADMIN), vec!["all".to_string()]);
    }

    #[test]
    fn test_customer_cannot_manage_catalog() {
        let perms = permissions_for_role(ROLE_CUSTOMER);
        assert!(perms.iter().any(|p| p == "cart:*"));
        assert!(!perms.iter().any(|p| p.starts_with("products:")));
        assert!(!perms.iter().any(|p| p == "all"));
    }

    #[test]
    fn test_unknown_role_gets_nothing() {
        assert!(permissions_for_role("intern").is_empty());
    }
}
