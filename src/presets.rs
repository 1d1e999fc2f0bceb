//! Built-in converters for the resource table layout.
//!
//! ```text
//! input.object.org_owner                → organization_id :: text
//! input.object.owner                    → owner_id :: text
//! input.object.acl_group_list.<group>   → ARRAY(SELECT jsonb_array_elements_text(group_acl->'<group>'))
//! input.object.acl_user_list.<user>     → ARRAY(SELECT jsonb_array_elements_text(user_acl->'<user>'))
//! ```

use crate::{
    types::VarType,
    variables::{AclGroupMatcher, ColumnMatcher, MatcherSet, VariableConverter},
};

/// Ownership columns.
pub const CORE: &str = "core";

/// ACL group and user lists.
pub const ACL: &str = "acl";

/// Every built-in matcher, grouped.
pub fn matcher_set() -> MatcherSet {
    MatcherSet::new()
        .with(
            CORE,
            ColumnMatcher::new("input.object.org_owner", "organization_id :: text", VarType::String),
        )
        .with(
            CORE,
            ColumnMatcher::new("input.object.owner", "owner_id :: text", VarType::String),
        )
        .with(ACL, AclGroupMatcher::new("input.object.acl_group_list", "group_acl"))
        .with(ACL, AclGroupMatcher::new("input.object.acl_user_list", "user_acl"))
}

/// Ownership columns and ACL lists.
pub fn default_converter() -> VariableConverter {
    matcher_set().converter(&[CORE, ACL])
}

/// Ownership columns only; ACL references stay unresolved.
pub fn no_acl_converter() -> VariableConverter {
    matcher_set().converter_without(&[ACL])
}
