//! Area registrars and their shared option fragments
//!
//! Each area contributes one subtree to the registry through a plain
//! registrar function. The fragments below hold the options nearly every
//! operation carries; an operation re-declares a name only when it needs a
//! different description or requiredness, and the override replaces the
//! fragment entry in place.

pub mod cache;
pub mod cluster;
pub mod introspect;
pub mod vault;

use once_cell::sync::Lazy;

use crate::engine::errors::StartupError;
use crate::engine::group::OperationGroup;
use crate::engine::option::{OptionFragment, OptionSchema};
use crate::engine::registry::AreaRegistrar;

static SCOPE_FRAGMENT: Lazy<OptionFragment> = Lazy::new(|| OptionFragment {
    name: "scope",
    options: vec![
        OptionSchema::string("subscription", "Subscription to operate on").required(),
        OptionSchema::string("tenant", "Tenant to authenticate against"),
        OptionSchema::string("auth-method", "Credential source override").hidden(),
    ],
});

static RETRY_FRAGMENT: Lazy<OptionFragment> = Lazy::new(|| OptionFragment {
    name: "retry",
    options: vec![
        OptionSchema::integer("max-retries", "Provider call retry attempts").hidden(),
        OptionSchema::integer("retry-delay", "Delay between retries in milliseconds").hidden(),
    ],
});

static RESOURCE_FRAGMENT: Lazy<OptionFragment> = Lazy::new(|| OptionFragment {
    name: "resource",
    options: vec![OptionSchema::string(
        "resource-group",
        "Restrict to one resource group",
    )],
});

/// Subscription scoping and auth options every area carries
pub fn scope_fragment() -> &'static OptionFragment {
    &SCOPE_FRAGMENT
}

/// Retry-policy overrides, hidden like `--auth-method`; the bound values
/// ride in the parameter snapshot for the provider client to honor
pub fn retry_fragment() -> &'static OptionFragment {
    &RETRY_FRAGMENT
}

/// Resource-group filtering for resource-scoped operations
pub fn resource_fragment() -> &'static OptionFragment {
    &RESOURCE_FRAGMENT
}

/// The registrar set the binary ships with
pub fn default_registrars() -> Vec<AreaRegistrar> {
    vec![
        cache::register,
        vault::register,
        cluster::register,
        introspect::register,
    ]
}

/// Register every shipped area onto the root
pub fn register_default_areas(root: &mut OperationGroup) -> Result<(), StartupError> {
    for registrar in default_registrars() {
        registrar(root)?;
    }
    Ok(())
}
