mod typed;

use proc_macro::TokenStream;

/// Derive `strata_framework::component::Typed` for a component type.
///
/// ```rust,ignore
/// #[derive(Typed)]
/// #[component(name = "WallVC", parent = "VariableCondition")]
/// struct WallVc { .. }
/// ```
///
/// Without a `name` the struct's identifier is used; without a `parent` the type hangs directly
/// off the `Component` root.
#[proc_macro_derive(Typed, attributes(component))]
pub fn derive_typed(item: TokenStream) -> TokenStream {
    typed::derive_typed(item)
}
