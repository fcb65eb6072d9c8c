use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input};

pub fn derive_typed(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let ast = parse_macro_input!(input as DeriveInput);

    let struct_name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut name: Option<LitStr> = None;
    let mut parent: Option<LitStr> = None;

    for attr in ast.attrs.iter().filter(|attr| attr.path().is_ident("component")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("parent") {
                parent = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `name` or `parent`"))
            }
        });
        if let Err(err) = parsed {
            return err.to_compile_error().into();
        }
    }

    let name = name.unwrap_or_else(|| LitStr::new(&struct_name.to_string(), struct_name.span()));
    let parent = match parent {
        Some(parent) => quote! { ::strata_framework::types::TypeName::new(#parent) },
        None => quote! { ::strata_framework::types::TypeName::COMPONENT },
    };

    // `::strata_framework` resolves inside the crate through `extern crate self as
    // strata_framework;` in lib.rs, and to the dependency everywhere else.
    TokenStream::from(quote! {
        impl #impl_generics ::strata_framework::component::Typed
            for #struct_name #ty_generics #where_clause
        {
            const TYPE: ::strata_framework::types::TypeName =
                ::strata_framework::types::TypeName::new(#name);
            const PARENT: ::strata_framework::types::TypeName = #parent;
        }
    })
}
