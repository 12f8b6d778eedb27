//! Procedural macros for async-fn-mock
//!
//! This crate provides the `#[async_fn_mock::test]` attribute macro, which
//! runs an async test on tokio and injects fresh `AsyncFn` mocks.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_fn_mock::AsyncFn;
//!
//! #[async_fn_mock::test]
//! async fn loads_user(fetch_user: AsyncFn<u32, String, ()>) {
//!     let pending = fetch_user.call(1);
//!     fetch_user.resolve("ada".into()).unwrap().await;
//!     assert_eq!(pending.await, Ok("ada".into()));
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input, FnArg, Ident, ItemFn, Lit, Pat, Token, Type,
};

/// Configuration options for the test macro.
#[derive(Default)]
struct TestConfig {
    /// Scheduler yields per completion signal for every injected mock
    flush_ticks: Option<usize>,
}

impl Parse for TestConfig {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut config = TestConfig::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "flush_ticks" => {
                    let lit: Lit = input.parse()?;
                    match lit {
                        Lit::Int(i) => config.flush_ticks = Some(i.base10_parse()?),
                        other => {
                            return Err(syn::Error::new_spanned(
                                other,
                                "flush_ticks expects an integer",
                            ));
                        }
                    }
                }
                _ => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {ident}"),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(config)
    }
}

/// A test parameter that receives an injected mock.
struct MockParam<'a> {
    ident: &'a Ident,
    ty: &'a Type,
}

/// Returns the parameter if its type is `AsyncFn<..>`.
fn mock_param(arg: &FnArg) -> syn::Result<MockParam<'_>> {
    let FnArg::Typed(pat_type) = arg else {
        return Err(syn::Error::new_spanned(arg, "test function cannot take self"));
    };

    let is_mock = match &*pat_type.ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "AsyncFn"),
        _ => false,
    };
    if !is_mock {
        return Err(syn::Error::new_spanned(
            &pat_type.ty,
            "only `AsyncFn<..>` parameters can be injected",
        ));
    }

    match &*pat_type.pat {
        Pat::Ident(pat_ident) => Ok(MockParam {
            ident: &pat_ident.ident,
            ty: &pat_type.ty,
        }),
        other => Err(syn::Error::new_spanned(
            other,
            "injected mocks must be bound to a plain name",
        )),
    }
}

/// Test attribute macro for async tests with injected mocks.
///
/// Expands to a `#[tokio::test]` on the current-thread runtime, which is
/// the scheduler settlement flushing is designed for.
///
/// There is no option for the multi-thread flavor. On a multi-thread runtime
/// the tasks woken by a settlement run on worker threads, and awaiting the
/// flush does not wait for them.
///
/// # Basic Usage
///
/// ```rust,ignore
/// #[async_fn_mock::test]
/// async fn test_basic() {
///     assert!(true);
/// }
/// ```
///
/// # With Mock Injection
///
/// Every `AsyncFn<..>` parameter becomes a fresh mock named after the
/// parameter:
///
/// ```rust,ignore
/// use async_fn_mock::AsyncFn;
///
/// #[async_fn_mock::test]
/// async fn test_with_mock(save: AsyncFn<&'static str, (), ()>) {
///     let pending = save.call("draft");
///     assert_eq!(save.name(), "save");
///     save.resolve(()).unwrap().await;
///     assert_eq!(pending.await, Ok(()));
/// }
/// ```
///
/// # Configuration Options
///
/// - `flush_ticks = 2` - Scheduler yields per completion signal
///
/// ```rust,ignore
/// #[async_fn_mock::test(flush_ticks = 3)]
/// async fn test_deep_chain(load: AsyncFn<u32, u32, ()>) {
///     assert_eq!(load.config().flush_ticks, 3);
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let config = parse_macro_input!(attr as TestConfig);
    let input = parse_macro_input!(item as ItemFn);

    expand_test(&config, &input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_test(config: &TestConfig, input: &ItemFn) -> syn::Result<TokenStream2> {
    let name = &input.sig.ident;
    let body = &input.block;
    let attrs = &input.attrs;
    let vis = &input.vis;

    if input.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            &input.sig,
            "test function must be async",
        ));
    }

    let params = input
        .sig
        .inputs
        .iter()
        .map(mock_param)
        .collect::<syn::Result<Vec<_>>>()?;

    let flush_ticks = config
        .flush_ticks
        .map(|ticks| quote! { .flush_ticks(#ticks) });

    let mock_inits = params.iter().map(|param| {
        let ident = param.ident;
        let ty = param.ty;
        let mock_name = ident.to_string();
        quote! {
            let #ident: #ty = <#ty>::builder()
                .name(#mock_name)
                #flush_ticks
                .build()
                .expect("an AsyncFn without a fixed implementation always builds");
        }
    });

    Ok(quote! {
        #[::tokio::test]
        #(#attrs)*
        #vis async fn #name() {
            #(#mock_inits)*
            #body
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{expand_test, TestConfig};

    #[::core::prelude::v1::test]
    fn test_config_parse_empty() {
        let config: TestConfig = syn::parse_str("").unwrap();
        assert!(config.flush_ticks.is_none());
    }

    #[::core::prelude::v1::test]
    fn test_config_parse_flush_ticks() {
        let config: TestConfig = syn::parse_str("flush_ticks = 3").unwrap();
        assert_eq!(config.flush_ticks, Some(3));
    }

    #[::core::prelude::v1::test]
    fn test_config_rejects_unknown_option() {
        let err = syn::parse_str::<TestConfig>("runtime = \"smol\"")
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown attribute: runtime"));
    }

    #[::core::prelude::v1::test]
    fn test_config_rejects_non_integer_ticks() {
        assert!(syn::parse_str::<TestConfig>("flush_ticks = \"2\"").is_err());
    }

    #[::core::prelude::v1::test]
    fn test_expand_injects_mocks() {
        let input = syn::parse_str(
            "async fn loads(fetch: AsyncFn<u32, String, ()>) { fetch.call(1); }",
        )
        .unwrap();

        let expanded = expand_test(&TestConfig::default(), &input)
            .unwrap()
            .to_string();

        assert!(expanded.contains("tokio :: test"));
        assert!(expanded.contains("let fetch"));
        assert!(expanded.contains("\"fetch\""));
        assert!(!expanded.contains("flush_ticks"));
    }

    #[::core::prelude::v1::test]
    fn test_expand_rejects_sync_fn() {
        let input = syn::parse_str("fn not_async() {}").unwrap();
        let err = expand_test(&TestConfig::default(), &input).unwrap_err();
        assert!(err.to_string().contains("must be async"));
    }

    #[::core::prelude::v1::test]
    fn test_expand_rejects_other_params() {
        let input = syn::parse_str("async fn odd(count: u32) {}").unwrap();
        let err = expand_test(&TestConfig::default(), &input).unwrap_err();
        assert!(err.to_string().contains("only `AsyncFn<..>` parameters"));
    }
}
