use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::meta::ParseNestedMeta;
use syn::{GenericArgument, Ident, ItemImpl, Path, PathArguments, Result, Type};

/// Options given inside `#[handler(...)]`.
#[derive(Default)]
pub struct HandlerArgs {
    factory: Option<Path>,
    core: Option<Path>,
}

impl HandlerArgs {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("factory") {
            self.factory = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("core") {
            self.core = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported handler option, expected `factory` or `core`"))
        }
    }
}

/// The contract an impl block implements.
enum Contract {
    Command(Type),
    CommandWithResponse(Type, Type),
    Subscriber(Type),
}

impl Contract {
    fn from_path(path: &Path) -> Result<Self> {
        let segment = path
            .segments
            .last()
            .ok_or_else(|| syn::Error::new_spanned(path, "empty trait path"))?;

        let args: Vec<Type> = match &segment.arguments {
            PathArguments::AngleBracketed(generics) => generics
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => Some(ty.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let name = segment.ident.to_string();
        match (name.as_str(), args.as_slice()) {
            ("CommandHandler", [command]) => Ok(Self::Command(command.clone())),
            ("CommandHandlerWithResponse", [command, response]) => {
                Ok(Self::CommandWithResponse(command.clone(), response.clone()))
            }
            ("EventSubscriber", [event]) => Ok(Self::Subscriber(event.clone())),
            ("CommandHandler" | "CommandHandlerWithResponse" | "EventSubscriber", _) => {
                Err(syn::Error::new_spanned(
                    segment,
                    format!("`{name}` has the wrong number of type arguments"),
                ))
            }
            _ => Err(syn::Error::new_spanned(
                path,
                format!(
                    "`{name}` is not a mediator contract, \
                     expected one of: CommandHandler, CommandHandlerWithResponse, EventSubscriber"
                ),
            )),
        }
    }

    fn declaration(&self) -> TokenStream {
        match self {
            Self::Command(command) => quote!(.handles::<#command>()),
            Self::CommandWithResponse(command, response) => {
                quote!(.responds::<#command, #response>())
            }
            Self::Subscriber(event) => quote!(.subscribes::<#event>()),
        }
    }
}

/// Implementation of `#[handler]`.
///
/// Leaves the impl block unchanged and appends a
/// `#[distributed_slice(HANDLER_TABLE)]` static describing it.
pub fn expand(args: HandlerArgs, item: ItemImpl) -> Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[handler] cannot register generic impls",
        ));
    }

    let Some((_, trait_path, _)) = &item.trait_ else {
        return Err(syn::Error::new_spanned(
            &item.self_ty,
            "#[handler] must be placed on a contract impl, e.g. `impl CommandHandler<C> for T`",
        ));
    };

    let contract = Contract::from_path(trait_path)?;
    let declaration = contract.declaration();
    let self_ty = &item.self_ty;

    let core = args
        .core
        .map(ToTokens::into_token_stream)
        .unwrap_or_else(|| quote!(::mediator::core));

    let constructor = match &args.factory {
        Some(factory) => quote!(#core::CandidateType::with_factory::<#self_ty, _>(#factory)),
        None => quote!(#core::CandidateType::of::<#self_ty>()),
    };

    let handler_name = compact(self_ty.to_token_stream());
    let static_name = Ident::new(
        &static_name(&handler_name, &compact(trait_path.to_token_stream())),
        Span::call_site(),
    );

    Ok(quote! {
        #item

        #[doc(hidden)]
        #[allow(non_upper_case_globals)]
        #[#core::linkme::distributed_slice(#core::HANDLER_TABLE)]
        #[linkme(crate = #core::linkme)]
        static #static_name: #core::LinkedHandler = #core::LinkedHandler {
            module_path: ::core::module_path!(),
            handler: #handler_name,
            candidate: || #constructor #declaration.build(),
        };
    })
}

/// Readable prefix plus a hash of the exact paths, so impls whose paths
/// sanitize to the same fragment still get distinct statics.
fn static_name(handler: &str, contract: &str) -> String {
    let mut hasher = DefaultHasher::new();
    (handler, contract).hash(&mut hasher);
    format!(
        "_MEDIATOR_HANDLER_{}_{}_{:016X}",
        sanitize(handler),
        sanitize(contract),
        hasher.finish()
    )
}

fn compact(tokens: TokenStream) -> String {
    tokens.to_string().replace(' ', "")
}

/// Turns a type or path into an identifier fragment.
fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_underscore = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_uppercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    out.trim_matches('_').to_string()
}
