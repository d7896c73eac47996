use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Attribute, Ident, Path, Token, Visibility, braced,
    parse::{Parse, ParseStream},
    parse_quote,
};

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

pub struct DeclareVisitorInput {
    pub krate: Option<Path>,
    pub node: Path,
    pub kind: Path,
    pub attrs: Vec<Attribute>,
    pub vis: Visibility,
    pub name: Ident,
    pub handlers: Vec<HandlerDef>,
}

pub struct HandlerDef {
    pub attrs: Vec<Attribute>,
    pub variant: Ident,
    pub method: Ident,
}

impl Parse for DeclareVisitorInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut krate = None;
        let mut node = None;
        let mut kind = None;
        let mut visitor = None;

        while !input.is_empty() {
            let fork = input.fork();
            fork.call(Attribute::parse_outer)?;
            fork.parse::<Visibility>()?;
            if fork.peek(Token![trait]) {
                let attrs = input.call(Attribute::parse_outer)?;
                let vis: Visibility = input.parse()?;
                input.parse::<Token![trait]>()?;
                let name: Ident = input.parse()?;

                let content;
                braced!(content in input);
                let mut handlers: Vec<HandlerDef> = Vec::new();
                while !content.is_empty() {
                    let handler: HandlerDef = content.parse()?;
                    if handlers.iter().any(|h| h.variant == handler.variant) {
                        return Err(syn::Error::new(
                            handler.variant.span(),
                            format!("duplicate handler for kind `{}`", handler.variant),
                        ));
                    }
                    handlers.push(handler);
                    if content.peek(Token![,]) {
                        content.parse::<Token![,]>()?;
                    }
                }
                visitor = Some((attrs, vis, name, handlers));
                if input.peek(Token![,]) {
                    input.parse::<Token![,]>()?;
                }
                continue;
            }

            let ident: Ident = input.parse()?;
            input.parse::<Token![:]>()?;

            match ident.to_string().as_str() {
                "path" => krate = Some(input.parse()?),
                "node" => node = Some(input.parse()?),
                "kind" => kind = Some(input.parse()?),
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown field: {}", other),
                    ));
                }
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        let node = node.ok_or_else(|| syn::Error::new(input.span(), "missing `node` field"))?;
        let kind = kind.ok_or_else(|| syn::Error::new(input.span(), "missing `kind` field"))?;
        let (attrs, vis, name, handlers) = visitor
            .ok_or_else(|| syn::Error::new(input.span(), "missing `trait Name { ... }` block"))?;

        Ok(Self {
            krate,
            node,
            kind,
            attrs,
            vis,
            name,
            handlers,
        })
    }
}

impl Parse for HandlerDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let variant: Ident = input.parse()?;
        let method = if input.peek(Token![=>]) {
            input.parse::<Token![=>]>()?;
            input.parse()?
        } else {
            Ident::new(&to_snake_case(&variant.to_string()), variant.span())
        };
        Ok(Self {
            attrs,
            variant,
            method,
        })
    }
}

pub fn expand(input: DeclareVisitorInput) -> syn::Result<TokenStream> {
    let DeclareVisitorInput {
        krate,
        node,
        kind,
        attrs,
        vis,
        name,
        handlers,
    } = input;

    let krate: Path = krate.unwrap_or_else(|| parse_quote!(::transkit));

    let methods = handlers.iter().map(|handler| {
        let HandlerDef {
            attrs,
            variant,
            method,
        } = handler;
        let doc = if attrs.iter().any(|a| a.path().is_ident("doc")) {
            quote! {}
        } else {
            let text = format!(" Handles `{}` nodes. `None` leaves the node unhandled.", variant);
            quote! { #[doc = #text] }
        };
        quote! {
            #doc
            #(#attrs)*
            fn #method(
                &self,
                node: &#node,
                cx: &#krate::AstContext<'_, Self>,
            ) -> ::core::option::Option<#krate::OTree> {
                let _ = (node, cx);
                ::core::option::Option::None
            }
        }
    });

    let arms = handlers.iter().map(|handler| {
        let HandlerDef {
            variant, method, ..
        } = handler;
        quote! {
            #kind::#variant => visitor.#method(self, cx),
        }
    });

    Ok(quote! {
        #(#attrs)*
        #vis trait #name: #krate::Visitor<Node = #node> {
            #(#methods)*
        }

        impl<__Visitor: #name> #krate::Dispatch<__Visitor> for #node {
            #[allow(unreachable_patterns)]
            fn dispatch(
                &self,
                visitor: &__Visitor,
                cx: &#krate::AstContext<'_, __Visitor>,
            ) -> ::core::option::Option<#krate::OTree> {
                match #krate::SyntaxNode::kind(self) {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case::test_case("SourceFile", "source_file"; "pascal")]
    #[test_case::test_case("Identifier", "identifier"; "single word")]
    #[test_case::test_case("ifStatement", "if_statement"; "camel")]
    fn test_to_snake_case(input: &str, expected: &str) {
        assert_eq!(to_snake_case(input), expected);
    }

    #[test]
    fn test_parse_input() {
        let input: DeclareVisitorInput = syn::parse_quote! {
            node: crate::TsNode,
            kind: SyntaxKind,
            /// Handlers.
            pub trait TsVisitor {
                SourceFile,
                CallExpression => call,
            }
        };
        assert!(input.krate.is_none());
        assert_eq!(input.name, "TsVisitor");
        assert_eq!(input.attrs.len(), 1);
        let methods: Vec<String> = input.handlers.iter().map(|h| h.method.to_string()).collect();
        assert_eq!(methods, vec!["source_file", "call"]);
    }

    #[test]
    fn test_duplicate_handler_rejected() {
        let result = syn::parse2::<DeclareVisitorInput>(quote! {
            node: N,
            kind: K,
            trait V { A, A => other }
        });
        let err = result.err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("duplicate handler for kind `A`"));
    }

    #[test]
    fn test_missing_node_rejected() {
        let result = syn::parse2::<DeclareVisitorInput>(quote! {
            kind: K,
            trait V { A }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_uses_custom_path() {
        let input: DeclareVisitorInput = syn::parse_quote! {
            path: transkit_core,
            node: N,
            kind: K,
            trait V { A }
        };
        let tokens = expand(input)
            .map(|tokens| tokens.to_string())
            .unwrap_or_default();
        assert!(tokens.contains("transkit_core :: Dispatch < __Visitor > for N"));
        assert!(tokens.contains("K :: A => visitor . a (self , cx)"));
    }
}
