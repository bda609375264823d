use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, LitInt, LitStr, Meta, parse_macro_input};

#[derive(Clone, Copy, Default)]
enum KindAttr {
    #[default]
    Text,
    Email,
    Select,
    Multiline,
}

#[derive(Default)]
struct FieldAttr {
    kind: KindAttr,
    required: bool,
    min_len: Option<usize>,
    label: Option<String>,
}

#[proc_macro_derive(FormModel, attributes(field))]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let root = crate_path();
    let mut lens_defs = Vec::new();
    let mut fields_methods = Vec::new();
    let mut specs = Vec::new();
    let mut text_arms = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident.clone() else {
            continue;
        };
        let declared = match parse_field_attr(&field) {
            Ok(declared) => declared,
            Err(error) => return error.to_compile_error().into(),
        };
        let field_ty = field.ty;
        let field_name = field_ident.to_string();
        let lens_ident = format_ident!("{model_ident}{}Lens", to_pascal_case(&field_name));

        lens_defs.push(quote! {
            #[derive(Clone, Copy, Debug, Default)]
            pub struct #lens_ident;

            impl #root::form::FieldLens<#model_ident> for #lens_ident {
                type Value = #field_ty;

                fn key(self) -> #root::form::FieldKey {
                    #root::form::FieldKey::new(#field_name)
                }

                fn get<'a>(self, model: &'a #model_ident) -> &'a Self::Value {
                    &model.#field_ident
                }

                fn set(self, model: &mut #model_ident, value: Self::Value) {
                    model.#field_ident = value;
                }
            }
        });

        fields_methods.push(quote! {
            pub const fn #field_ident(&self) -> #lens_ident {
                #lens_ident
            }
        });

        if let Some(declared) = declared {
            specs.push(field_spec_tokens(&root, &field_name, declared));
            text_arms.push(quote! {
                #field_name => ::core::option::Option::Some(
                    ::core::convert::AsRef::<str>::as_ref(&self.#field_ident),
                ),
            });
        }
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#fields_methods)*
        }

        impl #root::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn field_specs() -> ::std::vec::Vec<#root::form::FieldSpec> {
                ::std::vec![#(#specs),*]
            }

            fn field_text(&self, key: #root::form::FieldKey) -> ::core::option::Option<&str> {
                match key.as_str() {
                    #(#text_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        #(#lens_defs)*
    }
    .into()
}

fn parse_field_attr(field: &syn::Field) -> syn::Result<Option<FieldAttr>> {
    let mut declared = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        let mut parsed = FieldAttr::default();
        if !matches!(attr.meta, Meta::Path(_)) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("required") {
                    parsed.required = true;
                } else if meta.path.is_ident("email") {
                    parsed.kind = KindAttr::Email;
                } else if meta.path.is_ident("select") {
                    parsed.kind = KindAttr::Select;
                } else if meta.path.is_ident("multiline") {
                    parsed.kind = KindAttr::Multiline;
                } else if meta.path.is_ident("min_len") {
                    let value: LitInt = meta.value()?.parse()?;
                    parsed.min_len = Some(value.base10_parse()?);
                } else if meta.path.is_ident("label") {
                    let value: LitStr = meta.value()?.parse()?;
                    parsed.label = Some(value.value());
                } else {
                    return Err(meta.error(
                        "expected one of `required`, `email`, `select`, `multiline`, `min_len`, `label`",
                    ));
                }
                Ok(())
            })?;
        }

        if parsed.min_len.is_some() && !matches!(parsed.kind, KindAttr::Multiline) {
            return Err(syn::Error::new_spanned(
                attr,
                "`min_len` is only supported on `multiline` fields",
            ));
        }
        declared = Some(parsed);
    }
    Ok(declared)
}

fn field_spec_tokens(root: &TokenStream2, field_name: &str, declared: FieldAttr) -> TokenStream2 {
    let kind = match declared.kind {
        KindAttr::Text => quote!(Text),
        KindAttr::Email => quote!(Email),
        KindAttr::Select => quote!(Select),
        KindAttr::Multiline => quote!(MultilineText),
    };
    let label = match declared.label {
        Some(value) => quote!(::core::option::Option::Some(#value)),
        None => quote!(::core::option::Option::None),
    };
    let required = declared.required;
    let min_len = match declared.min_len {
        Some(value) => quote!(::core::option::Option::Some(#value)),
        None => quote!(::core::option::Option::None),
    };

    quote! {
        #root::form::FieldSpec {
            key: #root::form::FieldKey::new(#field_name),
            label: #label,
            kind: #root::form::FieldKind::#kind,
            required: #required,
            min_len: #min_len,
        }
    }
}

fn crate_path() -> TokenStream2 {
    match crate_name("contactform") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::contactform),
    }
}

fn to_pascal_case(input: &str) -> String {
    let mut out = String::new();
    for segment in input.split('_') {
        if segment.is_empty() {
            continue;
        }
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
