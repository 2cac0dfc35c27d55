use proc_macro::TokenStream;
use proc_macro2::{Literal, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, LitStr, PathArguments, Type,
    parse_macro_input, parse_quote,
};

/// Derive macro for `rowbind_core::Record`.
///
/// Generates `schema()`, describing every named field in declaration order,
/// and `assign()`, storing coerced values into those fields.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default)]
/// pub struct User {
///     #[csv(name = "id")]
///     pub id: i64,
///
///     #[csv(name = "created_at")]
///     pub created_at: Option<NaiveDateTime>,
///
///     // Not bound to any header column.
///     #[csv(skip)]
///     pub cached: bool,
/// }
/// ```
///
/// Field attributes:
///
/// - `#[csv(name = "column")]`: header column; `name = "-"` ignores the field.
/// - `#[csv(skip)]`: ignore the field in header mode.
///
/// Integer types, `String`, `bool` and `NaiveDateTime` use built-in
/// coercion; `Option<T>` accepts null literals. Any other type is decoded
/// only through a converter returning `Value::other`.
#[proc_macro_derive(Record, attributes(csv))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Column binding parsed from `#[csv(...)]`.
enum Binding {
    Named(String),
    Skipped,
    Unannotated,
}

/// Value kind of a field type, mirroring `rowbind_core::SemanticType`.
enum Kind {
    Integer,
    String,
    Boolean,
    Timestamp,
    Other(String),
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let record_name = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Record only supports structs",
            ));
        }
    };

    let mut field_defs = Vec::new();
    let mut assign_arms = Vec::new();
    let mut other_types = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name = ident.to_string();
        let field_ty = &field.ty;
        let type_name = quote!(#field_ty).to_string().replace(' ', "");

        let binding = parse_binding(field)?;
        let (inner_ty, nullable) = match option_inner(field_ty) {
            Some(inner) => (inner, true),
            None => (field_ty, false),
        };
        let kind = classify(inner_ty)?;

        let semantic_expr = match &kind {
            Kind::Integer => quote! { ::rowbind_core::SemanticType::Integer },
            Kind::String => quote! { ::rowbind_core::SemanticType::String },
            Kind::Boolean => quote! { ::rowbind_core::SemanticType::Boolean },
            Kind::Timestamp => quote! { ::rowbind_core::SemanticType::Timestamp },
            Kind::Other(other) => quote! { ::rowbind_core::SemanticType::Other(#other) },
        };

        let binding_expr = match &binding {
            Binding::Named(column) => quote! { .column(#column) },
            Binding::Skipped => quote! { .skip() },
            Binding::Unannotated => quote! {},
        };

        field_defs.push(quote! {
            ::rowbind_core::FieldDef::new(#field_name, #type_name, #semantic_expr)
                #binding_expr
                .nullable(#nullable)
        });

        if let Kind::Other(_) = kind {
            other_types.push(inner_ty);
        }

        let value_expr = match (&kind, nullable) {
            (Kind::Other(_), false) => quote! {
                ::rowbind_core::value::from_other::<#field_ty>(value)?
            },
            (Kind::Other(_), true) => quote! {
                ::rowbind_core::value::from_optional_other::<#inner_ty>(value)?
            },
            _ => quote! {
                <#field_ty as ::rowbind_core::FromValue>::from_value(value)?
            },
        };

        let index = Literal::usize_unsuffixed(index);
        assign_arms.push(quote! {
            #index => {
                self.#ident = #value_expr;
                ::core::result::Result::Ok(())
            }
        });
    }

    // Values of other types travel as `Box<dyn Any>`.
    let mut generics = input.generics.clone();
    if !other_types.is_empty() {
        let where_clause = generics.make_where_clause();
        for ty in other_types {
            where_clause.predicates.push(parse_quote!(#ty: 'static));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::rowbind_core::Record for #name #ty_generics #where_clause {
            fn schema() -> ::rowbind_core::Schema {
                ::rowbind_core::Schema::new(#record_name)
                    #( .field(#field_defs) )*
            }

            fn assign(
                &mut self,
                field: ::rowbind_core::FieldHandle,
                value: ::rowbind_core::Value,
            ) -> ::core::result::Result<(), ::rowbind_core::ValueError> {
                match field.index() {
                    #(#assign_arms)*
                    other => {
                        let _ = value;
                        ::core::result::Result::Err(::rowbind_core::ValueError::UnknownField(other))
                    }
                }
            }
        }
    })
}

/// Parse `#[csv(name = "...")]` / `#[csv(skip)]` on a field.
fn parse_binding(field: &Field) -> Result<Binding, syn::Error> {
    let mut binding = Binding::Unannotated;

    for attr in &field.attrs {
        if !attr.path().is_ident("csv") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                binding = match value.value().as_str() {
                    "-" => Binding::Skipped,
                    "" => {
                        return Err(meta.error("column name must not be empty"));
                    }
                    column => Binding::Named(column.to_string()),
                };
                Ok(())
            } else if meta.path.is_ident("skip") {
                binding = Binding::Skipped;
                Ok(())
            } else {
                Err(meta.error("unknown csv attribute (expected `name` or `skip`)"))
            }
        })?;
    }

    Ok(binding)
}

/// Returns `T` when `ty` is `Option<T>`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Classify a field type by the last segment of its path.
fn classify(ty: &Type) -> Result<Kind, syn::Error> {
    let Some(ident) = type_ident_name(ty) else {
        return Err(syn::Error::new_spanned(
            ty,
            "unsupported field type for Record (expected a type path)",
        ));
    };

    Ok(match ident.as_str() {
        "i8" | "i16" | "i32" | "i64" | "isize" | "u8" | "u16" | "u32" | "u64" | "usize" => {
            Kind::Integer
        }
        "String" => Kind::String,
        "bool" => Kind::Boolean,
        "NaiveDateTime" => Kind::Timestamp,
        _ => Kind::Other(ident),
    })
}

/// Extract the last path segment ident name from a type (e.g. `u64`, `String`).
fn type_ident_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        type_path
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string())
    } else {
        None
    }
}
