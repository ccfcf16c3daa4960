pub fn impl_position(input: syn::Result<syn::DeriveInput>) -> syn::Result<proc_macro::TokenStream> {
    let mut input = input?;

    let field = match &input.data {
        syn::Data::Struct(data_struct) => crate::get_marked_field("position", data_struct)
            .or_else(|| crate::get_field("position", data_struct))
            .ok_or_else(|| {
                syn::Error::new_spanned(
                    &data_struct.fields,
                    "no `position` field and no field marked `#[position]`",
                )
            }),
        _ => Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "the `Position` trait can only be derived for struct types",
        )),
    }?;

    let position_ty = &field.ty;
    let accessor = match &field.ident {
        Some(ident) => quote::quote! { #ident },
        None => {
            return Err(syn::Error::new_spanned(
                field,
                "the `Position` trait can only be derived for structs with named fields",
            ))
        }
    };

    input
        .generics
        .where_clause
        .get_or_insert_with(|| syn::WhereClause {
            where_token: Default::default(),
            predicates: Default::default(),
        })
        .predicates
        .push(syn::parse_quote! {
            #position_ty: ::core::clone::Clone
        });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let name = &input.ident;

    Ok(quote::quote! {
        impl #impl_generics Position for #name #ty_generics #where_clause {
            type Vector = #position_ty;

            #[inline]
            fn position(&self) -> Self::Vector {
                self.#accessor.clone()
            }
        }
    }
    .into())
}
