mod position;

/// Derive macro generating an implementation of the trait `Position`.
///
/// The struct needs a field named `position`, or a field marked with the `#[position]` attribute.
#[proc_macro_derive(Position, attributes(position))]
pub fn position_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    position::impl_position(syn::parse(input)).unwrap_or_else(|e| e.to_compile_error().into())
}

fn get_field<'a>(name: &str, data_struct: &'a syn::DataStruct) -> Option<&'a syn::Field> {
    data_struct
        .fields
        .iter()
        .find(|field| field.ident.as_ref().is_some_and(|ident| ident == name))
}

fn get_marked_field<'a>(attr: &str, data_struct: &'a syn::DataStruct) -> Option<&'a syn::Field> {
    data_struct
        .fields
        .iter()
        .find(|field| get_attribute(attr, &field.attrs).is_some())
}

fn get_attribute<'a>(name: &str, attrs: &'a [syn::Attribute]) -> Option<&'a syn::Attribute> {
    attrs.iter().find(|attr| attr.path().is_ident(name))
}
