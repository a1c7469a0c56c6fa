#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![no_std]

use core::{borrow::Borrow, str::FromStr, iter::Peekable};

extern crate alloc;
use alloc::{
  vec,
  vec::Vec,
  string::{String, ToString},
  format,
};

extern crate proc_macro;
use proc_macro::{Delimiter, TokenTree, TokenStream};

// `<` will not open a group, so we use this to take all items within a `< ... >` expression.
fn take_angle_expression(
  iter: &mut Peekable<impl Iterator<Item: Borrow<TokenTree>>>,
) -> TokenStream {
  {
    let Some(peeked) = iter.peek() else { return TokenStream::default() };
    let TokenTree::Punct(punct) = peeked.borrow() else { return TokenStream::default() };
    if punct.as_char() != '<' {
      return TokenStream::default();
    }
  }

  let mut result = vec![];
  let mut count = 0;
  loop {
    let item = iter.next().expect("`TokenTree` unexpectedly terminated when taking `< ... >`");
    result.push(item.borrow().clone());
    if let TokenTree::Punct(punct) = item.borrow() {
      let punct = punct.as_char();
      if punct == '<' {
        count += 1;
      }
      if punct == '>' {
        count -= 1;
      }
      if count == 0 {
        break;
      }
    }
  }
  TokenStream::from_iter(result)
}

// Skip a `pub`, `pub(crate)`, `pub(in path)`, etc.
fn skip_visibility(iter: &mut Peekable<impl Iterator<Item = TokenTree>>) {
  if !matches!(iter.peek(), Some(TokenTree::Ident(ident)) if ident.to_string() == "pub") {
    return;
  }
  let _ = iter.next().expect("peeked but not present");
  if matches!(
    iter.peek(),
    Some(TokenTree::Group(group)) if group.delimiter() == Delimiter::Parenthesis
  ) {
    let _ = iter.next().expect("peeked but not present");
  }
}

struct Field {
  name: String,
  key: String,
  ty: String,
  read_only: bool,
}

struct Struct {
  name: String,
  fields: Vec<Field>,
}

// Read the string literal from `key("...")`.
fn parse_key(mut attribute: impl Iterator<Item = TokenTree>) -> String {
  let TokenTree::Group(group) = attribute.next().expect("`key` attribute without arguments") else {
    panic!("`key` attribute not followed with `(...)`")
  };
  assert_eq!(
    group.delimiter(),
    Delimiter::Parenthesis,
    "`key` attribute with a non-parentheses group"
  );
  let mut arguments = group.stream().into_iter();
  let Some(TokenTree::Literal(literal)) = arguments.next() else {
    panic!("`key` attribute with a non-literal argument")
  };
  assert!(arguments.next().is_none(), "`key` attribute with multiple tokens within parentheses");
  let literal = literal.to_string();
  assert!(
    (literal.len() >= 2) && literal.starts_with('"') && literal.ends_with('"'),
    "literal wasn't a string literal"
  );
  let key = &literal[1 .. (literal.len() - 1)];
  assert!(!key.contains('\\'), "`key` attribute with an escape sequence");
  key.to_string()
}

fn parse_struct(object: TokenStream) -> Struct {
  let mut object = object.into_iter().peekable();

  loop {
    match object.peek() {
      Some(TokenTree::Punct(punct)) if punct.as_char() == '#' => {
        let _ = object.next().expect("peeked but not present");
        let TokenTree::Group(_) = object.next().expect("`#` but no `[ ... ]`") else {
          panic!("`#` not followed by a `TokenTree::Group` for its `[ ... ]`")
        };
      }
      _ => break,
    }
  }
  skip_visibility(&mut object);

  match object.next() {
    Some(TokenTree::Ident(ident)) if ident.to_string() == "struct" => {}
    _ => panic!("`JsonObject` wasn't applied to a `struct`"),
  }
  let name = match object.next() {
    Some(TokenTree::Ident(ident)) => ident.to_string(),
    _ => panic!("`JsonObject` wasn't applied to a `struct` with a name"),
  };
  if !take_angle_expression(&mut object).is_empty() {
    panic!("`JsonObject` can't be derived for a generic `struct`");
  }

  let struct_body = match object.next() {
    // A unit `struct`, which has no properties
    Some(TokenTree::Punct(punct)) if punct.as_char() == ';' => {
      return Struct { name, fields: vec![] };
    }
    Some(TokenTree::Group(group)) if group.delimiter() == Delimiter::Brace => group,
    Some(TokenTree::Group(_)) => {
      panic!("`JsonObject` derivation applied to `struct` with anonymous fields")
    }
    _ => panic!("`struct`'s name was not followed by its body"),
  };

  let mut fields = vec![];

  let mut struct_body = struct_body.stream().into_iter().peekable();
  // Read each field within this `struct`'s body
  while struct_body.peek().is_some() {
    let mut key = None;
    let mut skip = false;
    let mut read_only = false;
    let mut field_name = None;
    for item in &mut struct_body {
      match item {
        TokenTree::Group(group) if group.delimiter() == Delimiter::Bracket => {
          let mut attribute = group.stream().into_iter();
          let ident = attribute.next().and_then(|ident| match ident {
            TokenTree::Ident(ident) => Some(ident.to_string()),
            _ => None,
          });
          match ident.as_deref() {
            Some("skip") => skip = true,
            Some("read_only") => read_only = true,
            Some("key") => key = Some(parse_key(attribute)),
            _ => {}
          }
        }
        TokenTree::Ident(ident) => {
          let ident = ident.to_string();
          // Skip the access modifier
          if ident == "pub" {
            continue;
          }
          field_name = Some(ident);
          break;
        }
        _ => {}
      }
    }
    let name = field_name.expect("couldn't find the name of the field within the `struct`");

    match struct_body.next() {
      Some(TokenTree::Punct(colon)) if colon.as_char() == ':' => {}
      _ => panic!("field's name wasn't followed by `:`"),
    }

    // Take the type, up to the next `,` on this depth
    let mut ty = vec![];
    loop {
      ty.extend(take_angle_expression(&mut struct_body));
      let Some(item) = struct_body.next() else { break };
      if matches!(&item, TokenTree::Punct(comma) if comma.as_char() == ',') {
        break;
      }
      ty.push(item);
    }
    let ty = TokenStream::from_iter(ty).to_string();

    if !skip {
      fields.push(Field { key: key.unwrap_or_else(|| name.clone()), name, ty, read_only });
    }
  }

  Struct { name, fields }
}

/// Derive an implementation of the `JsonObject` trait, with the accompanying `Field`
/// implementation.
///
/// Every named field becomes a property, exposed with the field's name. The type of each field
/// must implement `Field`.
///
/// - `#[key("Name")]` exposes the field with a distinct name.
/// - `#[skip]` omits the field from the properties entirely.
/// - `#[read_only]` lists the field as a property which is serialized yet never assigned.
///
/// The type's name within the catalog is `module_path!()` joined with the `struct`'s name. To be
/// registered with `TypeRegistry::register`, the `struct` must also implement `Default`.
///
/// As a procedural macro, this will panic causing a compile-time error on any unexpected input,
/// including generic `struct`s.
#[proc_macro_derive(JsonObject, attributes(key, skip, read_only))]
pub fn derive_json_object(object: TokenStream) -> TokenStream {
  let Struct { name, fields } = parse_struct(object);

  let mut properties = String::new();
  for Field { name: field_name, key, ty, read_only } in &fields {
    let set = if *read_only {
      "::core::option::Option::None".to_string()
    } else {
      format!(
        r#"
        ::core::option::Option::Some(|object, value| {{
          match <{ty} as ::shape_json_traits::Field>::from_property(value) {{
            ::core::option::Option::Some(value) => {{
              object.{field_name} = value;
              true
            }}
            ::core::option::Option::None => false,
          }}
        }})
        "#
      )
    };

    properties.push_str(&format!(
      r#"
      ::shape_json_traits::Property {{
        name: "{key}",
        declared: <{ty} as ::shape_json_traits::Field>::PROPERTY_TYPE,
        get: |object, on_unsupported| {{
          ::shape_json_traits::Field::to_value(&object.{field_name}, on_unsupported)
        }},
        set: {set},
      }},
      "#
    ));
  }

  TokenStream::from_str(&format!(
    r#"
    impl ::shape_json_traits::JsonObject for {name} {{
      const NAME: &'static str = ::core::concat!(::core::module_path!(), "::{name}");
      const PROPERTIES: &'static [::shape_json_traits::Property<Self>] = &[
        {properties}
      ];
    }}
    impl ::shape_json_traits::Field for {name} {{
      const PROPERTY_TYPE: ::shape_json_traits::PropertyType =
        ::shape_json_traits::PropertyType::Object(
          <Self as ::shape_json_traits::JsonObject>::NAME
        );
      fn to_value(
        &self,
        on_unsupported: ::shape_json_traits::OnUnsupported,
      ) -> ::core::result::Result<::shape_json_traits::Value, ::shape_json_traits::JsonError> {{
        ::shape_json_traits::object_to_value(self, on_unsupported)
      }}
      fn from_property(
        value: ::shape_json_traits::PropertyValue,
      ) -> ::core::option::Option<Self> {{
        ::shape_json_traits::object_from_property(value)
      }}
    }}
    "#
  ))
  .expect("typo in implementation of `JsonObject`")
}
