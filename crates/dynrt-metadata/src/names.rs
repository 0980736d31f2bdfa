//! Rendering signature types as metadata type names

use crate::error::{MetadataError, MetadataResult};
use crate::model::{ElementType, TypeDef, TypeSig};

/// Render a signature type the way metadata tools print it:
/// `Namespace.Name`, element types by their short names, generic
/// instances as `Namespace.Name<Arg, Arg>`.
pub fn type_name(sig: &TypeSig) -> MetadataResult<String> {
    let mut out = String::new();
    write_type_name(&mut out, sig)?;
    Ok(out)
}

fn write_type_name(out: &mut String, sig: &TypeSig) -> MetadataResult<()> {
    match sig {
        TypeSig::Named(name) => {
            out.push_str(&name.namespace);
            out.push('.');
            out.push_str(&name.name);
        }
        TypeSig::Element(element) => out.push_str(element_name(*element)?),
        TypeSig::GenericInst { generic, args } => {
            out.push_str(&generic.namespace);
            out.push('.');
            out.push_str(&generic.name);
            out.push('<');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type_name(out, arg)?;
            }
            out.push('>');
        }
        TypeSig::SzArray(element) => {
            write_type_name(out, element)?;
            out.push_str("[]");
        }
    }
    Ok(())
}

fn element_name(element: ElementType) -> MetadataResult<&'static str> {
    Ok(match element {
        ElementType::Boolean => "Boolean",
        ElementType::Char => "Char",
        ElementType::I1 => "I1",
        ElementType::U1 => "U1",
        ElementType::I2 => "I2",
        ElementType::U2 => "U2",
        ElementType::I4 => "I4",
        ElementType::U4 => "U4",
        ElementType::I8 => "I8",
        ElementType::U8 => "U8",
        ElementType::R4 => "R4",
        ElementType::R8 => "R8",
        ElementType::String => "String",
        ElementType::Object => "Object",
        ElementType::Void => {
            return Err(MetadataError::UnsupportedElementType(format!(
                "{:?}",
                element
            )))
        }
    })
}

impl TypeDef {
    /// Names of every interface this type implements, in metadata order
    pub fn interface_names(&self) -> MetadataResult<Vec<String>> {
        self.interfaces.iter().map(type_name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeName;

    #[test]
    fn test_named_type() {
        let sig = TypeSig::Named(TypeName::new("Windows.Data.Json", "IJsonValue"));
        assert_eq!(type_name(&sig).unwrap(), "Windows.Data.Json.IJsonValue");
    }

    #[test]
    fn test_generic_instance() {
        let sig = TypeSig::GenericInst {
            generic: TypeName::new("Windows.Foundation.Collections", "IMap`2"),
            args: vec![
                TypeSig::Element(ElementType::String),
                TypeSig::Named(TypeName::new("Windows.Data.Json", "IJsonValue")),
            ],
        };
        assert_eq!(
            type_name(&sig).unwrap(),
            "Windows.Foundation.Collections.IMap`2<String, Windows.Data.Json.IJsonValue>"
        );
    }

    #[test]
    fn test_nested_generic_and_array() {
        let sig = TypeSig::GenericInst {
            generic: TypeName::new("Windows.Foundation.Collections", "IIterable`1"),
            args: vec![TypeSig::SzArray(Box::new(TypeSig::Element(ElementType::U1)))],
        };
        assert_eq!(
            type_name(&sig).unwrap(),
            "Windows.Foundation.Collections.IIterable`1<U1[]>"
        );
    }

    #[test]
    fn test_void_is_rejected() {
        let result = type_name(&TypeSig::Element(ElementType::Void));
        assert!(matches!(result, Err(MetadataError::UnsupportedElementType(_))));
    }
}
