//! Interface identifiers decoded from `GuidAttribute`

use std::fmt;

use crate::error::{MetadataError, MetadataResult};
use crate::model::{CustomAttribute, FixedArg, TypeDef};

/// Namespace of the attribute carrying interface identifiers
pub const GUID_ATTRIBUTE_NAMESPACE: &str = "Windows.Foundation.Metadata";
/// Name of the attribute carrying interface identifiers
pub const GUID_ATTRIBUTE_NAME: &str = "GuidAttribute";

/// 128-bit interface identifier in its native field layout
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    /// Build a GUID from its fields
    pub const fn from_fields(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Decode the eleven fixed arguments of a `GuidAttribute`
    /// (`u32, u16, u16` followed by eight `u8`).
    pub fn from_attribute(attribute: &CustomAttribute) -> MetadataResult<Self> {
        let args = &attribute.fixed_args;
        if args.len() != 11 {
            return Err(malformed(
                attribute,
                format!("expected 11 fixed arguments, got {}", args.len()),
            ));
        }

        let data1 = match &args[0] {
            FixedArg::U32(v) => *v,
            other => return Err(wrong_kind(attribute, 0, "u32", other)),
        };
        let data2 = match &args[1] {
            FixedArg::U16(v) => *v,
            other => return Err(wrong_kind(attribute, 1, "u16", other)),
        };
        let data3 = match &args[2] {
            FixedArg::U16(v) => *v,
            other => return Err(wrong_kind(attribute, 2, "u16", other)),
        };

        let mut data4 = [0u8; 8];
        for (i, slot) in data4.iter_mut().enumerate() {
            *slot = match &args[3 + i] {
                FixedArg::U8(v) => *v,
                other => return Err(wrong_kind(attribute, 3 + i, "u8", other)),
            };
        }

        Ok(Self::from_fields(data1, data2, data3, data4))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

impl TypeDef {
    /// Interface identifier declared through `GuidAttribute`
    pub fn guid(&self) -> MetadataResult<Guid> {
        let attribute = self
            .attribute(GUID_ATTRIBUTE_NAMESPACE, GUID_ATTRIBUTE_NAME)
            .ok_or_else(|| MetadataError::AttributeNotFound {
                attribute: format!("{}.{}", GUID_ATTRIBUTE_NAMESPACE, GUID_ATTRIBUTE_NAME),
                type_name: self.name.to_string(),
            })?;
        Guid::from_attribute(attribute)
    }
}

fn malformed(attribute: &CustomAttribute, reason: String) -> MetadataError {
    MetadataError::MalformedAttribute {
        attribute: attribute.ty.to_string(),
        reason,
    }
}

fn wrong_kind(
    attribute: &CustomAttribute,
    index: usize,
    expected: &str,
    got: &FixedArg,
) -> MetadataError {
    malformed(
        attribute,
        format!(
            "argument {} should be {}, got {}",
            index,
            expected,
            got.kind_name()
        ),
    )
}
