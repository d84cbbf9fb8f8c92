use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The five kinds of label the printer service can render.
///
/// The set is closed: every table keyed by variant is an exhaustive `match`,
/// so adding a variant fails to compile until each table handles it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Plain multi-line text
    #[default]
    Text,
    /// QR code with optional text beside it
    Qr,
    /// Wrap-around cable label, repeated along its length
    Wrap,
    /// Flag label, mirrored around the cable
    Flag,
    /// Fiducial (ArUco) marker with optional text beside it
    Aruco,
}

impl Variant {
    /// All variants in navigation order.
    pub const ALL: [Variant; 5] = [
        Variant::Text,
        Variant::Qr,
        Variant::Wrap,
        Variant::Flag,
        Variant::Aruco,
    ];

    /// Wire name, also used as the navigation key in the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Text => "text",
            Variant::Qr => "qr",
            Variant::Wrap => "wrap",
            Variant::Flag => "flag",
            Variant::Aruco => "aruco",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown label variant '{0}'")]
pub struct VariantParseError(pub String);

impl FromStr for Variant {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| VariantParseError(s.to_string()))
    }
}

/// Cluster of inputs whose visibility is toggled together per variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    Lines,
    Label,
    Qrtext,
    Length,
    Id,
    Dictionary,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 6] = [
        FieldGroup::Lines,
        FieldGroup::Label,
        FieldGroup::Qrtext,
        FieldGroup::Length,
        FieldGroup::Id,
        FieldGroup::Dictionary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldGroup::Lines => "lines",
            FieldGroup::Label => "label",
            FieldGroup::Qrtext => "qrtext",
            FieldGroup::Length => "length",
            FieldGroup::Id => "id",
            FieldGroup::Dictionary => "dictionary",
        }
    }
}

/// Which field-groups are shown for one variant.
///
/// Every group has an explicit flag; there is no implicit default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldVisibility {
    pub lines: bool,
    pub label: bool,
    pub qrtext: bool,
    pub length: bool,
    pub id: bool,
    pub dictionary: bool,
}

impl FieldVisibility {
    pub fn is_visible(&self, group: FieldGroup) -> bool {
        match group {
            FieldGroup::Lines => self.lines,
            FieldGroup::Label => self.label,
            FieldGroup::Qrtext => self.qrtext,
            FieldGroup::Length => self.length,
            FieldGroup::Id => self.id,
            FieldGroup::Dictionary => self.dictionary,
        }
    }

    /// Iterate `(group, visible)` pairs in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldGroup, bool)> + '_ {
        FieldGroup::ALL.into_iter().map(|g| (g, self.is_visible(g)))
    }
}

/// A bound input whose value can be read into a job request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Printer,
    Tape,
    Fontname,
    Size,
    Align,
    Lines,
    Label,
    Qrtext,
    Length,
    Id,
    Dictionary,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Printer,
        Field::Tape,
        Field::Fontname,
        Field::Size,
        Field::Align,
        Field::Lines,
        Field::Label,
        Field::Qrtext,
        Field::Length,
        Field::Id,
        Field::Dictionary,
    ];

    /// Request key for this field.
    pub fn key(self) -> &'static str {
        match self {
            Field::Printer => "printer",
            Field::Tape => "tape",
            Field::Fontname => "fontname",
            Field::Size => "size",
            Field::Align => "align",
            Field::Lines => "lines",
            Field::Label => "label",
            Field::Qrtext => "qrtext",
            Field::Length => "length",
            Field::Id => "id",
            Field::Dictionary => "dictionary",
        }
    }

    /// The group this field belongs to, or `None` for global controls
    /// shown for every variant.
    pub fn group(self) -> Option<FieldGroup> {
        match self {
            Field::Printer | Field::Tape | Field::Fontname | Field::Size | Field::Align => None,
            Field::Lines => Some(FieldGroup::Lines),
            Field::Label => Some(FieldGroup::Label),
            Field::Qrtext => Some(FieldGroup::Qrtext),
            Field::Length => Some(FieldGroup::Length),
            Field::Id => Some(FieldGroup::Id),
            Field::Dictionary => Some(FieldGroup::Dictionary),
        }
    }

    pub fn is_global(self) -> bool {
        self.group().is_none()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown field '{0}'")]
pub struct FieldParseError(pub String);

impl FromStr for Field {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| FieldParseError(s.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_round_trips_through_name() {
        for variant in Variant::ALL {
            assert_eq!(variant.as_str().parse::<Variant>(), Ok(variant));
        }
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let err = "barcode".parse::<Variant>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown label variant 'barcode'");
    }

    #[test]
    fn test_variant_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Variant::Aruco).unwrap(), "\"aruco\"");
    }

    #[test]
    fn test_global_fields_have_no_group() {
        let globals: Vec<_> = Field::ALL.into_iter().filter(|f| f.is_global()).collect();
        assert_eq!(
            globals,
            vec![Field::Printer, Field::Tape, Field::Fontname, Field::Size, Field::Align]
        );
    }

    #[test]
    fn test_field_parse() {
        assert_eq!("qrtext".parse::<Field>(), Ok(Field::Qrtext));
        assert!("colour".parse::<Field>().is_err());
    }
}
