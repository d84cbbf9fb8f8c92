//! Variant registry: which field-groups each variant shows and which fields
//! its outbound request reads.
//!
//! Both lookups are exhaustive matches over [`Variant`]; there is no error
//! path because the variant set is closed at compile time.

use crate::models::{Field, FieldVisibility, Variant};

/// Field-group visibility for `variant`.
pub fn visibility_for(variant: Variant) -> FieldVisibility {
    match variant {
        Variant::Text => FieldVisibility {
            lines: true,
            label: false,
            qrtext: false,
            length: false,
            id: false,
            dictionary: false,
        },
        Variant::Qr => FieldVisibility {
            lines: true,
            label: false,
            qrtext: true,
            length: false,
            id: false,
            dictionary: false,
        },
        Variant::Wrap => FieldVisibility {
            lines: false,
            label: true,
            qrtext: false,
            length: true,
            id: false,
            dictionary: false,
        },
        Variant::Flag => FieldVisibility {
            lines: false,
            label: true,
            qrtext: false,
            length: false,
            id: false,
            dictionary: false,
        },
        Variant::Aruco => FieldVisibility {
            lines: true,
            label: false,
            qrtext: false,
            length: false,
            id: true,
            dictionary: true,
        },
    }
}

/// Ordered list of fields serialized into a request for `variant`.
///
/// Only global fields and fields of groups visible for the variant appear, so
/// stale values left behind by a previous variant never leak into a request.
pub fn fields_for(variant: Variant) -> &'static [Field] {
    use Field::*;

    match variant {
        Variant::Text => &[Printer, Tape, Fontname, Size, Align, Lines],
        Variant::Qr => &[Printer, Tape, Fontname, Size, Align, Qrtext, Lines],
        Variant::Wrap => &[Printer, Tape, Fontname, Label, Length],
        Variant::Flag => &[Printer, Tape, Fontname, Size, Label],
        Variant::Aruco => &[Printer, Tape, Fontname, Size, Align, Dictionary, Id, Lines],
    }
}
