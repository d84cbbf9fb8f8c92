use super::variant::{Field, Variant};

/// Size choices offered by the label renderer.
pub const SIZES: [&str; 3] = ["small", "medium", "large"];

/// Horizontal alignment choices for text blocks.
pub const ALIGNMENTS: [&str; 3] = ["left", "center", "right"];

/// Raw values of every bound input, exactly as the operator entered them.
///
/// Values of hidden groups are kept across variant switches; they are inert
/// until their group is visible again.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldValues {
    pub printer: String,
    pub tape: String,
    pub fontname: String,
    pub size: String,
    /// Radio group: `None` when nothing is selected
    pub align: Option<String>,
    /// Multi-line text, newline separated
    pub lines: String,
    pub label: String,
    pub qrtext: String,
    /// Length in inches, still as typed
    pub length: String,
    pub id: String,
    pub dictionary: String,
}

impl FieldValues {
    /// Current text of a field. An unselected `align` reads as empty.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Printer => &self.printer,
            Field::Tape => &self.tape,
            Field::Fontname => &self.fontname,
            Field::Size => &self.size,
            Field::Align => self.align.as_deref().unwrap_or(""),
            Field::Lines => &self.lines,
            Field::Label => &self.label,
            Field::Qrtext => &self.qrtext,
            Field::Length => &self.length,
            Field::Id => &self.id,
            Field::Dictionary => &self.dictionary,
        }
    }

    /// Overwrite a field. Setting `align` to an empty string clears the selection.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Printer => self.printer = value,
            Field::Tape => self.tape = value,
            Field::Fontname => self.fontname = value,
            Field::Size => self.size = value,
            Field::Align => self.align = (!value.is_empty()).then_some(value),
            Field::Lines => self.lines = value,
            Field::Label => self.label = value,
            Field::Qrtext => self.qrtext = value,
            Field::Length => self.length = value,
            Field::Id => self.id = value,
            Field::Dictionary => self.dictionary = value,
        }
    }
}

/// Live session state: the active variant plus every bound input.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelConfiguration {
    pub active_variant: Variant,
    pub values: FieldValues,
}

impl Default for LabelConfiguration {
    fn default() -> Self {
        Self {
            active_variant: Variant::Text,
            values: FieldValues {
                size: "large".to_string(),
                align: Some("left".to_string()),
                length: "1".to_string(),
                id: "0".to_string(),
                ..FieldValues::default()
            },
        }
    }
}

impl LabelConfiguration {
    pub fn with_variant(variant: Variant) -> Self {
        Self {
            active_variant: variant,
            ..Self::default()
        }
    }

    /// Turn this configuration into a WPA network card: a qr label whose
    /// code joins the network, captioned with the credentials.
    pub fn apply_wifi(&mut self, ssid: &str, password: &str) {
        self.active_variant = Variant::Qr;
        self.values.qrtext = format!("WIFI:T:WPA;S:{};P:{};;", ssid, password);
        self.values.lines = format!("SSID: {}\nPASS: {}", ssid, password);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_starts_on_text() {
        let config = LabelConfiguration::default();
        assert_eq!(config.active_variant, Variant::Text);
        assert_eq!(config.values.size, "large");
        assert_eq!(config.values.align.as_deref(), Some("left"));
    }

    #[test]
    fn test_defaults_are_offered_choices() {
        let values = LabelConfiguration::default().values;
        assert!(SIZES.contains(&values.size.as_str()));
        assert!(ALIGNMENTS.contains(&values.get(Field::Align)));
    }

    #[test]
    fn test_set_and_get_every_field() {
        let mut values = FieldValues::default();
        for field in Field::ALL {
            values.set(field, format!("v-{}", field));
            assert_eq!(values.get(field), format!("v-{}", field));
        }
    }

    #[test]
    fn test_empty_align_clears_selection() {
        let mut values = FieldValues::default();
        values.set(Field::Align, "center");
        assert_eq!(values.align.as_deref(), Some("center"));

        values.set(Field::Align, "");
        assert_eq!(values.align, None);
        assert_eq!(values.get(Field::Align), "");
    }

    #[test]
    fn test_wifi_card() {
        let mut config = LabelConfiguration::default();
        config.values.printer = "P1".to_string();

        config.apply_wifi("home", "hunter2");

        assert_eq!(config.active_variant, Variant::Qr);
        assert_eq!(config.values.qrtext, "WIFI:T:WPA;S:home;P:hunter2;;");
        assert_eq!(config.values.lines, "SSID: home\nPASS: hunter2");
        assert_eq!(config.values.printer, "P1");
    }
}
