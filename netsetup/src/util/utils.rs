//! Helpers for decoding ConnMan property maps and formatting gateway values.
//!
//! ConnMan hands every object's state over as an `a{sv}` dictionary. These
//! helpers pull typed values out of such maps, tolerating the extra variant
//! wrapping nested dictionaries carry.

use std::collections::HashMap;
use zvariant::{OwnedValue, Value};

use crate::Result;
use crate::api::models::ConnectionError;
use crate::types::constants::{property, tethering};

/// An `a{sv}` property map as returned by `GetProperties`.
pub(crate) type Properties = HashMap<String, OwnedValue>;

/// Strips any number of `Value::Value` wrappers.
fn inner<'a>(value: &'a Value<'a>) -> &'a Value<'a> {
    match value {
        Value::Value(v) => inner(v),
        v => v,
    }
}

fn value_str(value: &Value<'_>) -> Option<String> {
    match inner(value) {
        Value::Str(s) => Some(s.to_string()),
        Value::ObjectPath(p) => Some(p.to_string()),
        _ => None,
    }
}

pub(crate) fn prop_str(props: &Properties, key: &str) -> Option<String> {
    props.get(key).and_then(|v| value_str(v))
}

pub(crate) fn prop_bool(props: &Properties, key: &str) -> Option<bool> {
    match inner(props.get(key)?) {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

pub(crate) fn prop_u8(props: &Properties, key: &str) -> Option<u8> {
    match inner(props.get(key)?) {
        Value::U8(n) => Some(*n),
        Value::U16(n) => u8::try_from(*n).ok(),
        Value::I32(n) => u8::try_from(*n).ok(),
        Value::U32(n) => u8::try_from(*n).ok(),
        _ => None,
    }
}

pub(crate) fn prop_u16(props: &Properties, key: &str) -> Option<u16> {
    match inner(props.get(key)?) {
        Value::U8(n) => Some(u16::from(*n)),
        Value::U16(n) => Some(*n),
        Value::I32(n) => u16::try_from(*n).ok(),
        Value::U32(n) => u16::try_from(*n).ok(),
        _ => None,
    }
}

/// Reads an `as` property, returning an empty vector if absent.
pub(crate) fn prop_str_array(props: &Properties, key: &str) -> Vec<String> {
    match props.get(key).map(|v| inner(v)) {
        Some(Value::Array(items)) => items.iter().filter_map(value_str).collect(),
        _ => Vec::new(),
    }
}

/// Reads a nested `a{sv}` property such as the service `Ethernet` dictionary.
pub(crate) fn prop_dict(props: &Properties, key: &str) -> Option<Properties> {
    let value = props.get(key)?.try_clone().ok()?;
    Properties::try_from(value).ok()
}

/// Reads a `ay` property as raw bytes.
pub(crate) fn value_bytes(value: &Value<'_>) -> Option<Vec<u8>> {
    match inner(value) {
        Value::Array(items) => items
            .iter()
            .map(|v| match inner(v) {
                Value::U8(b) => Some(*b),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// Builds the tethering SSID `<prefix>_<address>` with colons replaced by
/// underscores, e.g. `knot_gw_AA_BB_CC_DD_EE_FF`.
pub(crate) fn tethering_identifier(prefix: &str, hw_address: &str) -> String {
    format!("{prefix}_{}", hw_address.replace(':', "_"))
}

/// Checks a WPA2 passphrase before it is sent to ConnMan.
///
/// Accepts 8 to 63 characters, or exactly 64 hex digits (a raw PSK). A
/// rejected value is reported the same way ConnMan's own refusal of the
/// `TetheringPassphrase` write would be.
pub(crate) fn validate_passphrase(passphrase: &str) -> Result<()> {
    let rejected = |reason: String| ConnectionError::PropertySetFailed {
        property: property::TETHERING_PASSPHRASE,
        reason,
    };

    let len = passphrase.chars().count();
    if len == tethering::RAW_KEY_LEN {
        if passphrase.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(());
        }
        return Err(rejected(
            "64 character passphrases must be hexadecimal".into(),
        ));
    }

    if !(tethering::PASSPHRASE_MIN_LEN..=tethering::PASSPHRASE_MAX_LEN).contains(&len) {
        return Err(rejected(format!(
            "passphrase must be {} to {} characters, got {len}",
            tethering::PASSPHRASE_MIN_LEN,
            tethering::PASSPHRASE_MAX_LEN
        )));
    }

    Ok(())
}

/// Formats key bytes as colon separated lowercase hex (`00:1f:a2`).
pub(crate) fn hex_colon(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Macro to convert Result to Option with error logging.
/// Usage: `try_log!(result, "context message")`
#[macro_export]
macro_rules! try_log {
    ($result:expr, $context:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{}: {:?}", $context, e);
                return None;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(value: Value<'static>) -> OwnedValue {
        value.try_into_owned().unwrap()
    }

    #[test]
    fn identifier_replaces_colons() {
        assert_eq!(
            tethering_identifier("knot_gw", "AA:BB:CC:DD:EE:FF"),
            "knot_gw_AA_BB_CC_DD_EE_FF"
        );
        assert_eq!(tethering_identifier("lab", "00:11"), "lab_00_11");
    }

    #[test]
    fn passphrase_bounds() {
        assert!(validate_passphrase("knotNetworkOfThings").is_ok());
        assert!(validate_passphrase("12345678").is_ok());
        assert!(validate_passphrase(&"a".repeat(63)).is_ok());
        assert!(validate_passphrase(&"ab".repeat(32)).is_ok());

        assert!(matches!(
            validate_passphrase("short"),
            Err(ConnectionError::PropertySetFailed { property: "TetheringPassphrase", ref reason })
                if reason.contains("got 5")
        ));
        assert!(matches!(
            validate_passphrase(&"z".repeat(64)),
            Err(ConnectionError::PropertySetFailed { property: "TetheringPassphrase", .. })
        ));
        assert!(validate_passphrase(&"a".repeat(65)).is_err());
    }

    #[test]
    fn hex_colon_formats_lowercase() {
        assert_eq!(hex_colon(&[0x00, 0x1F, 0xA2]), "00:1f:a2");
        assert_eq!(hex_colon(&[]), "");
    }

    #[test]
    fn reads_scalar_properties() {
        let mut props = Properties::new();
        props.insert("Name".into(), owned(Value::from("HomeNet")));
        props.insert("Powered".into(), owned(Value::from(true)));
        props.insert("Strength".into(), owned(Value::from(72u8)));
        props.insert("PANID".into(), owned(Value::from(0xface_u16)));

        assert_eq!(prop_str(&props, "Name").as_deref(), Some("HomeNet"));
        assert_eq!(prop_bool(&props, "Powered"), Some(true));
        assert_eq!(prop_u8(&props, "Strength"), Some(72));
        assert_eq!(prop_u16(&props, "PANID"), Some(0xface));
        assert_eq!(prop_str(&props, "Missing"), None);
        assert_eq!(prop_bool(&props, "Name"), None);
    }

    #[test]
    fn reads_string_arrays() {
        let mut props = Properties::new();
        props.insert(
            "Security".into(),
            owned(Value::from(vec!["psk".to_string(), "wps".to_string()])),
        );
        assert_eq!(prop_str_array(&props, "Security"), vec!["psk", "wps"]);
        assert!(prop_str_array(&props, "Nameservers").is_empty());
    }

    #[test]
    fn reads_nested_dictionary() {
        let mut ethernet: HashMap<String, Value<'static>> = HashMap::new();
        ethernet.insert("Address".into(), Value::from("AA:BB:CC:DD:EE:FF"));
        ethernet.insert("Interface".into(), Value::from("eth0"));

        let mut props = Properties::new();
        props.insert("Ethernet".into(), owned(Value::from(ethernet)));

        let dict = prop_dict(&props, "Ethernet").unwrap();
        assert_eq!(prop_str(&dict, "Address").as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert!(prop_dict(&props, "IPv4").is_none());
    }

    #[test]
    fn reads_byte_arrays() {
        let value = Value::from(vec![0xdeu8, 0xad]);
        assert_eq!(value_bytes(&value), Some(vec![0xde, 0xad]));
        assert_eq!(value_bytes(&Value::from("nope")), None);
    }
}
