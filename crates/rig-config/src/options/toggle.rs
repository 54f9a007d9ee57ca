//! The `false | { … }` shape shared by every optional feature group.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A feature group that is either disabled or carries its configuration.
///
/// Serialized form follows the conventional config shape: `false` (or
/// null) disables the group, a table enables it. Environment override
/// layers rely on this to switch a group off per-environment, since the
/// merge runs on raw JSON values before re-deserialization.
#[derive(Debug, Clone, PartialEq)]
pub enum Toggle<T> {
    Off,
    On(T),
}

// Not derived: the derive would demand `T: Default` although `Off`
// needs nothing from `T`.
impl<T> Default for Toggle<T> {
    fn default() -> Self {
        Toggle::Off
    }
}

impl<T> Toggle<T> {
    pub fn is_on(&self) -> bool {
        matches!(self, Toggle::On(_))
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Toggle::Off => None,
            Toggle::On(value) => Some(value),
        }
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        match self {
            Toggle::Off => None,
            Toggle::On(value) => Some(value),
        }
    }
}

impl<T> From<T> for Toggle<T> {
    fn from(value: T) -> Self {
        Toggle::On(value)
    }
}

impl<T: Serialize> Serialize for Toggle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Toggle::Off => serializer.serialize_bool(false),
            Toggle::On(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: serde::de::DeserializeOwned> Deserialize<'de> for Toggle<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null | Value::Bool(false) => Ok(Toggle::Off),
            Value::Bool(true) => Err(D::Error::custom(
                "expected `false` or a table, found `true`; spell the enabled form out",
            )),
            value => serde_json::from_value(value)
                .map(Toggle::On)
                .map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Group {
        #[serde(default)]
        flag: bool,
    }

    #[test]
    fn false_deserializes_to_off() {
        let toggle: Toggle<Group> = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(toggle, Toggle::Off);
    }

    #[test]
    fn table_deserializes_to_on() {
        let toggle: Toggle<Group> = serde_json::from_value(json!({ "flag": true })).unwrap();
        assert_eq!(toggle, Toggle::On(Group { flag: true }));
    }

    #[test]
    fn true_is_rejected() {
        let result: Result<Toggle<Group>, _> = serde_json::from_value(json!(true));
        assert!(result.is_err());
    }

    #[test]
    fn off_serializes_to_false() {
        let value = serde_json::to_value(Toggle::<Group>::Off).unwrap();
        assert_eq!(value, json!(false));
    }

    #[test]
    fn string_payloads_round_trip() {
        let toggle: Toggle<String> = serde_json::from_value(json!("cheap-module-source-map")).unwrap();
        assert_eq!(toggle, Toggle::On("cheap-module-source-map".to_string()));
        let value = serde_json::to_value(&toggle).unwrap();
        assert_eq!(value, json!("cheap-module-source-map"));
    }
}
