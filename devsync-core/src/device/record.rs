// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device records and their persisted form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const KEY_PUBLIC_KEY: &str = "public_key";
const KEY_DEVICE_NAME: &str = "device_name";
const KEY_BLUETOOTH_ADDRESS: &str = "bluetooth_address";

/// A device registered to the user, as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Unique identity of the device.
    pub public_key: String,
    /// Display name.
    pub friendly_device_name: String,
    /// May be empty.
    #[serde(default)]
    pub bluetooth_address: String,
    /// Whether the device can unlock this machine. Only these are persisted.
    #[serde(default)]
    pub unlock_key: bool,
    /// Whether this machine can unlock the device. Never persisted.
    #[serde(default)]
    pub unlockable: bool,
}

impl DeviceRecord {
    /// Creates an unlock key record.
    pub fn new_unlock_key(
        public_key: impl Into<String>,
        friendly_device_name: impl Into<String>,
        bluetooth_address: impl Into<String>,
    ) -> Self {
        DeviceRecord {
            public_key: public_key.into(),
            friendly_device_name: friendly_device_name.into(),
            bluetooth_address: bluetooth_address.into(),
            unlock_key: true,
            unlockable: false,
        }
    }

    /// Converts the record to the dictionary stored in prefs.
    ///
    /// Only identity fields are kept; the unlock flags are implied.
    pub fn to_pref_value(&self) -> Value {
        let mut dictionary = Map::new();
        dictionary.insert(KEY_PUBLIC_KEY.into(), Value::from(self.public_key.as_str()));
        dictionary.insert(
            KEY_DEVICE_NAME.into(),
            Value::from(self.friendly_device_name.as_str()),
        );
        dictionary.insert(
            KEY_BLUETOOTH_ADDRESS.into(),
            Value::from(self.bluetooth_address.as_str()),
        );
        Value::Object(dictionary)
    }

    /// Parses a dictionary stored in prefs.
    ///
    /// Returns None unless the value is an object holding all three string
    /// fields.
    pub fn from_pref_value(value: &Value) -> Option<Self> {
        let dictionary = value.as_object()?;

        Some(DeviceRecord::new_unlock_key(
            string_field(dictionary, KEY_PUBLIC_KEY)?,
            string_field(dictionary, KEY_DEVICE_NAME)?,
            string_field(dictionary, KEY_BLUETOOTH_ADDRESS)?,
        ))
    }
}

fn string_field<'a>(dictionary: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    dictionary.get(key).and_then(Value::as_str)
}

/// Builds the persisted list for a directory response: unlock keys only,
/// in response order.
pub fn unlock_keys_to_pref_values(devices: &[DeviceRecord]) -> Vec<Value> {
    devices
        .iter()
        .filter(|device| device.unlock_key)
        .map(DeviceRecord::to_pref_value)
        .collect()
}
