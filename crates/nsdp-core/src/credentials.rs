// ── Credential lookup ──
//
// Passwords are per switch, keyed by hardware address. Loading them (file,
// environment, keyring) is the host's job; the engine only looks them up.

use std::collections::HashMap;

use nsdp_api::MacAddress;
use secrecy::SecretString;

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    passwords: HashMap<MacAddress, SecretString>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mac: MacAddress, password: SecretString) {
        self.passwords.insert(mac, password);
    }

    pub fn with(mut self, mac: MacAddress, password: impl Into<String>) -> Self {
        self.insert(mac, SecretString::from(password.into()));
        self
    }

    pub fn password_for(&self, mac: MacAddress) -> Option<&SecretString> {
        self.passwords.get(&mac)
    }

    pub fn len(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }
}

impl FromIterator<(MacAddress, SecretString)> for Credentials {
    fn from_iter<I: IntoIterator<Item = (MacAddress, SecretString)>>(iter: I) -> Self {
        Self {
            passwords: iter.into_iter().collect(),
        }
    }
}
