use heapless::String;

use crate::config::{
    BROKER_DOMAIN_MAX, BROKER_IP_MAX, BROKER_PASSWORD_MAX, BROKER_USERNAME_MAX, WIFI_PASSWORD_MAX,
    WIFI_SSID_MAX,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CredentialsError {
    /// Neither a usable IPv4 address nor a domain was supplied.
    NoBrokerHost,
}

impl CredentialsError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoBrokerHost => "no_broker_host",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormParseError {
    FieldTooLong,
    EmptySsid,
    UnknownField,
    Malformed,
}

impl FormParseError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FieldTooLong => "field_too_long",
            Self::EmptySsid => "empty_ssid",
            Self::UnknownField => "unknown_field",
            Self::Malformed => "malformed",
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WifiCredentials {
    ssid: String<WIFI_SSID_MAX>,
    password: String<WIFI_PASSWORD_MAX>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, FormParseError> {
        if ssid.is_empty() {
            return Err(FormParseError::EmptySsid);
        }
        Ok(Self {
            ssid: bounded(ssid)?,
            password: bounded(password)?,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Raw operator input collected while reconfiguring.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct BrokerForm {
    domain: String<BROKER_DOMAIN_MAX>,
    ip: String<BROKER_IP_MAX>,
    username: String<BROKER_USERNAME_MAX>,
    password: String<BROKER_PASSWORD_MAX>,
    wifi: Option<WifiCredentials>,
}

impl BrokerForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_domain(&mut self, domain: &str) -> Result<(), FormParseError> {
        self.domain = bounded(domain)?;
        Ok(())
    }

    pub fn set_ip(&mut self, ip: &str) -> Result<(), FormParseError> {
        self.ip = bounded(ip)?;
        Ok(())
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = truncated(username);
    }

    pub fn set_password(&mut self, password: &str) {
        self.password = truncated(password);
    }

    pub fn set_wifi(&mut self, wifi: Option<WifiCredentials>) {
        self.wifi = wifi;
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn wifi(&self) -> Option<&WifiCredentials> {
        self.wifi.as_ref()
    }

    pub fn take_wifi(&mut self) -> Option<WifiCredentials> {
        self.wifi.take()
    }

    /// Replaces the broker fields, keeping the network credentials.
    pub fn merge_broker(&mut self, broker: BrokerForm) {
        let wifi = self.wifi.take();
        *self = broker;
        self.wifi = wifi;
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BrokerHost {
    Ip([u8; 4]),
    Domain(String<BROKER_DOMAIN_MAX>),
}

impl BrokerHost {
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BrokerCredentials {
    host: BrokerHost,
    username: String<BROKER_USERNAME_MAX>,
    password: String<BROKER_PASSWORD_MAX>,
}

impl BrokerCredentials {
    /// A parseable address other than `0.0.0.0` wins over the domain; with
    /// neither the configuration is unusable.
    pub fn from_form(form: &BrokerForm) -> Result<Self, CredentialsError> {
        let host = match parse_ipv4(form.ip()) {
            Some(octets) if octets != [0, 0, 0, 0] => BrokerHost::Ip(octets),
            _ if !form.domain().is_empty() => BrokerHost::Domain(form.domain.clone()),
            _ => return Err(CredentialsError::NoBrokerHost),
        };
        Ok(Self {
            host,
            username: form.username.clone(),
            password: form.password.clone(),
        })
    }

    pub fn host(&self) -> &BrokerHost {
        &self.host
    }

    pub fn is_domain(&self) -> bool {
        self.host.is_domain()
    }

    /// `None` when empty, so the session connects anonymously.
    pub fn username(&self) -> Option<&str> {
        (!self.username.is_empty()).then_some(self.username.as_str())
    }

    pub fn password(&self) -> Option<&str> {
        (!self.password.is_empty()).then_some(self.password.as_str())
    }
}

pub fn parse_ipv4(text: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');
    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u16 = part.parse().ok()?;
        *octet = u8::try_from(value).ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

fn bounded<const N: usize>(value: &str) -> Result<String<N>, FormParseError> {
    let mut out = String::new();
    out.push_str(value).map_err(|_| FormParseError::FieldTooLong)?;
    Ok(out)
}

fn truncated<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    for ch in value.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
