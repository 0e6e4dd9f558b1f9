//! Operator commands accepted on the serial console.
//!
//! ```text
//! WIFISET <ssid> [password]
//! BROKERSET ip=<a.b.c.d> domain=<host> user=<name> pass=<secret>
//! SUBMIT
//! RECONFIG
//! ```

use crate::credentials::{BrokerForm, FormParseError, WifiCredentials};

pub const CONSOLE_LINE_MAX: usize = 192;

pub enum LineReadEvent<'a> {
    None,
    Complete(&'a [u8]),
    /// Reported once per over-long line; the rest of it is discarded.
    Overflow,
}

/// Assembles console bytes into CR/LF terminated lines.
pub struct LineReader {
    line_buf: [u8; CONSOLE_LINE_MAX],
    line_len: usize,
    overflowed: bool,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            line_buf: [0; CONSOLE_LINE_MAX],
            line_len: 0,
            overflowed: false,
        }
    }

    pub fn push_byte(&mut self, byte: u8) -> LineReadEvent<'_> {
        if byte == b'\r' || byte == b'\n' {
            if self.overflowed {
                self.overflowed = false;
                return LineReadEvent::None;
            }
            if self.line_len == 0 {
                return LineReadEvent::None;
            }
            let complete_len = self.line_len;
            self.line_len = 0;
            return LineReadEvent::Complete(&self.line_buf[..complete_len]);
        }

        if self.overflowed {
            return LineReadEvent::None;
        }

        if self.line_len < self.line_buf.len() {
            self.line_buf[self.line_len] = byte;
            self.line_len += 1;
            return LineReadEvent::None;
        }

        self.line_len = 0;
        self.overflowed = true;
        LineReadEvent::Overflow
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConsoleCommand {
    WifiSet(WifiCredentials),
    /// Broker fields only; the form's network fields are untouched.
    BrokerSet(BrokerForm),
    Submit,
    Reconfig,
}

impl ConsoleCommand {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WifiSet(_) => "WIFISET",
            Self::BrokerSet(_) => "BROKERSET",
            Self::Submit => "SUBMIT",
            Self::Reconfig => "RECONFIG",
        }
    }
}

/// `None` for lines that are not console commands at all.
pub fn parse_console_command(line: &[u8]) -> Option<Result<ConsoleCommand, FormParseError>> {
    let line = trim_ascii_whitespace(line);
    let (verb, rest) = split_token(line);
    match verb {
        b"WIFISET" => Some(parse_wifiset(rest)),
        b"BROKERSET" => Some(parse_brokerset(rest)),
        b"SUBMIT" if rest.is_empty() => Some(Ok(ConsoleCommand::Submit)),
        b"RECONFIG" if rest.is_empty() => Some(Ok(ConsoleCommand::Reconfig)),
        _ => None,
    }
}

fn parse_wifiset(args: &[u8]) -> Result<ConsoleCommand, FormParseError> {
    let (ssid, rest) = split_token(args);
    let (password, rest) = split_token(rest);
    if !rest.is_empty() {
        return Err(FormParseError::Malformed);
    }
    let ssid = core::str::from_utf8(ssid).map_err(|_| FormParseError::Malformed)?;
    let password = core::str::from_utf8(password).map_err(|_| FormParseError::Malformed)?;
    WifiCredentials::new(ssid, password).map(ConsoleCommand::WifiSet)
}

fn parse_brokerset(args: &[u8]) -> Result<ConsoleCommand, FormParseError> {
    let mut form = BrokerForm::new();
    let mut rest = args;
    while !rest.is_empty() {
        let (token, next) = split_token(rest);
        rest = next;
        let eq = token
            .iter()
            .position(|b| *b == b'=')
            .ok_or(FormParseError::Malformed)?;
        let value =
            core::str::from_utf8(&token[eq + 1..]).map_err(|_| FormParseError::Malformed)?;
        match &token[..eq] {
            b"ip" => form.set_ip(value)?,
            b"domain" => form.set_domain(value)?,
            b"user" => form.set_username(value),
            b"pass" => form.set_password(value),
            _ => return Err(FormParseError::UnknownField),
        }
    }
    Ok(ConsoleCommand::BrokerSet(form))
}

fn split_token(bytes: &[u8]) -> (&[u8], &[u8]) {
    let end = bytes
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    (&bytes[..end], trim_ascii_whitespace(&bytes[end..]))
}

fn trim_ascii_whitespace(line: &[u8]) -> &[u8] {
    let mut start = 0usize;
    let mut end = line.len();
    while start < end && line[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && line[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    &line[start..end]
}
