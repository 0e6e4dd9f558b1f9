use core::fmt::{self, Write};

use heapless::String;

use crate::config::PAYLOAD_MAX;

pub type PayloadBuf = String<PAYLOAD_MAX>;

/// `{"id":..,"connected":..}` on the connected topic; the `false` form is the
/// session's last will.
pub fn connection_status(client_id: &str, connected: bool) -> Result<PayloadBuf, fmt::Error> {
    let mut out = PayloadBuf::new();
    out.write_str("{\"id\":")?;
    write_json_str(&mut out, client_id)?;
    write!(out, ",\"connected\":{}}}", connected)?;
    Ok(out)
}

pub fn scan_record(
    checkpoint_id: &str,
    card_id: &str,
    scan_time: u32,
) -> Result<PayloadBuf, fmt::Error> {
    let mut out = PayloadBuf::new();
    out.write_str("{\"checkpoint-id\":")?;
    write_json_str(&mut out, checkpoint_id)?;
    out.write_str(",\"sentry-id\":")?;
    write_json_str(&mut out, card_id)?;
    write!(out, ",\"scan-time\":{}}}", scan_time)?;
    Ok(out)
}

fn write_json_str<W: Write>(out: &mut W, value: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in value.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_payloads() {
        assert_eq!(
            connection_status("checkpoint-A", true).unwrap().as_str(),
            r#"{"id":"checkpoint-A","connected":true}"#
        );
        assert_eq!(
            connection_status("checkpoint-A", false).unwrap().as_str(),
            r#"{"id":"checkpoint-A","connected":false}"#
        );
    }

    #[test]
    fn scan_record_keys() {
        assert_eq!(
            scan_record("A", "0a ff 03", 1_700_000_046).unwrap().as_str(),
            r#"{"checkpoint-id":"A","sentry-id":"0a ff 03","scan-time":1700000046}"#
        );
    }

    #[test]
    fn identifiers_are_escaped() {
        let out = connection_status("gate\"1", true).unwrap();
        assert_eq!(out.as_str(), r#"{"id":"gate\"1","connected":true}"#);
    }
}
