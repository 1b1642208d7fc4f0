//! Notification payload decoding.
//!
//! Each store record carries its content as an Apple property list (binary
//! plist on every recent macOS). The fields the forwarder cares about sit in
//! a small, stable subset of the payload:
//!
//! - `app`: source bundle identifier (e.g. `com.apple.Messages`)
//! - `date`: delivery timestamp, seconds in the store epoch
//! - `req.titl` / `req.subt` / `req.body`: the three content lines
//!
//! Everything else in the payload is ignored. All fields are optional; real
//! payloads routinely omit subtitle, body or even the title.

use serde::Deserialize;

use crate::Result;

/// Structured content extracted from a record payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecodedPayload {
    /// Source bundle identifier.
    #[serde(default)]
    pub app: Option<String>,
    /// Timestamp in the store epoch, as recorded inside the payload.
    #[serde(default)]
    pub date: Option<f64>,
    /// Notification request content.
    #[serde(default)]
    pub req: RequestContent,
}

/// The `req` dictionary of a notification payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContent {
    /// Title line.
    #[serde(default)]
    pub titl: Option<String>,
    /// Subtitle line.
    #[serde(default)]
    pub subt: Option<String>,
    /// Body line.
    #[serde(default)]
    pub body: Option<String>,
}

/// Decodes raw record payloads into structured content.
///
/// A trait so the poll pipeline can be exercised with synthetic payloads.
pub trait PayloadDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<DecodedPayload>;
}

/// Production decoder backed by the `plist` crate.
///
/// Accepts both binary and XML property lists; malformed input surfaces as
/// `Error::PayloadDecode`, which the poll loop treats as skip-this-record.
#[derive(Debug, Clone, Default)]
pub struct PlistDecoder;

impl PayloadDecoder for PlistDecoder {
    fn decode(&self, data: &[u8]) -> Result<DecodedPayload> {
        Ok(plist::from_bytes(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML_PAYLOAD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>app</key>
    <string>com.apple.Messages</string>
    <key>date</key>
    <real>639000000.5</real>
    <key>req</key>
    <dict>
        <key>titl</key>
        <string>Alice</string>
        <key>subt</key>
        <string>Re: lunch</string>
        <key>body</key>
        <string>See you at noon</string>
    </dict>
</dict>
</plist>"#;

    #[test]
    fn test_decode_xml_payload() {
        let decoded = PlistDecoder.decode(XML_PAYLOAD.as_bytes()).unwrap();
        assert_eq!(decoded.app.as_deref(), Some("com.apple.Messages"));
        assert_eq!(decoded.date, Some(639000000.5));
        assert_eq!(decoded.req.titl.as_deref(), Some("Alice"));
        assert_eq!(decoded.req.subt.as_deref(), Some("Re: lunch"));
        assert_eq!(decoded.req.body.as_deref(), Some("See you at noon"));
    }

    #[test]
    fn test_decode_binary_payload() {
        let mut req = plist::Dictionary::new();
        req.insert("titl".to_string(), plist::Value::String("Ping".to_string()));
        let mut root = plist::Dictionary::new();
        root.insert(
            "app".to_string(),
            plist::Value::String("com.example.app".to_string()),
        );
        root.insert("date".to_string(), plist::Value::Real(1000.0));
        root.insert("req".to_string(), plist::Value::Dictionary(req));

        let mut buf = std::io::Cursor::new(Vec::new());
        plist::Value::Dictionary(root)
            .to_writer_binary(&mut buf)
            .unwrap();

        let decoded = PlistDecoder.decode(&buf.into_inner()).unwrap();
        assert_eq!(decoded.app.as_deref(), Some("com.example.app"));
        assert_eq!(decoded.req.titl.as_deref(), Some("Ping"));
        assert!(decoded.req.subt.is_none());
    }

    #[test]
    fn test_decode_ignores_unknown_keys() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
    <key>app</key>
    <string>com.example.app</string>
    <key>uuid</key>
    <string>not-a-field-we-read</string>
    <key>req</key>
    <dict>
        <key>body</key>
        <string>hello</string>
        <key>iden</key>
        <string>ignored</string>
    </dict>
</dict>
</plist>"#;
        let decoded = PlistDecoder.decode(xml.as_bytes()).unwrap();
        assert_eq!(decoded.app.as_deref(), Some("com.example.app"));
        assert_eq!(decoded.req.body.as_deref(), Some("hello"));
        assert!(decoded.req.titl.is_none());
    }

    #[test]
    fn test_decode_malformed_payload() {
        let result = PlistDecoder.decode(b"definitely not a plist");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_empty_payload() {
        let result = PlistDecoder.decode(b"");
        assert!(result.is_err());
    }
}
