//! # Authentication
//!
//! OpenClinica authenticates SOAP callers with a WS-Security
//! `UsernameToken` whose password is the lowercase hex SHA-1 digest of the
//! account password (the same hash OpenClinica stores). The plaintext
//! password never leaves this module.

use std::fmt;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use sha1::{Digest, Sha1};

use crate::error::OcwsResult;
use crate::protocol::constants::Namespaces;
use crate::protocol::xml::write_text_element;

/// `Type` attribute value for a password sent as text.
pub const PASSWORD_TEXT_TYPE: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

/// Username plus password digest, immutable for the lifetime of a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password_hash: String,
}

impl Credentials {
    /// Build credentials from a plaintext password.
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_hash: password_digest(password),
        }
    }

    /// Build credentials from an already-computed SHA-1 hex digest.
    pub fn from_hash(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// The WS-Security token carrying these credentials.
    pub fn token(&self) -> UsernameToken<'_> {
        UsernameToken {
            username: &self.username,
            password: &self.password_hash,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Lowercase hex SHA-1 digest of the UTF-8 encoded password.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha1::digest(password.as_bytes()))
}

/// A `wsse:UsernameToken` ready to be written into a SOAP header.
#[derive(Debug, Clone, Copy)]
pub struct UsernameToken<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl UsernameToken<'_> {
    /// Write the complete `wsse:Security` header block.
    ///
    /// `envelope_prefix` is the prefix bound to the SOAP envelope namespace,
    /// used for the `mustUnderstand` attribute.
    pub fn write_security_header<W: Write>(
        &self,
        writer: &mut Writer<W>,
        envelope_prefix: &str,
    ) -> OcwsResult<()> {
        let must_understand = format!("{envelope_prefix}:mustUnderstand");
        let security = BytesStart::new("wsse:Security").with_attributes([
            ("xmlns:wsse", Namespaces::WSSE),
            (must_understand.as_str(), "1"),
        ]);
        writer.write_event(Event::Start(security))?;
        writer.write_event(Event::Start(BytesStart::new("wsse:UsernameToken")))?;

        write_text_element(writer, "wsse:Username", self.username)?;

        let password = BytesStart::new("wsse:Password").with_attributes([("Type", PASSWORD_TEXT_TYPE)]);
        writer.write_event(Event::Start(password))?;
        writer.write_event(Event::Text(BytesText::new(self.password)))?;
        writer.write_event(Event::End(BytesEnd::new("wsse:Password")))?;

        writer.write_event(Event::End(BytesEnd::new("wsse:UsernameToken")))?;
        writer.write_event(Event::End(BytesEnd::new("wsse:Security")))?;
        Ok(())
    }
}
