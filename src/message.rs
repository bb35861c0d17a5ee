use crate::encode::{write_display_escaped, write_escaped, Encode, EncodeError, ObjectWriter};
use crate::record::{LogEvent, RenderedValue};

/// Webhook message: an event plus the routing metadata captured when it was
/// fired.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub channel: String,
    pub username: String,
    pub hostname: String,
    pub event: LogEvent,
}

impl Message {
    pub fn new(
        channel: impl Into<String>,
        username: impl Into<String>,
        hostname: impl Into<String>,
        event: LogEvent,
    ) -> Self {
        Message {
            channel: channel.into(),
            username: username.into(),
            hostname: hostname.into(),
            event,
        }
    }

    /// Username shown in the channel, the hostname when none is configured.
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.hostname
        } else {
            &self.username
        }
    }

    /// `<icon> key=value ... msg=<message>` with keys ascending and values
    /// escaped once.
    fn write_text(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        buf.push(b'"');
        buf.extend_from_slice(self.event.level.icon().as_bytes());

        for (key, value) in &self.event.fields {
            buf.push(b' ');
            buf.extend_from_slice(key.as_bytes());
            buf.push(b'=');
            write_display_escaped(buf, &RenderedValue(value))?;
        }

        if !self.event.message.is_empty() {
            buf.extend_from_slice(b" msg=");
            write_escaped(buf, self.event.message.as_bytes());
        }

        buf.push(b'"');
        Ok(())
    }
}

impl Encode for Message {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
        let mut obj = ObjectWriter::new(buf);
        obj.string("channel", &self.channel);
        obj.string("username", self.display_name());

        match &self.event.attachment {
            Some(attc) => obj.raw("attachments", |buf| {
                buf.push(b'[');
                attc.encode(buf)?;
                buf.push(b']');
                Ok(())
            })?,
            None => obj.raw("text", |buf| self.write_text(buf))?,
        }

        obj.finish();
        Ok(())
    }
}
