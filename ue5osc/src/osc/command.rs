//! Outbound commands and datagram decoding.

use rosc::{OscError, OscMessage, OscPacket, OscType};

use crate::error::Error;

/// Placeholder argument for commands that carry no value.
///
/// The engine plugin ignores messages without arguments, so every command
/// carries at least this.
pub const DUMMY_ARG: OscType = OscType::Float(0.0);

/// One outbound message: an address and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    address: String,
    args: Vec<OscType>,
}

impl Command {
    /// Builds a command, padding an empty argument list with [`DUMMY_ARG`].
    #[must_use]
    pub fn new(address: impl Into<String>, args: Vec<OscType>) -> Self {
        let args = if args.is_empty() { vec![DUMMY_ARG] } else { args };
        Self {
            address: address.into(),
            args,
        }
    }

    /// A command whose only argument is [`DUMMY_ARG`].
    #[must_use]
    pub fn bare(address: impl Into<String>) -> Self {
        Self::new(address, Vec::new())
    }

    /// A command with a single float argument.
    #[must_use]
    pub fn float(address: impl Into<String>, value: f32) -> Self {
        Self::new(address, vec![OscType::Float(value)])
    }

    /// A command with several float arguments, in order.
    #[must_use]
    pub fn floats(address: impl Into<String>, values: &[f32]) -> Self {
        Self::new(address, values.iter().copied().map(OscType::Float).collect())
    }

    /// A command with a single string argument.
    #[must_use]
    pub fn string(address: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(address, vec![OscType::String(value.into())])
    }

    /// A command with a single 32-bit integer argument.
    #[must_use]
    pub fn int(address: impl Into<String>, value: i32) -> Self {
        Self::new(address, vec![OscType::Int(value)])
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn args(&self) -> &[OscType] {
        &self.args
    }

    /// Encodes the command as a single OSC message datagram.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if rosc rejects the address or arguments.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let packet = OscPacket::Message(OscMessage {
            addr: self.address.clone(),
            args: self.args.clone(),
        });
        rosc::encoder::encode(&packet).map_err(|e| Error::Encode(format!("{e:?}")))
    }
}

/// Decodes a datagram into its messages, flattening nested bundles in order.
///
/// # Errors
///
/// Returns the rosc error if the datagram is not a valid OSC packet.
pub fn decode_datagram(datagram: &[u8]) -> Result<Vec<OscMessage>, OscError> {
    let (_, packet) = rosc::decoder::decode_udp(datagram)?;
    let mut messages = Vec::new();
    flatten(packet, &mut messages);
    Ok(messages)
}

fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten(inner, out);
            }
        }
    }
}
