//! Replies to request/response commands and their typed views.

use rosc::{OscMessage, OscType};

use super::types::{Location, Rotation};
use crate::error::Error;

/// A message the engine sent back in answer to a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub address: String,
    pub args: Vec<OscType>,
}

impl Reply {
    #[must_use]
    pub fn new(address: impl Into<String>, args: Vec<OscType>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Reads the reply as exactly one string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedReply`] for any other shape.
    pub fn into_string(self) -> Result<String, Error> {
        match <[OscType; 1]>::try_from(self.args) {
            Ok([OscType::String(s)]) => Ok(s),
            Ok(args) => Err(Error::UnexpectedReply {
                address: self.address,
                args: args.into(),
            }),
            Err(args) => Err(Error::UnexpectedReply {
                address: self.address,
                args,
            }),
        }
    }

    /// Reads the reply as exactly three numbers.
    ///
    /// Ints, longs and doubles are converted to `f32`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedReply`] for any other shape.
    pub fn to_vector3(&self) -> Result<[f32; 3], Error> {
        let unexpected = || Error::UnexpectedReply {
            address: self.address.clone(),
            args: self.args.clone(),
        };
        let [a, b, c] = self.args.as_slice() else {
            return Err(unexpected());
        };
        match (as_f32(a), as_f32(b), as_f32(c)) {
            (Some(a), Some(b), Some(c)) => Ok([a, b, c]),
            _ => Err(unexpected()),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn as_f32(arg: &OscType) -> Option<f32> {
    match *arg {
        OscType::Float(v) => Some(v),
        OscType::Double(v) => Some(v as f32),
        OscType::Int(v) => Some(v as f32),
        OscType::Long(v) => Some(v as f32),
        _ => None,
    }
}

impl From<OscMessage> for Reply {
    fn from(msg: OscMessage) -> Self {
        Self {
            address: msg.addr,
            args: msg.args,
        }
    }
}

impl TryFrom<Reply> for Location {
    type Error = Error;

    fn try_from(reply: Reply) -> Result<Self, Self::Error> {
        let [x, y, z] = reply.to_vector3()?;
        Ok(Self { x, y, z })
    }
}

impl TryFrom<Reply> for Rotation {
    type Error = Error;

    fn try_from(reply: Reply) -> Result<Self, Self::Error> {
        reply.to_vector3().map(Self::from_reply_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(values: &[f32]) -> Vec<OscType> {
        values.iter().copied().map(OscType::Float).collect()
    }

    #[test]
    fn project_name() {
        let reply = Reply::new("/get/project", vec![OscType::String("Warehouse".into())]);
        assert_eq!(reply.into_string().unwrap(), "Warehouse");
    }

    #[test]
    fn project_name_rejects_numbers() {
        let reply = Reply::new("/get/project", floats(&[1.0]));
        assert!(matches!(
            reply.into_string(),
            Err(Error::UnexpectedReply { address, .. }) if address == "/get/project"
        ));
        let empty = Reply::new("/get/project", Vec::new());
        assert!(empty.into_string().is_err());
    }

    #[test]
    fn location_from_mixed_numbers() {
        let reply = Reply::new(
            "/get/location",
            vec![OscType::Float(1.5), OscType::Int(2), OscType::Double(-3.0)],
        );
        assert_eq!(
            Location::try_from(reply).unwrap(),
            Location::new(1.5, 2.0, -3.0)
        );
    }

    #[test]
    fn rotation_keeps_reply_order() {
        let reply = Reply::new("/get/rotation", floats(&[10.0, 20.0, 30.0]));
        let rot = Rotation::try_from(reply).unwrap();
        assert_eq!(rot.roll, 10.0);
        assert_eq!(rot.pitch, 20.0);
        assert_eq!(rot.yaw, 30.0);
    }

    #[test]
    fn vector_needs_three_numbers() {
        assert!(Reply::new("/x", floats(&[1.0, 2.0])).to_vector3().is_err());
        assert!(
            Reply::new("/x", floats(&[1.0, 2.0, 3.0, 4.0]))
                .to_vector3()
                .is_err()
        );
        let with_string = vec![
            OscType::Float(1.0),
            OscType::String("2".into()),
            OscType::Float(3.0),
        ];
        assert!(Reply::new("/x", with_string).to_vector3().is_err());
    }
}
