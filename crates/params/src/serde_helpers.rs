//! Serde and borsh helper modules for Bitcoin types carried in parameters.
use std::io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write};

use bitcoin::{Amount, ScriptBuf};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serializer};

/// Serialize/deserialize [`Amount`] as integer satoshis ([`u64`]).
pub mod serde_amount_sat {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Amount, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(v.to_sat())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Amount, D::Error> {
        let sats = <u64 as Deserialize>::deserialize(d)?;
        Ok(Amount::from_sat(sats))
    }
}

/// Borsh encoding of [`Amount`] as integer satoshis.
pub mod borsh_amount_sat {
    use super::*;

    pub fn serialize<W: Write>(v: &Amount, writer: &mut W) -> IoResult<()> {
        BorshSerialize::serialize(&v.to_sat(), writer)
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> IoResult<Amount> {
        Ok(Amount::from_sat(u64::deserialize_reader(reader)?))
    }
}

/// Borsh encoding of [`ScriptBuf`] as length-prefixed raw script bytes.
pub mod borsh_script_buf {
    use super::*;

    pub fn serialize<W: Write>(v: &ScriptBuf, writer: &mut W) -> IoResult<()> {
        BorshSerialize::serialize(v.as_bytes(), writer)
    }

    pub fn deserialize<R: Read>(reader: &mut R) -> IoResult<ScriptBuf> {
        let bytes = Vec::<u8>::deserialize_reader(reader)?;
        if bytes.is_empty() {
            return Err(IoError::new(ErrorKind::InvalidData, "empty script"));
        }
        Ok(ScriptBuf::from_bytes(bytes))
    }
}
