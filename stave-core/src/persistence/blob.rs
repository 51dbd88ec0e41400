use stave_types::SerializedTree;

use crate::error::VcsResult;

/// Serialize a delta payload to a MessagePack blob.
pub fn encode_payload(payload: &SerializedTree) -> VcsResult<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(payload)?)
}

/// Deserialize a delta payload from a MessagePack blob.
pub fn decode_payload(bytes: &[u8]) -> VcsResult<SerializedTree> {
    Ok(rmp_serde::from_slice(bytes)?)
}
