pub(crate) mod v1_0 {
    /// The binary version marker that begins every Ion 1.0 binary datagram.
    pub const IVM: [u8; 4] = [0xE0, 0x01, 0x00, 0xEA];

    /// The nibble in a tag byte's low position indicating that the value is a typed null.
    pub const LENGTH_CODE_NULL: u8 = 0x0F;

    /// The nibble in a tag byte's low position indicating that a VarUInt length follows.
    pub const LENGTH_CODE_VAR_UINT: u8 = 0x0E;

    /// The largest length that can be stored directly in a tag byte's low nibble.
    pub const MAX_INLINE_LENGTH: usize = 13;

    /// A VarInt negative zero in a single byte. Used by the timestamp encoding as the
    /// sentinel for an unknown local offset.
    pub const VAR_INT_NEGATIVE_ZERO: u8 = 0xC0;
}
