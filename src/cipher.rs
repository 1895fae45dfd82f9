//! Byte-wise XOR transform used to obfuscate payloads in flight.
//!
//! The transform is self-inverse: applying it twice with the same key
//! restores the original bytes, so the sender and receiver call the same
//! routine. It must be applied exactly once on each side.

/// XOR every byte of the buffer with the key, in place.
pub fn encrypt_in_place(buffer: &mut [u8], key: u8) {
    for byte in buffer.iter_mut() {
        *byte ^= key;
    }
}

/// Reverse the transform. XOR is symmetric, so this is the same operation.
pub fn decrypt_in_place(buffer: &mut [u8], key: u8) {
    encrypt_in_place(buffer, key);
}
