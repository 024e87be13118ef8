pub fn null_terminated_prefix(bytes: &[u8]) -> &[u8] {
    bytes.split(|&b| b == 0).next().unwrap_or_default()
}

/// Decodes a NUL-terminated string, replacing invalid utf8 instead of failing.
pub fn lossy_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(null_terminated_prefix(bytes)).into_owned()
}
