/// Extract the token from an `Authorization` header value.
///
/// The value must split on a single space into exactly two parts, the
/// second of which is returned. The scheme word itself is not checked.
/// Any other shape yields an empty string, which never verifies.
pub fn bearer_token(header_value: &str) -> &str {
    let mut parts = header_value.split(' ');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(token), None) => token,
        _ => "",
    }
}
