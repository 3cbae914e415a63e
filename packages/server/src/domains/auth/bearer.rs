/// Accept `Bearer <token>` (scheme case-insensitive) when the token matches.
///
/// The header must split into exactly two whitespace-separated parts.
pub fn check_bearer(header: Option<&str>, expected: &str) -> bool {
    let Some(header) = header else {
        return false;
    };

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) => {
            scheme.eq_ignore_ascii_case("bearer") && token == expected
        }
        _ => false,
    }
}
