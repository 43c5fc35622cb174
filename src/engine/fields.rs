/// Comma-separated, trimmed tokens of one raw group. Empty tokens are kept
/// so positions stay aligned with the other groups.
pub type FieldGroup = Vec<String>;

pub fn split_fields(raw: &str) -> FieldGroup {
    raw.split(',').map(|token| token.trim().to_string()).collect()
}
