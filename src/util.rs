//! Small utility helpers used across modules.

/// Log-safe truncation for user-typed strings.
/// Avoids echoing huge payloads back into logs and error messages.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}
