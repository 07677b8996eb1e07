/// Compile a regular expression once and hand out a `&'static Regex`.
///
/// The pattern must be a literal; it is checked the first time the macro's
/// call site runs.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
