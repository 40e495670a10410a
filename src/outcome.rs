/// Result of a best-effort capability (transcoder, transcriber, rate source).
///
/// A `Degraded` outcome carries the reason the capability could not deliver;
/// callers substitute a default and keep serving the request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Ok(T),
    Degraded(String),
}

impl<T> Outcome<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded(_))
    }
}
