//! Name lookups where "not found" is an answer rather than a failure.

use fastedge_api::Result;

/// Outcome of looking a resource up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    /// Turn a "not found" failure into [`Lookup::NotFound`].
    ///
    /// Every other error is passed through.
    pub fn from_result(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Lookup::Found(value)),
            Err(e) if e.is_not_found() => {
                log::debug!("{}", e);
                Ok(Lookup::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}
