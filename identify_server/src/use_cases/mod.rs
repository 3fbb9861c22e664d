pub mod identify;
#[cfg(test)]
pub(crate) mod test_support;

pub use identify::{IdentifySettings, IdentifyUseCase, RetryPolicy};
