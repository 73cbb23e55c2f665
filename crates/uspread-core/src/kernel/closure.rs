//! Kernel backed by an arbitrary function.

use std::fmt;

use super::trait_::SeparableKernel;

/// Wraps a closure `f(offset)` together with a declared support radius.
///
/// Values outside `[-support, support]` are forced to zero by the engine.
pub struct FnKernel<F> {
    func: F,
    support: f64,
    name: &'static str,
}

impl<F> FnKernel<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    /// Create a kernel from a function and its support radius.
    pub fn new(func: F, support: f64) -> Self {
        Self {
            func,
            support,
            name: "FnKernel",
        }
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl<F> fmt::Debug for FnKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.name)
            .field("support", &self.support)
            .finish()
    }
}

impl<F> SeparableKernel for FnKernel<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, offset: f64) -> f64 {
        (self.func)(offset)
    }

    fn support(&self) -> f64 {
        self.support
    }
}
