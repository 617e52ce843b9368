//! Runner seam
//!
//! The scheduler knows nothing about simulations. It hands each job's input to
//! a [`Runner`] and records whatever comes back.

use std::fmt;
use std::marker::PhantomData;

/// Synchronous unit of work executed once per submitted job
///
/// `run` may block for as long as it needs; the scheduler calls it from the
/// blocking thread pool, never from an async worker thread. It is invoked at
/// most once per job and may be called concurrently for different jobs.
pub trait Runner: Send + Sync + 'static {
    /// Job input, moved into the execution task on submit
    type Input: Send + 'static;

    /// Successful result, stored in the job record and cloned out on poll
    type Output: Clone + Send + Sync + 'static;

    /// Executes one job
    fn run(&self, input: Self::Input) -> anyhow::Result<Self::Output>;
}

/// Runner backed by a closure
///
/// Handy for tests and for callers whose work is a single function.
pub struct FnRunner<I, O, F> {
    func: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F> FnRunner<I, O, F>
where
    F: Fn(I) -> anyhow::Result<O>,
{
    /// Wraps `func` as a runner
    pub fn new(func: F) -> Self {
        Self {
            func,
            _types: PhantomData,
        }
    }
}

impl<I, O, F> Runner for FnRunner<I, O, F>
where
    I: Send + 'static,
    O: Clone + Send + Sync + 'static,
    F: Fn(I) -> anyhow::Result<O> + Send + Sync + 'static,
{
    type Input = I;
    type Output = O;

    fn run(&self, input: I) -> anyhow::Result<O> {
        (self.func)(input)
    }
}

impl<I, O, F> fmt::Debug for FnRunner<I, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRunner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_runner_forwards_input() {
        let runner = FnRunner::new(|x: u32| Ok(x * 2));
        assert_eq!(runner.run(21).unwrap(), 42);
    }

    #[test]
    fn test_fn_runner_forwards_error() {
        let runner = FnRunner::new(|_: ()| -> anyhow::Result<()> { anyhow::bail!("no ledger") });
        let err = runner.run(()).unwrap_err();
        assert_eq!(err.to_string(), "no ledger");
    }
}
