//! Ordered multi-document writes with compensation.
//!
//! The document store has no cross-document transactions. A [`Saga`] runs
//! its [`Step`]s strictly one after another. When a step fails, the steps
//! that already completed are compensated in reverse order, and the failure
//! comes back as [`ControlError::SagaFailed`] naming what was rolled back and
//! what was left applied.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{ControlError, Result};

type Action<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<()>> + Send + 'a>;

/// One write of a saga, with an optional undo.
pub struct Step<'a> {
    name: &'static str,
    forward: Action<'a>,
    compensation: Option<Action<'a>>,
}

impl<'a> Step<'a> {
    /// A step with no compensation.
    pub fn new<F, Fut>(name: &'static str, forward: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<()>> + Send + 'a,
    {
        Self {
            name,
            forward: Box::new(move || forward().boxed()),
            compensation: None,
        }
    }

    /// Attach the action that undoes this step.
    #[must_use]
    pub fn compensate_with<F, Fut>(mut self, compensation: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<()>> + Send + 'a,
    {
        self.compensation = Some(Box::new(move || compensation().boxed()));
        self
    }

    /// The step's name, used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// A named sequence of steps.
pub struct Saga<'a> {
    name: &'static str,
    steps: Vec<Step<'a>>,
}

impl<'a> Saga<'a> {
    /// An empty saga.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    #[must_use]
    pub fn step(mut self, step: Step<'a>) -> Self {
        self.steps.push(step);
        self
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// Returns `ControlError::SagaFailed` if a step fails. Compensations of
    /// the completed steps have run by then.
    pub async fn run(self) -> Result<()> {
        let saga = self.name;
        let mut completed: Vec<(&'static str, Option<Action<'a>>)> = Vec::new();

        for step in self.steps {
            tracing::debug!(saga, step = step.name, "Running saga step");

            if let Err(source) = (step.forward)().await {
                tracing::error!(saga, step = step.name, error = %source, "Saga step failed");
                let (rolled_back, unrepaired) = compensate(saga, completed).await;
                return Err(ControlError::SagaFailed {
                    saga,
                    step: step.name,
                    source: Box::new(source),
                    rolled_back,
                    unrepaired,
                });
            }

            completed.push((step.name, step.compensation));
        }

        Ok(())
    }
}

/// Undo completed steps, most recent first.
async fn compensate<'a>(
    saga: &'static str,
    completed: Vec<(&'static str, Option<Action<'a>>)>,
) -> (Vec<&'static str>, Vec<&'static str>) {
    let mut rolled_back = Vec::new();
    let mut unrepaired = Vec::new();

    for (name, compensation) in completed.into_iter().rev() {
        let Some(compensation) = compensation else {
            tracing::warn!(saga, step = name, "No compensation for completed step");
            unrepaired.push(name);
            continue;
        };

        match compensation().await {
            Ok(()) => {
                tracing::info!(saga, step = name, "Compensated saga step");
                rolled_back.push(name);
            }
            Err(e) => {
                tracing::error!(saga, step = name, error = %e, "Compensation failed");
                unrepaired.push(name);
            }
        }
    }

    (rolled_back, unrepaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn record<'a>(log: &'a Mutex<Vec<String>>, entry: &'static str) -> impl Future<Output = Result<()>> + Send + 'a {
        async move {
            log.lock().push(entry.to_string());
            Ok(())
        }
    }

    async fn fail() -> Result<()> {
        Err(ControlError::Internal("boom".to_string()))
    }

    #[tokio::test]
    async fn runs_steps_in_order() {
        let log = Mutex::new(Vec::new());

        Saga::new("test")
            .step(Step::new("a", || record(&log, "a")))
            .step(Step::new("b", || record(&log, "b")))
            .step(Step::new("c", || record(&log, "c")))
            .run()
            .await
            .unwrap();

        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn failure_compensates_in_reverse() {
        let log = Mutex::new(Vec::new());

        let err = Saga::new("test")
            .step(Step::new("a", || record(&log, "a")).compensate_with(|| record(&log, "undo a")))
            .step(Step::new("b", || record(&log, "b")).compensate_with(|| record(&log, "undo b")))
            .step(Step::new("c", fail).compensate_with(|| record(&log, "undo c")))
            .step(Step::new("d", || record(&log, "d")))
            .run()
            .await
            .unwrap_err();

        assert_eq!(*log.lock(), vec!["a", "b", "undo b", "undo a"]);
        match err {
            ControlError::SagaFailed {
                saga,
                step,
                rolled_back,
                unrepaired,
                ..
            } => {
                assert_eq!(saga, "test");
                assert_eq!(step, "c");
                assert_eq!(rolled_back, vec!["b", "a"]);
                assert!(unrepaired.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn reports_unrepaired_steps() {
        let log = Mutex::new(Vec::new());

        let err = Saga::new("test")
            .step(Step::new("a", || record(&log, "a")))
            .step(Step::new("b", || record(&log, "b")).compensate_with(fail))
            .step(Step::new("c", fail))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ControlError::SagaFailed { ref unrepaired, ref rolled_back, .. }
                if *unrepaired == vec!["b", "a"] && rolled_back.is_empty()
        ));
    }

    #[tokio::test]
    async fn first_step_failure_touches_nothing() {
        let log = Mutex::new(Vec::new());

        let result = Saga::new("test")
            .step(Step::new("a", fail).compensate_with(|| record(&log, "undo a")))
            .step(Step::new("b", || record(&log, "b")))
            .run()
            .await;

        assert!(matches!(result, Err(ControlError::SagaFailed { step: "a", .. })));
        assert!(log.lock().is_empty());
    }
}
