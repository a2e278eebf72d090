//! Interactive session: the current inputs and their latest projection
//!
//! Every mutation goes through the session, which recomputes the projection
//! straight away and notifies subscribers. A recomputation never touches the
//! previous result; it is replaced by a fresh one.

use crate::error::Result;
use crate::params::{Field, ParameterIssue, ParameterSet};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};

/// Inputs plus what was derived from them
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Incremented on every recomputation
    pub revision: u64,
    pub params: ParameterSet,
    /// `None` when strict validation rejected the inputs
    pub result: Option<ProjectionResult>,
    /// Problems with the inputs; in lenient mode these were clamped
    pub issues: Vec<ParameterIssue>,
}

/// Handle returned by [`FeasibilitySession::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SessionState) + Send>;

/// Holds the current parameter set and recomputes after each change
pub struct FeasibilitySession {
    engine: ProjectionEngine,
    /// Clamp invalid inputs instead of withholding the result
    lenient: bool,
    state: SessionState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl FeasibilitySession {
    pub fn new(params: ParameterSet, config: ProjectionConfig) -> Result<Self> {
        Self::start(params, config, false)
    }

    /// Session that clamps invalid inputs to their nearest valid values
    pub fn lenient(params: ParameterSet, config: ProjectionConfig) -> Result<Self> {
        Self::start(params, config, true)
    }

    fn start(params: ParameterSet, config: ProjectionConfig, lenient: bool) -> Result<Self> {
        config.validate()?;
        let mut session = Self {
            engine: ProjectionEngine::new(config),
            lenient,
            state: SessionState {
                revision: 0,
                params,
                result: None,
                issues: Vec::new(),
            },
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        session.recompute();
        Ok(session)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn params(&self) -> &ParameterSet {
        &self.state.params
    }

    pub fn result(&self) -> Option<&ProjectionResult> {
        self.state.result.as_ref()
    }

    pub fn issues(&self) -> &[ParameterIssue] {
        &self.state.issues
    }

    pub fn config(&self) -> &ProjectionConfig {
        self.engine.config()
    }

    /// Set one form field. A value the field cannot hold is rejected and
    /// nothing is recomputed.
    pub fn set_field(&mut self, field: Field, value: f64) -> Result<&SessionState> {
        self.state.params.set(field, value)?;
        self.recompute();
        Ok(&self.state)
    }

    /// Set a field by its key
    pub fn set_key(&mut self, key: &str, value: f64) -> Result<&SessionState> {
        let field: Field = key.parse()?;
        self.set_field(field, value)
    }

    /// Apply several edits as one change
    pub fn update<F>(&mut self, edit: F) -> &SessionState
    where
        F: FnOnce(&mut ParameterSet),
    {
        edit(&mut self.state.params);
        self.recompute();
        &self.state
    }

    pub fn replace_params(&mut self, params: ParameterSet) -> &SessionState {
        self.update(|current| *current = params)
    }

    pub fn set_config(&mut self, config: ProjectionConfig) -> Result<&SessionState> {
        config.validate()?;
        self.engine = ProjectionEngine::new(config);
        self.recompute();
        Ok(&self.state)
    }

    /// Call `callback` after every recomputation
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&SessionState) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if the subscription was not found
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn recompute(&mut self) {
        let params = &self.state.params;

        let (result, issues) = if self.lenient {
            match self.engine.project_clamped(params) {
                Ok((result, issues)) => (Some(result), issues),
                Err(e) => {
                    log::warn!("projection failed: {}", e);
                    (None, Vec::new())
                }
            }
        } else {
            let issues = params.issues();
            if issues.is_empty() {
                match self.engine.project(params) {
                    Ok(result) => (Some(result), issues),
                    Err(e) => {
                        log::warn!("projection failed: {}", e);
                        (None, issues)
                    }
                }
            } else {
                log::debug!("{} invalid input(s), result withheld", issues.len());
                (None, issues)
            }
        };

        self.state.result = result;
        self.state.issues = issues;
        self.state.revision += 1;

        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_recomputes_on_change() {
        let mut session = FeasibilitySession::new(ParameterSet::default(), ProjectionConfig::default()).unwrap();
        assert_eq!(session.state().revision, 1);
        let before = session.result().unwrap().summary.annual_revenue;

        session.set_field(Field::NightlyRate, 7_000.0).unwrap();
        assert_eq!(session.state().revision, 2);
        assert_eq!(session.result().unwrap().summary.annual_revenue, before * 2.0);

        session.update(|p| {
            p.villa_count = 20;
            p.nightly_rate = 3_500.0;
        });
        assert_eq!(session.result().unwrap().summary.annual_revenue, before * 2.0);
    }

    #[test]
    fn test_invalid_input_withholds_result() {
        let mut session = FeasibilitySession::new(ParameterSet::default(), ProjectionConfig::default()).unwrap();
        session.set_key("occupancy_rate_pct", 150.0).unwrap();
        assert!(session.result().is_none());
        assert_eq!(session.issues().len(), 1);
        assert_eq!(session.issues()[0].field, Field::OccupancyRatePct);

        session.set_key("occupancy_rate_pct", 50.0).unwrap();
        assert!(session.result().is_some());
        assert!(session.issues().is_empty());

        // Fractional villa count cannot be stored
        assert!(session.set_field(Field::VillaCount, 2.5).is_err());
        assert_eq!(session.state().revision, 3);
    }

    #[test]
    fn test_lenient_session_clamps() {
        let params = ParameterSet {
            occupancy_rate_pct: 150.0,
            ..Default::default()
        };
        let session = FeasibilitySession::lenient(params, ProjectionConfig::default()).unwrap();
        assert_eq!(session.state().revision, 1);
        assert_eq!(session.issues().len(), 1);
        let result = session.result().unwrap();
        assert_eq!(result.summary.annual_revenue, 10.0 * 3_500.0 * 365.0);
    }

    #[test]
    fn test_subscribers_notified() {
        let mut session = FeasibilitySession::new(ParameterSet::default(), ProjectionConfig::default()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let id = session.subscribe(move |state| sink.lock().unwrap().push(state.revision));

        session.set_field(Field::VillaCount, 12.0).unwrap();
        session.set_config(ProjectionConfig::with_horizon(20)).unwrap();
        assert_eq!(session.result().unwrap().yearly.len(), 21);

        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.set_field(Field::VillaCount, 14.0).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(FeasibilitySession::new(ParameterSet::default(), ProjectionConfig::with_horizon(0)).is_err());

        let mut session = FeasibilitySession::new(ParameterSet::default(), ProjectionConfig::default()).unwrap();
        assert!(session.set_config(ProjectionConfig::with_horizon(500)).is_err());
        assert_eq!(session.config().horizon_years, 15);
    }
}
