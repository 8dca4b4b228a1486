// src/intercept.rs
//! Interception layer.
//!
//! An [`Interceptor`] is a proxy that owns the observed API and a dispatch
//! table of behaviors keyed by operation name. Calling a wrapped operation
//! runs its behavior with an [`Original`] that can invoke the real entry
//! point; the behavior decides whether and when to do so. Operations that
//! were never wrapped go straight to the API.
//!
//! Nothing about the observed object is mutated, so independent sessions
//! never see each other's wrappers.

use std::collections::HashMap;

use log::{debug, trace};

use crate::api::{ObservedApi, Value};
use crate::error::SessionError;

/// Reaction to one call of a wrapped operation.
///
/// `C` is the context the behavior keeps its bookkeeping in.
pub type Behavior<C> = Box<dyn Fn(&mut C, Original<'_>, &[Value]) -> Result<Value, SessionError>>;

/// Boxes a closure as a [`Behavior`], fixing its signature.
pub fn behavior<C, F>(f: F) -> Behavior<C>
where
    F: Fn(&mut C, Original<'_>, &[Value]) -> Result<Value, SessionError> + 'static,
{
    Box::new(f)
}

/// The unwrapped entry point, handed to a behavior.
pub struct Original<'a> {
    api: &'a mut dyn ObservedApi,
    operation: &'a str,
}

impl<'a> Original<'a> {
    pub fn operation(&self) -> &'a str {
        self.operation
    }

    /// Invokes the real entry point.
    pub fn call(&mut self, args: &[Value]) -> Result<Value, SessionError> {
        Ok(self.api.invoke(self.operation, args)?)
    }

    /// The observed API itself, for queries. Calls made through it bypass
    /// every wrapper.
    pub fn api(&mut self) -> &mut dyn ObservedApi {
        &mut *self.api
    }
}

pub struct Interceptor<C> {
    api: Box<dyn ObservedApi>,
    behaviors: HashMap<String, Behavior<C>>,
}

impl<C> Interceptor<C> {
    pub fn new(api: Box<dyn ObservedApi>) -> Self {
        Self {
            api,
            behaviors: HashMap::new(),
        }
    }

    /// Installs `behavior` for `operation`.
    ///
    /// Fails if the API has no such operation or it is already wrapped.
    pub fn wrap(&mut self, operation: &str, behavior: Behavior<C>) -> Result<(), SessionError> {
        if !self.api.has_operation(operation) {
            return Err(SessionError::NotAnOperation(operation.to_string()));
        }
        if self.behaviors.contains_key(operation) {
            return Err(SessionError::AlreadyWrapped(operation.to_string()));
        }
        debug!("Interceptor: wrapped '{}'", operation);
        self.behaviors.insert(operation.to_string(), behavior);
        Ok(())
    }

    pub fn is_wrapped(&self, operation: &str) -> bool {
        self.behaviors.contains_key(operation)
    }

    /// Wrapped operation names, sorted.
    pub fn wrapped(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.behaviors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Calls `operation` through its behavior, or directly if unwrapped.
    pub fn call(
        &mut self,
        context: &mut C,
        operation: &str,
        args: &[Value],
    ) -> Result<Value, SessionError> {
        let original = Original {
            api: self.api.as_mut(),
            operation,
        };
        match self.behaviors.get(operation) {
            Some(behavior) => {
                trace!("Interceptor: {} (wrapped)", operation);
                behavior(context, original, args)
            }
            None => {
                trace!("Interceptor: {} (direct)", operation);
                let mut original = original;
                original.call(args)
            }
        }
    }

    /// The observed API, bypassing every wrapper.
    pub fn api(&mut self) -> &mut dyn ObservedApi {
        self.api.as_mut()
    }
}

#[cfg(test)]
mod tests;
