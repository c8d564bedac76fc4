// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Facade over a component: its context, its live instance, its channel
//! views and a bridge for building completion handlers.
//!
//! ```
//! use dagwood_bridge::bridge::{then, CompletionCallback};
//! use dagwood_bridge::config::ComponentContext;
//! use dagwood_bridge::facade::InstanceFacade;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let facade = InstanceFacade::from_context(ComponentContext::new("doubler").with_input("in"));
//! let (callback, completed) = CompletionCallback::channel();
//!
//! let result = then(
//!     async { Ok(21 * 2) },
//!     facade.on_success::<i32>(callback.clone()),
//!     facade.on_reject::<i32>(callback),
//! )
//! .await;
//!
//! assert_eq!(result.unwrap(), 42);
//! assert!(completed.await.unwrap().is_success());
//! # }
//! ```

use std::sync::Arc;

use crate::bridge::{BridgeHandler, CompletionBridge, CompletionCallback, CompletionTarget, FailureReason};
use crate::channels::{InputView, OutputView};
use crate::config::ComponentContext;
use crate::errors::BridgeError;
use crate::runtime::ComponentInstance;
use crate::traits::{ChannelHost, FailureReporter};


/// Composition root for one component.
///
/// `I` is the live instance behind the facade. It defaults to the in-memory
/// `ComponentInstance`; any `ChannelHost` works, including `dyn ChannelHost`.
#[derive(Debug)]
pub struct InstanceFacade<I: ?Sized = ComponentInstance> {
    context: Arc<ComponentContext>,
    instance: Arc<I>,
    bridge: CompletionBridge,
    input: InputView,
    output: OutputView,
}

impl InstanceFacade {
    /// Build a fresh in-memory instance from `context` and wrap it.
    pub fn from_context(context: ComponentContext) -> Self {
        let instance = Arc::new(ComponentInstance::new(&context));
        Self::new(Arc::new(context), instance)
    }
}

impl<I: ChannelHost + ?Sized> InstanceFacade<I> {
    pub fn new(context: Arc<ComponentContext>, instance: Arc<I>) -> Self {
        Self::with_bridge(context, instance, CompletionBridge::new())
    }

    /// Like `new`, also handing secondary failures to `reporter`.
    pub fn with_reporter(
        context: Arc<ComponentContext>,
        instance: Arc<I>,
        reporter: Arc<dyn FailureReporter>,
    ) -> Self {
        Self::with_bridge(context, instance, CompletionBridge::with_reporter(reporter))
    }

    fn with_bridge(context: Arc<ComponentContext>, instance: Arc<I>, bridge: CompletionBridge) -> Self {
        let input = InputView::new(instance.input_channels(), bridge.clone());
        let output = OutputView::new(instance.output_channels());
        Self {
            context,
            instance,
            bridge,
            input,
            output,
        }
    }
}

impl<I: ?Sized> InstanceFacade<I> {
    pub fn input(&self) -> &InputView {
        &self.input
    }

    pub fn output(&self) -> &OutputView {
        &self.output
    }

    /// Handler for a completion callback or a unit of work.
    pub fn handler<T>(&self, target: impl Into<CompletionTarget>) -> BridgeHandler<T> {
        self.bridge.handler(target)
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    pub fn instance(&self) -> &Arc<I> {
        &self.instance
    }

    pub fn bridge(&self) -> &CompletionBridge {
        &self.bridge
    }

    /// Success side of a chain stage, bound to a fresh handler for `callback`.
    pub fn on_success<T>(&self, callback: CompletionCallback) -> impl FnOnce(T) -> Result<T, BridgeError> + Send {
        let handler = self.bridge.for_callback::<T>(callback);
        move |value| handler.on_success(value)
    }

    /// Rejection side of a chain stage, bound to a fresh handler for `callback`.
    pub fn on_reject<T>(
        &self,
        callback: CompletionCallback,
    ) -> impl FnOnce(FailureReason) -> Result<T, BridgeError> + Send {
        let handler = self.bridge.for_callback::<T>(callback);
        move |reason| handler.on_reject(reason)
    }
}

impl<I: ?Sized> Clone for InstanceFacade<I> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            instance: Arc::clone(&self.instance),
            bridge: self.bridge.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
        }
    }
}
