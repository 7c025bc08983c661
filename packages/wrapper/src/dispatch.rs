//! Choosing an adapter from a core's native convention.
//!
//! The choice is made at compile time: each convention marker implements
//! [`Dispatch`], so converting a core that already speaks the requested
//! convention hands it back untouched.

use hypercore_wrapper_api::{
    Convention, DeferredCore, HandlerCore, Hypercore, UsesDeferred, UsesHandlers,
};
use tracing::debug;

use crate::{DeferredToHandler, HandlerToDeferred};

/// Conversion of a core `C` whose native convention is `Self`.
pub trait Dispatch<C>: Convention {
    /// `C` in the deferred-value convention.
    type Deferred: DeferredCore;
    /// `C` in the completion-handler convention.
    type Handlers: HandlerCore;

    fn to_deferred(core: C) -> Self::Deferred;
    fn to_handlers(core: C) -> Self::Handlers;
}

impl<C> Dispatch<C> for UsesHandlers
where
    C: HandlerCore<Convention = UsesHandlers>,
{
    type Deferred = HandlerToDeferred<C>;
    type Handlers = C;

    fn to_deferred(core: C) -> Self::Deferred {
        HandlerToDeferred::new(core)
    }

    fn to_handlers(core: C) -> Self::Handlers {
        core
    }
}

impl<P> Dispatch<P> for UsesDeferred
where
    P: DeferredCore<Convention = UsesDeferred>,
{
    type Deferred = P;
    type Handlers = DeferredToHandler<P>;

    fn to_deferred(core: P) -> Self::Deferred {
        core
    }

    fn to_handlers(core: P) -> Self::Handlers {
        DeferredToHandler::new(core)
    }
}

/// Present `core` in the deferred-value convention.
///
/// A deferred-native core is returned unchanged; a handler-native one is
/// wrapped in a [`HandlerToDeferred`].
pub fn to_deferred_style<C>(core: C) -> <C::Convention as Dispatch<C>>::Deferred
where
    C: Hypercore,
    C::Convention: Dispatch<C>,
{
    debug!(
        native_deferred = <C::Convention as Convention>::USES_DEFERRED,
        "converting to deferred style"
    );
    <C::Convention as Dispatch<C>>::to_deferred(core)
}

/// Present `core` in the completion-handler convention.
///
/// A deferred-native core is wrapped in a [`DeferredToHandler`]; a
/// handler-native one is returned unchanged.
pub fn to_handler_style<C>(core: C) -> <C::Convention as Dispatch<C>>::Handlers
where
    C: Hypercore,
    C::Convention: Dispatch<C>,
{
    debug!(
        native_deferred = <C::Convention as Convention>::USES_DEFERRED,
        "converting to handler style"
    );
    <C::Convention as Dispatch<C>>::to_handlers(core)
}
