//! Rule actions
//!
//! Actions perform side effects through the `ActionEffector` they are given;
//! they never touch the traversal state.

use crate::errors::EffectorError;
use crate::host::ActionEffector;
use crate::traversal::TraversalContext;

/// Effect half of a rule
pub trait Action {
    /// # Errors
    ///
    /// Returns `EffectorError` if the host refuses or fails the effect.
    fn execute(
        &self,
        ctx: &TraversalContext<'_>,
        effector: &dyn ActionEffector,
    ) -> Result<(), EffectorError>;
}

/// Create a marker aligned to the visited node
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnMarker;

impl Action for SpawnMarker {
    fn execute(
        &self,
        ctx: &TraversalContext<'_>,
        effector: &dyn ActionEffector,
    ) -> Result<(), EffectorError> {
        let marker_id = effector.spawn_marker(ctx.current())?;
        tracing::debug!(node_id = ctx.name(), marker_id = %marker_id, "marker spawned");
        Ok(())
    }
}

/// Bake the visited node's rotation into its rest orientation
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOrientation;

impl Action for NormalizeOrientation {
    fn execute(
        &self,
        ctx: &TraversalContext<'_>,
        effector: &dyn ActionEffector,
    ) -> Result<(), EffectorError> {
        effector.normalize_orientation(ctx.current())
    }
}

/// Action backed by a native closure
pub struct ActionFn<F>(F);

pub fn action_fn<F>(f: F) -> ActionFn<F>
where
    F: Fn(&TraversalContext<'_>, &dyn ActionEffector) -> Result<(), EffectorError>,
{
    ActionFn(f)
}

impl<F> Action for ActionFn<F>
where
    F: Fn(&TraversalContext<'_>, &dyn ActionEffector) -> Result<(), EffectorError>,
{
    fn execute(
        &self,
        ctx: &TraversalContext<'_>,
        effector: &dyn ActionEffector,
    ) -> Result<(), EffectorError> {
        (self.0)(ctx, effector)
    }
}
